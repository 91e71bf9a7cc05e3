use clap::Parser;
use std::path::PathBuf;

use crate::entities::FrameEvent;

const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "UI:     eframe 0.33\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Frame event track viewer
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Load track from JSON file (overrides --frames/--event)
    #[arg(short = 't', long = "track", value_name = "TRACK")]
    pub track: Option<PathBuf>,

    /// Total number of frames
    #[arg(short = 'n', long = "frames", value_name = "N", allow_negative_numbers = true)]
    pub frames: Option<i32>,

    /// Event as FRAME:LABEL (can be specified multiple times)
    #[arg(
        short = 'e',
        long = "event",
        value_name = "FRAME:LABEL",
        value_parser = parse_event,
        allow_hyphen_values = true
    )]
    pub events: Vec<FrameEvent>,

    /// Track geometry config (JSON); default: track_config.json in config dir
    #[arg(long = "config", value_name = "FILE")]
    pub track_config: Option<PathBuf>,

    /// Enable debug logging to file (default: frametrack.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Track given on the command line, if any
    pub fn has_track_input(&self) -> bool {
        self.track.is_some() || self.frames.is_some() || !self.events.is_empty()
    }
}

/// Parse `FRAME:LABEL`; the label may itself contain ':'
pub fn parse_event(s: &str) -> Result<FrameEvent, String> {
    let (frame, label) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:LABEL, got {:?}", s))?;
    let frame_index = frame
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid frame {:?}: {}", frame, e))?;
    if label.is_empty() {
        return Err("event label is empty".to_string());
    }
    Ok(FrameEvent::new(frame_index, label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event() {
        assert_eq!(parse_event("3:Hit"), Ok(FrameEvent::new(3, "Hit")));
        assert_eq!(parse_event(" 12 :a:b"), Ok(FrameEvent::new(12, "a:b")));
        assert_eq!(parse_event("-1:neg"), Ok(FrameEvent::new(-1, "neg")));
        assert!(parse_event("nolabel").is_err());
        assert!(parse_event("x:label").is_err());
        assert!(parse_event("4:").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "frametrack", "-n", "20", "-e", "0:Mark1", "--event", "2:Mark3", "-vv",
        ]);
        assert_eq!(args.frames, Some(20));
        assert_eq!(args.events.len(), 2);
        assert_eq!(args.verbosity, 2);
        assert!(args.has_track_input());
    }

    #[test]
    fn test_args_negative_values() {
        let args = Args::parse_from([
            "frametrack", "-e", "-1:neg", "--event", "-7:also", "-n", "-3",
        ]);
        assert_eq!(args.frames, Some(-3));
        assert_eq!(
            args.events,
            [FrameEvent::new(-1, "neg"), FrameEvent::new(-7, "also")]
        );
        assert!(Args::try_parse_from(["frametrack", "-e", "-1"]).is_err());
    }

    #[test]
    fn test_args_bare() {
        let bare = Args::parse_from(["frametrack"]);
        assert!(!bare.has_track_input());
        assert!(bare.log_file.is_none());
    }
}
