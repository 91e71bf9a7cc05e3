//! Shared shell: logger setup and the track/bus/view bundle the app drives.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

use crate::config::{self, PathConfig};
use crate::core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
use crate::entities::track_events::handle_track_event;
use crate::entities::{FrameEvent, FrameTrack};
use crate::widgets::frame_track::{
    FrameTrackView, TrackConfig, TrackHoveredFrameEvent, TrackViewState, TrackZoomChangedEvent,
};

/// Verbosity count -> level (0 = warn, 1 = info, 2 = debug, 3+ = trace)
pub fn log_level(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Initialize env_logger to stderr (respects RUST_LOG) or to a file.
pub fn init_logger(
    verbosity: u8,
    log_file: Option<&Option<PathBuf>>,
    paths: &PathConfig,
) -> Result<()> {
    let level = log_level(verbosity);

    if let Some(log_path_opt) = log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, paths));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(level)
            .filter_module("egui", log::LevelFilter::Info)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), level);
    } else {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
        )
        .filter_module("egui", log::LevelFilter::Info)
        .format_timestamp_millis()
        .init();
    }
    Ok(())
}

/// Demo track: 20 frames, events on frames 0 and 2
pub fn sample_track() -> FrameTrack {
    FrameTrack::new(
        20,
        Some(vec![FrameEvent::new(0, "Mark1"), FrameEvent::new(2, "Mark3")]),
    )
}

/// What the status bar shows, fed by widget events
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackStatus {
    pub hovered_frame: Option<i32>,
    pub zoom_width: f32,
}

/// Track + event bus + widget engine for one displayed track.
///
/// Track and view state persist with the app; the rest is runtime only.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Shell {
    pub track: FrameTrack,
    pub view_state: TrackViewState,
    #[serde(skip)]
    pub config: TrackConfig,
    #[serde(skip)]
    pub view: FrameTrackView,
    #[serde(skip)]
    pub event_bus: EventBus,
    #[serde(skip)]
    pub status: TrackStatus,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(sample_track(), TrackConfig::default())
    }
}

impl Shell {
    pub fn new(track: FrameTrack, config: TrackConfig) -> Self {
        let view_state = TrackViewState {
            zoom_width: config.max_frame_width,
            ..Default::default()
        };
        Self {
            track,
            config,
            view: FrameTrackView::new(),
            status: TrackStatus {
                hovered_frame: None,
                zoom_width: view_state.zoom_width,
            },
            view_state,
            event_bus: EventBus::new(),
        }
    }

    /// Swap in a new geometry config, re-clamping the current zoom to it
    pub fn set_config(&mut self, config: TrackConfig) {
        self.view_state.zoom_width = config.clamp_zoom(self.view_state.zoom_width);
        self.status.zoom_width = self.view_state.zoom_width;
        self.config = config;
    }

    pub fn emitter(&self) -> EventEmitter {
        self.event_bus.emitter()
    }

    /// Apply queued track commands and widget notifications; returns how
    /// many were handled
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        for event in self.event_bus.poll() {
            if handle_track_event(&event, &mut self.track) || self.handle_widget_event(&event) {
                handled += 1;
            } else {
                log::trace!("Unhandled event: {}", (*event).type_name());
            }
        }
        handled
    }

    fn handle_widget_event(&mut self, event: &BoxedEvent) -> bool {
        if let Some(e) = downcast_event::<TrackHoveredFrameEvent>(event) {
            self.status.hovered_frame = e.0;
            return true;
        }
        if let Some(e) = downcast_event::<TrackZoomChangedEvent>(event) {
            debug!("Frame track zoom width: {:.1}", e.0);
            self.status.zoom_width = e.0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::track_events::{AddEventTextEvent, RemoveEventTextEvent};

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(0), log::LevelFilter::Warn);
        assert_eq!(log_level(1), log::LevelFilter::Info);
        assert_eq!(log_level(2), log::LevelFilter::Debug);
        assert_eq!(log_level(9), log::LevelFilter::Trace);
    }

    #[test]
    fn test_process_events_skips_unknown_events() {
        let mut shell = Shell::default();
        let emitter = shell.emitter();
        emitter.emit(AddEventTextEvent { frame_index: 4, text: "x".into() });
        emitter.emit(TrackZoomChangedEvent(20.0));
        emitter.emit(RemoveEventTextEvent { frame_index: 5, text: "x".into() });
        emitter.emit(42_u32);

        assert_eq!(shell.process_events(), 3);
        assert_eq!(shell.track.events_at(4), ["x"]);
        assert_eq!(shell.event_bus.queue_len(), 0);
    }

    #[test]
    fn test_widget_events_drive_status() {
        let mut shell = Shell::default();
        assert_eq!(shell.status.zoom_width, 50.0);
        assert_eq!(shell.status.hovered_frame, None);

        let emitter = shell.emitter();
        emitter.emit(TrackHoveredFrameEvent(Some(3)));
        emitter.emit(TrackZoomChangedEvent(31.5));
        assert_eq!(shell.process_events(), 2);
        assert_eq!(
            shell.status,
            TrackStatus {
                hovered_frame: Some(3),
                zoom_width: 31.5
            }
        );

        emitter.emit(TrackHoveredFrameEvent(None));
        shell.process_events();
        assert_eq!(shell.status.hovered_frame, None);
    }

    #[test]
    fn test_shell_starts_at_configured_max_zoom() {
        let config = TrackConfig {
            max_frame_width: 40.0,
            ..Default::default()
        };
        let shell = Shell::new(FrameTrack::empty(3), config);
        assert_eq!(shell.view_state.zoom_width, 40.0);
    }

    #[test]
    fn test_set_config_reclamps_zoom() {
        let mut shell = Shell::default();
        assert_eq!(shell.view_state.zoom_width, 50.0);
        shell.set_config(TrackConfig {
            max_frame_width: 30.0,
            ..Default::default()
        });
        assert_eq!(shell.view_state.zoom_width, 30.0);
    }

    #[test]
    fn test_shell_persists_track_and_view_state() {
        let mut shell = Shell::default();
        shell.view_state.zoom_width = 22.0;
        shell.track.add_event_text(5, "saved");

        let json = serde_json::to_string(&shell).unwrap();
        let restored: Shell = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.view_state.zoom_width, 22.0);
        assert_eq!(restored.track.events_at(5), ["saved"]);
        assert_eq!(restored.track.total_frames(), 20);
    }
}
