use frametrack::cli::Args;
use frametrack::config;
use frametrack::entities::track_events::{
    AddEventTextEvent, RemoveEventTextEvent, RevalidateTrackEvent, SetTotalFramesEvent,
};
use frametrack::entities::FrameTrack;
use frametrack::shell::{self, Shell};
use frametrack::widgets::frame_track::render_frame_track;

use clap::Parser;
use eframe::egui;
use log::{debug, error, info};
use std::path::PathBuf;

/// Width of the "Frame Track" prefix label in front of the strip
const PREFIX_WIDTH: f32 = 90.0;

/// Demo application hosting one frame track
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct FrameTrackApp {
    shell: Shell,
    /// Frame / label typed into the toolbar editor
    edit_frame: i32,
    edit_text: String,
    /// Last file the track was saved to or loaded from
    track_path: Option<PathBuf>,
    #[serde(skip)]
    error_msg: Option<String>,
}

impl Default for FrameTrackApp {
    fn default() -> Self {
        Self {
            shell: Shell::default(),
            edit_frame: 0,
            edit_text: String::new(),
            track_path: None,
            error_msg: None,
        }
    }
}

impl FrameTrackApp {
    fn load_track(&mut self, path: PathBuf) {
        match FrameTrack::from_json(&path) {
            Ok(track) => {
                info!("Loaded track from {}", path.display());
                self.shell.track = track;
                self.track_path = Some(path);
                self.error_msg = None;
            }
            Err(e) => {
                error!("{:#}", e);
                self.error_msg = Some(format!("{:#}", e));
            }
        }
    }

    fn save_track(&mut self, path: PathBuf) {
        match self.shell.track.to_json(&path) {
            Ok(()) => {
                info!("Saved track to {}", path.display());
                self.track_path = Some(path);
                self.error_msg = None;
            }
            Err(e) => {
                error!("{:#}", e);
                self.error_msg = Some(format!("{:#}", e));
            }
        }
    }

    fn show_open_track_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Frame Track", &["json"])
            .pick_file()
        {
            self.load_track(path);
        }
    }

    fn show_save_track_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Frame Track", &["json"])
            .set_file_name("track.json")
            .save_file()
        {
            self.save_track(path);
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let emitter = self.shell.emitter();

        ui.horizontal(|ui| {
            if ui.button("Open...").clicked() {
                self.show_open_track_dialog();
            }
            if ui.button("Save...").clicked() {
                self.show_save_track_dialog();
            }
            ui.separator();

            ui.label("Frames:");
            let mut total = self.shell.track.total_frames();
            if ui
                .add(egui::DragValue::new(&mut total).range(0..=100_000))
                .changed()
            {
                emitter.emit(SetTotalFramesEvent(total));
            }

            let needs_revalidation = self.shell.track.needs_revalidation();
            if ui
                .add_enabled(needs_revalidation, egui::Button::new("Revalidate"))
                .on_hover_text("Drop events outside the frame range")
                .clicked()
            {
                emitter.emit(RevalidateTrackEvent);
            }
            ui.separator();

            ui.label("Frame:");
            ui.add(egui::DragValue::new(&mut self.edit_frame));
            ui.add(
                egui::TextEdit::singleline(&mut self.edit_text)
                    .hint_text("label")
                    .desired_width(140.0),
            );

            let has_text = !self.edit_text.is_empty();
            if ui.add_enabled(has_text, egui::Button::new("Add")).clicked() {
                emitter.emit(AddEventTextEvent {
                    frame_index: self.edit_frame,
                    text: self.edit_text.clone(),
                });
            }
            if ui.add_enabled(has_text, egui::Button::new("Remove")).clicked() {
                emitter.emit(RemoveEventTextEvent {
                    frame_index: self.edit_frame,
                    text: self.edit_text.clone(),
                });
            }
        });
    }

    fn render_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let track = &self.shell.track;
            ui.label(format!(
                "{} frames, {} events",
                track.total_frames(),
                track.label_count()
            ));
            ui.separator();
            let status = self.shell.status;
            match status.hovered_frame {
                Some(frame) => ui.label(format!("Frame {}", frame)),
                None => ui.weak("Frame -"),
            };
            ui.separator();
            ui.label(format!("Zoom {:.1}", status.zoom_width));
            if track.needs_revalidation() {
                ui.separator();
                ui.colored_label(egui::Color32::YELLOW, "Events outside range");
            }
            if let Some(path) = &self.track_path {
                ui.separator();
                ui.weak(path.display().to_string());
            }
        });
    }

    fn render_track(&mut self, ui: &mut egui::Ui) {
        let emitter = self.shell.emitter();
        let shell = &mut self.shell;

        ui.horizontal_top(|ui| {
            ui.add_sized(
                [PREFIX_WIDTH, shell.config.box_height],
                egui::Label::new("Frame Track"),
            );
            // Hover and zoom changes come back through the bus into `shell.status`
            render_frame_track(
                ui,
                &shell.track,
                &shell.config,
                &mut shell.view,
                &mut shell.view_state,
                |event| emitter.emit_boxed(event),
            );
        });

        if let Some(msg) = &self.error_msg {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::LIGHT_RED, msg);
        }
    }
}

impl eframe::App for FrameTrackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let handled = self.shell.process_events();
        if handled > 0 {
            debug!("Handled {} queued events", handled);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.render_toolbar(ui));
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.render_status(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.render_track(ui));

        // Commands emitted this frame are applied at the start of the next one
        if self.shell.event_bus.queue_len() > 0 {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(self) {
            Ok(json) => storage.set_string(eframe::APP_KEY, json),
            Err(e) => error!("Failed to serialize app state: {}", e),
        }
    }
}

/// Track given by `--track`, or built from `--frames`/`--event`
fn track_from_args(args: &Args) -> Option<FrameTrack> {
    if let Some(path) = &args.track {
        match FrameTrack::from_json(path) {
            Ok(track) => return Some(track),
            Err(e) => error!("{:#}", e),
        }
    }
    if args.frames.is_none() && args.events.is_empty() {
        return None;
    }
    let total_frames = args
        .frames
        .unwrap_or_else(|| shell::sample_track().total_frames());
    if args.events.is_empty() {
        Some(FrameTrack::empty(total_frames))
    } else {
        Some(FrameTrack::new(total_frames, Some(args.events.clone())))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    shell::init_logger(args.verbosity, args.log_file.as_ref(), &path_config)?;

    info!("Frame track viewer starting...");
    debug!("Command-line args: {:?}", args);
    info!(
        "Config path: {}",
        config::config_file(config::APP_STATE_FILE, &path_config).display()
    );

    let track_config = config::resolve_track_config(args.track_config.as_deref(), &path_config);
    let cli_track = if args.has_track_input() {
        track_from_args(&args)
    } else {
        None
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Frame Track v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([900.0, 240.0])
            .with_resizable(true),
        persist_window: true,
        persistence_path: Some(config::config_file(config::APP_STATE_FILE, &path_config)),
        ..Default::default()
    };

    eframe::run_native(
        "FrameTrack",
        native_options,
        Box::new(move |cc| {
            let mut app: FrameTrackApp = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted state found, starting with sample track");
                    FrameTrackApp::default()
                });

            app.shell.set_config(track_config);
            if let Some(track) = cli_track {
                info!(
                    "Track from command line: {} frames, {} events",
                    track.total_frames(),
                    track.event_count()
                );
                app.shell.track = track;
                app.track_path = args.track.clone();
            }

            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
