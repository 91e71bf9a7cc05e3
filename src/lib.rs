//! FRAMETRACK - per-frame event annotation track widget
//!
//! Data model (`entities`), layout/render engine and egui adapter
//! (`widgets::frame_track`), plus the shell used by the demo binary.

pub mod cli;
pub mod config;
pub mod core;
pub mod entities;
pub mod shell;
pub mod widgets;

pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use entities::{FrameEvent, FrameTrack};
pub use widgets::frame_track::{FrameTrackView, TrackConfig, TrackViewState, render_frame_track};
