//! Entities - track data model and the commands that mutate it.
//!
//! No GUI code here; the frame track widget renders a `FrameTrack` read-only.

pub mod frame_track;
pub mod track_events;

pub use frame_track::{FrameEvent, FrameTrack};
