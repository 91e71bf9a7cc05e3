//! Frame track widget - horizontal strip of frame cells
//!
//! One cell per frame, widened per digit of the frame number, tinted when the
//! frame carries events, with the event labels stacked beneath it.

mod track;
mod track_events;
mod track_helpers;
mod track_ui;
mod track_view;

pub use track::{
    COLOR_ACTIVE, COLOR_INACTIVE, EMPTY_EVENT_MESSAGE, InputResult, PassKind, TrackConfig,
    TrackInput, TrackPass, TrackViewState,
};
pub use track_events::{TrackHoveredFrameEvent, TrackZoomChangedEvent};
pub use track_helpers::{
    DrawCmd, DrawList, FrameCell, TintGuard, digit_count, frame_width, required_height,
    total_width,
};
pub use track_ui::{TrackResponse, paint_draw_list, render_frame_track};
pub use track_view::{FrameTrackView, RenderCache};
