//! Frame track widget events.

/// Zoom width changed by wheel input
#[derive(Clone, Debug)]
pub struct TrackZoomChangedEvent(pub f32);

/// Pointer moved onto a different frame (None = left the strip)
#[derive(Clone, Debug)]
pub struct TrackHoveredFrameEvent(pub Option<i32>);
