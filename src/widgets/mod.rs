//! UI Widgets
//!
//! Widgets read model state, keep their own view state, and report changes
//! back through the EventBus.

pub mod frame_track;
