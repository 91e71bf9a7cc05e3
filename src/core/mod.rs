//! Core modules independent of UI.

pub mod event_bus;

pub use event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
