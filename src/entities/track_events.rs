//! Track command events.
//!
//! UI callbacks (toolbar buttons, context menu, length field) emit these
//! through the EventBus; the main loop polls them once per tick and applies
//! them to the [`FrameTrack`] with [`handle_track_event`]. Everything runs on
//! the UI thread, so the model needs no locking.

use log::trace;

use super::FrameTrack;
use crate::core::event_bus::{BoxedEvent, downcast_event};

/// Append a label to a frame (create-or-append, no range check)
#[derive(Clone, Debug)]
pub struct AddEventTextEvent {
    pub frame_index: i32,
    pub text: String,
}

/// Remove one label from a frame's record
#[derive(Clone, Debug)]
pub struct RemoveEventTextEvent {
    pub frame_index: i32,
    pub text: String,
}

/// Host-side length edit (triggers revalidation)
#[derive(Clone, Debug)]
pub struct SetTotalFramesEvent(pub i32);

/// Explicit revalidation request, e.g. after a batch of adds
#[derive(Clone, Debug)]
pub struct RevalidateTrackEvent;

/// Apply a polled event to the track.
///
/// Returns true if the event was a track command (handled), false otherwise
/// so the caller can route it elsewhere.
pub fn handle_track_event(event: &BoxedEvent, track: &mut FrameTrack) -> bool {
    trace!("Track event: {}", (**event).type_name());

    if let Some(e) = downcast_event::<AddEventTextEvent>(event) {
        track.add_event_text(e.frame_index, e.text.clone());
        return true;
    }
    if let Some(e) = downcast_event::<RemoveEventTextEvent>(event) {
        track.remove_event_text(e.frame_index, &e.text);
        return true;
    }
    if let Some(e) = downcast_event::<SetTotalFramesEvent>(event) {
        track.set_total_frames(e.0);
        return true;
    }
    if downcast_event::<RevalidateTrackEvent>(event).is_some() {
        track.revalidate();
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::EventBus;
    use crate::entities::FrameEvent;

    #[test]
    fn test_polled_commands_mutate_track() {
        let bus = EventBus::new();
        let mut track = FrameTrack::new(20, Some(vec![FrameEvent::new(0, "Mark1")]));

        bus.emit(AddEventTextEvent { frame_index: 3, text: "hit".into() });
        bus.emit(AddEventTextEvent { frame_index: 3, text: "miss".into() });
        bus.emit(RemoveEventTextEvent { frame_index: 3, text: "hit".into() });
        bus.emit(SetTotalFramesEvent(10));

        for event in bus.poll() {
            assert!(handle_track_event(&event, &mut track));
        }

        assert_eq!(track.events_at(3), ["miss"]);
        assert_eq!(track.total_frames(), 10);
    }

    #[test]
    fn test_revalidate_event_strips_pending_adds() {
        let bus = EventBus::new();
        let mut track = FrameTrack::empty(5);

        bus.emit(AddEventTextEvent { frame_index: 8, text: "late".into() });
        bus.emit(RevalidateTrackEvent);
        for event in bus.poll() {
            handle_track_event(&event, &mut track);
        }

        assert!(!track.has_record(8));
        assert!(!track.needs_revalidation());
    }

    #[test]
    fn test_unrelated_event_not_handled() {
        #[derive(Clone, Debug)]
        struct Other;

        let bus = EventBus::new();
        let mut track = FrameTrack::empty(5);
        bus.emit(Other);
        let events = bus.poll();
        assert!(!handle_track_event(&events[0], &mut track));
    }
}
