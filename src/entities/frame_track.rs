//! Frame track - fixed frame count plus sparse per-frame event labels.
//!
//! Validation is fail-soft: a negative length is clamped to 0, a missing or
//! invalid event array leaves the track empty, out-of-range records are
//! stripped. Every correction is logged, nothing is returned as an error, so
//! the widget drawing the track stays paintable on every tick.
//!
//! # Two-phase mutation
//!
//! [`FrameTrack::add_event_text`] does not range-check the frame index. After
//! it, the "all indices in `0..total_frames`" invariant only holds again once
//! [`FrameTrack::revalidate`] has run. [`FrameTrack::needs_revalidation`]
//! reports whether an out-of-range record is currently stored.
//!
//! Persisted as `{"total_frames": N, "events": [{"frame_index": i, "labels": [..]}]}`.
//! Deserialization goes through [`FrameTrack::new`], so loaded data is always
//! validated.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Revisions are unique across all tracks, so swapping in a different track
/// invalidates caches just like mutating the current one.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// One event record as supplied by the host or stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEvent {
    pub frame_index: i32,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl FrameEvent {
    /// Record with a single label
    pub fn new(frame_index: i32, label: impl Into<String>) -> Self {
        Self {
            frame_index,
            labels: vec![label.into()],
        }
    }
}

/// Serialized shape of a track (events may be absent/null)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct FrameTrackData {
    #[serde(default)]
    total_frames: i32,
    #[serde(default)]
    events: Option<Vec<FrameEvent>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "FrameTrackData", into = "FrameTrackData")]
pub struct FrameTrack {
    total_frames: i32,
    /// frame index -> labels, insertion ordered
    events: IndexMap<i32, Vec<String>>,
    /// Changes on every mutation, lets render caches notice content changes
    revision: u64,
}

impl From<FrameTrackData> for FrameTrack {
    fn from(data: FrameTrackData) -> Self {
        match data.events {
            // Saved track without events; not an invalid array
            Some(events) if events.is_empty() => FrameTrack::empty(data.total_frames),
            events => FrameTrack::new(data.total_frames, events),
        }
    }
}

impl From<FrameTrack> for FrameTrackData {
    fn from(track: FrameTrack) -> Self {
        FrameTrackData {
            total_frames: track.total_frames,
            events: Some(track.to_events()),
        }
    }
}

impl FrameTrack {
    /// Build and validate a track.
    ///
    /// `None` events or events that are all invalid leave the track with no
    /// events (an error is logged); `total_frames` is kept as passed, clamped
    /// to 0 if negative. Records with the same frame index are merged in
    /// input order. Records without labels count as invalid.
    pub fn new(total_frames: i32, events: Option<Vec<FrameEvent>>) -> Self {
        let mut track = Self {
            total_frames,
            events: IndexMap::new(),
            revision: next_revision(),
        };
        track.clamp_total_frames();
        track.validate_frame_events(events);
        track
    }

    /// Track with no events (negative length clamped and logged)
    pub fn empty(total_frames: i32) -> Self {
        let mut track = Self {
            total_frames,
            events: IndexMap::new(),
            revision: next_revision(),
        };
        track.clamp_total_frames();
        track
    }

    fn validate_frame_events(&mut self, events: Option<Vec<FrameEvent>>) {
        let Some(events) = events else {
            error!("Frame event array is null");
            return;
        };

        let supplied = events.len();
        let mut stripped = 0usize;
        let mut merged: IndexMap<i32, Vec<String>> = IndexMap::new();
        for event in events {
            if !self.in_range(event.frame_index) || event.labels.is_empty() {
                stripped += 1;
                continue;
            }
            merged
                .entry(event.frame_index)
                .or_default()
                .extend(event.labels);
        }

        if stripped > 0 {
            warn!(
                "Stripped {} of {} frame events (valid range 0..{})",
                stripped, supplied, self.total_frames
            );
        }

        if merged.is_empty() {
            error!("Invalid values found in frame event array, aborting");
            return;
        }

        self.events = merged;
    }

    fn clamp_total_frames(&mut self) {
        if self.total_frames < 0 {
            error!(
                "Frame track can't have negative length ({}), clamping to 0",
                self.total_frames
            );
            self.total_frames = 0;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }

    #[inline]
    fn in_range(&self, frame_index: i32) -> bool {
        (0..self.total_frames).contains(&frame_index)
    }

    /// Re-clamp the length and strip records outside `0..total_frames`.
    ///
    /// Call after any host-side edit and after `add_event_text` before relying
    /// on the range invariant. Returns the number of stripped records.
    pub fn revalidate(&mut self) -> usize {
        self.clamp_total_frames();

        let before = self.events.len();
        let total = self.total_frames;
        self.events.retain(|frame, _| (0..total).contains(frame));
        let stripped = before - self.events.len();

        if stripped > 0 {
            warn!(
                "Stripped {} frame event records outside 0..{}",
                stripped, total
            );
            self.touch();
        }
        stripped
    }

    /// Host-side length edit; revalidates immediately.
    pub fn set_total_frames(&mut self, total_frames: i32) -> usize {
        if self.total_frames != total_frames {
            debug!(
                "Frame track length {} -> {}",
                self.total_frames, total_frames
            );
            self.total_frames = total_frames;
            self.touch();
        }
        self.revalidate()
    }

    /// Append `text` to the frame's labels, creating the record if needed.
    ///
    /// No range check; see the module docs.
    pub fn add_event_text(&mut self, frame_index: i32, text: impl Into<String>) {
        let text = text.into();
        debug!("Add event text at frame {}: {:?}", frame_index, text);
        self.events.entry(frame_index).or_default().push(text);
        self.touch();
    }

    /// Remove the first label equal to `text` from the frame's record.
    ///
    /// The record itself is kept even when its last label goes away, so the
    /// frame still counts as having a record. Returns whether a label was
    /// removed.
    pub fn remove_event_text(&mut self, frame_index: i32, text: &str) -> bool {
        let Some(labels) = self.events.get_mut(&frame_index) else {
            info!("No event record at frame {}, nothing to remove", frame_index);
            return false;
        };

        match labels.iter().position(|label| label == text) {
            Some(pos) => {
                labels.remove(pos);
                self.touch();
                debug!("Removed event text at frame {}: {:?}", frame_index, text);
                true
            }
            None => {
                debug!("Frame {} has no label {:?}", frame_index, text);
                false
            }
        }
    }

    /// Labels at `frame_index`, empty if the frame has no record
    pub fn events_at(&self, frame_index: i32) -> &[String] {
        self.events
            .get(&frame_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_record(&self, frame_index: i32) -> bool {
        self.events.contains_key(&frame_index)
    }

    pub fn total_frames(&self) -> i32 {
        self.total_frames
    }

    /// Number of frame records (including emptied ones)
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of labels across all records
    pub fn label_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while an out-of-range record from `add_event_text` is stored
    pub fn needs_revalidation(&self) -> bool {
        self.events.keys().any(|&frame| !self.in_range(frame))
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[String])> {
        self.events
            .iter()
            .map(|(&frame, labels)| (frame, labels.as_slice()))
    }

    /// Records in persisted form
    pub fn to_events(&self) -> Vec<FrameEvent> {
        self.events
            .iter()
            .map(|(&frame_index, labels)| FrameEvent {
                frame_index,
                labels: labels.clone(),
            })
            .collect()
    }

    /// Load a track from a JSON file (validated on load)
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read track file: {}", path.display()))?;
        let track: FrameTrack = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse track file: {}", path.display()))?;
        info!(
            "Loaded track {}: {} frames, {} event records",
            path.display(),
            track.total_frames,
            track.event_count()
        );
        Ok(track)
    }

    /// Save the track as pretty JSON
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize track")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write track file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrameTrack {
        FrameTrack::new(
            20,
            Some(vec![FrameEvent::new(0, "Mark1"), FrameEvent::new(2, "Mark3")]),
        )
    }

    #[test]
    fn test_events_at_returns_supplied_labels_in_order() {
        let track = FrameTrack::new(
            10,
            Some(vec![
                FrameEvent {
                    frame_index: 4,
                    labels: vec!["a".into(), "b".into()],
                },
                FrameEvent::new(4, "c"),
                FrameEvent::new(9, "last"),
            ]),
        );
        assert_eq!(track.events_at(4), ["a", "b", "c"]);
        assert_eq!(track.events_at(9), ["last"]);
        assert!(track.events_at(5).is_empty());
        assert_eq!(track.event_count(), 2);
        assert_eq!(track.label_count(), 4);
    }

    #[test]
    fn test_construction_strips_out_of_range() {
        let track = FrameTrack::new(
            5,
            Some(vec![
                FrameEvent::new(-1, "neg"),
                FrameEvent::new(0, "first"),
                FrameEvent::new(5, "past end"),
                FrameEvent::new(100, "far"),
            ]),
        );
        assert_eq!(track.event_count(), 1);
        assert!(track.iter().all(|(frame, _)| (0..5).contains(&frame)));
        assert!(!track.needs_revalidation());
    }

    #[test]
    fn test_construction_all_invalid_leaves_no_events() {
        let track = FrameTrack::new(3, Some(vec![FrameEvent::new(3, "x")]));
        assert_eq!(track.event_count(), 0);
        assert_eq!(track.total_frames(), 3);

        let track = FrameTrack::new(3, Some(Vec::new()));
        assert_eq!(track.event_count(), 0);
    }

    #[test]
    fn test_null_events_keeps_total_frames() {
        let track = FrameTrack::new(12, None);
        assert_eq!(track.event_count(), 0);
        assert_eq!(track.total_frames(), 12);
    }

    #[test]
    fn test_negative_total_frames_clamped() {
        let track = FrameTrack::new(-4, Some(vec![FrameEvent::new(0, "x")]));
        assert_eq!(track.total_frames(), 0);
        assert_eq!(track.event_count(), 0);
    }

    #[test]
    fn test_add_event_text_appends_and_keeps_duplicates() {
        let mut track = sample();
        track.add_event_text(2, "again");
        assert_eq!(track.events_at(2).last().map(String::as_str), Some("again"));

        track.add_event_text(7, "dup");
        track.add_event_text(7, "dup");
        assert_eq!(track.events_at(7), ["dup", "dup"]);
    }

    #[test]
    fn test_add_out_of_range_is_visible_until_revalidate() {
        let mut track = sample();
        track.add_event_text(40, "late");
        assert!(track.needs_revalidation());
        assert_eq!(track.events_at(40), ["late"]);

        assert_eq!(track.revalidate(), 1);
        assert!(!track.needs_revalidation());
        assert!(track.events_at(40).is_empty());
    }

    #[test]
    fn test_remove_last_label_keeps_record() {
        let mut track = sample();
        assert!(track.remove_event_text(0, "Mark1"));
        assert!(track.has_record(0));
        assert!(track.events_at(0).is_empty());
        assert_eq!(track.event_count(), 2);
    }

    #[test]
    fn test_remove_first_matching_label_only() {
        let mut track = FrameTrack::empty(4);
        track.add_event_text(1, "x");
        track.add_event_text(1, "y");
        track.add_event_text(1, "x");
        assert!(track.remove_event_text(1, "x"));
        assert_eq!(track.events_at(1), ["y", "x"]);
        assert!(!track.remove_event_text(1, "zzz"));
    }

    #[test]
    fn test_remove_missing_record_is_noop() {
        let mut track = sample();
        let revision = track.revision();
        assert!(!track.remove_event_text(5, "x"));
        assert_eq!(track.event_count(), 2);
        assert_eq!(track.revision(), revision);
        assert!(!track.has_record(5));
    }

    #[test]
    fn test_set_total_frames_strips_and_bumps_revision() {
        let mut track = sample();
        let revision = track.revision();
        assert_eq!(track.set_total_frames(2), 1);
        assert_eq!(track.total_frames(), 2);
        assert!(track.has_record(0));
        assert!(!track.has_record(2));
        assert!(track.revision() > revision);

        assert_eq!(track.set_total_frames(-1), 1);
        assert_eq!(track.total_frames(), 0);
        assert_eq!(track.event_count(), 0);
    }

    #[test]
    fn test_json_loads_through_validation() {
        let json = r#"{"total_frames": 4, "events": [
            {"frame_index": 1, "labels": ["hit"]},
            {"frame_index": 9, "labels": ["gone"]}
        ]}"#;
        let track: FrameTrack = serde_json::from_str(json).unwrap();
        assert_eq!(track.total_frames(), 4);
        assert_eq!(track.events_at(1), ["hit"]);
        assert!(!track.has_record(9));

        let null_events: FrameTrack =
            serde_json::from_str(r#"{"total_frames": 6, "events": null}"#).unwrap();
        assert_eq!(null_events.total_frames(), 6);
        assert_eq!(null_events.event_count(), 0);
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = std::env::temp_dir().join("frametrack_test_track.json");
        let track = sample();
        track.to_json(&path).unwrap();

        let loaded = FrameTrack::from_json(&path).unwrap();
        assert_eq!(loaded.total_frames(), 20);
        assert_eq!(loaded.to_events(), track.to_events());
        let _ = fs::remove_file(&path);
    }
}
