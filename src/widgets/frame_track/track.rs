//! Frame track widget - configuration, view state and pass inputs.
//!
//! `TrackConfig` holds the fixed geometry (loadable from JSON), `TrackViewState`
//! the per-instance zoom/scroll that survives between passes (persisted with
//! the app). Renderers read both; only input handling mutates the view state.

use eframe::egui::{Color32, Vec2};
use log::warn;
use serde::{Deserialize, Serialize};

/// Tick bar / box tint for frames with an event record
pub const COLOR_ACTIVE: Color32 = Color32::from_rgb(0, 255, 255);
/// Tick bar / box tint for frames without a record
pub const COLOR_INACTIVE: Color32 = Color32::from_rgb(128, 128, 128);
pub const COLOR_TRACK_BG: Color32 = Color32::from_gray(30);
pub const COLOR_LABEL: Color32 = Color32::from_gray(220);
pub const COLOR_TOOLTIP_BG: Color32 = Color32::from_rgb(40, 70, 80);
pub const COLOR_TOOLTIP_TEXT: Color32 = Color32::from_rgb(200, 255, 255);

/// Hover text on frames without events
pub const EMPTY_EVENT_MESSAGE: &str = "Empty";

/// Geometry of the frame strip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Zoom bounds for the base cell width
    pub min_frame_width: f32,
    pub max_frame_width: f32,
    /// Extra cell width per digit of the frame number
    pub width_increment_per_digit: f32,
    pub box_height: f32,
    /// Height of one stacked tooltip block
    pub hovering_box_height: f32,
    /// Width of the tick bar flush-left in each cell
    pub bar_width: f32,
    pub scrollbar_height: f32,
    /// Approximate glyph advance used to size tooltip blocks
    pub tooltip_char_width: f32,
    pub label_font_size: f32,
    /// Wheel points -> zoom width units
    pub zoom_sensitivity: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            min_frame_width: 14.0,
            max_frame_width: 50.0,
            width_increment_per_digit: 5.0,
            box_height: 20.0,
            hovering_box_height: 18.0,
            bar_width: 2.0,
            scrollbar_height: 12.0,
            tooltip_char_width: 6.5,
            label_font_size: 11.0,
            zoom_sensitivity: 0.1,
        }
    }
}

impl TrackConfig {
    /// Fix up values loaded from disk: no negative sizes, ordered zoom bounds.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let fix = |name: &str, value: &mut f32, fallback: f32| {
            if !value.is_finite() || *value < 0.0 {
                warn!("Track config: invalid {} ({}), using {}", name, value, fallback);
                *value = fallback;
            }
        };
        fix("min_frame_width", &mut self.min_frame_width, defaults.min_frame_width);
        fix("max_frame_width", &mut self.max_frame_width, defaults.max_frame_width);
        fix(
            "width_increment_per_digit",
            &mut self.width_increment_per_digit,
            defaults.width_increment_per_digit,
        );
        fix("box_height", &mut self.box_height, defaults.box_height);
        fix(
            "hovering_box_height",
            &mut self.hovering_box_height,
            defaults.hovering_box_height,
        );
        fix("bar_width", &mut self.bar_width, defaults.bar_width);
        fix("scrollbar_height", &mut self.scrollbar_height, defaults.scrollbar_height);
        fix(
            "tooltip_char_width",
            &mut self.tooltip_char_width,
            defaults.tooltip_char_width,
        );
        fix("label_font_size", &mut self.label_font_size, defaults.label_font_size);
        fix("zoom_sensitivity", &mut self.zoom_sensitivity, defaults.zoom_sensitivity);

        if self.min_frame_width > self.max_frame_width {
            warn!(
                "Track config: min_frame_width {} > max_frame_width {}, swapping",
                self.min_frame_width, self.max_frame_width
            );
            std::mem::swap(&mut self.min_frame_width, &mut self.max_frame_width);
        }
        self
    }

    pub fn clamp_zoom(&self, zoom_width: f32) -> f32 {
        zoom_width.clamp(self.min_frame_width, self.max_frame_width)
    }
}

/// Per-widget view state (persistent between passes)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackViewState {
    /// Base cell width before digit widening
    pub zoom_width: f32,
    /// Scroll container offset (content space)
    pub scroll_offset: Vec2,
    /// Frame under the last secondary click, for the context menu
    #[serde(skip)]
    pub context_frame: Option<i32>,
    /// Frame under the pointer in the last render
    #[serde(skip)]
    pub hovered_frame: Option<i32>,
}

impl Default for TrackViewState {
    fn default() -> Self {
        Self {
            zoom_width: TrackConfig::default().max_frame_width,
            scroll_offset: Vec2::ZERO,
            context_frame: None,
            hovered_frame: None,
        }
    }
}

/// Raw input forwarded by the host for one pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TrackInput {
    #[default]
    None,
    /// Wheel tick, positive = wheel down (zooms out)
    Scroll { vertical_delta: f32 },
}

/// Whether the pass paints or only measures/lays out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    Layout,
    Repaint,
}

impl PassKind {
    pub fn from_repaint(repaint: bool) -> Self {
        if repaint { PassKind::Repaint } else { PassKind::Layout }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Ignored,
    /// Input used by the widget; the host must not forward it further
    Consumed,
}

/// Outputs of one pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPass {
    /// Vertical extent the host reserves before drawing
    pub required_height: f32,
    /// Scrollable content width after zoom
    pub content_width: f32,
    pub input: InputResult,
}
