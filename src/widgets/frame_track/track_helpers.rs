//! Frame track helpers: layout math and the draw list.
//!
//! Everything here works in content space (origin at the strip's top-left,
//! before scrolling). The egui adapter translates to screen space when it
//! executes the draw list.

use eframe::egui::{Align2, Color32, FontId, Pos2, Rect, Vec2};
use std::ops::{Deref, DerefMut};

use super::TrackConfig;
use super::track::COLOR_INACTIVE;

/// Decimal digits of a frame number (0 has one digit)
pub fn digit_count(frame: i32) -> u32 {
    frame.unsigned_abs().checked_ilog10().map_or(1, |d| d + 1)
}

/// Width of one cell: base zoom width widened per label digit
pub fn frame_width(frame: i32, zoom_width: f32, config: &TrackConfig) -> f32 {
    zoom_width + digit_count(frame) as f32 * config.width_increment_per_digit
}

/// Sum of all cell widths for `total_frames` frames
pub fn total_width(total_frames: i32, zoom_width: f32, config: &TrackConfig) -> f32 {
    (0..total_frames.max(0))
        .map(|frame| frame_width(frame, zoom_width, config))
        .sum()
}

/// Height the host must reserve.
///
/// Box row, plus a scrollbar lane when content overflows the viewport, plus
/// one stacked tooltip block per label.
pub fn required_height(
    content_width: f32,
    viewport_width: f32,
    label_count: usize,
    config: &TrackConfig,
) -> f32 {
    let mut height = config.box_height;
    if content_width > viewport_width {
        height += config.scrollbar_height;
    }
    height + label_count as f32 * config.hovering_box_height
}

/// Laid-out geometry of one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCell {
    pub frame: i32,
    /// Whole cell (tick bar + box)
    pub rect: Rect,
    /// Tick bar flush-left inside the cell
    pub bar: Rect,
    /// Remaining width where the frame number is centered
    pub label_rect: Rect,
}

impl FrameCell {
    pub fn new(frame: i32, x: f32, row_y: f32, width: f32, config: &TrackConfig) -> Self {
        let rect = Rect::from_min_size(Pos2::new(x, row_y), Vec2::new(width, config.box_height));
        let bar_width = config.bar_width.min(width);
        let bar = Rect::from_min_size(rect.min, Vec2::new(bar_width, config.box_height));
        let label_rect = Rect::from_min_max(Pos2::new(rect.min.x + bar_width, rect.min.y), rect.max);
        Self {
            frame,
            rect,
            bar,
            label_rect,
        }
    }

    /// Rect of the `slot`-th tooltip block under this cell, centered on it
    pub fn tooltip_rect(&self, slot: usize, block_width: f32, config: &TrackConfig) -> Rect {
        let y = self.rect.max.y + slot as f32 * config.hovering_box_height;
        Rect::from_center_size(
            Pos2::new(self.rect.center().x, y + config.hovering_box_height * 0.5),
            Vec2::new(block_width, config.hovering_box_height),
        )
    }
}

/// Lay cells out left to right starting at x = 0
pub fn layout_cells(
    total_frames: i32,
    zoom_width: f32,
    row_y: f32,
    config: &TrackConfig,
    out: &mut Vec<FrameCell>,
) -> f32 {
    out.clear();
    let mut x_offset = 0.0;
    for frame in 0..total_frames.max(0) {
        let width = frame_width(frame, zoom_width, config);
        out.push(FrameCell::new(frame, x_offset, row_y, width, config));
        x_offset += width;
    }
    x_offset
}

/// Frame whose cell spans content-space `x`
pub fn frame_at(cells: &[FrameCell], x: f32) -> Option<i32> {
    let idx = cells.partition_point(|cell| cell.rect.max.x <= x);
    cells
        .get(idx)
        .filter(|cell| cell.rect.min.x <= x)
        .map(|cell| cell.frame)
}

/// One draw primitive for the host canvas
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Rect {
        rect: Rect,
        corner_radius: f32,
        fill: Color32,
    },
    Text {
        pos: Pos2,
        anchor: Align2,
        text: String,
        font: FontId,
        color: Color32,
    },
}

/// Draw commands for one pass plus the current box tint.
///
/// The tint is only changed through [`DrawList::push_tint`], whose guard puts
/// the previous tint back when dropped.
#[derive(Clone, Debug)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
    tint: Color32,
}

impl Default for DrawList {
    fn default() -> Self {
        Self {
            cmds: Vec::new(),
            tint: COLOR_INACTIVE,
        }
    }
}

impl DrawList {
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn tint(&self) -> Color32 {
        self.tint
    }

    pub fn rect_filled(&mut self, rect: Rect, corner_radius: f32, fill: Color32) {
        self.cmds.push(DrawCmd::Rect {
            rect,
            corner_radius,
            fill,
        });
    }

    /// Box filled with the current tint
    pub fn tinted_box(&mut self, rect: Rect, corner_radius: f32) {
        let fill = self.tint.gamma_multiply(0.35);
        self.rect_filled(rect, corner_radius, fill);
    }

    pub fn text(&mut self, pos: Pos2, anchor: Align2, text: impl Into<String>, font: FontId, color: Color32) {
        self.cmds.push(DrawCmd::Text {
            pos,
            anchor,
            text: text.into(),
            font,
            color,
        });
    }

    /// Override the box tint until the returned guard drops.
    pub fn push_tint(&mut self, tint: Color32) -> TintGuard<'_> {
        let previous = std::mem::replace(&mut self.tint, tint);
        TintGuard {
            list: self,
            previous,
        }
    }
}

/// Scoped tint override, restores the previous tint on drop
pub struct TintGuard<'a> {
    list: &'a mut DrawList,
    previous: Color32,
}

impl Deref for TintGuard<'_> {
    type Target = DrawList;

    fn deref(&self) -> &DrawList {
        self.list
    }
}

impl DerefMut for TintGuard<'_> {
    fn deref_mut(&mut self) -> &mut DrawList {
        self.list
    }
}

impl Drop for TintGuard<'_> {
    fn drop(&mut self) {
        self.list.tint = self.previous;
    }
}
