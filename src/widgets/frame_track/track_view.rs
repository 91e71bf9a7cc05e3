//! Frame track engine - one instance per displayed track.
//!
//! A pass runs, in order:
//! 1. sync the render cache with the model (full rebuild when the frame count
//!    or the model revision changed)
//! 2. measure content width and the height to reserve
//! 3. apply zoom input (clamped, consumed)
//! 4. lay out cells and emit box/bar/label commands
//! 5. on repaint passes only, emit stacked tooltip blocks under active frames
//!
//! Commands are only emitted for cells and tooltip blocks that overlap the
//! visible window `scroll_offset.x .. scroll_offset.x + viewport_width`.
//!
//! A frame counts as active when the cache holds a record for it, even an
//! emptied one (left behind by `remove_event_text`): such a frame keeps the
//! active tint but gets no tooltip blocks.

use eframe::egui::{Align2, FontId, Pos2, Rangef, Rect};
use log::{debug, trace};

use super::track::{
    COLOR_ACTIVE, COLOR_INACTIVE, COLOR_LABEL, COLOR_TOOLTIP_BG, COLOR_TOOLTIP_TEXT,
    EMPTY_EVENT_MESSAGE, InputResult, PassKind, TrackConfig, TrackInput, TrackPass,
    TrackViewState,
};
use super::track_helpers::{
    DrawList, FrameCell, frame_at, layout_cells, required_height, total_width,
};
use crate::entities::FrameTrack;

/// Per-frame snapshot of the model, taken when its shape changes
#[derive(Clone, Debug, Default)]
pub struct RenderCache {
    /// Index = frame, `Some` = frame has a record
    labels: Vec<Option<Vec<String>>>,
    revision: Option<u64>,
}

impl RenderCache {
    fn is_stale(&self, track: &FrameTrack) -> bool {
        self.labels.len() != track.total_frames().max(0) as usize
            || self.revision != Some(track.revision())
    }

    fn rebuild(&mut self, track: &FrameTrack) {
        let total = track.total_frames().max(0);
        self.labels.clear();
        self.labels.resize(total as usize, None);
        // Out-of-range records (pending revalidation) have no slot and are skipped
        for (frame, labels) in track.iter() {
            if let Some(slot) = usize::try_from(frame)
                .ok()
                .and_then(|idx| self.labels.get_mut(idx))
            {
                *slot = Some(labels.to_vec());
            }
        }
        self.revision = Some(track.revision());
    }

    pub fn frame_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_active(&self, frame: i32) -> bool {
        self.record(frame).is_some()
    }

    /// Labels for a frame, `None` when it has no record
    pub fn record(&self, frame: i32) -> Option<&[String]> {
        usize::try_from(frame)
            .ok()
            .and_then(|idx| self.labels.get(idx))
            .and_then(|slot| slot.as_deref())
    }

    /// Labels across all cached frames
    pub fn label_count(&self) -> usize {
        self.labels.iter().flatten().map(Vec::len).sum()
    }
}

/// Visible content-space x range; the offset is clamped the way the scroll
/// area will clamp it, so a stale offset after zooming out still draws.
fn visible_window(scroll_x: f32, viewport_width: f32, content_width: f32) -> Rangef {
    let max_offset = (content_width - viewport_width).max(0.0);
    let start = if scroll_x.is_finite() {
        scroll_x.clamp(0.0, max_offset)
    } else {
        0.0
    };
    Rangef::new(start, start + viewport_width.max(0.0))
}

fn overlaps(rect: &Rect, window: Rangef) -> bool {
    rect.max.x > window.min && rect.min.x < window.max
}

/// Layout & render engine for one frame track widget
#[derive(Clone, Debug, Default)]
pub struct FrameTrackView {
    cache: RenderCache,
    cells: Vec<FrameCell>,
    draw_list: DrawList,
    rebuilds: usize,
}

impl FrameTrackView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the render cache if the model changed shape
    pub fn sync(&mut self, track: &FrameTrack) -> bool {
        if !self.cache.is_stale(track) {
            return false;
        }
        self.cache.rebuild(track);
        self.rebuilds += 1;
        debug!(
            "Frame track cache rebuilt: {} frames, {} labels",
            self.cache.frame_count(),
            self.cache.label_count()
        );
        true
    }

    /// Sync and return the height to reserve for `viewport_width`
    pub fn measure(
        &mut self,
        track: &FrameTrack,
        config: &TrackConfig,
        state: &TrackViewState,
        viewport_width: f32,
    ) -> f32 {
        self.sync(track);
        let content_width = total_width(track.total_frames(), state.zoom_width, config);
        required_height(content_width, viewport_width, self.cache.label_count(), config)
    }

    /// Apply one input event to the view state
    pub fn handle_input(
        &self,
        input: TrackInput,
        config: &TrackConfig,
        state: &mut TrackViewState,
    ) -> InputResult {
        match input {
            TrackInput::Scroll { vertical_delta } if vertical_delta.is_finite() => {
                state.zoom_width = config.clamp_zoom(state.zoom_width - vertical_delta);
                trace!("Frame track zoom width: {}", state.zoom_width);
                InputResult::Consumed
            }
            TrackInput::Scroll { .. } | TrackInput::None => InputResult::Ignored,
        }
    }

    /// Run one full pass; draw commands are available from `draw_list()`.
    pub fn pass(
        &mut self,
        track: &FrameTrack,
        config: &TrackConfig,
        state: &mut TrackViewState,
        input: TrackInput,
        kind: PassKind,
        viewport_width: f32,
    ) -> TrackPass {
        let height = self.measure(track, config, state, viewport_width);
        let input = self.handle_input(input, config, state);

        self.draw_list.clear();
        let content_width = layout_cells(
            track.total_frames(),
            state.zoom_width,
            0.0,
            config,
            &mut self.cells,
        );
        let window = visible_window(state.scroll_offset.x, viewport_width, content_width);
        self.draw_cells(config, window);
        if kind == PassKind::Repaint {
            self.draw_tooltips(config, window);
        }

        TrackPass {
            required_height: height,
            content_width,
            input,
        }
    }

    fn draw_cells(&mut self, config: &TrackConfig, window: Rangef) {
        let font = FontId::proportional(config.label_font_size);
        for cell in &self.cells {
            if !overlaps(&cell.rect, window) {
                continue;
            }
            let color = if self.cache.is_active(cell.frame) {
                COLOR_ACTIVE
            } else {
                COLOR_INACTIVE
            };

            self.draw_list.rect_filled(cell.bar, 0.0, color);

            let mut tinted = self.draw_list.push_tint(color);
            tinted.tinted_box(cell.label_rect, 2.0);
            tinted.text(
                cell.label_rect.center(),
                Align2::CENTER_CENTER,
                cell.frame.to_string(),
                font.clone(),
                COLOR_LABEL,
            );
        }
    }

    fn draw_tooltips(&mut self, config: &TrackConfig, window: Rangef) {
        let font = FontId::proportional(config.label_font_size);
        for cell in &self.cells {
            let Some(labels) = self.cache.record(cell.frame) else {
                continue;
            };
            for (slot, label) in labels.iter().enumerate() {
                let text_width = label.chars().count() as f32 * config.tooltip_char_width;
                let block_width = (text_width + 8.0).max(cell.rect.width());
                let block = cell.tooltip_rect(slot, block_width, config);
                if !overlaps(&block, window) {
                    continue;
                }
                self.draw_list.rect_filled(block.shrink2([0.0, 1.0].into()), 3.0, COLOR_TOOLTIP_BG);
                self.draw_list.text(
                    block.center(),
                    Align2::CENTER_CENTER,
                    label.as_str(),
                    font.clone(),
                    COLOR_TOOLTIP_TEXT,
                );
            }
        }
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    /// Cells of the last pass
    pub fn cells(&self) -> &[FrameCell] {
        &self.cells
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Number of cache rebuilds so far
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Frame under content-space `x` in the last pass
    pub fn frame_at(&self, x: f32) -> Option<i32> {
        frame_at(&self.cells, x)
    }

    /// Hover text for a frame: its labels one per line, or "Empty"
    pub fn hover_text(&self, frame: i32) -> String {
        match self.cache.record(frame) {
            Some(labels) if !labels.is_empty() => labels.join("\n"),
            _ => EMPTY_EVENT_MESSAGE.to_string(),
        }
    }

    /// Content-space position of a cell's label center
    pub fn label_pos(&self, frame: i32) -> Option<Pos2> {
        usize::try_from(frame)
            .ok()
            .and_then(|idx| self.cells.get(idx))
            .map(|cell| cell.label_rect.center())
    }
}
