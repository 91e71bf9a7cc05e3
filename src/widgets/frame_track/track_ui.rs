//! Frame track - egui rendering.
//!
//! Reserves the height the engine asks for, shows the strip inside a
//! horizontal `ScrollArea` whose offset lives in `TrackViewState`, and executes
//! the engine's draw list with the painter.
//!
//! # Interactions
//!
//! - **Wheel over the strip**: zoom. The wheel delta is zeroed afterwards so
//!   the scroll area (and any parent) doesn't also scroll on the same tick.
//! - **Hover**: tooltip with the frame's labels, or "Empty".
//! - **Right-click**: context menu removing one of the frame's labels.
//!
//! The model is never touched here; removals go out through `dispatch`.

use eframe::egui::{self, Color32, Sense, Ui, Vec2};

use super::track::{COLOR_TRACK_BG, InputResult, PassKind, TrackConfig, TrackInput, TrackViewState};
use super::track_events::{TrackHoveredFrameEvent, TrackZoomChangedEvent};
use super::track_helpers::{DrawCmd, DrawList};
use super::track_view::FrameTrackView;
use crate::core::event_bus::BoxedEvent;
use crate::entities::FrameTrack;
use crate::entities::track_events::RemoveEventTextEvent;

/// What happened during one render call
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackResponse {
    pub hovered_frame: Option<i32>,
    pub zoom_changed: bool,
    pub required_height: f32,
    pub content_width: f32,
}

/// Render the frame track into the remaining width of `ui`.
pub fn render_frame_track(
    ui: &mut Ui,
    track: &FrameTrack,
    config: &TrackConfig,
    view: &mut FrameTrackView,
    state: &mut TrackViewState,
    mut dispatch: impl FnMut(BoxedEvent),
) -> TrackResponse {
    let viewport_width = ui.available_width();
    let required_height = view.measure(track, config, state, viewport_width);

    let (rect, _) = ui.allocate_exact_size(Vec2::new(viewport_width, required_height), Sense::hover());

    // Wheel zoom only while the pointer is over the strip
    let mut input = TrackInput::None;
    if ui.rect_contains_pointer(rect) {
        let wheel = ui.input(|i| i.raw_scroll_delta.y);
        if wheel != 0.0 {
            // egui wheel-down is negative; the engine expects positive = down
            input = TrackInput::Scroll {
                vertical_delta: -wheel * config.zoom_sensitivity,
            };
        }
    }

    let kind = PassKind::from_repaint(ui.is_rect_visible(rect));
    let pass = view.pass(track, config, state, input, kind, viewport_width);

    let zoom_changed = pass.input == InputResult::Consumed;
    if zoom_changed {
        ui.ctx().input_mut(|i| {
            i.raw_scroll_delta = Vec2::ZERO;
            i.smooth_scroll_delta = Vec2::ZERO;
        });
        dispatch(Box::new(TrackZoomChangedEvent(state.zoom_width)));
    }

    if kind == PassKind::Repaint {
        let painter = ui.painter();
        painter.rect_filled(rect, 2.0, COLOR_TRACK_BG);
        painter.rect_stroke(
            rect,
            2.0,
            egui::Stroke::new(1.0, Color32::from_gray(60)),
            egui::epaint::StrokeKind::Inside,
        );
    }

    let mut hovered_frame = None;
    let mut strip_ui = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(rect)
            .layout(egui::Layout::top_down(egui::Align::Min))
            .id_salt("frame_track_strip"),
    );

    let output = egui::ScrollArea::horizontal()
        .id_salt("frame_track_scroll")
        .auto_shrink([false, false])
        .scroll_offset(state.scroll_offset)
        .show(&mut strip_ui, |ui| {
            // Cell row plus the tooltip stack; the scrollbar lane (if any) is extra
            let content_height = config.box_height
                + view.cache().label_count() as f32 * config.hovering_box_height;
            let (response, painter) = ui.allocate_painter(
                Vec2::new(pass.content_width, content_height),
                Sense::click(),
            );
            let origin = response.rect.min.to_vec2();

            if kind == PassKind::Repaint {
                paint_draw_list(&painter, view.draw_list(), origin);
            }

            // Hover only counts on the cell row, not over the tooltip stack
            if let Some(pos) = response.hover_pos() {
                let local = pos - origin;
                if local.y <= config.box_height {
                    hovered_frame = view.frame_at(local.x);
                }
            }

            if response.secondary_clicked() {
                state.context_frame = response
                    .interact_pointer_pos()
                    .and_then(|pos| view.frame_at((pos - origin).x));
            }

            let response = match hovered_frame {
                Some(frame) => response.on_hover_text_at_pointer(view.hover_text(frame)),
                None => response,
            };

            let context_frame = state.context_frame;
            response.context_menu(|ui| {
                let Some(frame) = context_frame else {
                    ui.label("No frame");
                    return;
                };
                ui.label(format!("Frame {}", frame));
                ui.separator();
                let labels = track.events_at(frame);
                if labels.is_empty() {
                    ui.weak("No events");
                }
                for label in labels {
                    if ui.button(format!("Remove \"{}\"", label)).clicked() {
                        dispatch(Box::new(RemoveEventTextEvent {
                            frame_index: frame,
                            text: label.clone(),
                        }));
                        ui.close();
                    }
                }
            });
        });
    state.scroll_offset = output.state.offset;

    if state.hovered_frame != hovered_frame {
        log::trace!("Frame track hover: {:?}", hovered_frame);
        state.hovered_frame = hovered_frame;
        dispatch(Box::new(TrackHoveredFrameEvent(hovered_frame)));
    }

    TrackResponse {
        hovered_frame,
        zoom_changed,
        required_height: pass.required_height,
        content_width: pass.content_width,
    }
}

/// Execute draw commands, translating content space by `origin`
pub fn paint_draw_list(painter: &egui::Painter, list: &DrawList, origin: Vec2) {
    for cmd in list.cmds() {
        match cmd {
            DrawCmd::Rect {
                rect,
                corner_radius,
                fill,
            } => {
                painter.rect_filled(rect.translate(origin), *corner_radius, *fill);
            }
            DrawCmd::Text {
                pos,
                anchor,
                text,
                font,
                color,
            } => {
                painter.text(*pos + origin, *anchor, text, font.clone(), *color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::downcast_event;
    use crate::entities::FrameEvent;
    use eframe::egui::{Event, Modifiers, MouseWheelUnit, Pos2, RawInput, Rect, epaint::Shape};

    /// Headless host: one track inside a central panel
    struct Harness {
        ctx: egui::Context,
        track: FrameTrack,
        config: TrackConfig,
        view: FrameTrackView,
        state: TrackViewState,
        dispatched: Vec<BoxedEvent>,
        /// Top-left of the strip on screen, from the last frame
        origin: Pos2,
    }

    impl Harness {
        fn new(track: FrameTrack) -> Self {
            Self {
                ctx: egui::Context::default(),
                track,
                config: TrackConfig::default(),
                view: FrameTrackView::new(),
                state: TrackViewState::default(),
                dispatched: Vec::new(),
                origin: Pos2::ZERO,
            }
        }

        fn frame(&mut self, events: Vec<Event>) -> (TrackResponse, egui::FullOutput) {
            let input = RawInput {
                screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 400.0))),
                events,
                ..Default::default()
            };
            let mut response = TrackResponse::default();
            let output = self.ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.origin = ui.available_rect_before_wrap().min;
                    response = render_frame_track(
                        ui,
                        &self.track,
                        &self.config,
                        &mut self.view,
                        &mut self.state,
                        |event| self.dispatched.push(event),
                    );
                });
            });
            (response, output)
        }

        /// Screen position of a frame's label center
        fn frame_pos(&self, frame: i32) -> Pos2 {
            let local = self.view.label_pos(frame).unwrap_or_default();
            self.origin + local.to_vec2() - self.state.scroll_offset
        }
    }

    fn wheel(delta_y: f32) -> Event {
        Event::MouseWheel {
            unit: MouseWheelUnit::Point,
            delta: Vec2::new(0.0, delta_y),
            modifiers: Modifiers::NONE,
        }
    }

    fn click(pos: Pos2, button: egui::PointerButton, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    /// (text bounds, clip rect) of every painted text shape with this text
    fn painted_text(output: &egui::FullOutput, text: &str) -> Vec<(Rect, Rect)> {
        output
            .shapes
            .iter()
            .filter_map(|clipped| match &clipped.shape {
                Shape::Text(shape) if shape.galley.text() == text => {
                    Some((clipped.shape.visual_bounding_rect(), clipped.clip_rect))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tooltip_stack_fits_inside_clip() {
        let track = FrameTrack::new(
            5,
            Some(vec![FrameEvent {
                frame_index: 1,
                labels: vec!["alpha".into(), "bravo".into()],
            }]),
        );
        let mut h = Harness::new(track);
        let (response, output) = h.frame(Vec::new());

        // Content fits: no scrollbar lane in the reserved height
        assert!(response.content_width < 1000.0);
        let config = TrackConfig::default();
        assert_eq!(
            response.required_height,
            config.box_height + 2.0 * config.hovering_box_height
        );

        for label in ["alpha", "bravo"] {
            let painted = painted_text(&output, label);
            assert_eq!(painted.len(), 1, "{label} painted once");
            let (bounds, clip) = painted[0];
            assert!(clip.contains_rect(bounds), "{label}: {bounds:?} outside {clip:?}");
        }
    }

    #[test]
    fn test_wheel_zooms_without_scrolling() {
        let mut h = Harness::new(FrameTrack::empty(100));
        h.state.zoom_width = 30.0;
        h.frame(Vec::new());
        let over_strip = h.frame_pos(1);
        h.frame(vec![Event::PointerMoved(over_strip)]);
        h.dispatched.clear();

        // Wheel down narrows the cells
        let (response, _) = h.frame(vec![wheel(-5.0)]);
        assert!(response.zoom_changed);
        assert_eq!(h.state.zoom_width, 29.5);
        assert_eq!(h.state.scroll_offset, Vec2::ZERO);
        assert!(h.dispatched.iter().any(|e| {
            downcast_event::<TrackZoomChangedEvent>(e).map(|z| z.0) == Some(29.5)
        }));

        // Later frames don't pick up a leftover scroll either
        for _ in 0..5 {
            h.frame(Vec::new());
        }
        assert_eq!(h.state.scroll_offset, Vec2::ZERO);
    }

    #[test]
    fn test_wheel_outside_strip_is_ignored() {
        let mut h = Harness::new(FrameTrack::empty(100));
        h.frame(vec![Event::PointerMoved(Pos2::new(500.0, 390.0))]);
        let (response, _) = h.frame(vec![wheel(-5.0)]);
        assert!(!response.zoom_changed);
        assert_eq!(h.state.zoom_width, TrackConfig::default().max_frame_width);
    }

    #[test]
    fn test_hover_and_context_frame_hit_testing() {
        let track = FrameTrack::new(20, Some(vec![FrameEvent::new(2, "Mark3")]));
        let mut h = Harness::new(track);
        h.frame(Vec::new());

        let pos = h.frame_pos(2);
        h.frame(vec![Event::PointerMoved(pos)]);
        let (response, _) = h.frame(Vec::new());
        assert_eq!(response.hovered_frame, Some(2));
        assert_eq!(h.state.hovered_frame, Some(2));
        assert!(h.dispatched.iter().any(|e| {
            downcast_event::<TrackHoveredFrameEvent>(e).map(|ev| ev.0) == Some(Some(2))
        }));

        let pos = h.frame_pos(4);
        h.frame(vec![Event::PointerMoved(pos)]);
        h.frame(vec![click(pos, egui::PointerButton::Secondary, true)]);
        h.frame(vec![click(pos, egui::PointerButton::Secondary, false)]);
        assert_eq!(h.state.context_frame, Some(4));
    }
}
