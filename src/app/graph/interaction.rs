use eframe::egui::{self, CursorIcon, PointerButton, Rect, Ui};

use crate::map::Hit;

use super::super::{CameraCommand, ViewModel};
use super::view::to_canvas;

pub(in crate::app) const ZOOM_STEP: f32 = 1.25;

impl ViewModel {
    pub(in crate::app) fn handle_map_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        if let Some(map) = self.map.as_mut() {
            map.zoom_at(to_canvas(rect, pointer), zoom_factor);
        }
    }

    /// Primary drags move a node when they start on one and pan otherwise.
    /// Secondary and middle drags always pan.
    pub(in crate::app) fn handle_map_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let Some(map) = self.map.as_mut() else {
            return;
        };

        if response.drag_started_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.node_drag_active = map.drag_start(to_canvas(rect, pointer));
        }

        if response.dragged_by(PointerButton::Primary) {
            if self.node_drag_active {
                if let Some(pointer) = response.interact_pointer_pos() {
                    map.drag_move(to_canvas(rect, pointer));
                }
            } else {
                map.pan_by(response.drag_delta());
            }
        }

        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            map.pan_by(response.drag_delta());
        }

        if response.drag_stopped() && self.node_drag_active {
            map.drag_end();
            self.node_drag_active = false;
        }

        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            map.click(to_canvas(rect, pointer));
        }

        match response.hover_pos() {
            Some(pointer) => {
                let local = to_canvas(rect, pointer);
                map.pointer_moved(local);
                self.pointer_inside = true;
                if self.node_drag_active {
                    ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
                } else if matches!(map.hit_test(local), Hit::Node(_)) {
                    ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
                }
            }
            None if self.pointer_inside => {
                map.pointer_left();
                self.pointer_inside = false;
            }
            None => {}
        }
    }

    pub(in crate::app) fn request_camera(&mut self, command: CameraCommand) {
        self.pending_camera = Some(command);
    }
}
