use eframe::egui::{self, RichText, Ui};

use crate::map::tag_color;
use crate::roster::{Availability, tag_counts};

use super::super::graph::ZOOM_STEP;
use super::super::{CameraCommand, ViewModel};

const TAG_LIST_HEIGHT: f32 = 260.0;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Talent Filters");
        ui.separator();
        ui.add_space(4.0);

        let mut changed = false;

        ui.label("Search (name or tech)")
            .on_hover_text("Ring matching builders without changing the layout.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Fuzzy match against names and tech stacks.");

        ui.separator();
        ui.label(RichText::new("Availability").strong());
        for availability in Availability::LISTED {
            let mut checked = self.filter.availability.contains(&availability);
            if ui.checkbox(&mut checked, availability.label()).changed() {
                self.filter.toggle_availability(availability);
                changed = true;
            }
        }

        ui.separator();
        ui.label(RichText::new("Tech stack").strong());
        let counts = tag_counts(&self.roster);
        egui::ScrollArea::vertical()
            .id_salt("tech_stack_filters")
            .max_height(TAG_LIST_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (tag, count) in &counts {
                    let mut checked = self.filter.tags.contains(tag);
                    let label = RichText::new(format!("{tag} ({count})")).color(tag_color(tag));
                    if ui.checkbox(&mut checked, label).changed() {
                        self.filter.toggle_tag(tag);
                        changed = true;
                    }
                }
            });

        ui.add_space(4.0);
        if ui
            .add_enabled(self.filter.is_active(), egui::Button::new("Reset filters"))
            .clicked()
        {
            self.filter.reset();
            changed = true;
        }

        ui.separator();
        ui.label(RichText::new("Layout").strong());
        let mut frozen = self.frozen;
        if ui
            .checkbox(&mut frozen, "Freeze layout")
            .on_hover_text("Stop the simulation. Dragged builders still follow the pointer.")
            .changed()
        {
            self.set_frozen(frozen);
        }
        if ui
            .checkbox(&mut self.filter.show_all, "Show all builders")
            .on_hover_text("Lift the top-by-signal cap.")
            .changed()
        {
            changed = true;
        }

        ui.horizontal(|ui| {
            if ui.button("Zoom in").clicked() {
                self.request_camera(CameraCommand::ZoomBy(ZOOM_STEP));
            }
            if ui.button("Zoom out").clicked() {
                self.request_camera(CameraCommand::ZoomBy(1.0 / ZOOM_STEP));
            }
            if ui.button("Fit").clicked() {
                self.request_camera(CameraCommand::Fit);
            }
        });

        ui.add_space(8.0);
        ui.small("Scroll to zoom, drag the canvas to pan, drag a builder to pin it.");
        ui.small("Click a cluster halo to isolate it, click empty space to clear.");

        if changed {
            self.mark_map_dirty();
        }
    }
}
