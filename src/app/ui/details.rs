use eframe::egui::{self, RichText, Ui};

use crate::map::similarity::{MAX_SIMILARITY_LINKS, top_similar};
use crate::map::{Entity, tag_color};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Builder");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Close").clicked() {
                    self.set_selected(None);
                }
            });
        });
        ui.add_space(6.0);

        let Some(profile) = self.selected_profile().cloned() else {
            ui.label("Select a builder on the map.");
            return;
        };
        let similar = self.similar_builders(&profile.id);
        let saved = self.saved.contains(&profile.id);

        ui.label(RichText::new(&profile.name).strong().size(18.0));
        if !profile.location.is_empty() {
            ui.label(profile.location.as_str());
        }
        ui.label(format!("Availability: {}", profile.availability.label()));
        if !profile.email.is_empty() {
            ui.small(profile.email.as_str());
        }
        if let Some(github_url) = &profile.github_url {
            ui.hyperlink(github_url);
        }

        ui.add_space(6.0);
        let save_label = if saved { "Unsave" } else { "Save" };
        if ui.button(save_label).clicked() {
            self.toggle_saved(&profile.id);
        }

        if !profile.bio.is_empty() {
            ui.separator();
            ui.label(profile.bio.as_str());
        }

        ui.separator();
        ui.label(RichText::new("Tech stack").strong());
        ui.horizontal_wrapped(|ui| {
            for tag in &profile.tech_stack {
                ui.label(RichText::new(tag).color(tag_color(tag)));
            }
        });

        ui.separator();
        ui.label(RichText::new(format!("Projects ({})", profile.projects.len())).strong());
        egui::ScrollArea::vertical()
            .id_salt("project_scroll")
            .max_height(320.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if profile.projects.is_empty() {
                    ui.label("No projects listed.");
                }
                for project in &profile.projects {
                    ui.label(RichText::new(&project.title).strong());
                    if !project.description.is_empty() {
                        ui.label(project.description.as_str());
                    }
                    if !project.impact.is_empty() {
                        ui.small(format!("Impact: {}", project.impact));
                    }
                    if !project.tech_stack.is_empty() {
                        ui.small(project.tech_stack.join(", "));
                    }
                    if let Some(github_url) = &project.github_url {
                        ui.hyperlink(github_url);
                    }
                    ui.add_space(6.0);
                }
            });

        if !similar.is_empty() {
            ui.separator();
            ui.label(RichText::new("Similar builders").strong());
            for (id, name, score) in similar {
                let label = format!("{name}  ({:.0}% overlap)", score * 100.0);
                if ui.link(label).clicked() {
                    self.set_selected(Some(id));
                }
            }
        }
    }

    /// Similarity over the whole roster, so filtered-out builders still show up.
    fn similar_builders(&self, id: &str) -> Vec<(String, String, f32)> {
        let entities = self
            .roster
            .iter()
            .map(|profile| profile.to_entity(false))
            .collect::<Vec<Entity>>();
        let Some(index) = entities.iter().position(|entity| entity.id == id) else {
            return Vec::new();
        };
        top_similar(&entities, index, MAX_SIMILARITY_LINKS)
            .into_iter()
            .filter_map(|link| {
                let entity = entities.get(link.target)?;
                Some((entity.id.clone(), entity.name.clone(), link.score))
            })
            .collect()
    }
}
