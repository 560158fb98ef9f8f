use std::collections::BTreeSet;
use std::sync::mpsc;

use eframe::egui::{self, Align, Context, Layout, RichText};
use tracing::{debug, info};

use crate::map::{Entity, MapCallbacks};
use crate::roster::{Profile, RosterFilter, TOP_LIMIT};

use super::super::{StartupSettings, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(roster: Vec<Profile>, settings: &StartupSettings) -> Self {
        let (selection_tx, selection_rx) = mpsc::channel();
        Self {
            roster,
            filter: RosterFilter {
                show_all: settings.show_all,
                ..RosterFilter::default()
            },
            search: String::new(),
            saved: settings.saved.iter().cloned().collect::<BTreeSet<_>>(),
            selected: None,
            frozen: settings.frozen,
            map: None,
            map_dirty: true,
            roster_revision: 0,
            visible_count: 0,
            node_drag_active: false,
            pointer_inside: false,
            pending_camera: None,
            selection_tx,
            selection_rx,
            search_match_cache: None,
        }
    }

    pub(in crate::app) fn replace_roster(&mut self, roster: Vec<Profile>) {
        info!(profiles = roster.len(), "roster reloaded");
        self.roster = roster;
        if self
            .selected
            .as_ref()
            .is_some_and(|id| !self.roster.iter().any(|profile| &profile.id == id))
        {
            self.selected = None;
        }
        self.mark_map_dirty();
    }

    pub(in crate::app) fn mark_map_dirty(&mut self) {
        self.map_dirty = true;
        self.roster_revision = self.roster_revision.wrapping_add(1);
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        roster_label: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("TalentMap");
                    ui.separator();
                    ui.label(format!("roster: {roster_label}"));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload roster"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let freeze_label = if self.frozen {
                            "Resume layout"
                        } else {
                            "Freeze layout"
                        };
                        if ui.button(freeze_label).clicked() {
                            self.set_frozen(!self.frozen);
                        }

                        let show_all_label = if self.filter.show_all {
                            "Showing all builders".to_owned()
                        } else {
                            format!("Top {TOP_LIMIT} by signal")
                        };
                        if ui
                            .selectable_label(self.filter.show_all, show_all_label)
                            .clicked()
                        {
                            self.filter.show_all = !self.filter.show_all;
                            self.mark_map_dirty();
                        }

                        ui.label(
                            RichText::new(format!("{} builders", self.visible_count)).strong(),
                        );
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        if self.selected.is_some() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(380.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading talent roster...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_map(ui);
            }
        });

        self.drain_selection();
    }

    pub(in crate::app) fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
        if let Some(map) = self.map.as_mut() {
            map.set_frozen(frozen);
        }
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        debug!(selected = ?selected, "selection changed");
        self.selected = selected;
        if let Some(map) = self.map.as_mut() {
            map.set_selected(self.selected.clone());
        }
    }

    pub(in crate::app) fn toggle_saved(&mut self, id: &str) {
        if !self.saved.remove(id) {
            self.saved.insert(id.to_owned());
        }
        if let Some(map) = self.map.as_mut() {
            map.set_highlighted(self.saved.iter().cloned().collect());
        }
    }

    pub(in crate::app) fn visible_entities(&self) -> Vec<Entity> {
        self.filter
            .apply(&self.roster)
            .into_iter()
            .map(|profile| profile.to_entity(self.saved.contains(&profile.id)))
            .collect()
    }

    pub(in crate::app) fn selection_callbacks(&self) -> MapCallbacks {
        let selection_tx = self.selection_tx.clone();
        MapCallbacks {
            on_node_selected: Some(Box::new(move |entity: &Entity| {
                let _ = selection_tx.send(entity.id.clone());
            })),
        }
    }

    fn drain_selection(&mut self) {
        let mut latest = None;
        while let Ok(id) = self.selection_rx.try_recv() {
            latest = Some(id);
        }
        if let Some(id) = latest {
            self.set_selected(Some(id));
        }
    }

    pub(in crate::app) fn selected_profile(&self) -> Option<&Profile> {
        let selected = self.selected.as_deref()?;
        self.roster.iter().find(|profile| profile.id == selected)
    }
}
