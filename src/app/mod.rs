use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};

use crate::map::TalentMap;
use crate::roster::{Profile, RosterFilter, load_roster};

mod graph;
mod render_utils;
mod ui;

/// Startup choices taken from the command line.
#[derive(Clone, Debug, Default)]
pub struct StartupSettings {
    pub frozen: bool,
    pub show_all: bool,
    pub saved: Vec<String>,
}

pub struct TalentMapApp {
    roster_path: Option<PathBuf>,
    settings: StartupSettings,
    state: AppState,
    reload_rx: Option<Receiver<Result<Vec<Profile>, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Vec<Profile>, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    roster: Vec<Profile>,
    filter: RosterFilter,
    search: String,
    saved: BTreeSet<String>,
    selected: Option<String>,
    frozen: bool,
    map: Option<TalentMap>,
    map_dirty: bool,
    roster_revision: u64,
    visible_count: usize,
    node_drag_active: bool,
    pointer_inside: bool,
    pending_camera: Option<CameraCommand>,
    selection_tx: Sender<String>,
    selection_rx: Receiver<String>,
    search_match_cache: Option<SearchMatchCache>,
}

struct SearchMatchCache {
    query: String,
    roster_revision: u64,
    matches: Arc<HashSet<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum CameraCommand {
    ZoomBy(f32),
    Fit,
}

impl TalentMapApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        roster_path: Option<PathBuf>,
        settings: StartupSettings,
    ) -> Self {
        let state = Self::start_load(roster_path.clone());
        Self {
            roster_path,
            settings,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(roster_path: Option<PathBuf>) -> Receiver<Result<Vec<Profile>, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_roster(roster_path.as_deref()).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(roster_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(roster_path),
        }
    }

    fn roster_label(&self) -> String {
        self.roster_path
            .as_ref()
            .map_or_else(|| "built-in demo roster".to_owned(), |path| path.display().to_string())
    }
}

impl eframe::App for TalentMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let roster_label = self.roster_label();

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(roster) => {
                            AppState::Ready(Box::new(ViewModel::new(roster, &self.settings)))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading talent roster...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the talent roster");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.roster_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &roster_label, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.roster_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(roster)) => model.replace_roster(roster),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background roster loader disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
