use crossbeam_channel::{Receiver, Sender};
use shared::domain::MarkerKind;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{classify_fetch_failure, ControllerEvent, UiErrorCategory, UiErrorContext, UiEvent},
    orchestration::dispatch_effect,
    reducer::{reduce, ControllerState},
};
use crate::ui::map_view::MapView;

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Service => "Service",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

/// Status line for a path query outcome, or `None` when the reducer is going
/// to drop the event as stale.
fn outcome_status(state: &ControllerState, event: &ControllerEvent) -> Option<String> {
    match event {
        ControllerEvent::PathsLoaded { request_id, routes }
            if state.in_flight() == Some(*request_id) =>
        {
            Some(match routes.len() {
                0 => "No paths found between the selected points".to_string(),
                1 => "Found 1 path".to_string(),
                n => format!("Found {n} paths"),
            })
        }
        ControllerEvent::PathsFailed { request_id, error }
            if state.in_flight() == Some(*request_id) =>
        {
            Some(classify_fetch_failure(error))
        }
        ControllerEvent::ClearMarkers => Some("Markers cleared".to_string()),
        _ => None,
    }
}

pub struct PathFinderApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    controller: ControllerState,
    map: MapView,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl PathFinderApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        map: MapView,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            controller: ControllerState::default(),
            map,
            status: "Starting...".to_string(),
            status_banner: None,
        }
    }

    /// Runs an event through the reducer and carries out the resulting
    /// effect. A failure to queue the effect is fed back in as an event.
    fn apply(&mut self, event: ControllerEvent) {
        let mut pending = Some(event);
        while let Some(event) = pending.take() {
            let outcome = outcome_status(&self.controller, &event);
            let effect = reduce(&mut self.controller, event);
            if let Some(message) = outcome {
                self.status = message;
            }
            if let Some(effect) = effect {
                pending = dispatch_effect(&self.cmd_tx, effect, &mut self.status);
            }
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    if err.context() == UiErrorContext::BackendStartup {
                        self.status_banner = Some(StatusBanner {
                            message: format!(
                                "The backend worker could not start: {}",
                                err.message()
                            ),
                        });
                    }
                }
                UiEvent::PathsLoaded { request_id, routes } => {
                    self.apply(ControllerEvent::PathsLoaded { request_id, routes });
                }
                UiEvent::PathsFailed { request_id, error } => {
                    self.apply(ControllerEvent::PathsFailed { request_id, error });
                }
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) -> Vec<ControllerEvent> {
        let mut events = Vec::new();

        ui.horizontal_wrapped(|ui| {
            for (field, hint) in [
                (MarkerKind::Origin, "Enter origin (lat,lng)"),
                (MarkerKind::Destination, "Enter destination (lat,lng)"),
            ] {
                let mut text = self.controller.draft().text(field).to_string();
                let edit = egui::TextEdit::singleline(&mut text)
                    .hint_text(hint)
                    .desired_width(200.0);
                if ui.add(edit).changed() {
                    events.push(ControllerEvent::DraftEdited { field, text });
                }
            }

            if ui.button("Set Coordinates").clicked() {
                events.push(ControllerEvent::SetCoordinates);
            }
            if ui.button("Clear Markers").clicked() {
                events.push(ControllerEvent::ClearMarkers);
            }
            if ui
                .add_enabled(self.controller.can_find_paths(), egui::Button::new("Find Paths"))
                .clicked()
            {
                events.push(ControllerEvent::FindPaths);
            }
            if self.controller.in_flight().is_some() {
                ui.spinner();
            }
        });

        events
    }
}

impl eframe::App for PathFinderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut events = Vec::new();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading("Path Finder");
            events.extend(self.show_controls(ui));
            self.show_status_banner(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let status = ui.label(self.status.as_str());
                if let Some(failure) = self.controller.last_failure() {
                    status.on_hover_text(failure.message());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let center = self.map.center();
                    ui.weak(format!(
                        "{:.4},{:.4}  z{:.0}",
                        center.lat,
                        center.lng,
                        self.map.zoom()
                    ));
                });
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                events.extend(self.map.show(
                    ui,
                    self.controller.endpoints(),
                    self.controller.routes(),
                ));
            });

        for event in events {
            self.apply(event);
        }

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
