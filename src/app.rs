//! Application shell: project file list, view controls, and the one or two
//! live scene panes. All algorithmic content lives in the core modules;
//! this is glue in the thinnest sense.

use std::time::{SystemTime, UNIX_EPOCH};

use eframe::egui;
use egui::{RichText, Ui, Vec2};
use log::{info, warn};
use rand::Rng;

use crate::layout::{NetworkLayout, PanePosition, Theme, ViewMode};
use crate::model::{layer_info, NetworkFile, NetworkModel};
use crate::parser;
use crate::scene::{HoveredConnection, Scene, SceneKey};
use crate::summary::ComparisonSummary;

pub struct WeightScopeApp {
    files: Vec<NetworkFile>,
    selected: Option<usize>,
    comparison: Option<usize>,
    show_differences: bool,
    mode: ViewMode,
    theme: Theme,
    status: String,
    load_path: String,
    next_file_id: usize,

    // Scenes are disposable: a key mismatch drops and rebuilds them.
    base_scene: Option<(SceneKey, Scene)>,
    comparison_scene: Option<(SceneKey, Scene)>,
    hovered: Option<HoveredConnection>,
    summary: Option<(String, String, ComparisonSummary)>,
}

impl Default for WeightScopeApp {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            selected: None,
            comparison: None,
            show_differences: false,
            mode: ViewMode::Color,
            theme: Theme::Dark,
            status: "Load a weight file to begin".into(),
            load_path: String::new(),
            next_file_id: 0,
            base_scene: None,
            comparison_scene: None,
            hovered: None,
            summary: None,
        }
    }
}

impl WeightScopeApp {
    fn add_file(&mut self, filename: String, is_adversarial: bool, model: NetworkModel) {
        let uploaded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs().to_string())
            .ok();
        let id = format!("file-{}", self.next_file_id);
        self.next_file_id += 1;
        info!(
            "added {filename}: {} neurons, layers {}",
            model.total_neurons.unwrap_or(0),
            model.layers_label()
        );
        self.files.push(NetworkFile {
            id,
            filename,
            is_adversarial,
            model,
            uploaded_at,
        });
        if self.selected.is_none() {
            self.selected = Some(self.files.len() - 1);
        }
    }

    fn load_from_path(&mut self) {
        let path = self.load_path.trim().to_string();
        if path.is_empty() {
            return;
        }
        let filename = std::path::Path::new(&path)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());

        if path.ends_with(".json") {
            // Pre-parsed collaborator payload.
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str::<NetworkFile>(&text).map_err(|e| e.to_string()))
            {
                Ok(mut file) => {
                    file.id = format!("file-{}", self.next_file_id);
                    self.next_file_id += 1;
                    self.status = format!("Imported {}", file.filename);
                    if self.selected.is_none() {
                        self.selected = Some(self.files.len());
                    }
                    self.files.push(file);
                }
                Err(e) => {
                    warn!("json import failed: {e}");
                    self.status = format!("Import failed: {e}");
                }
            }
            return;
        }

        match parser::load(&path) {
            Ok(model) => {
                self.status = format!(
                    "Loaded {filename} ({} layers)",
                    model.layers.len()
                );
                self.add_file(filename, false, model);
            }
            Err(e) => {
                warn!("load failed: {e}");
                self.status = format!("Load failed: {e}");
            }
        }
    }

    /// Random layered network for exploring the UI without a file.
    fn load_demo(&mut self, adversarial: bool) {
        let layers = vec![4usize, 6, 5, 3];
        let total: usize = layers.iter().sum();
        let mut rng = rand::thread_rng();

        let mut weights_matrix = vec![Vec::new(); total];
        let mut start = 0usize;
        for window in layers.windows(2) {
            let (count, next_count) = (window[0], window[1]);
            let next_start = start + count;
            for i in 0..count {
                let mut row = vec![0.0f32; next_start];
                row.extend((0..next_count).map(|_| rng.r#gen::<f32>() * 2.0 - 1.0));
                weights_matrix[start + i] = row;
            }
            start = next_start;
        }

        let model = NetworkModel {
            total_neurons: Some(total),
            layers,
            weights_matrix,
        };
        let name = if adversarial { "demo-adversarial" } else { "demo" };
        self.status = format!("Generated {name} network");
        self.add_file(format!("{name}.txt"), adversarial, model);
    }

    fn scene_key(&self, file: &NetworkFile, pane: PanePosition) -> SceneKey {
        let comparison_id = if self.show_differences && pane != PanePosition::Right {
            self.comparison
                .and_then(|i| self.files.get(i))
                .map(|f| f.id.clone())
        } else {
            None
        };
        SceneKey {
            model_id: file.id.clone(),
            mode: self.mode,
            theme: self.theme,
            pane,
            comparison_id,
        }
    }

    fn build_layout(&self, file: &NetworkFile, key: &SceneKey, aspect: f32) -> NetworkLayout {
        let comparison_model = key
            .comparison_id
            .as_ref()
            .and_then(|id| self.files.iter().find(|f| &f.id == id))
            .map(|f| &f.model);
        let layers = layer_info(&file.model);
        NetworkLayout::build(
            &file.model,
            &layers,
            key.mode,
            key.theme,
            key.pane,
            aspect,
            comparison_model,
        )
    }

    fn show_scene_pane(&mut self, ui: &mut Ui, file_index: usize, pane: PanePosition, size: Vec2) {
        let Some(file) = self.files.get(file_index).cloned() else {
            return;
        };
        let key = self.scene_key(&file, pane);
        let aspect = if size.y > 0.0 { size.x / size.y } else { 1.0 };

        let slot = if pane == PanePosition::Right {
            &mut self.comparison_scene
        } else {
            &mut self.base_scene
        };
        let stale = slot.as_ref().map_or(true, |(k, _)| *k != key);
        if stale {
            // Full teardown and rebuild: the previous scene, if any, is
            // dropped wholesale and the camera re-framed.
            let layout = self.build_layout(&file, &key, aspect);
            let scene = Scene::new(layout, key.theme);
            let slot = if pane == PanePosition::Right {
                &mut self.comparison_scene
            } else {
                &mut self.base_scene
            };
            *slot = Some((key.clone(), scene));
        }

        let slot = if pane == PanePosition::Right {
            &mut self.comparison_scene
        } else {
            &mut self.base_scene
        };
        if let Some((_, scene)) = slot {
            ui.label(RichText::new(&file.filename).strong());
            let hovered = scene.show(ui, size);
            if pane != PanePosition::Right {
                self.hovered = hovered;
            }
        }
    }

    fn draw_file_list(&mut self, ui: &mut Ui) {
        ui.heading("Files");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.load_path);
            if ui.button("Load").clicked() {
                self.load_from_path();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Demo network").clicked() {
                self.load_demo(false);
            }
            if ui.button("Demo adversarial").clicked() {
                self.load_demo(true);
            }
        });
        ui.separator();

        let mut select = None;
        let mut compare = None;
        for (i, file) in self.files.iter().enumerate() {
            ui.horizontal(|ui| {
                let marker = if file.is_adversarial { "⚠" } else { "·" };
                let selected = self.selected == Some(i);
                if ui
                    .selectable_label(selected, format!("{marker} {}", file.filename))
                    .clicked()
                {
                    select = Some(i);
                }
                if self.selected != Some(i) && ui.small_button("vs").clicked() {
                    compare = Some(i);
                }
            });
            ui.label(
                RichText::new(format!(
                    "  {} neurons, layers {}",
                    file.model.total_neurons.unwrap_or(0),
                    file.model.layers_label()
                ))
                .small()
                .weak(),
            );
        }
        if let Some(i) = select {
            self.selected = Some(i);
            if self.comparison == Some(i) {
                self.comparison = None;
            }
        }
        if let Some(i) = compare {
            self.comparison = Some(i);
        }
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Encoding:");
            ui.selectable_value(&mut self.mode, ViewMode::Color, "Color");
            ui.selectable_value(&mut self.mode, ViewMode::Thickness, "Thickness");
            ui.separator();
            ui.label("Theme:");
            ui.selectable_value(&mut self.theme, Theme::Dark, "Dark");
            ui.selectable_value(&mut self.theme, Theme::Light, "Light");
            ui.separator();
            ui.add_enabled_ui(self.comparison.is_some(), |ui| {
                ui.checkbox(&mut self.show_differences, "Highlight differences");
            });
        });
    }

    fn draw_hover_info(&self, ui: &mut Ui) {
        if let Some(h) = &self.hovered {
            let mut text = format!("Connection {} → {}   Weight: {:.4}", h.from, h.to, h.weight);
            if let Some(diff) = h.diff {
                text.push_str(&format!("   Diff: {diff:.4}"));
            }
            ui.label(RichText::new(text).monospace());
        } else {
            ui.label(RichText::new("Hover a connection for details").weak());
        }
    }

    fn sync_summary(&mut self) {
        let pair = match (self.selected, self.comparison) {
            (Some(a), Some(b)) => self
                .files
                .get(a)
                .zip(self.files.get(b))
                .map(|(fa, fb)| (fa.id.clone(), fb.id.clone())),
            _ => None,
        };
        match pair {
            Some((id_a, id_b)) => {
                let fresh = self
                    .summary
                    .as_ref()
                    .map_or(true, |(a, b, _)| (a, b) != (&id_a, &id_b));
                if fresh {
                    let a = &self.files[self.selected.unwrap()].model;
                    let b = &self.files[self.comparison.unwrap()].model;
                    self.summary = Some((id_a, id_b, ComparisonSummary::compute(a, b)));
                }
            }
            None => self.summary = None,
        }
    }
}

impl eframe::App for WeightScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.theme {
            Theme::Dark => ctx.set_visuals(egui::Visuals::dark()),
            Theme::Light => ctx.set_visuals(egui::Visuals::light()),
        }
        self.sync_summary();

        egui::SidePanel::left("files").default_width(260.0).show(ctx, |ui| {
            self.draw_file_list(ui);
            if let Some((_, _, summary)) = self.summary.clone() {
                ui.separator();
                let label_a = self
                    .selected
                    .and_then(|i| self.files.get(i))
                    .map(|f| f.filename.clone())
                    .unwrap_or_default();
                let label_b = self
                    .comparison
                    .and_then(|i| self.files.get(i))
                    .map(|f| f.filename.clone())
                    .unwrap_or_default();
                summary.show(ui, &label_a, &label_b);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(&self.status);
            self.draw_controls(ui);
            self.draw_hover_info(ui);
            ui.separator();

            let Some(selected) = self.selected else {
                ui.label("No file selected.");
                return;
            };

            let available = ui.available_size();
            match self.comparison {
                Some(comparison) => {
                    let pane_size = Vec2::new((available.x - 12.0) / 2.0, available.y - 24.0);
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            self.show_scene_pane(ui, selected, PanePosition::Left, pane_size);
                        });
                        ui.vertical(|ui| {
                            self.show_scene_pane(ui, comparison, PanePosition::Right, pane_size);
                        });
                    });
                }
                None => {
                    let pane_size = Vec2::new(available.x, available.y - 24.0);
                    self.show_scene_pane(ui, selected, PanePosition::Center, pane_size);
                }
            }
        });
    }
}
