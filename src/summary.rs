//! Comparison summary panel: aggregate percentage metrics, a per-layer
//! color-coded difference diagram, and a qualitative verdict.

use egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::diff::{compare, layer_differences, DifferenceResult, Verdict};
use crate::layout::hsl_color;
use crate::model::{layer_info, NetworkModel};

/// Precomputed summary of one network pair, rebuilt whenever either side
/// of the comparison changes.
#[derive(Debug, Clone)]
pub struct ComparisonSummary {
    pub result: DifferenceResult,
    /// Mean per-layer differences (zero-padded semantics, sentinel 1.0 for
    /// layers present on only one side).
    pub layer_diffs: Vec<f32>,
    pub verdict: Verdict,
}

impl ComparisonSummary {
    pub fn compute(a: &NetworkModel, b: &NetworkModel) -> Self {
        let result = compare(a, b);
        let layer_diffs = layer_differences(a, b, &layer_info(a), &layer_info(b));
        let verdict = Verdict::from_average(result.average_difference);
        Self {
            result,
            layer_diffs,
            verdict,
        }
    }

    /// Per-layer difference normalized against the pair's max cell
    /// difference and capped at 1; 0 when nothing differed anywhere.
    pub fn normalized_layer_diff(&self, layer: usize) -> f32 {
        let layer_diff = self.layer_diffs.get(layer).copied().unwrap_or(0.0);
        if self.result.max_difference > 0.0 {
            (layer_diff / self.result.max_difference).min(1.0)
        } else {
            0.0
        }
    }

    /// Green at no difference through to red at the maximum.
    pub fn layer_color(&self, layer: usize) -> Color32 {
        hsl_color((1.0 - self.normalized_layer_diff(layer)) * 0.33, 1.0, 0.5)
    }

    pub fn show(&self, ui: &mut Ui, label_a: &str, label_b: &str) {
        ui.heading("Network comparison");
        ui.label(format!("{label_a} vs {label_b}"));
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            metric(
                ui,
                "Average difference",
                format!("{:.2}%", self.result.average_difference * 100.0),
            );
            metric(
                ui,
                "Max difference",
                format!("{:.1}%", self.result.max_difference * 100.0),
            );
            metric(
                ui,
                "Total difference",
                format!("{:.2}", self.result.total_difference),
            );
        });
        ui.add_space(6.0);

        ui.label(RichText::new("Per-layer differences").strong());
        let bars: Vec<Bar> = self
            .layer_diffs
            .iter()
            .enumerate()
            .map(|(i, _)| {
                Bar::new(i as f64 + 1.0, f64::from(self.normalized_layer_diff(i)))
                    .fill(self.layer_color(i))
                    .width(0.6)
            })
            .collect();
        Plot::new("layer-differences")
            .height(140.0)
            .include_y(0.0)
            .include_y(1.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });

        ui.add_space(6.0);
        let verdict_color = match self.verdict {
            Verdict::VerySimilar => Color32::from_rgb(0x2e, 0xcc, 0x71),
            Verdict::ModerateDifferences => Color32::from_rgb(0xf1, 0xc4, 0x0f),
            Verdict::SignificantlyDifferent => Color32::from_rgb(0xe7, 0x4c, 0x3c),
        };
        ui.label(RichText::new(self.verdict.label()).color(verdict_color).strong());
    }
}

fn metric(ui: &mut Ui, name: &str, value: String) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new(name).small());
            ui.label(RichText::new(value).heading());
        });
    });
}
