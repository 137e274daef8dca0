use crate::domain::market::Comparison;
use crate::interfaces::desktop::design_system::DesignSystem;
use eframe::egui;
use egui_plot::{Bar, BarChart, Legend, Plot};

/// A generic card container with standard styling
pub struct Card {
    title: Option<String>,
    min_height: f32,
}

impl Default for Card {
    fn default() -> Self {
        Self::new()
    }
}

impl Card {
    pub fn new() -> Self {
        Self {
            title: None,
            min_height: 0.0,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_height(mut self, height: f32) -> Self {
        self.min_height = height;
        self
    }

    pub fn show<R>(
        self,
        ui: &mut egui::Ui,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> egui::InnerResponse<R> {
        DesignSystem::card_frame().show(ui, |ui| {
            if self.min_height > 0.0 {
                ui.set_min_height(self.min_height);
            }

            if let Some(title) = self.title {
                ui.label(
                    egui::RichText::new(title)
                        .size(12.0)
                        .color(DesignSystem::TEXT_SECONDARY)
                        .strong(),
                );
                ui.add_space(DesignSystem::SPACING_SMALL);
            }

            add_contents(ui)
        })
    }
}

/// A card showing one formatted amount, with an optional caption below it.
pub fn render_metric_card(ui: &mut egui::Ui, title: &str, value: &str, caption: Option<&str>) {
    Card::new().title(title).min_height(90.0).show(ui, |ui| {
        ui.label(
            egui::RichText::new(value)
                .size(28.0)
                .strong()
                .color(DesignSystem::TEXT_PRIMARY),
        );

        if let Some(caption) = caption {
            ui.label(
                egui::RichText::new(caption)
                    .size(11.0)
                    .color(DesignSystem::TEXT_MUTED),
            );
        }
    });
}

/// Two bars: the prediction and the market average for the same area.
pub fn render_comparison_chart(ui: &mut egui::Ui, comparison: &Comparison) {
    Card::new().title("Price comparison").show(ui, |ui| {
        Plot::new("price_comparison")
            .height(240.0)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show_x(false)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(
                        "Predicted",
                        vec![Bar::new(0.0, comparison.predicted).width(0.6)],
                    )
                    .color(DesignSystem::PREDICTED),
                );
                plot_ui.bar_chart(
                    BarChart::new(
                        "Market average",
                        vec![Bar::new(1.0, comparison.reference).width(0.6)],
                    )
                    .color(DesignSystem::REFERENCE),
                );
            });
    });
}

pub fn render_alert(ui: &mut egui::Ui, heading: &str, detail: &str) {
    DesignSystem::alert_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(
            egui::RichText::new(heading)
                .strong()
                .color(DesignSystem::DANGER),
        );
        ui.label(egui::RichText::new(detail).color(DesignSystem::TEXT_PRIMARY));
    });
}
