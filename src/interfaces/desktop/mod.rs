//! Native egui window over the same prediction pipeline as the web form.
//!
//! The pipeline is re-run whenever a control changes. Market price refreshes
//! run on a background thread with their own Tokio runtime and report back
//! over a crossbeam channel, so the window never blocks on the network.

pub mod components;
pub mod design_system;

use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};
use eframe::egui;
use tracing::{info, warn};

use crate::application::form::{Widget, render_controls};
use crate::application::market_prices::MarketPriceService;
use crate::application::pipeline::{
    PipelineError, PredictionOutcome, PredictionPipeline, SHOW_CHART_FIELD,
};
use crate::application::system::Application;
use crate::domain::market::PriceOrigin;
use crate::domain::record::{FeatureValue, FormState};
use components::{render_alert, render_comparison_chart, render_metric_card};
use design_system::DesignSystem;

pub const WINDOW_TITLE: &str = "Rustimate";

type RefreshResult = Result<usize, String>;

pub struct PriceFormApp {
    pipeline: Arc<PredictionPipeline>,
    market_prices: Arc<MarketPriceService>,
    form: FormState,
    outcome: Option<Result<PredictionOutcome, PipelineError>>,
    dirty: bool,
    refresh_rx: Option<Receiver<RefreshResult>>,
    refresh_status: Option<(bool, String)>,
}

impl PriceFormApp {
    pub fn new(app: &Application) -> Self {
        Self {
            form: FormState::from_defaults(app.pipeline.schema()),
            pipeline: app.pipeline.clone(),
            market_prices: app.market_prices.clone(),
            outcome: None,
            dirty: true,
            refresh_rx: None,
            refresh_status: None,
        }
    }

    fn recompute(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if !self.pipeline.model().is_ready() {
            self.outcome = None;
            return;
        }
        self.outcome = Some(self.pipeline.run(&self.form, &self.market_prices.snapshot()));
    }

    fn start_refresh(&mut self, ctx: &egui::Context) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let service = self.market_prices.clone();
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let result = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt
                    .block_on(service.refresh())
                    .map(|prices| prices.len())
                    .map_err(|e| e.to_string()),
                Err(e) => Err(format!("Failed to start refresh runtime: {}", e)),
            };
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        info!("Market price refresh started");
        self.refresh_rx = Some(rx);
        self.refresh_status = None;
    }

    fn poll_refresh(&mut self) {
        let received = match self.refresh_rx.as_ref().map(|rx| rx.try_recv()) {
            None | Some(Err(TryRecvError::Empty)) => return,
            Some(Ok(result)) => result,
            Some(Err(TryRecvError::Disconnected)) => {
                Err("Refresh thread stopped unexpectedly".to_string())
            }
        };

        self.refresh_rx = None;
        self.refresh_status = Some(match received {
            Ok(count) => {
                self.dirty = true;
                (true, format!("Market prices updated ({} areas)", count))
            }
            Err(e) => {
                warn!("Market price refresh failed: {}", e);
                (false, e)
            }
        });
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Market prices");
        ui.separator();

        let prices = self.market_prices.snapshot();
        let currency = self.pipeline.currency();
        egui::Grid::new("market_prices")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for (name, price) in prices.iter() {
                    ui.label(name.as_str());
                    ui.label(currency.format(*price));
                    ui.end_row();
                }
            });

        ui.add_space(DesignSystem::SPACING_SMALL);
        let origin = match prices.origin {
            PriceOrigin::Defaults => "built-in defaults",
            PriceOrigin::File => "price file",
            PriceOrigin::Scraped => "adresowo.pl listings",
        };
        ui.label(
            egui::RichText::new(format!("Source: {}", origin))
                .small()
                .color(DesignSystem::TEXT_MUTED),
        );
        if let Some(at) = prices.refreshed_at {
            ui.label(
                egui::RichText::new(format!(
                    "Last refreshed: {}",
                    at.format("%Y-%m-%d %H:%M:%S UTC")
                ))
                .small()
                .color(DesignSystem::TEXT_MUTED),
            );
        }

        if self.market_prices.can_refresh() {
            ui.add_space(DesignSystem::SPACING_SMALL);
            if self.refresh_rx.is_some() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Fetching listings...");
                });
            } else if ui.button("Fetch current market prices").clicked() {
                self.start_refresh(ui.ctx());
            }
        }

        if let Some((ok, message)) = &self.refresh_status {
            let color = if *ok {
                DesignSystem::SUCCESS
            } else {
                DesignSystem::DANGER
            };
            ui.label(egui::RichText::new(message).color(color));
        }
    }

    /// Draws one control per feature and writes edits back into the form.
    fn feature_controls(&mut self, ui: &mut egui::Ui) {
        let controls = render_controls(self.pipeline.schema(), &self.form);

        egui::Grid::new("feature_controls")
            .num_columns(2)
            .spacing([16.0, 10.0])
            .show(ui, |ui| {
                for control in controls {
                    ui.label(control.label.as_str());
                    let edited = match control.widget {
                        Widget::NumberInput {
                            min,
                            max,
                            step,
                            mut value,
                        } => ui
                            .add(egui::DragValue::new(&mut value).range(min..=max).speed(step))
                            .changed()
                            .then_some(FeatureValue::Number(value)),
                        Widget::Slider { min, max, mut value } => ui
                            .add(egui::Slider::new(&mut value, min..=max))
                            .changed()
                            .then_some(FeatureValue::Integer(value)),
                        Widget::Select { options, selected } => {
                            let mut current = selected.clone();
                            egui::ComboBox::from_id_salt(&control.name)
                                .selected_text(current.clone())
                                .show_ui(ui, |ui| {
                                    for option in &options {
                                        ui.selectable_value(&mut current, option.clone(), option.as_str());
                                    }
                                });
                            (current != selected).then_some(FeatureValue::Category(current))
                        }
                        Widget::Checkbox { mut checked } => ui
                            .checkbox(&mut checked, "")
                            .changed()
                            .then_some(FeatureValue::Flag(checked)),
                    };
                    ui.end_row();

                    if let Some(value) = edited {
                        self.form.set(&control.name, value);
                        self.dirty = true;
                    }
                }
            });

        let mut show_chart = self.form.flag(SHOW_CHART_FIELD);
        if ui.checkbox(&mut show_chart, "Show comparison chart").changed() {
            self.form.set(SHOW_CHART_FIELD, FeatureValue::Flag(show_chart));
            self.dirty = true;
        }
    }

    fn results(&self, ui: &mut egui::Ui) {
        match &self.outcome {
            Some(Ok(outcome)) => {
                ui.columns(2, |cols| {
                    render_metric_card(&mut cols[0], "Estimated price", &outcome.formatted, None);
                    if let Some(reference) = &outcome.reference {
                        let caption = outcome
                            .comparison
                            .and_then(|c| c.difference_pct)
                            .map(|pct| format!("{:+.1}% vs market", pct));
                        render_metric_card(
                            &mut cols[1],
                            &format!("Average market price ({})", reference.level),
                            &reference.formatted,
                            caption.as_deref(),
                        );
                    }
                });

                if outcome.show_chart
                    && let Some(comparison) = &outcome.comparison
                {
                    ui.add_space(DesignSystem::SPACING_MEDIUM);
                    render_comparison_chart(ui, comparison);
                }
            }
            Some(Err(e)) => render_alert(ui, "Could not compute a price", &e.to_string()),
            None => {}
        }
    }
}

impl eframe::App for PriceFormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(DesignSystem::theme());
        self.poll_refresh();

        egui::SidePanel::left("market_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| self.sidebar(ui));

        egui::CentralPanel::default()
            .frame(DesignSystem::main_frame())
            .show(ctx, |ui| {
                ui.heading("Apartment price prediction");
                ui.label("Enter the apartment details to get an estimated price.");
                ui.add_space(DesignSystem::SPACING_MEDIUM);

                let load_error = self.pipeline.model().load_error().map(|e| e.to_string());
                if let Some(message) = &load_error {
                    render_alert(ui, "The price model could not be loaded.", message);
                    ui.add_space(DesignSystem::SPACING_MEDIUM);
                }

                ui.add_enabled_ui(load_error.is_none(), |ui| self.feature_controls(ui));
                self.recompute();

                ui.add_space(DesignSystem::SPACING_LARGE);
                self.results(ui);
            });
    }
}

/// Opens the window and blocks until it is closed.
pub fn run_desktop(app: Application) -> anyhow::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    let window = PriceFormApp::new(&app);
    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|_cc| Ok(Box::new(window))),
    )
    .map_err(|e| anyhow::anyhow!("Eframe error: {}", e))?;

    Ok(())
}
