//! Application shell
//!
//! Owns the authoritative state, polls the fetch worker, wires pointer events
//! into the drag machine, and lays out the panels. All mutation happens here
//! on the UI thread; the worker only moves bytes.

use chrono::{NaiveDate, Utc};
use eframe::egui;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::constants::layout;
use crate::data::dates;
use crate::data::payload::PayloadModel;
use crate::net::{AjaxResponse, FetchRequest, FetchResult, FetchWorker};
use crate::state::{AppState, PlotId, RangePreset, RangeSelection};
use crate::ui;

pub struct InsightOxide {
    pub state: AppState,
    config: AppConfig,
    fetcher: FetchWorker,

    /// Plot card rects recorded this frame, the drag drop zones
    pub plot_rects: Vec<(PlotId, egui::Rect)>,

    /// Default-active metrics are bound once, after the first payload
    defaults_bound: bool,
}

impl InsightOxide {
    pub fn new(config: AppConfig) -> Self {
        let mut app = Self {
            state: AppState::new(Self::today()),
            config,
            fetcher: FetchWorker::spawn(),
            plot_rects: Vec::new(),
            defaults_bound: false,
        };

        match app.config.payload_path.clone() {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(text) => {
                    app.apply_payload(PayloadModel::from_json_lossy(&text));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read payload file");
                    app.state.set_error(format!("페이로드 파일을 읽지 못했습니다: {e}"));
                }
            },
            None => {
                let selection = app.state.range.selection.clone();
                app.begin_range_fetch(selection);
            }
        }

        app
    }

    /// Today's date in the fixed reference zone
    pub fn today() -> NaiveDate {
        Utc::now().with_timezone(&dates::fixed_zone()).date_naive()
    }

    /// Issue a range re-query. The new sequence number supersedes any
    /// outstanding request; its response will be the only one accepted.
    pub fn begin_range_fetch(&mut self, selection: RangeSelection) {
        self.state.range.selection = selection;
        let seq = self.state.range.begin_fetch();
        let url = self.config.insight_url(&self.state.range.selection.query_string());
        debug!(seq, %url, "range fetch");
        self.fetcher.request(FetchRequest::Range { seq, url });
    }

    fn poll_fetcher(&mut self) {
        while let Some(result) = self.fetcher.poll() {
            match result {
                FetchResult::Loaded { seq, response } => {
                    if !self.state.range.accepts(seq) {
                        debug!(seq, "stale range response dropped");
                        continue;
                    }
                    self.state.range.finish();
                    self.apply_response(response);
                }
                FetchResult::Failed { seq, error } => {
                    if !self.state.range.accepts(seq) {
                        debug!(seq, "stale range failure dropped");
                        continue;
                    }
                    self.state.range.finish();
                    // The previous snapshot stays on screen
                    warn!(error = %error, "range fetch failed");
                    self.state.set_error(error.user_message());
                }
            }
        }
    }

    fn apply_response(&mut self, response: AjaxResponse) {
        // Echo the range the server actually resolved
        if let Some(preset) = RangePreset::from_parameter(&response.selected_range) {
            self.state.range.selection = RangeSelection {
                preset: if response.custom_range_active { RangePreset::Custom } else { preset },
                start: response.start_date,
                end: response.end_date,
            };
            if let (Some(start), Some(end)) = (response.start_date, response.end_date) {
                self.state.range.custom_start = start;
                self.state.range.custom_end = end;
            }
        }

        if response.error {
            self.state.set_error("통계 데이터를 불러오지 못했습니다. 잠시 후 다시 시도해주세요.");
        } else {
            self.state.clear_error();
        }

        self.apply_payload(PayloadModel::from_wire(response.view_model));
    }

    /// Replace the payload snapshot wholesale and rebind every plot
    fn apply_payload(&mut self, payload: PayloadModel) {
        self.state.payload = payload;
        self.state.plots.refresh_all(&self.state.payload);

        if !self.defaults_bound && !self.state.payload.is_empty() {
            self.defaults_bound = true;
            let plot = self.state.plots.active_or_first();
            for metric in self.state.payload.default_active_metrics() {
                self.state.plots.add_metric_group(&self.state.payload, plot, &metric);
            }
        }
    }

    /// Feed pointer state into the drag machine and apply a finished drop
    fn handle_drag(&mut self, ctx: &egui::Context) {
        if let Some(pos) = ctx.pointer_latest_pos() {
            self.state.drag.motion(pos);
        }

        let released = ctx.input(|i| i.pointer.any_released());
        if released {
            let target = ctx
                .pointer_latest_pos()
                .and_then(|pos| {
                    self.plot_rects
                        .iter()
                        .find(|(_, rect)| rect.contains(pos))
                        .map(|(id, _)| *id)
                });
            if let Some(commit) = self.state.drag.release(target) {
                let payload = &self.state.payload;
                self.state.plots.move_metric_group(payload, &commit.metric, commit.from, commit.to);
                self.state.plots.set_active_plot(commit.to);
            }
        }

        // Floating chip clone follows the pointer
        if let Some((metric, pos)) = self.state.drag.dragging() {
            let label = self
                .state
                .payload
                .option(metric)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| metric.to_string());
            egui::Area::new(egui::Id::new("drag-clone"))
                .fixed_pos(pos + egui::vec2(12.0, 12.0))
                .order(egui::Order::Tooltip)
                .interactable(false)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(label);
                    });
                });
            ctx.request_repaint();
        }
    }
}

impl eframe::App for InsightOxide {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::scope!("update");

        self.poll_fetcher();
        if self.state.range.is_fetching() {
            // Keep polling while a request is in flight
            ctx.request_repaint_after(std::time::Duration::from_millis(150));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::render_toolbar(self, ctx, ui);
        });

        egui::SidePanel::left("metrics")
            .default_width(layout::METRIC_PANEL_WIDTH)
            .show(ctx, |ui| {
                ui::render_metric_panel(self, ctx, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::render_plot_grid(self, ctx, ui);
        });

        self.handle_drag(ctx);

        profiling::finish_frame!();
    }
}
