//! Metric chip sidebar (left panel)
//!
//! Chips are grouped by catalog category. A chip's highlight is a projection
//! of the registry: lit when the metric is bound to the active plot, dotted
//! when it lives on any plot. Clicking toggles the metric on the active plot.

use eframe::egui;

use crate::app::InsightOxide;
use crate::data::catalog;
use crate::ui::plot::series_color;

pub fn render_metric_panel(app: &mut InsightOxide, _ctx: &egui::Context, ui: &mut egui::Ui) {
    ui.heading("데이터");
    ui.separator();

    let grouped: Vec<(catalog::MetricCategory, Vec<(String, String, String)>)> =
        catalog::grouped_options(&app.state.payload)
            .into_iter()
            .map(|(category, options)| {
                let chips = options
                    .iter()
                    .map(|o| (o.metric.clone(), o.label.clone(), o.description.clone()))
                    .collect();
                (category, chips)
            })
            .collect();

    if grouped.is_empty() {
        ui.weak("불러온 지표가 없습니다");
        return;
    }

    let mut toggles: Vec<String> = Vec::new();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (category, chips) in &grouped {
            egui::CollapsingHeader::new(category.label())
                .id_salt(category.label())
                .default_open(true)
                .show(ui, |ui| {
                    for (metric, label, description) in chips {
                        let on_active = app.state.plots.metric_on_active(metric);
                        let anywhere = app.state.plots.metric_bound_anywhere(metric);

                        ui.horizontal(|ui| {
                            let response = ui.selectable_label(on_active, label);
                            let response = if description.is_empty() {
                                response
                            } else {
                                response.on_hover_text(description)
                            };

                            if anywhere {
                                let color = {
                                    let index = app.state.plots.color_for(metric);
                                    series_color(index)
                                };
                                ui.painter().circle_filled(
                                    response.rect.right_center() + egui::vec2(8.0, 0.0),
                                    3.0,
                                    color,
                                );
                            }

                            if response.clicked() {
                                toggles.push(metric.clone());
                            }
                        });
                    }
                });
        }
    });

    for metric in toggles {
        let plot = app.state.plots.active_or_first();
        app.state.plots.set_active_plot(plot);
        let payload = &app.state.payload;
        app.state.plots.toggle_metric_group(payload, plot, &metric);
    }
}
