//! Plot cards and the chart render adapter
//!
//! Translates the registry's series definitions into egui_plot items. Every
//! series is mapped into a shared normalized y space through its axis scale,
//! so one chart can host the count, ratio and hours axes side by side; the
//! tick columns are drawn per axis with the unit's own formatting.

use eframe::egui::{self, Align2, Color32, RichText, Sense, Stroke};
use egui_plot::{
    BoxElem, BoxPlot, BoxSpread, Corner, HLine, Legend, Line, LineStyle, Plot, PlotBounds,
    PlotPoint, Text, VLine,
};

use crate::app::InsightOxide;
use crate::constants::{layout, palette};
use crate::data::dates;
use crate::data::normalize;
use crate::scale::{NiceScale, PlotScales};
use crate::state::{ChartSeries, Plot as InsightPlot, PlotId};

/// Deferred mutations collected while the cards render
enum CardAction {
    Activate(PlotId),
    RemovePlot(PlotId),
    RemoveMetric(PlotId, String),
}

/// Series color from the shared palette
pub fn series_color(index: usize) -> Color32 {
    let (r, g, b) = palette::SERIES[index % palette::SERIES.len()];
    Color32::from_rgb(r, g, b)
}

/// Render the grid of plot cards (central panel)
pub fn render_plot_grid(app: &mut InsightOxide, ctx: &egui::Context, ui: &mut egui::Ui) {
    profiling::scope!("render_plot_grid");

    app.plot_rects.clear();
    let mut actions: Vec<CardAction> = Vec::new();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for index in 0..app.state.plots.plots().len() {
            render_plot_card(app, ctx, ui, index, &mut actions);
            ui.add_space(8.0);
        }

        if ui.button("➕ 플롯 추가").clicked() {
            let id = app.state.plots.create_plot();
            app.state.plots.set_active_plot(id);
        }
    });

    for action in actions {
        match action {
            CardAction::Activate(id) => app.state.plots.set_active_plot(id),
            CardAction::RemovePlot(id) => app.state.plots.remove_plot(id),
            CardAction::RemoveMetric(id, metric) => {
                app.state.plots.remove_metric_group(id, &metric);
            }
        }
    }
}

fn render_plot_card(
    app: &mut InsightOxide,
    ctx: &egui::Context,
    ui: &mut egui::Ui,
    index: usize,
    actions: &mut Vec<CardAction>,
) {
    let plots = &app.state.plots;
    let plot = &plots.plots()[index];
    let plot_id = plot.id();
    let is_active = plots.active() == Some(plot_id);

    let stroke = if is_active {
        Stroke::new(2.0, series_color(0))
    } else {
        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
    };

    let frame = egui::Frame::group(ui.style()).stroke(stroke);
    let card = frame.show(ui, |ui| {
        ui.horizontal(|ui| {
            let title = RichText::new(format!("플롯 {}", plot.display_index())).strong();
            if ui.add(egui::Label::new(title).sense(Sense::click())).clicked() {
                actions.push(CardAction::Activate(plot_id));
            }
            if is_active {
                ui.weak("활성");
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Removing the last card is fine: the registry respawns an
                // empty one so the grid is never blank
                if ui.small_button("✕").on_hover_text("플롯 삭제").clicked() {
                    actions.push(CardAction::RemovePlot(plot_id));
                }
            });
        });

        // Bound metric chips: drag handles plus per-chip removal
        let chips: Vec<(String, String, usize)> = plot
            .metric_keys()
            .map(|key| {
                let label = app
                    .state
                    .payload
                    .option(key)
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| key.to_string());
                let color = plot
                    .series()
                    .iter()
                    .find(|s| s.metric == key)
                    .map(|s| s.color_index)
                    .unwrap_or(0);
                (key.to_string(), label, color)
            })
            .collect();

        if !chips.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for (metric, label, color_index) in &chips {
                    let chip = egui::Button::new(
                        RichText::new(format!("● {label}")).color(series_color(*color_index)),
                    )
                    .sense(Sense::click_and_drag());
                    let response = ui.add(chip).on_hover_text("다른 플롯으로 끌어다 놓기");

                    if response.is_pointer_button_down_on() {
                        if let Some(pos) = ctx.pointer_interact_pos() {
                            app.state.drag.press(metric, plot_id, pos, true);
                        }
                    }

                    if ui.small_button("×").on_hover_text("플롯에서 제거").clicked() {
                        actions.push(CardAction::RemoveMetric(plot_id, metric.clone()));
                    }
                }
            });
        }

        if render_chart(plot, ui) {
            actions.push(CardAction::Activate(plot_id));
        }
    });

    // Whole card doubles as the drop zone for chip drags
    app.plot_rects.push((plot_id, card.response.rect));
}

/// Draw one plot's chart. Returns true when the chart surface was clicked.
fn render_chart(plot: &InsightPlot, ui: &mut egui::Ui) -> bool {
    let scales = *plot.scales();
    let (x0, x1) = x_extent(plot.series());

    let chart = Plot::new(("insight-chart", plot.id()))
        .height(layout::PLOT_MIN_HEIGHT)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_axes([true, false])
        .show_grid(false)
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_formatter(|mark, _range| dates::format_day(mark.value))
        .label_formatter(|_, _| String::new());

    let response = chart.show(ui, |plot_ui| {
        plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, -0.08], [x1, 1.08]));

        draw_axes(plot_ui, &scales, x0, x1);

        for series in plot.series() {
            draw_series(plot_ui, series, &scales);
        }

        if plot.group_count() == 0 {
            hint_text(plot_ui, x0, x1, "지표를 끌어다 놓거나 선택하세요");
        } else if !plot.has_points() {
            hint_text(plot_ui, x0, x1, "표시할 데이터가 없습니다");
        }

        // Index-mode hover: snap to the nearest timestamp across all series
        let hovered = plot_ui
            .pointer_coordinate()
            .and_then(|p| nearest_timestamp(plot.series(), p.x, (x1 - x0) * 0.05));
        if let Some(x) = hovered {
            plot_ui.vline(
                VLine::new("", x)
                    .color(Color32::from_gray(140))
                    .style(LineStyle::Dashed { length: 4.0 })
                    .width(1.0),
            );
        }
        hovered
    });

    let clicked = response.response.clicked();
    if let Some(x) = response.inner {
        response.response.on_hover_ui_at_pointer(|ui| tooltip_contents(ui, plot, x));
    }
    clicked
}

/// Data x extent with padding; an empty or single-point plot gets a one-day
/// window so the surface still renders
fn x_extent(series: &[ChartSeries]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in series {
        for p in &s.points {
            min = min.min(p[0]);
            max = max.max(p[0]);
        }
    }
    if !min.is_finite() {
        return (0.0, 86_400.0);
    }
    if min == max {
        return (min - 43_200.0, max + 43_200.0);
    }
    let pad = (max - min) * 0.03;
    (min - pad, max + pad)
}

/// Tick labels and gridlines for every visible axis
fn draw_axes(plot_ui: &mut egui_plot::PlotUi<'_>, scales: &PlotScales, x0: f64, x1: f64) {
    let span = x1 - x0;
    let gap = span * layout::AXIS_LABEL_GAP;

    if let Some(scale) = scales.count {
        draw_axis(
            plot_ui,
            &scale,
            x0 + gap,
            Align2::LEFT_CENTER,
            true,
            |v| normalize::group_thousands(v.round() as i64),
        );
    }
    if let Some(scale) = scales.ratio {
        draw_axis(
            plot_ui,
            &scale,
            x1 - gap,
            Align2::RIGHT_CENTER,
            scales.count.is_none(),
            |v| format!("{v:.0}%"),
        );
    }
    if let Some(scale) = scales.hours {
        // Offset inward when the ratio axis already owns the right edge
        let x = if scales.both_right_axes() {
            x1 - gap - span * layout::HOURS_AXIS_OFFSET
        } else {
            x1 - gap
        };
        draw_axis(
            plot_ui,
            &scale,
            x,
            Align2::RIGHT_CENTER,
            scales.count.is_none() && scales.ratio.is_none(),
            |v| format!("{v:.1}"),
        );
    }
}

fn draw_axis(
    plot_ui: &mut egui_plot::PlotUi<'_>,
    scale: &NiceScale,
    label_x: f64,
    anchor: Align2,
    gridlines: bool,
    format: impl Fn(f64) -> String,
) {
    for tick in scale.ticks() {
        let y = scale.fraction(tick);
        if gridlines {
            plot_ui.hline(
                HLine::new("", y)
                    .color(Color32::from_rgba_unmultiplied(148, 163, 184, 50))
                    .width(1.0),
            );
        }
        plot_ui.text(
            Text::new(
                "",
                PlotPoint::new(label_x, y),
                RichText::new(format(tick)).size(10.0).color(Color32::from_gray(130)),
            )
            .anchor(anchor),
        );
    }
}

fn draw_series(plot_ui: &mut egui_plot::PlotUi<'_>, series: &ChartSeries, scales: &PlotScales) {
    let color = series_color(series.color_index);
    let mapped: Vec<[f64; 2]> = match scales.get(series.axis) {
        Some(scale) => series.points.iter().map(|p| [p[0], scale.fraction(p[1])]).collect(),
        None => Vec::new(),
    };

    let mut line = Line::new(series.label.clone(), mapped).color(color).width(series.style.width);
    if series.style.dashed {
        line = line.style(LineStyle::Dashed { length: 6.0 });
    }
    plot_ui.line(line);

    if let (Some(aggregates), Some(scale)) = (&series.aggregates, scales.get(series.axis)) {
        draw_box_overlay(plot_ui, aggregates, scale, color);
    }
}

/// Whisker-and-box overlay over the mean line: min→max whisker with caps, a
/// box spanning mean ± std, and the mean tick
fn draw_box_overlay(
    plot_ui: &mut egui_plot::PlotUi<'_>,
    aggregates: &[crate::state::BoxAggregate],
    scale: &NiceScale,
    color: Color32,
) {
    if aggregates.is_empty() {
        return;
    }

    // Box width from the tightest sample spacing, capped at half a day
    let mut spacing = 43_200.0_f64;
    for pair in aggregates.windows(2) {
        let gap = (pair[1].x - pair[0].x).abs();
        if gap > 0.0 {
            spacing = spacing.min(gap);
        }
    }
    let width = spacing * 0.4;

    let elems: Vec<BoxElem> = aggregates
        .iter()
        .map(|a| {
            BoxElem::new(
                a.x,
                BoxSpread::new(
                    scale.fraction(a.min),
                    scale.fraction(a.mean - a.std),
                    scale.fraction(a.mean),
                    scale.fraction(a.mean + a.std),
                    scale.fraction(a.max),
                ),
            )
            .box_width(width)
            .whisker_width(width * 0.6)
            .fill(color.gamma_multiply(0.2))
            .stroke(Stroke::new(1.0, color))
        })
        .collect();

    plot_ui.box_plot(BoxPlot::new("", elems).color(color));
}

fn hint_text(plot_ui: &mut egui_plot::PlotUi<'_>, x0: f64, x1: f64, message: &str) {
    plot_ui.text(Text::new(
        "",
        PlotPoint::new((x0 + x1) / 2.0, 0.5),
        RichText::new(message).size(14.0).color(Color32::from_gray(150)),
    ));
}

/// Closest sample timestamp to the pointer, within a tolerance
fn nearest_timestamp(series: &[ChartSeries], x: f64, tolerance: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    for s in series {
        for p in &s.points {
            let better = match best {
                Some(b) => (p[0] - x).abs() < (b - x).abs(),
                None => true,
            };
            if better {
                best = Some(p[0]);
            }
        }
    }
    best.filter(|b| (b - x).abs() <= tolerance)
}

/// Chart.js-style index tooltip: the hovered day plus every series' value
fn tooltip_contents(ui: &mut egui::Ui, plot: &InsightPlot, x: f64) {
    ui.label(RichText::new(dates::format_day(x)).strong());
    for series in plot.series() {
        let Some(point) = series.points.iter().find(|p| (p[0] - x).abs() < 0.5) else {
            continue;
        };
        let color = series_color(series.color_index);
        ui.horizontal(|ui| {
            ui.colored_label(color, "●");
            ui.label(format!(
                "{}: {}",
                series.label,
                normalize::format_value(point[1], series.unit)
            ));
        });

        if let Some(aggregates) = &series.aggregates {
            if let Some(a) = aggregates.iter().find(|a| (a.x - x).abs() < 0.5) {
                ui.label(format!(
                    "최소 {} · 최대 {} · 표준편차 {}",
                    normalize::format_value(a.min, series.unit),
                    normalize::format_value(a.max, series.unit),
                    normalize::format_value(a.std, series.unit),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_with_points(points: Vec<[f64; 2]>) -> Vec<ChartSeries> {
        let json = serde_json::json!({
            "metricOptions": [{ "metric": "M", "label": "m", "unit": "COUNT" }],
            "series": []
        })
        .to_string();
        let payload = crate::data::payload::PayloadModel::parse(&json).unwrap();
        let mut registry = crate::state::PlotRegistry::new();
        let id = registry.active_or_first();
        registry.add_metric_group(&payload, id, "M");
        let mut series = registry.plot(id).unwrap().series().to_vec();
        series[0].points = points;
        series
    }

    #[test]
    fn test_x_extent_padding_and_fallbacks() {
        assert_eq!(x_extent(&[]), (0.0, 86_400.0));

        let single = series_with_points(vec![[1000.0, 1.0]]);
        assert_eq!(x_extent(&single), (1000.0 - 43_200.0, 1000.0 + 43_200.0));

        let pair = series_with_points(vec![[0.0, 1.0], [100.0, 2.0]]);
        let (lo, hi) = x_extent(&pair);
        assert!(lo < 0.0 && hi > 100.0);
    }

    #[test]
    fn test_nearest_timestamp_snaps_within_tolerance() {
        let series = series_with_points(vec![[0.0, 1.0], [100.0, 2.0]]);
        assert_eq!(nearest_timestamp(&series, 40.0, 50.0), Some(0.0));
        assert_eq!(nearest_timestamp(&series, 80.0, 50.0), Some(100.0));
        assert_eq!(nearest_timestamp(&series, 500.0, 50.0), None);
        assert_eq!(nearest_timestamp(&[], 0.0, 50.0), None);
    }

    #[test]
    fn test_series_color_wraps_palette() {
        assert_eq!(series_color(0), series_color(palette::SERIES.len()));
    }
}
