//! Plot registry: the dashboard's core state machine
//!
//! Owns every live plot, the metric groups bound to each plot, and the
//! identity of every generated chart series. Widget state (chip highlights,
//! card outlines) is a projection of this model, written after each mutation
//! and never read back.
//!
//! Unknown plot or metric keys are silent no-ops throughout; the registry
//! never surfaces errors to the caller.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::{palette, stat_components};
use crate::data::dates;
use crate::data::normalize;
use crate::data::payload::{
    ComponentSeries, MetricOption, MetricUnit, PayloadModel, RawPoint, SeriesData,
};
use crate::scale::{self, AxisKind, PlotScales};

/// Session-unique plot identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlotId(u64);

/// Session-unique series identity; owned by exactly one plot and one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(u64);

/// Line styling hints consumed by the render adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub width: f32,
    pub dashed: bool,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self { width: 2.0, dashed: false }
    }
}

/// Strict join of the four statistic components at one timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxAggregate {
    /// Chart x coordinate (fixed-zone epoch seconds)
    pub x: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// One renderable series derived from a metric binding
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub id: SeriesId,
    pub metric: String,
    pub label: String,
    pub unit: MetricUnit,
    pub axis: AxisKind,
    /// Index into the shared palette; stable per metric key
    pub color_index: usize,
    pub style: SeriesStyle,
    /// `[x = fixed-zone epoch seconds, y = normalized value]`, invalid source
    /// points already dropped
    pub points: Vec<[f64; 2]>,
    /// Box-plot records backing the overlay and tooltip; present only on the
    /// aggregated statistics series
    pub aggregates: Option<Vec<BoxAggregate>>,
}

/// Membership of one metric on one plot
#[derive(Debug, Clone)]
struct MetricGroup {
    metric: String,
    series_ids: Vec<SeriesId>,
}

/// One chart surface and everything bound to it
#[derive(Debug)]
pub struct Plot {
    id: PlotId,
    display_index: usize,
    series: Vec<ChartSeries>,
    groups: Vec<MetricGroup>,
    scales: PlotScales,
}

impl Plot {
    pub fn id(&self) -> PlotId {
        self.id
    }

    /// 1-based position shown in the card title; renumbered on removal
    pub fn display_index(&self) -> usize {
        self.display_index
    }

    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    pub fn scales(&self) -> &PlotScales {
        &self.scales
    }

    pub fn contains_metric(&self, metric: &str) -> bool {
        self.groups.iter().any(|g| g.metric == metric)
    }

    /// Bound metric keys in binding order
    pub fn metric_keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.metric.as_str())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// True when at least one bound series has a renderable point
    pub fn has_points(&self) -> bool {
        self.series.iter().any(|s| !s.points.is_empty())
    }

    /// Box series feed their whole whisker envelope into the scale, not just
    /// the mean line, so the overlay stays inside the axis bounds
    fn rescale(&mut self) {
        let mut values: Vec<(AxisKind, f64)> = Vec::new();
        for s in &self.series {
            values.extend(s.points.iter().map(|p| (s.axis, p[1])));
            if let Some(aggregates) = &s.aggregates {
                for a in aggregates {
                    values.push((s.axis, a.min));
                    values.push((s.axis, a.max));
                    values.push((s.axis, a.mean - a.std));
                    values.push((s.axis, a.mean + a.std));
                }
            }
        }
        self.scales = scale::compute_scales(values);
    }
}

/// Owner of all plots and their metric bindings
pub struct PlotRegistry {
    plots: Vec<Plot>,
    active: Option<PlotId>,
    next_plot: u64,
    next_series: u64,
    /// Palette assignment per metric key, stable across plots and refreshes
    colors: HashMap<String, usize>,
    color_cursor: usize,
}

impl Default for PlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotRegistry {
    /// A registry always holds at least one plot; the initial one is active
    pub fn new() -> Self {
        let mut registry = Self {
            plots: Vec::new(),
            active: None,
            next_plot: 1,
            next_series: 1,
            colors: HashMap::new(),
            color_cursor: 0,
        };
        registry.create_plot();
        registry
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.iter().find(|p| p.id == id)
    }

    pub fn active(&self) -> Option<PlotId> {
        self.active
    }

    /// The active plot, falling back to the first one (the registry is never
    /// empty). Used by chip toggles so a click always has a target.
    pub fn active_or_first(&mut self) -> PlotId {
        match self.active.filter(|id| self.plot(*id).is_some()) {
            Some(id) => id,
            None => {
                let id = self.plots[0].id;
                self.active = Some(id);
                id
            }
        }
    }

    /// Allocate a new empty plot with the next display index
    pub fn create_plot(&mut self) -> PlotId {
        let id = PlotId(self.next_plot);
        self.next_plot += 1;
        self.plots.push(Plot {
            id,
            display_index: self.plots.len() + 1,
            series: Vec::new(),
            groups: Vec::new(),
            scales: PlotScales::default(),
        });
        if self.plots.len() == 1 {
            self.active = Some(id);
        }
        id
    }

    /// Destroy a plot and release its bindings. Survivors are renumbered from
    /// 1 in creation order; an empty registry synthesizes a fresh plot.
    pub fn remove_plot(&mut self, id: PlotId) {
        let Some(pos) = self.plots.iter().position(|p| p.id == id) else {
            return;
        };
        self.plots.remove(pos);
        for (i, plot) in self.plots.iter_mut().enumerate() {
            plot.display_index = i + 1;
        }
        if self.plots.is_empty() {
            self.active = None;
            self.create_plot();
        } else if self.active == Some(id) {
            self.active = Some(self.plots[0].id);
        }
    }

    /// Mark exactly one plot active
    pub fn set_active_plot(&mut self, id: PlotId) {
        if self.plot(id).is_some() {
            self.active = Some(id);
        }
    }

    /// Bind a metric to a plot. Idempotent; unknown ids are no-ops.
    pub fn add_metric_group(&mut self, payload: &PayloadModel, id: PlotId, metric: &str) {
        let Some(option) = payload.option(metric) else {
            debug!(metric, "add ignored: unknown metric");
            return;
        };
        let Some(pos) = self.plots.iter().position(|p| p.id == id) else {
            return;
        };
        if self.plots[pos].contains_metric(metric) {
            return;
        }

        let color_index = self.color_for(metric);
        let built = build_series(payload, option, color_index, &mut self.next_series);
        let plot = &mut self.plots[pos];
        plot.groups.push(MetricGroup {
            metric: metric.to_string(),
            series_ids: built.iter().map(|s| s.id).collect(),
        });
        plot.series.extend(built);
        plot.rescale();
    }

    /// Release a metric's series from a plot. No-op when not bound.
    pub fn remove_metric_group(&mut self, id: PlotId, metric: &str) {
        let Some(plot) = self.plots.iter_mut().find(|p| p.id == id) else {
            return;
        };
        let Some(pos) = plot.groups.iter().position(|g| g.metric == metric) else {
            return;
        };
        let group = plot.groups.remove(pos);
        plot.series.retain(|s| !group.series_ids.contains(&s.id));
        plot.rescale();
    }

    /// Remove when bound, add otherwise
    pub fn toggle_metric_group(&mut self, payload: &PayloadModel, id: PlotId, metric: &str) {
        if self.plot(id).is_some_and(|p| p.contains_metric(metric)) {
            self.remove_metric_group(id, metric);
        } else {
            self.add_metric_group(payload, id, metric);
        }
    }

    /// Release a metric from every plot it is bound to
    pub fn remove_metric_from_all_plots(&mut self, metric: &str) {
        let ids: Vec<PlotId> = self
            .plots
            .iter()
            .filter(|p| p.contains_metric(metric))
            .map(|p| p.id)
            .collect();
        for id in ids {
            self.remove_metric_group(id, metric);
        }
    }

    /// Move a metric group between plots, atomic in effect. No-op when source
    /// and destination are the same, when either plot is unknown, or when the
    /// source does not hold the metric.
    pub fn move_metric_group(
        &mut self,
        payload: &PayloadModel,
        metric: &str,
        from: PlotId,
        to: PlotId,
    ) {
        if from == to {
            return;
        }
        if self.plot(to).is_none() {
            return;
        }
        if !self.plot(from).is_some_and(|p| p.contains_metric(metric)) {
            return;
        }
        self.remove_metric_group(from, metric);
        self.add_metric_group(payload, to, metric);
    }

    /// Re-derive every plot's series from a fresh payload snapshot, keeping
    /// each plot's metric membership. Metrics missing from the new snapshot
    /// keep empty membership and may repopulate on a later refresh.
    pub fn refresh_all(&mut self, payload: &PayloadModel) {
        for pos in 0..self.plots.len() {
            let metrics: Vec<String> = self.plots[pos]
                .groups
                .iter()
                .map(|g| g.metric.clone())
                .collect();
            self.plots[pos].series.clear();
            self.plots[pos].groups.clear();

            for metric in metrics {
                if let Some(option) = payload.option(&metric) {
                    let color_index = self.color_for(&metric);
                    let built = build_series(payload, option, color_index, &mut self.next_series);
                    let plot = &mut self.plots[pos];
                    plot.groups.push(MetricGroup {
                        metric,
                        series_ids: built.iter().map(|s| s.id).collect(),
                    });
                    plot.series.extend(built);
                } else {
                    debug!(metric = %metric, "metric missing from refreshed payload");
                    self.plots[pos].groups.push(MetricGroup { metric, series_ids: Vec::new() });
                }
            }
            self.plots[pos].rescale();
        }
    }

    /// True when any plot holds the metric (sidebar chip indicator)
    pub fn metric_bound_anywhere(&self, metric: &str) -> bool {
        self.plots.iter().any(|p| p.contains_metric(metric))
    }

    /// True when the active plot holds the metric
    pub fn metric_on_active(&self, metric: &str) -> bool {
        self.active
            .and_then(|id| self.plot(id))
            .is_some_and(|p| p.contains_metric(metric))
    }

    /// Palette index of a metric, assigned on first use and cached
    pub fn color_for(&mut self, metric: &str) -> usize {
        if let Some(&index) = self.colors.get(metric) {
            return index;
        }
        let index = self.color_cursor % palette::SERIES.len();
        self.color_cursor += 1;
        self.colors.insert(metric.to_string(), index);
        index
    }
}

/// Construct the chart series of one metric from the payload snapshot.
/// Always yields at least one series so an empty metric still renders as an
/// empty line with its label.
fn build_series(
    payload: &PayloadModel,
    option: &MetricOption,
    color_index: usize,
    next_series: &mut u64,
) -> Vec<ChartSeries> {
    let axis = AxisKind::from_unit(option.unit);
    let mut alloc = |label: String, style: SeriesStyle, points, aggregates| {
        let id = SeriesId(*next_series);
        *next_series += 1;
        ChartSeries {
            id,
            metric: option.metric.clone(),
            label,
            unit: option.unit,
            axis,
            color_index,
            style,
            points,
            aggregates,
        }
    };

    match payload.series(&option.metric) {
        None => vec![alloc(option.label.clone(), SeriesStyle::default(), Vec::new(), None)],
        Some(SeriesData::Points(points)) => {
            let chart = chart_points(points, option.unit);
            vec![alloc(option.label.clone(), SeriesStyle::default(), chart, None)]
        }
        Some(SeriesData::Components(components)) => {
            if let Some(aggregates) = box_aggregates(components, option.unit) {
                // Statistics metric: the mean line carries the group, the
                // joined records drive the box overlay and tooltip
                let points = aggregates.iter().map(|a| [a.x, a.mean]).collect();
                vec![alloc(
                    option.label.clone(),
                    SeriesStyle { width: 3.0, dashed: false },
                    points,
                    Some(aggregates),
                )]
            } else {
                components
                    .iter()
                    .map(|component| {
                        let label = payload
                            .component_label(&option.metric, &component.key)
                            .unwrap_or(&component.key)
                            .to_string();
                        let chart = chart_points(&component.points, option.unit);
                        alloc(label, SeriesStyle::default(), chart, None)
                    })
                    .collect()
            }
        }
    }
}

/// Normalize raw samples into chart points, dropping invalid dates or values
fn chart_points(points: &[RawPoint], unit: MetricUnit) -> Vec<[f64; 2]> {
    points
        .iter()
        .filter_map(|p| {
            let instant = dates::to_fixed_zone_instant(p.date.as_ref()?)?;
            let y = normalize::normalize(p.value.as_ref(), unit)?;
            Some([dates::timestamp_secs(&instant), y])
        })
        .collect()
}

/// Strict inner join of the four statistic components on the normalized
/// timestamp. Returns `None` unless all four components are present; a
/// timestamp missing from any component is dropped.
fn box_aggregates(components: &[ComponentSeries], unit: MetricUnit) -> Option<Vec<BoxAggregate>> {
    let series_of = |key: &str| -> Option<Vec<(i64, f64)>> {
        let component = components.iter().find(|c| c.key == key)?;
        Some(
            component
                .points
                .iter()
                .filter_map(|p| {
                    let instant = dates::to_fixed_zone_instant(p.date.as_ref()?)?;
                    let y = normalize::normalize(p.value.as_ref(), unit)?;
                    Some((instant.timestamp_millis(), y))
                })
                .collect(),
        )
    };

    let min = series_of(stat_components::MIN)?;
    let max = series_of(stat_components::MAX)?;
    let avg = series_of(stat_components::AVG)?;
    let std = series_of(stat_components::STDDEV)?;

    let min: HashMap<i64, f64> = min.into_iter().collect();
    let max: HashMap<i64, f64> = max.into_iter().collect();
    let std: HashMap<i64, f64> = std.into_iter().collect();

    // Iterate the mean component so record order follows the mean line
    Some(
        avg.into_iter()
            .filter_map(|(t, mean)| {
                Some(BoxAggregate {
                    x: t as f64 / 1000.0,
                    min: *min.get(&t)?,
                    max: *max.get(&t)?,
                    mean,
                    std: *std.get(&t)?,
                })
            })
            .collect(),
    )
}
