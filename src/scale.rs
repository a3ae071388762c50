//! Axis auto-scaling
//!
//! Computes "nice" rounded axis bounds and step sizes from the values bound
//! to each axis of a plot. Count axes are integer-constrained, the ratio axis
//! is clamped to 0..100 percent, and the hours axis is continuous.

use crate::constants::scale::{
    COUNT_TICKS, HOURS_TICKS, RATIO_AXIS_MAX, RATIO_AXIS_MIN, RATIO_FINE_STEP_RANGE,
};
use crate::data::payload::MetricUnit;

/// The three logical y axes a plot can host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Count,
    Ratio,
    Hours,
}

impl AxisKind {
    pub fn from_unit(unit: MetricUnit) -> Self {
        match unit {
            MetricUnit::Count => AxisKind::Count,
            MetricUnit::Ratio => AxisKind::Ratio,
            MetricUnit::Hours => AxisKind::Hours,
        }
    }
}

/// Rounded axis bounds and tick step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NiceScale {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NiceScale {
    /// Position of a value inside the scale, 0 at min and 1 at max
    pub fn fraction(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.5;
        }
        (v - self.min) / span
    }

    /// Tick values from min to max inclusive
    pub fn ticks(&self) -> Vec<f64> {
        let mut ticks = Vec::new();
        let mut v = self.min;
        // Half-step tolerance absorbs float accumulation
        while v <= self.max + self.step * 0.5 {
            ticks.push(v);
            v += self.step;
        }
        ticks
    }
}

/// Pick a round number of form {1, 2, 5, 10} x 10^n near `x`
fn nice_num(x: f64, round: bool) -> f64 {
    let x = x.max(1e-9);
    let exp = x.log10().floor();
    let f = x / 10f64.powf(exp);
    let nf = if round {
        if f < 1.5 {
            1.0
        } else if f < 3.0 {
            2.0
        } else if f < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if f <= 1.0 {
        1.0
    } else if f <= 2.0 {
        2.0
    } else if f <= 5.0 {
        5.0
    } else {
        10.0
    };
    nf * 10f64.powf(exp)
}

/// Snap a raw value range to nice bounds with roughly `max_ticks` ticks
fn nice_scale(min: f64, max: f64, max_ticks: usize, integer_only: bool) -> NiceScale {
    let range = (max - min).max(1e-9);
    let mut step = nice_num(range / (max_ticks.saturating_sub(1)).max(2) as f64, true);
    if integer_only {
        step = step.round().max(1.0);
    }
    NiceScale {
        min: (min / step).floor() * step,
        max: (max / step).ceil() * step,
        step,
    }
}

/// Per-plot axis scales; `None` means the axis has no bound data and is hidden
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlotScales {
    pub count: Option<NiceScale>,
    pub ratio: Option<NiceScale>,
    pub hours: Option<NiceScale>,
}

impl PlotScales {
    pub fn get(&self, axis: AxisKind) -> Option<&NiceScale> {
        match axis {
            AxisKind::Count => self.count.as_ref(),
            AxisKind::Ratio => self.ratio.as_ref(),
            AxisKind::Hours => self.hours.as_ref(),
        }
    }

    /// True when both right-hand axes are visible and their tick columns need
    /// to be offset apart
    pub fn both_right_axes(&self) -> bool {
        self.ratio.is_some() && self.hours.is_some()
    }
}

/// Compute the scales of one plot from its bound (axis, y) values
pub fn compute_scales<I>(values: I) -> PlotScales
where
    I: IntoIterator<Item = (AxisKind, f64)>,
{
    let mut count = Vec::new();
    let mut ratio = Vec::new();
    let mut hours = Vec::new();
    for (axis, v) in values {
        if !v.is_finite() {
            continue;
        }
        match axis {
            AxisKind::Count => count.push(v),
            AxisKind::Ratio => ratio.push(v),
            AxisKind::Hours => hours.push(v),
        }
    }

    PlotScales {
        count: axis_scale(AxisKind::Count, &count),
        ratio: axis_scale(AxisKind::Ratio, &ratio),
        hours: axis_scale(AxisKind::Hours, &hours),
    }
}

fn axis_scale(axis: AxisKind, values: &[f64]) -> Option<NiceScale> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if values.is_empty() {
        return None;
    }
    if min == max {
        min -= 1.0;
        max += 1.0;
    }

    match axis {
        AxisKind::Count => Some(nice_scale(min, max, COUNT_TICKS, true)),
        AxisKind::Hours => Some(nice_scale(min, max, HOURS_TICKS, false)),
        AxisKind::Ratio => Some(ratio_scale(min, max)),
    }
}

/// Ratio axis: clamped to 0..100 with a 5-step for narrow data, 10 otherwise
fn ratio_scale(min: f64, max: f64) -> NiceScale {
    let step = if max - min <= RATIO_FINE_STEP_RANGE { 5.0 } else { 10.0 };
    let mut lo = ((min / step).floor() * step).max(RATIO_AXIS_MIN);
    let mut hi = ((max / step).ceil() * step).min(RATIO_AXIS_MAX);
    if hi <= lo {
        lo = (hi - step).max(RATIO_AXIS_MIN);
        if hi <= lo {
            hi = lo + step;
        }
    }
    NiceScale { min: lo, max: hi, step }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_axis_contains_data_with_integer_step() {
        let scales = compute_scales([(AxisKind::Count, 3.0), (AxisKind::Count, 7.0)]);
        let count = scales.count.unwrap();
        assert!(count.min <= 3.0);
        assert!(count.max >= 7.0);
        assert_eq!(count.step.fract(), 0.0);
        assert!(count.step >= 1.0);
        assert!(scales.ratio.is_none());
        assert!(scales.hours.is_none());
    }

    #[test]
    fn test_degenerate_single_value_widens() {
        let scales = compute_scales([(AxisKind::Count, 5.0)]);
        let count = scales.count.unwrap();
        assert!(count.min <= 4.0);
        assert!(count.max >= 6.0);
    }

    #[test]
    fn test_empty_axis_is_hidden() {
        let scales = compute_scales(std::iter::empty());
        assert_eq!(scales, PlotScales::default());
        assert!(!scales.both_right_axes());
    }

    #[test]
    fn test_non_finite_values_ignored() {
        let scales = compute_scales([(AxisKind::Hours, f64::NAN), (AxisKind::Hours, 3.0)]);
        let hours = scales.hours.unwrap();
        assert!(hours.min <= 2.0 && hours.max >= 4.0);
    }

    #[test]
    fn test_ratio_step_selection_and_clamp() {
        // Narrow range gets the fine step
        let narrow = compute_scales([(AxisKind::Ratio, 12.0), (AxisKind::Ratio, 28.0)]);
        let narrow = narrow.ratio.unwrap();
        assert_eq!(narrow.step, 5.0);
        assert!(narrow.min >= 0.0 && narrow.max <= 100.0);
        assert!(narrow.min <= 12.0 && narrow.max >= 28.0);

        // Wide range gets the coarse step
        let wide = compute_scales([(AxisKind::Ratio, 5.0), (AxisKind::Ratio, 95.0)]);
        let wide = wide.ratio.unwrap();
        assert_eq!(wide.step, 10.0);
        assert_eq!(wide.min, 0.0);
        assert_eq!(wide.max, 100.0);
    }

    #[test]
    fn test_ratio_pegged_at_clamp_edge_keeps_span() {
        let scales = compute_scales([(AxisKind::Ratio, 100.0)]);
        let ratio = scales.ratio.unwrap();
        assert!(ratio.max <= 100.0);
        assert!(ratio.min < ratio.max);
    }

    #[test]
    fn test_ticks_cover_scale_inclusive() {
        let scale = NiceScale { min: 0.0, max: 10.0, step: 2.0 };
        assert_eq!(scale.ticks(), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_fraction_maps_bounds() {
        let scale = NiceScale { min: 10.0, max: 20.0, step: 2.0 };
        assert_eq!(scale.fraction(10.0), 0.0);
        assert_eq!(scale.fraction(20.0), 1.0);
        assert_eq!(scale.fraction(15.0), 0.5);
    }

    #[test]
    fn test_both_right_axes_flag() {
        let scales = compute_scales([(AxisKind::Ratio, 50.0), (AxisKind::Hours, 4.0)]);
        assert!(scales.both_right_axes());
    }
}
