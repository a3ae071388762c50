//! Application-wide constants and default values
//!
//! This module centralizes all magic numbers and default values used throughout
//! the application, making them easier to maintain and configure.

/// Chart palette shared by all plots (metric colors are assigned from this in
/// order and cached per metric key)
pub mod palette {
    /// Series colors, RGB
    pub const SERIES: [(u8, u8, u8); 10] = [
        (37, 99, 235),  // Blue
        (22, 163, 74),  // Green
        (220, 38, 38),  // Red
        (249, 115, 22), // Orange
        (147, 51, 234), // Purple
        (14, 165, 233), // Sky
        (5, 150, 105),  // Emerald
        (234, 88, 12),  // Dark orange
        (59, 130, 246), // Light blue
        (20, 184, 166), // Teal
    ];
}

/// Value normalization and display formatting
pub mod units {
    /// Ratio values at or below this are treated as fractions and scaled to
    /// percent; larger values are assumed to already be percentages
    pub const RATIO_FRACTION_MAX: f64 = 1.000001;

    /// Hours per day, for adaptive duration formatting
    pub const HOURS_PER_DAY: f64 = 24.0;

    /// Hours per month (30 days), for adaptive duration formatting
    pub const HOURS_PER_MONTH: f64 = 720.0;
}

/// Axis auto-scaling defaults
pub mod scale {
    /// Target tick count on the count axis (integer-constrained)
    pub const COUNT_TICKS: usize = 7;

    /// Target tick count on the hours axis
    pub const HOURS_TICKS: usize = 6;

    /// Ratio axis uses a 5-step when the data range is at most this wide,
    /// a 10-step otherwise
    pub const RATIO_FINE_STEP_RANGE: f64 = 30.0;

    /// Ratio axis hard bounds (percent)
    pub const RATIO_AXIS_MIN: f64 = 0.0;
    pub const RATIO_AXIS_MAX: f64 = 100.0;
}

/// Date/time handling
pub mod datetime {
    /// Offset of the fixed reference zone (Asia/Seoul, no DST) in seconds.
    /// Date-only values are pinned to midnight in this zone so daily buckets
    /// render identically regardless of the host timezone.
    pub const FIXED_ZONE_OFFSET_SECS: i32 = 9 * 3600;

    /// Length of a date-only string (`YYYY-MM-DD`)
    pub const DATE_ONLY_LENGTH: usize = 10;
}

/// Metric component keys of the resolution-time statistics series.
/// A component set carrying all four is aggregated into box-plot records.
pub mod stat_components {
    pub const MIN: &str = "min_hours";
    pub const MAX: &str = "max_hours";
    pub const AVG: &str = "avg_hours";
    pub const STDDEV: &str = "stddev_hours";
}

/// Drag-and-drop behavior
pub mod drag {
    /// Pointer movement (in points) required before a press becomes a drag
    pub const START_THRESHOLD: f32 = 6.0;
}

/// UI layout defaults
pub mod layout {
    /// Left panel (metric chips) default width
    pub const METRIC_PANEL_WIDTH: f32 = 230.0;

    /// Minimum height of a plot card's chart area
    pub const PLOT_MIN_HEIGHT: f32 = 240.0;

    /// Fraction of the x span reserved between tick labels and the plot edge
    pub const AXIS_LABEL_GAP: f64 = 0.015;

    /// Extra outward offset for the hours tick column when the ratio axis is
    /// also visible on the same plot
    pub const HOURS_AXIS_OFFSET: f64 = 0.055;
}

/// Network defaults
pub mod net {
    /// Request timeout for the range re-query and upload exchanges
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;

    /// Path of the insight data endpoint, relative to the configured base URL
    pub const INSIGHT_PATH: &str = "/service-insight";

    /// Path of the presigned-upload endpoint, relative to the base URL
    pub const PRESIGN_PATH: &str = "/ads/image/presign";
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "insight-oxide.json";

    /// Environment variable overriding the endpoint base URL
    pub const BASE_URL_ENV: &str = "INSIGHT_BASE_URL";

    /// Default endpoint base URL
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
}
