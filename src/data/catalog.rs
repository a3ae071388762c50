//! Static sidebar grouping of metrics into named categories
//!
//! Categories are keyed off the backend's metric-key prefixes so a payload
//! carrying new metrics still lands somewhere sensible.

use crate::data::payload::{MetricOption, PayloadModel};

/// Sidebar category a metric belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    /// 새록 (collection) metrics
    Collection,
    /// 동정 요청 (bird identification) metrics
    BirdId,
    /// Everything else
    Others,
}

impl MetricCategory {
    /// Fixed presentation order
    pub const ALL: [MetricCategory; 3] = [
        MetricCategory::Collection,
        MetricCategory::BirdId,
        MetricCategory::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricCategory::Collection => "새록",
            MetricCategory::BirdId => "동정 요청",
            MetricCategory::Others => "기타",
        }
    }
}

/// Category of a metric key, by backend prefix
pub fn category_for(metric: &str) -> MetricCategory {
    if metric.starts_with("COLLECTION_") {
        MetricCategory::Collection
    } else if metric.starts_with("BIRD_ID_") {
        MetricCategory::BirdId
    } else {
        MetricCategory::Others
    }
}

/// Non-empty categories in fixed order, preserving payload option order
/// within each
pub fn grouped_options(payload: &PayloadModel) -> Vec<(MetricCategory, Vec<&MetricOption>)> {
    MetricCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&MetricOption> = payload
                .options()
                .iter()
                .filter(|o| category_for(&o.metric) == category)
                .collect();
            (!members.is_empty()).then_some((category, members))
        })
        .collect()
}
