//! Inbound payload model
//!
//! Parses the service-insight JSON payload into typed lookups at the
//! ingestion boundary. Everything downstream works with validated types;
//! malformed payloads degrade to an explicit empty model.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::error::{InsightError, Result};

/// Measurement unit of a metric; decides which chart axis hosts it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricUnit {
    #[default]
    Count,
    Ratio,
    Hours,
}

/// Immutable description of one selectable metric
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOption {
    pub metric: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub unit: MetricUnit,
    #[serde(default)]
    pub multi_series: bool,
    #[serde(default)]
    pub default_active: bool,
}

/// A date as it appears on the wire: epoch milliseconds or a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

/// A value as it appears on the wire: a number or a numeric-looking string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Num(f64),
    Text(String),
}

/// One source sample; either side may be missing and is dropped at render time
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPoint {
    #[serde(default)]
    pub date: Option<DateInput>,
    #[serde(default)]
    pub value: Option<RawValue>,
}

/// One named component of a multi-series metric
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSeries {
    pub key: String,
    #[serde(default)]
    pub points: Vec<RawPoint>,
}

/// Source data of one metric: flat samples or named components
#[derive(Debug, Clone)]
pub enum SeriesData {
    Points(Vec<RawPoint>),
    Components(Vec<ComponentSeries>),
}

#[derive(Debug, Clone, Deserialize)]
struct WireSeries {
    metric: String,
    #[serde(default)]
    points: Option<Vec<RawPoint>>,
    #[serde(default)]
    components: Option<Vec<ComponentSeries>>,
}

/// Wire shape of the insight payload (`viewModel` in the AJAX envelope)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePayload {
    metric_options: Vec<MetricOption>,
    series: Vec<WireSeries>,
    component_labels: HashMap<String, HashMap<String, String>>,
}

/// Validated payload snapshot. Replaced wholesale on every range refresh.
#[derive(Debug, Clone, Default)]
pub struct PayloadModel {
    options: Vec<MetricOption>,
    series: HashMap<String, SeriesData>,
    component_labels: HashMap<String, HashMap<String, String>>,
}

impl PayloadModel {
    /// The no-data model the dashboard falls back to
    pub fn empty() -> Self {
        Self::default()
    }

    /// Strict parse of a payload JSON document
    pub fn parse(json: &str) -> Result<Self> {
        let wire: WirePayload =
            serde_json::from_str(json).map_err(|e| InsightError::Payload(e.to_string()))?;
        Ok(Self::from_wire(wire))
    }

    /// Parse that degrades to the empty model on malformed input
    pub fn from_json_lossy(json: &str) -> Self {
        match Self::parse(json) {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %e, "failed to parse insight payload; rendering empty");
                Self::empty()
            }
        }
    }

    /// Build the validated snapshot from the wire shape.
    /// First occurrence of a duplicate metric key wins.
    pub fn from_wire(wire: WirePayload) -> Self {
        let mut options: Vec<MetricOption> = Vec::with_capacity(wire.metric_options.len());
        for option in wire.metric_options {
            if options.iter().any(|o| o.metric == option.metric) {
                warn!(metric = %option.metric, "duplicate metric option dropped");
                continue;
            }
            options.push(option);
        }

        let mut series = HashMap::with_capacity(wire.series.len());
        for entry in wire.series {
            let data = match entry.components {
                Some(components) if !components.is_empty() => SeriesData::Components(components),
                _ => SeriesData::Points(entry.points.unwrap_or_default()),
            };
            if series.contains_key(&entry.metric) {
                warn!(metric = %entry.metric, "duplicate series dropped");
                continue;
            }
            series.insert(entry.metric, data);
        }

        Self {
            options,
            series,
            component_labels: wire.component_labels,
        }
    }

    /// Metric options in payload order
    pub fn options(&self) -> &[MetricOption] {
        &self.options
    }

    pub fn option(&self, metric: &str) -> Option<&MetricOption> {
        self.options.iter().find(|o| o.metric == metric)
    }

    pub fn series(&self, metric: &str) -> Option<&SeriesData> {
        self.series.get(metric)
    }

    /// Display label of one component of a multi-series metric
    pub fn component_label(&self, metric: &str, component: &str) -> Option<&str> {
        self.component_labels
            .get(metric)
            .and_then(|labels| labels.get(component))
            .map(String::as_str)
    }

    /// Metric keys flagged as active on first load, in payload order
    pub fn default_active_metrics(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| o.default_active)
            .map(|o| o.metric.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        serde_json::json!({
            "metricOptions": [
                {
                    "metric": "COLLECTION_TOTAL_COUNT",
                    "label": "누적 새록 수",
                    "description": "지금까지 등록된 새록의 총 개수입니다.",
                    "unit": "COUNT",
                    "multiSeries": false,
                    "defaultActive": true
                },
                {
                    "metric": "BIRD_ID_RESOLUTION_STATS",
                    "label": "동정 해결 시간",
                    "unit": "HOURS",
                    "multiSeries": true
                }
            ],
            "series": [
                {
                    "metric": "COLLECTION_TOTAL_COUNT",
                    "points": [
                        { "date": "2024-01-01", "value": 5 },
                        { "date": "2024-01-02", "value": "9" }
                    ]
                },
                {
                    "metric": "BIRD_ID_RESOLUTION_STATS",
                    "components": [
                        { "key": "avg_hours", "points": [{ "date": "2024-01-01", "value": 3.5 }] }
                    ]
                }
            ],
            "componentLabels": {
                "BIRD_ID_RESOLUTION_STATS": { "avg_hours": "평균" }
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_sample_payload() {
        let model = PayloadModel::parse(&sample_json()).unwrap();
        assert_eq!(model.options().len(), 2);

        let option = model.option("COLLECTION_TOTAL_COUNT").unwrap();
        assert_eq!(option.unit, MetricUnit::Count);
        assert!(option.default_active);

        match model.series("COLLECTION_TOTAL_COUNT").unwrap() {
            SeriesData::Points(points) => {
                assert_eq!(points.len(), 2);
                assert_eq!(points[1].value, Some(RawValue::Text("9".to_string())));
            }
            SeriesData::Components(_) => panic!("expected flat points"),
        }

        match model.series("BIRD_ID_RESOLUTION_STATS").unwrap() {
            SeriesData::Components(components) => assert_eq!(components[0].key, "avg_hours"),
            SeriesData::Points(_) => panic!("expected components"),
        }

        assert_eq!(
            model.component_label("BIRD_ID_RESOLUTION_STATS", "avg_hours"),
            Some("평균")
        );
        assert_eq!(model.default_active_metrics(), vec!["COLLECTION_TOTAL_COUNT"]);
    }

    #[test]
    fn test_malformed_payload_falls_back_to_empty() {
        let model = PayloadModel::from_json_lossy("{ not json");
        assert!(model.is_empty());
        assert!(model.option("COLLECTION_TOTAL_COUNT").is_none());
    }

    #[test]
    fn test_duplicate_metric_first_wins() {
        let json = serde_json::json!({
            "metricOptions": [
                { "metric": "A", "label": "first", "unit": "COUNT" },
                { "metric": "A", "label": "second", "unit": "RATIO" }
            ],
            "series": []
        })
        .to_string();
        let model = PayloadModel::parse(&json).unwrap();
        assert_eq!(model.options().len(), 1);
        assert_eq!(model.option("A").unwrap().label, "first");
    }

    #[test]
    fn test_missing_fields_default() {
        let model = PayloadModel::parse("{}").unwrap();
        assert!(model.is_empty());

        let json = serde_json::json!({
            "metricOptions": [{ "metric": "A", "label": "a", "unit": "COUNT" }],
            "series": [{ "metric": "A" }]
        })
        .to_string();
        let model = PayloadModel::parse(&json).unwrap();
        match model.series("A").unwrap() {
            SeriesData::Points(points) => assert!(points.is_empty()),
            SeriesData::Components(_) => panic!("expected empty points"),
        }
    }

    #[test]
    fn test_epoch_millis_date_input() {
        let json = serde_json::json!({
            "metricOptions": [{ "metric": "A", "label": "a", "unit": "COUNT" }],
            "series": [{ "metric": "A", "points": [{ "date": 1709218800000i64, "value": 1 }] }]
        })
        .to_string();
        let model = PayloadModel::parse(&json).unwrap();
        match model.series("A").unwrap() {
            SeriesData::Points(points) => {
                assert_eq!(points[0].date, Some(DateInput::Millis(1709218800000)));
            }
            SeriesData::Components(_) => panic!("expected flat points"),
        }
    }
}
