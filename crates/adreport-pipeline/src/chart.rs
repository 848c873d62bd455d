//! Primary-metric analysis for the email visualization: pick a metric,
//! group its values by age bucket.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::dedupe::age_bucket;

/// Metrics considered for the visualization, in preference order. `spend`
/// is the default whenever it carries any nonzero value.
const KNOWN_METRICS: &[&str] = &[
    "spend",
    "clicks",
    "impressions",
    "reach",
    "conversions",
    "cost_per_conversion",
    "conversion_rate",
    "ctr",
    "cpc",
    "frequency",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Metric the chart visualizes.
    pub metric: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Group the primary metric by age bucket. The primary metric is `spend`
/// when it has nonzero values, otherwise the first known metric that does.
pub fn analyze(rows: &[Value]) -> ChartData {
    let metric = KNOWN_METRICS
        .iter()
        .find(|m| total(rows, m) > 0.0)
        .copied()
        .unwrap_or("spend");

    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        let Some(obj) = row.as_object() else { continue };
        if let Some(value) = metric_value(row, metric) {
            *buckets.entry(age_bucket(obj)).or_insert(0.0) += value;
        }
    }

    let (labels, values) = buckets.into_iter().unzip();
    ChartData {
        metric: metric.to_string(),
        labels,
        values,
    }
}

fn total(rows: &[Value], metric: &str) -> f64 {
    rows.iter().filter_map(|r| metric_value(r, metric)).sum()
}

/// Metric extraction mirrors the age normalization: flat meta rows first,
/// then the nested `metrics` object tiktok rows use. Values arrive as
/// numbers or numeric strings.
fn metric_value(row: &Value, metric: &str) -> Option<f64> {
    let direct = row.get(metric);
    let nested = row.get("metrics").and_then(|m| m.get(metric));
    as_f64(direct.or(nested)?)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spend_is_the_default_metric() {
        let rows = vec![
            json!({"age": "18-24", "spend": "100", "clicks": "5"}),
            json!({"age": "25-34", "spend": 200.5, "clicks": "9"}),
        ];
        let chart = analyze(&rows);
        assert_eq!(chart.metric, "spend");
        assert_eq!(chart.labels, vec!["18-24", "25-34"]);
        assert_eq!(chart.values, vec![100.0, 200.5]);
    }

    #[test]
    fn falls_back_to_first_nonzero_metric() {
        let rows = vec![
            json!({"age": "18-24", "spend": "0", "impressions": "1000"}),
            json!({"age": "25-34", "spend": 0, "impressions": "2500"}),
        ];
        let chart = analyze(&rows);
        assert_eq!(chart.metric, "impressions");
        assert_eq!(chart.values, vec![1000.0, 2500.0]);
    }

    #[test]
    fn nested_tiktok_metrics_are_read() {
        let rows = vec![
            json!({"dimensions": {"age": "18-24"}, "metrics": {"spend": "42.5"}}),
            json!({"dimensions": {"age": "25-34"}, "metrics": {"spend": "7.5"}}),
        ];
        let chart = analyze(&rows);
        assert_eq!(chart.metric, "spend");
        assert_eq!(chart.values, vec![42.5, 7.5]);
    }

    #[test]
    fn same_bucket_values_accumulate() {
        let rows = vec![
            json!({"age": "18-24", "date_start": "d1", "spend": "10"}),
            json!({"age": "18-24", "date_start": "d2", "spend": "15"}),
        ];
        let chart = analyze(&rows);
        assert_eq!(chart.labels, vec!["18-24"]);
        assert_eq!(chart.values, vec![25.0]);
    }

    #[test]
    fn no_usable_rows_yields_empty_chart() {
        let rows = vec![json!("not a record"), json!({"age": "18-24"})];
        let chart = analyze(&rows);
        assert!(chart.is_empty());
    }
}
