//! HTML rendering for report delivery emails.
//!
//! Inline styles only — email clients strip stylesheet blocks. The layout
//! is a summary section, a bar-style table of the primary metric by age
//! bucket, a platform/date-range card pair, and a view-report link.

use adreport_core::types::{DateRange, Platform};
use serde_json::Value;

use crate::chart::{self, ChartData};

pub fn render_report_email(
    platform: Platform,
    date_range: DateRange,
    rows: &[Value],
    summary: &str,
    view_url: &str,
) -> String {
    let chart = chart::analyze(rows);
    let chart_html = render_bar_table(&chart);

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="margin:0;padding:0;background-color:#f8f9fa;font-family:Helvetica,Arial,sans-serif;color:#333;">
  <div style="max-width:600px;margin:0 auto;background-color:#ffffff;border-radius:8px;overflow:hidden;">
    <div style="background-color:#4f46e5;color:white;padding:32px 24px;text-align:center;">
      <h1 style="margin:0;font-size:24px;">Your Scheduled Report</h1>
      <p style="margin:8px 0 0 0;opacity:0.9;">Here's your automated insight report.</p>
    </div>
    <div style="padding:32px 24px;">
      <h2 style="font-size:18px;color:#1f2937;">Summary</h2>
      <div style="background-color:#eef2ff;border-left:4px solid #4f46e5;padding:16px;border-radius:6px;">
        <p style="margin:0;line-height:1.6;">{summary}</p>
      </div>
      <h2 style="font-size:18px;color:#1f2937;margin-top:28px;">Performance</h2>
      {chart_html}
      <table style="width:100%;border-collapse:collapse;margin-top:20px;font-size:14px;">
        <tr>
          <td style="padding:12px;background-color:#f8f9fa;border-radius:6px;">
            <strong style="color:#6b7280;">Platform</strong><br>{platform}
          </td>
          <td style="width:12px;"></td>
          <td style="padding:12px;background-color:#f8f9fa;border-radius:6px;">
            <strong style="color:#6b7280;">Date range</strong><br>{date_range}
          </td>
        </tr>
      </table>
      <div style="text-align:center;margin:32px 0 8px 0;">
        <a href="{view_url}" style="display:inline-block;background-color:#4f46e5;color:white;padding:12px 28px;text-decoration:none;border-radius:6px;font-weight:600;">View Full Report</a>
      </div>
    </div>
    <div style="padding:16px 24px;border-top:1px solid #e5e7eb;text-align:center;">
      <p style="margin:0;font-size:12px;color:#6b7280;">Generated by Adreport Scheduled Reports</p>
    </div>
  </div>
</body>
</html>"#,
    )
}

/// Email-safe bar chart: a table row per bucket with a proportional inline
/// div standing in for the bar.
fn render_bar_table(chart: &ChartData) -> String {
    if chart.is_empty() {
        return r#"<p style="color:#6b7280;font-style:italic;">No data available for visualization</p>"#
            .to_string();
    }

    let max = chart.values.iter().cloned().fold(f64::MIN, f64::max);
    let rows: String = chart
        .labels
        .iter()
        .zip(&chart.values)
        .map(|(label, &value)| {
            let percentage = if max > 0.0 { value / max * 100.0 } else { 0.0 };
            // Keep even the smallest bar visible.
            let width = percentage.max(5.0);
            format!(
                r#"<tr>
          <td style="padding:8px 12px;border-bottom:1px solid #e5e7eb;color:#374151;">{label}</td>
          <td style="padding:8px 12px;border-bottom:1px solid #e5e7eb;width:200px;">
            <div style="background-color:#f3f4f6;border-radius:4px;height:18px;"><div style="background-color:#4f46e5;height:100%;width:{width:.0}%;border-radius:4px;"></div></div>
          </td>
          <td style="padding:8px 12px;border-bottom:1px solid #e5e7eb;text-align:right;color:#6b7280;">{}</td>
        </tr>"#,
                format_value(&chart.metric, value)
            )
        })
        .collect();

    format!(
        r#"<table style="width:100%;border-collapse:collapse;font-size:14px;">
        <tr>
          <th style="padding:10px 12px;text-align:left;border-bottom:2px solid #e5e7eb;color:#374151;">Age group</th>
          <th style="padding:10px 12px;text-align:left;border-bottom:2px solid #e5e7eb;color:#374151;">{}</th>
          <th style="padding:10px 12px;text-align:right;border-bottom:2px solid #e5e7eb;color:#374151;">Value</th>
        </tr>
        {rows}
      </table>"#,
        capitalize(&chart.metric)
    )
}

fn format_value(metric: &str, value: f64) -> String {
    let formatted = if value >= 1000.0 {
        format!("{:.1}k", value / 1000.0)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    };
    if metric == "spend" {
        format!("${formatted}")
    } else {
        formatted
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + c.as_str(),
    }
}
