use crate::error::Result;
use crate::reports::{Chart, ChartKind};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct ChartOverviewRow {
    #[tabled(rename = "Chart")]
    title: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Points")]
    points: String,
    #[tabled(rename = "File")]
    file: String,
}

/// Write a chart's points as CSV: `name` then one column per metric.
pub fn write_chart_csv(path: &Path, chart: &Chart) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["name".to_string()];
    header.extend(chart.metrics.iter().cloned());
    wtr.write_record(&header)?;
    for point in &chart.points {
        let mut row = vec![point.name.clone()];
        row.extend(
            chart
                .metrics
                .iter()
                .map(|m| point.get(m).unwrap_or(0.0).to_string()),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// File name for a chart export, e.g. `03_roas_over_time.csv`.
pub fn chart_file_name(position: usize, chart: &Chart) -> String {
    let mut slug = String::new();
    for c in chart.title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    format!("{:02}_{}.csv", position + 1, slug.trim_end_matches('_'))
}

/// Write every chart to `out_dir`, returning the paths written.
pub fn export_charts(out_dir: &Path, charts: &[Chart]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(charts.len());
    for (i, chart) in charts.iter().enumerate() {
        let path = out_dir.join(chart_file_name(i, chart));
        write_chart_csv(&path, chart)?;
        written.push(path);
    }
    Ok(written)
}

/// Markdown preview of the first `max_rows` points of a chart.
pub fn render_chart(chart: &Chart, max_rows: usize) -> String {
    if chart.points.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    let mut header = vec!["name".to_string()];
    header.extend(chart.metrics.iter().cloned());
    builder.push_record(header);
    for point in chart.points.iter().take(max_rows) {
        let mut row = vec![point.name.clone()];
        row.extend(
            chart
                .metrics
                .iter()
                .map(|m| format_number(point.get(m).unwrap_or(0.0), 2)),
        );
        builder.push_record(row);
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_chart(chart: &Chart, max_rows: usize) {
    println!("{}", chart.title);
    println!("{}\n", render_chart(chart, max_rows));
}

pub fn preview_overview(charts: &[Chart], files: &[PathBuf]) {
    let rows: Vec<ChartOverviewRow> = charts
        .iter()
        .zip(files)
        .map(|(chart, file)| ChartOverviewRow {
            title: chart.title.clone(),
            kind: match chart.kind {
                ChartKind::TimeSeries => "time series",
                ChartKind::Category => "category",
            },
            points: format_int(chart.points.len()),
            file: file.display().to_string(),
        })
        .collect();
    if rows.is_empty() {
        println!("(no charts)\n");
        return;
    }
    println!("{}\n", Table::new(rows).with(Style::markdown()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AggregatePoint;

    fn chart() -> Chart {
        let mut p1 = AggregatePoint::new("2024-01-01");
        p1.values.insert("amountSpentUSD".into(), 1234.5);
        let p2 = AggregatePoint::new("2024-01-02");
        Chart {
            title: "Spend Over Time".into(),
            kind: ChartKind::TimeSeries,
            metrics: vec!["amountSpentUSD".into()],
            points: vec![p1, p2],
        }
    }

    #[test]
    fn chart_file_names_are_slugged() {
        assert_eq!(chart_file_name(0, &chart()), "01_spend_over_time.csv");
        let mut odd = chart();
        odd.title = "Reach & Impressions Over Time (CTR)".into();
        assert_eq!(chart_file_name(9, &odd), "10_reach_impressions_over_time_ctr.csv");
    }

    #[test]
    fn csv_export_fills_missing_metrics_with_zero() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_charts(dir.path(), &[chart()]).unwrap();
        let text = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(text, "name,amountSpentUSD\n2024-01-01,1234.5\n2024-01-02,0\n");
    }

    #[test]
    fn preview_formats_numbers() {
        let rendered = render_chart(&chart(), 1);
        assert!(rendered.contains("1,234.50"));
        assert!(!rendered.contains("2024-01-02"));
    }
}
