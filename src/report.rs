//! Size labelling, per-group statistics and the CSV/chart outputs of a run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::chart::{render_grouped_bars, BarChart};
use crate::cipher::CipherKind;
use crate::config::{BenchConfig, SizeBucket};
use crate::trial::TrialRecord;

const RAW_COLUMNS: [&str; 9] = [
    "file",
    "filesize_bytes",
    "cipher",
    "wall_time_sec",
    "cpu_time_sec",
    "output_file",
    "timestamp",
    "bytes_processed",
    "iter",
];

const SUMMARY_COLUMNS: [&str; 8] = [
    "size_label",
    "cipher",
    "runs",
    "avg_wall_sec",
    "std_wall_sec",
    "avg_cpu_sec",
    "std_cpu_sec",
    "bytes_processed",
];

/// Statistics of one (size label, cipher) group. Standard deviations are sample
/// deviations and are `None` for groups with fewer than two runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub size_label: String,
    pub cipher: CipherKind,
    pub runs: usize,
    pub avg_wall_sec: f64,
    pub std_wall_sec: Option<f64>,
    pub avg_cpu_sec: f64,
    pub std_cpu_sec: Option<f64>,
    pub bytes_processed: f64,
}

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub raw: PathBuf,
    pub summary: PathBuf,
    pub wall_chart: Option<PathBuf>,
    pub cpu_chart: Option<PathBuf>,
}

/// Label of the first bucket containing `size_bytes`, else the base name of `file`.
pub fn size_label(file: &Path, size_bytes: u64, buckets: &[SizeBucket]) -> String {
    buckets
        .iter()
        .find(|b| b.matches(size_bytes))
        .map(|b| b.label.clone())
        .unwrap_or_else(|| {
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string())
        })
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.std_dev())
}

/// Groups records by (size label, cipher), ordered by label then cipher.
pub fn aggregate(records: &[TrialRecord], buckets: &[SizeBucket]) -> Vec<AggregateRow> {
    let groups: BTreeMap<(String, CipherKind), Vec<&TrialRecord>> = records
        .iter()
        .into_group_map_by(|r| (size_label(&r.file, r.file_size, buckets), r.cipher))
        .into_iter()
        .collect();

    groups
        .into_iter()
        .map(|((size_label, cipher), group)| {
            let wall = group.iter().map(|r| r.wall_secs).collect_vec();
            let cpu = group.iter().map(|r| r.cpu_secs).collect_vec();
            let bytes = group.iter().map(|r| r.bytes_processed as f64).collect_vec();
            AggregateRow {
                size_label,
                cipher,
                runs: group.len(),
                avg_wall_sec: wall.as_slice().mean(),
                std_wall_sec: sample_std_dev(&wall),
                avg_cpu_sec: cpu.as_slice().mean(),
                std_cpu_sec: sample_std_dev(&cpu),
                bytes_processed: bytes.as_slice().mean(),
            }
        })
        .collect()
}

fn write_csv<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_raw_results(path: &Path, records: &[TrialRecord]) -> Result<()> {
    write_csv(path, &RAW_COLUMNS, records).with_context(|| format!("writing raw results to {}", path.display()))
}

pub fn write_summary(path: &Path, rows: &[AggregateRow]) -> Result<()> {
    write_csv(path, &SUMMARY_COLUMNS, rows).with_context(|| format!("writing summary to {}", path.display()))
}

fn chart_from<F>(title: &str, y_desc: &str, rows: &[AggregateRow], value: F) -> BarChart
where
    F: Fn(&AggregateRow) -> f64,
{
    let categories = rows.iter().map(|r| r.size_label.clone()).unique().collect_vec();
    let series = CipherKind::ALL
        .iter()
        .filter(|c| rows.iter().any(|r| r.cipher == **c))
        .map(|c| {
            let values = categories
                .iter()
                .map(|label| {
                    rows.iter()
                        .find(|r| &r.size_label == label && r.cipher == *c)
                        .map(&value)
                })
                .collect_vec();
            (c.name().to_string(), values)
        })
        .collect_vec();
    BarChart {
        title: title.to_string(),
        x_desc: "File size".to_string(),
        y_desc: y_desc.to_string(),
        categories,
        series,
    }
}

/// Writes the raw table first so it survives any later failure, then the summary and both charts.
pub fn write_report(config: &BenchConfig, records: &[TrialRecord]) -> Result<ReportPaths> {
    let raw = config.raw_results_path();
    write_raw_results(&raw, records)?;
    info!("Saved raw results to {}", raw.display());

    let rows = aggregate(records, &config.size_buckets);
    let summary = config.summary_path();
    write_summary(&summary, &rows)?;
    info!("Saved summary averages to {}", summary.display());

    if rows.is_empty() {
        warn!("No successful trials, skipping charts");
        return Ok(ReportPaths {
            raw,
            summary,
            wall_chart: None,
            cpu_chart: None,
        });
    }

    let wall_chart = config.wall_chart_path();
    let chart = chart_from(
        "Average Wall Time (sec): AES-GCM vs ChaCha20-Poly1305",
        "Average wall time (s)",
        &rows,
        |r| r.avg_wall_sec,
    );
    render_grouped_bars(&wall_chart, &chart)?;
    info!("Saved chart {}", wall_chart.display());

    let cpu_chart = config.cpu_chart_path();
    let chart = chart_from(
        "Average CPU Time (sec): AES-GCM vs ChaCha20-Poly1305",
        "Average CPU time (s)",
        &rows,
        |r| r.avg_cpu_sec,
    );
    render_grouped_bars(&cpu_chart, &chart)?;
    info!("Saved chart {}", cpu_chart.display());

    Ok(ReportPaths {
        raw,
        summary,
        wall_chart: Some(wall_chart),
        cpu_chart: Some(cpu_chart),
    })
}
