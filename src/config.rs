//! Run configuration, defaults and output file names.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

pub const DEFAULT_ITERATIONS: usize = 10;
pub const DEFAULT_OUTPUT_DIR: &str = "benchmark_results";

pub const RAW_RESULTS_FILE: &str = "raw_results.csv";
pub const SUMMARY_FILE: &str = "summary_avg.csv";
pub const WALL_CHART_FILE: &str = "time_avg.svg";
pub const CPU_CHART_FILE: &str = "cpu_avg.svg";
pub const CIPHERTEXT_EXTENSION: &str = "ct";

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A canonical file size a measurement is grouped under when it lies
/// strictly within `tolerance_mb` of `target_mb`.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeBucket {
    pub label: String,
    pub target_mb: f64,
    pub tolerance_mb: f64,
}

impl SizeBucket {
    pub fn new(label: &str, target_mb: f64, tolerance_mb: f64) -> Self {
        SizeBucket {
            label: label.to_string(),
            target_mb,
            tolerance_mb,
        }
    }

    pub fn matches(&self, size_bytes: u64) -> bool {
        let size_mb = size_bytes as f64 / BYTES_PER_MB;
        (size_mb - self.target_mb).abs() < self.tolerance_mb
    }

    /// Parses `LABEL=MB:TOL`, e.g. `2GB=2048:150`.
    pub fn parse(text: &str) -> Result<Self> {
        let (label, rest) = text
            .split_once('=')
            .ok_or_else(|| anyhow!("expected LABEL=MB:TOL, got {text:?}"))?;
        let (target, tolerance) = rest
            .split_once(':')
            .ok_or_else(|| anyhow!("expected LABEL=MB:TOL, got {text:?}"))?;
        let label = label.trim();
        if label.is_empty() {
            bail!("empty bucket label in {text:?}");
        }
        let target_mb: f64 = target.trim().parse().with_context(|| format!("bad target size in {text:?}"))?;
        let tolerance_mb: f64 = tolerance.trim().parse().with_context(|| format!("bad tolerance in {text:?}"))?;
        if !target_mb.is_finite() || !tolerance_mb.is_finite() || tolerance_mb <= 0.0 {
            bail!("bucket {text:?} needs a finite size and a positive tolerance");
        }
        Ok(SizeBucket::new(label, target_mb, tolerance_mb))
    }
}

/// The buckets used when none are given on the command line. Order matters: the first match wins.
pub fn default_size_buckets() -> Vec<SizeBucket> {
    vec![
        SizeBucket::new("10MB", 10.0, 1.0),
        SizeBucket::new("100MB", 100.0, 5.0),
        SizeBucket::new("500MB", 500.0, 20.0),
        SizeBucket::new("1GB", 1024.0, 100.0),
    ]
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub files: Vec<PathBuf>,
    pub iterations: usize,
    pub output_dir: PathBuf,
    pub keep_outputs: bool,
    pub size_buckets: Vec<SizeBucket>,
}

impl BenchConfig {
    pub fn new(files: Vec<PathBuf>) -> Self {
        BenchConfig {
            files,
            iterations: DEFAULT_ITERATIONS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            keep_outputs: false,
            size_buckets: default_size_buckets(),
        }
    }

    /// Input paths that do not exist, in the order given.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        self.files.iter().filter(|f| !f.exists()).cloned().collect()
    }

    pub fn raw_results_path(&self) -> PathBuf {
        self.output_dir.join(RAW_RESULTS_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE)
    }

    pub fn wall_chart_path(&self) -> PathBuf {
        self.output_dir.join(WALL_CHART_FILE)
    }

    pub fn cpu_chart_path(&self) -> PathBuf {
        self.output_dir.join(CPU_CHART_FILE)
    }
}
