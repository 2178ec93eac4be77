//! The measurement matrix: every file, every cipher, every iteration, strictly in sequence.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, error, info};

use crate::cipher::{CipherKind, KeySet};
use crate::config::BenchConfig;
use crate::trial::{output_path, run_trial, TrialRecord};

/// A trial that did not produce a record.
#[derive(Debug, Clone)]
pub struct TrialFailure {
    pub file: PathBuf,
    pub cipher: CipherKind,
    pub iteration: usize,
    pub error: String,
}

#[derive(Debug)]
pub struct BenchRun {
    pub records: Vec<TrialRecord>,
    pub failures: Vec<TrialFailure>,
    pub elapsed: Duration,
}

/// Formats a byte count with 1024-based units and two decimals.
pub fn human_bytes(n: u64) -> String {
    let mut value = n as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{value:.2}{unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2}PB")
}

/// Runs the whole matrix. Keys are generated once up front and reused for every trial
/// of their cipher. A failed trial is logged and skipped.
pub fn run_benchmark(config: &BenchConfig) -> Result<BenchRun> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output directory {}", config.output_dir.display()))?;
    let keys = KeySet::generate();
    let run = run_matrix(config, &keys);
    if !config.keep_outputs {
        info!("Cleaning up ciphertext files ...");
        remove_outputs(&config.files, &config.output_dir);
    }
    Ok(run)
}

fn run_matrix(config: &BenchConfig, keys: &KeySet) -> BenchRun {
    let iters = config.iterations;
    let total_runs = config.files.len() * CipherKind::ALL.len() * iters;
    info!(
        "Starting benchmark: {} files x {} ciphers x {} iters = {} runs",
        config.files.len(),
        CipherKind::ALL.len(),
        iters,
        total_runs
    );
    info!("Output directory: {}", config.output_dir.display());

    let mut records = Vec::with_capacity(total_runs);
    let mut failures = Vec::new();
    let start_all = Instant::now();
    for file in &config.files {
        match fs::metadata(file) {
            Ok(meta) => info!("File: {} ({})", file.display(), human_bytes(meta.len())),
            Err(_) => info!("File: {}", file.display()),
        }
        for cipher in CipherKind::ALL {
            info!("  Cipher: {}", cipher);
            for i in 1..=iters {
                match run_trial(file, cipher, keys.get(cipher), &config.output_dir, i) {
                    Ok(record) => {
                        info!(
                            "    Iter {}/{} done: wall {:.3}s cpu {:.3}s",
                            i, iters, record.wall_secs, record.cpu_secs
                        );
                        records.push(record);
                    }
                    Err(e) => {
                        error!("    Iter {}/{} ERROR: {:#}", i, iters, e);
                        failures.push(TrialFailure {
                            file: file.clone(),
                            cipher,
                            iteration: i,
                            error: format!("{e:#}"),
                        });
                    }
                }
            }
        }
    }
    let elapsed = start_all.elapsed();
    info!("All runs finished in {:.2} seconds.", elapsed.as_secs_f64());

    BenchRun {
        records,
        failures,
        elapsed,
    }
}

/// Best effort: removal errors, including files that were never written, are ignored.
fn remove_outputs(files: &[PathBuf], output_dir: &Path) {
    let targets: BTreeSet<PathBuf> = files
        .iter()
        .flat_map(|file| CipherKind::ALL.into_iter().filter_map(move |c| output_path(file, c, output_dir).ok()))
        .collect();
    for target in targets {
        if fs::remove_file(&target).is_ok() {
            debug!("removed {}", target.display());
        }
    }
}
