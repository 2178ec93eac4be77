//! A single measurement: read one file, encrypt it once, write the ciphertext out.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use cpu_time::ProcessTime;
use log::debug;
use serde::Serialize;

use crate::cipher::{CipherKey, CipherKind};
use crate::config::CIPHERTEXT_EXTENSION;

/// One row of `raw_results.csv`. Field order is the column order.
#[derive(Debug, Clone, Serialize)]
pub struct TrialRecord {
    pub file: PathBuf,
    #[serde(rename = "filesize_bytes")]
    pub file_size: u64,
    pub cipher: CipherKind,
    /// File read plus encryption.
    #[serde(rename = "wall_time_sec")]
    pub wall_secs: f64,
    /// Encryption only.
    #[serde(rename = "cpu_time_sec")]
    pub cpu_secs: f64,
    pub output_file: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub bytes_processed: u64,
    #[serde(rename = "iter")]
    pub iteration: usize,
}

/// Where the ciphertext of `input` under `cipher` is written: `<outdir>/<file name>.<cipher>.ct`.
pub fn output_path(input: &Path, cipher: CipherKind, output_dir: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| anyhow!("{} has no file name", input.display()))?;
    let mut out_name = name.to_os_string();
    out_name.push(format!(".{}.{}", cipher.file_tag(), CIPHERTEXT_EXTENSION));
    Ok(output_dir.join(out_name))
}

/// Runs one trial. Nothing is retried; a failed write may leave a partial output file behind.
pub fn run_trial(
    input: &Path,
    cipher: CipherKind,
    key: &CipherKey,
    output_dir: &Path,
    iteration: usize,
) -> Result<TrialRecord> {
    let file_size = fs::metadata(input)
        .with_context(|| format!("reading metadata of {}", input.display()))?
        .len();

    let read_start = Instant::now();
    let plaintext = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let read_elapsed = read_start.elapsed();

    let wall_start = Instant::now();
    let cpu_start = ProcessTime::try_now().context("reading process CPU time")?;
    let ciphertext = cipher.encrypt(key, &plaintext)?;
    let cpu_elapsed = cpu_start.try_elapsed().context("reading process CPU time")?;
    let encrypt_elapsed = wall_start.elapsed();

    let output_file = output_path(input, cipher, output_dir)?;
    fs::write(&output_file, &ciphertext).with_context(|| format!("writing {}", output_file.display()))?;
    debug!(
        "{} -> {} ({} bytes, read {:.3}s)",
        input.display(),
        output_file.display(),
        ciphertext.len(),
        read_elapsed.as_secs_f64()
    );

    Ok(TrialRecord {
        file: input.to_path_buf(),
        file_size,
        cipher,
        wall_secs: (read_elapsed + encrypt_elapsed).as_secs_f64(),
        cpu_secs: cpu_elapsed.as_secs_f64(),
        output_file,
        timestamp: Utc::now(),
        bytes_processed: plaintext.len() as u64,
        iteration,
    })
}
