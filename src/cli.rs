//! Command-line options and the top-level run.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use crate::bench::{run_benchmark, BenchRun};
use crate::config::{default_size_buckets, BenchConfig, SizeBucket, DEFAULT_ITERATIONS, DEFAULT_OUTPUT_DIR};
use crate::report::{write_report, ReportPaths};

#[derive(Parser, Debug, Clone)]
#[clap(about = "Benchmark AES-GCM vs ChaCha20-Poly1305 on files")]
pub struct Options {
    /// Files to encrypt (globs must be expanded by the shell)
    #[clap(long, num_args = 1.., required = true)]
    pub files: Vec<PathBuf>,
    /// Iterations per file and cipher
    #[clap(long, default_value_t = DEFAULT_ITERATIONS, value_parser = parse_iterations)]
    pub iters: usize,
    /// Output directory
    #[clap(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub outdir: PathBuf,
    /// Keep ciphertext output files (default: remove)
    #[clap(long)]
    pub keep_outputs: bool,
    /// Size bucket as LABEL=MB:TOL; replaces the default 10MB/100MB/500MB/1GB buckets
    #[clap(long = "bucket", value_parser = parse_bucket)]
    pub buckets: Vec<SizeBucket>,
    /// Log at debug level
    #[clap(short, long)]
    pub verbose: bool,
}

fn parse_iterations(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_bucket(s: &str) -> Result<SizeBucket, String> {
    SizeBucket::parse(s).map_err(|e| format!("{e:#}"))
}

impl Options {
    pub fn to_config(&self) -> BenchConfig {
        BenchConfig {
            files: self.files.clone(),
            iterations: self.iters,
            output_dir: self.outdir.clone(),
            keep_outputs: self.keep_outputs,
            size_buckets: if self.buckets.is_empty() {
                default_size_buckets()
            } else {
                self.buckets.clone()
            },
        }
    }
}

#[derive(Debug)]
pub enum RunStatus {
    /// Nothing ran; these inputs do not exist.
    MissingInputs(Vec<PathBuf>),
    Completed { run: BenchRun, report: ReportPaths },
}

/// Validates inputs, runs the matrix and writes the report.
/// Missing inputs are detected before the output directory is touched.
pub fn execute(config: &BenchConfig) -> Result<RunStatus> {
    let missing = config.missing_files();
    if !missing.is_empty() {
        return Ok(RunStatus::MissingInputs(missing));
    }

    let run = run_benchmark(config)?;
    if !run.failures.is_empty() {
        warn!("{} of {} trials failed:", run.failures.len(), run.failures.len() + run.records.len());
        for failure in &run.failures {
            warn!(
                "  {} / {} / iter {}: {}",
                failure.file.display(),
                failure.cipher,
                failure.iteration,
                failure.error
            );
        }
    }
    let report = write_report(config, &run.records)?;
    info!(
        "Benchmark complete in {:.2}s, results in {}",
        run.elapsed.as_secs_f64(),
        config.output_dir.display()
    );
    Ok(RunStatus::Completed { run, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_options() {
        let options = Options::parse_from(["aead-bench", "--files", "a.bin", "b.bin", "--iters", "3", "--keep-outputs"]);
        assert_eq!(options.files, vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")]);
        assert_eq!(options.iters, 3);
        assert!(options.keep_outputs);
        let config = options.to_config();
        assert_eq!(config.output_dir, PathBuf::from("benchmark_results"));
        assert_eq!(config.size_buckets, default_size_buckets());
    }

    #[test]
    fn test_parse_options_rejects_bad_input() {
        assert!(Options::try_parse_from(["aead-bench"]).is_err());
        assert!(Options::try_parse_from(["aead-bench", "--files", "a.bin", "--iters", "0"]).is_err());
        assert!(Options::try_parse_from(["aead-bench", "--files", "a.bin", "--bucket", "nope"]).is_err());
    }

    #[test]
    fn test_custom_buckets_replace_defaults() {
        let options = Options::parse_from(["aead-bench", "--files", "a.bin", "--bucket", "1KB=0.0009765625:0.0001"]);
        assert_eq!(options.to_config().size_buckets, vec![SizeBucket::new("1KB", 0.0009765625, 0.0001)]);
    }

    #[test]
    fn test_missing_file_does_no_work() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let present = dir.path().join("present.bin");
        fs::write(&present, b"data")?;
        let absent = dir.path().join("absent.bin");
        let mut config = BenchConfig::new(vec![present, absent.clone()]);
        config.output_dir = dir.path().join("results");

        match execute(&config)? {
            RunStatus::MissingInputs(missing) => assert_eq!(missing, vec![absent]),
            other => panic!("expected missing inputs, got {other:?}"),
        }
        assert!(!config.output_dir.exists());
        Ok(())
    }

    #[test]
    fn test_end_to_end_one_small_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("one_kb.bin");
        fs::write(&input, vec![0x42u8; 1024])?;
        let mut config = BenchConfig::new(vec![input]);
        config.iterations = 2;
        config.output_dir = dir.path().join("results");

        let (run, report) = match execute(&config)? {
            RunStatus::Completed { run, report } => (run, report),
            other => panic!("expected a completed run, got {other:?}"),
        };
        assert_eq!(run.records.len(), 4);
        assert_eq!(fs::read_to_string(&report.raw)?.lines().count(), 1 + 4);
        assert_eq!(fs::read_to_string(&report.summary)?.lines().count(), 1 + 2);
        assert!(report.wall_chart.as_deref().is_some_and(|p| p.exists()));
        assert!(report.cpu_chart.as_deref().is_some_and(|p| p.exists()));

        let leftovers = fs::read_dir(&config.output_dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "ct"))
            .count();
        assert_eq!(leftovers, 0);
        Ok(())
    }
}
