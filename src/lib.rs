//! Wall-clock and CPU-time comparison of AES-256-GCM and ChaCha20-Poly1305 on whole files.

pub mod bench;
pub mod chart;
pub mod cipher;
pub mod cli;
pub mod config;
pub mod report;
pub mod trial;
