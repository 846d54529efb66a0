//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use turbo_health::domain::{encode, RawRunRow};

pub const SUCCESS_STEP: &str = "save the image";
pub const FAILURE_STEP: &str = "Run Sfft Subtraction";

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// A row for a run started at `at`.
pub fn row(image_id: i64, step: &str, at: DateTime<Utc>, processing_time: f64) -> RawRunRow {
    RawRunRow {
        image_id,
        pipeline_step: step.to_string(),
        processing_time,
        completion: format!("{step} finished"),
        file_path: format!("/data/raw/telescope_r_field{image_id}_sn_60371.5_001.fits"),
        source_table: encode(at).unwrap(),
    }
}

/// One success at 10:15Z and one failure at 10:45Z on 2024-03-01.
pub fn march_first_rows() -> Vec<RawRunRow> {
    vec![
        row(1, SUCCESS_STEP, utc(2024, 3, 1, 10, 15, 0), 20.0),
        row(2, FAILURE_STEP, utc(2024, 3, 1, 10, 45, 0), 40.0),
    ]
}

/// Test context builder for setting up a data directory
pub struct TestContextBuilder {
    temp_dir: TempDir,
    rows: Vec<RawRunRow>,
    config: String,
    initial_files: Vec<(PathBuf, String)>,
}

impl TestContextBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            rows: Vec::new(),
            config: String::new(),
            initial_files: Vec::new(),
        })
    }

    pub fn with_rows(mut self, rows: Vec<RawRunRow>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// TOML written to `config.toml`
    pub fn with_config(mut self, config: &str) -> Self {
        self.config = config.to_string();
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.initial_files
            .push((path.as_ref().to_path_buf(), content.to_string()));
        self
    }

    pub fn build(self) -> Result<TestContext> {
        let root = self.temp_dir.path();

        fs::write(root.join("config.toml"), &self.config)?;
        fs::write(root.join("runs.json"), serde_json::to_string_pretty(&self.rows)?)?;

        let mut writer = csv::Writer::from_path(root.join("runs.csv"))?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        for (path, content) in &self.initial_files {
            fs::write(root.join(path), content)?;
        }

        Ok(TestContext {
            temp_dir: self.temp_dir,
        })
    }
}

pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn json_input(&self) -> PathBuf {
        self.path().join("runs.json")
    }

    pub fn csv_input(&self) -> PathBuf {
        self.path().join("runs.csv")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    /// The binary, isolated from the caller's environment and config.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("turbo-health").unwrap();
        for var in [
            "RUST_LOG",
            "TURBO_HEALTH_UNIT",
            "TURBO_HEALTH_MAX_BUCKETS",
            "TURBO_HEALTH_INCLUDE_EMPTY",
            "TURBO_HEALTH_LOG_SERVER_TLENAII",
            "TURBO_HEALTH_LOG_SERVER_POPCORN",
        ] {
            cmd.env_remove(var);
        }
        cmd.arg("--config").arg(self.config_path());
        cmd
    }
}
