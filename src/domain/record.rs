//! Per-image step records as delivered by the query layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::file_path::FilePath;
use super::pipeline_step::{PipelineStep, StepName};
use super::schema_name::{self, SchemaName};
use crate::error::{Error, Result, TimestampError};

/// One row of `image_status` joined with `images`, before validation.
///
/// Accepts both the camelCase names used on the wire and the snake_case
/// column names of the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRunRow {
    #[serde(alias = "image_id")]
    pub image_id: i64,
    #[serde(alias = "pipeline_step")]
    pub pipeline_step: String,
    #[serde(alias = "processing_time")]
    pub processing_time: f64,
    pub completion: String,
    #[serde(alias = "file_path")]
    pub file_path: String,
    #[serde(alias = "source_table")]
    pub source_table: String,
}

/// A validated (image, pipeline step) execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRunRow")]
pub struct RunRecord {
    pub image_id: i64,
    pub pipeline_step: StepName,
    /// Seconds spent in the step.
    pub processing_time: f64,
    pub completion: String,
    pub file_path: FilePath,
    /// Schema the row was read from. Kept verbatim; see [`RunRecord::date`].
    pub source_table: String,
}

impl RunRecord {
    pub fn step(&self) -> PipelineStep {
        self.pipeline_step.step()
    }

    /// Whether the image made it all the way to the save step.
    pub fn success(&self) -> bool {
        self.step().is_terminal_success()
    }

    /// Start of the run this row belongs to.
    pub fn date(&self) -> std::result::Result<DateTime<Utc>, TimestampError> {
        schema_name::decode(&self.source_table)
    }

    pub fn schema_name(&self) -> std::result::Result<SchemaName, TimestampError> {
        SchemaName::parse(&self.source_table)
    }
}

impl TryFrom<RawRunRow> for RunRecord {
    type Error = Error;

    fn try_from(row: RawRunRow) -> Result<Self> {
        if !row.processing_time.is_finite() || row.processing_time < 0.0 {
            return Err(Error::InvalidRecord {
                image_id: row.image_id,
                reason: format!("processing time {} is not a non-negative number", row.processing_time),
            });
        }

        Ok(Self {
            image_id: row.image_id,
            pipeline_step: StepName::parse(&row.pipeline_step)?,
            processing_time: row.processing_time,
            completion: row.completion,
            file_path: FilePath::parse(&row.file_path)?,
            source_table: row.source_table,
        })
    }
}

impl From<RunRecord> for RawRunRow {
    fn from(record: RunRecord) -> Self {
        Self {
            image_id: record.image_id,
            pipeline_step: record.pipeline_step.into(),
            processing_time: record.processing_time,
            completion: record.completion,
            file_path: record.file_path.into(),
            source_table: record.source_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(step: &str, source_table: &str) -> RawRunRow {
        RawRunRow {
            image_id: 7,
            pipeline_step: step.to_string(),
            processing_time: 12.5,
            completion: "done".to_string(),
            file_path: "/raw/telescope_g_f1_NGC253_60000_001.fits".to_string(),
            source_table: source_table.to_string(),
        }
    }

    #[test]
    fn test_success_is_save_step() {
        let saved = RunRecord::try_from(raw("save the image", "science_turbo_production_pipeline_3_1_2024_4_15_0")).unwrap();
        let failed = RunRecord::try_from(raw("Run Sfft Subtraction", "science_turbo_production_pipeline_3_1_2024_4_15_0")).unwrap();
        assert!(saved.success());
        assert!(!failed.success());
    }

    #[test]
    fn test_date_decodes_source_table() {
        let record = RunRecord::try_from(raw("save the image", "science_turbo_production_pipeline_3_1_2024_4_15_0")).unwrap();
        assert_eq!(
            record.date().unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_undecodable_source_table_is_kept_until_date_is_asked_for() {
        let record = RunRecord::try_from(raw("save the image", "science_turbo_production_pipeline_13_1_2024_4_15_0")).unwrap();
        assert!(record.date().is_err());
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let err = RunRecord::try_from(raw("Polish mirror", "science_turbo_production_pipeline_3_1_2024_4_15_0")).unwrap_err();
        assert!(matches!(err, Error::UnknownPipelineStep(step) if step == "Polish mirror"));
    }

    #[test]
    fn test_negative_processing_time_is_rejected() {
        let mut row = raw("save the image", "science_turbo_production_pipeline_3_1_2024_4_15_0");
        row.processing_time = -1.0;
        assert!(matches!(
            RunRecord::try_from(row),
            Err(Error::InvalidRecord { image_id: 7, .. })
        ));
    }

    #[test]
    fn test_deserialize_snake_and_camel_case() {
        let camel = r#"{"imageId":1,"pipelineStep":"save the image","processingTime":3.0,"completion":"ok","filePath":"telescope_r_a_b_1_c.fits","sourceTable":"science_turbo_production_pipeline_3_1_2024_4_15_0"}"#;
        let snake = r#"{"image_id":1,"pipeline_step":"save the image","processing_time":3.0,"completion":"ok","file_path":"telescope_r_a_b_1_c.fits","source_table":"science_turbo_production_pipeline_3_1_2024_4_15_0"}"#;

        let a: RunRecord = serde_json::from_str(camel).unwrap();
        let b: RunRecord = serde_json::from_str(snake).unwrap();
        assert_eq!(a, b);
        assert!(a.success());
    }
}
