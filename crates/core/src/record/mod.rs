use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capture::{CaptureEvent, CaptureMetadata};
use crate::mapping::ParameterSet;
use crate::{FlowTextError, Result};

/// Schema version of the `parameters` wrapper.
pub const PARAMETERS_VERSION: u32 = 1;

/// Versioned wrapper around the captured parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedParameters {
    pub version: u32,
    pub data: ParameterSet,
}

/// Body accepted by the art submission endpoint, one per capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtSubmission {
    pub user_id: String,
    pub name: String,
    pub parameters: VersionedParameters,
    pub metadata: CaptureMetadata,
    pub frame: u64,
    pub timestamp: String,
}

impl ArtSubmission {
    pub fn from_event(event: &CaptureEvent, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: format!(
                "{} #{}",
                event.metadata.title,
                event.timestamp.format("%Y%m%d-%H%M%S")
            ),
            parameters: VersionedParameters {
                version: PARAMETERS_VERSION,
                data: event.parameters,
            },
            metadata: event.metadata.clone(),
            frame: event.frame,
            timestamp: event.timestamp.to_rfc3339(),
        }
    }
}

/// Configuration options for the capture recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_path: PathBuf,
    pub user_id: String,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("captures.jsonl"),
            user_id: "anonymous".to_string(),
        }
    }
}

/// Appends captures as JSON lines shaped like submission bodies.
#[derive(Debug)]
pub struct CaptureRecorder {
    settings: RecordingSettings,
    writer: Option<BufWriter<File>>,
    written: usize,
}

impl CaptureRecorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            writer: None,
            written: 0,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.settings.output_path
    }

    pub fn start(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.settings.output_path)?;
        self.writer = Some(BufWriter::new(file));
        tracing::info!(path = ?self.settings.output_path, "capture recording started");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            tracing::info!(written = self.written, "capture recording stopped");
        }
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Writes one capture and flushes so a crash loses at most this line.
    pub fn record(&mut self, event: &CaptureEvent) -> Result<ArtSubmission> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| FlowTextError::msg("capture recorder has not been started"))?;

        let submission = ArtSubmission::from_event(event, &self.settings.user_id);
        serde_json::to_writer(&mut *writer, &submission)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        self.written += 1;
        Ok(submission)
    }
}

impl Drop for CaptureRecorder {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(%err, "failed to flush capture recording");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event() -> CaptureEvent {
        CaptureEvent {
            parameters: ParameterSet {
                wave: 0.75,
                ..ParameterSet::DEFAULT
            },
            metadata: CaptureMetadata {
                title: "Forest Radio".into(),
                author: "Flow Text".into(),
                text_set_index: 1,
            },
            frame: 42,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn submission_wraps_parameters_with_version() {
        let submission = ArtSubmission::from_event(&event(), "artist");
        assert_eq!(submission.user_id, "artist");
        assert_eq!(submission.name, "Forest Radio #20260301-123000");
        assert_eq!(submission.parameters.version, PARAMETERS_VERSION);

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["parameters"]["data"]["wave"], 0.75);
        assert_eq!(json["metadata"]["text_set_index"], 1);
    }

    #[test]
    fn appends_one_line_per_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captures.jsonl");
        let mut recorder = CaptureRecorder::new(RecordingSettings {
            output_path: path.clone(),
            user_id: "artist".into(),
        });

        assert!(recorder.record(&event()).is_err());
        recorder.start().unwrap();
        recorder.record(&event()).unwrap();
        recorder.record(&event()).unwrap();
        recorder.stop().unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: ArtSubmission = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.frame, 42);
        assert_eq!(recorder.written(), 2);
    }
}
