use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};

use camino::Utf8Path;

use crate::app::QueryOutcome;
use crate::error::OdeError;
use crate::metadata::METADATA_SCHEMA;

const ABSENT: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct Report;

impl Report {
    pub fn render(outcome: &QueryOutcome, mode: OutputMode) -> Result<String, OdeError> {
        match mode {
            OutputMode::Text => Ok(Self::render_text(outcome)),
            OutputMode::Json => serde_json::to_string_pretty(outcome)
                .map(|mut json| {
                    json.push('\n');
                    json
                })
                .map_err(|err| OdeError::Output(err.to_string())),
        }
    }

    /// Writes to `log` (truncating it) or to stdout.
    pub fn emit(
        outcome: &QueryOutcome,
        mode: OutputMode,
        log: Option<&Utf8Path>,
    ) -> Result<(), OdeError> {
        let rendered = Self::render(outcome, mode)?;
        let result = match log {
            Some(path) => {
                File::create(path).and_then(|mut file| file.write_all(rendered.as_bytes()))
            }
            None => io::stdout().lock().write_all(rendered.as_bytes()),
        };
        result.map_err(|err| OdeError::Output(err.to_string()))
    }

    fn render_text(outcome: &QueryOutcome) -> String {
        let mut out = String::new();
        for (id, entry) in outcome.groups.iter() {
            let _ = writeln!(out, "This is the File ID : {}", id.unwrap_or(ABSENT));
            let _ = writeln!(out, "Metadata for the File");
            for (field, _) in METADATA_SCHEMA {
                let value = entry.metadata.get(field).unwrap_or(ABSENT);
                let _ = writeln!(out, "{field}: {value}");
            }
            let _ = writeln!(out, "Associated Files");
            for url in &entry.files {
                let _ = writeln!(out, "{url}");
            }
        }
        out
    }
}
