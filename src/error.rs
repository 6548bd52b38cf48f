use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum OdeError {
    #[error("ODE request failed: {0}")]
    Http(String),

    #[error("ODE returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed catalog XML: {0}")]
    XmlParse(String),

    #[error("unsupported combination: target={target} ihid={ihid} iid={iid}")]
    #[diagnostic(help("supported: moon/CH1-ORB/M3, moon/CLEM/HIRES"))]
    UnsupportedCombination {
        target: String,
        ihid: String,
        iid: String,
    },

    #[error("invalid observation time (expected YYYY-MM-DDTHH:MM:SS.ffffff): {0}")]
    InvalidObservationTime(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to write report: {0}")]
    Output(String),
}
