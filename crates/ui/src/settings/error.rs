use std::path::PathBuf;

use snafu::Snafu;

/// Failures while saving desktop settings. Loading never fails; it falls back
/// to defaults instead.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("cannot prepare settings directory {directory:?} on `{stage}`: {source}"))]
    PrepareDirectory {
        stage: &'static str,
        directory: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot encode settings on `{stage}`: {source}"))]
    Encode {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("cannot stage settings at {staged:?} on `{stage}`: {source}"))]
    Stage {
        stage: &'static str,
        staged: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot move {staged:?} over {target:?} on `{stage}`: {source}"))]
    Commit {
        stage: &'static str,
        staged: PathBuf,
        target: PathBuf,
        source: std::io::Error,
    },
}
