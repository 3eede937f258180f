use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WidgetError {
    #[snafu(display("failed to load widget configuration from {path:?} on `{stage}`: {source}"))]
    LoadConfig {
        stage: &'static str,
        path: Option<PathBuf>,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
    #[cfg(feature = "tokio")]
    #[snafu(display("widget session on `{stage}` requires a tokio runtime: {source}"))]
    MissingRuntime {
        stage: &'static str,
        source: tokio::runtime::TryCurrentError,
    },
}

pub type WidgetResult<T> = Result<T, WidgetError>;
