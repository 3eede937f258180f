use snafu::Snafu;
use wasm_bindgen::JsValue;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EmbedError {
    #[snafu(display("no global `window` is available on `{stage}`"))]
    MissingWindow { stage: &'static str },
    #[snafu(display("the window has no document on `{stage}`"))]
    MissingDocument { stage: &'static str },
    #[snafu(display("no element with id `{id}` exists on `{stage}`"))]
    ContainerNotFound { stage: &'static str, id: String },
    #[snafu(display("invalid widget options on `{stage}`: {source}"))]
    InvalidOptions {
        stage: &'static str,
        source: serde_wasm_bindgen::Error,
    },
    #[snafu(display("DOM call failed on `{stage}`: {details}"))]
    Dom { stage: &'static str, details: String },
}

pub type EmbedResult<T> = Result<T, EmbedError>;

impl From<EmbedError> for JsValue {
    fn from(error: EmbedError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}

/// Wraps a rejected DOM call into [`EmbedError::Dom`].
pub(crate) trait DomResultExt<T> {
    fn dom(self, stage: &'static str) -> EmbedResult<T>;
}

impl<T> DomResultExt<T> for Result<T, JsValue> {
    fn dom(self, stage: &'static str) -> EmbedResult<T> {
        self.map_err(|value| {
            DomSnafu {
                stage,
                details: value
                    .as_string()
                    .unwrap_or_else(|| format!("{value:?}")),
            }
            .build()
        })
    }
}
