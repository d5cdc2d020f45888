// Typed frame errors. Converted to JsValue at the wasm boundary.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Bad frame parameters; raised before anything is rendered.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Canvas context missing or a draw call failed. Fatal to the session.
    #[error("Rendering failure: {0}")]
    RenderingFailure(String),

    /// The recording collaborator could not start.
    #[error("Recording unavailable: {0}")]
    RecordingUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A browser call rejected with a JS value.
    #[error("JS error: {0}")]
    Js(String),
}

impl FrameError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        FrameError::InvalidConfiguration(msg.into())
    }
}

impl From<serde_json::Error> for FrameError {
    fn from(err: serde_json::Error) -> Self {
        FrameError::Serialization(err.to_string())
    }
}

impl From<JsValue> for FrameError {
    fn from(value: JsValue) -> Self {
        FrameError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<FrameError> for JsValue {
    fn from(err: FrameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_kind() {
        let err = FrameError::invalid("gameType 7 is out of range");
        assert!(err.to_string().starts_with("Invalid configuration"));
        assert!(err.to_string().contains("gameType 7"));
    }

    #[test]
    fn serde_errors_become_serialization() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(FrameError::from(bad), FrameError::Serialization(_)));
    }
}
