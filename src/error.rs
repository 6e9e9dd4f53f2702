use thiserror::Error;

/// Errors that can occur when converting a custom user format into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid flow data: {0}")]
    ValidationError(String),
}

/// Errors raised by caller-supplied capability implementations.
///
/// Any capability error aborts the remainder of the run: the engine records it
/// as a final synthetic step and returns the partial trace with an `error`
/// status. Nothing escapes the engine boundary unhandled.
#[derive(Error, Debug, Clone)]
pub enum CapabilityError {
    #[error("Row source failed for node '{node_id}': {message}")]
    RowSource { node_id: String, message: String },

    #[error("Call dispatch failed: {0}")]
    CallDispatch(String),

    #[error("Wait failed: {0}")]
    Wait(String),
}

/// Errors that can occur when persisting or loading execution records.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive encoding failed: {0}")]
    Encode(String),

    #[error("Archive decoding failed: {0}")]
    Decode(String),

    #[error("Archive I/O failed for '{path}': {message}")]
    Io { path: String, message: String },
}
