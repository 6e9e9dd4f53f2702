//! File persistence for execution results, so traces survive the process
//! that produced them.
//!
//! Records carry arbitrary JSON payloads in their steps and output, so the
//! archive format is JSON itself.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

use super::record::{ExecutionHistory, ExecutionRecord};
use crate::error::ArchiveError;

fn save_to<T: Serialize>(value: &T, path: &str) -> Result<(), ArchiveError> {
    let bytes = serde_json::to_vec(value).map_err(|e| ArchiveError::Encode(e.to_string()))?;
    fs::write(path, bytes).map_err(|e| ArchiveError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn load_from<T: DeserializeOwned>(path: &str) -> Result<T, ArchiveError> {
    let bytes = fs::read(path).map_err(|e| ArchiveError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    decode_bytes(&bytes)
}

fn decode_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ArchiveError> {
    serde_json::from_slice(bytes).map_err(|e| ArchiveError::Decode(e.to_string()))
}

impl ExecutionRecord {
    /// Saves the record to a file.
    pub fn save(&self, path: &str) -> Result<(), ArchiveError> {
        save_to(self, path)
    }

    /// Loads a record from a file.
    pub fn from_file(path: &str) -> Result<Self, ArchiveError> {
        load_from(path)
    }

    /// Deserializes a record from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        decode_bytes(bytes)
    }
}

impl ExecutionHistory {
    /// Saves the history to a file.
    pub fn save(&self, path: &str) -> Result<(), ArchiveError> {
        save_to(self, path)
    }

    /// Loads a history from a file.
    pub fn from_file(path: &str) -> Result<Self, ArchiveError> {
        load_from(path)
    }
}
