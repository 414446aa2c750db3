//! Loading configuration values from JSON5 files.
//!
//! `json5::Error`'s `Display` implementation drops the error
//! location; wrap it so that config errors point at line and column.

use std::{fmt::Display, path::Path};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub struct Json5DecodeError(json5::Error);

impl Display for Json5DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json5::Error::Message { msg, location } = &self.0;
        if let Some(json5::Location { line, column }) = location {
            write!(f, "{msg} at {line}:{column}")
        } else {
            write!(f, "{msg}")
        }
    }
}

pub fn json5_decode<T: DeserializeOwned>(s: &str) -> Result<T, Json5DecodeError> {
    json5::from_str(s).map_err(Json5DecodeError)
}

/// Read and decode a JSON5 config file in one step, with the path in
/// all error messages.
pub fn load_json5_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let s = std::fs::read_to_string(path)
        .with_context(|| anyhow!("loading config file from {path:?}"))?;
    json5_decode(&s).with_context(|| anyhow!("decoding JSON5 from config file {path:?}"))
}
