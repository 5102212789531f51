//! Reading `appmanifest_*.acf` files into download-state records.
//!
//! An ACF file is a KeyValues document whose single top-level block,
//! `AppState`, carries the title's id, name, state flags, and byte counters.
//! Only those fields are extracted; everything else (installed depots, user
//! config, mount hints) is ignored. Malformed individual fields never fail
//! the read: numerics default to 0 and the name defaults to "Unknown", so a
//! half-written manifest degrades to a conservative record instead of
//! killing the tick that touched it.

pub mod vdf;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::status::StatusClass;
use vdf::{Object, Value};

/// Name used when a manifest carries no `name` field.
const UNKNOWN_NAME: &str = "Unknown";

/// One parsed snapshot of a title's download state.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRecord {
    /// Steam app id (`appid`); 0 when missing or malformed.
    pub app_id: u32,
    /// Human-readable title name (`name`).
    pub name: String,
    /// Raw `StateFlags` bitmask, opaque at this layer.
    pub state_code: u64,
    /// Cumulative bytes fetched (`BytesDownloaded`).
    pub bytes_downloaded: u64,
    /// Total bytes to fetch (`BytesToDownload`); 0 when unknown.
    pub bytes_total: u64,
    /// Wall-clock time this record was captured.
    pub captured_at: DateTime<Utc>,
}

impl ManifestRecord {
    /// Status classification of the raw state flags.
    pub fn status(&self) -> StatusClass {
        StatusClass::from_state_code(self.state_code)
    }

    /// True when this record represents a download worth reporting: it has a
    /// trackable id and its state is one of the in-progress classes.
    pub fn is_active(&self) -> bool {
        self.app_id != 0 && self.status().is_in_progress()
    }
}

/// Failure to read a manifest into a record. Always transient from the
/// sampler's point of view: the tick skips the file and the loop continues.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: vdf::SyntaxError,
    },
    #[error("{}: no AppState block at the top level", .path.display())]
    UnrecognizedRoot { path: PathBuf },
}

/// Reads and parses one manifest file, stamping the record with the current
/// wall-clock time.
pub fn read_manifest(path: &Path) -> Result<ManifestRecord, ParseError> {
    let raw = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&raw, path, Utc::now())
}

/// Parses manifest text captured at a known instant. Split from
/// [`read_manifest`] so records with fixed timestamps can be built in tests.
pub fn parse_manifest(
    raw: &str,
    path: &Path,
    captured_at: DateTime<Utc>,
) -> Result<ManifestRecord, ParseError> {
    let root = vdf::parse(raw).map_err(|source| ParseError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;
    let app_state = field(&root, "AppState")
        .and_then(Value::as_block)
        .ok_or_else(|| ParseError::UnrecognizedRoot {
            path: path.to_path_buf(),
        })?;

    let app_id = numeric_field::<u32>(app_state, "appid");
    let name = field(app_state, "name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_string();
    let state_code = numeric_field::<u64>(app_state, "StateFlags");
    let bytes_total = numeric_field::<u64>(app_state, "BytesToDownload");
    let mut bytes_downloaded = numeric_field::<u64>(app_state, "BytesDownloaded");
    if bytes_total > 0 && bytes_downloaded > bytes_total {
        tracing::debug!(
            app_id,
            bytes_downloaded,
            bytes_total,
            "BytesDownloaded exceeds BytesToDownload, clamping"
        );
        bytes_downloaded = bytes_total;
    }

    Ok(ManifestRecord {
        app_id,
        name,
        state_code,
        bytes_downloaded,
        bytes_total,
        captured_at,
    })
}

/// Looks up a key with ASCII-case-insensitive matching; Steam's own parser
/// does not distinguish case and files in the wild vary.
fn field<'a>(block: &'a Object, name: &str) -> Option<&'a Value> {
    block
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Parses a non-negative numeric field; anything else (missing, negative,
/// non-numeric, overflowing) becomes the type's zero.
fn numeric_field<T>(block: &Object, name: &str) -> T
where
    T: std::str::FromStr + Default,
{
    let Some(raw) = field(block, name).and_then(Value::as_str) else {
        return T::default();
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(field = name, raw, "non-numeric manifest field, using 0");
            T::default()
        }
    }
}
