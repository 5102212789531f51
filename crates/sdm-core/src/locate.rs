//! Finding the manifests worth watching.
//!
//! Scans `steamapps/` for `appmanifest_*.acf` files and keeps the ones
//! describing an in-progress transfer. A manifest that fails to parse is
//! skipped with a diagnostic, not an error: Steam rewrites these files
//! while we read them, and one torn file must not hide the others.

use std::fs;
use std::path::{Path, PathBuf};

use crate::acf;
use crate::install::{LocatorError, SteamInstall};

/// File-name prefix of an app manifest.
pub const MANIFEST_PREFIX: &str = "appmanifest_";
/// File-name extension of an app manifest, dot included.
pub const MANIFEST_SUFFIX: &str = ".acf";

/// Returns the paths of every manifest under `steamapps/` whose title is
/// mid-transfer (downloading, paused, queued, or validating, with a nonzero
/// app id), in directory-enumeration order.
///
/// Unparseable files are skipped. A missing or unreadable `steamapps`
/// directory fails the whole call.
pub fn locate_active(install: &SteamInstall) -> Result<Vec<PathBuf>, LocatorError> {
    let dir = &install.steamapps;
    let entries = fs::read_dir(dir).map_err(|source| LocatorError::Unreadable {
        path: dir.clone(),
        source,
    })?;

    let mut active = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LocatorError::Unreadable {
            path: dir.clone(),
            source,
        })?;
        let path = entry.path();
        if !is_manifest_name(&path) {
            continue;
        }
        match acf::read_manifest(&path) {
            Ok(record) if record.is_active() => active.push(path),
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable manifest");
            }
        }
    }
    Ok(active)
}

fn is_manifest_name(path: &Path) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.starts_with(MANIFEST_PREFIX) && name.ends_with(MANIFEST_SUFFIX),
        None => false,
    }
}
