//! Locating the Steam installation directory.
//!
//! An installation is any directory with a `steamapps/` subdirectory; that
//! is where the manifests live. An explicit path (flag or config file) is
//! validated and never silently worked around: a wrong `--steam-path` is a
//! fatal error, not a trigger for autodetection. Without an explicit path,
//! a per-platform [`PathResolver`] checks the conventional locations. The
//! rest of the crate never branches on the platform; only
//! [`default_resolver`] does, once, at startup.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to locate the installation or enumerate its manifests. Fatal when
/// it happens at startup; transient (logged, tick skipped) mid-run.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("{} is not a Steam installation (no steamapps directory)", .path.display())]
    NotAnInstall { path: PathBuf },
    #[error("cannot enumerate {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no Steam installation found at the conventional locations for this platform")]
    NotFound,
}

/// A validated Steam installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamInstall {
    /// Installation root directory.
    pub root: PathBuf,
    /// `steamapps/` directory holding the `appmanifest_*.acf` files.
    pub steamapps: PathBuf,
}

impl SteamInstall {
    /// Validates `root` as an installation. The only requirement is an
    /// existing `steamapps/` directory.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self, LocatorError> {
        let root = root.into();
        let steamapps = root.join("steamapps");
        if steamapps.is_dir() {
            Ok(Self { root, steamapps })
        } else {
            Err(LocatorError::NotAnInstall { path: root })
        }
    }
}

/// Capability interface for platform-conventional installation discovery.
pub trait PathResolver {
    /// Returns the installation if one exists at this platform's
    /// conventional location(s).
    fn resolve(&self) -> Option<SteamInstall>;
}

/// `~/.steam/steam` (a symlink into the real install), falling back to
/// `~/.local/share/Steam`.
pub struct LinuxResolver;

impl PathResolver for LinuxResolver {
    fn resolve(&self) -> Option<SteamInstall> {
        let home = home_dir()?;
        let link = home.join(".steam/steam");
        if let Ok(real_root) = link.canonicalize() {
            if let Ok(install) = SteamInstall::at(real_root) {
                return Some(install);
            }
        }
        SteamInstall::at(home.join(".local/share/Steam")).ok()
    }
}

/// `~/Library/Application Support/Steam`.
pub struct MacResolver;

impl PathResolver for MacResolver {
    fn resolve(&self) -> Option<SteamInstall> {
        let home = home_dir()?;
        SteamInstall::at(home.join("Library/Application Support/Steam")).ok()
    }
}

/// The conventional program-files install directory, read from the
/// environment (`PROGRAMFILES(X86)`, then `ProgramFiles`).
pub struct WindowsResolver;

impl PathResolver for WindowsResolver {
    fn resolve(&self) -> Option<SteamInstall> {
        for var in ["PROGRAMFILES(X86)", "ProgramFiles"] {
            if let Some(dir) = env::var_os(var) {
                if let Ok(install) = SteamInstall::at(PathBuf::from(dir).join("Steam")) {
                    return Some(install);
                }
            }
        }
        None
    }
}

/// The resolver for the platform this binary was built for.
pub fn default_resolver() -> Box<dyn PathResolver> {
    if cfg!(target_os = "windows") {
        Box::new(WindowsResolver)
    } else if cfg!(target_os = "macos") {
        Box::new(MacResolver)
    } else {
        Box::new(LinuxResolver)
    }
}

/// Resolves the installation to monitor: an explicit path is validated
/// as-is, otherwise the platform resolver is consulted.
pub fn resolve_install(
    explicit: Option<&Path>,
    resolver: &dyn PathResolver,
) -> Result<SteamInstall, LocatorError> {
    match explicit {
        Some(path) => SteamInstall::at(path),
        None => resolver.resolve().ok_or(LocatorError::NotFound),
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}
