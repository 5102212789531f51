//! Classification of raw Steam `StateFlags` into a closed status set.
//!
//! `StateFlags` is a bitmask the client updates as an install moves through
//! its pipeline. The bits below are the ones that matter for download
//! reporting; the mapping is a fixed precedence table over them and nothing
//! else, so the same flags always classify the same way. Flag combinations
//! with none of the known bits set classify as `Unknown` rather than
//! failing, since new client versions grow new bits.

use std::fmt;

/// `StateFlags` bits relevant to download reporting.
pub mod flags {
    /// An update is required but not yet scheduled.
    pub const UPDATE_REQUIRED: u64 = 0x2;
    /// Install is complete and runnable.
    pub const FULLY_INSTALLED: u64 = 0x4;
    /// An update job is running.
    pub const UPDATE_RUNNING: u64 = 0x100;
    /// The user paused the update.
    pub const UPDATE_PAUSED: u64 = 0x200;
    /// An update has been scheduled but transfer has not begun.
    pub const UPDATE_STARTED: u64 = 0x400;
    /// Disk space is being preallocated.
    pub const PREALLOCATING: u64 = 0x80000;
    /// Chunks are being fetched from the network.
    pub const DOWNLOADING: u64 = 0x100000;
    /// Existing files are being verified.
    pub const VALIDATING: u64 = 0x20000;
    /// Downloaded chunks are being assembled on disk.
    pub const STAGING: u64 = 0x200000;
    /// Staged files are being moved into the install directory.
    pub const COMMITTING: u64 = 0x400000;
}

/// Normalized download status derived from `StateFlags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Downloading,
    Paused,
    Queued,
    Validating,
    Idle,
    Unknown,
}

impl StatusClass {
    /// Classifies a raw `StateFlags` value. First matching row wins:
    /// paused beats everything (a paused download still carries its
    /// downloading bits), then the disk-churn states, then active transfer,
    /// then the waiting states, then plain installed.
    pub fn from_state_code(state_code: u64) -> Self {
        if state_code & flags::UPDATE_PAUSED != 0 {
            StatusClass::Paused
        } else if state_code & (flags::VALIDATING | flags::STAGING | flags::COMMITTING) != 0 {
            StatusClass::Validating
        } else if state_code & (flags::DOWNLOADING | flags::UPDATE_RUNNING) != 0 {
            StatusClass::Downloading
        } else if state_code
            & (flags::UPDATE_REQUIRED | flags::UPDATE_STARTED | flags::PREALLOCATING)
            != 0
        {
            StatusClass::Queued
        } else if state_code & flags::FULLY_INSTALLED != 0 {
            StatusClass::Idle
        } else {
            StatusClass::Unknown
        }
    }

    /// Status code as it appears on report lines.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Downloading => "DOWNLOADING",
            StatusClass::Paused => "PAUSED",
            StatusClass::Queued => "QUEUED",
            StatusClass::Validating => "VALIDATING",
            StatusClass::Idle => "IDLE",
            StatusClass::Unknown => "UNKNOWN",
        }
    }

    /// True for the states an active download passes through; these are the
    /// records the locator keeps and the sampler tracks across ticks.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            StatusClass::Downloading
                | StatusClass::Paused
                | StatusClass::Queued
                | StatusClass::Validating
        )
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
