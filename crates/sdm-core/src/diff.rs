//! Transfer-speed derivation from successive manifest snapshots.
//!
//! The client never writes a rate anywhere; it only advances
//! `BytesDownloaded`. Speed therefore falls out of two records of the same
//! title: bytes delta over elapsed wall-clock time. Rewritten manifests can
//! make the counter regress (a restarted download resets its bookkeeping);
//! that clamps to zero rather than reporting a negative rate.

use crate::acf::ManifestRecord;

/// Elapsed-time floor in seconds, guarding the division when two ticks land
/// closer together than the configured cadence promises.
const MIN_ELAPSED_SECS: f64 = 0.001;

/// A transfer rate in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub bytes_per_sec: f64,
}

impl Throughput {
    pub const ZERO: Throughput = Throughput { bytes_per_sec: 0.0 };

    /// Rate in MB/s using the binary megabyte (1 MB = 1_048_576 bytes), the
    /// convention the client's own transfer display uses.
    pub fn mb_per_sec(self) -> f64 {
        self.bytes_per_sec / 1_048_576.0
    }
}

/// Derives the transfer speed between the stored previous record of a title
/// and its current record.
///
/// The first observation of a title has no baseline and reports zero. For
/// later observations the delta is a saturating subtraction (regressions
/// report zero, never negative) and the elapsed time is floored at
/// [`MIN_ELAPSED_SECS`]. Pure: identical record pairs always yield the
/// identical rate.
pub fn transfer_speed(previous: Option<&ManifestRecord>, current: &ManifestRecord) -> Throughput {
    let Some(previous) = previous else {
        return Throughput::ZERO;
    };
    let delta = current
        .bytes_downloaded
        .saturating_sub(previous.bytes_downloaded);
    let elapsed = (current.captured_at - previous.captured_at).num_milliseconds() as f64 / 1000.0;
    Throughput {
        bytes_per_sec: delta as f64 / elapsed.max(MIN_ELAPSED_SECS),
    }
}
