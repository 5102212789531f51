//! Integration test: full sampling passes over a fabricated Steam library.
//!
//! Builds a steamapps directory by hand, runs bounded passes against a
//! report file, and checks the emitted stream end to end: transfer lines,
//! the paused title, the idle transition, and the line shape itself.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use sdm_core::config::{FileConfig, MonitorConfig, Overrides};
use sdm_core::control::ShutdownToken;
use sdm_core::install::SteamInstall;
use sdm_core::report::Reporter;
use sdm_core::sampler::{RunOutcome, Sampler};
use tempfile::tempdir;

fn library_at(root: &Path) -> SteamInstall {
    fs::create_dir_all(root.join("steamapps")).unwrap();
    SteamInstall::at(root).unwrap()
}

fn write_manifest(install: &SteamInstall, app_id: u32, name: &str, state: u64, downloaded: u64) {
    let path = install.steamapps.join(format!("appmanifest_{app_id}.acf"));
    let body = format!(
        "\"AppState\"\n{{\n\t\"appid\"\t\"{app_id}\"\n\t\"name\"\t\"{name}\"\n\t\"StateFlags\"\t\"{state}\"\n\t\"BytesDownloaded\"\t\"{downloaded}\"\n\t\"BytesToDownload\"\t\"100000000\"\n}}\n"
    );
    fs::write(path, body).unwrap();
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn sampling_reports_transfers_then_idle() {
    let library = tempdir().unwrap();
    let install = library_at(library.path());
    write_manifest(&install, 440, "Big Game", 0x100002, 1_000_000);
    write_manifest(&install, 620, "Paused Game", 0x202, 5_000);
    write_manifest(&install, 570, "Installed Game", 4, 0);
    fs::write(
        install.steamapps.join("libraryfolders.vdf"),
        "\"libraryfolders\" {}",
    )
    .unwrap();

    let out = tempdir().unwrap();
    let cfg = MonitorConfig::resolve(
        &FileConfig::default(),
        Overrides {
            interval: Some(0),
            samples: Some(1),
            log_file: Some(out.path().join("sdm.log")),
            ..Overrides::default()
        },
    )
    .expect("config resolves");
    let report_path = cfg.log_file.clone().expect("file sink configured");

    let reporter = Reporter::to_file(&report_path).expect("report file opens");
    let mut sampler = Sampler::new(install.clone(), reporter, &cfg, ShutdownToken::new());

    assert_eq!(sampler.run().unwrap(), RunOutcome::Completed);

    write_manifest(&install, 440, "Big Game", 0x100002, 61_000_000);
    assert_eq!(sampler.run().unwrap(), RunOutcome::Completed);

    fs::remove_file(install.steamapps.join("appmanifest_440.acf")).unwrap();
    fs::remove_file(install.steamapps.join("appmanifest_620.acf")).unwrap();
    assert_eq!(sampler.run().unwrap(), RunOutcome::Completed);

    let lines = read_lines(&report_path);
    assert_eq!(lines.len(), 5, "two ticks of two titles, then idle: {lines:?}");

    // Directory enumeration order is not fixed, so match within each tick.
    let first_tick = &lines[0..2];
    assert!(
        first_tick
            .iter()
            .any(|l| l.ends_with("Status: DOWNLOADING, Game: Big Game, Speed: 0.00 MB/s")),
        "{first_tick:?}"
    );
    assert!(
        first_tick
            .iter()
            .any(|l| l.ends_with("Status: PAUSED, Game: Paused Game, Speed: 0.00 MB/s")),
        "{first_tick:?}"
    );

    let second_tick = &lines[2..4];
    let big = second_tick
        .iter()
        .find(|l| l.contains("Game: Big Game"))
        .expect("Big Game reported on the second tick");
    assert!(big.contains("Status: DOWNLOADING"), "{big}");
    assert!(!big.ends_with("Speed: 0.00 MB/s"), "progress must show: {big}");
    assert!(
        second_tick
            .iter()
            .any(|l| l.ends_with("Status: PAUSED, Game: Paused Game, Speed: 0.00 MB/s")),
        "{second_tick:?}"
    );

    assert!(
        lines[4].ends_with("Status: IDLE, Game: None, Speed: 0.00 MB/s"),
        "{}",
        lines[4]
    );
}

#[test]
fn report_lines_parse_back_into_the_documented_shape() {
    let library = tempdir().unwrap();
    let install = library_at(library.path());

    let out = tempdir().unwrap();
    let report_path = out.path().join("sdm.log");
    let cfg = MonitorConfig::resolve(
        &FileConfig::default(),
        Overrides {
            interval: Some(0),
            samples: Some(1),
            log_file: Some(report_path.clone()),
            ..Overrides::default()
        },
    )
    .unwrap();

    let reporter = Reporter::to_file(&report_path).unwrap();
    Sampler::new(install, reporter, &cfg, ShutdownToken::new())
        .run()
        .unwrap();

    let lines = read_lines(&report_path);
    assert_eq!(lines.len(), 1);
    let mut parts = lines[0].splitn(3, " - ");
    let timestamp = parts.next().expect("timestamp field");
    let level = parts.next().expect("level field");
    let message = parts.next().expect("message field");

    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S%.3f")
        .expect("timestamp parses back");
    assert_eq!(level, "INFO");
    assert_eq!(message, "Status: IDLE, Game: None, Speed: 0.00 MB/s");
}
