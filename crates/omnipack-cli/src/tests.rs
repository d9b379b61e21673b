use std::fs;
use std::path::PathBuf;

use clap::Parser;
use omnipack_batch::{BatchResults, BatchRunner};
use omnipack_console::ScriptedConsole;
use omnipack_core::{BatchConfig, OutcomeStatus, PackageOutcome, RecordingSink, TargetSet};
use semver::Version;

use crate::dispatch::{resolve_settings, resolve_upgrade_targets, Cli, Commands};
use crate::render::{render_json, render_outcome_lines, render_summary_line, OutputStyle};
use crate::state::{FileService, StateFile};

fn test_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("omnipack-cli-test-{}-{}", std::process::id(), name))
}

#[test]
fn cli_parses_upgrade_without_names_as_all() {
    let cli = Cli::try_parse_from(["omnipack", "upgrade"]).expect("command must parse");
    match cli.command {
        Commands::Upgrade { names, attempts } => {
            assert!(names.is_empty());
            assert!(attempts.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_parses_upgrade_with_names_and_attempts() {
    let cli = Cli::try_parse_from(["omnipack", "upgrade", "fd", "ripgrep", "--attempts", "5"])
        .expect("command must parse");
    match cli.command {
        Commands::Upgrade { names, attempts } => {
            assert_eq!(names, vec!["fd", "ripgrep"]);
            assert_eq!(attempts, Some(5));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_parses_install_with_skip_flag() {
    let cli = Cli::try_parse_from(["omnipack", "install", "fd", "--skip-missing-provider"])
        .expect("command must parse");
    match cli.command {
        Commands::Install {
            names,
            skip_missing_provider,
            ..
        } => {
            assert_eq!(names, vec!["fd"]);
            assert!(skip_missing_provider);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_rejects_install_without_names() {
    assert!(Cli::try_parse_from(["omnipack", "install"]).is_err());
}

#[test]
fn cli_parses_global_json_and_debug_flags() {
    let cli = Cli::try_parse_from(["omnipack", "--json", "--debug", "list"])
        .expect("command must parse");
    assert!(cli.json);
    assert!(cli.debug);
}

#[test]
fn upgrade_targets_default_to_all() {
    assert!(resolve_upgrade_targets(Vec::new())
        .expect("must resolve")
        .is_all());
    assert!(resolve_upgrade_targets(vec!["all".to_string()])
        .expect("must resolve")
        .is_all());
    assert_eq!(
        resolve_upgrade_targets(vec!["fd".to_string()]).expect("must resolve"),
        TargetSet::Named(vec!["fd".to_string()])
    );
}

#[test]
fn settings_debug_flag_overrides_file() {
    let path = test_path("settings-plain.toml");
    fs::write(&path, "debug = false\n").expect("must write");
    let settings = resolve_settings(Some(&path), true);
    assert!(settings.debug);
    let _ = fs::remove_file(&path);
}

#[test]
fn settings_missing_file_defaults_to_non_debug() {
    let settings = resolve_settings(Some(&test_path("settings-missing.toml")), false);
    assert!(!settings.debug);
}

#[test]
fn state_file_round_trips_through_toml() {
    let mut state = StateFile::default();
    state
        .feed
        .insert("fd".to_string(), Version::new(10, 2, 0));
    state
        .installed
        .insert("fd".to_string(), Version::new(10, 1, 0));
    state.confirm_upgrades.push("fd".to_string());

    let rendered = state.render().expect("must render");
    let parsed = StateFile::parse(&rendered).expect("must parse");
    assert_eq!(parsed, state);
}

#[test]
fn file_service_loads_empty_state_when_file_missing() {
    let service =
        FileService::load(&test_path("state-missing.toml")).expect("missing file is empty state");
    assert!(service.installed_snapshot().is_empty());
}

#[test]
fn file_service_rejects_garbage_state() {
    let path = test_path("state-garbage.toml");
    fs::write(&path, "feed = 3").expect("must write");
    assert!(FileService::load(&path).is_err());
    let _ = fs::remove_file(&path);
}

#[test]
fn upgrade_run_against_file_service_updates_state_on_disk() {
    let path = test_path("state-upgrade.toml");
    fs::write(
        &path,
        "[feed]\nupgradepackage = \"1.1.0\"\ninstallpackage = \"1.0.0\"\n\n[installed]\nupgradepackage = \"1.0.0\"\ninstallpackage = \"1.0.0\"\n",
    )
    .expect("must write");

    let service = FileService::load(&path).expect("must load");
    let console = ScriptedConsole::default();
    let sink = RecordingSink::new();
    let results = BatchRunner::new(&service, &console, &sink)
        .upgrade_run(&BatchConfig::new(TargetSet::All))
        .expect("batch must run");

    assert_eq!(results.count(), 2);
    assert_eq!(
        results.get("upgradepackage").expect("must be present").version,
        "1.1.0"
    );
    assert_eq!(
        results.get("installpackage").expect("must be present").status,
        OutcomeStatus::Skipped
    );

    let reloaded = FileService::load(&path).expect("must reload");
    let installed = reloaded
        .latest_installed("upgradepackage")
        .expect("must be recorded");
    assert_eq!(installed, Version::new(1, 1, 0));
    let _ = fs::remove_file(&path);
}

#[test]
fn confirm_upgrades_entry_forces_a_prompt() {
    let path = test_path("state-confirm.toml");
    fs::write(
        &path,
        "confirm_upgrades = [\"fd\"]\n\n[feed]\nfd = \"10.2.0\"\n\n[installed]\nfd = \"10.1.0\"\n",
    )
    .expect("must write");

    let service = FileService::load(&path).expect("must load");
    let console = ScriptedConsole::with_input(&["2"]);
    let sink = RecordingSink::new();
    let results = BatchRunner::new(&service, &console, &sink)
        .upgrade_run(&BatchConfig::new(TargetSet::All))
        .expect("batch must run");

    let outcome = results.get("fd").expect("must be present");
    assert_eq!(outcome.status, OutcomeStatus::Skipped);
    assert_eq!(outcome.version, "10.1.0");
    assert!(console.read_count() > 0);
    let _ = fs::remove_file(&path);
}

#[test]
fn outcome_lines_in_plain_style_have_no_escape_codes() {
    let outcomes = vec![
        PackageOutcome::upgraded("fd", "10.2.0"),
        PackageOutcome::failed("bat", "0.24.0", "checksum mismatch"),
    ];
    let lines = render_outcome_lines(OutputStyle::Plain, &outcomes);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("upgraded"));
    assert!(lines[0].contains("fd 10.2.0"));
    assert!(lines[1].starts_with("failed"));
    assert_eq!(lines[2], "  error: checksum mismatch");
    assert!(lines.iter().all(|line| !line.contains('\u{1b}')));
}

#[test]
fn rich_outcome_lines_align_with_plain_ones() {
    let outcomes = vec![
        PackageOutcome::upgraded("fd", "10.2.0"),
        PackageOutcome::skipped("bat", "0.24.0"),
        PackageOutcome::failed("zlib", "1.3.0", "checksum mismatch"),
    ];
    let plain = render_outcome_lines(OutputStyle::Plain, &outcomes);
    let rich = render_outcome_lines(OutputStyle::Rich, &outcomes);

    assert!(rich[0].contains('\u{1b}'));
    let visible = rich.iter().map(|line| strip_escapes(line)).collect::<Vec<_>>();
    assert_eq!(visible, plain);
}

fn strip_escapes(line: &str) -> String {
    let mut visible = String::new();
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for control in chars.by_ref() {
                if control == 'm' {
                    break;
                }
            }
        } else {
            visible.push(ch);
        }
    }
    visible
}

#[test]
fn summary_line_counts_failures() {
    let results = BatchResults::new();
    results.put(PackageOutcome::upgraded("fd", "10.2.0"));
    results.put(PackageOutcome::failed("bat", "0.24.0", "boom"));
    assert_eq!(
        render_summary_line(&results),
        "1 package(s) processed, 1 failed"
    );

    let clean = BatchResults::new();
    clean.put(PackageOutcome::skipped("fd", "10.2.0"));
    assert_eq!(
        render_summary_line(&clean),
        "1 package(s) processed, no failures"
    );
}

#[test]
fn json_rendering_is_sorted_and_structured() {
    let results = BatchResults::new();
    results.put(PackageOutcome::upgraded("zlib", "1.3.0"));
    results.put(PackageOutcome::failed("bat", "0.24.0", "boom"));

    let rendered = render_json(&results).expect("must render");
    let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("must be valid json");
    let entries = parsed.as_array().expect("must be an array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["identifier"], "bat");
    assert_eq!(entries[0]["status"], "failed");
    assert_eq!(entries[1]["identifier"], "zlib");
    assert_eq!(entries[1]["messages"], serde_json::json!([]));
}
