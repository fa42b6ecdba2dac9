//! # Offline Tool Tests
//!
//! Runs `uniquecraft_admin` commands against documents in the temp dir.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use clap::Parser;
use uniquecraft::cli::{self, Cli, EXIT_INVALID, EXIT_OK, EXIT_UNAVAILABLE};
use uniquecraft_core::{CraftedLedger, PersistenceConfig};

const STORE: &str = r#"
[crafts.golden_sword]
shape = ["GGG", " S ", " S "]

[crafts.golden_sword.ingredients]
G = "GOLD_BLOCK"
S = "STICK"

[crafts.golden_sword.result]
material = "GOLDEN_SWORD"

[crafts.totem]
shape = [" ", "T", " "]

[crafts.totem.ingredients]
T = "TOTEM_OF_UNDYING"

[crafts.totem.result]
material = "TOTEM_OF_UNDYING"

[crafted]
golden_sword = true
"#;

const BROKEN_RECIPE: &str = r#"
[crafts.broken_axe]
shape = ["GG ", "GS ", " S "]

[crafts.broken_axe.ingredients]
G = "GOLD_BLOCK"

[crafts.broken_axe.result]
material = "GOLDEN_AXE"
"#;

fn temp_path(label: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "test_uniquecraft_cli_{label}_{nanos}_{}.toml",
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

fn store_with(document: &str) -> PathBuf {
    let path = temp_path("store");
    std::fs::write(&path, document).unwrap();
    path
}

/// Runs one command line against `store` and returns (status, output).
fn run(store: &Path, args: &[&str]) -> (u8, String) {
    let config = temp_path("missing_config");
    let mut argv = vec![
        "uniquecraft_admin".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--store".to_string(),
        store.display().to_string(),
    ];
    argv.extend(args.iter().map(|a| (*a).to_string()));

    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let status = cli::run(&cli, &mut out).unwrap();
    (status, String::from_utf8(out).unwrap())
}

#[test]
fn test_list_reports_each_recipe_and_total() {
    let store = store_with(STORE);

    let (status, out) = run(&store, &["list"]);
    assert_eq!(status, EXIT_OK);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("golden_sword"));
    assert!(lines[0].ends_with("already crafted"));
    assert!(lines[1].starts_with("totem"));
    assert!(lines[1].ends_with("available"));
    assert_eq!(lines[2], "Total: 2 crafts, 1 crafted");
}

#[test]
fn test_list_without_store_is_empty() {
    let store = temp_path("absent");

    let (status, out) = run(&store, &["list"]);
    assert_eq!(status, EXIT_OK);
    assert_eq!(out, "No crafts configured.\nTotal: 0 crafts, 0 crafted\n");
}

#[test]
fn test_check_exit_status_follows_availability() {
    let store = store_with(STORE);

    assert_eq!(run(&store, &["check", "totem"]), (EXIT_OK, "totem: available\n".to_string()));
    assert_eq!(
        run(&store, &["check", "golden_sword"]),
        (EXIT_UNAVAILABLE, "golden_sword: already crafted\n".to_string())
    );
}

#[test]
fn test_check_unknown_recipe_says_not_configured() {
    let store = store_with(STORE);

    let (status, out) = run(&store, &["check", "nope"]);
    assert_eq!(status, EXIT_OK);
    assert_eq!(out, "nope: not configured\nnope: available\n");
}

#[test]
fn test_reset_is_written_to_the_store() {
    let store = store_with(STORE);

    let (status, out) = run(&store, &["reset", "golden_sword"]);
    assert_eq!(status, EXIT_OK);
    assert_eq!(out, "golden_sword: reset\n");

    let snapshot = CraftedLedger::new(&store, PersistenceConfig::default())
        .load()
        .unwrap();
    assert!(!snapshot.is_produced("golden_sword"));
    assert_eq!(run(&store, &["check", "golden_sword"]).0, EXIT_OK);

    let text = std::fs::read_to_string(&store).unwrap();
    assert!(text.contains("[crafts.golden_sword]"));
}

#[test]
fn test_reset_of_uncrafted_recipe_exits_one() {
    let store = store_with(STORE);

    let (status, out) = run(&store, &["reset", "totem"]);
    assert_eq!(status, EXIT_UNAVAILABLE);
    assert_eq!(out, "totem: has not been crafted\n");
}

#[test]
fn test_validate_clean_store() {
    let store = store_with(STORE);

    assert_eq!(
        run(&store, &["validate"]),
        (EXIT_OK, "2 valid, 0 invalid\n".to_string())
    );
}

#[test]
fn test_validate_reports_broken_recipes() {
    let store = store_with(&format!("{STORE}{BROKEN_RECIPE}"));

    let (status, out) = run(&store, &["validate"]);
    assert_eq!(status, EXIT_INVALID);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("error: recipe broken_axe"));
    assert_eq!(lines[1], "2 valid, 1 invalid");
}

#[test]
fn test_unreadable_store_is_an_error() {
    let store = store_with("[crafts\nnot toml");
    let cli = Cli::try_parse_from([
        "uniquecraft_admin",
        "--config",
        temp_path("missing_config").to_str().unwrap(),
        "--store",
        store.to_str().unwrap(),
        "list",
    ])
    .unwrap();

    assert!(cli::run(&cli, &mut Vec::new()).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["uniquecraft_admin", "check", "totem", "-vv", "-s", "x.toml"])
        .unwrap();
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.store, Some(PathBuf::from("x.toml")));
    assert_eq!(cli.config, PathBuf::from("uniquecraft.toml"));
}

#[test]
fn test_log_level_defaults_to_info() {
    assert_eq!(cli::log_level(0), "info");
    assert_eq!(cli::log_level(1), "debug");
    assert_eq!(cli::log_level(2), "trace");
    assert_eq!(cli::log_level(5), "trace");
}
