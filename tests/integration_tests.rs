//! Integration tests for the tagkeep CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a tagkeep command isolated from user configuration
fn tagkeep(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tagkeep").unwrap();
    cmd.current_dir(tmp.path())
        .env_remove("TAGKEEP_LIBRARY")
        .env_remove("TAGKEEP_LOG")
        .env_remove("RUST_LOG")
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"));
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tagkeep(&tmp).arg("init").assert().success();
    tmp
}

/// Run a command and return its trimmed stdout
fn stdout_of(tmp: &TempDir, args: &[&str]) -> String {
    let output = tagkeep(tmp).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "tagkeep {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a tag and return its id
fn add_tag(tmp: &TempDir, name: &str, automatic: bool) -> String {
    let mut args = vec!["-q", "add", name];
    if automatic {
        args.push("--automatic");
    }
    stdout_of(tmp, &args)
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    tagkeep(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rename"))
        .stdout(predicate::str::contains("purge"));
}

#[test]
fn test_init_creates_project() {
    let tmp = TempDir::new().unwrap();
    tagkeep(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized tagkeep project"));

    assert!(tmp.path().join(".tagkeep/config.yaml").exists());
    assert!(tmp.path().join(".tagkeep/tags.db").exists());
}

#[test]
fn test_init_twice_reports_existing() {
    let tmp = setup_test_project();
    tagkeep(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    tagkeep(&tmp)
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a tagkeep project"));
}

// ============================================================================
// Tag Tests
// ============================================================================

#[test]
fn test_add_is_idempotent_and_case_insensitive() {
    let tmp = setup_test_project();
    let id = add_tag(&tmp, "Reading", false);
    assert!(!id.is_empty());
    assert_eq!(add_tag(&tmp, "  reading ", false), id);
    assert_ne!(add_tag(&tmp, "Reading", true), id);
}

#[test]
fn test_list_is_collated() {
    let tmp = setup_test_project();
    add_tag(&tmp, "banana", false);
    add_tag(&tmp, "Apple", false);
    add_tag(&tmp, "cherry", false);

    let names: Vec<String> = stdout_of(&tmp, &["--format", "tsv", "list"])
        .lines()
        .map(|line| line.split('\t').nth(1).unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["Apple", "banana", "cherry"]);
}

#[test]
fn test_list_filters_by_type_and_library() {
    let tmp = setup_test_project();
    add_tag(&tmp, "mine", false);
    add_tag(&tmp, "imported", true);
    stdout_of(&tmp, &["-q", "--library", "2", "add", "elsewhere"]);

    let manual = stdout_of(&tmp, &["--format", "tsv", "list", "--type", "manual"]);
    assert!(manual.contains("mine"));
    assert!(!manual.contains("imported"));
    assert!(!manual.contains("elsewhere"));

    let other = stdout_of(&tmp, &["--format", "tsv", "--library", "2", "list"]);
    assert!(other.contains("elsewhere"));
    assert!(!other.contains("mine"));
}

#[test]
fn test_search_finds_substring() {
    let tmp = setup_test_project();
    add_tag(&tmp, "to read", false);
    add_tag(&tmp, "reading list", false);
    add_tag(&tmp, "done", false);

    let found = stdout_of(&tmp, &["--format", "id", "search", "READ"]);
    assert_eq!(found.lines().count(), 2);
}

#[test]
fn test_show_json() {
    let tmp = setup_test_project();
    let id = add_tag(&tmp, "urgent", false);

    let out = stdout_of(&tmp, &["--format", "json", "show", &id]);
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["tag"]["name"], "urgent");
    assert_eq!(doc["tag"]["type"], 0);
    assert_eq!(doc["color"], "#000000");
}

#[test]
fn test_show_missing_tag_fails() {
    let tmp = setup_test_project();
    tagkeep(&tmp)
        .args(["show", "404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Rename Tests
// ============================================================================

#[test]
fn test_rename_plain() {
    let tmp = setup_test_project();
    let id = add_tag(&tmp, "draft", true);

    tagkeep(&tmp)
        .args(["rename", &id, "final"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed"));

    let out = stdout_of(&tmp, &["--format", "json", "show", &id]);
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["tag"]["name"], "final");
    assert_eq!(doc["tag"]["type"], 0);
}

#[test]
fn test_rename_merges_into_manual_tag() {
    let tmp = setup_test_project();
    stdout_of(&tmp, &["item", "add", "10"]);
    stdout_of(&tmp, &["item", "add", "11"]);
    let keep = add_tag(&tmp, "Read", false);
    let dup = add_tag(&tmp, "read", true);
    stdout_of(&tmp, &["link", "10", &keep]);
    stdout_of(&tmp, &["link", "10", &dup]);
    stdout_of(&tmp, &["link", "11", &dup]);

    tagkeep(&tmp)
        .args(["rename", &dup, "Read"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged"));

    tagkeep(&tmp).args(["show", &dup]).assert().failure();
    assert_eq!(stdout_of(&tmp, &["item", "tags", "10"]), keep);
    assert_eq!(stdout_of(&tmp, &["item", "tags", "11"]), keep);
}

// ============================================================================
// Link, Erase and Purge Tests
// ============================================================================

#[test]
fn test_link_requires_registered_item() {
    let tmp = setup_test_project();
    let id = add_tag(&tmp, "topic", false);
    tagkeep(&tmp)
        .args(["link", "5", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("item 5 not found"));
}

#[test]
fn test_erase_removes_tag_and_links() {
    let tmp = setup_test_project();
    stdout_of(&tmp, &["item", "add", "1"]);
    let id = add_tag(&tmp, "gone", false);
    stdout_of(&tmp, &["link", "1", &id]);

    tagkeep(&tmp)
        .args(["erase", &id, "999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Erased 1 tag(s)"));

    assert_eq!(stdout_of(&tmp, &["item", "tags", "1"]), "");
    assert_eq!(stdout_of(&tmp, &["--format", "id", "list"]), "");
}

#[test]
fn test_unlink_then_purge_removes_orphan() {
    let tmp = setup_test_project();
    stdout_of(&tmp, &["item", "add", "5"]);
    let orphan = add_tag(&tmp, "orphan", false);
    let linked = add_tag(&tmp, "linked", false);
    stdout_of(&tmp, &["link", "5", &orphan]);
    stdout_of(&tmp, &["link", "5", &linked]);
    stdout_of(&tmp, &["unlink", "5", &orphan]);

    assert_eq!(stdout_of(&tmp, &["--format", "id", "purge"]), orphan);
    assert_eq!(stdout_of(&tmp, &["--format", "id", "list"]), linked);

    // Nothing pending any more
    assert_eq!(stdout_of(&tmp, &["--format", "id", "purge"]), "");
}

#[test]
fn test_purge_orphans_flag_forces_scan() {
    let tmp = setup_test_project();
    let orphan = add_tag(&tmp, "never linked", false);

    assert_eq!(stdout_of(&tmp, &["--format", "id", "purge"]), "");
    assert_eq!(
        stdout_of(&tmp, &["--format", "id", "purge", "--orphans"]),
        orphan
    );
}

#[test]
fn test_purge_explicit_ids() {
    let tmp = setup_test_project();
    stdout_of(&tmp, &["item", "add", "1"]);
    let a = add_tag(&tmp, "a", false);
    let b = add_tag(&tmp, "b", false);
    stdout_of(&tmp, &["link", "1", &a]);

    assert_eq!(stdout_of(&tmp, &["--format", "id", "purge", &a]), a);
    assert_eq!(stdout_of(&tmp, &["--format", "id", "list"]), b);
}

// ============================================================================
// Color Tests
// ============================================================================

#[test]
fn test_color_assignment_and_item_color() {
    let tmp = setup_test_project();
    stdout_of(&tmp, &["item", "add", "1"]);
    stdout_of(&tmp, &["item", "add", "2"]);
    let id = add_tag(&tmp, "urgent", false);
    stdout_of(&tmp, &["link", "1", &id]);

    stdout_of(&tmp, &["color", "set", "urgent", "#ff0000"]);
    assert_eq!(stdout_of(&tmp, &["color", "item", "1"]), "#ff0000");
    assert_eq!(stdout_of(&tmp, &["-q", "color", "item", "2"]), "");
    assert_eq!(
        stdout_of(&tmp, &["--format", "tsv", "color", "list"]),
        "urgent\t#ff0000"
    );

    stdout_of(&tmp, &["color", "unset", "urgent"]);
    assert_eq!(stdout_of(&tmp, &["-q", "color", "item", "1"]), "");
    assert_eq!(stdout_of(&tmp, &["--format", "json", "color", "list"]), "{}");
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    tagkeep(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tagkeep"));
}

#[test]
fn test_completions_zsh_names_binary() {
    let tmp = TempDir::new().unwrap();
    tagkeep(&tmp)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef tagkeep"));
}
