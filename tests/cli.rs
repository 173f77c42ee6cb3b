use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const CONSISTENT_DRAFT: &str = "\
# Riposte

## ★ Working Title
Riposte

## ★ Elevator Pitch
A knight who only wins by reading and parrying enemy attacks.

## ★ Genre
Action roguelite

## ★ Design Pillars
- **Parry**: telegraphed enemy patterns
- **Greed**: risky loot choices

## ★ Core Mechanic
Timed parries against telegraphed attacks.

## ★ Core Loop
Explore 3 rooms → Read telegraphs and parry → Pick risky loot → Descend

## ★ Target Audience
Players of Sekiro and Hades.

## Level / World Structure
Five biomes of handmade rooms.

## Session Design
30 minute runs, 15 hours to complete.

## Progression System
Unlockable parry techniques.

## Platform Priority
PC (Steam) first, consoles later.

## Input Scheme
Controller first, keyboard supported.

## Art Style
Ink-wash 2D.

## Monetization Model
Premium at $20, assuming roguelite pricing benchmarks.

## Scope & Risks
Boss count is the main risk.
";

const PARRY_DRAFT: &str = "\
## Design Pillars
- **Parry**: telegraphed enemy patterns

## Core Loop
Explore → Fight → Loot → Explore
";

const PLAYER_CS: &str = "\
using UnityEngine;

public class Player : MonoBehaviour
{
    public float speed = 5f;
    void Update() { }
    public void Jump(float height) { }
}
";

/// Temporary working directory with config, state and home isolated from the user's.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("gidkit").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("XDG_STATE_HOME", self.path().join(".state"))
            .env("XDG_DATA_HOME", self.path().join(".data"))
            .env_remove("RUST_LOG")
            .env_remove("GIDKIT_TEMPLATE")
            .env_remove("GIDKIT_LOG")
            .env_remove("GIDKIT_ABBREVIATED_THRESHOLD");
        cmd
    }
}

#[test]
fn test_validate_consistent_draft_passes() {
    let sandbox = Sandbox::new();
    sandbox.write("riposte.md", CONSISTENT_DRAFT);

    sandbox
        .cmd()
        .args(["validate", "riposte.md"])
        .assert()
        .code(0)
        .stdout(contains("Template: GID"))
        .stdout(contains("Mode:     ABBREVIATED (0 open decisions)"))
        .stdout(contains("Result: PASS"));
}

#[test]
fn test_validate_reports_contradiction() {
    let sandbox = Sandbox::new();
    sandbox.write("parry.md", PARRY_DRAFT);

    sandbox
        .cmd()
        .args(["validate", "parry.md"])
        .assert()
        .code(1)
        .stdout(contains("[INTERNAL]"))
        .stdout(contains("pillars-vs-core-loop"))
        .stdout(contains("Result: FAIL"));
}

#[test]
fn test_validate_json_output() {
    let sandbox = Sandbox::new();
    sandbox.write("parry.md", PARRY_DRAFT);

    let output = sandbox
        .cmd()
        .args(["validate", "parry.md", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["template"], "GID");
    assert_eq!(json["passed"], false);
    assert_eq!(json["findings"][0]["rule"], "pillars-vs-core-loop");
    assert_eq!(json["findings"][0]["tag"], "INTERNAL");
}

#[test]
fn test_validate_json_draft_with_pillar_text() {
    let sandbox = Sandbox::new();
    sandbox.write(
        "parry.json",
        r#"{"sections": {
            "Design Pillars": "- **Parry**: telegraphed enemy patterns",
            "Core Loop": "Explore → Fight → Loot → Explore"
        }}"#,
    );

    sandbox
        .cmd()
        .args(["validate", "parry.json"])
        .assert()
        .code(1)
        .stdout(contains("pillars-vs-core-loop"))
        .stdout(contains("Result: FAIL"));
}

#[test]
fn test_validate_unknown_template() {
    let sandbox = Sandbox::new();
    sandbox.write("parry.md", PARRY_DRAFT);

    sandbox
        .cmd()
        .args(["validate", "parry.md", "--template", "gdd"])
        .assert()
        .code(2)
        .stderr(contains("unknown template 'gdd'"));
}

#[test]
fn test_validate_malformed_json_draft() {
    let sandbox = Sandbox::new();
    sandbox.write("draft.json", "{ nope");

    sandbox
        .cmd()
        .args(["validate", "draft.json"])
        .assert()
        .code(2)
        .stderr(contains("malformed draft"));
}

#[test]
fn test_validate_missing_file() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["validate", "absent.md"])
        .assert()
        .code(2)
        .stderr(contains("cannot read file"));
}

#[test]
fn test_mode_json_for_undecided_draft() {
    let sandbox = Sandbox::new();
    sandbox.write(
        "draft.md",
        "## Genre\nTBD\n\n## Core Mechanic\nTBD\n\n## Core Loop\nTBD\n\n## Art Style\nTBD\n",
    );

    let output = sandbox
        .cmd()
        .args(["mode", "draft.md", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["template"], "GID");
    assert_eq!(json["mode"], "FULL");
}

#[test]
fn test_project_config_sets_default_template() {
    let sandbox = Sandbox::new();
    sandbox.write(".gidkit", "[validation]\ndefault_template = \"project-snapshot\"\n");
    sandbox.write("snapshot.md", "## Locked Decisions\n- Engine: Godot\n");

    sandbox
        .cmd()
        .args(["mode", "snapshot.md", "--json"])
        .assert()
        .success()
        .stdout(contains("PROJECT_SNAPSHOT"));
}

#[test]
fn test_env_overrides_default_template() {
    let sandbox = Sandbox::new();
    sandbox.write("review.md", "## Verdict\nRevise.\n");

    sandbox
        .cmd()
        .env("GIDKIT_TEMPLATE", "gid_adversarial")
        .args(["mode", "review.md"])
        .assert()
        .success()
        .stdout(contains("Template: GID_ADVERSARIAL"));
}

#[test]
fn test_templates_lists_all() {
    Sandbox::new()
        .cmd()
        .arg("templates")
        .assert()
        .success()
        .stdout(contains("gid-adversarial"))
        .stdout(contains("project-snapshot"));
}

#[test]
fn test_show_prompt_and_schema() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["show", "gid"])
        .assert()
        .success()
        .stdout(contains("## ★ Design Pillars"));

    sandbox
        .cmd()
        .args(["show", "GID", "--schema"])
        .assert()
        .success()
        .stdout(contains("GID sections:"))
        .stdout(contains("pillars-vs-core-loop"));
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["init", "project-snapshot"])
        .assert()
        .success()
        .stdout(contains("project-snapshot.md"));
    let written = sandbox.path().join("project-snapshot.md");
    assert!(fs::read_to_string(&written).unwrap().contains("Locked Decisions"));

    fs::write(&written, "edited").unwrap();
    sandbox
        .cmd()
        .args(["init", "project-snapshot"])
        .assert()
        .code(1)
        .stderr(contains("--force"));
    assert_eq!(fs::read_to_string(&written).unwrap(), "edited");

    sandbox
        .cmd()
        .args(["init", "project-snapshot", "--force"])
        .assert()
        .success();
    assert_ne!(fs::read_to_string(&written).unwrap(), "edited");
}

#[test]
fn test_init_custom_output() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["init", "gid", "--output", "prompts/gid.md"])
        .assert()
        .failure();

    fs::create_dir_all(sandbox.path().join("prompts")).unwrap();
    sandbox
        .cmd()
        .args(["init", "gid", "--output", "prompts/gid.md"])
        .assert()
        .success();
    assert!(sandbox.path().join("prompts/gid.md").exists());
}

#[test]
fn test_map_writes_interface_maps() {
    let sandbox = Sandbox::new();
    sandbox.write("Assets/Scripts/Player.cs", PLAYER_CS);

    sandbox
        .cmd()
        .args(["map", "Assets"])
        .assert()
        .success()
        .stdout(contains("Found 1 C# files"))
        .stdout(contains("Source total:"));

    let maps = sandbox.path().join("Assets/_interface_maps");
    let doc = fs::read_to_string(maps.join("Player.md")).unwrap();
    assert!(doc.contains("## public class `Player` : `MonoBehaviour`"));
    assert!(!doc.contains("`Update`"));
    assert!(maps.join("README.md").exists());
}

#[test]
fn test_map_explicit_output_dir() {
    let sandbox = Sandbox::new();
    sandbox.write("src/Player.cs", PLAYER_CS);

    sandbox
        .cmd()
        .args(["map", "src", "docs/api"])
        .assert()
        .success();
    assert!(sandbox.path().join("docs/api/Player.md").exists());
}

#[test]
fn test_map_without_scripts() {
    let sandbox = Sandbox::new();
    fs::create_dir_all(sandbox.path().join("empty")).unwrap();

    sandbox
        .cmd()
        .args(["map", "empty"])
        .assert()
        .success()
        .stdout(contains("No .cs files found"));
}

#[test]
fn test_map_rejects_file_input() {
    let sandbox = Sandbox::new();
    sandbox.write("Player.cs", PLAYER_CS);

    sandbox
        .cmd()
        .args(["map", "Player.cs"])
        .assert()
        .code(1)
        .stderr(contains("is not a directory"))
        .stdout(predicate::str::is_empty());
}
