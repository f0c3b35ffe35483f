use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Writes `content` padded past the default minimum file size
fn write_asset(dir: &Path, name: &str, content: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    let padded = format!("{content}\n{}", "-".repeat(200));
    fs::write(dir.join(name), padded)?;
    Ok(())
}

fn project() -> Result<TempDir> {
    let dir = tempdir()?;
    let assets = dir.path().join("Content/Assets");
    write_asset(&assets, "BP_Hero.uasset", "Inventory=AWeapon")?;
    write_asset(&assets, "BP_Turret.uasset", "Mount=Weapon")?;
    write_asset(&assets, "BP_Door.uasset", "Frame=Wood")?;
    Ok(dir)
}

fn assetscout(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("assetscout")?;
    cmd.current_dir(dir.path()).env_remove("RUST_LOG").arg("--quiet");
    Ok(cmd)
}

#[test]
fn test_search_default_roots_strips_prefix() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .arg("AWeapon")
        .assert()
        .success()
        .stdout(predicate::str::contains("BP_Hero.uasset"))
        .stdout(predicate::str::contains("BP_Turret.uasset"))
        .stdout(predicate::str::contains("BP_Door.uasset").not())
        .stdout(predicate::str::contains("Found 2 matching files"));
    Ok(())
}

#[test]
fn test_keep_prefix() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .args(["AWeapon", "--keep-prefix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BP_Hero.uasset"))
        .stdout(predicate::str::contains("BP_Turret.uasset").not());
    Ok(())
}

#[test]
fn test_filter_by_file_name() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .args(["weapon", "--filter", "TURRET"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BP_Turret.uasset"))
        .stdout(predicate::str::contains("BP_Hero.uasset").not());
    Ok(())
}

#[test]
fn test_explicit_paths_and_full_output() -> Result<()> {
    let dir = tempdir()?;
    let other = dir.path().join("Elsewhere");
    write_asset(&other, "Notes.txt", "the quick brown fox")?;

    assetscout(&dir)?
        .args(["QUICK", "Elsewhere", "--full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes.txt"))
        .stdout(predicate::str::contains("the quick brown fox"));
    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .args(["Wood", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BP_Door.uasset"))
        .stdout(predicate::str::contains("\"line_number\":1"))
        .stdout(predicate::str::contains("Found").not());
    Ok(())
}

#[test]
fn test_size_limits_in_kb() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .args(["Wood", "--min-kb", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 matching files"));
    Ok(())
}

#[test]
fn test_plugins() -> Result<()> {
    let dir = project()?;
    write_asset(
        &dir.path().join("Plugins/Armory/Content"),
        "BP_Rack.uasset",
        "Holds=Weapon",
    )?;

    assetscout(&dir)?
        .arg("Weapon")
        .assert()
        .success()
        .stdout(predicate::str::contains("BP_Rack.uasset").not());

    assetscout(&dir)?
        .args(["Weapon", "--plugins"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BP_Rack.uasset"));
    Ok(())
}

#[test]
fn test_missing_root_is_a_warning() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .args(["Wood", "Content/Assets", "Nowhere"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Directory not found"))
        .stdout(predicate::str::contains("BP_Door.uasset"));
    Ok(())
}

#[test]
fn test_empty_root_is_not_a_warning() -> Result<()> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("Content/Assets"))?;

    assetscout(&dir)?
        .arg("Weapon")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning").not())
        .stdout(predicate::str::contains("Found 0 matching files"));
    Ok(())
}

#[test]
fn test_negative_size_is_rejected() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .args(["Weapon", "--max-kb=-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-kb"));

    assetscout(&dir)?
        .args(["Weapon", "--min-kb", "NaN"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--min-kb"));
    Ok(())
}

#[test]
fn test_no_search_paths() -> Result<()> {
    let dir = tempdir()?;

    assetscout(&dir)?
        .arg("Weapon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No search paths available"));
    Ok(())
}

#[test]
fn test_invalid_pattern() -> Result<()> {
    let dir = project()?;

    assetscout(&dir)?
        .arg("[")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid regex pattern"));
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let dir = project()?;
    fs::write(
        dir.path().join("search.yaml"),
        "pattern: \"Wood\"\nmax_file_size: 4096\n",
    )?;

    assetscout(&dir)?
        .args(["--config", "search.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BP_Door.uasset"));
    Ok(())
}
