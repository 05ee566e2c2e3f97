use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use chrono::Datelike;
use predicates::prelude::*;
use tempfile::TempDir;

fn spendgrid(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spendgrid").unwrap();
    cmd.arg("--root")
        .arg(root.path())
        .env("SPENDGRID_DATA_DIR", root.path().join(".data"))
        .env_remove("SPENDGRID_ROOT")
        .env_remove("RUST_LOG");
    cmd
}

fn init_ledger() -> TempDir {
    let root = TempDir::new().unwrap();
    spendgrid(&root).arg("init").assert().success();
    root
}

fn current_month_file(root: &TempDir) -> PathBuf {
    let today = chrono::Local::now().date_naive();
    root.path()
        .join(today.year().to_string())
        .join(format!("{:02}.md", today.month()))
}

fn first_rule_id(root: &TempDir) -> String {
    let text = fs::read_to_string(root.path().join("_config").join("rules.yml")).unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    value["rules"][0]["id"].as_str().unwrap().to_string()
}

#[test]
fn test_init_creates_ledger() {
    let root = TempDir::new().unwrap();
    spendgrid(&root)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("12 month file(s)"));

    assert!(root.path().join(".spendgrid").exists());
    assert!(root.path().join("_config").join("rules.yml").exists());
    assert!(current_month_file(&root).exists());
    assert!(root.path().join(".data").join("currency_maps.json").exists());

    spendgrid(&root)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_require_init() {
    let root = TempDir::new().unwrap();
    spendgrid(&root)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a spendgrid directory"));
}

#[test]
fn test_rule_sync_and_completion() {
    let root = init_ledger();

    spendgrid(&root)
        .args(["rules", "add", "Rent", "-1000", "--day", "1", "--tag", "home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created rule: Rent"));

    spendgrid(&root)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync complete"));

    let expected = "- [ ] 01 | Rent | -1000.00 TRY | #home";
    let content = fs::read_to_string(current_month_file(&root)).unwrap();
    assert!(content.contains(expected));

    // A second sync changes nothing
    spendgrid(&root)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 added, 0 updated"));
    assert_eq!(fs::read_to_string(current_month_file(&root)).unwrap(), content);

    let id = first_rule_id(&root);
    let month = chrono::Local::now().format("%Y-%m").to_string();
    spendgrid(&root)
        .args(["complete", &id, "--month", &month])
        .assert()
        .success()
        .stdout(predicate::str::contains("- [x] 01 | Rent"));

    // Checked lines survive later syncs, even when the rule changes
    spendgrid(&root)
        .args(["rules", "edit", &id, "--amount", "-1200"])
        .assert()
        .success();
    spendgrid(&root).arg("sync").assert().success();
    let content = fs::read_to_string(current_month_file(&root)).unwrap();
    assert!(content.contains("- [x] 01 | Rent | -1000.00 TRY | #home"));
    assert!(!content.contains("-1200.00"));

    spendgrid(&root)
        .args(["uncomplete", &id, "--month", &month])
        .assert()
        .success();
    let content = fs::read_to_string(current_month_file(&root)).unwrap();
    assert!(content.contains("- [ ] 01 | Rent | -1000.00 TRY | #home"));
}

#[test]
fn test_add_list_edit_remove() {
    let root = init_ledger();
    let file = root.path().join("2030").join("01.md");

    spendgrid(&root)
        .args(["add", "05 | Market | -120.50 TL | #food", "--month", "2030-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added #1"));
    assert!(fs::read_to_string(&file)
        .unwrap()
        .contains("- 05 | Market | -120.50 TRY | #food"));

    spendgrid(&root)
        .args(["list", "--month", "2030-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Market"));

    spendgrid(&root)
        .args(["edit", "1", "--month", "2030-01", "--amount", "-99.90"])
        .assert()
        .success();
    assert!(fs::read_to_string(&file)
        .unwrap()
        .contains("- 05 | Market | -99.90 TRY | #food"));

    spendgrid(&root)
        .args(["remove", "2", "--month", "2030-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    spendgrid(&root)
        .args(["remove", "1", "--month", "2030-01"])
        .assert()
        .success();
    assert!(!fs::read_to_string(&file).unwrap().contains("Market"));
}

#[test]
fn test_invalid_day_is_rejected_before_writing() {
    let root = init_ledger();
    let file = root.path().join("2030").join("02.md");

    spendgrid(&root)
        .args(["add", "32 | Market | -1 TL |", "--month", "2030-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid day"));
    assert!(!file.exists());
}

#[test]
fn test_quick_entry() {
    let root = init_ledger();

    spendgrid(&root)
        .args(["quick", "-100TL", "market", "#food", "@home"])
        .assert()
        .success();

    let content = fs::read_to_string(current_month_file(&root)).unwrap();
    assert!(content.contains("| market | -100.00 TRY | #food @home"));
}

#[test]
fn test_validate_and_report() {
    let root = init_ledger();
    fs::create_dir_all(root.path().join("2030")).unwrap();
    fs::write(
        root.path().join("2030").join("03.md"),
        "# 2030 March\n\n## ROWS\n- 01 | Salary | 5000 TL |\n- 02 | broken line\n\n## RULES\n\n",
    )
    .unwrap();

    spendgrid(&root)
        .args(["validate", "--year", "2030"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2030/03.md:5 | - 02 | broken line"));

    spendgrid(&root)
        .args(["report", "--month", "2030-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5000.00"))
        .stdout(predicate::str::contains("1 unparsed line(s)"));

    spendgrid(&root)
        .args(["export", "--month", "2030-03", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Date,Month,Day,Description"))
        .stdout(predicate::str::contains("2030-03-01,2030-03,1,Salary,5000.00,TRY"));
}

#[test]
fn test_pool_add_move_remove() {
    let root = init_ledger();
    let backlog = root.path().join("_pool").join("backlog.md");

    spendgrid(&root)
        .args(["pool", "add", "15 | Laptop | -40000 TL | #tech"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added pool item #1"));
    spendgrid(&root)
        .args(["pool", "add", "3 | Desk | -3000 TL |"])
        .assert()
        .success();

    spendgrid(&root)
        .args(["pool", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Laptop"))
        .stdout(predicate::str::contains("Desk"));

    spendgrid(&root)
        .args(["pool", "move", "1", "2030-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2030/05.md"));
    assert!(fs::read_to_string(root.path().join("2030").join("05.md"))
        .unwrap()
        .contains("- 15 | Laptop | -40000.00 TRY | #tech"));
    assert!(!fs::read_to_string(&backlog).unwrap().contains("Laptop"));

    spendgrid(&root)
        .args(["pool", "remove", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    spendgrid(&root).args(["pool", "remove", "1"]).assert().success();
    assert!(!fs::read_to_string(&backlog).unwrap().contains("Desk"));
}

#[test]
fn test_unclosed_bracket_is_rejected() {
    let root = init_ledger();

    spendgrid(&root)
        .args(["rules", "add", "Gym [promo", "-50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unclosed bracket"));

    spendgrid(&root)
        .args(["quick", "-10TL", "Cafe", "[promo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unclosed bracket"));
}
