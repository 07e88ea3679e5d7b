use assert_cmd::Command;
use predicates::prelude::*;
use rstest::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct TestDb {
    dir: TempDir,
    path: PathBuf,
}

impl TestDb {
    fn cmd(&self, user: Option<&str>) -> Command {
        let mut cmd = Command::cargo_bin("linkstash").unwrap();
        cmd.env("HOME", self.dir.path())
            .env("LINKSTASH_DB_URL", &self.path)
            .env_remove("LINKSTASH_USER")
            .env_remove("LINKSTASH_POLL_INTERVAL_MS")
            .arg("--no-color");
        if let Some(user) = user {
            cmd.args(["--user", user]);
        }
        cmd
    }
}

#[fixture]
fn db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linkstash.db");
    Command::cargo_bin("linkstash")
        .unwrap()
        .env("HOME", dir.path())
        .args(["create-db", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Database created successfully"));
    TestDb { dir, path }
}

fn list_json(db: &TestDb, user: &str) -> serde_json::Value {
    let output = db
        .cmd(Some(user))
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[rstest]
fn given_no_args_when_run_with_debug_then_success() {
    let mut cmd = Command::cargo_bin("linkstash").unwrap();
    cmd.args(["-d", "-d"])
        .env("HOME", std::env::temp_dir())
        .assert()
        .success();
}

#[rstest]
fn given_generate_config_flag_when_run_then_default_toml_printed() {
    let mut cmd = Command::cargo_bin("linkstash").unwrap();
    cmd.arg("--generate-config")
        .env("HOME", std::env::temp_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("db_url"))
        .stdout(predicate::str::contains("poll_interval_ms = 500"));
}

#[rstest]
fn given_existing_db_when_create_db_then_refused(db: TestDb) {
    Command::cargo_bin("linkstash")
        .unwrap()
        .env("HOME", db.dir.path())
        .args(["create-db", db.path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database already exists"));
}

#[rstest]
fn given_missing_db_when_list_then_hint_to_create_db() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("linkstash")
        .unwrap()
        .env("HOME", dir.path())
        .env("LINKSTASH_DB_URL", dir.path().join("absent.db"))
        .args(["--user", "alice", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("create-db"));
    assert!(!Path::new(&dir.path().join("absent.db")).exists());
}

#[rstest]
fn given_bare_host_when_add_then_normalized_and_listed(db: TestDb) {
    db.cmd(Some("alice"))
        .args(["add", "example.com/docs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com: https://example.com/docs"));

    let listed = list_json(&db, "alice");
    let items = listed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["url"], "https://example.com/docs");
    assert_eq!(items[0]["title"], "example.com");
    assert_eq!(items[0]["owner"], "alice");
}

#[rstest]
fn given_several_adds_when_list_then_newest_first_and_scoped_by_user(db: TestDb) {
    db.cmd(Some("alice")).args(["add", "one.example"]).assert().success();
    db.cmd(Some("bob")).args(["add", "bob.example"]).assert().success();
    db.cmd(Some("alice"))
        .args(["add", "two.example", "--title", "Two"])
        .assert()
        .success();

    let listed = list_json(&db, "alice");
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Two", "one.example"]);

    db.cmd(Some("alice"))
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("1. Two ["))
        .stderr(predicate::str::contains("bob.example").not());
}

#[rstest]
#[case("ftp://example.com", "URL must be http or https")]
#[case("notahost", "Enter a valid URL (e.g. example.com)")]
#[case("   ", "URL is required")]
fn given_invalid_url_when_add_then_error_and_nothing_stored(
    db: TestDb,
    #[case] url: &str,
    #[case] message: &str,
) {
    db.cmd(Some("alice"))
        .args(["add", url])
        .assert()
        .code(64)
        .stderr(predicate::str::contains(message));

    assert!(list_json(&db, "alice").as_array().unwrap().is_empty());
}

#[rstest]
fn given_bookmarks_when_list_long_then_creation_time_shown(db: TestDb) {
    db.cmd(Some("alice")).args(["add", "example.com"]).assert().success();

    db.cmd(Some("alice"))
        .args(["list", "--long"])
        .assert()
        .success()
        .stderr(predicate::str::contains("https://example.com"))
        .stderr(predicate::str::is_match(r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}").unwrap());
}

#[rstest]
fn given_no_user_when_add_then_not_signed_in(db: TestDb) {
    db.cmd(None)
        .args(["add", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[rstest]
fn given_bookmark_when_edit_title_blank_then_title_derived_from_new_url(db: TestDb) {
    db.cmd(Some("alice"))
        .args(["add", "example.com", "--title", "Example"])
        .assert()
        .success();
    let id = list_json(&db, "alice")[0]["id"].as_i64().unwrap().to_string();

    db.cmd(Some("alice"))
        .args(["edit", &id, "--url", "docs.rs", "--title", " "])
        .assert()
        .success()
        .stdout(predicate::str::contains("docs.rs: https://docs.rs"));

    db.cmd(Some("alice"))
        .args(["edit", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to change"));
}

#[rstest]
fn given_foreign_bookmark_when_edit_then_not_found(db: TestDb) {
    db.cmd(Some("bob")).args(["add", "bob.example"]).assert().success();
    let id = list_json(&db, "bob")[0]["id"].as_i64().unwrap().to_string();

    db.cmd(Some("alice"))
        .args(["edit", &id, "--title", "mine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[rstest]
fn given_bookmarks_when_delete_confirmed_then_removed(db: TestDb) {
    db.cmd(Some("alice")).args(["add", "one.example"]).assert().success();
    db.cmd(Some("alice")).args(["add", "two.example"]).assert().success();
    let ids: Vec<String> = list_json(&db, "alice")
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_i64().unwrap().to_string())
        .collect();

    db.cmd(Some("alice"))
        .args(["delete", &ids[0]])
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Deletion cancelled"));
    assert_eq!(list_json(&db, "alice").as_array().unwrap().len(), 2);

    db.cmd(Some("alice"))
        .args(["delete", "--yes", &ids.join(",")])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Deleted bookmark with ID {}", ids[1])));
    assert!(list_json(&db, "alice").as_array().unwrap().is_empty());
}

#[rstest]
fn given_malformed_ids_when_delete_then_usage_error(db: TestDb) {
    db.cmd(Some("alice"))
        .args(["delete", "--yes", "1,x"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid ID format"));
}

#[rstest]
fn given_bash_when_completion_then_script_on_stdout() {
    Command::cargo_bin("linkstash")
        .unwrap()
        .env("HOME", std::env::temp_dir())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linkstash"));
}
