//! Two processes on one database: a `watch` session sees what another adds.
use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use std::io::{BufRead, BufReader};
use std::process::{Command as StdCommand, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(20);

#[test]
fn given_watching_session_when_other_process_adds_and_deletes_then_changes_printed() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("linkstash.db");
    Command::cargo_bin("linkstash")
        .unwrap()
        .env("HOME", dir.path())
        .args(["create-db", db.to_str().unwrap()])
        .assert()
        .success();

    let mut watcher = StdCommand::new(cargo_bin("linkstash"))
        .env("HOME", dir.path())
        .env("LINKSTASH_DB_URL", &db)
        .env("LINKSTASH_USER", "alice")
        .env("LINKSTASH_POLL_INTERVAL_MS", "50")
        .args(["--no-color", "watch", "--count", "2"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // subscribed once the banner is printed
    let stderr = watcher.stderr.take().unwrap();
    let (ready_tx, ready_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            if line.contains("Watching bookmarks of alice") {
                let _ = ready_tx.send(());
            }
        }
    });
    let stdout = watcher.stdout.take().unwrap();
    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            let _ = line_tx.send(line);
        }
    });

    if ready_rx.recv_timeout(TIMEOUT).is_err() {
        let _ = watcher.kill();
        panic!("watch did not start");
    }

    let writer = |args: &[&str]| {
        Command::cargo_bin("linkstash")
            .unwrap()
            .env("HOME", dir.path())
            .env("LINKSTASH_DB_URL", &db)
            .env("LINKSTASH_USER", "alice")
            .args(args)
            .assert()
            .success();
    };
    writer(&["add", "example.com", "--title", "Example"]);
    Command::cargo_bin("linkstash")
        .unwrap()
        .env("HOME", dir.path())
        .env("LINKSTASH_DB_URL", &db)
        .env("LINKSTASH_USER", "bob")
        .args(["add", "bob.example"])
        .assert()
        .success();
    writer(&["delete", "--yes", "1"]);

    let mut lines = Vec::new();
    while lines.len() < 2 {
        match line_rx.recv_timeout(TIMEOUT) {
            Ok(line) => lines.push(line),
            Err(_) => {
                let _ = watcher.kill();
                panic!("watch printed only {:?}", lines);
            }
        }
    }
    let status = watcher.wait().unwrap();

    assert!(status.success());
    assert_eq!(lines[0], "+ [1] Example: https://example.com");
    assert_eq!(lines[1], "- [1]");
}
