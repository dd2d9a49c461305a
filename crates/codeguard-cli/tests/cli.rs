#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use tempfile::TempDir;

fn code_guard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("code-guard").expect("binary should compile");
    cmd.current_dir(dir.path())
        .env_remove("OPENAI_BASE_URL")
        .env_remove("CODEGUARD_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

/// Local chat-completions endpoint that answers every request with
/// `content`. Returns the base URL to put in `OPENAI_BASE_URL`.
fn spawn_model(content: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string();

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            answer(stream, &body);
        }
    });

    format!("http://{}/v1", addr)
}

fn answer(mut stream: TcpStream, body: &str) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut request = vec![0; content_length];
    let _ = reader.read_exact(&mut request);

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn gated_run(dir: &TempDir, mode: &str) -> assert_cmd::assert::Assert {
    fs::write(dir.path().join("App.java"), "class App {}\n").expect("fixture should be written");
    let base_url = spawn_model(r#"{"score": 10, "reason": "poor"}"#);

    code_guard(dir)
        .env("OPENAI_API_KEY", "sk-test")
        .env("OPENAI_BASE_URL", base_url)
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .args(["-m", mode, "-o", "out", "App.java"])
        .assert()
}

#[test]
fn help_lists_options() {
    let dir = TempDir::new().expect("temp dir should be created");
    code_guard(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--scan"))
        .stdout(predicate::str::contains("--threshold"))
        .stdout(predicate::str::contains("--report-type"))
        .stdout(predicate::str::contains("--kt"));
}

#[test]
fn missing_credential_fails_before_analysis() {
    let dir = TempDir::new().expect("temp dir should be created");
    fs::write(dir.path().join("App.java"), "class App {}\n").expect("fixture should be written");

    code_guard(&dir)
        .env_remove("OPENAI_API_KEY")
        .arg("App.java")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));

    assert!(!dir.path().join("reports").exists());
}

#[test]
fn no_analyzable_files_exits_with_failure() {
    let dir = TempDir::new().expect("temp dir should be created");
    fs::write(dir.path().join("README.md"), "# nothing here\n").expect("fixture should be written");

    code_guard(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .arg("--scan")
        .arg(".")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No analyzable files"));
}

#[test]
fn no_input_is_rejected() {
    let dir = TempDir::new().expect("temp dir should be created");
    code_guard(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No input given"));
}

#[test]
fn missing_path_is_reported() {
    let dir = TempDir::new().expect("temp dir should be created");
    code_guard(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .arg("does-not-exist")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn invalid_mode_is_rejected() {
    let dir = TempDir::new().expect("temp dir should be created");
    code_guard(&dir)
        .args(["--mode", "chaos", "App.java"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn broken_config_file_is_reported() {
    let dir = TempDir::new().expect("temp dir should be created");
    fs::write(dir.path().join("codeguard.toml"), "[retry\nmax_attempts = ")
        .expect("fixture should be written");
    fs::write(dir.path().join("App.java"), "class App {}\n").expect("fixture should be written");

    code_guard(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .arg("App.java")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("codeguard.toml"));
}

#[test]
fn documented_mode_names_are_accepted() {
    let dir = TempDir::new().expect("temp dir should be created");
    fs::write(dir.path().join("App.java"), "class App {}\n").expect("fixture should be written");

    for mode in ["STANDARD", "QA_AUTOMATION", "DEVOPS_TESTING", "DEVELOPER_REVIEW"] {
        code_guard(&dir)
            .env_remove("OPENAI_API_KEY")
            .args(["-m", mode, "-r", "NON_TECHNICAL", "App.java"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("OPENAI_API_KEY"));
    }
}

#[test]
fn failed_gate_exits_nonzero_in_automation_mode() {
    let dir = TempDir::new().expect("temp dir should be created");
    gated_run(&dir, "QA_AUTOMATION")
        .code(1)
        .stdout(predicate::str::contains("Quality gate failed"));

    assert!(dir.path().join("out/technical-report.html").is_file());
}

#[test]
fn failed_gate_only_warns_in_standard_mode() {
    let dir = TempDir::new().expect("temp dir should be created");
    gated_run(&dir, "standard")
        .success()
        .stdout(predicate::str::contains("below the threshold"));

    assert!(dir.path().join("out/executive-report.html").is_file());
}
