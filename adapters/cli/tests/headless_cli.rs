use std::{fs, path::PathBuf, process::Command};

fn sprint_grove() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sprint-grove"));
    let _ = command.arg("--headless");
    command
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sprint-grove-{}-{name}", std::process::id()));
    fs::write(&path, contents).expect("temporary file is writable");
    path
}

#[test]
fn demo_sprints_rise_on_activation() {
    let output = sprint_grove()
        .args(["--frames", "200", "--script", "0:activate:S3"])
        .output()
        .expect("failed to run sprint-grove");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("focus: S3, popup visible"), "{stdout}");
    assert!(stdout.contains("node S3: stage 3, height 1.40, motion Idle, apex"));
}

#[test]
fn summaries_file_drives_the_island() {
    let summaries = temp_file(
        "summaries.json",
        r#"[
            { "id": "A", "name": "Alpha", "completionPercentage": 100.0 },
            { "id": "B", "name": "Beta", "completionPercentage": 30.0 }
        ]"#,
    );

    let output = sprint_grove()
        .arg("--summaries")
        .arg(&summaries)
        .args(["--frames", "1"])
        .output()
        .expect("failed to run sprint-grove");
    let _ = fs::remove_file(&summaries);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("node A: stage 4"), "{stdout}");
    assert!(stdout.contains("node B: stage 2"), "{stdout}");
    assert!(stdout.contains("focus: none"));
}

#[test]
fn records_file_is_aggregated() {
    let records = temp_file(
        "records.json",
        r#"{ "sprints": [{
            "id": "R1",
            "name": "Board",
            "columns": [
                { "title": "Open", "tickets": [{ "createdOn": "2024-03-01" }] },
                { "title": "Close", "tickets": [{ "createdOn": "2024-03-01", "closedOn": "2024-03-02" }] }
            ]
        }] }"#,
    );

    let output = sprint_grove()
        .arg("--records")
        .arg(&records)
        .args(["--frames", "2"])
        .output()
        .expect("failed to run sprint-grove");
    let _ = fs::remove_file(&records);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("node R1: stage 2"), "{stdout}");
}

#[test]
fn invalid_configuration_fails_before_running() {
    let config = temp_file("config.toml", "[motion]\nrise_speed = -1.0\n");

    let output = sprint_grove()
        .arg("--config")
        .arg(&config)
        .output()
        .expect("failed to run sprint-grove");
    let _ = fs::remove_file(&config);

    assert!(!output.status.success());
}

#[test]
fn malformed_script_is_reported() {
    let output = sprint_grove()
        .args(["--script", "soon:activate:S1"])
        .output()
        .expect("failed to run sprint-grove");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid --script value"), "{stderr}");
}
