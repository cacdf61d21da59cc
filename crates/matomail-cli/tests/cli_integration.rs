use std::io::Write;
use std::process::{Command, Output, Stdio};

fn matomail_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_matomail"));
    cmd.env_remove("MATOMAIL_LOG");
    cmd
}

/// Run matomail with `args`, feeding `input` on stdin.
fn run_with_input(mut cmd: Command, args: &[&str], input: &str) -> Output {
    let mut child = cmd
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn matomail");

    let mut stdin = child.stdin.take().expect("stdin is piped");
    // The process may exit without reading, e.g. on a bad pattern.
    let _ = stdin.write_all(input.as_bytes());
    drop(stdin);

    child.wait_with_output().expect("failed to wait for matomail")
}

fn run(args: &[&str], input: &str) -> Output {
    run_with_input(matomail_bin(), args, input)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn basic_run_is_collapsed() {
    let output = run(&["--no-config"], "line1\nline2\nline2\nline2\nline3\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "line1\n(1) line2\n...\n(3) line2\nline3\n");
}

#[test]
fn pattern_masks_timestamps() {
    let input = "2025-05-14 10:00:00 ERROR Connection failed\n\
                 2025-05-14 10:01:00 ERROR Connection failed\n\
                 2025-05-14 10:02:00 ERROR Connection failed\n\
                 2025-05-14 10:03:00 INFO Connection established\n";
    let output = run(
        &["--no-config", r"--pattern=\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}"],
        input,
    );
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "(1) 2025-05-14 10:00:00 ERROR Connection failed\n\
         ...\n\
         (3) 2025-05-14 10:02:00 ERROR Connection failed\n\
         2025-05-14 10:03:00 INFO Connection established\n"
    );
}

#[test]
fn empty_input_gives_empty_output() {
    let output = run(&["--no-config"], "");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn single_line_is_not_annotated() {
    let output = run(&["--no-config", "--pattern=x"], "just one line");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "just one line\n");
}

#[test]
fn special_characters_run_of_two() {
    let input = "line with !@#$%^&*()\nline with !@#$%^&*()\nline with different !@#$%^&*()\n";
    let output = run(&["--no-config"], input);
    assert_eq!(
        stdout(&output),
        "(1) line with !@#$%^&*()\n(2) line with !@#$%^&*()\nline with different !@#$%^&*()\n"
    );
}

#[test]
fn invalid_pattern_fails_before_output() {
    let output = run(&["--no-config", "--pattern=["], "line1\nline2\n");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid mask pattern `[`"),
        "Expected pattern diagnostic, got: {stderr}"
    );
}

#[test]
fn help_exits_zero_without_processing() {
    let output = run(&["--help"], "a\na\n");
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage:"), "Expected usage text, got: {text}");
    assert!(text.contains("--pattern"));
    assert!(!text.contains("(1) a"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = run(&["--frobnicate"], "");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn forced_ansi_rendering_emits_control_sequences() {
    let output = run(&["--no-config", "--render=ansi"], "a\na\na\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "(1) a\n(2) a\n\x1b[1A\r\x1b[2K...\n(3) a\n");
}

#[test]
fn replace_mask_distinguishes_missing_fields() {
    let input = "id=42;\nid=;\n";
    let removed = run(&["--no-config", r"-p", r"\d+"], input);
    assert_eq!(stdout(&removed), "(1) id=42;\n(2) id=;\n");

    let replaced = run(&["--no-config", "-p", r"\d+", "--mask=replace"], input);
    assert_eq!(stdout(&replaced), "id=42;\nid=;\n");
}

#[test]
fn reads_from_file_argument() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    std::fs::write(&path, "x\nx\ny\n").unwrap();

    let output = run(&["--no-config", path.to_str().unwrap()], "ignored\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "(1) x\n(2) x\ny\n");
}

#[test]
fn missing_input_file_fails() {
    let output = run(&["--no-config", "/definitely/not/here.log"], "");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("opening"), "got: {stderr}");
}

#[test]
fn explicit_config_file_supplies_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("matomail.toml");
    std::fs::write(&config, "pattern = '\\d+'\nrender = \"plain\"\n").unwrap();

    let output = run(
        &["--config", config.to_str().unwrap()],
        "retry 1\nretry 2\nretry 3\ndone\n",
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output), "(1) retry 1\n...\n(3) retry 3\ndone\n");
}

#[test]
fn discovered_local_config_is_used() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".matomail.toml"), "ignore_ansi = true\n").unwrap();

    let mut cmd = matomail_bin();
    cmd.current_dir(dir.path()).env("HOME", dir.path());
    let output = run_with_input(cmd, &[], "\x1b[31mfail\x1b[0m\nfail\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "(1) \x1b[31mfail\x1b[0m\n(2) fail\n");
}

#[test]
fn malformed_config_fails_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "render = \"sideways\"\n").unwrap();

    let output = run(&["--config", config.to_str().unwrap()], "a\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
