use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn runs_without_arguments() {
    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.assert().success();
}

#[test]
fn runs_fibonacci_to_halt() {
    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("run").arg("tests/files/fib.asm");

    cmd.assert()
        .success()
        .stdout(contains("Halted"))
        .stdout(contains("A  0D"));
}

#[test]
fn runs_bare_path_without_subcommand() {
    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("tests/files/fib.asm");

    cmd.assert()
        .success()
        .stdout(contains("Halted"))
        .stdout(contains("Completed"));
}

#[test]
fn check_reports_success_for_valid_source() {
    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("check").arg("tests/files/fib.asm");

    cmd.assert().success().stdout(contains("no errors found!"));
}

#[test]
fn check_rejects_memory_to_memory_move() {
    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("check").arg("tests/files/bad.asm");

    cmd.assert().failure().stderr(contains("both operands"));
}

#[test]
fn run_stops_at_the_instruction_limit() {
    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("run")
        .arg("tests/files/spin.asm")
        .arg("--limit")
        .arg("100");

    cmd.assert()
        .failure()
        .stderr(contains("100 instructions without halting"));
}

#[test]
fn assembled_binary_runs_identically() {
    let bin = std::env::temp_dir().join("otto_fib_image.bin");

    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("assemble")
        .arg("tests/files/fib.asm")
        .arg(&bin)
        .assert()
        .success()
        .stdout(contains("Saved"));

    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("run")
        .arg(&bin)
        .assert()
        .success()
        .stdout(contains("Halted"))
        .stdout(contains("A  0D"));

    let _ = std::fs::remove_file(&bin);
}

#[test]
fn rejects_unknown_extensions() {
    let mut cmd = Command::cargo_bin("otto").unwrap();
    cmd.arg("run").arg("tests/files/fib.obj");

    cmd.assert().failure().stderr(contains("unknown extension"));
}
