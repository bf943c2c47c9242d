//! 命令行入口测试

use assert_cmd::Command;

#[test]
fn test_help_lists_core_options() {
    let output = Command::cargo_bin("commentguard")
        .unwrap()
        .arg("--help")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
    assert!(stdout.contains("--api-url"));
    assert!(stdout.contains("--no-highlight"));
    assert!(stdout.contains("--filter"));
    assert!(stdout.contains("--output"));
}

#[test]
fn test_missing_target_is_a_usage_error() {
    Command::cargo_bin("commentguard")
        .unwrap()
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_unreadable_file_fails_with_message() {
    Command::cargo_bin("commentguard")
        .unwrap()
        .args(["--silent", "/nonexistent/watch-page.html"])
        .assert()
        .failure()
        .code(1);
}
