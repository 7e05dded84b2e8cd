use assert_cmd::Command;

/// Helper to get a Command for the netguard binary.
#[allow(deprecated)]
fn netguard_cmd() -> Command {
    Command::cargo_bin("netguard").unwrap()
}

#[test]
fn help_works() {
    netguard_cmd().arg("--help").assert().success();
}

#[test]
fn check_requires_rules() {
    netguard_cmd()
        .args(["check", "edge-1.cfg"])
        .assert()
        .failure();
}
