//! End-to-end tests for the `ociguard` binary.
//!
//! A small shell script named `oci` stands in for the real OCI CLI. It is put
//! first on `PATH`, so commands and template signatures look exactly like
//! real ones.
#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let sandbox = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fs::create_dir_all(sandbox.config_dir().join("templates")).unwrap();
        fs::create_dir_all(sandbox.bin_dir()).unwrap();
        sandbox
    }

    fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    fn bin_dir(&self) -> PathBuf {
        self.dir.path().join("bin")
    }

    fn templates_dir(&self) -> PathBuf {
        self.config_dir().join("templates")
    }

    /// Installs the fake `oci`. It leaves a marker file behind when it runs.
    fn fake_oci(&self, body: &str) {
        let script = self.bin_dir().join("oci");
        fs::write(&script, format!("#!/bin/sh\ntouch \"$0.ran\"\n{}\n", body)).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn oci_ran(&self) -> bool {
        self.bin_dir().join("oci.ran").exists()
    }

    fn template(&self, name: &str, body: &str) -> PathBuf {
        let path = self.templates_dir().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn env_file(&self, body: &str) {
        fs::write(self.config_dir().join(".env"), body).unwrap();
    }

    fn ociguard(&self) -> Command {
        let mut cmd = Command::cargo_bin("ociguard").unwrap();
        let path = std::env::var("PATH").unwrap_or_default();
        cmd.env("OCIGUARD_CONFIG_DIR", self.config_dir())
            .env("PATH", format!("{}:{}", self.bin_dir().display(), path))
            .env_remove("RUST_LOG");
        cmd
    }
}

fn contains(text: &str) -> predicates::str::ContainsPredicate {
    predicate::str::contains(text)
}

#[test]
fn help_lists_the_actions() {
    Sandbox::new()
        .ociguard()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("learn").and(contains("delete")));
}

#[test]
fn unknown_action_fails() {
    Sandbox::new()
        .ociguard()
        .arg("frobnicate")
        .assert()
        .code(1)
        .stderr(contains("frobnicate"));
}

#[test]
fn unresolved_variable_exits_without_running() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("echo should-not-run");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "compute", "instance", "list"])
        .args(["--compartment-id", "$OCIGUARD_TEST_SURELY_UNDEFINED"])
        .assert()
        .code(64)
        .stderr(contains("resolve").and(contains("OCIGUARD_TEST_SURELY_UNDEFINED")));

    assert!(!sandbox.oci_ran());
}

#[test]
fn env_file_values_are_substituted() {
    let sandbox = Sandbox::new();
    sandbox.env_file("OCIGUARD_TEST_COMPARTMENT=ocid1.compartment.oc1..fromfile\n");
    sandbox.fake_oci("echo \"args: $*\"");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--no-redact", "--", "oci", "iam", "user", "list"])
        .args(["--compartment-id", "$OCIGUARD_TEST_COMPARTMENT"])
        .assert()
        .success()
        .stdout(contains("args: iam user list --compartment-id ocid1.compartment.oc1..fromfile"));
}

#[test]
fn missing_required_argument_blocks_execution() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("echo ran");
    sandbox.template(
        "oci_os_bucket_create.yaml",
        "command: oci os bucket create\nrequired_args:\n- --name\n",
    );

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "os", "bucket", "create", "--compartment-id", "c"])
        .assert()
        .code(64)
        .stderr(contains("missing required argument --name"));

    assert!(!sandbox.oci_ran());
}

#[test]
fn missing_file_is_caught_before_execution() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("echo ran");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "os", "object", "put"])
        .args(["--file", "/definitely/not/here.bin"])
        .assert()
        .code(64)
        .stderr(contains("pre-flight"));

    assert!(!sandbox.oci_ran());
}

#[test]
fn target_failure_propagates_its_exit_code() {
    let sandbox = Sandbox::new();
    sandbox.env_file("OCIGUARD_TEST_COMPARTMENT_ID=x\n");
    sandbox.fake_oci("echo 'Error: Missing option(s) --compartment-id.' >&2\nexit 3");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "iam", "user", "list"])
        .assert()
        .code(3)
        .stdout(contains("$OCIGUARD_TEST_COMPARTMENT_ID"))
        .stderr(contains("Missing option(s) --compartment-id"));
}

#[test]
fn blocked_command_and_target_usage_error_have_different_codes() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("echo 'Error: Missing option(s) --compartment-id.' >&2\nexit 2");
    sandbox.template(
        "oci_os_bucket_create.yaml",
        "command: oci os bucket create\nrequired_args:\n- --name\n",
    );

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "iam", "user", "list"])
        .assert()
        .code(2);

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "os", "bucket", "create", "--compartment-id", "c"])
        .assert()
        .code(64);
}

#[test]
fn output_is_redacted_by_default() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("echo 'id ocid1.instance.oc1.iad.abcdef123 ip 10.0.0.12'");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "compute", "instance", "get"])
        .assert()
        .success()
        .stdout(
            contains("[REDACTED_OCID]")
                .and(contains("[REDACTED_IP]"))
                .and(contains("ocid1.instance").not())
                .and(contains("10.0.0.12").not()),
        );
}

#[test]
fn no_redact_shows_raw_output() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("echo 'ip 10.0.0.12'");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--no-redact", "--", "oci", "network", "vnic", "get"])
        .assert()
        .success()
        .stdout(contains("10.0.0.12"));
}

#[test]
fn no_redact_still_redacts_the_final_command_echo() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("echo '{}'");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--no-redact", "--", "oci", "iam", "user", "get"])
        .args(["--user-id", "ocid1.user.oc1..secret"])
        .assert()
        .success()
        .stdout(
            contains("Final command executed: oci iam user get --user-id [REDACTED_OCID]")
                .and(contains("ocid1.user").not()),
        );
}

#[test]
fn empty_output_is_reported_as_no_results() {
    let sandbox = Sandbox::new();
    sandbox.fake_oci("exit 0");

    sandbox
        .ociguard()
        .args(["run", "--ci", "--", "oci", "compute", "instance", "list"])
        .assert()
        .success()
        .stdout(contains("no results").and(contains("--all")));
}

#[test]
fn list_and_show_templates() {
    let sandbox = Sandbox::new();
    sandbox.template(
        "oci_compute_instance_list.yaml",
        "command: oci compute instance list\nrequired_args:\n- --compartment-id\n",
    );
    sandbox.template("common_schemas.yaml", "common_oci_args: {}\n");

    sandbox
        .ociguard()
        .arg("ls")
        .assert()
        .success()
        .stdout(
            contains("oci_compute_instance_list")
                .and(contains("(1 rules)"))
                .and(contains("common_schemas").not()),
        );

    sandbox
        .ociguard()
        .args(["show", "oci", "compute", "instance", "list"])
        .assert()
        .success()
        .stdout(contains("required_args"));
}

#[test]
fn delete_declines_without_a_terminal() {
    let sandbox = Sandbox::new();
    let path = sandbox.template("oci_iam_user_list.yaml", "command: oci iam user list\nrequired_args: [--all]\n");

    sandbox
        .ociguard()
        .args(["rm", "oci_iam_user_list"])
        .assert()
        .success()
        .stdout(contains("cancelled"));

    assert!(Path::new(&path).exists());
}

#[test]
fn show_unknown_template_fails() {
    Sandbox::new()
        .ociguard()
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(contains("nope"));
}
