use std::process::Command;

/// Runs `cmd args` and forwards its trimmed stdout as a compile-time env var.
fn emit(var: &str, cmd: &str, args: &[&str]) {
    let Ok(output) = Command::new(cmd).args(args).output() else {
        return;
    };
    if !output.status.success() {
        return;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !value.is_empty() {
        println!("cargo:rustc-env={var}={value}");
    }
}

fn main() {
    emit("FOLIO_GIT_COMMIT", "git", &["rev-parse", "--short", "HEAD"]);
    emit("FOLIO_GIT_BRANCH", "git", &["rev-parse", "--abbrev-ref", "HEAD"]);
    emit("FOLIO_BUILD_TIMESTAMP", "date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]);
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
