use std::process::Command;

/// Short commit hash of the checkout, or "unknown" outside a git tree.
fn commit_hash() -> String {
    let output = match Command::new("git").args(["rev-parse", "--short=7", "HEAD"]).output() {
        Ok(output) if output.status.success() => output,
        _ => return "unknown".to_string(),
    };
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads");
    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit_hash());
}
