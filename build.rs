//! Build script for persona-interact
//!
//! Embeds the git hash, build timestamp, target and rustc version.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = run_git(&["rev-parse", "--short=8", "HEAD"]);
    let git_dirty = match Command::new("git").args(["status", "--porcelain"]).output() {
        Ok(output) if output.status.success() && !output.stdout.is_empty() => "true",
        Ok(_) => "false",
        Err(_) => "unknown",
    };

    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let rustc_version = command_output("rustc", &["--version"]);

    println!("cargo:rustc-env=PERSONA_INTERACT_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=PERSONA_INTERACT_GIT_DIRTY={}", git_dirty);
    println!("cargo:rustc-env=PERSONA_INTERACT_BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=PERSONA_INTERACT_TARGET={}", target);
    println!("cargo:rustc-env=PERSONA_INTERACT_PROFILE={}", profile);
    println!("cargo:rustc-env=PERSONA_INTERACT_RUSTC_VERSION={}", rustc_version);
}

fn run_git(args: &[&str]) -> String {
    command_output("git", args)
}

/// Trimmed stdout of a command, or "unknown" if it could not run
fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
