// Copyright (c) 2026 rezky_nightky

use std::env;
use std::process::Command;

fn main() {
    for var in ["HEARTFALL_BUILD", "GITHUB_SHA", "PROFILE"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    let build = env::var("HEARTFALL_BUILD")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(build_label);
    println!("cargo:rustc-env=HEARTFALL_BUILD={}", build);

    let sha = git_head()
        .or_else(|| env::var("GITHUB_SHA").ok().and_then(|v| short_hex(&v)))
        .unwrap_or_default();
    println!("cargo:rustc-env=HEARTFALL_GIT_SHA={}", sha);
}

/// `<os>-<arch> (<profile>)`, e.g. `linux-x86_64 (release)`.
fn build_label() -> String {
    let os = match env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("macos") => "darwin".to_string(),
        Ok(os) => os.to_string(),
        Err(_) => "unknown".to_string(),
    };
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".into());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".into());
    format!("{os}-{arch} ({profile})")
}

fn git_head() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    short_hex(std::str::from_utf8(&out.stdout).ok()?)
}

fn short_hex(raw: &str) -> Option<String> {
    let short: String = raw.trim().chars().take(7).collect();
    (short.len() == 7 && short.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| short.to_ascii_lowercase())
}
