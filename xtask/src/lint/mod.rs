use tokio::process::Command;

use crate::prelude::*;
use error::Result;

pub mod error;

/// Code quality checks
#[derive(Debug, clap::Parser)]
#[command(
    long_about = "Run code quality checks including formatting, compilation, linting, and dependency audits.

This command runs the following checks in order:

1. cargo fmt - Code formatting (auto-fix with --fix)
2. cargo check - Compilation check
3. cargo clippy - Linting with all warnings treated as errors
4. cargo test - Run all tests including doctests
5. cargo machete - Unused dependencies detection

With --staged-only, formatting fixes are re-staged so the command can run as a
git pre-commit hook."
)]
pub struct LintCommand {
    /// Auto-fix issues when possible (applies to fmt)
    #[arg(long)]
    pub fix: bool,

    /// Only check staged files (used by git hooks)
    #[arg(long, hide = true)]
    pub staged_only: bool,
}

/// A cargo subcommand whose exit status decides pass or fail.
struct CargoCheck {
    label: &'static str,
    args: &'static [&'static str],
    /// Arguments after `--`, passed to the underlying tool.
    tool_args: &'static [&'static str],
    passed: &'static str,
    failed: &'static str,
}

const CARGO_CHECKS: &[CargoCheck] = &[
    CargoCheck {
        label: "cargo check",
        args: &["check", "--workspace", "--all-targets"],
        tool_args: &[],
        passed: "Cargo check passed",
        failed: "Please fix compilation errors before proceeding",
    },
    CargoCheck {
        label: "cargo clippy",
        args: &["clippy", "--workspace", "--all-targets"],
        tool_args: &["-D", "warnings"],
        passed: "Clippy checks passed",
        failed: "Please fix clippy warnings before proceeding",
    },
    CargoCheck {
        label: "cargo test",
        args: &["test", "--workspace"],
        tool_args: &[],
        passed: "All tests passed",
        failed: "Please fix failing tests before proceeding",
    },
];

pub async fn run(command: LintCommand, global: crate::Global) -> Result<()> {
    use error::require_command;

    require_command("cargo", "Required for Rust development: https://rustup.rs/").await?;
    require_command(
        "cargo-machete",
        "Required for unused dependency checks: cargo install cargo-machete",
    )
    .await?;

    if !global.is_silent() {
        aprintln!("{}", p_b("Running code quality checks..."));
        aprintln!();
    }

    let mut failures = 0;
    if !run_cargo_fmt(&command, &global).await? {
        failures += 1;
    }
    for check in CARGO_CHECKS {
        if !run_cargo_check(check, &global).await? {
            failures += 1;
        }
    }
    if !run_cargo_machete(&global).await? {
        failures += 1;
    }

    aprintln!();
    if failures == 0 {
        aprintln!("{} {}", p_g("✅"), p_g("All checks passed!"));
        return Ok(());
    }

    aprintln!(
        "{} {}",
        p_r("❌"),
        p_r(&format!("{failures} check(s) failed"))
    );
    if !global.is_silent() {
        aprintln!();
        aprintln!("{}", p_b("Quick fixes:"));
        aprintln!("  • {} - Format code", p_c("cargo xtask lint --fix"));
        aprintln!("  • {} - Auto-fix clippy issues", p_c("cargo clippy --fix"));
    }
    Err(error::LintError::ChecksFailed)
}

fn announce(global: &crate::Global, label: &str) {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("🔧"), p_b(&format!("Running {label}...")));
    }
}

fn pass(global: &crate::Global, message: &str) -> bool {
    if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), message);
    }
    true
}

fn fail(message: &str) -> bool {
    aprintln!("{} {}", p_r("❌"), p_r(message));
    false
}

async fn run_cargo_check(check: &CargoCheck, global: &crate::Global) -> Result<bool> {
    announce(global, check.label);

    let mut cmd = Command::new("cargo");
    cmd.args(check.args);
    if !global.is_verbose() {
        cmd.arg("--quiet");
    }
    if !check.tool_args.is_empty() {
        cmd.arg("--").args(check.tool_args);
    }

    if cmd.status().await?.success() {
        Ok(pass(global, check.passed))
    } else {
        Ok(fail(check.failed))
    }
}

async fn run_cargo_fmt(command: &LintCommand, global: &crate::Global) -> Result<bool> {
    announce(global, "cargo fmt");

    let formatted = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .await?
        .status
        .success();
    if formatted {
        return Ok(pass(global, "Code formatting is correct"));
    }

    if !(command.fix || command.staged_only) {
        return Ok(fail(
            "Code formatting check failed. Run with --fix to auto-format",
        ));
    }

    if global.is_verbose() {
        aprintln!("{} Formatting issues found, fixing", p_y("⚠️"));
    }
    if !Command::new("cargo")
        .args(["fmt", "--all"])
        .status()
        .await?
        .success()
    {
        return Ok(fail("cargo fmt failed"));
    }

    if command.staged_only {
        restage_rust_files(global).await?;
        return Ok(pass(global, "Code formatted and re-staged"));
    }
    Ok(pass(global, "Code formatted"))
}

async fn run_cargo_machete(global: &crate::Global) -> Result<bool> {
    announce(global, "cargo machete");

    let output = Command::new("cargo").arg("machete").output().await?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() || stdout.contains("didn't find any unused") {
        return Ok(pass(global, "No unused dependencies found"));
    }

    if global.is_verbose() {
        aprintln!("{stdout}");
        aprintln!("{stderr}");
    }
    Ok(fail("Unused dependencies detected, remove them from Cargo.toml"))
}

async fn restage_rust_files(global: &crate::Global) -> Result<()> {
    let output = Command::new("git")
        .args(["diff", "--cached", "--name-only", "--diff-filter=ACM"])
        .output()
        .await?;
    if !output.status.success() {
        return Ok(());
    }

    let files = String::from_utf8_lossy(&output.stdout);
    let rust_files: Vec<&str> = files.lines().filter(|line| line.ends_with(".rs")).collect();
    if rust_files.is_empty() {
        return Ok(());
    }

    Command::new("git").arg("add").args(&rust_files).status().await?;
    if global.is_verbose() {
        aprintln!("{} Re-staged {} Rust files", p_b("Info:"), rust_files.len());
    }
    Ok(())
}
