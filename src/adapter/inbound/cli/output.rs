//! Terminal output for rigger commands.
//!
//! Text mode prints indented, colored lines to stdout. `--json` turns rollout
//! progress into one JSON object per line and leaves each command to print
//! its final document with [`emit_json`]. `--quiet` keeps warnings and final
//! results only.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use serde_json::{json, Value};

use crate::domain::DeployStep;

/// Settings taken from the global CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    /// Number of `-v` flags.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }

    fn prints_text(self) -> bool {
        !self.json && !self.quiet
    }
}

static SETTINGS: OnceLock<OutputConfig> = OnceLock::new();

/// Install the flag settings. Only the first call takes effect.
pub fn configure(config: OutputConfig) {
    let _ = SETTINGS.set(config);
}

fn settings() -> OutputConfig {
    SETTINGS.get().copied().unwrap_or_default()
}

#[must_use]
pub fn is_json() -> bool {
    settings().json
}

#[must_use]
pub fn is_quiet() -> bool {
    settings().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    settings().verbose
}

fn text(line: impl Display) {
    if settings().prints_text() {
        println!("{line}");
    }
}

fn progress(kind: &str, mut payload: Value) {
    if let Value::Object(map) = &mut payload {
        map.insert("event".to_string(), Value::String(kind.to_string()));
    }
    println!("{payload}");
}

/// Print a command's final JSON document.
pub fn emit_json(value: Value) {
    println!("{value}");
}

pub fn banner(version: &str) {
    text(format!("{} {}\n", "rigger".bold(), version.dimmed()));
}

pub fn field(label: &str, value: impl Display) {
    text(format!("  {:<14} {value}", label.dimmed()));
}

pub fn section(title: &str) {
    text(format!("\n{}", title.bold()));
}

/// Print a block of text indented under the current section.
pub fn lines(content: &str) {
    for line in content.lines() {
        text(format!("  {line}"));
    }
}

pub fn note(message: &str) {
    text(format!("  {}", message.dimmed()));
}

pub fn hint(message: &str) {
    text(format!("  {}: {}", "hint".cyan(), message.dimmed()));
}

pub fn success(message: &str) {
    text(format!("  {} {message}", "✓".green()));
}

/// Warnings survive `--quiet`.
pub fn warning(message: &str) {
    if is_json() {
        progress("warning", json!({ "message": message }));
    } else {
        println!("  {} {message}", "!".yellow().bold());
    }
}

/// A finished single-app operation such as "Created blog".
pub fn app_changed(verb: &str, app: &str) {
    text(format!("  {} {} {}", "✓".green(), verb.green(), app.bold()));
}

fn service_started_line(service: &str, pass: usize) -> String {
    format!("  {} {} {}", "→".cyan(), service.bold(), muted(format!("pass {pass}")))
}

fn step_line(service: &str, step: DeployStep) -> String {
    format!("    {} {step}", format!("{service}:").dimmed())
}

fn building_line(service: &str, poll: u32) -> String {
    format!("    {} still building after {poll} polls", format!("{service}:").dimmed())
}

fn retry_line(operation: &str, attempt: u32, max_attempts: u32, reason: &str) -> String {
    format!("{operation} failed ({attempt}/{max_attempts}): {reason}, retrying")
}

fn service_deployed_line(service: &str) -> String {
    format!("  {} {} deployed", "✓".green(), service.bold())
}

pub fn service_started(service: &str, pass: usize) {
    if is_json() {
        progress("service_started", json!({ "service": service, "pass": pass }));
    } else {
        text(service_started_line(service, pass));
    }
}

/// Individual steps are only shown with `-v`.
pub fn step_completed(service: &str, step: DeployStep) {
    if is_json() {
        progress(
            "step_completed",
            json!({ "service": service, "step": step.to_string() }),
        );
    } else if verbosity() > 0 {
        text(step_line(service, step));
    }
}

pub fn still_building(service: &str, poll: u32) {
    if is_json() {
        progress("building", json!({ "service": service, "poll": poll }));
    } else {
        text(building_line(service, poll));
    }
}

pub fn retry_scheduled(operation: &str, attempt: u32, max_attempts: u32, reason: &str) {
    if is_json() {
        progress(
            "retry",
            json!({
                "operation": operation,
                "attempt": attempt,
                "max_attempts": max_attempts,
                "reason": reason,
            }),
        );
    } else {
        warning(&retry_line(operation, attempt, max_attempts, reason));
    }
}

pub fn service_deployed(service: &str) {
    if is_json() {
        progress("service_deployed", json!({ "service": service }));
    } else {
        text(service_deployed_line(service));
    }
}

/// Cyan text, plain in JSON mode.
pub fn highlight(value: impl Display) -> String {
    if is_json() {
        value.to_string()
    } else {
        value.cyan().to_string()
    }
}

/// Dimmed text, plain in JSON mode.
pub fn muted(value: impl Display) -> String {
    if is_json() {
        value.to_string()
    } else {
        value.dimmed().to_string()
    }
}
