//! Azure CLI command execution.
//!
//! Provides utilities for running Azure CLI commands and classifying their failures.

use crate::error::SourceError;
use colored::Colorize;
use regex::Regex;
use std::sync::OnceLock;
use tokio::process::Command;

/// Largest stdout accepted from a single command.
const MAX_OUTPUT_BYTES: usize = 5_000_000;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Error codes `az` prints for resources that do not exist.
static NOT_FOUND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_not_found_regex() -> &'static Regex {
    NOT_FOUND_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\((ResourceNotFound|ResourceGroupNotFound|NotFound)\)|Code: (ResourceNotFound|ResourceGroupNotFound|NotFound)\b|was not found|could not be found")
            .expect("Invalid Regex")
    })
}

/// Run a command and return its stdout.
///
/// The command string is split on spaces, with quoted substrings preserved.
///
/// # Arguments
/// * `cmd` - The command string to execute
///
/// # Returns
/// * `Ok(String)` - The stdout output on success
/// * `Err` - [`SourceError::Http`] 404 when stderr reports a missing resource,
///   otherwise [`SourceError::Command`]
///
/// The child is killed if the returned future is dropped before it exits.
pub async fn run(cmd: &str) -> Result<String, SourceError> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let cmds: Vec<&str> = split_and_strip(cmd);
    log::trace!("split cmds={:?}", cmds);
    let (program, args) = cmds
        .split_first()
        .ok_or_else(|| SourceError::Command("empty command".to_string()))?;

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            log::error!("Command execution failed: {}", e);
            SourceError::Command(format!("Failed to execute {program}: {e}"))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(classify_failure(&stderr));
    }

    log::debug!("Success output.stdout.len(): {}", output.stdout.len());
    if output.stdout.len() > MAX_OUTPUT_BYTES {
        return Err(SourceError::Command(format!(
            "Response too large: {} bytes for command: {:?}",
            output.stdout.len(),
            cmds
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| SourceError::Parse(format!("Invalid UTF-8: {e}")))
}

/// Map `az` stderr to a collaborator error.
pub fn classify_failure(stderr: &str) -> SourceError {
    let message = stderr.trim().to_string();
    if get_not_found_regex().is_match(stderr) {
        SourceError::Http {
            status: 404,
            message,
        }
    } else {
        SourceError::Command(message)
    }
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .filter(|s| !s.is_empty())
        .collect()
}
