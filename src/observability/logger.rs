//! Markdown audit log for dispatched commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::dispatch::{DispatchEvent, DispatchPayload};

/// Audit logger fed by dispatch events.
///
/// Writes one markdown section per denied, succeeded, failed and finished
/// invocation. At `DEBUG` level unknown commands and accepted invocations
/// are recorded too.
#[derive(Debug)]
pub struct AuditLogger {
    log_file: PathBuf,
    log_level: String,
}

impl AuditLogger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO").
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => std::env::temp_dir().join("bck-logs").join(format!(
                "audit_{}_{}.md",
                Utc::now().timestamp_millis(),
                std::process::id()
            )),
        };

        let log_level = log_level.unwrap_or("INFO").to_uppercase();

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self { log_file, log_level };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    /// Initialize the log file with header.
    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Command Audit Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    /// Append content to log file.
    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    fn is_debug(&self) -> bool {
        matches!(self.log_level.as_str(), "DEBUG" | "TRACE")
    }

    /// Record one event. Returns whether anything was written.
    pub fn log_event(&self, event: &DispatchEvent) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let content = match event {
            DispatchEvent::CommandDenied { payload, error } => format!(
                "## Command Denied - {now}\n\n{}**Precondition:** {} (`{}`)\n**Reason:** {}\n\n",
                invocation_block(payload),
                error.precondition,
                error.identifier,
                error.message
            ),
            DispatchEvent::CommandSuccess { payload, result } => format!(
                "## Command Succeeded - {now}\n\n{}**Result:**\n```json\n{}\n```\n\n",
                invocation_block(payload),
                serde_json::to_string_pretty(result.as_ref()).unwrap_or_default()
            ),
            DispatchEvent::CommandError { payload, error } => format!(
                "## Command Failed - {now}\n\n{}**Kind:** {}\n**Error:** {}\n\n",
                invocation_block(payload),
                error.kind(),
                error
            ),
            DispatchEvent::CommandFinish {
                payload,
                duration,
                success,
            } => format!(
                "### Command Finished - {now}\n\n**Command:** {}\n**Invocation:** {}\n**Duration:** {} ms\n**Success:** {}\n\n---\n\n",
                payload.command.name(),
                payload.id,
                duration.as_millis(),
                success
            ),
            DispatchEvent::CommandAccepted { payload } if self.is_debug() => format!(
                "## Command Accepted - {now}\n\n{}\n",
                invocation_block(payload)
            ),
            DispatchEvent::UnknownCommand {
                message,
                prefix,
                name,
            } if self.is_debug() => format!(
                "## Unknown Command - {now}\n\n**Name:** {name}\n**Prefix:** `{prefix}`\n**Author:** {} ({})\n\n",
                message.author.name, message.author.id
            ),
            _ => return Ok(false),
        };

        self.append_to_log(&content)?;
        Ok(true)
    }

    /// Log a custom section.
    pub fn log_custom(&self, title: &str, content: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        self.append_to_log(&format!("## {} - {}\n\n{}\n\n", title, now.to_rfc3339(), content))
    }

    /// Record events from `events` until the bus is closed.
    ///
    /// Returns the number of sections written. Write failures and lagging
    /// are reported through `tracing` and do not stop the loop.
    pub async fn listen(&self, mut events: broadcast::Receiver<DispatchEvent>) -> usize {
        let mut written = 0;
        loop {
            match events.recv().await {
                Ok(event) => match self.log_event(&event) {
                    Ok(true) => written += 1,
                    Ok(false) => {}
                    Err(error) => warn!(event = event.name(), %error, "failed to write audit entry"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "audit log lagged behind dispatch events");
                }
                Err(RecvError::Closed) => {
                    debug!(written, "dispatch event bus closed");
                    return written;
                }
            }
        }
    }

    /// Get log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

fn invocation_block(payload: &DispatchPayload) -> String {
    let message = &payload.message;
    let mut block = format!(
        "**Command:** {}\n**Invocation:** {}\n**Author:** {} ({})\n**Channel:** {}\n",
        payload.command.name(),
        payload.id,
        message.author.name,
        message.author.id,
        message.channel.id
    );
    if let Some(guild) = message.guild_id() {
        block.push_str(&format!("**Guild:** {guild}\n"));
    }
    if !payload.parameters.is_empty() {
        block.push_str(&format!("**Parameters:** `{}`\n", payload.parameters));
    }
    block
}
