//! Sink that runs numbered scripts and shows desktop notifications.
//!
//! `trigger(n)` starts `<script_dir>/<prefix><n>.<ext>` without waiting for
//! it to finish. On macOS scripts are AppleScript files run through
//! `osascript` and notifications use `display notification`; elsewhere
//! scripts are shell files run through `sh` and notifications go through
//! `notify-send`.

use super::{ActionSink, SinkError};
use crate::config::ActionConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

#[cfg(target_os = "macos")]
const SCRIPT_RUNNER: &str = "osascript";
#[cfg(target_os = "macos")]
const SCRIPT_EXTENSION: &str = "applescript";

#[cfg(not(target_os = "macos"))]
const SCRIPT_RUNNER: &str = "sh";
#[cfg(not(target_os = "macos"))]
const SCRIPT_EXTENSION: &str = "sh";

/// Runs external commands for each sink call.
#[derive(Debug, Clone)]
pub struct CommandSink {
    script_dir: PathBuf,
    script_prefix: String,
    notifications: bool,
}

impl CommandSink {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            script_dir: config.script_dir.clone(),
            script_prefix: config.script_prefix.clone(),
            notifications: config.notifications,
        }
    }

    /// Path of the script for a given action index.
    pub fn script_path(&self, index: u32) -> PathBuf {
        self.script_dir.join(format!(
            "{}{}.{}",
            self.script_prefix, index, SCRIPT_EXTENSION
        ))
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }
}

/// Start a command and reap it from a detached thread once it exits.
fn spawn(command: &mut Command) -> Result<(), SinkError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| SinkError::Spawn(e.to_string()))?;

    let reaper = thread::Builder::new()
        .name("action-reaper".to_string())
        .spawn(move || {
            if let Err(e) = child.wait() {
                tracing::warn!(error = %e, "failed to wait for action process");
            }
        });
    if let Err(e) = reaper {
        tracing::warn!(error = %e, "failed to start reaper thread");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn notification_command(title: &str, body: &str) -> Command {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        body.replace('"', "'"),
        title.replace('"', "'")
    );
    let mut command = Command::new("osascript");
    command.arg("-e").arg(script);
    command
}

#[cfg(not(target_os = "macos"))]
fn notification_command(title: &str, body: &str) -> Command {
    let mut command = Command::new("notify-send");
    command.arg(title).arg(body);
    command
}

impl ActionSink for CommandSink {
    fn notify(&self, title: &str, body: &str) -> Result<(), SinkError> {
        if !self.notifications {
            return Ok(());
        }
        spawn(&mut notification_command(title, body))
    }

    fn trigger(&self, index: u32) -> Result<(), SinkError> {
        let path = self.script_path(index);
        if !path.is_file() {
            return Err(SinkError::Unavailable(path.display().to_string()));
        }

        tracing::debug!(script = %path.display(), "running action script");
        spawn(Command::new(SCRIPT_RUNNER).arg(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(dir: PathBuf) -> CommandSink {
        CommandSink::new(&ActionConfig {
            script_dir: dir,
            script_prefix: "workspace_".to_string(),
            notifications: false,
        })
    }

    #[test]
    fn test_script_path_layout() {
        let sink = sink(PathBuf::from("/opt/scripts"));
        let path = sink.script_path(3);
        assert_eq!(path.parent(), Some(Path::new("/opt/scripts")));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(format!("workspace_3.{SCRIPT_EXTENSION}").as_str())
        );
    }

    #[test]
    fn test_missing_script_is_unavailable() {
        let dir = std::env::temp_dir().join("emg-gesture-agent-missing-scripts");
        let sink = sink(dir);
        assert!(matches!(sink.trigger(42), Err(SinkError::Unavailable(_))));
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_trigger_runs_script() {
        use std::time::{Duration, Instant};

        let dir = std::env::temp_dir().join(format!(
            "emg-gesture-agent-scripts-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let marker = dir.join("triggered");
        let _ = std::fs::remove_file(&marker);

        let sink = sink(dir.clone());
        std::fs::write(
            sink.script_path(1),
            format!("touch '{}'\n", marker.display()),
        )
        .unwrap();

        assert!(sink.trigger(1).is_ok());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !marker.exists() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(marker.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_disabled_notifications_are_noop() {
        let sink = sink(PathBuf::from("."));
        assert!(sink.notify("Double Clench", "Reset to workspace 1").is_ok());
    }
}
