//! TTS subprocess bridge
//!
//! Invokes the external text-to-speech script with positional arguments
//! `(text, voice_path?)`. The script logs freely on stdout/stderr and emits
//! one JSON object as its last meaningful stdout line; that trailing object
//! is the result contract. Non-zero exit or a missing JSON line is failure.

use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;

use crate::error::{EngineError, EngineResult};

/// Synthesized audio as returned by the script.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsAudio {
    /// Base64-encoded audio payload.
    pub audio: String,
    pub sample_rate: u32,
    pub format: String,
}

#[derive(Clone)]
pub struct TtsBridge {
    python_path: String,
    script_path: String,
    timeout: Duration,
}

impl TtsBridge {
    pub fn new(
        python_path: impl Into<String>,
        script_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            python_path: python_path.into(),
            script_path: script_path.into(),
            timeout,
        }
    }

    /// Run the script to completion under the hard deadline. The child is
    /// killed if the deadline passes.
    #[tracing::instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn synthesize(&self, text: &str, voice_path: Option<&str>) -> EngineResult<TtsAudio> {
        let mut command = Command::new(&self.python_path);
        command
            .arg(&self.script_path)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(voice) = voice_path {
            command.arg(voice);
        }

        let child = command
            .spawn()
            .map_err(|e| EngineError::Subprocess(format!("Failed to start TTS process: {}", e)))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|e| EngineError::Subprocess(format!("TTS process failed: {}", e)))?,
            Err(_) => {
                return Err(EngineError::Timeout("TTS request timed out".to_string()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            tracing::warn!(
                code = output.status.code(),
                stderr = %stderr.trim(),
                "TTS process exited non-zero"
            );
            return Err(EngineError::Subprocess(format!(
                "TTS process exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let Some(result) = parse_trailing_json(&stdout) else {
            return Err(EngineError::InvalidResponse(
                "No JSON result in TTS output".to_string(),
            ));
        };

        if result
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            Ok(TtsAudio {
                audio: result
                    .get("audio")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                sample_rate: result
                    .get("sample_rate")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                format: result
                    .get("format")
                    .and_then(|v| v.as_str())
                    .unwrap_or("wav")
                    .to_string(),
            })
        } else {
            let message = result
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("TTS generation failed");
            Err(EngineError::Subprocess(message.to_string()))
        }
    }
}

/// Find the last stdout line that parses as a JSON object. The script logs
/// progress lines before its result, so only the trailing object counts.
pub fn parse_trailing_json(stdout: &str) -> Option<serde_json::Value> {
    stdout.lines().rev().find_map(|line| {
        let line = line.trim();
        if line.starts_with('{') && line.ends_with('}') {
            serde_json::from_str(line).ok()
        } else {
            None
        }
    })
}
