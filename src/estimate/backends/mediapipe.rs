//! MediaPipe hand landmark backend.
//!
//! Runs the MediaPipe hand landmarker in a helper process (typically a
//! small Python script) and speaks a line-oriented protocol over its
//! stdin/stdout:
//!
//! - request: three little-endian `u32` values (width, height,
//!   channels) followed by the raw RGB frame bytes
//! - response: one JSON line `{"hands":[{"score":..,"landmarks":[..]}]}`
//!
//! The helper prints `READY` once its model is loaded. The backend
//! keeps the process alive across frames; losing it is an estimator
//! error for the affected frames, not a server failure.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::estimate::backend::HandEstimator;
use crate::estimate::observation::{HandObservation, Landmark, LANDMARK_COUNT};

const FRAME_CHANNELS: u32 = 3;
const MIN_HAND_SCORE: f32 = 0.5;

#[derive(Debug, Deserialize)]
struct LandmarkLine {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Deserialize)]
struct HandLine {
    score: f32,
    landmarks: Vec<LandmarkLine>,
}

#[derive(Debug, Deserialize)]
struct ResponseLine {
    #[serde(default)]
    hands: Vec<HandLine>,
    #[serde(default)]
    error: Option<String>,
}

/// Hand landmark estimation via a MediaPipe helper process.
#[derive(Debug)]
pub struct MediapipeEstimator {
    process: Child,
    stdout: BufReader<ChildStdout>,
    script: PathBuf,
}

impl MediapipeEstimator {
    /// Spawn the helper process and wait for its ready signal.
    pub fn spawn(command: &str, script: &Path) -> Result<Self> {
        if !script.exists() {
            return Err(anyhow!(
                "estimator helper script not found: {}",
                script.display()
            ));
        }

        let mut process = Command::new(command)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("spawn estimator helper '{}'", command))?;

        let stdout = match await_ready(&mut process) {
            Ok(stdout) => stdout,
            Err(e) => {
                // The helper is already running; reap it before
                // reporting the failed handshake.
                let _ = process.kill();
                let _ = process.wait();
                return Err(e);
            }
        };

        log::info!("mediapipe estimator ready ({})", script.display());
        Ok(Self {
            process,
            stdout,
            script: script.to_path_buf(),
        })
    }

    fn best_hand(&self, response: ResponseLine) -> Result<Option<HandObservation>> {
        if let Some(error) = response.error {
            return Err(anyhow!("estimator helper error: {}", error));
        }
        for hand in response.hands {
            if hand.score < MIN_HAND_SCORE {
                continue;
            }
            if hand.landmarks.len() != LANDMARK_COUNT {
                log::warn!(
                    "estimator returned {} landmarks, expected {}",
                    hand.landmarks.len(),
                    LANDMARK_COUNT
                );
                continue;
            }
            let landmarks: Vec<Landmark> = hand
                .landmarks
                .iter()
                .map(|lm| Landmark::new(lm.x, lm.y, lm.z))
                .collect();
            return Ok(Some(HandObservation::from_slice(&landmarks)?));
        }
        Ok(None)
    }
}

impl HandEstimator for MediapipeEstimator {
    fn name(&self) -> &'static str {
        "mediapipe"
    }

    fn estimate(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<HandObservation>> {
        let expected = (width * height * FRAME_CHANNELS) as usize;
        if pixels.len() != expected {
            return Err(anyhow!(
                "frame byte count {} does not match {}x{} rgb",
                pixels.len(),
                width,
                height
            ));
        }

        let stdin = self
            .process
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("estimator helper has no stdin"))?;
        stdin.write_all(&width.to_le_bytes())?;
        stdin.write_all(&height.to_le_bytes())?;
        stdin.write_all(&FRAME_CHANNELS.to_le_bytes())?;
        stdin.write_all(pixels)?;
        stdin.flush()?;

        let mut line = String::new();
        self.stdout
            .read_line(&mut line)
            .context("read estimator response")?;
        let response: ResponseLine = serde_json::from_str(&line)
            .with_context(|| format!("parse estimator response: {}", line.trim()))?;
        self.best_hand(response)
    }

    fn warm_up(&mut self) -> Result<()> {
        log::debug!("mediapipe estimator warm ({})", self.script.display());
        Ok(())
    }
}

fn await_ready(process: &mut Child) -> Result<BufReader<ChildStdout>> {
    let stdout = process
        .stdout
        .take()
        .ok_or_else(|| anyhow!("estimator helper has no stdout"))?;
    let mut stdout = BufReader::new(stdout);

    let mut ready = String::new();
    stdout
        .read_line(&mut ready)
        .context("read estimator ready signal")?;
    if ready.trim() != "READY" {
        return Err(anyhow!(
            "estimator helper did not signal READY, got: {}",
            ready.trim()
        ));
    }
    Ok(stdout)
}

impl Drop for MediapipeEstimator {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_script_is_rejected() {
        let err = MediapipeEstimator::spawn("sh", Path::new("/nonexistent/helper.py"))
            .expect_err("missing script must fail");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn failed_ready_handshake_reaps_the_helper() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("helper.sh");
        let pid_file = dir.path().join("helper.pid");
        let body = format!(
            "echo $$ > {}\necho NOT_READY\nsleep 30\n",
            pid_file.display()
        );
        std::fs::write(&script, body).expect("write helper script");

        let err = MediapipeEstimator::spawn("sh", &script).expect_err("handshake must fail");
        assert!(err.to_string().contains("READY"));

        // The pid file is written before the helper's first output
        // line, so it exists by the time spawn returns.
        let pid = std::fs::read_to_string(&pid_file)
            .expect("helper pid file")
            .trim()
            .to_string();
        assert!(
            !Path::new(&format!("/proc/{}", pid)).exists(),
            "helper process should be reaped after a failed handshake"
        );
    }
}
