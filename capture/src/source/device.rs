use block_portrait_common::config::CaptureConfig;
use block_portrait_common::frame::RawFrame;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};

use super::multipart::MultipartParser;
use super::traits::{FrameSource, GrabError, SourceError};

const BOUNDARY_TAG: &str = "frame";

/// Local camera read through an `ffmpeg` subprocess that re-muxes the device
/// into a multipart JPEG stream on its stdout.
pub struct DeviceSource {
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    parser: MultipartParser,
    input: String,
}

impl DeviceSource {
    pub fn open(config: &CaptureConfig) -> Result<Self, SourceError> {
        let input = config
            .device_input()
            .ok_or_else(|| SourceError::MissingDevice(config.input_format.clone()))?;

        let mut cmd = Command::new(&config.ffmpeg_bin);
        cmd.args([
            "-hide_banner",
            "-loglevel", "error",
            "-f", &config.input_format,
            "-i", &input,
            "-f", "mpjpeg",
            "-boundary_tag", BOUNDARY_TAG,
            "-q:v", "3",
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| SourceError::Spawn {
            bin: config.ffmpeg_bin.clone(),
            reason: e.to_string(),
        })?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SourceError::Spawn {
                    bin: config.ffmpeg_bin.clone(),
                    reason: "could not get stdout handle".into(),
                });
            }
        };

        info!(
            input,
            format = config.input_format,
            pid = child.id(),
            "camera opened"
        );

        Ok(Self {
            child: Some(child),
            stdout: Some(stdout),
            parser: MultipartParser::new(BOUNDARY_TAG),
            input,
        })
    }
}

impl FrameSource for DeviceSource {
    fn read(&mut self) -> Result<RawFrame, GrabError> {
        let stdout = self.stdout.as_mut().ok_or(GrabError::Released)?;
        match self.parser.next_latest(stdout)? {
            Some(jpeg) => {
                debug!(bytes = jpeg.len(), "grabbed frame");
                Ok(RawFrame::jpeg(jpeg))
            }
            None => Err(GrabError::EndOfStream),
        }
    }

    fn release(&mut self) {
        // Closing the pipe first lets ffmpeg exit on EPIPE if kill races.
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(e) = child.kill() {
            debug!(error = %e, "ffmpeg already exited");
        }
        match child.wait() {
            Ok(status) => info!(input = self.input, %status, "camera released"),
            Err(e) => warn!(error = %e, input = self.input, "failed to reap ffmpeg"),
        }
    }

    fn name(&self) -> &str {
        "device"
    }
}

impl Drop for DeviceSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Check whether ffmpeg is available on PATH. Logs a warning if not found.
pub fn check_ffmpeg_available(bin: &str) -> bool {
    match Command::new(bin).arg("-version").output() {
        Ok(out) if out.status.success() => {
            debug!("ffmpeg is available");
            true
        }
        Ok(_) => {
            warn!("ffmpeg returned non-zero for -version; camera capture may fail");
            false
        }
        Err(e) => {
            warn!(
                error = %e,
                "ffmpeg not found on PATH; the device camera source needs it. \
                 Install ffmpeg or use capture.source = \"stream\"."
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dshow_without_device_name_is_rejected() {
        let config = CaptureConfig {
            input_format: "dshow".into(),
            ffmpeg_bin: "ffmpeg-not-spawned".into(),
            ..CaptureConfig::default()
        };
        assert!(matches!(
            DeviceSource::open(&config),
            Err(SourceError::MissingDevice(format)) if format == "dshow"
        ));
    }
}
