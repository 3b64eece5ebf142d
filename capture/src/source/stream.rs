use block_portrait_common::frame::RawFrame;
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::{debug, info};

use super::multipart::MultipartParser;
use super::traits::{FrameSource, GrabError, SourceError};

/// Network camera serving `multipart/x-mixed-replace` MJPEG over HTTP.
pub struct StreamSource {
    url: String,
    response: Option<Response>,
    parser: MultipartParser,
}

impl StreamSource {
    pub fn open(url: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(None::<Duration>)
            .build()
            .map_err(SourceError::HttpConnect)?;
        let response = client.get(url).send().map_err(SourceError::HttpConnect)?;

        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }

        let boundary = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(boundary_from_content_type)
            .unwrap_or_else(|| "frame".to_string());

        info!(url, status = %response.status(), boundary, "connected to MJPEG stream");

        Ok(Self {
            url: url.to_string(),
            response: Some(response),
            parser: MultipartParser::new(&boundary),
        })
    }
}

/// Extract the boundary tag from `multipart/x-mixed-replace; boundary=frame`.
fn boundary_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("boundary") {
            let tag = value.trim().trim_matches('"');
            Some(tag.trim_start_matches("--").to_string())
        } else {
            None
        }
    })
}

impl FrameSource for StreamSource {
    fn read(&mut self) -> Result<RawFrame, GrabError> {
        let response = self.response.as_mut().ok_or(GrabError::Released)?;
        match self.parser.next_latest(response)? {
            Some(jpeg) => {
                debug!(bytes = jpeg.len(), "received stream frame");
                Ok(RawFrame::jpeg(jpeg))
            }
            None => Err(GrabError::EndOfStream),
        }
    }

    fn release(&mut self) {
        if self.response.take().is_some() {
            info!(url = self.url, "stream closed");
        }
    }

    fn name(&self) -> &str {
        "stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_parsing() {
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace; boundary=frame").as_deref(),
            Some("frame")
        );
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace;boundary=\"--myboundary\"")
                .as_deref(),
            Some("myboundary")
        );
        assert_eq!(boundary_from_content_type("image/jpeg"), None);
    }
}
