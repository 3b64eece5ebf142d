use bytes::BytesMut;
use std::collections::VecDeque;
use std::io::Read;
use tracing::{debug, trace};

const HEADER_END: &[u8] = b"\r\n\r\n";
const READ_CHUNK: usize = 32 * 1024;

/// Parse state for a multipart JPEG stream.
enum ParseState {
    /// Looking for the boundary marker `--<tag>\r\n`.
    SeekingBoundary,
    /// Found boundary, now looking for end of headers `\r\n\r\n`.
    SeekingHeaderEnd,
    /// Collecting JPEG bytes. With a known `Content-Length` the part ends
    /// after that many bytes, otherwise at the next boundary.
    CollectingJpeg { content_length: Option<usize> },
}

/// Incremental splitter for `multipart/x-mixed-replace` JPEG streams, as
/// served by MJPEG cameras and written by ffmpeg's `mpjpeg` muxer.
pub struct MultipartParser {
    boundary: Vec<u8>,
    buffer: BytesMut,
    state: ParseState,
    jpeg_start: usize,
    ready: VecDeque<Vec<u8>>,
}

impl MultipartParser {
    pub fn new(boundary_tag: &str) -> Self {
        Self {
            boundary: format!("--{boundary_tag}\r\n").into_bytes(),
            buffer: BytesMut::with_capacity(256 * 1024),
            state: ParseState::SeekingBoundary,
            jpeg_start: 0,
            ready: VecDeque::new(),
        }
    }

    /// Feed raw bytes; completed parts become available from [`Self::pop`].
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);

        loop {
            match self.state {
                ParseState::SeekingBoundary => {
                    if let Some(pos) = find_subsequence(&self.buffer, &self.boundary) {
                        // Discard everything up to and including the boundary
                        let _ = self.buffer.split_to(pos + self.boundary.len());
                        self.state = ParseState::SeekingHeaderEnd;
                    } else {
                        // Keep last few bytes in case boundary spans chunks
                        if self.buffer.len() > self.boundary.len() {
                            let _ = self.buffer.split_to(self.buffer.len() - self.boundary.len());
                        }
                        break;
                    }
                }
                ParseState::SeekingHeaderEnd => {
                    if let Some(pos) = find_subsequence(&self.buffer, HEADER_END) {
                        let content_length = parse_content_length(&self.buffer[..pos]);
                        let _ = self.buffer.split_to(pos + HEADER_END.len());
                        self.jpeg_start = 0;
                        self.state = ParseState::CollectingJpeg { content_length };
                    } else {
                        break;
                    }
                }
                ParseState::CollectingJpeg {
                    content_length: Some(len),
                } => {
                    if self.buffer.len() < len {
                        break;
                    }
                    let part = self.buffer.split_to(len).to_vec();
                    self.emit(part);
                    // Trailing \r\n is skipped while seeking the next boundary.
                    self.state = ParseState::SeekingBoundary;
                }
                ParseState::CollectingJpeg {
                    content_length: None,
                } => {
                    let search_from = self.jpeg_start;
                    if let Some(pos) =
                        find_subsequence(&self.buffer[search_from..], &self.boundary)
                    {
                        let jpeg_end = search_from + pos;
                        // Strip trailing \r\n before boundary
                        let end = if jpeg_end >= 2
                            && self.buffer[jpeg_end - 2] == b'\r'
                            && self.buffer[jpeg_end - 1] == b'\n'
                        {
                            jpeg_end - 2
                        } else {
                            jpeg_end
                        };

                        let part = self.buffer[..end].to_vec();
                        // Advance past the boundary
                        let _ = self.buffer.split_to(jpeg_end + self.boundary.len());
                        self.emit(part);
                        // Already past boundary, go to header parsing
                        self.state = ParseState::SeekingHeaderEnd;
                    } else {
                        // Avoid re-scanning old data on the next push
                        self.jpeg_start = self.buffer.len().saturating_sub(self.boundary.len());
                        break;
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn pop(&mut self) -> Option<Vec<u8>> {
        self.ready.pop_front()
    }

    /// Read from `reader` until at least one part is complete and return the
    /// newest one, dropping any older parts that queued up meanwhile.
    /// Returns `Ok(None)` when the reader hits end of stream first.
    pub fn next_latest<R: Read>(&mut self, reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
        let mut chunk = vec![0u8; READ_CHUNK];
        while self.ready.is_empty() {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                debug!("multipart stream reached end of input");
                return Ok(None);
            }
            self.push(&chunk[..n]);
        }
        let dropped = self.ready.len() - 1;
        if dropped > 0 {
            trace!(dropped, "skipping stale frames");
        }
        Ok(self.ready.drain(..).last())
    }

    fn emit(&mut self, part: Vec<u8>) {
        if !part.is_empty() {
            self.ready.push_back(part);
        }
    }
}

fn parse_content_length(headers: &[u8]) -> Option<usize> {
    let text = std::str::from_utf8(headers).ok()?;
    text.split("\r\n").find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Find the position of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
