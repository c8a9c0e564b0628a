//! Incremental Server-Sent Events line decoder.
//!
//! Network reads do not respect line boundaries, so bytes are buffered until
//! a full line is available. Each `data:` line yields one [`SseFrame`];
//! blank lines, comments and other fields are skipped. A line longer than
//! the decoder's limit is dropped whole.
//!
//! ```text
//! data: {"content":"Hel"}\n\n   → Data("{\"content\":\"Hel\"}")
//! data: [DONE]\n\n              → Done
//! ```

use bytes::BytesMut;

/// Literal terminal sentinel carried in a data line.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Default limit on the length of one line, newline excluded.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// One decoded event-stream frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Payload of a `data:` line, untrimmed of inner whitespace.
    Data(String),
    /// The `[DONE]` sentinel.
    Done,
}

/// Buffers partial lines across chunk boundaries.
#[derive(Debug)]
pub struct SseDecoder {
    buf: BytesMut,
    /// Bytes of `buf` already known to contain no newline.
    scanned: usize,
    max_line: usize,
    /// Skipping the rest of an oversized line.
    discarding: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self {
            buf: BytesMut::new(),
            scanned: 0,
            max_line: MAX_LINE_BYTES,
            discarding: false,
        }
    }
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_line_len(mut self, max: usize) -> Self {
        self.max_line = max;
        self
    }

    /// Feed a chunk and return every frame completed by it, in order.
    pub fn push(&mut self, mut chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();

        if self.discarding {
            let Some(pos) = chunk.iter().position(|&b| b == b'\n') else {
                return frames;
            };
            chunk = &chunk[pos + 1..];
            self.discarding = false;
        }
        self.buf.extend_from_slice(chunk);

        while let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
            let pos = self.scanned + offset;
            let line = self.buf.split_to(pos + 1);
            self.scanned = 0;
            if pos > self.max_line {
                tracing::warn!(bytes = pos, "Dropping oversized event-stream line");
            } else if let Some(frame) = parse_line(&line[..pos]) {
                frames.push(frame);
            }
        }
        self.scanned = self.buf.len();

        if self.buf.len() > self.max_line {
            tracing::warn!(bytes = self.buf.len(), "Dropping oversized event-stream line");
            self.buf.clear();
            self.scanned = 0;
            self.discarding = true;
        }
        frames
    }

    /// Flush a trailing line that was never newline-terminated.
    pub fn finish(&mut self) -> Option<SseFrame> {
        self.scanned = 0;
        if std::mem::take(&mut self.discarding) || self.buf.is_empty() {
            return None;
        }
        let line = self.buf.split();
        parse_line(&line)
    }
}

fn parse_line(raw: &[u8]) -> Option<SseFrame> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);

    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim() == DONE_SENTINEL {
        Some(SseFrame::Done)
    } else {
        Some(SseFrame::Data(data.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_complete_frames() {
        let mut dec = SseDecoder::new();
        let frames = dec.push(b"data: {\"content\":\"Hel\"}\n\ndata: {\"content\":\"lo\"}\n\ndata: [DONE]\n\n");
        assert_eq!(
            frames,
            vec![
                SseFrame::Data("{\"content\":\"Hel\"}".into()),
                SseFrame::Data("{\"content\":\"lo\"}".into()),
                SseFrame::Done,
            ]
        );
    }

    #[test]
    fn test_frame_split_across_reads() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: {\"cont").is_empty());
        assert!(dec.push(b"ent\":\"Hi").is_empty());
        assert_eq!(
            dec.push(b"\"}\n\nda"),
            vec![SseFrame::Data("{\"content\":\"Hi\"}".into())]
        );
        assert_eq!(dec.push(b"ta: [DONE]\n"), vec![SseFrame::Done]);
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let text = "data: नमस्ते\n".as_bytes();
        let mut dec = SseDecoder::new();
        assert!(dec.push(&text[..9]).is_empty());
        assert_eq!(dec.push(&text[9..]), vec![SseFrame::Data("नमस्ते".into())]);
    }

    #[test]
    fn test_crlf_comments_and_other_fields() {
        let mut dec = SseDecoder::new();
        let frames = dec.push(b": keep-alive\r\nevent: message\r\nid: 7\r\ndata:{\"a\":1}\r\n\r\n");
        assert_eq!(frames, vec![SseFrame::Data("{\"a\":1}".into())]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut dec = SseDecoder::new();
        assert!(dec.push(b"data: [DONE]").is_empty());
        assert_eq!(dec.finish(), Some(SseFrame::Done));
        assert_eq!(dec.finish(), None);
    }

    #[test]
    fn test_oversized_line_is_dropped_and_decoding_resumes() {
        let mut dec = SseDecoder::new().with_max_line_len(16);
        assert!(dec.push(b"data: 0123456789").is_empty());
        assert!(dec.push(b"abcdefghij").is_empty());
        assert!(dec.push(b"still the same line").is_empty());
        assert_eq!(
            dec.push(b" end\ndata: ok\n"),
            vec![SseFrame::Data("ok".into())]
        );

        // A long line arriving in one chunk is dropped as well.
        assert_eq!(
            dec.push(b"data: this line is far too long\ndata: [DONE]\n"),
            vec![SseFrame::Done]
        );
        assert_eq!(dec.finish(), None);
    }

    #[test]
    fn test_many_small_reads() {
        let mut dec = SseDecoder::new();
        let mut frames = Vec::new();
        for byte in b"data: {\"content\":\"chai\"}\r\n\r\ndata: [DONE]\n" {
            frames.extend(dec.push(std::slice::from_ref(byte)));
        }
        assert_eq!(
            frames,
            vec![
                SseFrame::Data("{\"content\":\"chai\"}".into()),
                SseFrame::Done,
            ]
        );
    }
}
