//! Line accumulation for the serial command channel.
//!
//! Bytes arrive one at a time. A `\n` or `\r` flushes the buffered
//! text as one command; a line longer than [`MAX_LINE_LEN`] bytes is
//! dropped so a burst of garbage never wedges the parser. Text is only
//! decoded as UTF-8 once the line is complete.

use heapless::{String, Vec};

/// Maximum command line length in bytes
pub const MAX_LINE_LEN: usize = 64;

/// A complete, trimmed command line
pub type Line = String<MAX_LINE_LEN>;

/// Errors reported while accumulating a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Buffered input exceeded [`MAX_LINE_LEN`] and was discarded
    TooLong,
    /// Completed line was not valid UTF-8
    InvalidText,
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineError::TooLong => f.write_str("Line too long"),
            LineError::InvalidText => f.write_str("Invalid text"),
        }
    }
}

/// Accumulates bytes into command lines
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
}

impl LineBuffer {
    /// Create an empty line buffer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Drop partial input when the host side goes away
    ///
    /// Call this whenever the channel reports "not connected" so a half
    /// typed line never survives a reconnect.
    pub fn disconnect(&mut self) {
        self.reset();
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Feed one raw input byte
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-blank
    /// line, `Ok(None)` when more input is needed (or the line was blank),
    /// `Err(LineError::TooLong)` when the buffer overflowed and was reset,
    /// and `Err(LineError::InvalidText)` when the finished line is not
    /// UTF-8.
    pub fn feed_byte(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        if byte == b'\n' || byte == b'\r' {
            let line = take_trimmed(&self.buffer);
            self.buffer.clear();
            return line;
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            return Err(LineError::TooLong);
        }
        Ok(None)
    }

    /// Feed a character, counting its full UTF-8 length against the limit
    pub fn feed(&mut self, ch: char) -> Result<Option<Line>, LineError> {
        let mut encoded = [0u8; 4];
        let mut result = Ok(None);
        for &byte in ch.encode_utf8(&mut encoded).as_bytes() {
            result = self.feed_byte(byte);
            if result.is_err() {
                break;
            }
        }
        result
    }
}

fn take_trimmed(buffer: &[u8]) -> Result<Option<Line>, LineError> {
    let text = core::str::from_utf8(buffer).map_err(|_| LineError::InvalidText)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let mut line = Line::new();
    // Cannot overflow: the trimmed text is a slice of a buffer of the same capacity
    let _ = line.push_str(trimmed);
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(buffer: &mut LineBuffer, text: &str) -> Option<Result<Line, LineError>> {
        let mut last = None;
        for ch in text.chars() {
            match buffer.feed(ch) {
                Ok(Some(line)) => last = Some(Ok(line)),
                Ok(None) => {}
                Err(e) => last = Some(Err(e)),
            }
        }
        last
    }

    #[test]
    fn test_newline_flushes_line() {
        let mut buffer = LineBuffer::new();
        let result = feed_str(&mut buffer, "SAC 1 2 3 4\n");
        assert_eq!(result.unwrap().unwrap().as_str(), "SAC 1 2 3 4");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_carriage_return_flushes_line() {
        let mut buffer = LineBuffer::new();
        let result = feed_str(&mut buffer, "  ur  \r");
        assert_eq!(result.unwrap().unwrap().as_str(), "ur");
    }

    #[test]
    fn test_crlf_yields_single_line() {
        let mut buffer = LineBuffer::new();
        let mut lines = 0;
        for ch in "C\r\n".chars() {
            if let Ok(Some(_)) = buffer.feed(ch) {
                lines += 1;
            }
        }
        assert_eq!(lines, 1);
    }

    #[test]
    fn test_blank_line_ignored() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.feed('\n'), Ok(None));
        assert_eq!(buffer.feed(' '), Ok(None));
        assert_eq!(buffer.feed('\r'), Ok(None));
    }

    #[test]
    fn test_sixty_four_chars_accepted() {
        let mut buffer = LineBuffer::new();
        for _ in 0..MAX_LINE_LEN {
            assert_eq!(buffer.feed('a'), Ok(None));
        }
        assert_eq!(buffer.len(), MAX_LINE_LEN);
        let line = buffer.feed('\n').unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE_LEN);
    }

    #[test]
    fn test_sixty_fifth_char_resets() {
        let mut buffer = LineBuffer::new();
        for _ in 0..MAX_LINE_LEN {
            buffer.feed('x').unwrap();
        }
        assert_eq!(buffer.feed('x'), Err(LineError::TooLong));
        assert!(buffer.is_empty());

        // The overflowing burst never reaches the dispatcher
        assert_eq!(buffer.feed('\n'), Ok(None));

        // Parser recovers for the next command
        let result = feed_str(&mut buffer, "C\n");
        assert_eq!(result.unwrap().unwrap().as_str(), "C");
    }

    #[test]
    fn test_disconnect_clears_partial_line() {
        let mut buffer = LineBuffer::new();
        feed_str(&mut buffer, "SAC 10");
        assert!(!buffer.is_empty());

        buffer.disconnect();
        assert!(buffer.is_empty());

        let result = feed_str(&mut buffer, " 20\n");
        assert_eq!(result.unwrap().unwrap().as_str(), "20");
    }

    #[test]
    fn test_feed_byte() {
        let mut buffer = LineBuffer::new();
        for &b in b"LL" {
            buffer.feed_byte(b).unwrap();
        }
        assert_eq!(buffer.feed_byte(b'\n').unwrap().unwrap().as_str(), "LL");
    }

    #[test]
    fn test_multibyte_text_kept_intact() {
        let mut buffer = LineBuffer::new();
        for &b in "\u{e9}t\u{e9}".as_bytes() {
            assert_eq!(buffer.feed_byte(b), Ok(None));
        }
        assert_eq!(buffer.len(), 5);
        let line = buffer.feed_byte(b'\n').unwrap().unwrap();
        assert_eq!(line.as_str(), "\u{e9}t\u{e9}");
    }

    #[test]
    fn test_limit_counts_bytes() {
        let mut buffer = LineBuffer::new();
        // 32 two-byte characters fill the buffer exactly
        for _ in 0..MAX_LINE_LEN / 2 {
            assert_eq!(buffer.feed('\u{e9}'), Ok(None));
        }
        assert_eq!(buffer.feed('a'), Err(LineError::TooLong));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buffer = LineBuffer::new();
        for &b in &[b'C', 0xFF] {
            buffer.feed_byte(b).unwrap();
        }
        assert_eq!(buffer.feed_byte(b'\n'), Err(LineError::InvalidText));
        assert!(buffer.is_empty());

        // Next line parses normally
        for &b in b"UC" {
            buffer.feed_byte(b).unwrap();
        }
        assert_eq!(buffer.feed_byte(b'\r').unwrap().unwrap().as_str(), "UC");
    }
}
