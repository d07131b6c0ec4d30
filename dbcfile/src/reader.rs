use std::collections::VecDeque;
use std::io::{BufRead, ErrorKind};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Character source for the tokenizer.
///
/// The input is decoded lazily as UTF-8. Bytes that are not part of a valid UTF-8 sequence are
/// interpreted as ISO-8859-1, which is what older tools use when they write units like "°C".
/// The reader keeps track of the position in the input and collects the text of the current token.
pub(crate) struct SourceReader<R: BufRead> {
    source: R,
    raw_bytes: VecDeque<u8>,
    lookahead: VecDeque<char>,
    peek_offset: usize,
    at_start: bool,
    source_exhausted: bool,
    read_error: Option<std::io::Error>,

    lexeme: String,
    line: u32,
    column: u32,
    begin_token: bool,
    start_line: u32,
    start_column: u32,
}

impl<R: BufRead> SourceReader<R> {
    pub(crate) fn new(source: R) -> Self {
        Self {
            source,
            raw_bytes: VecDeque::with_capacity(8),
            lookahead: VecDeque::with_capacity(4),
            peek_offset: 0,
            at_start: true,
            source_exhausted: false,
            read_error: None,
            lexeme: String::new(),
            line: 1,
            column: 0,
            begin_token: true,
            start_line: 1,
            start_column: 0,
        }
    }

    /// consume the next character and append it to the current token text
    pub(crate) fn read(&mut self) -> Option<char> {
        self.peek_offset = 0;
        let c = match self.lookahead.pop_front() {
            Some(c) => c,
            None => self.decode_char()?,
        };
        self.lexeme.push(c);

        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else if c != '\t' {
            self.column += 1;
        }

        if self.begin_token {
            self.start_line = self.line;
            self.start_column = self.column;
            self.begin_token = false;
        }

        Some(c)
    }

    /// Look at the next unread character.
    /// Repeated calls without an intervening read() move further ahead in the input.
    pub(crate) fn peek(&mut self) -> Option<char> {
        let c = self.peek_nth(self.peek_offset + 1);
        if c.is_some() {
            self.peek_offset += 1;
        }
        c
    }

    /// look at the n-th unread character without consuming anything; n starts at 1
    pub(crate) fn peek_nth(&mut self, n: usize) -> Option<char> {
        while self.lookahead.len() < n {
            let c = self.decode_char()?;
            self.lookahead.push_back(c);
        }
        self.lookahead.get(n - 1).copied()
    }

    /// take the text of the current token and start a new one
    pub(crate) fn take_lexeme(&mut self) -> String {
        self.begin_token = true;
        std::mem::take(&mut self.lexeme)
    }

    pub(crate) fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// (line, column) of the first character of the current token
    pub(crate) fn token_start(&self) -> (u32, u32) {
        (self.start_line, self.start_column)
    }

    /// (line, column) of the most recently read character
    pub(crate) fn position(&self) -> (u32, u32) {
        (self.line, self.column)
    }

    pub(crate) fn take_read_error(&mut self) -> Option<std::io::Error> {
        self.read_error.take()
    }

    fn decode_char(&mut self) -> Option<char> {
        let mut c = self.decode_next()?;
        if self.at_start {
            self.at_start = false;
            if c == BYTE_ORDER_MARK {
                c = self.decode_next()?;
            }
        }
        Some(c)
    }

    fn decode_next(&mut self) -> Option<char> {
        let first = self.byte_at(0)?;
        let seq_len = match first {
            0x00..=0x7f => 1,
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => 0,
        };

        let mut buf = [first, 0, 0, 0];
        let mut valid = seq_len > 0;
        for idx in 1..seq_len {
            match self.byte_at(idx) {
                Some(b) if (0x80..=0xbf).contains(&b) => buf[idx] = b,
                _ => {
                    valid = false;
                    break;
                }
            }
        }

        if valid {
            if let Some(c) = std::str::from_utf8(&buf[..seq_len])
                .ok()
                .and_then(|s| s.chars().next())
            {
                self.raw_bytes.drain(..seq_len);
                return Some(c);
            }
        }

        // not valid utf-8: use the latin-1 interpretation of the first byte
        self.raw_bytes.pop_front();
        Some(char::from(first))
    }

    fn byte_at(&mut self, idx: usize) -> Option<u8> {
        while self.raw_bytes.len() <= idx {
            if !self.fill_raw_bytes() {
                return None;
            }
        }
        self.raw_bytes.get(idx).copied()
    }

    fn fill_raw_bytes(&mut self) -> bool {
        if self.source_exhausted {
            return false;
        }
        loop {
            match self.source.fill_buf() {
                Ok([]) => {
                    self.source_exhausted = true;
                    return false;
                }
                Ok(data) => {
                    let count = data.len();
                    self.raw_bytes.extend(data);
                    self.source.consume(count);
                    return true;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    self.source_exhausted = true;
                    self.read_error = Some(err);
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn read_all(data: &[u8]) -> String {
        let mut reader = SourceReader::new(data);
        while reader.read().is_some() {}
        reader.take_lexeme()
    }

    #[test]
    fn decode_utf8() {
        assert_eq!(read_all("abc äöü °C".as_bytes()), "abc äöü °C");
    }

    #[test]
    fn decode_latin1_fallback() {
        // "°C" in ISO-8859-1
        assert_eq!(read_all(&[b'"', 0xb0, b'C', b'"']), "\"°C\"");
        // truncated utf-8 sequence at the end of the input
        assert_eq!(read_all(&[b'a', 0xc3]), "aÃ");
    }

    #[test]
    fn strip_bom() {
        assert_eq!(read_all("\u{feff}VERSION".as_bytes()), "VERSION");
        // only a leading bom is removed
        assert_eq!(read_all("a\u{feff}".as_bytes()), "a\u{feff}");
    }

    #[test]
    fn position_tracking() {
        let mut reader = SourceReader::new("ab\n\tc".as_bytes());
        assert_eq!(reader.read(), Some('a'));
        assert_eq!(reader.token_start(), (1, 1));
        assert_eq!(reader.read(), Some('b'));
        assert_eq!(reader.position(), (1, 2));
        reader.take_lexeme();
        assert_eq!(reader.read(), Some('\n'));
        assert_eq!(reader.position(), (2, 0));
        assert_eq!(reader.read(), Some('\t'));
        assert_eq!(reader.position(), (2, 0));
        reader.take_lexeme();
        assert_eq!(reader.read(), Some('c'));
        assert_eq!(reader.token_start(), (2, 1));
        assert_eq!(reader.read(), None);
    }

    #[test]
    fn peek_extends() {
        let mut reader = SourceReader::new("123".as_bytes());
        assert_eq!(reader.peek(), Some('1'));
        assert_eq!(reader.peek(), Some('2'));
        assert_eq!(reader.peek(), Some('3'));
        assert_eq!(reader.peek(), None);
        assert_eq!(reader.read(), Some('1'));
        assert_eq!(reader.peek(), Some('2'));
        assert_eq!(reader.peek_nth(2), Some('3'));
        assert_eq!(reader.peek_nth(3), None);
        assert_eq!(reader.lexeme(), "1");
    }

    #[test]
    fn small_buffer() {
        // multi-byte characters are split across buffer refills
        let text = "°°°°°°";
        let bufreader = BufReader::with_capacity(1, text.as_bytes());
        let mut reader = SourceReader::new(bufreader);
        while reader.read().is_some() {}
        assert_eq!(reader.take_lexeme(), text);
    }

    struct FailingSource;

    impl std::io::Read for FailingSource {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("broken"))
        }
    }

    #[test]
    fn read_error() {
        let mut reader = SourceReader::new(BufReader::new(FailingSource));
        assert_eq!(reader.read(), None);
        let err = reader.take_read_error().expect("read error");
        assert_eq!(err.to_string(), "broken");
        assert!(reader.take_read_error().is_none());
    }
}
