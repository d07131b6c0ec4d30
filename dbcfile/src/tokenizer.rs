use std::io::BufRead;
use thiserror::Error;

use crate::keywords::{Keyword, Punct};
use crate::reader::SourceReader;

// error tokens only carry the beginning of very long input
const MAX_ERROR_EXCERPT: usize = 20;
const MAX_HEX_DIGITS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenizerError {
    #[error("unrecognized symbol")]
    UnrecognizedSymbol,

    #[error("unclosed string, missing closing \"")]
    UnclosedString,

    #[error("invalid hex number")]
    InvalidHexNumber,

    #[error("invalid exponential number")]
    InvalidExponent,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DbcTokenType {
    Error(TokenizerError),
    Eof,
    Whitespace,
    Identifier,
    Number,
    NumberRange,
    MuxIndicator,
    String,
    Keyword(Keyword),
    Punct(Punct),
}

#[derive(Debug, Clone)]
pub(crate) struct DbcToken {
    pub(crate) ttype: DbcTokenType,
    // strings are stored without their quotes, error tokens only keep an excerpt
    pub(crate) text: String,
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) end_line: u32,
    pub(crate) end_column: u32,
}

/// Splits the input into tokens. Tokens are produced on demand by `next_token()`.
pub(crate) struct Tokenizer<R: BufRead> {
    reader: SourceReader<R>,
}

impl DbcToken {
    pub(crate) fn is_punct(&self, punct: Punct) -> bool {
        self.ttype == DbcTokenType::Punct(punct)
    }

    pub(crate) fn is_keyword(&self, keyword: Keyword) -> bool {
        self.ttype == DbcTokenType::Keyword(keyword)
    }

    /// split the text of a NumberRange token into its lower and upper bound
    pub(crate) fn range_bounds(&self) -> Option<(&str, &str)> {
        if self.ttype == DbcTokenType::NumberRange {
            self.text.split_once('-')
        } else {
            None
        }
    }
}

impl<R: BufRead> Tokenizer<R> {
    pub(crate) fn new(source: R) -> Self {
        Self {
            reader: SourceReader::new(source),
        }
    }

    pub(crate) fn take_read_error(&mut self) -> Option<std::io::Error> {
        self.reader.take_read_error()
    }

    /// scan the next token of the input, including whitespace
    pub(crate) fn next_token(&mut self) -> DbcToken {
        let Some(c) = self.reader.read() else {
            return self.make_token(DbcTokenType::Eof);
        };

        if is_space(c) {
            self.scan_whitespace()
        } else if c.is_ascii_alphabetic() || c == '_' {
            self.scan_text()
        } else if c.is_ascii_digit() || c == '+' || c == '-' {
            self.scan_number(c)
        } else if c == '"' {
            self.scan_string()
        } else if let Some(punct) = Punct::from_char(c) {
            self.make_token(DbcTokenType::Punct(punct))
        } else {
            self.make_error(TokenizerError::UnrecognizedSymbol)
        }
    }

    fn scan_whitespace(&mut self) -> DbcToken {
        while let Some(c) = self.reader.peek() {
            if !is_space(c) {
                break;
            }
            self.reader.read();
        }
        self.make_token(DbcTokenType::Whitespace)
    }

    // identifiers, keywords and multiplexer indicators
    fn scan_text(&mut self) -> DbcToken {
        while let Some(c) = self.reader.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                break;
            }
            self.reader.read();
        }

        let text = self.reader.lexeme();
        let ttype = if is_mux_indicator(text) {
            DbcTokenType::MuxIndicator
        } else if let Some(keyword) = Keyword::from_lexeme(text) {
            DbcTokenType::Keyword(keyword)
        } else {
            DbcTokenType::Identifier
        };
        self.make_token(ttype)
    }

    fn scan_number(&mut self, first: char) -> DbcToken {
        if first == '0' && matches!(self.reader.peek_nth(1), Some('x' | 'X')) {
            return self.scan_hex_number();
        }

        let mut prev = first;
        let mut has_digits = first.is_ascii_digit();
        let mut is_range = false;

        while let Some(c) = self.reader.peek_nth(1) {
            if c.is_ascii_digit() {
                has_digits = true;
            } else if c == '.' && !is_range && prev != '+' && prev != '-' {
                // plain decimal point
            } else if (c == 'e' || c == 'E') && !is_range && prev.is_ascii_digit() {
                return self.scan_exponent();
            } else if c == '-'
                && first.is_ascii_digit()
                && prev.is_ascii_digit()
                && !is_range
                && self.reader.peek_nth(2).is_some_and(|d| d.is_ascii_digit())
            {
                // "<digits>-<digit>" is a number range; only digits may follow
                is_range = true;
            } else {
                break;
            }
            self.reader.read();
            prev = c;
        }

        let ttype = if !has_digits {
            match Punct::from_char(first) {
                Some(punct) => DbcTokenType::Punct(punct),
                None => DbcTokenType::Error(TokenizerError::UnrecognizedSymbol),
            }
        } else if is_range {
            DbcTokenType::NumberRange
        } else {
            DbcTokenType::Number
        };
        self.make_token(ttype)
    }

    fn scan_hex_number(&mut self) -> DbcToken {
        // consume the 'x'
        self.reader.read();
        if !self.reader.peek_nth(1).is_some_and(|c| c.is_ascii_hexdigit()) {
            return self.make_error(TokenizerError::InvalidHexNumber);
        }

        let mut count = 0;
        while count < MAX_HEX_DIGITS && self.reader.peek_nth(1).is_some_and(|c| c.is_ascii_hexdigit())
        {
            self.reader.read();
            count += 1;
        }
        self.make_token(DbcTokenType::Number)
    }

    fn scan_exponent(&mut self) -> DbcToken {
        // consume the 'e' and an optional sign
        self.reader.read();
        if matches!(self.reader.peek_nth(1), Some('+' | '-')) {
            self.reader.read();
        }
        if !self.reader.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            return self.make_error(TokenizerError::InvalidExponent);
        }
        while self.reader.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.reader.read();
        }
        self.make_token(DbcTokenType::Number)
    }

    fn scan_string(&mut self) -> DbcToken {
        loop {
            match self.reader.read() {
                None => return self.make_error(TokenizerError::UnclosedString),
                Some('"') => return self.make_token(DbcTokenType::String),
                Some(_) => {}
            }
        }
    }

    fn make_token(&mut self, ttype: DbcTokenType) -> DbcToken {
        let (line, column) = if self.reader.lexeme().is_empty() {
            self.reader.position()
        } else {
            self.reader.token_start()
        };
        let (end_line, end_column) = self.reader.position();
        let mut text = self.reader.take_lexeme();
        if ttype == DbcTokenType::String {
            // the lexeme is enclosed in ascii quotes
            text = text[1..text.len() - 1].to_string();
        }
        DbcToken {
            ttype,
            text,
            line,
            column,
            end_line,
            end_column,
        }
    }

    fn make_error(&mut self, error: TokenizerError) -> DbcToken {
        let mut token = self.make_token(DbcTokenType::Error(error));
        if token.text.chars().count() > MAX_ERROR_EXCERPT {
            token.text = token.text.chars().take(MAX_ERROR_EXCERPT).collect();
        }
        token
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n' || c == '\r'
}

/// `M`, `m<digits>` or `m<digits>M`
pub(crate) fn is_mux_indicator(text: &str) -> bool {
    if text == "M" {
        return true;
    }
    let Some(rest) = text.strip_prefix('m') else {
        return false;
    };
    let digits = rest.strip_suffix('M').unwrap_or(rest);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
