use num_traits::Num;
use std::io::BufRead;
use std::sync::Arc;
use thiserror::Error;

use crate::document::{DbcFile, Location};
use crate::keywords::Punct;
use crate::statements;
use crate::tokenizer::{DbcToken, DbcTokenType, Tokenizer, TokenizerError};

pub(crate) struct ParserState<R: BufRead> {
    tokenizer: Tokenizer<R>,
    pub(crate) filename: Arc<str>,
    last_token: Option<DbcToken>,
    reuse_token: bool,
    pub(crate) hex_numbers: bool,
    pub(crate) found_version: bool,
    pub(crate) found_new_symbols: bool,
    pub(crate) found_bit_timing: bool,
    pub(crate) found_nodes: bool,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParserError {
    #[error("syntax error at {filename}:{line}:{column}; expected {expected}: \"{text}\"")]
    UnexpectedToken {
        filename: String,
        line: u32,
        column: u32,
        expected: String,
        text: String,
    },

    #[error("syntax error at {filename}:{line}:{column}; {tokenizer_error}: {text}")]
    InvalidToken {
        filename: String,
        line: u32,
        column: u32,
        tokenizer_error: TokenizerError,
        text: String,
    },

    #[error("syntax error at {filename}:{line}:{column}; duplicated {section}: \"{text}\"")]
    DuplicateSection {
        filename: String,
        line: u32,
        column: u32,
        section: String,
        text: String,
    },

    #[error("syntax error at {filename}:{line}:{column}; invalid new symbol: \"{text}\"")]
    InvalidNewSymbol {
        filename: String,
        line: u32,
        column: u32,
        text: String,
    },

    #[error("syntax error at {filename}:{line}:{column}; invalid {description}: \"{text}\"")]
    InvalidValue {
        filename: String,
        line: u32,
        column: u32,
        description: String,
        text: String,
    },

    #[error("syntax error at {filename}:{line}:{column}; cannot parse {field} as {kind}: \"{text}\"")]
    MalformedNumber {
        filename: String,
        line: u32,
        column: u32,
        field: String,
        kind: String,
        text: String,
    },
}

impl<R: BufRead> ParserState<R> {
    pub(crate) fn new(source: R, filename: &str, hex_numbers: bool) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
            filename: Arc::from(filename),
            last_token: None,
            reuse_token: false,
            hex_numbers,
            found_version: false,
            found_new_symbols: false,
            found_bit_timing: false,
            found_nodes: false,
        }
    }

    /// parse statements until the end of the input is reached
    pub(crate) fn parse_file(&mut self) -> Result<DbcFile, ParserError> {
        let mut dbc = DbcFile::new();
        let first = self.peek_token()?;
        dbc.location = self.location(&first);
        loop {
            let token = self.get_token()?;
            match token.ttype {
                DbcTokenType::Eof => break,
                DbcTokenType::Keyword(keyword) => {
                    statements::parse_statement(self, keyword, &token, &mut dbc)?;
                }
                _ => return Err(ParserError::unexpected_token(self, "keyword", &token)),
            }
        }
        Ok(dbc)
    }

    pub(crate) fn take_read_error(&mut self) -> Option<std::io::Error> {
        self.tokenizer.take_read_error()
    }

    // get the next token which is not whitespace
    // error tokens of the tokenizer are turned into a ParserError immediately
    pub(crate) fn get_token(&mut self) -> Result<DbcToken, ParserError> {
        if self.reuse_token {
            if let Some(token) = &self.last_token {
                self.reuse_token = false;
                return Ok(token.clone());
            }
        }

        let token = loop {
            let token = self.tokenizer.next_token();
            if token.ttype != DbcTokenType::Whitespace {
                break token;
            }
        };
        if let DbcTokenType::Error(tokenizer_error) = &token.ttype {
            return Err(ParserError::InvalidToken {
                filename: self.filename.to_string(),
                line: token.line,
                column: token.column,
                tokenizer_error: tokenizer_error.clone(),
                text: token.text.clone(),
            });
        }
        self.last_token = Some(token.clone());
        Ok(token)
    }

    /// the next call of get_token() returns the most recent token again
    pub(crate) fn undo_get_token(&mut self) {
        self.reuse_token = self.last_token.is_some();
    }

    pub(crate) fn peek_token(&mut self) -> Result<DbcToken, ParserError> {
        let token = self.get_token()?;
        self.undo_get_token();
        Ok(token)
    }

    pub(crate) fn location(&self, token: &DbcToken) -> Location {
        Location::new(self.filename.clone(), token.line, token.column)
    }

    pub(crate) fn expect_punct(&mut self, punct: Punct) -> Result<DbcToken, ParserError> {
        let token = self.get_token()?;
        if token.is_punct(punct) {
            Ok(token)
        } else {
            Err(ParserError::unexpected_token(
                self,
                &format!("'{}'", punct.as_char()),
                &token,
            ))
        }
    }

    /// consume the next token if it is the given punctuation
    pub(crate) fn accept_punct(&mut self, punct: Punct) -> Result<bool, ParserError> {
        let token = self.get_token()?;
        if token.is_punct(punct) {
            Ok(true)
        } else {
            self.undo_get_token();
            Ok(false)
        }
    }

    // Names of nodes, messages, signals etc.
    // A lexeme like "m1" is always classified as a multiplexer indicator, but it is a valid name as well.
    pub(crate) fn get_identifier(&mut self, field: &str) -> Result<String, ParserError> {
        let token = self.get_token()?;
        match token.ttype {
            DbcTokenType::Identifier | DbcTokenType::MuxIndicator => Ok(token.text),
            _ => Err(ParserError::unexpected_token(self, field, &token)),
        }
    }

    pub(crate) fn get_string(&mut self, field: &str) -> Result<String, ParserError> {
        let token = self.get_token()?;
        if token.ttype == DbcTokenType::String {
            Ok(token.text)
        } else {
            Err(ParserError::unexpected_token(self, field, &token))
        }
    }

    fn expect_number(&mut self, field: &str) -> Result<DbcToken, ParserError> {
        let token = self.get_token()?;
        if token.ttype == DbcTokenType::Number {
            Ok(token)
        } else {
            Err(ParserError::unexpected_token(self, field, &token))
        }
    }

    /// get a decimal integer, e.g. an u32 id or an i64 attribute limit
    pub(crate) fn get_integer<T: Num>(&mut self, field: &str) -> Result<T, ParserError> {
        let token = self.expect_number(field)?;
        self.convert_integer(&token, &token.text, field)
    }

    pub(crate) fn convert_integer<T: Num>(
        &self,
        token: &DbcToken,
        text: &str,
        field: &str,
    ) -> Result<T, ParserError> {
        T::from_str_radix(text, 10)
            .map_err(|_| ParserError::malformed_number(self, token, field, "integer"))
    }

    pub(crate) fn get_double(&mut self, field: &str) -> Result<f64, ParserError> {
        let token = self.expect_number(field)?;
        self.convert_double(&token, field)
    }

    pub(crate) fn convert_double(&self, token: &DbcToken, field: &str) -> Result<f64, ParserError> {
        let text = &token.text;
        // some tools write integer limits as 0xNNN
        let value = if let Some(hexdigits) = hex_digits(text) {
            u64::from_str_radix(hexdigits, 16).ok().map(|num| num as f64)
        } else {
            text.parse::<f64>().ok()
        };
        // out of range literals parse as infinity, which cannot be written back
        value
            .filter(|num| num.is_finite())
            .ok_or_else(|| ParserError::malformed_number(self, token, field, "float"))
    }

    /// Get the value of a hex attribute.
    /// If hex numbers are enabled the value must be written with a 0x prefix, otherwise it is a plain decimal number.
    pub(crate) fn get_hex(&mut self, field: &str) -> Result<u32, ParserError> {
        let token = self.expect_number(field)?;
        self.convert_hex(&token, field)
    }

    pub(crate) fn convert_hex(&self, token: &DbcToken, field: &str) -> Result<u32, ParserError> {
        if self.hex_numbers {
            hex_digits(&token.text)
                .and_then(|hexdigits| u32::from_str_radix(hexdigits, 16).ok())
                .ok_or_else(|| ParserError::malformed_number(self, token, field, "hex number"))
        } else {
            self.convert_integer(token, &token.text, field)
        }
    }

    /// get a range `from-to`
    pub(crate) fn get_range(&mut self, field: &str) -> Result<(DbcToken, u32, u32), ParserError> {
        let token = self.get_token()?;
        let Some((from_text, to_text)) = token.range_bounds() else {
            return Err(ParserError::unexpected_token(self, field, &token));
        };
        let from = self.convert_integer(&token, from_text, field)?;
        let to = self.convert_integer(&token, to_text, field)?;
        Ok((token, from, to))
    }
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

impl ParserError {
    pub(crate) fn unexpected_token<R: BufRead>(
        parser: &ParserState<R>,
        expected: &str,
        token: &DbcToken,
    ) -> Self {
        Self::UnexpectedToken {
            filename: parser.filename.to_string(),
            line: token.line,
            column: token.column,
            expected: expected.to_string(),
            text: token.text.clone(),
        }
    }

    pub(crate) fn duplicate_section<R: BufRead>(
        parser: &ParserState<R>,
        section: &str,
        token: &DbcToken,
    ) -> Self {
        Self::DuplicateSection {
            filename: parser.filename.to_string(),
            line: token.line,
            column: token.column,
            section: section.to_string(),
            text: token.text.clone(),
        }
    }

    pub(crate) fn invalid_new_symbol<R: BufRead>(parser: &ParserState<R>, token: &DbcToken) -> Self {
        Self::InvalidNewSymbol {
            filename: parser.filename.to_string(),
            line: token.line,
            column: token.column,
            text: token.text.clone(),
        }
    }

    pub(crate) fn invalid_value<R: BufRead>(
        parser: &ParserState<R>,
        description: &str,
        token: &DbcToken,
    ) -> Self {
        Self::InvalidValue {
            filename: parser.filename.to_string(),
            line: token.line,
            column: token.column,
            description: description.to_string(),
            text: token.text.clone(),
        }
    }

    pub(crate) fn malformed_number<R: BufRead>(
        parser: &ParserState<R>,
        token: &DbcToken,
        field: &str,
        kind: &str,
    ) -> Self {
        Self::MalformedNumber {
            filename: parser.filename.to_string(),
            line: token.line,
            column: token.column,
            field: field.to_string(),
            kind: kind.to_string(),
            text: token.text.clone(),
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            ParserError::UnexpectedToken { line, .. }
            | ParserError::InvalidToken { line, .. }
            | ParserError::DuplicateSection { line, .. }
            | ParserError::InvalidNewSymbol { line, .. }
            | ParserError::InvalidValue { line, .. }
            | ParserError::MalformedNumber { line, .. } => *line,
        }
    }
}
