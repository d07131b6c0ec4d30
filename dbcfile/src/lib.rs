//! dbcfile is a library that allows you to read, modify and write CAN dbc files.
//!
//! A dbc file describes the nodes of a CAN network, the messages they exchange and the signals carried in those messages.
//! Reading a file produces a [`DbcFile`], in which every item carries the [`Location`] where it was found.
//! Writing a [`DbcFile`] produces a file in the canonical layout used by most tools.
//!
//! Attributes of type `HEX` can be written either as plain decimal numbers or with a `0x` prefix.
//! The `hex_numbers` flag of the read and write functions selects the convention.

mod attributes;
mod document;
mod itemlist;
mod keywords;
mod parser;
mod reader;
mod statements;
mod tokenizer;
mod writer;

use std::io::{BufReader, Read, Write};
use thiserror::Error;

pub use attributes::*;
pub use document::*;
pub use itemlist::{ItemKey, ItemList};
pub use parser::ParserError;
pub use tokenizer::TokenizerError;
// used internally
use parser::ParserState;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DbcError {
    /// reading from the source failed
    #[error("Could not read from {filename}: {ioerror}")]
    ReadError {
        filename: String,
        ioerror: std::io::Error,
    },

    /// the content is not a valid dbc file
    #[error("Parser error: {parser_error}")]
    ParserError { parser_error: ParserError },

    /// writing to the sink failed
    #[error("Could not write dbc data: {ioerror}")]
    WriteError { ioerror: std::io::Error },
}

/// Create a new, empty dbc file
///
/// When it is written, the file contains a version, the full list of new symbols and an empty bit timing section.
#[must_use]
pub fn new() -> DbcFile {
    DbcFile::new()
}

/// The symbols that are written in the `NS_` section of a file which does not declare its own list
#[must_use]
pub fn new_symbols() -> Vec<String> {
    keywords::NEW_SYMBOLS
        .iter()
        .map(|symbol| symbol.to_string())
        .collect()
}

/**
Read dbc data from a source

`filename` is only used in error messages and in the locations of the items; the data is read from `reader`.

`hex_numbers`: if true, the values of `HEX` attributes must be written with a `0x` prefix; if false they are plain decimal numbers.

# Example
```
let data = "VERSION \"1.0\"\nBU_: Engine Gateway\n";
let dbc = dbcfile::parse("example.dbc", data.as_bytes(), false).unwrap();
assert_eq!(dbc.version, "1.0");
assert_eq!(dbc.nodes.unwrap().names.len(), 2);
```

# Errors

A [`DbcError`] describes why reading or parsing failed. There is no partial result.
 */
pub fn parse<R: Read>(filename: &str, reader: R, hex_numbers: bool) -> Result<DbcFile, DbcError> {
    let mut parser = ParserState::new(BufReader::new(reader), filename, hex_numbers);
    let result = parser.parse_file();

    // a read error ends the input early; it takes precedence over any follow-up syntax error
    if let Some(ioerror) = parser.take_read_error() {
        return Err(DbcError::ReadError {
            filename: filename.to_string(),
            ioerror,
        });
    }
    result.map_err(|parser_error| DbcError::ParserError { parser_error })
}

/**
Read dbc data stored in a string

Locations and error messages use an empty file name.

# Example

```rust
# use dbcfile::DbcError;
# fn main() -> Result<(), DbcError> {
let text = r#"
BO_ 100 Msg: 8 Engine
 SG_ Speed : 0|16@1+ (0.1,0) [0|6553.5] "km/h" Gateway
"#;
let dbc = dbcfile::load_from_string(text, false)?;
assert_eq!(dbc.messages[0].signals[0].name, "Speed");
# Ok(())
# }
```

# Errors

A [`DbcError`] describes the problem if the text is not a valid dbc file.
 */
pub fn load_from_string(dbcdata: &str, hex_numbers: bool) -> Result<DbcFile, DbcError> {
    parse("", dbcdata.as_bytes(), hex_numbers)
}

/// write a `DbcFile` to the given sink
///
/// # Errors
///
/// [`DbcError::WriteError`] if writing to the sink fails.
pub fn write<W: Write>(mut writer: W, dbc: &DbcFile, hex_numbers: bool) -> Result<(), DbcError> {
    let text = dbc.write_to_string(hex_numbers);
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|ioerror| DbcError::WriteError { ioerror })
}

impl DbcFile {
    /// construct a string containing the whole dbc data of this `DbcFile` object
    #[must_use]
    pub fn write_to_string(&self, hex_numbers: bool) -> String {
        let mut writer = writer::Writer::new(hex_numbers);
        self.stringify(&mut writer);
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_empty_file() {
        let dbc = load_from_string("", false).unwrap();
        assert_eq!(dbc, new());
    }

    #[test]
    fn new_file() {
        let dbc = new();
        let text = dbc.write_to_string(false);
        let symbols = new_symbols();
        assert_eq!(symbols.len(), 28);
        assert_eq!(symbols[0], "NS_DESC_");
        assert!(text.starts_with("VERSION \"_\"\n\nNS_:\n\tNS_DESC_\n"));
        assert!(text.ends_with("BS_:\n\n"));

        // the emitted file declares the full list of new symbols
        let reloaded = load_from_string(&text, false).unwrap();
        assert_eq!(reloaded.version, "_");
        assert_eq!(reloaded.new_symbols.unwrap().symbols, symbols);
        assert_eq!(reloaded.bit_timing.unwrap(), BitTiming::new(0, 0, 0));
    }

    #[test]
    fn parser_errors() {
        let result = load_from_string("VERSION 1", false);
        let Err(DbcError::ParserError { parser_error }) = result else {
            panic!("expected a parser error");
        };
        assert_eq!(
            parser_error.to_string(),
            "syntax error at :1:9; expected version string: \"1\""
        );

        let result = parse("bad.dbc", "BU_: A\nBU_: B".as_bytes(), false);
        let Err(error) = result else {
            panic!("expected an error");
        };
        assert_eq!(
            error.to_string(),
            "Parser error: syntax error at bad.dbc:2:1; duplicated node definition: \"BU_\""
        );
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device gone"))
        }
    }

    #[test]
    fn read_error() {
        let result = parse("broken.dbc", FailingReader, false);
        let Err(DbcError::ReadError { filename, ioerror }) = result else {
            panic!("expected a read error");
        };
        assert_eq!(filename, "broken.dbc");
        assert_eq!(ioerror.to_string(), "device gone");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_error() {
        let result = write(FailingWriter, &new(), false);
        assert!(matches!(result, Err(DbcError::WriteError { .. })));
    }

    #[test]
    fn write_to_vec() {
        let mut dbc = new();
        dbc.version = "2.0".to_string();
        let mut output = Vec::new();
        write(&mut output, &dbc, true).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, dbc.write_to_string(true));
        assert!(text.starts_with("VERSION \"2.0\""));
    }
}
