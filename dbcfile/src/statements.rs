use std::io::BufRead;

use crate::document::{
    AttributeDefault, AttributeDefinition, AttributeLiteral, AttributeValue, AttributeValueType,
    BitTiming, ByteOrder, Comment, DbcFile, EnvVar, EnvVarAccessType, EnvVarData, EnvVarType,
    ExtValueType, ExtendedMux, ExtendedMuxRange, Location, Message, MessageTransmitter,
    NewSymbols, Nodes, ObjectKind, ObjectTarget, Signal, SignalExtValueType, SignalGroup,
    SignalType, SignalTypeRef, ValueDescription, ValueEncoding, ValueEncodingTarget, ValueTable,
    ValueType,
};
use crate::keywords::{Keyword, Punct, is_new_symbol};
use crate::parser::{ParserError, ParserState};
use crate::tokenizer::{DbcToken, DbcTokenType};

/// parse the statement introduced by `keyword` and add its content to the file
pub(crate) fn parse_statement<R: BufRead>(
    parser: &mut ParserState<R>,
    keyword: Keyword,
    token: &DbcToken,
    dbc: &mut DbcFile,
) -> Result<(), ParserError> {
    let location = parser.location(token);
    match keyword {
        Keyword::Version => {
            if parser.found_version {
                return Err(ParserError::duplicate_section(parser, "version", token));
            }
            parser.found_version = true;
            dbc.version = parser.get_string("version string")?;
        }
        Keyword::NewSymbols => {
            if parser.found_new_symbols {
                return Err(ParserError::duplicate_section(parser, "new symbols", token));
            }
            parser.found_new_symbols = true;
            dbc.new_symbols = Some(NewSymbols::parse(parser, location)?);
        }
        Keyword::BitTiming => {
            if parser.found_bit_timing {
                return Err(ParserError::duplicate_section(parser, "bit timing", token));
            }
            parser.found_bit_timing = true;
            dbc.bit_timing = Some(BitTiming::parse(parser, location)?);
        }
        Keyword::Nodes => {
            if parser.found_nodes {
                return Err(ParserError::duplicate_section(
                    parser,
                    "node definition",
                    token,
                ));
            }
            parser.found_nodes = true;
            dbc.nodes = Some(Nodes::parse(parser, location)?);
        }
        Keyword::ValueTable => dbc.value_tables.push(ValueTable::parse(parser, location)?),
        Keyword::Message => dbc.messages.push(Message::parse(parser, location)?),
        Keyword::MessageTransmitter => dbc
            .message_transmitters
            .push(MessageTransmitter::parse(parser, location)?),
        Keyword::EnvVar => dbc.env_vars.push(EnvVar::parse(parser, location)?),
        Keyword::EnvVarData => dbc.env_var_data.push(EnvVarData::parse(parser, location)?),
        Keyword::SignalType => {
            // SGTYPE_ <name> : ... defines a type, SGTYPE_ <message id> <signal> : <type> ; references one
            let next = parser.peek_token()?;
            if next.ttype == DbcTokenType::Number {
                dbc.signal_type_refs
                    .push(SignalTypeRef::parse(parser, location)?);
            } else {
                dbc.signal_types.push(SignalType::parse(parser, location)?);
            }
        }
        Keyword::Comment => dbc.comments.push(Comment::parse(parser, location)?),
        Keyword::AttributeDefinition => dbc
            .attribute_definitions
            .push(AttributeDefinition::parse(parser, location)?),
        Keyword::AttributeDefault => dbc
            .attribute_defaults
            .push(AttributeDefault::parse(parser, location)?),
        Keyword::AttributeValue => dbc
            .attribute_values
            .push(AttributeValue::parse(parser, location)?),
        Keyword::ValueEncoding => dbc
            .value_encodings
            .push(ValueEncoding::parse(parser, location)?),
        Keyword::SignalGroup => dbc.signal_groups.push(SignalGroup::parse(parser, location)?),
        Keyword::SignalValueType => dbc
            .signal_ext_value_types
            .push(SignalExtValueType::parse(parser, location)?),
        Keyword::ExtendedMux => dbc
            .extended_muxes
            .push(ExtendedMux::parse(parser, location)?),
        Keyword::Signal
        | Keyword::Int
        | Keyword::Hex
        | Keyword::Float
        | Keyword::String
        | Keyword::Enum => {
            return Err(ParserError::unexpected_token(
                parser,
                "statement keyword",
                token,
            ));
        }
    }
    Ok(())
}

impl NewSymbols {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        parser.expect_punct(Punct::Colon)?;
        let mut symbols = vec![];
        loop {
            let token = parser.get_token()?;
            match token.ttype {
                DbcTokenType::Keyword(_) | DbcTokenType::Identifier
                    if is_new_symbol(&token.text) =>
                {
                    symbols.push(token.text);
                }
                DbcTokenType::Identifier => {
                    return Err(ParserError::invalid_new_symbol(parser, &token));
                }
                _ => {
                    // any other keyword starts the next statement
                    parser.undo_get_token();
                    break;
                }
            }
        }
        Ok(Self { location, symbols })
    }
}

impl BitTiming {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        parser.expect_punct(Punct::Colon)?;
        let mut bit_timing = BitTiming {
            location,
            baudrate: 0,
            register1: 0,
            register2: 0,
        };
        if parser.peek_token()?.ttype == DbcTokenType::Number {
            bit_timing.baudrate = parser.get_integer("baudrate")?;
            parser.expect_punct(Punct::Colon)?;
            bit_timing.register1 = parser.get_integer("bit timing register 1")?;
            parser.expect_punct(Punct::Comma)?;
            bit_timing.register2 = parser.get_integer("bit timing register 2")?;
        }
        Ok(bit_timing)
    }
}

impl Nodes {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        parser.expect_punct(Punct::Colon)?;
        let names = get_names(parser)?;
        Ok(Self { location, names })
    }
}

impl ValueTable {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let name = parser.get_identifier("value table name")?;
        let values = get_value_descriptions(parser)?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            name,
            values,
        })
    }
}

impl Message {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let id = parser.get_integer("message id")?;
        let name = parser.get_identifier("message name")?;
        parser.expect_punct(Punct::Colon)?;
        let size = parser.get_integer("message size")?;
        let transmitter = parser.get_identifier("transmitter name")?;
        let mut message = Message::new(id, name, size, transmitter);
        message.location = location;

        loop {
            let token = parser.get_token()?;
            if token.is_keyword(Keyword::Signal) {
                let location = parser.location(&token);
                message.signals.push(Signal::parse(parser, location)?);
            } else {
                parser.undo_get_token();
                break;
            }
        }
        Ok(message)
    }
}

impl Signal {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let name = parser.get_identifier("signal name")?;
        let mut is_multiplexor = false;
        let mut is_multiplexed = false;
        let mut mux_switch_value = 0;
        let token = parser.get_token()?;
        if token.ttype == DbcTokenType::MuxIndicator {
            let Some(mux_info) = Signal::decode_mux_indicator(&token.text) else {
                return Err(ParserError::malformed_number(
                    parser,
                    &token,
                    "multiplexer switch value",
                    "integer",
                ));
            };
            (is_multiplexor, is_multiplexed, mux_switch_value) = mux_info;
        } else {
            parser.undo_get_token();
        }
        parser.expect_punct(Punct::Colon)?;

        let start_bit = parser.get_integer("start bit")?;
        parser.expect_punct(Punct::Pipe)?;
        let size = parser.get_integer("signal size")?;
        parser.expect_punct(Punct::At)?;
        let byte_order = get_byte_order(parser)?;
        let value_type = get_value_type(parser)?;
        let (factor, offset) = get_factor_offset(parser)?;
        let (min, max) = get_limits(parser)?;
        let unit = parser.get_string("unit")?;

        let mut receivers = vec![parser.get_identifier("receiver name")?];
        while parser.accept_punct(Punct::Comma)? {
            receivers.push(parser.get_identifier("receiver name")?);
        }

        Ok(Self {
            location,
            name,
            is_multiplexor,
            is_multiplexed,
            mux_switch_value,
            start_bit,
            size,
            byte_order,
            value_type,
            factor,
            offset,
            min,
            max,
            unit,
            receivers,
        })
    }
}

impl MessageTransmitter {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let message_id = parser.get_integer("message id")?;
        parser.expect_punct(Punct::Colon)?;
        let mut transmitters = vec![];
        loop {
            let token = parser.get_token()?;
            match token.ttype {
                DbcTokenType::Identifier | DbcTokenType::MuxIndicator => {
                    transmitters.push(token.text);
                }
                // some tools separate the transmitters with commas
                DbcTokenType::Punct(Punct::Comma) => {}
                DbcTokenType::Punct(Punct::Semicolon) => break,
                _ => {
                    return Err(ParserError::unexpected_token(
                        parser,
                        "transmitter name",
                        &token,
                    ));
                }
            }
        }
        Ok(Self {
            location,
            message_id,
            transmitters,
        })
    }
}

impl EnvVar {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let name = parser.get_identifier("environment variable name")?;
        parser.expect_punct(Punct::Colon)?;
        let token = parser.peek_token()?;
        let type_code = parser.get_integer("environment variable type")?;
        let Some(var_type) = EnvVarType::from_code(type_code) else {
            return Err(ParserError::invalid_value(
                parser,
                "environment variable type",
                &token,
            ));
        };
        let (min, max) = get_limits(parser)?;
        let unit = parser.get_string("unit")?;
        let initial_value = parser.get_double("initial value")?;
        let id = parser.get_integer("environment variable id")?;

        let token = parser.get_token()?;
        let Some(access_type) = EnvVarAccessType::from_tag(&token.text) else {
            return Err(ParserError::invalid_value(parser, "access type", &token));
        };
        let mut access_nodes = vec![parser.get_identifier("access node name")?];
        while parser.accept_punct(Punct::Comma)? {
            access_nodes.push(parser.get_identifier("access node name")?);
        }
        parser.expect_punct(Punct::Semicolon)?;

        Ok(Self {
            location,
            name,
            var_type,
            min,
            max,
            unit,
            initial_value,
            id,
            access_type,
            access_nodes,
        })
    }
}

impl EnvVarData {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let env_var_name = parser.get_identifier("environment variable name")?;
        parser.expect_punct(Punct::Colon)?;
        let data_size = parser.get_integer("data size")?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            env_var_name,
            data_size,
        })
    }
}

impl SignalType {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let name = parser.get_identifier("signal type name")?;
        parser.expect_punct(Punct::Colon)?;
        let mut size = parser.get_integer("signal size")?;
        if parser.accept_punct(Punct::Pipe)? {
            // the first number was a start bit, which is not part of the type
            size = parser.get_integer("signal size")?;
        }
        parser.expect_punct(Punct::At)?;
        let byte_order = get_byte_order(parser)?;
        let value_type = get_value_type(parser)?;
        let (factor, offset) = get_factor_offset(parser)?;
        let (min, max) = get_limits(parser)?;
        let unit = parser.get_string("unit")?;
        let default_value = parser.get_double("default value")?;
        parser.expect_punct(Punct::Comma)?;
        let value_table = if parser.peek_token()?.is_punct(Punct::Semicolon) {
            String::new()
        } else {
            parser.get_identifier("value table name")?
        };
        parser.expect_punct(Punct::Semicolon)?;

        Ok(Self {
            location,
            name,
            size,
            byte_order,
            value_type,
            factor,
            offset,
            min,
            max,
            unit,
            default_value,
            value_table,
        })
    }
}

impl SignalTypeRef {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let message_id = parser.get_integer("message id")?;
        let signal_name = parser.get_identifier("signal name")?;
        parser.expect_punct(Punct::Colon)?;
        let type_name = parser.get_identifier("signal type name")?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            message_id,
            signal_name,
            type_name,
        })
    }
}

impl Comment {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let target = get_object_target(parser)?;
        let text = parser.get_string("comment text")?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            target,
            text,
        })
    }
}

impl AttributeDefinition {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let token = parser.get_token()?;
        let object_kind = match token.ttype {
            DbcTokenType::Keyword(Keyword::Nodes) => ObjectKind::Node,
            DbcTokenType::Keyword(Keyword::Message) => ObjectKind::Message,
            DbcTokenType::Keyword(Keyword::Signal) => ObjectKind::Signal,
            DbcTokenType::Keyword(Keyword::EnvVar) => ObjectKind::EnvVar,
            _ => {
                parser.undo_get_token();
                ObjectKind::General
            }
        };
        let name = get_attribute_name(parser)?;

        let token = parser.get_token()?;
        let value_type = match token.ttype {
            DbcTokenType::Keyword(Keyword::Int) => AttributeValueType::Int {
                min: parser.get_integer("minimum")?,
                max: parser.get_integer("maximum")?,
            },
            DbcTokenType::Keyword(Keyword::Hex) => AttributeValueType::Hex {
                min: parser.get_hex("minimum")?,
                max: parser.get_hex("maximum")?,
            },
            DbcTokenType::Keyword(Keyword::Float) => AttributeValueType::Float {
                min: parser.get_double("minimum")?,
                max: parser.get_double("maximum")?,
            },
            DbcTokenType::Keyword(Keyword::String) => AttributeValueType::String,
            DbcTokenType::Keyword(Keyword::Enum) => {
                let mut values = vec![];
                if parser.peek_token()?.ttype == DbcTokenType::String {
                    values.push(parser.get_string("enum value")?);
                    while parser.accept_punct(Punct::Comma)? {
                        values.push(parser.get_string("enum value")?);
                    }
                }
                AttributeValueType::Enum(values)
            }
            _ => {
                return Err(ParserError::unexpected_token(
                    parser,
                    "attribute value type",
                    &token,
                ));
            }
        };
        parser.expect_punct(Punct::Semicolon)?;

        Ok(Self {
            location,
            object_kind,
            name,
            value_type,
        })
    }
}

impl AttributeDefault {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let name = get_attribute_name(parser)?;
        let value = get_attribute_literal(parser)?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            name,
            value,
        })
    }
}

impl AttributeValue {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let name = get_attribute_name(parser)?;
        let target = get_object_target(parser)?;
        let value = get_attribute_literal(parser)?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            name,
            target,
            value,
        })
    }
}

impl ValueEncoding {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let target = if parser.peek_token()?.ttype == DbcTokenType::Number {
            ValueEncodingTarget::Signal {
                message_id: parser.get_integer("message id")?,
                signal_name: parser.get_identifier("signal name")?,
            }
        } else {
            ValueEncodingTarget::EnvVar(parser.get_identifier("environment variable name")?)
        };
        let values = get_value_descriptions(parser)?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            target,
            values,
        })
    }
}

impl SignalGroup {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let message_id = parser.get_integer("message id")?;
        let name = parser.get_identifier("signal group name")?;
        let repetitions = parser.get_integer("repetitions")?;
        parser.expect_punct(Punct::Colon)?;
        let signal_names = get_names(parser)?;
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            message_id,
            name,
            repetitions,
            signal_names,
        })
    }
}

impl SignalExtValueType {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let message_id = parser.get_integer("message id")?;
        let signal_name = parser.get_identifier("signal name")?;
        // the colon is missing in some files
        parser.accept_punct(Punct::Colon)?;
        let token = parser.peek_token()?;
        let code = parser.get_integer("signal value type")?;
        let Some(value_type) = ExtValueType::from_code(code) else {
            return Err(ParserError::invalid_value(parser, "signal value type", &token));
        };
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            message_id,
            signal_name,
            value_type,
        })
    }
}

impl ExtendedMux {
    fn parse<R: BufRead>(
        parser: &mut ParserState<R>,
        location: Location,
    ) -> Result<Self, ParserError> {
        let message_id = parser.get_integer("message id")?;
        let multiplexed_signal = parser.get_identifier("multiplexed signal name")?;
        let multiplexor_signal = parser.get_identifier("multiplexor signal name")?;
        let mut ranges = vec![];
        loop {
            let (token, from, to) = parser.get_range("multiplexer value range")?;
            ranges.push(ExtendedMuxRange {
                location: parser.location(&token),
                from,
                to,
            });
            if !parser.accept_punct(Punct::Comma)? {
                break;
            }
        }
        parser.expect_punct(Punct::Semicolon)?;
        Ok(Self {
            location,
            message_id,
            multiplexed_signal,
            multiplexor_signal,
            ranges,
        })
    }
}

// zero or more names, e.g. the nodes in BU_
fn get_names<R: BufRead>(parser: &mut ParserState<R>) -> Result<Vec<String>, ParserError> {
    let mut names = vec![];
    loop {
        let token = parser.get_token()?;
        match token.ttype {
            DbcTokenType::Identifier | DbcTokenType::MuxIndicator => names.push(token.text),
            _ => {
                parser.undo_get_token();
                break;
            }
        }
    }
    Ok(names)
}

// zero or more pairs of <value> "<description>"
fn get_value_descriptions<R: BufRead>(
    parser: &mut ParserState<R>,
) -> Result<Vec<ValueDescription>, ParserError> {
    let mut values = vec![];
    while parser.peek_token()?.ttype == DbcTokenType::Number {
        let token = parser.peek_token()?;
        let id = parser.get_integer("value")?;
        let name = parser.get_string("value description")?;
        values.push(ValueDescription {
            location: parser.location(&token),
            id,
            name,
        });
    }
    Ok(values)
}

fn get_byte_order<R: BufRead>(parser: &mut ParserState<R>) -> Result<ByteOrder, ParserError> {
    let token = parser.peek_token()?;
    let code = parser.get_integer("byte order")?;
    ByteOrder::from_code(code).ok_or_else(|| ParserError::invalid_value(parser, "byte order", &token))
}

fn get_value_type<R: BufRead>(parser: &mut ParserState<R>) -> Result<ValueType, ParserError> {
    let token = parser.get_token()?;
    match token.ttype {
        DbcTokenType::Punct(Punct::Plus) => Ok(ValueType::Unsigned),
        DbcTokenType::Punct(Punct::Minus) => Ok(ValueType::Signed),
        _ => Err(ParserError::unexpected_token(
            parser,
            "value type '+' or '-'",
            &token,
        )),
    }
}

// ( <factor> , <offset> )
fn get_factor_offset<R: BufRead>(parser: &mut ParserState<R>) -> Result<(f64, f64), ParserError> {
    parser.expect_punct(Punct::LeftParen)?;
    let factor = parser.get_double("factor")?;
    parser.expect_punct(Punct::Comma)?;
    let offset = parser.get_double("offset")?;
    parser.expect_punct(Punct::RightParen)?;
    Ok((factor, offset))
}

// [ <min> | <max> ]
fn get_limits<R: BufRead>(parser: &mut ParserState<R>) -> Result<(f64, f64), ParserError> {
    parser.expect_punct(Punct::LeftBracket)?;
    let min = parser.get_double("minimum")?;
    parser.expect_punct(Punct::Pipe)?;
    let max = parser.get_double("maximum")?;
    parser.expect_punct(Punct::RightBracket)?;
    Ok((min, max))
}

// optional object reference of CM_ and BA_; without one the statement applies to the whole file
fn get_object_target<R: BufRead>(
    parser: &mut ParserState<R>,
) -> Result<ObjectTarget, ParserError> {
    let token = parser.get_token()?;
    let target = match token.ttype {
        DbcTokenType::Keyword(Keyword::Nodes) => {
            ObjectTarget::Node(parser.get_identifier("node name")?)
        }
        DbcTokenType::Keyword(Keyword::Message) => {
            ObjectTarget::Message(parser.get_integer("message id")?)
        }
        DbcTokenType::Keyword(Keyword::Signal) => ObjectTarget::Signal {
            message_id: parser.get_integer("message id")?,
            signal_name: parser.get_identifier("signal name")?,
        },
        DbcTokenType::Keyword(Keyword::EnvVar) => {
            ObjectTarget::EnvVar(parser.get_identifier("environment variable name")?)
        }
        _ => {
            parser.undo_get_token();
            ObjectTarget::General
        }
    };
    Ok(target)
}

fn get_attribute_name<R: BufRead>(parser: &mut ParserState<R>) -> Result<String, ParserError> {
    let token = parser.peek_token()?;
    let name = parser.get_string("attribute name")?;
    if name.contains(char::is_whitespace) {
        return Err(ParserError::invalid_value(parser, "attribute name", &token));
    }
    Ok(name)
}

// The type of an attribute value is not stated in the file. It is derived from the form of the token:
// a string, a 0x-prefixed hex number, a number with a decimal point or exponent, or an integer.
fn get_attribute_literal<R: BufRead>(
    parser: &mut ParserState<R>,
) -> Result<AttributeLiteral, ParserError> {
    let token = parser.get_token()?;
    match token.ttype {
        DbcTokenType::String => Ok(AttributeLiteral::String(token.text)),
        DbcTokenType::Number => {
            let text = &token.text;
            if text.starts_with("0x") || text.starts_with("0X") {
                Ok(AttributeLiteral::Hex(
                    parser.convert_hex(&token, "attribute value")?,
                ))
            } else if text.contains(['.', 'e', 'E']) {
                Ok(AttributeLiteral::Float(
                    parser.convert_double(&token, "attribute value")?,
                ))
            } else {
                Ok(AttributeLiteral::Int(parser.convert_integer(
                    &token,
                    text,
                    "attribute value",
                )?))
            }
        }
        _ => Err(ParserError::unexpected_token(
            parser,
            "attribute value",
            &token,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<DbcFile, ParserError> {
        ParserState::new(text.as_bytes(), "test.dbc", false).parse_file()
    }

    fn parse_hex(text: &str) -> Result<DbcFile, ParserError> {
        ParserState::new(text.as_bytes(), "test.dbc", true).parse_file()
    }

    #[test]
    fn header_sections() {
        let dbc = parse("VERSION \"1.0\"\nNS_ :\n\tNS_DESC_\n\tCM_\n\tBA_DEF_\n\nBS_: 500 : 12, 34\nBU_: ECU1 ECU2\n").unwrap();
        assert_eq!(dbc.version, "1.0");
        let new_symbols = dbc.new_symbols.unwrap();
        assert_eq!(new_symbols.symbols, vec!["NS_DESC_", "CM_", "BA_DEF_"]);
        assert_eq!(new_symbols.location.line, 2);
        assert_eq!(dbc.bit_timing.unwrap(), BitTiming::new(500, 12, 34));
        assert_eq!(dbc.nodes.unwrap().names, vec!["ECU1", "ECU2"]);
    }

    #[test]
    fn invalid_new_symbol() {
        let err = parse("NS_ :\n\tNS_DESC_\n\tFOO_\n").unwrap_err();
        assert!(matches!(err, ParserError::InvalidNewSymbol { line: 3, .. }));
        assert!(err.to_string().contains("invalid new symbol"));
    }

    #[test]
    fn duplicate_sections() {
        for text in [
            "VERSION \"\" VERSION \"\"",
            "NS_ : NS_ :",
            "BS_: BS_:",
            "BU_: A BU_: B",
        ] {
            let err = parse(text).unwrap_err();
            assert!(matches!(err, ParserError::DuplicateSection { .. }));
            assert!(err.to_string().contains("duplicated"));
        }
    }

    #[test]
    fn message_and_signals() {
        let dbc = parse(
            r#"BO_ 2364540158 EEC1: 8 Engine
 SG_ EngineSpeed : 24|16@1+ (0.125,0) [0|8031.875] "rpm" Vector__XXX
 SG_ Torque m2 : 8|8@0- (1,-125) [-125|125] "%" Gateway, Dash
 SG_ Mode M : 0|2@1+ (1,0) [0|3] "" Gateway
"#,
        )
        .unwrap();
        let msg = dbc.messages.get(&2364540158).unwrap();
        assert_eq!(msg.name, "EEC1");
        assert_eq!(msg.size, 8);
        assert_eq!(msg.transmitter, "Engine");
        assert_eq!(msg.signals.len(), 3);

        let speed = msg.signals.get("EngineSpeed").unwrap();
        assert_eq!(speed.start_bit, 24);
        assert_eq!(speed.size, 16);
        assert_eq!(speed.byte_order, ByteOrder::LittleEndian);
        assert_eq!(speed.value_type, ValueType::Unsigned);
        assert_eq!(speed.factor, 0.125);
        assert_eq!(speed.max, 8031.875);
        assert_eq!(speed.unit, "rpm");
        assert_eq!(speed.location.line, 2);

        let torque = msg.signals.get("Torque").unwrap();
        assert!(torque.is_multiplexed);
        assert!(!torque.is_multiplexor);
        assert_eq!(torque.mux_switch_value, 2);
        assert_eq!(torque.byte_order, ByteOrder::BigEndian);
        assert_eq!(torque.value_type, ValueType::Signed);
        assert_eq!(torque.offset, -125.0);
        assert_eq!(torque.receivers, vec!["Gateway", "Dash"]);

        let mode = msg.signals.get("Mode").unwrap();
        assert!(mode.is_multiplexor);
        assert!(!mode.is_multiplexed);
    }

    #[test]
    fn bad_byte_order() {
        let err = parse("BO_ 1 M: 8 E\n SG_ S : 0|8@2+ (1,0) [0|1] \"\" E\n").unwrap_err();
        assert!(matches!(err, ParserError::InvalidValue { line: 2, .. }));
        assert!(err.to_string().contains("byte order"));
    }

    #[test]
    fn environment_variables() {
        let dbc = parse(
            "EV_ Temp : 1 [-40|215.5] \"degC\" 20 7 DUMMY_NODE_VECTOR8001 ECU1, ECU2;\nENVVAR_DATA_ Temp : 4;\n",
        )
        .unwrap();
        let env_var = dbc.env_vars.get("Temp").unwrap();
        assert_eq!(env_var.var_type, EnvVarType::Float);
        assert_eq!(env_var.min, -40.0);
        assert_eq!(env_var.max, 215.5);
        assert_eq!(env_var.initial_value, 20.0);
        assert_eq!(env_var.id, 7);
        assert_eq!(env_var.access_type, EnvVarAccessType::ReadString);
        assert_eq!(env_var.access_nodes, vec!["ECU1", "ECU2"]);
        assert_eq!(dbc.env_var_data[0], EnvVarData::new("Temp".to_string(), 4));

        let err = parse("EV_ X : 3 [0|1] \"\" 0 0 DUMMY_NODE_VECTOR0 A;").unwrap_err();
        assert!(err.to_string().contains("environment variable type"));
        let err = parse("EV_ X : 0 [0|1] \"\" 0 0 DUMMY_NODE_VECTOR9 A;").unwrap_err();
        assert!(err.to_string().contains("access type"));
    }

    #[test]
    fn signal_types() {
        let dbc = parse(
            "SGTYPE_ Speed : 16@1+ (0.1,0) [0|6553.5] \"km/h\" 0, SpeedTable;\nSGTYPE_ T2 : 4|8@0- (1,0) [0|0] \"\" 1.5, ;\nSGTYPE_ 100 VehSpeed : Speed;\n",
        )
        .unwrap();
        let speed = dbc.signal_types.get("Speed").unwrap();
        assert_eq!(speed.size, 16);
        assert_eq!(speed.factor, 0.1);
        assert_eq!(speed.value_table, "SpeedTable");
        // the start bit is dropped
        let t2 = dbc.signal_types.get("T2").unwrap();
        assert_eq!(t2.size, 8);
        assert_eq!(t2.default_value, 1.5);
        assert_eq!(t2.value_table, "");
        assert_eq!(
            dbc.signal_type_refs[0],
            SignalTypeRef::new(100, "VehSpeed".to_string(), "Speed".to_string())
        );
    }

    #[test]
    fn comments() {
        let dbc = parse(
            "CM_ \"file\";\nCM_ BU_ ECU \"node\";\nCM_ BO_ 10 \"msg\";\nCM_ SG_ 10 Sig \"signal\nwith two lines\";\nCM_ EV_ Var \"envvar\";\n",
        )
        .unwrap();
        let targets: Vec<&ObjectTarget> = dbc.comments.iter().map(|c| &c.target).collect();
        assert_eq!(
            targets,
            vec![
                &ObjectTarget::General,
                &ObjectTarget::Node("ECU".to_string()),
                &ObjectTarget::Message(10),
                &ObjectTarget::Signal {
                    message_id: 10,
                    signal_name: "Sig".to_string()
                },
                &ObjectTarget::EnvVar("Var".to_string()),
            ]
        );
        assert_eq!(dbc.comments[3].text, "signal\nwith two lines");
        assert_eq!(dbc.comments[4].location.line, 6);
    }

    #[test]
    fn attribute_definitions() {
        let dbc = parse(
            r#"BA_DEF_ "BusType" STRING;
BA_DEF_ BU_ "NodeLayer" INT -10 10;
BA_DEF_ BO_ "Cycle" FLOAT 0.5 1e3;
BA_DEF_ SG_ "Mask" HEX 0 255;
BA_DEF_ EV_ "Mode" ENUM "a","b", "c";
BA_DEF_ "Empty" ENUM;
"#,
        )
        .unwrap();
        let defs = &dbc.attribute_definitions;
        assert_eq!(defs.len(), 6);
        assert_eq!(defs[0].object_kind, ObjectKind::General);
        assert_eq!(defs[0].value_type, AttributeValueType::String);
        assert_eq!(defs[1].object_kind, ObjectKind::Node);
        assert_eq!(
            defs[1].value_type,
            AttributeValueType::Int { min: -10, max: 10 }
        );
        assert_eq!(
            defs[2].value_type,
            AttributeValueType::Float {
                min: 0.5,
                max: 1000.0
            }
        );
        assert_eq!(defs[3].object_kind, ObjectKind::Signal);
        assert_eq!(defs[3].value_type, AttributeValueType::Hex { min: 0, max: 255 });
        assert_eq!(defs[4].object_kind, ObjectKind::EnvVar);
        assert_eq!(
            defs[4].value_type,
            AttributeValueType::Enum(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(defs[5].value_type, AttributeValueType::Enum(vec![]));

        let err = parse("BA_DEF_ \"Bad Name\" STRING;").unwrap_err();
        assert!(err.to_string().contains("invalid attribute name"));
    }

    #[test]
    fn attribute_literals() {
        let dbc = parse(
            "BA_DEF_DEF_ \"A\" \"text\";\nBA_DEF_DEF_ \"B\" -3;\nBA_DEF_DEF_ \"C\" 2.5;\nBA_DEF_DEF_ \"D\" 1e2;\nBA_ \"B\" BU_ ECU 4;\nBA_ \"C\" SG_ 1 Sig 0.0;\nBA_ \"A\" \"x\";\n",
        )
        .unwrap();
        let values: Vec<&AttributeLiteral> =
            dbc.attribute_defaults.iter().map(|a| &a.value).collect();
        assert_eq!(
            values,
            vec![
                &AttributeLiteral::String("text".to_string()),
                &AttributeLiteral::Int(-3),
                &AttributeLiteral::Float(2.5),
                &AttributeLiteral::Float(100.0),
            ]
        );
        assert_eq!(
            dbc.attribute_values[0],
            AttributeValue::new(
                "B".to_string(),
                ObjectTarget::Node("ECU".to_string()),
                AttributeLiteral::Int(4)
            )
        );
        assert_eq!(dbc.attribute_values[1].value, AttributeLiteral::Float(0.0));
        assert_eq!(dbc.attribute_values[2].target, ObjectTarget::General);
    }

    #[test]
    fn hex_attribute_literals() {
        let dbc = parse_hex("BA_DEF_ BO_ \"Mask\" HEX 0x0 0xFF;\nBA_ \"Mask\" BO_ 5 0x1f;\n").unwrap();
        assert_eq!(
            dbc.attribute_definitions[0].value_type,
            AttributeValueType::Hex { min: 0, max: 255 }
        );
        assert_eq!(dbc.attribute_values[0].value, AttributeLiteral::Hex(0x1f));

        // hex limits need the 0x prefix when hex numbers are enabled
        assert!(parse_hex("BA_DEF_ \"Mask\" HEX 0 255;").is_err());
        // and are rejected without it
        assert!(parse("BA_ \"Mask\" BO_ 5 0x1f;").is_err());
    }

    #[test]
    fn value_descriptions() {
        let dbc = parse(
            "VAL_TABLE_ Onoff 1 \"on\" 0 \"off\" ;\nVAL_ 256 Sig 0 \"off\" 1 \"on\";\nVAL_ Var 2 \"two\";\n",
        )
        .unwrap();
        let table = dbc.value_tables.get("Onoff").unwrap();
        assert_eq!(table.values.len(), 2);
        assert_eq!(table.values[0], ValueDescription::new(1, "on".to_string()));
        assert_eq!(
            dbc.value_encodings[0].target,
            ValueEncodingTarget::Signal {
                message_id: 256,
                signal_name: "Sig".to_string()
            }
        );
        assert_eq!(dbc.value_encodings[0].values.len(), 2);
        assert_eq!(
            dbc.value_encodings[1].target,
            ValueEncodingTarget::EnvVar("Var".to_string())
        );
    }

    #[test]
    fn transmitters_groups_and_value_types() {
        let dbc = parse(
            "BO_TX_BU_ 100 : ECU1,ECU2 ECU3;\nSIG_GROUP_ 100 Group1 1 : SigA SigB;\nSIG_VALTYPE_ 100 SigA : 1;\nSIG_VALTYPE_ 100 SigB 2;\n",
        )
        .unwrap();
        assert_eq!(
            dbc.message_transmitters[0].transmitters,
            vec!["ECU1", "ECU2", "ECU3"]
        );
        assert_eq!(
            dbc.signal_groups[0],
            SignalGroup::new(
                100,
                "Group1".to_string(),
                1,
                vec!["SigA".to_string(), "SigB".to_string()]
            )
        );
        assert_eq!(dbc.signal_ext_value_types[0].value_type, ExtValueType::Float);
        assert_eq!(dbc.signal_ext_value_types[1].value_type, ExtValueType::Double);

        let err = parse("SIG_VALTYPE_ 100 SigA : 3;").unwrap_err();
        assert!(err.to_string().contains("signal value type"));
    }

    #[test]
    fn extended_multiplexing() {
        let dbc = parse("SG_MUL_VAL_ 42 Mx Sw 0-3, 5-7, 10-10;").unwrap();
        let ext_mux = &dbc.extended_muxes[0];
        assert_eq!(ext_mux.message_id, 42);
        assert_eq!(ext_mux.multiplexed_signal, "Mx");
        assert_eq!(ext_mux.multiplexor_signal, "Sw");
        let ranges: Vec<(u32, u32)> = ext_mux.ranges.iter().map(|r| (r.from, r.to)).collect();
        assert_eq!(ranges, vec![(0, 3), (5, 7), (10, 10)]);

        // a single value is not a range
        assert!(parse("SG_MUL_VAL_ 42 Mx Sw 3;").is_err());
    }

    #[test]
    fn unexpected_tokens() {
        let err = parse("VERSION \"\"\nfoo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error at test.dbc:2:1; expected keyword: \"foo\""
        );
        let err = parse("SG_ S : 0|8@1+ (1,0) [0|1] \"\" E").unwrap_err();
        assert!(matches!(err, ParserError::UnexpectedToken { line: 1, column: 1, .. }));
        let err = parse("BO_ 1 M: 8").unwrap_err();
        assert!(err.to_string().contains("expected transmitter name"));
    }
}
