use crate::attributes::DUMMY_NODE;
use crate::document::{
    AttributeDefault, AttributeDefinition, AttributeLiteral, AttributeValue, AttributeValueType,
    BitTiming, Comment, DbcFile, EnvVar, EnvVarData, ExtendedMux, Message, MessageTransmitter,
    NewSymbols, Nodes, ObjectKind, ObjectTarget, Signal, SignalExtValueType, SignalGroup,
    SignalType, SignalTypeRef, ValueDescription, ValueEncoding, ValueEncodingTarget, ValueTable,
};
use crate::keywords::{Keyword, NEW_SYMBOLS};

#[derive(Debug)]
pub(crate) struct Writer {
    hex_numbers: bool,
    outstring: String,
}

impl Writer {
    pub(crate) fn new(hex_numbers: bool) -> Self {
        Self {
            hex_numbers,
            outstring: String::with_capacity(4096),
        }
    }

    pub(crate) fn add_str(&mut self, text: &str) {
        self.outstring.push_str(text);
    }

    pub(crate) fn add_keyword(&mut self, keyword: Keyword) {
        self.outstring.push_str(keyword.as_str());
    }

    // dbc strings have no escape sequences
    pub(crate) fn add_quoted_string(&mut self, value: &str) {
        self.outstring.push('"');
        self.outstring.push_str(value);
        self.outstring.push('"');
    }

    pub(crate) fn add_integer<T: ToString>(&mut self, value: T) {
        self.outstring.push_str(&value.to_string());
    }

    // shortest representation that reads back as the same value; never uses an exponent
    pub(crate) fn add_double(&mut self, value: f64) {
        self.outstring.push_str(&value.to_string());
    }

    /// a float attribute value always contains a decimal point, otherwise it would be read back as an integer
    pub(crate) fn add_float_literal(&mut self, value: f64) {
        let text = value.to_string();
        self.outstring.push_str(&text);
        if value.is_finite() && !text.contains('.') {
            self.outstring.push_str(".0");
        }
    }

    pub(crate) fn add_hex(&mut self, value: u32) {
        if self.hex_numbers {
            self.outstring.push_str("0x");
            self.outstring.push_str(&format!("{value:x}"));
        } else {
            self.add_integer(value);
        }
    }

    /// a node name; empty names are replaced by the placeholder node
    pub(crate) fn add_node_name(&mut self, name: &str) {
        if name.is_empty() {
            self.outstring.push_str(DUMMY_NODE);
        } else {
            self.outstring.push_str(name);
        }
    }

    // a list of node names with separator; an empty list is written as the placeholder node
    pub(crate) fn add_node_list(&mut self, names: &[String], separator: &str) {
        if names.is_empty() {
            self.outstring.push_str(DUMMY_NODE);
        }
        for (idx, name) in names.iter().enumerate() {
            if idx > 0 {
                self.outstring.push_str(separator);
            }
            self.add_node_name(name);
        }
    }

    // an optional list of names, written as is
    pub(crate) fn add_name_list(&mut self, names: &[String], separator: &str) {
        self.outstring.push_str(&names.join(separator));
    }

    pub(crate) fn add_value_descriptions(&mut self, values: &[ValueDescription]) {
        for value in values {
            self.outstring.push(' ');
            self.add_integer(value.id);
            self.outstring.push(' ');
            self.add_quoted_string(&value.name);
        }
    }

    pub(crate) fn newline(&mut self) {
        self.outstring.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.outstring
    }
}

// write all items of a section, followed by an empty line if there were any items
fn write_section<'a, T: 'a, I>(writer: &mut Writer, items: I, stringify: fn(&T, &mut Writer))
where
    I: IntoIterator<Item = &'a T>,
{
    let mut is_empty = true;
    for item in items {
        stringify(item, writer);
        is_empty = false;
    }
    if !is_empty {
        writer.newline();
    }
}

impl DbcFile {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::Version);
        writer.add_str(" ");
        if self.version.is_empty() {
            writer.add_quoted_string("_");
        } else {
            writer.add_quoted_string(&self.version);
        }
        writer.add_str("\n\n");

        match &self.new_symbols {
            Some(new_symbols) => new_symbols.stringify(writer),
            None => NewSymbols::new(NEW_SYMBOLS.iter().map(|s| s.to_string()).collect())
                .stringify(writer),
        }
        match &self.bit_timing {
            Some(bit_timing) => bit_timing.stringify(writer),
            None => BitTiming::new(0, 0, 0).stringify(writer),
        }
        if let Some(nodes) = &self.nodes {
            nodes.stringify(writer);
        }

        write_section(writer, &self.value_tables, ValueTable::stringify);
        write_section(writer, &self.messages, Message::stringify);
        write_section(
            writer,
            &self.message_transmitters,
            MessageTransmitter::stringify,
        );
        write_section(writer, &self.env_vars, EnvVar::stringify);
        write_section(writer, &self.env_var_data, EnvVarData::stringify);
        write_section(writer, &self.signal_types, SignalType::stringify);
        write_section(writer, &self.comments, Comment::stringify);
        write_section(
            writer,
            &self.attribute_definitions,
            AttributeDefinition::stringify,
        );
        write_section(writer, &self.attribute_defaults, AttributeDefault::stringify);
        write_section(writer, &self.attribute_values, AttributeValue::stringify);
        write_section(writer, &self.value_encodings, ValueEncoding::stringify);
        write_section(writer, &self.signal_type_refs, SignalTypeRef::stringify);
        write_section(writer, &self.signal_groups, SignalGroup::stringify);
        write_section(
            writer,
            &self.signal_ext_value_types,
            SignalExtValueType::stringify,
        );
        write_section(writer, &self.extended_muxes, ExtendedMux::stringify);
    }
}

impl NewSymbols {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::NewSymbols);
        writer.add_str(":\n");
        for symbol in &self.symbols {
            writer.add_str("\t");
            writer.add_str(symbol);
            writer.newline();
        }
        writer.newline();
    }
}

impl BitTiming {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::BitTiming);
        writer.add_str(":");
        if !self.is_empty() {
            writer.add_str(" ");
            writer.add_integer(self.baudrate);
            writer.add_str(" : ");
            writer.add_integer(self.register1);
            writer.add_str(", ");
            writer.add_integer(self.register2);
        }
        writer.add_str("\n\n");
    }
}

impl Nodes {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::Nodes);
        writer.add_str(":");
        for name in &self.names {
            writer.add_str(" ");
            writer.add_str(name);
        }
        writer.add_str("\n\n");
    }
}

impl ValueTable {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::ValueTable);
        writer.add_str(" ");
        writer.add_str(&self.name);
        writer.add_value_descriptions(&self.values);
        writer.add_str(";\n");
    }
}

impl Message {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::Message);
        writer.add_str(" ");
        writer.add_integer(self.id);
        writer.add_str(" ");
        writer.add_str(&self.name);
        writer.add_str(" : ");
        writer.add_integer(self.size);
        writer.add_str(" ");
        writer.add_node_name(&self.transmitter);
        writer.newline();
        for signal in &self.signals {
            signal.stringify(writer);
        }
        writer.newline();
    }
}

impl Signal {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_str("\t");
        writer.add_keyword(Keyword::Signal);
        writer.add_str(" ");
        writer.add_str(&self.name);
        if self.is_multiplexed {
            writer.add_str(" m");
            writer.add_integer(self.mux_switch_value);
            if self.is_multiplexor {
                writer.add_str("M");
            }
        } else if self.is_multiplexor {
            writer.add_str(" M");
        }
        writer.add_str(" : ");
        writer.add_integer(self.start_bit);
        writer.add_str("|");
        writer.add_integer(self.size);
        writer.add_str("@");
        writer.add_integer(self.byte_order.code());
        writer.add_str(&self.value_type.sign_char().to_string());
        writer.add_str(" (");
        writer.add_double(self.factor);
        writer.add_str(",");
        writer.add_double(self.offset);
        writer.add_str(") [");
        writer.add_double(self.min);
        writer.add_str("|");
        writer.add_double(self.max);
        writer.add_str("] ");
        writer.add_quoted_string(&self.unit);
        writer.add_str(" ");
        writer.add_node_list(&self.receivers, ", ");
        writer.newline();
    }
}

impl MessageTransmitter {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::MessageTransmitter);
        writer.add_str(" ");
        writer.add_integer(self.message_id);
        writer.add_str(" : ");
        writer.add_name_list(&self.transmitters, ",");
        writer.add_str(";\n");
    }
}

impl EnvVar {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::EnvVar);
        writer.add_str(" ");
        writer.add_str(&self.name);
        writer.add_str(" : ");
        writer.add_integer(self.var_type.code());
        writer.add_str(" [");
        writer.add_double(self.min);
        writer.add_str("|");
        writer.add_double(self.max);
        writer.add_str("] ");
        writer.add_quoted_string(&self.unit);
        writer.add_str(" ");
        writer.add_double(self.initial_value);
        writer.add_str(" ");
        writer.add_integer(self.id);
        writer.add_str(" ");
        writer.add_str(self.access_type.tag());
        writer.add_str(" ");
        writer.add_node_list(&self.access_nodes, ",");
        writer.add_str(";\n");
    }
}

impl EnvVarData {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::EnvVarData);
        writer.add_str(" ");
        writer.add_str(&self.env_var_name);
        writer.add_str(" : ");
        writer.add_integer(self.data_size);
        writer.add_str(";\n");
    }
}

impl SignalType {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::SignalType);
        writer.add_str(" ");
        writer.add_str(&self.name);
        writer.add_str(" : ");
        writer.add_integer(self.size);
        writer.add_str("@");
        writer.add_integer(self.byte_order.code());
        writer.add_str(&self.value_type.sign_char().to_string());
        writer.add_str(" (");
        writer.add_double(self.factor);
        writer.add_str(",");
        writer.add_double(self.offset);
        writer.add_str(") [");
        writer.add_double(self.min);
        writer.add_str("|");
        writer.add_double(self.max);
        writer.add_str("] ");
        writer.add_quoted_string(&self.unit);
        writer.add_str(" ");
        writer.add_double(self.default_value);
        writer.add_str(", ");
        writer.add_str(&self.value_table);
        writer.add_str(";\n");
    }
}

impl SignalTypeRef {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::SignalType);
        writer.add_str(" ");
        writer.add_integer(self.message_id);
        writer.add_str(" ");
        writer.add_str(&self.signal_name);
        writer.add_str(" : ");
        writer.add_str(&self.type_name);
        writer.add_str(";\n");
    }
}

impl ObjectTarget {
    // writes the target followed by a space, or nothing for the general target
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        match self {
            ObjectTarget::General => {}
            ObjectTarget::Node(name) => {
                writer.add_keyword(Keyword::Nodes);
                writer.add_str(" ");
                writer.add_str(name);
                writer.add_str(" ");
            }
            ObjectTarget::Message(id) => {
                writer.add_keyword(Keyword::Message);
                writer.add_str(" ");
                writer.add_integer(*id);
                writer.add_str(" ");
            }
            ObjectTarget::Signal {
                message_id,
                signal_name,
            } => {
                writer.add_keyword(Keyword::Signal);
                writer.add_str(" ");
                writer.add_integer(*message_id);
                writer.add_str(" ");
                writer.add_str(signal_name);
                writer.add_str(" ");
            }
            ObjectTarget::EnvVar(name) => {
                writer.add_keyword(Keyword::EnvVar);
                writer.add_str(" ");
                writer.add_str(name);
                writer.add_str(" ");
            }
        }
    }
}

impl Comment {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::Comment);
        writer.add_str(" ");
        self.target.stringify(writer);
        writer.add_quoted_string(&self.text);
        writer.add_str(";\n");
    }
}

impl AttributeDefinition {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::AttributeDefinition);
        writer.add_str(" ");
        let kind_keyword = match self.object_kind {
            ObjectKind::General => None,
            ObjectKind::Node => Some(Keyword::Nodes),
            ObjectKind::Message => Some(Keyword::Message),
            ObjectKind::Signal => Some(Keyword::Signal),
            ObjectKind::EnvVar => Some(Keyword::EnvVar),
        };
        if let Some(keyword) = kind_keyword {
            writer.add_keyword(keyword);
            writer.add_str(" ");
        }
        writer.add_quoted_string(&self.name);
        writer.add_str(" ");

        match &self.value_type {
            AttributeValueType::Int { min, max } => {
                writer.add_keyword(Keyword::Int);
                writer.add_str(" ");
                writer.add_integer(*min);
                writer.add_str(" ");
                writer.add_integer(*max);
            }
            AttributeValueType::Hex { min, max } => {
                writer.add_keyword(Keyword::Hex);
                writer.add_str(" ");
                writer.add_hex(*min);
                writer.add_str(" ");
                writer.add_hex(*max);
            }
            AttributeValueType::Float { min, max } => {
                writer.add_keyword(Keyword::Float);
                writer.add_str(" ");
                writer.add_double(*min);
                writer.add_str(" ");
                writer.add_double(*max);
            }
            AttributeValueType::String => writer.add_keyword(Keyword::String),
            AttributeValueType::Enum(values) => {
                writer.add_keyword(Keyword::Enum);
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        writer.add_str(",");
                    }
                    writer.add_str(" ");
                    writer.add_quoted_string(value);
                }
            }
        }
        writer.add_str(";\n");
    }
}

impl AttributeLiteral {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        match self {
            AttributeLiteral::Int(value) => writer.add_integer(*value),
            AttributeLiteral::Hex(value) => writer.add_hex(*value),
            AttributeLiteral::Float(value) => writer.add_float_literal(*value),
            AttributeLiteral::String(value) => writer.add_quoted_string(value),
        }
    }
}

impl AttributeDefault {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::AttributeDefault);
        writer.add_str(" ");
        writer.add_quoted_string(&self.name);
        writer.add_str(" ");
        self.value.stringify(writer);
        writer.add_str(";\n");
    }
}

impl AttributeValue {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::AttributeValue);
        writer.add_str(" ");
        writer.add_quoted_string(&self.name);
        writer.add_str(" ");
        self.target.stringify(writer);
        self.value.stringify(writer);
        writer.add_str(";\n");
    }
}

impl ValueEncoding {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::ValueEncoding);
        writer.add_str(" ");
        match &self.target {
            ValueEncodingTarget::Signal {
                message_id,
                signal_name,
            } => {
                writer.add_integer(*message_id);
                writer.add_str(" ");
                writer.add_str(signal_name);
            }
            ValueEncodingTarget::EnvVar(name) => writer.add_str(name),
        }
        writer.add_value_descriptions(&self.values);
        writer.add_str(";\n");
    }
}

impl SignalGroup {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::SignalGroup);
        writer.add_str(" ");
        writer.add_integer(self.message_id);
        writer.add_str(" ");
        writer.add_str(&self.name);
        writer.add_str(" ");
        writer.add_integer(self.repetitions);
        writer.add_str(" :");
        for name in &self.signal_names {
            writer.add_str(" ");
            writer.add_str(name);
        }
        writer.add_str(";\n");
    }
}

impl SignalExtValueType {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::SignalValueType);
        writer.add_str(" ");
        writer.add_integer(self.message_id);
        writer.add_str(" ");
        writer.add_str(&self.signal_name);
        writer.add_str(" : ");
        writer.add_integer(self.value_type.code());
        writer.add_str(";\n");
    }
}

impl ExtendedMux {
    pub(crate) fn stringify(&self, writer: &mut Writer) {
        writer.add_keyword(Keyword::ExtendedMux);
        writer.add_str(" ");
        writer.add_integer(self.message_id);
        writer.add_str(" ");
        writer.add_str(&self.multiplexed_signal);
        writer.add_str(" ");
        writer.add_str(&self.multiplexor_signal);
        for (idx, range) in self.ranges.iter().enumerate() {
            if idx > 0 {
                writer.add_str(",");
            }
            writer.add_str(" ");
            writer.add_integer(range.from);
            writer.add_str("-");
            writer.add_integer(range.to);
        }
        writer.add_str(";\n");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::{ByteOrder, EnvVarAccessType, EnvVarType, ExtendedMuxRange, ValueType};

    fn stringify_with<F: FnOnce(&mut Writer)>(hex_numbers: bool, func: F) -> String {
        let mut writer = Writer::new(hex_numbers);
        func(&mut writer);
        writer.finish()
    }

    #[test]
    fn write_numbers() {
        let text = stringify_with(false, |writer| {
            writer.add_double(0.1);
            writer.add_str(" ");
            writer.add_double(-40.0);
            writer.add_str(" ");
            writer.add_double(1e-7);
            writer.add_str(" ");
            writer.add_double(3_600_000.0);
        });
        assert_eq!(text, "0.1 -40 0.0000001 3600000");

        let text = stringify_with(false, |writer| {
            writer.add_float_literal(5.0);
            writer.add_str(" ");
            writer.add_float_literal(2.25);
        });
        assert_eq!(text, "5.0 2.25");

        assert_eq!(stringify_with(true, |writer| writer.add_hex(0xAB)), "0xab");
        assert_eq!(stringify_with(false, |writer| writer.add_hex(0xAB)), "171");
    }

    #[test]
    fn write_node_lists() {
        let text = stringify_with(false, |writer| {
            writer.add_node_list(&[], ",");
            writer.add_str(" ");
            writer.add_node_list(&["A".to_string(), "B".to_string()], ", ");
            writer.add_str(" ");
            writer.add_node_name("");
            writer.add_str(" [");
            writer.add_name_list(&[], ",");
            writer.add_str("] [");
            writer.add_name_list(&["A".to_string(), "B".to_string()], ",");
            writer.add_str("]");
        });
        assert_eq!(text, "Vector__XXX A, B Vector__XXX [] [A,B]");
    }

    #[test]
    fn write_header() {
        let dbc = DbcFile::new();
        let text = stringify_with(false, |writer| dbc.stringify(writer));
        assert!(text.starts_with("VERSION \"_\"\n\nNS_:\n\tNS_DESC_\n\tCM_\n"));
        assert!(text.ends_with("\tSG_MUL_VAL_\n\nBS_:\n\n"));
        assert_eq!(text.matches('\t').count(), NEW_SYMBOLS.len());

        let mut dbc = DbcFile::new();
        dbc.version = "1.0".to_string();
        dbc.new_symbols = Some(NewSymbols::new(vec!["CM_".to_string()]));
        dbc.bit_timing = Some(BitTiming::new(500, 1, 2));
        dbc.nodes = Some(Nodes::new(vec!["A".to_string(), "B".to_string()]));
        let text = stringify_with(false, |writer| dbc.stringify(writer));
        assert_eq!(
            text,
            "VERSION \"1.0\"\n\nNS_:\n\tCM_\n\nBS_: 500 : 1, 2\n\nBU_: A B\n\n"
        );
    }

    #[test]
    fn write_message() {
        let mut msg = Message::new(100, "Msg".to_string(), 8, "A".to_string());
        let mut signal = Signal::new(
            "S".to_string(),
            0,
            8,
            ByteOrder::LittleEndian,
            ValueType::Unsigned,
        );
        signal.max = 255.0;
        signal.unit = "u".to_string();
        signal.receivers = vec!["B".to_string()];
        msg.signals.push(signal.clone());
        signal.name = "T".to_string();
        signal.is_multiplexor = true;
        signal.is_multiplexed = true;
        signal.mux_switch_value = 3;
        signal.byte_order = ByteOrder::BigEndian;
        signal.value_type = ValueType::Signed;
        signal.factor = 0.5;
        signal.offset = -10.0;
        signal.receivers.clear();
        msg.signals.push(signal);

        let text = stringify_with(false, |writer| msg.stringify(writer));
        assert_eq!(
            text,
            "BO_ 100 Msg : 8 A\n\tSG_ S : 0|8@1+ (1,0) [0|255] \"u\" B\n\tSG_ T m3M : 0|8@0- (0.5,-10) [0|255] \"u\" Vector__XXX\n\n"
        );
    }

    #[test]
    fn write_statements() {
        let mut env_var = EnvVar::new(
            "Var".to_string(),
            EnvVarType::Integer,
            EnvVarAccessType::ReadWrite,
        );
        env_var.max = 10.0;
        env_var.id = 3;
        env_var.access_nodes = vec!["A".to_string(), "B".to_string()];
        assert_eq!(
            stringify_with(false, |writer| env_var.stringify(writer)),
            "EV_ Var : 0 [0|10] \"\" 0 3 DUMMY_NODE_VECTOR3 A,B;\n"
        );

        let def = AttributeDefinition::new(
            ObjectKind::Message,
            "Mask".to_string(),
            AttributeValueType::Hex { min: 0, max: 255 },
        );
        assert_eq!(
            stringify_with(true, |writer| def.stringify(writer)),
            "BA_DEF_ BO_ \"Mask\" HEX 0x0 0xff;\n"
        );
        assert_eq!(
            stringify_with(false, |writer| def.stringify(writer)),
            "BA_DEF_ BO_ \"Mask\" HEX 0 255;\n"
        );

        let def = AttributeDefinition::new(
            ObjectKind::General,
            "Mode".to_string(),
            AttributeValueType::Enum(vec![]),
        );
        assert_eq!(
            stringify_with(false, |writer| def.stringify(writer)),
            "BA_DEF_ \"Mode\" ENUM;\n"
        );

        let value = AttributeValue::new(
            "Cycle".to_string(),
            ObjectTarget::Signal {
                message_id: 5,
                signal_name: "S".to_string(),
            },
            AttributeLiteral::Float(100.0),
        );
        assert_eq!(
            stringify_with(false, |writer| value.stringify(writer)),
            "BA_ \"Cycle\" SG_ 5 S 100.0;\n"
        );

        let ext_mux = ExtendedMux::new(
            42,
            "Mx".to_string(),
            "Sw".to_string(),
            vec![ExtendedMuxRange::new(0, 3), ExtendedMuxRange::new(5, 7)],
        );
        assert_eq!(
            stringify_with(false, |writer| ext_mux.stringify(writer)),
            "SG_MUL_VAL_ 42 Mx Sw 0-3, 5-7;\n"
        );

        let comment = Comment::new(ObjectTarget::General, "text".to_string());
        assert_eq!(
            stringify_with(false, |writer| comment.stringify(writer)),
            "CM_ \"text\";\n"
        );
    }
}
