use std::sync::Arc;

use crate::itemlist::{ItemKey, ItemList};

/// Position of an item in the input
///
/// The line is 1-based. The column counts the characters of the line up to and including
/// the first character of the item; tabs are not counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: Arc<str>,
    pub line: u32,
    pub column: u32,
}

/// Common access to the location information of every item in a dbc file
pub trait DbcObject {
    fn get_location(&self) -> &Location;

    fn get_location_mut(&mut self) -> &mut Location;

    fn get_line(&self) -> u32 {
        self.get_location().line
    }
}

// The location is not part of the comparison: two items are equal if their content is equal,
// regardless of where they were found.
macro_rules! dbc_object {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $(self.$field == other.$field)&&+
            }
        }

        impl DbcObject for $name {
            fn get_location(&self) -> &Location {
                &self.location
            }

            fn get_location_mut(&mut self) -> &mut Location {
                &mut self.location
            }
        }
    };
}

/// The content of a dbc file
///
/// The location is the position of the first statement, or the end of the input for an empty file.
#[derive(Debug, Clone, Default)]
pub struct DbcFile {
    pub location: Location,
    pub version: String,
    pub new_symbols: Option<NewSymbols>,
    pub bit_timing: Option<BitTiming>,
    pub nodes: Option<Nodes>,
    pub value_tables: ItemList<ValueTable>,
    pub messages: ItemList<Message>,
    pub message_transmitters: Vec<MessageTransmitter>,
    pub env_vars: ItemList<EnvVar>,
    pub env_var_data: Vec<EnvVarData>,
    pub signal_types: ItemList<SignalType>,
    pub comments: Vec<Comment>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub attribute_defaults: Vec<AttributeDefault>,
    pub attribute_values: Vec<AttributeValue>,
    pub value_encodings: Vec<ValueEncoding>,
    pub signal_type_refs: Vec<SignalTypeRef>,
    pub signal_groups: Vec<SignalGroup>,
    pub signal_ext_value_types: Vec<SignalExtValueType>,
    pub extended_muxes: Vec<ExtendedMux>,
}

/// `NS_`: the list of optional keywords that may be used in the file
#[derive(Debug, Clone)]
pub struct NewSymbols {
    pub location: Location,
    pub symbols: Vec<String>,
}

/// `BS_`: baudrate and bit timing registers. These values are obsolete and usually zero.
#[derive(Debug, Clone)]
pub struct BitTiming {
    pub location: Location,
    pub baudrate: u32,
    pub register1: u32,
    pub register2: u32,
}

/// `BU_`: the names of all nodes of the network
#[derive(Debug, Clone)]
pub struct Nodes {
    pub location: Location,
    pub names: Vec<String>,
}

/// one raw value and its description in a value table or value encoding
#[derive(Debug, Clone)]
pub struct ValueDescription {
    pub location: Location,
    pub id: u32,
    pub name: String,
}

/// `VAL_TABLE_`: a named table of value descriptions that can be shared by several signals
#[derive(Debug, Clone)]
pub struct ValueTable {
    pub location: Location,
    pub name: String,
    pub values: Vec<ValueDescription>,
}

/// `BO_`: a CAN frame and the signals it carries
#[derive(Debug, Clone)]
pub struct Message {
    pub location: Location,
    pub id: u32,
    pub name: String,
    /// size of the frame in bytes
    pub size: u32,
    pub transmitter: String,
    pub signals: ItemList<Signal>,
}

/// `SG_`: a signal inside a message
///
/// A signal can be a multiplexor (it selects which multiplexed signals are present in the frame)
/// and multiplexed (it is only present if its multiplexor has the value `mux_switch_value`) at the same time.
#[derive(Debug, Clone)]
pub struct Signal {
    pub location: Location,
    pub name: String,
    pub is_multiplexor: bool,
    pub is_multiplexed: bool,
    pub mux_switch_value: u32,
    pub start_bit: u32,
    pub size: u32,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    pub factor: f64,
    pub offset: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub receivers: Vec<String>,
}

/// `BO_TX_BU_`: additional transmitters of a message
#[derive(Debug, Clone)]
pub struct MessageTransmitter {
    pub location: Location,
    pub message_id: u32,
    pub transmitters: Vec<String>,
}

/// `EV_`: an environment variable
#[derive(Debug, Clone)]
pub struct EnvVar {
    pub location: Location,
    pub name: String,
    pub var_type: EnvVarType,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub initial_value: f64,
    pub id: u32,
    pub access_type: EnvVarAccessType,
    pub access_nodes: Vec<String>,
}

/// `ENVVAR_DATA_`: declares an environment variable as a data variable of the given size in bytes
#[derive(Debug, Clone)]
pub struct EnvVarData {
    pub location: Location,
    pub env_var_name: String,
    pub data_size: u32,
}

/// `SGTYPE_`: a signal type definition
#[derive(Debug, Clone)]
pub struct SignalType {
    pub location: Location,
    pub name: String,
    pub size: u32,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    pub factor: f64,
    pub offset: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub default_value: f64,
    pub value_table: String,
}

/// `SGTYPE_` with a message id: assigns a signal type to a signal
#[derive(Debug, Clone)]
pub struct SignalTypeRef {
    pub location: Location,
    pub message_id: u32,
    pub signal_name: String,
    pub type_name: String,
}

/// `CM_`
#[derive(Debug, Clone)]
pub struct Comment {
    pub location: Location,
    pub target: ObjectTarget,
    pub text: String,
}

/// `BA_DEF_`: declares an attribute, the kind of object it applies to and its value range
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    pub location: Location,
    pub object_kind: ObjectKind,
    pub name: String,
    pub value_type: AttributeValueType,
}

/// `BA_DEF_DEF_`
#[derive(Debug, Clone)]
pub struct AttributeDefault {
    pub location: Location,
    pub name: String,
    pub value: AttributeLiteral,
}

/// `BA_`: the value of an attribute for one object
#[derive(Debug, Clone)]
pub struct AttributeValue {
    pub location: Location,
    pub name: String,
    pub target: ObjectTarget,
    pub value: AttributeLiteral,
}

/// `VAL_`: value descriptions of a signal or an environment variable
#[derive(Debug, Clone)]
pub struct ValueEncoding {
    pub location: Location,
    pub target: ValueEncodingTarget,
    pub values: Vec<ValueDescription>,
}

/// `SIG_GROUP_`
#[derive(Debug, Clone)]
pub struct SignalGroup {
    pub location: Location,
    pub message_id: u32,
    pub name: String,
    pub repetitions: u32,
    pub signal_names: Vec<String>,
}

/// `SIG_VALTYPE_`: marks a signal as containing a floating point value
#[derive(Debug, Clone)]
pub struct SignalExtValueType {
    pub location: Location,
    pub message_id: u32,
    pub signal_name: String,
    pub value_type: ExtValueType,
}

/// `SG_MUL_VAL_`: extended multiplexing
///
/// The multiplexed signal is present if the value of the multiplexor signal lies in one of the ranges.
#[derive(Debug, Clone)]
pub struct ExtendedMux {
    pub location: Location,
    pub message_id: u32,
    pub multiplexed_signal: String,
    pub multiplexor_signal: String,
    pub ranges: Vec<ExtendedMuxRange>,
}

#[derive(Debug, Clone)]
pub struct ExtendedMuxRange {
    pub location: Location,
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// `0`, Motorola
    BigEndian,
    /// `1`, Intel
    LittleEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// `+`
    Unsigned,
    /// `-`
    Signed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvVarType {
    Integer,
    Float,
    String,
}

/// Access type of an environment variable
///
/// The `*String` variants are the `0x8000` variants of the access type tag, which mark variables of type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvVarAccessType {
    Unrestricted,
    Read,
    Write,
    ReadWrite,
    UnrestrictedString,
    ReadString,
    WriteString,
    ReadWriteString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtValueType {
    Integer,
    Float,
    Double,
}

/// The kind of object an attribute definition applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    General,
    Node,
    Message,
    Signal,
    EnvVar,
}

/// The object a comment or an attribute value is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectTarget {
    General,
    Node(String),
    Message(u32),
    Signal {
        message_id: u32,
        signal_name: String,
    },
    EnvVar(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueEncodingTarget {
    Signal {
        message_id: u32,
        signal_name: String,
    },
    EnvVar(String),
}

/// Value type and limits of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValueType {
    Int { min: i64, max: i64 },
    Hex { min: u32, max: u32 },
    Float { min: f64, max: f64 },
    String,
    Enum(Vec<String>),
}

/// An attribute value as it was written in the file.
///
/// Attribute values are not annotated with their type in dbc files, so the variant is chosen
/// by the form of the value: quoted text, `0x` prefix, decimal point or exponent, plain integer.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeLiteral {
    Int(i64),
    Hex(u32),
    Float(f64),
    String(String),
}

dbc_object!(DbcFile {
    version,
    new_symbols,
    bit_timing,
    nodes,
    value_tables,
    messages,
    message_transmitters,
    env_vars,
    env_var_data,
    signal_types,
    comments,
    attribute_definitions,
    attribute_defaults,
    attribute_values,
    value_encodings,
    signal_type_refs,
    signal_groups,
    signal_ext_value_types,
    extended_muxes,
});
dbc_object!(NewSymbols { symbols });
dbc_object!(BitTiming {
    baudrate,
    register1,
    register2
});
dbc_object!(Nodes { names });
dbc_object!(ValueDescription { id, name });
dbc_object!(ValueTable { name, values });
dbc_object!(Message {
    id,
    name,
    size,
    transmitter,
    signals
});
dbc_object!(Signal {
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
});
dbc_object!(MessageTransmitter {
    message_id,
    transmitters
});
dbc_object!(EnvVar {
    name,
    var_type,
    min,
    max,
    unit,
    initial_value,
    id,
    access_type,
    access_nodes,
});
dbc_object!(EnvVarData {
    env_var_name,
    data_size
});
dbc_object!(SignalType {
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
});
dbc_object!(SignalTypeRef {
    message_id,
    signal_name,
    type_name
});
dbc_object!(Comment { target, text });
dbc_object!(AttributeDefinition {
    object_kind,
    name,
    value_type
});
dbc_object!(AttributeDefault { name, value });
dbc_object!(AttributeValue {
    name,
    target,
    value
});
dbc_object!(ValueEncoding { target, values });
dbc_object!(SignalGroup {
    message_id,
    name,
    repetitions,
    signal_names
});
dbc_object!(SignalExtValueType {
    message_id,
    signal_name,
    value_type
});
dbc_object!(ExtendedMux {
    message_id,
    multiplexed_signal,
    multiplexor_signal,
    ranges
});
dbc_object!(ExtendedMuxRange { from, to });

impl ItemKey for ValueTable {
    type Key = String;

    fn item_key(&self) -> String {
        self.name.clone()
    }
}

impl ItemKey for Message {
    type Key = u32;

    fn item_key(&self) -> u32 {
        self.id
    }
}

impl ItemKey for Signal {
    type Key = String;

    fn item_key(&self) -> String {
        self.name.clone()
    }
}

impl ItemKey for EnvVar {
    type Key = String;

    fn item_key(&self) -> String {
        self.name.clone()
    }
}

impl ItemKey for SignalType {
    type Key = String;

    fn item_key(&self) -> String {
        self.name.clone()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            filename: Arc::from(""),
            line: 0,
            column: 0,
        }
    }
}

impl Location {
    #[must_use]
    pub fn new(filename: Arc<str>, line: u32, column: u32) -> Self {
        Self {
            filename,
            line,
            column,
        }
    }
}

impl DbcFile {
    /// create an empty dbc file
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// all signals of all messages
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.messages.iter().flat_map(|msg| msg.signals.iter())
    }

    pub fn attribute_definition(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attribute_definitions
            .iter()
            .find(|attr| attr.name == name)
    }

    pub fn attribute_default(&self, name: &str) -> Option<&AttributeDefault> {
        self.attribute_defaults.iter().find(|attr| attr.name == name)
    }

    /// all comments attached to the given object
    pub fn comments_for<'a>(
        &'a self,
        target: &'a ObjectTarget,
    ) -> impl Iterator<Item = &'a Comment> + 'a {
        self.comments
            .iter()
            .filter(move |comment| &comment.target == target)
    }
}

impl NewSymbols {
    #[must_use]
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            location: Location::default(),
            symbols,
        }
    }
}

impl BitTiming {
    #[must_use]
    pub fn new(baudrate: u32, register1: u32, register2: u32) -> Self {
        Self {
            location: Location::default(),
            baudrate,
            register1,
            register2,
        }
    }

    /// a bit timing without any values is written as a bare `BS_:`
    pub fn is_empty(&self) -> bool {
        self.baudrate == 0 && self.register1 == 0 && self.register2 == 0
    }
}

impl Nodes {
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self {
            location: Location::default(),
            names,
        }
    }
}

impl ValueDescription {
    #[must_use]
    pub fn new(id: u32, name: String) -> Self {
        Self {
            location: Location::default(),
            id,
            name,
        }
    }
}

impl ValueTable {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            location: Location::default(),
            name,
            values: vec![],
        }
    }
}

impl Message {
    #[must_use]
    pub fn new(id: u32, name: String, size: u32, transmitter: String) -> Self {
        Self {
            location: Location::default(),
            id,
            name,
            size,
            transmitter,
            signals: ItemList::new(),
        }
    }

    /// the multiplexor signal of the message, if there is one
    pub fn multiplexor(&self) -> Option<&Signal> {
        self.signals.iter().find(|sig| sig.is_multiplexor)
    }
}

impl Signal {
    /// create a signal with factor 1 and offset 0 that is not multiplexed
    #[must_use]
    pub fn new(
        name: String,
        start_bit: u32,
        size: u32,
        byte_order: ByteOrder,
        value_type: ValueType,
    ) -> Self {
        Self {
            location: Location::default(),
            name,
            is_multiplexor: false,
            is_multiplexed: false,
            mux_switch_value: 0,
            start_bit,
            size,
            byte_order,
            value_type,
            factor: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 0.0,
            unit: String::new(),
            receivers: vec![],
        }
    }

    /// Decode a multiplexer indicator: `M`, `m<value>` or `m<value>M`.
    ///
    /// Returns (`is_multiplexor`, `is_multiplexed`, `mux_switch_value`), or None if the text is not a multiplexer indicator.
    pub fn decode_mux_indicator(text: &str) -> Option<(bool, bool, u32)> {
        if text == "M" {
            return Some((true, false, 0));
        }
        let rest = text.strip_prefix('m')?;
        let (digits, is_multiplexor) = match rest.strip_suffix('M') {
            Some(digits) => (digits, true),
            None => (rest, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value = digits.parse().ok()?;
        Some((is_multiplexor, true, value))
    }
}

impl MessageTransmitter {
    #[must_use]
    pub fn new(message_id: u32, transmitters: Vec<String>) -> Self {
        Self {
            location: Location::default(),
            message_id,
            transmitters,
        }
    }
}

impl EnvVar {
    #[must_use]
    pub fn new(name: String, var_type: EnvVarType, access_type: EnvVarAccessType) -> Self {
        Self {
            location: Location::default(),
            name,
            var_type,
            min: 0.0,
            max: 0.0,
            unit: String::new(),
            initial_value: 0.0,
            id: 0,
            access_type,
            access_nodes: vec![],
        }
    }
}

impl EnvVarData {
    #[must_use]
    pub fn new(env_var_name: String, data_size: u32) -> Self {
        Self {
            location: Location::default(),
            env_var_name,
            data_size,
        }
    }
}

impl SignalType {
    #[must_use]
    pub fn new(name: String, size: u32, byte_order: ByteOrder, value_type: ValueType) -> Self {
        Self {
            location: Location::default(),
            name,
            size,
            byte_order,
            value_type,
            factor: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 0.0,
            unit: String::new(),
            default_value: 0.0,
            value_table: String::new(),
        }
    }
}

impl SignalTypeRef {
    #[must_use]
    pub fn new(message_id: u32, signal_name: String, type_name: String) -> Self {
        Self {
            location: Location::default(),
            message_id,
            signal_name,
            type_name,
        }
    }
}

impl Comment {
    #[must_use]
    pub fn new(target: ObjectTarget, text: String) -> Self {
        Self {
            location: Location::default(),
            target,
            text,
        }
    }
}

impl AttributeDefinition {
    #[must_use]
    pub fn new(object_kind: ObjectKind, name: String, value_type: AttributeValueType) -> Self {
        Self {
            location: Location::default(),
            object_kind,
            name,
            value_type,
        }
    }
}

impl AttributeDefault {
    #[must_use]
    pub fn new(name: String, value: AttributeLiteral) -> Self {
        Self {
            location: Location::default(),
            name,
            value,
        }
    }
}

impl AttributeValue {
    #[must_use]
    pub fn new(name: String, target: ObjectTarget, value: AttributeLiteral) -> Self {
        Self {
            location: Location::default(),
            name,
            target,
            value,
        }
    }
}

impl ValueEncoding {
    #[must_use]
    pub fn new(target: ValueEncodingTarget, values: Vec<ValueDescription>) -> Self {
        Self {
            location: Location::default(),
            target,
            values,
        }
    }
}

impl SignalGroup {
    #[must_use]
    pub fn new(message_id: u32, name: String, repetitions: u32, signal_names: Vec<String>) -> Self {
        Self {
            location: Location::default(),
            message_id,
            name,
            repetitions,
            signal_names,
        }
    }
}

impl SignalExtValueType {
    #[must_use]
    pub fn new(message_id: u32, signal_name: String, value_type: ExtValueType) -> Self {
        Self {
            location: Location::default(),
            message_id,
            signal_name,
            value_type,
        }
    }
}

impl ExtendedMux {
    #[must_use]
    pub fn new(
        message_id: u32,
        multiplexed_signal: String,
        multiplexor_signal: String,
        ranges: Vec<ExtendedMuxRange>,
    ) -> Self {
        Self {
            location: Location::default(),
            message_id,
            multiplexed_signal,
            multiplexor_signal,
            ranges,
        }
    }
}

impl ExtendedMuxRange {
    #[must_use]
    pub fn new(from: u32, to: u32) -> Self {
        Self {
            location: Location::default(),
            from,
            to,
        }
    }
}

impl ByteOrder {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ByteOrder::BigEndian),
            1 => Some(ByteOrder::LittleEndian),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ByteOrder::BigEndian => 0,
            ByteOrder::LittleEndian => 1,
        }
    }
}

impl ValueType {
    pub fn sign_char(self) -> char {
        match self {
            ValueType::Unsigned => '+',
            ValueType::Signed => '-',
        }
    }
}

impl EnvVarType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(EnvVarType::Integer),
            1 => Some(EnvVarType::Float),
            2 => Some(EnvVarType::String),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            EnvVarType::Integer => 0,
            EnvVarType::Float => 1,
            EnvVarType::String => 2,
        }
    }
}

impl EnvVarAccessType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let access_type = match tag {
            "DUMMY_NODE_VECTOR0" => EnvVarAccessType::Unrestricted,
            "DUMMY_NODE_VECTOR1" => EnvVarAccessType::Read,
            "DUMMY_NODE_VECTOR2" => EnvVarAccessType::Write,
            "DUMMY_NODE_VECTOR3" => EnvVarAccessType::ReadWrite,
            "DUMMY_NODE_VECTOR8000" => EnvVarAccessType::UnrestrictedString,
            "DUMMY_NODE_VECTOR8001" => EnvVarAccessType::ReadString,
            "DUMMY_NODE_VECTOR8002" => EnvVarAccessType::WriteString,
            "DUMMY_NODE_VECTOR8003" => EnvVarAccessType::ReadWriteString,
            _ => return None,
        };
        Some(access_type)
    }

    pub fn tag(self) -> &'static str {
        match self {
            EnvVarAccessType::Unrestricted => "DUMMY_NODE_VECTOR0",
            EnvVarAccessType::Read => "DUMMY_NODE_VECTOR1",
            EnvVarAccessType::Write => "DUMMY_NODE_VECTOR2",
            EnvVarAccessType::ReadWrite => "DUMMY_NODE_VECTOR3",
            EnvVarAccessType::UnrestrictedString => "DUMMY_NODE_VECTOR8000",
            EnvVarAccessType::ReadString => "DUMMY_NODE_VECTOR8001",
            EnvVarAccessType::WriteString => "DUMMY_NODE_VECTOR8002",
            EnvVarAccessType::ReadWriteString => "DUMMY_NODE_VECTOR8003",
        }
    }
}

impl ExtValueType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ExtValueType::Integer),
            1 => Some(ExtValueType::Float),
            2 => Some(ExtValueType::Double),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ExtValueType::Integer => 0,
            ExtValueType::Float => 1,
            ExtValueType::Double => 2,
        }
    }
}

impl ObjectTarget {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectTarget::General => ObjectKind::General,
            ObjectTarget::Node(_) => ObjectKind::Node,
            ObjectTarget::Message(_) => ObjectKind::Message,
            ObjectTarget::Signal { .. } => ObjectKind::Signal,
            ObjectTarget::EnvVar(_) => ObjectKind::EnvVar,
        }
    }
}
