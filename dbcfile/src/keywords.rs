/// statement and type keywords of the dbc format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Keyword {
    Version,
    NewSymbols,
    BitTiming,
    Nodes,
    ValueTable,
    Message,
    Signal,
    MessageTransmitter,
    EnvVar,
    EnvVarData,
    SignalType,
    Comment,
    AttributeDefinition,
    AttributeDefault,
    AttributeValue,
    ValueEncoding,
    SignalGroup,
    SignalValueType,
    ExtendedMux,
    Int,
    Hex,
    Float,
    String,
    Enum,
}

/// single character punctuation tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Punct {
    Colon,
    Comma,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Pipe,
    Semicolon,
    At,
    Plus,
    Minus,
}

/// The symbols that may be listed in the `NS_` block, in the order in which they are written
/// when a file does not declare its own list.
pub(crate) const NEW_SYMBOLS: &[&str] = &[
    "NS_DESC_",
    "CM_",
    "BA_DEF_",
    "BA_",
    "VAL_",
    "CAT_DEF_",
    "CAT_",
    "FILTER",
    "BA_DEF_DEF_",
    "EV_DATA_",
    "ENVVAR_DATA_",
    "SGTYPE_",
    "SGTYPE_VAL_",
    "BA_DEF_SGTYPE_",
    "BA_SGTYPE_",
    "SIG_TYPE_REF_",
    "VAL_TABLE_",
    "SIG_GROUP_",
    "SIG_VALTYPE_",
    "SIGTYPE_VALTYPE_",
    "BO_TX_BU_",
    "BA_DEF_REL_",
    "BA_REL_",
    "BA_DEF_DEF_REL_",
    "BU_SG_REL_",
    "BU_EV_REL_",
    "BU_BO_REL_",
    "SG_MUL_VAL_",
];

pub(crate) fn is_new_symbol(text: &str) -> bool {
    NEW_SYMBOLS.contains(&text)
}

impl Keyword {
    pub(crate) fn from_lexeme(text: &str) -> Option<Self> {
        let keyword = match text {
            "VERSION" => Keyword::Version,
            "NS_" => Keyword::NewSymbols,
            "BS_" => Keyword::BitTiming,
            "BU_" => Keyword::Nodes,
            "VAL_TABLE_" => Keyword::ValueTable,
            "BO_" => Keyword::Message,
            "SG_" => Keyword::Signal,
            "BO_TX_BU_" => Keyword::MessageTransmitter,
            "EV_" => Keyword::EnvVar,
            "ENVVAR_DATA_" => Keyword::EnvVarData,
            "SGTYPE_" => Keyword::SignalType,
            "CM_" => Keyword::Comment,
            "BA_DEF_" => Keyword::AttributeDefinition,
            "BA_DEF_DEF_" => Keyword::AttributeDefault,
            "BA_" => Keyword::AttributeValue,
            "VAL_" => Keyword::ValueEncoding,
            "SIG_GROUP_" => Keyword::SignalGroup,
            "SIG_VALTYPE_" => Keyword::SignalValueType,
            "SG_MUL_VAL_" => Keyword::ExtendedMux,
            "INT" => Keyword::Int,
            "HEX" => Keyword::Hex,
            "FLOAT" => Keyword::Float,
            "STRING" => Keyword::String,
            "ENUM" => Keyword::Enum,
            _ => return None,
        };
        Some(keyword)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Keyword::Version => "VERSION",
            Keyword::NewSymbols => "NS_",
            Keyword::BitTiming => "BS_",
            Keyword::Nodes => "BU_",
            Keyword::ValueTable => "VAL_TABLE_",
            Keyword::Message => "BO_",
            Keyword::Signal => "SG_",
            Keyword::MessageTransmitter => "BO_TX_BU_",
            Keyword::EnvVar => "EV_",
            Keyword::EnvVarData => "ENVVAR_DATA_",
            Keyword::SignalType => "SGTYPE_",
            Keyword::Comment => "CM_",
            Keyword::AttributeDefinition => "BA_DEF_",
            Keyword::AttributeDefault => "BA_DEF_DEF_",
            Keyword::AttributeValue => "BA_",
            Keyword::ValueEncoding => "VAL_",
            Keyword::SignalGroup => "SIG_GROUP_",
            Keyword::SignalValueType => "SIG_VALTYPE_",
            Keyword::ExtendedMux => "SG_MUL_VAL_",
            Keyword::Int => "INT",
            Keyword::Hex => "HEX",
            Keyword::Float => "FLOAT",
            Keyword::String => "STRING",
            Keyword::Enum => "ENUM",
        }
    }
}

impl Punct {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        let punct = match c {
            ':' => Punct::Colon,
            ',' => Punct::Comma,
            '(' => Punct::LeftParen,
            ')' => Punct::RightParen,
            '[' => Punct::LeftBracket,
            ']' => Punct::RightBracket,
            '|' => Punct::Pipe,
            ';' => Punct::Semicolon,
            '@' => Punct::At,
            '+' => Punct::Plus,
            '-' => Punct::Minus,
            _ => return None,
        };
        Some(punct)
    }

    pub(crate) fn as_char(self) -> char {
        match self {
            Punct::Colon => ':',
            Punct::Comma => ',',
            Punct::LeftParen => '(',
            Punct::RightParen => ')',
            Punct::LeftBracket => '[',
            Punct::RightBracket => ']',
            Punct::Pipe => '|',
            Punct::Semicolon => ';',
            Punct::At => '@',
            Punct::Plus => '+',
            Punct::Minus => '-',
        }
    }
}
