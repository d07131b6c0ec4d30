use crate::document::{AttributeDefinition, AttributeValueType, DbcFile, ObjectKind};

/// Placeholder node name for messages without transmitter or signals without receiver
pub const DUMMY_NODE: &str = "Vector__XXX";

/// usual extension of dbc files
pub const FILE_EXTENSION: &str = ".dbc";

pub const MSG_CYCLE_TIME_NAME: &str = "GenMsgCycleTime";
pub const MSG_CYCLE_TIME_MIN: i64 = 0;
pub const MSG_CYCLE_TIME_MAX: i64 = 3_600_000;

pub const MSG_DELAY_TIME_NAME: &str = "GenMsgDelayTime";
pub const MSG_DELAY_TIME_MIN: i64 = 0;
pub const MSG_DELAY_TIME_MAX: i64 = 1000;

pub const MSG_START_DELAY_TIME_NAME: &str = "GenMsgStartDelayTime";
pub const MSG_START_DELAY_TIME_MIN: i64 = 0;
pub const MSG_START_DELAY_TIME_MAX: i64 = 100_000;

pub const MSG_SEND_TYPE_NAME: &str = "GenMsgSendType";
pub const MSG_SEND_TYPE_VALUES: &[&str] = &[
    "NoMsgSendType",
    "Cyclic",
    "CyclicIfActive",
    "CyclicAndTriggered",
    "CyclicIfActiveAndTriggered",
];

pub const SIG_START_VALUE_NAME: &str = "GenSigStartValue";
pub const SIG_START_VALUE_MIN: i64 = 0;
pub const SIG_START_VALUE_MAX: i64 = 10_000;

pub const SIG_SEND_TYPE_NAME: &str = "GenSigSendType";
pub const SIG_SEND_TYPE_VALUES: &[&str] = &[
    "NoSigSendType",
    "Cyclic",
    "OnWrite",
    "OnWriteWithRepetition",
    "OnChange",
    "OnChangeWithRepetition",
    "IfActive",
    "IfActiveWithRepetition",
];

/// Attributes with a conventional meaning that are understood by most tools that process dbc files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownAttribute {
    MsgCycleTime,
    MsgDelayTime,
    MsgStartDelayTime,
    MsgSendType,
    SigStartValue,
    SigSendType,
}

impl WellKnownAttribute {
    pub const ALL: [WellKnownAttribute; 6] = [
        WellKnownAttribute::MsgCycleTime,
        WellKnownAttribute::MsgDelayTime,
        WellKnownAttribute::MsgStartDelayTime,
        WellKnownAttribute::MsgSendType,
        WellKnownAttribute::SigStartValue,
        WellKnownAttribute::SigSendType,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            WellKnownAttribute::MsgCycleTime => MSG_CYCLE_TIME_NAME,
            WellKnownAttribute::MsgDelayTime => MSG_DELAY_TIME_NAME,
            WellKnownAttribute::MsgStartDelayTime => MSG_START_DELAY_TIME_NAME,
            WellKnownAttribute::MsgSendType => MSG_SEND_TYPE_NAME,
            WellKnownAttribute::SigStartValue => SIG_START_VALUE_NAME,
            WellKnownAttribute::SigSendType => SIG_SEND_TYPE_NAME,
        }
    }

    pub fn object_kind(self) -> ObjectKind {
        match self {
            WellKnownAttribute::MsgCycleTime
            | WellKnownAttribute::MsgDelayTime
            | WellKnownAttribute::MsgStartDelayTime
            | WellKnownAttribute::MsgSendType => ObjectKind::Message,
            WellKnownAttribute::SigStartValue | WellKnownAttribute::SigSendType => {
                ObjectKind::Signal
            }
        }
    }

    pub fn value_type(self) -> AttributeValueType {
        match self {
            WellKnownAttribute::MsgCycleTime => AttributeValueType::Int {
                min: MSG_CYCLE_TIME_MIN,
                max: MSG_CYCLE_TIME_MAX,
            },
            WellKnownAttribute::MsgDelayTime => AttributeValueType::Int {
                min: MSG_DELAY_TIME_MIN,
                max: MSG_DELAY_TIME_MAX,
            },
            WellKnownAttribute::MsgStartDelayTime => AttributeValueType::Int {
                min: MSG_START_DELAY_TIME_MIN,
                max: MSG_START_DELAY_TIME_MAX,
            },
            WellKnownAttribute::MsgSendType => AttributeValueType::Enum(
                MSG_SEND_TYPE_VALUES.iter().map(|v| v.to_string()).collect(),
            ),
            WellKnownAttribute::SigStartValue => AttributeValueType::Int {
                min: SIG_START_VALUE_MIN,
                max: SIG_START_VALUE_MAX,
            },
            WellKnownAttribute::SigSendType => AttributeValueType::Enum(
                SIG_SEND_TYPE_VALUES.iter().map(|v| v.to_string()).collect(),
            ),
        }
    }

    /// the `BA_DEF_` statement that declares this attribute
    pub fn definition(self) -> AttributeDefinition {
        AttributeDefinition::new(self.object_kind(), self.name().to_string(), self.value_type())
    }
}

impl DbcFile {
    /// Add the definition of a well-known attribute, unless an attribute with the same name is already defined.
    ///
    /// Returns true if the definition was added.
    pub fn define_well_known_attribute(&mut self, attribute: WellKnownAttribute) -> bool {
        if self.attribute_definition(attribute.name()).is_some() {
            false
        } else {
            self.attribute_definitions.push(attribute.definition());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_names() {
        for attr in WellKnownAttribute::ALL {
            assert_eq!(WellKnownAttribute::from_name(attr.name()), Some(attr));
        }
        assert_eq!(WellKnownAttribute::from_name("GenMsgILSupport"), None);
    }

    #[test]
    fn well_known_definitions() {
        let def = WellKnownAttribute::MsgCycleTime.definition();
        assert_eq!(def.object_kind, ObjectKind::Message);
        assert_eq!(def.name, "GenMsgCycleTime");
        assert_eq!(
            def.value_type,
            AttributeValueType::Int {
                min: 0,
                max: 3_600_000
            }
        );

        let def = WellKnownAttribute::SigSendType.definition();
        assert_eq!(def.object_kind, ObjectKind::Signal);
        let AttributeValueType::Enum(values) = def.value_type else {
            panic!("GenSigSendType is an enum");
        };
        assert_eq!(values.len(), 8);
        assert_eq!(values[0], "NoSigSendType");
    }

    #[test]
    fn define_once() {
        let mut dbc = DbcFile::new();
        assert!(dbc.define_well_known_attribute(WellKnownAttribute::MsgSendType));
        assert!(!dbc.define_well_known_attribute(WellKnownAttribute::MsgSendType));
        assert!(dbc.define_well_known_attribute(WellKnownAttribute::SigStartValue));
        assert_eq!(dbc.attribute_definitions.len(), 2);
    }
}
