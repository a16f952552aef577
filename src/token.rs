use crate::encoding::{Encoding, Presence};
use num_enum::TryFromPrimitive;

/// Structural role of a token within the flattened IR stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum Signal {
    BeginMessage = 1,
    EndMessage = 2,
    BeginComposite = 3,
    EndComposite = 4,
    BeginField = 5,
    EndField = 6,
    BeginGroup = 7,
    EndGroup = 8,
    BeginEnum = 9,
    ValidValue = 10,
    EndEnum = 11,
    BeginSet = 12,
    Choice = 13,
    EndSet = 14,
    BeginVarData = 15,
    EndVarData = 16,
    Encoding = 17,
}

impl Signal {
    /// The `End*` signal that closes this `Begin*` signal, if any.
    #[must_use]
    pub fn paired_end(self) -> Option<Signal> {
        match self {
            Self::BeginMessage => Some(Self::EndMessage),
            Self::BeginComposite => Some(Self::EndComposite),
            Self::BeginField => Some(Self::EndField),
            Self::BeginGroup => Some(Self::EndGroup),
            Self::BeginEnum => Some(Self::EndEnum),
            Self::BeginSet => Some(Self::EndSet),
            Self::BeginVarData => Some(Self::EndVarData),
            _ => None,
        }
    }
}

/// One record of the flattened IR.
///
/// A composite structure spans a contiguous `[Begin.. End]` token range;
/// `component_token_count` at the `Begin*` index is the span length
/// inclusive of both ends, so span navigation is index arithmetic.
#[derive(Debug, Clone)]
pub struct Token {
    pub signal: Signal,
    pub name: String,
    pub referenced_name: String,
    pub description: String,
    pub field_id: i32,
    pub version: i32,
    pub offset: i32,
    pub encoded_length: i32,
    pub component_token_count: i32,
    pub encoding: Encoding,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            signal: Signal::Encoding,
            name: String::new(),
            referenced_name: String::new(),
            description: String::new(),
            field_id: 0,
            version: 0,
            offset: 0,
            encoded_length: 0,
            component_token_count: 1,
            encoding: Encoding::default(),
        }
    }
}

impl Token {
    /// The type name to apply in context: the referenced type when the token
    /// aliases one, otherwise its own name.
    #[must_use]
    pub fn applicable_type_name(&self) -> &str {
        if self.referenced_name.is_empty() {
            &self.name
        } else {
            &self.referenced_name
        }
    }

    /// Number of encoded primitives in this type; 0 when nothing is carried
    /// on the wire.
    #[must_use]
    pub fn array_length(&self) -> i32 {
        let element_size = self.encoding.primitive_type.size();
        if element_size == 0 || self.encoded_length == 0 {
            return 0;
        }
        self.encoded_length / element_size as i32
    }

    #[must_use]
    pub fn is_constant_encoding(&self) -> bool {
        self.encoding.presence == Presence::Constant
    }

    #[must_use]
    pub fn is_optional_encoding(&self) -> bool {
        self.encoding.presence == Presence::Optional
    }
}
