use crate::bytes::{self, ByteOrder, Error};
use num_enum::TryFromPrimitive;
use std::fmt;

/// SBE primitive types, in their IR wire-id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum PrimitiveType {
    None = 0,
    Char = 1,
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    Int64 = 5,
    UInt8 = 6,
    UInt16 = 7,
    UInt32 = 8,
    UInt64 = 9,
    Float = 10,
    Double = 11,
}

impl Default for PrimitiveType {
    fn default() -> Self {
        Self::None
    }
}

impl PrimitiveType {
    /// Encoded size of one element in bytes.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::None => 0,
            Self::Char | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float => 4,
            Self::Int64 | Self::UInt64 | Self::Double => 8,
        }
    }

    #[must_use]
    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    /// The null sentinel the SBE specification fixes for each type: NUL for
    /// char, `MIN` for signed integers, `MAX` for unsigned integers, NaN for
    /// floats.
    #[must_use]
    pub fn null_value(self) -> PrimitiveValue {
        match self {
            Self::None => PrimitiveValue::None,
            Self::Char => PrimitiveValue::Char(0),
            Self::Int8 => PrimitiveValue::Int8(i8::MIN),
            Self::Int16 => PrimitiveValue::Int16(i16::MIN),
            Self::Int32 => PrimitiveValue::Int32(i32::MIN),
            Self::Int64 => PrimitiveValue::Int64(i64::MIN),
            Self::UInt8 => PrimitiveValue::UInt8(u8::MAX),
            Self::UInt16 => PrimitiveValue::UInt16(u16::MAX),
            Self::UInt32 => PrimitiveValue::UInt32(u32::MAX),
            Self::UInt64 => PrimitiveValue::UInt64(u64::MAX),
            Self::Float => PrimitiveValue::Float(f32::NAN),
            Self::Double => PrimitiveValue::Double(f64::NAN),
        }
    }
}

/// Whether a field is carried on the wire, nullable, or synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum Presence {
    Required = 0,
    Optional = 1,
    Constant = 2,
}

impl Default for Presence {
    fn default() -> Self {
        Self::Required
    }
}

/// A single decoded value, tagged by primitive type.
///
/// `char[n]` arrays are carried whole in the `Bytes` variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PrimitiveValue {
    #[default]
    None,
    Char(u8),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
}

impl PrimitiveValue {
    /// Interpret raw value bytes as `primitive_type`. An empty slice decodes
    /// to `None` so that absent IR values fall through to the type defaults.
    #[must_use]
    pub fn from_wire(primitive_type: PrimitiveType, value: &[u8], order: ByteOrder) -> Self {
        if value.is_empty() {
            return Self::None;
        }
        let decoded = match primitive_type {
            PrimitiveType::Char if value.len() > 1 => Some(Self::Bytes(value.to_vec())),
            PrimitiveType::Char => bytes::get_char(value).ok().map(Self::Char),
            PrimitiveType::Int8 => bytes::get_i8(value).ok().map(Self::Int8),
            PrimitiveType::Int16 => bytes::get_i16(value, order).ok().map(Self::Int16),
            PrimitiveType::Int32 => bytes::get_i32(value, order).ok().map(Self::Int32),
            PrimitiveType::Int64 => bytes::get_i64(value, order).ok().map(Self::Int64),
            PrimitiveType::UInt8 => bytes::get_u8(value).ok().map(Self::UInt8),
            PrimitiveType::UInt16 => bytes::get_u16(value, order).ok().map(Self::UInt16),
            PrimitiveType::UInt32 => bytes::get_u32(value, order).ok().map(Self::UInt32),
            PrimitiveType::UInt64 => bytes::get_u64(value, order).ok().map(Self::UInt64),
            PrimitiveType::Float => bytes::get_f32(value, order).ok().map(Self::Float),
            PrimitiveType::Double => bytes::get_f64(value, order).ok().map(Self::Double),
            PrimitiveType::None => None,
        };
        decoded.unwrap_or(Self::None)
    }

    #[must_use]
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::None => PrimitiveType::None,
            Self::Char(_) | Self::Bytes(_) => PrimitiveType::Char,
            Self::Int8(_) => PrimitiveType::Int8,
            Self::Int16(_) => PrimitiveType::Int16,
            Self::Int32(_) => PrimitiveType::Int32,
            Self::Int64(_) => PrimitiveType::Int64,
            Self::UInt8(_) => PrimitiveType::UInt8,
            Self::UInt16(_) => PrimitiveType::UInt16,
            Self::UInt32(_) => PrimitiveType::UInt32,
            Self::UInt64(_) => PrimitiveType::UInt64,
            Self::Float(_) => PrimitiveType::Float,
            Self::Double(_) => PrimitiveType::Double,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Raw size in bytes; `Bytes` reports its array length.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Bytes(v) => v.len(),
            other => other.primitive_type().size(),
        }
    }

    #[must_use]
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Char(b) => i64::from(*b),
            Self::Int8(v) => i64::from(*v),
            Self::Int16(v) => i64::from(*v),
            Self::Int32(v) => i64::from(*v),
            Self::Int64(v) => *v,
            _ => 0,
        }
    }

    #[must_use]
    pub fn as_uint(&self) -> u64 {
        match self {
            Self::UInt8(v) => u64::from(*v),
            Self::UInt16(v) => u64::from(*v),
            Self::UInt32(v) => u64::from(*v),
            Self::UInt64(v) => *v,
            _ => 0,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> f64 {
        match self {
            Self::Float(v) => f64::from(*v),
            Self::Double(v) => *v,
            _ => 0.0,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Char(b) => write!(f, "{}", *b as char),
            Self::Bytes(v) => write!(f, "{}", String::from_utf8_lossy(v)),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            // Floats format through f64.
            Self::Float(v) => write!(f, "{}", f64::from(*v)),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

/// Read a signed integer of the given type from the front of `buffer`.
pub fn get_as_int(
    primitive_type: PrimitiveType,
    order: ByteOrder,
    buffer: &[u8],
) -> Result<i64, Error> {
    match primitive_type {
        PrimitiveType::Char => bytes::get_char(buffer).map(i64::from),
        PrimitiveType::Int8 => bytes::get_i8(buffer).map(i64::from),
        PrimitiveType::Int16 => bytes::get_i16(buffer, order).map(i64::from),
        PrimitiveType::Int32 => bytes::get_i32(buffer, order).map(i64::from),
        PrimitiveType::Int64 => bytes::get_i64(buffer, order),
        _ => Err(Error::UnexpectedType),
    }
}

/// Read an unsigned integer of the given type from the front of `buffer`.
pub fn get_as_uint(
    primitive_type: PrimitiveType,
    order: ByteOrder,
    buffer: &[u8],
) -> Result<u64, Error> {
    match primitive_type {
        PrimitiveType::UInt8 => bytes::get_u8(buffer).map(u64::from),
        PrimitiveType::UInt16 => bytes::get_u16(buffer, order).map(u64::from),
        PrimitiveType::UInt32 => bytes::get_u32(buffer, order).map(u64::from),
        PrimitiveType::UInt64 => bytes::get_u64(buffer, order),
        _ => Err(Error::UnexpectedType),
    }
}

/// Read a float of the given type from the front of `buffer`.
pub fn get_as_double(
    primitive_type: PrimitiveType,
    order: ByteOrder,
    buffer: &[u8],
) -> Result<f64, Error> {
    match primitive_type {
        PrimitiveType::Float => bytes::get_f32(buffer, order).map(f64::from),
        PrimitiveType::Double => bytes::get_f64(buffer, order),
        _ => Err(Error::UnexpectedType),
    }
}

/// Immutable description of how one primitive (or primitive array) is laid
/// out on the wire, as carried by a token.
#[derive(Debug, Clone, Default)]
pub struct Encoding {
    pub primitive_type: PrimitiveType,
    pub presence: Presence,
    pub byte_order: ByteOrder,
    pub min_value: PrimitiveValue,
    pub max_value: PrimitiveValue,
    pub null_value: PrimitiveValue,
    pub const_value: PrimitiveValue,
    pub character_encoding: String,
    pub epoch: String,
    pub time_unit: String,
    pub semantic_type: String,
}

impl Encoding {
    pub fn get_as_int(&self, buffer: &[u8]) -> Result<i64, Error> {
        get_as_int(self.primitive_type, self.byte_order, buffer)
    }

    pub fn get_as_uint(&self, buffer: &[u8]) -> Result<u64, Error> {
        get_as_uint(self.primitive_type, self.byte_order, buffer)
    }

    pub fn get_as_double(&self, buffer: &[u8]) -> Result<f64, Error> {
        get_as_double(self.primitive_type, self.byte_order, buffer)
    }

    /// The schema-declared null value when one exists, otherwise the type's
    /// specification default.
    #[must_use]
    pub fn applicable_null_value(&self) -> PrimitiveValue {
        if self.null_value.is_none() {
            self.primitive_type.null_value()
        } else {
            self.null_value.clone()
        }
    }
}
