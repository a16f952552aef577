use crate::bytes::{self, ByteOrder};
use crate::encoding::{Encoding, Presence, PrimitiveType, PrimitiveValue};
use crate::token::{Signal, Token};
use std::collections::HashMap;
use std::path::Path;
use std::{error, fmt, fs, io};

/// IR loader errors.
#[derive(Debug)]
pub enum Error {
    /// The frame declares an IR version this runtime does not understand.
    UnsupportedVersion(i32),
    UnknownSignal(u8),
    UnknownPrimitiveType(u8),
    UnknownByteOrder(u8),
    UnknownPresence(u8),
    Bytes(bytes::Error),
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion(version) => write!(f, "unsupported IR version {version}"),
            Self::UnknownSignal(raw) => write!(f, "unknown signal `{raw}`"),
            Self::UnknownPrimitiveType(raw) => write!(f, "unknown primitive type `{raw}`"),
            Self::UnknownByteOrder(raw) => write!(f, "unknown byte order `{raw}`"),
            Self::UnknownPresence(raw) => write!(f, "unknown presence `{raw}`"),
            Self::Bytes(err) => err.fmt(f),
            Self::Io(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {}

impl From<bytes::Error> for Error {
    fn from(err: bytes::Error) -> Self {
        Self::Bytes(err)
    }
}

// Bootstrap IR wire layout. The IR stream is itself SBE-encoded: one frame
// record followed by token records back to back, all little-endian.
const FRAME_BLOCK_LENGTH: usize = 12;
const TOKEN_BLOCK_LENGTH: usize = 28;

/// Sequential reader over the bootstrap IR buffer.
struct IrReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> IrReader<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    fn tail(&self) -> Result<&'a [u8], Error> {
        self.buffer
            .get(self.offset..)
            .ok_or(Error::Bytes(bytes::Error::BufferOverflow))
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        let value = bytes::get_i32(self.tail()?, ByteOrder::LittleEndian)?;
        self.offset += 4;
        Ok(value)
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        let value = bytes::get_u8(self.tail()?)?;
        self.offset += 1;
        Ok(value)
    }

    /// A `u16`-length-prefixed byte string.
    fn read_bytes(&mut self) -> Result<&'a [u8], Error> {
        let length = bytes::get_u16(self.tail()?, ByteOrder::LittleEndian)? as usize;
        self.offset += 2;
        let value = self
            .buffer
            .get(self.offset..self.offset + length)
            .ok_or(Error::Bytes(bytes::Error::BufferOverflow))?;
        self.offset += length;
        Ok(value)
    }

    fn read_string(&mut self) -> Result<String, Error> {
        Ok(String::from_utf8_lossy(self.read_bytes()?).into_owned())
    }
}

/// A compiled schema loaded from its serialized intermediate representation:
/// the message header token stream plus one flat token stream per message,
/// with named types indexed for lookup.
///
/// Immutable once loaded and freely shareable.
#[derive(Debug, Default)]
pub struct IrDecoder {
    id: i32,
    version: i32,
    package_name: String,
    namespace_name: String,
    semantic_version: String,
    header_tokens: Vec<Token>,
    messages: Vec<Vec<Token>>,
    types_by_name: HashMap<String, Vec<Token>>,
}

impl IrDecoder {
    /// Decode a serialized IR buffer.
    pub fn decode(buffer: &[u8]) -> Result<Self, Error> {
        let mut reader = IrReader::new(buffer);
        let mut decoder = Self::default();

        // Frame record: identity and version, then the naming strings.
        decoder.id = reader.read_i32()?;
        let ir_version = reader.read_i32()?;
        if ir_version != 0 {
            return Err(Error::UnsupportedVersion(ir_version));
        }
        decoder.version = reader.read_i32()?;
        reader.offset = FRAME_BLOCK_LENGTH;
        decoder.package_name = reader.read_string()?;
        decoder.namespace_name = reader.read_string()?;
        decoder.semantic_version = reader.read_string()?;

        // The first composite is the message header.
        while !reader.is_at_end() {
            let token = read_token(&mut reader)?;
            let done = token.signal == Signal::EndComposite;
            decoder.header_tokens.push(token);
            if done {
                break;
            }
        }
        update_component_token_counts(&mut decoder.header_tokens);

        // Messages follow, each a contiguous BeginMessage..EndMessage range.
        while !reader.is_at_end() {
            let mut message = Vec::new();
            while !reader.is_at_end() {
                let token = read_token(&mut reader)?;
                let done = token.signal == Signal::EndMessage;
                message.push(token);
                if done {
                    break;
                }
            }
            update_component_token_counts(&mut message);
            decoder.messages.push(message);
        }

        decoder.index_types();
        Ok(decoder)
    }

    /// Load and decode an IR file. This is the loader's only I/O.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let buffer = fs::read(path).map_err(Error::Io)?;
        Self::decode(&buffer)
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Schema version recorded in the frame.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    #[must_use]
    pub fn namespace_name(&self) -> &str {
        &self.namespace_name
    }

    #[must_use]
    pub fn semantic_version(&self) -> &str {
        &self.semantic_version
    }

    #[must_use]
    pub fn header_tokens(&self) -> &[Token] {
        &self.header_tokens
    }

    #[must_use]
    pub fn messages(&self) -> &[Vec<Token>] {
        &self.messages
    }

    /// The first message whose template id matches.
    #[must_use]
    pub fn message_by_id(&self, id: i32) -> Option<&[Token]> {
        self.messages
            .iter()
            .map(Vec::as_slice)
            .find(|tokens| match tokens.first() {
                Some(token) => token.signal == Signal::BeginMessage && token.field_id == id,
                None => false,
            })
    }

    /// The message matching both template id and version.
    #[must_use]
    pub fn message(&self, id: i32, version: i32) -> Option<&[Token]> {
        self.messages
            .iter()
            .map(Vec::as_slice)
            .find(|tokens| match tokens.first() {
                Some(token) => {
                    token.signal == Signal::BeginMessage
                        && token.field_id == id
                        && token.version == version
                }
                None => false,
            })
    }

    /// The token span of a named composite, enum, or set.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<&[Token]> {
        self.types_by_name.get(name).map(Vec::as_slice)
    }

    fn index_types(&mut self) {
        let streams = self.messages.iter().chain(std::iter::once(&self.header_tokens));
        for tokens in streams {
            for (i, token) in tokens.iter().enumerate() {
                if !matches!(
                    token.signal,
                    Signal::BeginComposite | Signal::BeginEnum | Signal::BeginSet
                ) {
                    continue;
                }
                let end = (i + token.component_token_count as usize).min(tokens.len());
                let name = token.applicable_type_name();
                if !name.is_empty() && !self.types_by_name.contains_key(name) {
                    self.types_by_name.insert(name.to_string(), tokens[i..end].to_vec());
                }
            }
        }
    }
}

/// Decode one token record at the reader's position.
fn read_token(reader: &mut IrReader<'_>) -> Result<Token, Error> {
    let start = reader.offset;
    let token_offset = reader.read_i32()?;
    let token_size = reader.read_i32()?;
    let field_id = reader.read_i32()?;
    let token_version = reader.read_i32()?;
    let component_token_count = reader.read_i32()?;
    let signal_raw = reader.read_u8()?;
    let signal = Signal::try_from(signal_raw).map_err(|_| Error::UnknownSignal(signal_raw))?;
    let type_raw = reader.read_u8()?;
    let primitive_type = PrimitiveType::try_from(type_raw)
        .map_err(|_| Error::UnknownPrimitiveType(type_raw))?;
    let order_raw = reader.read_u8()?;
    let byte_order =
        ByteOrder::try_from(order_raw).map_err(|_| Error::UnknownByteOrder(order_raw))?;
    let presence_raw = reader.read_u8()?;
    let presence =
        Presence::try_from(presence_raw).map_err(|_| Error::UnknownPresence(presence_raw))?;
    let _deprecated = reader.read_i32()?;
    debug_assert_eq!(start + TOKEN_BLOCK_LENGTH, reader.offset);

    let name = reader.read_string()?;
    // Value strings are raw little-endian primitive bytes; empty means the
    // schema declared nothing.
    let ir_order = ByteOrder::LittleEndian;
    let const_value = PrimitiveValue::from_wire(primitive_type, reader.read_bytes()?, ir_order);
    let min_value = PrimitiveValue::from_wire(primitive_type, reader.read_bytes()?, ir_order);
    let max_value = PrimitiveValue::from_wire(primitive_type, reader.read_bytes()?, ir_order);
    let null_value = PrimitiveValue::from_wire(primitive_type, reader.read_bytes()?, ir_order);
    let character_encoding = reader.read_string()?;
    let epoch = reader.read_string()?;
    let time_unit = reader.read_string()?;
    let semantic_type = reader.read_string()?;
    let description = reader.read_string()?;
    let referenced_name = reader.read_string()?;

    Ok(Token {
        signal,
        name,
        referenced_name,
        description,
        field_id,
        version: token_version,
        offset: token_offset,
        encoded_length: token_size,
        component_token_count,
        encoding: Encoding {
            primitive_type,
            presence,
            byte_order,
            min_value,
            max_value,
            null_value,
            const_value,
            character_encoding,
            epoch,
            time_unit,
            semantic_type,
        },
    })
}

/// Recompute `component_token_count` from the Begin/End pairing so that a
/// `Begin*` token carries its span length inclusive of both ends, using one
/// stack per signal kind.
pub(crate) fn update_component_token_counts(tokens: &mut [Token]) {
    fn begin_of(signal: Signal) -> Option<Signal> {
        match signal {
            Signal::EndMessage => Some(Signal::BeginMessage),
            Signal::EndComposite => Some(Signal::BeginComposite),
            Signal::EndField => Some(Signal::BeginField),
            Signal::EndGroup => Some(Signal::BeginGroup),
            Signal::EndEnum => Some(Signal::BeginEnum),
            Signal::EndSet => Some(Signal::BeginSet),
            Signal::EndVarData => Some(Signal::BeginVarData),
            _ => None,
        }
    }

    let mut stacks: HashMap<u8, Vec<usize>> = HashMap::new();
    for i in 0..tokens.len() {
        let signal = tokens[i].signal;
        if signal.paired_end().is_some() {
            stacks.entry(signal as u8).or_default().push(i);
        } else if let Some(begin) = begin_of(signal) {
            if let Some(begin_index) = stacks.entry(begin as u8).or_default().pop() {
                tokens[begin_index].component_token_count = (i - begin_index + 1) as i32;
            }
            tokens[i].component_token_count = 1;
        } else {
            tokens[i].component_token_count = 1;
        }
    }
}
