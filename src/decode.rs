use crate::bytes::{self, ByteOrder};
use crate::encoding::{self, PrimitiveType};
use crate::listener::TokenListener;
use crate::token::{Signal, Token};
use std::{error, fmt};

/// On-the-fly decoder errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    EmptyTokenStream,
    MissingHeaderField(&'static str),
    MalformedWire { offset: usize, needed: usize },
    UnknownTemplateId(u64),
    SchemaIdMismatch { expected: i32, actual: u64 },
    Bytes(bytes::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTokenStream => write!(f, "empty token stream"),
            Self::MissingHeaderField(name) => write!(f, "header field `{name}` not found"),
            Self::MalformedWire { offset, needed } => {
                write!(f, "buffer too short at offset {offset}: {needed} bytes expected")
            }
            Self::UnknownTemplateId(id) => write!(f, "no message with template id {id}"),
            Self::SchemaIdMismatch { expected, actual } => {
                write!(f, "required schema id {expected} but was {actual}")
            }
            Self::Bytes(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {}

impl From<bytes::Error> for Error {
    fn from(err: bytes::Error) -> Self {
        Self::Bytes(err)
    }
}

/// Decode a message body against its token stream, dispatching events to
/// `listener`.
///
/// `buffer` starts at the root block (after the message header);
/// `block_length` is the root block length taken from the wire, not the
/// schema. Returns the number of bytes consumed.
pub fn decode<L: TokenListener>(
    buffer: &[u8],
    acting_version: u64,
    block_length: u64,
    tokens: &[Token],
    listener: &mut L,
) -> Result<usize, Error> {
    let first = tokens.first().ok_or(Error::EmptyTokenStream)?;
    listener.on_begin_message(first);

    if buffer.len() < block_length as usize {
        return Err(Error::MalformedWire {
            offset: 0,
            needed: block_length as usize,
        });
    }

    let num_tokens = tokens.len();
    let token_index = decode_fields(buffer, 0, acting_version, tokens, 1, num_tokens, listener)?;
    let buffer_index = block_length as usize;
    let (buffer_index, token_index) = decode_groups(
        buffer,
        buffer_index,
        acting_version,
        tokens,
        token_index,
        num_tokens,
        listener,
    )?;
    let buffer_index = decode_data(
        buffer,
        buffer_index,
        acting_version,
        tokens,
        token_index,
        num_tokens,
        listener,
    )?;

    listener.on_end_message(&tokens[num_tokens - 1]);
    Ok(buffer_index)
}

fn slice_from<'b>(buffer: &'b [u8], offset: usize, needed: usize) -> Result<&'b [u8], Error> {
    buffer.get(offset..).ok_or(Error::MalformedWire {
        offset,
        needed,
    })
}

/// Consume consecutive `BeginField` spans starting at `token_index`.
/// Returns the index of the first non-field token.
fn decode_fields<L: TokenListener>(
    buffer: &[u8],
    buffer_index: usize,
    acting_version: u64,
    tokens: &[Token],
    mut token_index: usize,
    num_tokens: usize,
    listener: &mut L,
) -> Result<usize, Error> {
    while token_index < num_tokens {
        let field_token = &tokens[token_index];
        if field_token.signal != Signal::BeginField {
            break;
        }
        let next_field_index = token_index + field_token.component_token_count as usize;
        token_index += 1;

        let type_token = &tokens[token_index];
        let offset = buffer_index + type_token.offset as usize;
        let size = type_token.encoded_length as usize;
        match type_token.signal {
            Signal::BeginComposite => decode_composite(
                field_token,
                buffer,
                offset,
                tokens,
                token_index,
                next_field_index - 2,
                acting_version,
                listener,
            )?,
            Signal::BeginEnum => listener.on_enum(
                field_token,
                slice_from(buffer, offset, size)?,
                tokens,
                token_index,
                next_field_index - 2,
                acting_version,
            ),
            Signal::BeginSet => listener.on_bit_set(
                field_token,
                slice_from(buffer, offset, size)?,
                tokens,
                token_index,
                next_field_index - 2,
                acting_version,
            ),
            Signal::Encoding => listener.on_encoding(
                field_token,
                slice_from(buffer, offset, size)?,
                type_token,
                acting_version,
            ),
            _ => {}
        }
        token_index = next_field_index;
    }
    Ok(token_index)
}

/// Walk a composite span, recursing into nested composites and emitting
/// member events at their declared offsets.
#[allow(clippy::too_many_arguments)]
fn decode_composite<L: TokenListener>(
    field_token: &Token,
    buffer: &[u8],
    buffer_index: usize,
    tokens: &[Token],
    token_index: usize,
    to_index: usize,
    acting_version: u64,
    listener: &mut L,
) -> Result<(), Error> {
    listener.on_begin_composite(field_token, tokens, token_index, to_index);
    let mut i = token_index + 1;
    while i < to_index {
        let token = &tokens[i];
        let next_field_index = i + token.component_token_count as usize;
        let offset = buffer_index + token.offset as usize;
        let size = token.encoded_length as usize;
        match token.signal {
            Signal::BeginComposite => decode_composite(
                field_token,
                buffer,
                offset,
                tokens,
                i,
                next_field_index - 1,
                acting_version,
                listener,
            )?,
            Signal::BeginEnum => listener.on_enum(
                field_token,
                slice_from(buffer, offset, size)?,
                tokens,
                i,
                next_field_index - 1,
                acting_version,
            ),
            Signal::BeginSet => listener.on_bit_set(
                field_token,
                slice_from(buffer, offset, size)?,
                tokens,
                i,
                next_field_index - 1,
                acting_version,
            ),
            Signal::Encoding => listener.on_encoding(
                token,
                slice_from(buffer, offset, size)?,
                token,
                acting_version,
            ),
            _ => {}
        }
        i = next_field_index;
    }
    listener.on_end_composite(field_token, tokens, token_index, to_index);
    Ok(())
}

/// Consume consecutive `BeginGroup` spans. Returns the buffer position after
/// all group bytes and the index of the first non-group token.
fn decode_groups<L: TokenListener>(
    buffer: &[u8],
    mut buffer_index: usize,
    acting_version: u64,
    tokens: &[Token],
    mut token_index: usize,
    num_tokens: usize,
    listener: &mut L,
) -> Result<(usize, usize), Error> {
    while token_index < num_tokens {
        let token = &tokens[token_index];
        if token.signal != Signal::BeginGroup {
            break;
        }
        // A group introduced after the acting version is absent from the
        // wire: zero entries, no dimension bytes to skip.
        let is_present = i64::from(token.version) <= acting_version as i64;
        let dimensions = &tokens[token_index + 1];
        let block_length_token = &tokens[token_index + 2];
        let num_in_group_token = &tokens[token_index + 3];

        let mut block_length = 0u64;
        let mut num_in_group = 0u64;
        if is_present {
            let dimensions_length = dimensions.encoded_length as usize;
            if buffer_index + dimensions_length > buffer.len() {
                return Err(Error::MalformedWire {
                    offset: buffer_index,
                    needed: dimensions_length,
                });
            }
            block_length = block_length_token
                .encoding
                .get_as_uint(&buffer[buffer_index + block_length_token.offset as usize..])?;
            num_in_group = num_in_group_token
                .encoding
                .get_as_uint(&buffer[buffer_index + num_in_group_token.offset as usize..])?;
            buffer_index += dimensions_length;
        }

        let begin_fields_index = token_index + dimensions.component_token_count as usize + 1;
        listener.on_group_header(token, num_in_group);

        for i in 0..num_in_group {
            listener.on_begin_group(token, i, num_in_group);
            if buffer_index + block_length as usize > buffer.len() {
                return Err(Error::MalformedWire {
                    offset: buffer_index,
                    needed: block_length as usize,
                });
            }
            let after_fields_index = decode_fields(
                buffer,
                buffer_index,
                acting_version,
                tokens,
                begin_fields_index,
                num_tokens,
                listener,
            )?;
            buffer_index += block_length as usize;
            let (group_buffer_index, after_groups_index) = decode_groups(
                buffer,
                buffer_index,
                acting_version,
                tokens,
                after_fields_index,
                num_tokens,
                listener,
            )?;
            buffer_index = decode_data(
                buffer,
                group_buffer_index,
                acting_version,
                tokens,
                after_groups_index,
                num_tokens,
                listener,
            )?;
            listener.on_end_group(token, i, num_in_group);
        }
        token_index += token.component_token_count as usize;
    }
    Ok((buffer_index, token_index))
}

/// Consume consecutive `BeginVarData` spans. Returns the buffer position
/// after the last payload.
fn decode_data<L: TokenListener>(
    buffer: &[u8],
    mut buffer_index: usize,
    acting_version: u64,
    tokens: &[Token],
    mut token_index: usize,
    num_tokens: usize,
    listener: &mut L,
) -> Result<usize, Error> {
    while token_index < num_tokens {
        let token = &tokens[token_index];
        if token.signal != Signal::BeginVarData {
            break;
        }
        let is_present = i64::from(token.version) <= acting_version as i64;
        let length_token = &tokens[token_index + 2];
        let data_token = &tokens[token_index + 3];

        let mut data_length = 0u64;
        if is_present {
            // The data offset within the var-data composite equals the size
            // of the length field preceding it.
            let header_length = data_token.offset as usize;
            if buffer_index + header_length > buffer.len() {
                return Err(Error::MalformedWire {
                    offset: buffer_index,
                    needed: header_length,
                });
            }
            data_length = length_token
                .encoding
                .get_as_uint(&buffer[buffer_index + length_token.offset as usize..])?;
            buffer_index += header_length;
        }

        if buffer_index + data_length as usize > buffer.len() {
            return Err(Error::MalformedWire {
                offset: buffer_index,
                needed: data_length as usize,
            });
        }
        listener.on_var_data(token, &buffer[buffer_index..], data_length, data_token);
        buffer_index += data_length as usize;
        token_index += token.component_token_count as usize;
    }
    Ok(buffer_index)
}

#[derive(Debug, Clone, Copy)]
struct HeaderField {
    offset: i32,
    primitive_type: PrimitiveType,
    byte_order: ByteOrder,
}

impl HeaderField {
    fn get(&self, buffer: &[u8]) -> Result<u64, Error> {
        let tail = slice_from(buffer, self.offset as usize, self.primitive_type.size())?;
        Ok(encoding::get_as_uint(self.primitive_type, self.byte_order, tail)?)
    }
}

/// Resolves the standard message header fields by name from the header
/// token stream, honoring each field's own type and byte order so custom
/// header composites decode the same way.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    encoded_length: i32,
    block_length: HeaderField,
    template_id: HeaderField,
    schema_id: HeaderField,
    schema_version: HeaderField,
}

impl HeaderDecoder {
    /// All header elements must be unsigned integers per the specification.
    pub fn new(tokens: &[Token]) -> Result<Self, Error> {
        let first = tokens.first().ok_or(Error::EmptyTokenStream)?;
        let find = |name: &'static str| -> Result<HeaderField, Error> {
            let token = tokens
                .iter()
                .find(|t| t.name == name)
                .ok_or(Error::MissingHeaderField(name))?;
            Ok(HeaderField {
                offset: token.offset,
                primitive_type: token.encoding.primitive_type,
                byte_order: token.encoding.byte_order,
            })
        };
        Ok(Self {
            encoded_length: first.encoded_length,
            block_length: find("blockLength")?,
            template_id: find("templateId")?,
            schema_id: find("schemaId")?,
            schema_version: find("version")?,
        })
    }

    #[must_use]
    pub fn encoded_length(&self) -> i32 {
        self.encoded_length
    }

    pub fn block_length(&self, header_buffer: &[u8]) -> Result<u64, Error> {
        self.block_length.get(header_buffer)
    }

    pub fn template_id(&self, header_buffer: &[u8]) -> Result<u64, Error> {
        self.template_id.get(header_buffer)
    }

    pub fn schema_id(&self, header_buffer: &[u8]) -> Result<u64, Error> {
        self.schema_id.get(header_buffer)
    }

    pub fn schema_version(&self, header_buffer: &[u8]) -> Result<u64, Error> {
        self.schema_version.get(header_buffer)
    }
}
