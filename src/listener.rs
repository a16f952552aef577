use crate::encoding::PrimitiveValue;
use crate::token::Token;

/// A listener which receives callbacks while the on-the-fly decoder walks a
/// message.
///
/// Event order is deterministic and follows token order: a message opens
/// with `on_begin_message` and closes with `on_end_message`; every group
/// emits `on_group_header` then `on_begin_group`/`on_end_group` per entry in
/// ascending index; var-data events follow the groups of their scope.
///
/// `buffer` arguments are positioned at the value being decoded. For
/// constant encodings the value comes from the token's `const_value` and
/// the buffer must not be read; for optional fields whose token version is
/// newer than `acting_version` the applicable null value is the value.
pub trait TokenListener {
    fn on_begin_message(&mut self, token: &Token);

    fn on_end_message(&mut self, token: &Token);

    /// A plain encoded field or composite member.
    fn on_encoding(
        &mut self,
        field_token: &Token,
        buffer: &[u8],
        type_token: &Token,
        acting_version: u64,
    );

    /// An enum field; `tokens[from_index + 1..to_index]` hold the valid values.
    fn on_enum(
        &mut self,
        field_token: &Token,
        buffer: &[u8],
        tokens: &[Token],
        from_index: usize,
        to_index: usize,
        acting_version: u64,
    );

    /// A bitset field; `tokens[from_index + 1..to_index]` hold the choices.
    fn on_bit_set(
        &mut self,
        field_token: &Token,
        buffer: &[u8],
        tokens: &[Token],
        from_index: usize,
        to_index: usize,
        acting_version: u64,
    );

    fn on_begin_composite(
        &mut self,
        field_token: &Token,
        tokens: &[Token],
        from_index: usize,
        to_index: usize,
    );

    fn on_end_composite(
        &mut self,
        field_token: &Token,
        tokens: &[Token],
        from_index: usize,
        to_index: usize,
    );

    fn on_group_header(&mut self, token: &Token, num_in_group: u64);

    fn on_begin_group(&mut self, token: &Token, group_index: u64, num_in_group: u64);

    fn on_end_group(&mut self, token: &Token, group_index: u64, num_in_group: u64);

    /// A var-length data field; `buffer[..length]` is the payload.
    fn on_var_data(&mut self, field_token: &Token, buffer: &[u8], length: u64, type_token: &Token);
}

/// The value a listener must substitute without touching the buffer: the
/// constant for constant encodings, the applicable null for optional fields
/// newer than the acting version, `None` when the wire carries the value.
#[must_use]
pub fn const_or_not_present_value(
    type_token: &Token,
    field_version: u64,
    acting_version: u64,
) -> PrimitiveValue {
    if type_token.is_constant_encoding() {
        type_token.encoding.const_value.clone()
    } else if type_token.is_optional_encoding() && acting_version < field_version {
        type_token.encoding.applicable_null_value()
    } else {
        PrimitiveValue::None
    }
}

/// Resolve a signed integer field, substituting constants and nulls.
#[must_use]
pub fn read_encoding_as_int(
    buffer: &[u8],
    type_token: &Token,
    field_version: u64,
    acting_version: u64,
) -> i64 {
    let value = const_or_not_present_value(type_token, field_version, acting_version);
    if value.is_none() {
        type_token.encoding.get_as_int(buffer).unwrap_or(0)
    } else {
        value.as_int()
    }
}

/// Resolve an unsigned integer field, substituting constants and nulls.
#[must_use]
pub fn read_encoding_as_uint(
    buffer: &[u8],
    type_token: &Token,
    field_version: u64,
    acting_version: u64,
) -> u64 {
    let value = const_or_not_present_value(type_token, field_version, acting_version);
    if value.is_none() {
        type_token.encoding.get_as_uint(buffer).unwrap_or(0)
    } else {
        value.as_uint()
    }
}
