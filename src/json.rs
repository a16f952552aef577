use crate::decode::{self, Error, HeaderDecoder};
use crate::encoding::{PrimitiveType, PrimitiveValue};
use crate::ir::IrDecoder;
use crate::listener::{
    TokenListener, const_or_not_present_value, read_encoding_as_int, read_encoding_as_uint,
};
use crate::token::Token;
use std::fmt::Write;

/// A listener that renders the decoded message as pretty-printed JSON:
/// composites as nested objects, groups as arrays of objects, enums as
/// quoted valid-value names, bitsets as `{choice: bool}` objects.
#[derive(Debug, Default)]
pub struct JsonTokenListener {
    output: String,
    indentation: usize,
    composite_level: usize,
    more: bool,
}

impl JsonTokenListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    fn start_object(&mut self) {
        self.indent();
        self.output.push_str("{\n");
        self.indentation += 1;
        self.more = false;
    }

    fn end_object(&mut self) {
        self.output.push('\n');
        self.indentation -= 1;
        self.indent();
        self.output.push('}');
        self.more = true;
    }

    fn property(&mut self, name: &str) {
        self.indent();
        let _ = write!(self.output, "\"{name}\": ");
    }

    fn indent(&mut self) {
        for _ in 0..self.indentation {
            self.output.push_str("    ");
        }
    }

    fn prev(&mut self) {
        if self.more {
            self.output.push_str(",\n");
        }
    }

    fn next(&mut self) {
        self.more = true;
    }

    fn escape_char(&mut self, c: char) {
        match c {
            '"' => self.output.push_str("\\\""),
            '\\' => self.output.push_str("\\\\"),
            '\n' => self.output.push_str("\\n"),
            '\r' => self.output.push_str("\\r"),
            '\t' => self.output.push_str("\\t"),
            '\u{0008}' => self.output.push_str("\\b"),
            '\u{000C}' => self.output.push_str("\\f"),
            c => self.output.push(c),
        }
    }

    fn escape_string(&mut self, value: &str) {
        for c in value.chars() {
            self.escape_char(c);
        }
    }

    fn quoted(&mut self, value: &str) {
        self.output.push('"');
        self.escape_string(value);
        self.output.push('"');
    }

    fn determine_name<'t>(
        &self,
        threshold_level: usize,
        field_token: &'t Token,
        tokens: &'t [Token],
        from_index: usize,
    ) -> &'t str {
        if self.composite_level > threshold_level {
            &tokens[from_index].name
        } else {
            &field_token.name
        }
    }

    fn append_value(&mut self, value: &PrimitiveValue) {
        match value {
            PrimitiveValue::Char(b) => {
                self.output.push('"');
                self.escape_char(*b as char);
                self.output.push('"');
            }
            PrimitiveValue::Bytes(bytes) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                self.quoted(&text);
            }
            other => {
                let _ = write!(self.output, "{other}");
            }
        }
    }

    fn append_encoding(
        &mut self,
        buffer: &[u8],
        type_token: &Token,
        field_version: u64,
        acting_version: u64,
    ) {
        let const_or_null = const_or_not_present_value(type_token, field_version, acting_version);
        if !const_or_null.is_none() {
            // Constants and version-absent nulls render as quoted strings.
            let text = const_or_null.to_string();
            self.quoted(&text);
            return;
        }

        let encoding = &type_token.encoding;
        let element_size = encoding.primitive_type.size();
        let array_length = type_token.array_length() as usize;

        if encoding.primitive_type == PrimitiveType::Char && array_length > 1 {
            // char[n] is one JSON string, truncated at the first NUL.
            self.output.push('"');
            for i in 0..array_length {
                match buffer.get(i) {
                    Some(&b) if b != 0 => self.escape_char(b as char),
                    _ => break,
                }
            }
            self.output.push('"');
            return;
        }

        if array_length == 1 {
            let value =
                PrimitiveValue::from_wire(encoding.primitive_type, buffer, encoding.byte_order);
            self.append_value(&value);
            return;
        }

        self.output.push('[');
        for i in 0..array_length {
            if i > 0 {
                self.output.push_str(", ");
            }
            let start = i * element_size;
            let value = PrimitiveValue::from_wire(
                encoding.primitive_type,
                buffer.get(start..start + element_size).unwrap_or_default(),
                encoding.byte_order,
            );
            self.append_value(&value);
        }
        self.output.push(']');
    }
}

impl TokenListener for JsonTokenListener {
    fn on_begin_message(&mut self, _token: &Token) {
        self.start_object();
    }

    fn on_end_message(&mut self, _token: &Token) {
        self.end_object();
    }

    fn on_encoding(
        &mut self,
        field_token: &Token,
        buffer: &[u8],
        type_token: &Token,
        acting_version: u64,
    ) {
        self.prev();
        let name = field_token.name.clone();
        self.property(&name);
        self.append_encoding(buffer, type_token, field_token.version as u64, acting_version);
        self.next();
    }

    fn on_enum(
        &mut self,
        field_token: &Token,
        buffer: &[u8],
        tokens: &[Token],
        from_index: usize,
        to_index: usize,
        acting_version: u64,
    ) {
        self.prev();
        let type_token = &tokens[from_index + 1];
        let field_version = field_token.version as u64;

        let mut value = String::new();
        if field_token.is_constant_encoding() {
            let reference = field_token.encoding.const_value.to_string();
            value = match reference.rfind('.') {
                Some(dot) => reference[dot + 1..].to_string(),
                None => reference,
            };
        } else if type_token.encoding.primitive_type.is_unsigned() {
            let encoded = read_encoding_as_uint(buffer, type_token, field_version, acting_version);
            for token in &tokens[from_index + 1..to_index] {
                if token.encoding.const_value.as_uint() == encoded {
                    value = token.name.clone();
                    break;
                }
            }
        } else {
            let encoded = read_encoding_as_int(buffer, type_token, field_version, acting_version);
            for token in &tokens[from_index + 1..to_index] {
                if token.encoding.const_value.as_int() == encoded {
                    value = token.name.clone();
                    break;
                }
            }
        }

        let name = self
            .determine_name(0, field_token, tokens, from_index)
            .to_string();
        self.property(&name);
        self.quoted(&value);
        self.next();
    }

    fn on_bit_set(
        &mut self,
        field_token: &Token,
        buffer: &[u8],
        tokens: &[Token],
        from_index: usize,
        to_index: usize,
        acting_version: u64,
    ) {
        self.prev();
        // A set is a fixed-width unsigned integer; each choice holds its bit
        // position.
        let type_token = &tokens[from_index + 1];
        let encoded = read_encoding_as_uint(
            buffer,
            type_token,
            field_token.version as u64,
            acting_version,
        );
        let name = self
            .determine_name(0, field_token, tokens, from_index)
            .to_string();
        self.property(&name);

        let mut body = String::from("{ ");
        for (i, token) in tokens[from_index + 1..to_index].iter().enumerate() {
            if i > 0 {
                body.push_str(", ");
            }
            let bit_position = token.encoding.const_value.as_uint();
            let flag = encoded & (1 << bit_position) != 0;
            let _ = write!(body, "\"{}\": {flag}", token.name);
        }
        body.push_str(" }");
        self.output.push_str(&body);
        self.next();
    }

    fn on_begin_composite(
        &mut self,
        field_token: &Token,
        tokens: &[Token],
        from_index: usize,
        _to_index: usize,
    ) {
        self.prev();
        self.composite_level += 1;
        let name = self
            .determine_name(0, field_token, tokens, from_index)
            .to_string();
        self.indent();
        let _ = write!(self.output, "\"{name}\":");
        self.output.push('\n');
        self.start_object();
    }

    fn on_end_composite(
        &mut self,
        _field_token: &Token,
        _tokens: &[Token],
        _from_index: usize,
        _to_index: usize,
    ) {
        self.composite_level -= 1;
        self.end_object();
    }

    fn on_group_header(&mut self, token: &Token, num_in_group: u64) {
        self.prev();
        let name = token.name.clone();
        self.property(&name);
        if num_in_group > 0 {
            self.output.push_str("[\n");
            self.more = false;
        } else {
            self.output.push_str("[]");
            self.more = true;
        }
    }

    fn on_begin_group(&mut self, _token: &Token, _group_index: u64, _num_in_group: u64) {
        self.prev();
        self.start_object();
    }

    fn on_end_group(&mut self, _token: &Token, group_index: u64, num_in_group: u64) {
        self.end_object();
        if group_index == num_in_group - 1 {
            self.output.push(']');
        }
    }

    fn on_var_data(&mut self, field_token: &Token, buffer: &[u8], length: u64, type_token: &Token) {
        self.prev();
        let name = field_token.name.clone();
        self.property(&name);
        self.output.push('"');
        let payload = &buffer[..length as usize];
        if type_token.encoding.character_encoding.is_empty() {
            // Binary payloads hex-encode.
            for b in payload {
                let _ = write!(self.output, "{b:02x}");
            }
        } else {
            let text = String::from_utf8_lossy(payload).into_owned();
            self.escape_string(&text);
        }
        self.output.push('"');
        self.next();
    }
}

/// Pretty prints JSON for any message covered by the given IR.
#[derive(Debug)]
pub struct JsonPrinter<'a> {
    header_decoder: HeaderDecoder,
    ir: &'a IrDecoder,
}

impl<'a> JsonPrinter<'a> {
    pub fn new(ir: &'a IrDecoder) -> Result<Self, Error> {
        Ok(Self {
            header_decoder: HeaderDecoder::new(ir.header_tokens())?,
            ir,
        })
    }

    /// Decode the header, select the message by template id, and print the
    /// body.
    pub fn print(&self, buffer: &[u8]) -> Result<String, Error> {
        let block_length = self.header_decoder.block_length(buffer)?;
        let template_id = self.header_decoder.template_id(buffer)?;
        let schema_id = self.header_decoder.schema_id(buffer)?;
        let acting_version = self.header_decoder.schema_version(buffer)?;

        if schema_id != self.ir.id() as u64 {
            return Err(Error::SchemaIdMismatch {
                expected: self.ir.id(),
                actual: schema_id,
            });
        }

        let message_offset = self.header_decoder.encoded_length() as usize;
        let body = buffer.get(message_offset..).ok_or(Error::MalformedWire {
            offset: 0,
            needed: message_offset,
        })?;
        let tokens = self
            .ir
            .message_by_id(template_id as i32)
            .ok_or(Error::UnknownTemplateId(template_id))?;

        let mut listener = JsonTokenListener::new();
        decode::decode(body, acting_version, block_length, tokens, &mut listener)?;
        Ok(listener.into_output())
    }
}
