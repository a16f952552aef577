use crate::encoding::{PrimitiveType, PrimitiveValue};
use crate::listener::{
    TokenListener, const_or_not_present_value, read_encoding_as_int, read_encoding_as_uint,
};
use crate::token::Token;
use std::fmt::Write;

/// A listener that renders each decoded value as one `Scope.field=value`
/// line, with the scope built from the message, composite, and group names.
#[derive(Debug, Default)]
pub struct TextTokenListener {
    output: String,
    composite_level: usize,
    named_scope: Vec<String>,
}

impl TextTokenListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    fn print_scope(&mut self) {
        let scope = self.named_scope.concat();
        self.output.push_str(&scope);
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

    fn read_encoding_as_string(
        &self,
        buffer: &[u8],
        type_token: &Token,
        field_version: u64,
        acting_version: u64,
    ) -> String {
        let const_or_null = const_or_not_present_value(type_token, field_version, acting_version);
        if !const_or_null.is_none() {
            return const_or_null.to_string();
        }

        let encoding = &type_token.encoding;
        let element_size = encoding.primitive_type.size();
        let array_length = type_token.array_length() as usize;

        // Character arrays read as one contiguous string up to the first NUL.
        if encoding.primitive_type == PrimitiveType::Char && array_length > 1 {
            let mut value = String::new();
            for i in 0..array_length {
                match buffer.get(i) {
                    Some(&b) if b != 0 => value.push(b as char),
                    _ => break,
                }
            }
            return value;
        }

        let mut value = String::new();
        for i in 0..array_length {
            if i > 0 {
                value.push_str(", ");
            }
            let start = i * element_size;
            let element = PrimitiveValue::from_wire(
                encoding.primitive_type,
                buffer.get(start..start + element_size).unwrap_or_default(),
                encoding.byte_order,
            );
            let _ = write!(value, "{element}");
        }
        value
    }
}

impl TokenListener for TextTokenListener {
    fn on_begin_message(&mut self, token: &Token) {
        self.named_scope.push(format!("{}.", token.name));
    }

    fn on_end_message(&mut self, _token: &Token) {
        self.named_scope.pop();
    }

    fn on_encoding(
        &mut self,
        field_token: &Token,
        buffer: &[u8],
        type_token: &Token,
        acting_version: u64,
    ) {
        let value = self.read_encoding_as_string(
            buffer,
            type_token,
            field_token.version as u64,
            acting_version,
        );
        self.print_scope();
        let name = if self.composite_level > 0 {
            &type_token.name
        } else {
            &field_token.name
        };
        let _ = writeln!(self.output, "{name}={value}");
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
        let type_token = &tokens[from_index + 1];
        let field_version = field_token.version as u64;

        let mut value = "";
        let name;
        if field_token.is_constant_encoding() {
            // A constant enum reference reads `Type.NAME`; keep the final
            // segment.
            name = field_token.encoding.const_value.to_string();
            value = match name.rfind('.') {
                Some(dot) => &name[dot + 1..],
                None => name.as_str(),
            };
        } else if type_token.encoding.primitive_type.is_unsigned() {
            let encoded = read_encoding_as_uint(buffer, type_token, field_version, acting_version);
            for token in &tokens[from_index + 1..to_index] {
                if token.encoding.const_value.as_uint() == encoded {
                    value = &token.name;
                    break;
                }
            }
        } else {
            let encoded = read_encoding_as_int(buffer, type_token, field_version, acting_version);
            for token in &tokens[from_index + 1..to_index] {
                if token.encoding.const_value.as_int() == encoded {
                    value = &token.name;
                    break;
                }
            }
        }

        let line = format!(
            "{}={value}\n",
            self.determine_name(0, field_token, tokens, from_index)
        );
        self.print_scope();
        self.output.push_str(&line);
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
        // A set is a fixed-width unsigned integer; each choice holds its bit
        // position.
        let type_token = &tokens[from_index + 1];
        let encoded = read_encoding_as_uint(
            buffer,
            type_token,
            field_token.version as u64,
            acting_version,
        );
        let mut line = format!("{}:", self.determine_name(0, field_token, tokens, from_index));
        for token in &tokens[from_index + 1..to_index] {
            let bit_position = token.encoding.const_value.as_uint();
            let flag = encoded & (1 << bit_position) != 0;
            let _ = write!(line, " {}={flag}", token.name);
        }
        line.push('\n');
        self.print_scope();
        self.output.push_str(&line);
    }

    fn on_begin_composite(
        &mut self,
        field_token: &Token,
        tokens: &[Token],
        from_index: usize,
        _to_index: usize,
    ) {
        self.composite_level += 1;
        let scope = format!(
            "{}.",
            self.determine_name(1, field_token, tokens, from_index)
        );
        self.named_scope.push(scope);
    }

    fn on_end_composite(
        &mut self,
        _field_token: &Token,
        _tokens: &[Token],
        _from_index: usize,
        _to_index: usize,
    ) {
        self.composite_level -= 1;
        self.named_scope.pop();
    }

    fn on_group_header(&mut self, token: &Token, num_in_group: u64) {
        self.print_scope();
        let _ = writeln!(
            self.output,
            "{} Group Header : numInGroup={num_in_group}",
            token.name
        );
    }

    fn on_begin_group(&mut self, token: &Token, _group_index: u64, _num_in_group: u64) {
        self.named_scope.push(format!("{}.", token.name));
    }

    fn on_end_group(&mut self, _token: &Token, _group_index: u64, _num_in_group: u64) {
        self.named_scope.pop();
    }

    fn on_var_data(&mut self, field_token: &Token, buffer: &[u8], length: u64, type_token: &Token) {
        let value = if type_token.encoding.character_encoding.is_empty() {
            format!("{length} bytes of raw data")
        } else {
            String::from_utf8_lossy(&buffer[..length as usize]).into_owned()
        };
        self.print_scope();
        let _ = writeln!(self.output, "{}={value}", field_token.name);
    }
}
