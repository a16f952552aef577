//! Hand-written codec for a flat message covering every primitive type,
//! with one trailing optional field added in schema version 1.

use sbe_runtime::ByteOrder;
use sbe_runtime::flyweight::{MessageHeader, ReadBuf, WriteBuf};

pub const SBE_BLOCK_LENGTH: u16 = 61;
pub const SBE_TEMPLATE_ID: u16 = 11;
pub const SBE_SCHEMA_ID: u16 = 1;
pub const SBE_SCHEMA_VERSION: u16 = 1;

/// Block length before `extra` was appended in version 1.
pub const V0_BLOCK_LENGTH: u16 = 57;
pub const EXTRA_NULL_VALUE: u32 = u32::MAX;
const EXTRA_SINCE_VERSION: u16 = 1;

const ORDER: ByteOrder = ByteOrder::LittleEndian;

pub struct Simple0Encoder<'a> {
    buf: WriteBuf<'a>,
    offset: usize,
    limit: usize,
}

impl<'a> Simple0Encoder<'a> {
    pub fn wrap_and_apply_header(buffer: &'a mut [u8], offset: usize) -> Self {
        let header = MessageHeader {
            block_length: SBE_BLOCK_LENGTH,
            template_id: SBE_TEMPLATE_ID,
            schema_id: SBE_SCHEMA_ID,
            version: SBE_SCHEMA_VERSION,
        };
        header.write(&mut buffer[offset..], ORDER).unwrap();
        let body_offset = offset + MessageHeader::ENCODED_LENGTH;
        Self {
            buf: WriteBuf::new(buffer),
            offset: body_offset,
            limit: body_offset + SBE_BLOCK_LENGTH as usize,
        }
    }

    pub fn encoded_length(&self) -> usize {
        self.limit - self.offset
    }

    pub fn u64_field(&mut self, value: u64) -> &mut Self {
        let offset = self.offset;
        self.buf.put_u64_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn u32_field(&mut self, value: u32) -> &mut Self {
        let offset = self.offset + 8;
        self.buf.put_u32_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn u16_field(&mut self, value: u16) -> &mut Self {
        let offset = self.offset + 12;
        self.buf.put_u16_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn u8_field(&mut self, value: u8) -> &mut Self {
        let offset = self.offset + 14;
        self.buf.put_u8_at(offset, value).unwrap();
        self
    }

    pub fn i8_field(&mut self, value: i8) -> &mut Self {
        let offset = self.offset + 15;
        self.buf.put_i8_at(offset, value).unwrap();
        self
    }

    pub fn i16_field(&mut self, value: i16) -> &mut Self {
        let offset = self.offset + 16;
        self.buf.put_i16_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn i32_field(&mut self, value: i32) -> &mut Self {
        let offset = self.offset + 18;
        self.buf.put_i32_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn i64_field(&mut self, value: i64) -> &mut Self {
        let offset = self.offset + 22;
        self.buf.put_i64_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn f32_field(&mut self, value: f32) -> &mut Self {
        let offset = self.offset + 30;
        self.buf.put_f32_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn f64_field(&mut self, value: f64) -> &mut Self {
        let offset = self.offset + 34;
        self.buf.put_f64_at(offset, value, ORDER).unwrap();
        self
    }

    pub fn string6(&mut self, value: &[u8; 6]) -> &mut Self {
        let offset = self.offset + 42;
        self.buf.put_slice_at(offset, value).unwrap();
        self
    }

    pub fn string1(&mut self, value: u8) -> &mut Self {
        let offset = self.offset + 48;
        self.buf.put_char_at(offset, value).unwrap();
        self
    }

    pub fn put_int2_values(&mut self, first: i32, second: i32) -> &mut Self {
        let offset = self.offset + 49;
        self.buf.put_i32_at(offset, first, ORDER).unwrap();
        self.buf.put_i32_at(offset + 4, second, ORDER).unwrap();
        self
    }

    /// Since version 1.
    pub fn extra(&mut self, value: u32) -> &mut Self {
        let offset = self.offset + 57;
        self.buf.put_u32_at(offset, value, ORDER).unwrap();
        self
    }
}

pub struct Simple0Decoder<'a> {
    buf: ReadBuf<'a>,
    offset: usize,
    limit: usize,
    acting_version: u16,
}

impl<'a> Simple0Decoder<'a> {
    pub fn wrap(
        buffer: &'a [u8],
        offset: usize,
        acting_block_length: u16,
        acting_version: u16,
    ) -> Self {
        Self {
            buf: ReadBuf::new(buffer),
            offset,
            limit: offset + acting_block_length as usize,
            acting_version,
        }
    }

    pub fn encoded_length(&self) -> usize {
        self.limit - self.offset
    }

    pub fn u64_field(&self) -> u64 {
        self.buf.get_u64_at(self.offset, ORDER).unwrap()
    }

    pub fn u32_field(&self) -> u32 {
        self.buf.get_u32_at(self.offset + 8, ORDER).unwrap()
    }

    pub fn u16_field(&self) -> u16 {
        self.buf.get_u16_at(self.offset + 12, ORDER).unwrap()
    }

    pub fn u8_field(&self) -> u8 {
        self.buf.get_u8_at(self.offset + 14).unwrap()
    }

    pub fn i8_field(&self) -> i8 {
        self.buf.get_i8_at(self.offset + 15).unwrap()
    }

    pub fn i16_field(&self) -> i16 {
        self.buf.get_i16_at(self.offset + 16, ORDER).unwrap()
    }

    pub fn i32_field(&self) -> i32 {
        self.buf.get_i32_at(self.offset + 18, ORDER).unwrap()
    }

    pub fn i64_field(&self) -> i64 {
        self.buf.get_i64_at(self.offset + 22, ORDER).unwrap()
    }

    pub fn f32_field(&self) -> f32 {
        self.buf.get_f32_at(self.offset + 30, ORDER).unwrap()
    }

    pub fn f64_field(&self) -> f64 {
        self.buf.get_f64_at(self.offset + 34, ORDER).unwrap()
    }

    pub fn string6(&self) -> &'a [u8] {
        self.buf.get_slice_at(self.offset + 42, 6).unwrap()
    }

    pub fn string1(&self) -> u8 {
        self.buf.get_char_at(self.offset + 48).unwrap()
    }

    pub fn int2_index(&self, index: usize) -> i32 {
        self.buf
            .get_i32_at(self.offset + 49 + index * 4, ORDER)
            .unwrap()
    }

    /// Null when the wire predates the field.
    pub fn extra(&self) -> u32 {
        if self.acting_version < EXTRA_SINCE_VERSION {
            return EXTRA_NULL_VALUE;
        }
        self.buf.get_u32_at(self.offset + 57, ORDER).unwrap()
    }
}
