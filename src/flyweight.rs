//! Runtime support for generated flyweight codecs.
//!
//! A flyweight owns no memory: it is a base offset plus a moving `limit`
//! (position cursor) over a caller-owned buffer. Nested group and var-data
//! codecs take their parent by value and hand it back through `parent()`,
//! so a single shared limit advances through the message while the parent
//! is inert.

use crate::bytes::{self, ByteOrder, Error};

/// Read-only view of a wrapped buffer with offset-addressed accessors.
#[derive(Debug, Clone, Copy)]
pub struct ReadBuf<'a> {
    data: &'a [u8],
}

impl<'a> ReadBuf<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn get_slice_at(&self, offset: usize, length: usize) -> Result<&'a [u8], Error> {
        self.data
            .get(offset..offset + length)
            .ok_or(Error::BufferOverflow)
    }

    fn tail(&self, offset: usize) -> Result<&'a [u8], Error> {
        self.data.get(offset..).ok_or(Error::BufferOverflow)
    }

    pub fn get_char_at(&self, offset: usize) -> Result<u8, Error> {
        bytes::get_char(self.tail(offset)?)
    }

    pub fn get_u8_at(&self, offset: usize) -> Result<u8, Error> {
        bytes::get_u8(self.tail(offset)?)
    }

    pub fn get_i8_at(&self, offset: usize) -> Result<i8, Error> {
        bytes::get_i8(self.tail(offset)?)
    }

    pub fn get_u16_at(&self, offset: usize, order: ByteOrder) -> Result<u16, Error> {
        bytes::get_u16(self.tail(offset)?, order)
    }

    pub fn get_u32_at(&self, offset: usize, order: ByteOrder) -> Result<u32, Error> {
        bytes::get_u32(self.tail(offset)?, order)
    }

    pub fn get_u64_at(&self, offset: usize, order: ByteOrder) -> Result<u64, Error> {
        bytes::get_u64(self.tail(offset)?, order)
    }

    pub fn get_i16_at(&self, offset: usize, order: ByteOrder) -> Result<i16, Error> {
        bytes::get_i16(self.tail(offset)?, order)
    }

    pub fn get_i32_at(&self, offset: usize, order: ByteOrder) -> Result<i32, Error> {
        bytes::get_i32(self.tail(offset)?, order)
    }

    pub fn get_i64_at(&self, offset: usize, order: ByteOrder) -> Result<i64, Error> {
        bytes::get_i64(self.tail(offset)?, order)
    }

    pub fn get_f32_at(&self, offset: usize, order: ByteOrder) -> Result<f32, Error> {
        bytes::get_f32(self.tail(offset)?, order)
    }

    pub fn get_f64_at(&self, offset: usize, order: ByteOrder) -> Result<f64, Error> {
        bytes::get_f64(self.tail(offset)?, order)
    }
}

/// Mutable view of a wrapped buffer with offset-addressed accessors.
#[derive(Debug)]
pub struct WriteBuf<'a> {
    data: &'a mut [u8],
}

impl<'a> WriteBuf<'a> {
    #[must_use]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Re-borrow the written bytes for decoding against the same buffer.
    #[must_use]
    pub fn as_read_buf(&self) -> ReadBuf<'_> {
        ReadBuf::new(self.data)
    }

    pub fn window_mut(&mut self, offset: usize, length: usize) -> Result<&mut [u8], Error> {
        self.data
            .get_mut(offset..offset + length)
            .ok_or(Error::BufferOverflow)
    }

    pub fn put_slice_at(&mut self, offset: usize, value: &[u8]) -> Result<(), Error> {
        self.data
            .get_mut(offset..offset + value.len())
            .ok_or(Error::BufferOverflow)?
            .copy_from_slice(value);
        Ok(())
    }

    fn tail(&mut self, offset: usize) -> Result<&mut [u8], Error> {
        self.data.get_mut(offset..).ok_or(Error::BufferOverflow)
    }

    pub fn put_char_at(&mut self, offset: usize, value: u8) -> Result<(), Error> {
        bytes::put_char(self.tail(offset)?, value)
    }

    pub fn put_u8_at(&mut self, offset: usize, value: u8) -> Result<(), Error> {
        bytes::put_u8(self.tail(offset)?, value)
    }

    pub fn put_i8_at(&mut self, offset: usize, value: i8) -> Result<(), Error> {
        bytes::put_i8(self.tail(offset)?, value)
    }

    pub fn put_u16_at(&mut self, offset: usize, value: u16, order: ByteOrder) -> Result<(), Error> {
        bytes::put_u16(self.tail(offset)?, value, order)
    }

    pub fn put_u32_at(&mut self, offset: usize, value: u32, order: ByteOrder) -> Result<(), Error> {
        bytes::put_u32(self.tail(offset)?, value, order)
    }

    pub fn put_u64_at(&mut self, offset: usize, value: u64, order: ByteOrder) -> Result<(), Error> {
        bytes::put_u64(self.tail(offset)?, value, order)
    }

    pub fn put_i16_at(&mut self, offset: usize, value: i16, order: ByteOrder) -> Result<(), Error> {
        bytes::put_i16(self.tail(offset)?, value, order)
    }

    pub fn put_i32_at(&mut self, offset: usize, value: i32, order: ByteOrder) -> Result<(), Error> {
        bytes::put_i32(self.tail(offset)?, value, order)
    }

    pub fn put_i64_at(&mut self, offset: usize, value: i64, order: ByteOrder) -> Result<(), Error> {
        bytes::put_i64(self.tail(offset)?, value, order)
    }

    pub fn put_f32_at(&mut self, offset: usize, value: f32, order: ByteOrder) -> Result<(), Error> {
        bytes::put_f32(self.tail(offset)?, value, order)
    }

    pub fn put_f64_at(&mut self, offset: usize, value: f64, order: ByteOrder) -> Result<(), Error> {
        bytes::put_f64(self.tail(offset)?, value, order)
    }
}

/// Read access to the wrapped buffer.
pub trait Reader<'a> {
    fn get_buf(&self) -> &ReadBuf<'a>;
}

/// Write access to the wrapped buffer.
pub trait Writer<'a> {
    fn get_buf_mut(&mut self) -> &mut WriteBuf<'a>;
}

/// A decoding flyweight: the `limit` is the position cursor, shared with
/// any live sub-codec.
pub trait Decoder<'a>: Reader<'a> {
    fn get_limit(&self) -> usize;
    fn set_limit(&mut self, limit: usize);
}

/// An encoding flyweight with the same shared position cursor.
pub trait Encoder<'a>: Writer<'a> {
    fn get_limit(&self) -> usize;
    fn set_limit(&mut self, limit: usize);
}

/// The schema version a decoder honors when interpreting a buffer.
pub trait ActingVersion {
    fn acting_version(&self) -> u16;
}

/// The standard message header composite preceding every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub block_length: u16,
    pub template_id: u16,
    pub schema_id: u16,
    pub version: u16,
}

impl MessageHeader {
    pub const ENCODED_LENGTH: usize = 8;

    pub fn read(buffer: &[u8], order: ByteOrder) -> Result<Self, Error> {
        Ok(Self {
            block_length: bytes::get_u16(buffer, order)?,
            template_id: bytes::get_u16(buffer.get(2..).ok_or(Error::BufferOverflow)?, order)?,
            schema_id: bytes::get_u16(buffer.get(4..).ok_or(Error::BufferOverflow)?, order)?,
            version: bytes::get_u16(buffer.get(6..).ok_or(Error::BufferOverflow)?, order)?,
        })
    }

    pub fn write(&self, buffer: &mut [u8], order: ByteOrder) -> Result<(), Error> {
        bytes::put_u16(buffer, self.block_length, order)?;
        bytes::put_u16(buffer.get_mut(2..).ok_or(Error::BufferOverflow)?, self.template_id, order)?;
        bytes::put_u16(buffer.get_mut(4..).ok_or(Error::BufferOverflow)?, self.schema_id, order)?;
        bytes::put_u16(buffer.get_mut(6..).ok_or(Error::BufferOverflow)?, self.version, order)
    }
}

/// The standard dimension composite introducing a repeating group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupSizeEncoding {
    pub block_length: u16,
    pub num_in_group: u16,
}

impl GroupSizeEncoding {
    pub const ENCODED_LENGTH: usize = 4;

    pub fn read(buffer: &[u8], order: ByteOrder) -> Result<Self, Error> {
        Ok(Self {
            block_length: bytes::get_u16(buffer, order)?,
            num_in_group: bytes::get_u16(buffer.get(2..).ok_or(Error::BufferOverflow)?, order)?,
        })
    }

    pub fn write(&self, buffer: &mut [u8], order: ByteOrder) -> Result<(), Error> {
        bytes::put_u16(buffer, self.block_length, order)?;
        bytes::put_u16(buffer.get_mut(2..).ok_or(Error::BufferOverflow)?, self.num_in_group, order)
    }
}
