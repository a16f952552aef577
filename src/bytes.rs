use num_enum::TryFromPrimitive;
use std::{error, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    BufferOverflow,
    UnexpectedType,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BufferOverflow => "buffer overflow",
            Self::UnexpectedType => "unexpected primitive type",
        })
    }
}

impl error::Error for Error {}

/// Byte order applied when reading or writing a multi-byte primitive.
///
/// Each encoding carries its own order, so dispatch happens per call rather
/// than per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ByteOrder {
    LittleEndian = 0,
    BigEndian = 1,
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::LittleEndian
    }
}

macro_rules! get_fn {
    ($name:ident, $ty:ty, $size:literal) => {
        #[inline]
        pub fn $name(buffer: &[u8], order: ByteOrder) -> Result<$ty, Error> {
            let (chunk, _) = buffer
                .split_first_chunk::<$size>()
                .ok_or(Error::BufferOverflow)?;
            Ok(match order {
                ByteOrder::LittleEndian => <$ty>::from_le_bytes(*chunk),
                ByteOrder::BigEndian => <$ty>::from_be_bytes(*chunk),
            })
        }
    };
}

macro_rules! put_fn {
    ($name:ident, $ty:ty, $size:literal) => {
        #[inline]
        pub fn $name(buffer: &mut [u8], value: $ty, order: ByteOrder) -> Result<(), Error> {
            let (chunk, _) = buffer
                .split_first_chunk_mut::<$size>()
                .ok_or(Error::BufferOverflow)?;
            *chunk = match order {
                ByteOrder::LittleEndian => value.to_le_bytes(),
                ByteOrder::BigEndian => value.to_be_bytes(),
            };
            Ok(())
        }
    };
}

#[inline]
pub fn get_u8(buffer: &[u8]) -> Result<u8, Error> {
    buffer.first().copied().ok_or(Error::BufferOverflow)
}

#[inline]
pub fn get_i8(buffer: &[u8]) -> Result<i8, Error> {
    get_u8(buffer).map(|b| b as i8)
}

/// A `char` is a single octet; SBE character data is not byte-order sensitive.
#[inline]
pub fn get_char(buffer: &[u8]) -> Result<u8, Error> {
    get_u8(buffer)
}

get_fn!(get_u16, u16, 2);
get_fn!(get_u32, u32, 4);
get_fn!(get_u64, u64, 8);
get_fn!(get_i16, i16, 2);
get_fn!(get_i32, i32, 4);
get_fn!(get_i64, i64, 8);

/// Float conversions go through the IEEE-754 bit pattern.
#[inline]
pub fn get_f32(buffer: &[u8], order: ByteOrder) -> Result<f32, Error> {
    get_u32(buffer, order).map(f32::from_bits)
}

#[inline]
pub fn get_f64(buffer: &[u8], order: ByteOrder) -> Result<f64, Error> {
    get_u64(buffer, order).map(f64::from_bits)
}

#[inline]
pub fn put_u8(buffer: &mut [u8], value: u8) -> Result<(), Error> {
    *buffer.first_mut().ok_or(Error::BufferOverflow)? = value;
    Ok(())
}

#[inline]
pub fn put_i8(buffer: &mut [u8], value: i8) -> Result<(), Error> {
    put_u8(buffer, value as u8)
}

#[inline]
pub fn put_char(buffer: &mut [u8], value: u8) -> Result<(), Error> {
    put_u8(buffer, value)
}

put_fn!(put_u16, u16, 2);
put_fn!(put_u32, u32, 4);
put_fn!(put_u64, u64, 8);
put_fn!(put_i16, i16, 2);
put_fn!(put_i32, i32, 4);
put_fn!(put_i64, i64, 8);

#[inline]
pub fn put_f32(buffer: &mut [u8], value: f32, order: ByteOrder) -> Result<(), Error> {
    put_u32(buffer, value.to_bits(), order)
}

#[inline]
pub fn put_f64(buffer: &mut [u8], value: f64, order: ByteOrder) -> Result<(), Error> {
    put_u64(buffer, value.to_bits(), order)
}

#[test]
fn test_get_put_round_trip() {
    let mut buf = [0u8; 8];
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        put_u16(&mut buf, 0xBEEF, order).unwrap();
        assert_eq!(0xBEEF, get_u16(&buf, order).unwrap());
        put_u32(&mut buf, 123_456, order).unwrap();
        assert_eq!(123_456, get_u32(&buf, order).unwrap());
        put_u64(&mut buf, 2_863_311_530, order).unwrap();
        assert_eq!(2_863_311_530, get_u64(&buf, order).unwrap());
        put_i32(&mut buf, -32, order).unwrap();
        assert_eq!(-32, get_i32(&buf, order).unwrap());
        put_i64(&mut buf, i64::MIN, order).unwrap();
        assert_eq!(i64::MIN, get_i64(&buf, order).unwrap());
        put_f32(&mut buf, 3.14, order).unwrap();
        assert_eq!(3.14, get_f32(&buf, order).unwrap());
        put_f64(&mut buf, -3.14e7, order).unwrap();
        assert_eq!(-3.14e7, get_f64(&buf, order).unwrap());
    }
    put_u8(&mut buf, 63).unwrap();
    assert_eq!(63, get_u8(&buf).unwrap());
    put_i8(&mut buf, -8).unwrap();
    assert_eq!(-8, get_i8(&buf).unwrap());
}

#[test]
fn test_byte_order_layout() {
    let mut buf = [0u8; 4];
    put_u32(&mut buf, 0x0102_0304, ByteOrder::LittleEndian).unwrap();
    assert_eq!([4, 3, 2, 1], buf);
    put_u32(&mut buf, 0x0102_0304, ByteOrder::BigEndian).unwrap();
    assert_eq!([1, 2, 3, 4], buf);
}

#[test]
fn test_short_buffer() {
    let buf = [0u8; 3];
    assert_eq!(Err(Error::BufferOverflow), get_u32(&buf, ByteOrder::LittleEndian));
    assert_eq!(Err(Error::BufferOverflow), get_u8(&[]));
    let mut buf = [0u8; 7];
    assert_eq!(
        Err(Error::BufferOverflow),
        put_u64(&mut buf, 1, ByteOrder::LittleEndian)
    );
}
