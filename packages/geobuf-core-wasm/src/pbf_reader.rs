//! Field-by-field protobuf reader.
//!
//! A thin cursor over `prost::encoding` that hands out one field at a time,
//! so each message type can be decoded with a plain `match` on the tag.
//! Nested messages borrow from the parent buffer.

use prost::encoding::{self, DecodeContext, WireType};

use crate::error::{DecodeError, Result};

pub struct PbfReader<'a> {
    buf: &'a [u8],
    tag: u32,
    wire_type: WireType,
}

impl<'a> PbfReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            tag: 0,
            wire_type: WireType::Varint,
        }
    }

    /// Advance to the next field. Returns `false` once the buffer is drained.
    pub fn next_field(&mut self) -> Result<bool> {
        if self.buf.is_empty() {
            return Ok(false);
        }
        let (tag, wire_type) = encoding::decode_key(&mut self.buf)?;
        self.tag = tag;
        self.wire_type = wire_type;
        Ok(true)
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn get_string(&mut self) -> Result<String> {
        let mut value = String::new();
        encoding::string::merge(self.wire_type, &mut value, &mut self.buf, DecodeContext::default())?;
        Ok(value)
    }

    pub fn get_double(&mut self) -> Result<f64> {
        let mut value = 0.0;
        encoding::double::merge(self.wire_type, &mut value, &mut self.buf, DecodeContext::default())?;
        Ok(value)
    }

    pub fn get_uint64(&mut self) -> Result<u64> {
        let mut value = 0;
        encoding::uint64::merge(self.wire_type, &mut value, &mut self.buf, DecodeContext::default())?;
        Ok(value)
    }

    pub fn get_int64(&mut self) -> Result<i64> {
        let mut value = 0;
        encoding::int64::merge(self.wire_type, &mut value, &mut self.buf, DecodeContext::default())?;
        Ok(value)
    }

    pub fn get_sint64(&mut self) -> Result<i64> {
        let mut value = 0;
        encoding::sint64::merge(self.wire_type, &mut value, &mut self.buf, DecodeContext::default())?;
        Ok(value)
    }

    pub fn get_bool(&mut self) -> Result<bool> {
        let mut value = false;
        encoding::bool::merge(self.wire_type, &mut value, &mut self.buf, DecodeContext::default())?;
        Ok(value)
    }

    pub fn get_enum(&mut self) -> Result<i32> {
        let mut value = 0;
        encoding::int32::merge(self.wire_type, &mut value, &mut self.buf, DecodeContext::default())?;
        Ok(value)
    }

    /// Reader over the nested message in the current field.
    pub fn get_message(&mut self) -> Result<PbfReader<'a>> {
        encoding::check_wire_type(WireType::LengthDelimited, self.wire_type)?;
        let len = encoding::decode_varint(&mut self.buf)?;
        let available = self.buf.len();
        let len = usize::try_from(len)
            .ok()
            .filter(|len| *len <= available)
            .ok_or(DecodeError::Truncated {
                needed: len as usize,
                available,
            })?;
        let buf = self.buf;
        let (message, rest) = buf.split_at(len);
        self.buf = rest;
        Ok(PbfReader::new(message))
    }

    /// Packed (or single unpacked) `uint32` values, appended to `out`.
    pub fn get_packed_uint32(&mut self, out: &mut Vec<u32>) -> Result<()> {
        encoding::uint32::merge_repeated(self.wire_type, out, &mut self.buf, DecodeContext::default())?;
        Ok(())
    }

    /// Packed (or single unpacked) zig-zag `sint64` values, appended to `out`.
    pub fn get_packed_sint64(&mut self, out: &mut Vec<i64>) -> Result<()> {
        encoding::sint64::merge_repeated(self.wire_type, out, &mut self.buf, DecodeContext::default())?;
        Ok(())
    }

    pub fn skip(&mut self) -> Result<()> {
        encoding::skip_field(self.wire_type, self.tag, &mut self.buf, DecodeContext::default())?;
        Ok(())
    }
}
