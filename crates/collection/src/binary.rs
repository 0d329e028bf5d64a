//! Little-endian primitives shared by both collection file formats.
//!
//! Strings use the length-prefixed layout of .NET's `BinaryWriter`: an
//! unsigned LEB128 byte length followed by UTF-8. The legacy format puts a
//! `0x0B` marker in front of every string.

use crate::error::{ErrorKind, Result};

pub(crate) const STRING_MARKER: u8 = 0x0B;
// Five 7-bit groups cover every u32.
const MAX_LEB128_BYTES: usize = 5;

#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}
impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// Counts are stored as signed 32-bit integers.
    pub fn count(&mut self, len: usize) -> Result<&mut Self> {
        let len = i32::try_from(len).map_err(|_| ErrorKind::corrupt(format!("count {len} does not fit in i32")))?;
        Ok(self.i32(len))
    }

    pub fn str(&mut self, value: &str) -> Result<&mut Self> {
        let len = u32::try_from(value.len())
            .map_err(|_| ErrorKind::corrupt(format!("string of {} bytes is too long", value.len())))?;
        let mut remaining = len;
        loop {
            let byte = (remaining & 0x7F) as u8;
            remaining >>= 7;
            match remaining {
                0 => {
                    self.buf.push(byte);
                    break;
                },
                _ => self.buf.push(byte | 0x80),
            }
        }
        Ok(self.bytes(value.as_bytes()))
    }

    pub fn marked_str(&mut self, value: &str) -> Result<&mut Self> {
        self.u8(STRING_MARKER).str(value)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a borrowed buffer. Running out of input is always
/// [`ErrorKind::CorruptDatabase`].
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}
impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.bytes.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(len).filter(|end| *end <= self.bytes.len()).ok_or_else(|| {
            ErrorKind::corrupt(format!("unexpected end of input at byte {} (wanted {len} more)", self.position))
        })?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    /// A count field: a non-negative `i32`.
    pub fn count(&mut self) -> Result<usize> {
        let position = self.position;
        let count = self.i32()?;
        Ok(usize::try_from(count).map_err(|_| ErrorKind::corrupt(format!("negative count {count} at byte {position}")))?)
    }

    fn leb128(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for group in 0..MAX_LEB128_BYTES {
            let byte = self.u8()?;
            value |= u32::from(byte & 0x7F) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        exn::bail!(ErrorKind::corrupt(format!("string length overflows at byte {}", self.position)))
    }

    pub fn str(&mut self) -> Result<String> {
        let len = self.leb128()? as usize;
        let position = self.position;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())
            .map_err(|_| ErrorKind::corrupt(format!("string at byte {position} is not valid UTF-8")))?)
    }

    pub fn marked_str(&mut self) -> Result<String> {
        let position = self.position;
        match self.u8()? {
            STRING_MARKER => self.str(),
            other => exn::bail!(ErrorKind::corrupt(format!(
                "expected string marker {STRING_MARKER:#04x} at byte {position}, found {other:#04x}"
            ))),
        }
    }
}
