//! Bounds-checked big-endian reader over a borrowed byte slice.

use crate::error::TrsError;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Cursor positioned at `pos`, which must lie within the data.
    pub(crate) fn at(data: &'a [u8], pos: usize) -> Result<Self, TrsError> {
        let mut cursor = Self::new(data);
        cursor.set_position(pos)?;
        Ok(cursor)
    }

    pub(crate) fn set_position(&mut self, pos: usize) -> Result<(), TrsError> {
        if pos > self.data.len() {
            return Err(TrsError::UnexpectedEof { offset: pos });
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], TrsError> {
        let end = self
            .pos
            .checked_add(N)
            .ok_or(TrsError::UnexpectedEof { offset: self.pos })?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(TrsError::UnexpectedEof {
                offset: self.data.len(),
            })?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        self.pos = end;
        Ok(buf)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, TrsError> {
        let [b] = self.read_fixed_bytes::<1>()?;
        Ok(b)
    }

    pub(crate) fn read_u16_be(&mut self) -> Result<u16, TrsError> {
        Ok(u16::from_be_bytes(self.read_fixed_bytes()?))
    }

    pub(crate) fn read_u32_be(&mut self) -> Result<u32, TrsError> {
        Ok(u32::from_be_bytes(self.read_fixed_bytes()?))
    }
}
