//! Bounds-checked read-only access to a byte buffer.
//!
//! Every read takes an explicit offset relative to the start of the view and
//! is validated against the view length before any byte is touched. Offsets
//! come from untrusted input, so all end positions are computed with
//! `checked_add`: an overflowing range is reported exactly like a range that
//! runs past the end.

use thiserror::Error;

/// A read that would go past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("read of {needed} bytes at offset {offset} exceeds buffer of {available} bytes")]
pub struct OutOfBounds {
    /// Offset the read started at.
    pub offset: usize,
    /// Number of bytes the read required.
    pub needed: usize,
    /// Total length of the view.
    pub available: usize,
}

/// Read-only view over a borrowed byte buffer.
///
/// The view never copies the buffer; [`ByteStreamView::read_fixed`] and
/// [`ByteStreamView::sub_view`] hand out sub-slices of the same storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteStreamView<'a> {
    data: &'a [u8],
}

impl<'a> ByteStreamView<'a> {
    /// Wraps `data`.
    #[inline]
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Number of bytes in the view.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the view holds no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Checks that `length` bytes are readable at `offset`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if `offset + length` overflows or exceeds the view.
    #[inline]
    pub const fn check(&self, offset: usize, length: usize) -> Result<(), OutOfBounds> {
        match offset.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(OutOfBounds {
                offset,
                needed: length,
                available: self.data.len(),
            }),
        }
    }

    /// Returns the `length` bytes starting at `offset`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if the range is not inside the view.
    #[inline]
    pub fn read_fixed(&self, offset: usize, length: usize) -> Result<&'a [u8], OutOfBounds> {
        let out_of_bounds = OutOfBounds {
            offset,
            needed: length,
            available: self.data.len(),
        };
        let end = offset.checked_add(length).ok_or(out_of_bounds)?;
        self.data.get(offset..end).ok_or(out_of_bounds)
    }

    /// Reads `N` bytes at `offset` into an array.
    ///
    /// # Errors
    /// [`OutOfBounds`] if the range is not inside the view.
    #[inline]
    pub fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], OutOfBounds> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_fixed(offset, N)?);
        Ok(out)
    }

    /// Reads one byte at `offset`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if `offset` is past the end.
    #[inline]
    pub fn read_u8(&self, offset: usize) -> Result<u8, OutOfBounds> {
        self.data.get(offset).copied().ok_or(OutOfBounds {
            offset,
            needed: 1,
            available: self.data.len(),
        })
    }

    /// Reads a little-endian `u16` at `offset`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if fewer than 2 bytes remain at `offset`.
    #[inline]
    pub fn read_u16_le(&self, offset: usize) -> Result<u16, OutOfBounds> {
        self.read_array(offset).map(u16::from_le_bytes)
    }

    /// Reads a little-endian `u32` at `offset`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if fewer than 4 bytes remain at `offset`.
    #[inline]
    pub fn read_u32_le(&self, offset: usize) -> Result<u32, OutOfBounds> {
        self.read_array(offset).map(u32::from_le_bytes)
    }

    /// A view over `length` bytes starting at `offset`.
    ///
    /// Offsets passed to the returned view are relative to `offset`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if the range is not inside this view.
    #[inline]
    pub fn sub_view(&self, offset: usize, length: usize) -> Result<Self, OutOfBounds> {
        self.read_fixed(offset, length).map(Self::new)
    }

    /// A cursor positioned at `offset`.
    #[inline]
    #[must_use]
    pub const fn cursor_at(&self, offset: usize) -> ByteCursor<'a> {
        ByteCursor {
            view: *self,
            position: offset,
        }
    }
}

impl<'a> From<&'a [u8]> for ByteStreamView<'a> {
    #[inline]
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

/// Sequential reader over a [`ByteStreamView`].
///
/// The position only advances when a read succeeds, so a failed read leaves
/// the cursor where it was.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    view: ByteStreamView<'a>,
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Current offset in the underlying view.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The view this cursor reads from.
    #[inline]
    #[must_use]
    pub const fn view(&self) -> ByteStreamView<'a> {
        self.view
    }

    /// Moves the cursor forward by `count` bytes without reading.
    ///
    /// # Errors
    /// [`OutOfBounds`] if that would move past the end of the view.
    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<(), OutOfBounds> {
        self.view.check(self.position, count)?;
        self.advance(count);
        Ok(())
    }

    /// Reads one byte.
    ///
    /// # Errors
    /// [`OutOfBounds`] at the end of the view.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, OutOfBounds> {
        let value = self.view.read_u8(self.position)?;
        self.advance(1);
        Ok(value)
    }

    /// Reads a little-endian `u16`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if fewer than 2 bytes remain.
    #[inline]
    pub fn read_u16_le(&mut self) -> Result<u16, OutOfBounds> {
        let value = self.view.read_u16_le(self.position)?;
        self.advance(2);
        Ok(value)
    }

    /// Reads a little-endian `u32`.
    ///
    /// # Errors
    /// [`OutOfBounds`] if fewer than 4 bytes remain.
    #[inline]
    pub fn read_u32_le(&mut self) -> Result<u32, OutOfBounds> {
        let value = self.view.read_u32_le(self.position)?;
        self.advance(4);
        Ok(value)
    }

    /// Reads `N` raw bytes.
    ///
    /// # Errors
    /// [`OutOfBounds`] if fewer than `N` bytes remain.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], OutOfBounds> {
        let value = self.view.read_array::<N>(self.position)?;
        self.advance(N);
        Ok(value)
    }

    /// Reads `length` raw bytes as a sub-slice of the view.
    ///
    /// # Errors
    /// [`OutOfBounds`] if fewer than `length` bytes remain.
    #[inline]
    pub fn read_fixed(&mut self, length: usize) -> Result<&'a [u8], OutOfBounds> {
        let value = self.view.read_fixed(self.position, length)?;
        self.advance(length);
        Ok(value)
    }

    // Only called after the same range was validated against the view,
    // whose length bounds the sum.
    const fn advance(&mut self, count: usize) {
        self.position += count;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DATA: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn reads_little_endian() {
        let view = ByteStreamView::new(&DATA);
        assert_eq!(view.read_u8(0).unwrap(), 0x01);
        assert_eq!(view.read_u16_le(0).unwrap(), 0x0201);
        assert_eq!(view.read_u32_le(4).unwrap(), 0x0807_0605);
        assert_eq!(view.read_fixed(6, 2).unwrap(), &[0x07, 0x08]);
        assert_eq!(view.read_array::<3>(1).unwrap(), [0x02, 0x03, 0x04]);
    }

    #[test]
    fn rejects_reads_past_the_end() {
        let view = ByteStreamView::new(&DATA);
        assert_eq!(
            view.read_u32_le(5),
            Err(OutOfBounds {
                offset: 5,
                needed: 4,
                available: 8
            })
        );
        assert!(view.read_u8(8).is_err());
        assert!(view.read_fixed(0, 9).is_err());
        assert!(view.read_fixed(8, 0).is_ok());
    }

    #[test]
    fn rejects_overflowing_offsets() {
        let view = ByteStreamView::new(&DATA);
        assert!(view.read_u16_le(usize::MAX).is_err());
        assert!(view.read_fixed(usize::MAX - 1, 4).is_err());
        assert!(view.check(1, usize::MAX).is_err());
    }

    #[test]
    fn sub_view_is_relative() {
        let view = ByteStreamView::new(&DATA);
        let sub = view.sub_view(4, 4).unwrap();
        assert_eq!(sub.len(), 4);
        assert_eq!(sub.read_u8(0).unwrap(), 0x05);
        assert!(sub.read_u8(4).is_err());
    }

    #[test]
    fn cursor_advances_only_on_success() {
        let view = ByteStreamView::new(&DATA);
        let mut cursor = view.cursor_at(2);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x0403);
        assert_eq!(cursor.position(), 4);
        assert!(cursor.read_array::<8>().is_err());
        assert_eq!(cursor.position(), 4);
        cursor.skip(3).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 0x08);
        assert!(cursor.skip(1).is_err());
    }

    proptest! {
        #[test]
        fn reads_never_panic(data in proptest::collection::vec(any::<u8>(), 0..64), offset in any::<usize>(), length in 0usize..128) {
            let view = ByteStreamView::new(&data);
            let fits = offset.checked_add(length).is_some_and(|end| end <= data.len());
            prop_assert_eq!(view.read_fixed(offset, length).is_ok(), fits);
            let _ = view.read_u32_le(offset);
            let _ = view.read_u16_le(offset);
            let _ = view.read_u8(offset);
        }
    }
}
