use kash_hashes::HasherBase;

pub mod header;
pub mod tx;

/// Writes hashed fields in the canonical little-endian layout
pub trait HasherExtensions {
    fn write_bool(&mut self, element: bool) -> &mut Self;

    fn write_u8(&mut self, element: u8) -> &mut Self;

    fn write_u16(&mut self, element: u16) -> &mut Self;

    fn write_u32(&mut self, element: u32) -> &mut Self;

    fn write_u64(&mut self, element: u64) -> &mut Self;

    /// Writes the length as u64 little endian followed by the bytes
    fn write_var_bytes(&mut self, element: &[u8]) -> &mut Self;

    fn write_len(&mut self, len: usize) -> &mut Self;
}

impl<T: HasherBase> HasherExtensions for T {
    #[inline(always)]
    fn write_bool(&mut self, element: bool) -> &mut Self {
        self.update(if element { [1u8] } else { [0u8] })
    }

    #[inline(always)]
    fn write_u8(&mut self, element: u8) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u16(&mut self, element: u16) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u32(&mut self, element: u32) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u64(&mut self, element: u64) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_var_bytes(&mut self, element: &[u8]) -> &mut Self {
        self.write_len(element.len()).update(element)
    }

    #[inline(always)]
    fn write_len(&mut self, len: usize) -> &mut Self {
        self.write_u64(len as u64)
    }
}
