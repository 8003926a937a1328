//! Fixed-width integers that can be copied in and out of a message.

mod private {
    pub trait Sealed {}
}

/// A fixed-width integer with a little-endian wire representation.
///
/// Sealed: the buffer relies on `SIZE` matching the byte count produced by
/// `write_le` exactly.
pub trait Scalar: Copy + Default + private::Sealed {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Decodes from the first `SIZE` bytes of `src`.
    fn read_le(src: &[u8]) -> Self;

    /// Encodes into the first `SIZE` bytes of `dst`.
    fn write_le(self, dst: &mut [u8]);
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl Scalar for $ty {
                const SIZE: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn read_le(src: &[u8]) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&src[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le(self, dst: &mut [u8]) {
                    dst[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, i8, i16, i32, i64);
