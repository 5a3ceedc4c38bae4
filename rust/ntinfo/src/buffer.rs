//! Buffers exchanged with the query and set primitives.
//!
//! A [`ScopedBuffer`] lives for exactly one attempt and is released when it goes out of
//! scope. The only way to keep its contents past the attempt is [`ScopedBuffer::detach`],
//! which hands the storage to the caller as an [`InfoBuffer`].

use ntinfo_bytes::{AlignedByteVec, accounting};
use ntinfo_common::{Result, error::Error};

/// Storage for a single query or set attempt.
pub struct ScopedBuffer {
    data: AlignedByteVec,
}

impl ScopedBuffer {
    /// Allocates a zero-filled buffer of `len` bytes.
    pub fn allocate(len: usize) -> ScopedBuffer {
        accounting::record_allocation(len);
        ScopedBuffer {
            data: AlignedByteVec::zeroed(len),
        }
    }

    /// Allocates a buffer of `len` bytes with the bytes of `default` at its head.
    ///
    /// The remainder is zero-filled; when `len` is shorter than `T`, the template
    /// is truncated.
    pub fn from_default<T>(default: &T, len: usize) -> ScopedBuffer
    where
        T: bytemuck::NoUninit,
    {
        let mut buffer = ScopedBuffer::allocate(len);
        let template = bytemuck::bytes_of(default);
        let n = template.len().min(len);
        buffer.data[..n].copy_from_slice(&template[..n]);
        buffer
    }

    /// Allocates a buffer sized exactly to `value`'s layout and holding its bytes.
    pub fn from_value<T>(value: &T) -> ScopedBuffer
    where
        T: bytemuck::NoUninit,
    {
        ScopedBuffer::from_default(value, std::mem::size_of::<T>())
    }

    /// Allocates a buffer holding a copy of `bytes`.
    pub fn copy_from_slice(bytes: &[u8]) -> ScopedBuffer {
        let mut buffer = ScopedBuffer::allocate(bytes.len());
        buffer.data.as_mut_slice().copy_from_slice(bytes);
        buffer
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copies a `T` out of the head of the buffer.
    ///
    /// Only meaningful after the attempt that filled the buffer reported success.
    pub fn read<T>(&self) -> Result<T>
    where
        T: bytemuck::AnyBitPattern,
    {
        read_prefix(&self.data)
    }

    /// Transfers the storage to the caller without releasing it.
    pub fn detach(mut self) -> InfoBuffer {
        let data = std::mem::take(&mut self.data);
        // The emptied shell owns no allocation; skipping its drop keeps the buffer
        // counted as live, now on behalf of the returned `InfoBuffer`.
        std::mem::forget(self);
        InfoBuffer { data }
    }
}

impl Drop for ScopedBuffer {
    fn drop(&mut self) {
        accounting::record_release(self.data.len());
    }
}

impl std::fmt::Debug for ScopedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedBuffer")
            .field("len", &self.len())
            .finish()
    }
}

/// A buffer holding the response of a successful query, owned by the caller.
pub struct InfoBuffer {
    data: AlignedByteVec,
}

impl InfoBuffer {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Borrows the head of the buffer as a `T`.
    ///
    /// The storage is 128-byte aligned, so this succeeds for every payload type of at
    /// most that alignment, as long as the buffer is at least `size_of::<T>()` long.
    pub fn payload<T>(&self) -> Result<&T>
    where
        T: bytemuck::AnyBitPattern,
    {
        let required = std::mem::size_of::<T>();
        self.data
            .try_typed_prefix::<T>()
            .ok_or_else(|| Error::payload_too_small(required, self.len()))
    }

    /// Copies a `T` out of the head of the buffer.
    pub fn read<T>(&self) -> Result<T>
    where
        T: bytemuck::AnyBitPattern,
    {
        read_prefix(&self.data)
    }

    /// The bytes following the fixed-layout head of type `T`, where variable-length
    /// payloads usually keep their trailing data.
    pub fn trailing<T>(&self) -> &[u8] {
        let head = std::mem::size_of::<T>().min(self.len());
        &self.data[head..]
    }

    /// Consumes the buffer, returning its contents as a plain vector.
    pub fn into_vec(self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl Drop for InfoBuffer {
    fn drop(&mut self) {
        accounting::record_release(self.data.len());
    }
}

impl std::ops::Deref for InfoBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl PartialEq for InfoBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for InfoBuffer {}

impl std::fmt::Debug for InfoBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoBuffer")
            .field("len", &self.len())
            .finish()
    }
}

fn read_prefix<T>(data: &[u8]) -> Result<T>
where
    T: bytemuck::AnyBitPattern,
{
    let required = std::mem::size_of::<T>();
    if data.len() < required {
        return Err(Error::payload_too_small(required, data.len()));
    }
    Ok(bytemuck::pod_read_unaligned(&data[..required]))
}
