use crate::align::{align_down, align_up, is_aligned_ptr};

/// Growable byte storage whose first byte always sits on an [`AlignedByteVec::ALIGNMENT`]
/// boundary.
///
/// Information payloads are read in place from the head of the storage, so the
/// alignment must survive every reallocation. The backing `Vec` is over-allocated and
/// the payload starts at the first aligned address inside it.
pub struct AlignedByteVec {
    storage: Vec<u8>,
    /// Number of padding bytes in `storage` ahead of the payload.
    head: usize,
}

impl AlignedByteVec {
    /// Alignment of the payload start, in bytes.
    pub const ALIGNMENT: usize = 128;
    /// Granularity of the usable capacity.
    const BLOCK_SIZE: usize = 64;

    /// An empty vector without an allocation.
    pub const fn new() -> AlignedByteVec {
        AlignedByteVec {
            storage: Vec::new(),
            head: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> AlignedByteVec {
        if capacity == 0 {
            return AlignedByteVec::new();
        }
        let reserved = align_up(capacity, Self::BLOCK_SIZE)
            .checked_add(Self::ALIGNMENT)
            .expect("aligned capacity overflow");
        let mut storage = Vec::<u8>::with_capacity(reserved);
        let addr = storage.as_ptr() as usize;
        let head = align_up(addr, Self::ALIGNMENT) - addr;
        storage.resize(head, 0);
        let vec = AlignedByteVec { storage, head };
        debug_assert!(vec.capacity() >= capacity);
        vec
    }

    /// `len` zero bytes.
    pub fn zeroed(len: usize) -> AlignedByteVec {
        let mut vec = AlignedByteVec::with_capacity(len);
        vec.resize(len, 0);
        vec
    }

    pub fn copy_from_slice(data: &[u8]) -> AlignedByteVec {
        let mut vec = AlignedByteVec::with_capacity(data.len());
        vec.extend_from_slice(data);
        vec
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len() - self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload bytes that fit without moving the storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        align_down(self.storage.capacity() - self.head, Self::BLOCK_SIZE)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.head..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.head..]
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.ensure_spare(bytes.len());
        self.storage.extend_from_slice(bytes);
    }

    /// Sets the length to `new_len`, filling added bytes with `value`.
    pub fn resize(&mut self, new_len: usize, value: u8) {
        if new_len > self.len() {
            self.ensure_spare(new_len - self.len());
        }
        self.storage.resize(self.head + new_len, value);
    }

    pub fn truncate(&mut self, new_len: usize) {
        self.storage.truncate(self.head + new_len);
    }

    /// Whether the byte at `offset` sits on an `alignment` boundary.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the payload.
    pub fn is_aligned_at(&self, offset: usize, alignment: usize) -> bool {
        assert!(offset <= self.len());
        is_aligned_ptr(self.as_slice().as_ptr().wrapping_add(offset), alignment)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Appends the bytes of `value`.
    pub fn push_typed<T>(&mut self, value: &T)
    where
        T: bytemuck::NoUninit,
    {
        self.extend_from_slice(bytemuck::bytes_of(value));
    }

    /// Views the first `size_of::<T>()` bytes as a `T`.
    ///
    /// `None` when the payload is shorter than `T` or `T` needs more alignment than the
    /// storage provides.
    pub fn try_typed_prefix<T>(&self) -> Option<&T>
    where
        T: bytemuck::AnyBitPattern,
    {
        let head = self.as_slice().get(..std::mem::size_of::<T>())?;
        bytemuck::try_from_bytes(head).ok()
    }

    /// Makes room for `additional` more bytes, moving the payload to a new aligned
    /// allocation when the current one is full.
    fn ensure_spare(&mut self, additional: usize) {
        if self.capacity() - self.len() >= additional {
            return;
        }
        let needed = self
            .len()
            .checked_add(additional)
            .expect("aligned capacity overflow");
        let mut moved = AlignedByteVec::with_capacity(needed.max(self.capacity() * 2));
        moved.storage.extend_from_slice(self.as_slice());
        *self = moved;
    }
}

impl std::ops::Deref for AlignedByteVec {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl std::ops::DerefMut for AlignedByteVec {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl Clone for AlignedByteVec {
    fn clone(&self) -> AlignedByteVec {
        AlignedByteVec::copy_from_slice(self.as_slice())
    }
}

impl std::fmt::Debug for AlignedByteVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedByteVec")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

impl Default for AlignedByteVec {
    fn default() -> Self {
        AlignedByteVec::new()
    }
}
