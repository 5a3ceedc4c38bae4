//! Payload layouts used by tests.

/// A fixed-size payload of 24 bytes, deliberately not a power of two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct BasicInfo {
    pub id: u64,
    pub created: u64,
    pub flags: u32,
    pub count: u32,
}

/// Head of a variable-length name record; `length` bytes of name follow it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct NameHeader {
    pub length: u32,
    pub reserved: u32,
}

/// Serializes a name record: a [`NameHeader`] followed by the name bytes.
pub fn name_record(name: &str) -> Vec<u8> {
    let header = NameHeader {
        length: name.len() as u32,
        reserved: 0,
    };
    let mut record = bytemuck::bytes_of(&header).to_vec();
    record.extend_from_slice(name.as_bytes());
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts() {
        assert_eq!(std::mem::size_of::<BasicInfo>(), 24);
        assert_eq!(std::mem::size_of::<NameHeader>(), 8);
    }

    #[test]
    fn test_name_record() {
        let record = name_record("abc");
        assert_eq!(record.len(), 11);
        assert_eq!(&record[..4], &3u32.to_ne_bytes());
        assert_eq!(&record[8..], b"abc");
    }
}
