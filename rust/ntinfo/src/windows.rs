//! Native Windows resources: processes, threads and generic kernel objects, queried
//! through the `Nt*Information*` family of system calls.
//!
//! The resources borrow their handle and never close it.

use std::os::windows::io::{AsRawHandle, BorrowedHandle};

use bitflags::bitflags;
use ntinfo_common::{NtStatus, Result};
use windows_sys::{
    Wdk::{
        Foundation::NtQueryObject,
        System::Threading::{
            NtQueryInformationProcess, NtQueryInformationThread, NtSetInformationThread,
        },
    },
    Win32::System::Threading::{GetCurrentProcess, GetCurrentThread},
};

use crate::{
    access::InfoAccess,
    buffer::InfoBuffer,
    class::InfoClass,
    mode::ErrorMode,
    resource::{InfoResource, QueryStatus},
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProcessRights: u32 {
        const SET_INFORMATION = 0x0200;
        const QUERY_INFORMATION = 0x0400;
        const QUERY_LIMITED_INFORMATION = 0x1000;
        const ALL_ACCESS = 0x001F_FFFF;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ThreadRights: u32 {
        const SET_INFORMATION = 0x0020;
        const QUERY_INFORMATION = 0x0040;
        const SET_LIMITED_INFORMATION = 0x0400;
        const QUERY_LIMITED_INFORMATION = 0x0800;
        const ALL_ACCESS = 0x001F_FFFF;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ProcessClass {
    Basic = 0,
    IoCounters = 2,
    VmCounters = 3,
    Times = 4,
    HandleCount = 20,
    ImageFileName = 27,
    ImageFileNameWin32 = 43,
    CommandLine = 60,
}

impl InfoClass for ProcessClass {
    fn raw(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ThreadClass {
    Basic = 0,
    Times = 1,
    Priority = 2,
    BasePriority = 3,
    AffinityMask = 4,
    QuerySetWin32StartAddress = 9,
    HideFromDebugger = 17,
    Name = 38,
}

impl InfoClass for ThreadClass {
    fn raw(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ObjectClass {
    Basic = 0,
    Name = 1,
    Type = 2,
}

impl InfoClass for ObjectClass {
    fn raw(self) -> i32 {
        self as i32
    }
}

/// Header of a counted UTF-16 string, followed in the buffer by the characters it
/// points to.
#[derive(Debug, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct UnicodeStringHeader {
    /// Length of the string in bytes, without a terminator.
    pub length: u16,
    pub maximum_length: u16,
    _pad: u32,
    pub buffer: usize,
}

impl UnicodeStringHeader {
    /// Decodes the string a successful query placed in `info`.
    ///
    /// Returns `None` when the string does not lie within `info`.
    pub fn decode(info: &InfoBuffer) -> Result<Option<String>> {
        let header = info.payload::<UnicodeStringHeader>()?;
        if header.length == 0 {
            return Ok(Some(String::new()));
        }
        let base = info.as_slice().as_ptr() as usize;
        let Some(offset) = header.buffer.checked_sub(base) else {
            return Ok(None);
        };
        let Some(end) = offset.checked_add(header.length as usize) else {
            return Ok(None);
        };
        if end > info.len() {
            return Ok(None);
        }
        let units: Vec<u16> = info[offset..end]
            .chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect();
        Ok(Some(String::from_utf16_lossy(&units)))
    }
}

#[derive(Debug, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct ProcessBasicInformation {
    pub exit_status: i32,
    _pad0: u32,
    pub peb_base_address: usize,
    pub affinity_mask: usize,
    pub base_priority: i32,
    _pad1: u32,
    pub unique_process_id: usize,
    pub inherited_from_unique_process_id: usize,
}

/// A borrowed process handle.
pub struct Process<'a> {
    handle: BorrowedHandle<'a>,
    rights: ProcessRights,
}

impl<'a> Process<'a> {
    /// Wraps `handle`, opened with `rights`.
    pub fn new(handle: BorrowedHandle<'a>, rights: ProcessRights) -> Process<'a> {
        Process { handle, rights }
    }

    /// The calling process, through its pseudo handle.
    pub fn current() -> Process<'static> {
        // The pseudo handle is a constant that never needs closing.
        let handle = unsafe { BorrowedHandle::borrow_raw(GetCurrentProcess()) };
        Process::new(handle, ProcessRights::ALL_ACCESS)
    }

    pub fn basic_information(&self) -> Result<ProcessBasicInformation> {
        self.query_fixed(
            ProcessClass::Basic,
            ProcessBasicInformation::default(),
            ErrorMode::Propagate,
        )?
        .into_result("query process basic information")
    }

    /// The NT path of the process image.
    pub fn image_file_name(&self) -> Result<String> {
        let info = self
            .query_variable(
                ProcessClass::ImageFileName,
                &UnicodeStringHeader::default(),
                ErrorMode::Propagate,
            )?
            .into_result("query process image file name")?;
        Ok(UnicodeStringHeader::decode(&info)?.unwrap_or_default())
    }
}

impl InfoResource for Process<'_> {
    type Class = ProcessClass;
    type Rights = ProcessRights;

    fn granted_access(&self) -> ProcessRights {
        self.rights
    }

    fn query_information(&self, class: ProcessClass, buffer: &mut [u8]) -> QueryStatus {
        let Ok(len) = u32::try_from(buffer.len()) else {
            return QueryStatus::failure(NtStatus::INVALID_PARAMETER);
        };
        let mut returned = 0u32;
        let status = unsafe {
            NtQueryInformationProcess(
                self.handle.as_raw_handle(),
                class.raw(),
                buffer.as_mut_ptr().cast(),
                len,
                &mut returned,
            )
        };
        QueryStatus::new(NtStatus::from_raw(status), returned as usize)
    }
}

/// A borrowed thread handle.
pub struct Thread<'a> {
    handle: BorrowedHandle<'a>,
    rights: ThreadRights,
}

impl<'a> Thread<'a> {
    pub fn new(handle: BorrowedHandle<'a>, rights: ThreadRights) -> Thread<'a> {
        Thread { handle, rights }
    }

    /// The calling thread, through its pseudo handle.
    pub fn current() -> Thread<'static> {
        let handle = unsafe { BorrowedHandle::borrow_raw(GetCurrentThread()) };
        Thread::new(handle, ThreadRights::ALL_ACCESS)
    }
}

impl InfoResource for Thread<'_> {
    type Class = ThreadClass;
    type Rights = ThreadRights;

    fn granted_access(&self) -> ThreadRights {
        self.rights
    }

    fn query_information(&self, class: ThreadClass, buffer: &mut [u8]) -> QueryStatus {
        let Ok(len) = u32::try_from(buffer.len()) else {
            return QueryStatus::failure(NtStatus::INVALID_PARAMETER);
        };
        let mut returned = 0u32;
        let status = unsafe {
            NtQueryInformationThread(
                self.handle.as_raw_handle(),
                class.raw(),
                buffer.as_mut_ptr().cast(),
                len,
                &mut returned,
            )
        };
        QueryStatus::new(NtStatus::from_raw(status), returned as usize)
    }

    fn set_information(&self, class: ThreadClass, buffer: &[u8]) -> NtStatus {
        let Ok(len) = u32::try_from(buffer.len()) else {
            return NtStatus::INVALID_PARAMETER;
        };
        let status = unsafe {
            NtSetInformationThread(
                self.handle.as_raw_handle(),
                class.raw(),
                buffer.as_ptr().cast(),
                len,
            )
        };
        NtStatus::from_raw(status)
    }
}

/// Any kernel object handle, queried through `NtQueryObject`.
pub struct Object<'a> {
    handle: BorrowedHandle<'a>,
    rights: u32,
}

impl<'a> Object<'a> {
    pub fn new(handle: BorrowedHandle<'a>, rights: u32) -> Object<'a> {
        Object { handle, rights }
    }

    /// The object's name in the object manager namespace; empty for unnamed objects.
    pub fn name(&self) -> Result<String> {
        let info = self
            .query_variable(
                ObjectClass::Name,
                &UnicodeStringHeader::default(),
                ErrorMode::Propagate,
            )?
            .into_result("query object name")?;
        Ok(UnicodeStringHeader::decode(&info)?.unwrap_or_default())
    }

    /// The name of the object's type, e.g. `File` or `Event`.
    pub fn type_name(&self) -> Result<String> {
        let info = self
            .query_variable(
                ObjectClass::Type,
                &UnicodeStringHeader::default(),
                ErrorMode::Propagate,
            )?
            .into_result("query object type")?;
        Ok(UnicodeStringHeader::decode(&info)?.unwrap_or_default())
    }
}

impl InfoResource for Object<'_> {
    type Class = ObjectClass;
    type Rights = u32;

    fn granted_access(&self) -> u32 {
        self.rights
    }

    fn query_information(&self, class: ObjectClass, buffer: &mut [u8]) -> QueryStatus {
        let Ok(len) = u32::try_from(buffer.len()) else {
            return QueryStatus::failure(NtStatus::INVALID_PARAMETER);
        };
        let mut returned = 0u32;
        let status = unsafe {
            NtQueryObject(
                self.handle.as_raw_handle(),
                class.raw(),
                buffer.as_mut_ptr().cast(),
                len,
                &mut returned,
            )
        };
        QueryStatus::new(NtStatus::from_raw(status), returned as usize)
    }
}

#[cfg(test)]
mod tests {
    use std::os::windows::io::AsHandle;

    use super::*;

    #[test]
    fn test_current_process_basic_information() {
        let info = Process::current().basic_information().unwrap();
        assert_eq!(info.unique_process_id, std::process::id() as usize);
    }

    #[test]
    fn test_current_process_image_file_name() {
        let name = Process::current().image_file_name().unwrap();
        assert!(name.to_ascii_lowercase().ends_with(".exe"), "{name}");
    }

    #[test]
    fn test_file_object_type_name() {
        let file = std::fs::File::open(std::env::current_exe().unwrap()).unwrap();
        let object = Object::new(file.as_handle(), 0x0012_0089);
        assert_eq!(object.type_name().unwrap(), "File");
    }

    #[test]
    fn test_decode_rejects_string_outside_buffer() {
        let mut scoped = crate::buffer::ScopedBuffer::allocate(64);
        let header = UnicodeStringHeader {
            length: 0xFFFE,
            maximum_length: 0xFFFE,
            _pad: 0,
            buffer: usize::MAX,
        };
        scoped.as_mut_slice()[..16].copy_from_slice(bytemuck::bytes_of(&header));
        let info = scoped.detach();
        assert_eq!(UnicodeStringHeader::decode(&info).unwrap(), None);
    }

    #[test]
    fn test_thread_unsupported_set_is_reported() {
        let res = Thread::current()
            .set(ThreadClass::Basic, &0u64, ErrorMode::Report)
            .unwrap();
        assert!(res.is_failure());
    }
}
