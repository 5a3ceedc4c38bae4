use std::{collections::VecDeque, sync::Mutex};

use bitflags::bitflags;
use ntinfo::{DEFAULT_MAX_BRUTE_FORCE_LENGTH, InfoClass, InfoResource, NtStatus, QueryStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TestClass {
    Basic = 0,
    Name = 1,
    Flags = 2,
    Unsupported = 3,
}

impl InfoClass for TestClass {
    fn raw(self) -> i32 {
        self as i32
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TestRights: u32 {
        const QUERY = 0x1;
        const SET = 0x2;
    }
}

/// What length a [`ScriptedResource`] reports along with a size failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthReport {
    /// The exact length of the stored information.
    Exact,
    /// No length (`0`).
    None,
    /// A fixed, possibly wrong, length.
    Fixed(usize),
}

/// One call to a primitive, as seen by the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Query { class: TestClass, len: usize },
    Set { class: TestClass, bytes: Vec<u8> },
}

/// An in-memory resource holding one blob of information per query.
///
/// A query succeeds when the buffer can hold the stored information, copying it to
/// the head of the buffer; otherwise it fails with the configured size-failure status
/// and length report. Responses pushed with [`ScriptedResource::push_response`] take
/// precedence, in order, over that default behavior.
pub struct ScriptedResource {
    state: Mutex<State>,
    size_failure: NtStatus,
    report: LengthReport,
    ceiling: usize,
    rights: TestRights,
}

struct State {
    data: Vec<u8>,
    responses: VecDeque<QueryStatus>,
    set_status: NtStatus,
    attempts: Vec<Attempt>,
}

impl ScriptedResource {
    /// A resource whose information is `data`.
    pub fn with_data(data: impl Into<Vec<u8>>) -> ScriptedResource {
        ScriptedResource {
            state: Mutex::new(State {
                data: data.into(),
                responses: VecDeque::new(),
                set_status: NtStatus::SUCCESS,
                attempts: Vec::new(),
            }),
            size_failure: NtStatus::INFO_LENGTH_MISMATCH,
            report: LengthReport::Exact,
            ceiling: DEFAULT_MAX_BRUTE_FORCE_LENGTH,
            rights: TestRights::all(),
        }
    }

    /// A resource whose information is `len` bytes of a recognizable pattern.
    pub fn with_len(len: usize) -> ScriptedResource {
        Self::with_data(pattern(len))
    }

    pub fn size_failure(mut self, status: NtStatus) -> ScriptedResource {
        self.size_failure = status;
        self
    }

    pub fn report(mut self, report: LengthReport) -> ScriptedResource {
        self.report = report;
        self
    }

    pub fn ceiling(mut self, ceiling: usize) -> ScriptedResource {
        self.ceiling = ceiling;
        self
    }

    pub fn rights(mut self, rights: TestRights) -> ScriptedResource {
        self.rights = rights;
        self
    }

    pub fn set_status(self, status: NtStatus) -> ScriptedResource {
        self.lock().set_status = status;
        self
    }

    /// Queues a response for the next query, ahead of the default behavior.
    ///
    /// A queued success still copies as much of the stored information as fits.
    pub fn push_response(&self, response: QueryStatus) {
        self.lock().responses.push_back(response);
    }

    pub fn data(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.lock().attempts.clone()
    }

    /// Buffer lengths of the recorded queries, in call order.
    pub fn query_sizes(&self) -> Vec<usize> {
        self.lock()
            .attempts
            .iter()
            .filter_map(|a| match a {
                Attempt::Query { len, .. } => Some(*len),
                Attempt::Set { .. } => None,
            })
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.query_sizes().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl InfoResource for ScriptedResource {
    type Class = TestClass;
    type Rights = TestRights;

    fn granted_access(&self) -> TestRights {
        self.rights
    }

    fn query_information(&self, class: TestClass, buffer: &mut [u8]) -> QueryStatus {
        let mut state = self.lock();
        state.attempts.push(Attempt::Query {
            class,
            len: buffer.len(),
        });
        if class == TestClass::Unsupported {
            return QueryStatus::unsupported();
        }
        if !self.rights.contains(TestRights::QUERY) {
            return QueryStatus::failure(NtStatus::ACCESS_DENIED);
        }

        let required = state.data.len();
        if let Some(response) = state.responses.pop_front() {
            if response.status.is_success() {
                let n = required.min(buffer.len());
                buffer[..n].copy_from_slice(&state.data[..n]);
            }
            return response;
        }

        if buffer.len() >= required {
            buffer[..required].copy_from_slice(&state.data);
            return QueryStatus::success(required);
        }
        let reported = match self.report {
            LengthReport::Exact => required,
            LengthReport::None => 0,
            LengthReport::Fixed(len) => len,
        };
        QueryStatus::new(self.size_failure, reported)
    }

    fn set_information(&self, class: TestClass, buffer: &[u8]) -> NtStatus {
        let mut state = self.lock();
        state.attempts.push(Attempt::Set {
            class,
            bytes: buffer.to_vec(),
        });
        if class == TestClass::Unsupported {
            return NtStatus::NOT_SUPPORTED;
        }
        if !self.rights.contains(TestRights::SET) {
            return NtStatus::ACCESS_DENIED;
        }
        let status = state.set_status;
        if status.is_success() {
            state.data = buffer.to_vec();
        }
        status
    }

    fn max_brute_force_length(&self) -> usize {
        self.ceiling
    }
}

/// `len` bytes of a pattern that does not repeat with any power-of-two period.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 + 1).collect()
}
