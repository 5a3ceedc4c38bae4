//! Per-thread accounting of information buffers.
//!
//! Every buffer allocated for a query or set attempt is recorded here when it is
//! created and again when it is released. The counters are kept per thread: an attempt
//! never leaves the thread that made it, so the per-thread view is exact for everything
//! except a returned buffer that the caller later drops on another thread.

use std::cell::Cell;

thread_local! {
    static STATS: Cell<BufferStats> = const { Cell::new(BufferStats::ZERO) };
}

/// Snapshot of the buffer counters of the current thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of buffers allocated.
    pub allocated: u64,
    /// Number of buffers released.
    pub released: u64,
    /// Total number of bytes across all allocated buffers.
    pub allocated_bytes: u64,
    /// Total number of bytes across all released buffers.
    pub released_bytes: u64,
}

impl BufferStats {
    const ZERO: BufferStats = BufferStats {
        allocated: 0,
        released: 0,
        allocated_bytes: 0,
        released_bytes: 0,
    };

    /// Number of buffers allocated but not yet released.
    pub fn live(&self) -> u64 {
        self.allocated - self.released
    }

    /// Bytes held by buffers allocated but not yet released.
    pub fn live_bytes(&self) -> u64 {
        self.allocated_bytes.saturating_sub(self.released_bytes)
    }

    /// Counter deltas accumulated since `earlier` was taken.
    pub fn since(&self, earlier: &BufferStats) -> BufferStats {
        BufferStats {
            allocated: self.allocated - earlier.allocated,
            released: self.released - earlier.released,
            allocated_bytes: self.allocated_bytes.saturating_sub(earlier.allocated_bytes),
            released_bytes: self.released_bytes.saturating_sub(earlier.released_bytes),
        }
    }
}

/// Records the allocation of a buffer of `len` bytes.
pub fn record_allocation(len: usize) {
    STATS.with(|s| {
        let mut stats = s.get();
        stats.allocated += 1;
        stats.allocated_bytes = stats.allocated_bytes.saturating_add(len as u64);
        s.set(stats);
    });
}

/// Records the release of a buffer of `len` bytes.
///
/// A release without a matching allocation on this thread is clamped, so the counters
/// never underflow.
pub fn record_release(len: usize) {
    STATS.with(|s| {
        let mut stats = s.get();
        if stats.released < stats.allocated {
            stats.released += 1;
            stats.released_bytes = stats
                .released_bytes
                .saturating_add(len as u64)
                .min(stats.allocated_bytes);
        }
        s.set(stats);
    });
}

/// Returns the counters of the current thread.
pub fn snapshot() -> BufferStats {
    STATS.with(|s| s.get())
}

/// Number of buffers allocated on this thread that are still alive.
pub fn live() -> u64 {
    snapshot().live()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_release() {
        let before = snapshot();
        record_allocation(24);
        record_allocation(32);
        assert_eq!(snapshot().since(&before).live(), 2);
        record_release(32);
        let delta = snapshot().since(&before);
        assert_eq!(delta.allocated, 2);
        assert_eq!(delta.released, 1);
        assert_eq!(delta.allocated_bytes, 56);
        assert_eq!(delta.released_bytes, 32);
        assert_eq!(delta.live_bytes(), 24);
        record_release(24);
        let delta = snapshot().since(&before);
        assert_eq!(delta.live(), 0);
        assert_eq!(delta.live_bytes(), 0);
    }

    #[test]
    fn test_counters_are_per_thread() {
        record_allocation(8);
        let other = std::thread::spawn(snapshot).join().unwrap();
        assert_eq!(other, BufferStats::default());
        record_release(8);
    }

    #[test]
    fn test_release_never_underflows() {
        std::thread::spawn(|| {
            record_release(16);
            assert_eq!(snapshot(), BufferStats::default());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_byte_counters_saturate() {
        std::thread::spawn(|| {
            record_allocation(usize::MAX);
            record_allocation(usize::MAX);
            let stats = snapshot();
            assert_eq!(stats.allocated, 2);
            assert_eq!(stats.allocated_bytes, u64::MAX);
            record_release(usize::MAX);
            record_release(usize::MAX);
            assert_eq!(snapshot().released_bytes, u64::MAX);
            assert_eq!(snapshot().live_bytes(), 0);
        })
        .join()
        .unwrap();
    }
}
