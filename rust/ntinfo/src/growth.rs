//! Adaptive buffer sizing for information whose size is not known in advance.
//!
//! A query starts with a buffer sized to the default payload. When the resource
//! answers with a size failure, the accessor either trusts the length the resource
//! reported and retries once at exactly that size, or, when no length was reported,
//! probes power-of-two sizes up to the resource's ceiling.

use ntinfo_bytes::align::round_up_pow2;
use ntinfo_common::{NtStatus, Result, error::Error, verify_arg};
use serde::{Deserialize, Serialize};

use crate::{
    buffer::{InfoBuffer, ScopedBuffer},
    mode::Outcome,
    resource::{DEFAULT_MAX_BRUTE_FORCE_LENGTH, InfoResource, QueryStatus},
};

/// Upper bound accepted for a configured brute-force ceiling, and for a length reported
/// by the resource.
pub const MAX_BRUTE_FORCE_LIMIT: usize = 1 << 30;

/// Parameters of the variable-size query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthPolicy {
    /// Largest buffer brute-force probing may try. `0` disables probing.
    pub max_brute_force_length: usize,
    /// Whether a nonzero length reported with a size failure is used as-is for a single
    /// retry. When disabled, the report is ignored and probing is used instead.
    pub trust_hint: bool,
}

impl GrowthPolicy {
    /// The policy a resource asks for: its own ceiling, trusting reported lengths.
    ///
    /// A ceiling above [`MAX_BRUTE_FORCE_LIMIT`] is clamped to it.
    pub fn for_resource<R: InfoResource + ?Sized>(resource: &R) -> GrowthPolicy {
        GrowthPolicy {
            max_brute_force_length: resource
                .max_brute_force_length()
                .min(MAX_BRUTE_FORCE_LIMIT),
            ..Default::default()
        }
    }

    pub fn with_max_brute_force_length(mut self, len: usize) -> GrowthPolicy {
        self.max_brute_force_length = len;
        self
    }

    pub fn with_trust_hint(mut self, trust_hint: bool) -> GrowthPolicy {
        self.trust_hint = trust_hint;
        self
    }

    pub fn without_brute_force(self) -> GrowthPolicy {
        self.with_max_brute_force_length(0)
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(
            max_brute_force_length,
            self.max_brute_force_length <= MAX_BRUTE_FORCE_LIMIT
        );
        Ok(())
    }

    /// Buffer sizes probed for a payload whose static layout is `base_size` bytes.
    pub fn probe_sizes(&self, base_size: usize) -> ProbeSizes {
        ProbeSizes::new(base_size, self.max_brute_force_length)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy {
            max_brute_force_length: DEFAULT_MAX_BRUTE_FORCE_LENGTH,
            trust_hint: true,
        }
    }
}

/// Sizes tried by brute-force probing: the smallest power of two not below the base
/// size, doubling on each step, for as long as the size does not exceed the ceiling.
#[derive(Debug, Clone)]
pub struct ProbeSizes {
    next: Option<usize>,
    ceiling: usize,
}

impl ProbeSizes {
    pub fn new(base_size: usize, ceiling: usize) -> ProbeSizes {
        let next = (ceiling != 0).then(|| round_up_pow2(base_size.max(1)));
        ProbeSizes { next, ceiling }
    }
}

impl Iterator for ProbeSizes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let size = self.next.filter(|&size| size <= self.ceiling)?;
        self.next = size.checked_mul(2);
        Some(size)
    }
}

impl std::iter::FusedIterator for ProbeSizes {}

/// Runs the variable-size query against `resource`.
///
/// Returns `Ok(Outcome::Failure)` for any terminal status reported by the resource and
/// `Err` only when probing ran up to the ceiling without success; the caller decides how
/// either is surfaced.
pub fn query_with_growth<R, T>(
    resource: &R,
    class: R::Class,
    default: &T,
    policy: &GrowthPolicy,
) -> Result<Outcome<InfoBuffer>>
where
    R: InfoResource + ?Sized,
    T: bytemuck::NoUninit,
{
    let base_size = std::mem::size_of::<T>();

    let (first, buffer) = attempt(resource, class, default, base_size);
    if first.status.is_success() {
        return Ok(Outcome::Success(buffer.detach()));
    }
    drop(buffer);
    if !first.status.is_size_failure() {
        return Ok(Outcome::Failure(first.status));
    }

    if policy.trust_hint && first.reported_length != 0 {
        if first.reported_length > MAX_BRUTE_FORCE_LIMIT {
            log::debug!(
                "{class:?}: reported length {} exceeds {MAX_BRUTE_FORCE_LIMIT} bytes",
                first.reported_length
            );
            return Ok(Outcome::Failure(NtStatus::BUFFER_TOO_SMALL));
        }
        let (retry, buffer) = attempt(resource, class, default, first.reported_length);
        return Ok(if retry.status.is_success() {
            Outcome::Success(buffer.detach())
        } else {
            Outcome::Failure(retry.status)
        });
    }

    log::debug!(
        "{class:?}: no usable length after {}, probing up to {} bytes",
        first.status,
        policy.max_brute_force_length
    );
    for size in policy.probe_sizes(base_size) {
        let (probe, buffer) = attempt(resource, class, default, size);
        if probe.status.is_success() {
            return Ok(Outcome::Success(buffer.detach()));
        }
        if !probe.status.is_size_failure() {
            return Ok(Outcome::Failure(probe.status));
        }
    }

    log::debug!(
        "{class:?}: growth exhausted at {} bytes, access {:?}",
        policy.max_brute_force_length,
        resource.granted_access()
    );
    Err(Error::growth_exhausted(
        format!("query {class:?}"),
        policy.max_brute_force_length,
    ))
}

/// One query attempt with a fresh buffer of `len` bytes.
pub(crate) fn attempt<R, T>(
    resource: &R,
    class: R::Class,
    default: &T,
    len: usize,
) -> (QueryStatus, ScopedBuffer)
where
    R: InfoResource + ?Sized,
    T: bytemuck::NoUninit,
{
    let mut buffer = ScopedBuffer::from_default(default, len);
    let result = resource.query_information(class, buffer.as_mut_slice());
    log::trace!(
        "query {class:?}: len={len} status={} reported={}",
        result.status,
        result.reported_length
    );
    (result, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_sizes_from_non_power_of_two() {
        let sizes: Vec<_> = ProbeSizes::new(24, 1024).collect();
        assert_eq!(sizes, vec![32, 64, 128, 256, 512, 1024]);
    }

    #[test]
    fn test_probe_sizes_start_at_power_of_two_base() {
        let sizes: Vec<_> = ProbeSizes::new(32, 256).collect();
        assert_eq!(sizes, vec![32, 64, 128, 256]);
    }

    #[test]
    fn test_probe_sizes_ceiling_not_power_of_two() {
        let sizes: Vec<_> = ProbeSizes::new(8, 100).collect();
        assert_eq!(sizes, vec![8, 16, 32, 64]);
    }

    #[test]
    fn test_probe_sizes_disabled() {
        assert_eq!(ProbeSizes::new(24, 0).count(), 0);
        assert_eq!(ProbeSizes::new(4096, 1024).count(), 0);
    }

    #[test]
    fn test_probe_sizes_zero_base() {
        let sizes: Vec<_> = ProbeSizes::new(0, 4).collect();
        assert_eq!(sizes, vec![1, 2, 4]);
    }

    #[test]
    fn test_probe_sizes_stop_on_overflow() {
        let top = 1usize << (usize::BITS - 1);
        let sizes: Vec<_> = ProbeSizes::new(top, usize::MAX).collect();
        assert_eq!(sizes, vec![top]);
    }

    #[test]
    fn test_policy_defaults_and_builders() {
        let policy = GrowthPolicy::default();
        assert_eq!(policy.max_brute_force_length, 16 * 1024);
        assert!(policy.trust_hint);

        let policy = policy.with_trust_hint(false).without_brute_force();
        assert_eq!(policy.max_brute_force_length, 0);
        assert!(!policy.trust_hint);
        assert_eq!(policy.probe_sizes(24).count(), 0);
    }

    #[test]
    fn test_policy_for_resource_clamps_ceiling() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Any;

        impl crate::class::InfoClass for Any {
            fn raw(self) -> i32 {
                0
            }
        }

        struct Unbounded;

        impl InfoResource for Unbounded {
            type Class = Any;
            type Rights = ();

            fn granted_access(&self) {}

            fn max_brute_force_length(&self) -> usize {
                usize::MAX
            }
        }

        let policy = GrowthPolicy::for_resource(&Unbounded);
        assert_eq!(policy.max_brute_force_length, MAX_BRUTE_FORCE_LIMIT);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_validate() {
        assert!(GrowthPolicy::default().validate().is_ok());
        let err = GrowthPolicy::default()
            .with_max_brute_force_length(MAX_BRUTE_FORCE_LIMIT + 1)
            .validate()
            .unwrap_err();
        assert_eq!(err.status(), NtStatus::INVALID_PARAMETER);
    }

    #[test]
    fn test_policy_from_config() {
        let policy: GrowthPolicy =
            serde_json::from_str(r#"{ "max_brute_force_length": 1024 }"#).unwrap();
        assert_eq!(policy, GrowthPolicy::default().with_max_brute_force_length(1024));

        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(
            json,
            r#"{"max_brute_force_length":1024,"trust_hint":true}"#
        );
    }
}
