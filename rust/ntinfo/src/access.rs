//! Typed query and set entry points available on every [`InfoResource`].

use ntinfo_common::{NtStatus, Result};

use crate::{
    buffer::{InfoBuffer, ScopedBuffer},
    growth::{self, GrowthPolicy},
    mode::{ErrorMode, Outcome},
    resource::InfoResource,
};

/// Typed information access, implemented for every [`InfoResource`].
pub trait InfoAccess: InfoResource {
    /// Queries a payload of fixed, statically known size.
    ///
    /// A buffer sized to `T` and holding `default` is passed to the resource once; on
    /// success the payload is read back out of it. There is no retry.
    fn query_fixed<T>(&self, class: Self::Class, default: T, mode: ErrorMode) -> Result<Outcome<T>>
    where
        T: bytemuck::Pod,
    {
        let (result, buffer) = growth::attempt(self, class, &default, std::mem::size_of::<T>());
        if result.status.is_failure() {
            drop(buffer);
            return mode.fail(|| format!("query {class:?}"), result.status);
        }
        Ok(Outcome::Success(buffer.read::<T>()?))
    }

    /// Queries a payload whose size is discovered adaptively, starting from the size of
    /// `default` and growing per the resource's own [`GrowthPolicy`].
    fn query_variable<T>(
        &self,
        class: Self::Class,
        default: &T,
        mode: ErrorMode,
    ) -> Result<Outcome<InfoBuffer>>
    where
        T: bytemuck::NoUninit,
    {
        let policy = GrowthPolicy::for_resource(self);
        self.query_variable_with(class, default, &policy, mode)
    }

    /// Like [`InfoAccess::query_variable`], with an explicit growth policy.
    fn query_variable_with<T>(
        &self,
        class: Self::Class,
        default: &T,
        policy: &GrowthPolicy,
        mode: ErrorMode,
    ) -> Result<Outcome<InfoBuffer>>
    where
        T: bytemuck::NoUninit,
    {
        policy.validate()?;
        match growth::query_with_growth(self, class, default, policy) {
            Ok(Outcome::Failure(status)) => mode.fail(|| format!("query {class:?}"), status),
            Ok(success) => Ok(success),
            Err(e) => mode.fail_with(e),
        }
    }

    /// Asks the resource how large the information for `class` is, with a single
    /// attempt sized to `default`.
    ///
    /// Returns the reported length, `0` when the resource did not report one, or the
    /// base size when the base attempt already succeeded. Terminal failures other than
    /// size failures are surfaced per `mode`.
    fn query_required_length<T>(
        &self,
        class: Self::Class,
        default: &T,
        mode: ErrorMode,
    ) -> Result<Outcome<usize>>
    where
        T: bytemuck::NoUninit,
    {
        let base_size = std::mem::size_of::<T>();
        let (result, _buffer) = growth::attempt(self, class, default, base_size);
        if result.status.is_success() {
            Ok(Outcome::Success(result.reported_length.max(base_size)))
        } else if result.status.is_size_failure() {
            Ok(Outcome::Success(result.reported_length))
        } else {
            mode.fail(|| format!("query {class:?}"), result.status)
        }
    }

    /// Sets the information for `class` from a fixed-layout value.
    ///
    /// On success, the outcome carries the status the resource returned, which may be an
    /// informational one.
    fn set<T>(&self, class: Self::Class, value: &T, mode: ErrorMode) -> Result<Outcome<NtStatus>>
    where
        T: bytemuck::NoUninit,
    {
        let buffer = ScopedBuffer::from_value(value);
        set_from_buffer(self, class, buffer, mode)
    }

    /// Sets the information for `class` from an already serialized value.
    fn set_bytes(
        &self,
        class: Self::Class,
        value: &[u8],
        mode: ErrorMode,
    ) -> Result<Outcome<NtStatus>> {
        let buffer = ScopedBuffer::copy_from_slice(value);
        set_from_buffer(self, class, buffer, mode)
    }
}

impl<R: InfoResource + ?Sized> InfoAccess for R {}

fn set_from_buffer<R>(
    resource: &R,
    class: R::Class,
    buffer: ScopedBuffer,
    mode: ErrorMode,
) -> Result<Outcome<NtStatus>>
where
    R: InfoResource + ?Sized,
{
    let status = resource.set_information(class, buffer.as_slice());
    log::trace!("set {class:?}: len={} status={status}", buffer.len());
    drop(buffer);
    if status.is_failure() {
        return mode.fail(|| format!("set {class:?}"), status);
    }
    Ok(Outcome::Success(status))
}
