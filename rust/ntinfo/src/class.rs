use std::fmt::Debug;

/// A closed set of information classes understood by a resource type.
///
/// An information class only identifies *what* is queried or set; the accessor passes
/// it through to the resource untouched. Implementations are typically fieldless enums
/// with explicit discriminants.
pub trait InfoClass: Copy + Eq + Debug + Send + Sync + 'static {
    /// The numeric class code handed to the underlying system call.
    fn raw(self) -> i32;
}
