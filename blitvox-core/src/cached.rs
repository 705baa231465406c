//! Memo cell for derived values that are expensive to recompute.

/// A derived `value` together with the input it was computed from.
///
/// The cached value is valid iff the recorded input still equals the current
/// input. The comparison is plain `PartialEq`: for floats that is bit-level
/// equality in practice, which is what a cache-validity gate wants. It is
/// not a numerical tolerance check.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cached<T> {
    input: T,
    value: T,
}

impl<T: Copy + PartialEq> Cached<T> {
    /// Seed the cell with an already-consistent `(input, value)` pair.
    #[inline]
    pub const fn new(input: T, value: T) -> Self {
        Self { input, value }
    }

    /// Return the cached value for `input`, recomputing with `derive` only when
    /// the input changed since the last call.
    #[inline]
    pub fn get(&mut self, input: T, derive: impl FnOnce(T) -> T) -> T {
        if self.input != input {
            self.input = input;
            self.value = derive(input);
        }
        self.value
    }

    #[inline] pub fn input(&self) -> T { self.input }
    #[inline] pub fn value(&self) -> T { self.value }
}
