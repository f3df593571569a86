//! Path tokenization.

use smallvec::SmallVec;

/// Maximum path segments stored inline before spilling to the heap.
pub const INLINE_SEGMENT_COUNT: usize = 8;

/// Ordered path segments, consumed left to right during binding.
pub type Segments<'a> = SmallVec<[&'a str; INLINE_SEGMENT_COUNT]>;

/// Split a path into segments.
///
/// Splits on `/` and drops the empty segments produced by leading, trailing,
/// or doubled delimiters. An empty or whitespace-only path yields an empty
/// sequence, which dispatch treats as "use the default route".
pub fn segments(path: &str) -> Segments<'_> {
    if path.trim().is_empty() {
        return Segments::new();
    }
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join leftover segments back into a path for nested dispatch.
pub fn join(segments: &[String]) -> String {
    segments.join("/")
}
