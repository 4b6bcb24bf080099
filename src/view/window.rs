//! Incrementally growing visible prefix of an ordered sequence.
//!
//! The window only decides how much of an already filtered and sorted
//! sequence is exposed; it never reorders anything.

/// Default number of rows exposed after every reset.
pub const DEFAULT_INITIAL_ROWS: usize = 100;
/// Default number of rows added by each reveal.
pub const DEFAULT_ROW_INCREMENT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    pub initial: usize,
    pub increment: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_ROWS,
            increment: DEFAULT_ROW_INCREMENT,
        }
    }
}

impl WindowConfig {
    /// Visible count after one reveal. Never exceeds `len`, never shrinks.
    pub fn grow(&self, visible_count: usize, len: usize) -> usize {
        if visible_count >= len {
            return visible_count;
        }
        visible_count.saturating_add(self.increment.max(1)).min(len)
    }
}

/// The exposed part of a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a, T> {
    pub visible: &'a [T],
    pub has_more: bool,
}

/// Expose the first `visible_count` items of `sequence`.
pub fn window<T>(sequence: &[T], visible_count: usize) -> Window<'_, T> {
    let end = visible_count.min(sequence.len());
    Window {
        visible: &sequence[..end],
        has_more: end < sequence.len(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Revealing never hides rows and never runs past the end
        #[test]
        fn reveal_is_monotonic(
            len in 0usize..1000,
            initial in 0usize..200,
            increment in 0usize..100,
            steps in 0usize..30,
        ) {
            let config = WindowConfig { initial, increment };
            let seq: Vec<usize> = (0..len).collect();
            let mut count = config.initial;
            let mut shown = window(&seq, count).visible.to_vec();
            for _ in 0..steps {
                count = config.grow(count, seq.len());
                let next = window(&seq, count);
                prop_assert!(next.visible.len() >= shown.len());
                prop_assert!(next.visible.len() <= seq.len());
                prop_assert!(next.visible.starts_with(&shown));
                prop_assert_eq!(next.has_more, next.visible.len() < seq.len());
                shown = next.visible.to_vec();
            }
        }
    }
}
