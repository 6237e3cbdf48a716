//! Keyboard highlight shared by list-like widgets.
//!
//! `Roving` tracks which row of a collection holds the keyboard highlight.
//! Movement wraps at both ends and skips rows the owner reports as not
//! focusable (separators, labels, disabled items).

/// Highlight position over a collection of `len` rows.
#[derive(Debug, Clone, Default)]
pub(crate) struct Roving {
    cursor: Option<usize>,
}

impl Roving {
    pub fn new() -> Self {
        Self { cursor: None }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn set(&mut self, index: Option<usize>) {
        self.cursor = index;
    }

    pub fn clear(&mut self) {
        self.cursor = None;
    }

    /// Move to the next focusable row, wrapping. Starts at the first one.
    pub fn next(&mut self, len: usize, focusable: impl Fn(usize) -> bool) {
        if len == 0 {
            self.cursor = None;
            return;
        }
        let start = match self.cursor {
            Some(i) => i + 1,
            None => 0,
        };
        self.cursor = (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&i| focusable(i))
            .or(self.cursor.filter(|&i| i < len));
    }

    /// Move to the previous focusable row, wrapping. Starts at the last one.
    pub fn prev(&mut self, len: usize, focusable: impl Fn(usize) -> bool) {
        if len == 0 {
            self.cursor = None;
            return;
        }
        let start = match self.cursor {
            Some(i) => i.min(len) + len - 1,
            None => len - 1,
        };
        self.cursor = (0..len)
            .map(|offset| (start + len - offset) % len)
            .find(|&i| focusable(i))
            .or(self.cursor.filter(|&i| i < len));
    }

    /// Jump to the first focusable row.
    pub fn first(&mut self, len: usize, focusable: impl Fn(usize) -> bool) {
        self.cursor = (0..len).find(|&i| focusable(i));
    }

    /// Jump to the last focusable row.
    pub fn last(&mut self, len: usize, focusable: impl Fn(usize) -> bool) {
        self.cursor = (0..len).rev().find(|&i| focusable(i));
    }

    /// First row of a `visible`-row window over `len` rows that keeps the
    /// highlight in view, moving the previous start `first` as little as
    /// possible.
    pub fn window_start(&self, first: usize, visible: usize, len: usize) -> usize {
        let start = match self.cursor {
            Some(i) if visible > 0 && i < first => i,
            Some(i) if visible > 0 && i >= first + visible => i + 1 - visible,
            _ => first,
        };
        start.min(len.saturating_sub(visible))
    }
}
