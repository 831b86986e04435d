//! List kinds, item flags, and ordinal tracking.

/// Kind of list an item belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListKind {
    /// Bullet list.
    #[default]
    Unordered,
    /// Numbered list.
    Ordered,
    /// Definition list entry (the definition body).
    Definition,
    /// Definition list entry (the term being defined).
    Term,
}

/// Per-item information reported by the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFlags {
    /// List kind of the item.
    pub kind: ListKind,
    /// First item of a list.
    pub beginning_of_list: bool,
    /// Item holds block-level content (paragraphs, nested lists, code).
    pub contains_block: bool,
}

impl ItemFlags {
    /// Flags for an item of `kind` in the middle of a list.
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Mark the item as the first of its list.
    #[must_use]
    pub fn beginning_of_list(mut self, value: bool) -> Self {
        self.beginning_of_list = value;
        self
    }

    /// Mark the item as holding block-level content.
    #[must_use]
    pub fn contains_block(mut self, value: bool) -> Self {
        self.contains_block = value;
        self
    }
}

/// Ordinal counters for ordered lists, one frame per open list.
///
/// The base frame is never popped, so items rendered outside any list still
/// have a counter to use.
#[derive(Clone, Debug)]
pub struct ListState {
    frames: Vec<usize>,
}

impl Default for ListState {
    fn default() -> Self {
        Self { frames: vec![0] }
    }
}

impl ListState {
    /// Create a state with only the base frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a list.
    pub fn open(&mut self) {
        self.frames.push(0);
    }

    /// Leave the innermost list.
    pub fn close(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Restart numbering of the innermost list.
    pub fn reset(&mut self) {
        if let Some(ordinal) = self.frames.last_mut() {
            *ordinal = 0;
        }
    }

    /// Advance the innermost list and return the new ordinal.
    pub fn next_ordinal(&mut self) -> usize {
        match self.frames.last_mut() {
            Some(ordinal) => {
                *ordinal += 1;
                *ordinal
            }
            None => 1,
        }
    }

    /// Current ordinal of the innermost list, zero before its first item.
    pub fn ordinal(&self) -> usize {
        self.frames.last().copied().unwrap_or(0)
    }

    /// Number of lists currently open, not counting the base frame.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_increments_and_resets() {
        let mut state = ListState::new();
        assert_eq!(state.next_ordinal(), 1);
        assert_eq!(state.next_ordinal(), 2);
        state.reset();
        assert_eq!(state.ordinal(), 0);
        assert_eq!(state.next_ordinal(), 1);
    }

    #[test]
    fn test_nested_frames_keep_outer_count() {
        let mut state = ListState::new();
        state.open();
        assert_eq!(state.next_ordinal(), 1);

        state.open();
        assert_eq!(state.depth(), 2);
        assert_eq!(state.next_ordinal(), 1);
        assert_eq!(state.next_ordinal(), 2);
        state.close();

        assert_eq!(state.next_ordinal(), 2);
        state.close();
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_close_never_pops_base_frame() {
        let mut state = ListState::new();
        state.close();
        state.close();
        assert_eq!(state.depth(), 0);
        assert_eq!(state.next_ordinal(), 1);
    }

    #[test]
    fn test_item_flags_builder() {
        let flags = ItemFlags::new(ListKind::Ordered)
            .beginning_of_list(true)
            .contains_block(false);
        assert_eq!(flags.kind, ListKind::Ordered);
        assert!(flags.beginning_of_list);
        assert!(!flags.contains_block);
    }
}
