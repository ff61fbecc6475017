use std::collections::BTreeSet;

use rhythmtap_model::NoteHandle;

/// Notes that are spawned but not yet judged.
///
/// Ordered by handle, which is also time order.
#[derive(Debug, Clone, Default)]
pub struct ActiveNoteSet {
    handles: BTreeSet<NoteHandle>,
}

impl ActiveNoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the note was already active.
    pub fn insert(&mut self, handle: NoteHandle) -> bool {
        self.handles.insert(handle)
    }

    /// Returns false if the note was not active.
    pub fn remove(&mut self, handle: NoteHandle) -> bool {
        self.handles.remove(&handle)
    }

    pub fn contains(&self, handle: NoteHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = NoteHandle> + '_ {
        self.handles.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_once() {
        let mut set = ActiveNoteSet::new();
        assert!(set.insert(NoteHandle(2)));
        assert!(!set.insert(NoteHandle(2)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_iter_in_handle_order() {
        let mut set = ActiveNoteSet::new();
        set.insert(NoteHandle(5));
        set.insert(NoteHandle(1));
        set.insert(NoteHandle(3));
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, vec![NoteHandle(1), NoteHandle(3), NoteHandle(5)]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut set = ActiveNoteSet::new();
        set.insert(NoteHandle(0));
        set.insert(NoteHandle(1));
        assert!(set.remove(NoteHandle(0)));
        assert!(!set.remove(NoteHandle(0)));
        assert!(set.contains(NoteHandle(1)));
        set.clear();
        assert!(set.is_empty());
    }
}
