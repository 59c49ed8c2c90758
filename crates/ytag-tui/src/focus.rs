//! FocusRing — manages keyboard focus cycling between panes.

use crate::action::ComponentId;

pub struct FocusRing {
    items: Vec<ComponentId>,
    current: usize,
}

impl FocusRing {
    pub fn new(items: Vec<ComponentId>) -> Self {
        Self { items, current: 0 }
    }

    pub fn current(&self) -> Option<ComponentId> {
        self.items.get(self.current).copied()
    }

    pub fn next(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.items.len();
        self.current()
    }

    pub fn prev(&mut self) -> Option<ComponentId> {
        if self.items.is_empty() {
            return None;
        }
        self.current = if self.current == 0 {
            self.items.len() - 1
        } else {
            self.current - 1
        };
        self.current()
    }

    pub fn set(&mut self, id: ComponentId) {
        if let Some(pos) = self.items.iter().position(|&x| x == id) {
            self.current = pos;
        }
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.current() == Some(id)
    }

    /// Add `id` to the end of the ring if it isn't there yet.
    pub fn insert(&mut self, id: ComponentId) {
        if !self.items.contains(&id) {
            self.items.push(id);
        }
    }

    /// Remove `id`; focus moves to the first pane if it was focused.
    pub fn remove(&mut self, id: ComponentId) {
        let was_focused = self.is_focused(id);
        self.items.retain(|&x| x != id);
        if was_focused || self.current >= self.items.len() {
            self.current = 0;
        }
    }
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_both_ways() {
        let mut ring = FocusRing::new(vec![
            ComponentId::LookupForm,
            ComponentId::TagForm,
            ComponentId::SongTable,
        ]);
        assert_eq!(ring.prev(), Some(ComponentId::SongTable));
        assert_eq!(ring.next(), Some(ComponentId::LookupForm));
        ring.set(ComponentId::TagForm);
        assert!(ring.is_focused(ComponentId::TagForm));
    }

    #[test]
    fn test_removing_focused_pane_resets_focus() {
        let mut ring = FocusRing::new(vec![ComponentId::LookupForm, ComponentId::SongTable]);
        ring.insert(ComponentId::LogPanel);
        ring.set(ComponentId::LogPanel);
        ring.remove(ComponentId::LogPanel);
        assert_eq!(ring.current(), Some(ComponentId::LookupForm));
    }
}
