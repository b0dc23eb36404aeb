use std::collections::HashMap;
use std::hash::Hash;

/// Owning arena of top-level windows. Removing an entry drops everything the
/// window owns; nothing else holds a window past that point.
#[derive(Debug)]
pub struct WindowRegistry<K, V> {
    order: Vec<K>,
    windows: HashMap<K, V>,
}

impl<K: Copy + Eq + Hash, V> WindowRegistry<K, V> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            windows: HashMap::new(),
        }
    }

    /// Returns the previous window under `id`, if any.
    pub fn insert(&mut self, id: K, window: V) -> Option<V> {
        let previous = self.windows.insert(id, window);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn get_mut(&mut self, id: &K) -> Option<&mut V> {
        self.windows.get_mut(id)
    }

    pub fn remove(&mut self, id: &K) -> Option<V> {
        let window = self.windows.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(window)
    }

    /// Ids in the order the windows were opened.
    pub fn ids(&self) -> Vec<K> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl<K: Copy + Eq + Hash, V> Default for WindowRegistry<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
