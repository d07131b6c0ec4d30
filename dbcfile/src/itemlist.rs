use fnv::FnvBuildHasher;
use std::{
    borrow::Borrow,
    collections::HashMap,
    hash::Hash,
    ops::{Index, IndexMut},
};

/// Items that can be looked up in an `ItemList`
pub trait ItemKey {
    type Key: Hash + Eq + Clone + std::fmt::Debug;

    /// the lookup key of this item, e.g. its name or its message id
    fn item_key(&self) -> Self::Key;
}

/// Keyed dbc items in file order
///
/// Dbc files are allowed to repeat a key, e.g. two messages with the same id.
/// Every item is kept, lookups by key find the earliest one.
#[derive(Debug, Clone)]
pub struct ItemList<T: ItemKey> {
    items: Vec<T>,
    // key -> position of the earliest item with this key
    positions: HashMap<T::Key, usize, FnvBuildHasher>,
}

impl<T: ItemKey> ItemList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::default(),
        }
    }

    /// append an item; an existing item with the same key stays the lookup target
    pub fn push(&mut self, item: T) {
        let position = self.items.len();
        self.positions.entry(item.item_key()).or_insert(position);
        self.items.push(item);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.get(key).map(|&pos| &self.items[pos])
    }

    /// The key of the item must not be modified through the returned reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = *self.positions.get(key)?;
        Some(&mut self.items[pos])
    }

    /// position of the earliest item with the given key
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.get(key).copied()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.contains_key(key)
    }

    /// Remove the earliest item with the given key.
    ///
    /// The last item is moved into the freed position.
    pub fn swap_remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.position(key)?;
        let item = self.items.swap_remove(pos);
        self.reindex();
        Some(item)
    }

    /// keep only the items for which `keep` returns true, in their current order
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.items.retain(keep);
        self.reindex();
    }

    /// keys that are used by more than one item, in order of their first repetition
    pub fn duplicate_keys(&self) -> Vec<T::Key> {
        let mut duplicates = Vec::new();
        for (pos, item) in self.items.iter().enumerate() {
            let key = item.item_key();
            if self.positions.get(&key) != Some(&pos) && !duplicates.contains(&key) {
                duplicates.push(key);
            }
        }
        duplicates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Mutable iteration over all items.
    ///
    /// Call `reindex` if any keys were changed.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// recompute the key lookup from the current items
    pub fn reindex(&mut self) {
        self.positions.clear();
        for (pos, item) in self.items.iter().enumerate() {
            self.positions.entry(item.item_key()).or_insert(pos);
        }
    }
}

impl<T: ItemKey> Default for ItemList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ItemKey> Index<usize> for ItemList<T> {
    type Output = T;

    fn index(&self, pos: usize) -> &T {
        &self.items[pos]
    }
}

impl<T: ItemKey> IndexMut<usize> for ItemList<T> {
    fn index_mut(&mut self, pos: usize) -> &mut T {
        &mut self.items[pos]
    }
}

impl<T: ItemKey> Extend<T> for ItemList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.push(item));
    }
}

impl<T: ItemKey> FromIterator<T> for ItemList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = ItemList::new();
        list.extend(iter);
        list
    }
}

impl<T: ItemKey> IntoIterator for ItemList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T: ItemKey> IntoIterator for &'a ItemList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// the lookup table is derived data and does not take part in comparisons
impl<T: ItemKey + PartialEq> PartialEq for ItemList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Frame {
        id: u32,
        name: &'static str,
    }

    impl ItemKey for Frame {
        type Key = u32;

        fn item_key(&self) -> u32 {
            self.id
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        name: String,
    }

    impl ItemKey for Node {
        type Key = String;

        fn item_key(&self) -> String {
            self.name.clone()
        }
    }

    fn frame(id: u32, name: &'static str) -> Frame {
        Frame { id, name }
    }

    fn check_positions(list: &ItemList<Frame>) {
        for (pos, item) in list.iter().enumerate() {
            let earliest = list.position(&item.id).unwrap();
            assert!(earliest <= pos);
            assert_eq!(list[earliest].id, item.id);
        }
    }

    #[test]
    fn lookup_and_removal() {
        let mut frames: ItemList<Frame> = [
            frame(0x100, "Engine"),
            frame(0x200, "Brake"),
            frame(0x300, "Gearbox"),
            frame(0x400, "Body"),
        ]
        .into_iter()
        .collect();
        check_positions(&frames);
        assert_eq!(frames.get(&0x200).unwrap().name, "Brake");
        assert!(frames.contains_key(&0x300));
        assert!(!frames.contains_key(&0x999));

        assert_eq!(frames.swap_remove(&0x200).unwrap().name, "Brake");
        assert_eq!(frames.swap_remove(&0x200), None);
        check_positions(&frames);
        let names: Vec<_> = frames.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Engine", "Body", "Gearbox"]);

        frames.retain(|f| f.id != 0x100);
        check_positions(&frames);
        assert_eq!(frames.position(&0x300), Some(1));
        frames.get_mut(&0x400).unwrap().name = "Chassis";
        assert_eq!(frames[0].name, "Chassis");
    }

    #[test]
    fn repeated_keys() {
        let mut frames = ItemList::new();
        frames.push(frame(1, "first"));
        frames.push(frame(2, "other"));
        frames.push(frame(1, "second"));
        frames.push(frame(1, "third"));
        assert_eq!(frames.len(), 4);
        assert_eq!(frames.get(&1).unwrap().name, "first");
        assert_eq!(frames.duplicate_keys(), vec![1]);

        // the next item with the same key becomes the lookup target
        frames.swap_remove(&1);
        assert_eq!(frames.get(&1).unwrap().name, "third");
        check_positions(&frames);
    }

    #[test]
    fn renaming_items() {
        let mut nodes: ItemList<Node> = ItemList::default();
        nodes.push(Node {
            name: "Engine".to_string(),
        });
        assert!(nodes.get("Engine").is_some());

        for node in nodes.iter_mut() {
            node.name = "Gateway".to_string();
        }
        nodes.reindex();
        assert!(nodes.get("Engine").is_none());
        assert!(nodes.get("Gateway").is_some());
        assert!(nodes.duplicate_keys().is_empty());
        assert_eq!(nodes.into_iter().count(), 1);
    }
}
