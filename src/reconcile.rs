use rand::RngCore;
use rand::rngs::StdRng;
use tracing::debug;

use crate::identity::{GlobalIds, IdSource};
use crate::{Forest, InvalidInput, Result, Tree, TreeConfig, diff};

/// Items that know their own reconciliation key.
pub trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> Option<Self::Key>;
}

/// Keeps a children tree in step with a keyed list across update cycles.
///
/// Each [`Reconciler::update`] diffs the new keys against the previous ones
/// and edits the stored tree, so subtrees holding unchanged items stay the
/// same allocations from one cycle to the next. An item whose key is still
/// present is not replaced: the tree keeps the element it first saw.
#[derive(Debug)]
pub struct Reconciler<K, T, R = StdRng, I = GlobalIds> {
    forest: Forest<R, I>,
    keys: Vec<K>,
    tree: Tree<T>,
}

impl<K, T> Reconciler<K, T> {
    pub fn new(config: TreeConfig) -> Result<Self> {
        Ok(Self::with_forest(Forest::new(config)?))
    }
}

impl<K, T, R: RngCore, I: IdSource> Reconciler<K, T, R, I> {
    pub fn with_forest(forest: Forest<R, I>) -> Self {
        let tree = forest.empty();
        Self {
            forest,
            keys: Vec::new(),
            tree,
        }
    }

    pub fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }
}

impl<K: PartialEq, T: Clone, R: RngCore, I: IdSource> Reconciler<K, T, R, I> {
    /// Brings the tree in line with `items`, keyed by `key_of`.
    ///
    /// An item without a key rejects the whole update and leaves the previous
    /// tree in place.
    pub fn update(&mut self, items: &[T], key_of: impl Fn(&T) -> Option<K>) -> Result<&Tree<T>> {
        let keys = items
            .iter()
            .enumerate()
            .map(|(position, item)| key_of(item).ok_or(InvalidInput::MissingKey { position }))
            .collect::<Result<Vec<K>, InvalidInput>>()?;

        let changes = diff(&self.keys, &keys);
        if changes.is_empty() {
            return Ok(&self.tree);
        }

        let tree = self.forest.remove(&self.tree, &changes.removes)?;
        let tree = self.forest.insert(&tree, changes.insertions(items))?;
        debug!(
            removes = changes.removes.len(),
            inserts = changes.inserts.len(),
            len = tree.count(),
            "reconciled children"
        );

        self.tree = tree;
        self.keys = keys;
        Ok(&self.tree)
    }
}

impl<T, R, I> Reconciler<T::Key, T, R, I>
where
    T: Keyed + Clone,
    R: RngCore,
    I: IdSource,
{
    pub fn update_keyed(&mut self, items: &[T]) -> Result<&Tree<T>> {
        self.update(items, T::key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SequentialIds;
    use crate::{Error, Slot};
    use rand::SeedableRng;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        key: Option<&'static str>,
        label: &'static str,
    }

    impl Keyed for Item {
        type Key = &'static str;

        fn key(&self) -> Option<&'static str> {
            self.key
        }
    }

    fn item(key: &'static str) -> Item {
        Item {
            key: Some(key),
            label: key,
        }
    }

    fn reconciler() -> Reconciler<&'static str, Item, StdRng, SequentialIds> {
        let forest =
            Forest::with_parts(0.7, StdRng::seed_from_u64(0), SequentialIds::default()).unwrap();
        Reconciler::with_forest(forest)
    }

    fn labels(tree: &Tree<Item>) -> Vec<&'static str> {
        tree.iter().map(|item| item.label).collect()
    }

    #[test]
    fn test_first_update_inserts_everything() {
        let mut rec = reconciler();
        let items: Vec<Item> = ["a", "b", "c"].into_iter().map(item).collect();

        let tree = rec.update_keyed(&items).unwrap();
        assert_eq!(labels(tree), vec!["a", "b", "c"]);
        assert_eq!(rec.keys(), &["a", "b", "c"]);
    }

    #[test]
    fn test_unchanged_keys_keep_the_handle() {
        let mut rec = reconciler();
        let items: Vec<Item> = ["a", "b"].into_iter().map(item).collect();
        let before = rec.update_keyed(&items).unwrap().clone();

        let after = rec.update_keyed(&items).unwrap();
        assert!(after.ptr_eq(&before));
    }

    #[test]
    fn test_reorder_and_append() {
        let mut rec = reconciler();
        let first: Vec<Item> = ["A", "B", "C", "D", "E"].into_iter().map(item).collect();
        rec.update_keyed(&first).unwrap();

        let second: Vec<Item> = ["B", "A", "C", "D", "E", "F"].into_iter().map(item).collect();
        let tree = rec.update_keyed(&second).unwrap();
        tree.check().unwrap();
        assert_eq!(labels(tree), vec!["B", "A", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let mut rec = reconciler();
        let items = vec![item("a"), Item { key: None, label: "?" }];

        let err = rec.update_keyed(&items).unwrap_err();
        assert_eq!(err, Error::InvalidInput(InvalidInput::MissingKey { position: 1 }));
        assert_eq!(rec.tree().count(), 0);
        assert!(rec.keys().is_empty());
    }

    #[test]
    fn test_kept_items_are_not_replaced() {
        let mut rec = reconciler();
        rec.update_keyed(&[item("a")]).unwrap();

        let relabelled = Item {
            key: Some("a"),
            label: "new",
        };
        let tree = rec.update_keyed(&[relabelled, item("b")]).unwrap();
        assert_eq!(labels(tree), vec!["a", "b"]);
    }

    #[test]
    fn test_append_shares_untouched_branches() {
        let forest =
            Forest::with_parts(0.7, StdRng::seed_from_u64(1), SequentialIds::default()).unwrap();
        let mut rec = Reconciler::<String, String, _, _>::with_forest(forest);
        let key_of = |s: &String| Some(s.clone());

        let mut items: Vec<String> = (0..500).map(|i| format!("k{i}")).collect();
        let before = rec.update(&items, key_of).unwrap().clone();

        items.push("k500".to_string());
        let after = rec.update(&items, key_of).unwrap();
        assert_eq!(after.count(), 501);
        assert_eq!(after.get(500), Some(&"k500".to_string()));

        let shared = before
            .slots()
            .iter()
            .zip(after.slots())
            .filter(|(a, b)| match (a, b) {
                (Slot::Branch(a), Slot::Branch(b)) => std::rc::Rc::ptr_eq(a, b),
                _ => false,
            })
            .count();
        let branches = before.slots().iter().filter(|s| s.is_branch()).count();
        // only the branch holding the old last element may be rebuilt
        assert!(shared + 1 >= branches);
    }
}
