//! A persistent children tree for reconciling keyed lists.
//!
//! [`Tree`] holds an ordered sequence in nested nodes whose shape is decided
//! by a biased coin instead of rotations. Batched [`insert`]s and
//! [`remove`]s rebuild only the nodes on their path and share everything
//! else, and [`diff`] produces exactly the batches those two take.
//!
//! ```
//! use children_tree::{diff, Insertion};
//!
//! let previous = ['A', 'B', 'C'];
//! let current = ['B', 'C', 'D'];
//!
//! let tree = children_tree::insert(
//!     &children_tree::empty(),
//!     previous.iter().copied().enumerate().map(Insertion::from).collect(),
//! )?;
//!
//! let changes = diff(&previous, &current);
//! let tree = children_tree::remove(&tree, &changes.removes)?;
//! let tree = children_tree::insert(&tree, changes.insertions(&current))?;
//! assert_eq!(tree.to_vec(), current);
//! # Ok::<(), children_tree::Error>(())
//! ```

mod coin;
pub mod config;
pub mod diff;
pub mod error;
pub mod forest;
pub mod identity;
pub mod node;
pub mod reconcile;
pub mod tree;

use std::cell::RefCell;

pub use self::config::TreeConfig;
pub use self::diff::{Changes, diff};
pub use self::error::{Error, InvalidInput, Result};
pub use self::forest::Forest;
pub use self::identity::{GlobalIds, IdSource, SequentialIds};
pub use self::node::{Node, Slot, Stats};
pub use self::reconcile::{Keyed, Reconciler};
pub use self::tree::{Insertion, Tree};

#[derive(
    Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u64);

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hex = hex::encode(self.0.to_be_bytes());
        let digits = hex.trim_start_matches('0');
        write!(f, "#{}", if digits.is_empty() { "0" } else { digits })
    }
}

thread_local! {
    static FOREST: RefCell<Forest> = RefCell::new(Forest::default());
}

/// An empty tree from this thread's default [`Forest`].
pub fn empty<T>() -> Tree<T> {
    FOREST.with(|forest| forest.borrow().empty())
}

pub fn singleton<T>(element: T) -> Tree<T> {
    FOREST.with(|forest| forest.borrow().singleton(element))
}

/// [`Forest::insert`] on this thread's default forest.
pub fn insert<T: Clone>(tree: &Tree<T>, insertions: Vec<Insertion<T>>) -> Result<Tree<T>> {
    FOREST.with(|forest| forest.borrow_mut().insert(tree, insertions))
}

/// [`Forest::remove`] on this thread's default forest.
pub fn remove<T: Clone>(tree: &Tree<T>, indices: &[usize]) -> Result<Tree<T>> {
    FOREST.with(|forest| forest.borrow_mut().remove(tree, indices))
}
