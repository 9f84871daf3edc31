use std::ops::Deref;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::node::{Iter, Node};

/// Place `element` at `index` of the sequence as it stands once the removals
/// and the earlier insertions of the same batch have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Insertion<T> {
    pub index: usize,
    pub element: T,
}

impl<T> Insertion<T> {
    pub fn new(index: usize, element: T) -> Self {
        Self { index, element }
    }
}

impl<T> From<(usize, T)> for Insertion<T> {
    fn from((index, element): (usize, T)) -> Self {
        Self { index, element }
    }
}

/// Handle to an immutable children tree.
///
/// Cloning a handle is cheap and yields the same root. Two handles whose
/// roots are [`Tree::ptr_eq`] (or share an [`Node::id`]) hold the same
/// content, which is what lets a renderer skip unchanged subtrees.
#[derive(Debug)]
pub struct Tree<T> {
    root: Rc<Node<T>>,
}

impl<T> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            root: Rc::clone(&self.root),
        }
    }
}

impl<T> Deref for Tree<T> {
    type Target = Node<T>;

    fn deref(&self) -> &Node<T> {
        &self.root
    }
}

impl<T> Tree<T> {
    pub(crate) fn from_node(root: Node<T>) -> Self {
        Self {
            root: Rc::new(root),
        }
    }

    pub fn root(&self) -> &Rc<Node<T>> {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.root.count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.count() == 0
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.root, &other.root)
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.root.iter()
    }
}
