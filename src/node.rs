use std::rc::Rc;

use crate::{Error, NodeId, Result};

/// One position in a node: either an element or a nested node.
#[derive(Debug, Clone)]
pub enum Slot<T> {
    Leaf(T),
    Branch(Rc<Node<T>>),
}

impl<T> Slot<T> {
    pub fn is_branch(&self) -> bool {
        matches!(self, Slot::Branch(_))
    }

    /// Number of elements this slot accounts for.
    pub fn count(&self) -> usize {
        match self {
            Slot::Leaf(_) => 1,
            Slot::Branch(child) => child.count,
        }
    }
}

/// A node of the children tree.
///
/// Nodes are never mutated once they are reachable from a published
/// [`crate::Tree`]; every change builds a new node with a fresh `id` and the
/// same `key`.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub(crate) slots: Vec<Slot<T>>,
    pub(crate) count: usize,
    pub(crate) id: NodeId,
    pub(crate) key: NodeId,
}

impl<T> Node<T> {
    pub(crate) fn empty(id: NodeId) -> Self {
        Self {
            slots: Vec::new(),
            count: 0,
            id,
            key: id,
        }
    }

    pub(crate) fn singleton(id: NodeId, element: T) -> Self {
        Self {
            slots: vec![Slot::Leaf(element)],
            count: 1,
            id,
            key: id,
        }
    }

    pub fn slots(&self) -> &[Slot<T>] {
        &self.slots
    }

    /// Number of elements in this subtree.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Identity of this exact revision. Equal ids mean equal content.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Identity shared by every revision descended from the same first build of this node.
    pub fn key(&self) -> NodeId {
        self.key
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: vec![self.slots.iter()],
            remaining: self.count,
        }
    }

    pub fn get(&self, mut index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }

        let mut node = self;
        'descend: loop {
            for slot in &node.slots {
                match slot {
                    Slot::Leaf(elem) if index == 0 => return Some(elem),
                    Slot::Leaf(_) => index -= 1,
                    Slot::Branch(child) if index < child.count => {
                        node = child.as_ref();
                        continue 'descend;
                    }
                    Slot::Branch(child) => index -= child.count,
                }
            }
            // counts disagree with the slots
            return None;
        }
    }

    /// Calls `f` on every node with its depth, parents before children.
    pub fn walk(&self, f: &mut impl FnMut(&Node<T>, usize)) {
        self.walk_at(0, f)
    }

    fn walk_at(&self, depth: usize, f: &mut impl FnMut(&Node<T>, usize)) {
        f(self, depth);
        for slot in &self.slots {
            if let Slot::Branch(child) = slot {
                child.walk_at(depth + 1, f);
            }
        }
    }

    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        let mut depth_sum = 0;

        self.walk(&mut |node, depth| {
            let leaves = node.slots.iter().filter(|s| !s.is_branch()).count();
            stats.nodes += 1;
            stats.max_slots = stats.max_slots.max(node.slots.len());
            stats.elements += leaves;
            depth_sum += leaves * (depth + 1);
            if leaves > 0 {
                stats.max_depth = stats.max_depth.max(depth + 1);
            }
        });

        if stats.elements > 0 {
            stats.average_depth = depth_sum as f64 / stats.elements as f64;
        }
        stats
    }

    /// Recomputes every count and rejects empty branches.
    pub fn check(&self) -> Result<()> {
        self.check_counts().map(|_| ())
    }

    fn check_counts(&self) -> Result<usize> {
        let mut sum = 0;
        for slot in &self.slots {
            match slot {
                Slot::Leaf(_) => sum += 1,
                Slot::Branch(child) => {
                    let child_sum = child.check_counts()?;
                    if child_sum == 0 {
                        return Err(Error::Corrupt(format!("empty branch {:?}", child.id)));
                    }
                    sum += child_sum;
                }
            }
        }

        if sum != self.count {
            return Err(Error::Corrupt(format!(
                "node {:?} claims {} elements but holds {}",
                self.id, self.count, sum
            )));
        }
        Ok(sum)
    }
}

/// Shape summary of a tree. A leaf sitting directly in the root has depth 1.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stats {
    pub average_depth: f64,
    pub max_depth: usize,
    pub nodes: usize,
    pub max_slots: usize,
    pub elements: usize,
}

/// In-order iterator over the elements of a node.
pub struct Iter<'a, T> {
    stack: Vec<std::slice::Iter<'a, Slot<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Slot::Leaf(elem)) => {
                    self.remaining = self.remaining.saturating_sub(1);
                    return Some(elem);
                }
                Some(Slot::Branch(child)) => self.stack.push(child.slots.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
