use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, trace};

use crate::coin::Coin;
use crate::config::DEFAULT_BALANCE;
use crate::identity::{GlobalIds, IdSource};
use crate::node::{Node, Slot};
use crate::tree::{Insertion, Tree};
use crate::{InvalidInput, Result, TreeConfig};

/// Builds and edits children trees.
///
/// A forest owns the balance coin and the identity source, so every tree it
/// touches is shaped by the same probability and numbered by the same ids.
#[derive(Debug)]
pub struct Forest<R = StdRng, I = GlobalIds> {
    coin: Coin<R>,
    ids: I,
}

impl Default for Forest {
    fn default() -> Self {
        Self {
            coin: Coin::new(DEFAULT_BALANCE, StdRng::from_entropy()),
            ids: GlobalIds,
        }
    }
}

impl Forest {
    pub fn new(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            coin: Coin::new(config.balance, rng),
            ids: GlobalIds,
        })
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            coin: Coin::new(DEFAULT_BALANCE, StdRng::seed_from_u64(seed)),
            ids: GlobalIds,
        }
    }
}

impl<R: RngCore, I: IdSource> Forest<R, I> {
    pub fn with_parts(balance: f64, rng: R, ids: I) -> Result<Self> {
        TreeConfig::default().with_balance(balance).validate()?;
        Ok(Self {
            coin: Coin::new(balance, rng),
            ids,
        })
    }

    pub fn balance(&self) -> f64 {
        self.coin.balance()
    }

    pub fn empty<T>(&self) -> Tree<T> {
        Tree::from_node(Node::empty(self.ids.next_id()))
    }

    pub fn singleton<T>(&self, element: T) -> Tree<T> {
        Tree::from_node(Node::singleton(self.ids.next_id(), element))
    }

    /// Applies a sorted batch of insertions in one pass.
    ///
    /// The result holds the same sequence as calling `Vec::insert` for each
    /// record in order, so records sharing an index come out reversed.
    /// Subtrees the batch does not reach are shared with `tree`.
    pub fn insert<T: Clone>(
        &mut self,
        tree: &Tree<T>,
        insertions: Vec<Insertion<T>>,
    ) -> Result<Tree<T>> {
        if insertions.is_empty() {
            return Ok(tree.clone());
        }
        if let Err(err) = validate_insertions(tree.count(), &insertions) {
            debug!(%err, "rejected insert batch");
            return Err(err.into());
        }

        let end = insertions.len();
        let mut pending = Pending::new(insertions);

        let root = self.insert_range(tree, &mut pending, end, 0);
        debug!(batch = end, before = tree.count(), after = root.count, "inserted batch");
        Ok(Tree::from_node(root))
    }

    /// Removes the elements at `indices`, each index counted after the
    /// removals before it, so repeating an index removes a consecutive run.
    pub fn remove<T: Clone>(&mut self, tree: &Tree<T>, indices: &[usize]) -> Result<Tree<T>> {
        if indices.is_empty() {
            return Ok(tree.clone());
        }
        if let Err(err) = validate_removals(tree.count(), indices) {
            debug!(%err, "rejected remove batch");
            return Err(err.into());
        }

        let mut pending = Removals { indices, cursor: 0 };
        let root = self.remove_range(tree, &mut pending, 0);
        debug!(batch = indices.len(), before = tree.count(), after = root.count, "removed batch");
        Ok(Tree::from_node(root))
    }

    /// Inserts `pending[cursor..end]` into a copy of `node`, whose first
    /// element sits at absolute position `base`.
    fn insert_range<T: Clone>(
        &mut self,
        node: &Node<T>,
        pending: &mut Pending<T>,
        end: usize,
        base: usize,
    ) -> Node<T> {
        let mut slots = node.slots.clone();
        let count = node.count + (end - pending.cursor);
        let mut i = 0;
        let mut offset = 0;

        while pending.cursor < end {
            let target = pending.index(pending.cursor) - base;
            let child = match slots.get(i) {
                Some(Slot::Branch(child)) => Some(Rc::clone(child)),
                Some(Slot::Leaf(_)) if target > offset => {
                    offset += 1;
                    i += 1;
                    continue;
                }
                _ => None,
            };

            let Some(child) = child else {
                // lands right before slot i, or at the very end
                self.place(&mut slots, i, pending.take());
                continue;
            };

            if target > offset + child.count {
                offset += child.count;
                i += 1;
                continue;
            }

            let split = self.group_end(pending, end, slots.len(), child.count, base + offset);
            let mut child_count = child.count;
            if split > pending.cursor {
                let grown = self.insert_range(&child, pending, split, base + offset);
                child_count = grown.count;
                slots[i] = Slot::Branch(Rc::new(grown));
            }

            if pending.cursor == end {
                break;
            }
            let target = pending.index(pending.cursor) - base;
            if target == offset {
                self.place(&mut slots, i, pending.take());
            } else if target == offset + child_count {
                offset += child_count;
                i += 1;
            }
        }

        Node {
            slots,
            count,
            id: self.ids.next_id(),
            key: node.key,
        }
    }

    /// Finds how many of the pending insertions starting at the cursor go into
    /// the branch whose first element sits at `base`.
    ///
    /// Insertions strictly inside the branch always go in. One sitting on
    /// either edge goes in unless the coin keeps it with the `siblings` of the
    /// branch, which ends the group.
    fn group_end<T>(
        &mut self,
        pending: &Pending<T>,
        end: usize,
        siblings: usize,
        mut child_count: usize,
        base: usize,
    ) -> usize {
        let mut k = pending.cursor;

        while k < end && pending.index(k) == base {
            if self.coin.flip(siblings) {
                return k;
            }
            k += 1;
            child_count += 1;
        }

        while k < end {
            let target = pending.index(k) - base;
            if target > child_count || (target == child_count && self.coin.flip(siblings)) {
                break;
            }
            k += 1;
            child_count += 1;
        }

        k
    }

    fn place<T>(&mut self, slots: &mut Vec<Slot<T>>, i: usize, element: T) {
        let slot = if self.coin.flip(slots.len()) {
            Slot::Leaf(element)
        } else {
            trace!(siblings = slots.len(), "nesting new element");
            Slot::Branch(Rc::new(Node::singleton(self.ids.next_id(), element)))
        };
        slots.insert(i, slot);
    }

    fn remove_range<T: Clone>(
        &mut self,
        node: &Node<T>,
        pending: &mut Removals<'_>,
        base: usize,
    ) -> Node<T> {
        let start = pending.cursor;
        let mut slots = node.slots.clone();
        let mut i = 0;
        let mut offset = 0;

        while i < slots.len() {
            let Some(target) = pending.peek() else {
                break;
            };
            let target = target - base;
            if target >= node.count - (pending.cursor - start) {
                break;
            }

            let child = match &slots[i] {
                Slot::Branch(child) if target < offset + child.count => Some(Rc::clone(child)),
                Slot::Branch(child) => {
                    offset += child.count;
                    i += 1;
                    continue;
                }
                Slot::Leaf(_) if target == offset => None,
                Slot::Leaf(_) => {
                    offset += 1;
                    i += 1;
                    continue;
                }
            };

            match child {
                Some(child) => {
                    let shrunk = self.remove_range(&child, pending, base + offset);
                    if shrunk.count == 0 {
                        slots.remove(i);
                    } else {
                        slots[i] = Slot::Branch(Rc::new(shrunk));
                    }
                }
                None => {
                    slots.remove(i);
                    pending.cursor += 1;
                }
            }
        }

        Node {
            slots,
            count: node.count - (pending.cursor - start),
            id: self.ids.next_id(),
            key: node.key,
        }
    }
}

struct Pending<T> {
    indices: Vec<usize>,
    elements: std::vec::IntoIter<T>,
    cursor: usize,
}

impl<T> Pending<T> {
    fn new(insertions: Vec<Insertion<T>>) -> Self {
        let (indices, elements): (Vec<usize>, Vec<T>) = insertions
            .into_iter()
            .map(|ins| (ins.index, ins.element))
            .unzip();
        Self {
            indices,
            elements: elements.into_iter(),
            cursor: 0,
        }
    }

    fn index(&self, k: usize) -> usize {
        self.indices[k]
    }

    /// Hands out the element under the cursor and moves past it.
    fn take(&mut self) -> T {
        let element = self
            .elements
            .next()
            .expect("every pending index has an element");
        self.cursor += 1;
        element
    }
}

struct Removals<'a> {
    indices: &'a [usize],
    cursor: usize,
}

impl Removals<'_> {
    fn peek(&self) -> Option<usize> {
        self.indices.get(self.cursor).copied()
    }
}

fn validate_insertions<T>(len: usize, insertions: &[Insertion<T>]) -> Result<(), InvalidInput> {
    let mut previous = 0;
    for (position, ins) in insertions.iter().enumerate() {
        if ins.index < previous {
            return Err(InvalidInput::Unsorted {
                position,
                index: ins.index,
                previous,
            });
        }
        // earlier records of the batch have already grown the sequence
        let len = len + position;
        if ins.index > len {
            return Err(InvalidInput::OutOfRange {
                position,
                index: ins.index,
                len,
            });
        }
        previous = ins.index;
    }
    Ok(())
}

fn validate_removals(len: usize, indices: &[usize]) -> Result<(), InvalidInput> {
    let mut previous = 0;
    for (position, &index) in indices.iter().enumerate() {
        if index < previous {
            return Err(InvalidInput::Unsorted {
                position,
                index,
                previous,
            });
        }
        let len = len.saturating_sub(position);
        if index >= len {
            return Err(InvalidInput::OutOfRange {
                position,
                index,
                len,
            });
        }
        previous = index;
    }
    Ok(())
}
