//! List differ: turns a previous and a current list of keys into the
//! remove-then-insert script that [`crate::Forest`] consumes.

use serde::{Deserialize, Serialize};

use crate::tree::Insertion;

/// Edit script turning one key list into another.
///
/// Apply `removes` first, then `inserts`. Both lists are sorted ascending and
/// use the same index conventions as [`crate::Forest::remove`] and
/// [`crate::Forest::insert`], so they can be fed in as they are.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    pub removes: Vec<usize>,
    /// Positions in the current list whose items have to be inserted.
    pub inserts: Vec<usize>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.removes.is_empty() && self.inserts.is_empty()
    }

    /// Pairs every insert index with the matching item of `current`.
    ///
    /// # Panics
    ///
    /// If `current` is not the list these changes were computed against and
    /// an insert index falls past its end.
    pub fn insertions<T: Clone>(&self, current: &[T]) -> Vec<Insertion<T>> {
        self.inserts
            .iter()
            .map(|&index| Insertion::new(index, current[index].clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Keep(usize),
    Remove(usize),
    Insert(usize),
}

impl Run {
    /// Extends `self` by one step of the same kind, or returns the step.
    fn absorb(&mut self, step: Run) -> Option<Run> {
        match (self, step) {
            (Run::Keep(n), Run::Keep(m))
            | (Run::Remove(n), Run::Remove(m))
            | (Run::Insert(n), Run::Insert(m)) => {
                *n += m;
                None
            }
            _ => Some(step),
        }
    }
}

/// Computes the edit script from `previous` to `current`.
///
/// Kept items are a longest common subsequence of the two lists. The cost
/// grows with the number of edits rather than with the product of the list
/// lengths, so moving one key in a long list stays cheap. Keys are
/// expected to be unique within each list; with duplicates any matching
/// occurrence may be the one that is kept.
///
/// ```
/// let changes = children_tree::diff(&['A', 'B', 'C', 'D', 'E'], &['B', 'A', 'C', 'D', 'E', 'F']);
/// assert_eq!(changes.removes, vec![1]);
/// assert_eq!(changes.inserts, vec![0, 5]);
/// ```
pub fn diff<K: PartialEq>(previous: &[K], current: &[K]) -> Changes {
    let mut removes = Vec::new();
    let mut inserts = Vec::new();
    let mut remove_cursor = 0;
    let mut insert_cursor = 0;

    for run in align(previous, current) {
        match run {
            Run::Keep(n) => {
                remove_cursor += n;
                insert_cursor += n;
            }
            Run::Remove(n) => removes.extend(std::iter::repeat_n(remove_cursor, n)),
            Run::Insert(n) => {
                inserts.extend(insert_cursor..insert_cursor + n);
                insert_cursor += n;
            }
        }
    }

    Changes { removes, inserts }
}

fn align<K: PartialEq>(previous: &[K], current: &[K]) -> Vec<Run> {
    let prefix = previous
        .iter()
        .zip(current)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = previous[prefix..]
        .iter()
        .rev()
        .zip(current[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old = &previous[prefix..previous.len() - suffix];
    let new = &current[prefix..current.len() - suffix];

    let mut runs = Vec::new();
    let mut push = |step: Run| {
        let absorbed = match runs.last_mut() {
            Some(last) => Run::absorb(last, step),
            None => Some(step),
        };
        if let Some(step) = absorbed {
            runs.push(step);
        }
    };

    if prefix > 0 {
        push(Run::Keep(prefix));
    }

    match (old.is_empty(), new.is_empty()) {
        (true, true) => {}
        (true, false) => push(Run::Insert(new.len())),
        (false, true) => push(Run::Remove(old.len())),
        (false, false) => {
            for step in shortest_edit(old, new) {
                push(step);
            }
        }
    }

    if suffix > 0 {
        push(Run::Keep(suffix));
    }

    runs
}

/// Myers' greedy shortest edit script, in `O((N + M) * D)` time for `D`
/// edits, with a frontier of `O(N + M)` and a trace of `O(D^2)`.
///
/// The x axis walks `new` and the y axis walks `old`, so a step right is an
/// insertion and a step down is a removal. Where two alignments keep the same
/// number of items, the one taking the insertion first reaches further along
/// x and wins.
fn shortest_edit<K: PartialEq>(old: &[K], new: &[K]) -> Vec<Run> {
    let (n, m) = (new.len() as isize, old.len() as isize);
    let max = n + m;
    let slot = |k: isize| (k + max) as usize;

    // frontier[slot(k)] = furthest x reached on diagonal k = x - y
    let mut frontier = vec![0isize; 2 * max as usize + 2];
    // trace[d] holds the frontier after d edits, for diagonals -d, -d + 2, ..., d
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        for k in (-d..=d).step_by(2) {
            let down = k == -d || (k != d && frontier[slot(k - 1)] < frontier[slot(k + 1)]);
            let mut x = if down {
                frontier[slot(k + 1)]
            } else {
                frontier[slot(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && new[x as usize] == old[y as usize] {
                x += 1;
                y += 1;
            }
            frontier[slot(k)] = x;
            if x >= n && y >= m {
                break 'search;
            }
        }
        trace.push((-d..=d).step_by(2).map(|k| frontier[slot(k)]).collect());
    }

    let mut steps = Vec::new();
    let (mut x, mut y) = (n, m);
    for (edits, round) in trace.iter().enumerate().rev() {
        let d = edits as isize + 1;
        let reached = |k: isize| round[((k + edits as isize) / 2) as usize];
        let k = x - y;
        let down = k == -d || (k != d && reached(k - 1) < reached(k + 1));
        let from = if down { k + 1 } else { k - 1 };
        let (from_x, from_y) = (reached(from), reached(from) - from);
        let (start, step) = if down {
            (from_x, Run::Remove(1))
        } else {
            (from_x + 1, Run::Insert(1))
        };
        if x > start {
            steps.push(Run::Keep((x - start) as usize));
        }
        steps.push(step);
        (x, y) = (from_x, from_y);
    }
    if x > 0 {
        steps.push(Run::Keep(x as usize));
    }

    steps.reverse();
    steps
}
