//! Keyed list reconciliation.
//!
//! # Responsibility
//! - Compute a minimal edit script turning one ordered sequence into another.
//! - Keep identity (`Keyed::key`) separate from content equality (`PartialEq`).
//!
//! # Invariants
//! - Applying `reconcile(old, new)` to `old` yields exactly `new`.
//! - Equal keys with different content produce `Update`, never remove+insert.
//! - `reconcile(x, x)` is empty.
//! - Ops are emitted as: removes (descending), moves, inserts (ascending),
//!   updates (final indices). Each index refers to the sequence as it stands
//!   when that op is applied.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Identity used to match items across two snapshots.
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
}

/// Single edit applied in order to a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp<T> {
    Remove { index: usize },
    Insert { index: usize, item: T },
    /// Remove at `from`, then insert at `to` of the shortened sequence.
    Move { from: usize, to: usize },
    Update { index: usize, item: T },
}

/// Op totals for one script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCounts {
    pub removes: usize,
    pub inserts: usize,
    pub moves: usize,
    pub updates: usize,
}

/// Ordered edit script produced by [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditScript<T> {
    ops: Vec<EditOp<T>>,
}

impl<T> EditScript<T> {
    pub fn empty() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn ops(&self) -> &[EditOp<T>] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<EditOp<T>> {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn counts(&self) -> EditCounts {
        let mut counts = EditCounts::default();
        for op in &self.ops {
            match op {
                EditOp::Remove { .. } => counts.removes += 1,
                EditOp::Insert { .. } => counts.inserts += 1,
                EditOp::Move { .. } => counts.moves += 1,
                EditOp::Update { .. } => counts.updates += 1,
            }
        }
        counts
    }
}

impl<T: Clone> EditScript<T> {
    /// Applies every op in emitted order.
    ///
    /// # Panics
    /// - Panics when an index is out of bounds, which only happens when the
    ///   script is applied to a sequence other than the one it was built from.
    pub fn apply(&self, items: &mut Vec<T>) {
        for op in &self.ops {
            match op {
                EditOp::Remove { index } => {
                    items.remove(*index);
                }
                EditOp::Insert { index, item } => items.insert(*index, item.clone()),
                EditOp::Move { from, to } => {
                    let item = items.remove(*from);
                    items.insert(*to, item);
                }
                EditOp::Update { index, item } => items[*index] = item.clone(),
            }
        }
    }
}

/// Computes the edit script that turns `old` into `new`.
///
/// Moves are limited to items outside the longest run that already appears
/// in target order, so a rotation costs one move instead of `n - 1`.
/// Inputs with repeated keys cannot be matched by identity and fall back to
/// a remove-all/insert-all script.
pub fn reconcile<T>(old: &[T], new: &[T]) -> EditScript<T>
where
    T: Keyed + PartialEq + Clone,
{
    if old == new {
        return EditScript::empty();
    }

    let (Some(old_index), Some(new_index)) = (index_by_key(old), index_by_key(new)) else {
        return replace_all(old, new);
    };

    let mut ops = Vec::new();

    for (index, item) in old.iter().enumerate().rev() {
        if !new_index.contains_key(&item.key()) {
            ops.push(EditOp::Remove { index });
        }
    }

    let working = old
        .iter()
        .map(Keyed::key)
        .filter(|key| new_index.contains_key(key))
        .collect::<Vec<_>>();
    let target = new
        .iter()
        .map(Keyed::key)
        .filter(|key| old_index.contains_key(key))
        .collect::<Vec<_>>();
    push_moves(&working, &target, &mut ops);

    for (index, item) in new.iter().enumerate() {
        if !old_index.contains_key(&item.key()) {
            ops.push(EditOp::Insert {
                index,
                item: item.clone(),
            });
        }
    }

    for (index, item) in new.iter().enumerate() {
        if let Some(&old_position) = old_index.get(&item.key()) {
            if old[old_position] != *item {
                ops.push(EditOp::Update {
                    index,
                    item: item.clone(),
                });
            }
        }
    }

    EditScript { ops }
}

/// Records the moves that reorder `working` into `target` order.
///
/// Items on the longest increasing run of target ranks stay put; every other
/// item is moved to sit right after its target predecessor. Positions are
/// tracked in a slot layout where each moved item owns a reserved slot behind
/// the stable item it follows, so each move costs two prefix sums.
fn push_moves<K, T>(working: &[K], target: &[K], ops: &mut Vec<EditOp<T>>)
where
    K: Eq + Hash,
{
    let rank = target
        .iter()
        .enumerate()
        .map(|(position, key)| (key, position))
        .collect::<HashMap<_, _>>();
    let ranks = working
        .iter()
        .filter_map(|key| rank.get(key).copied())
        .collect::<Vec<_>>();
    let stable = longest_increasing_run(&ranks);

    let mut old_position = vec![0; target.len()];
    for (position, &item_rank) in ranks.iter().enumerate() {
        old_position[item_rank] = position;
    }

    // Group 0 sits before everything; group `i + 1` follows working[i].
    let mut group_len = vec![0usize; working.len() + 1];
    let mut destination = vec![(0usize, 0usize); target.len()];
    let mut anchor_group = 0;
    for position in 0..target.len() {
        if stable.contains(&position) {
            anchor_group = old_position[position] + 1;
            continue;
        }
        destination[position] = (anchor_group, group_len[anchor_group]);
        group_len[anchor_group] += 1;
    }

    let mut group_start = vec![0usize; working.len() + 1];
    let mut home_slot = vec![0usize; working.len()];
    let mut next_slot = group_len[0];
    for index in 0..working.len() {
        home_slot[index] = next_slot;
        group_start[index + 1] = next_slot + 1;
        next_slot += 1 + group_len[index + 1];
    }

    let mut occupied = SlotCounter::new(next_slot);
    for &slot in &home_slot {
        occupied.add(slot, 1);
    }

    for position in 0..target.len() {
        if stable.contains(&position) {
            continue;
        }
        let source = home_slot[old_position[position]];
        let from = occupied.count_before(source);
        occupied.add(source, -1);

        let (group, offset) = destination[position];
        let slot = group_start[group] + offset;
        let to = occupied.count_before(slot);
        occupied.add(slot, 1);

        if from != to {
            ops.push(EditOp::Move { from, to });
        }
    }
}

/// Fenwick tree counting occupied slots.
struct SlotCounter {
    tree: Vec<isize>,
}

impl SlotCounter {
    fn new(len: usize) -> Self {
        Self {
            tree: vec![0; len + 1],
        }
    }

    fn add(&mut self, slot: usize, delta: isize) {
        let mut index = slot + 1;
        while index < self.tree.len() {
            self.tree[index] += delta;
            index += index & index.wrapping_neg();
        }
    }

    /// Occupied slots strictly before `slot`.
    fn count_before(&self, slot: usize) -> usize {
        let mut index = slot;
        let mut total = 0;
        while index > 0 {
            total += self.tree[index];
            index -= index & index.wrapping_neg();
        }
        total as usize
    }
}

/// Returns the values on one longest strictly increasing subsequence.
fn longest_increasing_run(values: &[usize]) -> HashSet<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (index, &value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&tail| values[tail] < value);
        if slot > 0 {
            previous[index] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut members = HashSet::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        members.insert(values[index]);
        cursor = previous[index];
    }
    members
}

fn index_by_key<T: Keyed>(items: &[T]) -> Option<HashMap<T::Key, usize>> {
    let mut index = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        if index.insert(item.key(), position).is_some() {
            return None;
        }
    }
    Some(index)
}

fn replace_all<T: Clone>(old: &[T], new: &[T]) -> EditScript<T> {
    let mut ops = (0..old.len())
        .rev()
        .map(|index| EditOp::Remove { index })
        .collect::<Vec<_>>();
    ops.extend(new.iter().enumerate().map(|(index, item)| EditOp::Insert {
        index,
        item: item.clone(),
    }));
    EditScript { ops }
}
