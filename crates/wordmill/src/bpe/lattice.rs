//! # Symbol Lattice
//!
//! A per-word doubly-linked list of symbol nodes the BPE merge loop
//! rewrites in place. Nodes live in an index arena; `prev`/`next` are arena
//! indices, and merged-away nodes stay in the arena flagged `deleted` until
//! a sweep pass compacts them out.

use crate::types::{Pair, TokenId};

const NIL: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct SymbolNode {
    id: TokenId,
    prev: u32,
    next: u32,
    deleted: bool,
}

/// A word's current symbol sequence during BPE training.
#[derive(Debug, Clone)]
pub struct SymbolLattice {
    nodes: Vec<SymbolNode>,
    head: u32,
    unk_id: TokenId,
}

impl SymbolLattice {
    /// Build a lattice from a word's bytes: one node per byte.
    ///
    /// Bytes inside the keep-set get `id = byte`; the rest become `unk_id`
    /// nodes, which every later stage skips.
    pub fn from_bytes(
        word: &[u8],
        keep_set: &[bool; 256],
        unk_id: TokenId,
    ) -> Self {
        let n = word.len();
        let mut nodes = Vec::with_capacity(n);
        for (i, &byte) in word.iter().enumerate() {
            let id = if keep_set[byte as usize] {
                byte as TokenId
            } else {
                unk_id
            };
            nodes.push(SymbolNode {
                id,
                prev: if i == 0 { NIL } else { (i - 1) as u32 },
                next: if i + 1 == n { NIL } else { (i + 1) as u32 },
                deleted: false,
            });
        }
        Self {
            nodes,
            head: if n == 0 { NIL } else { 0 },
            unk_id,
        }
    }

    /// Iterate the ids of live (non-deleted) nodes, unk included.
    pub fn live_ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        LiveWalk {
            lattice: self,
            at: self.head,
        }
        .map(move |idx| self.nodes[idx as usize].id)
    }

    /// Iterate adjacent live `(left, right)` id pairs, skipping any pair
    /// that touches an unk node.
    pub fn live_pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        let unk = self.unk_id;
        let mut walk = LiveWalk {
            lattice: self,
            at: self.head,
        };
        let mut left = walk.next().map(|idx| self.nodes[idx as usize].id);
        core::iter::from_fn(move || {
            loop {
                let right = walk.next().map(|idx| self.nodes[idx as usize].id)?;
                let pair = (left?, right);
                left = Some(right);
                if pair.0 != unk && pair.1 != unk {
                    return Some(pair);
                }
            }
        })
    }

    /// The number of live nodes.
    pub fn live_len(&self) -> usize {
        self.nodes.iter().filter(|node| !node.deleted).count()
    }

    /// Merge all occurrences of `pair` into `new_id`, left to right.
    ///
    /// For each occurrence the left node takes `new_id` and absorbs the
    /// right node, which is unlinked and flagged deleted. Surviving live
    /// non-unk neighbours produce pair-count deltas through `on_delta`:
    /// `(old neighbour pair, -1)` and `(new neighbour pair, +1)` per
    /// occurrence; the caller weights them by the word count.
    ///
    /// Returns the number of merged occurrences.
    pub fn merge_pair<F>(
        &mut self,
        pair: Pair,
        new_id: TokenId,
        on_delta: &mut F,
    ) -> u64
    where
        F: FnMut(Pair, i64),
    {
        let (a, b) = pair;
        let mut merged = 0;

        let mut at = self.head;
        while at != NIL {
            let node = self.nodes[at as usize];
            if node.deleted || node.id != a || node.next == NIL {
                at = node.next;
                continue;
            }
            let right_idx = node.next;
            let right = self.nodes[right_idx as usize];
            if right.deleted || right.id != b {
                at = node.next;
                continue;
            }

            merged += 1;

            if node.prev != NIL {
                let left_neighbour = self.nodes[node.prev as usize];
                if !left_neighbour.deleted && left_neighbour.id != self.unk_id {
                    on_delta((left_neighbour.id, a), -1);
                    on_delta((left_neighbour.id, new_id), 1);
                }
            }
            if right.next != NIL {
                let right_neighbour = self.nodes[right.next as usize];
                if !right_neighbour.deleted && right_neighbour.id != self.unk_id {
                    on_delta((b, right_neighbour.id), -1);
                    on_delta((new_id, right_neighbour.id), 1);
                }
            }

            self.nodes[at as usize].id = new_id;
            self.nodes[at as usize].next = right.next;
            if right.next != NIL {
                self.nodes[right.next as usize].prev = at;
            }
            self.nodes[right_idx as usize].deleted = true;

            // Continue from the merged node; occurrences never overlap.
            at = self.nodes[at as usize].next;
        }

        merged
    }

    /// Compact deleted nodes out of the arena.
    pub fn sweep(&mut self) {
        if self.nodes.iter().all(|node| !node.deleted) {
            return;
        }

        let live: Vec<TokenId> = self.live_ids().collect();
        let n = live.len();
        self.nodes.clear();
        for (i, id) in live.into_iter().enumerate() {
            self.nodes.push(SymbolNode {
                id,
                prev: if i == 0 { NIL } else { (i - 1) as u32 },
                next: if i + 1 == n { NIL } else { (i + 1) as u32 },
                deleted: false,
            });
        }
        self.head = if n == 0 { NIL } else { 0 };
    }
}

struct LiveWalk<'a> {
    lattice: &'a SymbolLattice,
    at: u32,
}

impl Iterator for LiveWalk<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.at != NIL {
            let idx = self.at;
            let node = &self.lattice.nodes[idx as usize];
            self.at = node.next;
            if !node.deleted {
                return Some(idx);
            }
        }
        None
    }
}
