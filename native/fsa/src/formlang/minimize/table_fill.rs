//! Pairwise-marking (table filling) minimization.

use super::{DenseDfa, collapse};
use crate::formlang::automaton::Automaton;
use crate::formlang::error::Result;
use crate::formlang::symbol::{Symbol, SymbolOrder};
use fixedbitset::FixedBitSet;
use log::debug;

/// Symmetric `n × n` table of distinguishable state pairs.
struct PairTable {
    n: usize,
    bits: FixedBitSet,
}

impl PairTable {
    fn new(n: usize) -> Self {
        Self {
            n,
            bits: FixedBitSet::with_capacity(n * n),
        }
    }

    #[inline]
    fn is_marked(&self, i: usize, j: usize) -> bool {
        self.bits.contains(i * self.n + j)
    }

    /// Mark a pair; returns `true` if it was not marked yet.
    #[inline]
    fn mark(&mut self, i: usize, j: usize) -> bool {
        if self.bits.put(i * self.n + j) {
            return false;
        }
        self.bits.insert(j * self.n + i);
        true
    }
}

/// Minimize a DFA in place by computing the distinguishability relation directly.
///
/// Two states are distinguishable when they differ in final status or in the set of
/// symbols they have transitions for; marks are then propagated backwards along
/// equally labelled transitions with an explicit work stack. Each state is merged
/// into the smallest state it is not distinguishable from.
pub fn minimize_table_fill<T: Symbol, C: SymbolOrder<T>>(
    dfa: &mut Automaton<T>,
    cmp: &C,
) -> Result<()> {
    let Some(dense) = DenseDfa::build(dfa, cmp) else {
        return Ok(());
    };
    let n = dense.len();
    let k = dense.num_symbols;

    // inverse[a * n + j] = states moving to j on symbol a
    let mut inverse: Vec<Vec<usize>> = vec![Vec::new(); k * n];
    for i in 0..n {
        for a in 0..k {
            if let Some(j) = dense.target(i, a) {
                inverse[a * n + j].push(i);
            }
        }
    }

    let same_labels = |i: usize, j: usize| {
        (0..k).all(|a| dense.target(i, a).is_some() == dense.target(j, a).is_some())
    };

    let mut table = PairTable::new(n);
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if dense.finals[i] != dense.finals[j] || !same_labels(i, j) {
                table.mark(i, j);
                stack.push((i, j));
            }
        }
    }

    while let Some((i, j)) = stack.pop() {
        for a in 0..k {
            for &p in &inverse[a * n + i] {
                for &q in &inverse[a * n + j] {
                    if p != q && table.mark(p, q) {
                        stack.push((p, q));
                    }
                }
            }
        }
    }

    let representative: Vec<usize> = (0..n)
        .map(|i| (0..=i).find(|&j| !table.is_marked(i, j)).unwrap_or(i))
        .collect();

    debug!(
        "table filling: {n} states, {} classes",
        representative.iter().enumerate().filter(|&(i, &r)| i == r).count()
    );
    collapse(dfa, &dense, &representative)
}
