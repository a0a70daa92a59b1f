//! Hopcroft's partition refinement.

use super::partition::Partition;
use super::{DenseDfa, collapse};
use crate::formlang::automaton::Automaton;
use crate::formlang::error::Result;
use crate::formlang::symbol::{Symbol, SymbolOrder};
use log::{debug, trace};

/// Minimize a DFA in place using Hopcroft's algorithm.
///
/// Missing transitions are modelled by a synthetic fail state (dense index `n`) that is
/// placed in a class of its own and loops to itself on every symbol. It never shares a
/// class with a real state and is never materialized.
pub fn minimize_hopcroft<T: Symbol, C: SymbolOrder<T>>(
    dfa: &mut Automaton<T>,
    cmp: &C,
) -> Result<()> {
    let Some(dense) = DenseDfa::build(dfa, cmp) else {
        return Ok(());
    };
    let n = dense.len();
    let k = dense.num_symbols;
    let fail = n;
    let size = n + 1;

    // inverse[a * size + j] = states moving to j on symbol a
    let mut inverse: Vec<Vec<usize>> = vec![Vec::new(); k * size];
    for a in 0..k {
        for i in 0..n {
            let target = dense.target(i, a).unwrap_or(fail);
            inverse[a * size + target].push(i);
        }
        inverse[a * size + fail].push(fail);
    }

    // Initial partition: finals, non-finals, fail; empty classes are left out
    let num_finals = dense.finals.iter().filter(|&&f| f).count();
    let num_non_finals = n - num_finals;
    let (final_label, non_final_label, fail_label) = match (num_finals, num_non_finals) {
        (0, _) => (usize::MAX, 0, 1),
        (_, 0) => (0, usize::MAX, 1),
        _ => (0, 1, 2),
    };
    let mut labels: Vec<usize> = dense
        .finals
        .iter()
        .map(|&f| if f { final_label } else { non_final_label })
        .collect();
    labels.push(fail_label);
    let mut partition = Partition::from_labels(&labels);

    // Stability against every class but one is required; seed the smaller of
    // finals/non-finals together with the fail class.
    let mut waiting: Vec<(usize, usize)> = Vec::new();
    let mut in_waiting = vec![false; partition.num_classes() * k];
    let mut seeds = vec![fail_label];
    if num_finals > 0 && num_non_finals > 0 {
        seeds.push(if num_finals <= num_non_finals {
            final_label
        } else {
            non_final_label
        });
    }
    for class in seeds {
        for a in 0..k {
            waiting.push((class, a));
            in_waiting[class * k + a] = true;
        }
    }

    while let Some((splitter, a)) = waiting.pop() {
        in_waiting[splitter * k + a] = false;

        let members = partition.members(splitter).to_vec();
        for j in members {
            for &i in &inverse[a * size + j] {
                partition.mark(i);
            }
        }

        for (old, new) in partition.split_marked() {
            trace!(
                "class {old} split on symbol {a}: {} + {}",
                partition.size(old),
                partition.size(new)
            );
            in_waiting.resize(partition.num_classes() * k, false);
            let smaller = if partition.size(new) <= partition.size(old) {
                new
            } else {
                old
            };
            for b in 0..k {
                let pick = if in_waiting[old * k + b] { new } else { smaller };
                if !in_waiting[pick * k + b] {
                    in_waiting[pick * k + b] = true;
                    waiting.push((pick, b));
                }
            }
        }
    }

    // Representative of each class: its smallest dense index, i.e. smallest state id
    let mut class_rep = vec![usize::MAX; partition.num_classes()];
    for i in 0..n {
        let class = partition.class_of(i);
        class_rep[class] = class_rep[class].min(i);
    }
    let representative: Vec<usize> = (0..n).map(|i| class_rep[partition.class_of(i)]).collect();

    debug!(
        "hopcroft: {n} states, {} symbols, {} classes",
        k,
        partition.num_classes() - 1
    );
    collapse(dfa, &dense, &representative)
}
