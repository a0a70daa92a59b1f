//! Totalization, complement, and language inclusion/equivalence.

use crate::formlang::automaton::Automaton;
use crate::formlang::error::Result;
use crate::formlang::state::StateId;
use crate::formlang::subset_construction::determinize;
use crate::formlang::symbol::{Symbol, SymbolOrder};
use log::debug;

impl<T: Symbol> Automaton<T> {
    /// Add a dead state so that every state has a transition on every alphabet symbol.
    ///
    /// Must be called on a DFA. Returns the dead state, or `None` if the automaton was
    /// already total and nothing was added.
    pub fn make_total<C: SymbolOrder<T>>(&mut self, cmp: &C) -> Option<StateId> {
        debug_assert!(self.is_deterministic(cmp), "totalization requires a DFA");
        let symbols = cmp.sorted(self.alphabet().iter().cloned());

        let mut missing: Vec<(StateId, T)> = Vec::new();
        for state in self.states() {
            for symbol in &symbols {
                if self.next_state(state, symbol, cmp).is_none() {
                    missing.push((state, symbol.clone()));
                }
            }
        }
        if missing.is_empty() {
            return None;
        }

        let dead = self.add_state();
        for (state, symbol) in missing {
            self.add_symbol_transition(state, symbol, dead);
        }
        for symbol in symbols {
            self.add_symbol_transition(dead, symbol, dead);
        }
        debug!("totalized with dead state {dead}");
        Some(dead)
    }

    /// Automaton accepting exactly the words this one rejects.
    ///
    /// Only meaningful for a total DFA; run [`Automaton::make_total`] first.
    pub fn complement(&self) -> Self {
        let mut complement = self.copy();
        let states: Vec<StateId> = complement.states().collect();
        for state in states {
            if !complement.unset_final(state) {
                complement.add_final(state);
            }
        }
        complement
    }

    /// Whether the automaton accepts every word over its alphabet: every reachable
    /// state is final and has a transition for every alphabet symbol.
    pub fn accepts_all<C: SymbolOrder<T>>(&self, cmp: &C) -> bool {
        if self.initial().is_none() {
            return false;
        }
        let reachable = self.reachable_states();
        let reachable_finals = reachable.iter().filter(|&s| self.is_final(s)).count();
        reachable_finals == reachable.len()
            && reachable.iter().all(|state| {
                self.alphabet()
                    .iter()
                    .all(|symbol| self.next_state(state, symbol, cmp).is_some())
            })
    }
}

/// Whether every word accepted by `a` is accepted by `b`.
///
/// Builds `complement(a) ∪ b` over the joint alphabet and checks that the
/// determinized union accepts everything.
pub fn includes<T: Symbol, C: SymbolOrder<T>>(
    a: &Automaton<T>,
    b: &Automaton<T>,
    cmp: &C,
) -> Result<bool> {
    let mut total = determinize(a, cmp);
    if total.initial().is_none() {
        // the empty language is included in everything
        return Ok(true);
    }
    total.extend_alphabet(b.alphabet().iter().cloned());
    total.make_total(cmp);
    let mut union = total.complement();

    // Coerce a single final state so the complement can be used as a fragment
    let single_final = union.add_state();
    let finals: Vec<StateId> = union.finals().iter().collect();
    for state in finals {
        union.unset_final(state);
        union.add_epsilon_transition(state, single_final);
    }
    union.add_final(single_final);
    let not_a = union.fragment()?;

    let joined = match b.initial() {
        Some(_) => {
            let copy_of_b = union.add_automaton(b)?;
            union.alternative(not_a, copy_of_b)
        }
        None => not_a,
    };
    union.set_fragment(joined);

    let dfa = determinize(&union, cmp);
    Ok(dfa.accepts_all(cmp))
}

/// Whether `a` and `b` accept the same language.
pub fn is_equivalent<T: Symbol, C: SymbolOrder<T>>(
    a: &Automaton<T>,
    b: &Automaton<T>,
    cmp: &C,
) -> Result<bool> {
    Ok(includes(a, b, cmp)? && includes(b, a, cmp)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formlang::symbol::NaturalOrder;

    fn lexicon(words: &[&str]) -> Automaton<char> {
        let mut a = Automaton::new();
        for word in words {
            a.add_word(word.chars(), &NaturalOrder);
        }
        a
    }

    #[test]
    fn test_make_total() {
        let mut a = lexicon(&["ab"]);
        assert_eq!(a.num_active_states(), 3);
        let dead = a.make_total(&NaturalOrder).unwrap();
        assert_eq!(a.num_active_states(), 4);
        for state in a.states() {
            for symbol in ['a', 'b'] {
                assert!(a.next_state(state, &symbol, &NaturalOrder).is_some());
            }
        }
        assert_eq!(a.next_state(dead, &'a', &NaturalOrder), Some(dead));
        assert!(a.accepts(&['a', 'b'], &NaturalOrder));

        // already total
        assert_eq!(a.make_total(&NaturalOrder), None);
    }

    #[test]
    fn test_complement() {
        let mut a = lexicon(&["ab"]);
        a.make_total(&NaturalOrder);
        let not_a = a.complement();
        assert!(!not_a.accepts(&['a', 'b'], &NaturalOrder));
        assert!(not_a.accepts(&['a'], &NaturalOrder));
        assert!(not_a.accepts(&[] as &[char], &NaturalOrder));
        assert!(not_a.accepts(&['b', 'b', 'a'], &NaturalOrder));
    }

    #[test]
    fn test_accepts_all() {
        let mut all = Automaton::new();
        let s = all.add_state();
        all.set_initial(s);
        all.add_final(s);
        all.add_symbol_transition(s, 'a', s);
        all.add_symbol_transition(s, 'b', s);
        assert!(all.accepts_all(&NaturalOrder));

        all.extend_alphabet(['c']);
        assert!(!all.accepts_all(&NaturalOrder));
        assert!(!lexicon(&["a"]).accepts_all(&NaturalOrder));
    }

    #[test]
    fn test_inclusion_and_equivalence() {
        let small = lexicon(&["ab", "b"]);
        let large = lexicon(&["ab", "b", "ba"]);
        assert!(includes(&small, &large, &NaturalOrder).unwrap());
        assert!(!includes(&large, &small, &NaturalOrder).unwrap());
        assert!(!is_equivalent(&small, &large, &NaturalOrder).unwrap());

        let reordered = lexicon(&["b", "ab"]);
        assert!(is_equivalent(&small, &reordered, &NaturalOrder).unwrap());
    }

    #[test]
    fn test_equivalence_with_empty_language() {
        let empty: Automaton<char> = Automaton::new();
        let word = lexicon(&["a"]);
        assert!(is_equivalent(&empty, &Automaton::new(), &NaturalOrder).unwrap());
        assert!(includes(&empty, &word, &NaturalOrder).unwrap());
        assert!(!includes(&word, &empty, &NaturalOrder).unwrap());
    }

    #[test]
    fn test_equivalence_across_alphabets() {
        // x* versus x*|y: the second accepts "y", outside the first's alphabet
        let mut star = Automaton::new();
        let x = star.symbol('x');
        let k = star.kleene(x);
        star.set_fragment(k);

        let mut star_or_y = Automaton::new();
        let x = star_or_y.symbol('x');
        let k = star_or_y.kleene(x);
        let y = star_or_y.symbol('y');
        let alt = star_or_y.alternative(k, y);
        star_or_y.set_fragment(alt);

        assert!(includes(&star, &star_or_y, &NaturalOrder).unwrap());
        assert!(!is_equivalent(&star, &star_or_y, &NaturalOrder).unwrap());
    }
}
