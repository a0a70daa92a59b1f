use fsa::formlang::{
    Automaton, MinimizeAlgorithm, NaturalOrder, determinize, is_equivalent, minimize, read_text,
    write_text,
};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use std::io::Cursor;

const SYMBOLS: [u8; 3] = [0, 1, 2];

fn below(g: &mut Gen, bound: usize) -> usize {
    usize::arbitrary(g) % bound
}

/// Random NFA with up to six states, a three-symbol alphabet and some epsilon moves.
#[derive(Debug, Clone)]
struct SmallNfa(Automaton<u8>);

impl Arbitrary for SmallNfa {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut a = Automaton::new();
        let n = 1 + below(g, 6);
        let states: Vec<_> = (0..n).map(|_| a.add_state()).collect();
        a.set_initial(states[0]);
        for &state in &states {
            if below(g, 3) == 0 {
                a.add_final(state);
            }
        }
        for _ in 0..below(g, 2 * n + 1) {
            let source = states[below(g, n)];
            let target = states[below(g, n)];
            if below(g, 4) == 0 {
                a.add_epsilon_transition(source, target);
            } else {
                a.add_symbol_transition(source, SYMBOLS[below(g, SYMBOLS.len())], target);
            }
        }
        SmallNfa(a)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Word(Vec<u8>);

impl Arbitrary for Word {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = below(g, 6);
        Word((0..len).map(|_| SYMBOLS[below(g, SYMBOLS.len())]).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Word))
    }
}

fn accepts(a: &Automaton<u8>, word: &Word) -> bool {
    a.accepts(&word.0, &NaturalOrder)
}

fn minimized(a: &Automaton<u8>, algorithm: MinimizeAlgorithm) -> Automaton<u8> {
    let mut dfa = determinize(a, &NaturalOrder);
    minimize(&mut dfa, algorithm, &NaturalOrder).unwrap();
    dfa
}

#[quickcheck]
fn determinization_preserves_language(nfa: SmallNfa, words: Vec<Word>) -> bool {
    let dfa = determinize(&nfa.0, &NaturalOrder);
    dfa.is_deterministic(&NaturalOrder)
        && words.iter().all(|w| accepts(&nfa.0, w) == accepts(&dfa, w))
        && is_equivalent(&nfa.0, &dfa, &NaturalOrder).unwrap()
}

#[quickcheck]
fn minimizers_agree(nfa: SmallNfa) -> bool {
    let hopcroft = minimized(&nfa.0, MinimizeAlgorithm::Hopcroft);
    let table_fill = minimized(&nfa.0, MinimizeAlgorithm::TableFill);
    hopcroft.num_active_states() == table_fill.num_active_states()
        && hopcroft.num_final_states() == table_fill.num_final_states()
        && is_equivalent(&hopcroft, &table_fill, &NaturalOrder).unwrap()
        && is_equivalent(&hopcroft, &nfa.0, &NaturalOrder).unwrap()
}

#[quickcheck]
fn minimization_is_idempotent(nfa: SmallNfa) -> bool {
    [MinimizeAlgorithm::Hopcroft, MinimizeAlgorithm::TableFill]
        .into_iter()
        .all(|algorithm| {
            let mut dfa = minimized(&nfa.0, algorithm);
            let before: Vec<_> = dfa.states().collect();
            minimize(&mut dfa, algorithm, &NaturalOrder).unwrap();
            dfa.states().collect::<Vec<_>>() == before
        })
}

#[quickcheck]
fn double_complement_is_identity(nfa: SmallNfa, words: Vec<Word>) -> bool {
    let mut dfa = determinize(&nfa.0, &NaturalOrder);
    dfa.extend_alphabet(SYMBOLS);
    dfa.make_total(&NaturalOrder);
    let complement = dfa.complement();
    let back = complement.complement();
    words.iter().all(|w| accepts(&dfa, w) != accepts(&complement, w))
        && is_equivalent(&dfa, &back, &NaturalOrder).unwrap()
}

#[quickcheck]
fn removing_dead_states_preserves_language(nfa: SmallNfa) -> bool {
    let mut pruned = nfa.0.clone();
    pruned.remove_dead_states();
    pruned.num_active_states() <= nfa.0.num_active_states()
        && is_equivalent(&nfa.0, &pruned, &NaturalOrder).unwrap()
}

#[quickcheck]
fn lexicon_contains_exactly_its_words(words: Vec<Word>, others: Vec<Word>) -> bool {
    let mut lexicon = Automaton::new();
    for word in &words {
        lexicon.add_word(word.0.iter().copied(), &NaturalOrder);
    }
    minimize(&mut lexicon, MinimizeAlgorithm::Hopcroft, &NaturalOrder).unwrap();
    words.iter().all(|w| accepts(&lexicon, w))
        && others
            .iter()
            .all(|p| accepts(&lexicon, p) == words.contains(p))
}

#[quickcheck]
fn text_round_trip_preserves_language(nfa: SmallNfa) -> bool {
    let mut buffer = Vec::new();
    write_text(&nfa.0, &mut buffer).unwrap();
    let restored: Automaton<u8> = read_text(Cursor::new(buffer)).unwrap();
    is_equivalent(&nfa.0, &restored, &NaturalOrder).unwrap()
}

#[test]
fn test_star_minimizes_to_one_state() {
    let mut nfa = Automaton::new();
    let x = nfa.symbol('X');
    let star = nfa.kleene(x);
    nfa.set_fragment(star);
    for algorithm in [MinimizeAlgorithm::Hopcroft, MinimizeAlgorithm::TableFill] {
        let mut dfa = determinize(&nfa, &NaturalOrder);
        minimize(&mut dfa, algorithm, &NaturalOrder).unwrap();
        assert_eq!(dfa.num_active_states(), 1);
    }
}

#[test]
fn test_alternative_determinize_and_minimize() {
    let mut nfa = Automaton::new();
    let a = nfa.symbol('A');
    let b = nfa.symbol('B');
    let either = nfa.alternative(a, b);
    nfa.set_fragment(either);

    let mut dfa = determinize(&nfa, &NaturalOrder);
    assert_eq!(dfa.num_active_states(), 3);
    minimize(&mut dfa, MinimizeAlgorithm::Hopcroft, &NaturalOrder).unwrap();
    assert_eq!(dfa.num_active_states(), 2);
}

#[test]
fn test_concatenation_of_two_symbols() {
    let mut nfa = Automaton::new();
    let a = nfa.symbol('A');
    let b = nfa.symbol('B');
    let ab = nfa.concatenate(a, b);
    nfa.set_fragment(ab);
    assert_eq!(nfa.num_active_states(), 3);
}

#[test]
fn test_bounded_repetition_minimizes_to_five_states() {
    let mut nfa = Automaton::new();
    let x = nfa.symbol('X');
    let rep = nfa.repeat(x, 2, 4);
    nfa.set_fragment(rep);
    for algorithm in [MinimizeAlgorithm::Hopcroft, MinimizeAlgorithm::TableFill] {
        let mut dfa = determinize(&nfa, &NaturalOrder);
        minimize(&mut dfa, algorithm, &NaturalOrder).unwrap();
        assert_eq!(dfa.num_active_states(), 5);
        assert_eq!(dfa.num_final_states(), 3);
    }
}

#[test]
fn test_custom_symbol_order() {
    // reversed order: subset construction visits 'b' before 'a'
    let reversed = |a: &char, b: &char| b.cmp(a);
    let mut nfa = Automaton::new();
    let a = nfa.symbol('a');
    let b = nfa.symbol('b');
    let either = nfa.alternative(a, b);
    nfa.set_fragment(either);

    let natural = determinize(&nfa, &NaturalOrder);
    assert_eq!(natural.next_state(0, &'a', &NaturalOrder), Some(1));
    assert_eq!(natural.next_state(0, &'b', &NaturalOrder), Some(2));

    let mut dfa = determinize(&nfa, &reversed);
    assert_eq!(dfa.next_state(0, &'b', &reversed), Some(1));
    assert_eq!(dfa.next_state(0, &'a', &reversed), Some(2));

    minimize(&mut dfa, MinimizeAlgorithm::TableFill, &reversed).unwrap();
    assert_eq!(dfa.num_active_states(), 2);
    assert!(is_equivalent(&dfa, &natural, &reversed).unwrap());
}
