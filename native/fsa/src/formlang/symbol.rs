//! Symbol types for automata transitions.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

/// Bound for alphabet symbols.
pub trait Symbol: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Symbol for T {}

/// A transition label: either an epsilon move or a symbol of the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label<T> {
    Epsilon,
    Symbol(T),
}

impl<T> Label<T> {
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Label::Epsilon)
    }

    /// The symbol carried by this label, `None` for epsilon.
    #[inline]
    pub fn symbol(&self) -> Option<&T> {
        match self {
            Label::Epsilon => None,
            Label::Symbol(symbol) => Some(symbol),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => f.write_str("ε"),
            Label::Symbol(symbol) => symbol.fmt(f),
        }
    }
}

/// Three-way comparison strategy over symbols.
///
/// Every algorithm that compares labels takes one of these explicitly instead of
/// relying on an ordering attached to the symbol type. Implementations must agree
/// with `Eq` on `T`: two symbols compare `Equal` exactly when they are `==`.
pub trait SymbolOrder<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;

    #[inline]
    fn same(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Whether `label` carries a symbol equal to `symbol`.
    #[inline]
    fn matches(&self, label: &Label<T>, symbol: &T) -> bool {
        label.symbol().is_some_and(|s| self.same(s, symbol))
    }

    /// Sort symbols and drop duplicates under this ordering.
    fn sorted(&self, symbols: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut symbols: Vec<T> = symbols.into_iter().collect();
        symbols.sort_by(|a, b| self.compare(a, b));
        symbols.dedup_by(|a, b| self.same(a, b));
        symbols
    }
}

impl<T, F> SymbolOrder<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// The symbol type's own `Ord`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<T: Ord> SymbolOrder<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsilon() {
        assert!(Label::<char>::Epsilon.is_epsilon());
        assert!(!Label::Symbol('a').is_epsilon());
        assert_eq!(Label::Symbol('a').symbol(), Some(&'a'));
        assert_eq!(Label::<char>::Epsilon.symbol(), None);
    }

    #[test]
    fn test_closure_order() {
        let reversed = |a: &u32, b: &u32| b.cmp(a);
        assert_eq!(reversed.sorted([1, 3, 2, 3]), vec![3, 2, 1]);
        assert!(reversed.matches(&Label::Symbol(4), &4));
        assert!(!reversed.matches(&Label::Epsilon, &4));
    }

    #[test]
    fn test_natural_order() {
        assert_eq!(NaturalOrder.sorted(vec!['c', 'a', 'b', 'a']), vec!['a', 'b', 'c']);
    }
}
