use itertools::Itertools;

use crate::Show;

/// A finite alphabet of `char` symbols. The symbols are kept sorted and free of duplicates, so
/// two alphabets are equal precisely if they contain the same symbols, and iterating over
/// [`CharAlphabet::universe`] is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CharAlphabet(Vec<char>);

impl CharAlphabet {
    /// Creates a new [`CharAlphabet`] from an iterator over the symbols.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        symbols.into_iter().collect()
    }

    /// Creates a new [`CharAlphabet`] alphabet of the given size. The symbols are just the first `size` letters
    /// of the alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self((0..size).map(|i| (b'a' + i as u8) as char).collect())
    }

    /// Returns an iterator over all symbols in the alphabet, in ascending order.
    pub fn universe(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    /// Returns true if the given symbol is present in the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.0.binary_search(&symbol).is_ok()
    }

    /// Returns the number of symbols in the alphabet.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Index<usize> for CharAlphabet {
    type Output = char;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl FromIterator<char> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self(iter.into_iter().unique().sorted().collect())
    }
}

impl From<Vec<char>> for CharAlphabet {
    fn from(value: Vec<char>) -> Self {
        value.into_iter().collect()
    }
}

impl Show for CharAlphabet {
    fn show(&self) -> String {
        char::show_collection(self.0.iter())
    }
}

/// Helper macro for creating a [`CharAlphabet`] alphabet. Is called simply with a list of symbols
/// that are separated by commata.
///
/// # Examples
/// ```
/// use chomsky::alphabet;
/// let alphabet = alphabet!('c', 'a', 'b', 'a');
/// assert_eq!(alphabet.size(), 3);
/// assert_eq!(alphabet[0], 'a');
/// ```
#[macro_export]
macro_rules! alphabet {
    ($($c:literal),*) => {
        $crate::alphabet::CharAlphabet::new([$($c),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_sorted_and_unique() {
        let alphabet = CharAlphabet::new("cabbage".chars());
        assert_eq!(alphabet.universe().collect::<String>(), "abceg");
        assert!(alphabet.contains('g'));
        assert!(!alphabet.contains('z'));
        assert_eq!(alphabet.show(), "{a, b, c, e, g}");
    }

    #[test]
    fn of_size_takes_leading_letters() {
        let alphabet = CharAlphabet::of_size(3);
        assert_eq!(alphabet, CharAlphabet::from(vec!['c', 'b', 'a']));
        assert_eq!(alphabet[2], 'c');
        assert!(CharAlphabet::of_size(0).is_empty());
    }
}
