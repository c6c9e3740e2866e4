// ===== cipherforge/src/alphabet.rs =====
//! Symbol alphabets and the 27-bit presence codec.
//!
//! A word is reduced to a `u32` mask where bit `i` is set iff any of its
//! characters is symbol `i` of the alphabet. Order and multiplicity are
//! discarded, so [`Alphabet::decode`] can only return the symbols in
//! ascending index order.

use crate::error::{CfResult, CipherForgeError};
use crate::{ALPHABET_SIZE, FULL_MASK};
use std::collections::HashMap;

pub const SOURCE_SYMBOLS: &str = "abcdefghijklmnopqrstuvwxyz ";

// aleph..tav (22), then final kaf, mem, nun, pe, tsadi
pub const HEBREW_SYMBOLS: &str = "אבגדהוזחטיכלמנסעפצקרשתךםןףץ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: [char; ALPHABET_SIZE],
    index: HashMap<char, u8>,
}

impl Alphabet {
    /// Builds an alphabet from exactly 27 distinct characters.
    pub fn from_symbols(symbols: &str) -> CfResult<Self> {
        let chars: Vec<char> = symbols.chars().collect();
        if chars.len() != ALPHABET_SIZE {
            return Err(CipherForgeError::Config(format!(
                "Alphabet must contain exactly {} symbols, got {}",
                ALPHABET_SIZE,
                chars.len()
            )));
        }

        let mut table = [' '; ALPHABET_SIZE];
        let mut index = HashMap::with_capacity(ALPHABET_SIZE);
        for (i, &c) in chars.iter().enumerate() {
            if index.insert(c, i as u8).is_some() {
                return Err(CipherForgeError::Config(format!(
                    "Alphabet symbol '{}' appears more than once",
                    c
                )));
            }
            table[i] = c;
        }

        Ok(Self {
            symbols: table,
            index,
        })
    }

    /// `a`..`z` followed by the blank.
    pub fn source() -> Self {
        Self::from_symbols(SOURCE_SYMBOLS).expect("built-in source alphabet is valid")
    }

    pub fn hebrew() -> Self {
        Self::from_symbols(HEBREW_SYMBOLS).expect("built-in hebrew alphabet is valid")
    }

    pub fn symbol(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    pub fn index_of(&self, c: char) -> Option<usize> {
        self.index.get(&c).map(|&i| i as usize)
    }

    pub fn symbols(&self) -> &[char; ALPHABET_SIZE] {
        &self.symbols
    }

    /// Unknown characters are dropped.
    pub fn encode(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|c| self.index_of(c))
            .fold(0u32, |mask, i| mask | (1 << i))
    }

    /// Lossy: one symbol per set bit, ascending index. Bits above 26 are ignored.
    pub fn decode(&self, mask: u32) -> String {
        (0..ALPHABET_SIZE)
            .filter(|&i| mask & (1 << i) != 0)
            .map(|i| self.symbols[i])
            .collect()
    }
}

/// A word is usable for scoring only if it sets at least one bit and no bit
/// outside the 27-symbol range.
#[inline(always)]
pub fn is_valid_mask(mask: u32) -> bool {
    mask != 0 && mask & !FULL_MASK == 0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    mask: u32,
}

impl Word {
    pub fn new(text: impl Into<String>, alphabet: &Alphabet) -> Self {
        let text = text.into();
        let mask = alphabet.encode(&text);
        Self { text, mask }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }
}

/// Read-only list of words sharing one alphabet.
#[derive(Debug, Clone, Default)]
pub struct WordCollection {
    words: Vec<Word>,
}

impl WordCollection {
    /// Empty lines are skipped; everything else is kept, including words whose
    /// characters are all outside the alphabet (they encode to an empty mask).
    pub fn from_lines<I, S>(lines: I, alphabet: &Alphabet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = lines
            .into_iter()
            .filter(|l| !l.as_ref().is_empty())
            .map(|l| Word::new(l.as_ref(), alphabet))
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.words.iter()
    }

    pub fn masks(&self) -> Vec<u32> {
        self.words.iter().map(Word::mask).collect()
    }
}

impl<'a> IntoIterator for &'a WordCollection {
    type Item = &'a Word;
    type IntoIter = std::slice::Iter<'a, Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}
