use std::collections::{HashMap, HashSet};

use crate::error::{EmbeddingError, Result};

/// Padding token standing for "no word here" outside sentence boundaries.
pub const DUMMY: &str = "<dummy>";

pub type Sentence = Vec<String>;

/// Sorted, deduplicated word list and its word -> index mapping.
///
/// The sentinel [`DUMMY`] is always part of the vocabulary, so even an empty
/// corpus produces a vocabulary of length one.
#[derive(Clone, Debug, PartialEq)]
pub struct Vocab {
    words: Vec<String>,
    t2i: HashMap<String, usize>,
}

impl Vocab {

    pub fn new(corpus: &[Sentence]) -> Vocab {

        // collect into a set so duplicates collapse, then sort to fix the index assignment
        let mut unique: HashSet<&str> = HashSet::new();
        unique.insert(DUMMY);
        for sentence in corpus {
            for tok in sentence {
                unique.insert(tok.as_str());
            }
        }

        let mut words = unique
        .into_iter()
        .map(|tok| tok.to_owned())
        .collect::<Vec<String>>();
        words.sort();

        let t2i = words
        .iter()
        .enumerate()
        .map(|(i, tok)| (tok.to_owned(), i))
        .collect::<HashMap<String, usize>>();

        Self { words, t2i }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    // never true, the sentinel is always present
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, token: &str) -> bool {
        self.t2i.contains_key(token)
    }

    pub fn index_of(&self, token: &str) -> Result<usize> {
        match self.t2i.get(token) {
            Some(i) => Ok(*i),
            None => Err(EmbeddingError::UnknownToken { token: token.to_owned() })
        }
    }

    pub fn token_at(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(|tok| tok.as_str())
    }

}
