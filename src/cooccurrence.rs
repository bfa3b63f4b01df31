// imports
use crate::error::{EmbeddingError, Result};
use crate::vocab::{Sentence, Vocab, DUMMY};

use ndarray::{Array1, Array2, s};
use rayon::{prelude::*, ThreadPoolBuilder};
use tracing::debug;


pub struct Counts {}

impl Counts {

    pub fn pad_sentence<S: AsRef<str>>(words: &[S], window_size: usize) -> Vec<&str> {

        // surround the sentence with `window_size` sentinels on each side, so asking for
        // words before the start or after the end yields the sentinel instead of a fault
        let mut padded: Vec<&str> = Vec::with_capacity(words.len() + 2 * window_size);
        padded.extend(std::iter::repeat(DUMMY).take(window_size));
        padded.extend(words.iter().map(|w| w.as_ref()));
        padded.extend(std::iter::repeat(DUMMY).take(window_size));
        padded
    }

    pub fn context<S: AsRef<str>>(words: &[S], position: usize, window_size: usize) -> Result<Vec<&str>> {

        // returns the `window_size` words before `position` followed by the `window_size` words
        // after it, the word at `position` itself is left out.
        if position >= words.len() {
            return Err(EmbeddingError::PositionOutOfRange { position, len: words.len() });
        }

        let padded = Counts::pad_sentence(words, window_size);
        let in_padded = position + window_size;

        let mut output = padded[in_padded - window_size..in_padded].to_vec();
        output.extend_from_slice(&padded[in_padded + 1..=in_padded + window_size]);
        Ok(output)
    }

    pub fn context_counts<S: AsRef<str>>(words: &[S], position: usize, window_size: usize, vocab: &Vocab) -> Result<Array1<f64>> {

        // one row contribution: how many times each vocabulary word is in the context of `position`
        let mut vector: Array1<f64> = Array1::zeros(vocab.len());
        for tok in Counts::context(words, position, window_size)? {
            vector[vocab.index_of(tok)?] += 1.0;
        }
        Ok(vector)
    }

    fn accumulate(sentence: &Sentence, window_size: usize, vocab: &Vocab, matrix: &mut Array2<f64>) -> Result<()> {

        // row is the centre word, column is the context word
        for position in 0..sentence.len() {
            let token_i = vocab.index_of(&sentence[position])?;
            let counts = Counts::context_counts(sentence, position, window_size, vocab)?;
            let mut row = matrix.slice_mut(s![token_i, ..]);
            row += &counts;
        }
        Ok(())
    }

    pub fn build(corpus: &[Sentence], window_size: usize, vocab: &Vocab) -> Result<Array2<f64>> {

        let n = vocab.len();
        let mut matrix: Array2<f64> = Array2::zeros((n, n));
        for sentence in corpus {
            Counts::accumulate(sentence, window_size, vocab, &mut matrix)?;
        }
        Ok(matrix)
    }

    pub fn build_parallel(corpus: &[Sentence], window_size: usize, vocab: &Vocab, num_threads: usize) -> Result<Array2<f64>> {

        // each worker folds its share of sentences into a private matrix, the partial matrices
        // are then summed. Addition commutes, so the result equals the sequential count.
        if num_threads <= 1 {
            return Counts::build(corpus, window_size, vocab);
        }

        let pool = ThreadPoolBuilder::new().num_threads(num_threads).build()?;
        debug!(num_threads, sentences = corpus.len(), "counting cooccurrences in parallel");

        let n = vocab.len();
        pool.install(|| {
            corpus
            .par_iter()
            .try_fold(
                || Array2::<f64>::zeros((n, n)),
                |mut partial, sentence| {
                    Counts::accumulate(sentence, window_size, vocab, &mut partial)?;
                    Ok::<Array2<f64>, EmbeddingError>(partial)
                })
            .try_reduce(
                || Array2::<f64>::zeros((n, n)),
                |a, b| Ok(a + b))
        })
    }

}
