// imports
use crate::cooccurrence::Counts;
use crate::error::Result;
use crate::factorize::{Factorizer, Svd};
use crate::similarity::Similarity;
use crate::vocab::{Sentence, Vocab};

use ndarray::Array2;
use std::time::Instant;
use tracing::info;

/// Everything the pipeline derives from one corpus.
pub struct Embeddings {
    vocab: Vocab,
    counts: Array2<f64>,
    svd: Svd
}

impl Embeddings {

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn counts(&self) -> &Array2<f64> {
        &self.counts
    }

    pub fn svd(&self) -> &Svd {
        &self.svd
    }

    pub fn similarity(&self) -> Similarity {
        Similarity::new(self.svd.u.clone(), self.vocab.clone())
    }

}

pub struct Pipeline {}

impl Pipeline {

    // runs the procedure in 3 steps -
    // -> vocabulary building
    // -> cooccurrences counting
    // -> factorization

    pub fn run(corpus: &[Sentence], window_size: usize, num_threads: usize) -> Result<Embeddings> {

        let timer = Instant::now();
        let vocab = Vocab::new(corpus);
        info!(sentences = corpus.len(), vocab_size = vocab.len(), "built vocabulary");

        let counts = Counts::build_parallel(corpus, window_size, &vocab, num_threads)?;
        info!(window_size, total = counts.sum(), elapsed_ms = timer.elapsed().as_millis() as u64, "counted cooccurrences");

        let timer = Instant::now();
        let svd = Factorizer::run(&counts)?;
        info!(rank = svd.rank(), elapsed_ms = timer.elapsed().as_millis() as u64, "factorized cooccurrence matrix");

        Ok(Embeddings { vocab, counts, svd })
    }

}


#[cfg(test)]
mod tests {

    use super::Pipeline;
    use crate::cooccurrence::Counts;
    use crate::vocab::{Sentence, DUMMY};

    fn reference_corpus() -> Vec<Sentence> {
        [
            ["Shakespeare", "wrote", "plays", "."],
            ["John", "read", "them", "."],
            ["John", "wrote", "novels", "."]
        ].iter().map(|s| s.iter().map(|t| t.to_string()).collect()).collect()
    }

    #[test]
    fn reference_scenario() {

        let text = reference_corpus();
        let embeddings = Pipeline::run(&text, 1, 1).unwrap();

        let golden = [".", "<dummy>", "John", "Shakespeare", "novels", "plays", "read", "them", "wrote"];
        assert_eq!(embeddings.vocab().words(), &golden.map(|t| t.to_string()));

        let ctx = Counts::context(&text[0], 1, 2).unwrap();
        assert_eq!(ctx, vec![DUMMY, "Shakespeare", "plays", "."]);

        // the zero sentinel row and the identical rows of novels and plays make the matrix rank 6
        let svd = embeddings.svd();
        assert_eq!(svd.rank(), 6);
        let diff = embeddings.counts() - &svd.reconstruct();
        assert!(diff.iter().all(|x| x.abs() < 1e-9));

        let sim = embeddings.similarity();
        assert!(sim.score("novels", "plays", 5).unwrap() > sim.score("John", "plays", 5).unwrap());
    }

    #[test]
    fn thread_count_does_not_change_result() {
        let text = reference_corpus();
        let single = Pipeline::run(&text, 2, 1).unwrap();
        let multi = Pipeline::run(&text, 2, 4).unwrap();
        assert_eq!(single.counts(), multi.counts());
        assert_eq!(single.svd().s, multi.svd().s);
    }

    #[test]
    fn empty_corpus() {
        let embeddings = Pipeline::run(&[], 2, 1).unwrap();
        assert_eq!(embeddings.vocab().words(), &[DUMMY.to_string()]);
        assert_eq!(embeddings.counts().dim(), (1, 1));
        assert_eq!(embeddings.svd().rank(), 0);
    }

}
