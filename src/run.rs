use std::env;
use std::fs;
use tracing::{info, warn};

use crate::config::{files_handling, Config};
use crate::error::Result;
use crate::pipeline::Pipeline;


pub struct Run {}

impl Run {

    pub fn run() -> Result<()> {
        let args: Vec<String> = env::args().collect();
        Run::run_with_args(&args)
    }

    pub fn run_with_args(args: &[String]) -> Result<()> {

        info!("building parameters...");
        let config = Config::new(args)?;
        let params = config.get_params();
        info!("{}", params);

        let corpus = files_handling::read_corpus(&params.corpus_file, params.lowercase)?;
        if corpus.is_empty() {
            warn!(corpus_file = %params.corpus_file, "corpus has no sentences");
        }

        let embeddings = Pipeline::run(&corpus, params.window_size, params.num_threads)?;

        // the counts and vocabulary can be dumped for inspection, embeddings are not persisted
        if params.save_counts {
            files_handling::save_output(&params.output_dir, "counts", embeddings.counts())?;
            files_handling::save_output(&params.output_dir, "words", embeddings.vocab())?;
            info!(output_dir = %params.output_dir, "saved counts and words");
        }

        let sim = embeddings.similarity();
        for (word_a, word_b) in &params.pairs {
            let score = sim.score(word_a, word_b, params.dim)?;
            println!("Similarity({}, {}): {}", word_a, word_b, score);
        }

        for token in &params.neighbours {
            println!("searching {} most similar words to {}", params.top_k, token);
            for (i, (similar_token, score)) in sim.find_k_most_similar(token, params.dim, params.top_k)?.iter().enumerate() {
                println!("{} : {} ? {} = {}", i, token, similar_token, score);
            }
        }

        if params.plot {
            fs::create_dir_all(&params.output_dir)?;
            sim.draw_tokens_2d(&config.output_path("tokens_2d.svg"))?;
        }

        Ok(())
    }

}


#[cfg(test)]
mod tests {

    use ndarray::Array2;
    use ndarray_npy::read_npy;
    use std::fs;

    use super::Run;
    use crate::error::EmbeddingError;

    fn write_inputs(dir: &std::path::Path, extra: &str) -> Vec<String> {
        let corpus = dir.join("corpus.txt");
        fs::write(&corpus, "Shakespeare wrote plays .\nJohn read them .\nJohn wrote novels .\n").unwrap();

        let out = dir.join("out");
        let args = dir.join("args.json");
        fs::write(&args, format!(
            r#"{{"corpus_file": {:?}, "output_dir": {:?}{}}}"#,
            corpus.display().to_string(), out.display().to_string(), extra
        )).unwrap();

        vec!["cooc_svd".to_string(), args.display().to_string()]
    }

    #[test]
    fn run_saves_counts() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_inputs(dir.path(), r#", "save_counts": true, "pairs": [["novels", "plays"]], "neighbours": ["plays"]"#);
        Run::run_with_args(&args).unwrap();

        let counts: Array2<f64> = read_npy(dir.path().join("out").join("counts.npy")).unwrap();
        assert_eq!(counts.dim(), (9, 9));
        assert_eq!(counts.sum(), 24.0);
        assert!(dir.path().join("out").join("words.json").exists());
    }

    #[test]
    fn run_reports_unknown_pair() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_inputs(dir.path(), r#", "pairs": [["novels", "poems"]]"#);
        assert!(matches!(Run::run_with_args(&args), Err(EmbeddingError::UnknownToken { .. })));
    }

    #[test]
    fn run_rejects_dim_above_rank() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_inputs(dir.path(), r#", "dim": 7, "pairs": [["novels", "plays"]]"#);
        assert!(matches!(Run::run_with_args(&args), Err(EmbeddingError::DimensionOutOfRange { dim: 7, rank: 6 })));
    }

}
