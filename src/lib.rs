mod run;
mod config;
mod cooccurrence;
mod error;
mod factorize;
mod pipeline;
mod similarity;
mod vocab;

pub use run::Run;
pub use config::{files_handling, Config, Params};
pub use cooccurrence::Counts;
pub use error::{EmbeddingError, Result};
pub use factorize::{Factorizer, Svd};
pub use pipeline::{Embeddings, Pipeline};
pub use similarity::{similarity, Similarity};
pub use vocab::{Sentence, Vocab, DUMMY};
