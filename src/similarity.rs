use ndarray::prelude::*;
use ndarray_stats::QuantileExt;
use plotters::prelude::*;
use tracing::info;

use crate::error::{EmbeddingError, Result};
use crate::vocab::{Vocab, DUMMY};

/// Dot product of the first `dim` entries of the rows of `u` belonging to `word_a` and `word_b`.
///
/// No normalization is applied, the row norms of U carry how much of a word's
/// co-occurrence pattern the leading directions explain.
pub fn similarity(u: &Array2<f64>, vocab: &Vocab, word_a: &str, word_b: &str, dim: usize) -> Result<f64> {

    if dim > u.ncols() {
        return Err(EmbeddingError::DimensionOutOfRange { dim, rank: u.ncols() });
    }
    let i = vocab.index_of(word_a)?;
    let j = vocab.index_of(word_b)?;
    Ok(u.slice(s![i, ..dim]).dot(&u.slice(s![j, ..dim])))
}

fn plot_err<E: std::fmt::Display>(e: E) -> EmbeddingError {
    EmbeddingError::Plot(e.to_string())
}

pub struct Similarity {
    u: Array2<f64>,
    vocab: Vocab,
}

impl Similarity {

    pub fn new(u: Array2<f64>, vocab: Vocab) -> Similarity {
        assert_eq!(u.nrows(), vocab.len(), "inconsistent number of rows in u and tokens");
        Self { u, vocab }
    }

    pub fn rank(&self) -> usize {
        self.u.ncols()
    }

    pub fn score(&self, word_a: &str, word_b: &str, dim: usize) -> Result<f64> {
        similarity(&self.u, &self.vocab, word_a, word_b, dim)
    }

    pub fn extract_vec_from_word(&self, token: &str, dim: usize) -> Result<Array1<f64>> {

        if dim > self.rank() {
            return Err(EmbeddingError::DimensionOutOfRange { dim, rank: self.rank() });
        }
        let i = self.vocab.index_of(token)?;
        Ok(self.u.slice(s![i, ..dim]).to_owned())
    }

    pub fn find_k_most_similar(&self, token: &str, dim: usize, k: usize) -> Result<Vec<(String, f64)>> {

        // score every word against the token, the token itself and the sentinel are not candidates
        let vec = self.extract_vec_from_word(token, dim)?;
        let scores = self.u.slice(s![.., ..dim]).dot(&vec);

        let mut indexed_scores: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| {
            let candidate = &self.vocab.words()[*i];
            candidate != token && candidate != DUMMY
        })
        .collect();

        // sort by most similar in descending order, stable so ties keep vocabulary order
        indexed_scores.sort_by(|(_i, s), (_j, t)| t.total_cmp(s));
        indexed_scores.truncate(k);

        let sim_tokens = indexed_scores
        .into_iter()
        .map(|(i, score)| (self.vocab.words()[i].to_owned(), score))
        .collect();
        Ok(sim_tokens)
    }

    pub fn get_2dim_projections(&self) -> Result<Array2<f64>> {
        if self.rank() < 2 {
            return Err(EmbeddingError::DimensionOutOfRange { dim: 2, rank: self.rank() });
        }
        Ok(self.u.slice(s![.., ..2]).to_owned())
    }

    pub fn draw_tokens_2d(&self, save_to: &str) -> Result<()> {

        const MARGIN: u32 = 15;
        const FONT_STYLE: (&str, i32) = ("sans-serif", 15);

        let projection = self.get_2dim_projections()?;

        // columns of u are unit vectors, so every coordinate lies within [-1, 1]
        let w_max = projection.max().map_err(plot_err)?.abs();
        let w_min = projection.min().map_err(plot_err)?.abs();
        let limit = w_max.max(w_min).max(1.0);

        let root_area = SVGBackend::new(save_to, (640, 640)).into_drawing_area();
        root_area.fill(&WHITE).map_err(plot_err)?;

        let chart = ChartBuilder::on(&root_area)
        .margin(MARGIN)
        .build_cartesian_2d(-limit..limit, -limit..limit)
        .map_err(plot_err)?;

        // light axes through the origin instead of a labelled mesh
        let axis_style = BLACK.mix(0.3);
        for axis in [[(-limit, 0.0), (limit, 0.0)], [(0.0, -limit), (0.0, limit)]] {
            chart.plotting_area().draw(&PathElement::new(axis.to_vec(), axis_style)).map_err(plot_err)?;
        }

        let text_style = FONT_STYLE.into_font().color(&BLACK);

        // a closure for token label and position
        let position_and_word = |x: f64, y: f64, token: String| {
            EmptyElement::at((x, y))
                + Circle::new((0, 0), 3, ShapeStyle::from(&BLACK).filled())
                + Text::new(token, (10, 10), text_style.clone())
        };

        for (i, token) in self.vocab.words().iter().enumerate() {
            if token == DUMMY {
                continue;
            }
            let (x, y) = (projection[[i, 0]], projection[[i, 1]]);
            chart.plotting_area().draw(&position_and_word(x, y, token.to_string())).map_err(plot_err)?;
        }

        root_area.present().map_err(plot_err)?;
        info!(path = save_to, words = self.vocab.len() - 1, "saved 2d token plot");
        Ok(())
    }

}
