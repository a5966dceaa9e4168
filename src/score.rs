//! Bilinear item scoring.
//!
//! `score(item) = item · W · global`, with `W` of shape `[item_dim, global_dim]`.

use ndarray::{Array2, ArrayView2, ArrayView3, Axis};

use crate::error::{RankingError, Result};

/// Stateless scorer around a fixed weight matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEngine {
    weights: Array2<f64>,
}

impl ScoreEngine {
    /// Wrap a `[item_dim, global_dim]` weight matrix.
    pub fn new(weights: Array2<f64>) -> Self {
        Self { weights }
    }

    /// Wrap a weight matrix, checking it against known feature dimensions.
    pub fn with_dims(weights: Array2<f64>, item_dim: usize, global_dim: usize) -> Result<Self> {
        if weights.dim() != (item_dim, global_dim) {
            return Err(RankingError::ShapeMismatch {
                what: "weight matrix",
                expected: vec![item_dim, global_dim],
                actual: weights.shape().to_vec(),
            });
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    pub fn item_dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn global_dim(&self) -> usize {
        self.weights.ncols()
    }

    /// Score every item of every batch element.
    ///
    /// `global` is `[B, global_dim]`, `items` is `[B, N, item_dim]`; the result
    /// is `[B, N]`. No noise is added.
    pub fn scores(
        &self,
        global: ArrayView2<'_, f64>,
        items: ArrayView3<'_, f64>,
    ) -> Result<Array2<f64>> {
        let (b, n, item_dim) = items.dim();
        if global.dim() != (b, self.global_dim()) {
            return Err(RankingError::ShapeMismatch {
                what: "global contexts",
                expected: vec![b, self.global_dim()],
                actual: global.shape().to_vec(),
            });
        }
        if item_dim != self.item_dim() {
            return Err(RankingError::ShapeMismatch {
                what: "item contexts",
                expected: vec![b, n, self.item_dim()],
                actual: items.shape().to_vec(),
            });
        }

        let mut out = Array2::zeros((b, n));
        for ((g, set), mut row) in global
            .axis_iter(Axis(0))
            .zip(items.axis_iter(Axis(0)))
            .zip(out.axis_iter_mut(Axis(0)))
        {
            // W · g once per batch element, then one dot product per item.
            let projected = self.weights.dot(&g);
            row.assign(&set.dot(&projected));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn identity_weights_score_is_plain_dot_product() {
        let engine = ScoreEngine::new(Array2::eye(2));
        let global = array![[1.0, 0.0]];
        let items = Array3::from_shape_vec((1, 2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let s = engine.scores(global.view(), items.view()).unwrap();
        assert_eq!(s, array![[1.0, 0.0]]);
    }

    #[test]
    fn rectangular_weights() {
        // item_dim = 2, global_dim = 3
        let w = array![[1.0, 2.0, 0.0], [0.0, 1.0, -1.0]];
        let engine = ScoreEngine::with_dims(w, 2, 3).unwrap();
        let global = array![[1.0, 1.0, 1.0], [0.0, 0.0, 2.0]];
        let items = Array3::from_shape_vec((2, 1, 2), vec![1.0, 1.0, 3.0, 1.0]).unwrap();
        let s = engine.scores(global.view(), items.view()).unwrap();
        // b=0: W·g = [3, 0]  -> [1,1]·[3,0] = 3
        // b=1: W·g = [0, -2] -> [3,1]·[0,-2] = -2
        assert_eq!(s, array![[3.0], [-2.0]]);
    }

    #[test]
    fn dimension_checks() {
        assert!(ScoreEngine::with_dims(Array2::zeros((3, 2)), 2, 3).is_err());

        let engine = ScoreEngine::new(Array2::eye(2));
        let bad_global = Array2::<f64>::zeros((2, 2));
        let items = Array3::<f64>::zeros((1, 3, 2));
        assert!(engine.scores(bad_global.view(), items.view()).is_err());

        let global = Array2::<f64>::zeros((1, 2));
        let bad_items = Array3::<f64>::zeros((1, 3, 4));
        assert!(engine.scores(global.view(), bad_items.view()).is_err());
    }
}
