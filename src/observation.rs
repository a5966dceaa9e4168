//! Per-round observation generation.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use crate::error::{RankingError, Result};
use crate::sampler::ContextSampler;

/// One round's contexts for every batch element.
///
/// - `global`: `[batch_size, global_dim]`
/// - `per_arm`: `[batch_size, num_items, item_dim]`
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    global: Array2<f64>,
    per_arm: Array3<f64>,
}

impl Observation {
    /// Assemble an observation from pre-built arrays.
    ///
    /// The batch dimensions of the two arrays must agree.
    pub fn new(global: Array2<f64>, per_arm: Array3<f64>) -> Result<Self> {
        if global.nrows() != per_arm.shape()[0] {
            return Err(RankingError::ShapeMismatch {
                what: "observation batch",
                expected: vec![global.nrows()],
                actual: vec![per_arm.shape()[0]],
            });
        }
        Ok(Self { global, per_arm })
    }

    pub fn global(&self) -> ArrayView2<'_, f64> {
        self.global.view()
    }

    pub fn per_arm(&self) -> ArrayView3<'_, f64> {
        self.per_arm.view()
    }

    pub fn batch_size(&self) -> usize {
        self.global.nrows()
    }

    pub fn num_items(&self) -> usize {
        self.per_arm.shape()[1]
    }

    pub fn global_dim(&self) -> usize {
        self.global.ncols()
    }

    pub fn item_dim(&self) -> usize {
        self.per_arm.shape()[2]
    }

    /// Split into `(global, per_arm)`.
    pub fn into_parts(self) -> (Array2<f64>, Array3<f64>) {
        (self.global, self.per_arm)
    }
}

/// Draws global and per-item contexts from two samplers.
///
/// Feature dimensions are inferred once, from one sample of each sampler taken
/// at construction. Every later sample must have the same length.
#[derive(Debug)]
pub struct ObservationGenerator<G, I> {
    global_sampler: G,
    item_sampler: I,
    num_items: usize,
    global_dim: usize,
    item_dim: usize,
}

impl<G: ContextSampler, I: ContextSampler> ObservationGenerator<G, I> {
    pub fn new(mut global_sampler: G, mut item_sampler: I, num_items: usize) -> Self {
        let global_dim = global_sampler.sample().len();
        let item_dim = item_sampler.sample().len();
        Self {
            global_sampler,
            item_sampler,
            num_items,
            global_dim,
            item_dim,
        }
    }

    pub fn global_dim(&self) -> usize {
        self.global_dim
    }

    pub fn item_dim(&self) -> usize {
        self.item_dim
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Draw `batch_size` global vectors and `batch_size * num_items` item vectors.
    ///
    /// All global vectors are drawn first, then the item vectors in
    /// batch-major order.
    pub fn observe(&mut self, batch_size: usize) -> Result<Observation> {
        let mut global = Vec::with_capacity(batch_size * self.global_dim);
        for _ in 0..batch_size {
            let g = self.global_sampler.sample();
            check_len("global context", self.global_dim, g.len())?;
            global.extend(g);
        }

        let n = batch_size * self.num_items;
        let mut items = Vec::with_capacity(n * self.item_dim);
        for _ in 0..n {
            let x = self.item_sampler.sample();
            check_len("item context", self.item_dim, x.len())?;
            items.extend(x);
        }

        let global = Array2::from_shape_vec((batch_size, self.global_dim), global)
            .map_err(|_| shape_err("global context batch", self.global_dim))?;
        let per_arm =
            Array3::from_shape_vec((batch_size, self.num_items, self.item_dim), items)
                .map_err(|_| shape_err("item context batch", self.item_dim))?;
        Ok(Observation { global, per_arm })
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RankingError::ShapeMismatch {
            what,
            expected: vec![expected],
            actual: vec![actual],
        })
    }
}

// The length checks above make this unreachable.
fn shape_err(what: &'static str, dim: usize) -> RankingError {
    RankingError::ShapeMismatch {
        what,
        expected: vec![dim],
        actual: Vec::new(),
    }
}
