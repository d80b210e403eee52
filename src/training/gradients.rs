//! Gradient and hessian storage.

/// One (gradient, hessian) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f32,
    pub hess: f32,
}

/// Per-row gradient buffer for a single-output objective.
///
/// Stored as interleaved pairs so histogram building reads one cache line per
/// row instead of two.
#[derive(Debug, Clone)]
pub struct Gradients {
    pairs: Vec<GradsTuple>,
}

impl Gradients {
    pub fn new(n_samples: usize) -> Self {
        Self {
            pairs: vec![GradsTuple::default(); n_samples],
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn pairs(&self) -> &[GradsTuple] {
        &self.pairs
    }

    #[inline]
    pub fn pairs_mut(&mut self) -> &mut [GradsTuple] {
        &mut self.pairs
    }

    /// Sum of gradients and hessians over `rows` (all rows when `None`).
    ///
    /// Accumulates in f64 for numerical stability.
    pub fn sum(&self, rows: Option<&[u32]>) -> (f64, f64) {
        let fold = |(g, h): (f64, f64), p: &GradsTuple| (g + p.grad as f64, h + p.hess as f64);
        match rows {
            None => self.pairs.iter().fold((0.0, 0.0), fold),
            Some(rows) => rows
                .iter()
                .map(|&r| &self.pairs[r as usize])
                .fold((0.0, 0.0), fold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_over_subset() {
        let mut g = Gradients::new(3);
        for (i, p) in g.pairs_mut().iter_mut().enumerate() {
            p.grad = i as f32;
            p.hess = 1.0;
        }
        assert_eq!(g.sum(None), (3.0, 3.0));
        assert_eq!(g.sum(Some(&[0, 2])), (2.0, 2.0));
    }
}
