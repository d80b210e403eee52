//! Gain computation and regularization parameters.

/// Parameters for split gain computation and leaf weight calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularization (lambda).
    pub reg_lambda: f32,
    /// Minimum split gain (gamma).
    pub min_gain: f32,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f32,
    /// Minimum samples per child.
    pub min_samples_leaf: u32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 0.0,
            min_gain: 0.0,
            min_child_weight: 1e-3,
            min_samples_leaf: 20,
        }
    }
}

impl GainParams {
    /// Split gain:
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    #[inline]
    pub fn compute_gain(
        &self,
        grad_left: f64,
        hess_left: f64,
        grad_right: f64,
        hess_right: f64,
        grad_parent: f64,
        hess_parent: f64,
    ) -> f32 {
        let gain = 0.5
            * (self.score(grad_left, hess_left) + self.score(grad_right, hess_right)
                - self.score(grad_parent, hess_parent))
            - self.min_gain as f64;
        gain as f32
    }

    #[inline]
    fn score(&self, grad: f64, hess: f64) -> f64 {
        let denom = hess + self.reg_lambda as f64;
        if denom <= 0.0 { 0.0 } else { grad * grad / denom }
    }

    /// Check minimum hessian and sample constraints on both children.
    #[inline]
    pub fn is_valid_split(
        &self,
        hess_left: f64,
        hess_right: f64,
        count_left: u32,
        count_right: u32,
    ) -> bool {
        let min_weight = self.min_child_weight as f64;
        hess_left >= min_weight
            && hess_right >= min_weight
            && count_left >= self.min_samples_leaf
            && count_right >= self.min_samples_leaf
    }

    /// Newton step leaf weight: `-G / (H + λ)`.
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        let denom = hess_sum + self.reg_lambda as f64;
        if denom <= 0.0 {
            0.0
        } else {
            (-grad_sum / denom) as f32
        }
    }
}
