//! Session tuning parameters.

use crate::errors::ProtocolError;

/// Default bound on the number of input labels a single point function may
/// consume. The tree allocates `2^n` seeds, so this also bounds memory.
pub const MAX_UNARY_OUTER_PRODUCT_SIZE: usize = 16;
/// Default number of rows of `x` handled by one point function when
/// computing a half outer product.
pub const DEFAULT_OUTER_PRODUCT_SLICE_SIZE: usize = 8;
/// Inputs up to this width are evaluated by a single private table.
pub const ONE_LAYER_BOUND: usize = 8;
/// Number of bits that fit into one packed label (one per GF(256)
/// coefficient of a byte).
pub const MAX_PACK_WIDTH: usize = 8;

/// Largest point-function width a configuration may ask for.
const HARD_TREE_LIMIT: usize = 24;
/// Smallest point-function width a configuration may ask for. GF(256)
/// inversion and the second layer of a `LayeredFunction` always build
/// trees over eight labels.
pub const MIN_TREE_WIDTH: usize = 8;

/// Parameters shared by both parties of a session. The generator and the
/// evaluator must use equal configurations, otherwise their message streams
/// diverge.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Maximum number of input labels for `privacy_free_point` and
    /// `unary_outer_product`, at least [`MIN_TREE_WIDTH`].
    pub max_unary_outer_product_size: usize,
    /// Slice height used by `half_outer_product`.
    pub outer_product_slice_size: usize,
    /// Width below which a `LayeredFunction` uses one table.
    pub one_layer_bound: usize,
    /// Number of output bits packed per label by `private_function`.
    pub pack_width: usize,
    /// Evaluate tree leaves on the `rayon` pool.
    pub parallel: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_unary_outer_product_size: MAX_UNARY_OUTER_PRODUCT_SIZE,
            outer_product_slice_size: DEFAULT_OUTER_PRODUCT_SLICE_SIZE,
            one_layer_bound: ONE_LAYER_BOUND,
            pack_width: MAX_PACK_WIDTH,
            parallel: true,
        }
    }
}

impl SessionConfig {
    /// Set the maximum point-function width.
    pub fn with_max_unary_outer_product_size(mut self, n: usize) -> Self {
        self.max_unary_outer_product_size = n;
        self
    }

    /// Set the half outer product slice height.
    pub fn with_outer_product_slice_size(mut self, n: usize) -> Self {
        self.outer_product_slice_size = n;
        self
    }

    /// Set the single-layer bound of `LayeredFunction`.
    pub fn with_one_layer_bound(mut self, n: usize) -> Self {
        self.one_layer_bound = n;
        self
    }

    /// Set the output packing width.
    pub fn with_pack_width(mut self, width: usize) -> Self {
        self.pack_width = width;
        self
    }

    /// Enable or disable parallel leaf evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that the parameters are usable together.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let max = self.max_unary_outer_product_size;
        if !(MIN_TREE_WIDTH..=HARD_TREE_LIMIT).contains(&max) {
            return Err(ProtocolError::InvalidConfig(format!(
                "max_unary_outer_product_size must be in {}..={}, got {}",
                MIN_TREE_WIDTH, HARD_TREE_LIMIT, max
            )));
        }
        if self.outer_product_slice_size == 0 || self.outer_product_slice_size > max {
            return Err(ProtocolError::InvalidConfig(format!(
                "outer_product_slice_size must be in 1..={}, got {}",
                max, self.outer_product_slice_size
            )));
        }
        if self.one_layer_bound == 0 || self.one_layer_bound > max {
            return Err(ProtocolError::InvalidConfig(format!(
                "one_layer_bound must be in 1..={}, got {}",
                max, self.one_layer_bound
            )));
        }
        if self.pack_width == 0 || self.pack_width > MAX_PACK_WIDTH {
            return Err(ProtocolError::InvalidConfig(format!(
                "pack_width must be in 1..={}, got {}",
                MAX_PACK_WIDTH, self.pack_width
            )));
        }
        Ok(())
    }
}
