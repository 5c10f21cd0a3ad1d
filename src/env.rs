//! Replaces the engine's former global mutable configuration with an
//! explicit, passable value. Pattern catalogues still cache behind their
//! own `OnceLock`s (see [`crate::patterns`]) since they depend on nothing
//! but the board-size feature, not on any particular environment.

use crate::vc_builder::BuilderParams;

/// Everything a build needs to know beyond the position itself.
#[derive(Clone, Debug)]
pub struct BenzeneEnv {
    pub builder_params: BuilderParams,
}

impl BenzeneEnv {
    pub fn new() -> Self {
        BenzeneEnv {
            builder_params: BuilderParams::default(),
        }
    }

    pub fn with_params(builder_params: BuilderParams) -> Self {
        BenzeneEnv { builder_params }
    }
}

impl Default for BenzeneEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_builder_defaults() {
        let env = BenzeneEnv::new();
        assert_eq!(env.builder_params.max_ors, 4);
    }
}
