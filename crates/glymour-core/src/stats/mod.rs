//! Learning from tabular data.
//!
//! This module provides:
//! - **variable**: Named row extractors, quantization, the variable container
//! - **numeric**: Gamma-function kernels behind the chi-square tail
//! - **chi_square**: The stratified chi-square independence oracle

pub mod chi_square;
pub mod numeric;
pub mod variable;

use crate::engine::errors::LearnError;
use crate::engine::learning_net::{LearnerConfig, LearningNet};
use chi_square::{ChiSquareConfig, ChiSquareOracle};
use variable::{VariableContainer, VariableId};

impl LearningNet<VariableId, ChiSquareOracle> {
    /// A learner over every variable of `container`, testing with a default
    /// [`ChiSquareOracle`].
    pub fn from_container<R>(
        container: &VariableContainer<R>,
        config: LearnerConfig,
    ) -> Result<Self, LearnError> {
        Self::from_container_with(container, config, ChiSquareConfig::default())
    }

    pub fn from_container_with<R>(
        container: &VariableContainer<R>,
        config: LearnerConfig,
        chi_square: ChiSquareConfig,
    ) -> Result<Self, LearnError> {
        let oracle = ChiSquareOracle::from_container(container, chi_square)?;
        LearningNet::new(container.ids(), oracle, config)
    }
}
