//! Stratified Pearson chi-square independence test.
//!
//! For a query `a ⊥ b | given`, rows are grouped by their observed
//! combination of `given` values (one stratum when `given` is empty). Each
//! stratum contributes the Pearson statistic of its `a × b` contingency table
//! with empty rows and columns dropped, and `(r − 1)(c − 1)` degrees of
//! freedom. Statistics and degrees of freedom are summed across strata and
//! the p-value is the chi-square upper tail at the totals.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::engine::errors::{LearnError, OracleError};
use crate::engine::oracle::IndependenceOracle;
use crate::stats::numeric::chi_square_sf;
use crate::stats::variable::{VariableContainer, VariableId};

/// Configuration for [`ChiSquareOracle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChiSquareConfig {
    /// Strata with fewer rows than this are skipped.
    pub min_stratum_rows: usize,
}

impl Default for ChiSquareConfig {
    fn default() -> Self {
        Self {
            min_stratum_rows: 1,
        }
    }
}

impl ChiSquareConfig {
    pub fn validate(self) -> Result<Self, LearnError> {
        if self.min_stratum_rows == 0 {
            return Err(LearnError::Validation(
                "chi_square: min_stratum_rows must be at least 1".into(),
            ));
        }
        Ok(self)
    }
}

/// Outcome of one stratified test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// Strata that contributed at least one degree of freedom.
    pub strata: usize,
}

/// One variable's values as dense state indices.
#[derive(Debug, Clone)]
struct StateColumn {
    name: String,
    states: Vec<u32>,
    cardinality: usize,
}

/// Chi-square oracle over the discrete states of a [`VariableContainer`].
///
/// Each distinct value of a variable is one state; classed variables are
/// tested on their class indices.
#[derive(Debug, Clone)]
pub struct ChiSquareOracle {
    columns: Vec<StateColumn>,
    rows: usize,
    config: ChiSquareConfig,
}

impl ChiSquareOracle {
    pub fn from_container<R>(
        container: &VariableContainer<R>,
        config: ChiSquareConfig,
    ) -> Result<Self, LearnError> {
        let config = config.validate()?;
        let mut columns = Vec::with_capacity(container.variable_count());

        for id in container.ids() {
            let (Some(name), Some(values)) = (container.name(id), container.values(id)) else {
                return Err(LearnError::Internal(format!("container lost variable {}", id)));
            };
            let (states, cardinality) = dense_states(values);
            columns.push(StateColumn {
                name: name.to_string(),
                states,
                cardinality,
            });
        }

        Ok(Self {
            columns,
            rows: container.len(),
            config,
        })
    }

    pub fn config(&self) -> &ChiSquareConfig {
        &self.config
    }

    /// Number of distinct states of `id`.
    pub fn cardinality(&self, id: VariableId) -> Option<usize> {
        self.columns.get(id.index()).map(|c| c.cardinality)
    }

    /// Runs the stratified test of `a ⊥ b | given`.
    ///
    /// Fails with [`OracleError::Degenerate`] when no stratum has at least
    /// two observed states of both `a` and `b`.
    pub fn test(
        &self,
        a: VariableId,
        b: VariableId,
        given: &[VariableId],
    ) -> Result<ChiSquareTest, OracleError> {
        let col_a = self.column(a)?;
        let col_b = self.column(b)?;
        let conditioning = given
            .iter()
            .map(|&id| self.column(id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut strata: BTreeMap<Vec<u32>, Stratum> = BTreeMap::new();
        for row in 0..self.rows {
            let key: Vec<u32> = conditioning.iter().map(|c| c.states[row]).collect();
            strata
                .entry(key)
                .or_default()
                .record(col_a.states[row], col_b.states[row]);
        }

        let mut statistic = 0.0;
        let mut degrees_of_freedom = 0;
        let mut contributing = 0;
        for stratum in strata.values() {
            if stratum.total < self.config.min_stratum_rows as u64 {
                continue;
            }
            if let Some((stat, df)) = stratum.pearson() {
                statistic += stat;
                degrees_of_freedom += df;
                contributing += 1;
            }
        }

        if degrees_of_freedom == 0 {
            return Err(OracleError::Degenerate(format!(
                "{} vs {} given {:?}: no stratum shows two states of each",
                col_a.name,
                col_b.name,
                conditioning.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
            )));
        }

        let p_value = chi_square_sf(statistic, degrees_of_freedom)
            .map_err(|e| OracleError::Numerical(e.to_string()))?;

        Ok(ChiSquareTest {
            statistic,
            degrees_of_freedom,
            p_value,
            strata: contributing,
        })
    }

    fn column(&self, id: VariableId) -> Result<&StateColumn, OracleError> {
        self.columns
            .get(id.index())
            .ok_or_else(|| OracleError::UnknownVariable(id.to_string()))
    }
}

impl IndependenceOracle<VariableId> for ChiSquareOracle {
    fn independent(
        &self,
        threshold: f64,
        a: &VariableId,
        b: &VariableId,
        given: &[VariableId],
    ) -> Result<bool, OracleError> {
        let test = self.test(*a, *b, given)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            a = %a,
            b = %b,
            given = ?given,
            statistic = test.statistic,
            df = test.degrees_of_freedom,
            p = test.p_value,
            "chi-square test"
        );

        Ok(test.p_value > threshold)
    }
}

/// Maps each distinct value to its rank among the distinct values.
fn dense_states(values: &[f64]) -> (Vec<u32>, usize) {
    // -0.0 and 0.0 are the same state.
    let normalize = |v: f64| (v + 0.0).to_bits();

    let mut distinct: Vec<f64> = values.iter().map(|&v| v + 0.0).collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();

    let index: FxHashMap<u64, u32> = distinct
        .iter()
        .enumerate()
        .map(|(i, &v)| (normalize(v), i as u32))
        .collect();
    let states = values
        .iter()
        .map(|&v| index.get(&normalize(v)).copied().unwrap_or_default())
        .collect();
    (states, distinct.len())
}

/// Counts of one stratum's `a × b` table. Only observed cells are stored,
/// so a stratum costs memory in its row count rather than in the product of
/// the two cardinalities.
#[derive(Debug, Default)]
struct Stratum {
    cells: FxHashMap<(u32, u32), u64>,
    row_sums: FxHashMap<u32, u64>,
    col_sums: FxHashMap<u32, u64>,
    total: u64,
}

impl Stratum {
    fn record(&mut self, a: u32, b: u32) {
        *self.cells.entry((a, b)).or_default() += 1;
        *self.row_sums.entry(a).or_default() += 1;
        *self.col_sums.entry(b).or_default() += 1;
        self.total += 1;
    }

    /// Pearson statistic and degrees of freedom over the non-empty rows and
    /// columns. `None` when fewer than two of either are non-empty.
    ///
    /// An unobserved cell contributes its expected count, so their total is
    /// `total` minus the expected counts of the observed cells.
    fn pearson(&self) -> Option<(f64, usize)> {
        let (rows, cols) = (self.row_sums.len(), self.col_sums.len());
        if rows < 2 || cols < 2 {
            return None;
        }

        let total = self.total as f64;
        let mut observed_terms = 0.0;
        let mut observed_expected = 0.0;
        for (&(r, c), &count) in &self.cells {
            let rs = self.row_sums.get(&r).copied().unwrap_or_default();
            let cs = self.col_sums.get(&c).copied().unwrap_or_default();
            let expected = rs as f64 * cs as f64 / total;
            let diff = count as f64 - expected;
            observed_terms += diff * diff / expected;
            observed_expected += expected;
        }
        let unobserved = (total - observed_expected).max(0.0);

        Some((observed_terms + unobserved, (rows - 1) * (cols - 1)))
    }
}
