//! Variables over a table of rows.
//!
//! A [`Variable`] is a named extractor `Fn(&R) -> Option<f64>` plus an optional
//! class count. A [`VariableContainer`] binds variables to one immutable table,
//! evaluates every extractor once, and quantizes classed variables into
//! discrete states.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::engine::errors::LearnError;

/// Stable identity of a variable within its container; the vertex type used
/// when learning from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableId(pub u32);

impl VariableId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

type Extractor<R> = Arc<dyn Fn(&R) -> Option<f64> + Send + Sync>;

/// A column definition: how to read one value out of a row.
///
/// `None` from the extractor means the row has no usable value and fails
/// container construction.
pub struct Variable<R> {
    name: Option<String>,
    classes: Option<usize>,
    extractor: Extractor<R>,
}

impl<R> Variable<R> {
    /// An unnamed variable. The container names it `unnamed_variable{i}`.
    pub fn new<F>(extractor: F) -> Self
    where
        F: Fn(&R) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            name: None,
            classes: None,
            extractor: Arc::new(extractor),
        }
    }

    /// A named variable. Runs of whitespace in `name` become `_`.
    pub fn named<F>(name: &str, extractor: F) -> Self
    where
        F: Fn(&R) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            name: Some(sanitize_name(name)),
            ..Self::new(extractor)
        }
    }

    /// A named two-state variable; `true` reads as 1 and `false` as 0.
    pub fn indicator<F>(name: &str, extractor: F) -> Self
    where
        F: Fn(&R) -> Option<bool> + Send + Sync + 'static,
    {
        Self::named(name, move |row| extractor(row).map(|b| if b { 1.0 } else { 0.0 }))
    }

    /// Quantize into `classes` evenly spaced intervals.
    pub fn with_classes(mut self, classes: usize) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn classes(&self) -> Option<usize> {
        self.classes
    }

    /// Raw value of this variable for `row`.
    pub fn extract(&self, row: &R) -> Option<f64> {
        (self.extractor)(row)
    }
}

impl<R> Clone for Variable<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            classes: self.classes,
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<R> fmt::Debug for Variable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("classes", &self.classes)
            .finish_non_exhaustive()
    }
}

fn sanitize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// `classes` evenly spaced boundaries from `min` to `max` inclusive.
///
/// The last boundary is exactly `max`, so every observed value falls inside.
pub fn class_boundaries(min: f64, max: f64, classes: usize) -> Vec<f64> {
    if classes == 0 {
        return Vec::new();
    }
    if classes == 1 {
        return vec![max];
    }
    let step = (max - min) / (classes - 1) as f64;
    let mut out: Vec<f64> = (0..classes).map(|k| min + k as f64 * step).collect();
    out[classes - 1] = max;
    out
}

/// Index of the first boundary `>= value`, or `-1` when `value` exceeds
/// them all.
pub fn class_of(value: f64, boundaries: &[f64]) -> i64 {
    boundaries
        .iter()
        .position(|&b| value <= b)
        .map_or(-1, |i| i as i64)
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    intervals: Option<Vec<f64>>,
    raw: Vec<f64>,
    /// Raw values, or class indices for classed variables.
    values: Vec<f64>,
}

/// Variables bound to one immutable table.
pub struct VariableContainer<R> {
    table: Arc<[R]>,
    variables: Vec<Variable<R>>,
    columns: Vec<Column>,
    by_name: FxHashMap<String, VariableId>,
}

impl<R> VariableContainer<R> {
    /// Evaluates every variable on every row of `table`.
    ///
    /// Fails with [`LearnError::Input`] for an empty table, an extractor
    /// failure, a non-finite value, a class count below 2, or two variables
    /// with the same name.
    pub fn new(table: impl Into<Arc<[R]>>, variables: Vec<Variable<R>>) -> Result<Self, LearnError> {
        let table = table.into();
        if table.is_empty() {
            return Err(LearnError::Input("variable table has no rows".into()));
        }

        let mut unnamed = 0usize;
        let mut columns = Vec::with_capacity(variables.len());
        let mut by_name = FxHashMap::default();

        for (index, variable) in variables.iter().enumerate() {
            let name = match variable.name() {
                Some(name) => name.to_string(),
                None => {
                    unnamed += 1;
                    format!("unnamed_variable{}", unnamed)
                }
            };

            let id = VariableId(u32::try_from(index).map_err(|_| {
                LearnError::Input(format!("too many variables ({})", variables.len()))
            })?);
            if by_name.insert(name.clone(), id).is_some() {
                return Err(LearnError::Input(format!("duplicate variable name '{}'", name)));
            }

            let mut raw = Vec::with_capacity(table.len());
            for (row_index, row) in table.iter().enumerate() {
                let value = variable.extract(row).ok_or_else(|| {
                    LearnError::Input(format!("variable '{}': no value on row {}", name, row_index))
                })?;
                if !value.is_finite() {
                    return Err(LearnError::Input(format!(
                        "variable '{}': non-finite value {} on row {}",
                        name, value, row_index
                    )));
                }
                raw.push(value);
            }

            let intervals = match variable.classes() {
                None => None,
                Some(k) if k < 2 => {
                    return Err(LearnError::Input(format!(
                        "variable '{}': class count must be at least 2, got {}",
                        name, k
                    )));
                }
                Some(k) => {
                    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    Some(class_boundaries(min, max, k))
                }
            };

            let values = match &intervals {
                Some(bounds) => raw.iter().map(|&v| class_of(v, bounds) as f64).collect(),
                None => raw.clone(),
            };

            columns.push(Column {
                name,
                intervals,
                raw,
                values,
            });
        }

        Ok(Self {
            table,
            variables,
            columns,
            by_name,
        })
    }

    pub fn table(&self) -> &[R] {
        &self.table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn variable_count(&self) -> usize {
        self.columns.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        (0..self.columns.len() as u32).map(VariableId)
    }

    pub fn variables(&self) -> &[Variable<R>] {
        &self.variables
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable<R>> {
        self.variables.get(id.index())
    }

    /// Assigned name (after sanitizing and defaulting).
    pub fn name(&self, id: VariableId) -> Option<&str> {
        self.columns.get(id.index()).map(|c| c.name.as_str())
    }

    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.by_name.get(name).copied()
    }

    /// Quantization boundaries of a classed variable.
    pub fn intervals(&self, id: VariableId) -> Option<&[f64]> {
        self.columns.get(id.index())?.intervals.as_deref()
    }

    /// Value of `id` on `row`: the class index for classed variables,
    /// otherwise the raw value.
    pub fn value_at(&self, id: VariableId, row: usize) -> Option<f64> {
        self.columns.get(id.index())?.values.get(row).copied()
    }

    /// Every value of `id`, in row order. See [`value_at`](Self::value_at).
    pub fn values(&self, id: VariableId) -> Option<&[f64]> {
        self.columns.get(id.index()).map(|c| c.values.as_slice())
    }

    /// Unquantized values of `id`.
    pub fn raw_values(&self, id: VariableId) -> Option<&[f64]> {
        self.columns.get(id.index()).map(|c| c.raw.as_slice())
    }

    /// Name -> value for every variable on one row.
    pub fn learning_row(&self, row: usize) -> Option<BTreeMap<&str, f64>> {
        self.columns
            .iter()
            .map(|c| c.values.get(row).map(|&v| (c.name.as_str(), v)))
            .collect()
    }
}

impl<R> fmt::Debug for VariableContainer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableContainer")
            .field("rows", &self.table.len())
            .field("variables", &self.variables)
            .finish()
    }
}
