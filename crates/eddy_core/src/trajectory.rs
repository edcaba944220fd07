use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::model::TIME_VARIABLE;
use crate::traits::Scalar;

/// Column-labelled record of one integration run. Each row is a full state
/// snapshot in registration order; row 0 is the initial state, and the time
/// column advances by one step size per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory<T> {
    names: Vec<String>,
    rows: Vec<Vec<T>>,
}

impl<T: Scalar> Trajectory<T> {
    pub(crate) fn new(names: Vec<String>) -> Self {
        Self {
            names,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<T>) {
        debug_assert_eq!(row.len(), self.names.len());
        self.rows.push(row);
    }

    /// Column names, in the model's registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of recorded rows, the initial state included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &[T] {
        &self.rows[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// The final recorded state, if any row was recorded.
    pub fn last(&self) -> Option<&[T]> {
        self.rows.last().map(Vec::as_slice)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|taken| taken == name)
    }

    /// Extracts one column by name.
    pub fn column(&self, name: &str) -> Result<Vec<T>> {
        let Some(slot) = self.column_index(name) else {
            bail!("Trajectory has no column \"{name}\".");
        };
        Ok(self.rows.iter().map(|row| row[slot]).collect())
    }

    /// The time column.
    pub fn times(&self) -> Result<Vec<T>> {
        self.column(TIME_VARIABLE)
    }

    /// Pairs two columns row by row, e.g. time against one variable for a
    /// series plot, or the two plane variables for a phase track.
    pub fn series(&self, x_name: &str, y_name: &str) -> Result<Vec<(T, T)>> {
        let Some(x_slot) = self.column_index(x_name) else {
            bail!("Trajectory has no column \"{x_name}\".");
        };
        let Some(y_slot) = self.column_index(y_name) else {
            bail!("Trajectory has no column \"{y_name}\".");
        };
        Ok(self
            .rows
            .iter()
            .map(|row| (row[x_slot], row[y_slot]))
            .collect())
    }
}
