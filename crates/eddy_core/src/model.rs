use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::traits::Scalar;

/// Name of the time variable every model carries. Its derivative is the
/// constant 1, so time advances at unit rate under integration unless the
/// caller overrides it.
pub const TIME_VARIABLE: &str = "t";

/// Plane-axis assignment for variables of planar models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// A key-value bag of scalar parameters handed unmodified to one variable's
/// derivative function on every call. The required keys are documented by
/// whoever writes the function; looking up an absent key is a
/// [`ModelError::MissingParameter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params<T>(HashMap<String, T>);

impl<T: Scalar> Params<T> {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Inserts or replaces one parameter value.
    pub fn insert(&mut self, name: &str, value: T) {
        self.0.insert(name.to_string(), value);
    }

    /// Reads one parameter value.
    pub fn get(&self, name: &str) -> Result<T, ModelError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::MissingParameter(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for Params<T> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<T: Scalar, const N: usize> From<[(&str, T); N]> for Params<T> {
    fn from(pairs: [(&str, T); N]) -> Self {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.insert(name, value);
        }
        params
    }
}

/// One instant of model state, as derivative functions see it: a read-only
/// name-to-value view. Backed either by a full dense row (integration) or by
/// a sparse probe such as `{t, x, y}` (field sampling); reading a name the
/// snapshot does not carry fails with [`ModelError::MissingVariable`].
#[derive(Clone, Copy)]
pub struct Snapshot<'a, T> {
    index: &'a HashMap<String, usize>,
    values: SnapshotValues<'a, T>,
}

#[derive(Clone, Copy)]
enum SnapshotValues<'a, T> {
    Dense(&'a [T]),
    Sparse(&'a [(usize, T)]),
}

impl<'a, T: Scalar> Snapshot<'a, T> {
    pub(crate) fn dense(index: &'a HashMap<String, usize>, values: &'a [T]) -> Self {
        Self {
            index,
            values: SnapshotValues::Dense(values),
        }
    }

    pub(crate) fn sparse(index: &'a HashMap<String, usize>, values: &'a [(usize, T)]) -> Self {
        Self {
            index,
            values: SnapshotValues::Sparse(values),
        }
    }

    /// Reads one variable's current value.
    pub fn get(&self, name: &str) -> Result<T, ModelError> {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => return Err(ModelError::MissingVariable(name.to_string())),
        };
        match self.values {
            SnapshotValues::Dense(values) => values
                .get(slot)
                .copied()
                .ok_or_else(|| ModelError::MissingVariable(name.to_string())),
            SnapshotValues::Sparse(pairs) => pairs
                .iter()
                .find(|(taken, _)| *taken == slot)
                .map(|(_, value)| *value)
                .ok_or_else(|| ModelError::MissingVariable(name.to_string())),
        }
    }
}

/// Signature of a derivative function: the full state snapshot plus the
/// variable's own parameter bag in, the instantaneous rate of change out.
pub type RateFn<T> = dyn Fn(&Snapshot<'_, T>, &Params<T>) -> Result<T, ModelError>;

struct Variable<T> {
    name: String,
    params: Params<T>,
    axis: Option<Axis>,
    rate: Box<RateFn<T>>,
}

/// A continuous-time dynamical model: named variables, each owning a
/// derivative function and a parameter bag. Time is itself a variable,
/// pre-registered as [`TIME_VARIABLE`] with the constant-1 derivative, so
/// every snapshot and trajectory carries it like any other column.
pub struct DynamicModel<T: Scalar = f64> {
    variables: Vec<Variable<T>>,
    index: HashMap<String, usize>,
}

impl<T: Scalar> DynamicModel<T> {
    /// Creates a model containing only the time variable.
    pub fn new() -> Self {
        let mut model = Self {
            variables: Vec::new(),
            index: HashMap::new(),
        };
        model.add_variable(TIME_VARIABLE, Params::new(), |_, _| Ok(T::one()));
        model
    }

    /// Registers a variable. Re-registering an existing name replaces its
    /// derivative function, parameters, and axis tag in place, keeping the
    /// original column position.
    pub fn add_variable<F>(&mut self, name: &str, params: Params<T>, rate: F)
    where
        F: Fn(&Snapshot<'_, T>, &Params<T>) -> Result<T, ModelError> + 'static,
    {
        self.insert_variable(name, None, params, Box::new(rate));
    }

    /// Registers a variable carrying a plane-axis tag, for planar models.
    pub fn add_axis_variable<F>(&mut self, name: &str, axis: Axis, params: Params<T>, rate: F)
    where
        F: Fn(&Snapshot<'_, T>, &Params<T>) -> Result<T, ModelError> + 'static,
    {
        self.insert_variable(name, Some(axis), params, Box::new(rate));
    }

    fn insert_variable(
        &mut self,
        name: &str,
        axis: Option<Axis>,
        params: Params<T>,
        rate: Box<RateFn<T>>,
    ) {
        let variable = Variable {
            name: name.to_string(),
            params,
            axis,
            rate,
        };
        match self.index.get(name) {
            Some(&slot) => self.variables[slot] = variable,
            None => {
                self.index.insert(name.to_string(), self.variables.len());
                self.variables.push(variable);
            }
        }
    }

    /// Number of registered variables, time included.
    pub fn dimension(&self) -> usize {
        self.variables.len()
    }

    /// Registered names in registration order; [`TIME_VARIABLE`] is first.
    pub fn variable_names(&self) -> Vec<String> {
        self.variables
            .iter()
            .map(|variable| variable.name.clone())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The plane-axis tag of a variable, if it carries one.
    pub fn axis_of(&self, name: &str) -> Option<Axis> {
        self.index
            .get(name)
            .and_then(|&slot| self.variables[slot].axis)
    }

    /// Evaluates every registered derivative function against one snapshot,
    /// returning name/rate pairs in registration order. The returned name
    /// set always equals the registered set. Pure: identical snapshots give
    /// identical results, and nothing in the model is mutated.
    ///
    /// The snapshot is supplied as name/value pairs; names that are not
    /// registered are rejected, while omitting a registered name only fails
    /// if some derivative function actually reads it.
    pub fn rates(&self, snapshot: &[(&str, T)]) -> Result<Vec<(String, T)>> {
        let sparse = self.sparse_values(snapshot)?;
        let mut out = vec![T::zero(); self.dimension()];
        self.rates_into(&Snapshot::sparse(&self.index, &sparse), &mut out)?;
        Ok(self
            .variables
            .iter()
            .zip(out)
            .map(|(variable, rate)| (variable.name.clone(), rate))
            .collect())
    }

    /// Maps caller-facing name/value pairs onto column slots, rejecting
    /// names that are not registered. Later duplicates win, as in a map
    /// literal, because rows are filled in order.
    pub(crate) fn sparse_values(&self, pairs: &[(&str, T)]) -> Result<Vec<(usize, T)>> {
        let mut values = Vec::with_capacity(pairs.len());
        for (name, value) in pairs {
            match self.index.get(*name) {
                Some(&slot) => values.push((slot, *value)),
                None => bail!("Unknown variable \"{name}\" in the supplied state."),
            }
        }
        Ok(values)
    }

    /// Writes every variable's rate into `out`, aligned with registration
    /// order. Lookup failures inside derivative functions propagate.
    pub(crate) fn rates_into(
        &self,
        snapshot: &Snapshot<'_, T>,
        out: &mut [T],
    ) -> Result<(), ModelError> {
        for (slot, variable) in self.variables.iter().enumerate() {
            out[slot] = (variable.rate)(snapshot, &variable.params)?;
        }
        Ok(())
    }

    pub(crate) fn column_index(&self) -> &HashMap<String, usize> {
        &self.index
    }

    pub(crate) fn slot_name(&self, slot: usize) -> &str {
        &self.variables[slot].name
    }
}

impl<T: Scalar> Default for DynamicModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, DynamicModel, Params, TIME_VARIABLE};
    use crate::error::ModelError;

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    fn oscillator() -> DynamicModel<f64> {
        let mut model = DynamicModel::new();
        model.add_variable("x", Params::from([("a", 1.0)]), |s, p| {
            Ok(p.get("a")? * s.get("y")?)
        });
        model.add_variable("y", Params::from([("b", 100.0)]), |s, p| {
            Ok(-(p.get("b")? * s.get("x")?))
        });
        model
    }

    #[test]
    fn rates_cover_every_registered_variable_in_registration_order() {
        let model = oscillator();
        let rates = model
            .rates(&[("t", 0.0), ("x", 1.0), ("y", 2.0)])
            .expect("rates should evaluate");
        let names: Vec<&str> = rates.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec![TIME_VARIABLE, "x", "y"]);
    }

    #[test]
    fn time_rate_is_always_one() {
        let model = oscillator();
        for snapshot in [
            [("t", 0.0), ("x", 1.0), ("y", 2.0)],
            [("t", -7.5), ("x", 0.0), ("y", 0.0)],
            [("t", 1e9), ("x", -3.0), ("y", 42.0)],
        ] {
            let rates = model.rates(&snapshot).expect("rates should evaluate");
            let (name, rate) = &rates[0];
            assert_eq!(name, TIME_VARIABLE);
            assert_eq!(*rate, 1.0);
        }
    }

    #[test]
    fn rates_match_the_registered_functions() {
        let model = oscillator();
        let rates = model
            .rates(&[("t", 0.0), ("x", 1.0), ("y", 2.0)])
            .expect("rates should evaluate");
        assert_eq!(rates[1], ("x".to_string(), 2.0));
        assert_eq!(rates[2], ("y".to_string(), -100.0));
    }

    #[test]
    fn rates_are_idempotent() {
        let model = oscillator();
        let snapshot = [("t", 0.25), ("x", 0.5), ("y", -0.5)];
        let first = model.rates(&snapshot).expect("rates should evaluate");
        let second = model.rates(&snapshot).expect("rates should evaluate");
        assert_eq!(first, second);
    }

    #[test]
    fn reregistration_replaces_the_variable_in_place() {
        let mut model = oscillator();
        model.add_variable("x", Params::new(), |_, _| Ok(-1.0));
        assert_eq!(model.variable_names(), vec!["t", "x", "y"]);
        let rates = model
            .rates(&[("t", 0.0), ("x", 1.0), ("y", 2.0)])
            .expect("rates should evaluate");
        assert_eq!(rates[1], ("x".to_string(), -1.0));
    }

    #[test]
    fn unknown_snapshot_name_is_rejected() {
        let model = oscillator();
        assert_err_contains(
            model.rates(&[("t", 0.0), ("x", 1.0), ("y", 2.0), ("bogus", 3.0)]),
            "Unknown variable \"bogus\"",
        );
    }

    #[test]
    fn derivative_reading_an_omitted_variable_fails() {
        let mut model = oscillator();
        model.add_variable("w", Params::new(), |s, _| s.get("x"));
        assert_err_contains(
            model.rates(&[("t", 0.0), ("y", 2.0), ("w", 0.0)]),
            "Variable \"x\" is not present",
        );
    }

    #[test]
    fn params_lookup_failure_names_the_key() {
        let params: Params<f64> = Params::from([("a", 1.0)]);
        assert_eq!(
            params.get("zeta"),
            Err(ModelError::MissingParameter("zeta".to_string()))
        );
    }

    #[test]
    fn axis_tags_are_recorded() {
        let mut model: DynamicModel<f64> = DynamicModel::new();
        model.add_axis_variable("u", Axis::X, Params::new(), |_, _| Ok(0.0));
        model.add_variable("v", Params::new(), |_, _| Ok(0.0));
        assert_eq!(model.axis_of("u"), Some(Axis::X));
        assert_eq!(model.axis_of("v"), None);
        assert_eq!(model.axis_of(TIME_VARIABLE), None);
    }
}
