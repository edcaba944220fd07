use std::collections::HashMap;

use anyhow::{bail, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{Axis, DynamicModel, Params, Snapshot, TIME_VARIABLE};
use crate::trajectory::Trajectory;

/// Which way a nullcline branch is written: as y in terms of x, or as x in
/// terms of y. Branches that fold over in one orientation are supplied as
/// one or more curves in the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveOrientation {
    YOfX,
    XOfY,
}

/// Signature of a nullcline curve: the free plane coordinate and the curve's
/// parameter bag in, the dependent coordinate out.
pub type CurveFn = dyn Fn(f64, &Params<f64>) -> Result<f64, ModelError>;

struct NullclineEntry {
    orientation: CurveOrientation,
    params: Params<f64>,
    curve: Box<CurveFn>,
}

/// One nullcline branch sampled into plane points, ready to draw. Points are
/// already in (x, y) order whichever way the curve was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledNullcline {
    pub variable: String,
    pub orientation: CurveOrientation,
    pub points: Vec<(f64, f64)>,
}

/// The direction field of a planar model sampled on a rectangular grid. All
/// four matrices are nx-by-ny: entry `(i, j)` holds the field at the i-th x
/// sample and j-th y sample, so `x` repeats its value along each row and `y`
/// along each column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub dx: DMatrix<f64>,
    pub dy: DMatrix<f64>,
}

impl FieldGrid {
    pub fn nx(&self) -> usize {
        self.x.nrows()
    }

    pub fn ny(&self) -> usize {
        self.x.ncols()
    }
}

/// A dynamical model living in a plane: two designated variables carry the
/// x and y axes, and each may own nullcline curves for phase-portrait
/// overlays. Everything else (extra variables, integration) passes through
/// to the wrapped [`DynamicModel`].
pub struct PlanarModel {
    x_name: String,
    y_name: String,
    model: DynamicModel<f64>,
    nullclines: HashMap<String, Vec<NullclineEntry>>,
}

impl PlanarModel {
    /// Creates a planar model whose axes are the two named variables. The
    /// variables still need derivative functions, registered through
    /// [`add_x_variable`](Self::add_x_variable) and
    /// [`add_y_variable`](Self::add_y_variable).
    pub fn new(x_name: &str, y_name: &str) -> Result<Self> {
        if x_name == TIME_VARIABLE || y_name == TIME_VARIABLE {
            bail!("Plane axes cannot use the time variable \"t\".");
        }
        if x_name == y_name {
            bail!("Plane axes need two distinct variables, got \"{x_name}\" twice.");
        }
        Ok(Self {
            x_name: x_name.to_string(),
            y_name: y_name.to_string(),
            model: DynamicModel::new(),
            nullclines: HashMap::new(),
        })
    }

    pub fn x_name(&self) -> &str {
        &self.x_name
    }

    pub fn y_name(&self) -> &str {
        &self.y_name
    }

    /// Registers the horizontal-axis variable's derivative and parameters.
    pub fn add_x_variable<F>(&mut self, params: Params<f64>, rate: F)
    where
        F: Fn(&Snapshot<'_, f64>, &Params<f64>) -> Result<f64, ModelError> + 'static,
    {
        let name = self.x_name.clone();
        self.model.add_axis_variable(&name, Axis::X, params, rate);
    }

    /// Registers the vertical-axis variable's derivative and parameters.
    pub fn add_y_variable<F>(&mut self, params: Params<f64>, rate: F)
    where
        F: Fn(&Snapshot<'_, f64>, &Params<f64>) -> Result<f64, ModelError> + 'static,
    {
        let name = self.y_name.clone();
        self.model.add_axis_variable(&name, Axis::Y, params, rate);
    }

    pub fn model(&self) -> &DynamicModel<f64> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut DynamicModel<f64> {
        &mut self.model
    }

    pub fn integrate(
        &self,
        initial: &[(&str, f64)],
        t_final: f64,
        step_size: f64,
    ) -> Result<Trajectory<f64>> {
        self.model.integrate(initial, t_final, step_size)
    }

    pub fn integrate_clamped(
        &self,
        initial: &[(&str, f64)],
        t_final: f64,
        step_size: f64,
    ) -> Result<Trajectory<f64>> {
        self.model.integrate_clamped(initial, t_final, step_size)
    }

    /// Attaches one nullcline branch to a plane variable. Branches accumulate
    /// in the order they are added.
    pub fn add_nullcline<F>(
        &mut self,
        variable: &str,
        orientation: CurveOrientation,
        params: Params<f64>,
        curve: F,
    ) -> Result<()>
    where
        F: Fn(f64, &Params<f64>) -> Result<f64, ModelError> + 'static,
    {
        if variable != self.x_name && variable != self.y_name {
            bail!("Nullclines attach to the plane variables, not \"{variable}\".");
        }
        self.nullclines
            .entry(variable.to_string())
            .or_default()
            .push(NullclineEntry {
                orientation,
                params,
                curve: Box::new(curve),
            });
        Ok(())
    }

    pub fn has_nullclines(&self, variable: &str) -> bool {
        self.nullclines
            .get(variable)
            .is_some_and(|entries| !entries.is_empty())
    }

    /// Samples every nullcline branch of one plane variable at `samples`
    /// evenly spaced points of its free coordinate, in the order the branches
    /// were added. Each branch's orientation decides which range it sweeps:
    /// y-of-x branches run over `x_range`, x-of-y branches over `y_range`.
    /// Points come back in (x, y) order either way.
    pub fn sample_nullclines(
        &self,
        variable: &str,
        x_range: (f64, f64),
        y_range: (f64, f64),
        samples: usize,
    ) -> Result<Vec<SampledNullcline>> {
        if samples < 2 {
            bail!("Nullcline sampling needs at least 2 samples.");
        }
        validate_axis_range(x_range)?;
        validate_axis_range(y_range)?;
        let Some(entries) = self.nullclines.get(variable) else {
            bail!("Variable \"{variable}\" has no registered nullclines.");
        };

        let mut sampled = Vec::with_capacity(entries.len());
        for entry in entries {
            let free = match entry.orientation {
                CurveOrientation::YOfX => linspace(x_range, samples),
                CurveOrientation::XOfY => linspace(y_range, samples),
            };
            let mut points = Vec::with_capacity(samples);
            for &u in &free {
                let v = (entry.curve)(u, &entry.params)?;
                points.push(match entry.orientation {
                    CurveOrientation::YOfX => (u, v),
                    CurveOrientation::XOfY => (v, u),
                });
            }
            sampled.push(SampledNullcline {
                variable: variable.to_string(),
                orientation: entry.orientation,
                points,
            });
        }
        Ok(sampled)
    }

    /// Samples the direction field on an nx-by-ny grid at one instant. Each
    /// grid point is probed with only time and the two plane variables set,
    /// so derivatives reading anything else fail with a lookup error.
    pub fn sample_field(
        &self,
        nx: usize,
        ny: usize,
        x_range: (f64, f64),
        y_range: (f64, f64),
        t: f64,
    ) -> Result<FieldGrid> {
        if nx < 2 || ny < 2 {
            bail!("Each axis needs at least 2 samples.");
        }
        validate_axis_range(x_range)?;
        validate_axis_range(y_range)?;
        if !t.is_finite() {
            bail!("Sampling time t must be finite.");
        }
        let (x_slot, y_slot) = self.plane_slots()?;

        let xs = linspace(x_range, nx);
        let ys = linspace(y_range, ny);

        let index = self.model.column_index();
        let mut rates = vec![0.0; self.model.dimension()];
        let mut dx = DMatrix::zeros(nx, ny);
        let mut dy = DMatrix::zeros(nx, ny);
        for (i, &x) in xs.iter().enumerate() {
            for (j, &y) in ys.iter().enumerate() {
                // Time is registered first, so it occupies column 0.
                let probe = [(0, t), (x_slot, x), (y_slot, y)];
                self.model
                    .rates_into(&Snapshot::sparse(index, &probe), &mut rates)?;
                dx[(i, j)] = rates[x_slot];
                dy[(i, j)] = rates[y_slot];
            }
        }

        let x = DMatrix::from_fn(nx, ny, |i, _| xs[i]);
        let y = DMatrix::from_fn(nx, ny, |_, j| ys[j]);
        Ok(FieldGrid { x, y, dx, dy })
    }

    fn plane_slots(&self) -> Result<(usize, usize)> {
        let index = self.model.column_index();
        let Some(&x_slot) = index.get(&self.x_name) else {
            bail!("Plane variable \"{}\" is not registered.", self.x_name);
        };
        let Some(&y_slot) = index.get(&self.y_name) else {
            bail!("Plane variable \"{}\" is not registered.", self.y_name);
        };
        Ok((x_slot, y_slot))
    }
}

fn validate_axis_range(range: (f64, f64)) -> Result<()> {
    let (min, max) = range;
    if !(min.is_finite() && max.is_finite()) || max <= min {
        bail!("Each axis range must be finite with max > min.");
    }
    Ok(())
}

fn linspace(range: (f64, f64), samples: usize) -> Vec<f64> {
    let (min, max) = range;
    let step = (max - min) / (samples - 1) as f64;
    (0..samples).map(|i| min + step * i as f64).collect()
}
