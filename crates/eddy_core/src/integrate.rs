use anyhow::{bail, Result};

use crate::model::{DynamicModel, Snapshot, TIME_VARIABLE};
use crate::traits::Scalar;
use crate::trajectory::Trajectory;

/// Magnitude below which the clamping integrator snaps a state component to
/// exact zero after each step. Components at or above this magnitude pass
/// through untouched, whatever their sign.
pub const NOISE_FLOOR: f64 = 1e-14;

impl<T: Scalar> DynamicModel<T> {
    /// Integrates the model with the explicit Euler scheme: every component
    /// advances by its rate times `step_size`, all rates taken from the same
    /// snapshot. Steps are recorded until the time variable reaches
    /// `t_final`, so the final row's time lands in
    /// `[t_final, t_final + step_size)`. The loop ends only when time gets
    /// there, so a re-registered [`TIME_VARIABLE`] must keep a positive rate.
    ///
    /// `initial` assigns a starting value to every registered variable;
    /// [`TIME_VARIABLE`] alone may be omitted and then starts at zero.
    pub fn integrate(
        &self,
        initial: &[(&str, T)],
        t_final: T,
        step_size: T,
    ) -> Result<Trajectory<T>> {
        self.euler_run(initial, t_final, step_size, false)
    }

    /// Same scheme as [`integrate`](Self::integrate), but after each step any
    /// component whose magnitude falls below [`NOISE_FLOOR`] is snapped to
    /// exact zero. Keeps decaying variables from lingering at denormal
    /// magnitudes instead of settling. The initial row is recorded as given,
    /// never clamped.
    pub fn integrate_clamped(
        &self,
        initial: &[(&str, T)],
        t_final: T,
        step_size: T,
    ) -> Result<Trajectory<T>> {
        self.euler_run(initial, t_final, step_size, true)
    }

    fn euler_run(
        &self,
        initial: &[(&str, T)],
        t_final: T,
        step_size: T,
        clamp: bool,
    ) -> Result<Trajectory<T>> {
        if step_size <= T::zero() {
            bail!("Step size dt must be positive.");
        }
        if !t_final.is_finite() {
            bail!("Final time t_final must be finite.");
        }
        let noise_floor = T::from_f64(NOISE_FLOOR).unwrap();
        if clamp && step_size <= noise_floor {
            // A clamped step this small would zero the time column and never
            // reach t_final.
            bail!("Step size dt must exceed the clamping noise floor 1e-14.");
        }

        let mut current = self.initial_row(initial)?;
        let mut rates = vec![T::zero(); self.dimension()];
        let mut trajectory = Trajectory::new(self.variable_names());
        trajectory.push_row(current.clone());

        // Time is registered first, so it occupies column 0.
        while current[0] < t_final {
            self.rates_into(&Snapshot::dense(self.column_index(), &current), &mut rates)?;
            for (value, rate) in current.iter_mut().zip(&rates) {
                *value = *value + *rate * step_size;
            }
            if clamp {
                for value in current.iter_mut() {
                    if value.abs() < noise_floor {
                        *value = T::zero();
                    }
                }
            }
            trajectory.push_row(current.clone());
        }
        Ok(trajectory)
    }

    /// Builds the dense starting row from caller pairs. Every registered
    /// variable except time must receive a value; time defaults to zero.
    fn initial_row(&self, initial: &[(&str, T)]) -> Result<Vec<T>> {
        let sparse = self.sparse_values(initial)?;
        let mut row = vec![T::zero(); self.dimension()];
        let mut supplied = vec![false; self.dimension()];
        for (slot, value) in sparse {
            row[slot] = value;
            supplied[slot] = true;
        }
        for (slot, supplied) in supplied.iter().enumerate() {
            if !supplied && self.slot_name(slot) != TIME_VARIABLE {
                bail!(
                    "Initial state is missing variable \"{}\".",
                    self.slot_name(slot)
                );
            }
        }
        Ok(row)
    }
}
