//! The `eddy_core` crate is the simulation engine for Eddy phase-plane models.
//! It defines continuous-time dynamical systems as named variables with
//! user-supplied derivative functions, evaluates the resulting derivative
//! field, and integrates it with fixed-step explicit Euler.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction).
//! - **Model**: the variable registry and derivative evaluator; the time
//!   variable `t` is built in with a constant rate of 1.
//! - **Integrate**: `integrate` / `integrate_clamped` Euler runs producing
//!   [`trajectory::Trajectory`] tables.
//! - **Phase**: planar (2D) models with nullcline registration/sampling and
//!   derivative-field grids for vector-field rendering.

pub mod error;
pub mod integrate;
pub mod model;
pub mod phase;
pub mod traits;
pub mod trajectory;
