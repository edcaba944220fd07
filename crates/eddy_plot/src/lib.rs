//! Rendering and data export for Eddy trajectories.
//!
//! The core crate integrates models and hands back [`Trajectory`] and
//! [`FieldGrid`] values; this crate turns those into files. Time-series
//! panels and phase portraits render through `plotters` to PNG or SVG, and
//! trajectories export to CSV for spreadsheet or pandas work.
//!
//! [`Trajectory`]: eddy_core::trajectory::Trajectory
//! [`FieldGrid`]: eddy_core::phase::FieldGrid

pub mod config;
pub mod csv;
pub mod portrait;
pub mod series;

pub use config::PlotConfig;
pub use csv::{export_trajectory_csv, write_trajectory_csv, CsvConfig};
pub use portrait::{plot_phase_portrait, plot_phase_track};
pub use series::plot_series;
