//! Lotka-Volterra predator-prey run: integrate the model, render a
//! time-series panel and a phase portrait, and export the trajectory to CSV.
//!
//! ```sh
//! cargo run --example predator_prey
//! ```

use std::error::Error;

use eddy_core::model::Params;
use eddy_core::phase::{CurveOrientation, PlanarModel};
use eddy_plot::{export_trajectory_csv, plot_phase_portrait, plot_series, PlotConfig};

fn main() -> Result<(), Box<dyn Error>> {
    let mut model = PlanarModel::new("prey", "predator")?;
    model.add_x_variable(Params::from([("alpha", 1.1), ("beta", 0.4)]), |s, p| {
        let prey = s.get("prey")?;
        Ok(p.get("alpha")? * prey - p.get("beta")? * prey * s.get("predator")?)
    });
    model.add_y_variable(Params::from([("delta", 0.1), ("gamma", 0.4)]), |s, p| {
        let predator = s.get("predator")?;
        Ok(p.get("delta")? * s.get("prey")? * predator - p.get("gamma")? * predator)
    });

    // Prey growth stalls along prey = 0 and predator = alpha / beta; the
    // predator population holds along predator = 0 and prey = gamma / delta.
    model.add_nullcline("prey", CurveOrientation::XOfY, Params::new(), |_, _| Ok(0.0))?;
    model.add_nullcline(
        "prey",
        CurveOrientation::YOfX,
        Params::from([("alpha", 1.1), ("beta", 0.4)]),
        |_, p| Ok(p.get("alpha")? / p.get("beta")?),
    )?;
    model.add_nullcline("predator", CurveOrientation::YOfX, Params::new(), |_, _| {
        Ok(0.0)
    })?;
    model.add_nullcline(
        "predator",
        CurveOrientation::XOfY,
        Params::from([("delta", 0.1), ("gamma", 0.4)]),
        |_, p| Ok(p.get("gamma")? / p.get("delta")?),
    )?;

    let trajectory = model.integrate_clamped(&[("prey", 10.0), ("predator", 10.0)], 50.0, 0.001)?;

    let mut series_config = PlotConfig::default();
    series_config.title = "Predator-prey populations".to_string();
    series_config.ylabel = "Population".to_string();
    plot_series(
        &trajectory,
        &["prey", "predator"],
        "predator_prey_series.png",
        Some(&series_config),
    )?;

    plot_phase_portrait(
        &model,
        (0.0, 30.0),
        (0.0, 12.0),
        0.0,
        Some(&trajectory),
        "predator_prey_portrait.png",
        None,
    )?;

    export_trajectory_csv(&trajectory, "predator_prey.csv", None)?;

    println!(
        "Wrote predator_prey_series.png, predator_prey_portrait.png, predator_prey.csv ({} steps)",
        trajectory.len()
    );
    Ok(())
}
