use dendrite::prelude::*;

fn main() {
    let grid = Grid::quadrant([20.0, 20.0], [0.4, 0.4]);

    let mut simulation = Simulation::new(SimulationDescriptor {
        parameters: PhaseFieldParameters {
            alpha: 0.5,
            epsilon: 0.05,
            delta: 0.65,
            r0: 1.0,
            gamma_psi: std::f64::consts::FRAC_1_SQRT_2,
            gamma_u: 0.1,
            tolerance: 1e-6,
        },
        grid,
        save_settings: SaveSettings {
            path: "data/seed".into(),
            interval: 500,
            fields: vec![OutputField::Psi, OutputField::U],
        },
        tracking: vec![InterpolationMethod::CubicSpline],
    })
    .unwrap();

    println!(
        "\n-- General Simulation Info --\n\
        grid:    {} x {}\n\
        lambda:  {:<9.4}\n",
        grid.nx(),
        grid.ny(),
        simulation.parameters().lambda(),
    );

    let nsteps = 2_000;
    simulation.start(0.01, Termination::Steps(nsteps)).unwrap();
    simulation.save().unwrap();

    let bar = indicatif::ProgressBar::new(nsteps as u64);
    while simulation.next().unwrap() {
        assert!(simulation.stable(), "unstable at step {}", simulation.step());
        bar.set_position(simulation.step() as u64);
        if simulation.save_timestep() {
            simulation.save().unwrap();
        }
    }
    bar.finish();

    if let Some(tip) = simulation.tracker() {
        println!(
            "tip at x = {:.4}, v = {:.4e}, k1 = {:.4}, k2 = {:.4}",
            tip.position(),
            tip.velocity(),
            tip.k1(),
            tip.k2(),
        );
    }
}
