use approx::assert_abs_diff_eq;

use dendrite::prelude::*;

mod common;

#[test]
fn circular_seed_has_unit_curvature() {
    let dir = tempfile::tempdir().unwrap();
    let grid = Grid::quadrant([4.0, 4.0], [0.1, 0.1]);
    let mut sim = common::simulation(dir.path(), grid, 0.0, 0, Vec::new(), Vec::new());
    sim.start(1e-3, Termination::Unbounded).unwrap();

    for method in [InterpolationMethod::CubicSpline, InterpolationMethod::Polynomial] {
        let mut tracker = TipTracker::new(TipTrackerDescriptor {
            method,
            r0: 1.0,
            output_dir: dir.path(),
            restart: false,
        })
        .unwrap();
        tracker.process(&grid, 0, sim.psi(), 1e-3).unwrap();

        assert_abs_diff_eq!(tracker.position(), 1.0, epsilon = 1e-3);
        assert_eq!(tracker.velocity(), (tracker.position() - 1.0) / 1e-3);
        assert_abs_diff_eq!(tracker.k1(), -1.0, epsilon = 0.05);
        assert_abs_diff_eq!(tracker.k2(), -1.0, epsilon = 0.05);
        assert!(tracker.kpar().is_finite());
        assert!(tracker.kpar() < 0.0);
    }
}

#[test]
fn each_method_logs_its_own_stream() {
    let dir = tempfile::tempdir().unwrap();
    let grid = Grid::quadrant([4.0, 4.0], [0.1, 0.1]);
    let mut sim = common::simulation(
        dir.path(),
        grid,
        0.05,
        0,
        Vec::new(),
        vec![InterpolationMethod::Polynomial, InterpolationMethod::CubicSpline],
    );
    sim.start(1e-3, Termination::Steps(3)).unwrap();
    while sim.next().unwrap() {}

    assert_eq!(sim.trackers().len(), 2);
    assert_eq!(sim.tracker().unwrap().method(), InterpolationMethod::Polynomial);
    for name in ["tip_polynomial", "tip_cspline"] {
        let log = std::fs::read_to_string(dir.path().join(name)).unwrap();
        let steps: Vec<&str> = log
            .lines()
            .map(|line| line.split(' ').next().unwrap())
            .collect();
        assert_eq!(steps, ["1", "2", "3", "4"]);
        for line in log.lines() {
            assert_eq!(line.split(' ').count(), 7);
        }
    }

    // both interpolants see the same slow front
    let positions: Vec<f64> = sim.trackers().iter().map(|t| t.position()).collect();
    assert_abs_diff_eq!(positions[0], positions[1], epsilon = 1e-3);
    assert_abs_diff_eq!(positions[0], 1.0, epsilon = 0.05);
}
