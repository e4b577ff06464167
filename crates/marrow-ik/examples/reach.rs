//! Three-segment arm reaching demo.
//!
//! Builds the same arm for both solvers, drives it toward a target, and
//! prints the resulting joint placements: once unconstrained, once with a
//! hinge keeping the arm planar.
//!
//! Run with: `cargo run --example reach`

use glam::{Quat, Vec3};
use marrow_ik::{CcdSolver, FabrikSolver, HingeConstraint, IkSolver};
use marrow_transform::Transform;

fn build_arm(solver: &mut dyn IkSolver) {
    solver.resize(4);
    // Bend the shoulder a little so the chain is not a straight line
    solver.set_local_transform(0, Transform::from_rotation(Quat::from_rotation_z(0.3)));
    for i in 1..4 {
        solver.set_local_transform(i, Transform::from_translation(Vec3::X));
    }
}

fn report(name: &str, solver: &mut dyn IkSolver, target: Vec3) {
    let reached = solver.solve(&Transform::from_translation(target));

    println!("{name}: reached = {reached}");
    for i in 0..solver.len() {
        let p = solver.global_transform(i).translation;
        println!("  joint {i}: ({:+.3}, {:+.3}, {:+.3})", p.x, p.y, p.z);
    }
    let effector = solver.global_transform(solver.len() - 1).translation;
    println!("  error = {:.6}", (effector - target).length());
}

fn main() {
    let target = Vec3::new(2.0, 0.8, 0.5);
    println!("target: {target:?}\n");

    let mut ccd = CcdSolver::new();
    ccd.num_steps = 50;
    ccd.threshold = 1e-4;
    build_arm(&mut ccd);
    report("ccd", &mut ccd, target);

    let mut fabrik = FabrikSolver::new();
    fabrik.num_steps = 50;
    fabrik.threshold = 1e-4;
    build_arm(&mut fabrik);
    report("fabrik", &mut fabrik, target);

    // Hinged variant: every joint is confined to the XY plane, so the
    // out-of-plane component of the target is unreachable.
    let mut hinged = CcdSolver::new();
    hinged.num_steps = 50;
    hinged.threshold = 1e-4;
    build_arm(&mut hinged);
    for i in 1..4 {
        hinged
            .chain_mut()
            .joint_mut(i)
            .unwrap()
            .add_constraint(HingeConstraint::new().with_limits(-120.0, 120.0));
    }
    report("ccd + hinge", &mut hinged, target);
}
