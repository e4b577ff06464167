//! Forward-And-Backward-Reaching IK solver.

use crate::chain::IkChain;
use crate::constraint::rotation_between;
use crate::solver::IkSolver;
use glam::Vec3;
use marrow_transform::Transform;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// IK solver using FABRIK.
///
/// Keeps an auxiliary world-space point per joint plus per-segment lengths,
/// alternately repositions the points backward from the goal and forward
/// from the base while preserving segment lengths, then reconstructs joint
/// rotations from the moved points. The point and length buffers are
/// solver-local scratch, sized on [`resize`](IkSolver::resize) rather than
/// per solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FabrikSolver {
    chain: IkChain,
    /// Maximum number of backward/forward passes per solve.
    pub num_steps: u32,
    /// Convergence distance between effector and target.
    pub threshold: f32,
    world_points: Vec<Vec3>,
    lengths: Vec<f32>,
}

impl Default for FabrikSolver {
    fn default() -> Self {
        Self {
            chain: IkChain::new(),
            num_steps: 15,
            threshold: 1e-5,
            world_points: Vec::new(),
            lengths: Vec::new(),
        }
    }
}

impl FabrikSolver {
    /// Creates a solver with an empty chain and default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the chain's world-space joint positions and segment lengths
    /// into the scratch buffers. `lengths[0]` is always 0.
    fn ik_chain_to_world(&mut self) {
        let size = self.chain.len();
        for i in 0..size {
            let world = self.chain.global_transform(i).translation;
            self.world_points[i] = world;
            if i >= 1 {
                self.lengths[i] = world.distance(self.world_points[i - 1]);
            }
        }
        if size > 0 {
            self.lengths[0] = 0.0;
        }
    }

    /// Reconstructs joint rotations from the moved world points.
    ///
    /// For each joint, rotates the (posed) direction to the next joint onto
    /// the direction to the next world point, in the joint's local frame.
    fn world_to_ik_chain(&mut self) {
        let size = self.chain.len();
        if size == 0 {
            return;
        }
        for i in 0..size - 1 {
            let world = self.chain.global_transform(i);
            let next = self.chain.global_transform(i + 1).translation;
            let position = world.translation;
            let inv_rotation = world.rotation.inverse();

            let to_next = inv_rotation * (next - position);
            let to_desired = inv_rotation * (self.world_points[i + 1] - position);

            let delta = rotation_between(to_next, to_desired);
            let pose = &mut self.chain.joint_mut(i).unwrap().local_pose;
            pose.rotation *= delta;
        }
    }

    /// Backward pass: pins the effector point to the goal and pulls the
    /// rest of the points toward it at fixed segment lengths.
    fn iterate_backward(&mut self, goal: Vec3) {
        let size = self.chain.len();
        if size > 0 {
            self.world_points[size - 1] = goal;
        }
        for i in (0..size.saturating_sub(1)).rev() {
            let direction = (self.world_points[i] - self.world_points[i + 1]).normalize_or_zero();
            self.world_points[i] = self.world_points[i + 1] + direction * self.lengths[i + 1];
        }
    }

    /// Forward pass: pins the root point back to the base and pulls the
    /// rest of the points toward it at fixed segment lengths.
    fn iterate_forward(&mut self, base: Vec3) {
        let size = self.chain.len();
        if size > 0 {
            self.world_points[0] = base;
        }
        for i in 1..size {
            let direction = (self.world_points[i] - self.world_points[i - 1]).normalize_or_zero();
            self.world_points[i] = self.world_points[i - 1] + direction * self.lengths[i];
        }
    }
}

impl IkSolver for FabrikSolver {
    fn chain(&self) -> &IkChain {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut IkChain {
        &mut self.chain
    }

    fn resize(&mut self, new_len: usize) {
        self.chain.resize(new_len);
        self.world_points.resize(new_len, Vec3::ZERO);
        self.lengths.resize(new_len, 0.0);
    }

    fn solve(&mut self, target: &Transform) -> bool {
        let size = self.chain.len();
        if size == 0 {
            return false;
        }
        // The chain may have been resized behind our back through chain_mut
        if self.world_points.len() != size {
            self.world_points.resize(size, Vec3::ZERO);
            self.lengths.resize(size, 0.0);
        }
        let last = size - 1;
        let threshold_sq = self.threshold * self.threshold;

        self.ik_chain_to_world();
        let goal = target.translation;
        let base = self.world_points[0];

        for _ in 0..self.num_steps {
            let effector = self.world_points[last];
            if goal.distance_squared(effector) < threshold_sq {
                self.world_to_ik_chain();
                return true;
            }

            self.iterate_backward(goal);
            self.iterate_forward(base);

            self.world_to_ik_chain();
            self.chain.apply_constraints();
            self.ik_chain_to_world();
        }

        self.world_to_ik_chain();
        let effector = self.chain.global_transform(last).translation;
        goal.distance_squared(effector) < threshold_sq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{angle_between, HingeConstraint};
    use glam::Quat;

    fn bent_arm(segments: usize) -> FabrikSolver {
        let mut solver = FabrikSolver::new();
        solver.resize(segments + 1);
        solver.set_local_transform(0, Transform::from_rotation(Quat::from_rotation_z(0.3)));
        for i in 1..=segments {
            solver.set_local_transform(i, Transform::from_translation(Vec3::X));
        }
        solver
    }

    #[test]
    fn test_empty_chain_fails() {
        let mut solver = FabrikSolver::new();
        assert!(!solver.solve(&Transform::from_translation(Vec3::X)));
    }

    #[test]
    fn test_passes_preserve_segment_lengths() {
        let mut solver = FabrikSolver::new();
        solver.resize(4);
        solver.set_local_transform(1, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        solver.set_local_transform(2, Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)));
        solver.set_local_transform(3, Transform::from_translation(Vec3::new(0.0, 0.0, 2.0)));

        solver.ik_chain_to_world();
        let lengths = solver.lengths.clone();

        solver.iterate_backward(Vec3::new(0.3, 1.2, -0.5));
        solver.iterate_forward(Vec3::ZERO);

        for i in 1..4 {
            let segment = solver.world_points[i].distance(solver.world_points[i - 1]);
            assert!((segment - lengths[i]).abs() < 1e-4, "segment {i} drifted");
        }
    }

    #[test]
    fn test_reaches_target_from_bent_start() {
        let mut solver = bent_arm(3);
        solver.num_steps = 50;
        solver.threshold = 1e-3;

        let target = Transform::from_translation(Vec3::new(2.0, 0.8, 0.0));
        assert!(solver.solve(&target));

        let effector = solver.global_transform(3).translation;
        assert!((effector - target.translation).length() < 1e-2);
    }

    #[test]
    fn test_example_scenario_three_segments() {
        let mut solver = bent_arm(3);
        solver.num_steps = 50;
        solver.threshold = 1e-4;

        let target = Transform::from_translation(Vec3::new(2.5, 0.0, 0.0));
        assert!(solver.solve(&target));

        let effector = solver.global_transform(3).translation;
        assert!((effector - target.translation).length() < 1e-2);
    }

    #[test]
    fn test_unreachable_target_fails_but_extends() {
        let mut solver = bent_arm(3);
        solver.num_steps = 50;

        assert!(!solver.solve(&Transform::from_translation(Vec3::new(10.0, 0.0, 0.0))));

        let effector = solver.global_transform(3).translation;
        assert!(effector.length() > 2.9);
    }

    #[test]
    fn test_converged_solve_is_idempotent() {
        let mut solver = bent_arm(3);
        solver.num_steps = 50;
        solver.threshold = 1e-3;

        let target = Transform::from_translation(Vec3::new(2.0, 0.8, 0.0));
        assert!(solver.solve(&target));
        let effector = solver.global_transform(3).translation;

        assert!(solver.solve(&target));
        let after = solver.global_transform(3).translation;
        assert!((after - effector).length() <= 2.0 * solver.threshold);
    }

    #[test]
    fn test_scratch_resyncs_after_direct_chain_resize() {
        let mut solver = FabrikSolver::new();
        solver.chain_mut().resize(2);
        solver
            .chain_mut()
            .set_local_transform(1, Transform::from_translation(Vec3::X));

        assert!(solver.solve(&Transform::from_translation(Vec3::Y)));
        assert_eq!(solver.world_points.len(), 2);
        assert_eq!(solver.lengths.len(), 2);
    }

    #[test]
    fn test_hinge_constrained_solve_stays_aligned() {
        let mut solver = bent_arm(3);
        solver.num_steps = 100;
        solver.threshold = 1e-3;

        let mut twisted = solver.local_transform(2);
        twisted.rotation = Quat::from_rotation_x(0.4);
        solver.set_local_transform(2, twisted);
        for i in 1..4 {
            solver
                .chain_mut()
                .joint_mut(i)
                .unwrap()
                .add_constraint(HingeConstraint::new());
        }

        let target = Transform::from_translation(Vec3::new(2.0, 0.5, 0.0));
        solver.solve(&target);
        solver.apply_constraints();

        for i in 1..4 {
            let parent_z = solver.global_transform(i - 1).rotation * Vec3::Z;
            let joint_z = solver.global_transform(i).rotation * Vec3::Z;
            assert!(angle_between(parent_z, joint_z) < 1e-2);
        }
        let effector = solver.global_transform(3).translation;
        assert!((effector - target.translation).length() < 0.05);
    }
}
