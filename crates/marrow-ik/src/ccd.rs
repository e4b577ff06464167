//! Cyclic Coordinate Descent solver.

use crate::chain::IkChain;
use crate::constraint::{rotation_between, VEC3_EPSILON};
use crate::solver::IkSolver;
use glam::Quat;
use marrow_transform::Transform;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// IK solver using Cyclic Coordinate Descent.
///
/// Walks the chain from the end effector back toward the root, rotating one
/// joint at a time so the effector swings onto the target, until the
/// effector is within [`threshold`](Self::threshold) of the target origin
/// or the step budget runs out.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CcdSolver {
    chain: IkChain,
    /// Maximum number of outer iterations per solve.
    pub num_steps: u32,
    /// Convergence distance between effector and target.
    pub threshold: f32,
}

impl Default for CcdSolver {
    fn default() -> Self {
        Self {
            chain: IkChain::new(),
            num_steps: 15,
            threshold: 1e-5,
        }
    }
}

impl CcdSolver {
    /// Creates a solver with an empty chain and default parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IkSolver for CcdSolver {
    fn chain(&self) -> &IkChain {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut IkChain {
        &mut self.chain
    }

    fn solve(&mut self, target: &Transform) -> bool {
        let size = self.chain.len();
        if size == 0 {
            return false;
        }
        let last = size - 1;
        let threshold_sq = self.threshold * self.threshold;
        let goal = target.translation;

        for _ in 0..self.num_steps {
            let effector = self.chain.global_transform(last).translation;
            if goal.distance_squared(effector) < threshold_sq {
                return true;
            }

            for j in (0..last).rev() {
                let effector = self.chain.global_transform(last).translation;

                let world = self.chain.global_transform(j);
                let position = world.translation;
                let rotation = world.rotation;

                let to_effector = effector - position;
                let to_goal = goal - position;
                let effector_to_goal = if to_goal.length_squared() > VEC3_EPSILON {
                    rotation_between(to_effector, to_goal)
                } else {
                    Quat::IDENTITY
                };

                let world_rotated = effector_to_goal * rotation;
                let local_rotate = rotation.inverse() * world_rotated;
                {
                    let pose = &mut self.chain.joint_mut(j).unwrap().local_pose;
                    pose.rotation *= local_rotate;
                }
                self.chain.apply_joint_constraints(j);

                let effector = self.chain.global_transform(last).translation;
                if goal.distance_squared(effector) < threshold_sq {
                    return true;
                }
            }
        }

        false
    }
}
