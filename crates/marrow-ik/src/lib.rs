//! Joint-chain inverse kinematics.
//!
//! Provides an ordered chain of joints ([`IkChain`]), two solving
//! strategies (Cyclic Coordinate Descent via [`CcdSolver`], forward-and-
//! backward reaching via [`FabrikSolver`]), and two joint
//! constraints (hinge, ball-socket) that restrict joint motion during
//! solving. Solvers mutate joint local poses in place and report whether
//! the end effector converged onto the target; applying the corrected
//! poses to a skeleton is the caller's concern.
//!
//! ```
//! use glam::Vec3;
//! use marrow_ik::{CcdSolver, IkSolver};
//! use marrow_transform::Transform;
//!
//! let mut solver = CcdSolver::new();
//! solver.resize(2);
//! solver.set_local_transform(1, Transform::from_translation(Vec3::X));
//!
//! let reached = solver.solve(&Transform::from_translation(Vec3::Y));
//! assert!(reached);
//! ```

mod ccd;
mod chain;
mod constraint;
mod fabrik;
mod solver;

pub use ccd::CcdSolver;
pub use chain::{IkChain, Joint};
pub use constraint::{BallSocketConstraint, Constraint, HingeConstraint};
pub use fabrik::FabrikSolver;
pub use solver::IkSolver;
