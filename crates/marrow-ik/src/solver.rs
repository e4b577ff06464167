//! Shared solver surface.

use crate::chain::{IkChain, Joint};
use marrow_transform::Transform;

/// Common interface of the chain solvers.
///
/// A solver owns its [`IkChain`]; the provided methods delegate chain
/// queries so callers can drive either solver through one seam. `resize`
/// is overridable for solvers that keep scratch buffers sized to the chain.
pub trait IkSolver {
    /// Returns the owned chain.
    fn chain(&self) -> &IkChain;

    /// Returns the owned chain mutably.
    fn chain_mut(&mut self) -> &mut IkChain;

    /// Runs the solve loop toward `target`.
    ///
    /// Returns `true` iff the end effector's world position ends up within
    /// the solver's threshold of `target.translation` inside the iteration
    /// budget. Returns `false` for an empty chain. A failed solve leaves
    /// the chain in whatever state the last iteration produced.
    fn solve(&mut self, target: &Transform) -> bool;

    /// Resizes the chain, keeping joints at retained indices.
    fn resize(&mut self, new_len: usize) {
        self.chain_mut().resize(new_len);
    }

    /// Returns the number of joints.
    fn len(&self) -> usize {
        self.chain().len()
    }

    /// Returns true if the chain has no joints.
    fn is_empty(&self) -> bool {
        self.chain().is_empty()
    }

    /// Returns a joint by index.
    fn joint(&self, index: usize) -> Option<&Joint> {
        self.chain().joint(index)
    }

    /// Returns a joint's local pose. Panics if `index` is out of bounds.
    fn local_transform(&self, index: usize) -> Transform {
        self.chain().local_transform(index)
    }

    /// Sets a joint's local pose. Panics if `index` is out of bounds.
    fn set_local_transform(&mut self, index: usize, transform: Transform) {
        self.chain_mut().set_local_transform(index, transform);
    }

    /// Returns a joint's transform relative to the chain root.
    /// Panics if `index` is out of bounds.
    fn global_transform(&self, index: usize) -> Transform {
        self.chain().global_transform(index)
    }

    /// Applies every joint's constraints in index order.
    fn apply_constraints(&mut self) {
        self.chain_mut().apply_constraints();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CcdSolver, FabrikSolver};
    use glam::Vec3;

    fn reach_up(solver: &mut dyn IkSolver) -> bool {
        solver.resize(2);
        solver.set_local_transform(1, Transform::from_translation(Vec3::X));
        solver.solve(&Transform::from_translation(Vec3::Y))
    }

    #[test]
    fn test_solvers_through_trait_object() {
        let mut solvers: Vec<Box<dyn IkSolver>> = vec![
            Box::new(CcdSolver::new()),
            Box::new(FabrikSolver::new()),
        ];

        for solver in &mut solvers {
            assert!(reach_up(solver.as_mut()));
            let effector = solver.global_transform(1).translation;
            assert!((effector - Vec3::Y).length() < 1e-3);
        }
    }

    #[test]
    fn test_root_invariant_via_trait() {
        let mut solver = CcdSolver::new();
        solver.resize(3);
        solver.set_local_transform(0, Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)));

        assert_eq!(solver.global_transform(0), solver.local_transform(0));
    }
}
