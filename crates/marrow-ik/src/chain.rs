//! Joint and chain types.
//!
//! A chain is a flat arena of joints indexed root-first; a joint's index is
//! its position in the chain, and constraint application receives the chain
//! and the index explicitly rather than holding a back-reference.

use crate::constraint::Constraint;
use marrow_transform::Transform;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One link in an IK chain.
///
/// Owns its local pose (relative to the previous joint) and the constraints
/// evaluated against it, in insertion order.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joint {
    /// Transform relative to the parent joint in the chain.
    pub local_pose: Transform,
    constraints: Vec<Constraint>,
}

impl Joint {
    /// Creates a joint with an identity pose and no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constraint and returns a reference to the stored value.
    pub fn add_constraint(&mut self, constraint: impl Into<Constraint>) -> &mut Constraint {
        self.constraints.push(constraint.into());
        self.constraints.last_mut().unwrap()
    }

    /// Returns the attached constraints in evaluation order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns true if at least one constraint is attached.
    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }
}

/// An ordered chain of joints, from a fixed root to the end effector.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IkChain {
    joints: Vec<Joint>,
}

impl IkChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes the chain.
    ///
    /// Joints at indices below `min(old_len, new_len)` keep their poses and
    /// constraints; joints added by growth are default-constructed.
    pub fn resize(&mut self, new_len: usize) {
        self.joints.resize_with(new_len, Joint::default);
    }

    /// Returns the number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Returns true if the chain has no joints.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Returns a joint by index.
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Returns a mutable joint by index.
    pub fn joint_mut(&mut self, index: usize) -> Option<&mut Joint> {
        self.joints.get_mut(index)
    }

    /// Returns all joints, root first.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Returns a joint's local pose. Panics if `index` is out of bounds.
    pub fn local_transform(&self, index: usize) -> Transform {
        self.joints[index].local_pose
    }

    /// Sets a joint's local pose. Panics if `index` is out of bounds.
    pub fn set_local_transform(&mut self, index: usize, transform: Transform) {
        self.joints[index].local_pose = transform;
    }

    /// Returns a joint's transform relative to the chain root.
    ///
    /// Composes local poses from the root down to `index` inclusive; the
    /// root's global transform is its local pose. O(index), uncached.
    /// Panics if `index` is out of bounds.
    pub fn global_transform(&self, index: usize) -> Transform {
        let mut world = self.joints[index].local_pose;
        for joint in self.joints[..index].iter().rev() {
            world = joint.local_pose.then(&world);
        }
        world
    }

    /// Applies every joint's constraints, in index order.
    pub fn apply_constraints(&mut self) {
        for index in 0..self.joints.len() {
            self.apply_joint_constraints(index);
        }
    }

    /// Applies one joint's constraints, in insertion order.
    /// Panics if `index` is out of bounds.
    pub fn apply_joint_constraints(&mut self, index: usize) {
        for k in 0..self.joints[index].constraints.len() {
            let constraint = self.joints[index].constraints[k];
            constraint.apply(self, index);
        }
    }
}
