//! Joint constraints.
//!
//! Constraints mutate a joint's local rotation in place during solving.
//! The set is closed: [`Constraint`] is a tagged variant over hinge and
//! ball-socket, dispatched exhaustively, and every variant is plain `Copy`
//! data with no state across solves.

use crate::chain::IkChain;
use glam::{EulerRot, Mat3, Quat, Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub(crate) const VEC3_EPSILON: f32 = 1e-6;

/// Shortest-arc rotation aligning `from` to `to`.
///
/// Falls back to identity when either input is too short to normalize.
pub(crate) fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from.length_squared() < VEC3_EPSILON || to.length_squared() < VEC3_EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}

/// Angle between two vectors, in radians.
///
/// Returns 0 for degenerate inputs instead of propagating NaN.
pub(crate) fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let sq_a = a.length_squared();
    let sq_b = b.length_squared();
    if sq_a < VEC3_EPSILON || sq_b < VEC3_EPSILON {
        return 0.0;
    }
    let cos = a.dot(b) / (sq_a.sqrt() * sq_b.sqrt());
    cos.clamp(-1.0, 1.0).acos()
}

/// A constraint on a joint's local rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Constraint {
    /// Rotation confined to one axis, optionally within an angle range.
    Hinge(HingeConstraint),
    /// Rotation confined to a cone around the parent's orientation.
    BallSocket(BallSocketConstraint),
}

impl Constraint {
    /// Applies the constraint to the joint at `index`, mutating its local
    /// rotation in place.
    pub fn apply(&self, chain: &mut IkChain, index: usize) {
        match self {
            Constraint::Hinge(hinge) => hinge.apply(chain, index),
            Constraint::BallSocket(ball_socket) => ball_socket.apply(chain, index),
        }
    }
}

impl From<HingeConstraint> for Constraint {
    fn from(constraint: HingeConstraint) -> Self {
        Constraint::Hinge(constraint)
    }
}

impl From<BallSocketConstraint> for Constraint {
    fn from(constraint: BallSocketConstraint) -> Self {
        Constraint::BallSocket(constraint)
    }
}

/// Confines a joint's rotation to a single axis.
///
/// The joint's hinge axis is re-aligned with the parent's each application,
/// so only rotation about the axis survives. Optional limits clamp that
/// rotation to a `[min, max]` degree range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HingeConstraint {
    axis: Vec3,
    limits: Option<Vec2>,
}

impl Default for HingeConstraint {
    fn default() -> Self {
        Self {
            axis: Vec3::Z,
            limits: None,
        }
    }
}

impl HingeConstraint {
    /// Creates an unlimited hinge about the local Z axis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hinge axis. Non-unit input is normalized; a zero vector
    /// falls back to the default Z axis.
    pub fn with_axis(mut self, axis: Vec3) -> Self {
        let axis = axis.normalize_or_zero();
        self.axis = if axis.length_squared() < VEC3_EPSILON {
            Vec3::Z
        } else {
            axis
        };
        self
    }

    /// Sets the angle range in degrees.
    pub fn with_limits(mut self, min: f32, max: f32) -> Self {
        self.limits = Some(Vec2::new(min, max));
        self
    }

    /// Returns the hinge axis.
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Sets the angle range in degrees, `(min, max)`.
    pub fn set_limits(&mut self, limits: Vec2) {
        self.limits = Some(limits);
    }

    /// Removes the angle range, leaving rotation about the axis unclamped.
    pub fn clear_limits(&mut self) {
        self.limits = None;
    }

    /// Returns the angle range in degrees, if set.
    pub fn limits(&self) -> Option<Vec2> {
        self.limits
    }

    /// Applies the hinge to the joint at `index`. No-op for the root.
    pub fn apply(&self, chain: &mut IkChain, index: usize) {
        if index == 0 {
            return;
        }
        let joint_rot = chain.global_transform(index).rotation;
        let parent_rot = chain.global_transform(index - 1).rotation;

        let current_hinge = joint_rot * self.axis;
        let desired_hinge = parent_rot * self.axis;
        let correction = rotation_between(current_hinge, desired_hinge);

        let mut local = chain.local_transform(index);
        let mut local_rot = correction * local.rotation;

        if let Some(limits) = self.limits {
            // Change of basis into a frame whose Y is the hinge axis: a
            // rotation about the axis reads as pure yaw there.
            let frame = hinge_frame(self.axis);
            let in_frame = frame.inverse() * local_rot * frame;
            let (yaw, _, _) = in_frame.to_euler(EulerRot::YXZ);
            let min = limits.x.to_radians();
            let max = limits.y.to_radians();
            local_rot = frame * Quat::from_rotation_y(yaw.clamp(min, max)) * frame.inverse();
        }

        local.rotation = local_rot;
        chain.set_local_transform(index, local);
    }
}

/// Builds an orthonormal frame whose Y column is the hinge axis.
fn hinge_frame(axis: Vec3) -> Quat {
    let forward = axis.cross(Vec3::X);
    let forward = if forward.length_squared() < VEC3_EPSILON {
        axis.cross(Vec3::Y)
    } else {
        forward
    };
    let forward = forward.normalize();
    let right = axis.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, axis, forward))
}

/// Confines a joint's forward direction to a cone around its parent's.
///
/// The cone half-angle is the limit in degrees; the parent of the root is
/// the identity frame. Within the limit the joint is left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BallSocketConstraint {
    limit: f32,
}

impl BallSocketConstraint {
    /// Creates a ball-socket constraint with the cone half-angle in degrees.
    pub fn new(limit: f32) -> Self {
        Self { limit }
    }

    /// Sets the cone half-angle in degrees.
    pub fn set_limit(&mut self, limit: f32) {
        self.limit = limit;
    }

    /// Returns the cone half-angle in degrees.
    pub fn limit(&self) -> f32 {
        self.limit
    }

    /// Applies the cone clamp to the joint at `index`.
    pub fn apply(&self, chain: &mut IkChain, index: usize) {
        let parent_rot = if index == 0 {
            Quat::IDENTITY
        } else {
            chain.global_transform(index - 1).rotation
        };
        let this_rot = chain.global_transform(index).rotation;

        let parent_dir = parent_rot * Vec3::Z;
        let this_dir = this_rot * Vec3::Z;
        let deviation = angle_between(parent_dir, this_dir);
        let limit = self.limit.to_radians();
        if deviation <= limit {
            return;
        }

        // Near-opposite directions leave no usable correction axis.
        let correction = parent_dir.cross(this_dir);
        if correction.length_squared() < VEC3_EPSILON {
            return;
        }
        let world_rot = Quat::from_axis_angle(correction.normalize(), limit) * parent_rot;

        let mut local = chain.local_transform(index);
        local.rotation = parent_rot.inverse() * world_rot;
        chain.set_local_transform(index, local);
    }
}
