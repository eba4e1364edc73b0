#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library of planar geometry for a mowing robot."]
#![doc = ""]
#![doc = "This crate provides the point, pose and twist types shared by the navigation core"]
#![doc = "and the drive controller, heading math that is safe across the ±π seam, and"]
#![doc = "odometry integration of a twist over a time step."]

use core::fmt;
use libm::{cosf, sinf, sqrtf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod angle;
pub mod error;

pub use angle::{angle_between, angular_distance, normalize_angle, normalize_relative_to};
pub use error::GeometryError;

/// A point in the planar ground frame (meters).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    /// Ground-frame x position (m).
    pub x: f32,
    /// Ground-frame y position (m).
    pub y: f32,
}

impl Point {
    /// Creates a new `Point`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other` in meters.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        sqrtf(dx * dx + dy * dy)
    }

    /// Heading (rad) of the vector from this point to `other`.
    pub fn heading_to(&self, other: Point) -> f32 {
        angle_between(*self, other)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A 2‑D pose `(x, y, θ)` in meters and radians (θ measured counter‑clockwise
/// from the x‑axis in the ground frame).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Ground‑frame x position (m).
    pub x: f32,
    /// Ground‑frame y position (m).
    pub y: f32,
    /// Heading (rad), normalized to `[-PI, PI)`.
    pub theta: f32,
}

impl Pose {
    /// Construct a new pose.
    pub const fn new(x: f32, y: f32, theta: f32) -> Self {
        Pose { x, y, theta }
    }

    /// The position part of the pose.
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Integrates a constant twist over `dt` seconds.
    ///
    /// The twist is expressed in the robot base frame; the returned pose has its
    /// heading normalized to `[-PI, PI)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(GeometryError::NegativeTimeDelta)` if `dt` is negative.
    pub fn integrate(&self, twist: Twist, dt: f32) -> Result<Pose, GeometryError> {
        if dt < 0.0 {
            return Err(GeometryError::NegativeTimeDelta(dt));
        }

        let delta_x = twist.vx * cosf(self.theta) * dt;
        let delta_y = twist.vx * sinf(self.theta) * dt;
        let delta_theta = twist.wz * dt;

        Ok(Pose {
            x: self.x + delta_x,
            y: self.y + delta_y,
            theta: normalize_angle(self.theta + delta_theta),
        })
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2} rad)", self.x, self.y, self.theta)
    }
}

/// A twist expressed in the robot base frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist {
    /// Linear x velocity (m/s) in the robot's base frame. Negative drives in reverse.
    pub vx: f32,
    /// Angular z velocity (rad/s) around the robot's base frame z-axis.
    pub wz: f32,
}

impl Twist {
    /// Construct a new twist.
    pub const fn new(vx: f32, wz: f32) -> Self {
        Twist { vx, wz }
    }
}

impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(vx: {:.2} m/s, ωz: {:.2} rad/s)", self.vx, self.wz)
    }
}
