// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! Kinematics of a 3-DOF articulated leg.
//!
//! The leg consists of a hip-yaw, a hip-pitch and a knee-pitch joint. The
//! [`algorithm`] module maps joint angles onto the end-effector position,
//! estimates the position Jacobian by finite differences and solves the
//! inverse problem by gradient descent. All functions are pure and take the
//! [`LinkGeometry`] explicitly.

pub mod algorithm;
pub mod config;
pub mod geometry;

mod error;

pub use self::config::{from_file, Config};
pub use self::error::{Error, Result};
pub use self::geometry::{Jacobian, JointAngles, LinkGeometry, Position};

pub use nalgebra;

/// Reacher core version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
