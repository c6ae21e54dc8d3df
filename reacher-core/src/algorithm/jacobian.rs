use crate::geometry::{Jacobian, JointAngles};

use super::fk::ForwardKinematics;

/// Default finite difference step in radians.
pub const DEFAULT_STEP: f64 = 0.001;

/// Finite difference formula.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceScheme {
    /// One-sided difference `(f(x + h) - f(x)) / h`, error of order `h`.
    #[default]
    Forward,
    /// Symmetric difference `(f(x + h) - f(x - h)) / 2h`, error of order `h^2`.
    Central,
}

impl std::fmt::Display for DifferenceScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DifferenceScheme::Forward => write!(f, "forward"),
            DifferenceScheme::Central => write!(f, "central"),
        }
    }
}

/// Numerical estimate of the position Jacobian.
///
/// The estimate is taken fresh on every call. Nothing is cached between
/// evaluations.
#[derive(Clone, Copy, Debug)]
pub struct NumericalJacobian {
    fk: ForwardKinematics,
    step: f64,
    scheme: DifferenceScheme,
}

impl NumericalJacobian {
    /// Construct an estimator with the default forward difference step.
    pub fn new(fk: ForwardKinematics) -> Self {
        Self {
            fk,
            step: DEFAULT_STEP,
            scheme: DifferenceScheme::Forward,
        }
    }

    /// Construct an estimator with an explicit step and scheme.
    pub fn with_step(
        fk: ForwardKinematics,
        step: f64,
        scheme: DifferenceScheme,
    ) -> crate::Result<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(crate::Error::InvalidConfig(
                "difference step must be positive",
            ));
        }

        Ok(Self { fk, step, scheme })
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[inline]
    pub fn scheme(&self) -> DifferenceScheme {
        self.scheme
    }

    /// Estimate the Jacobian at the given joint angles.
    ///
    /// Column `j` holds the change in position per radian of joint `j`.
    pub fn solve(&self, angles: &JointAngles) -> Jacobian {
        let mut jacobian = Jacobian::zeros();

        match self.scheme {
            DifferenceScheme::Forward => {
                let origin = self.fk.solve(angles);

                for j in 0..3 {
                    let mut perturbed = *angles;
                    perturbed[j] += self.step;

                    let column = (self.fk.solve(&perturbed) - origin) / self.step;
                    jacobian.set_column(j, &column);
                }
            }
            DifferenceScheme::Central => {
                for j in 0..3 {
                    let mut ahead = *angles;
                    ahead[j] += self.step;
                    let mut behind = *angles;
                    behind[j] -= self.step;

                    let column =
                        (self.fk.solve(&ahead) - self.fk.solve(&behind)) / (2.0 * self.step);
                    jacobian.set_column(j, &column);
                }
            }
        }

        jacobian
    }
}
