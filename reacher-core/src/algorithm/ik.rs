use crate::geometry::{JointAngles, LinkGeometry, Position};

use super::{
    fk::ForwardKinematics,
    jacobian::{DifferenceScheme, NumericalJacobian, DEFAULT_STEP},
};

/// Gradient descent solver parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Descent step size. The descent is stable while `alpha` times the squared
    /// maximum reach stays well below 2, for the default arm up to about 10.
    pub alpha: f64,
    /// Position error at which the solve is considered converged.
    pub epsilon: f64,
    /// Finite difference step for the Jacobian, in radians.
    pub step: f64,
    /// Finite difference scheme for the Jacobian.
    pub scheme: DifferenceScheme,
    /// Maximum number of descent steps.
    pub max_iterations: usize,
    /// Joint angle magnitude treated as runaway.
    pub divergence_limit: f64,
    /// Reject targets outside the workspace before iterating.
    pub check_reachability: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            epsilon: 0.01,
            step: DEFAULT_STEP,
            scheme: DifferenceScheme::Forward,
            max_iterations: 100_000,
            divergence_limit: 1e6,
            check_reachability: true,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(crate::Error::InvalidConfig("alpha must be positive"));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(crate::Error::InvalidConfig("epsilon must be positive"));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(crate::Error::InvalidConfig(
                "difference step must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(crate::Error::InvalidConfig(
                "max iterations must be at least one",
            ));
        }
        if self.divergence_limit.is_nan() || self.divergence_limit <= 0.0 {
            return Err(crate::Error::InvalidConfig(
                "divergence limit must be positive",
            ));
        }

        Ok(())
    }
}

/// Outcome of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Position error dropped to or below epsilon.
    Converged,
    /// Iteration budget spent.
    ExceededIterations,
    /// Joint angles or error became non-finite or exceeded the divergence limit.
    Diverged,
    /// Target outside the workspace, no iterations were run.
    Unreachable,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Converged => write!(f, "converged"),
            Status::ExceededIterations => write!(f, "exceeded iterations"),
            Status::Diverged => write!(f, "diverged"),
            Status::Unreachable => write!(f, "unreachable"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IkSolution {
    /// Last evaluated joint angles.
    pub angles: JointAngles,
    /// Position error at `angles`.
    pub cost: f64,
    /// Number of descent steps applied.
    pub iterations: usize,
    pub status: Status,
}

impl IkSolution {
    #[inline]
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Convert into the joint angles, or an error if the solve did not converge.
    pub fn into_result(self) -> crate::Result<JointAngles> {
        match self.status {
            Status::Converged => Ok(self.angles),
            Status::ExceededIterations => Err(crate::Error::ExceededIterations {
                iterations: self.iterations,
                cost: self.cost,
            }),
            Status::Diverged => Err(crate::Error::Diverged {
                iterations: self.iterations,
            }),
            Status::Unreachable => Err(crate::Error::Unreachable),
        }
    }
}

/// Single evaluation of the descent loop.
#[derive(Clone, Copy, Debug)]
pub struct DescentStep {
    /// Number of updates applied before this evaluation.
    pub iteration: usize,
    /// Joint angles at which the cost was evaluated.
    pub angles: JointAngles,
    /// Position error at `angles`.
    pub cost: f64,
}

/// Iterator over the gradient descent.
///
/// Every item holds the cost of the guess before its update is applied.
/// The iterator ends after yielding the first step at or below epsilon, or
/// after the step that reaches the iteration budget or runs away.
pub struct Descent<'a> {
    solver: &'a InverseKinematics,
    target: Position,
    guess: JointAngles,
    iteration: usize,
    done: bool,
}

impl Descent<'_> {
    fn is_runaway(&self, cost: f64) -> bool {
        !cost.is_finite()
            || self
                .guess
                .iter()
                .any(|v| !v.is_finite() || v.abs() > self.solver.config.divergence_limit)
    }
}

impl Iterator for Descent<'_> {
    type Item = DescentStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let fk = &self.solver.fk;
        let config = &self.solver.config;

        let residual = fk.residual(&self.target, &self.guess);
        let cost = residual.norm();

        let step = DescentStep {
            iteration: self.iteration,
            angles: self.guess,
            cost,
        };

        if cost <= config.epsilon
            || self.iteration >= config.max_iterations
            || self.is_runaway(cost)
        {
            self.done = true;
            return Some(step);
        }

        let jacobian = self.solver.jacobian.solve(&self.guess);
        let gradient = jacobian.transpose() * residual;

        self.guess -= config.alpha * gradient;
        self.iteration += 1;

        Some(step)
    }
}

/// Gradient descent inverse kinematics.
///
/// Minimizes the distance between the reached and the desired position by
/// stepping against the gradient `J^T (fk(q) - target)`, which is the
/// gradient of half the squared distance.
#[derive(Clone, Copy, Debug)]
pub struct InverseKinematics {
    fk: ForwardKinematics,
    jacobian: NumericalJacobian,
    config: SolverConfig,
}

impl InverseKinematics {
    pub fn new(geometry: LinkGeometry, config: SolverConfig) -> crate::Result<Self> {
        geometry.validate()?;
        config.validate()?;

        let fk = ForwardKinematics::new(geometry);
        let jacobian = NumericalJacobian::with_step(fk, config.step, config.scheme)?;

        Ok(Self {
            fk,
            jacobian,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[inline]
    pub fn forward_kinematics(&self) -> &ForwardKinematics {
        &self.fk
    }

    /// Iterate the descent from `guess` toward `target`.
    ///
    /// No reachability check is done, the iterator runs until convergence,
    /// runaway, or the iteration budget.
    pub fn descent(&self, target: Position, guess: JointAngles) -> Descent<'_> {
        Descent {
            solver: self,
            target,
            guess,
            iteration: 0,
            done: false,
        }
    }

    /// Solve for joint angles reaching `target`, starting at `guess`.
    pub fn solve(&self, target: &Position, guess: &JointAngles) -> IkSolution {
        if self.config.check_reachability
            && !self.fk.geometry().is_reachable(target, self.config.epsilon)
        {
            log::debug!("Target {} is outside the workspace", target);

            return IkSolution {
                angles: *guess,
                cost: self.fk.position_error(target, guess),
                iterations: 0,
                status: Status::Unreachable,
            };
        }

        let mut last = DescentStep {
            iteration: 0,
            angles: *guess,
            cost: f64::INFINITY,
        };

        for step in self.descent(*target, *guess) {
            log::trace!(
                "Iteration {:>6} Cost {:.6} Angles ({:+.4}, {:+.4}, {:+.4})",
                step.iteration,
                step.cost,
                step.angles[0],
                step.angles[1],
                step.angles[2]
            );
            last = step;
        }

        let status = if last.cost <= self.config.epsilon {
            Status::Converged
        } else if last.iteration >= self.config.max_iterations {
            Status::ExceededIterations
        } else {
            Status::Diverged
        };

        log::debug!(
            "Solve {} after {} iterations with error {:.5}",
            status,
            last.iteration,
            last.cost
        );

        IkSolution {
            angles: last.angles,
            cost: last.cost,
            iterations: last.iteration,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn solver() -> InverseKinematics {
        InverseKinematics::new(LinkGeometry::default(), SolverConfig::default()).unwrap()
    }

    #[test]
    fn test_reference_target() {
        let solver = solver();
        let target = Position::new(0.05, 0.07, 0.01);

        let solution = solver.solve(&target, &JointAngles::zeros());

        assert_eq!(solution.status, Status::Converged);
        assert!(solution.cost <= 0.01);

        let fk = solver.forward_kinematics();
        assert!(fk.position_error(&target, &solution.angles) <= 0.01);
        assert!(solution.iterations > 0);
    }

    #[test]
    fn test_already_converged() {
        let solver = solver();
        let angles = JointAngles::new(0.2, 0.3, -0.4);
        let target = solver.forward_kinematics().solve(&angles);

        let solution = solver.solve(&target, &angles);

        assert_eq!(solution.status, Status::Converged);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.angles, angles);
        assert_eq!(solution.cost, 0.0);
    }

    #[test]
    fn test_round_trip() {
        let solver = solver();
        let mut rng = StdRng::seed_from_u64(0x5EED);

        for _ in 0..16 {
            let angles = JointAngles::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let target = solver.forward_kinematics().solve(&angles);
            let guess = angles + JointAngles::new(0.1, -0.1, 0.1);

            let solution = solver.solve(&target, &guess);

            assert!(solution.is_converged());

            let fk = solver.forward_kinematics();
            assert!(fk.position_error(&target, &solution.angles) <= 0.01);
        }
    }

    #[test]
    fn test_descent_decreases() {
        let solver = solver();
        let target = Position::new(0.05, 0.07, 0.01);

        let costs: Vec<f64> = solver
            .descent(target, JointAngles::zeros())
            .map(|step| step.cost)
            .collect();

        assert!(costs.len() > 1);
        assert!(costs.last().unwrap() <= &0.01);
        assert!(costs.last().unwrap() < costs.first().unwrap());

        const WINDOW: usize = 50;
        for pair in costs.chunks(WINDOW).collect::<Vec<_>>().windows(2) {
            assert!(pair[1][0] <= pair[0][0] + 1e-9);
        }
    }

    #[test]
    fn test_descent_iterations_sequential() {
        let solver = solver();
        let target = Position::new(0.05, 0.07, 0.01);

        let steps = solver.descent(target, JointAngles::zeros()).take(10);
        for (index, step) in steps.enumerate() {
            assert_eq!(step.iteration, index);
        }
    }

    #[test]
    fn test_exceeded_iterations() {
        let config = SolverConfig {
            max_iterations: 5,
            ..Default::default()
        };
        let solver = InverseKinematics::new(LinkGeometry::default(), config).unwrap();

        let solution = solver.solve(&Position::new(0.05, 0.07, 0.01), &JointAngles::zeros());

        assert_eq!(solution.status, Status::ExceededIterations);
        assert_eq!(solution.iterations, 5);
        assert!(solution.cost > 0.01);
        assert!(matches!(
            solution.into_result(),
            Err(crate::Error::ExceededIterations { iterations: 5, .. })
        ));
    }

    #[test]
    fn test_unreachable() {
        let solver = solver();
        let guess = JointAngles::new(0.1, 0.2, 0.3);

        let solution = solver.solve(&Position::new(1.0, 1.0, 1.0), &guess);

        assert_eq!(solution.status, Status::Unreachable);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.angles, guess);
        assert!(matches!(
            solution.into_result(),
            Err(crate::Error::Unreachable)
        ));
    }

    #[test]
    fn test_unreachable_unchecked_is_bounded() {
        let config = SolverConfig {
            max_iterations: 1_000,
            check_reachability: false,
            ..Default::default()
        };
        let solver = InverseKinematics::new(LinkGeometry::default(), config).unwrap();

        let solution = solver.solve(&Position::new(1.0, 1.0, 1.0), &JointAngles::zeros());

        assert!(!solution.is_converged());
        assert!(solution.iterations <= 1_000);
    }

    #[test]
    fn test_diverged() {
        let config = SolverConfig {
            alpha: 1e12,
            check_reachability: false,
            ..Default::default()
        };
        let solver = InverseKinematics::new(LinkGeometry::default(), config).unwrap();

        let solution = solver.solve(&Position::new(0.05, 0.07, 0.01), &JointAngles::zeros());

        assert_eq!(solution.status, Status::Diverged);
        assert!(matches!(
            solution.into_result(),
            Err(crate::Error::Diverged { .. })
        ));
    }

    #[test]
    fn test_central_scheme_converges() {
        let config = SolverConfig {
            scheme: DifferenceScheme::Central,
            ..Default::default()
        };
        let solver = InverseKinematics::new(LinkGeometry::default(), config).unwrap();

        let solution = solver.solve(&Position::new(0.05, 0.07, 0.01), &JointAngles::zeros());

        assert!(solution.is_converged());
    }

    #[test]
    fn test_invalid_config() {
        let geometry = LinkGeometry::default();

        for config in [
            SolverConfig {
                alpha: 0.0,
                ..Default::default()
            },
            SolverConfig {
                epsilon: -0.1,
                ..Default::default()
            },
            SolverConfig {
                step: f64::INFINITY,
                ..Default::default()
            },
            SolverConfig {
                max_iterations: 0,
                ..Default::default()
            },
            SolverConfig {
                divergence_limit: 0.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                InverseKinematics::new(geometry, config),
                Err(crate::Error::InvalidConfig(_))
            ));
        }

        assert!(matches!(
            InverseKinematics::new(LinkGeometry::new(0.0, -1.0, 1.0), SolverConfig::default()),
            Err(crate::Error::InvalidGeometry(_))
        ));
    }
}
