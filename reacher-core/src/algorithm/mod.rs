pub mod fk;
pub mod ik;
pub mod jacobian;

use crate::geometry::{Jacobian, JointAngles, LinkGeometry, Position};

/// Compute the end-effector position for the given joint angles.
pub fn forward_kinematics(geometry: &LinkGeometry, angles: &JointAngles) -> Position {
    fk::ForwardKinematics::new(*geometry).solve(angles)
}

/// Euclidean distance between the desired position and the position reached
/// by `guess`.
pub fn position_error(geometry: &LinkGeometry, desired: &Position, guess: &JointAngles) -> f64 {
    fk::ForwardKinematics::new(*geometry).position_error(desired, guess)
}

/// Forward difference Jacobian with the default step.
pub fn jacobian(geometry: &LinkGeometry, angles: &JointAngles) -> Jacobian {
    jacobian::NumericalJacobian::new(fk::ForwardKinematics::new(*geometry)).solve(angles)
}

/// Solve with the default solver configuration.
pub fn inverse_kinematics(
    geometry: &LinkGeometry,
    desired: &Position,
    guess: &JointAngles,
) -> crate::Result<ik::IkSolution> {
    let solver = ik::InverseKinematics::new(*geometry, ik::SolverConfig::default())?;

    Ok(solver.solve(desired, guess))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_functions() {
        let geometry = LinkGeometry::default();
        let angles = JointAngles::new(-0.3, 0.5, 0.7);

        let point = forward_kinematics(&geometry, &angles);
        assert_eq!(position_error(&geometry, &point, &angles), 0.0);

        let matrix = jacobian(&geometry, &angles);
        let mut perturbed = angles;
        perturbed[1] += jacobian::DEFAULT_STEP;
        let expected = (forward_kinematics(&geometry, &perturbed) - point) / jacobian::DEFAULT_STEP;
        assert!((matrix.column(1) - expected).norm() < 1e-12);

        let solution = inverse_kinematics(&geometry, &point, &(angles * 0.9)).unwrap();
        assert!(solution.is_converged());
        assert!(position_error(&geometry, &point, &solution.angles) <= 0.01);
    }
}
