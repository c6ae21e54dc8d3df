use std::path::Path;

use reacher_core::Config;

/// Solver settings given on the command line.
#[derive(Clone, Debug, Default)]
pub(crate) struct SolverOverrides {
    pub alpha: Option<f64>,
    pub epsilon: Option<f64>,
    pub max_iterations: Option<usize>,
}

/// Load the configuration file if any, then apply the command line overrides.
pub(crate) fn resolve(path: Option<&Path>, overrides: &SolverOverrides) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            reacher_core::from_file(path)?
        }
        None => Config::default(),
    };

    if let Some(alpha) = overrides.alpha {
        config.solver.alpha = alpha;
    }
    if let Some(epsilon) = overrides.epsilon {
        config.solver.epsilon = epsilon;
    }
    if let Some(max_iterations) = overrides.max_iterations {
        config.solver.max_iterations = max_iterations;
    }

    config.validate()?;

    Ok(config)
}
