use std::path::Path;

use crate::{algorithm::ik::SolverConfig, geometry::LinkGeometry};

/// Reacher configuration.
///
/// Every section is optional, missing values take the defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Arm link geometry.
    pub geometry: LinkGeometry,
    /// Inverse kinematics solver.
    pub solver: SolverConfig,
}

impl Config {
    pub fn validate(&self) -> crate::Result<()> {
        self.geometry.validate()?;
        self.solver.validate()
    }
}

impl std::str::FromStr for Config {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }
}

/// Load and validate the configuration from a TOML file.
pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    std::fs::read_to_string(path)?.parse()
}
