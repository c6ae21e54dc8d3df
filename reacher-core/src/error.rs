use std::{error, fmt};

pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Link geometry does not describe a physical arm.
    InvalidGeometry(&'static str),
    /// Solver or estimator parameter out of range.
    InvalidConfig(&'static str),
    /// Configuration file could not be read.
    Io(std::io::Error),
    /// Configuration file could not be parsed.
    Parse(toml::de::Error),
    /// Target lies outside the arm workspace.
    Unreachable,
    /// Iteration budget spent before reaching the threshold.
    ExceededIterations { iterations: usize, cost: f64 },
    /// Joint angles or cost ran away.
    Diverged { iterations: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidGeometry(reason) => write!(f, "invalid geometry: {}", reason),
            Error::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            Error::Io(e) => write!(f, "{}", e),
            Error::Parse(e) => write!(f, "{}", e),
            Error::Unreachable => write!(f, "target is outside the workspace"),
            Error::ExceededIterations { iterations, cost } => write!(
                f,
                "no convergence after {} iterations (error {:.5})",
                iterations, cost
            ),
            Error::Diverged { iterations } => {
                write!(f, "solver diverged at iteration {}", iterations)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::Parse(value)
    }
}
