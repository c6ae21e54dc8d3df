use std::{collections::VecDeque, path::Path};

use reacher_core::Position;

/// Ordered list of end-effector targets.
pub struct Program(VecDeque<Position>);

impl Program {
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        std::fs::read_to_string(path)?.parse()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn next(&mut self) -> Option<Position> {
        self.0.pop_front()
    }
}

impl std::str::FromStr for Program {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let targets = serde_json::from_str::<Vec<[f64; 3]>>(s)?
            .iter()
            .map(|[x, y, z]| Position::new(*x, *y, *z))
            .collect();

        Ok(Self(targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let json = "[[0.05, 0.07, 0.01], [0.0, -0.0335, 0.19]]";
        let mut program: Program = json.parse().unwrap();

        assert_eq!(program.len(), 2);
        assert_eq!(program.next(), Some(Position::new(0.05, 0.07, 0.01)));
        assert_eq!(program.next(), Some(Position::new(0.0, -0.0335, 0.19)));
        assert_eq!(program.next(), None);
        assert!(program.is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        assert!("[[0.05, 0.07]]".parse::<Program>().is_err());
        assert!("{\"x\": 1.0}".parse::<Program>().is_err());
    }

    #[test]
    fn test_parse_empty() {
        let program: Program = "[]".parse().unwrap();

        assert!(program.is_empty());
    }
}
