// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use clap::{Parser, Subcommand};

use reacher_core::{
    algorithm::{
        fk::ForwardKinematics,
        ik::{IkSolution, InverseKinematics, Status},
        jacobian::{DifferenceScheme, NumericalJacobian},
    },
    Config, JointAngles, Position,
};

mod config;
mod program;

fn parse_angles(value: &str) -> Result<JointAngles, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e: std::num::ParseFloatError| e.to_string())?;

    match parts.as_slice() {
        [a0, a1, a2] => Ok(JointAngles::new(*a0, *a1, *a2)),
        _ => Err(format!(
            "expected 3 comma separated angles, got {}",
            parts.len()
        )),
    }
}

/// Printable outcome of a single solve.
struct Report<'a> {
    solution: &'a IkSolution,
    effector: Position,
}

impl std::fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let angles = &self.solution.angles;

        writeln!(
            f,
            "Angles:   {:+.5} {:+.5} {:+.5}",
            angles[0],
            angles[1],
            angles[2]
        )?;
        writeln!(
            f,
            "Effector: {:+.5} {:+.5} {:+.5}",
            self.effector.x, self.effector.y, self.effector.z
        )?;
        write!(
            f,
            "Error:    {:.5} after {} iterations ({})",
            self.solution.cost, self.solution.iterations, self.solution.status
        )
    }
}

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Reacher kinematics dump", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(short = 'c', long = "config", alias = "conf", value_name = "FILE")]
    config: Option<std::path::PathBuf>,
    /// Descent step size.
    #[arg(long)]
    alpha: Option<f64>,
    /// Convergence threshold.
    #[arg(long)]
    epsilon: Option<f64>,
    /// Maximum number of descent steps.
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Commands.
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the end-effector position.
    Fk {
        /// Hip yaw in radians.
        #[arg(allow_negative_numbers = true)]
        a0: f64,
        /// Hip pitch in radians.
        #[arg(allow_negative_numbers = true)]
        a1: f64,
        /// Knee pitch in radians.
        #[arg(allow_negative_numbers = true)]
        a2: f64,
    },
    /// Estimate the position Jacobian.
    Jacobian {
        #[arg(allow_negative_numbers = true)]
        a0: f64,
        #[arg(allow_negative_numbers = true)]
        a1: f64,
        #[arg(allow_negative_numbers = true)]
        a2: f64,
        /// Use central differences.
        #[arg(long)]
        central: bool,
    },
    /// Solve joint angles for a target position.
    Ik {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
        /// Initial guess as comma separated angles.
        #[arg(
            short,
            long,
            value_parser = parse_angles,
            default_value = "0,0,0",
            allow_hyphen_values = true
        )]
        guess: JointAngles,
    },
    /// Solve a JSON list of target positions in order.
    Program {
        /// Program file.
        file: std::path::PathBuf,
    },
    /// Print the workspace bounds.
    Reach,
}

fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut log_config = simplelog::ConfigBuilder::new();
    log_config.set_time_level(LevelFilter::Off);
    log_config.set_thread_level(LevelFilter::Off);
    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);

    let log_level = if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let overrides = config::SolverOverrides {
        alpha: args.alpha,
        epsilon: args.epsilon,
        max_iterations: args.max_iterations,
    };
    let config = config::resolve(args.config.as_deref(), &overrides)?;

    log::trace!("{:#?}", config);
    log::debug!("Geometry: {}", config.geometry);

    match args.command {
        Command::Fk { a0, a1, a2 } => {
            let fk = ForwardKinematics::new(config.geometry);
            let point = fk.solve(&JointAngles::new(a0, a1, a2));

            println!("{:+.5} {:+.5} {:+.5}", point.x, point.y, point.z);
        }
        Command::Jacobian {
            a0,
            a1,
            a2,
            central,
        } => {
            let scheme = if central {
                DifferenceScheme::Central
            } else {
                DifferenceScheme::Forward
            };

            let fk = ForwardKinematics::new(config.geometry);
            let jacobian = NumericalJacobian::with_step(fk, config.solver.step, scheme)?;

            log::debug!("Difference scheme: {}", scheme);

            let matrix = jacobian.solve(&JointAngles::new(a0, a1, a2));
            for row in matrix.row_iter() {
                println!("{:+.5} {:+.5} {:+.5}", row[0], row[1], row[2]);
            }
        }
        Command::Ik { x, y, z, guess } => {
            solve(&config, &Position::new(x, y, z), &guess)?;
        }
        Command::Program { file } => {
            let mut program = program::Program::load(&file)?;

            log::info!("Loaded {} targets from {}", program.len(), file.display());

            if program.is_empty() {
                log::warn!("Program {} has no targets", file.display());
            }

            let mut guess = JointAngles::zeros();
            while let Some(target) = program.next() {
                guess = solve(&config, &target, &guess)?;
            }
        }
        Command::Reach => {
            println!("Min reach: {:.5}", config.geometry.min_reach());
            println!("Max reach: {:.5}", config.geometry.max_reach());
        }
    }

    Ok(())
}

fn solve(config: &Config, target: &Position, guess: &JointAngles) -> anyhow::Result<JointAngles> {
    let solver = InverseKinematics::new(config.geometry, config.solver)?;

    log::info!(
        "Target: X {:>+5.4} Y {:>+5.4} Z {:>+5.4}",
        target.x,
        target.y,
        target.z
    );

    let solution = solver.solve(target, guess);

    if solution.status != Status::Converged {
        log::error!(
            "Solve {} after {} iterations",
            solution.status,
            solution.iterations
        );
    }

    let report = Report {
        solution: &solution,
        effector: solver.forward_kinematics().solve(&solution.angles),
    };
    println!("{}", report);

    let angles = solution.into_result()?;

    Ok(angles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_angles() {
        assert_eq!(
            parse_angles("0.1, -0.2,0.3").unwrap(),
            JointAngles::new(0.1, -0.2, 0.3)
        );
        assert!(parse_angles("0.1,0.2").is_err());
        assert!(parse_angles("a,b,c").is_err());
    }

    #[test]
    fn test_args() {
        let argv = ["reacher-dump", "-vv", "ik", "0.05", "0.07", "0.01"];
        let args = Args::try_parse_from(argv).unwrap();

        assert_eq!(args.verbose, 2);
        assert!(matches!(
            args.command,
            Command::Ik { guess, .. } if guess == JointAngles::zeros()
        ));

        let argv = ["reacher-dump", "fk", "0.1", "-0.5", "0.3"];
        let args = Args::try_parse_from(argv).unwrap();
        assert!(matches!(args.command, Command::Fk { a1, .. } if a1 == -0.5));
    }

    #[test]
    fn test_solve() {
        let config = Config::default();
        let target = Position::new(0.05, 0.07, 0.01);
        let guess = JointAngles::zeros();

        let angles = solve(&config, &target, &guess).unwrap();
        let fk = ForwardKinematics::new(config.geometry);

        assert!(fk.position_error(&target, &angles) <= 0.01);
        assert!(solve(&config, &Position::new(1.0, 0.0, 0.0), &guess).is_err());
    }

    #[test]
    fn test_report_status() {
        let solution = IkSolution {
            angles: JointAngles::new(0.1, -0.2, 0.3),
            cost: 0.25,
            iterations: 42,
            status: Status::ExceededIterations,
        };
        let report = Report {
            solution: &solution,
            effector: Position::new(0.01, 0.02, 0.03),
        };

        let text = report.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("Angles:   +0.10000 -0.20000 +0.30000"));
        assert!(text.contains("Effector: +0.01000 +0.02000 +0.03000"));
        assert!(text.contains("Error:    0.25000 after 42 iterations"));
        assert!(text.ends_with("(exceeded iterations)"));
    }
}
