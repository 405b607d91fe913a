use super::{file_stem, progress_handler, read_structure, write_report, write_structure};
use crate::cli::SeparateArgs;
use crate::error::{CliError, Result};
use nanogeom::core::io::report::DistanceRecord;
use nanogeom::engine::config::SolverConfigBuilder;
use nanogeom::engine::progress::ProgressReporter;
use nanogeom::workflows::separate::{self, SeparateRequest, placement_name};
use std::path::Path;
use tracing::info;

pub fn run(args: SeparateArgs, quiet: bool) -> Result<()> {
    let distances = match &args.distances_file {
        Some(path) => read_distances(path)?,
        None => args.distances.clone(),
    };

    let mut solver = SolverConfigBuilder::new();
    if let Some(tolerance) = args.tolerance {
        solver = solver.tolerance(tolerance);
    }
    let solver = solver
        .build()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    let request = SeparateRequest {
        fixed: read_structure(&args.fixed)?,
        movable: read_structure(&args.movable)?,
        recenter_fixed: args.recenter_fixed,
        recenter_movable: args.recenter_movable,
        axis: args.axis,
        distances,
        solver,
    };

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Placing {} along {} at {} distance(s)...",
        args.movable.display(),
        args.axis,
        request.distances.len()
    );
    let placements = separate::run(request, &reporter)?;
    info!("Workflow finished, received {} placement(s).", placements.len());

    let stem = file_stem(&args.movable)?;
    let mut records = Vec::with_capacity(placements.len());
    for placement in &placements {
        let name = placement_name(&stem, args.axis, placement.target);
        let path = write_structure(&args.output_dir, &name, &placement.structure)?;
        println!(
            "✓ d = {:.4} Å (target {:.2}) written to: {}",
            placement.achieved,
            placement.target,
            path.display()
        );
        records.push(DistanceRecord::new(placement.target, placement.achieved));
    }

    let report = write_report(&args.output_dir, &format!("{}_{}", stem, args.axis), &records)?;
    println!("  Distance report written to: {}", report.display());
    Ok(())
}

/// Reads one distance per line; blank lines and `#` comments are skipped.
fn read_distances(path: &Path) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::file(path, e))?;
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.parse::<f64>().map_err(|e| {
                CliError::file(path, anyhow::anyhow!("invalid distance '{}': {}", line, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use nanogeom::core::io::report::read_distance_report;

    const PAIR: &str = "2\nmolecule\nC 0.0 0.0 0.0\nO 1.2 0.0 0.0\n";

    fn separate_args(argv: &[&str]) -> SeparateArgs {
        match Cli::parse_from(argv).command {
            Commands::Separate(args) => args,
            _ => panic!("Expected Separate command"),
        }
    }

    #[test]
    fn distance_file_skips_blank_and_comment_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distances_input");
        std::fs::write(&path, "# targets\n2.5\n\n 5.0 \n10\n").unwrap();
        assert_eq!(read_distances(&path).unwrap(), vec![2.5, 5.0, 10.0]);
    }

    #[test]
    fn malformed_distance_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distances_input");
        std::fs::write(&path, "2.5\nfar\n").unwrap();
        assert!(matches!(
            read_distances(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn placements_are_written_per_target() {
        let dir = tempfile::tempdir().unwrap();
        let fixed = dir.path().join("fixed.xyz");
        let movable = dir.path().join("co.xyz");
        std::fs::write(&fixed, PAIR).unwrap();
        std::fs::write(&movable, PAIR).unwrap();
        let output = dir.path().join("out");

        let args = separate_args(&[
            "nanogeom",
            "separate",
            "--fixed",
            fixed.to_str().unwrap(),
            "--movable",
            movable.to_str().unwrap(),
            "--axis",
            "+x",
            "--distances",
            "3,6",
            "-o",
            output.to_str().unwrap(),
        ]);
        run(args, true).unwrap();

        assert!(output.join("co_+x_d_3.00.xyz").is_file());
        assert!(output.join("co_+x_d_6.00.xyz").is_file());
        let records = read_distance_report(&output.join("co_+x_distances.csv")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target, 3.0);
    }
}
