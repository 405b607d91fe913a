use crate::core::models::axis::SignedAxis;
use crate::core::models::cloud::PointCloud;
use crate::core::utils::neighbors::NeighborIndex;
use crate::engine::config::{SolverConfig, validate_distances};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, instrument, warn};

/// Slack used when deciding whether a move overshot its target.
const OVERSHOOT_EPSILON: f64 = 1e-9;

/// Remaining gap above which a single medium correction is applied before fine stepping.
const MEDIUM_GAP_THRESHOLD: f64 = 0.02;

/// The movable cloud at one converged separation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedPlacement {
    pub target: f64,
    pub achieved: f64,
    pub structure: PointCloud,
}

/// Tracks the movable cloud and its current separation from the fixed one.
///
/// The cloud itself is never moved while solving. Only its scalar offset along the axis
/// is accumulated, which keeps the structure rigid through the far-field push.
struct Approach {
    fixed: NeighborIndex,
    movable: PointCloud,
    axis: Vector3<f64>,
    sense: f64,
    offset: f64,
    distance: f64,
}

impl Approach {
    fn new(fixed: &[Point3<f64>], movable: PointCloud, axis: SignedAxis) -> Self {
        let mut approach = Self {
            fixed: NeighborIndex::new(fixed),
            movable,
            axis: axis.axis.unit(),
            sense: if axis.negative { -1.0 } else { 1.0 },
            offset: 0.0,
            distance: 0.0,
        };
        approach.distance = approach.measure();
        approach
    }

    fn measure(&self) -> f64 {
        let displacement = self.axis * self.offset;
        let moved: Vec<Point3<f64>> = self
            .movable
            .positions()
            .iter()
            .map(|p| p + displacement)
            .collect();
        self.fixed.min_distance_to(&moved).unwrap_or(f64::INFINITY)
    }

    /// Moves the cloud by `amount` along the current direction and returns the new separation.
    fn shift(&mut self, amount: f64) -> f64 {
        self.offset += self.sense * amount;
        self.distance = self.measure();
        self.distance
    }

    fn reverse(&mut self) {
        self.sense = -self.sense;
    }

    fn placed(&self) -> PointCloud {
        let mut structure = self.movable.clone();
        structure.translate(&(self.axis * self.offset));
        structure
    }
}

fn overshoots(distance: f64, target: f64) -> bool {
    distance > target + OVERSHOOT_EPSILON
}

/// Brings the movable cloud just inside `min_separation` of the fixed cloud, then orients
/// the direction of travel so that further shifts increase the separation.
fn bracket(approach: &mut Approach, config: &SolverConfig) -> Result<(), EngineError> {
    approach.shift(config.far_offset);
    let initial = approach.distance;

    let pulled = approach.shift(initial - config.min_separation + config.coarse_margin);
    if pulled > initial {
        debug!("Pull-back increased the separation; reversing direction.");
        approach.reverse();
        let retried = approach.shift(pulled - config.min_separation + config.retry_margin);
        if retried > pulled {
            return Err(EngineError::GeometryInconsistent {
                reason: format!(
                    "separation grew in both directions along the axis ({:.4} Å, then {:.4} Å)",
                    pulled, retried
                ),
            });
        }
    }

    approach.reverse();
    debug!(separation = approach.distance, "Bracketing complete.");
    Ok(())
}

fn converge_on(
    approach: &mut Approach,
    target: f64,
    config: &SolverConfig,
) -> Result<f64, EngineError> {
    let previous = approach.distance;
    let shift = target - previous;

    // Coarse approach: each retry undoes the last move and undershoots by a wider margin.
    let mut moved = shift - config.coarse_margin;
    approach.shift(moved);
    let mut retry = 0;
    while overshoots(approach.distance, target) {
        if retry == config.max_coarse_retries {
            return Err(EngineError::OptimizationDiverged {
                target,
                reached: approach.distance,
                phase: "coarse",
            });
        }
        retry += 1;
        warn!(
            retry,
            reached = approach.distance,
            target,
            "Coarse shift overshot the target; retrying with a wider margin."
        );
        approach.shift(-moved);
        moved = shift - config.retry_margin * retry as f64;
        approach.shift(moved);
    }

    let gap = target - approach.distance;
    if gap > config.tolerance && gap > MEDIUM_GAP_THRESHOLD {
        approach.shift(gap - config.tolerance);
        if overshoots(approach.distance, target) {
            return Err(EngineError::OptimizationDiverged {
                target,
                reached: approach.distance,
                phase: "medium",
            });
        }
    }

    let mut steps = 0;
    while target - approach.distance >= config.tolerance {
        if steps == config.max_fine_steps {
            return Err(EngineError::OptimizationDiverged {
                target,
                reached: approach.distance,
                phase: "fine",
            });
        }
        steps += 1;
        approach.shift(config.fine_step);
        if overshoots(approach.distance, target) {
            return Err(EngineError::OptimizationDiverged {
                target,
                reached: approach.distance,
                phase: "fine",
            });
        }
    }

    debug!(target, achieved = approach.distance, fine_steps = steps, "Target converged.");
    Ok(approach.distance)
}

/// Translates `movable` along `axis` until its minimum distance to `fixed` matches each target.
///
/// Targets are solved in the order given, each starting from the previous converged
/// position, and placements are returned in that same order. Every target is approached
/// from the too-close side, so the achieved separation never exceeds the requested one.
///
/// # Errors
///
/// Fails with [`EngineError::InvalidDistanceTargets`] for an empty or non-positive target
/// list, [`EngineError::EmptyStructure`] if either cloud has no atoms,
/// [`EngineError::GeometryInconsistent`] if no direction along the axis brings the clouds
/// together, and [`EngineError::OptimizationDiverged`] if a target cannot be reached
/// without overshooting.
#[instrument(skip_all, name = "distance_solver", fields(axis = %axis, targets = targets.len()))]
pub fn solve(
    fixed: &PointCloud,
    movable: PointCloud,
    axis: SignedAxis,
    targets: &[f64],
    config: &SolverConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<SolvedPlacement>, EngineError> {
    validate_distances(targets)?;
    if fixed.is_empty() || movable.is_empty() {
        return Err(EngineError::EmptyStructure {
            stage: "distance solver",
        });
    }

    reporter.report(Progress::SolveStart {
        total_targets: targets.len() as u64,
    });

    let mut approach = Approach::new(fixed.positions(), movable, axis);
    bracket(&mut approach, config)?;

    let mut placements = Vec::with_capacity(targets.len());
    for &target in targets {
        let achieved = converge_on(&mut approach, target, config)?;
        reporter.report(Progress::TargetConverged { target, achieved });
        placements.push(SolvedPlacement {
            target,
            achieved,
            structure: approach.placed(),
        });
    }

    reporter.report(Progress::SolveFinish);
    info!(solved = placements.len(), "Distance optimization finished.");
    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lattice;
    use crate::core::models::axis::Axis;
    use crate::core::models::cloud::Aabb;
    use crate::core::shapes::{Sphere, carve};
    use crate::core::species::SpeciesTable;
    use crate::core::utils::geometry::min_distance;
    use std::sync::{Arc, Mutex};

    fn gold_sphere(radius: f64) -> PointCloud {
        let params = SpeciesTable::builtin().get("au").unwrap();
        let bulk = lattice::bulk("au", &params, &Aabb::centered_cube(radius + 2.0)).unwrap();
        carve(&bulk, &Sphere::new(Point3::origin(), radius).unwrap())
    }

    fn assert_placement(fixed: &PointCloud, placement: &SolvedPlacement, tolerance: f64) {
        assert!(placement.achieved <= placement.target + OVERSHOOT_EPSILON);
        assert!(placement.target - placement.achieved < tolerance);
        let measured = min_distance(fixed.positions(), placement.structure.positions()).unwrap();
        assert!((measured - placement.achieved).abs() < 1e-6);
    }

    #[test]
    fn sphere_dimer_reaches_every_increasing_target() {
        let fixed = gold_sphere(8.0);
        let config = SolverConfig::default();
        let placements = solve(
            &fixed,
            fixed.clone(),
            SignedAxis::positive(Axis::X),
            &[10.0, 20.0, 35.0],
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();

        let targets: Vec<f64> = placements.iter().map(|p| p.target).collect();
        assert_eq!(targets, vec![10.0, 20.0, 35.0]);
        for placement in &placements {
            assert_placement(&fixed, placement, config.tolerance);
        }
    }

    #[test]
    fn movable_cloud_travels_only_along_the_axis() {
        let fixed = gold_sphere(6.0);
        let placements = solve(
            &fixed,
            fixed.clone(),
            SignedAxis::negative(Axis::Z),
            &[12.0],
            &SolverConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let offset = placements[0].structure.centroid() - fixed.centroid();
        assert!(offset.x.abs() < 1e-6 && offset.y.abs() < 1e-6);
        assert!(offset.z < 0.0);
        assert_placement(&fixed, &placements[0], 0.01);
    }

    #[test]
    fn single_atoms_on_the_axis_converge_exactly() {
        let fixed = PointCloud::uniform("au", vec![Point3::origin()]);
        let movable = PointCloud::uniform("ag", vec![Point3::origin()]);
        let placements = solve(
            &fixed,
            movable,
            SignedAxis::positive(Axis::Y),
            &[3.0, 7.5],
            &SolverConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        for placement in &placements {
            assert_placement(&fixed, placement, 0.01);
            assert_eq!(placement.structure.species()[0], "ag");
        }
    }

    #[test]
    fn decreasing_targets_are_solved_in_input_order() {
        let fixed = PointCloud::uniform("au", vec![Point3::origin()]);
        let placements = solve(
            &fixed,
            fixed.clone(),
            SignedAxis::positive(Axis::X),
            &[20.0, 10.0],
            &SolverConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let targets: Vec<f64> = placements.iter().map(|p| p.target).collect();
        assert_eq!(targets, vec![20.0, 10.0]);
        for placement in &placements {
            assert_placement(&fixed, placement, 0.01);
        }
        assert!(placements[1].structure.positions()[0].x < placements[0].structure.positions()[0].x);
    }

    #[test]
    fn progress_reports_each_converged_target() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |e| {
            sink.lock().unwrap().push(e);
        }));
        let fixed = PointCloud::uniform("au", vec![Point3::origin()]);
        solve(
            &fixed,
            fixed.clone(),
            SignedAxis::positive(Axis::X),
            &[4.0, 6.0],
            &SolverConfig::default(),
            &reporter,
        )
        .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.first(), Some(&Progress::SolveStart { total_targets: 2 }));
        assert_eq!(events.last(), Some(&Progress::SolveFinish));
        let converged = events
            .iter()
            .filter(|e| matches!(e, Progress::TargetConverged { .. }))
            .count();
        assert_eq!(converged, 2);
    }

    #[test]
    fn invalid_targets_are_rejected() {
        let fixed = PointCloud::uniform("au", vec![Point3::origin()]);
        for targets in [vec![], vec![5.0, -1.0], vec![f64::INFINITY]] {
            let result = solve(
                &fixed,
                fixed.clone(),
                SignedAxis::positive(Axis::X),
                &targets,
                &SolverConfig::default(),
                &ProgressReporter::new(),
            );
            assert!(matches!(result, Err(EngineError::InvalidDistanceTargets(_))));
        }
    }

    #[test]
    fn empty_cloud_is_rejected() {
        let fixed = PointCloud::uniform("au", vec![Point3::origin()]);
        let result = solve(
            &fixed,
            PointCloud::empty(),
            SignedAxis::positive(Axis::X),
            &[5.0],
            &SolverConfig::default(),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::EmptyStructure { .. })));
    }

    #[test]
    fn exhausting_fine_steps_diverges() {
        // Offset perpendicular to the axis, so the separation grows slowly with each step.
        let fixed = PointCloud::uniform("au", vec![Point3::origin()]);
        let movable = PointCloud::uniform("au", vec![Point3::new(0.0, 5.0, 0.0)]);
        let config = SolverConfig {
            max_fine_steps: 10,
            ..SolverConfig::default()
        };
        let result = solve(
            &fixed,
            movable,
            SignedAxis::positive(Axis::Z),
            &[5.5],
            &config,
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::OptimizationDiverged { phase: "fine", .. })
        ));
    }
}
