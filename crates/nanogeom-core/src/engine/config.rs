use crate::core::models::axis::{Axis, SignedAxis};
use crate::core::shapes::{
    Bipyramid, Cone, Disk, EdgeType, EllipticParaboloid, Ribbon, Ring, Rod, Sphere, SquarePyramid,
    Triangle,
};
use crate::core::species::{Packing, SpeciesTable};
use crate::engine::error::EngineError;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Species label used for every graphene recipe.
pub const GRAPHENE_SPECIES: &str = "c";

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings for the distance-controlled placement solver. Distances are in Angstroms.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Maximum accepted gap between the achieved and requested separation.
    pub tolerance: f64,
    /// Fixed nudge applied by the fine loop.
    pub fine_step: f64,
    /// Separation the bracketing step deliberately undershoots.
    pub min_separation: f64,
    /// Undershoot kept by the first coarse move towards a target.
    pub coarse_margin: f64,
    /// Extra undershoot per coarse retry, and the bracketing margin after a sign flip.
    pub retry_margin: f64,
    pub max_coarse_retries: usize,
    pub max_fine_steps: usize,
    /// Offset used to push the movable cloud effectively to infinity.
    pub far_offset: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            fine_step: 0.01,
            min_separation: 1.0,
            coarse_margin: 0.1,
            retry_margin: 0.5,
            max_coarse_retries: 3,
            max_fine_steps: 10_000,
            far_offset: 99_999_999.0,
        }
    }
}

#[derive(Default)]
pub struct SolverConfigBuilder {
    tolerance: Option<f64>,
    fine_step: Option<f64>,
    min_separation: Option<f64>,
    max_fine_steps: Option<usize>,
}

impl SolverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
    pub fn fine_step(mut self, step: f64) -> Self {
        self.fine_step = Some(step);
        self
    }
    pub fn min_separation(mut self, separation: f64) -> Self {
        self.min_separation = Some(separation);
        self
    }
    pub fn max_fine_steps(mut self, steps: usize) -> Self {
        self.max_fine_steps = Some(steps);
        self
    }

    /// Builds the configuration, filling unset values with the defaults.
    pub fn build(self) -> Result<SolverConfig, ConfigError> {
        let defaults = SolverConfig::default();
        let config = SolverConfig {
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            fine_step: self.fine_step.unwrap_or(defaults.fine_step),
            min_separation: self.min_separation.unwrap_or(defaults.min_separation),
            max_fine_steps: self.max_fine_steps.unwrap_or(defaults.max_fine_steps),
            ..defaults
        };

        for (name, value) in [
            ("tolerance", config.tolerance),
            ("fine_step", config.fine_step),
            ("min_separation", config.min_separation),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be a positive finite number (got {})", value),
                });
            }
        }
        if config.max_fine_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_fine_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrapheneShape {
    Ribbon { x_length: f64, y_length: f64 },
    Disk { radius: f64 },
    Ring { outer_radius: f64, inner_radius: f64 },
    Triangle { edge: EdgeType, side: f64 },
}

/// How much of a pencil's bipyramid core the shell covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PencilShell {
    /// The shell encloses the whole core.
    Full,
    /// The shell stops at the core's base plane, leaving the upper pyramid bare.
    Half,
}

impl fmt::Display for PencilShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PencilShell::Full => "fullshell",
            PencilShell::Half => "halfshell",
        })
    }
}

impl FromStr for PencilShell {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "fullshell" => Ok(PencilShell::Full),
            "half" | "halfshell" => Ok(PencilShell::Half),
            other => Err(ConfigError::InvalidParameter {
                name: "shell-type",
                reason: format!("unknown pencil shell '{}' (expected full or half)", other),
            }),
        }
    }
}

/// The structure a recipe builds, one variant per named shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeSpec {
    Sphere {
        species: String,
        radius: f64,
    },
    Rod {
        species: String,
        axis: Axis,
        length: f64,
        width: f64,
    },
    CoreShellSphere {
        core_species: String,
        core_radius: f64,
        shell_species: String,
        shell_radius: f64,
    },
    CoreShellRod {
        axis: Axis,
        core_species: String,
        core_length: f64,
        core_width: f64,
        shell_species: String,
        shell_length: f64,
        shell_width: f64,
    },
    /// Elliptic-paraboloid tip with its vertex on the origin.
    Tip {
        species: String,
        z_max: f64,
        a: f64,
        b: f64,
    },
    Pyramid {
        species: String,
        z_max: f64,
        side: f64,
    },
    Cone {
        species: String,
        z_max: f64,
        radius: f64,
    },
    /// Square bipyramid elongated along `z`.
    Bipyramid {
        species: String,
        width: f64,
        length: f64,
    },
    /// Bipyramid core inside a flat-ended cylindrical shell along `z`. The shell is
    /// as wide as the core's base diagonal.
    Pencil {
        core_species: String,
        shell_species: String,
        shell: PencilShell,
        width: f64,
        core_length: f64,
        shell_length: f64,
    },
    /// A paraboloid tip capped by an inverted square pyramid.
    Microscope {
        species: String,
        tip_z_max: f64,
        a: f64,
        b: f64,
        pyramid_z_max: f64,
        side: f64,
    },
    Graphene(GrapheneShape),
}

impl ShapeSpec {
    /// Species of the outermost region, the one alloy doping applies to.
    pub fn base_species(&self) -> &str {
        match self {
            ShapeSpec::Sphere { species, .. }
            | ShapeSpec::Rod { species, .. }
            | ShapeSpec::Tip { species, .. }
            | ShapeSpec::Pyramid { species, .. }
            | ShapeSpec::Cone { species, .. }
            | ShapeSpec::Bipyramid { species, .. }
            | ShapeSpec::Microscope { species, .. } => species,
            ShapeSpec::CoreShellSphere { shell_species, .. }
            | ShapeSpec::CoreShellRod { shell_species, .. }
            | ShapeSpec::Pencil { shell_species, .. } => shell_species,
            ShapeSpec::Graphene(_) => GRAPHENE_SPECIES,
        }
    }

    /// Shapes whose geometry is anchored at `z = 0` rather than centered on the origin.
    pub fn is_apex_anchored(&self) -> bool {
        matches!(
            self,
            ShapeSpec::Tip { .. }
                | ShapeSpec::Pyramid { .. }
                | ShapeSpec::Cone { .. }
                | ShapeSpec::Microscope { .. }
        )
    }

    pub fn is_graphene(&self) -> bool {
        matches!(self, ShapeSpec::Graphene(_))
    }

    /// Shapes built from a core region and a shell region of a second species.
    pub fn is_core_shell(&self) -> bool {
        matches!(
            self,
            ShapeSpec::CoreShellSphere { .. }
                | ShapeSpec::CoreShellRod { .. }
                | ShapeSpec::Pencil { .. }
        )
    }

    fn validate(&self, table: &SpeciesTable) -> Result<(), EngineError> {
        match self {
            ShapeSpec::Sphere { species, radius } => {
                require_bulk_species(table, species)?;
                Sphere::new(Point3::origin(), *radius)?;
            }
            ShapeSpec::Rod {
                species,
                axis,
                length,
                width,
            } => {
                require_bulk_species(table, species)?;
                Rod::new(*axis, *length, *width)?;
            }
            ShapeSpec::CoreShellSphere {
                core_species,
                core_radius,
                shell_species,
                shell_radius,
            } => {
                require_distinct_core_shell(table, core_species, shell_species)?;
                Sphere::new(Point3::origin(), *core_radius)?;
                Sphere::new(Point3::origin(), *shell_radius)?;
                if core_radius >= shell_radius {
                    return Err(EngineError::InvalidShapeParameters {
                        shape: "core-shell sphere",
                        reason: format!(
                            "shell radius ({}) must be greater than core radius ({})",
                            shell_radius, core_radius
                        ),
                    });
                }
            }
            ShapeSpec::CoreShellRod {
                axis,
                core_species,
                core_length,
                core_width,
                shell_species,
                shell_length,
                shell_width,
            } => {
                require_distinct_core_shell(table, core_species, shell_species)?;
                Rod::new(*axis, *core_length, *core_width)?;
                Rod::new(*axis, *shell_length, *shell_width)?;
                if core_length >= shell_length || core_width >= shell_width {
                    return Err(EngineError::InvalidShapeParameters {
                        shape: "core-shell rod",
                        reason: format!(
                            "core ({} x {}) must be smaller than shell ({} x {}) in both length and width",
                            core_length, core_width, shell_length, shell_width
                        ),
                    });
                }
            }
            ShapeSpec::Tip { species, z_max, a, b } => {
                require_bulk_species(table, species)?;
                EllipticParaboloid::tip(*a, *b, *z_max)?;
            }
            ShapeSpec::Pyramid { species, z_max, side } => {
                require_bulk_species(table, species)?;
                SquarePyramid::new(*side, *z_max)?;
            }
            ShapeSpec::Cone {
                species,
                z_max,
                radius,
            } => {
                require_bulk_species(table, species)?;
                Cone::new(*radius, *z_max)?;
            }
            ShapeSpec::Bipyramid {
                species,
                width,
                length,
            } => {
                require_bulk_species(table, species)?;
                Bipyramid::new(*width, *length)?;
            }
            ShapeSpec::Pencil {
                core_species,
                shell_species,
                width,
                core_length,
                shell_length,
                ..
            } => {
                require_distinct_core_shell(table, core_species, shell_species)?;
                Bipyramid::new(*width, *core_length)?;
                if !(shell_length.is_finite() && shell_length >= core_length) {
                    return Err(EngineError::InvalidShapeParameters {
                        shape: "pencil",
                        reason: format!(
                            "shell length ({}) must be at least the core length ({})",
                            shell_length, core_length
                        ),
                    });
                }
            }
            ShapeSpec::Microscope {
                species,
                tip_z_max,
                a,
                b,
                pyramid_z_max,
                side,
            } => {
                require_bulk_species(table, species)?;
                EllipticParaboloid::tip(*a, *b, *tip_z_max)?;
                SquarePyramid::new(*side, *pyramid_z_max)?;
            }
            ShapeSpec::Graphene(shape) => {
                let params = table.get(GRAPHENE_SPECIES).ok_or_else(|| {
                    EngineError::UnsupportedSpecies {
                        species: GRAPHENE_SPECIES.to_string(),
                        reason: "graphene carbon is missing from the species table".to_string(),
                    }
                })?;
                if params.packing != Packing::Honeycomb {
                    return Err(EngineError::UnsupportedSpecies {
                        species: GRAPHENE_SPECIES.to_string(),
                        reason: format!("graphene requires honeycomb packing, found {}", params.packing),
                    });
                }
                match shape {
                    GrapheneShape::Ribbon { x_length, y_length } => {
                        Ribbon::new(*x_length, *y_length)?;
                    }
                    GrapheneShape::Disk { radius } => {
                        Disk::new(*radius)?;
                    }
                    GrapheneShape::Ring {
                        outer_radius,
                        inner_radius,
                    } => {
                        Ring::new(*outer_radius, *inner_radius)?;
                    }
                    GrapheneShape::Triangle { edge, side } => {
                        Triangle::new(*edge, *side)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn require_bulk_species(table: &SpeciesTable, species: &str) -> Result<(), EngineError> {
    let params = table
        .get(species)
        .ok_or_else(|| EngineError::UnsupportedSpecies {
            species: species.to_string(),
            reason: "not present in the species table".to_string(),
        })?;
    match params.packing {
        Packing::Fcc | Packing::Bcc => Ok(()),
        other => Err(EngineError::UnsupportedSpecies {
            species: species.to_string(),
            reason: format!(
                "only FCC and BCC metals can be built into this shape, found {}",
                other
            ),
        }),
    }
}

fn require_distinct_core_shell(
    table: &SpeciesTable,
    core: &str,
    shell: &str,
) -> Result<(), EngineError> {
    require_bulk_species(table, core)?;
    require_bulk_species(table, shell)?;
    if core.eq_ignore_ascii_case(shell) {
        return Err(EngineError::UnsupportedSpecies {
            species: core.to_string(),
            reason: "core and shell species must differ".to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlloySpec {
    pub species: String,
    /// Percentage of atoms to relabel, strictly between 0 and 100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssemblySpec {
    /// Two copies of the structure separated along `axis`.
    Dimer {
        axis: SignedAxis,
        distances: Vec<f64>,
    },
    /// Two copies facing apex to apex along `z`.
    Bowtie { distances: Vec<f64> },
}

impl AssemblySpec {
    pub fn distances(&self) -> &[f64] {
        match self {
            AssemblySpec::Dimer { distances, .. } | AssemblySpec::Bowtie { distances } => {
                distances
            }
        }
    }
}

/// A complete request to build one structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub shape: ShapeSpec,
    pub alloy: Option<AlloySpec>,
    pub assembly: Option<AssemblySpec>,
    /// Overrides the default species nearest-neighbor distance used when combining regions.
    pub cutoff: Option<f64>,
    /// Seed for alloy doping. Doping draws from system entropy when unset.
    pub seed: Option<u64>,
    pub solver: SolverConfig,
}

impl Recipe {
    /// Checks every parameter of the recipe before any structure is generated.
    pub fn validate(&self, table: &SpeciesTable) -> Result<(), EngineError> {
        self.shape.validate(table)?;

        if let Some(alloy) = &self.alloy {
            if !(alloy.percent.is_finite() && alloy.percent > 0.0 && alloy.percent < 100.0) {
                return Err(EngineError::InvalidAlloyRequest {
                    reason: format!(
                        "percentage must lie strictly between 0 and 100 (got {})",
                        alloy.percent
                    ),
                });
            }
            if !table.contains(&alloy.species) {
                return Err(EngineError::InvalidAlloyRequest {
                    reason: format!("unknown alloy species '{}'", alloy.species),
                });
            }
            if alloy.species.eq_ignore_ascii_case(self.shape.base_species()) {
                return Err(EngineError::InvalidAlloyRequest {
                    reason: format!(
                        "alloy species '{}' matches the species it would replace",
                        alloy.species
                    ),
                });
            }
        }

        if let Some(assembly) = &self.assembly {
            validate_distances(assembly.distances())?;
            if matches!(assembly, AssemblySpec::Bowtie { .. }) && !self.shape.is_apex_anchored() {
                return Err(EngineError::InvalidShapeParameters {
                    shape: "bowtie",
                    reason: "bowties can only be built from tip, pyramid, cone or microscope shapes"
                        .to_string(),
                });
            }
        }

        if let Some(cutoff) = self.cutoff {
            if !(cutoff.is_finite() && cutoff > 0.0) {
                return Err(EngineError::InvalidShapeParameters {
                    shape: "combination",
                    reason: format!("cutoff must be a positive finite number (got {})", cutoff),
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_distances(distances: &[f64]) -> Result<(), EngineError> {
    if distances.is_empty() {
        return Err(EngineError::InvalidDistanceTargets(
            "at least one distance is required".to_string(),
        ));
    }
    if let Some(bad) = distances.iter().find(|d| !(d.is_finite() && **d > 0.0)) {
        return Err(EngineError::InvalidDistanceTargets(format!(
            "distances must be positive finite numbers (got {})",
            bad
        )));
    }
    Ok(())
}

#[derive(Default)]
pub struct RecipeBuilder {
    shape: Option<ShapeSpec>,
    alloy: Option<AlloySpec>,
    assembly: Option<AssemblySpec>,
    cutoff: Option<f64>,
    seed: Option<u64>,
    solver: Option<SolverConfig>,
}

impl RecipeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, shape: ShapeSpec) -> Self {
        self.shape = Some(shape);
        self
    }
    pub fn alloy(mut self, alloy: Option<AlloySpec>) -> Self {
        self.alloy = alloy;
        self
    }
    pub fn assembly(mut self, assembly: Option<AssemblySpec>) -> Self {
        self.assembly = assembly;
        self
    }
    pub fn cutoff(mut self, cutoff: Option<f64>) -> Self {
        self.cutoff = cutoff;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn build(self) -> Result<Recipe, ConfigError> {
        Ok(Recipe {
            shape: self.shape.ok_or(ConfigError::MissingParameter("shape"))?,
            alloy: self.alloy,
            assembly: self.assembly,
            cutoff: self.cutoff,
            seed: self.seed,
            solver: self.solver.unwrap_or_default(),
        })
    }
}
