use crate::core::io::report::DistanceRecord;
use crate::core::lattice;
use crate::core::models::axis::{Axis, SignedAxis};
use crate::core::models::cloud::PointCloud;
use crate::core::shapes::{
    Bipyramid, Clipped, Cone, Cylinder, Disk, EllipticParaboloid, Ribbon, Ring, Rod,
    ShapePredicate, Sphere, SquarePyramid, Triangle, carve,
};
use crate::core::species::{SpeciesParams, SpeciesTable};
use crate::engine::alloy;
use crate::engine::cleanup;
use crate::engine::combine;
use crate::engine::config::{
    AlloySpec, AssemblySpec, GRAPHENE_SPECIES, GrapheneShape, PencilShell, Recipe, ShapeSpec,
};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::solver;
use crate::engine::transform;
use nalgebra::{Point3, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument};

/// One finished structure and the file stem it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedStructure {
    pub name: String,
    pub cloud: PointCloud,
    /// Requested and achieved separation, for dimer and bowtie output.
    pub separation: Option<DistanceRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResult {
    pub structures: Vec<NamedStructure>,
}

/// Carved regions of a recipe, kept apart until the combination stage.
struct Pieces {
    body: PointCloud,
    /// Region merged onto `body`: the shell source of a core-shell particle or the
    /// pyramid capping a microscope tip.
    attachment: Option<Attachment>,
}

struct Attachment {
    cloud: PointCloud,
    cutoff: f64,
}

impl Pieces {
    fn single(body: PointCloud) -> Self {
        Self {
            body,
            attachment: None,
        }
    }

    fn with_attachment(body: PointCloud, cloud: PointCloud, cutoff: f64) -> Self {
        Self {
            body,
            attachment: Some(Attachment { cloud, cutoff }),
        }
    }

    /// Moves the body's centroid onto the origin, carrying the attachment along.
    fn recenter(&mut self) {
        let shift = transform::recenter(&mut self.body);
        if let Some(attachment) = &mut self.attachment {
            transform::translate(&mut attachment.cloud, &shift);
        }
    }

    fn combine(self) -> PointCloud {
        match self.attachment {
            None => self.body,
            Some(attachment) => combine::union(&self.body, &attachment.cloud, attachment.cutoff),
        }
    }
}

#[instrument(skip_all, name = "create_workflow")]
pub fn run(
    recipe: &Recipe,
    species: &SpeciesTable,
    reporter: &ProgressReporter,
) -> Result<CreateResult, EngineError> {
    recipe.validate(species)?;
    let base_name = structure_name(recipe);
    info!(name = %base_name, "Building structure.");

    let mut rng = match recipe.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut pieces = reporter.stage("Carving shape", || carve_pieces(recipe, species))?;

    if recipe.shape.is_graphene() {
        let params = lookup(species, GRAPHENE_SPECIES)?;
        let (cleaned, report) = reporter.stage("Cleaning boundaries", || {
            cleanup::clean(&pieces.body, cleanup::default_cutoff(&params))
        })?;
        info!(
            passes = report.passes,
            removed = report.removed,
            "Boundary cleanup finished."
        );
        reporter.report(Progress::Message(format!(
            "Removed {} dangling atom(s) in {} pass(es)",
            report.removed, report.passes
        )));
        pieces.body = require_atoms(cleaned, "boundary cleanup")?;
    }

    if !recipe.shape.is_apex_anchored() {
        pieces.recenter();
    }

    if let Some(spec) = &recipe.alloy {
        reporter.stage("Doping alloy", || dope_pieces(&mut pieces, recipe, spec, &mut rng))?;
    }

    let structure = if pieces.attachment.is_some() {
        let combined = reporter.stage("Combining regions", || {
            require_atoms(pieces.combine(), "region combination")
        })?;
        reporter.report(Progress::Message(format!(
            "Combined regions into {} atoms",
            combined.len()
        )));
        combined
    } else {
        pieces.body
    };

    let structures = match &recipe.assembly {
        None => vec![NamedStructure {
            name: base_name,
            cloud: structure,
            separation: None,
        }],
        Some(assembly) => reporter.stage("Assembling pair", || {
            assemble(recipe, assembly, &structure, &base_name, reporter)
        })?,
    };

    info!(count = structures.len(), "Create workflow complete.");
    Ok(CreateResult { structures })
}

fn lookup(table: &SpeciesTable, species: &str) -> Result<SpeciesParams, EngineError> {
    table
        .get(species)
        .ok_or_else(|| EngineError::UnsupportedSpecies {
            species: species.to_string(),
            reason: "not present in the species table".to_string(),
        })
}

fn require_atoms(cloud: PointCloud, stage: &'static str) -> Result<PointCloud, EngineError> {
    if cloud.is_empty() {
        Err(EngineError::EmptyStructure { stage })
    } else {
        Ok(cloud)
    }
}

/// Fills the shape's bounding box with bulk lattice and keeps the atoms inside the shape.
fn carve_from_bulk(
    table: &SpeciesTable,
    species: &str,
    shape: &dyn ShapePredicate,
) -> Result<PointCloud, EngineError> {
    let params = lookup(table, species)?;
    let bulk = lattice::bulk(species, &params, &shape.extent())?;
    require_atoms(carve(&bulk, shape), "carving")
}

fn dope(
    cloud: &mut PointCloud,
    spec: &AlloySpec,
    rng: &mut StdRng,
) -> Result<(), EngineError> {
    let replaced = alloy::dope(cloud, &spec.species, spec.percent, rng)?;
    info!(species = %spec.species, replaced = replaced.len(), "Alloy doping applied.");
    Ok(())
}

/// Core-shell particles dope only their shell; every other region is doped on its own.
fn dope_pieces(
    pieces: &mut Pieces,
    recipe: &Recipe,
    spec: &AlloySpec,
    rng: &mut StdRng,
) -> Result<(), EngineError> {
    if !recipe.shape.is_core_shell() {
        dope(&mut pieces.body, spec, rng)?;
    }
    if let Some(attachment) = &mut pieces.attachment {
        dope(&mut attachment.cloud, spec, rng)?;
    }
    Ok(())
}

/// Overlap cutoff for combining two regions: the recipe override, or the larger
/// nearest-neighbor distance of the two species.
fn region_cutoff(
    recipe: &Recipe,
    table: &SpeciesTable,
    first: &str,
    second: &str,
) -> Result<f64, EngineError> {
    match recipe.cutoff {
        Some(cutoff) => Ok(cutoff),
        None => Ok(lookup(table, first)?
            .nearest_neighbor
            .max(lookup(table, second)?.nearest_neighbor)),
    }
}

struct Region<'a> {
    species: &'a str,
    shape: &'a dyn ShapePredicate,
}

fn carve_core_shell(
    recipe: &Recipe,
    table: &SpeciesTable,
    core: Region,
    shell: Region,
) -> Result<Pieces, EngineError> {
    let cutoff = region_cutoff(recipe, table, core.species, shell.species)?;
    Ok(Pieces::with_attachment(
        carve_from_bulk(table, core.species, core.shape)?,
        carve_from_bulk(table, shell.species, shell.shape)?,
        cutoff,
    ))
}

fn carve_pieces(recipe: &Recipe, table: &SpeciesTable) -> Result<Pieces, EngineError> {
    let carved = match &recipe.shape {
        ShapeSpec::Sphere { species, radius } => {
            carve_from_bulk(table, species, &Sphere::new(Point3::origin(), *radius)?)?
        }
        ShapeSpec::Rod {
            species,
            axis,
            length,
            width,
        } => carve_from_bulk(table, species, &Rod::new(*axis, *length, *width)?)?,
        ShapeSpec::CoreShellSphere {
            core_species,
            core_radius,
            shell_species,
            shell_radius,
        } => {
            return carve_core_shell(
                recipe,
                table,
                Region {
                    species: core_species,
                    shape: &Sphere::new(Point3::origin(), *core_radius)?,
                },
                Region {
                    species: shell_species,
                    shape: &Sphere::new(Point3::origin(), *shell_radius)?,
                },
            );
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
            return carve_core_shell(
                recipe,
                table,
                Region {
                    species: core_species,
                    shape: &Rod::new(*axis, *core_length, *core_width)?,
                },
                Region {
                    species: shell_species,
                    shape: &Rod::new(*axis, *shell_length, *shell_width)?,
                },
            );
        }
        ShapeSpec::Bipyramid {
            species,
            width,
            length,
        } => carve_from_bulk(table, species, &Bipyramid::new(*width, *length)?)?,
        ShapeSpec::Pencil {
            core_species,
            shell_species,
            shell,
            width,
            core_length,
            shell_length,
        } => {
            let core = Bipyramid::new(*width, *core_length)?;
            let casing = Cylinder::new(Axis::Z, core.circumradius(), *shell_length)?;
            let casing: Box<dyn ShapePredicate> = match shell {
                PencilShell::Full => Box::new(casing),
                PencilShell::Half => Box::new(Clipped::below(casing, 0.0)?),
            };
            return carve_core_shell(
                recipe,
                table,
                Region {
                    species: core_species,
                    shape: &core,
                },
                Region {
                    species: shell_species,
                    shape: casing.as_ref(),
                },
            );
        }
        ShapeSpec::Tip { species, z_max, a, b } => {
            carve_from_bulk(table, species, &EllipticParaboloid::tip(*a, *b, *z_max)?)?
        }
        ShapeSpec::Pyramid { species, z_max, side } => {
            carve_from_bulk(table, species, &SquarePyramid::new(*side, *z_max)?)?
        }
        ShapeSpec::Cone {
            species,
            z_max,
            radius,
        } => carve_from_bulk(table, species, &Cone::new(*radius, *z_max)?)?,
        ShapeSpec::Microscope {
            species,
            tip_z_max,
            a,
            b,
            pyramid_z_max,
            side,
        } => {
            let tip = carve_from_bulk(table, species, &EllipticParaboloid::tip(*a, *b, *tip_z_max)?)?;
            let mut pyramid =
                carve_from_bulk(table, species, &SquarePyramid::new(*side, *pyramid_z_max)?)?;
            // Invert the pyramid so its base caps the wide end of the tip.
            transform::rotate(&mut pyramid, SignedAxis::positive(Axis::X), 180.0);
            transform::translate(&mut pyramid, &Vector3::new(0.0, 0.0, *tip_z_max));

            let cutoff = region_cutoff(recipe, table, species, species)?;
            return Ok(Pieces::with_attachment(tip, pyramid, cutoff));
        }
        ShapeSpec::Graphene(shape) => {
            let predicate: Box<dyn ShapePredicate> = match shape {
                GrapheneShape::Ribbon { x_length, y_length } => {
                    Box::new(Ribbon::new(*x_length, *y_length)?)
                }
                GrapheneShape::Disk { radius } => Box::new(Disk::new(*radius)?),
                GrapheneShape::Ring {
                    outer_radius,
                    inner_radius,
                } => Box::new(Ring::new(*outer_radius, *inner_radius)?),
                GrapheneShape::Triangle { edge, side } => Box::new(Triangle::new(*edge, *side)?),
            };
            carve_from_bulk(table, GRAPHENE_SPECIES, predicate.as_ref())?
        }
    };
    Ok(Pieces::single(carved))
}

/// Axis along which the second half of a bowtie is pushed away from the first.
fn bowtie_axis(shape: &ShapeSpec) -> SignedAxis {
    match shape {
        ShapeSpec::Pyramid { .. } => SignedAxis::positive(Axis::Z),
        _ => SignedAxis::negative(Axis::Z),
    }
}

fn assemble(
    recipe: &Recipe,
    assembly: &AssemblySpec,
    structure: &PointCloud,
    base_name: &str,
    reporter: &ProgressReporter,
) -> Result<Vec<NamedStructure>, EngineError> {
    let (kind, axis, partner) = match assembly {
        AssemblySpec::Dimer { axis, .. } => ("dimer", *axis, structure.clone()),
        AssemblySpec::Bowtie { .. } => {
            let mut flipped = structure.clone();
            transform::rotate(&mut flipped, SignedAxis::positive(Axis::X), 180.0);
            ("bowtie", bowtie_axis(&recipe.shape), flipped)
        }
    };

    let placements = solver::solve(
        structure,
        partner,
        axis,
        assembly.distances(),
        &recipe.solver,
        reporter,
    )?;

    Ok(placements
        .into_iter()
        .map(|placement| NamedStructure {
            name: format!(
                "{}_{}_{}_d_{:.2}",
                base_name,
                kind,
                axis,
                round_up_hundredths(placement.target)
            ),
            cloud: combine::concat(structure, &placement.structure),
            separation: Some(DistanceRecord::new(placement.target, placement.achieved)),
        })
        .collect())
}

fn round_up_hundredths(value: f64) -> f64 {
    (value * 100.0).ceil() / 100.0
}

/// Formats a dimension the way it appears in output file names, always with a decimal point.
fn dim(value: f64) -> String {
    format!("{:?}", value)
}

/// File stem for the structure a recipe produces, before any assembly suffix.
pub fn structure_name(recipe: &Recipe) -> String {
    let shape = match &recipe.shape {
        ShapeSpec::Sphere { radius, .. } => format!("sphere_r_{}", dim(*radius)),
        ShapeSpec::Rod {
            axis,
            length,
            width,
            ..
        } => format!(
            "rod_{}_l_{}_w_{}",
            axis.label().to_uppercase(),
            dim(*length),
            dim(*width)
        ),
        ShapeSpec::CoreShellSphere {
            core_species,
            core_radius,
            shell_species,
            shell_radius,
        } => format!(
            "sphere_core_{}_r_{}_shell_{}_r_{}",
            core_species,
            dim(*core_radius),
            shell_species,
            dim(*shell_radius)
        ),
        ShapeSpec::CoreShellRod {
            core_species,
            core_length,
            core_width,
            shell_species,
            shell_length,
            shell_width,
            ..
        } => format!(
            "rod_core_{}_L_{}_R_{}_shell_{}_L_{}_R_{}",
            core_species,
            dim(*core_length),
            dim(*core_width),
            shell_species,
            dim(*shell_length),
            dim(*shell_width)
        ),
        ShapeSpec::Tip { z_max, a, b, .. } => format!(
            "elliptic_paraboloid_a-{}_b-{}_zmin-0.0_zmax-{}",
            dim(*a),
            dim(*b),
            dim(*z_max)
        ),
        ShapeSpec::Pyramid { z_max, side, .. } => format!(
            "pyramid_length-{}_zmin-0.0_zmax-{}",
            dim(*side),
            dim(*z_max)
        ),
        ShapeSpec::Cone { z_max, radius, .. } => format!(
            "cone_radius-{}_zmin-0.0_zmax-{}",
            dim(*radius),
            dim(*z_max)
        ),
        ShapeSpec::Bipyramid { width, length, .. } => {
            format!("bipyramid_w_{}_l_{}", dim(*width), dim(*length))
        }
        ShapeSpec::Pencil {
            core_species,
            shell_species,
            shell,
            width,
            core_length,
            shell_length,
        } => format!(
            "pencil_core_{}_w_{}_l_{}_{}_{}_l_{}",
            core_species,
            dim(*width),
            dim(*core_length),
            shell,
            shell_species,
            dim(*shell_length)
        ),
        ShapeSpec::Microscope {
            tip_z_max,
            a,
            b,
            pyramid_z_max,
            side,
            ..
        } => format!(
            "microscope_parabola_{}_{}_{}_pyramid_{}_{}",
            dim(*tip_z_max),
            dim(*a),
            dim(*b),
            dim(*pyramid_z_max),
            dim(*side)
        ),
        ShapeSpec::Graphene(GrapheneShape::Ribbon { x_length, y_length }) => {
            format!("graphene_ribbon_{}_{}", dim(*x_length), dim(*y_length))
        }
        ShapeSpec::Graphene(GrapheneShape::Disk { radius }) => {
            format!("graphene_disk_{}", dim(*radius))
        }
        ShapeSpec::Graphene(GrapheneShape::Ring {
            outer_radius,
            inner_radius,
        }) => format!(
            "graphene_ring_Out_{}_In_{}",
            dim(*outer_radius),
            dim(*inner_radius)
        ),
        ShapeSpec::Graphene(GrapheneShape::Triangle { edge, side }) => {
            format!("graphene_triangle_{}_{}", edge, dim(*side))
        }
    };

    match &recipe.alloy {
        Some(alloy) => format!("{}_alloy_{}_{:.2}_perc", shape, alloy.species, alloy.percent),
        None => shape,
    }
}
