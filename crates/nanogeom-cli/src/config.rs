use crate::cli::CreateArgs;
use crate::error::{CliError, Result};
use nanogeom::core::models::axis::{Axis, SignedAxis};
use nanogeom::core::shapes::EdgeType;
use nanogeom::core::species::SpeciesTable;
use nanogeom::engine::config::{
    AlloySpec, AssemblySpec, GrapheneShape, PencilShell, Recipe, RecipeBuilder, ShapeSpec,
    SolverConfigBuilder,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The `[shape]` table of a recipe, selected by its `type` key.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum ShapeTable {
    Sphere {
        species: String,
        radius: f64,
    },
    Rod {
        species: String,
        #[serde(default = "default_axis")]
        axis: String,
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
        #[serde(default = "default_axis")]
        axis: String,
        core_species: String,
        core_length: f64,
        core_width: f64,
        shell_species: String,
        shell_length: f64,
        shell_width: f64,
    },
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
    Bipyramid {
        species: String,
        width: f64,
        length: f64,
    },
    Pencil {
        core_species: String,
        shell_species: String,
        /// `full` or `half`.
        shell_type: String,
        width: f64,
        core_length: f64,
        shell_length: f64,
    },
    Microscope {
        species: String,
        tip_z_max: f64,
        a: f64,
        b: f64,
        pyramid_z_max: f64,
        side: f64,
    },
    GrapheneRibbon {
        x_length: f64,
        y_length: f64,
    },
    GrapheneDisk {
        radius: f64,
    },
    GrapheneRing {
        outer_radius: f64,
        inner_radius: f64,
    },
    GrapheneTriangle {
        edge: String,
        side: f64,
    },
}

fn default_axis() -> String {
    "z".to_string()
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialAlloyConfig {
    pub species: Option<String>,
    pub percent: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AssemblyTable {
    Dimer {
        #[serde(default = "default_dimer_axis")]
        axis: String,
        distances: Vec<f64>,
    },
    Bowtie {
        distances: Vec<f64>,
    },
}

fn default_dimer_axis() -> String {
    "+x".to_string()
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialSolverConfig {
    pub tolerance: Option<f64>,
    pub fine_step: Option<f64>,
    pub min_separation: Option<f64>,
    pub max_fine_steps: Option<usize>,
}

/// A recipe as read from TOML, before command-line overrides are applied.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialRecipeConfig {
    pub cutoff: Option<f64>,
    pub seed: Option<u64>,
    pub species_file: Option<PathBuf>,
    pub shape: Option<ShapeTable>,
    pub alloy: Option<PartialAlloyConfig>,
    pub assembly: Option<AssemblyTable>,
    pub solver: Option<PartialSolverConfig>,
}

impl PartialRecipeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::file(path, e))?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::file(path, e))?;

        // A relative species file is resolved against the recipe's own directory.
        if let (Some(species_file), Some(dir)) = (config.species_file.as_mut(), path.parent()) {
            if species_file.is_relative() {
                *species_file = dir.join(&*species_file);
            }
        }
        Ok(config)
    }

    /// Applies command-line overrides and resolves the recipe and species table.
    pub fn merge_with_cli(mut self, args: &CreateArgs) -> Result<(Recipe, SpeciesTable)> {
        self.apply_set_values(&args.set_values)?;

        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if let Some(path) = &args.species_file {
            self.species_file = Some(path.clone());
        }

        let species = match &self.species_file {
            Some(path) => {
                SpeciesTable::load_overrides(path).map_err(|e| CliError::file(path.clone(), e))?
            }
            None => SpeciesTable::builtin(),
        };

        let recipe = self.build_recipe()?;
        Ok((recipe, species))
    }

    fn build_recipe(self) -> Result<Recipe> {
        let shape = self
            .shape
            .ok_or_else(|| CliError::Config("Missing required [shape] table".to_string()))?;

        let alloy = self
            .alloy
            .map(|alloy| -> Result<AlloySpec> {
                Ok(AlloySpec {
                    species: alloy.species.ok_or_else(|| {
                        CliError::Config("Missing required parameter: alloy.species".to_string())
                    })?,
                    percent: alloy.percent.ok_or_else(|| {
                        CliError::Config("Missing required parameter: alloy.percent".to_string())
                    })?,
                })
            })
            .transpose()?;

        let assembly = self.assembly.map(convert_assembly).transpose()?;

        let solver = self.solver.unwrap_or_default();
        let mut solver_builder = SolverConfigBuilder::new();
        if let Some(v) = solver.tolerance {
            solver_builder = solver_builder.tolerance(v);
        }
        if let Some(v) = solver.fine_step {
            solver_builder = solver_builder.fine_step(v);
        }
        if let Some(v) = solver.min_separation {
            solver_builder = solver_builder.min_separation(v);
        }
        if let Some(v) = solver.max_fine_steps {
            solver_builder = solver_builder.max_fine_steps(v);
        }
        let solver = solver_builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        RecipeBuilder::new()
            .shape(convert_shape(shape)?)
            .alloy(alloy)
            .assembly(assembly)
            .cutoff(self.cutoff)
            .seed(self.seed)
            .solver(solver)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for set_value in set_values {
            let parts: Vec<&str> = set_value.splitn(2, '=').collect();
            if parts.len() != 2 {
                return Err(CliError::Config(format!(
                    "Invalid format for --set: '{}'. Expected KEY=VALUE.",
                    set_value
                )));
            }
            let key = parts[0].trim();
            let value = parts[1].trim();

            match key {
                "cutoff" => self.cutoff = Some(parse_value(key, value)?),
                "seed" => self.seed = Some(parse_value(key, value)?),
                "alloy.species" => {
                    self.alloy.get_or_insert_with(Default::default).species =
                        Some(value.to_string())
                }
                "alloy.percent" => {
                    self.alloy.get_or_insert_with(Default::default).percent =
                        Some(parse_value(key, value)?)
                }
                "solver.tolerance" => {
                    self.solver.get_or_insert_with(Default::default).tolerance =
                        Some(parse_value(key, value)?)
                }
                "solver.fine-step" => {
                    self.solver.get_or_insert_with(Default::default).fine_step =
                        Some(parse_value(key, value)?)
                }
                "solver.min-separation" => {
                    self.solver.get_or_insert_with(Default::default).min_separation =
                        Some(parse_value(key, value)?)
                }
                "solver.max-fine-steps" => {
                    self.solver.get_or_insert_with(Default::default).max_fine_steps =
                        Some(parse_value(key, value)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_axis(value: &str) -> Result<Axis> {
    value.parse().map_err(|e: nanogeom::core::models::axis::AxisParseError| {
        CliError::Config(e.to_string())
    })
}

fn convert_shape(table: ShapeTable) -> Result<ShapeSpec> {
    let spec = match table {
        ShapeTable::Sphere { species, radius } => ShapeSpec::Sphere { species, radius },
        ShapeTable::Rod {
            species,
            axis,
            length,
            width,
        } => ShapeSpec::Rod {
            species,
            axis: parse_axis(&axis)?,
            length,
            width,
        },
        ShapeTable::CoreShellSphere {
            core_species,
            core_radius,
            shell_species,
            shell_radius,
        } => ShapeSpec::CoreShellSphere {
            core_species,
            core_radius,
            shell_species,
            shell_radius,
        },
        ShapeTable::CoreShellRod {
            axis,
            core_species,
            core_length,
            core_width,
            shell_species,
            shell_length,
            shell_width,
        } => ShapeSpec::CoreShellRod {
            axis: parse_axis(&axis)?,
            core_species,
            core_length,
            core_width,
            shell_species,
            shell_length,
            shell_width,
        },
        ShapeTable::Tip {
            species,
            z_max,
            a,
            b,
        } => ShapeSpec::Tip {
            species,
            z_max,
            a,
            b,
        },
        ShapeTable::Pyramid {
            species,
            z_max,
            side,
        } => ShapeSpec::Pyramid {
            species,
            z_max,
            side,
        },
        ShapeTable::Cone {
            species,
            z_max,
            radius,
        } => ShapeSpec::Cone {
            species,
            z_max,
            radius,
        },
        ShapeTable::Bipyramid {
            species,
            width,
            length,
        } => ShapeSpec::Bipyramid {
            species,
            width,
            length,
        },
        ShapeTable::Pencil {
            core_species,
            shell_species,
            shell_type,
            width,
            core_length,
            shell_length,
        } => ShapeSpec::Pencil {
            core_species,
            shell_species,
            shell: PencilShell::from_str(&shell_type).map_err(|e| CliError::Config(e.to_string()))?,
            width,
            core_length,
            shell_length,
        },
        ShapeTable::Microscope {
            species,
            tip_z_max,
            a,
            b,
            pyramid_z_max,
            side,
        } => ShapeSpec::Microscope {
            species,
            tip_z_max,
            a,
            b,
            pyramid_z_max,
            side,
        },
        ShapeTable::GrapheneRibbon { x_length, y_length } => {
            ShapeSpec::Graphene(GrapheneShape::Ribbon { x_length, y_length })
        }
        ShapeTable::GrapheneDisk { radius } => ShapeSpec::Graphene(GrapheneShape::Disk { radius }),
        ShapeTable::GrapheneRing {
            outer_radius,
            inner_radius,
        } => ShapeSpec::Graphene(GrapheneShape::Ring {
            outer_radius,
            inner_radius,
        }),
        ShapeTable::GrapheneTriangle { edge, side } => {
            let edge =
                EdgeType::from_str(&edge).map_err(|e| CliError::Config(e.to_string()))?;
            ShapeSpec::Graphene(GrapheneShape::Triangle { edge, side })
        }
    };
    Ok(spec)
}

fn convert_assembly(table: AssemblyTable) -> Result<AssemblySpec> {
    match table {
        AssemblyTable::Dimer { axis, distances } => {
            let axis = SignedAxis::from_str(&axis).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(AssemblySpec::Dimer { axis, distances })
        }
        AssemblyTable::Bowtie { distances } => Ok(AssemblySpec::Bowtie { distances }),
    }
}
