use clap::{ArgGroup, Args, Parser, Subcommand};
use nanogeom::core::models::axis::{Axis, SignedAxis};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "nanogeom developers",
    version,
    about = "nanogeom CLI - Build atomistic models of metal nanoparticles, graphene fragments and nanoparticle assemblies, and place structures at controlled separations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a nanostructure (and optionally a dimer or bowtie of it) from a TOML recipe.
    Create(CreateArgs),
    /// Place a second structure at one or more controlled distances from a first one.
    Separate(SeparateArgs),
    /// Translate a structure along an axis.
    Translate(TranslateArgs),
    /// Rotate a structure about an axis by one or more angles.
    Rotate(RotateArgs),
    /// Print the minimum interatomic distance between two structures.
    MinDist(PairArgs),
    /// Print the geometric center of a structure.
    Centroid(CentroidArgs),
    /// Move a structure so that its geometric center sits on the origin.
    Center(InputArgs),
    /// Mirror a structure through the plane perpendicular to an axis.
    Mirror(MirrorArgs),
    /// Merge two structures, dropping atoms of the second that collide with the first.
    Merge(MergeArgs),
}

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Path to the recipe file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Directory the generated structures are written to.
    #[arg(short, long, default_value = "results_geom", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Override the species parameter file named in the recipe.
    #[arg(long, value_name = "PATH")]
    pub species_file: Option<PathBuf>,

    /// Override the random seed used for alloy doping.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the recipe file.
    /// Can be used multiple times. Example: -S alloy.percent=25
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `separate` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("targets").required(true).args(["distances", "distances_file"])))]
pub struct SeparateArgs {
    /// Structure that stays in place.
    #[arg(long, required = true, value_name = "PATH")]
    pub fixed: PathBuf,

    /// Structure that is moved along the axis.
    #[arg(long, required = true, value_name = "PATH")]
    pub movable: PathBuf,

    /// Direction the movable structure travels in, e.g. +z or -x.
    #[arg(short, long, default_value = "+z", allow_hyphen_values = true, value_name = "AXIS")]
    pub axis: SignedAxis,

    /// Target minimum distances in Angstroms, comma separated.
    #[arg(short, long, value_delimiter = ',', value_name = "LIST")]
    pub distances: Vec<f64>,

    /// File with one target distance per line.
    #[arg(long, value_name = "PATH")]
    pub distances_file: Option<PathBuf>,

    /// Move the fixed structure's center to the origin first.
    #[arg(long)]
    pub recenter_fixed: bool,

    /// Move the movable structure's center to the origin first.
    #[arg(long)]
    pub recenter_movable: bool,

    /// Convergence tolerance on the reached distance, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Directory the placed structures are written to.
    #[arg(short, long, default_value = "results_geom", value_name = "DIR")]
    pub output_dir: PathBuf,
}

/// Arguments for the `translate` subcommand.
#[derive(Args, Debug)]
pub struct TranslateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Direction of the shift, e.g. +x or -y.
    #[arg(short, long, required = true, allow_hyphen_values = true, value_name = "AXIS")]
    pub axis: SignedAxis,

    /// Shift length in Angstroms.
    #[arg(short, long, required = true, value_name = "FLOAT")]
    pub shift: f64,
}

/// Arguments for the `rotate` subcommand.
#[derive(Args, Debug)]
pub struct RotateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Rotation axis; a negative axis turns the other way, e.g. -y.
    #[arg(short, long, required = true, allow_hyphen_values = true, value_name = "AXIS")]
    pub axis: SignedAxis,

    /// Rotation angles in degrees, comma separated. One file is written per angle.
    #[arg(long, required = true, value_delimiter = ',', value_name = "LIST")]
    pub angles: Vec<f64>,
}

/// Arguments for the `mirror` subcommand.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Axis perpendicular to the mirror plane.
    #[arg(short, long, default_value = "x", value_name = "AXIS")]
    pub axis: Axis,
}

/// Arguments for the `merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    /// Atoms of the second structure closer than this to the first are dropped.
    /// Defaults to the largest nearest-neighbor distance among the first structure's species.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Species parameter file consulted for the default cutoff.
    #[arg(long, value_name = "PATH")]
    pub species_file: Option<PathBuf>,

    /// Path for the merged structure. Defaults to `{first}_{second}_merged.xyz` in the output directory.
    #[arg(short = 'O', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Directory the merged structure is written to.
    #[arg(short, long, default_value = "results_geom", value_name = "DIR")]
    pub output_dir: PathBuf,
}

/// A single structure file plus where to write derived files.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path to the input structure in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Move the structure's center to the origin before operating on it.
    #[arg(long)]
    pub recenter: bool,

    /// Directory derived structures are written to.
    #[arg(short, long, default_value = "results_geom", value_name = "DIR")]
    pub output_dir: PathBuf,
}

/// Arguments for the `centroid` subcommand.
#[derive(Args, Debug)]
pub struct CentroidArgs {
    /// Path to the structure in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Two structure files.
#[derive(Args, Debug)]
pub struct PairArgs {
    /// First structure, in XYZ format.
    #[arg(long, required = true, value_name = "PATH")]
    pub first: PathBuf,

    /// Second structure, in XYZ format.
    #[arg(long, required = true, value_name = "PATH")]
    pub second: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn separate_parses_negative_axis_and_distance_list() {
        let cli = Cli::parse_from([
            "nanogeom", "separate", "--fixed", "a.xyz", "--movable", "b.xyz", "--axis", "-y",
            "--distances", "2.5,5,10",
        ]);
        let Commands::Separate(args) = cli.command else {
            panic!("expected the separate subcommand");
        };
        assert_eq!(args.axis, SignedAxis::negative(Axis::Y));
        assert_eq!(args.distances, vec![2.5, 5.0, 10.0]);
        assert!(!args.recenter_fixed);
    }

    #[test]
    fn separate_requires_some_targets() {
        let result = Cli::try_parse_from([
            "nanogeom", "separate", "--fixed", "a.xyz", "--movable", "b.xyz",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "nanogeom", "center", "-i", "mol.xyz", "-vv", "-j", "2",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(2));
        assert!(matches!(cli.command, Commands::Center(_)));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["nanogeom", "-q", "-v", "centroid", "-i", "mol.xyz"]);
        assert!(result.is_err());
    }
}
