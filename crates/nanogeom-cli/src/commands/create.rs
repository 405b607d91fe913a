use super::{progress_handler, write_report, write_structure};
use crate::cli::CreateArgs;
use crate::config::PartialRecipeConfig;
use crate::error::Result;
use nanogeom::core::io::report::DistanceRecord;
use nanogeom::engine::progress::ProgressReporter;
use nanogeom::workflows::create::{self, structure_name};
use tracing::info;

pub fn run(args: CreateArgs, quiet: bool) -> Result<()> {
    let partial_config = PartialRecipeConfig::from_file(&args.config)?;
    info!("Merging recipe from file and CLI arguments...");
    let (recipe, species) = partial_config.merge_with_cli(&args)?;

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building {}...", structure_name(&recipe));
    let result = create::run(&recipe, &species, &reporter)?;

    info!(
        "Workflow finished, received {} structure(s).",
        result.structures.len()
    );

    let mut records: Vec<DistanceRecord> = Vec::new();
    for structure in &result.structures {
        let path = write_structure(&args.output_dir, &structure.name, &structure.cloud)?;
        match &structure.separation {
            Some(record) => {
                println!(
                    "✓ {} atoms at d = {:.4} Å written to: {}",
                    structure.cloud.len(),
                    record.achieved,
                    path.display()
                );
                records.push(*record);
            }
            None => println!(
                "✓ {} atoms written to: {}",
                structure.cloud.len(),
                path.display()
            ),
        }
    }

    if !records.is_empty() {
        let path = write_report(&args.output_dir, &structure_name(&recipe), &records)?;
        println!("  Distance report written to: {}", path.display());
    }

    Ok(())
}
