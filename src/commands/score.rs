use anyhow::Result;
use tracing::info;

use crate::cli::{Cli, ScoreArgs};
use crate::common::{assert_not_stdout, check_overwrite};
use crate::io::write_geojson;
use crate::pipeline::{run_job, DemandSource, FieldNames, ScoreJob};
use crate::settings::Settings;

pub fn run(_cli: &Cli, args: &ScoreArgs) -> Result<()> {
    // Fail before any scoring work if the output can't be written.
    assert_not_stdout(&args.output)?;
    check_overwrite(&args.output, args.force)?;

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let demand = match (&args.demand, &args.population) {
        (Some(path), _) => DemandSource::Points(path.clone()),
        (None, Some(path)) => DemandSource::Population(path.clone()),
        (None, None) => anyhow::bail!("one of --demand or --population is required"),
    };

    let job = ScoreJob {
        units: args.units.clone(),
        demand,
        supply: args.supply.clone(),
        layers: args.layers.clone(),
        settings,
        projection: args.project,
        fields: FieldNames {
            name: args.name_field.clone(),
            population: args.population_field.clone(),
            capacity: args.capacity_field.clone(),
            weight: args.weight_field.clone(),
            table_name: args.table_name_column.clone(),
            table_total: args.table_total_column.clone(),
        },
    };

    let scored = run_job(&job)?;
    write_geojson(&args.output, &scored, args.force)?;

    info!(units = scored.features.len(), output = %args.output.display(), "scoring complete");
    println!("Wrote {} with {} scored units.", args.output.display(), scored.features.len());
    Ok(())
}
