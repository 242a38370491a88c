use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::geom::Projection;

/// Opportunity scoring for siting new food centres
#[derive(Parser, Debug)]
#[command(name = "hawker", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score evaluation units and write an augmented GeoJSON file
    Score(ScoreArgs),

    /// Print the best-scoring units from a scored GeoJSON file
    Rank(RankArgs),

    /// Create or inspect a settings file
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Parse `name=path` for `--layer`.
fn parse_layer(s: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = s.split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() { return Err("layer name must not be empty".into()) }
    Ok((name.to_string(), PathBuf::from(path)))
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Evaluation units (GeoJSON polygons or points)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub units: PathBuf,

    /// Demand points (GeoJSON) carrying a population property
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "population", required_unless_present = "population")]
    pub demand: Option<PathBuf>,

    /// Census population table (CSV) joined to the units by name
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub population: Option<PathBuf>,

    /// Existing amenities (GeoJSON points)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub supply: PathBuf,

    /// Accessibility layer as NAME=PATH, e.g. mrt=exits.geojson (repeatable)
    #[arg(long = "layer", value_parser = parse_layer)]
    pub layers: Vec<(String, PathBuf)>,

    /// Settings file (JSON); defaults are used if it does not exist
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub settings: Option<PathBuf>,

    /// Reprojection applied to lon/lat inputs before scoring
    #[arg(long, value_enum, default_value_t = Projection::None)]
    pub project: Projection,

    /// Unit property holding the unit name
    #[arg(long, default_value = "SUBZONE_N")]
    pub name_field: String,

    /// Demand property holding population
    #[arg(long, default_value = "population")]
    pub population_field: String,

    /// Supply property holding capacity (missing capacity counts as 1)
    #[arg(long, default_value = "capacity")]
    pub capacity_field: String,

    /// Accessibility property holding point weight (missing weight counts as 1)
    #[arg(long, default_value = "weight")]
    pub weight_field: String,

    /// Population table column with row labels
    #[arg(long, default_value = "Number")]
    pub table_name_column: String,

    /// Population table column with totals
    #[arg(long, default_value = "Total_Total")]
    pub table_total_column: String,

    /// Output GeoJSON file (must be a file path; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Scored GeoJSON file
    #[arg(value_hint = ValueHint::FilePath)]
    pub scored: PathBuf,

    /// Number of units to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub top: usize,

    /// Unit property holding the unit name
    #[arg(long, default_value = "SUBZONE_N")]
    pub name_field: String,

    /// List distinct unit names instead of ranking
    #[arg(long)]
    pub names: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the default settings to a file
    Init {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,

        /// Overwrite if the file exists
        #[arg(long)]
        force: bool,
    },

    /// Validate a settings file and print the effective settings
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
}
