use anyhow::{Context, Result};

use crate::cli::{Cli, RankArgs};
use crate::io::read_geojson;
use crate::summary;

#[inline]
fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

pub fn run(_cli: &Cli, args: &RankArgs) -> Result<()> {
    let collection = read_geojson(&args.scored)?;

    if args.names {
        let names = summary::names(&collection, &args.name_field);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "count": names.len(), "names": names }))?);
        } else {
            names.iter().for_each(|name| println!("{name}"));
        }
        return Ok(());
    }

    let top: Vec<_> = summary::rank(&collection, &args.name_field).into_iter().take(args.top).collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&top).context("Failed to serialize ranking")?);
        return Ok(());
    }

    let width = top.iter().map(|row| row.name.len()).max().unwrap_or(4).max(4);
    println!("{:>4}  {:<width$}  {:>9}  {:>12}  {:>10}  {:>10}", "#", "name", "H_score", "Dem", "Sup", "Acc");
    for (rank, row) in top.iter().enumerate() {
        println!(
            "{:>4}  {:<width$}  {:>9}  {:>12}  {:>10}  {:>10}",
            rank + 1, row.name, cell(row.h_score), cell(row.dem), cell(row.sup), cell(row.acc),
        );
    }
    Ok(())
}
