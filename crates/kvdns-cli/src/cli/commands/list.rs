//! `kvdns list` - owner names per record type.

use anyhow::Result;
use colored::Colorize;
use kvdns_core::RecordType;
use std::collections::{BTreeMap, BTreeSet};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::ListArgs;
use crate::output::OutputFormat;

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "Type")]
    rtype: RecordType,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn execute(ctx: &Context, args: &ListArgs) -> Result<()> {
    let listing = ctx.backend()?.list(&args.types).await?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Pretty => print_list_pretty(&listing),
    }

    Ok(())
}

fn print_list_pretty(listing: &BTreeMap<RecordType, BTreeSet<String>>) {
    let rows: Vec<ListRow> = listing
        .iter()
        .flat_map(|(&rtype, names)| {
            names.iter().map(move |name| ListRow {
                rtype,
                name: name.clone(),
            })
        })
        .collect();

    if rows.is_empty() {
        println!("{}", "No records".dimmed());
        return;
    }

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("{} {}", "Records:".bold(), rows.len().to_string().cyan());
}
