//! `kvdns delete` - remove a record.

use anyhow::Result;
use colored::Colorize;
use kvdns_core::normalize_name;
use serde_json::json;

use super::Context;
use crate::cli::args::RecordArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: &Context, args: &RecordArgs) -> Result<()> {
    let backend = ctx.backend()?;
    let existed = backend.delete(args.rtype, &args.name).await?;
    let name = normalize_name(&args.name);

    match ctx.output_format {
        OutputFormat::Json => {
            let out = json!({ "name": name, "type": args.rtype, "deleted": existed });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty => {
            if existed {
                println!("{} {} {}", "Deleted".yellow(), args.rtype, name.bold());
            } else {
                println!("{}", format!("No {} record for {name}", args.rtype).dimmed());
            }
        }
    }

    Ok(())
}
