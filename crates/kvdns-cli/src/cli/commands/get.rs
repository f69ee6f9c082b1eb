//! `kvdns get` - show one record.

use anyhow::{bail, Result};
use colored::Colorize;
use kvdns_core::normalize_name;
use kvdns_srv::api::record_body;
use serde_json::json;

use super::Context;
use crate::cli::args::RecordArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: &Context, args: &RecordArgs) -> Result<()> {
    let backend = ctx.backend()?;
    let name = normalize_name(&args.name);

    let Some(value) = backend.get(args.rtype, &name).await? else {
        bail!("no {} record for {}", args.rtype, name);
    };

    match ctx.output_format {
        OutputFormat::Json => {
            let out = json!({
                "name": name,
                "type": args.rtype,
                "data": record_body(&value)?,
                "presentation": value.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty => {
            println!(
                "{}  {}  {}",
                name.bold(),
                args.rtype.to_string().cyan(),
                value
            );
        }
    }

    Ok(())
}
