//! `kvdns set` - create or replace a record.

use anyhow::{Context as _, Result};
use colored::Colorize;
use kvdns_core::{normalize_name, RecordType, RecordValue};
use kvdns_srv::api::record_from_body;
use serde_json::{json, Value};

use super::Context;
use crate::cli::args::SetArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: &Context, args: SetArgs) -> Result<()> {
    let value = match &args.json {
        Some(body) => parse_json_body(args.rtype, body)?,
        None => {
            let tokens: Vec<&str> = args.values.iter().map(String::as_str).collect();
            RecordValue::parse(args.rtype, &tokens)
                .with_context(|| format!("invalid {} record data", args.rtype))?
        }
    };

    let backend = ctx.backend()?;
    backend
        .set(&args.name, &value)
        .await
        .with_context(|| format!("failed to store {} record for {}", args.rtype, args.name))?;

    let name = normalize_name(&args.name);
    match ctx.output_format {
        OutputFormat::Json => {
            let out = json!({ "name": name, "type": args.rtype, "stored": true });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty => {
            println!("{} {} {}  {}", "Stored".green(), args.rtype, name.bold(), value);
        }
    }

    Ok(())
}

/// `--json` text as a value of `rtype`.
fn parse_json_body(rtype: RecordType, text: &str) -> Result<RecordValue> {
    let body: Value = serde_json::from_str(text).context("record body is not valid JSON")?;
    Ok(record_from_body(rtype, body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvdns_core::record::Mx;

    #[test]
    fn test_parse_json_body() {
        let value =
            parse_json_body(RecordType::MX, r#"{"host": "mx.example.com", "priority": 5}"#).unwrap();
        assert_eq!(
            value,
            RecordValue::MX(Mx {
                host: "mx.example.com".into(),
                priority: 5,
            })
        );
    }

    #[test]
    fn test_parse_json_body_rejects_bad_text() {
        assert!(parse_json_body(RecordType::A, "not json").is_err());
        assert!(parse_json_body(RecordType::A, "[1, 2]").is_err());
        assert!(parse_json_body(RecordType::A, r#"{"host": "x"}"#).is_err());
    }
}
