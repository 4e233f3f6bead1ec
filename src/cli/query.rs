//! `blogsync query`: print snapshot records as JSON.

use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};

use crate::cli::QueryArgs;
use crate::config::SiteConfig;
use crate::content::DOCUMENT_ID;
use crate::snapshot::SnapshotStore;
use crate::utils::plural_count;
use crate::{debug, log};

/// Execute query command
pub fn run_query(args: &QueryArgs, config: &SiteConfig) -> Result<()> {
    let store = SnapshotStore::new(&config.snapshot.path);
    let records = store
        .load()
        .with_context(|| format!("cannot query {}", store.path().display()))?;

    debug!("query"; "found {}", plural_count(records.len(), "record"));

    let output = match &args.fields {
        Some(fields) => filter_fields(records, fields, args.filter_empty),
        None => format_records(records, args.filter_empty),
    };

    let formatted = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    if let Some(ref output_path) = args.output {
        let mut file = fs::File::create(output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        writeln!(file, "{}", formatted)?;
        log!("query"; "wrote output to {}", output_path.display());
    } else {
        println!("{}", formatted);
    }

    Ok(())
}

/// All records, optionally without empty fields.
fn format_records(records: Vec<JsonValue>, filter_empty: bool) -> JsonValue {
    let records = records
        .into_iter()
        .map(|record| match record {
            JsonValue::Object(obj) if filter_empty => JsonValue::Object(
                obj.into_iter()
                    .filter(|(_, value)| !is_empty_value(value))
                    .collect(),
            ),
            other => other,
        })
        .collect();
    JsonValue::Array(records)
}

/// Restrict object records to `fields`, with `documentId` always first.
///
/// Requested fields a record lacks show as `null` unless `filter_empty`.
/// Records that aren't objects are left out.
fn filter_fields(records: Vec<JsonValue>, fields: &[String], filter_empty: bool) -> JsonValue {
    let records = records
        .into_iter()
        .filter_map(|record| match record {
            JsonValue::Object(obj) => Some(obj),
            _ => None,
        })
        .map(|mut source| {
            let mut obj = Map::new();

            if let Some(id) = source.remove(DOCUMENT_ID) {
                obj.insert(DOCUMENT_ID.to_string(), id);
            }

            for field in fields.iter().filter(|f| f.as_str() != DOCUMENT_ID) {
                match source.remove(field) {
                    Some(value) if !filter_empty || !is_empty_value(&value) => {
                        obj.insert(field.clone(), value);
                    }
                    Some(_) => {}
                    None if !filter_empty => {
                        obj.insert(field.clone(), JsonValue::Null);
                    }
                    None => {}
                }
            }

            JsonValue::Object(obj)
        })
        .collect();
    JsonValue::Array(records)
}

/// Check if a JSON value is considered "empty" (null, "", [] or {})
fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(arr) => arr.is_empty(),
        JsonValue::Object(obj) => obj.is_empty(),
        _ => false,
    }
}
