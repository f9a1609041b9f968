//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use backdesk_api::{ListParams, Pagination, Record, RecordId, Sort};
use serde_json::Value;

use crate::cli::{ListArgs, PayloadArgs};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, refuses instead of hanging.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// The JSON object given by `--data` or `--from-file`.
pub fn payload(args: &PayloadArgs) -> Result<Record, CliError> {
    let value = match (&args.data, &args.from_file) {
        (Some(data), _) => serde_json::from_str(data).map_err(|e| CliError::Validation {
            field: "data".into(),
            reason: format!("invalid JSON: {e}"),
        })?,
        (None, Some(path)) => read_json_file(path)?,
        (None, None) => {
            return Err(CliError::Validation {
                field: "data".into(),
                reason: "provide --data or --from-file".into(),
            });
        }
    };
    match value {
        Value::Object(record) => Ok(record),
        other => Err(CliError::Validation {
            field: "data".into(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// Split `KEY=VALUE`. Values that parse as JSON are decoded; anything
/// else is taken as a string.
pub fn parse_filter(raw: &str) -> Result<(String, Value), CliError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(CliError::Validation {
            field: "filter".into(),
            reason: format!("expected KEY=VALUE, got '{raw}'"),
        });
    };
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "filter".into(),
            reason: format!("missing key in '{raw}'"),
        });
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

/// Build adapter list parameters from CLI flags.
pub fn list_params(args: &ListArgs) -> Result<ListParams, CliError> {
    let pagination = Pagination::new(args.page, args.per_page)?;
    let mut params = ListParams::new(pagination);
    if let Some(sort) = Sort::from_parts(args.sort.as_deref(), Some(args.order.into())) {
        params = params.sort(sort);
    }
    for raw in &args.filter {
        let (key, value) = parse_filter(raw)?;
        params = params.filter(key, value);
    }
    Ok(params)
}

pub fn parse_id(raw: &str) -> RecordId {
    match raw.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

pub fn parse_ids(raw: &[String]) -> Vec<RecordId> {
    raw.iter().map(|id| parse_id(id)).collect()
}
