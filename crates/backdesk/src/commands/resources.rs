//! Resource command handlers.
//!
//! One set of sub-commands serves every resource. Users, orders, and
//! services get typed table columns; any other resource is shown as
//! generic id + summary rows. Structured formats always emit the records
//! exactly as the API returned them.

use serde_json::Value;
use tabled::Tabled;

use backdesk_api::ReferenceParams;
use backdesk_core::convert::decode_all;
use backdesk_core::{Order, Resource, Service, Session, User};

use crate::cli::{GlobalOpts, OutputFormat, ResourceCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// Which resource a command targets.
#[derive(Debug, Clone)]
pub enum ResourceKind {
    Users,
    Orders,
    Services,
    Named(String),
}

impl ResourceKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Users => User::NAME,
            Self::Orders => Order::NAME,
            Self::Services => Service::NAME,
            Self::Named(name) => name,
        }
    }

    /// Sub-command prefix used in help text.
    fn command(&self) -> String {
        match self {
            Self::Users => "users".into(),
            Self::Orders => "orders".into(),
            Self::Services => "services".into(),
            Self::Named(name) => format!("resource {name}"),
        }
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Telegram")]
    telegram: String,
    #[tabled(rename = "Lang")]
    language: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            phone: u.phone_number.clone(),
            telegram: u.telegram_id.map(|t| t.to_string()).unwrap_or_default(),
            language: u.language_code.clone().unwrap_or_default(),
            created: u
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "User")]
    user: i64,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Scheduled")]
    scheduled: String,
}

impl From<&Order> for OrderRow {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id,
            user: o.user_id,
            service: o.service_id.map(|s| s.to_string()).unwrap_or_default(),
            status: o.status.label(),
            amount: o.total_amount.map(|a| a.to_string()).unwrap_or_default(),
            scheduled: o
                .scheduled_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Minutes")]
    minutes: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl From<&Service> for ServiceRow {
    fn from(s: &Service) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            price: s.base_price.map(|p| p.to_string()).unwrap_or_default(),
            minutes: s.duration_minutes.map(|m| m.to_string()).unwrap_or_default(),
            active: if s.is_active { "yes" } else { "no" },
        }
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Fields")]
    fields: String,
}

const SUMMARY_WIDTH: usize = 72;

impl From<&Value> for RecordRow {
    fn from(record: &Value) -> Self {
        let mut fields = match record {
            Value::Object(map) => map
                .iter()
                .filter(|(key, _)| key.as_str() != "id")
                .map(|(key, value)| format!("{key}={}", output::cell(Some(value))))
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        };
        if fields.chars().count() > SUMMARY_WIDTH {
            fields = fields.chars().take(SUMMARY_WIDTH - 1).collect();
            fields.push('…');
        }
        Self {
            id: output::record_id(record),
            fields,
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

/// Render records; typed columns for known resources in table mode.
fn render_records(
    kind: &ResourceKind,
    records: &[Value],
    format: &OutputFormat,
) -> Result<String, CliError> {
    if matches!(format, OutputFormat::Table) {
        match kind {
            ResourceKind::Users => {
                let users: Vec<User> = decode_all(records.to_vec())?;
                return Ok(output::render_list(
                    format,
                    &users,
                    |u| UserRow::from(u),
                    |u| u.id.to_string(),
                ));
            }
            ResourceKind::Orders => {
                let orders: Vec<Order> = decode_all(records.to_vec())?;
                return Ok(output::render_list(
                    format,
                    &orders,
                    |o| OrderRow::from(o),
                    |o| o.id.to_string(),
                ));
            }
            ResourceKind::Services => {
                let services: Vec<Service> = decode_all(records.to_vec())?;
                return Ok(output::render_list(
                    format,
                    &services,
                    |s| ServiceRow::from(s),
                    |s| s.id.to_string(),
                ));
            }
            ResourceKind::Named(_) => {}
        }
    }
    Ok(output::render_list(
        format,
        records,
        |r| RecordRow::from(r),
        output::record_id,
    ))
}

fn render_record(record: &Value, format: &OutputFormat) -> String {
    output::render_single(format, record, output::detail, output::record_id)
}

fn render_total(shown: usize, total: u64, global: &GlobalOpts) {
    if !global.quiet && matches!(global.output, OutputFormat::Table) {
        eprintln!("{shown} of {total} records");
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    kind: ResourceKind,
    command: ResourceCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let resource = kind.name();

    match command {
        ResourceCommand::List(list) => {
            let params = util::list_params(&list)?;
            let page = session.get_list(resource, &params).await?;
            let out = render_records(&kind, &page.records, &global.output)?;
            output::print_output(&out, global.quiet);
            render_total(page.records.len(), page.total, global);
            Ok(())
        }

        ResourceCommand::Get { id } => {
            let record = session
                .get_one(resource, &util::parse_id(&id))
                .await
                .map_err(|e| not_found_hint(e.into(), &kind))?;
            output::print_output(&render_record(&record, &global.output), global.quiet);
            Ok(())
        }

        ResourceCommand::GetMany { ids } => {
            let records = session
                .get_many(resource, &util::parse_ids(&ids))
                .await
                .map_err(|e| not_found_hint(e.into(), &kind))?;
            let out = render_records(&kind, &records, &global.output)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourceCommand::Refs { target, id, list } => {
            let reference =
                ReferenceParams::new(target, util::parse_id(&id)).list(util::list_params(&list)?);
            let page = session.get_many_reference(resource, &reference).await?;
            let out = render_records(&kind, &page.records, &global.output)?;
            output::print_output(&out, global.quiet);
            render_total(page.records.len(), page.total, global);
            Ok(())
        }

        ResourceCommand::Create(payload) => {
            let data = util::payload(&payload)?;
            let created = match kind {
                ResourceKind::Orders => session.create_order(data).await?,
                _ => session.create(resource, data).await?,
            };
            let created = Value::Object(created);
            output::print_output(&render_record(&created, &global.output), global.quiet);
            output::success(
                &format!("Created {resource} {}", output::record_id(&created)),
                global.quiet,
            );
            Ok(())
        }

        ResourceCommand::Update { id, payload } => {
            let data = util::payload(&payload)?;
            let updated = session
                .update(resource, &util::parse_id(&id), &data)
                .await
                .map_err(|e| not_found_hint(e.into(), &kind))?;
            output::print_output(&render_record(&updated, &global.output), global.quiet);
            output::success(&format!("Updated {resource} {id}"), global.quiet);
            Ok(())
        }

        ResourceCommand::UpdateMany { ids, payload } => {
            let data = util::payload(&payload)?;
            let updated = session
                .update_many(resource, &util::parse_ids(&ids), &data)
                .await?;
            output::success(&format!("Updated {} {resource} records", updated.len()), global.quiet);
            Ok(())
        }

        ResourceCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete {resource} {id}? This cannot be undone."),
                &format!("{} delete", kind.command()),
                global.yes,
            )? {
                return Ok(());
            }
            session
                .delete(resource, &util::parse_id(&id))
                .await
                .map_err(|e| not_found_hint(e.into(), &kind))?;
            output::success(&format!("Deleted {resource} {id}"), global.quiet);
            Ok(())
        }

        ResourceCommand::DeleteMany { ids } => {
            if !util::confirm(
                &format!("Delete {} {resource} records? This cannot be undone.", ids.len()),
                &format!("{} delete-many", kind.command()),
                global.yes,
            )? {
                return Ok(());
            }
            let deleted = session
                .delete_many(resource, &util::parse_ids(&ids))
                .await?;
            output::success(&format!("Deleted {} {resource} records", deleted.len()), global.quiet);
            Ok(())
        }
    }
}

/// Point "not found" errors at the right list command.
fn not_found_hint(err: CliError, kind: &ResourceKind) -> CliError {
    match err {
        CliError::NotFound { message, .. } => CliError::NotFound {
            message,
            list_command: format!("{} list", kind.command()),
        },
        other => other,
    }
}
