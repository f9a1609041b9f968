//! Login, logout, and status handlers.

use secrecy::SecretString;
use serde::Serialize;

use backdesk_api::CredentialScope;
use backdesk_core::AuthGate;

use crate::cli::{GlobalOpts, LoginArgs, LogoutArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

/// What `status` reports.
#[derive(Debug, Serialize)]
struct AuthStatus {
    profile: String,
    api_url: String,
    admin_key: bool,
    service_key: bool,
}

fn detail(s: &AuthStatus) -> String {
    let stored = |present: bool| if present { "stored" } else { "not stored" };
    [
        format!("Profile:      {}", s.profile),
        format!("API URL:      {}", s.api_url),
        format!("Admin key:    {}", stored(s.admin_key)),
        format!("Service key:  {}", stored(s.service_key)),
    ]
    .join("\n")
}

fn read_key(scope: CredentialScope, key: Option<String>) -> Result<SecretString, CliError> {
    let key = match key {
        Some(key) => key,
        None => rpassword::prompt_password(format!("{scope} key: ")).map_err(|e| {
            CliError::Validation {
                field: "key".into(),
                reason: format!("prompt failed: {e}"),
            }
        })?,
    };
    Ok(SecretString::from(key.trim().to_owned()))
}

pub fn login(
    gate: &AuthGate,
    args: LoginArgs,
    ctx: &Context,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let scope = CredentialScope::from(args.scope);
    let key = read_key(scope, args.key)?;
    gate.login_scope(scope, key)?;
    output::success(
        &format!("Stored {scope} key for profile '{}'", ctx.profile_name),
        global.quiet,
    );
    Ok(())
}

pub fn logout(
    gate: &AuthGate,
    args: &LogoutArgs,
    ctx: &Context,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let scope = CredentialScope::from(args.scope);
    gate.logout_scope(scope)?;
    output::success(
        &format!("Removed {scope} key for profile '{}'", ctx.profile_name),
        global.quiet,
    );
    Ok(())
}

/// Report stored keys; fails with the auth exit code when no admin key
/// is available.
pub fn status(gate: &AuthGate, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let status = AuthStatus {
        profile: ctx.profile_name.clone(),
        api_url: ctx.client.base_url.clone(),
        admin_key: gate.has_credential(CredentialScope::Admin)?,
        service_key: gate.has_credential(CredentialScope::Service)?,
    };
    let out = output::render_single(&global.output, &status, detail, |s| {
        s.admin_key.to_string()
    });
    output::print_output(&out, global.quiet);

    gate.check_auth()
        .map_err(|e| CliError::from(e).with_profile(&ctx.profile_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_reports_presence() {
        let out = detail(&AuthStatus {
            profile: "default".into(),
            api_url: "http://localhost:8000".into(),
            admin_key: true,
            service_key: false,
        });
        assert!(out.contains("Admin key:    stored"));
        assert!(out.contains("Service key:  not stored"));
    }
}
