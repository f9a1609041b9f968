//! Command dispatch: bridges CLI args -> session operations -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod resources;
pub mod stats;
pub mod util;

use backdesk_core::{AuthGate, Session};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::{self, Context};
use crate::error::CliError;

use self::resources::ResourceKind;

/// Dispatch a parsed command to its handler.
///
/// Config and Completions run without resolving a profile, so a broken
/// config file can still be repaired from the CLI.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            completions(args.shell);
            Ok(())
        }
        cmd => {
            let ctx = config::resolve(global)?;
            tracing::debug!(profile = %ctx.profile_name, "dispatching command");
            run(cmd, &ctx, global).await
        }
    }
}

async fn run(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(&gate(ctx), args, ctx, global),
        Command::Logout(args) => auth::logout(&gate(ctx), &args, ctx, global),
        Command::Status => auth::status(&gate(ctx), ctx, global),

        Command::Users(args) => {
            let session = connect(ctx, global)?;
            resources::handle(&session, ResourceKind::Users, args.command, global).await
        }
        Command::Orders(args) => {
            let session = connect(ctx, global)?;
            resources::handle(&session, ResourceKind::Orders, args.command, global).await
        }
        Command::Services(args) => {
            let session = connect(ctx, global)?;
            resources::handle(&session, ResourceKind::Services, args.command, global).await
        }
        Command::Resource(args) => {
            let session = connect(ctx, global)?;
            let kind = ResourceKind::Named(args.name.trim_matches('/').to_owned());
            resources::handle(&session, kind, args.command, global).await
        }
        Command::Stats => {
            let session = connect(ctx, global)?;
            stats::handle(&session, global).await
        }

        // Handled by `dispatch` before a profile is resolved.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;

    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "backdesk", &mut std::io::stdout());
}

/// Gate over the durable store, for login / logout / status.
fn gate(ctx: &Context) -> AuthGate {
    AuthGate::new(ctx.durable.clone(), ctx.client.auth.clone())
}

/// Open a session and refuse to continue without an administrative key.
fn connect(ctx: &Context, global: &GlobalOpts) -> Result<Session, CliError> {
    let session = Session::new(ctx.client.clone(), ctx.session_store(global)?)?;
    session
        .check_auth()
        .map_err(|e| CliError::from(e).with_profile(&ctx.profile_name))?;
    Ok(session)
}
