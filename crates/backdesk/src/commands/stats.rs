use backdesk_core::{Session, Stats};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(stats: &Stats) -> String {
    format!("Total users:   {}\nTotal orders:  {}", stats.users, stats.orders)
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = session.stats().await?;
    let out = output::render_single(&global.output, &stats, detail, |s| {
        format!("{}\n{}", s.users, s.orders)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
