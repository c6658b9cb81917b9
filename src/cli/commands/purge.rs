//! `tagkeep purge` command - delete given tags or orphaned ones

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::prefs::PURGE_TAGS;

#[derive(clap::Args, Debug)]
pub struct PurgeArgs {
    /// Tag ids to delete, linked or not
    #[arg(conflicts_with = "orphans")]
    pub ids: Vec<i64>,

    /// Look for orphaned tags even if no unlink flagged a purge
    #[arg(long)]
    pub orphans: bool,
}

pub fn run(args: PurgeArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;

    let purged = if args.ids.is_empty() {
        if args.orphans {
            session
                .service
                .preferences()
                .set_bool(PURGE_TAGS, true)
                .into_diagnostic()?;
        }
        session.service.purge(None)
    } else {
        session.service.purge(Some(args.ids.as_slice()))
    }
    .into_diagnostic()?;

    if global.format == OutputFormat::Id {
        for id in &purged {
            println!("{}", id);
        }
        return Ok(());
    }
    if !global.quiet {
        println!(
            "{} Purged {} tag(s)",
            style("✓").green(),
            style(purged.len()).cyan()
        );
    }
    Ok(())
}
