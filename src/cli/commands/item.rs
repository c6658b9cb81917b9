//! Item commands: register items and manage their tag links

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_session;
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Register an item in the current library
    Add(ItemAddArgs),

    /// List the tag ids linked to an item
    Tags(ItemTagsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ItemAddArgs {
    /// Item id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct ItemTagsArgs {
    /// Item id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct LinkArgs {
    /// Item id
    pub item: i64,

    /// Tag id
    pub tag: i64,
}

pub fn run(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ItemCommands::Add(args) => run_add(args, global),
        ItemCommands::Tags(args) => run_tags(args, global),
    }
}

fn run_add(args: ItemAddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let library = session.library(global);
    session
        .service
        .add_item(args.id, library)
        .into_diagnostic()?;

    if !global.quiet {
        println!("{} Registered item {}", style("✓").green(), style(args.id).cyan());
    }
    Ok(())
}

fn run_tags(args: ItemTagsArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    for id in session.service.item_tags(args.id).into_diagnostic()? {
        println!("{}", id);
    }
    Ok(())
}

pub fn run_link(args: LinkArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let created = session
        .service
        .link(args.item, args.tag)
        .into_diagnostic()?;

    if !global.quiet {
        if created {
            println!(
                "{} Linked item {} to tag {}",
                style("✓").green(),
                style(args.item).cyan(),
                style(args.tag).yellow()
            );
        } else {
            println!(
                "{} Item {} already has tag {}",
                style("!").yellow(),
                args.item,
                args.tag
            );
        }
    }
    Ok(())
}

pub fn run_unlink(args: LinkArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let removed = session
        .service
        .unlink(args.item, args.tag)
        .into_diagnostic()?;

    if !global.quiet {
        if removed {
            println!(
                "{} Unlinked item {} from tag {}",
                style("✓").green(),
                style(args.item).cyan(),
                style(args.tag).yellow()
            );
        } else {
            println!(
                "{} Item {} does not have tag {}",
                style("!").yellow(),
                args.item,
                args.tag
            );
        }
    }
    Ok(())
}
