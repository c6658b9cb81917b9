//! `tagkeep color` command - tag colors and item display colors

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::open_session;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum ColorCommands {
    /// Assign a color to a tag name
    Set(SetColorArgs),

    /// Remove a tag name's color
    Unset(UnsetColorArgs),

    /// List color assignments
    List,

    /// Display color of an item
    Item(ItemColorArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetColorArgs {
    /// Tag name
    pub name: String,

    /// Color, e.g. "#ff6666"
    pub color: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetColorArgs {
    /// Tag name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ItemColorArgs {
    /// Item id
    pub item: i64,
}

pub fn run(cmd: ColorCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ColorCommands::Set(args) => run_set(args, global),
        ColorCommands::Unset(args) => run_unset(args, global),
        ColorCommands::List => run_list(global),
        ColorCommands::Item(args) => run_item(args, global),
    }
}

fn run_set(args: SetColorArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    session
        .service
        .set_color(&args.name, Some(&args.color))
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} {} is now {}",
            style("✓").green(),
            style(args.name.trim()).cyan(),
            session.service.color(&args.name).into_diagnostic()?
        );
    }
    Ok(())
}

fn run_unset(args: UnsetColorArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    session
        .service
        .set_color(&args.name, None)
        .into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Removed color of {}",
            style("✓").green(),
            style(args.name.trim()).cyan()
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let colors = session.service.colors().into_diagnostic()?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&colors).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&colors).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for name in colors.keys() {
                println!("{}", name);
            }
        }
        OutputFormat::Tsv => {
            for (name, color) in &colors {
                println!("{}\t{}", name, color);
            }
        }
        OutputFormat::Auto => {
            if colors.is_empty() {
                if !global.quiet {
                    println!("No tag colors set.");
                }
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(["NAME", "COLOR"]);
            for (name, color) in &colors {
                builder.push_record([name.as_str(), color.as_str()]);
            }
            println!("{}", builder.build().with(Style::psql()));
        }
    }
    Ok(())
}

fn run_item(args: ItemColorArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    match session.service.item_color(args.item).into_diagnostic()? {
        Some(color) => println!("{}", color),
        None => {
            if !global.quiet {
                println!("{}", style("(none)").dim());
            }
        }
    }
    Ok(())
}
