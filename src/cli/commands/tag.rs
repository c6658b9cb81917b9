//! Tag commands: add, list, search, show, rename, erase

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{library_label, open_session, print_tags};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{RenameOutcome, TagType};

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Tag name (surrounding whitespace is trimmed)
    pub name: String,

    /// Mark the tag as assigned automatically rather than by a user
    #[arg(long, short = 'a')]
    pub automatic: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only these tag types (manual, automatic, or a number)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub types: Option<Vec<TagType>>,

    /// Only tags linked to these items
    #[arg(long, value_delimiter = ',')]
    pub items: Option<Vec<i64>>,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Substring to look for (empty lists every tag)
    #[arg(default_value = "")]
    pub text: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Tag id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// Tag id
    pub id: i64,

    /// New name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct EraseArgs {
    /// Tag ids
    #[arg(required = true)]
    pub ids: Vec<i64>,
}

pub fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let library = session.library(global);
    let tag_type = if args.automatic {
        TagType::AUTOMATIC
    } else {
        TagType::Manual
    };

    let id = session
        .service
        .add(&args.name, tag_type, library)
        .into_diagnostic()?;

    if global.quiet || global.format == OutputFormat::Id {
        println!("{}", id);
    } else {
        println!(
            "{} Tag {} is {}",
            style("✓").green(),
            style(args.name.trim()).cyan(),
            style(id).yellow()
        );
    }
    Ok(())
}

pub fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let library = session.library(global);
    let types = args.types.as_deref();

    let tags = match &args.items {
        Some(items) => session.service.all_within_items(items, types),
        None => session.service.all(types, library),
    }
    .into_diagnostic()?;

    print_tags(&tags, global.format, global.quiet)
}

pub fn run_search(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let tags = session.service.search(&args.text).into_diagnostic()?;
    print_tags(&tags, global.format, global.quiet)
}

pub fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let tag = session
        .service
        .get(args.id)
        .into_diagnostic()?
        .cloned()
        .ok_or_else(|| miette::miette!("Tag {} not found", args.id))?;
    let items = session.service.tag_items(tag.id).into_diagnostic()?;
    let color = session.service.color(&tag.name).into_diagnostic()?;

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    let doc = serde_json::json!({
        "tag": &tag,
        "color": &color,
        "items": &items,
    });

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&doc).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", tag.id);
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            let items = items
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                tag.id,
                tag.name,
                tag.tag_type,
                library_label(tag.library_id),
                color,
                items
            );
        }
    }
    Ok(())
}

pub fn run_rename(args: RenameArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let outcome = session
        .service
        .rename(args.id, &args.name)
        .into_diagnostic()?;

    if global.quiet {
        return Ok(());
    }
    match outcome {
        RenameOutcome::Unchanged => {
            println!("{} Tag {} already has that name", style("!").yellow(), args.id);
        }
        RenameOutcome::Renamed => {
            println!(
                "{} Renamed tag {} to {}",
                style("✓").green(),
                args.id,
                style(args.name.trim()).cyan()
            );
        }
        RenameOutcome::Merged { into, .. } => {
            println!(
                "{} Merged tag {} into {} ({})",
                style("✓").green(),
                args.id,
                style(into).yellow(),
                style(args.name.trim()).cyan()
            );
        }
    }
    Ok(())
}

pub fn run_erase(args: EraseArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let erased = session.service.erase(&args.ids).into_diagnostic()?;

    if global.quiet {
        return Ok(());
    }
    let missing = args.ids.iter().filter(|id| !erased.contains(id)).count();
    println!(
        "{} Erased {} tag(s)",
        style("✓").green(),
        style(erased.len()).cyan()
    );
    if missing > 0 {
        println!("{} {} id(s) did not exist", style("!").yellow(), missing);
    }
    Ok(())
}
