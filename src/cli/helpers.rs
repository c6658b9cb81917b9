//! Shared helper functions for CLI commands
//!
//! Opening a project's tag service and rendering tag listings are used by
//! nearly every command, so they live here.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::collation::SimpleCollation;
use crate::core::notifier::TracingNotifier;
use crate::core::{Config, Database, FilePrefs, Project, Tag, TagService};

/// A project opened for one command
pub struct Session {
    pub project: Project,
    pub config: Config,
    pub service: TagService,
}

impl Session {
    /// Library given on the command line, else the configured one
    pub fn library(&self, global: &GlobalOpts) -> Option<i64> {
        global.library.or(self.config.library)
    }
}

/// Locate the project from `--project` or the working directory
pub fn discover_project(global: &GlobalOpts) -> Result<Project> {
    let found = match &global.project {
        Some(root) => Project::discover_from(root),
        None => Project::discover(),
    };
    found.map_err(|e| miette::miette!("{}", e))
}

/// Open the project's store, preferences and tag service
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    let project = discover_project(global)?;
    let config = Config::load(Some(&project));

    let db = Database::open_with_timeout(&project.db_path(), config.busy_timeout_ms)
        .map_err(|e| miette::miette!("Failed to open tag store: {}", e))?;
    let prefs = FilePrefs::new(&project.prefs_path());
    let service = TagService::new(db, Box::new(prefs))
        .with_notifier(TracingNotifier)
        .with_collation(SimpleCollation, config.strength());

    Ok(Session {
        project,
        config,
        service,
    })
}

/// Print a tag listing in the requested format (`Auto` renders a table)
pub fn print_tags(tags: &[Tag], format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(tags).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(tags).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for tag in tags {
                println!("{}", tag.id);
            }
        }
        OutputFormat::Tsv => {
            for tag in tags {
                println!(
                    "{}\t{}\t{}\t{}",
                    tag.id,
                    tag.name,
                    tag.tag_type,
                    library_label(tag.library_id)
                );
            }
        }
        OutputFormat::Auto => {
            if tags.is_empty() {
                if !quiet {
                    println!("No tags found.");
                }
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["ID", "NAME", "TYPE", "LIBRARY"]);
            for tag in tags {
                builder.push_record([
                    tag.id.to_string(),
                    truncate_str(&tag.name, 40),
                    tag.tag_type.to_string(),
                    library_label(tag.library_id),
                ]);
            }
            println!("{}", builder.build().with(Style::psql()));

            if !quiet {
                println!();
                println!("{} tag(s) found.", style(tags.len()).cyan());
            }
        }
    }
    Ok(())
}

/// `-` for the unscoped library
pub fn library_label(library_id: Option<i64>) -> String {
    library_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
