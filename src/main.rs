use clap::Parser;
use miette::Result;
use tagkeep::cli::{helpers, Cli, Commands};
use tagkeep::core::Config;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let project = helpers::discover_project(&global).ok();
    let config = Config::load(project.as_ref());
    tagkeep::logging::init(global.verbose, config.log_level.as_deref());

    match cli.command {
        Commands::Init(args) => tagkeep::cli::commands::init::run(args),
        Commands::Add(args) => tagkeep::cli::commands::tag::run_add(args, &global),
        Commands::List(args) => tagkeep::cli::commands::tag::run_list(args, &global),
        Commands::Search(args) => tagkeep::cli::commands::tag::run_search(args, &global),
        Commands::Show(args) => tagkeep::cli::commands::tag::run_show(args, &global),
        Commands::Rename(args) => tagkeep::cli::commands::tag::run_rename(args, &global),
        Commands::Erase(args) => tagkeep::cli::commands::tag::run_erase(args, &global),
        Commands::Purge(args) => tagkeep::cli::commands::purge::run(args, &global),
        Commands::Item(cmd) => tagkeep::cli::commands::item::run(cmd, &global),
        Commands::Link(args) => tagkeep::cli::commands::item::run_link(args, &global),
        Commands::Unlink(args) => tagkeep::cli::commands::item::run_unlink(args, &global),
        Commands::Color(cmd) => tagkeep::cli::commands::color::run(cmd, &global),
        Commands::Completions(args) => tagkeep::cli::commands::completions::run(args),
    }
}
