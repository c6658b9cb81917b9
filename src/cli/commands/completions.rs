//! `tagkeep completions <shell>` - print a completion script
//!
//! ```bash
//! source <(tagkeep completions bash)
//! ```

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::{IntoDiagnostic, Result};

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();

    let mut out = io::stdout().lock();
    generate(args.shell, &mut cmd, bin, &mut out);
    out.flush().into_diagnostic()
}
