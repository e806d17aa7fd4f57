//! Shell completion and man page output

use crate::cli::commands::Cli;
use crate::Result;
use clap::CommandFactory;
use clap_complete::{generate, Generator};

/// Print shell completions for the CLI to stdout
pub fn print_completions<G: Generator>(gen: G) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(gen, &mut cmd, name, &mut std::io::stdout());
}

/// Generate man page
pub fn generate_man_page() -> Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;

    print!("{}", String::from_utf8(buffer)?);
    Ok(())
}
