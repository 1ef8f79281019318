use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, generate_to, Shell};

use crate::cli::Cli;
use crate::error::CliError;

/// Write the completion script to stdout, or as `takeit.<ext>` into `output_dir`
pub fn run_completions(shell: Shell, output_dir: Option<&Path>) -> Result<(), CliError> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
        let path = generate_to(shell, &mut command, bin_name, dir)?;
        println!("{}", path.display());
    } else {
        generate(shell, &mut command, bin_name, &mut io::stdout());
    }

    Ok(())
}
