//! Implementation of `vault init`.

use std::{
    fs,
    io::{self, Write},
    path::Path,
    process::ExitCode,
};

use vault_config::{CONFIG_FILENAME, init_template};

use crate::cli::{
    args::InitCommand,
    output::{highlight_toml, indent, subheader},
};

/// Directory holding the default index, relative to the config file.
const INDEX_DIR_PATTERN: &str = ".vault/";

/// Writes a commented `vault.toml` into `cwd`.
pub fn run(cwd: &Path, cmd: &InitCommand) -> ExitCode {
    let config_path = cwd.join(CONFIG_FILENAME);

    if config_path.exists() && !cmd.force {
        eprintln!(
            "error: configuration file already exists: {}",
            config_path.display()
        );
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = init_template();
    if let Err(e) = fs::write(&config_path, &template) {
        eprintln!("error: failed to write {}: {e}", config_path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", config_path.display());
    println!();
    println!("{}", subheader("Configuration written:"));
    println!("{}", indent(&highlight_toml(&template)));

    if let Err(e) = update_gitignore(cwd) {
        eprintln!("warning: could not update .gitignore: {e}");
    }

    ExitCode::SUCCESS
}

/// Adds `.vault/` to `.gitignore` if it exists and doesn't already contain it.
fn update_gitignore(dir: &Path) -> io::Result<()> {
    let gitignore_path = dir.join(".gitignore");
    if !gitignore_path.exists() {
        return Ok(());
    }

    let contents = fs::read_to_string(&gitignore_path)?;
    let already = contents.lines().any(|line| {
        let trimmed = line.trim();
        trimmed == INDEX_DIR_PATTERN || trimmed == ".vault"
    });
    if already {
        return Ok(());
    }

    let mut file = fs::OpenOptions::new().append(true).open(&gitignore_path)?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{INDEX_DIR_PATTERN}")?;
    println!("Added {INDEX_DIR_PATTERN} to .gitignore");

    Ok(())
}
