//! Implementation of `vault status`.

use std::process::ExitCode;

use vault_index::{BatchJournal, detect_index_status, open_reader};

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Shows configuration, index state and validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;

    println!("{}", subheader("Config:"));
    match &config.config_path {
        Some(path) => println!("   {}", path.display()),
        None => println!("   {}", dim("(defaults, no vault.toml found)")),
    }
    println!();

    println!("{}", subheader("Vault:"));
    let root = &config.vault.root;
    let extensions = config.vault.extensions.join(", ");
    if root.is_dir() {
        println!("   {} {}", root.display(), dim(&format!("[{extensions}]")));
    } else {
        println!(
            "   {} {} {}",
            root.display(),
            dim(&format!("[{extensions}]")),
            warning("[missing]")
        );
    }
    println!();

    let options = ctx.index_options();
    let status = detect_index_status(&options);
    println!("{}", subheader("Index:"));
    println!(
        "   {} {}",
        status.description(),
        dim(&format!("({})", options.root.display()))
    );
    if let Ok(reader) = open_reader(&options) {
        println!("   Documents: {}", reader.snapshot().num_docs());
        println!("   Generation: {}", reader.generation());
    }
    let journal = if BatchJournal::exists(&options.root) {
        warning("present")
    } else {
        "none".to_string()
    };
    println!("   Recovery journal: {journal}");
    println!(
        "   Stemmer: {}, startup: {}",
        options.stemmer,
        config.search.startup.as_str()
    );
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
    } else {
        println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
        for w in &warnings {
            println!("   {}", warning(&w.to_string()));
        }
    }

    ExitCode::SUCCESS
}
