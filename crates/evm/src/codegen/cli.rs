//! CLI interface for binding generation

use std::path::{Path, PathBuf};

use bindgen_common::{Error, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};

use super::{generate_all, validate_contract_name, CodegenConfig};

/// Build the CLI command for binding generation
pub fn build_codegen_command() -> Command {
    Command::new("codegen")
        .about("Generate contract bindings from ABI JSON files")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file listing the ABIs to generate")
                .value_name("FILE")
        )
        .arg(
            Arg::new("abi")
                .long("abi")
                .help("Contract name and ABI file, repeatable")
                .value_name("NAME=PATH")
                .action(ArgAction::Append)
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .help("Output directory for generated files")
                .value_name("PATH")
        )
        .arg(
            Arg::new("library")
                .long("library")
                .help("Module the generated code imports runtime types from")
                .value_name("MODULE")
        )
        .arg(
            Arg::new("clean")
                .long("clean")
                .help("Remove previously generated files first")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Preview generated code without writing files")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Enable verbose output")
                .action(ArgAction::SetTrue)
        )
}

/// Handle the codegen command, returning the written files
pub async fn handle_codegen_command(matches: &ArgMatches) -> Result<Vec<PathBuf>> {
    let config = config_from_matches(matches)?;
    config.validate()?;

    for abi_path in config.abis.values() {
        validate_abi_file(abi_path).await?;
    }

    if matches.get_flag("verbose") {
        println!("Contract Binding Generation");
        println!("===========================");
        for (name, path) in &config.abis {
            println!("ABI: {} <- {}", name, path.display());
        }
        println!("Output directory: {}", config.output_dir.display());
        println!("Library module: {}", config.library_module);
        println!("Clean: {}", config.clean);
        println!("Dry run: {}", config.dry_run);
        println!();
    }

    if config.dry_run {
        println!("🔍 Performing dry run - no files will be written");
    } else {
        println!("🚀 Generating contract bindings...");
    }

    let written = generate_all(&config).await?;

    if !config.dry_run {
        println!("✅ Generated {} binding file(s)", written.len());
        println!("📁 Generated files are located in: {}", config.output_dir.display());
    }

    Ok(written)
}

/// Merge the config file (if any) with command line overrides
fn config_from_matches(matches: &ArgMatches) -> Result<CodegenConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => CodegenConfig::from_file(path)?,
        None => CodegenConfig::default(),
    };

    if let Some(abis) = matches.get_many::<String>("abi") {
        for arg in abis {
            let (name, path) = parse_abi_arg(arg)?;
            config.abis.insert(name, path);
        }
    }

    if let Some(output_dir) = matches.get_one::<String>("output-dir") {
        config.output_dir = PathBuf::from(output_dir);
    }
    if let Some(library) = matches.get_one::<String>("library") {
        config.library_module = library.clone();
    }
    if matches.get_flag("clean") {
        config.clean = true;
    }
    if matches.get_flag("dry-run") {
        config.dry_run = true;
    }

    Ok(config)
}

/// Parse a `NAME=PATH` ABI argument
fn parse_abi_arg(arg: &str) -> Result<(String, PathBuf)> {
    let (name, path) = arg
        .split_once('=')
        .ok_or_else(|| Error::config(format!("Expected NAME=PATH, got '{}'", arg)))?;

    let name = name.trim();
    validate_contract_name(name)?;

    let path = path.trim();
    if path.is_empty() {
        return Err(Error::config(format!("Missing ABI path for contract {}", name)));
    }

    Ok((name.to_string(), PathBuf::from(path)))
}

/// Validate ABI file exists and is readable
async fn validate_abi_file(file_path: &Path) -> Result<()> {
    if !tokio::fs::try_exists(file_path).await
        .map_err(|e| Error::config(format!("Failed to check file existence: {}", e)))?
    {
        return Err(Error::config(format!("ABI file not found: {}", file_path.display())));
    }

    let content = tokio::fs::read_to_string(file_path).await
        .map_err(|e| Error::config(format!("Failed to read ABI file: {}", e)))?;

    // Basic JSON validation
    let _: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| Error::config(format!("Invalid JSON in ABI file {}: {}", file_path.display(), e)))?;

    Ok(())
}
