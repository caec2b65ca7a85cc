//! Binding generation for EVM contracts
//!
//! This module turns contract ABI JSON files into source files exposing one typed
//! class per contract, plus classes for the structs and events the ABI declares.

pub mod abi_type;
pub mod array;
pub mod cli;
pub mod event;
pub mod function;
pub mod generator;
pub mod imports;
pub mod names;
pub mod parser;
pub mod signature;
pub mod templates;
pub mod tuples;
pub mod types;

#[cfg(test)]
mod tests;

pub use generator::ContractBindingGenerator;
pub use parser::{AbiParser, ContractAbi};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bindgen_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Runtime library the generated code imports from unless configured otherwise
pub const DEFAULT_LIBRARY_MODULE: &str = "@mimicprotocol/lib-ts";

/// Configuration for binding generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Output directory for generated files
    pub output_dir: PathBuf,
    /// Module named in the generated import statement
    pub library_module: String,
    /// Extension of generated files, without the dot
    pub file_extension: String,
    /// Contract name to ABI file path
    pub abis: BTreeMap<String, PathBuf>,
    /// Remove previously generated files before writing
    pub clean: bool,
    /// Whether this is a dry run
    pub dry_run: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./src/types"),
            library_module: DEFAULT_LIBRARY_MODULE.to_string(),
            file_extension: "ts".to_string(),
            abis: BTreeMap::new(),
            clean: false,
            dry_run: false,
        }
    }
}

impl CodegenConfig {
    /// Parse a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML configuration file. Relative paths resolve against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file {}: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(base_dir) = path.parent() {
            config.resolve_relative_to(base_dir);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base_dir: &Path) {
        if self.output_dir.is_relative() {
            self.output_dir = base_dir.join(&self.output_dir);
        }
        for abi_path in self.abis.values_mut() {
            if abi_path.is_relative() {
                *abi_path = base_dir.join(&*abi_path);
            }
        }
    }

    /// Check everything that can be checked without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.abis.is_empty() {
            return Err(Error::config("No ABIs configured"));
        }
        for name in self.abis.keys() {
            validate_contract_name(name)?;
        }
        if self.file_extension.is_empty() || self.file_extension.contains(&['.', '/', '\\'][..]) {
            return Err(Error::config(format!("Invalid file extension '{}'", self.file_extension)));
        }
        Ok(())
    }

    /// Path the bindings of `contract_name` are written to
    pub fn output_path(&self, contract_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", contract_name, self.file_extension))
    }
}

/// Contract names become class and file names: identifier characters only, not starting with a digit
pub fn validate_contract_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };

    if !valid {
        return Err(Error::config(format!(
            "Invalid contract name '{}': use letters, digits, '_' or '$', not starting with a digit",
            name
        )));
    }
    Ok(())
}

/// Generate bindings from an already parsed ABI JSON value
pub fn generate(abi: &serde_json::Value, contract_name: &str) -> Result<String> {
    let abi = AbiParser::new().parse_value(abi)?;
    ContractBindingGenerator::new()?.generate(&abi, contract_name)
}

/// Main entry point for generating one contract's bindings.
///
/// Returns the written path, or `None` when the ABI produced no output or this is a dry run.
pub async fn generate_contract_code(
    contract_name: &str,
    abi_file_path: &Path,
    config: &CodegenConfig,
) -> Result<Option<PathBuf>> {
    let generator = ContractBindingGenerator::with_library_module(config.library_module.as_str())?;
    write_bindings(&generator, contract_name, abi_file_path, config).await
}

/// Generate bindings for every configured ABI, returning the written paths
pub async fn generate_all(config: &CodegenConfig) -> Result<Vec<PathBuf>> {
    config.validate()?;

    if config.clean && !config.dry_run {
        clean_output_dir(config).await?;
    }

    let generator = ContractBindingGenerator::with_library_module(config.library_module.as_str())?;
    let mut written = Vec::new();
    for (contract_name, abi_path) in &config.abis {
        if let Some(path) = write_bindings(&generator, contract_name, abi_path, config).await? {
            written.push(path);
        }
    }

    Ok(written)
}

async fn write_bindings(
    generator: &ContractBindingGenerator,
    contract_name: &str,
    abi_file_path: &Path,
    config: &CodegenConfig,
) -> Result<Option<PathBuf>> {
    debug!("Generating {} from {}", contract_name, abi_file_path.display());

    let content = tokio::fs::read_to_string(abi_file_path)
        .await
        .map_err(|e| Error::config(format!("Failed to read ABI file {}: {}", abi_file_path.display(), e)))?;
    let abi = AbiParser::new().parse_content(&content)?;

    let code = generator.generate(&abi, contract_name)?;
    if code.is_empty() {
        info!("No functions or events in {}, skipping {}", abi_file_path.display(), contract_name);
        return Ok(None);
    }

    let path = config.output_path(contract_name);
    if config.dry_run {
        println!("\n--- {} ---", path.display());
        println!("{}", code);
        return Ok(None);
    }

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| Error::config(format!("Failed to create output directory: {}", e)))?;
    tokio::fs::write(&path, code).await?;

    info!("Wrote {}", path.display());
    Ok(Some(path))
}

/// Remove files carrying the configured extension from the output directory
async fn clean_output_dir(config: &CodegenConfig) -> Result<()> {
    if !tokio::fs::try_exists(&config.output_dir).await? {
        return Ok(());
    }

    let mut entries = tokio::fs::read_dir(&config.output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let generated = path.extension().and_then(|ext| ext.to_str()) == Some(config.file_extension.as_str());
        if generated && entry.file_type().await?.is_file() {
            debug!("Removing {}", path.display());
            tokio::fs::remove_file(&path).await?;
        }
    }
    Ok(())
}
