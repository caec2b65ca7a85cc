//! Tests for binding generation


use std::path::{Path, PathBuf};

use crate::codegen::{validate_contract_name, CodegenConfig, DEFAULT_LIBRARY_MODULE};

#[test]
fn test_config_defaults() {
    let config = CodegenConfig::default();
    assert_eq!(config.output_dir, PathBuf::from("./src/types"));
    assert_eq!(config.library_module, DEFAULT_LIBRARY_MODULE);
    assert_eq!(config.file_extension, "ts");
    assert!(config.abis.is_empty());
    assert!(!config.clean);
    assert!(!config.dry_run);
}

#[test]
fn test_config_from_toml_fills_defaults() {
    let config = CodegenConfig::from_toml_str(
        r#"
        output_dir = "generated"

        [abis]
        ERC20 = "abis/erc20.json"
        Vault = "/abs/vault.json"
        "#,
    )
    .unwrap();

    assert_eq!(config.output_dir, PathBuf::from("generated"));
    assert_eq!(config.file_extension, "ts");
    assert_eq!(config.abis.len(), 2);
    assert_eq!(config.output_path("ERC20"), Path::new("generated").join("ERC20.ts"));
}

#[test]
fn test_config_rejects_malformed_toml() {
    assert!(CodegenConfig::from_toml_str("abis = 3").is_err());
}

#[test]
fn test_config_file_resolves_relative_paths() {
    let dir = tempfile::TempDir::new().unwrap();
    let config_path = dir.path().join("codegen.toml");
    std::fs::write(
        &config_path,
        "output_dir = \"out\"\nclean = true\n\n[abis]\nToken = \"abis/token.json\"\n",
    )
    .unwrap();

    let config = CodegenConfig::from_file(&config_path).unwrap();
    assert_eq!(config.output_dir, dir.path().join("out"));
    assert_eq!(config.abis["Token"], dir.path().join("abis/token.json"));
    assert!(config.clean);
}

#[test]
fn test_config_validation() {
    let mut config = CodegenConfig::default();
    assert!(config.validate().is_err(), "no ABIs configured");

    config.abis.insert("Token".to_string(), PathBuf::from("token.json"));
    assert!(config.validate().is_ok());

    config.file_extension = ".ts".to_string();
    assert!(config.validate().is_err());

    config.file_extension = "ts".to_string();
    config.abis.insert("bad-name".to_string(), PathBuf::from("bad.json"));
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_contract_name() {
    for name in ["ERC20", "_Vault", "$Pool", "Uniswap_V3"] {
        assert!(validate_contract_name(name).is_ok(), "{}", name);
    }
    for name in ["", "1inch", "my-token", "a.b", "Token "] {
        assert!(validate_contract_name(name).is_err(), "{:?}", name);
    }
}
