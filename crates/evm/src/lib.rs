//! EVM contract binding generation
//!
//! Reads Solidity ABI JSON and emits typed classes wrapping calls, structs and events
//! for a sandboxed runtime library.

#[cfg(feature = "codegen")]
pub mod codegen;

#[cfg(feature = "codegen")]
pub use codegen::{generate, generate_all, generate_contract_code, CodegenConfig, ContractBindingGenerator};

pub use bindgen_common::{Error, Result};
