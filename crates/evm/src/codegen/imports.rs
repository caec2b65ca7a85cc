//! Runtime library symbols required by generated code

use std::collections::HashSet;
use std::fmt;

/// Symbol exported by the runtime support library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibSymbol {
    Address,
    BigInt,
    Bytes,
    ChainId,
    Environment,
    Evm,
    EvmCallBuilder,
    EvmDecodeParam,
    EvmEncodeParam,
    ParseCsvNotNullable,
    Result,
    TokenAmount,
}

impl LibSymbol {
    pub const ALL: [LibSymbol; 12] = [
        LibSymbol::Address,
        LibSymbol::BigInt,
        LibSymbol::Bytes,
        LibSymbol::ChainId,
        LibSymbol::Environment,
        LibSymbol::Evm,
        LibSymbol::EvmCallBuilder,
        LibSymbol::EvmDecodeParam,
        LibSymbol::EvmEncodeParam,
        LibSymbol::ParseCsvNotNullable,
        LibSymbol::Result,
        LibSymbol::TokenAmount,
    ];

    /// Whether `name` is exported by the library, and so taken in every generated file
    pub fn is_exported_name(name: &str) -> bool {
        Self::ALL.iter().any(|symbol| symbol.as_str() == name)
    }

    /// Name as exported by the library
    pub fn as_str(self) -> &'static str {
        match self {
            LibSymbol::Address => "Address",
            LibSymbol::BigInt => "BigInt",
            LibSymbol::Bytes => "Bytes",
            LibSymbol::ChainId => "ChainId",
            LibSymbol::Environment => "environment",
            LibSymbol::Evm => "evm",
            LibSymbol::EvmCallBuilder => "EvmCallBuilder",
            LibSymbol::EvmDecodeParam => "EvmDecodeParam",
            LibSymbol::EvmEncodeParam => "EvmEncodeParam",
            LibSymbol::ParseCsvNotNullable => "parseCSVNotNullable",
            LibSymbol::Result => "Result",
            LibSymbol::TokenAmount => "TokenAmount",
        }
    }
}

impl fmt::Display for LibSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulates the library symbols a generated file refers to
#[derive(Debug, Clone)]
pub struct ImportRegistry {
    module: String,
    symbols: HashSet<LibSymbol>,
}

impl ImportRegistry {
    /// Create an empty registry importing from `module`
    pub fn new<S: Into<String>>(module: S) -> Self {
        Self {
            module: module.into(),
            symbols: HashSet::new(),
        }
    }

    /// Register a symbol; repeated registration is a no-op
    pub fn add_type(&mut self, symbol: LibSymbol) {
        self.symbols.insert(symbol);
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Registered symbols, sorted case-insensitively
    pub fn sorted_symbols(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.symbols.iter().map(|s| s.as_str()).collect();
        names.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        names
    }

    /// A single import statement, or an empty string when nothing was registered
    pub fn generate_imports_code(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!(
            "import {{ {} }} from '{}'",
            self.sorted_symbols().join(", "),
            self.module
        )
    }
}
