//! Tagged decomposition of ABI type strings

use std::fmt;

use super::array;
use super::parser::TUPLE_ABI_TYPE;

/// An ABI type string split into its structure.
///
/// Struct components are not part of the type string; they stay on the
/// owning [`AbiParameter`](super::parser::AbiParameter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    /// `uint256`, `address`, `bytes32`, ...
    Elementary(String),
    /// `tuple`
    Tuple,
    /// `T[]` (size `None`) or `T[N]`
    Array {
        element: Box<AbiType>,
        size: Option<String>,
    },
}

impl AbiType {
    /// Decompose a type string. Never fails: anything that is not an array or
    /// `tuple` is treated as an elementary type name.
    pub fn parse(abi_type: &str) -> Self {
        let element = array::base_type(abi_type);
        if element.len() == abi_type.len() {
            return if abi_type == TUPLE_ABI_TYPE {
                AbiType::Tuple
            } else {
                AbiType::Elementary(abi_type.to_string())
            };
        }

        let size = &abi_type[element.len() + 1..abi_type.len() - 1];
        AbiType::Array {
            element: Box::new(AbiType::parse(element)),
            size: if size.is_empty() { None } else { Some(size.to_string()) },
        }
    }

    /// The innermost non-array type
    pub fn ultimate_base(&self) -> &AbiType {
        match self {
            AbiType::Array { element, .. } => element.ultimate_base(),
            other => other,
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self.ultimate_base(), AbiType::Tuple)
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Elementary(name) => write!(f, "{}", name),
            AbiType::Tuple => write!(f, "{}", TUPLE_ABI_TYPE),
            AbiType::Array { element, size } => {
                write!(f, "{}[{}]", element, size.as_deref().unwrap_or(""))
            }
        }
    }
}
