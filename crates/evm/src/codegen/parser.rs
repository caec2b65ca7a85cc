//! Ethereum ABI parser
//!
//! Validates raw ABI JSON into the strict model consumed by the binding generator.
//! Nothing past this module looks at untyped JSON.

use std::path::Path;

use bindgen_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::abi_type::AbiType;
use super::array;

/// ABI type name of a struct parameter
pub const TUPLE_ABI_TYPE: &str = "tuple";

/// Parsed Ethereum contract ABI, entries kept in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractAbi {
    pub items: Vec<AbiItem>,
}

/// A single ABI entry the generator cares about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbiItem {
    Function(AbiFunction),
    Event(AbiEvent),
}

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    /// Parse the `stateMutability` field value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pure" => Some(StateMutability::Pure),
            "view" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }

    /// Whether calling a function with this mutability changes chain state
    pub fn is_write(&self) -> bool {
        matches!(self, StateMutability::NonPayable | StateMutability::Payable)
    }
}

impl std::fmt::Display for StateMutability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateMutability::Pure => write!(f, "pure"),
            StateMutability::View => write!(f, "view"),
            StateMutability::NonPayable => write!(f, "nonpayable"),
            StateMutability::Payable => write!(f, "payable"),
        }
    }
}

/// ABI function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiFunction {
    /// Function name
    pub name: String,
    /// Function inputs
    pub inputs: Vec<AbiParameter>,
    /// Function outputs
    pub outputs: Vec<AbiParameter>,
    /// State mutability (pure, view, nonpayable, payable)
    pub state_mutability: StateMutability,
}

impl AbiFunction {
    /// Whether the function is state-changing (nonpayable or payable)
    pub fn is_write(&self) -> bool {
        self.state_mutability.is_write()
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }
}

/// ABI event definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiEvent {
    /// Event name
    pub name: String,
    /// Event inputs
    pub inputs: Vec<AbiParameter>,
    /// Whether event is anonymous
    pub anonymous: bool,
}

/// ABI parameter definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbiParameter {
    /// Parameter name, empty when the ABI leaves it out
    pub name: String,
    /// Parameter type (e.g., uint256, address[], tuple[2])
    pub param_type: String,
    /// Internal type (carries the struct name, e.g. `struct Pool.Key`)
    pub internal_type: Option<String>,
    /// Components (for tuples and structs)
    pub components: Vec<AbiParameter>,
    /// Whether parameter is indexed (for events)
    pub indexed: bool,
}

impl AbiParameter {
    /// Create an unnamed elementary parameter
    pub fn new<S: Into<String>>(param_type: S) -> Self {
        Self {
            param_type: param_type.into(),
            ..Default::default()
        }
    }

    /// Create a named parameter
    pub fn named<N: Into<String>, T: Into<String>>(name: N, param_type: T) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            ..Default::default()
        }
    }

    /// Create a struct parameter from its components
    pub fn tuple<N: Into<String>>(name: N, internal_type: Option<String>, components: Vec<AbiParameter>) -> Self {
        Self {
            name: name.into(),
            param_type: TUPLE_ABI_TYPE.to_string(),
            internal_type,
            components,
            indexed: false,
        }
    }

    /// Decomposed view of the parameter type
    pub fn abi_type(&self) -> AbiType {
        AbiType::parse(&self.param_type)
    }

    /// Whether the parameter ultimately holds a struct (`tuple`, `tuple[]`, `tuple[2][]`, ...)
    pub fn is_tuple(&self) -> bool {
        self.abi_type().is_tuple()
    }

    pub fn is_array(&self) -> bool {
        matches!(self.abi_type(), AbiType::Array { .. })
    }

    /// The parameter describing one element of this array parameter.
    /// Non-array parameters are returned unchanged.
    pub fn element(&self) -> AbiParameter {
        if !self.is_array() {
            return self.clone();
        }
        AbiParameter {
            name: self.name.clone(),
            param_type: array::base_type(&self.param_type).to_string(),
            internal_type: self.internal_type.as_deref().map(|t| array::base_type(t).to_string()),
            components: self.components.clone(),
            indexed: self.indexed,
        }
    }

    /// The struct parameter this (possibly array) parameter is built from, with every array level removed
    pub fn ultimate_element(&self) -> AbiParameter {
        AbiParameter {
            name: self.name.clone(),
            param_type: array::ultimate_base_type(&self.param_type).to_string(),
            internal_type: self.internal_type.as_deref().map(|t| array::ultimate_base_type(t).to_string()),
            components: self.components.clone(),
            indexed: self.indexed,
        }
    }
}

impl ContractAbi {
    /// Functions in ABI order
    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Function(function) => Some(function),
            AbiItem::Event(_) => None,
        })
    }

    /// Events in ABI order
    pub fn events(&self) -> impl Iterator<Item = &AbiEvent> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Event(event) => Some(event),
            AbiItem::Function(_) => None,
        })
    }

    /// True when there is neither a function nor an event to bind
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ethereum ABI parser
pub struct AbiParser;

impl AbiParser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Self
    }

    /// Parse an Ethereum ABI file
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> Result<ContractAbi> {
        let content = std::fs::read_to_string(file_path)?;
        self.parse_content(&content)
    }

    /// Parse Ethereum ABI from JSON content
    pub fn parse_content(&self, content: &str) -> Result<ContractAbi> {
        let value: Value = serde_json::from_str(content)?;
        self.parse_value(&value)
    }

    /// Parse ABI from JSON value
    pub fn parse_value(&self, value: &Value) -> Result<ContractAbi> {
        let abi_array = value.as_array()
            .ok_or_else(|| Error::invalid_abi("ABI must be an array"))?;

        let mut items = Vec::new();

        for item in abi_array {
            let item_type = item.get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("function");

            match item_type {
                "function" => items.push(AbiItem::Function(self.parse_function(item)?)),
                "event" => items.push(AbiItem::Event(self.parse_event(item)?)),
                // constructor, error, fallback, receive and anything newer carry no bindings
                _ => {}
            }
        }

        Ok(ContractAbi { items })
    }

    /// Parse a function from ABI
    fn parse_function(&self, value: &Value) -> Result<AbiFunction> {
        let name = value.get("name")
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::invalid_abi("Function must have a name"))?
            .to_string();

        let inputs = Self::parse_parameter_list(value, "inputs")?;
        let outputs = Self::parse_parameter_list(value, "outputs")?;

        let state_mutability = match value.get("stateMutability").and_then(|v| v.as_str()) {
            Some(raw) => StateMutability::parse(raw).ok_or_else(|| {
                Error::invalid_abi(format!("Unknown state mutability '{}' on function {}", raw, name))
            })?,
            // Legacy support
            None if value.get("constant").and_then(|v| v.as_bool()).unwrap_or(false) => StateMutability::View,
            None if value.get("payable").and_then(|v| v.as_bool()).unwrap_or(false) => StateMutability::Payable,
            None => StateMutability::NonPayable,
        };

        Ok(AbiFunction {
            name,
            inputs,
            outputs,
            state_mutability,
        })
    }

    /// Parse an event from ABI
    fn parse_event(&self, value: &Value) -> Result<AbiEvent> {
        let name = value.get("name")
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::invalid_abi("Event must have a name"))?
            .to_string();

        let inputs = Self::parse_parameter_list(value, "inputs")?;

        let anonymous = value.get("anonymous")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(AbiEvent {
            name,
            inputs,
            anonymous,
        })
    }

    fn parse_parameter_list(value: &Value, field: &str) -> Result<Vec<AbiParameter>> {
        match value.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(arr)) => Self::parse_parameters(arr),
            Some(_) => Err(Error::invalid_abi(format!("'{}' must be an array", field))),
        }
    }

    /// Parse parameters, recursing into struct components
    fn parse_parameters(array: &[Value]) -> Result<Vec<AbiParameter>> {
        let mut parameters = Vec::with_capacity(array.len());

        for param in array {
            let name = param.get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let param_type = param.get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::invalid_abi("Parameter must have a type"))?
                .to_string();

            let internal_type = param.get("internalType")
                .and_then(|v| v.as_str())
                .map(String::from);

            let components = Self::parse_parameter_list(param, "components")?;

            let indexed = param.get("indexed")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            parameters.push(AbiParameter {
                name,
                param_type,
                internal_type,
                components,
                indexed,
            });
        }

        Ok(parameters)
    }
}

impl Default for AbiParser {
    fn default() -> Self {
        Self::new()
    }
}
