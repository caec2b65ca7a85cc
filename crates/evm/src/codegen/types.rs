//! ABI type to target type mapping
//!
//! Decides which type name a parameter gets in the generated code and how values cross
//! the encode/decode boundary. Everything here returns strings; assembling them into
//! classes is left to the generators.

use tracing::warn;

use super::abi_type::AbiType;
use super::array;
use super::imports::{ImportRegistry, LibSymbol};
use super::parser::AbiParameter;
use super::signature::{canonical_elementary, canonical_type};
use super::tuples::TupleRegistry;

/// Sentinel type for anything that cannot be mapped
pub const UNKNOWN_TYPE: &str = "unknown";

const ARRAY_MARKER: &str = "[]";

/// Target type of an elementary ABI type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementaryType {
    Address,
    Bool,
    String,
    Bytes,
    BigInt,
    I8,
    U8,
}

impl ElementaryType {
    /// Look up a canonical elementary ABI type.
    ///
    /// Only 8-bit integers stay native; every other width, and the unsized
    /// `int`/`uint`, maps to `BigInt`.
    pub fn from_abi(abi_type: &str) -> Option<Self> {
        let canonical = canonical_elementary(abi_type);
        match canonical {
            "address" => return Some(ElementaryType::Address),
            "bool" => return Some(ElementaryType::Bool),
            "string" => return Some(ElementaryType::String),
            "bytes" => return Some(ElementaryType::Bytes),
            "int8" => return Some(ElementaryType::I8),
            "uint8" => return Some(ElementaryType::U8),
            _ => {}
        }

        if let Some(size) = canonical.strip_prefix("bytes") {
            return match parse_width(size) {
                Some(1..=32) => Some(ElementaryType::Bytes),
                _ => None,
            };
        }

        let bits = canonical
            .strip_prefix("uint")
            .or_else(|| canonical.strip_prefix("int"))?;
        match parse_width(bits) {
            Some(bits) if (8..=256).contains(&bits) && bits % 8 == 0 => Some(ElementaryType::BigInt),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            ElementaryType::Address => "Address",
            ElementaryType::Bool => "bool",
            ElementaryType::String => "string",
            ElementaryType::Bytes => "Bytes",
            ElementaryType::BigInt => "BigInt",
            ElementaryType::I8 => "i8",
            ElementaryType::U8 => "u8",
        }
    }

    /// Library symbol backing this type, if it is not a language primitive
    pub fn lib_symbol(self) -> Option<LibSymbol> {
        match self {
            ElementaryType::Address => Some(LibSymbol::Address),
            ElementaryType::Bytes => Some(LibSymbol::Bytes),
            ElementaryType::BigInt => Some(LibSymbol::BigInt),
            _ => None,
        }
    }
}

/// Decimal width suffix of a sized type; leading zeros are not canonical
fn parse_width(digits: &str) -> Option<u16> {
    if digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// Maps ABI parameters to target types, recording the imports they need
pub struct TypeMapper<'a> {
    tuples: &'a TupleRegistry,
    imports: &'a mut ImportRegistry,
}

impl<'a> TypeMapper<'a> {
    pub fn new(tuples: &'a TupleRegistry, imports: &'a mut ImportRegistry) -> Self {
        Self { tuples, imports }
    }

    pub fn tuples(&self) -> &'a TupleRegistry {
        self.tuples
    }

    /// Record a library symbol the emitted code refers to
    pub fn add_import(&mut self, symbol: LibSymbol) {
        self.imports.add_type(symbol);
    }

    /// Target type name for a parameter. Arrays keep their depth as `[]` suffixes.
    pub fn map_abi_type(&mut self, param: &AbiParameter) -> String {
        match param.abi_type() {
            AbiType::Array { .. } => {
                let depth = array::array_depth(&param.param_type);
                let element = self.map_abi_type(&param.ultimate_element());
                format!("{}{}", element, ARRAY_MARKER.repeat(depth))
            }
            AbiType::Tuple => match self.tuples.class_name_for(param) {
                Some(class_name) => class_name.to_string(),
                None => {
                    warn!(
                        "No struct class registered for {} (internal type {:?})",
                        param.param_type, param.internal_type
                    );
                    UNKNOWN_TYPE.to_string()
                }
            },
            AbiType::Elementary(name) => match ElementaryType::from_abi(&name) {
                Some(elementary) => {
                    if let Some(symbol) = elementary.lib_symbol() {
                        self.imports.add_type(symbol);
                    }
                    elementary.type_name().to_string()
                }
                None => {
                    warn!("Unknown ABI type: {}", name);
                    UNKNOWN_TYPE.to_string()
                }
            },
        }
    }

    /// Expression turning `value` into what the encode primitive accepts
    pub fn to_lib_type(&mut self, mapped_type: &str, value: &str) -> String {
        if mapped_type.ends_with(ARRAY_MARKER) {
            return value.to_string();
        }

        match mapped_type {
            "bool" => {
                self.imports.add_type(LibSymbol::Bytes);
                format!("Bytes.fromBool({})", value)
            }
            "i8" => {
                self.imports.add_type(LibSymbol::BigInt);
                format!("BigInt.fromI8({})", value)
            }
            "u8" => {
                self.imports.add_type(LibSymbol::BigInt);
                format!("BigInt.fromU8({})", value)
            }
            "string" => {
                self.imports.add_type(LibSymbol::Bytes);
                format!("Bytes.fromUTF8({})", value)
            }
            _ => value.to_string(),
        }
    }

    /// Expression turning a decoded string `value` into `mapped_type`.
    ///
    /// `is_map_function` wraps it as a one-argument arrow function over `value`;
    /// otherwise `include_return` prefixes a return statement.
    pub fn generate_type_conversion(
        &self,
        mapped_type: &str,
        value: &str,
        is_map_function: bool,
        include_return: bool,
    ) -> String {
        let conversion = match mapped_type {
            "BigInt" | "Address" => format!("{}.fromString({})", mapped_type, value),
            "Bytes" => format!("Bytes.fromHexString({})", value),
            "i8" | "u8" => format!("{}.parse({})", mapped_type, value),
            "bool" => format!("u8.parse({}) as bool", value),
            class_name if self.tuples.is_tuple_class_name(class_name) => {
                format!("{}.parse({})", class_name, value)
            }
            _ => value.to_string(),
        };

        if is_map_function {
            format!("({}: string) => {}", value, conversion)
        } else if include_return {
            format!("return {}", conversion)
        } else {
            conversion
        }
    }

    /// Expression decoding `access` (a decoded string) into `mapped_type`, splitting arrays
    /// level by level. Lambda variables are `item{depth}`.
    pub fn decode_expression(&mut self, mapped_type: &str, access: &str, depth: usize) -> String {
        match mapped_type.strip_suffix(ARRAY_MARKER) {
            Some(element_type) => {
                self.imports.add_type(LibSymbol::ParseCsvNotNullable);
                let item = format!("item{}", depth);
                let element = self.decode_expression(element_type, &item, depth + 1);
                format!(
                    "{access} === '' ? [] : parseCSVNotNullable({access}).map<{element_type}>(({item}: string) => {element})",
                    access = access,
                    element_type = element_type,
                    item = item,
                    element = element,
                )
            }
            None => self.generate_type_conversion(mapped_type, access, false, false),
        }
    }

    /// `EvmEncodeParam` expression for `value` of ABI shape `param`. Lambda variables are `s{depth}`.
    pub fn build_encode_param(&mut self, value: &str, param: &AbiParameter, depth: usize) -> String {
        self.imports.add_type(LibSymbol::EvmEncodeParam);

        let signature = if param.is_tuple() {
            format!("(){}", array::array_suffix(&param.param_type))
        } else {
            canonical_type(param)
        };

        if param.is_array() {
            let element_var = format!("s{}", depth);
            let element = self.build_encode_param(&element_var, &param.element(), depth + 1);
            return format!(
                "EvmEncodeParam.fromValues('{}', {}.map<EvmEncodeParam>(({}) => {}))",
                signature, value, element_var, element
            );
        }

        if param.is_tuple() {
            return format!(
                "EvmEncodeParam.fromValues('{}', {}.toEvmEncodeParams())",
                signature, value
            );
        }

        let mapped = self.map_abi_type(param);
        let converted = self.to_lib_type(&mapped, value);
        format!("EvmEncodeParam.fromValue('{}', {})", signature, converted)
    }
}
