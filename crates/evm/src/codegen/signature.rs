//! Canonical ABI signatures, function selectors and event topics

use sha3::{Digest, Keccak256};

use super::abi_type::AbiType;
use super::parser::{AbiEvent, AbiFunction, AbiParameter};

/// Decay an elementary type alias to its canonical name (`uint` -> `uint256`)
pub fn canonical_elementary(abi_type: &str) -> &str {
    match abi_type {
        "uint" => "uint256",
        "int" => "int256",
        "fixed" => "fixed128x18",
        "ufixed" => "ufixed128x18",
        "byte" => "bytes1",
        other => other,
    }
}

/// Canonical type of a parameter. Structs expand to `(c1,c2,...)`, keeping the array suffix.
pub fn canonical_type(param: &AbiParameter) -> String {
    canonical_abi_type(&param.abi_type(), &param.components)
}

fn canonical_abi_type(abi_type: &AbiType, components: &[AbiParameter]) -> String {
    match abi_type {
        AbiType::Elementary(name) => canonical_elementary(name).to_string(),
        AbiType::Tuple => tuple_signature(components),
        AbiType::Array { element, size } => format!(
            "{}[{}]",
            canonical_abi_type(element, components),
            size.as_deref().unwrap_or("")
        ),
    }
}

/// `(t1,t2,...)` over canonical parameter types
pub fn tuple_signature(params: &[AbiParameter]) -> String {
    let types: Vec<String> = params.iter().map(canonical_type).collect();
    format!("({})", types.join(","))
}

/// `name(t1,t2,...)`
pub fn function_signature(name: &str, inputs: &[AbiParameter]) -> String {
    format!("{}{}", name, tuple_signature(inputs))
}

/// Keccak-256 of the UTF-8 bytes of `data`
pub fn keccak256(data: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_bytes());
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// 4-byte function selector, `0x`-prefixed
pub fn function_selector(function: &AbiFunction) -> String {
    let hash = keccak256(&function_signature(&function.name, &function.inputs));
    format!("0x{}", hex::encode(&hash[..4]))
}

/// Event signature hash (`topics[0]` of non-anonymous events), `0x`-prefixed
pub fn event_topic(event: &AbiEvent) -> String {
    let hash = keccak256(&function_signature(&event.name, &event.inputs));
    format!("0x{}", hex::encode(hash))
}
