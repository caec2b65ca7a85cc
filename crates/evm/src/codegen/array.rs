//! String helpers over ABI array type syntax (`uint256[2][]`, `tuple[]`, ...)
//!
//! Malformed input is returned unchanged; none of these functions fail.

/// Whether the type is an array type, i.e. ends with `]`
pub fn is_array_type(abi_type: &str) -> bool {
    abi_type.ends_with(']')
}

/// Strip exactly one trailing array level, e.g. `uint256[2][]` -> `uint256[2]`
pub fn base_type(abi_type: &str) -> &str {
    if !is_array_type(abi_type) {
        return abi_type;
    }
    match abi_type.rfind('[') {
        Some(bracket_pos) => &abi_type[..bracket_pos],
        None => abi_type,
    }
}

/// Number of strippable array levels, e.g. `uint256[][]` -> 2
pub fn array_depth(abi_type: &str) -> usize {
    let mut depth = 0;
    let mut current = abi_type;
    loop {
        let stripped = base_type(current);
        if stripped.len() == current.len() {
            return depth;
        }
        depth += 1;
        current = stripped;
    }
}

/// Strip every array level, e.g. `tuple[2][]` -> `tuple`
pub fn ultimate_base_type(abi_type: &str) -> &str {
    let mut current = abi_type;
    loop {
        let stripped = base_type(current);
        if stripped.len() == current.len() {
            return current;
        }
        current = stripped;
    }
}

/// The array part of a type, e.g. `uint256[2][]` -> `[2][]`; empty for non-arrays
pub fn array_suffix(abi_type: &str) -> &str {
    &abi_type[ultimate_base_type(abi_type).len()..]
}
