//! Identifier collision resolution for emitted code
//!
//! Every scope the generator emits into (method parameters, method locals, class
//! members, contract methods) has its own reserved names. ABI names that clash with
//! them, or with each other, get a context suffix and then a counter.

use std::collections::HashSet;

use regex::Regex;

use super::imports::LibSymbol;
use super::parser::AbiParameter;

/// Target-language words that cannot name a parameter or a local
const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "default", "delete", "do", "else",
    "enum", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "let", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "type", "typeof", "var", "void", "while",
];

/// Scope an identifier is emitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameContext {
    FunctionParameter,
    LocalVariable,
    ClassProperty,
    ContractMethod,
}

impl NameContext {
    /// Suffix appended to an escaped name
    pub fn suffix(self) -> &'static str {
        match self {
            NameContext::FunctionParameter => "_param",
            NameContext::LocalVariable => "_var",
            NameContext::ClassProperty => "_prop",
            NameContext::ContractMethod => "_safe",
        }
    }

    /// Names the generator itself introduces in this scope
    fn reserved(self) -> &'static [&'static str] {
        match self {
            NameContext::FunctionParameter => &[
                "response",
                "decodedResponse",
                "encodedData",
                "builder",
                "feeAmount",
            ],
            NameContext::LocalVariable => &[
                "data",
                "topics",
                "parts",
                "decodedData",
                "response",
                "decodedResponse",
            ],
            NameContext::ClassProperty => &[
                "constructor",
                "parse",
                "decode",
                "toEvmEncodeParams",
                "address",
                "chainId",
                "timestamp",
                "feeAmount",
                "TOPIC",
            ],
            NameContext::ContractMethod => &[
                "constructor",
                "address",
                "chainId",
                "timestamp",
                "feeAmount",
            ],
        }
    }

    /// Bindings in these scopes would shadow keywords and imported library names
    fn declares_bindings(self) -> bool {
        matches!(self, NameContext::FunctionParameter | NameContext::LocalVariable)
    }
}

/// A parameter paired with the identifier chosen for it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter {
    pub param: AbiParameter,
    pub escaped_name: String,
}

/// Resolves identifier collisions per [`NameContext`]
#[derive(Debug, Clone)]
pub struct NameResolver {
    internal_patterns: Vec<Regex>,
}

impl NameResolver {
    pub fn new() -> Self {
        // lambda variables of generated `.map` calls
        let internal_patterns = [r"^item\d+$", r"^s\d+$"]
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();
        Self { internal_patterns }
    }

    fn has_conflict(&self, name: &str, context: NameContext) -> bool {
        context.reserved().contains(&name)
            || (context.declares_bindings()
                && (KEYWORDS.contains(&name) || LibSymbol::is_exported_name(name)))
            || self.internal_patterns.iter().any(|pattern| pattern.is_match(name))
    }

    fn escape_name(&self, name: &str, context: NameContext) -> String {
        if !self.has_conflict(name, context) {
            return name.to_string();
        }

        let suffix = context.suffix();
        let mut escaped = format!("{}{}", name, suffix);
        let mut counter = 1;
        while self.has_conflict(&escaped, context) {
            escaped = format!("{}{}{}", name, suffix, counter);
            counter += 1;
        }
        escaped
    }

    /// Escape reserved names and make the list duplicate-free.
    /// Output has the same length and order as the input.
    pub fn resolve_names(&self, names: &[String], context: NameContext) -> Vec<String> {
        let mut used = HashSet::with_capacity(names.len());

        names
            .iter()
            .map(|original| {
                let mut escaped = self.escape_name(original, context);
                let mut counter = 1;
                while used.contains(&escaped) {
                    escaped = format!("{}{}{}", original, context.suffix(), counter);
                    counter += 1;
                }
                used.insert(escaped.clone());
                escaped
            })
            .collect()
    }

    /// Name every parameter: its own name when present, `{default_prefix}{index}` otherwise,
    /// then escaped within `context`
    pub fn resolve_parameter_names(
        &self,
        params: &[AbiParameter],
        context: NameContext,
        default_prefix: &str,
    ) -> Vec<ResolvedParameter> {
        let originals: Vec<String> = params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                if param.name.is_empty() {
                    format!("{}{}", default_prefix, index)
                } else {
                    param.name.clone()
                }
            })
            .collect();

        self.resolve_names(&originals, context)
            .into_iter()
            .zip(params)
            .map(|(escaped_name, param)| ResolvedParameter {
                param: param.clone(),
                escaped_name,
            })
            .collect()
    }

    /// `base` if free, else the first free `base1`, `base2`, ...; the result is added to `taken`
    pub fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }
        taken.insert(candidate.clone());
        candidate
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}
