//! Struct ("tuple") discovery, deduplication and class generation

use std::collections::HashSet;

use bindgen_common::Result;
use convert_case::{Case, Casing};
use regex::Regex;
use serde_json::json;
use tracing::debug;

use super::array;
use super::event::is_hashed_topic;
use super::imports::LibSymbol;
use super::names::{NameContext, NameResolver, ResolvedParameter};
use super::parser::{AbiFunction, AbiParameter, ContractAbi};
use super::signature::canonical_type;
use super::templates::{TemplateManager, TUPLE_CLASS_TEMPLATE};
use super::types::TypeMapper;

/// One struct class to emit
#[derive(Debug, Clone, PartialEq)]
pub struct TupleDefinition {
    pub class_name: String,
    /// Name declared in `internalType`, if any
    pub struct_name: Option<String>,
    /// Components with their field names resolved
    pub components: Vec<ResolvedParameter>,
}

impl TupleDefinition {
    /// Same arity, same canonical types, and names equal or missing on one side
    pub fn matches(&self, components: &[AbiParameter]) -> bool {
        self.components.len() == components.len()
            && self.components.iter().zip(components).all(|(known, candidate)| {
                canonical_type(&known.param) == canonical_type(candidate)
                    && (known.param.name == candidate.name
                        || known.param.name.is_empty()
                        || candidate.name.is_empty())
            })
    }

    /// Render the class: fields, constructor, `parse` and `toEvmEncodeParams`
    pub fn render(
        &self,
        mapper: &mut TypeMapper,
        resolver: &NameResolver,
        templates: &TemplateManager,
    ) -> Result<String> {
        mapper.add_import(LibSymbol::ParseCsvNotNullable);
        mapper.add_import(LibSymbol::EvmEncodeParam);

        let field_names: Vec<String> = self.components.iter().map(|c| c.escaped_name.clone()).collect();
        let locals = resolver.resolve_names(&field_names, NameContext::LocalVariable);

        let mut fields = Vec::with_capacity(self.components.len());
        let mut constructor_params = Vec::with_capacity(self.components.len());
        let mut assignments = Vec::with_capacity(self.components.len());
        let mut parse_lines = Vec::with_capacity(self.components.len());
        let mut encode_params = Vec::with_capacity(self.components.len());

        for (index, (component, local)) in self.components.iter().zip(&locals).enumerate() {
            let field = &component.escaped_name;
            let mapped = mapper.map_abi_type(&component.param);

            fields.push(format!("  readonly {}: {}", field, mapped));
            constructor_params.push(format!("{}: {}", local, mapped));
            assignments.push(format!("    this.{} = {}", field, local));

            let access = format!("parts[{}]", index);
            parse_lines.push(format!(
                "    const {}: {} = {}",
                local,
                mapped,
                mapper.decode_expression(&mapped, &access, 0)
            ));

            let value = format!("this.{}", field);
            encode_params.push(format!("      {},", mapper.build_encode_param(&value, &component.param, 0)));
        }

        templates.render(
            TUPLE_CLASS_TEMPLATE,
            &json!({
                "class_name": self.class_name,
                "fields": fields.join("\n"),
                "constructor_params": constructor_params.join(", "),
                "assignments": assignments.join("\n"),
                "component_count": self.components.len(),
                "parse_lines": parse_lines.join("\n"),
                "constructor_args": locals.join(", "),
                "encode_params": encode_params.join("\n"),
            }),
        )
    }
}

/// Every struct appearing in an ABI, one definition per distinct shape
#[derive(Debug)]
pub struct TupleRegistry {
    definitions: Vec<TupleDefinition>,
    taken_names: HashSet<String>,
    counter: usize,
    struct_pattern: Option<Regex>,
}

impl TupleRegistry {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            taken_names: HashSet::new(),
            counter: 0,
            struct_pattern: Regex::new(r"struct\s+(?:\w+\.)?(\w+)").ok(),
        }
    }

    /// Keep `name` free of struct classes (e.g. the contract class itself)
    pub fn reserve_class_name<S: Into<String>>(&mut self, name: S) {
        self.taken_names.insert(name.into());
    }

    /// Class names in use, struct classes and reserved names alike
    pub fn taken_names(&self) -> &HashSet<String> {
        &self.taken_names
    }

    /// Walk every function input and output, every multi-output return and every event
    /// input, registering each distinct struct shape once
    pub fn extract_definitions(&mut self, abi: &ContractAbi, resolver: &NameResolver) {
        for function in abi.functions() {
            for param in function.inputs.iter().chain(&function.outputs) {
                self.process_param(param, resolver);
            }
            if function.outputs.len() > 1 {
                let outputs = Self::outputs_param(function);
                self.process_param(&outputs, resolver);
            }
        }

        for event in abi.events() {
            // indexed structs and struct arrays only reach the topics as a hash
            for param in event.inputs.iter().filter(|param| !is_hashed_topic(param)) {
                self.process_param(param, resolver);
            }
        }

        debug!("Extracted {} struct definitions", self.definitions.len());
    }

    fn process_param(&mut self, param: &AbiParameter, resolver: &NameResolver) {
        if !param.is_tuple() {
            return;
        }

        let element = param.ultimate_element();
        if element.components.is_empty() || self.find_matching_definition(&element).is_some() {
            return;
        }

        let struct_name = self.struct_name(&element);
        let base_name = match &struct_name {
            Some(name) => name.clone(),
            None => {
                let synthesized = format!("Tuple{}", self.counter);
                self.counter += 1;
                synthesized
            }
        };
        let class_name = NameResolver::unique_name(&base_name, &mut self.taken_names);

        debug!("Registered struct class {}", class_name);
        self.definitions.push(TupleDefinition {
            class_name,
            struct_name,
            components: resolver.resolve_parameter_names(&element.components, NameContext::ClassProperty, "field"),
        });

        for component in &element.components {
            self.process_param(component, resolver);
        }
    }

    /// Synthetic struct standing for the combined return value of a multi-output function
    pub fn outputs_param(function: &AbiFunction) -> AbiParameter {
        let class_name = format!("{}Outputs", pascal_case(&function.name));
        AbiParameter::tuple(
            class_name.clone(),
            Some(format!("struct {}", class_name)),
            function.outputs.clone(),
        )
    }

    /// Struct name declared in the parameter's `internalType`
    fn struct_name(&self, param: &AbiParameter) -> Option<String> {
        let internal_type = array::ultimate_base_type(param.internal_type.as_deref()?);
        let captures = self.struct_pattern.as_ref()?.captures(internal_type)?;
        captures.get(1).map(|m| m.as_str().to_string())
    }

    /// Definition for a struct parameter (array levels ignored). Definitions declaring the
    /// same struct name are preferred over other structural matches.
    pub fn find_matching_definition(&self, param: &AbiParameter) -> Option<&TupleDefinition> {
        if !param.is_tuple() {
            return None;
        }
        let element = param.ultimate_element();
        let struct_name = self.struct_name(&element);

        self.definitions
            .iter()
            .filter(|def| struct_name.is_some() && def.struct_name == struct_name)
            .find(|def| def.matches(&element.components))
            .or_else(|| self.definitions.iter().find(|def| def.matches(&element.components)))
    }

    /// Class name for a struct parameter, if it was registered
    pub fn class_name_for(&self, param: &AbiParameter) -> Option<&str> {
        self.find_matching_definition(param).map(|def| def.class_name.as_str())
    }

    /// Class name of a multi-output function's return struct
    pub fn outputs_class_name(&self, function: &AbiFunction) -> Option<&str> {
        self.class_name_for(&Self::outputs_param(function))
    }

    pub fn is_tuple_class_name(&self, name: &str) -> bool {
        self.definitions.iter().any(|def| def.class_name == name)
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> &[TupleDefinition] {
        &self.definitions
    }

    /// Render every struct class in registration order
    pub fn generate_classes(
        &self,
        mapper: &mut TypeMapper,
        resolver: &NameResolver,
        templates: &TemplateManager,
    ) -> Result<Vec<String>> {
        self.definitions
            .iter()
            .map(|def| def.render(mapper, resolver, templates))
            .collect()
    }
}

impl Default for TupleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `get_pair-info` -> `GetPairinfo`: identifier characters only, then Pascal case
fn pascal_case(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
    let converted = cleaned.to_case(Case::Pascal);
    if converted.is_empty() {
        "UnnamedFunction".to_string()
    } else {
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::imports::ImportRegistry;
    use crate::codegen::parser::AbiParser;
    use serde_json::json;

    fn registry_for(abi: serde_json::Value) -> TupleRegistry {
        let abi = AbiParser::new().parse_value(&abi).unwrap();
        let mut registry = TupleRegistry::new();
        registry.extract_definitions(&abi, &NameResolver::new());
        registry
    }

    fn class_names(registry: &TupleRegistry) -> Vec<&str> {
        registry.definitions().iter().map(|d| d.class_name.as_str()).collect()
    }

    fn pair_param(name: &str, internal_type: &str) -> serde_json::Value {
        json!({
            "name": name,
            "type": "tuple",
            "internalType": internal_type,
            "components": [
                {"name": "a", "type": "uint256"},
                {"name": "b", "type": "string"}
            ]
        })
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("getReserves"), "GetReserves");
        assert_eq!(pascal_case("get-pair$info"), "Getpairinfo");
        assert_eq!(pascal_case("get_pair_info"), "GetPairInfo");
        assert_eq!(pascal_case("$$"), "UnnamedFunction");
    }

    #[test]
    fn test_shared_struct_registered_once() {
        let registry = registry_for(json!([
            {"type": "function", "name": "getData", "stateMutability": "view", "inputs": [],
             "outputs": [pair_param("", "struct Data")]},
            {"type": "function", "name": "setData", "stateMutability": "nonpayable",
             "inputs": [pair_param("data", "struct Data")], "outputs": []}
        ]));
        assert_eq!(class_names(&registry), vec!["Data"]);

        let fields: Vec<&str> = registry.definitions()[0].components.iter().map(|c| c.escaped_name.as_str()).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_same_name_different_shape_gets_two_classes() {
        let registry = registry_for(json!([
            {"type": "function", "name": "one", "stateMutability": "view", "inputs": [],
             "outputs": [pair_param("", "struct Lib.Data")]},
            {"type": "function", "name": "two", "stateMutability": "view", "inputs": [],
             "outputs": [{"name": "", "type": "tuple", "internalType": "struct Other.Data",
                          "components": [{"name": "x", "type": "address"}]}]}
        ]));
        assert_eq!(class_names(&registry), vec!["Data", "Data1"]);
    }

    #[test]
    fn test_anonymous_struct_reuses_structural_match() {
        let registry = registry_for(json!([
            {"type": "function", "name": "one", "stateMutability": "view", "inputs": [],
             "outputs": [pair_param("", "struct Pair")]},
            {"type": "function", "name": "two", "stateMutability": "view", "inputs": [],
             "outputs": [{"name": "", "type": "tuple",
                          "components": [{"name": "", "type": "uint"}, {"name": "b", "type": "string"}]}]}
        ]));
        assert_eq!(class_names(&registry), vec!["Pair"]);
    }

    #[test]
    fn test_synthesized_names_and_nested_structs() {
        let registry = registry_for(json!([
            {"type": "function", "name": "route", "stateMutability": "view", "inputs": [
                {"name": "path", "type": "tuple[]", "components": [
                    {"name": "pool", "type": "address"},
                    {"name": "fees", "type": "tuple", "components": [
                        {"name": "bps", "type": "uint24"}
                    ]}
                ]}
            ], "outputs": []}
        ]));
        assert_eq!(class_names(&registry), vec!["Tuple0", "Tuple1"]);

        let path = AbiParameter::tuple("", None, vec![
            AbiParameter::named("pool", "address"),
            AbiParameter::tuple("fees", None, vec![AbiParameter::named("bps", "uint24")]),
        ]);
        assert_eq!(registry.class_name_for(&path), Some("Tuple0"));
    }

    #[test]
    fn test_multi_output_function_gets_outputs_struct() {
        let registry = registry_for(json!([
            {"type": "function", "name": "getReserves", "stateMutability": "view", "inputs": [],
             "outputs": [{"name": "reserve0", "type": "uint112"}, {"name": "reserve1", "type": "uint112"}]}
        ]));
        assert_eq!(class_names(&registry), vec!["GetReservesOutputs"]);
    }

    #[test]
    fn test_event_structs_are_registered() {
        let registry = registry_for(json!([
            {"type": "event", "name": "Updated", "inputs": [pair_param("value", "struct Pair")]}
        ]));
        assert_eq!(class_names(&registry), vec!["Pair"]);
    }

    #[test]
    fn test_indexed_event_structs_are_not_registered() {
        let mut indexed = pair_param("value", "struct Pair");
        indexed["indexed"] = json!(true);
        let registry = registry_for(json!([
            {"type": "event", "name": "Updated", "inputs": [indexed]}
        ]));
        assert!(registry.definitions().is_empty());
    }

    #[test]
    fn test_reserved_class_names_are_avoided() {
        let abi = AbiParser::new().parse_value(&json!([
            {"type": "function", "name": "get", "stateMutability": "view", "inputs": [],
             "outputs": [pair_param("", "struct Vault")]}
        ])).unwrap();
        let mut registry = TupleRegistry::new();
        registry.reserve_class_name("Vault");
        registry.extract_definitions(&abi, &NameResolver::new());
        assert_eq!(class_names(&registry), vec!["Vault1"]);
    }

    #[test]
    fn test_reserved_field_names_are_escaped() {
        let registry = registry_for(json!([
            {"type": "function", "name": "get", "stateMutability": "view", "inputs": [], "outputs": [
                {"name": "", "type": "tuple", "internalType": "struct Weird", "components": [
                    {"name": "address", "type": "address"},
                    {"name": "", "type": "uint8"},
                    {"name": "parse", "type": "bool"}
                ]}
            ]}
        ]));
        let fields: Vec<&str> = registry.definitions()[0].components.iter().map(|c| c.escaped_name.as_str()).collect();
        assert_eq!(fields, vec!["address_prop", "field1", "parse_prop"]);
    }

    #[test]
    fn test_render_struct_class() {
        let registry = registry_for(json!([
            {"type": "function", "name": "getData", "stateMutability": "view", "inputs": [],
             "outputs": [pair_param("", "struct Data")]}
        ]));
        let resolver = NameResolver::new();
        let templates = TemplateManager::new().unwrap();
        let mut imports = ImportRegistry::new("@mimicprotocol/lib-ts");
        let mut mapper = TypeMapper::new(&registry, &mut imports);

        let classes = registry.generate_classes(&mut mapper, &resolver, &templates).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(
            classes[0],
            "export class Data {
  readonly a: BigInt
  readonly b: string

  constructor(a: BigInt, b: string) {
    this.a = a
    this.b = b
  }

  static parse(data: string): Data {
    const parts = parseCSVNotNullable(data)
    if (parts.length !== 2) throw new Error('Invalid data for tuple parsing')
    const a: BigInt = BigInt.fromString(parts[0])
    const b: string = parts[1]
    return new Data(a, b)
  }

  toEvmEncodeParams(): EvmEncodeParam[] {
    return [
      EvmEncodeParam.fromValue('uint256', this.a),
      EvmEncodeParam.fromValue('string', Bytes.fromUTF8(this.b)),
    ]
  }
}"
        );
        assert_eq!(
            imports.generate_imports_code(),
            "import { BigInt, Bytes, EvmEncodeParam, parseCSVNotNullable } from '@mimicprotocol/lib-ts'"
        );
    }

    #[test]
    fn test_parse_locals_do_not_shadow_helpers() {
        let registry = registry_for(json!([
            {"type": "function", "name": "get", "stateMutability": "view", "inputs": [], "outputs": [
                {"name": "", "type": "tuple", "internalType": "struct Blob", "components": [
                    {"name": "data", "type": "bytes"},
                    {"name": "parts", "type": "uint256[]"}
                ]}
            ]}
        ]));
        let resolver = NameResolver::new();
        let templates = TemplateManager::new().unwrap();
        let mut imports = ImportRegistry::new("lib");
        let mut mapper = TypeMapper::new(&registry, &mut imports);
        let class = registry.definitions()[0].render(&mut mapper, &resolver, &templates).unwrap();

        assert!(class.contains("  readonly data: Bytes\n  readonly parts: BigInt[]"));
        assert!(class.contains("constructor(data_var: Bytes, parts_var: BigInt[])"));
        assert!(class.contains("    this.data = data_var\n    this.parts = parts_var"));
        assert!(class.contains("const data_var: Bytes = Bytes.fromHexString(parts[0])"));
        assert!(class.contains(
            "const parts_var: BigInt[] = parts[1] === '' ? [] : parseCSVNotNullable(parts[1])"
        ));
        assert!(class.contains("return new Blob(data_var, parts_var)"));
    }
}
