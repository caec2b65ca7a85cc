//! Event decoder classes, one per ABI event

use bindgen_common::Result;
use serde_json::json;

use super::imports::LibSymbol;
use super::names::{NameContext, NameResolver, ResolvedParameter};
use super::parser::{AbiEvent, AbiParameter};
use super::signature::{canonical_type, event_topic, tuple_signature};
use super::templates::{TemplateManager, EVENT_CLASS_TEMPLATE};
use super::types::TypeMapper;

/// Class name an event would get before disambiguation
pub fn event_class_name(event: &AbiEvent) -> String {
    format!("{}Event", event.name)
}

/// Indexed values of dynamic or composite type are only present as their keccak hash
pub fn is_hashed_topic(param: &AbiParameter) -> bool {
    param.indexed
        && (param.is_array() || param.is_tuple() || param.param_type == "string" || param.param_type == "bytes")
}

pub struct EventCodeGenerator<'r> {
    resolver: &'r NameResolver,
}

impl<'r> EventCodeGenerator<'r> {
    pub fn new(resolver: &'r NameResolver) -> Self {
        Self { resolver }
    }

    /// Render the decoder class for `event` under `class_name`
    pub fn generate_event_class(
        &self,
        event: &AbiEvent,
        class_name: &str,
        mapper: &mut TypeMapper,
        templates: &TemplateManager,
    ) -> Result<String> {
        let fields = self.resolver.resolve_parameter_names(&event.inputs, NameContext::ClassProperty, "param");
        let field_names: Vec<String> = fields.iter().map(|f| f.escaped_name.clone()).collect();
        let locals = self.resolver.resolve_names(&field_names, NameContext::LocalVariable);

        let field_types: Vec<String> = fields
            .iter()
            .map(|field| {
                if is_hashed_topic(&field.param) {
                    mapper.add_import(LibSymbol::Bytes);
                    "Bytes".to_string()
                } else {
                    mapper.map_abi_type(&field.param)
                }
            })
            .collect();

        let mut members = String::new();
        if !event.anonymous {
            members.push_str(&format!("  static readonly TOPIC: string = '{}'\n", event_topic(event)));
        }
        for (field, field_type) in fields.iter().zip(&field_types) {
            members.push_str(&format!("  readonly {}: {}\n", field.escaped_name, field_type));
        }

        let constructor_params: Vec<String> = locals
            .iter()
            .zip(&field_types)
            .map(|(local, field_type)| format!("{}: {}", local, field_type))
            .collect();

        let assignments: String = fields
            .iter()
            .zip(&locals)
            .map(|(field, local)| format!("    this.{} = {}\n", field.escaped_name, local))
            .collect();

        let decode_lines = self.decode_lines(event, &fields, &locals, &field_types, mapper);

        templates.render(
            EVENT_CLASS_TEMPLATE,
            &json!({
                "class_name": class_name,
                "members": members,
                "constructor_params": constructor_params.join(", "),
                "assignments": assignments,
                "decode_lines": decode_lines.join("\n"),
                "constructor_args": locals.join(", "),
            }),
        )
    }

    fn decode_lines(
        &self,
        event: &AbiEvent,
        fields: &[ResolvedParameter],
        locals: &[String],
        field_types: &[String],
        mapper: &mut TypeMapper,
    ) -> Vec<String> {
        // topics[0] holds the signature hash unless the event is anonymous
        let topic_offset = if event.anonymous { 0 } else { 1 };
        let indexed_count = fields.iter().filter(|f| f.param.indexed).count();

        let mut lines = Vec::new();
        if indexed_count > 0 {
            lines.push(format!(
                "    if (topics.length < {}) throw new Error('Invalid topics for event {}')",
                indexed_count + topic_offset,
                event.name
            ));
        }

        let mut topic_index = topic_offset;
        for ((field, local), field_type) in fields.iter().zip(locals).zip(field_types) {
            if !field.param.indexed {
                continue;
            }
            let topic = format!("topics[{}]", topic_index);
            topic_index += 1;

            let value = if is_hashed_topic(&field.param) {
                format!("Bytes.fromHexString({})", topic)
            } else {
                mapper.add_import(LibSymbol::Evm);
                mapper.add_import(LibSymbol::EvmDecodeParam);
                let decoded = format!(
                    "evm.decode(new EvmDecodeParam('{}', {}))",
                    canonical_type(&field.param),
                    topic
                );
                mapper.generate_type_conversion(field_type, &decoded, false, false)
            };
            lines.push(format!("    const {}: {} = {}", local, field_type, value));
        }

        let data_fields: Vec<(&ResolvedParameter, (&String, &String))> = fields
            .iter()
            .zip(locals.iter().zip(field_types))
            .filter(|(field, _)| !field.param.indexed)
            .collect();

        match data_fields.as_slice() {
            [] => {}
            [(field, (local, field_type))] => {
                mapper.add_import(LibSymbol::Evm);
                mapper.add_import(LibSymbol::EvmDecodeParam);
                lines.push(format!(
                    "    const decodedData = evm.decode(new EvmDecodeParam('{}', data))",
                    canonical_type(&field.param)
                ));
                lines.push(format!(
                    "    const {}: {} = {}",
                    local,
                    field_type,
                    mapper.decode_expression(field_type, "decodedData", 0)
                ));
            }
            several => {
                mapper.add_import(LibSymbol::Evm);
                mapper.add_import(LibSymbol::EvmDecodeParam);
                mapper.add_import(LibSymbol::ParseCsvNotNullable);

                let params: Vec<AbiParameter> = several.iter().map(|(field, _)| field.param.clone()).collect();
                lines.push(format!(
                    "    const decodedData = evm.decode(new EvmDecodeParam('{}', data))",
                    tuple_signature(&params)
                ));
                lines.push("    const parts = parseCSVNotNullable(decodedData)".to_string());
                lines.push(format!(
                    "    if (parts.length !== {}) throw new Error('Invalid data for event {}')",
                    several.len(),
                    event.name
                ));
                for (index, (_, (local, field_type))) in several.iter().enumerate() {
                    let access = format!("parts[{}]", index);
                    lines.push(format!(
                        "    const {}: {} = {}",
                        local,
                        field_type,
                        mapper.decode_expression(field_type, &access, 0)
                    ));
                }
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::imports::ImportRegistry;
    use crate::codegen::parser::AbiParser;
    use crate::codegen::tuples::TupleRegistry;
    use serde_json::json;

    fn render(abi: serde_json::Value) -> (String, String) {
        let abi = AbiParser::new().parse_value(&abi).unwrap();
        let resolver = NameResolver::new();
        let mut tuples = TupleRegistry::new();
        tuples.extract_definitions(&abi, &resolver);
        let templates = TemplateManager::new().unwrap();

        let mut imports = ImportRegistry::new("@mimicprotocol/lib-ts");
        let class = {
            let mut mapper = TypeMapper::new(&tuples, &mut imports);
            let event = abi.events().next().unwrap();
            EventCodeGenerator::new(&resolver)
                .generate_event_class(event, &event_class_name(event), &mut mapper, &templates)
                .unwrap()
        };
        (class, imports.generate_imports_code())
    }

    #[test]
    fn test_is_hashed_topic() {
        let mut param = AbiParameter::named("x", "string");
        assert!(!is_hashed_topic(&param));
        param.indexed = true;
        assert!(is_hashed_topic(&param));
        param.param_type = "uint256[]".to_string();
        assert!(is_hashed_topic(&param));
        param.param_type = "address".to_string();
        assert!(!is_hashed_topic(&param));
    }

    #[test]
    fn test_transfer_event() {
        let (class, imports) = render(json!([
            {"type": "event", "name": "Transfer", "anonymous": false, "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]}
        ]));
        assert_eq!(
            class,
            "export class TransferEvent {
  static readonly TOPIC: string = '0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef'
  readonly from: Address
  readonly to: Address
  readonly value: BigInt

  constructor(from: Address, to: Address, value: BigInt) {
    this.from = from
    this.to = to
    this.value = value
  }

  static decode(topics: string[], data: string): TransferEvent {
    if (topics.length < 3) throw new Error('Invalid topics for event Transfer')
    const from: Address = Address.fromString(evm.decode(new EvmDecodeParam('address', topics[1])))
    const to: Address = Address.fromString(evm.decode(new EvmDecodeParam('address', topics[2])))
    const decodedData = evm.decode(new EvmDecodeParam('uint256', data))
    const value: BigInt = BigInt.fromString(decodedData)
    return new TransferEvent(from, to, value)
  }
}"
        );
        assert_eq!(
            imports,
            "import { Address, BigInt, evm, EvmDecodeParam } from '@mimicprotocol/lib-ts'"
        );
    }

    #[test]
    fn test_anonymous_event_reads_from_first_topic() {
        let (class, _) = render(json!([
            {"type": "event", "name": "Log", "anonymous": true, "inputs": [
                {"name": "who", "type": "address", "indexed": true}
            ]}
        ]));
        assert!(!class.contains("TOPIC"));
        assert!(class.contains("if (topics.length < 1)"));
        assert!(class.contains("evm.decode(new EvmDecodeParam('address', topics[0]))"));
    }

    #[test]
    fn test_several_data_fields_split_decoded_tuple() {
        let (class, imports) = render(json!([
            {"type": "event", "name": "Swap", "inputs": [
                {"name": "sender", "type": "address", "indexed": true},
                {"name": "amounts", "type": "uint256[]", "indexed": false},
                {"name": "data", "type": "bytes", "indexed": false},
                {"name": "ok", "type": "bool", "indexed": false}
            ]}
        ]));
        assert!(class.contains("  readonly data: Bytes\n"));
        assert!(class.contains("const decodedData = evm.decode(new EvmDecodeParam('(uint256[],bytes,bool)', data))"));
        assert!(class.contains("const parts = parseCSVNotNullable(decodedData)"));
        assert!(class.contains("if (parts.length !== 3) throw new Error('Invalid data for event Swap')"));
        assert!(class.contains(
            "const amounts: BigInt[] = parts[0] === '' ? [] : parseCSVNotNullable(parts[0]).map<BigInt>((item0: string) => BigInt.fromString(item0))"
        ));
        assert!(class.contains("const data_var: Bytes = Bytes.fromHexString(parts[1])"));
        assert!(class.contains("const ok: bool = u8.parse(parts[2]) as bool"));
        assert!(class.contains("return new SwapEvent(sender, amounts, data_var, ok)"));
        assert!(imports.contains("parseCSVNotNullable"));
    }

    #[test]
    fn test_indexed_reference_types_are_hashes() {
        let (class, _) = render(json!([
            {"type": "event", "name": "Named", "inputs": [
                {"name": "name", "type": "string", "indexed": true},
                {"name": "", "type": "uint8", "indexed": false}
            ]}
        ]));
        assert!(class.contains("  readonly name: Bytes\n  readonly param1: u8\n"));
        assert!(class.contains("const name: Bytes = Bytes.fromHexString(topics[1])"));
        assert!(class.contains("const param1: u8 = u8.parse(decodedData)"));
    }

    #[test]
    fn test_event_without_inputs() {
        let (class, imports) = render(json!([
            {"type": "event", "name": "Paused", "inputs": []}
        ]));
        assert!(class.starts_with("export class PausedEvent {\n  static readonly TOPIC: string = '0x"));
        assert!(class.contains("static decode(topics: string[], data: string): PausedEvent {"));
        assert!(class.contains("return new PausedEvent()"));
        assert_eq!(imports, "");
    }
}
