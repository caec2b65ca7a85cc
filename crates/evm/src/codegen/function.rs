//! Contract method generation, one method per ABI function

use super::imports::LibSymbol;
use super::names::{NameContext, NameResolver, ResolvedParameter};
use super::parser::{AbiFunction, AbiParameter};
use super::signature::{canonical_type, function_selector, tuple_signature};
use super::types::{TypeMapper, UNKNOWN_TYPE};

/// Payload type of a read method without outputs; the payload is `true` once the call succeeded
pub const EMPTY_OUTPUT_TYPE: &str = "bool";

/// Name of the extra trailing parameter of payable methods
const PAYABLE_VALUE_PARAM: &str = "value";

/// Whether the function changes chain state (nonpayable or payable)
pub fn is_write_function(function: &AbiFunction) -> bool {
    function.is_write()
}

/// Emits read methods (immediate call, decoded result) and write methods (call builder)
pub struct FunctionCodeGenerator<'r> {
    resolver: &'r NameResolver,
}

impl<'r> FunctionCodeGenerator<'r> {
    pub fn new(resolver: &'r NameResolver) -> Self {
        Self { resolver }
    }

    /// The full method text, indented for a class body
    pub fn generate_method(&self, function: &AbiFunction, method_name: &str, mapper: &mut TypeMapper) -> String {
        let mut params = function.inputs.clone();
        if function.is_payable() {
            params.push(AbiParameter::named(PAYABLE_VALUE_PARAM, "uint256"));
        }
        let mut resolved = self.resolver.resolve_parameter_names(&params, NameContext::FunctionParameter, "param");
        let value_param = if function.is_payable() { resolved.pop() } else { None };

        let mut signature_params: Vec<String> = resolved
            .iter()
            .map(|p| format!("{}: {}", p.escaped_name, mapper.map_abi_type(&p.param)))
            .collect();
        if let Some(value) = &value_param {
            signature_params.push(format!("{}: {}", value.escaped_name, mapper.map_abi_type(&value.param)));
        }

        let call_data = self.call_data(function, &resolved, mapper);

        if is_write_function(function) {
            let value_name = value_param.as_ref().map(|p| p.escaped_name.as_str());
            self.write_method(method_name, &signature_params, &call_data, value_name, mapper)
        } else {
            self.read_method(function, method_name, &signature_params, &call_data, mapper)
        }
    }

    /// Mapped return type: `bool` without outputs, the single output's type, or the outputs struct class
    pub fn return_type(&self, function: &AbiFunction, mapper: &mut TypeMapper) -> String {
        match function.outputs.as_slice() {
            [] => EMPTY_OUTPUT_TYPE.to_string(),
            [single] => mapper.map_abi_type(single),
            _ => match mapper.tuples().outputs_class_name(function) {
                Some(class_name) => class_name.to_string(),
                None => {
                    tracing::warn!("No outputs struct registered for function {}", function.name);
                    UNKNOWN_TYPE.to_string()
                }
            },
        }
    }

    /// ABI signature the raw response is decoded with
    fn decode_signature(function: &AbiFunction) -> String {
        match function.outputs.as_slice() {
            [single] => canonical_type(single),
            outputs => tuple_signature(outputs),
        }
    }

    /// Selector followed by the encoded arguments, as a string expression
    fn call_data(&self, function: &AbiFunction, params: &[ResolvedParameter], mapper: &mut TypeMapper) -> String {
        let selector = function_selector(function);
        if params.is_empty() {
            return format!("'{}'", selector);
        }

        mapper.add_import(LibSymbol::Evm);
        let encode_params: Vec<String> = params
            .iter()
            .map(|p| mapper.build_encode_param(&p.escaped_name, &p.param, 0))
            .collect();
        format!("'{}' + evm.encode([{}])", selector, encode_params.join(", "))
    }

    fn read_method(
        &self,
        function: &AbiFunction,
        method_name: &str,
        signature_params: &[String],
        call_data: &str,
        mapper: &mut TypeMapper,
    ) -> String {
        mapper.add_import(LibSymbol::Environment);
        mapper.add_import(LibSymbol::Result);

        let return_type = self.return_type(function, mapper);
        let outcome = format!("Result<{}, string>", return_type);

        let mut lines = vec![
            format!("  {}({}): {} {{", method_name, signature_params.join(", "), outcome),
            format!("    const encodedData = {}", call_data),
            "    const response = environment.evmCallQuery(this.address, this.chainId, encodedData, this.timestamp)".to_string(),
            format!("    if (response.isError) return Result.err<{}, string>(response.error)", return_type),
        ];

        if function.outputs.is_empty() {
            lines.push(format!("    return Result.ok<{}, string>(true)", return_type));
        } else {
            mapper.add_import(LibSymbol::Evm);
            mapper.add_import(LibSymbol::EvmDecodeParam);
            lines.push(format!(
                "    const decodedResponse = evm.decode(new EvmDecodeParam('{}', response.value))",
                Self::decode_signature(function)
            ));
            lines.push(format!(
                "    return Result.ok<{}, string>({})",
                return_type,
                mapper.decode_expression(&return_type, "decodedResponse", 0)
            ));
        }

        lines.push("  }".to_string());
        lines.join("\n")
    }

    fn write_method(
        &self,
        method_name: &str,
        signature_params: &[String],
        call_data: &str,
        value_name: Option<&str>,
        mapper: &mut TypeMapper,
    ) -> String {
        mapper.add_import(LibSymbol::Bytes);
        mapper.add_import(LibSymbol::EvmCallBuilder);

        let add_call = match value_name {
            Some(value) => format!("addCall(this.address, encodedData, {})", value),
            None => "addCall(this.address, encodedData)".to_string(),
        };

        [
            format!("  {}({}): EvmCallBuilder {{", method_name, signature_params.join(", ")),
            format!("    const encodedData = Bytes.fromHexString({})", call_data),
            format!("    const builder = EvmCallBuilder.forChain(this.chainId).{}", add_call),
            "    const feeAmount = this.feeAmount".to_string(),
            "    if (feeAmount !== null) builder.addMaxFee(feeAmount)".to_string(),
            "    return builder".to_string(),
            "  }".to_string(),
        ]
        .join("\n")
    }
}
