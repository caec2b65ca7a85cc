//! Binding generator for contract ABIs
//!
//! Produces one source file per ABI: the import statement, the contract class,
//! then struct classes and event classes.

use bindgen_common::Result;
use serde_json::json;
use tracing::debug;

use super::event::{event_class_name, EventCodeGenerator};
use super::function::FunctionCodeGenerator;
use super::imports::{ImportRegistry, LibSymbol};
use super::names::{NameContext, NameResolver};
use super::parser::ContractAbi;
use super::templates::{TemplateManager, CONTRACT_CLASS_TEMPLATE};
use super::tuples::TupleRegistry;
use super::types::TypeMapper;
use super::DEFAULT_LIBRARY_MODULE;

/// Generates binding source text for contract ABIs
pub struct ContractBindingGenerator {
    templates: TemplateManager,
    library_module: String,
}

impl ContractBindingGenerator {
    /// Create a generator importing from the default runtime library
    pub fn new() -> Result<Self> {
        Self::with_library_module(DEFAULT_LIBRARY_MODULE)
    }

    /// Create a generator importing runtime symbols from `library_module`
    pub fn with_library_module<S: Into<String>>(library_module: S) -> Result<Self> {
        Ok(Self {
            templates: TemplateManager::new()?,
            library_module: library_module.into(),
        })
    }

    /// Generate the bindings for one contract.
    ///
    /// Returns an empty string when the ABI has neither functions nor events.
    /// Every call starts from fresh registries, so output depends on the inputs only.
    pub fn generate(&self, abi: &ContractAbi, contract_name: &str) -> Result<String> {
        if abi.is_empty() {
            debug!("Nothing to generate for {}", contract_name);
            return Ok(String::new());
        }

        let resolver = NameResolver::new();
        let mut tuples = TupleRegistry::new();
        tuples.reserve_class_name(contract_name);
        for symbol in LibSymbol::ALL {
            tuples.reserve_class_name(symbol.as_str());
        }
        tuples.extract_definitions(abi, &resolver);

        let mut imports = ImportRegistry::new(self.library_module.as_str());
        let mut sections = Vec::new();
        {
            let mut mapper = TypeMapper::new(&tuples, &mut imports);

            sections.push(self.generate_contract_class(abi, contract_name, &resolver, &mut mapper)?);
            sections.extend(tuples.generate_classes(&mut mapper, &resolver, &self.templates)?);

            let events = EventCodeGenerator::new(&resolver);
            let mut taken_names = tuples.taken_names().clone();
            for event in abi.events() {
                let class_name = NameResolver::unique_name(&event_class_name(event), &mut taken_names);
                sections.push(events.generate_event_class(event, &class_name, &mut mapper, &self.templates)?);
            }
        }

        let imports_code = imports.generate_imports_code();
        if !imports_code.is_empty() {
            sections.insert(0, imports_code);
        }

        debug!(
            "Generated {} with {} struct classes and {} event classes",
            contract_name,
            tuples.definitions().len(),
            abi.events().count()
        );

        let mut output = sections.join("\n\n");
        output.push('\n');
        Ok(output)
    }

    fn generate_contract_class(
        &self,
        abi: &ContractAbi,
        contract_name: &str,
        resolver: &NameResolver,
        mapper: &mut TypeMapper,
    ) -> Result<String> {
        mapper.add_import(LibSymbol::Address);
        mapper.add_import(LibSymbol::ChainId);
        mapper.add_import(LibSymbol::TokenAmount);

        let functions: Vec<_> = abi.functions().collect();
        let names: Vec<String> = functions.iter().map(|f| f.name.clone()).collect();
        let method_names = resolver.resolve_names(&names, NameContext::ContractMethod);

        let generator = FunctionCodeGenerator::new(resolver);
        let methods: String = functions
            .iter()
            .zip(&method_names)
            .map(|(function, method_name)| format!("\n\n{}", generator.generate_method(function, method_name, mapper)))
            .collect();

        self.templates.render(
            CONTRACT_CLASS_TEMPLATE,
            &json!({
                "class_name": contract_name,
                "methods": methods,
            }),
        )
    }
}
