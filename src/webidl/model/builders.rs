//! Model builders and finalization
//!
//!     Element parsers fill mutable builders while they are on the parser stack. When the whole
//!     input has been read, [ModelBuilder::build] freezes them into an immutable
//!     [Model](super::Model) in four passes:
//!
//!         1. Freeze: merge partial interfaces, reject duplicate names, convert every builder
//!            into its final element. Declaration order is preserved.
//!         2. Resolve: apply deferred `implements`/`includes` pairs and check inline super
//!            names. Anything left unresolved fails the build.
//!         3. Finish: build the model's name indices.
//!         4. Validate: report functions sharing a name and a parameter count.
//!
//!     References are only resolved here, never during parsing, since declarations may appear
//!     in any order.

use super::decorator::Decorator;
use super::elements::{
    Attribute, Constant, Dictionary, DictionaryMember, Enum, Function, FunctionParameter,
    Interface, Namespace, TypeDef,
};
use super::types::IdlType;
use super::Model;
use crate::webidl::config::ModelConfig;
use crate::webidl::error::{ErrorKind, ParseError, Warning};
use std::collections::HashMap;
use tracing::{debug, warn};

// ============================================================================
// ELEMENT BUILDERS
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct InterfaceBuilder {
    pub name: String,
    pub is_partial: bool,
    pub super_interfaces: Vec<String>,
    pub functions: Vec<FunctionBuilder>,
    pub attributes: Vec<Attribute>,
    pub decorators: Vec<Decorator>,
    pub setlike: Option<IdlType>,
    pub source_package: String,
    /// Offset of the declaration, for build errors.
    pub offset: usize,
}

impl InterfaceBuilder {
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            ..Self::default()
        }
    }

    /// Fold a partial declaration of the same interface into this one.
    fn merge(&mut self, other: InterfaceBuilder) {
        if self.is_partial && !other.is_partial {
            self.is_partial = false;
            self.source_package = other.source_package;
            self.offset = other.offset;
        }
        for name in other.super_interfaces {
            if !self.super_interfaces.contains(&name) {
                self.super_interfaces.push(name);
            }
        }
        self.functions.extend(other.functions);
        self.attributes.extend(other.attributes);
        self.decorators.extend(other.decorators);
        if self.setlike.is_none() {
            self.setlike = other.setlike;
        }
    }

    pub fn build(self) -> Interface {
        Interface {
            name: self.name,
            super_interfaces: self.super_interfaces,
            functions: self.functions.into_iter().map(FunctionBuilder::build).collect(),
            attributes: self.attributes,
            decorators: self.decorators,
            setlike: self.setlike,
            source_package: self.source_package,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    pub name: String,
    pub return_type: IdlType,
    pub parameters: Vec<FunctionParameter>,
    pub is_static: bool,
    pub decorators: Vec<Decorator>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>, return_type: IdlType) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameters: Vec::new(),
            is_static: false,
            decorators: Vec::new(),
        }
    }

    pub fn build(self) -> Function {
        Function {
            name: self.name,
            return_type: self.return_type,
            parameters: self.parameters,
            is_static: self.is_static,
            decorators: self.decorators,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DictionaryBuilder {
    pub name: String,
    pub members: Vec<DictionaryMember>,
    pub decorators: Vec<Decorator>,
    pub source_package: String,
    pub offset: usize,
}

impl DictionaryBuilder {
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            ..Self::default()
        }
    }

    pub fn build(self) -> Dictionary {
        Dictionary {
            name: self.name,
            members: self.members,
            decorators: self.decorators,
            source_package: self.source_package,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumBuilder {
    pub name: String,
    pub values: Vec<String>,
    pub decorators: Vec<Decorator>,
    pub source_package: String,
    pub offset: usize,
}

impl EnumBuilder {
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            ..Self::default()
        }
    }

    pub fn build(self) -> Enum {
        Enum {
            name: self.name,
            values: self.values,
            decorators: self.decorators,
            source_package: self.source_package,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceBuilder {
    pub name: String,
    pub constants: Vec<Constant>,
    pub decorators: Vec<Decorator>,
    pub offset: usize,
}

impl NamespaceBuilder {
    pub fn new(name: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            ..Self::default()
        }
    }

    pub fn build(self) -> Namespace {
        Namespace {
            name: self.name,
            constants: self.constants,
            decorators: self.decorators,
        }
    }
}

/// Which statement declared a deferred inheritance pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Implements,
    Includes,
}

impl Relation {
    pub fn keyword(self) -> &'static str {
        match self {
            Relation::Implements => "implements",
            Relation::Includes => "includes",
        }
    }
}

/// `Concrete implements Super;`, recorded during parsing and resolved by `build()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inheritance {
    pub concrete: String,
    pub super_name: String,
    pub relation: Relation,
    pub offset: usize,
}

// ============================================================================
// MODEL BUILDER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    interfaces: Vec<InterfaceBuilder>,
    dictionaries: Vec<DictionaryBuilder>,
    enums: Vec<EnumBuilder>,
    typedefs: Vec<(TypeDef, usize)>,
    namespaces: Vec<NamespaceBuilder>,
    inheritance: Vec<Inheritance>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interface(&mut self, interface: InterfaceBuilder) {
        self.interfaces.push(interface);
    }

    pub fn add_dictionary(&mut self, dictionary: DictionaryBuilder) {
        self.dictionaries.push(dictionary);
    }

    pub fn add_enum(&mut self, idl_enum: EnumBuilder) {
        self.enums.push(idl_enum);
    }

    pub fn add_typedef(&mut self, typedef: TypeDef, offset: usize) {
        self.typedefs.push((typedef, offset));
    }

    pub fn add_namespace(&mut self, namespace: NamespaceBuilder) {
        self.namespaces.push(namespace);
    }

    pub fn add_inheritance(&mut self, inheritance: Inheritance) {
        self.inheritance.push(inheritance);
    }

    /// Freeze with the default model configuration.
    pub fn build(self) -> Result<Model, ParseError> {
        self.build_with(&ModelConfig::default())
    }

    pub fn build_with(self, config: &ModelConfig) -> Result<Model, ParseError> {
        let ModelBuilder {
            interfaces,
            dictionaries,
            enums,
            typedefs,
            namespaces,
            inheritance,
        } = self;

        let mut names = DefinitionNames::default();
        let mut interfaces = merge_partials(interfaces, &mut names)?;
        for dictionary in &dictionaries {
            names.declare(&dictionary.name, "dictionary", dictionary.offset)?;
        }
        for idl_enum in &enums {
            names.declare(&idl_enum.name, "enum", idl_enum.offset)?;
        }
        for (typedef, offset) in &typedefs {
            names.declare(&typedef.name, "typedef", *offset)?;
        }
        for namespace in &namespaces {
            names.declare(&namespace.name, "namespace", namespace.offset)?;
        }

        resolve_inheritance(&mut interfaces, inheritance, config)?;

        let interfaces: Vec<Interface> = interfaces.into_iter().map(InterfaceBuilder::build).collect();
        let warnings = if config.warn_duplicate_arity {
            duplicate_arity_warnings(&interfaces)
        } else {
            Vec::new()
        };
        for warning in &warnings {
            warn!(%warning, "ambiguous overload");
        }

        let model = Model::finish(
            interfaces,
            dictionaries.into_iter().map(DictionaryBuilder::build).collect(),
            enums.into_iter().map(EnumBuilder::build).collect(),
            typedefs.into_iter().map(|(typedef, _)| typedef).collect(),
            namespaces.into_iter().map(NamespaceBuilder::build).collect(),
            warnings,
        );
        debug!(
            interfaces = model.interfaces().len(),
            dictionaries = model.dictionaries().len(),
            enums = model.enums().len(),
            warnings = model.warnings().len(),
            "model built"
        );
        Ok(model)
    }
}

// ============================================================================
// FINALIZE PASSES
// ============================================================================

/// Top-level definition names seen so far, with the kind that claimed them.
#[derive(Default)]
struct DefinitionNames {
    claimed: HashMap<String, &'static str>,
}

impl DefinitionNames {
    fn declare(&mut self, name: &str, kind: &'static str, offset: usize) -> Result<(), ParseError> {
        if let Some(previous) = self.claimed.get(name) {
            return Err(ParseError::new(
                ErrorKind::DuplicateDefinition,
                offset,
                format!("{} `{}` is already declared as a {}", kind, name, previous),
            )
            .with_stack(vec![format!("{} {}", kind, name)]));
        }
        self.claimed.insert(name.to_string(), kind);
        Ok(())
    }
}

fn merge_partials(
    builders: Vec<InterfaceBuilder>,
    names: &mut DefinitionNames,
) -> Result<Vec<InterfaceBuilder>, ParseError> {
    let mut merged: Vec<InterfaceBuilder> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for builder in builders {
        match positions.get(&builder.name) {
            Some(&idx) => {
                let existing = &mut merged[idx];
                if !existing.is_partial && !builder.is_partial {
                    return Err(ParseError::new(
                        ErrorKind::DuplicateDefinition,
                        builder.offset,
                        format!("interface `{}` is declared more than once", builder.name),
                    )
                    .with_stack(vec![format!("interface {}", builder.name)]));
                }
                existing.merge(builder);
            }
            None => {
                names.declare(&builder.name, "interface", builder.offset)?;
                positions.insert(builder.name.clone(), merged.len());
                merged.push(builder);
            }
        }
    }
    Ok(merged)
}

fn resolve_inheritance(
    interfaces: &mut [InterfaceBuilder],
    inheritance: Vec<Inheritance>,
    config: &ModelConfig,
) -> Result<(), ParseError> {
    let positions: HashMap<String, usize> = interfaces
        .iter()
        .enumerate()
        .map(|(idx, i)| (i.name.clone(), idx))
        .collect();

    if config.check_inline_supers {
        for interface in interfaces.iter() {
            if let Some(missing) = interface
                .super_interfaces
                .iter()
                .find(|name| !positions.contains_key(*name))
            {
                return Err(ParseError::new(
                    ErrorKind::UnresolvedSuperInterface,
                    interface.offset,
                    format!(
                        "super interface `{}` of `{}` is not declared",
                        missing, interface.name
                    ),
                )
                .with_stack(vec![format!("interface {}", interface.name)]));
            }
        }
    }

    for pair in inheritance {
        let statement = format!(
            "{} {} {}",
            pair.concrete,
            pair.relation.keyword(),
            pair.super_name
        );
        let unresolved = |what: String| {
            ParseError::new(ErrorKind::UnresolvedSuperInterface, pair.offset, what)
                .with_stack(vec![statement.clone()])
        };
        let Some(&idx) = positions.get(&pair.concrete) else {
            return Err(unresolved(format!(
                "interface `{}` not found for statement `{};`",
                pair.concrete, statement
            )));
        };
        if !positions.contains_key(&pair.super_name) {
            return Err(unresolved(format!(
                "interface `{}` not found for statement `{};`",
                pair.super_name, statement
            )));
        }
        let supers = &mut interfaces[idx].super_interfaces;
        if !supers.contains(&pair.super_name) {
            supers.push(pair.super_name);
        }
    }
    Ok(())
}

/// One warning per function whose name and parameter count are shared with another function
/// of the same interface.
fn duplicate_arity_warnings(interfaces: &[Interface]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for interface in interfaces {
        for (idx, function) in interface.functions.iter().enumerate() {
            let clashes = interface.functions.iter().enumerate().any(|(other_idx, other)| {
                other_idx != idx
                    && other.name == function.name
                    && other.parameters.len() == function.parameters.len()
            });
            if clashes {
                warnings.push(Warning::DuplicateArity {
                    interface: interface.name.clone(),
                    function: function.name.clone(),
                    arity: function.parameters.len(),
                });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, arity: usize) -> FunctionBuilder {
        let mut builder = FunctionBuilder::new(name, IdlType::simple("void"));
        builder.parameters = (0..arity)
            .map(|i| FunctionParameter {
                name: format!("p{}", i),
                idl_type: IdlType::simple("long"),
                is_optional: false,
                default_value: None,
                decorators: vec![],
            })
            .collect();
        builder
    }

    #[test]
    fn test_partial_interfaces_merge() {
        let mut model = ModelBuilder::new();
        let mut main = InterfaceBuilder::new("Foo", 0);
        main.functions.push(function("a", 0));
        let mut partial = InterfaceBuilder::new("Foo", 40);
        partial.is_partial = true;
        partial.functions.push(function("b", 0));
        model.add_interface(main);
        model.add_interface(partial);

        let model = model.build().unwrap();
        assert_eq!(model.interfaces().len(), 1);
        let names: Vec<_> = model.interfaces()[0]
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_interface_fails() {
        let mut model = ModelBuilder::new();
        model.add_interface(InterfaceBuilder::new("Foo", 0));
        model.add_interface(InterfaceBuilder::new("Foo", 20));
        let err = model.build().unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDefinition);
        assert_eq!(err.offset, 20);
    }

    #[test]
    fn test_enum_and_dictionary_share_name_scope() {
        let mut model = ModelBuilder::new();
        model.add_enum(EnumBuilder::new("Shape", 0));
        model.add_dictionary(DictionaryBuilder::new("Shape", 30));
        let err = model.build().unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDefinition);
    }

    #[test]
    fn test_implements_is_resolved() {
        let mut model = ModelBuilder::new();
        model.add_interface(InterfaceBuilder::new("Base", 0));
        model.add_interface(InterfaceBuilder::new("Derived", 10));
        model.add_inheritance(Inheritance {
            concrete: "Derived".to_string(),
            super_name: "Base".to_string(),
            relation: Relation::Implements,
            offset: 30,
        });
        let model = model.build().unwrap();
        assert_eq!(
            model.interface("Derived").unwrap().super_interfaces,
            vec!["Base".to_string()]
        );
    }

    #[test]
    fn test_unresolved_concrete_interface() {
        let mut model = ModelBuilder::new();
        model.add_interface(InterfaceBuilder::new("Base", 0));
        model.add_inheritance(Inheritance {
            concrete: "Ghost".to_string(),
            super_name: "Base".to_string(),
            relation: Relation::Includes,
            offset: 30,
        });
        let err = model.build().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedSuperInterface);
        assert_eq!(err.offset, 30);
        assert!(err.stack_mentions("Ghost includes Base"));
    }

    #[test]
    fn test_inline_super_check_can_be_disabled() {
        let mut builder = InterfaceBuilder::new("Derived", 0);
        builder.super_interfaces.push("External".to_string());
        let mut model = ModelBuilder::new();
        model.add_interface(builder);
        let config = ModelConfig {
            warn_duplicate_arity: true,
            check_inline_supers: false,
        };
        assert!(model.clone().build_with(&config).is_ok());
        assert_eq!(
            model.build().unwrap_err().kind,
            ErrorKind::UnresolvedSuperInterface
        );
    }

    #[test]
    fn test_duplicate_arity_warns_for_each_function() {
        let mut interface = InterfaceBuilder::new("Foo", 0);
        interface.functions.push(function("set", 1));
        interface.functions.push(function("set", 1));
        interface.functions.push(function("set", 2));
        let mut model = ModelBuilder::new();
        model.add_interface(interface);

        let model = model.build().unwrap();
        assert_eq!(model.interfaces()[0].functions.len(), 3);
        assert_eq!(model.warnings().len(), 2);
    }
}
