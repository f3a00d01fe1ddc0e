//! Interface model
//!
//!     The immutable result of a parse. Generators consume only this surface: they never see
//!     the stream, the builders or the parser stack.
//!
//! Structure
//!
//!     The [Model] owns every declared interface, dictionary, enum, typedef and namespace, each
//!     in declaration order. Elements refer to one another by name; the model keeps name
//!     indices so those references can be followed without the elements owning each other.
//!
//!     See [elements] for the entities and [types] for type references.
//!
//! Packages
//!
//!     A package marker comment (`// [package=physx.geometry]`) assigns every following
//!     top-level declaration to that package, until the next marker. Declarations before the
//!     first marker belong to the empty package `""`.
//!
//! Lifecycle
//!
//!     A model is produced once, by [ModelBuilder::build](builders::ModelBuilder::build), and is
//!     never mutated afterwards. There are no mutating methods.

pub mod builders;
pub mod canonical;
pub mod decorator;
pub mod elements;
pub mod types;

pub use builders::ModelBuilder;
pub use decorator::{Decorated, Decorator};
pub use elements::{
    Attribute, Constant, Dictionary, DictionaryMember, Enum, Function, FunctionParameter,
    Interface, Namespace, TypeDef,
};
pub use types::{IdlType, SimpleType};

use crate::webidl::error::Warning;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Serialize)]
pub struct Model {
    interfaces: Vec<Interface>,
    dictionaries: Vec<Dictionary>,
    enums: Vec<Enum>,
    typedefs: Vec<TypeDef>,
    namespaces: Vec<Namespace>,
    warnings: Vec<Warning>,
    #[serde(skip)]
    index: NameIndex,
}

/// Name lookup tables, filled once when the model is finished.
#[derive(Debug, Clone, Default)]
struct NameIndex {
    interfaces: HashMap<String, usize>,
    dictionaries: HashMap<String, usize>,
    enums: HashMap<String, usize>,
    typedefs: HashMap<String, usize>,
}

/// Models compare by content; the name indices are derived data.
impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.interfaces == other.interfaces
            && self.dictionaries == other.dictionaries
            && self.enums == other.enums
            && self.typedefs == other.typedefs
            && self.namespaces == other.namespaces
            && self.warnings == other.warnings
    }
}

impl Model {
    /// Assemble a finished model and build its name indices.
    pub(crate) fn finish(
        interfaces: Vec<Interface>,
        dictionaries: Vec<Dictionary>,
        enums: Vec<Enum>,
        typedefs: Vec<TypeDef>,
        namespaces: Vec<Namespace>,
        warnings: Vec<Warning>,
    ) -> Self {
        fn positions<'a>(names: impl Iterator<Item = &'a String>) -> HashMap<String, usize> {
            names
                .enumerate()
                .map(|(idx, name)| (name.clone(), idx))
                .collect()
        }

        let index = NameIndex {
            interfaces: positions(interfaces.iter().map(|i| &i.name)),
            dictionaries: positions(dictionaries.iter().map(|d| &d.name)),
            enums: positions(enums.iter().map(|e| &e.name)),
            typedefs: positions(typedefs.iter().map(|t| &t.name)),
        };
        Self {
            interfaces,
            dictionaries,
            enums,
            typedefs,
            namespaces,
            warnings,
            index,
        }
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dictionaries
    }

    pub fn enums(&self) -> &[Enum] {
        &self.enums
    }

    pub fn typedefs(&self) -> &[TypeDef] {
        &self.typedefs
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Advisories produced by `build()`, e.g. duplicate-arity overloads.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.index.interfaces.get(name).map(|&idx| &self.interfaces[idx])
    }

    pub fn dictionary(&self, name: &str) -> Option<&Dictionary> {
        self.index
            .dictionaries
            .get(name)
            .map(|&idx| &self.dictionaries[idx])
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enum> {
        self.index.enums.get(name).map(|&idx| &self.enums[idx])
    }

    pub fn typedef(&self, name: &str) -> Option<&TypeDef> {
        self.index.typedefs.get(name).map(|&idx| &self.typedefs[idx])
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|n| n.name == name)
    }

    /// Sorted set of every package that holds at least one interface, dictionary or enum.
    pub fn collect_packages(&self) -> BTreeSet<String> {
        self.interfaces
            .iter()
            .map(|i| &i.source_package)
            .chain(self.dictionaries.iter().map(|d| &d.source_package))
            .chain(self.enums.iter().map(|e| &e.source_package))
            .cloned()
            .collect()
    }

    pub fn interfaces_by_package(&self, package: &str) -> Vec<&Interface> {
        self.interfaces
            .iter()
            .filter(|i| i.source_package == package)
            .collect()
    }

    pub fn dictionaries_by_package(&self, package: &str) -> Vec<&Dictionary> {
        self.dictionaries
            .iter()
            .filter(|d| d.source_package == package)
            .collect()
    }

    pub fn enums_by_package(&self, package: &str) -> Vec<&Enum> {
        self.enums
            .iter()
            .filter(|e| e.source_package == package)
            .collect()
    }

    /// Follow typedef aliases to the underlying type. An array alias keeps its `[]`.
    pub fn resolve_type(&self, idl_type: &IdlType) -> IdlType {
        let mut resolved = idl_type.clone();
        // Each alias can be followed at most once, which also stops alias cycles.
        for _ in 0..self.typedefs.len() {
            let Some(alias) = self.typedef(resolved.type_name()) else {
                break;
            };
            let is_array = resolved.is_array() || alias.idl_type.is_array();
            resolved = if is_array {
                IdlType::array_of(alias.idl_type.type_name())
            } else {
                IdlType::simple(alias.idl_type.type_name())
            };
        }
        resolved
    }

    /// Whether the type (after typedef resolution) names a declared enum.
    pub fn is_enum_type(&self, idl_type: &IdlType) -> bool {
        self.enumeration(self.resolve_type(idl_type).type_name())
            .is_some()
    }

    /// Direct super interfaces of `interface` that are declared in this model.
    pub fn super_interfaces_of(&self, interface: &Interface) -> Vec<&Interface> {
        interface
            .super_interfaces
            .iter()
            .filter_map(|name| self.interface(name))
            .collect()
    }

    /// Every transitive super interface, nearest first, each listed once.
    pub fn all_super_interfaces_of(&self, interface: &Interface) -> Vec<&Interface> {
        let mut seen = BTreeSet::new();
        seen.insert(interface.name.as_str());
        let mut result = Vec::new();
        let mut queue = self.super_interfaces_of(interface);
        while !queue.is_empty() {
            let mut next = Vec::new();
            for parent in queue {
                if seen.insert(parent.name.as_str()) {
                    next.extend(self.super_interfaces_of(parent));
                    result.push(parent);
                }
            }
            queue = next;
        }
        result
    }

    /// Render the model as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface(name: &str, supers: &[&str], package: &str) -> Interface {
        Interface {
            name: name.to_string(),
            super_interfaces: supers.iter().map(|s| s.to_string()).collect(),
            functions: vec![],
            attributes: vec![],
            decorators: vec![],
            setlike: None,
            source_package: package.to_string(),
        }
    }

    fn sample() -> Model {
        Model::finish(
            vec![
                interface("Base", &[], ""),
                interface("Middle", &["Base"], "geo"),
                interface("Leaf", &["Middle", "Base"], "geo"),
            ],
            vec![],
            vec![Enum {
                name: "Mode".to_string(),
                values: vec!["eA".to_string()],
                decorators: vec![],
                source_package: "enums".to_string(),
            }],
            vec![TypeDef {
                name: "ModeAlias".to_string(),
                idl_type: IdlType::simple("Mode"),
                decorators: vec![],
            }],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_lookup_by_name() {
        let model = sample();
        assert_eq!(model.interface("Middle").map(|i| i.name.as_str()), Some("Middle"));
        assert!(model.interface("Missing").is_none());
        assert!(model.enumeration("Mode").is_some());
    }

    #[test]
    fn test_packages() {
        let model = sample();
        let packages: Vec<_> = model.collect_packages().into_iter().collect();
        assert_eq!(packages, vec!["", "enums", "geo"]);
        assert_eq!(model.interfaces_by_package("geo").len(), 2);
        assert_eq!(model.enums_by_package("enums").len(), 1);
    }

    #[test]
    fn test_typedef_resolution() {
        let model = sample();
        assert!(model.is_enum_type(&IdlType::simple("ModeAlias")));
        assert!(model.is_enum_type(&IdlType::simple("Mode")));
        assert!(!model.is_enum_type(&IdlType::simple("long")));
        assert!(model.resolve_type(&IdlType::array_of("ModeAlias")).is_array());
    }

    #[test]
    fn test_transitive_supers() {
        let model = sample();
        let leaf = model.interface("Leaf").unwrap();
        let names: Vec<_> = model
            .all_super_interfaces_of(leaf)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Middle", "Base"]);
    }
}
