//! Model elements
//!
//!     The immutable entities of a built [Model](super::Model). They are produced only by the
//!     builders in [builders](super::builders); after `build()` nothing mutates them.
//!
//!     Elements refer to each other by name. An interface lists its super interfaces as names,
//!     a parameter names its type. Resolving a name to the element goes through the lookup
//!     methods of the owning `Model`.

use super::decorator::{Decorated, Decorator};
use super::types::IdlType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub name: String,
    /// Names of the super interfaces: inline `: A, B` first, then `implements`/`includes`
    /// statements in declaration order.
    pub super_interfaces: Vec<String>,
    pub functions: Vec<Function>,
    pub attributes: Vec<Attribute>,
    pub decorators: Vec<Decorator>,
    /// Element type of a `readonly setlike<T>` marker.
    pub setlike: Option<IdlType>,
    pub source_package: String,
}

impl Interface {
    /// First function called `name`.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// All overloads called `name`, in declaration order.
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Function> {
        self.functions.iter().filter(move |f| f.name == name)
    }

    /// Constructors are stored as non-static functions named after their interface and
    /// returning it.
    pub fn constructors(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| self.is_constructor(f))
    }

    pub fn is_constructor(&self, function: &Function) -> bool {
        !function.is_static
            && function.name == self.name
            && !function.return_type.is_array()
            && function.return_type.type_name() == self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

impl Decorated for Interface {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub return_type: IdlType,
    pub parameters: Vec<FunctionParameter>,
    pub is_static: bool,
    pub decorators: Vec<Decorator>,
}

impl Decorated for Function {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionParameter {
    pub name: String,
    pub idl_type: IdlType,
    pub is_optional: bool,
    /// Raw default value text, `optional long x = 0`.
    pub default_value: Option<String>,
    pub decorators: Vec<Decorator>,
}

impl Decorated for FunctionParameter {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub idl_type: IdlType,
    pub is_static: bool,
    pub is_readonly: bool,
    pub decorators: Vec<Decorator>,
}

impl Decorated for Attribute {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dictionary {
    pub name: String,
    pub members: Vec<DictionaryMember>,
    pub decorators: Vec<Decorator>,
    pub source_package: String,
}

impl Dictionary {
    pub fn member(&self, name: &str) -> Option<&DictionaryMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl Decorated for Dictionary {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryMember {
    pub name: String,
    pub idl_type: IdlType,
    pub required: bool,
    pub default_value: Option<String>,
    pub decorators: Vec<Decorator>,
}

impl Decorated for DictionaryMember {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name: String,
    pub values: Vec<String>,
    pub decorators: Vec<Decorator>,
    pub source_package: String,
}

impl Decorated for Enum {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub idl_type: IdlType,
    pub decorators: Vec<Decorator>,
}

impl Decorated for TypeDef {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Namespace {
    pub name: String,
    pub constants: Vec<Constant>,
    pub decorators: Vec<Decorator>,
}

impl Namespace {
    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }
}

impl Decorated for Namespace {
    fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    pub idl_type: IdlType,
    /// Raw value text as written after `=`.
    pub value: String,
}
