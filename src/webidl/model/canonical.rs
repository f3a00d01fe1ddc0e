//! Canonical textual form
//!
//!     `Display` for the model and its elements writes interface-description text that parses
//!     back into an equal model. Whitespace is normalised (four-space indentation, one
//!     declaration per line), decorator values are always quoted, and `implements`/`includes`
//!     statements are folded into inline `: Super` lists.
//!
//!     Declarations are written per kind in declaration order: typedefs, namespaces,
//!     interfaces, dictionaries, then enums. A package marker is emitted whenever the package
//!     changes, using the default `package` marker key.

use super::decorator::Decorator;
use super::elements::{
    Attribute, Constant, Dictionary, DictionaryMember, Enum, Function, FunctionParameter,
    Interface, Namespace, TypeDef,
};
use super::types::IdlType;
use super::Model;
use std::fmt::{self, Display, Formatter, Write};

const INDENT: &str = "    ";

impl Display for IdlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())?;
        if self.is_array() {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl Display for Decorator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}=\"{}\"", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}

/// `[A, B="x"]` followed by `separator`, or nothing for an empty list.
fn write_decorators(f: &mut impl Write, decorators: &[Decorator], separator: &str) -> fmt::Result {
    if decorators.is_empty() {
        return Ok(());
    }
    let list: Vec<String> = decorators.iter().map(|d| d.to_string()).collect();
    write!(f, "[{}]{}", list.join(", "), separator)
}

impl Display for FunctionParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, " ")?;
        if self.is_optional {
            f.write_str("optional ")?;
        }
        write!(f, "{} {}", self.idl_type, self.name)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

fn parameter_list(parameters: &[FunctionParameter]) -> String {
    parameters
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, " ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(
            f,
            "{} {}({});",
            self.return_type,
            self.name,
            parameter_list(&self.parameters)
        )
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, " ")?;
        if self.is_static {
            f.write_str("static ")?;
        }
        if self.is_readonly {
            f.write_str("readonly ")?;
        }
        write!(f, "attribute {} {};", self.idl_type, self.name)
    }
}

impl Display for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, "\n")?;
        write!(f, "interface {}", self.name)?;
        if !self.super_interfaces.is_empty() {
            write!(f, " : {}", self.super_interfaces.join(", "))?;
        }
        f.write_str(" {\n")?;
        for attribute in &self.attributes {
            writeln!(f, "{}{}", INDENT, attribute)?;
        }
        for function in &self.functions {
            if self.is_constructor(function) {
                f.write_str(INDENT)?;
                write_decorators(f, &function.decorators, " ")?;
                writeln!(f, "constructor({});", parameter_list(&function.parameters))?;
            } else {
                writeln!(f, "{}{}", INDENT, function)?;
            }
        }
        if let Some(element) = &self.setlike {
            writeln!(f, "{}readonly setlike<{}>;", INDENT, element)?;
        }
        f.write_str("};")
    }
}

impl Display for DictionaryMember {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, " ")?;
        if self.required {
            f.write_str("required ")?;
        }
        write!(f, "{} {}", self.idl_type, self.name)?;
        if let Some(default) = &self.default_value {
            write!(f, " = {}", default)?;
        }
        f.write_str(";")
    }
}

impl Display for Dictionary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, "\n")?;
        writeln!(f, "dictionary {} {{", self.name)?;
        for member in &self.members {
            writeln!(f, "{}{}", INDENT, member)?;
        }
        f.write_str("};")
    }
}

impl Display for Enum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, "\n")?;
        writeln!(f, "enum {} {{", self.name)?;
        let values: Vec<String> = self
            .values
            .iter()
            .map(|v| format!("{}\"{}\"", INDENT, v))
            .collect();
        if !values.is_empty() {
            writeln!(f, "{}", values.join(",\n"))?;
        }
        f.write_str("};")
    }
}

impl Display for TypeDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("typedef ")?;
        write_decorators(f, &self.decorators, " ")?;
        write!(f, "{} {};", self.idl_type, self.name)
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "const {} {} = {};", self.idl_type, self.name, self.value)
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_decorators(f, &self.decorators, "\n")?;
        writeln!(f, "namespace {} {{", self.name)?;
        for constant in &self.constants {
            writeln!(f, "{}{}", INDENT, constant)?;
        }
        f.write_str("};")
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut blocks: Vec<String> = Vec::new();
        blocks.extend(self.typedefs().iter().map(|t| t.to_string()));
        blocks.extend(self.namespaces().iter().map(|n| n.to_string()));

        let mut package = String::new();
        let mut packaged = |element_package: &str, text: String| {
            if element_package == package {
                text
            } else {
                package = element_package.to_string();
                format!("// [package={}]\n\n{}", element_package, text)
            }
        };
        for interface in self.interfaces() {
            let block = packaged(&interface.source_package, interface.to_string());
            blocks.push(block);
        }
        for dictionary in self.dictionaries() {
            let block = packaged(&dictionary.source_package, dictionary.to_string());
            blocks.push(block);
        }
        for idl_enum in self.enums() {
            let block = packaged(&idl_enum.source_package, idl_enum.to_string());
            blocks.push(block);
        }

        for block in blocks {
            writeln!(f, "{}\n", block)?;
        }
        Ok(())
    }
}
