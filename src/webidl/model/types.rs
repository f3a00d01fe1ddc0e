//! Types
//!
//!     A type reference is a tagged variant. The only supported variant is the simple type: a
//!     (possibly multi-word) name with an optional `[]` array suffix. Whether the name denotes
//!     one of the built-in primitives decides `is_complex_type`.
//!
//!     Generics (`sequence<long>`), nullable types (`Foo?`) and unions (`(A or B)`) are rejected
//!     with [ErrorKind::UnsupportedType](crate::webidl::error::ErrorKind::UnsupportedType).
//!
//! Syntax
//!
//!     ["unsigned" | "unrestricted"] <name> ["[]"]
//!     <name> := "long long" | <identifier>

use crate::webidl::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SIMPLE_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>(?:unsigned |unrestricted )?(?:long long\b|[A-Za-z_]\w*))(?P<array> ?\[ ?\])?$",
    )
    .expect("valid type regex")
});

static TYPED_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z_(](?:.*\S)?)\s+(?P<name>[A-Za-z_]\w*)$").expect("valid declaration regex")
});

/// Names that map to built-in values rather than to declared interfaces.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "void",
    "boolean",
    "byte",
    "octet",
    "short",
    "unsigned short",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
    "float",
    "unrestricted float",
    "double",
    "unrestricted double",
    "DOMString",
    "USVString",
    "ByteString",
    "any",
    "object",
    "VoidPtr",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdlType {
    Simple(SimpleType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SimpleType {
    pub type_name: String,
    pub is_array: bool,
    pub is_complex_type: bool,
}

impl IdlType {
    /// A non-array simple type.
    pub fn simple(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let is_complex_type = !PRIMITIVE_TYPES.contains(&type_name.as_str());
        IdlType::Simple(SimpleType {
            type_name,
            is_array: false,
            is_complex_type,
        })
    }

    pub fn array_of(type_name: impl Into<String>) -> Self {
        match Self::simple(type_name) {
            IdlType::Simple(simple) => IdlType::Simple(SimpleType {
                is_array: true,
                ..simple
            }),
        }
    }

    /// Parse a type as written in a declaration. `offset` locates the text for errors.
    pub fn parse(text: &str, offset: usize) -> Result<Self, ParseError> {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let caps = SIMPLE_TYPE_REGEX
            .captures(&text)
            .ok_or_else(|| ParseError::unsupported_type(offset, &text))?;
        let name = caps["name"].to_string();
        if caps.name("array").is_some() {
            Ok(Self::array_of(name))
        } else {
            Ok(Self::simple(name))
        }
    }

    pub fn as_simple(&self) -> &SimpleType {
        match self {
            IdlType::Simple(simple) => simple,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.as_simple().type_name
    }

    pub fn is_array(&self) -> bool {
        self.as_simple().is_array
    }

    pub fn is_complex_type(&self) -> bool {
        self.as_simple().is_complex_type
    }

    pub fn is_void(&self) -> bool {
        let simple = self.as_simple();
        simple.type_name == "void" && !simple.is_array
    }
}

/// Split `Type name` into its type text and name. The type text is not validated here, so
/// unsupported forms still split and fail later with a precise error.
pub fn split_typed_name(declaration: &str) -> Option<(&str, &str)> {
    let caps = TYPED_NAME_REGEX.captures(declaration)?;
    let type_text = caps.name("type")?.as_str();
    if type_text.contains(&['=', ';', '{', '}'][..]) {
        return None;
    }
    Some((type_text, caps.name("name")?.as_str()))
}

/// Whether the squashed text reads as `Type name`.
pub fn starts_with_type(declaration: &str) -> bool {
    split_typed_name(declaration).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webidl::error::ErrorKind;

    #[test]
    fn test_parse_primitive() {
        let ty = IdlType::parse("long", 0).unwrap();
        assert_eq!(ty.type_name(), "long");
        assert!(!ty.is_complex_type());
        assert!(!ty.is_array());
    }

    #[test]
    fn test_parse_multi_word_primitive() {
        let ty = IdlType::parse("unsigned   long long", 0).unwrap();
        assert_eq!(ty.type_name(), "unsigned long long");
        assert!(!ty.is_complex_type());
    }

    #[test]
    fn test_parse_complex_array() {
        let ty = IdlType::parse("PxVec3[]", 0).unwrap();
        assert_eq!(ty.type_name(), "PxVec3");
        assert!(ty.is_array());
        assert!(ty.is_complex_type());
    }

    #[test]
    fn test_unsupported_forms_fail() {
        for text in ["sequence<long>", "Foo?", "(A or B)", "Promise<void>"] {
            let err = IdlType::parse(text, 7).unwrap_err();
            assert_eq!(err.kind, ErrorKind::UnsupportedType, "{}", text);
            assert_eq!(err.offset, 7);
        }
    }

    #[test]
    fn test_split_typed_name() {
        assert_eq!(split_typed_name("long long count"), Some(("long long", "count")));
        assert_eq!(split_typed_name("Foo[] items"), Some(("Foo[]", "items")));
        assert_eq!(split_typed_name("sequence<long> xs"), Some(("sequence<long>", "xs")));
        assert_eq!(split_typed_name("A a"), Some(("A", "a")));
        assert_eq!(split_typed_name("B[] items"), Some(("B[]", "items")));
        assert_eq!(split_typed_name("lonely"), None);
        assert_eq!(split_typed_name("a = b"), None);
    }

    #[test]
    fn test_is_void() {
        assert!(IdlType::simple("void").is_void());
        assert!(!IdlType::simple("VoidPtr").is_void());
    }
}
