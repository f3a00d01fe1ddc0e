//! Decorators
//!
//!     A decorator is a bracket-tag annotation placed before a declaration:
//!
//!         [NoDelete, Prefix="Px"]
//!         interface PxFoo { ... };
//!
//!     Keys are an open set. Unknown keys are kept as written, so downstream generators can
//!     define their own. The constants on [Decorator] name the keys the common binding
//!     generators understand.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Decorator {
    pub key: String,
    pub value: Option<String>,
}

impl Decorator {
    pub const CONST: &'static str = "Const";
    pub const JS_IMPLEMENTATION: &'static str = "JSImplementation";
    pub const NO_DELETE: &'static str = "NoDelete";
    pub const NULLABLE: &'static str = "Nullable";
    pub const PREFIX: &'static str = "Prefix";
    pub const REF: &'static str = "Ref";
    pub const VALUE: &'static str = "Value";

    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

/// Read-only decorator queries shared by every decorated model element.
pub trait Decorated {
    fn decorators(&self) -> &[Decorator];

    fn has_decorator(&self, key: &str) -> bool {
        self.decorators().iter().any(|d| d.key == key)
    }

    fn decorator(&self, key: &str) -> Option<&Decorator> {
        self.decorators().iter().find(|d| d.key == key)
    }

    /// Value of the first decorator named `key`, or `default` if it is absent or has no value.
    fn decorator_value<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.decorator(key)
            .and_then(|d| d.value.as_deref())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tagged(Vec<Decorator>);

    impl Decorated for Tagged {
        fn decorators(&self) -> &[Decorator] {
            &self.0
        }
    }

    #[test]
    fn test_queries() {
        let tagged = Tagged(vec![
            Decorator::new(Decorator::NO_DELETE),
            Decorator::with_value(Decorator::PREFIX, "Px"),
            Decorator::new("Custom"),
        ]);
        assert!(tagged.has_decorator("NoDelete"));
        assert!(tagged.has_decorator("Custom"));
        assert!(!tagged.has_decorator("Value"));
        assert_eq!(tagged.decorator_value("Prefix", ""), "Px");
        assert_eq!(tagged.decorator_value("NoDelete", "none"), "none");
        assert_eq!(tagged.decorator_value("Missing", "fallback"), "fallback");
    }
}
