//! Type references as they appear in member signatures.
//!
//! A [`TypeSignature`] mirrors the ECMA-335 element types that matter for a declaration:
//! primitives, named classes and value types, arrays, by-reference and pointer wrappers,
//! generic instantiations and unbound generic parameters. Named types are referenced by
//! their qualified name and resolved lazily against the metadata provider.
//!
//! # Textual Form
//!
//! Signatures have a compact reflection-style text form, used by `Display`, `FromStr` and
//! as the serde representation inside metadata snapshots:
//!
//! | Text                                   | Signature                                   |
//! |----------------------------------------|---------------------------------------------|
//! | `System.Int32`                         | `Primitive(I4)`                             |
//! | `Acme.Widget`                          | `Class("Acme.Widget")`                      |
//! | `valuetype Acme.Point`                 | `ValueType("Acme.Point")`                   |
//! | `System.Int32&`, `System.Byte*`        | `ByRef(..)`, `Ptr(..)`                      |
//! | `System.String[]`, `System.Double[,]`  | `SzArray(..)`, `Array { rank: 2, .. }`      |
//! | `` System.Collections.Generic.List`1[System.Int32] `` | `GenericInst(Class(..), [..])` |
//! | `!T`, `!!TResult`                      | `GenericParamType`, `GenericParamMethod`    |
//! | `?`                                    | `Unknown`                                   |
//!
//! # Examples
//!
//! ```rust
//! use dotstub::metadata::{PrimitiveKind, TypeSignature};
//!
//! let sig: TypeSignature = "System.Int32&".parse()?;
//! assert_eq!(sig, TypeSignature::ByRef(Box::new(TypeSignature::Primitive(PrimitiveKind::I4))));
//! assert_eq!(sig.to_string(), "System.Int32&");
//! # Ok::<(), dotstub::Error>(())
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{metadata::primitives::PrimitiveKind, Error, Result};

/// Represents a type reference in a member signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TypeSignature {
    #[default]
    /// Not defined
    Unknown,
    /// A built-in primitive (including `System.String`, `System.Object` and `System.Void`)
    Primitive(PrimitiveKind),
    /// Reference type, by qualified name
    Class(String),
    /// Value type, by qualified name
    ValueType(String),
    /// Single dimension, zero based array
    SzArray(Box<TypeSignature>),
    /// Multi dimensional array
    Array {
        /// The type in the array
        base: Box<TypeSignature>,
        /// The number of dimensions
        rank: u32,
    },
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// A pointer to a type
    Ptr(Box<TypeSignature>),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Generic type parameter, by name
    GenericParamType(String),
    /// Generic method parameter, by name
    GenericParamMethod(String),
}

impl TypeSignature {
    /// Reference type by qualified name, primitives are recognised by their runtime name
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        match PrimitiveKind::from_fullname(&name) {
            Some(kind) => TypeSignature::Primitive(kind),
            None => TypeSignature::Class(name),
        }
    }

    /// Value type by qualified name, primitives are recognised by their runtime name
    pub fn value_type(name: impl Into<String>) -> Self {
        let name = name.into();
        match PrimitiveKind::from_fullname(&name) {
            Some(kind) => TypeSignature::Primitive(kind),
            None => TypeSignature::ValueType(name),
        }
    }

    /// `base&`
    #[must_use]
    pub fn by_ref(base: TypeSignature) -> Self {
        TypeSignature::ByRef(Box::new(base))
    }

    /// `base[]`
    #[must_use]
    pub fn sz_array(base: TypeSignature) -> Self {
        TypeSignature::SzArray(Box::new(base))
    }

    /// `definition[args...]`
    #[must_use]
    pub fn generic(definition: TypeSignature, args: Vec<TypeSignature>) -> Self {
        TypeSignature::GenericInst(Box::new(definition), args)
    }

    /// True for `System.Void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSignature::Primitive(PrimitiveKind::Void))
    }

    /// True if the outermost wrapper is a by-reference marker
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        matches!(self, TypeSignature::ByRef(_))
    }

    /// Strip all by-reference and pointer wrappers
    #[must_use]
    pub fn strip_indirection(&self) -> &TypeSignature {
        let mut current = self;
        while let TypeSignature::ByRef(inner) | TypeSignature::Ptr(inner) = current {
            current = inner;
        }
        current
    }

    /// Qualified name of a named type, looking through generic instantiations
    #[must_use]
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            TypeSignature::Class(name) | TypeSignature::ValueType(name) => Some(name),
            TypeSignature::Primitive(kind) => Some(kind.fullname()),
            TypeSignature::GenericInst(definition, _) => definition.qualified_name(),
            _ => None,
        }
    }
}

impl From<PrimitiveKind> for TypeSignature {
    fn from(kind: PrimitiveKind) -> Self {
        TypeSignature::Primitive(kind)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Unknown => write!(f, "?"),
            TypeSignature::Primitive(kind) => write!(f, "{}", kind.fullname()),
            TypeSignature::Class(name) => write!(f, "{name}"),
            TypeSignature::ValueType(name) => write!(f, "valuetype {name}"),
            TypeSignature::SzArray(base) => write!(f, "{base}[]"),
            TypeSignature::Array { base, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                write!(f, "{base}[{commas}]")
            }
            TypeSignature::ByRef(base) => write!(f, "{base}&"),
            TypeSignature::Ptr(base) => write!(f, "{base}*"),
            TypeSignature::GenericInst(definition, args) => {
                write!(f, "{definition}[")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
            TypeSignature::GenericParamType(name) => write!(f, "!{name}"),
            TypeSignature::GenericParamMethod(name) => write!(f, "!!{name}"),
        }
    }
}

impl FromStr for TypeSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SignatureParser::new(s).parse_complete()
    }
}

impl From<TypeSignature> for String {
    fn from(signature: TypeSignature) -> Self {
        signature.to_string()
    }
}

impl TryFrom<String> for TypeSignature {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Splits a qualified type name into `(namespace, simple name)`.
///
/// Nested type names (`Outer+Inner`) stay in the simple name.
#[must_use]
pub fn split_qualified_name(qualified: &str) -> (&str, &str) {
    let head = qualified.split('+').next().unwrap_or(qualified);
    match head.rfind('.') {
        Some(index) => (&qualified[..index], &qualified[index + 1..]),
        None => ("", qualified),
    }
}

const VALUETYPE_PREFIX: &str = "valuetype ";

/// Recursive descent parser over the textual signature form
struct SignatureParser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(input: &'a str) -> Self {
        SignatureParser { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self, count: usize) {
        self.position += count;
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.advance(rest.len() - rest.trim_start().len());
    }

    fn error(&self, reason: &str) -> Error {
        Error::Error(format!(
            "Invalid type signature '{}' at offset {}: {}",
            self.input, self.position, reason
        ))
    }

    fn parse_complete(mut self) -> Result<TypeSignature> {
        let signature = self.parse_type()?;
        self.skip_whitespace();
        if self.position != self.input.len() {
            return Err(self.error("unexpected trailing characters"));
        }
        Ok(signature)
    }

    fn parse_type(&mut self) -> Result<TypeSignature> {
        self.skip_whitespace();
        let mut signature = self.parse_core()?;

        loop {
            match self.peek() {
                Some('&') => {
                    self.advance(1);
                    signature = TypeSignature::ByRef(Box::new(signature));
                }
                Some('*') => {
                    self.advance(1);
                    signature = TypeSignature::Ptr(Box::new(signature));
                }
                Some('[') if self.at_array_suffix() => {
                    signature = self.parse_array_suffix(signature)?;
                }
                Some('[') => return Err(self.error("generic arguments must follow a type name")),
                _ => return Ok(signature),
            }
        }
    }

    fn parse_core(&mut self) -> Result<TypeSignature> {
        if self.rest().starts_with("!!") {
            self.advance(2);
            let name = self.read_name()?;
            return Ok(TypeSignature::GenericParamMethod(name.to_string()));
        }

        if self.rest().starts_with('!') {
            self.advance(1);
            let name = self.read_name()?;
            return Ok(TypeSignature::GenericParamType(name.to_string()));
        }

        if self.rest().starts_with('?') {
            self.advance(1);
            return Ok(TypeSignature::Unknown);
        }

        let is_value_type = self.rest().starts_with(VALUETYPE_PREFIX);
        if is_value_type {
            self.advance(VALUETYPE_PREFIX.len());
            self.skip_whitespace();
        }

        let name = self.read_name()?;
        let base = if is_value_type {
            TypeSignature::value_type(name)
        } else {
            TypeSignature::class(name)
        };

        if self.peek() == Some('[') && !self.at_array_suffix() {
            self.advance(1);
            let mut args = Vec::new();
            loop {
                args.push(self.parse_type()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.advance(1),
                    Some(']') => {
                        self.advance(1);
                        break;
                    }
                    _ => return Err(self.error("expected ',' or ']' in generic arguments")),
                }
            }
            return Ok(TypeSignature::GenericInst(Box::new(base), args));
        }

        Ok(base)
    }

    fn read_name(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| matches!(c, '[' | ']' | ',' | '&' | '*') || c.is_whitespace())
            .unwrap_or(rest.len());

        if end == 0 {
            return Err(self.error("expected a type name"));
        }

        self.advance(end);
        Ok(&rest[..end])
    }

    fn at_array_suffix(&self) -> bool {
        let rest = self.rest();
        rest.starts_with("[]") || rest.starts_with("[,")
    }

    fn parse_array_suffix(&mut self, base: TypeSignature) -> Result<TypeSignature> {
        // Consume '['
        self.advance(1);

        let mut rank = 1u32;
        loop {
            match self.peek() {
                Some(',') => {
                    rank += 1;
                    self.advance(1);
                }
                Some(']') => {
                    self.advance(1);
                    break;
                }
                _ => return Err(self.error("unterminated array suffix")),
            }
        }

        if rank == 1 {
            Ok(TypeSignature::SzArray(Box::new(base)))
        } else {
            Ok(TypeSignature::Array {
                base: Box::new(base),
                rank,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TypeSignature {
        text.parse().unwrap()
    }

    #[test]
    fn test_parse_primitives_and_names() {
        assert_eq!(parse("System.Int32"), TypeSignature::Primitive(PrimitiveKind::I4));
        assert_eq!(parse("System.Void"), TypeSignature::Primitive(PrimitiveKind::Void));
        assert_eq!(parse("Acme.Widget"), TypeSignature::Class("Acme.Widget".into()));
        assert_eq!(
            parse("valuetype Acme.Point"),
            TypeSignature::ValueType("Acme.Point".into())
        );
        assert_eq!(parse("?"), TypeSignature::Unknown);
    }

    #[test]
    fn test_parse_wrappers() {
        assert_eq!(
            parse("System.Int32&"),
            TypeSignature::by_ref(PrimitiveKind::I4.into())
        );
        assert_eq!(
            parse("System.Byte*"),
            TypeSignature::Ptr(Box::new(PrimitiveKind::U1.into()))
        );
        assert_eq!(
            parse("System.String[]"),
            TypeSignature::sz_array(PrimitiveKind::String.into())
        );
        assert_eq!(
            parse("System.Double[,,]"),
            TypeSignature::Array {
                base: Box::new(PrimitiveKind::R8.into()),
                rank: 3
            }
        );
        assert_eq!(
            parse("System.Int32[]&"),
            TypeSignature::by_ref(TypeSignature::sz_array(PrimitiveKind::I4.into()))
        );
    }

    #[test]
    fn test_parse_generic_instances() {
        let sig = parse(
            "System.Collections.Generic.Dictionary`2[System.String, System.Collections.Generic.List`1[Acme.Widget]]",
        );
        assert_eq!(
            sig,
            TypeSignature::generic(
                TypeSignature::Class("System.Collections.Generic.Dictionary`2".into()),
                vec![
                    PrimitiveKind::String.into(),
                    TypeSignature::generic(
                        TypeSignature::Class("System.Collections.Generic.List`1".into()),
                        vec![TypeSignature::Class("Acme.Widget".into())]
                    ),
                ]
            )
        );
        assert_eq!(sig.qualified_name(), Some("System.Collections.Generic.Dictionary`2"));

        let array_of_list = parse("System.Collections.Generic.List`1[!T][]");
        assert!(matches!(array_of_list, TypeSignature::SzArray(_)));
        assert_eq!(parse("!!TResult"), TypeSignature::GenericParamMethod("TResult".into()));
    }

    #[test]
    fn test_display_parses_back() {
        for text in [
            "System.Int32&",
            "valuetype Acme.Point[]",
            "System.Double[,]",
            "System.Collections.Generic.KeyValuePair`2[System.String,valuetype Acme.Point]",
            "valuetype System.Nullable`1[System.Int32]",
            "!T*",
        ] {
            let sig = parse(text);
            assert_eq!(sig.to_string(), text);
            assert_eq!(parse(&sig.to_string()), sig);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<TypeSignature>().is_err());
        assert!("Acme.Widget[".parse::<TypeSignature>().is_err());
        assert!("List`1[System.Int32".parse::<TypeSignature>().is_err());
        assert!("Acme.Widget]".parse::<TypeSignature>().is_err());
        assert!("!".parse::<TypeSignature>().is_err());
    }

    #[test]
    fn test_strip_indirection() {
        let sig = parse("System.Int32*&");
        assert_eq!(sig.strip_indirection(), &TypeSignature::Primitive(PrimitiveKind::I4));
        assert!(sig.is_by_ref());
        assert!(parse("System.Void").is_void());
    }

    #[test]
    fn test_split_qualified_name() {
        assert_eq!(split_qualified_name("Acme.Io.Reader"), ("Acme.Io", "Reader"));
        assert_eq!(split_qualified_name("Widget"), ("", "Widget"));
        assert_eq!(split_qualified_name("Acme.Outer+Inner.Deep"), ("Acme", "Outer+Inner.Deep"));
    }

    #[test]
    fn test_serde_as_string() {
        let sig = parse("System.Collections.Generic.List`1[System.Int32]");
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, "\"System.Collections.Generic.List`1[System.Int32]\"");
        let back: TypeSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
