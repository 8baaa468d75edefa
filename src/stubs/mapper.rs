//! Mapping of metadata type references to Python type expressions.
//!
//! [`TypeNameMapper::map`] is total: every [`TypeSignature`] yields a non-empty Python type
//! expression. References the mapper cannot classify fall back to an opaque token (the
//! qualified name) and leave a warning in the namespace's [`Diagnostics`].
//!
//! # Rules
//!
//! Checked in this order:
//! 1. Primitives, including names that spell a primitive (`System.Int32`) -> `int`, `str`, ...
//! 2. By-reference and pointer markers are stripped, direction is the caller's business
//! 3. Arrays of any rank -> `List[T]`
//! 4. Known generic families -> `List`, `Iterable`, `Set`, `Dict`, `Tuple`, `Optional`,
//!    `Callable`; unknown families fall back to the qualified base name
//! 5. to 8. Enums, interfaces, value types and classes known to the provider -> simple name
//! 9. Anything else -> qualified name verbatim
//!
//! Every named type the mapper resolves is recorded as a required import.

use std::collections::{BTreeSet, HashMap};

use tracing::{trace, warn};

use crate::{
    metadata::{
        diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
        primitives::PrimitiveKind,
        provider::MetadataProvider,
        signature::TypeSignature,
        types::MetadataTypeRc,
    },
    Error,
};

/// Python type for a primitive
#[must_use]
pub fn primitive_python_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Void => "None",
        PrimitiveKind::Boolean => "bool",
        PrimitiveKind::Char
        | PrimitiveKind::I1
        | PrimitiveKind::U1
        | PrimitiveKind::I2
        | PrimitiveKind::U2
        | PrimitiveKind::I4
        | PrimitiveKind::U4
        | PrimitiveKind::I8
        | PrimitiveKind::U8
        | PrimitiveKind::I
        | PrimitiveKind::U => "int",
        PrimitiveKind::R4 | PrimitiveKind::R8 => "float",
        PrimitiveKind::String => "str",
        PrimitiveKind::Object => "object",
    }
}

/// Python identifier for a simple type name: arity markers are dropped and nested type
/// separators become underscores (`` Outer+Inner`1 `` -> `Outer_Inner`)
#[must_use]
pub fn python_type_name(name: &str) -> String {
    name.split('+')
        .map(strip_arity)
        .collect::<Vec<_>>()
        .join("_")
}

/// Drops a trailing `` `N `` generic arity marker
#[must_use]
pub fn strip_arity(name: &str) -> &str {
    match name.rfind('`') {
        Some(index) if name[index + 1..].chars().all(|c| c.is_ascii_digit()) => &name[..index],
        _ => name,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenericFamily {
    /// `Name[args...]`
    Container(&'static str),
    /// `Callable[[T], bool]`
    Predicate,
    /// `Callable[[T, T], int]`
    Comparison,
    /// `Callable[[T, T], bool]`
    EqualityComparer,
    /// `Callable[[args...], None]`
    Action,
    /// `Callable[[args...], R]`, the last argument is the result
    Func,
}

fn generic_family(definition: &str) -> Option<GenericFamily> {
    let family = match strip_arity(definition) {
        "System.Collections.Generic.List"
        | "System.Collections.Generic.IList"
        | "System.Collections.Generic.ICollection"
        | "System.Collections.Generic.IReadOnlyList"
        | "System.Collections.Generic.IReadOnlyCollection" => GenericFamily::Container("List"),
        "System.Collections.Generic.IEnumerable" => GenericFamily::Container("Iterable"),
        "System.Collections.Generic.HashSet" | "System.Collections.Generic.ISet" => {
            GenericFamily::Container("Set")
        }
        "System.Collections.Generic.Dictionary"
        | "System.Collections.Generic.IDictionary"
        | "System.Collections.Generic.IReadOnlyDictionary" => GenericFamily::Container("Dict"),
        "System.Collections.Generic.KeyValuePair" => GenericFamily::Container("Tuple"),
        "System.Nullable" => GenericFamily::Container("Optional"),
        "System.Predicate" => GenericFamily::Predicate,
        "System.Comparison" | "System.Collections.Generic.IComparer" => GenericFamily::Comparison,
        "System.Collections.Generic.IEqualityComparer" => GenericFamily::EqualityComparer,
        "System.Action" => GenericFamily::Action,
        "System.Func" => GenericFamily::Func,
        _ => return None,
    };
    Some(family)
}

/// Converts type references into Python type expressions for one namespace unit.
///
/// The mapper owns the unit's import set and shares the unit's diagnostics. Provider
/// failures do not interrupt mapping; the first one is kept and surfaced through
/// [`TypeNameMapper::take_failure`] when the unit is finished.
pub struct TypeNameMapper<'a> {
    provider: &'a dyn MetadataProvider,
    diagnostics: &'a Diagnostics,
    imports: BTreeSet<String>,
    resolved: HashMap<String, Option<MetadataTypeRc>>,
    subject: Option<String>,
    failure: Option<Error>,
}

impl<'a> TypeNameMapper<'a> {
    /// Create a mapper resolving names against `provider`
    pub fn new(provider: &'a dyn MetadataProvider, diagnostics: &'a Diagnostics) -> Self {
        TypeNameMapper {
            provider,
            diagnostics,
            imports: BTreeSet::new(),
            resolved: HashMap::new(),
            subject: None,
            failure: None,
        }
    }

    /// Qualified name of the type being rendered, attached to diagnostics
    pub fn set_subject(&mut self, subject: Option<String>) {
        self.subject = subject;
    }

    /// Record a diagnostic about the current subject
    pub fn report(&self, severity: DiagnosticSeverity, category: DiagnosticCategory, message: String) {
        let mut diagnostic = Diagnostic::new(severity, category, message);
        if let Some(subject) = &self.subject {
            diagnostic = diagnostic.with_subject(subject.clone());
        }
        self.diagnostics.push(diagnostic);
    }

    /// Look up a type by qualified name, caching the answer.
    ///
    /// Provider failures are kept for [`TypeNameMapper::take_failure`] and answer `None`.
    pub fn lookup(&mut self, qualified_name: &str) -> Option<MetadataTypeRc> {
        if let Some(cached) = self.resolved.get(qualified_name) {
            return cached.clone();
        }

        let answer = match self.provider.resolve(qualified_name) {
            Ok(answer) => answer,
            Err(err) => {
                warn!(name = qualified_name, error = %err, "provider failed to resolve type");
                self.report(
                    DiagnosticSeverity::Error,
                    DiagnosticCategory::Provider,
                    format!("Provider failed to resolve '{qualified_name}': {err}"),
                );
                if self.failure.is_none() {
                    self.failure = Some(err);
                }
                None
            }
        };

        self.resolved
            .insert(qualified_name.to_string(), answer.clone());
        answer
    }

    /// Map a type reference to a Python type expression. Never fails, never returns empty.
    pub fn map(&mut self, signature: &TypeSignature) -> String {
        match signature {
            TypeSignature::Primitive(kind) => primitive_python_name(*kind).to_string(),
            TypeSignature::ByRef(inner) | TypeSignature::Ptr(inner) => self.map(inner),
            TypeSignature::SzArray(element) | TypeSignature::Array { base: element, .. } => {
                format!("List[{}]", self.map(element))
            }
            TypeSignature::GenericInst(definition, args) => self.map_generic(definition, args),
            TypeSignature::Class(name) | TypeSignature::ValueType(name) => self.map_named(name),
            TypeSignature::GenericParamType(name) | TypeSignature::GenericParamMethod(name) => {
                self.unmappable(name, "unbound generic parameter");
                name.clone()
            }
            TypeSignature::Unknown => {
                self.unmappable("?", "unknown type signature");
                "object".to_string()
            }
        }
    }

    fn map_named(&mut self, name: &str) -> String {
        if let Some(kind) = PrimitiveKind::from_fullname(name) {
            return primitive_python_name(kind).to_string();
        }

        if name == "System.Action" {
            return "Callable[[], None]".to_string();
        }

        match self.lookup(name) {
            Some(ty) => {
                trace!(name, kind = ?ty.kind, "mapped named type");
                self.imports.insert(ty.fullname());
                python_type_name(&ty.name)
            }
            None => {
                self.unmappable(name, "type unknown to the metadata provider");
                name.to_string()
            }
        }
    }

    fn map_generic(&mut self, definition: &TypeSignature, args: &[TypeSignature]) -> String {
        let Some(definition_name) = definition.qualified_name() else {
            self.unmappable(&definition.to_string(), "generic instance over a non-named type");
            return "object".to_string();
        };

        let family = generic_family(definition_name);
        if family == Some(GenericFamily::Func) && args.is_empty() {
            self.unmappable(definition_name, "Func without a result type");
            return strip_arity(definition_name).to_string();
        }

        let Some(family) = family else {
            self.unmappable(definition_name, "unrecognized generic family");
            return strip_arity(definition_name).to_string();
        };

        let mut mapped: Vec<String> = args.iter().map(|arg| self.map(arg)).collect();
        let first = mapped.first().cloned().unwrap_or_else(|| "object".to_string());

        match family {
            GenericFamily::Container(name) => {
                if mapped.is_empty() {
                    mapped.push(first);
                }
                format!("{}[{}]", name, mapped.join(", "))
            }
            GenericFamily::Predicate => format!("Callable[[{first}], bool]"),
            GenericFamily::Comparison => format!("Callable[[{first}, {first}], int]"),
            GenericFamily::EqualityComparer => format!("Callable[[{first}, {first}], bool]"),
            GenericFamily::Action => format!("Callable[[{}], None]", mapped.join(", ")),
            GenericFamily::Func => {
                let result = mapped.pop().unwrap_or_else(|| "object".to_string());
                format!("Callable[[{}], {}]", mapped.join(", "), result)
            }
        }
    }

    fn unmappable(&self, name: &str, reason: &str) {
        warn!(name, reason, "emitting opaque type name");
        self.report(
            DiagnosticSeverity::Warning,
            DiagnosticCategory::TypeMapping,
            format!("Cannot map '{name}' ({reason}), emitted verbatim"),
        );
    }

    /// Qualified names of every type referenced so far
    pub fn imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    /// Take the first provider failure seen by this mapper
    pub fn take_failure(&mut self) -> Option<Error> {
        self.failure.take()
    }

    /// Consume the mapper, returning its import set
    pub fn into_imports(self) -> BTreeSet<String> {
        self.imports
    }
}
