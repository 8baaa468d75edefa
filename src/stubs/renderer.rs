//! Per-type rendering.
//!
//! [`TypeRenderer`] picks a [`RenderMode`] for each type and produces one [`RenderedType`]:
//!
//! - [`RenderMode::Array`] - a `Name = List[T]` alias, no members
//! - [`RenderMode::Enum`] - a class of named constants
//! - [`RenderMode::GenericDefinition`] - skipped with a diagnostic
//! - [`RenderMode::Class`] / [`RenderMode::Interface`] - header, then members in section
//!   order: constructors, properties, fields, events, methods
//!
//! # Parent Clause
//!
//! A base type is stated only when its qualified name shares the first namespace segment of
//! the rendered type, carries no nested-type (`+`) or arity (`` ` ``) marker and is known to
//! the provider. Every other base is opaque and the type renders without a parent.

use tracing::{debug, trace};

use crate::{
    metadata::{
        diagnostics::{DiagnosticCategory, DiagnosticSeverity},
        primitives::PrimitiveKind,
        signature::TypeSignature,
        types::{MetadataType, TypeKind},
    },
    stubs::{
        config::StubConfig,
        mapper::{python_type_name, TypeNameMapper},
        member::{render_enum_value, MemberRenderer, RenderedMember},
    },
};

/// How a type is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Container alias over the element type
    Array,
    /// Named constants
    Enum,
    /// Unbound generic definition, not rendered
    GenericDefinition,
    /// Abstract class deriving from `ABC`
    Interface,
    /// Plain class, also used for value types and delegates
    Class,
}

impl RenderMode {
    /// Pick the rendering mode for `ty`
    #[must_use]
    pub fn of(ty: &MetadataType) -> Self {
        if ty.kind == TypeKind::Array {
            RenderMode::Array
        } else if ty.is_enum() {
            RenderMode::Enum
        } else if ty.is_generic_definition() {
            RenderMode::GenericDefinition
        } else if ty.is_interface() {
            RenderMode::Interface
        } else {
            RenderMode::Class
        }
    }
}

/// The stub text of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedType {
    /// Python name of the declaration
    pub name: String,
    /// Qualified name of the source type
    pub qualified_name: String,
    /// Mode the type was rendered in
    pub mode: RenderMode,
    /// Stated parent, if any
    pub parent: Option<String>,
    /// Rendered members, in emission order
    pub members: Vec<RenderedMember>,
    /// Declaration text, newline terminated
    pub text: String,
}

/// Renders types into class declarations
pub struct TypeRenderer<'c> {
    config: &'c StubConfig,
    indent: String,
}

impl<'c> TypeRenderer<'c> {
    /// Create a renderer using `config`
    pub fn new(config: &'c StubConfig) -> Self {
        TypeRenderer {
            config,
            indent: config.indent_unit(),
        }
    }

    /// True if `ty` belongs to the public surface
    #[must_use]
    pub fn is_emitted(ty: &MetadataType) -> bool {
        ty.flags.is_visible() && !ty.flags.is_special_name()
    }

    /// Render `ty`, or `None` when it is not part of the emitted surface
    pub fn render(
        &self,
        ty: &MetadataType,
        mapper: &mut TypeNameMapper<'_>,
    ) -> Option<RenderedType> {
        let qualified_name = ty.fullname();
        if !Self::is_emitted(ty) {
            trace!(name = %qualified_name, "skipping non-public type");
            return None;
        }

        mapper.set_subject(Some(qualified_name.clone()));
        let rendered = match RenderMode::of(ty) {
            RenderMode::Array => Some(self.render_array(ty, mapper)),
            RenderMode::Enum => Some(self.render_enum(ty, mapper)),
            RenderMode::GenericDefinition => {
                debug!(name = %qualified_name, "skipping generic type definition");
                mapper.report(
                    DiagnosticSeverity::Warning,
                    DiagnosticCategory::TypeShape,
                    format!(
                        "Generic type definition with parameters [{}] is not supported, skipped",
                        ty.generic_params.join(", ")
                    ),
                );
                None
            }
            mode @ (RenderMode::Interface | RenderMode::Class) => {
                Some(self.render_class(ty, mode, mapper))
            }
        };
        mapper.set_subject(None);

        rendered
    }

    fn render_array(&self, ty: &MetadataType, mapper: &mut TypeNameMapper<'_>) -> RenderedType {
        let name = python_type_name(&ty.name);
        let element = ty.element_type.clone().unwrap_or_default();
        let text = format!("{name} = List[{}]\n", mapper.map(&element));

        RenderedType {
            name,
            qualified_name: ty.fullname(),
            mode: RenderMode::Array,
            parent: None,
            members: Vec::new(),
            text,
        }
    }

    fn render_enum(&self, ty: &MetadataType, mapper: &mut TypeNameMapper<'_>) -> RenderedType {
        let name = python_type_name(&ty.name);
        let underlying = ty.enum_underlying.unwrap_or(PrimitiveKind::I4);
        let members: Vec<RenderedMember> = ty
            .enum_values
            .iter()
            .map(|value| render_enum_value(value, underlying, mapper))
            .collect();

        let text = self.assemble(format!("class {name}:"), &members);
        RenderedType {
            name,
            qualified_name: ty.fullname(),
            mode: RenderMode::Enum,
            parent: None,
            members,
            text,
        }
    }

    fn render_class(
        &self,
        ty: &MetadataType,
        mode: RenderMode,
        mapper: &mut TypeNameMapper<'_>,
    ) -> RenderedType {
        let name = python_type_name(&ty.name);
        let parent = if mode == RenderMode::Interface {
            None
        } else {
            self.parent_clause(ty, mapper)
        };

        let header = match (&parent, mode) {
            (_, RenderMode::Interface) => format!("class {name}(ABC):"),
            (Some(parent), _) => format!("class {name}({parent}):"),
            (None, _) => format!("class {name}:"),
        };

        let mut renderer = MemberRenderer::new(ty, self.config);
        let members: Vec<RenderedMember> = ty
            .members()
            .filter_map(|member| renderer.render(member, mapper))
            .collect();

        let text = self.assemble(header, &members);
        RenderedType {
            name,
            qualified_name: ty.fullname(),
            mode,
            parent,
            members,
            text,
        }
    }

    fn parent_clause(&self, ty: &MetadataType, mapper: &mut TypeNameMapper<'_>) -> Option<String> {
        let base = ty.base.as_ref()?;
        if matches!(base, TypeSignature::Primitive(_) | TypeSignature::Unknown) {
            return None;
        }

        let base_name = base.qualified_name()?.to_string();
        let base_root = base_name.split('.').next().unwrap_or_default();
        if base_root != ty.root_namespace() {
            mapper.report(
                DiagnosticSeverity::Info,
                DiagnosticCategory::Inheritance,
                format!("Base '{base_name}' is outside the root namespace, no parent stated"),
            );
            return None;
        }

        if base_name.contains('+') || base_name.contains('`') {
            mapper.report(
                DiagnosticSeverity::Info,
                DiagnosticCategory::Inheritance,
                format!("Base '{base_name}' is nested or generic, no parent stated"),
            );
            return None;
        }

        if mapper.lookup(&base_name).is_none() {
            mapper.report(
                DiagnosticSeverity::Info,
                DiagnosticCategory::Inheritance,
                format!("Base '{base_name}' is unknown, no parent stated"),
            );
            return None;
        }

        Some(mapper.map(base))
    }

    fn assemble(&self, header: String, members: &[RenderedMember]) -> String {
        let mut text = header;
        text.push('\n');

        if members.is_empty() {
            text.push_str(&self.indent);
            text.push_str("pass\n");
            return text;
        }

        for line in members.iter().flat_map(|member| member.lines.iter()) {
            text.push_str(&self.indent);
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            builder::{MethodBuilder, TypeBuilder},
            diagnostics::Diagnostics,
            primitives::ConstantValue,
            TypeAttributes,
        },
        test::acme_provider,
    };

    fn render(ty: &MetadataType) -> (Option<RenderedType>, Diagnostics) {
        let provider = acme_provider();
        let diagnostics = Diagnostics::new();
        let config = StubConfig::default();
        let rendered = {
            let mut mapper = TypeNameMapper::new(&provider, &diagnostics);
            TypeRenderer::new(&config).render(ty, &mut mapper)
        };
        (rendered, diagnostics)
    }

    #[test]
    fn test_modes() {
        let array = TypeBuilder::array("Acme", "WidgetArray", "Acme.Widget").build().unwrap();
        let generic = TypeBuilder::class("Acme", "Box`1").generic_param("T").build().unwrap();
        let interface = TypeBuilder::interface("Acme", "IShape").build().unwrap();

        assert_eq!(RenderMode::of(&array), RenderMode::Array);
        assert_eq!(RenderMode::of(&generic), RenderMode::GenericDefinition);
        assert_eq!(RenderMode::of(&interface), RenderMode::Interface);
    }

    #[test]
    fn test_empty_class_renders_pass() {
        let ty = TypeBuilder::class("Acme", "Empty").build().unwrap();
        let (rendered, _) = render(&ty);
        assert_eq!(rendered.unwrap().text, "class Empty:\n    pass\n");
    }

    #[test]
    fn test_array_alias() {
        let ty = TypeBuilder::array("Acme", "WidgetArray", "Acme.Widget").build().unwrap();
        let (rendered, _) = render(&ty);
        let rendered = rendered.unwrap();
        assert_eq!(rendered.name, "WidgetArray");
        assert_eq!(rendered.text, "WidgetArray = List[Widget]\n");
    }

    #[test]
    fn test_generic_definition_is_skipped() {
        let ty = TypeBuilder::class("Acme", "Box`1").generic_param("T").build().unwrap();
        let (rendered, diagnostics) = render(&ty);
        assert!(rendered.is_none());

        let shape = diagnostics.by_category(DiagnosticCategory::TypeShape);
        assert_eq!(shape.len(), 1);
        assert_eq!(shape[0].subject.as_deref(), Some("Acme.Box`1"));
    }

    #[test]
    fn test_hidden_types_are_skipped() {
        let private = TypeBuilder::class("Acme", "Hidden")
            .flags(TypeAttributes::empty())
            .build()
            .unwrap();
        assert!(render(&private).0.is_none());
    }

    #[test]
    fn test_parent_clause() {
        let local = TypeBuilder::class("Acme", "Special").base("Acme.Widget").build().unwrap();
        let (rendered, _) = render(&local);
        let rendered = rendered.unwrap();
        assert_eq!(rendered.parent.as_deref(), Some("Widget"));
        assert!(rendered.text.starts_with("class Special(Widget):\n"));

        let foreign = TypeBuilder::class("Acme", "Derived").base("Other.Unrelated").build().unwrap();
        let (rendered, diagnostics) = render(&foreign);
        assert!(rendered.unwrap().text.starts_with("class Derived:\n"));
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Inheritance).len(), 1);

        let unknown = TypeBuilder::class("Acme", "Orphan").base("Acme.Missing").build().unwrap();
        let (rendered, _) = render(&unknown);
        assert!(rendered.unwrap().parent.is_none());

        let nested = TypeBuilder::class("Acme", "Inner").base("Acme.Widget+Part").build().unwrap();
        assert!(render(&nested).0.unwrap().parent.is_none());

        let object = TypeBuilder::class("System", "Thing").base("System.Object").build().unwrap();
        assert!(render(&object).0.unwrap().parent.is_none());
    }

    #[test]
    fn test_interface_header() {
        let ty = TypeBuilder::interface("Acme", "IShape")
            .method(MethodBuilder::new("Area").returns("System.Double"))
            .build()
            .unwrap();
        let (rendered, _) = render(&ty);
        assert_eq!(
            rendered.unwrap().text,
            "class IShape(ABC):\n    @abstractmethod\n    def Area(self) -> float: ...\n"
        );
    }

    #[test]
    fn test_enum_body() {
        let ty = TypeBuilder::enumeration("Acme", "Flags", PrimitiveKind::U1)
            .enum_value("Low", ConstantValue::I4(1))
            .enum_value("All", ConstantValue::I4(-1))
            .build()
            .unwrap();
        let (rendered, _) = render(&ty);
        assert_eq!(
            rendered.unwrap().text,
            "class Flags:\n    Low = 1\n    All = 255\n"
        );
    }
}
