//! Rendering of individual members into Python declarations.
//!
//! A [`MemberRenderer`] is built once per type. At construction it looks at all sibling
//! members to decide what rendering a single member needs to know about the others:
//! how many eligible overloads share a method name, which properties and events have
//! first-class entries, and which accessor methods pair up into a synthesized property.
//!
//! # Accessor Folding
//!
//! A method is folded into a property only when it is a genuine accessor: it carries the
//! special-name flag, declares its accessor kind and its name has the matching `get_` /
//! `set_` prefix. When a first-class property of that name exists, the accessors are
//! suppressed and the property entry is rendered instead. Otherwise the pair becomes one
//! synthesized property, emitted at the position of the first accessor in method order.
//! Accessors pair up by property name and index parameter types, so overloaded indexers
//! (`this[int]`, `this[string]`) stay separate and render as `@overload` variants of
//! `__getitem__` / `__setitem__`. A second accessor of the same shape is dropped with a
//! warning.
//!
//! A plain method that only looks like an accessor (`get_Foo` without the special-name
//! flag) is rendered as a method. A plain method sharing its name with a property is
//! rendered next to the property and reported as an accessor collision.

use std::{
    collections::{HashMap, HashSet},
    ptr,
};

use tracing::{debug, trace};

use crate::{
    metadata::{
        diagnostics::{DiagnosticCategory, DiagnosticSeverity},
        primitives::PrimitiveKind,
        signature::TypeSignature,
        types::{
            AccessorKind, EnumValue, Member, MetadataEvent, MetadataField, MetadataMethod,
            MetadataProperty, MetadataType, Parameter,
        },
    },
    stubs::{config::StubConfig, mapper::TypeNameMapper},
};

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// True if `name` is a reserved word in Python
#[must_use]
pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Identifier for a member or parameter: keywords and `self` gain a trailing underscore
#[must_use]
pub fn safe_identifier(name: &str) -> String {
    if is_python_keyword(name) || name == "self" {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Identifier for an enum constant: keywords (`None` included) gain a leading underscore
#[must_use]
pub fn safe_constant_name(name: &str) -> String {
    if is_python_keyword(name) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

fn param_identifier(param: &Parameter) -> String {
    match param.name.as_deref() {
        Some(name) if !name.is_empty() => safe_identifier(name),
        _ => format!("arg{}", param.position),
    }
}

/// What a rendered declaration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedKind {
    /// `__init__`
    Constructor,
    /// `def`
    Method,
    /// First-class or synthesized property
    Property,
    /// Field annotation
    Field,
    /// Event annotation
    Event,
    /// Enum constant
    EnumValue,
}

/// One rendered declaration, lines relative to the class body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMember {
    /// Declared member name (the property name for folded accessors)
    pub name: String,
    /// Source of the declaration
    pub kind: RenderedKind,
    /// Number of eligible same-name siblings, 1 when not overloaded
    pub overloads: usize,
    /// Declaration lines, decorators included, without class-level indentation
    pub lines: Vec<String>,
}

impl RenderedMember {
    fn new(name: &str, kind: RenderedKind, overloads: usize, lines: Vec<String>) -> Self {
        RenderedMember {
            name: name.to_string(),
            kind,
            overloads,
            lines,
        }
    }

    /// True if the declaration carries an overload marker
    #[must_use]
    pub fn is_overload(&self) -> bool {
        self.overloads > 1
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct AccessorPair<'t> {
    getter: Option<&'t MetadataMethod>,
    setter: Option<&'t MetadataMethod>,
}

/// Property name plus the types of its index parameters
type AccessorKey<'t> = (&'t str, Vec<TypeSignature>);

fn accessor_key<'t>(
    kind: AccessorKind,
    target: &'t str,
    method: &MetadataMethod,
) -> AccessorKey<'t> {
    let index = match kind {
        AccessorKind::Set => method.params.split_last().map_or(&[][..], |(_, index)| index),
        _ => &method.params[..],
    };
    (
        target,
        index.iter().map(|param| param.param_type.clone()).collect(),
    )
}

/// Common shape of first-class and synthesized properties
struct PropertyShape<'t> {
    name: &'t str,
    property_type: TypeSignature,
    readable: bool,
    writable: bool,
    is_static: bool,
    index_params: Vec<&'t Parameter>,
}

/// Renders the members of one type
pub struct MemberRenderer<'t> {
    owner: String,
    is_interface: bool,
    include_obsolete: bool,
    constructor_count: usize,
    overloads: HashMap<&'t str, usize>,
    properties: HashSet<&'t str>,
    events: HashSet<&'t str>,
    accessors: HashMap<AccessorKey<'t>, AccessorPair<'t>>,
    accessor_targets: HashSet<&'t str>,
    emitted_accessors: HashSet<AccessorKey<'t>>,
    reported_collisions: HashSet<&'t str>,
    getitem_count: usize,
    setitem_count: usize,
}

impl<'t> MemberRenderer<'t> {
    /// Prepare rendering of the members of `owner`
    pub fn new(owner: &'t MetadataType, config: &StubConfig) -> Self {
        let mut renderer = MemberRenderer {
            owner: owner.fullname(),
            is_interface: owner.is_interface(),
            include_obsolete: config.include_obsolete,
            constructor_count: 0,
            overloads: HashMap::new(),
            properties: HashSet::new(),
            events: HashSet::new(),
            accessors: HashMap::new(),
            accessor_targets: HashSet::new(),
            emitted_accessors: HashSet::new(),
            reported_collisions: HashSet::new(),
            getitem_count: 0,
            setitem_count: 0,
        };

        let constructor_count = owner
            .constructors
            .iter()
            .filter(|ctor| renderer.is_eligible(Member::Constructor(ctor)))
            .count();
        renderer.constructor_count = constructor_count;

        let mut getitem_count = 0;
        let mut setitem_count = 0;
        for property in &owner.properties {
            if renderer.is_eligible(Member::Property(property)) {
                renderer.properties.insert(property.name.as_str());
                if property.is_indexer() {
                    getitem_count += usize::from(property.can_read);
                    setitem_count += usize::from(property.can_write);
                }
            }
        }

        for event in &owner.events {
            if renderer.is_eligible(Member::Event(event)) {
                renderer.events.insert(event.name.as_str());
            }
        }

        for method in &owner.methods {
            if !renderer.is_eligible(Member::Method(method)) {
                continue;
            }

            match method.accessor_target() {
                Some((kind, target)) if kind.is_property() => {
                    renderer.accessor_targets.insert(target);
                    let key = accessor_key(kind, target, method);
                    let pair = renderer.accessors.entry(key).or_default();
                    match kind {
                        AccessorKind::Get if pair.getter.is_none() => pair.getter = Some(method),
                        AccessorKind::Set if pair.setter.is_none() => pair.setter = Some(method),
                        _ => {}
                    }
                }
                Some((_, target)) if renderer.events.contains(target) => {}
                _ => *renderer.overloads.entry(method.name.as_str()).or_insert(0) += 1,
            }
        }

        for ((target, index), pair) in &renderer.accessors {
            if index.is_empty() || renderer.properties.contains(target) {
                continue;
            }
            getitem_count += usize::from(pair.getter.is_some());
            setitem_count += usize::from(pair.setter.is_some());
        }
        renderer.getitem_count = getitem_count;
        renderer.setitem_count = setitem_count;

        renderer
    }

    /// Visibility, obsolescence and declaring-type filters shared by all member kinds
    fn is_eligible(&self, member: Member<'_>) -> bool {
        if !member.is_public() {
            return false;
        }

        if member.is_obsolete() && !self.include_obsolete {
            return false;
        }

        match member {
            Member::Constructor(_) => !member.is_static(),
            Member::Field(_) => !member.is_special_name() && member.is_declared_by(&self.owner),
            _ => member.is_declared_by(&self.owner),
        }
    }

    /// Number of constructors that will be rendered
    #[must_use]
    pub fn constructor_count(&self) -> usize {
        self.constructor_count
    }

    /// Render one member, `None` when it is filtered out or folded into another declaration
    pub fn render(
        &mut self,
        member: Member<'t>,
        mapper: &mut TypeNameMapper<'_>,
    ) -> Option<RenderedMember> {
        if !self.is_eligible(member) {
            if member.is_obsolete() && member.is_public() {
                debug!(owner = %self.owner, member = member.name(), "skipping obsolete member");
            } else {
                trace!(owner = %self.owner, member = member.name(), "skipping member");
            }
            return None;
        }

        match member {
            Member::Constructor(ctor) => Some(self.render_constructor(ctor, mapper)),
            Member::Method(method) => self.render_method(method, mapper),
            Member::Property(property) => self.render_property(property, mapper),
            Member::Field(field) => Some(self.render_field(field, mapper)),
            Member::Event(event) => Some(self.render_event(event, mapper)),
        }
    }

    fn render_params<'p>(
        &self,
        params: impl Iterator<Item = &'p Parameter>,
        mapper: &mut TypeNameMapper<'_>,
    ) -> Vec<String> {
        params
            .map(|param| {
                let name = param_identifier(param);
                let ty = mapper.map(&param.param_type);
                let default = match &param.default {
                    Some(value) => Some(value.python_literal().unwrap_or_else(|| "...".to_string())),
                    None if param.is_optional() => Some("...".to_string()),
                    None => None,
                };

                match default {
                    Some(default) => format!("{name}: {ty} = {default}"),
                    None => format!("{name}: {ty}"),
                }
            })
            .collect()
    }

    fn render_constructor(
        &self,
        ctor: &MetadataMethod,
        mapper: &mut TypeNameMapper<'_>,
    ) -> RenderedMember {
        let mut lines = Vec::new();
        if self.constructor_count > 1 {
            lines.push("@overload".to_string());
        }

        let mut params = vec!["self".to_string()];
        params.extend(self.render_params(ctor.input_params(), mapper));
        lines.push(format!("def __init__({}) -> None: ...", params.join(", ")));

        RenderedMember::new(
            "__init__",
            RenderedKind::Constructor,
            self.constructor_count,
            lines,
        )
    }

    /// Return annotation: the declared return, or a tuple of it and every `out`/`ref` value
    fn return_shape(&self, method: &MetadataMethod, mapper: &mut TypeNameMapper<'_>) -> String {
        let outputs: Vec<&Parameter> = method.output_params().collect();
        if outputs.is_empty() {
            return mapper.map(&method.return_type);
        }

        let mut elements = Vec::with_capacity(outputs.len() + 1);
        if !method.return_type.is_void() {
            elements.push(mapper.map(&method.return_type));
        }
        for param in outputs {
            elements.push(mapper.map(&param.param_type));
        }

        format!("Tuple[{}]", elements.join(", "))
    }

    fn render_method(
        &mut self,
        method: &'t MetadataMethod,
        mapper: &mut TypeNameMapper<'_>,
    ) -> Option<RenderedMember> {
        if let Some((kind, target)) = method.accessor_target() {
            if kind.is_property() {
                return self.render_accessor(method, kind, target, mapper);
            }
            if self.events.contains(target) {
                return None;
            }
        }

        self.check_collision(method, mapper);

        let overloads = self.overloads.get(method.name.as_str()).copied().unwrap_or(1);
        let mut lines = Vec::new();
        if overloads > 1 {
            lines.push("@overload".to_string());
        }
        if method.is_static() {
            lines.push("@staticmethod".to_string());
        } else if self.is_interface {
            lines.push("@abstractmethod".to_string());
        }

        let mut params = Vec::new();
        if !method.is_static() {
            params.push("self".to_string());
        }
        params.extend(self.render_params(method.input_params(), mapper));
        let returns = self.return_shape(method, mapper);

        lines.push(format!(
            "def {}({}) -> {}: ...",
            safe_identifier(&method.name),
            params.join(", "),
            returns
        ));

        Some(RenderedMember::new(
            &method.name,
            RenderedKind::Method,
            overloads,
            lines,
        ))
    }

    fn check_collision(&mut self, method: &'t MetadataMethod, mapper: &TypeNameMapper<'_>) {
        let name = method.name.as_str();
        if (self.properties.contains(name) || self.accessor_targets.contains(name))
            && self.reported_collisions.insert(name)
        {
            mapper.report(
                DiagnosticSeverity::Warning,
                DiagnosticCategory::Accessor,
                format!("Method '{name}' shares its name with a property, both are emitted"),
            );
            return;
        }

        let lookalike = ["get_", "set_"]
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix));
        if let Some(target) = lookalike {
            if (self.properties.contains(target) || self.accessor_targets.contains(target))
                && self.reported_collisions.insert(name)
            {
                mapper.report(
                    DiagnosticSeverity::Info,
                    DiagnosticCategory::Accessor,
                    format!(
                        "Method '{name}' is not flagged as an accessor of '{target}', emitted as a method"
                    ),
                );
            }
        }
    }

    fn render_accessor(
        &mut self,
        method: &'t MetadataMethod,
        kind: AccessorKind,
        target: &'t str,
        mapper: &mut TypeNameMapper<'_>,
    ) -> Option<RenderedMember> {
        // A first-class property entry is rendered in the property section
        if self.properties.contains(target) {
            return None;
        }

        let key = accessor_key(kind, target, method);
        let pair = self.accessors.get(&key).copied().unwrap_or_default();
        let slot = match kind {
            AccessorKind::Get => pair.getter,
            _ => pair.setter,
        };
        if !slot.is_some_and(|kept| ptr::eq(kept, method)) {
            mapper.report(
                DiagnosticSeverity::Warning,
                DiagnosticCategory::Accessor,
                format!(
                    "Accessor '{}' repeats an earlier accessor of '{target}' with the same index, dropped",
                    method.name
                ),
            );
            return None;
        }

        if !self.emitted_accessors.insert(key) {
            return None;
        }

        let shape = match (pair.getter, pair.setter) {
            (Some(getter), setter) => PropertyShape {
                name: target,
                property_type: getter.return_type.clone(),
                readable: true,
                writable: setter.is_some(),
                is_static: getter.is_static(),
                index_params: getter.params.iter().collect(),
            },
            (None, Some(setter)) => {
                let (value, index) = match setter.params.split_last() {
                    Some((value, index)) => (value.param_type.clone(), index.iter().collect()),
                    None => (TypeSignature::Unknown, Vec::new()),
                };
                PropertyShape {
                    name: target,
                    property_type: value,
                    readable: false,
                    writable: true,
                    is_static: setter.is_static(),
                    index_params: index,
                }
            }
            (None, None) => return None,
        };

        let lines = self.render_property_shape(&shape, mapper);
        let overloads = self.indexer_overloads(&shape);
        Some(RenderedMember::new(target, RenderedKind::Property, overloads, lines))
    }

    fn render_property(
        &self,
        property: &'t MetadataProperty,
        mapper: &mut TypeNameMapper<'_>,
    ) -> Option<RenderedMember> {
        if !property.can_read && !property.can_write {
            return None;
        }

        let shape = PropertyShape {
            name: &property.name,
            property_type: property.property_type.clone(),
            readable: property.can_read,
            writable: property.can_write,
            is_static: property.flags.is_static(),
            index_params: property.index_params.iter().collect(),
        };

        let lines = self.render_property_shape(&shape, mapper);
        Some(RenderedMember::new(
            &property.name,
            RenderedKind::Property,
            self.indexer_overloads(&shape),
            lines,
        ))
    }

    /// Number of `__getitem__` (or, for write-only indexers, `__setitem__`) variants
    fn indexer_overloads(&self, shape: &PropertyShape<'_>) -> usize {
        match (shape.index_params.is_empty(), shape.readable) {
            (true, _) => 1,
            (false, true) => self.getitem_count,
            (false, false) => self.setitem_count,
        }
    }

    fn render_property_shape(
        &self,
        shape: &PropertyShape<'_>,
        mapper: &mut TypeNameMapper<'_>,
    ) -> Vec<String> {
        let ty = mapper.map(&shape.property_type);
        let name = safe_identifier(shape.name);
        let mut lines = Vec::new();

        if !shape.index_params.is_empty() {
            let index = self
                .render_params(shape.index_params.iter().copied(), mapper)
                .join(", ");
            if shape.readable {
                if self.getitem_count > 1 {
                    lines.push("@overload".to_string());
                }
                self.push_abstract(&mut lines);
                lines.push(format!("def __getitem__(self, {index}) -> {ty}: ..."));
            }
            if shape.writable {
                if self.setitem_count > 1 {
                    lines.push("@overload".to_string());
                }
                self.push_abstract(&mut lines);
                lines.push(format!(
                    "def __setitem__(self, {index}, value: {ty}) -> None: ..."
                ));
            }
            return lines;
        }

        if shape.is_static {
            lines.push(format!("{name}: ClassVar[{ty}]"));
            return lines;
        }

        if shape.readable {
            lines.push("@property".to_string());
            self.push_abstract(&mut lines);
            lines.push(format!("def {name}(self) -> {ty}: ..."));

            if shape.writable {
                lines.push(format!("@{name}.setter"));
                self.push_abstract(&mut lines);
                lines.push(format!("def {name}(self, value: {ty}) -> None: ..."));
            }
        } else if shape.writable {
            let setter = format!("set_{}", shape.name);
            self.push_abstract(&mut lines);
            lines.push(format!("def {setter}(self, value: {ty}) -> None: ..."));
            lines.push(format!("{name} = property(fset={setter})"));
        }

        lines
    }

    fn push_abstract(&self, lines: &mut Vec<String>) {
        if self.is_interface {
            lines.push("@abstractmethod".to_string());
        }
    }

    fn render_field(&self, field: &MetadataField, mapper: &mut TypeNameMapper<'_>) -> RenderedMember {
        let ty = mapper.map(&field.field_type);
        let line = if field.flags.is_static() {
            format!("{}: ClassVar[{}]", safe_identifier(&field.name), ty)
        } else {
            format!("{}: {}", safe_identifier(&field.name), ty)
        };

        RenderedMember::new(&field.name, RenderedKind::Field, 1, vec![line])
    }

    fn render_event(&self, event: &MetadataEvent, mapper: &mut TypeNameMapper<'_>) -> RenderedMember {
        let ty = mapper.map(&event.handler_type);
        let line = if event.flags.is_static() {
            format!("{}: ClassVar[{}]", safe_identifier(&event.name), ty)
        } else {
            format!("{}: {}", safe_identifier(&event.name), ty)
        };

        RenderedMember::new(&event.name, RenderedKind::Event, 1, vec![line])
    }
}

/// Render one enum constant, converting its literal to the underlying representation
pub fn render_enum_value(
    value: &EnumValue,
    underlying: PrimitiveKind,
    mapper: &TypeNameMapper<'_>,
) -> RenderedMember {
    let literal = match value.value.convert_to(underlying) {
        Some(converted) => converted.python_literal(),
        None => {
            mapper.report(
                DiagnosticSeverity::Warning,
                DiagnosticCategory::Member,
                format!(
                    "Enum constant '{}' value {} does not convert to {}",
                    value.name, value.value, underlying
                ),
            );
            value.value.python_literal()
        }
    };

    let line = format!(
        "{} = {}",
        safe_constant_name(&value.name),
        literal.unwrap_or_else(|| "...".to_string())
    );
    RenderedMember::new(&value.name, RenderedKind::EnumValue, 1, vec![line])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            attributes::{FieldAttributes, MethodAttributes},
            builder::{MethodBuilder, TypeBuilder},
            diagnostics::Diagnostics,
            primitives::ConstantValue,
        },
        test::acme_provider,
    };

    fn render_all(ty: &MetadataType, config: &StubConfig) -> (Vec<RenderedMember>, Diagnostics) {
        let provider = acme_provider();
        let diagnostics = Diagnostics::new();
        let rendered = {
            let mut mapper = TypeNameMapper::new(&provider, &diagnostics);
            let mut renderer = MemberRenderer::new(ty, config);
            ty.members()
                .filter_map(|member| renderer.render(member, &mut mapper))
                .collect()
        };
        (rendered, diagnostics)
    }

    fn lines(rendered: &[RenderedMember]) -> Vec<String> {
        rendered.iter().flat_map(|member| member.lines.clone()).collect()
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(safe_identifier("from"), "from_");
        assert_eq!(safe_identifier("self"), "self_");
        assert_eq!(safe_identifier("count"), "count");
        assert_eq!(safe_constant_name("None"), "_None");
        assert_eq!(safe_constant_name("Red"), "Red");
        assert!(is_python_keyword("lambda"));
    }

    #[test]
    fn test_constructor_overloads() {
        let single = TypeBuilder::class("Acme", "One")
            .constructor(MethodBuilder::constructor().param("count", "System.Int32"))
            .constructor(MethodBuilder::constructor().flags(MethodAttributes::PRIVATE))
            .build()
            .unwrap();
        let (rendered, _) = render_all(&single, &StubConfig::default());
        assert_eq!(rendered.len(), 1);
        assert!(!rendered[0].is_overload());
        assert_eq!(
            rendered[0].lines,
            vec!["def __init__(self, count: int) -> None: ..."]
        );

        let many = TypeBuilder::class("Acme", "Many")
            .constructor(MethodBuilder::constructor())
            .constructor(MethodBuilder::constructor().param("name", "System.String"))
            .constructor(MethodBuilder::constructor().obsolete())
            .build()
            .unwrap();
        let (rendered, _) = render_all(&many, &StubConfig::default());
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|ctor| ctor.lines[0] == "@overload"));

        let config = StubConfig {
            include_obsolete: true,
            ..StubConfig::default()
        };
        let (rendered, _) = render_all(&many, &config);
        assert_eq!(rendered.len(), 3);
    }

    #[test]
    fn test_return_shapes() {
        let ty = TypeBuilder::class("Acme", "Shapes")
            .method(MethodBuilder::new("Reset"))
            .method(MethodBuilder::new("Count").returns("System.Int32"))
            .method(MethodBuilder::new("Fill").out_param("buffer", "System.Byte[]"))
            .method(
                MethodBuilder::new("Swap")
                    .ref_param("left", "System.String")
                    .param("flag", "System.Boolean")
                    .out_param("count", "System.Int64")
                    .returns("System.Double"),
            )
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "def Reset(self) -> None: ...",
                "def Count(self) -> int: ...",
                "def Fill(self) -> Tuple[List[int]]: ...",
                "def Swap(self, left: str, flag: bool) -> Tuple[float, str, int]: ...",
            ]
        );
    }

    #[test]
    fn test_method_filters_and_overloads() {
        let ty = TypeBuilder::class("Acme", "Filters")
            .method(MethodBuilder::new("Run").param("count", "System.Int32"))
            .method(MethodBuilder::new("Run").param("name", "System.String"))
            .method(MethodBuilder::new("Run").flags(MethodAttributes::PRIVATE))
            .method(MethodBuilder::new("Old").obsolete())
            .method(MethodBuilder::new("ToString").declared_by("System.Object").returns("System.String"))
            .method(
                MethodBuilder::new("Create")
                    .static_method()
                    .unnamed_param("System.Int32")
                    .returns("Acme.Widget"),
            )
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "@overload",
                "def Run(self, count: int) -> None: ...",
                "@overload",
                "def Run(self, name: str) -> None: ...",
                "@staticmethod",
                "def Create(arg0: int) -> Widget: ...",
            ]
        );
        assert_eq!(rendered[0].overloads, 2);
    }

    #[test]
    fn test_accessor_pair_folds_into_one_property() {
        let ty = TypeBuilder::class("Acme", "Folding")
            .method(MethodBuilder::new("Before"))
            .getter("Size", "System.Int32")
            .method(MethodBuilder::new("Between"))
            .setter("Size", "System.Int32")
            .build()
            .unwrap();

        let (rendered, diagnostics) = render_all(&ty, &StubConfig::default());
        let names: Vec<_> = rendered.iter().map(|member| member.name.as_str()).collect();
        assert_eq!(names, vec!["Before", "Size", "Between"]);
        assert_eq!(
            rendered[1].lines,
            vec![
                "@property",
                "def Size(self) -> int: ...",
                "@Size.setter",
                "def Size(self, value: int) -> None: ...",
            ]
        );
        assert!(!diagnostics.has_any());
    }

    #[test]
    fn test_write_only_and_static_properties() {
        let ty = TypeBuilder::class("Acme", "Props")
            .setter("Secret", "System.String")
            .method(
                MethodBuilder::new("get_Default")
                    .static_method()
                    .accessor(AccessorKind::Get)
                    .returns("Acme.Widget"),
            )
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "def set_Secret(self, value: str) -> None: ...",
                "Secret = property(fset=set_Secret)",
                "Default: ClassVar[Widget]",
            ]
        );
    }

    #[test]
    fn test_indexer_accessors() {
        let ty = TypeBuilder::class("Acme", "Table")
            .method(
                MethodBuilder::new("get_Item")
                    .accessor(AccessorKind::Get)
                    .param("index", "System.Int32")
                    .returns("System.String"),
            )
            .method(
                MethodBuilder::new("set_Item")
                    .accessor(AccessorKind::Set)
                    .param("index", "System.Int32")
                    .param("value", "System.String"),
            )
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "def __getitem__(self, index: int) -> str: ...",
                "def __setitem__(self, index: int, value: str) -> None: ...",
            ]
        );
    }

    #[test]
    fn test_in_reference_joins_return_tuple() {
        let ty = TypeBuilder::class("Acme", "Refs")
            .method(MethodBuilder::new("Touch").in_param("value", "System.Int32"))
            .method(
                MethodBuilder::new("Measure")
                    .in_param("origin", "valuetype Acme.Geometry.Point")
                    .returns("System.Double"),
            )
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "def Touch(self, value: int) -> Tuple[int]: ...",
                "def Measure(self, origin: Point) -> Tuple[float, Point]: ...",
            ]
        );
    }

    fn indexer_getter(index: &str) -> MethodBuilder {
        MethodBuilder::new("get_Item")
            .accessor(AccessorKind::Get)
            .param("index", index)
            .returns("System.String")
    }

    #[test]
    fn test_overloaded_indexer_accessors() {
        let ty = TypeBuilder::class("Acme", "Lookup")
            .method(indexer_getter("System.Int32"))
            .method(indexer_getter("System.String"))
            .method(
                MethodBuilder::new("set_Item")
                    .accessor(AccessorKind::Set)
                    .param("index", "System.Int32")
                    .param("value", "System.String"),
            )
            .build()
            .unwrap();

        let (rendered, diagnostics) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "@overload",
                "def __getitem__(self, index: int) -> str: ...",
                "def __setitem__(self, index: int, value: str) -> None: ...",
                "@overload",
                "def __getitem__(self, index: str) -> str: ...",
            ]
        );
        assert!(rendered.iter().all(|member| member.is_overload()));
        assert!(!diagnostics.has_any());
    }

    #[test]
    fn test_repeated_accessor_is_reported() {
        let ty = TypeBuilder::class("Acme", "Twice")
            .method(indexer_getter("System.Int32"))
            .method(indexer_getter("System.Int32"))
            .build()
            .unwrap();

        let (rendered, diagnostics) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec!["def __getitem__(self, index: int) -> str: ..."]
        );
        let accessor = diagnostics.by_category(DiagnosticCategory::Accessor);
        assert_eq!(accessor.len(), 1);
        assert_eq!(accessor[0].severity, DiagnosticSeverity::Warning);
    }

    #[test]
    fn test_first_class_indexer_overloads() {
        let indexer = |name: &str, index: &str| MetadataProperty {
            name: "Item".to_string(),
            property_type: "System.String".parse().unwrap(),
            flags: MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
            can_read: true,
            can_write: false,
            index_params: vec![Parameter {
                name: Some(name.to_string()),
                param_type: index.parse().unwrap(),
                ..Parameter::default()
            }],
            ..MetadataProperty::default()
        };
        let ty = TypeBuilder::class("Acme", "Catalog")
            .property_entry(indexer("index", "System.Int32"))
            .property_entry(indexer("key", "System.String"))
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "@overload",
                "def __getitem__(self, index: int) -> str: ...",
                "@overload",
                "def __getitem__(self, key: str) -> str: ...",
            ]
        );
        assert_eq!(rendered[0].overloads, 2);
    }

    #[test]
    fn test_first_class_property_suppresses_accessors() {
        let ty = TypeBuilder::class("Acme", "Entries")
            .property("Name", "System.String", true, false)
            .getter("Name", "System.String")
            .method(MethodBuilder::new("get_Name").param("culture", "System.String").returns("System.String"))
            .build()
            .unwrap();

        let (rendered, diagnostics) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "@property",
                "def Name(self) -> str: ...",
                "def get_Name(self, culture: str) -> str: ...",
            ]
        );
        let accessor = diagnostics.by_category(DiagnosticCategory::Accessor);
        assert_eq!(accessor.len(), 1);
        assert_eq!(accessor[0].severity, DiagnosticSeverity::Info);
    }

    #[test]
    fn test_method_colliding_with_property_is_reported() {
        let ty = TypeBuilder::class("Acme", "Collide")
            .getter("Value", "System.Int32")
            .method(MethodBuilder::new("Value").param("scale", "System.Int32").returns("System.Int32"))
            .build()
            .unwrap();

        let (rendered, diagnostics) = render_all(&ty, &StubConfig::default());
        assert_eq!(rendered.len(), 2);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(
            diagnostics.by_category(DiagnosticCategory::Accessor)[0].subject,
            None
        );
    }

    #[test]
    fn test_interface_members_are_abstract() {
        let ty = TypeBuilder::interface("Acme", "IShape")
            .method(MethodBuilder::new("Area").returns("System.Double"))
            .getter("Name", "System.String")
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "@abstractmethod",
                "def Area(self) -> float: ...",
                "@property",
                "@abstractmethod",
                "def Name(self) -> str: ...",
            ]
        );
    }

    #[test]
    fn test_fields_events_and_defaults() {
        let ty = TypeBuilder::class("Acme", "Misc")
            .field("Count", "System.Int32", FieldAttributes::PUBLIC)
            .field("Hidden", "System.Int32", FieldAttributes::PRIVATE)
            .constant("Max", "System.Int32", ConstantValue::I4(10))
            .event("Changed", "System.Action")
            .method(
                MethodBuilder::new("add_Changed")
                    .accessor(AccessorKind::Add)
                    .param("value", "System.Action"),
            )
            .method(
                MethodBuilder::new("Open")
                    .param("from", "System.String")
                    .optional_param("retries", "System.Int32", ConstantValue::I4(3))
                    .optional_param("label", "System.String", ConstantValue::String("x".into()))
                    .optional_param("strict", "System.Boolean", ConstantValue::Boolean(false)),
            )
            .build()
            .unwrap();

        let (rendered, _) = render_all(&ty, &StubConfig::default());
        assert_eq!(
            lines(&rendered),
            vec![
                "Count: int",
                "Max: ClassVar[int]",
                "Changed: Callable[[], None]",
                "def Open(self, from_: str, retries: int = 3, label: str = ..., strict: bool = False) -> None: ...",
            ]
        );
    }

    #[test]
    fn test_enum_values() {
        let provider = acme_provider();
        let diagnostics = Diagnostics::new();
        let mapper = TypeNameMapper::new(&provider, &diagnostics);

        let none = EnumValue {
            name: "None".to_string(),
            value: ConstantValue::I4(2),
        };
        assert_eq!(
            render_enum_value(&none, PrimitiveKind::I4, &mapper).lines,
            vec!["_None = 2"]
        );

        let wide = EnumValue {
            name: "All".to_string(),
            value: ConstantValue::I4(-1),
        };
        assert_eq!(
            render_enum_value(&wide, PrimitiveKind::U1, &mapper).lines,
            vec!["All = 255"]
        );

        let text = EnumValue {
            name: "Odd".to_string(),
            value: ConstantValue::String("x".into()),
        };
        assert_eq!(
            render_enum_value(&text, PrimitiveKind::I4, &mapper).lines,
            vec!["Odd = ..."]
        );
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Member).len(), 1);
    }
}
