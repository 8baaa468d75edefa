//! Read-only views of exported types and their members.
//!
//! A [`MetadataType`] owns its member lists (one-way containment). Base types and
//! interfaces are held as [`TypeSignature`] references and resolved lazily through the
//! [`crate::metadata::MetadataProvider`], so a type can point at a base that is not part
//! of the library being processed.
//!
//! Member lists keep declaration order. Accessor methods (`get_X`, `set_X`, `add_E`, ...)
//! appear in `methods` exactly like reflection lists them; folding them into properties is
//! a rendering decision, not a model one.

use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::metadata::{
    attributes::{
        FieldAttributes, MethodAttributes, ParamAttributes, TypeAttributes, OBSOLETE_ATTRIBUTE,
    },
    primitives::{ConstantValue, PrimitiveKind},
    signature::TypeSignature,
};

/// Shared reference to a `MetadataType`
pub type MetadataTypeRc = Arc<MetadataType>;

/// Shape of a type, decides how it is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeKind {
    /// Reference type
    #[default]
    Class,
    /// Interface
    Interface,
    /// Enumeration over an integral underlying type
    Enum,
    /// Non-enum value type (struct)
    ValueType,
    /// Array type, described by its element type
    Array,
    /// Delegate type
    Delegate,
}

/// Which half of a property or event an accessor method implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessorKind {
    /// Property getter, `get_X`
    Get,
    /// Property setter, `set_X`
    Set,
    /// Event subscription, `add_E`
    Add,
    /// Event unsubscription, `remove_E`
    Remove,
}

impl AccessorKind {
    /// Name prefix the runtime gives this accessor
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            AccessorKind::Get => "get_",
            AccessorKind::Set => "set_",
            AccessorKind::Add => "add_",
            AccessorKind::Remove => "remove_",
        }
    }

    /// True for property accessors
    #[must_use]
    pub fn is_property(&self) -> bool {
        matches!(self, AccessorKind::Get | AccessorKind::Set)
    }
}

/// How a parameter passes its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamDirection {
    /// Passed by value
    In,
    /// Output only, written by the callee
    Out,
    /// Passed by reference, `in` references included
    Ref,
}

/// A named constant of an enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Constant name
    pub name: String,
    /// Literal value as stored in metadata
    pub value: ConstantValue,
}

/// A method or constructor parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    /// Declared name, `None` for unnamed parameters
    pub name: Option<String>,
    /// Declared type, by-reference marker included
    pub param_type: TypeSignature,
    /// Parameter flags
    pub flags: ParamAttributes,
    /// Default value, if the parameter has one
    pub default: Option<ConstantValue>,
    /// Zero based position in the declared parameter list
    pub position: u32,
}

impl Parameter {
    /// Decoded passing direction.
    ///
    /// The `out` flag wins over the signature. Any other by-reference signature is a `ref`
    /// parameter, read-only references (`in`) included.
    #[must_use]
    pub fn direction(&self) -> ParamDirection {
        if self.flags.contains(ParamAttributes::OUT) {
            ParamDirection::Out
        } else if self.param_type.is_by_ref() {
            ParamDirection::Ref
        } else {
            ParamDirection::In
        }
    }

    /// True if the parameter can be omitted by a caller
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
            || self
                .flags
                .intersects(ParamAttributes::OPTIONAL | ParamAttributes::HAS_DEFAULT)
    }
}

/// A method or constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataMethod {
    /// Method name, `.ctor` for constructors
    pub name: String,
    /// Qualified name of the type that declares this method
    pub declaring_type: String,
    /// Method flags
    pub flags: MethodAttributes,
    /// Declared parameters, in order
    pub params: Vec<Parameter>,
    /// Declared return type
    pub return_type: TypeSignature,
    /// Set for property and event accessor methods
    pub accessor: Option<AccessorKind>,
    /// Unbound generic parameters of a generic method definition
    pub generic_params: Vec<String>,
    /// Qualified names of the applied custom attributes
    pub custom_attributes: Vec<String>,
}

impl Default for MetadataMethod {
    fn default() -> Self {
        MetadataMethod {
            name: String::new(),
            declaring_type: String::new(),
            flags: MethodAttributes::empty(),
            params: Vec::new(),
            return_type: TypeSignature::Primitive(PrimitiveKind::Void),
            accessor: None,
            generic_params: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }
}

impl MetadataMethod {
    /// True if the method is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags.is_public()
    }

    /// True if the method has no receiver
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }

    /// True if the method carries the special-name flag
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        self.flags.is_special_name()
    }

    /// True if the method is marked `[Obsolete]`
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        has_obsolete(&self.custom_attributes)
    }

    /// True if the method is declared by `owner`. An empty declaring type counts as declared
    /// by whichever type lists the method.
    #[must_use]
    pub fn is_declared_by(&self, owner: &str) -> bool {
        declared_by(&self.declaring_type, owner)
    }

    /// The accessor kind and target member name, for genuine accessor methods.
    ///
    /// A method only counts as an accessor when it carries the special-name flag, declares an
    /// accessor kind and its name starts with the matching prefix. A plain method that merely
    /// happens to be called `get_Foo` is not an accessor.
    #[must_use]
    pub fn accessor_target(&self) -> Option<(AccessorKind, &str)> {
        if !self.is_special_name() {
            return None;
        }

        let kind = self.accessor?;
        self.name
            .strip_prefix(kind.prefix())
            .filter(|target| !target.is_empty())
            .map(|target| (kind, target))
    }

    /// Parameters that stay in the call signature (everything but `out`)
    pub fn input_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params
            .iter()
            .filter(|param| param.direction() != ParamDirection::Out)
    }

    /// Parameters whose value flows back to the caller (`out` and `ref`)
    pub fn output_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params
            .iter()
            .filter(|param| param.direction() != ParamDirection::In)
    }
}

/// A first-class property entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataProperty {
    /// Property name
    pub name: String,
    /// Qualified name of the declaring type
    pub declaring_type: String,
    /// Property type
    pub property_type: TypeSignature,
    /// Flags of the property's accessors
    pub flags: MethodAttributes,
    /// Has a public getter
    pub can_read: bool,
    /// Has a public setter
    pub can_write: bool,
    /// Index parameters, non-empty for indexers
    pub index_params: Vec<Parameter>,
    /// Qualified names of the applied custom attributes
    pub custom_attributes: Vec<String>,
}

impl MetadataProperty {
    /// True if the property is marked `[Obsolete]`
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        has_obsolete(&self.custom_attributes)
    }

    /// True if the property takes index parameters
    #[must_use]
    pub fn is_indexer(&self) -> bool {
        !self.index_params.is_empty()
    }
}

/// A field, including literal constants
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataField {
    /// Field name
    pub name: String,
    /// Qualified name of the declaring type
    pub declaring_type: String,
    /// Field type
    pub field_type: TypeSignature,
    /// Field flags
    pub flags: FieldAttributes,
    /// Constant value of literal fields
    pub constant: Option<ConstantValue>,
    /// Qualified names of the applied custom attributes
    pub custom_attributes: Vec<String>,
}

impl MetadataField {
    /// True if the field is marked `[Obsolete]`
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        has_obsolete(&self.custom_attributes)
    }
}

/// An event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataEvent {
    /// Event name
    pub name: String,
    /// Qualified name of the declaring type
    pub declaring_type: String,
    /// Delegate type of the handler
    pub handler_type: TypeSignature,
    /// Flags of the event's accessors
    pub flags: MethodAttributes,
    /// Qualified names of the applied custom attributes
    pub custom_attributes: Vec<String>,
}

impl MetadataEvent {
    /// True if the event is marked `[Obsolete]`
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        has_obsolete(&self.custom_attributes)
    }
}

/// One exported type.
///
/// Identity is the qualified name: two `MetadataType` values compare equal when their
/// namespace and name match, regardless of their members.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataType {
    /// Dotted namespace, empty for the global namespace
    pub namespace: String,
    /// Simple name. Nested types use `Outer+Inner`, generic definitions carry their arity (`` Box`1 ``)
    pub name: String,
    /// Shape of the type
    pub kind: TypeKind,
    /// Type flags
    pub flags: TypeAttributes,
    /// Base type, if any
    pub base: Option<TypeSignature>,
    /// Implemented interfaces
    pub interfaces: Vec<TypeSignature>,
    /// Unbound generic parameters; non-empty for generic type definitions
    pub generic_params: Vec<String>,
    /// Generic arguments of a constructed generic type
    pub generic_args: Vec<TypeSignature>,
    /// Element type of array types
    pub element_type: Option<TypeSignature>,
    /// Underlying integral type of enums
    pub enum_underlying: Option<PrimitiveKind>,
    /// Constants of enums, in declaration order
    pub enum_values: Vec<EnumValue>,
    /// Qualified names of the applied custom attributes
    pub custom_attributes: Vec<String>,
    /// Instance and static constructors
    pub constructors: Vec<MetadataMethod>,
    /// Methods, accessors included
    pub methods: Vec<MetadataMethod>,
    /// First-class properties
    pub properties: Vec<MetadataProperty>,
    /// Fields
    pub fields: Vec<MetadataField>,
    /// Events
    pub events: Vec<MetadataEvent>,
}

impl MetadataType {
    /// Qualified name, `namespace.name`
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Namespace split into its segments, empty for the global namespace
    #[must_use]
    pub fn namespace_path(&self) -> Vec<&str> {
        if self.namespace.is_empty() {
            Vec::new()
        } else {
            self.namespace.split('.').collect()
        }
    }

    /// First namespace segment, empty for the global namespace
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        self.namespace.split('.').next().unwrap_or_default()
    }

    /// True for interfaces, by kind or by flag
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface || self.flags.contains(TypeAttributes::INTERFACE)
    }

    /// True for enums
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    /// True for open generic type definitions
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        !self.generic_params.is_empty()
    }

    /// True if the type is marked `[Obsolete]`
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        has_obsolete(&self.custom_attributes)
    }

    /// All members in section order: constructors, properties, fields, events, methods.
    /// Within a section, declaration order is kept.
    pub fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.constructors
            .iter()
            .map(Member::Constructor)
            .chain(self.properties.iter().map(Member::Property))
            .chain(self.fields.iter().map(Member::Field))
            .chain(self.events.iter().map(Member::Event))
            .chain(self.methods.iter().map(Member::Method))
    }
}

impl PartialEq for MetadataType {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl Eq for MetadataType {}

impl Hash for MetadataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
    }
}

/// Borrowed view of any member of a type
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    /// Constructor
    Constructor(&'a MetadataMethod),
    /// Method, accessor methods included
    Method(&'a MetadataMethod),
    /// First-class property
    Property(&'a MetadataProperty),
    /// Field
    Field(&'a MetadataField),
    /// Event
    Event(&'a MetadataEvent),
}

impl<'a> Member<'a> {
    /// Declared member name
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            Member::Constructor(method) | Member::Method(method) => &method.name,
            Member::Property(property) => &property.name,
            Member::Field(field) => &field.name,
            Member::Event(event) => &event.name,
        }
    }

    /// True if the member is part of the public surface
    #[must_use]
    pub fn is_public(&self) -> bool {
        match self {
            Member::Constructor(method) | Member::Method(method) => method.is_public(),
            Member::Property(property) => property.flags.is_public(),
            Member::Field(field) => field.flags.is_public(),
            Member::Event(event) => event.flags.is_public(),
        }
    }

    /// True if the member lives on the type rather than on instances
    #[must_use]
    pub fn is_static(&self) -> bool {
        match self {
            Member::Constructor(method) | Member::Method(method) => method.is_static(),
            Member::Property(property) => property.flags.is_static(),
            Member::Field(field) => field.flags.is_static(),
            Member::Event(event) => event.flags.is_static(),
        }
    }

    /// True if the member is marked `[Obsolete]`
    #[must_use]
    pub fn is_obsolete(&self) -> bool {
        match self {
            Member::Constructor(method) | Member::Method(method) => method.is_obsolete(),
            Member::Property(property) => property.is_obsolete(),
            Member::Field(field) => field.is_obsolete(),
            Member::Event(event) => event.is_obsolete(),
        }
    }

    /// True if the member carries the special-name flag
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        match self {
            Member::Constructor(method) | Member::Method(method) => method.is_special_name(),
            Member::Property(property) => property.flags.is_special_name(),
            Member::Field(field) => field.flags.is_special_name(),
            Member::Event(event) => event.flags.is_special_name(),
        }
    }

    /// Qualified name of the declaring type
    #[must_use]
    pub fn declaring_type(&self) -> &'a str {
        match self {
            Member::Constructor(method) | Member::Method(method) => &method.declaring_type,
            Member::Property(property) => &property.declaring_type,
            Member::Field(field) => &field.declaring_type,
            Member::Event(event) => &event.declaring_type,
        }
    }

    /// True if `owner` declares this member (an empty declaring type counts as declared)
    #[must_use]
    pub fn is_declared_by(&self, owner: &str) -> bool {
        declared_by(self.declaring_type(), owner)
    }
}

fn declared_by(declaring_type: &str, owner: &str) -> bool {
    declaring_type.is_empty() || declaring_type == owner
}

fn has_obsolete(attributes: &[String]) -> bool {
    attributes.iter().any(|name| name == OBSOLETE_ATTRIBUTE)
}
