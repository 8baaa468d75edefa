//! Fluent builders for metadata types.
//!
//! [`TypeBuilder`] and [`MethodBuilder`] assemble [`MetadataType`] values in code, which is
//! how embedders without a JSON snapshot feed the engine and how the tests describe their
//! fixtures. Type references are given in the textual signature form (see
//! [`crate::metadata::TypeSignature`]); the first malformed signature is reported by `build`.
//!
//! # Example
//!
//! ```rust
//! use dotstub::metadata::{MethodBuilder, TypeBuilder};
//!
//! let widget = TypeBuilder::class("Acme", "Widget")
//!     .constructor(MethodBuilder::constructor().param("count", "System.Int32"))
//!     .getter("Size", "System.Int32")
//!     .setter("Size", "System.Int32")
//!     .build()?;
//!
//! assert_eq!(widget.fullname(), "Acme.Widget");
//! assert_eq!(widget.methods.len(), 2);
//! # Ok::<(), dotstub::Error>(())
//! ```

use crate::{
    metadata::{
        attributes::{
            FieldAttributes, MethodAttributes, ParamAttributes, TypeAttributes,
            OBSOLETE_ATTRIBUTE,
        },
        primitives::{ConstantValue, PrimitiveKind},
        signature::TypeSignature,
        types::{
            AccessorKind, EnumValue, MetadataEvent, MetadataField, MetadataMethod,
            MetadataProperty, MetadataType, Parameter, TypeKind,
        },
    },
    Error, Result,
};

/// Parses `text`, keeping only the first failure in `error`
fn parse_into(error: &mut Option<Error>, text: &str) -> TypeSignature {
    match text.parse() {
        Ok(signature) => signature,
        Err(err) => {
            if error.is_none() {
                *error = Some(err);
            }
            TypeSignature::Unknown
        }
    }
}

/// Provides a fluent API for building methods and constructors
#[derive(Debug)]
pub struct MethodBuilder {
    method: MetadataMethod,
    error: Option<Error>,
}

impl MethodBuilder {
    /// Start a public instance method
    ///
    /// ## Arguments
    /// * 'name' - Method name
    pub fn new(name: &str) -> Self {
        MethodBuilder {
            method: MetadataMethod {
                name: name.to_string(),
                flags: MethodAttributes::PUBLIC | MethodAttributes::HIDE_BY_SIG,
                ..MetadataMethod::default()
            },
            error: None,
        }
    }

    /// Start a public instance constructor
    pub fn constructor() -> Self {
        MethodBuilder {
            method: MetadataMethod {
                name: ".ctor".to_string(),
                flags: MethodAttributes::PUBLIC
                    | MethodAttributes::HIDE_BY_SIG
                    | MethodAttributes::SPECIAL_NAME
                    | MethodAttributes::RTSPECIAL_NAME,
                ..MetadataMethod::default()
            },
            error: None,
        }
    }

    /// Replace the method flags
    #[must_use]
    pub fn flags(mut self, flags: MethodAttributes) -> Self {
        self.method.flags = flags;
        self
    }

    /// Mark the method static
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.method.flags |= MethodAttributes::STATIC;
        self
    }

    /// Mark the method as a property or event accessor (sets the special-name flag)
    #[must_use]
    pub fn accessor(mut self, kind: AccessorKind) -> Self {
        self.method.flags |= MethodAttributes::SPECIAL_NAME;
        self.method.accessor = Some(kind);
        self
    }

    /// Mark the method `[Obsolete]`
    #[must_use]
    pub fn obsolete(self) -> Self {
        self.attribute(OBSOLETE_ATTRIBUTE)
    }

    /// Apply a custom attribute
    #[must_use]
    pub fn attribute(mut self, name: &str) -> Self {
        self.method.custom_attributes.push(name.to_string());
        self
    }

    /// Declare the method on another type (inherited members keep their declaring type)
    #[must_use]
    pub fn declared_by(mut self, qualified_name: &str) -> Self {
        self.method.declaring_type = qualified_name.to_string();
        self
    }

    /// Add an unbound generic method parameter
    #[must_use]
    pub fn generic_param(mut self, name: &str) -> Self {
        self.method.generic_params.push(name.to_string());
        self
    }

    /// Set the return type
    #[must_use]
    pub fn returns(mut self, signature: &str) -> Self {
        self.method.return_type = parse_into(&mut self.error, signature);
        self
    }

    fn push_param(
        mut self,
        name: Option<&str>,
        signature: TypeSignature,
        flags: ParamAttributes,
        default: Option<ConstantValue>,
    ) -> Self {
        let position = u32::try_from(self.method.params.len()).unwrap_or(u32::MAX);
        self.method.params.push(Parameter {
            name: name.map(str::to_string),
            param_type: signature,
            flags,
            default,
            position,
        });
        self
    }

    /// Add an input parameter
    #[must_use]
    pub fn param(mut self, name: &str, signature: &str) -> Self {
        let signature = parse_into(&mut self.error, signature);
        self.push_param(Some(name), signature, ParamAttributes::empty(), None)
    }

    /// Add a parameter without a declared name
    #[must_use]
    pub fn unnamed_param(mut self, signature: &str) -> Self {
        let signature = parse_into(&mut self.error, signature);
        self.push_param(None, signature, ParamAttributes::empty(), None)
    }

    /// Add an `out` parameter. The by-reference marker is added when missing.
    #[must_use]
    pub fn out_param(mut self, name: &str, signature: &str) -> Self {
        let signature = by_ref(parse_into(&mut self.error, signature));
        self.push_param(Some(name), signature, ParamAttributes::OUT, None)
    }

    /// Add a `ref` parameter. The by-reference marker is added when missing.
    #[must_use]
    pub fn ref_param(mut self, name: &str, signature: &str) -> Self {
        let signature = by_ref(parse_into(&mut self.error, signature));
        self.push_param(Some(name), signature, ParamAttributes::empty(), None)
    }

    /// Add a read-only `in` reference parameter. The by-reference marker is added when missing.
    #[must_use]
    pub fn in_param(mut self, name: &str, signature: &str) -> Self {
        let signature = by_ref(parse_into(&mut self.error, signature));
        self.push_param(Some(name), signature, ParamAttributes::IN, None)
    }

    /// Add an optional parameter with a default value
    #[must_use]
    pub fn optional_param(mut self, name: &str, signature: &str, default: ConstantValue) -> Self {
        let signature = parse_into(&mut self.error, signature);
        self.push_param(
            Some(name),
            signature,
            ParamAttributes::OPTIONAL | ParamAttributes::HAS_DEFAULT,
            Some(default),
        )
    }

    /// Finish the method
    ///
    /// # Errors
    /// Returns the first malformed signature passed to this builder.
    pub fn build(self) -> Result<MetadataMethod> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.method),
        }
    }
}

fn by_ref(signature: TypeSignature) -> TypeSignature {
    if signature.is_by_ref() {
        signature
    } else {
        TypeSignature::by_ref(signature)
    }
}

/// Provides a fluent API for building exported types
#[derive(Debug)]
pub struct TypeBuilder {
    ty: MetadataType,
    error: Option<Error>,
}

impl TypeBuilder {
    fn with_kind(namespace: &str, name: &str, kind: TypeKind) -> Self {
        let mut flags = TypeAttributes::PUBLIC;
        match kind {
            TypeKind::Interface => flags |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
            TypeKind::Enum | TypeKind::ValueType | TypeKind::Delegate => {
                flags |= TypeAttributes::SEALED;
            }
            TypeKind::Class | TypeKind::Array => {}
        }

        TypeBuilder {
            ty: MetadataType {
                namespace: namespace.to_string(),
                name: name.to_string(),
                kind,
                flags,
                ..MetadataType::default()
            },
            error: None,
        }
    }

    /// Start building a public class
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for a class type
    /// * 'name'      - Name for a class type
    pub fn class(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::Class)
    }

    /// Start building a public interface
    pub fn interface(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::Interface)
    }

    /// Start building a public value type
    pub fn value_type(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::ValueType)
    }

    /// Start building a public delegate type
    pub fn delegate(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::Delegate)
            .base("System.MulticastDelegate")
    }

    /// Start building a public enum
    ///
    /// ## Arguments
    /// * 'namespace'  - Namespace for the enum
    /// * 'name'       - Name for the enum
    /// * 'underlying' - Integral type the constants are stored as
    pub fn enumeration(namespace: &str, name: &str, underlying: PrimitiveKind) -> Self {
        let mut builder = Self::with_kind(namespace, name, TypeKind::Enum).base("System.Enum");
        builder.ty.enum_underlying = Some(underlying);
        builder
    }

    /// Start building an array type over `element`
    pub fn array(namespace: &str, name: &str, element: &str) -> Self {
        let mut builder = Self::with_kind(namespace, name, TypeKind::Array);
        builder.ty.element_type = Some(parse_into(&mut builder.error, element));
        builder
    }

    /// Replace the type flags
    #[must_use]
    pub fn flags(mut self, flags: TypeAttributes) -> Self {
        self.ty.flags = flags;
        self
    }

    /// Set the base type
    #[must_use]
    pub fn base(mut self, signature: &str) -> Self {
        self.ty.base = Some(parse_into(&mut self.error, signature));
        self
    }

    /// Add an implemented interface
    #[must_use]
    pub fn implements(mut self, signature: &str) -> Self {
        let signature = parse_into(&mut self.error, signature);
        self.ty.interfaces.push(signature);
        self
    }

    /// Add an unbound generic parameter, making this a generic type definition
    #[must_use]
    pub fn generic_param(mut self, name: &str) -> Self {
        self.ty.generic_params.push(name.to_string());
        self
    }

    /// Mark the type `[Obsolete]`
    #[must_use]
    pub fn obsolete(self) -> Self {
        self.attribute(OBSOLETE_ATTRIBUTE)
    }

    /// Apply a custom attribute
    #[must_use]
    pub fn attribute(mut self, name: &str) -> Self {
        self.ty.custom_attributes.push(name.to_string());
        self
    }

    /// Add an enum constant
    #[must_use]
    pub fn enum_value(mut self, name: &str, value: ConstantValue) -> Self {
        self.ty.enum_values.push(EnumValue {
            name: name.to_string(),
            value,
        });
        self
    }

    /// Add a constructor
    #[must_use]
    pub fn constructor(mut self, builder: MethodBuilder) -> Self {
        if let Some(method) = self.take_method(builder) {
            self.ty.constructors.push(method);
        }
        self
    }

    /// Add a method
    #[must_use]
    pub fn method(mut self, builder: MethodBuilder) -> Self {
        if let Some(method) = self.take_method(builder) {
            self.ty.methods.push(method);
        }
        self
    }

    /// Add a special-name `get_<name>` accessor method
    #[must_use]
    pub fn getter(self, name: &str, signature: &str) -> Self {
        self.method(
            MethodBuilder::new(&format!("get_{name}"))
                .accessor(AccessorKind::Get)
                .returns(signature),
        )
    }

    /// Add a special-name `set_<name>` accessor method
    #[must_use]
    pub fn setter(self, name: &str, signature: &str) -> Self {
        self.method(
            MethodBuilder::new(&format!("set_{name}"))
                .accessor(AccessorKind::Set)
                .param("value", signature),
        )
    }

    /// Add a public instance property entry
    #[must_use]
    pub fn property(mut self, name: &str, signature: &str, can_read: bool, can_write: bool) -> Self {
        let property_type = parse_into(&mut self.error, signature);
        self.ty.properties.push(MetadataProperty {
            name: name.to_string(),
            property_type,
            flags: MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
            can_read,
            can_write,
            ..MetadataProperty::default()
        });
        self
    }

    /// Add a fully described property entry
    #[must_use]
    pub fn property_entry(mut self, property: MetadataProperty) -> Self {
        self.ty.properties.push(property);
        self
    }

    /// Add a field
    #[must_use]
    pub fn field(mut self, name: &str, signature: &str, flags: FieldAttributes) -> Self {
        let field_type = parse_into(&mut self.error, signature);
        self.ty.fields.push(MetadataField {
            name: name.to_string(),
            field_type,
            flags,
            ..MetadataField::default()
        });
        self
    }

    /// Add a public literal constant field
    #[must_use]
    pub fn constant(mut self, name: &str, signature: &str, value: ConstantValue) -> Self {
        let field_type = parse_into(&mut self.error, signature);
        self.ty.fields.push(MetadataField {
            name: name.to_string(),
            field_type,
            flags: FieldAttributes::PUBLIC
                | FieldAttributes::STATIC
                | FieldAttributes::LITERAL
                | FieldAttributes::HAS_DEFAULT,
            constant: Some(value),
            ..MetadataField::default()
        });
        self
    }

    /// Add a public instance event
    #[must_use]
    pub fn event(mut self, name: &str, handler: &str) -> Self {
        let handler_type = parse_into(&mut self.error, handler);
        self.ty.events.push(MetadataEvent {
            name: name.to_string(),
            handler_type,
            flags: MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
            ..MetadataEvent::default()
        });
        self
    }

    fn take_method(&mut self, builder: MethodBuilder) -> Option<MetadataMethod> {
        match builder.build() {
            Ok(method) => Some(method),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
                None
            }
        }
    }

    /// Finish the type. Members without a declaring type are declared by this type.
    ///
    /// # Errors
    /// Returns the first malformed signature passed to this builder or its method builders.
    pub fn build(mut self) -> Result<MetadataType> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let fullname = self.ty.fullname();
        let ty = &mut self.ty;
        for method in ty.constructors.iter_mut().chain(ty.methods.iter_mut()) {
            if method.declaring_type.is_empty() {
                method.declaring_type.clone_from(&fullname);
            }
        }
        for property in &mut ty.properties {
            property.declaring_type.clone_from(&fullname);
        }
        for field in &mut ty.fields {
            field.declaring_type.clone_from(&fullname);
        }
        for event in &mut ty.events {
            event.declaring_type.clone_from(&fullname);
        }

        Ok(self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::ParamDirection;

    #[test]
    fn test_method_builder_params() {
        let method = MethodBuilder::new("TryParse")
            .static_method()
            .param("value", "System.String")
            .out_param("result", "System.Int32")
            .returns("System.Boolean")
            .build()
            .unwrap();

        assert!(method.is_static());
        assert_eq!(method.params.len(), 2);
        assert_eq!(method.params[1].position, 1);
        assert_eq!(method.params[1].direction(), ParamDirection::Out);
        assert_eq!(method.params[1].param_type.to_string(), "System.Int32&");
        assert_eq!(method.input_params().count(), 1);
        assert_eq!(method.output_params().count(), 1);
    }

    #[test]
    fn test_type_builder_fills_declaring_type() {
        let ty = TypeBuilder::class("Acme", "Widget")
            .method(MethodBuilder::new("Run"))
            .method(MethodBuilder::new("ToString").declared_by("System.Object"))
            .property("Name", "System.String", true, false)
            .build()
            .unwrap();

        assert_eq!(ty.methods[0].declaring_type, "Acme.Widget");
        assert_eq!(ty.methods[1].declaring_type, "System.Object");
        assert_eq!(ty.properties[0].declaring_type, "Acme.Widget");
    }

    #[test]
    fn test_builder_reports_first_bad_signature() {
        let result = TypeBuilder::class("Acme", "Broken")
            .method(MethodBuilder::new("Run").returns("List`1[System.Int32"))
            .base("Acme.Base]")
            .build();

        match result {
            Err(Error::Error(message)) => assert!(message.contains("List`1[System.Int32")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_enum_builder() {
        let ty = TypeBuilder::enumeration("Acme", "Color", PrimitiveKind::I4)
            .enum_value("Red", ConstantValue::I4(0))
            .build()
            .unwrap();

        assert!(ty.is_enum());
        assert_eq!(ty.enum_underlying, Some(PrimitiveKind::I4));
        assert_eq!(ty.base, Some(TypeSignature::Class("System.Enum".into())));
    }
}
