//! Type, member and parameter attribute flags.
//!
//! The bit values follow ECMA-335 (§II.23.1) so that flags copied from a reflection or
//! metadata dump keep their meaning. Access levels are not independent bits but a 3-bit
//! value inside the mask; use the accessor helpers rather than `contains` for them.
//!
//! # Key Types
//! - [`TypeAttributes`]: Visibility and semantics of a type
//! - [`MethodAttributes`]: Access and modifiers of methods, constructors, properties and events
//! - [`FieldAttributes`]: Access and modifiers of fields
//! - [`ParamAttributes`]: Direction and optionality of parameters
//! - [`MemberAccess`]: Decoded access level

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Bitmask for type visibility extraction
pub const TYPE_VISIBILITY_MASK: u32 = 0x0007;
/// Bitmask for member `ACCESS` extraction (methods and fields)
pub const MEMBER_ACCESS_MASK: u32 = 0x0007;

/// Fully qualified name of the attribute marking obsolete types and members
pub const OBSOLETE_ATTRIBUTE: &str = "System.ObsoleteAttribute";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    /// Type attribute flags
    pub struct TypeAttributes: u32 {
        /// Type has public scope
        const PUBLIC = 0x0001;
        /// Nested type with public visibility
        const NESTED_PUBLIC = 0x0002;
        /// Nested type with private visibility
        const NESTED_PRIVATE = 0x0003;
        /// Type is an interface
        const INTERFACE = 0x0020;
        /// Type is abstract
        const ABSTRACT = 0x0080;
        /// Type cannot be derived from
        const SEALED = 0x0100;
        /// Type name is special, the name describes how
        const SPECIAL_NAME = 0x0400;
        /// Type is imported
        const IMPORT = 0x1000;
        /// Type is serializable
        const SERIALIZABLE = 0x2000;
    }
}

impl TypeAttributes {
    /// True if the type is visible outside its assembly
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.bits() & TYPE_VISIBILITY_MASK, 0x0001 | 0x0002)
    }

    /// True if the type carries the special-name flag
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        self.contains(TypeAttributes::SPECIAL_NAME)
    }
}

/// Decoded access level of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberAccess {
    /// Member not referenceable
    CompilerControlled,
    /// Accessible only by the parent type
    Private,
    /// Accessible by sub-types only in this assembly
    FamilyAndAssembly,
    /// Accessible by anyone in the assembly
    Assembly,
    /// Accessible only by type and sub-types
    Family,
    /// Accessible by sub-types anywhere, plus anyone in the assembly
    FamilyOrAssembly,
    /// Accessible by anyone who has visibility to this scope
    Public,
}

impl MemberAccess {
    /// Extract the access level from raw member flags
    #[must_use]
    pub fn from_flags(flags: u32) -> Self {
        match flags & MEMBER_ACCESS_MASK {
            0x0001 => MemberAccess::Private,
            0x0002 => MemberAccess::FamilyAndAssembly,
            0x0003 => MemberAccess::Assembly,
            0x0004 => MemberAccess::Family,
            0x0005 => MemberAccess::FamilyOrAssembly,
            0x0006 => MemberAccess::Public,
            _ => MemberAccess::CompilerControlled,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    /// Method attribute flags, also used for properties and events (taken from their accessors)
    pub struct MethodAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, dpending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
    }
}

impl MethodAttributes {
    /// Decoded access level
    #[must_use]
    pub fn access(&self) -> MemberAccess {
        MemberAccess::from_flags(self.bits())
    }

    /// True if the access level is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.access() == MemberAccess::Public
    }

    /// True if the member is defined on the type rather than per instance
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.contains(MethodAttributes::STATIC)
    }

    /// True if the member carries the special-name flag
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        self.contains(MethodAttributes::SPECIAL_NAME)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    /// Field attribute flags
    pub struct FieldAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this Assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessibly by anyone in the Assembly
        const ASSEMBLY = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessibly by sub-types anywhere, plus anyone in assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written to after init
        const INIT_ONLY = 0x0020;
        /// Value is compile time constant
        const LITERAL = 0x0040;
        /// Field is special
        const SPECIAL_NAME = 0x0200;
        /// CLI provides 'special' behavior, depending upon the name of the field
        const RTSPECIAL_NAME = 0x0400;
        /// Field has a default value
        const HAS_DEFAULT = 0x8000;
    }
}

impl FieldAttributes {
    /// Decoded access level
    #[must_use]
    pub fn access(&self) -> MemberAccess {
        MemberAccess::from_flags(self.bits())
    }

    /// True if the access level is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.access() == MemberAccess::Public
    }

    /// True for static and literal fields, both live on the type
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.intersects(FieldAttributes::STATIC | FieldAttributes::LITERAL)
    }

    /// True if the field carries the special-name flag
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        self.contains(FieldAttributes::SPECIAL_NAME)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    /// Parameter attribute flags
    pub struct ParamAttributes: u32 {
        /// Parameter is input
        const IN = 0x0001;
        /// Parameter is output
        const OUT = 0x0002;
        /// Parameter is optional
        const OPTIONAL = 0x0010;
        /// Parameter has a default value
        const HAS_DEFAULT = 0x1000;
        /// Parameter has field marshaling information
        const HAS_FIELD_MARSHAL = 0x2000;
    }
}

macro_rules! impl_empty_default {
    ($($flags:ty),*) => {
        $(
            impl Default for $flags {
                fn default() -> Self {
                    Self::empty()
                }
            }
        )*
    };
}

impl_empty_default!(TypeAttributes, MethodAttributes, FieldAttributes, ParamAttributes);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_access_from_flags() {
        assert_eq!(MemberAccess::from_flags(0), MemberAccess::CompilerControlled);
        assert_eq!(MemberAccess::from_flags(0x0001), MemberAccess::Private);
        assert_eq!(MemberAccess::from_flags(0x0003), MemberAccess::Assembly);
        assert_eq!(MemberAccess::from_flags(0x0006), MemberAccess::Public);
        assert_eq!(MemberAccess::from_flags(0x0816), MemberAccess::Public);
    }

    #[test]
    fn test_method_attributes() {
        let flags = MethodAttributes::PUBLIC | MethodAttributes::STATIC;
        assert!(flags.is_public());
        assert!(flags.is_static());
        assert!(!flags.is_special_name());

        // FAMILY | FAM_AND_ASSEM share bits with PUBLIC but only the full value decodes as public
        let family = MethodAttributes::FAMILY;
        assert!(!family.is_public());
        assert_eq!(family.access(), MemberAccess::Family);
    }

    #[test]
    fn test_field_attributes_static() {
        assert!(FieldAttributes::LITERAL.is_static());
        assert!(FieldAttributes::STATIC.is_static());
        assert!(!(FieldAttributes::PUBLIC | FieldAttributes::INIT_ONLY).is_static());
    }

    #[test]
    fn test_type_visibility() {
        assert!(TypeAttributes::PUBLIC.is_visible());
        assert!(TypeAttributes::NESTED_PUBLIC.is_visible());
        assert!(!TypeAttributes::NESTED_PRIVATE.is_visible());
        assert!(!TypeAttributes::empty().is_visible());
        assert!((TypeAttributes::PUBLIC | TypeAttributes::SPECIAL_NAME).is_special_name());
    }
}
