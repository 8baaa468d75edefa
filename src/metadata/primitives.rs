use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

/// Represents all primitive types in CIL/.NET (without data)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, Serialize, Deserialize,
)]
pub enum PrimitiveKind {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
    /// System.String - immutable string of Unicode characters
    String,
    /// System.Object - base class for all reference types
    Object,
}

impl PrimitiveKind {
    /// The fully qualified runtime name of this primitive
    #[must_use]
    pub fn fullname(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "System.Void",
            PrimitiveKind::Boolean => "System.Boolean",
            PrimitiveKind::Char => "System.Char",
            PrimitiveKind::I1 => "System.SByte",
            PrimitiveKind::U1 => "System.Byte",
            PrimitiveKind::I2 => "System.Int16",
            PrimitiveKind::U2 => "System.UInt16",
            PrimitiveKind::I4 => "System.Int32",
            PrimitiveKind::U4 => "System.UInt32",
            PrimitiveKind::I8 => "System.Int64",
            PrimitiveKind::U8 => "System.UInt64",
            PrimitiveKind::R4 => "System.Single",
            PrimitiveKind::R8 => "System.Double",
            PrimitiveKind::I => "System.IntPtr",
            PrimitiveKind::U => "System.UIntPtr",
            PrimitiveKind::String => "System.String",
            PrimitiveKind::Object => "System.Object",
        }
    }

    /// Look up a primitive by its fully qualified runtime name
    ///
    /// ## Arguments
    /// * `name` - e.g. `System.Int32`
    #[must_use]
    pub fn from_fullname(name: &str) -> Option<Self> {
        let kind = match name {
            "System.Void" => PrimitiveKind::Void,
            "System.Boolean" => PrimitiveKind::Boolean,
            "System.Char" => PrimitiveKind::Char,
            "System.SByte" => PrimitiveKind::I1,
            "System.Byte" => PrimitiveKind::U1,
            "System.Int16" => PrimitiveKind::I2,
            "System.UInt16" => PrimitiveKind::U2,
            "System.Int32" => PrimitiveKind::I4,
            "System.UInt32" => PrimitiveKind::U4,
            "System.Int64" => PrimitiveKind::I8,
            "System.UInt64" => PrimitiveKind::U8,
            "System.Single" => PrimitiveKind::R4,
            "System.Double" => PrimitiveKind::R8,
            "System.IntPtr" => PrimitiveKind::I,
            "System.UIntPtr" => PrimitiveKind::U,
            "System.String" => PrimitiveKind::String,
            "System.Object" => PrimitiveKind::Object,
            _ => return None,
        };
        Some(kind)
    }

    /// Check if this is an integral type (valid as an enum's underlying type)
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::I1
                | PrimitiveKind::U1
                | PrimitiveKind::I2
                | PrimitiveKind::U2
                | PrimitiveKind::I4
                | PrimitiveKind::U4
                | PrimitiveKind::I8
                | PrimitiveKind::U8
                | PrimitiveKind::I
                | PrimitiveKind::U
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fullname())
    }
}

/// Literal constant data (enum values, parameter defaults, literal fields)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ConstantValue {
    /// Null reference
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// Character value
    Char(char),
    /// 8-bit signed integer
    I1(i8),
    /// 8-bit unsigned integer
    U1(u8),
    /// 16-bit signed integer
    I2(i16),
    /// 16-bit unsigned integer
    U2(u16),
    /// 32-bit signed integer
    I4(i32),
    /// 32-bit unsigned integer
    U4(u32),
    /// 64-bit signed integer
    I8(i64),
    /// 64-bit unsigned integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// String value
    String(String),
}

impl ConstantValue {
    /// Widen any integral constant (booleans and chars included) to an `i128`
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            ConstantValue::Boolean(value) => Some(i128::from(*value)),
            ConstantValue::Char(value) => Some(i128::from(u32::from(*value))),
            ConstantValue::I1(value) => Some(i128::from(*value)),
            ConstantValue::U1(value) => Some(i128::from(*value)),
            ConstantValue::I2(value) => Some(i128::from(*value)),
            ConstantValue::U2(value) => Some(i128::from(*value)),
            ConstantValue::I4(value) => Some(i128::from(*value)),
            ConstantValue::U4(value) => Some(i128::from(*value)),
            ConstantValue::I8(value) => Some(i128::from(*value)),
            ConstantValue::U8(value) => Some(i128::from(*value)),
            _ => None,
        }
    }

    /// Convert an integral constant into the representation of `kind`
    ///
    /// Values wider than the target are truncated to its width, the way the metadata
    /// stores enum literals. Native sized integers use the 64-bit representation.
    /// Returns `None` for non-integral constants or targets.
    ///
    /// ## Arguments
    /// * `kind` - The integral primitive to convert into
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn convert_to(&self, kind: PrimitiveKind) -> Option<ConstantValue> {
        let value = self.as_i128()?;
        let converted = match kind {
            PrimitiveKind::I1 => ConstantValue::I1(value as i8),
            PrimitiveKind::U1 => ConstantValue::U1(value as u8),
            PrimitiveKind::I2 => ConstantValue::I2(value as i16),
            PrimitiveKind::U2 => ConstantValue::U2(value as u16),
            PrimitiveKind::I4 => ConstantValue::I4(value as i32),
            PrimitiveKind::U4 => ConstantValue::U4(value as u32),
            PrimitiveKind::I8 | PrimitiveKind::I => ConstantValue::I8(value as i64),
            PrimitiveKind::U8 | PrimitiveKind::U => ConstantValue::U8(value as u64),
            _ => return None,
        };
        Some(converted)
    }

    /// Python literal for this constant, if it has a plain one
    ///
    /// Strings and chars have no entry here: stubs render them as `...`.
    #[must_use]
    pub fn python_literal(&self) -> Option<String> {
        match self {
            ConstantValue::Null => Some("None".to_string()),
            ConstantValue::Boolean(true) => Some("True".to_string()),
            ConstantValue::Boolean(false) => Some("False".to_string()),
            ConstantValue::R4(value) => float_literal(f64::from(*value)),
            ConstantValue::R8(value) => float_literal(*value),
            ConstantValue::Char(_) | ConstantValue::String(_) => None,
            other => other.as_i128().map(|value| value.to_string()),
        }
    }
}

fn float_literal(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let text = value.to_string();
    if text.contains('.') || text.contains('e') {
        Some(text)
    } else {
        Some(format!("{text}.0"))
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Boolean(value) => write!(f, "{value}"),
            ConstantValue::Char(value) => write!(f, "{value}"),
            ConstantValue::I1(value) => write!(f, "{value}"),
            ConstantValue::U1(value) => write!(f, "{value}"),
            ConstantValue::I2(value) => write!(f, "{value}"),
            ConstantValue::U2(value) => write!(f, "{value}"),
            ConstantValue::I4(value) => write!(f, "{value}"),
            ConstantValue::U4(value) => write!(f, "{value}"),
            ConstantValue::I8(value) => write!(f, "{value}"),
            ConstantValue::U8(value) => write!(f, "{value}"),
            ConstantValue::R4(value) => write!(f, "{value}"),
            ConstantValue::R8(value) => write!(f, "{value}"),
            ConstantValue::String(value) => write!(f, "{value}"),
        }
    }
}
