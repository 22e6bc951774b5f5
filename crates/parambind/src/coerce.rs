//! Conversion of request text into field values.
//!
//! Every bindable field type implements [`ParamValue`]. The strategies, in
//! priority order, are:
//!
//! 1. types implementing [`UnmarshalText`] delegate to it,
//! 2. `Option<T>` allocates `T` and recurses (any depth),
//! 3. `Vec<T>` coerces each value of a multi-valued parameter,
//! 4. primitives are parsed with width-bound range checks.
//!
//! [`FieldKind`] names the strategy chosen for a type so it can be resolved
//! once per field when the binding table is built.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::num::IntErrorKind;

use crate::error::{BoxError, CoerceError, NumErrorKind};

/// Types that construct themselves from a raw text representation.
///
/// Implementing this trait makes a type bindable; it takes priority over
/// every other coercion strategy.
///
/// # Example
///
/// ```rust
/// use parambind::{BoxError, UnmarshalText};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Csv(Vec<String>);
///
/// impl UnmarshalText for Csv {
///     fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), BoxError> {
///         let text = std::str::from_utf8(text)?;
///         self.0 = text.split(',').map(str::to_string).collect();
///         Ok(())
///     }
/// }
/// ```
pub trait UnmarshalText {
    /// Replaces the value with one decoded from `text`.
    fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), BoxError>;
}

/// Coercion strategy of a field type.
///
/// Values are coerced through [`ParamValue`]; the kind only describes the
/// field, for binding tables and log events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `bool`.
    Bool,
    /// Signed integer of the given width.
    Int {
        /// Width in bits.
        bits: u32,
    },
    /// Unsigned integer of the given width.
    Uint {
        /// Width in bits.
        bits: u32,
    },
    /// Float of the given width.
    Float {
        /// Width in bits.
        bits: u32,
    },
    /// `String`.
    String,
    /// A type implementing [`UnmarshalText`].
    Unmarshal,
    /// `Option<T>`.
    Pointer(Box<FieldKind>),
    /// `Vec<T>`.
    Slice(Box<FieldKind>),
    /// A type with no coercion strategy.
    Unsupported,
}

impl FieldKind {
    /// Returns true if the field accepts several values for one parameter.
    #[must_use]
    pub fn is_multi_valued(&self) -> bool {
        match self {
            Self::Slice(_) => true,
            Self::Pointer(inner) => inner.is_multi_valued(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int { bits } => write!(f, "int{bits}"),
            Self::Uint { bits } => write!(f, "uint{bits}"),
            Self::Float { bits } => write!(f, "float{bits}"),
            Self::String => write!(f, "string"),
            Self::Unmarshal => write!(f, "unmarshal"),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Slice(inner) => write!(f, "[]{inner}"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A field type that can be filled from request text.
pub trait ParamValue: Sized {
    /// Returns the coercion strategy of this type.
    fn kind() -> FieldKind;

    /// Assigns all values supplied for one parameter.
    ///
    /// Single-valued types accept exactly one value.
    fn assign(&mut self, values: &[String]) -> Result<(), CoerceError> {
        match values {
            [text] => self.assign_one(text),
            _ => Err(CoerceError::too_many::<Self>(values.len())),
        }
    }

    /// Assigns a single value.
    fn assign_one(&mut self, text: &str) -> Result<(), CoerceError>;
}

/// Object-safe view of a bindable field, used while walking a record.
pub trait ParamSlot {
    /// Resets the field to its default value.
    fn reset(&mut self);

    /// Binds all values of a multi-valued source.
    fn bind_values(&mut self, values: &[String]) -> Result<(), CoerceError>;

    /// Binds a single value.
    fn bind_text(&mut self, text: &str) -> Result<(), CoerceError>;
}

impl<T: ParamValue + Default> ParamSlot for T {
    fn reset(&mut self) {
        *self = T::default();
    }

    fn bind_values(&mut self, values: &[String]) -> Result<(), CoerceError> {
        self.assign(values)
    }

    fn bind_text(&mut self, text: &str) -> Result<(), CoerceError> {
        self.assign_one(text)
    }
}

impl<T: UnmarshalText> ParamValue for T {
    fn kind() -> FieldKind {
        FieldKind::Unmarshal
    }

    fn assign_one(&mut self, text: &str) -> Result<(), CoerceError> {
        self.unmarshal_text(text.as_bytes())
            .map_err(|source| CoerceError::Text {
                type_name: type_name::<T>(),
                source,
            })
    }
}

impl<T: ParamValue + Default> ParamValue for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::Pointer(Box::new(T::kind()))
    }

    fn assign(&mut self, values: &[String]) -> Result<(), CoerceError> {
        self.insert(T::default()).assign(values)
    }

    fn assign_one(&mut self, text: &str) -> Result<(), CoerceError> {
        self.insert(T::default()).assign_one(text)
    }
}

impl<T: ParamValue + Default> ParamValue for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::Slice(Box::new(T::kind()))
    }

    fn assign(&mut self, values: &[String]) -> Result<(), CoerceError> {
        let mut items = Vec::with_capacity(values.len());
        for (index, text) in values.iter().enumerate() {
            let mut item = T::default();
            item.assign_one(text).map_err(|e| CoerceError::Element {
                index,
                source: Box::new(e),
            })?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }

    // Sequences only bind from multi-valued sources.
    fn assign_one(&mut self, _text: &str) -> Result<(), CoerceError> {
        Err(CoerceError::unsupported::<Self>())
    }
}

impl<K, V, S> ParamValue for HashMap<K, V, S> {
    fn kind() -> FieldKind {
        FieldKind::Unsupported
    }

    fn assign_one(&mut self, _text: &str) -> Result<(), CoerceError> {
        Err(CoerceError::unsupported::<Self>())
    }
}

impl<K, V> ParamValue for BTreeMap<K, V> {
    fn kind() -> FieldKind {
        FieldKind::Unsupported
    }

    fn assign_one(&mut self, _text: &str) -> Result<(), CoerceError> {
        Err(CoerceError::unsupported::<Self>())
    }
}

impl ParamValue for String {
    fn kind() -> FieldKind {
        FieldKind::String
    }

    fn assign_one(&mut self, text: &str) -> Result<(), CoerceError> {
        text.clone_into(self);
        Ok(())
    }
}

impl ParamValue for bool {
    fn kind() -> FieldKind {
        FieldKind::Bool
    }

    fn assign_one(&mut self, text: &str) -> Result<(), CoerceError> {
        *self = match text {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
            "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
            _ => return Err(CoerceError::number::<bool>(NumErrorKind::Syntax, text)),
        };
        Ok(())
    }
}

fn int_error_kind(kind: &IntErrorKind) -> NumErrorKind {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => NumErrorKind::Range,
        _ => NumErrorKind::Syntax,
    }
}

macro_rules! impl_integer {
    ($variant:ident, signed = $signed:literal: $($ty:ty),*) => {$(
        impl ParamValue for $ty {
            fn kind() -> FieldKind {
                FieldKind::$variant { bits: <$ty>::BITS }
            }

            fn assign_one(&mut self, text: &str) -> Result<(), CoerceError> {
                // Unsigned text carries no sign at all.
                if !$signed && text.starts_with('+') {
                    return Err(CoerceError::number::<$ty>(NumErrorKind::Syntax, text));
                }
                *self = text
                    .parse::<$ty>()
                    .map_err(|e| CoerceError::number::<$ty>(int_error_kind(e.kind()), text))?;
                Ok(())
            }
        }
    )*};
}

impl_integer!(Int, signed = true: i8, i16, i32, i64, isize);
impl_integer!(Uint, signed = false: u8, u16, u32, u64, usize);

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

macro_rules! impl_float {
    ($($ty:ty => $bits:expr),*) => {$(
        impl ParamValue for $ty {
            fn kind() -> FieldKind {
                FieldKind::Float { bits: $bits }
            }

            fn assign_one(&mut self, text: &str) -> Result<(), CoerceError> {
                let value = text
                    .parse::<$ty>()
                    .map_err(|_| CoerceError::number::<$ty>(NumErrorKind::Syntax, text))?;
                // Finite literals that overflow the width parse to infinity.
                if value.is_infinite() && !is_infinity_literal(text) {
                    return Err(CoerceError::number::<$ty>(NumErrorKind::Range, text));
                }
                *self = value;
                Ok(())
            }
        }
    )*};
}

impl_float!(f32 => 32, f64 => 64);
