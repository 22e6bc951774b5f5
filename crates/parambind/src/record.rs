//! Destination records.
//!
//! `#[derive(Bindable)]` implements [`Record`] and [`Bindable`] for a struct:
//! [`Bindable::shape`] describes the declared fields and their tags, and
//! [`Record::field_mut`] hands out mutable access to them by index.

use crate::coerce::{FieldKind, ParamValue, ParamSlot};
use crate::tag::StructTag;

/// Mutable, index-based access to the fields of a destination struct.
pub trait Record {
    /// Returns the field at `index` in declaration order.
    ///
    /// Returns `None` for fields that never take part in binding.
    fn field_mut(&mut self, index: usize) -> Option<FieldSlot<'_>>;
}

/// A destination struct that request parameters can be bound into.
///
/// Implement it with `#[derive(Bindable)]`:
///
/// ```rust
/// use parambind::Bindable;
///
/// #[derive(Bindable, Default)]
/// struct ListUsers {
///     #[param = "query=limit"]
///     pub limit: Option<u32>,
///     #[param = "query=tag"]
///     pub tags: Vec<String>,
/// }
/// ```
pub trait Bindable: Record + 'static {
    /// Describes the declared fields of this struct.
    fn shape() -> StructShape;
}

/// A field handed out by [`Record::field_mut`].
pub enum FieldSlot<'a> {
    /// A value field.
    Value(&'a mut dyn ParamSlot),
    /// An embedded struct that is always present.
    Struct(&'a mut dyn Record),
    /// An embedded `Option<Box<_>>` struct.
    Pointer(&'a mut dyn EmbeddedPointer),
}

/// An embedded struct behind an `Option<Box<_>>`.
pub trait EmbeddedPointer {
    /// Returns true if no struct is allocated.
    fn is_nil(&self) -> bool;

    /// Allocates a default struct.
    fn allocate(&mut self);

    /// Returns the allocated struct, if any.
    fn record_mut(&mut self) -> Option<&mut dyn Record>;
}

impl<S: Bindable + Default> EmbeddedPointer for Option<Box<S>> {
    fn is_nil(&self) -> bool {
        self.is_none()
    }

    fn allocate(&mut self) {
        *self = Some(Box::default());
    }

    fn record_mut(&mut self) -> Option<&mut dyn Record> {
        match self {
            Some(record) => Some(&mut **record as &mut dyn Record),
            None => None,
        }
    }
}

/// Declared layout of a bindable struct.
#[derive(Debug, Clone)]
pub struct StructShape {
    name: &'static str,
    fields: Vec<FieldInfo>,
}

impl StructShape {
    /// Creates a shape from the struct name and its fields in declaration order.
    #[must_use]
    pub fn new(name: &'static str, fields: Vec<FieldInfo>) -> Self {
        Self { name, fields }
    }

    /// Returns the struct name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }
}

/// What a field contributes to binding.
#[derive(Debug, Clone, Copy)]
pub enum FieldRole {
    /// A value bound from request parameters.
    Value {
        /// Resolves the coercion strategy of the field type.
        kind: fn() -> FieldKind,
    },
    /// An embedded struct whose fields are bound as if declared inline.
    Embedded {
        /// Whether the struct sits behind an `Option<Box<_>>`.
        pointer: bool,
        /// Describes the embedded struct.
        shape: fn() -> StructShape,
    },
    /// A field the binder never touches.
    Opaque,
}

/// Declaration of a single field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    name: &'static str,
    exported: bool,
    tag: StructTag,
    role: FieldRole,
}

impl FieldInfo {
    /// Declares a value field of type `T`.
    #[must_use]
    pub fn value<T: ParamValue>(name: &'static str, exported: bool, tag: StructTag) -> Self {
        Self {
            name,
            exported,
            tag,
            role: FieldRole::Value { kind: T::kind },
        }
    }

    /// Declares an embedded struct `S`.
    #[must_use]
    pub fn embedded<S: Bindable>(name: &'static str, exported: bool, pointer: bool) -> Self {
        Self {
            name,
            exported,
            tag: StructTag::EMPTY,
            role: FieldRole::Embedded {
                pointer,
                shape: S::shape,
            },
        }
    }

    /// Declares a field that takes no part in binding.
    #[must_use]
    pub fn opaque(name: &'static str, exported: bool, tag: StructTag) -> Self {
        Self {
            name,
            exported,
            tag,
            role: FieldRole::Opaque,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if the field is declared `pub`.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Returns the declared tag.
    #[must_use]
    pub fn tag(&self) -> &StructTag {
        &self.tag
    }

    /// Returns the binding role.
    #[must_use]
    pub fn role(&self) -> FieldRole {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bindable;

    #[derive(Bindable, Default, Debug, PartialEq)]
    struct Inner {
        #[param = "query=inner"]
        pub inner: String,
    }

    #[derive(Bindable, Default)]
    struct Outer {
        #[param = "query=id"]
        pub id: u64,
        #[embed]
        pub inner: Option<Box<Inner>>,
        note: String,
    }

    #[test]
    fn test_derived_shape() {
        let shape = Outer::shape();
        assert_eq!(shape.name(), "Outer");

        let names: Vec<_> = shape.fields().iter().map(FieldInfo::name).collect();
        assert_eq!(names, ["id", "inner", "note"]);

        assert!(matches!(shape.fields()[0].role(), FieldRole::Value { .. }));
        assert!(matches!(
            shape.fields()[1].role(),
            FieldRole::Embedded { pointer: true, .. }
        ));
        assert!(matches!(shape.fields()[2].role(), FieldRole::Opaque));
        assert!(!shape.fields()[2].is_exported());
        assert_eq!(shape.fields()[0].tag().get("param"), Some("query=id"));
    }

    #[test]
    fn test_field_mut_by_index() {
        let mut outer = Outer::default();

        assert!(matches!(outer.field_mut(0), Some(FieldSlot::Value(_))));
        assert!(matches!(outer.field_mut(1), Some(FieldSlot::Pointer(_))));
        assert!(outer.field_mut(2).is_none());
        assert!(outer.field_mut(3).is_none());
    }

    #[test]
    fn test_embedded_pointer_allocation() {
        let mut ptr: Option<Box<Inner>> = None;
        assert!(ptr.is_nil());
        assert!(ptr.record_mut().is_none());

        ptr.allocate();
        assert!(!ptr.is_nil());
        assert!(ptr.record_mut().is_some());
        assert_eq!(ptr.as_deref(), Some(&Inner::default()));
    }
}
