//! Discovery of tagged fields.
//!
//! [`discover`] walks a [`StructShape`] depth-first in declaration order,
//! recursing into embedded structs, and produces one [`Binding`] per
//! `(field, source)` pair the field's tag selects.

use crate::coerce::{FieldKind, ParamSlot};
use crate::error::BindError;
use crate::record::{Bindable, FieldRole, FieldSlot, Record, StructShape};
use crate::tag::{resolve_tag, SourceKind, TagResolver};

/// One embedded struct crossed on the way to a bound field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedStep {
    index: usize,
    field: &'static str,
    exported: bool,
    pointer: bool,
    type_name: &'static str,
}

impl EmbedStep {
    /// Returns the index of the embedded field in its parent.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the name of the embedded field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Returns true if the embedded struct sits behind an `Option<Box<_>>`.
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.pointer
    }

    /// Returns the name of the embedded struct.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A field bound from one parameter source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    source: SourceKind,
    name: String,
    steps: Vec<EmbedStep>,
    index: usize,
    field: &'static str,
    kind: FieldKind,
}

impl Binding {
    /// Returns the parameter source.
    #[must_use]
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the bound field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Returns the coercion strategy of the bound field.
    ///
    /// Resolved once when the table is built; it is descriptive and does
    /// not drive coercion.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns the embedded structs crossed to reach the field.
    #[must_use]
    pub fn steps(&self) -> &[EmbedStep] {
        &self.steps
    }

    /// Returns the field indices from the root to the field.
    #[must_use]
    pub fn index_path(&self) -> Vec<usize> {
        self.steps
            .iter()
            .map(EmbedStep::index)
            .chain(std::iter::once(self.index))
            .collect()
    }
}

/// Lists every binding of `T` in depth-first declaration order.
pub fn discover<T: Bindable>(resolver: &TagResolver) -> Vec<Binding> {
    let mut bindings = Vec::new();
    walk(&T::shape(), resolver, &mut Vec::new(), &mut bindings);
    bindings
}

fn walk(
    shape: &StructShape,
    resolver: &TagResolver,
    steps: &mut Vec<EmbedStep>,
    bindings: &mut Vec<Binding>,
) {
    for (index, field) in shape.fields().iter().enumerate() {
        match field.role() {
            FieldRole::Embedded {
                pointer,
                shape: nested_shape,
            } => {
                let nested = nested_shape();
                steps.push(EmbedStep {
                    index,
                    field: field.name(),
                    exported: field.is_exported(),
                    pointer,
                    type_name: nested.name(),
                });
                walk(&nested, resolver, steps, bindings);
                steps.pop();
            }
            FieldRole::Value { kind } if field.is_exported() => {
                let kind = kind();
                for source in SourceKind::RESOLUTION_ORDER {
                    if let Some(name) = resolve_tag(resolver, field.tag(), source) {
                        bindings.push(Binding {
                            source,
                            name,
                            steps: steps.clone(),
                            index,
                            field: field.name(),
                            kind: kind.clone(),
                        });
                    }
                }
            }
            FieldRole::Value { .. } | FieldRole::Opaque => {}
        }
    }
}

/// Walks `root` to the field of `binding`, allocating `None` embedded pointers.
///
/// Fails if an embedded pointer that needs allocating is not exported.
pub(crate) fn slot_mut<'a>(
    root: &'a mut dyn Record,
    binding: &Binding,
) -> Result<&'a mut dyn ParamSlot, BindError> {
    let mut record = root;
    for step in &binding.steps {
        record = match record.field_mut(step.index) {
            Some(FieldSlot::Struct(inner)) => inner,
            Some(FieldSlot::Pointer(pointer)) => {
                if pointer.is_nil() {
                    if !step.exported {
                        return Err(BindError::UnexportedEmbedded {
                            type_name: step.type_name,
                        });
                    }
                    pointer.allocate();
                }
                pointer
                    .record_mut()
                    .ok_or(BindError::ShapeMismatch { field: step.field })?
            }
            Some(FieldSlot::Value(_)) | None => {
                return Err(BindError::ShapeMismatch { field: step.field });
            }
        };
    }

    match record.field_mut(binding.index) {
        Some(FieldSlot::Value(slot)) => Ok(slot),
        _ => Err(BindError::ShapeMismatch {
            field: binding.field,
        }),
    }
}
