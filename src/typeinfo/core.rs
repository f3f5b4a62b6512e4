use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::spec::{ParamIn, ParamSpec};

use super::capability::Capabilities;

/// Structural kind of a registrable type, independent of its capabilities.
///
/// `Int { bits: 0 }` means pointer width (`isize` / `usize`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    Bool,
    Int { bits: u8, signed: bool },
    Float { bits: u8 },
    String,
    Unit,
    Struct,
    Sequence,
    Map,
    Other,
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Bool => write!(f, "bool"),
            TypeShape::Int { bits: 0, signed } => {
                write!(f, "{}", if *signed { "isize" } else { "usize" })
            }
            TypeShape::Int { bits, signed } => {
                write!(f, "{}{}", if *signed { "i" } else { "u" }, bits)
            }
            TypeShape::Float { bits } => write!(f, "f{}", bits),
            TypeShape::String => write!(f, "string"),
            TypeShape::Unit => write!(f, "unit"),
            TypeShape::Struct => write!(f, "struct"),
            TypeShape::Sequence => write!(f, "sequence"),
            TypeShape::Map => write!(f, "map"),
            TypeShape::Other => write!(f, "other"),
        }
    }
}

/// A type that can appear in an endpoint signature or inside a body schema.
///
/// The three capability methods (`param_spec`, `format`, `location`) default
/// to `None`; a type opts in by overriding them, usually through
/// `#[derive(ApiType)]` and its `#[api(..)]` attributes.
pub trait ApiType: 'static {
    /// Declared name used for schema names and default parameter names.
    fn type_name() -> &'static str;

    fn shape() -> TypeShape;

    /// Identity used by the schema registry and the capability cache.
    /// Indirection wrappers report their pointee.
    fn type_id() -> TypeId {
        TypeId::of::<Self>()
    }

    /// Field list for `TypeShape::Struct`, in declaration order.
    fn fields() -> Vec<FieldDef> {
        Vec::new()
    }

    fn param_spec() -> Option<ParamSpec> {
        None
    }

    fn format() -> Option<String> {
        None
    }

    fn location() -> Option<ParamIn> {
        None
    }
}

/// One serialised field of a struct type.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Field identifier as declared.
    pub name: &'static str,
    /// Wire name when it differs from `name`.
    pub rename: Option<&'static str>,
    /// Explicit `#[api(format = "..")]` tag.
    pub format: Option<&'static str>,
    /// Explicit `#[api(example = "..")]` tag.
    pub example: Option<&'static str>,
    pub ty: fn() -> TypeDescriptor,
}

impl FieldDef {
    /// Name the field carries on the wire.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }
}

/// Copyable runtime description of an [`ApiType`].
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub name: &'static str,
    pub rust_name: &'static str,
    pub shape: TypeShape,
    fields: fn() -> Vec<FieldDef>,
    probe: fn() -> Capabilities,
}

impl TypeDescriptor {
    #[must_use]
    pub fn of<T: ApiType>() -> Self {
        Self {
            id: T::type_id(),
            name: T::type_name(),
            rust_name: type_name::<T>(),
            shape: T::shape(),
            fields: T::fields,
            probe: Capabilities::probe::<T>,
        }
    }

    #[must_use]
    pub fn fields(&self) -> Vec<FieldDef> {
        (self.fields)()
    }

    /// Build the capability set from scratch. Callers go through
    /// [`super::CapabilityRegistry::resolve`] so this runs once per type.
    pub(crate) fn probe(&self) -> Capabilities {
        (self.probe)()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("rust_name", &self.rust_name)
            .field("shape", &self.shape)
            .finish()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

macro_rules! scalar_api_type {
    ($($ty:ty => $name:literal, $shape:expr;)*) => {
        $(
            impl ApiType for $ty {
                fn type_name() -> &'static str {
                    $name
                }

                fn shape() -> TypeShape {
                    $shape
                }
            }
        )*
    };
}

scalar_api_type! {
    bool => "bool", TypeShape::Bool;
    i8 => "i8", TypeShape::Int { bits: 8, signed: true };
    i16 => "i16", TypeShape::Int { bits: 16, signed: true };
    i32 => "i32", TypeShape::Int { bits: 32, signed: true };
    i64 => "i64", TypeShape::Int { bits: 64, signed: true };
    isize => "isize", TypeShape::Int { bits: 0, signed: true };
    u8 => "u8", TypeShape::Int { bits: 8, signed: false };
    u16 => "u16", TypeShape::Int { bits: 16, signed: false };
    u32 => "u32", TypeShape::Int { bits: 32, signed: false };
    u64 => "u64", TypeShape::Int { bits: 64, signed: false };
    usize => "usize", TypeShape::Int { bits: 0, signed: false };
    f32 => "f32", TypeShape::Float { bits: 32 };
    f64 => "f64", TypeShape::Float { bits: 64 };
    String => "string", TypeShape::String;
    () => "unit", TypeShape::Unit;
}

impl<T: ApiType> ApiType for Vec<T> {
    fn type_name() -> &'static str {
        "array"
    }

    fn shape() -> TypeShape {
        TypeShape::Sequence
    }
}

impl<K: 'static, V: 'static, S: 'static> ApiType for HashMap<K, V, S> {
    fn type_name() -> &'static str {
        "map"
    }

    fn shape() -> TypeShape {
        TypeShape::Map
    }
}

impl<K: 'static, V: 'static> ApiType for BTreeMap<K, V> {
    fn type_name() -> &'static str {
        "map"
    }

    fn shape() -> TypeShape {
        TypeShape::Map
    }
}

// Indirection wrappers are transparent: every question is answered by the
// pointee.
macro_rules! forwarding_api_type {
    ($($wrapper:ident),*) => {
        $(
            impl<T: ApiType> ApiType for $wrapper<T> {
                fn type_name() -> &'static str {
                    T::type_name()
                }

                fn shape() -> TypeShape {
                    T::shape()
                }

                fn type_id() -> TypeId {
                    T::type_id()
                }

                fn fields() -> Vec<FieldDef> {
                    T::fields()
                }

                fn param_spec() -> Option<ParamSpec> {
                    T::param_spec()
                }

                fn format() -> Option<String> {
                    T::format()
                }

                fn location() -> Option<ParamIn> {
                    T::location()
                }
            }
        )*
    };
}

forwarding_api_type!(Option, Box, Arc);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(crate::ApiType)]
    #[allow(dead_code)]
    struct Account {
        #[serde(rename = "accountId")]
        id: i64,
        #[api(format = "email", example = "a@b.c")]
        owner: String,
        #[serde(skip)]
        cached: bool,
    }

    #[test]
    fn test_wrappers_report_pointee_identity() {
        let plain = TypeDescriptor::of::<Account>();
        let optional = TypeDescriptor::of::<Option<Account>>();
        let boxed = TypeDescriptor::of::<Box<Account>>();
        assert_eq!(plain, optional);
        assert_eq!(plain, boxed);
        assert_eq!(optional.name, "Account");
        assert_eq!(optional.shape, TypeShape::Struct);
    }

    #[test]
    fn test_derived_fields_honour_serde_attributes() {
        let fields = TypeDescriptor::of::<Account>().fields();
        let names: Vec<_> = fields.iter().map(FieldDef::wire_name).collect();
        assert_eq!(names, vec!["accountId", "owner"]);
        assert_eq!(fields[1].format, Some("email"));
        assert_eq!(fields[1].example, Some("a@b.c"));
        assert_eq!((fields[0].ty)().shape, TypeShape::Int { bits: 64, signed: true });
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(TypeShape::Int { bits: 0, signed: false }.to_string(), "usize");
        assert_eq!(TypeShape::Int { bits: 16, signed: true }.to_string(), "i16");
        assert_eq!(TypeShape::Float { bits: 32 }.to_string(), "f32");
    }
}
