use std::fmt;

use crate::spec::JsonType;

use super::core::TypeShape;

/// JSON type plus the optional `format` qualifier for a scalar shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonTypeDescriptor {
    pub json_type: JsonType,
    pub format: Option<&'static str>,
}

impl JsonTypeDescriptor {
    const fn new(json_type: JsonType, format: Option<&'static str>) -> Self {
        Self { json_type, format }
    }
}

/// Returned when a shape has no scalar JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyError {
    pub shape: TypeShape,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type of shape `{}` has no scalar JSON representation",
            self.shape
        )
    }
}

impl std::error::Error for ClassifyError {}

/// Map a type shape to its JSON type and width/signedness format.
///
/// Wrappers are already transparent at the [`TypeShape`] level, so
/// `Option<u32>` classifies exactly like `u32`.
pub fn classify(shape: &TypeShape) -> Result<JsonTypeDescriptor, ClassifyError> {
    use JsonType::{Boolean, Integer, Number};

    let descriptor = match *shape {
        TypeShape::Bool => JsonTypeDescriptor::new(Boolean, None),
        TypeShape::Int { bits, signed } => {
            let format = match (bits, signed) {
                (0, true) => None,
                (0, false) => Some("uint"),
                (8, true) => Some("int8"),
                (16, true) => Some("int16"),
                (32, true) => Some("int32"),
                (64, true) => Some("int64"),
                (8, false) => Some("uint8"),
                (16, false) => Some("uint16"),
                (32, false) => Some("uint32"),
                (64, false) => Some("uint64"),
                _ => return Err(ClassifyError { shape: *shape }),
            };
            JsonTypeDescriptor::new(Integer, format)
        }
        TypeShape::Float { bits: 32 } => JsonTypeDescriptor::new(Number, Some("float")),
        TypeShape::Float { bits: 64 } => JsonTypeDescriptor::new(Number, Some("double")),
        TypeShape::String => JsonTypeDescriptor::new(JsonType::String, None),
        _ => return Err(ClassifyError { shape: *shape }),
    };
    Ok(descriptor)
}
