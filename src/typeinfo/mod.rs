//! # Type Information Module
//!
//! Describes Rust types to the registration machinery without runtime
//! reflection.
//!
//! ## Overview
//!
//! Every type that can appear in an endpoint signature implements
//! [`ApiType`]. The trait reports:
//!
//! - a declared name (schema name, default parameter name)
//! - a [`TypeShape`] (scalar kind, struct, sequence, ...)
//! - for structs, the serialised field list
//! - three optional capabilities: a parameter spec (name / required /
//!   description), a format string, and a location override
//!
//! [`TypeDescriptor::of`] captures all of that in a copyable value that the
//! endpoint compiler passes around.
//!
//! ## Classification
//!
//! [`classify`] turns a scalar shape into a JSON type and format:
//!
//! | Rust              | JSON type | format            |
//! |-------------------|-----------|-------------------|
//! | `bool`            | boolean   |                   |
//! | `i8`..`i64`       | integer   | `int8`..`int64`   |
//! | `isize`           | integer   |                   |
//! | `u8`..`u64`       | integer   | `uint8`..`uint64` |
//! | `usize`           | integer   | `uint`            |
//! | `f32` / `f64`     | number    | `float` / `double`|
//! | `String`          | string    |                   |
//!
//! Anything else is a [`ClassifyError`].
//!
//! ## Capability cache
//!
//! [`CapabilityRegistry`] memoises capability probes per type. The process
//! wide instance is [`CapabilityRegistry::global`]; tests and embedded uses
//! can hand an `Api` their own instance.
//!
//! ## Deriving
//!
//! ```rust
//! use brrtapi::{ApiType, TypeDescriptor, TypeShape};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize, ApiType)]
//! struct Calculation {
//!     left: i64,
//!     right: i64,
//! }
//!
//! #[derive(Default, Serialize, Deserialize, ApiType)]
//! #[api(name = "id", required, location = "path")]
//! struct UserId(i64);
//!
//! assert_eq!(TypeDescriptor::of::<Calculation>().shape, TypeShape::Struct);
//! assert_eq!(UserId::param_spec().map(|s| s.name).as_deref(), Some("id"));
//! ```

mod capability;
mod classify;
mod core;
mod formats;

pub use capability::{Capabilities, CapabilityRegistry};
pub use classify::{classify, ClassifyError, JsonTypeDescriptor};
pub use core::{ApiType, FieldDef, TypeDescriptor, TypeShape};
pub use formats::{DateTime, Email};
