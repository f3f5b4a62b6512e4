//! API metadata accumulated during registration: schemas, parameters,
//! endpoints, tags and servers.
//!
//! Everything here is append-only and built on the registering thread before
//! serving starts.

mod endpoints;
mod params;
mod schema;
mod tags;
mod types;

pub use endpoints::{EndpointEntry, EndpointMethod, Endpoints};
pub use params::{register_parameter, Parameter};
pub use schema::{scheme_prefix, Property, Schema, SchemeGroups, Schemas};
pub use tags::{Server, Servers, Tag, Tags};
pub use types::*;
