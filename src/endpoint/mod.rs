//! # Endpoint Module
//!
//! Turns ordinary Rust functions into registered HTTP endpoints.
//!
//! ## Declaring an endpoint
//!
//! Any function (or cloneable closure) whose arguments implement
//! [`EndpointArg`] and whose return type implements [`EndpointReturn`] is an
//! [`Endpoint`]:
//!
//! - [`crate::Response`] arguments receive the request's response context
//! - struct arguments are decoded from the JSON body
//! - scalar and newtype arguments are bound from path, query, header or
//!   cookie values
//!
//! The return type is `Result<T, E>` where `E` is the error type the `Api`
//! was built with. `T = ()` means the endpoint only reports errors; a struct
//! `T` is serialised as the response body.
//!
//! ```rust,ignore
//! fn calculate(calc: Calculation) -> Result<CalcResult, ApiError> { .. }
//! fn delete_user(id: UserId, response: Response) -> Result<(), ApiError> { .. }
//! ```
//!
//! ## Registration
//!
//! Registration happens through [`crate::Router`]. Everything the endpoint
//! declares is checked at that point: unsupported return types,
//! unclassifiable parameters, duplicate routes and duplicate body components
//! all fail with a [`crate::RegistrationError`] instead of surfacing per
//! request.

mod compile;
mod handler;

pub(crate) use compile::compile_endpoint;
pub use handler::{ArgInfo, Endpoint, EndpointArg, EndpointReturn, Outcome, Slot};
