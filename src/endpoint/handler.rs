use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::dispatcher::{RequestError, Response};
use crate::spec::ParamIn;
use crate::typeinfo::{ApiType, TypeDescriptor, TypeShape};

/// Bound value for one endpoint argument.
#[derive(Debug)]
pub enum Slot {
    /// The request's response context.
    Response(Response),
    /// A decoded input. `raw` is the original text for scalar parameters.
    Value {
        name: Arc<str>,
        location: ParamIn,
        raw: Option<String>,
        value: Value,
    },
    /// Optional input that was absent; the argument takes its default.
    Zero,
}

/// How an argument is classified at registration.
#[derive(Debug, Clone, Copy)]
pub enum ArgInfo {
    /// Supplied by the framework.
    Injected,
    /// Body struct or scalar parameter, depending on the type's shape.
    Typed(TypeDescriptor),
}

/// A type usable as an endpoint argument.
pub trait EndpointArg: Sized + Send + 'static {
    fn describe() -> ArgInfo;

    fn from_slot(slot: Slot) -> Result<Self, RequestError>;
}

impl<T> EndpointArg for T
where
    T: ApiType + DeserializeOwned + Default + Send + 'static,
{
    fn describe() -> ArgInfo {
        ArgInfo::Typed(TypeDescriptor::of::<T>())
    }

    fn from_slot(slot: Slot) -> Result<Self, RequestError> {
        match slot {
            Slot::Zero => Ok(T::default()),
            Slot::Value {
                name,
                location,
                raw,
                value,
            } => {
                let shown = raw.unwrap_or_else(|| value.to_string());
                serde_json::from_value(value).map_err(|e| match location {
                    ParamIn::Body => RequestError::MalformedBody {
                        schema: name.to_string(),
                        reason: e.to_string(),
                    },
                    _ => RequestError::InvalidParameter {
                        name: name.to_string(),
                        location,
                        value: shown,
                        reason: e.to_string(),
                    },
                })
            }
            Slot::Response(_) => Err(RequestError::Internal {
                reason: format!(
                    "response context bound to argument of type {}",
                    std::any::type_name::<T>()
                ),
            }),
        }
    }
}

impl EndpointArg for Response {
    fn describe() -> ArgInfo {
        ArgInfo::Injected
    }

    fn from_slot(slot: Slot) -> Result<Self, RequestError> {
        match slot {
            Slot::Response(response) => Ok(response),
            _ => Err(RequestError::Internal {
                reason: "response argument received a non-response slot".to_string(),
            }),
        }
    }
}

/// Result of invoking an endpoint.
#[derive(Debug)]
pub enum Outcome<E> {
    /// Serialised success payload; `None` for error-only endpoints.
    Success(Option<Vec<u8>>),
    Failure(E),
}

/// A type usable as an endpoint's return value.
///
/// Implemented for `Result<T, E>`. `T = ()` declares an error-only endpoint;
/// a struct `T` declares a response schema. Other `T` are rejected at
/// registration.
pub trait EndpointReturn<E>: Send + 'static {
    fn describe() -> TypeDescriptor;

    fn into_outcome(self) -> Result<Outcome<E>, RequestError>;
}

impl<T, E> EndpointReturn<E> for Result<T, E>
where
    T: ApiType + Serialize + Send,
    E: Send + 'static,
{
    fn describe() -> TypeDescriptor {
        TypeDescriptor::of::<T>()
    }

    fn into_outcome(self) -> Result<Outcome<E>, RequestError> {
        match self {
            Ok(_) if T::shape() == TypeShape::Unit => Ok(Outcome::Success(None)),
            Ok(value) => serde_json::to_vec(&value)
                .map(|body| Outcome::Success(Some(body)))
                .map_err(|e| RequestError::Serialization {
                    reason: e.to_string(),
                }),
            Err(err) => Ok(Outcome::Failure(err)),
        }
    }
}

/// A function registrable as an endpoint.
///
/// Implemented for every `Fn(A1, .., An) -> R` with up to twelve arguments
/// where each `Ai: EndpointArg` and `R: EndpointReturn<E>`.
pub trait Endpoint<Args, E>: Clone + Send + Sync + 'static {
    fn arguments() -> Vec<ArgInfo>;

    fn returns() -> TypeDescriptor;

    fn invoke(&self, slots: Vec<Slot>) -> Result<Outcome<E>, RequestError>;
}

macro_rules! impl_endpoint {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, R, E, $($ty,)*> Endpoint<($($ty,)*), E> for F
        where
            F: Fn($($ty),*) -> R + Clone + Send + Sync + 'static,
            R: EndpointReturn<E>,
            $($ty: EndpointArg,)*
        {
            fn arguments() -> Vec<ArgInfo> {
                vec![$($ty::describe()),*]
            }

            fn returns() -> TypeDescriptor {
                R::describe()
            }

            fn invoke(&self, slots: Vec<Slot>) -> Result<Outcome<E>, RequestError> {
                let mut slots = slots.into_iter();
                $(
                    let $ty = $ty::from_slot(slots.next().ok_or_else(|| RequestError::Internal {
                        reason: "fewer bound slots than endpoint arguments".to_string(),
                    })?)?;
                )*
                (self)($($ty),*).into_outcome()
            }
        }
    };
}

impl_endpoint!();
impl_endpoint!(A1);
impl_endpoint!(A1, A2);
impl_endpoint!(A1, A2, A3);
impl_endpoint!(A1, A2, A3, A4);
impl_endpoint!(A1, A2, A3, A4, A5);
impl_endpoint!(A1, A2, A3, A4, A5, A6);
impl_endpoint!(A1, A2, A3, A4, A5, A6, A7);
impl_endpoint!(A1, A2, A3, A4, A5, A6, A7, A8);
impl_endpoint!(A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_endpoint!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);
impl_endpoint!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11);
impl_endpoint!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11, A12);

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize, crate::ApiType)]
    struct Pair {
        left: i64,
        right: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize, crate::ApiType)]
    struct Sum {
        result: i64,
    }

    fn add(pair: Pair, scale: u8) -> Result<Sum, String> {
        Ok(Sum {
            result: (pair.left + pair.right) * i64::from(scale),
        })
    }

    fn describe<F: Endpoint<Args, String>, Args>(_: &F) -> (Vec<ArgInfo>, TypeDescriptor) {
        (F::arguments(), F::returns())
    }

    fn value(name: &str, location: ParamIn, value: Value) -> Slot {
        Slot::Value {
            name: Arc::from(name),
            location,
            raw: None,
            value,
        }
    }

    #[test]
    fn test_arguments_are_described_in_order() {
        let (args, ret) = describe(&add);
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0], ArgInfo::Typed(t) if t.shape == TypeShape::Struct));
        assert!(matches!(args[1], ArgInfo::Typed(t) if t.name == "u8"));
        assert_eq!(ret.name, "Sum");

        let (args, _) = describe(&|_: Response| -> Result<(), String> { Ok(()) });
        assert!(matches!(args[0], ArgInfo::Injected));
    }

    #[test]
    fn test_invoke_converts_slots() {
        let slots = vec![
            value("Pair", ParamIn::Body, serde_json::json!({"left": 2, "right": 3})),
            value("scale", ParamIn::Query, Value::from(10)),
        ];
        match Endpoint::<(Pair, u8), String>::invoke(&add, slots).unwrap() {
            Outcome::Success(Some(body)) => assert_eq!(body, br#"{"result":50}"#),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_zero_slot_uses_default() {
        let slots = vec![Slot::Zero, Slot::Zero];
        match Endpoint::<(Pair, u8), String>::invoke(&add, slots).unwrap() {
            Outcome::Success(Some(body)) => assert_eq!(body, br#"{"result":0}"#),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_scalar_is_invalid_parameter() {
        let slots = vec![Slot::Zero, value("scale", ParamIn::Query, Value::from(300))];
        let err = Endpoint::<(Pair, u8), String>::invoke(&add, slots).unwrap_err();
        assert!(matches!(err, RequestError::InvalidParameter { .. }));
    }

    #[test]
    fn test_mistyped_body_is_malformed() {
        let slots = vec![
            value("Pair", ParamIn::Body, serde_json::json!({"left": "two"})),
            Slot::Zero,
        ];
        let err = Endpoint::<(Pair, u8), String>::invoke(&add, slots).unwrap_err();
        assert!(matches!(err, RequestError::MalformedBody { .. }));
    }

    #[test]
    fn test_unit_result_has_no_body() {
        let ping = || -> Result<(), String> { Ok(()) };
        assert!(matches!(
            Endpoint::<(), String>::invoke(&ping, Vec::new()).unwrap(),
            Outcome::Success(None)
        ));

        let fail = || -> Result<(), String> { Err("nope".into()) };
        assert!(matches!(
            Endpoint::<(), String>::invoke(&fail, Vec::new()).unwrap(),
            Outcome::Failure(ref e) if e == "nope"
        ));
    }
}
