use serde::{Deserialize, Serialize};

use crate::ApiType;

/// String carrying an e-mail address, documented with format `email`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ApiType)]
#[serde(transparent)]
#[api(format = "email")]
pub struct Email(pub String);

/// RFC 3339 timestamp string, documented with format `date-time`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ApiType)]
#[serde(transparent)]
#[api(format = "date-time")]
pub struct DateTime(pub String);

impl From<String> for Email {
    fn from(value: String) -> Self {
        Email(value)
    }
}

impl From<String> for DateTime {
    fn from(value: String) -> Self {
        DateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeinfo::{classify, TypeDescriptor, TypeShape};

    #[test]
    fn test_format_types_are_strings_with_formats() {
        assert_eq!(Email::shape(), TypeShape::String);
        assert_eq!(Email::format().as_deref(), Some("email"));
        assert_eq!(DateTime::format().as_deref(), Some("date-time"));
        let classified = classify(&TypeDescriptor::of::<DateTime>().shape).unwrap();
        assert_eq!(classified.format, None);
    }

    #[test]
    fn test_transparent_serde() {
        let email: Email = serde_json::from_str("\"a@b.c\"").unwrap();
        assert_eq!(email, Email("a@b.c".to_string()));
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"a@b.c\"");
    }
}
