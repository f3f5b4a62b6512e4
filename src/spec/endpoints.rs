use http::Method;

use crate::error::RegistrationError;

use super::params::Parameter;

/// Metadata for one (path, method) pair.
#[derive(Debug, Clone)]
pub struct EndpointMethod {
    pub method: Method,
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    pub operation_id: String,
    pub parameters: Vec<Parameter>,
    /// Schema name, or scheme group name for composite bodies.
    pub request_body: Option<String>,
    pub response_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EndpointEntry {
    pub path: String,
    pub methods: Vec<EndpointMethod>,
}

/// Endpoint table keyed by path then method, in registration order.
#[derive(Debug, Default)]
pub struct Endpoints {
    entries: Vec<EndpointEntry>,
}

impl Endpoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: &str, endpoint: EndpointMethod) -> Result<(), RegistrationError> {
        if self.contains(path, &endpoint.method) {
            return Err(RegistrationError::DuplicateMethod {
                path: path.to_string(),
                method: endpoint.method,
            });
        }
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => entry.methods.push(endpoint),
            None => self.entries.push(EndpointEntry {
                path: path.to_string(),
                methods: vec![endpoint],
            }),
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, path: &str, method: &Method) -> Option<&EndpointMethod> {
        self.entries
            .iter()
            .find(|e| e.path == path)?
            .methods
            .iter()
            .find(|m| m.method == *method)
    }

    #[must_use]
    pub fn contains(&self, path: &str, method: &Method) -> bool {
        self.get(path, method).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointEntry> {
        self.entries.iter()
    }

    /// Number of registered (path, method) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.methods.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
