use std::any::TypeId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::RegistrationError;
use crate::typeinfo::{classify, CapabilityRegistry, TypeDescriptor, TypeShape};

use super::types::TypeMeta;

/// One serialised field of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub meta: TypeMeta,
}

/// Flat description of a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub properties: Vec<Property>,
}

/// Registry of struct schemas, one per distinct Rust type.
///
/// Keyed by type identity, not structure: two types with identical fields
/// still get two entries. When two distinct types share a declared name the
/// later one is suffixed (`Item`, `Item2`, ...) so document keys stay unique.
/// Scheme group names share the same key space and are reserved here too.
#[derive(Debug, Default)]
pub struct Schemas {
    entries: Vec<Arc<Schema>>,
    by_type: HashMap<TypeId, usize>,
    reserved: HashSet<String>,
}

impl Schemas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ty`, returning the cached entry when it is already known.
    pub fn register(
        &mut self,
        ty: &TypeDescriptor,
        capabilities: &CapabilityRegistry,
    ) -> Result<Arc<Schema>, RegistrationError> {
        if let Some(&index) = self.by_type.get(&ty.id) {
            return Ok(Arc::clone(&self.entries[index]));
        }

        if ty.shape != TypeShape::Struct {
            return Err(RegistrationError::NotAStruct {
                type_name: ty.rust_name.to_string(),
            });
        }

        let mut properties = Vec::new();
        for field in ty.fields() {
            let field_ty = (field.ty)();
            let classified =
                classify(&field_ty.shape).map_err(|source| RegistrationError::Classification {
                    context: format!("field `{}` of `{}`", field.name, ty.name),
                    type_name: field_ty.rust_name.to_string(),
                    source,
                })?;

            let format = match field.format {
                Some(tag) => Some(tag.to_string()),
                None => capabilities
                    .format_of(&field_ty)
                    .or_else(|| classified.format.map(str::to_string)),
            };

            let mut meta = TypeMeta::new(classified.json_type, format);
            if let Some(example) = field.example {
                meta.extensions
                    .insert("example".to_string(), example.to_string());
            }

            properties.push(Property {
                name: field.wire_name().to_string(),
                meta,
            });
        }

        let schema = Arc::new(Schema {
            name: self.unique_name(ty.name),
            properties,
        });
        debug!(schema = %schema.name, fields = schema.properties.len(), "schema registered");

        self.by_type.insert(ty.id, self.entries.len());
        self.entries.push(Arc::clone(&schema));
        Ok(schema)
    }

    /// Claim a component name for something that is not a registered type,
    /// suffixing it when a schema or an earlier reservation already owns it.
    pub fn reserve_name(&mut self, declared: &str) -> String {
        let name = self.unique_name(declared);
        self.reserved.insert(name.clone());
        name
    }

    fn unique_name(&self, declared: &str) -> String {
        let taken = |candidate: &str| {
            self.reserved.contains(candidate) || self.entries.iter().any(|s| s.name == candidate)
        };
        if !taken(declared) {
            return declared.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{declared}{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.entries.iter().map(AsRef::as_ref).find(|s| s.name == name)
    }

    #[must_use]
    pub fn get_by_type(&self, ty: &TypeDescriptor) -> Option<&Schema> {
        self.by_type.get(&ty.id).map(|&i| self.entries[i].as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.entries.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Named groups of schemas describing a composite request body.
#[derive(Debug, Default)]
pub struct SchemeGroups {
    groups: BTreeMap<String, Vec<String>>,
}

impl SchemeGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `scheme` to `group`, creating the group on first use.
    pub fn add_scheme(&mut self, group: &str, scheme: &str) -> Result<(), RegistrationError> {
        let members = self.groups.entry(group.to_string()).or_default();
        if members.iter().any(|m| m == scheme) {
            return Err(RegistrationError::DuplicateScheme {
                group: group.to_string(),
                scheme: scheme.to_string(),
            });
        }
        members.push(scheme.to_string());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, group: &str) -> Option<&[String]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Body key for a schema inside a composite body: the schema name with its
/// first character lower-cased.
#[must_use]
pub fn scheme_prefix(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::JsonType;
    use crate::typeinfo::Email;

    #[derive(crate::ApiType)]
    #[allow(dead_code)]
    struct Signup {
        #[serde(rename = "userName")]
        user_name: String,
        contact: Email,
        #[api(format = "password")]
        secret: String,
        age: Option<u8>,
    }

    #[derive(crate::ApiType)]
    #[allow(dead_code)]
    struct Nested {
        inner: Signup,
    }

    mod other {
        #[derive(crate::ApiType)]
        #[allow(dead_code)]
        pub struct Signup {
            pub id: i32,
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let caps = CapabilityRegistry::new();
        let mut schemas = Schemas::new();
        let first = schemas.register(&TypeDescriptor::of::<Signup>(), &caps).unwrap();
        let second = schemas.register(&TypeDescriptor::of::<Signup>(), &caps).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(schemas.len(), 1);
    }

    #[test]
    fn test_field_formats_follow_precedence() {
        let caps = CapabilityRegistry::new();
        let mut schemas = Schemas::new();
        let schema = schemas.register(&TypeDescriptor::of::<Signup>(), &caps).unwrap();

        let names: Vec<_> = schema.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["userName", "contact", "secret", "age"]);

        assert_eq!(schema.properties[1].meta.format.as_deref(), Some("email"));
        assert_eq!(schema.properties[2].meta.format.as_deref(), Some("password"));
        assert_eq!(schema.properties[3].meta.json_type, JsonType::Integer);
        assert_eq!(schema.properties[3].meta.format.as_deref(), Some("uint8"));
    }

    #[test]
    fn test_nested_struct_field_is_rejected() {
        let caps = CapabilityRegistry::new();
        let mut schemas = Schemas::new();
        let err = schemas
            .register(&TypeDescriptor::of::<Nested>(), &caps)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Classification { .. }));
        assert!(schemas.is_empty());
    }

    #[test]
    fn test_non_struct_is_rejected() {
        let caps = CapabilityRegistry::new();
        let mut schemas = Schemas::new();
        let err = schemas.register(&TypeDescriptor::of::<i32>(), &caps).unwrap_err();
        assert!(matches!(err, RegistrationError::NotAStruct { .. }));
    }

    #[test]
    fn test_same_name_distinct_types_get_distinct_entries() {
        let caps = CapabilityRegistry::new();
        let mut schemas = Schemas::new();
        let a = schemas.register(&TypeDescriptor::of::<Signup>(), &caps).unwrap();
        let b = schemas
            .register(&TypeDescriptor::of::<other::Signup>(), &caps)
            .unwrap();
        assert_eq!(a.name, "Signup");
        assert_eq!(b.name, "Signup2");
        assert_eq!(schemas.len(), 2);
    }

    #[test]
    fn test_reserved_names_and_schemas_never_collide() {
        let caps = CapabilityRegistry::new();
        let mut schemas = Schemas::new();
        schemas.register(&TypeDescriptor::of::<Signup>(), &caps).unwrap();
        assert_eq!(schemas.reserve_name("Signup"), "Signup2");
        assert_eq!(schemas.reserve_name("Transfer"), "Transfer");

        // a type registered after the reservation steps around it
        let later = schemas
            .register(&TypeDescriptor::of::<other::Signup>(), &caps)
            .unwrap();
        assert_eq!(later.name, "Signup3");
        assert!(schemas.get("Transfer").is_none());
    }

    #[test]
    fn test_scheme_groups_reject_duplicates() {
        let mut groups = SchemeGroups::new();
        groups.add_scheme("Transfer", "Account").unwrap();
        groups.add_scheme("Transfer", "Amount").unwrap();
        let err = groups.add_scheme("Transfer", "Account").unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateScheme { .. }));
        assert_eq!(groups.get("Transfer").unwrap(), ["Account", "Amount"]);
    }

    #[test]
    fn test_scheme_prefix() {
        assert_eq!(scheme_prefix("Calculation"), "calculation");
        assert_eq!(scheme_prefix("HTTPConfig"), "hTTPConfig");
        assert_eq!(scheme_prefix(""), "");
    }
}
