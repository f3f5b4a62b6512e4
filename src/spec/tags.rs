/// A documentation tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
}

/// A server the API is reachable on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

/// Deduplicated tag list in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Tags {
    entries: Vec<Tag>,
}

impl Tags {
    /// Add `name` if missing; returns its index either way.
    pub fn set(&mut self, name: &str) -> usize {
        if let Some(index) = self.entries.iter().position(|t| t.name == name) {
            return index;
        }
        self.entries.push(Tag {
            name: name.to_string(),
            description: None,
        });
        self.entries.len() - 1
    }

    pub fn set_description(&mut self, name: &str, description: &str) {
        let index = self.set(name);
        self.entries[index].description = Some(description.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.entries.iter()
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

/// Deduplicated server list keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct Servers {
    entries: Vec<Server>,
}

impl Servers {
    pub fn set(&mut self, url: &str) -> usize {
        if let Some(index) = self.entries.iter().position(|s| s.url == url) {
            return index;
        }
        self.entries.push(Server {
            url: url.to_string(),
            description: None,
        });
        self.entries.len() - 1
    }

    pub fn set_description(&mut self, url: &str, description: &str) {
        let index = self.set(url);
        self.entries[index].description = Some(description.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Server> {
        self.entries.iter()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_is_idempotent() {
        let mut tags = Tags::default();
        assert_eq!(tags.set("pets"), 0);
        assert_eq!(tags.set("users"), 1);
        assert_eq!(tags.set("pets"), 0);
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_description_does_not_duplicate() {
        let mut tags = Tags::default();
        tags.set("pets");
        tags.set_description("pets", "Pet operations");
        tags.set_description("pets", "Everything about pets");
        assert_eq!(tags.len(), 1);
        assert_eq!(
            tags.iter().next().unwrap().description.as_deref(),
            Some("Everything about pets")
        );
    }

    #[test]
    fn test_servers_dedupe_by_url() {
        let mut servers = Servers::default();
        servers.set("https://api.example.com");
        servers.set_description("https://api.example.com", "production");
        servers.set_description("http://localhost:8080", "local");
        assert_eq!(servers.len(), 2);
        let urls: Vec<_> = servers.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://api.example.com", "http://localhost:8080"]);
    }
}
