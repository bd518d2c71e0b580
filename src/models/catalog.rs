use serde::{Deserialize, Serialize};

/// Feature switches the vendor reports per model. Absent flags default to
/// off so new vendor capabilities cannot break deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelCapabilities {
    #[serde(default)]
    pub completion_chat: bool,
    #[serde(default)]
    pub completion_fim: bool,
    #[serde(default)]
    pub function_calling: bool,
    #[serde(default)]
    pub fine_tuning: bool,
    #[serde(default)]
    pub vision: bool,
}

/// One entry of the vendor's `/models` listing, taken verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capabilities: ModelCapabilities,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_context_length: Option<u32>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub deprecation: Option<String>,
    #[serde(default)]
    pub default_model_temperature: Option<f32>,
    #[serde(default, rename = "type")]
    pub model_type: Option<String>,
}

impl ModelDescriptor {
    /// Name for menus, falling back to the id when the vendor left it out.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }

    /// The dedup key: the id minus its last hyphen-delimited segment, so
    /// "mistral-large-2411" and "mistral-large-latest" share a family. An
    /// id with no hyphen is its own base.
    pub fn base_identifier(&self) -> &str {
        match self.id.rsplit_once('-') {
            Some((base, _)) => base,
            None => &self.id,
        }
    }

    /// Whether this entry is the vendor-designated current variant of its
    /// family, signalled by "latest" in the id or in any alias.
    pub fn is_latest(&self) -> bool {
        self.id.contains("latest") || self.aliases.iter().any(|alias| alias.contains("latest"))
    }
}

/// Envelope of the `/models` endpoint.
#[derive(Debug, Deserialize)]
pub struct ModelListResponse {
    pub data: Vec<ModelDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            name: None,
            capabilities: ModelCapabilities::default(),
            description: None,
            max_context_length: None,
            aliases: Vec::new(),
            deprecation: None,
            default_model_temperature: None,
            model_type: None,
        }
    }

    #[test]
    fn base_identifier_drops_the_version_segment() {
        assert_eq!(descriptor("model-2024-07").base_identifier(), "model-2024");
        assert_eq!(
            descriptor("mistral-large-latest").base_identifier(),
            "mistral-large"
        );
        assert_eq!(descriptor("codestral").base_identifier(), "codestral");
    }

    #[test]
    fn latest_marker_in_id_or_alias() {
        assert!(descriptor("mistral-small-latest").is_latest());

        let mut aliased = descriptor("mistral-small-2409");
        aliased.aliases = vec!["mistral-small-latest".to_string()];
        assert!(aliased.is_latest());

        assert!(!descriptor("mistral-small-2409").is_latest());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let mut named = descriptor("open-mistral-7b");
        assert_eq!(named.display_name(), "open-mistral-7b");

        named.name = Some(String::new());
        assert_eq!(named.display_name(), "open-mistral-7b");

        named.name = Some("Open Mistral 7B".to_string());
        assert_eq!(named.display_name(), "Open Mistral 7B");
    }

    #[test]
    fn descriptor_tolerates_sparse_vendor_entries() {
        let parsed: ModelDescriptor =
            serde_json::from_str(r#"{"id":"mistral-embed"}"#).expect("minimal entry");
        assert_eq!(parsed.id, "mistral-embed");
        assert!(!parsed.capabilities.completion_chat);
        assert!(parsed.aliases.is_empty());
    }
}
