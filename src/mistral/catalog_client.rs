use std::collections::HashMap;

use crate::{
    config::MistralConfig,
    error::{PipeError, Result},
    models::{ModelDescriptor, ModelListResponse},
};

use super::error_for_status;

#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    config: MistralConfig,
}

impl CatalogClient {
    pub fn new(http: reqwest::Client, config: MistralConfig) -> Self {
        Self { http, config }
    }

    /// Fetches the vendor model list and reduces it to a curated catalog
    /// with one entry per model family.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let url = format!("{}/models", self.config.endpoint_base());
        let api_key = self.config.api_key()?;

        log::info!("Fetching model catalog from {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| PipeError::Network(format!("model list request failed: {}", e)))?;
        let response = error_for_status(response, "model list").await?;

        let listing: ModelListResponse = response
            .json()
            .await
            .map_err(|e| PipeError::Response(format!("malformed model list: {}", e)))?;

        let catalog = curate_catalog(listing.data);
        log::debug!("Curated catalog holds {} model(s)", catalog.len());

        Ok(catalog)
    }
}

/// Keeps chat-capable models only and collapses each model family to a
/// single entry. The first model seen claims its family slot; a later
/// "latest" rendition overwrites it. Families surface in the order they
/// were first seen.
pub(crate) fn curate_catalog(models: Vec<ModelDescriptor>) -> Vec<ModelDescriptor> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut curated: Vec<ModelDescriptor> = Vec::new();

    for model in models {
        if !model.capabilities.completion_chat {
            continue;
        }

        let family = model.base_identifier().to_string();
        match slots.get(&family) {
            Some(&slot) => {
                if model.is_latest() {
                    curated[slot] = model;
                }
            }
            None => {
                slots.insert(family, curated.len());
                curated.push(model);
            }
        }
    }

    curated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelCapabilities;

    fn chat_model(id: &str) -> ModelDescriptor {
        ModelDescriptor {
            id: id.to_string(),
            name: None,
            capabilities: ModelCapabilities {
                completion_chat: true,
                ..ModelCapabilities::default()
            },
            description: None,
            max_context_length: None,
            aliases: Vec::new(),
            deprecation: None,
            default_model_temperature: None,
            model_type: None,
        }
    }

    #[test]
    fn later_latest_entry_overwrites_its_family() {
        let mut newer = chat_model("modelA-2024-07");
        newer.aliases.push("modelA-latest".to_string());

        let curated = curate_catalog(vec![chat_model("modelA-2024-06"), newer]);

        assert_eq!(curated.len(), 1);
        assert_eq!(curated[0].id, "modelA-2024-07");
    }

    #[test]
    fn first_entry_wins_when_no_latest_marker() {
        let curated = curate_catalog(vec![
            chat_model("modelA-2024-06"),
            chat_model("modelA-2024-07"),
        ]);

        assert_eq!(curated.len(), 1);
        assert_eq!(curated[0].id, "modelA-2024-06");
    }

    #[test]
    fn non_chat_models_never_surface() {
        let mut embed = chat_model("vendor-embed-v1");
        embed.capabilities.completion_chat = false;

        let curated = curate_catalog(vec![embed, chat_model("chat-2024-01")]);

        assert_eq!(curated.len(), 1);
        assert_eq!(curated[0].id, "chat-2024-01");
    }

    #[test]
    fn families_keep_first_seen_order() {
        let curated = curate_catalog(vec![
            chat_model("alpha-v1"),
            chat_model("beta-v1"),
            chat_model("alpha-latest"),
            chat_model("gamma-v1"),
        ]);

        let ids: Vec<&str> = curated.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha-latest", "beta-v1", "gamma-v1"]);
    }
}
