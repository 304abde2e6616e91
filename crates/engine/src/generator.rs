//! Content generation seam for preview and draft runs.
//!
//! The engine never calls a provider directly; it goes through
//! [`ContentGenerator`] so an AI-backed provider and the deterministic
//! default are interchangeable. Failure kinds are a closed set decided at
//! the provider boundary, never re-inferred from error messages.

use async_trait::async_trait;
use fixline_core::playbook::Playbook;
use fixline_db::models::product::Product;

/// Provider failure kinds.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Transient throttling; the run fails as rate-limited.
    #[error("Content provider rate limited")]
    RateLimited,
    /// Anything else the provider reports.
    #[error("Content provider failed: {0}")]
    Provider(String),
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce a value for `playbook.target_field()` on one product.
    async fn generate(
        &self,
        product: &Product,
        playbook: Playbook,
        params: &serde_json::Value,
    ) -> Result<String, GenerateError>;
}

/// Deterministic provider that derives copy from the product name.
///
/// Good enough for previews, tests, and catalogs where the name alone
/// carries the information; deployments swap in an AI-backed
/// implementation behind the same trait.
pub struct TemplateContentProvider;

#[async_trait]
impl ContentGenerator for TemplateContentProvider {
    async fn generate(
        &self,
        product: &Product,
        playbook: Playbook,
        params: &serde_json::Value,
    ) -> Result<String, GenerateError> {
        let name = match product.name.trim() {
            "" => product.external_ref.as_str(),
            trimmed => trimmed,
        };
        let tone = params.get("tone").and_then(|value| value.as_str());

        Ok(match playbook {
            Playbook::FillMissingTitles => name.to_string(),
            Playbook::FillMissingDescriptions => match tone {
                Some("playful") => {
                    format!("Say hello to {name}. Built for every day and ready when you are.")
                }
                _ => format!(
                    "{name}, made to last and ready to ship. \
                     Every order is checked before it leaves our shelves."
                ),
            },
            Playbook::FillMissingSeo => {
                format!("Buy {name} online. Fast dispatch and easy returns.")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fixline_core::types::DbId;

    fn product(name: &str) -> Product {
        Product {
            id: 1 as DbId,
            project_id: 1,
            external_ref: "sku-100".into(),
            name: name.into(),
            title: None,
            description: None,
            seo_description: None,
            synced_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn titles_come_from_the_product_name() {
        let value = TemplateContentProvider
            .generate(
                &product("Walnut desk"),
                Playbook::FillMissingTitles,
                &serde_json::json!({}),
            )
            .await
            .unwrap();
        assert_eq!(value, "Walnut desk");
    }

    #[tokio::test]
    async fn blank_names_fall_back_to_the_external_ref() {
        let value = TemplateContentProvider
            .generate(
                &product("   "),
                Playbook::FillMissingTitles,
                &serde_json::json!({}),
            )
            .await
            .unwrap();
        assert_eq!(value, "sku-100");
    }

    #[tokio::test]
    async fn rule_params_steer_the_description_template() {
        let plain = TemplateContentProvider
            .generate(
                &product("Oak chair"),
                Playbook::FillMissingDescriptions,
                &serde_json::json!({}),
            )
            .await
            .unwrap();
        let playful = TemplateContentProvider
            .generate(
                &product("Oak chair"),
                Playbook::FillMissingDescriptions,
                &serde_json::json!({"tone": "playful"}),
            )
            .await
            .unwrap();
        assert_ne!(plain, playful);
        assert!(playful.contains("Oak chair"));
    }
}
