//! Chat assistant: answers questions about the catalogue by forwarding them,
//! together with the current stock listing, to a language model.

mod error;
pub mod gemini;
mod provider;

pub use error::{AssistantError, ProviderError, ProviderResult};
pub use gemini::GeminiProvider;
pub use provider::{BoxedLanguageModel, LanguageModel};

use tracing::{error, info, instrument};

use crate::clients::ProductClient;
use crate::domain::Product;

/// Who is asking. The prompt framing differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Customer,
    /// Admin test mode.
    Admin,
}

pub struct Assistant {
    model: BoxedLanguageModel,
    products: ProductClient,
    shop_name: String,
    currency: String,
}

impl Assistant {
    pub fn new(
        model: BoxedLanguageModel,
        products: ProductClient,
        shop_name: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            model,
            products,
            shop_name: shop_name.into(),
            currency: currency.into(),
        }
    }

    /// Returns the model's answer verbatim. Errors are not retried.
    #[instrument(skip(self, question))]
    pub async fn answer(&self, question: &str, audience: Audience) -> Result<String, AssistantError> {
        let products = self.products.list_products().await?;
        let listing = stock_listing(&products, &self.currency);

        let prompt = match audience {
            Audience::Customer => customer_prompt(&self.shop_name, question, &listing),
            Audience::Admin => admin_prompt(question, &listing),
        };

        let answer = self.model.complete(&prompt).await.map_err(|e| {
            error!(error = %e, "Assistant call failed");
            e
        })?;

        info!(model = self.model.model_id(), answer_len = answer.len(), "Assistant answered");
        Ok(answer)
    }
}

/// True when the question asks for an Arabic reply.
pub fn wants_arabic(question: &str) -> bool {
    question.to_lowercase().contains("arabic") || question.contains("عربي")
}

pub fn stock_listing(products: &[Product], currency: &str) -> String {
    products
        .iter()
        .map(|p| p.listing_line(currency))
        .collect::<Vec<_>>()
        .join("\n")
}

fn customer_prompt(shop_name: &str, question: &str, listing: &str) -> String {
    let language = if wants_arabic(question) { "in Arabic" } else { "in English" };
    format!(
        "You are an expert fragrance assistant for {}. Respond {} to this user query: '{}'.\nHere is our current perfume stock:\n{}",
        shop_name, language, question, listing
    )
}

fn admin_prompt(question: &str, listing: &str) -> String {
    format!(
        "Admin test mode: respond to '{}' with knowledge of current stock:\n{}",
        question, listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::store::{JsonStore, Layout, MissingFile};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    /// Records every prompt and replies with a canned answer or error.
    struct RecordingModel {
        prompts: Mutex<Vec<String>>,
        reply: Option<String>,
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn complete(&self, prompt: &str) -> ProviderResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(ProviderError::api_error(503, "overloaded")),
            }
        }

        fn model_id(&self) -> &str {
            "recording"
        }
    }

    async fn products(dir: &std::path::Path) -> ProductClient {
        let store = JsonStore::new(
            dir.join("stock.json"),
            Layout::Keyed("products".into()),
            MissingFile::Error,
        );
        let seed = vec![
            Product::new("Oud Rose", "Oriental", "100ml", 150.0, 5),
            Product::new("White Musk", "Fresh", "50ml", 85.5, 0),
        ];
        let (actor, client) = ResourceActor::new(8, seed, store, |p: &crate::domain::ProductCreate| p.name.clone());
        tokio::spawn(actor.run());
        ProductClient::new(client)
    }

    fn model(reply: Option<&str>) -> Arc<RecordingModel> {
        Arc::new(RecordingModel {
            prompts: Mutex::new(Vec::new()),
            reply: reply.map(str::to_string),
        })
    }

    #[test]
    fn test_wants_arabic() {
        assert!(wants_arabic("Answer in ARABIC please"));
        assert!(wants_arabic("أريد الرد بالعربي"));
        assert!(!wants_arabic("Something floral?"));
    }

    #[tokio::test]
    async fn test_customer_prompt_embeds_stock() {
        let dir = tempdir().unwrap();
        let recorder = model(Some("Oud Rose is lovely."));
        let assistant = Assistant::new(recorder.clone(), products(dir.path()).await, "RAMAD Perfumes", "AED");

        let answer = assistant.answer("Something warm?", Audience::Customer).await.unwrap();
        assert_eq!(answer, "Oud Rose is lovely.");

        let prompts = recorder.prompts.lock().unwrap();
        assert_eq!(
            prompts[0],
            "You are an expert fragrance assistant for RAMAD Perfumes. Respond in English to this user query: 'Something warm?'.\n\
             Here is our current perfume stock:\n\
             Oud Rose (Oriental, 100ml, AED 150, In Stock: 5)\n\
             White Musk (Fresh, 50ml, AED 85.5, In Stock: 0)"
        );
    }

    #[tokio::test]
    async fn test_admin_prompt_framing() {
        let dir = tempdir().unwrap();
        let recorder = model(Some("ok"));
        let assistant = Assistant::new(recorder.clone(), products(dir.path()).await, "RAMAD Perfumes", "AED");

        assistant.answer("what is low?", Audience::Admin).await.unwrap();

        let prompts = recorder.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("Admin test mode: respond to 'what is low?' with knowledge of current stock:\n"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() {
        let dir = tempdir().unwrap();
        let recorder = model(None);
        let assistant = Assistant::new(recorder.clone(), products(dir.path()).await, "RAMAD Perfumes", "AED");

        let err = assistant.answer("hi", Audience::Customer).await.unwrap_err();
        assert_eq!(err.to_string(), "API error (503): overloaded");
        assert_eq!(recorder.prompts.lock().unwrap().len(), 1);
    }
}
