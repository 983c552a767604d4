use crate::core::{parser, prompt, selector, validator};
use crate::domain::model::{BundlePolicy, Dataset, Query, ValidatedBundle};
use crate::domain::ports::BundleGenerator;
use crate::utils::error::{BundleError, Result};
use serde::Serialize;

/// 一次查詢的結果；生成或解析失敗時 `error` 有值、`bundles` 為空
#[derive(Debug, Clone, Serialize)]
pub struct BundleOutcome {
    pub query: Query,
    pub anchor: Option<String>,
    pub candidates: usize,
    pub proposals: usize,
    pub bundles: Vec<ValidatedBundle>,
    pub error: Option<String>,
}

impl BundleOutcome {
    pub fn has_suggestions(&self) -> bool {
        !self.bundles.is_empty()
    }
}

pub struct BundleEngine<G: BundleGenerator> {
    generator: G,
    policy: BundlePolicy,
}

impl<G: BundleGenerator> BundleEngine<G> {
    pub fn new(generator: G) -> Self {
        Self::with_policy(generator, BundlePolicy::default())
    }

    pub fn with_policy(generator: G, policy: BundlePolicy) -> Self {
        Self { generator, policy }
    }

    pub fn policy(&self) -> &BundlePolicy {
        &self.policy
    }

    /// 只做篩選與組提示詞，不呼叫生成服務
    pub fn prompt_for(&self, dataset: &Dataset, query: &Query) -> Result<String> {
        ensure_data(dataset)?;
        let candidates = selector::select_candidates(dataset, query, &self.policy)?;
        Ok(prompt::build_prompt(&candidates, &self.policy))
    }

    pub async fn run(&self, dataset: &Dataset, query: &Query) -> Result<BundleOutcome> {
        ensure_data(dataset)?;

        // Select
        let candidates = selector::select_candidates(dataset, query, &self.policy)?;
        let mut outcome = BundleOutcome {
            query: query.clone(),
            anchor: candidates.anchor.as_ref().map(|a| a.title.clone()),
            candidates: candidates.len(),
            proposals: 0,
            bundles: Vec::new(),
            error: None,
        };

        // Generate
        let request = prompt::build_prompt(&candidates, &self.policy);
        tracing::info!(
            "🧠 Requesting bundles for {} candidate products ({} mode)",
            outcome.candidates,
            query.mode_label()
        );
        tracing::debug!("Prompt:\n{}", request);

        let raw = match self.generator.generate(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("❌ Generation failed: {}", e);
                outcome.error = Some(e.user_friendly_message());
                return Ok(outcome);
            }
        };

        // Parse
        let proposals = match parser::parse_proposals(&raw) {
            Ok(proposals) => proposals,
            Err(e) => {
                tracing::error!("❌ {}", e);
                tracing::debug!("Raw response:\n{}", raw);
                outcome.error = Some(e.user_friendly_message());
                return Ok(outcome);
            }
        };
        outcome.proposals = proposals.len();

        // Validate
        outcome.bundles = validator::validate_proposals(dataset, &proposals, &self.policy);
        tracing::info!(
            "📦 {} of {} proposed bundles passed validation",
            outcome.bundles.len(),
            outcome.proposals
        );

        Ok(outcome)
    }
}

fn ensure_data(dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(BundleError::DataLoadError {
            message: "the dataset is empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProductRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedGenerator {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BundleGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or_else(|| BundleError::GenerationError {
                message: "HTTP 503 Service Unavailable".to_string(),
            })
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            ProductRecord::new("Desk Lamp", "Lighting", 40.0).with_brand("Lumo"),
            ProductRecord::new("LED Bulb", "Lighting", 10.0),
            ProductRecord::new("Lamp Shade", "Lighting", 25.0),
            ProductRecord::new("Sofa", "Furniture", 900.0),
        ])
    }

    #[test]
    fn test_run_validates_generated_bundles() {
        let reply = r#"```json
[
  {"bundleName": "Study Set", "productsInBundle": ["Desk Lamp", "LED Bulb"], "suggestedPrice": 42},
  {"bundleName": "Steal", "productsInBundle": ["Desk Lamp", "Lamp Shade"], "suggestedPrice": 20}
]
```"#;
        let engine = BundleEngine::new(ScriptedGenerator::replying(reply));

        let outcome = tokio_test::block_on(
            engine.run(&dataset(), &Query::ByProduct("desk".to_string())),
        )
        .unwrap();

        assert_eq!(outcome.anchor.as_deref(), Some("Desk Lamp"));
        assert_eq!(outcome.candidates, 3);
        assert_eq!(outcome.proposals, 2);
        assert_eq!(outcome.bundles.len(), 1);
        assert_eq!(outcome.bundles[0].name, "Study Set");
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_no_matches_skips_generation() {
        let engine = BundleEngine::new(ScriptedGenerator::replying("[]"));

        let result = tokio_test::block_on(
            engine.run(&dataset(), &Query::ByCategory("garden".to_string())),
        );

        assert!(matches!(result, Err(BundleError::NoMatchesError { .. })));
        assert_eq!(engine.generator.calls(), 0);
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let engine = BundleEngine::new(ScriptedGenerator::replying("[]"));

        let result = tokio_test::block_on(
            engine.run(&Dataset::empty(), &Query::ByProduct("lamp".to_string())),
        );

        assert!(matches!(result, Err(BundleError::DataLoadError { .. })));
        assert_eq!(engine.generator.calls(), 0);
    }

    #[test]
    fn test_generation_failure_is_reported_not_raised() {
        let engine = BundleEngine::new(ScriptedGenerator::failing());

        let outcome = tokio_test::block_on(
            engine.run(&dataset(), &Query::ByCategory("light".to_string())),
        )
        .unwrap();

        assert!(outcome.bundles.is_empty());
        assert!(outcome.error.is_some());
        assert_eq!(engine.generator.calls(), 1);
    }

    #[test]
    fn test_unparseable_reply_is_reported_not_raised() {
        let engine = BundleEngine::new(ScriptedGenerator::replying("Sorry, no bundles today."));

        let outcome = tokio_test::block_on(
            engine.run(&dataset(), &Query::ByCategory("light".to_string())),
        )
        .unwrap();

        assert!(!outcome.has_suggestions());
        assert_eq!(outcome.proposals, 0);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_prompt_for_lists_anchor_first() {
        let engine = BundleEngine::new(ScriptedGenerator::replying("[]"));
        let prompt = engine
            .prompt_for(&dataset(), &Query::ByProduct("desk".to_string()))
            .unwrap();

        let first_item = prompt.lines().find(|l| l.starts_with("- ")).unwrap();
        assert!(first_item.starts_with("- Desk Lamp"));
        assert!(!prompt.contains("Sofa"));
    }
}
