use crate::core::engine::BundleOutcome;
use crate::domain::model::{CandidateSet, Query, ValidatedBundle};
use crate::utils::error::{BundleError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    outcome: &'a BundleOutcome,
}

pub fn render_bundle(bundle: &ValidatedBundle) -> String {
    let mut lines = vec![
        format!("### 📦 {}", bundle.name),
        "What's included:".to_string(),
    ];
    lines.extend(bundle.titles.iter().map(|title| format!("- {}", title)));
    lines.push(format!("💰 Suggested price: €{:.2}", bundle.suggested_price));
    lines.push(format!("🧮 Full price: €{:.2}", bundle.full_price));
    lines.push(format!(
        "💡 You save {:.0}%! Smart bundling 🔥",
        bundle.discount_percent()
    ));
    lines.push("---".to_string());
    lines.join("\n")
}

/// 文字報表：錯誤、沒有建議，或逐一列出可顯示的組合
pub fn render_text(outcome: &BundleOutcome) -> String {
    if let Some(error) = &outcome.error {
        return format!("❌ {}", error);
    }
    if !outcome.has_suggestions() {
        return "⚠️ No bundle suggestions were returned.".to_string();
    }

    outcome
        .bundles
        .iter()
        .map(render_bundle)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(outcome: &BundleOutcome) -> Result<String> {
    let report = JsonReport {
        generated_at: Utc::now(),
        outcome,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// 查詢後、生成前給使用者的確認訊息
pub fn render_selection(query: &Query, candidates: &CandidateSet) -> String {
    match (&candidates.anchor, query) {
        (Some(anchor), _) => format!(
            "✅ Using: {} ({} related products)",
            anchor.title,
            candidates.related.len()
        ),
        (None, query) => format!(
            "✅ Found {} products in category: {}",
            candidates.related.len(),
            query.text()
        ),
    }
}

/// 查無結果是警告，其餘是錯誤
pub fn render_error(err: &BundleError) -> String {
    match err {
        BundleError::NoMatchesError { .. } => format!("⚠️ {}", err.user_friendly_message()),
        _ => format!(
            "❌ {}\n💡 Suggestion: {}",
            err.user_friendly_message(),
            err.recovery_suggestion()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProductRecord;

    fn outcome(bundles: Vec<ValidatedBundle>, error: Option<&str>) -> BundleOutcome {
        BundleOutcome {
            query: Query::ByProduct("lamp".to_string()),
            anchor: Some("Desk Lamp".to_string()),
            candidates: 3,
            proposals: bundles.len(),
            bundles,
            error: error.map(str::to_string),
        }
    }

    fn bundle() -> ValidatedBundle {
        ValidatedBundle {
            name: "Study Set".to_string(),
            titles: vec!["Desk Lamp".to_string(), "LED Bulb".to_string()],
            suggested_price: 42.0,
            full_price: 50.0,
            discount: 0.16,
        }
    }

    #[test]
    fn test_render_bundle() {
        let text = render_bundle(&bundle());

        assert!(text.starts_with("### 📦 Study Set"));
        assert!(text.contains("- Desk Lamp\n- LED Bulb"));
        assert!(text.contains("€42.00"));
        assert!(text.contains("€50.00"));
        assert!(text.contains("You save 16%"));
    }

    #[test]
    fn test_render_text_variants() {
        assert!(render_text(&outcome(vec![], None)).contains("No bundle suggestions"));
        assert!(render_text(&outcome(vec![], Some("boom"))).starts_with("❌ boom"));
        assert!(render_text(&outcome(vec![bundle()], None)).contains("Study Set"));
    }

    #[test]
    fn test_render_json_contains_timestamp_and_bundles() {
        let json = render_json(&outcome(vec![bundle()], None)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.get("generated_at").is_some());
        assert_eq!(value["query"]["mode"], "by_product");
        assert_eq!(value["bundles"][0]["full_price"], 50.0);
    }

    #[test]
    fn test_render_selection() {
        let set = CandidateSet {
            anchor: None,
            related: vec![ProductRecord::new("Mug", "Kitchen", 8.0)],
        };
        let text = render_selection(&Query::ByCategory("kit".to_string()), &set);
        assert_eq!(text, "✅ Found 1 products in category: kit");
    }

    #[test]
    fn test_render_error_warns_on_no_matches() {
        let warning = render_error(&BundleError::NoMatchesError {
            query: "zzz".to_string(),
        });
        assert!(warning.starts_with("⚠️"));

        let error = render_error(&BundleError::DataLoadError {
            message: "empty".to_string(),
        });
        assert!(error.starts_with("❌"));
        assert!(error.contains("Suggestion"));
    }
}
