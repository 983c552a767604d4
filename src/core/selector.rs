use crate::domain::model::{BundlePolicy, CandidateSet, Dataset, ProductRecord, Query};
use crate::utils::error::{BundleError, Result};
use crate::utils::validation::validate_non_empty_string;

/// 依查詢方式篩出候選商品；查無結果回傳 `NoMatchesError`
pub fn select_candidates(dataset: &Dataset, query: &Query, policy: &BundlePolicy) -> Result<CandidateSet> {
    validate_non_empty_string("query", query.text())?;

    let candidates = match query {
        Query::ByProduct(text) => {
            let focus = find_focus(dataset, text).ok_or_else(|| BundleError::NoMatchesError {
                query: text.clone(),
            })?;
            tracing::info!("✅ Using focus product: {}", focus.title);

            CandidateSet {
                related: related_to(dataset, focus, policy.price_window),
                anchor: Some(focus.clone()),
            }
        }
        Query::ByCategory(text) => {
            let related = in_category(dataset, text);
            if related.is_empty() {
                return Err(BundleError::NoMatchesError { query: text.clone() });
            }
            tracing::info!("✅ Found {} products in category '{}'", related.len(), text);

            CandidateSet {
                anchor: None,
                related,
            }
        }
    };

    tracing::debug!("Candidate set: {} records", candidates.len());
    Ok(candidates)
}

/// 第一個標題包含查詢字串（不分大小寫）的商品
pub fn find_focus<'a>(dataset: &'a Dataset, text: &str) -> Option<&'a ProductRecord> {
    let needle = text.to_lowercase();
    dataset
        .iter()
        .find(|record| record.title.to_lowercase().contains(&needle))
}

/// 同品牌、同分類，或價格落在 ±window 內的商品；不含焦點商品本身
pub fn related_to(dataset: &Dataset, focus: &ProductRecord, window: f64) -> Vec<ProductRecord> {
    let brand = focus.brand.to_lowercase();
    let category = focus.category.to_lowercase();
    let low = focus.line_total - window;
    let high = focus.line_total + window;

    dataset
        .iter()
        .filter(|record| record.title != focus.title)
        .filter(|record| {
            same_label(&record.brand, &brand)
                || same_label(&record.category, &category)
                || (low..=high).contains(&record.line_total)
        })
        .cloned()
        .collect()
}

/// 分類包含查詢字串（不分大小寫）的所有商品
pub fn in_category(dataset: &Dataset, text: &str) -> Vec<ProductRecord> {
    let needle = text.to_lowercase();
    dataset
        .iter()
        .filter(|record| record.category.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

// 空白的品牌/分類不算相同
fn same_label(value: &str, lowered_focus: &str) -> bool {
    !lowered_focus.trim().is_empty() && value.to_lowercase() == lowered_focus
}
