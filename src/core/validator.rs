use crate::domain::model::{BundlePolicy, BundleProposal, Dataset, ValidatedBundle};
use std::collections::HashSet;

/// 以資料集重新計算原價：每筆被引用的資料列只算一次，找不到的標題算 0
pub fn full_price(dataset: &Dataset, titles: &[String]) -> f64 {
    let wanted: HashSet<&str> = titles.iter().map(String::as_str).collect();
    dataset
        .iter()
        .filter(|record| wanted.contains(record.title.as_str()))
        .map(|record| record.line_total)
        .sum()
}

/// 折扣必須為正，且比例嚴格小於 `max_discount`
pub fn is_presentable(full_price: f64, suggested_price: f64, max_discount: f64) -> bool {
    let saving = full_price - suggested_price;
    saving > 0.0 && full_price > 0.0 && saving / full_price < max_discount
}

pub fn validate_proposal(
    dataset: &Dataset,
    proposal: &BundleProposal,
    policy: &BundlePolicy,
) -> Option<ValidatedBundle> {
    let full = full_price(dataset, &proposal.titles);

    if !is_presentable(full, proposal.suggested_price, policy.max_discount) {
        tracing::debug!(
            "Dropping bundle '{}': suggested €{:.2}, full €{:.2}",
            proposal.name,
            proposal.suggested_price,
            full
        );
        return None;
    }

    Some(ValidatedBundle {
        name: proposal.name.clone(),
        titles: proposal.titles.clone(),
        suggested_price: proposal.suggested_price,
        full_price: full,
        discount: (full - proposal.suggested_price) / full,
    })
}

/// 保留通過規則的組合，順序與建議相同
pub fn validate_proposals(
    dataset: &Dataset,
    proposals: &[BundleProposal],
    policy: &BundlePolicy,
) -> Vec<ValidatedBundle> {
    proposals
        .iter()
        .filter_map(|proposal| validate_proposal(dataset, proposal, policy))
        .collect()
}
