use crate::domain::model::{BundlePolicy, CandidateSet, ProductRecord};

const JSON_INSTRUCTION: &str = r#"**IMPORTANT**: Return ONLY valid JSON. Do not include any markdown, comments, or text before/after.
[
  {
    "bundleName": "string",
    "productsInBundle": ["string", ...],
    "suggestedPrice": number
  },
  ...
]"#;

/// 每個商品一行：標題、分類、價格（兩位小數）、庫存
pub fn format_product_list<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ProductRecord>,
{
    records
        .into_iter()
        .map(|record| {
            format!(
                "- {} (category: {}, price: €{:.2}, stock: {})",
                record.title,
                record.category,
                record.line_total,
                record.quantity_label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 組出送給生成服務的提示詞；相同輸入一定得到相同輸出
pub fn build_prompt(candidates: &CandidateSet, policy: &BundlePolicy) -> String {
    let product_list = format_product_list(candidates.prompt_records());

    let requirements = match &candidates.anchor {
        Some(anchor) => format!(
            r#"You are an e-commerce expert. Create {min}-{max} creative product bundles from the catalogue below.

Requirements:
- Every bundle MUST include the main product:
  "{anchor}"
- Combine it with 1-3 related products from the list.
- Give each bundle an imaginative name and a fair suggested price with a {dmin}-{dmax}% discount.
- Mix cheap with expensive products, and less purchased with popular ones.
- Total bundle value before discount: €{tmin:.0} - €{tmax:.0}."#,
            min = policy.min_bundles,
            max = policy.max_bundles,
            anchor = anchor.title,
            dmin = policy.min_prompt_discount,
            dmax = policy.max_prompt_discount,
            tmin = policy.min_bundle_total,
            tmax = policy.max_bundle_total,
        ),
        None => format!(
            r#"You are an e-commerce expert. Create {min}-{max} product bundles from the same category.

Requirements:
- Each bundle should contain 2-4 products that go well together.
- Give each bundle an imaginative name and an attractive price with a {dmin}-{dmax}% discount.
- Bundles must have a total value (before discount) between €{tmin:.0} and €{tmax:.0}.
- Find combinations that make sense and that customers would enjoy."#,
            min = policy.min_bundles,
            max = policy.max_bundles,
            dmin = policy.min_prompt_discount,
            dmax = policy.max_prompt_discount,
            tmin = policy.min_bundle_total,
            tmax = policy.max_bundle_total,
        ),
    };

    format!(
        "{}\n\nProduct list:\n{}\n\n{}\n",
        requirements, product_list, JSON_INSTRUCTION
    )
}
