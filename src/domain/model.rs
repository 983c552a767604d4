use serde::{Deserialize, Serialize};

/// 載入時最多保留的資料列數
pub const MAX_ROWS: usize = 600;

/// 一筆訂單明細，載入後不再變動
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// 資料集內的唯一鍵
    pub title: String,
    /// 缺值時為空字串
    #[serde(default)]
    pub category: String,
    /// 缺值時為空字串
    #[serde(default)]
    pub brand: String,
    /// 缺值或非數字時為 0.0
    #[serde(default)]
    pub line_total: f64,
    /// 缺值時為 None，顯示為 N/A
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl ProductRecord {
    pub fn new(title: impl Into<String>, category: impl Into<String>, line_total: f64) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            brand: String::new(),
            line_total,
            quantity: None,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn quantity_label(&self) -> String {
        self.quantity
            .map(|q| q.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// 有序的資料列集合；空資料集代表「沒有可用資料」
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<ProductRecord>,
}

impl Dataset {
    /// 超過 [`MAX_ROWS`] 的部分會被截斷
    pub fn new(mut records: Vec<ProductRecord>) -> Self {
        records.truncate(MAX_ROWS);
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductRecord> {
        self.records.iter()
    }
}

/// 使用者的查詢方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "query", rename_all = "snake_case")]
pub enum Query {
    ByProduct(String),
    ByCategory(String),
}

impl Query {
    pub fn text(&self) -> &str {
        match self {
            Query::ByProduct(q) | Query::ByCategory(q) => q,
        }
    }

    pub fn mode_label(&self) -> &'static str {
        match self {
            Query::ByProduct(_) => "product",
            Query::ByCategory(_) => "category",
        }
    }
}

/// 篩選出的相關商品；商品模式下 `anchor` 為焦點商品
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    pub anchor: Option<ProductRecord>,
    pub related: Vec<ProductRecord>,
}

impl CandidateSet {
    /// 送進提示詞的完整清單，錨點商品排第一
    pub fn prompt_records(&self) -> Vec<&ProductRecord> {
        self.anchor.iter().chain(self.related.iter()).collect()
    }

    pub fn len(&self) -> usize {
        self.related.len() + usize::from(self.anchor.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 生成服務回傳、尚未驗證的組合建議
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleProposal {
    #[serde(rename = "bundleName", alias = "name")]
    pub name: String,
    #[serde(rename = "productsInBundle", alias = "products", alias = "titles", default)]
    pub titles: Vec<String>,
    #[serde(rename = "suggestedPrice", alias = "price")]
    pub suggested_price: f64,
}

/// 通過折扣規則、可以顯示的組合
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedBundle {
    pub name: String,
    pub titles: Vec<String>,
    pub suggested_price: f64,
    pub full_price: f64,
    /// 0..1 之間的折扣比例
    pub discount: f64,
}

impl ValidatedBundle {
    pub fn discount_percent(&self) -> f64 {
        self.discount * 100.0
    }
}

/// 組合的價格與折扣規則
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundlePolicy {
    /// 驗證時的折扣上限（嚴格小於）
    pub max_discount: f64,
    /// 商品模式下的價格相近範圍（±）
    pub price_window: f64,
    pub min_bundle_total: f64,
    pub max_bundle_total: f64,
    pub min_prompt_discount: u32,
    pub max_prompt_discount: u32,
    pub min_bundles: usize,
    pub max_bundles: usize,
}

impl Default for BundlePolicy {
    fn default() -> Self {
        Self {
            max_discount: 0.28,
            price_window: 20.0,
            min_bundle_total: 50.0,
            max_bundle_total: 200.0,
            min_prompt_discount: 10,
            max_prompt_discount: 25,
            min_bundles: 3,
            max_bundles: 5,
        }
    }
}
