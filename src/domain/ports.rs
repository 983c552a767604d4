use crate::domain::model::{BundlePolicy, Dataset};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 訂單資料來源（試算表、CSV 等）
pub trait DatasetSource: Send + Sync {
    fn load(&self) -> Result<Dataset>;
    fn describe(&self) -> String;
}

/// 外部文字生成服務：送出提示詞，取回原始文字
#[async_trait]
pub trait BundleGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn data_path(&self) -> &str;
    fn sheet_name(&self) -> &str;
    fn api_endpoint(&self) -> &str;
    fn model(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn policy(&self) -> &BundlePolicy;
}
