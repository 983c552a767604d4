use crate::domain::model::Dataset;
use crate::domain::ports::DatasetSource;
use crate::utils::error::Result;
use std::sync::{Arc, OnceLock};

/// 唯讀的資料集控制代碼：第一次使用時載入，之後重複使用，
/// 只有明確呼叫 [`Catalog::reload`] 才會重新讀檔
pub struct Catalog<S: DatasetSource> {
    source: S,
    dataset: OnceLock<Arc<Dataset>>,
}

impl<S: DatasetSource> Catalog<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            dataset: OnceLock::new(),
        }
    }

    /// 讀取失敗會回報錯誤並記住一個空資料集
    pub fn get(&self) -> Arc<Dataset> {
        self.dataset
            .get_or_init(|| Arc::new(self.load_or_empty()))
            .clone()
    }

    /// 嚴格版本：讀取失敗時回傳錯誤，且不快取結果
    pub fn try_get(&self) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.dataset.get() {
            return Ok(dataset.clone());
        }

        let loaded = Arc::new(self.source.load()?);
        Ok(self.dataset.get_or_init(|| loaded).clone())
    }

    pub fn reload(&mut self) -> Arc<Dataset> {
        tracing::info!("🔄 Reloading dataset from {}", self.source.describe());
        self.dataset = OnceLock::new();
        self.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    fn load_or_empty(&self) -> Dataset {
        match self.source.load() {
            Ok(dataset) => {
                tracing::info!(
                    "📁 Loaded {} records from {}",
                    dataset.len(),
                    self.source.describe()
                );
                dataset
            }
            Err(e) => {
                tracing::error!("❌ Error reading {}: {}", self.source.describe(), e);
                Dataset::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProductRecord;
    use crate::utils::error::BundleError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        loads: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                loads: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl DatasetSource for CountingSource {
        fn load(&self) -> Result<Dataset> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BundleError::DataLoadError {
                    message: "sheet 'orders' not found".to_string(),
                });
            }
            Ok(Dataset::new(vec![ProductRecord::new("Lamp", "Lighting", 30.0)]))
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    #[test]
    fn test_dataset_is_loaded_once() {
        let catalog = Catalog::new(CountingSource::new(false));
        assert!(!catalog.is_loaded());

        let first = catalog.get();
        let second = catalog.get();

        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.source.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_yields_empty_dataset() {
        let catalog = Catalog::new(CountingSource::new(true));
        assert!(catalog.get().is_empty());
        assert!(catalog.is_loaded());
    }

    #[test]
    fn test_try_get_does_not_cache_failures() {
        let catalog = Catalog::new(CountingSource::new(true));
        assert!(catalog.try_get().is_err());
        assert!(!catalog.is_loaded());
    }

    #[test]
    fn test_reload_reads_source_again() {
        let mut catalog = Catalog::new(CountingSource::new(false));
        catalog.get();
        catalog.reload();
        assert_eq!(catalog.source.loads.load(Ordering::SeqCst), 2);
    }
}
