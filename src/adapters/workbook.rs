use crate::domain::model::{Dataset, ProductRecord, MAX_ROWS};
use crate::domain::ports::DatasetSource;
use crate::utils::error::{BundleError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};

pub const TITLE_COLUMN: &str = "Item title";
pub const CATEGORY_COLUMN: &str = "Category";
pub const BRAND_COLUMN: &str = "Brand";
pub const LINE_TOTAL_COLUMN: &str = "FinalLineTotal";
pub const QUANTITY_COLUMN: &str = "Quantity";

pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv"];

/// 訂單歷史檔案：試算表的指定工作表，或 CSV
#[derive(Debug, Clone)]
pub enum WorkbookSource {
    Spreadsheet { path: PathBuf, sheet: String },
    Csv { path: PathBuf },
}

impl WorkbookSource {
    /// 依副檔名決定讀取方式；CSV 會忽略工作表名稱
    pub fn from_path(path: impl AsRef<Path>, sheet: &str) -> Self {
        let path = path.as_ref().to_path_buf();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            WorkbookSource::Csv { path }
        } else {
            WorkbookSource::Spreadsheet {
                path,
                sheet: sheet.to_string(),
            }
        }
    }

    fn load_spreadsheet(path: &Path, sheet: &str) -> Result<Dataset> {
        let mut workbook = open_workbook_auto(path)?;

        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(BundleError::DataLoadError {
                message: format!("sheet '{}' not found in {}", sheet, path.display()),
            });
        }

        let range = workbook.worksheet_range(sheet)?;
        let mut rows = range.rows();

        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| BundleError::DataLoadError {
                message: format!("sheet '{}' is empty", sheet),
            })?
            .iter()
            .map(cell_text)
            .collect();
        let columns = ColumnIndex::from_header(&header)?;

        let records = rows
            .map(|row| {
                let cells: Vec<String> = row.iter().map(cell_text).collect();
                columns.record(&cells, |idx| row.get(idx).and_then(cell_number))
            })
            .filter(|record| !is_blank(record))
            .take(MAX_ROWS)
            .collect();

        Ok(Dataset::new(records))
    }

    fn load_csv(path: &Path) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let columns = ColumnIndex::from_header(&header)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let cells: Vec<String> = row.iter().map(str::to_string).collect();
            let record = columns.record(&cells, |idx| {
                cells.get(idx).and_then(|value| parse_number(value))
            });
            if is_blank(&record) {
                continue;
            }
            records.push(record);
            if records.len() == MAX_ROWS {
                break;
            }
        }

        Ok(Dataset::new(records))
    }
}

impl DatasetSource for WorkbookSource {
    fn load(&self) -> Result<Dataset> {
        tracing::debug!("Reading dataset from {}", self.describe());
        match self {
            WorkbookSource::Spreadsheet { path, sheet } => Self::load_spreadsheet(path, sheet),
            WorkbookSource::Csv { path } => Self::load_csv(path),
        }
    }

    fn describe(&self) -> String {
        match self {
            WorkbookSource::Spreadsheet { path, sheet } => {
                format!("{} (sheet '{}')", path.display(), sheet)
            }
            WorkbookSource::Csv { path } => path.display().to_string(),
        }
    }
}

/// 標題列中各欄位的位置；標題與金額欄位是必要的
#[derive(Debug, Clone, PartialEq)]
struct ColumnIndex {
    title: usize,
    line_total: usize,
    category: Option<usize>,
    brand: Option<usize>,
    quantity: Option<usize>,
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| BundleError::DataLoadError {
                message: format!("missing required column '{}'", name),
            })
        };

        Ok(Self {
            title: require(TITLE_COLUMN)?,
            line_total: require(LINE_TOTAL_COLUMN)?,
            category: find(CATEGORY_COLUMN),
            brand: find(BRAND_COLUMN),
            quantity: find(QUANTITY_COLUMN),
        })
    }

    fn record<F>(&self, cells: &[String], number: F) -> ProductRecord
    where
        F: Fn(usize) -> Option<f64>,
    {
        let text = |idx: Option<usize>| {
            idx.and_then(|i| cells.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        ProductRecord {
            title: text(Some(self.title)),
            category: text(self.category),
            brand: text(self.brand),
            line_total: number(self.line_total).unwrap_or(0.0),
            quantity: self.quantity.and_then(&number).map(|q| q.round() as i64),
        }
    }
}

fn is_blank(record: &ProductRecord) -> bool {
    record.title.is_empty()
        && record.category.is_empty()
        && record.brand.is_empty()
        && record.line_total == 0.0
        && record.quantity.is_none()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        // 整數型的數字不顯示小數
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        other => other.to_string(),
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(n) => Some(*n).filter(|n| n.is_finite()),
        Data::Int(n) => Some(*n as f64),
        Data::String(s) => parse_number(s),
        _ => None,
    }
}

// NaN / inf 視為缺值
fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
