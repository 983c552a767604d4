// Adapters layer: concrete implementations for external systems (spreadsheet files, generation service).

pub mod gemini;
pub mod workbook;

pub use gemini::GeminiClient;
pub use workbook::WorkbookSource;
