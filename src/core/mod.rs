pub mod catalog;
pub mod engine;
pub mod parser;
pub mod prompt;
pub mod selector;
pub mod validator;

pub use crate::domain::model::{
    BundlePolicy, BundleProposal, CandidateSet, Dataset, ProductRecord, Query, ValidatedBundle,
};
pub use crate::domain::ports::{BundleGenerator, ConfigProvider, DatasetSource};
pub use crate::utils::error::Result;
