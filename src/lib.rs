//! Superstore sales dashboard core.
//!
//! Loads the Superstore CSV once, filters it by region, category,
//! sub-category and order date, and turns the selection into KPI cards and
//! chart tables for whatever front end draws them.

pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod reports;
pub mod types;
pub mod util;
pub mod view;

pub use dashboard::render;
pub use dataset::{Dataset, DatasetHandle, Domain};
pub use error::{DashboardError, LoadResult};
pub use filter::FilterCriteria;
pub use loader::{LoadOptions, LoadReport, RowPolicy};
pub use reports::{ReportOptions, Summaries};
pub use view::ViewModel;
