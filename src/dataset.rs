//! The loaded dataset and its once-only memoization.

use crate::error::LoadResult;
use crate::loader::{self, LoadOptions, LoadReport};
use crate::types::OrderRecord;
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// Distinct filter values observed in the data, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Domain {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub sub_categories: Vec<String>,
    /// Earliest and latest order date; `None` for an empty dataset.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl Domain {
    pub fn from_records(records: &[OrderRecord]) -> Self {
        let mut domain = Domain::default();
        let mut seen: [HashSet<&str>; 3] = Default::default();
        for r in records {
            if seen[0].insert(&r.region) {
                domain.regions.push(r.region.clone());
            }
            if seen[1].insert(&r.category) {
                domain.categories.push(r.category.clone());
            }
            if seen[2].insert(&r.sub_category) {
                domain.sub_categories.push(r.sub_category.clone());
            }
            domain.date_range = Some(match domain.date_range {
                None => (r.order_date, r.order_date),
                Some((lo, hi)) => (lo.min(r.order_date), hi.max(r.order_date)),
            });
        }
        domain
    }
}

/// Immutable record set plus what was learned while loading it.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<OrderRecord>,
    domain: Domain,
    report: LoadReport,
}

impl Dataset {
    pub fn new(records: Vec<OrderRecord>, report: LoadReport) -> Self {
        let domain = Domain::from_records(&records);
        Self {
            records,
            domain,
            report,
        }
    }

    /// Build a dataset from in-memory records, e.g. for tests or embedding.
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        let report = LoadReport {
            total_rows: records.len(),
            loaded_rows: records.len(),
            ..LoadReport::default()
        };
        Self::new(records, report)
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loads the dataset on first access and hands out the same instance after.
///
/// The handle is keyed on its `LoadOptions`; there is no invalidation short
/// of dropping the handle.
#[derive(Debug)]
pub struct DatasetHandle {
    options: LoadOptions,
    cell: OnceCell<Dataset>,
}

impl DatasetHandle {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            cell: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> LoadResult<&Dataset> {
        self.cell.get_or_try_init(|| -> LoadResult<Dataset> {
            let (records, report) = loader::load(&self.options)?;
            info!(
                "Loaded {} of {} rows ({} dropped)",
                report.loaded_rows, report.total_rows, report.dropped_rows
            );
            Ok(Dataset::new(records, report))
        })
    }
}
