//! Row selection by region, category, sub-category and order date.

use crate::dataset::Domain;
use crate::types::OrderRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// The user's current selection. Rebuilt on every interaction.
///
/// An empty set for any dimension matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub sub_categories: BTreeSet<String>,
    /// Inclusive.
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
}

impl FilterCriteria {
    /// Everything selected, over the observed date range.
    pub fn full_domain(domain: &Domain) -> Self {
        let (start, end) = domain.date_range.unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Self {
            regions: domain.regions.iter().cloned().collect(),
            categories: domain.categories.iter().cloned().collect(),
            sub_categories: domain.sub_categories.iter().cloned().collect(),
            start,
            end,
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sub_categories<I, S>(mut self, sub_categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_categories = sub_categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn matches(&self, r: &OrderRecord) -> bool {
        self.regions.contains(&r.region)
            && self.categories.contains(&r.category)
            && self.sub_categories.contains(&r.sub_category)
            && r.order_date >= self.start
            && r.order_date <= self.end
    }
}

/// Records satisfying every predicate of `criteria`, in input order.
pub fn apply<'a>(records: &'a [OrderRecord], criteria: &FilterCriteria) -> Vec<&'a OrderRecord> {
    let out: Vec<&OrderRecord> = records.iter().filter(|r| criteria.matches(r)).collect();
    debug!("Filter kept {} of {} rows", out.len(), records.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, d).unwrap()
    }

    fn record(region: &str, category: &str, sub: &str, order_date: NaiveDate) -> OrderRecord {
        OrderRecord {
            order_id: "O-1".to_string(),
            order_date,
            ship_date: None,
            region: region.to_string(),
            category: category.to_string(),
            sub_category: sub.to_string(),
            product_name: "P".to_string(),
            customer_name: "C".to_string(),
            sales: 10.0,
            profit: 1.0,
            discount: 0.0,
            profit_margin: Some(10.0),
            shipping_delay_days: None,
        }
    }

    fn sample() -> Vec<OrderRecord> {
        vec![
            record("West", "Technology", "Phones", date(1, 5)),
            record("East", "Furniture", "Chairs", date(2, 10)),
            record("South", "Technology", "Copiers", date(3, 15)),
            record("West", "Office Supplies", "Paper", date(4, 20)),
        ]
    }

    #[test]
    fn test_full_domain_is_identity() {
        let records = sample();
        let criteria = FilterCriteria::full_domain(&Domain::from_records(&records));
        let out = apply(&records, &criteria);
        let expected: Vec<&OrderRecord> = records.iter().collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_every_result_satisfies_all_predicates() {
        let records = sample();
        let criteria = FilterCriteria::full_domain(&Domain::from_records(&records))
            .with_regions(["West", "South"])
            .with_categories(["Technology"])
            .with_sub_categories(["Phones", "Copiers", "Chairs"])
            .with_date_range(date(1, 1), date(3, 31));
        let out = apply(&records, &criteria);
        assert_eq!(out.len(), 2);
        for r in &out {
            assert!(records.contains(r));
            assert!(criteria.regions.contains(&r.region));
            assert!(criteria.categories.contains(&r.category));
            assert!(criteria.sub_categories.contains(&r.sub_category));
            assert!(r.order_date >= criteria.start && r.order_date <= criteria.end);
        }
    }

    #[test]
    fn test_empty_set_yields_empty_result() {
        let records = sample();
        let full = FilterCriteria::full_domain(&Domain::from_records(&records));
        let none: [&str; 0] = [];
        assert!(apply(&records, &full.clone().with_regions(none)).is_empty());
        assert!(apply(&records, &full.clone().with_categories(none)).is_empty());
        assert!(apply(&records, &full.with_sub_categories(none)).is_empty());
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let records = sample();
        let criteria = FilterCriteria::full_domain(&Domain::from_records(&records))
            .with_date_range(date(2, 10), date(3, 15));
        let out = apply(&records, &criteria);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].region, "East");
        assert_eq!(out[1].region, "South");
    }

    #[test]
    fn test_inverted_range_is_empty_not_error() {
        let records = sample();
        let criteria = FilterCriteria::full_domain(&Domain::from_records(&records))
            .with_date_range(date(4, 1), date(1, 1));
        assert!(apply(&records, &criteria).is_empty());
    }

    #[test]
    fn test_sub_category_filter() {
        let records = sample();
        let criteria = FilterCriteria::full_domain(&Domain::from_records(&records))
            .with_sub_categories(["Paper", "Chairs"]);
        let out = apply(&records, &criteria);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.sub_category == "Paper" || r.sub_category == "Chairs"));
    }
}
