//! Loader -> filter -> aggregate -> view, as one pure call per interaction.

use crate::dataset::Dataset;
use crate::filter::{self, FilterCriteria};
use crate::reports::{self, ReportOptions, Summaries};
use crate::view::ViewModel;
use tracing::debug;

/// Summary tables for the rows selected by `criteria`.
pub fn summarize(dataset: &Dataset, criteria: &FilterCriteria, opts: &ReportOptions) -> Summaries {
    let selected = filter::apply(dataset.records(), criteria);
    reports::summarize(&selected, opts)
}

/// Recompute the whole dashboard for one set of filter values.
///
/// Nothing is cached between calls; the caller's event loop decides when to
/// invoke it.
pub fn render(dataset: &Dataset, criteria: &FilterCriteria, opts: &ReportOptions) -> ViewModel {
    let summaries = summarize(dataset, criteria, opts);
    debug!(
        "Rendered {} of {} rows",
        summaries.kpis.row_count,
        dataset.len()
    );
    ViewModel::build(&summaries, dataset.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderRecord;
    use chrono::NaiveDate;

    fn record(region: &str, sales: f64, profit: f64) -> OrderRecord {
        OrderRecord {
            order_id: format!("{region}-1"),
            order_date: NaiveDate::from_ymd_opt(2018, 7, 1).unwrap(),
            ship_date: NaiveDate::from_ymd_opt(2018, 7, 3),
            region: region.to_string(),
            category: "Tech".to_string(),
            sub_category: "Phones".to_string(),
            product_name: "Phone".to_string(),
            customer_name: "Sam".to_string(),
            sales,
            profit,
            discount: 0.0,
            profit_margin: Some(profit / sales * 100.0),
            shipping_delay_days: Some(2),
        }
    }

    #[test]
    fn test_west_only_scenario() {
        let dataset = Dataset::from_records(vec![
            record("West", 100.0, 20.0),
            record("East", 50.0, -5.0),
        ]);
        let criteria = FilterCriteria::full_domain(dataset.domain()).with_regions(["West"]);
        let s = summarize(&dataset, &criteria, &ReportOptions::default());
        assert_eq!(s.kpis.total_sales, 100.0);
        assert_eq!(s.kpis.total_profit, 20.0);
        assert_eq!(s.category_sales.len(), 1);
        assert_eq!(s.category_sales[0].category, "Tech");
        assert_eq!(s.category_sales[0].sales, 100.0);

        let view = render(&dataset, &criteria, &ReportOptions::default());
        assert_eq!(view.filtered_rows, 1);
        assert_eq!(view.total_rows, 2);
        assert_eq!(view.kpi("total_profit").unwrap().display, "$20");
    }

    #[test]
    fn test_render_is_repeatable() {
        let dataset = Dataset::from_records(vec![record("West", 100.0, 20.0)]);
        let criteria = FilterCriteria::full_domain(dataset.domain());
        let opts = ReportOptions::default();
        assert_eq!(
            render(&dataset, &criteria, &opts),
            render(&dataset, &criteria, &opts)
        );
    }
}
