use crate::types::{
    CategorySalesRow, CustomerProfitRow, DelayHistogram, DiscountProfit, DiscountProfitPoint,
    HistogramBin, Kpis, MonthlySalesRow, OrderRecord, ProductSalesRow, RegionProfitRow,
    SalesPivot, TrendLine,
};
use crate::util::{average, month_start};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Size knobs for the ranked lists and the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            histogram_bins: 15,
        }
    }
}

/// Every table the dashboard shows, computed from one filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summaries {
    pub kpis: Kpis,
    pub monthly_sales: Vec<MonthlySalesRow>,
    pub region_profit: Vec<RegionProfitRow>,
    pub category_sales: Vec<CategorySalesRow>,
    pub discount_profit: DiscountProfit,
    pub top_products: Vec<ProductSalesRow>,
    pub top_customers: Vec<CustomerProfitRow>,
    pub shipping_delay: DelayHistogram,
    pub sales_pivot: SalesPivot,
}

pub fn summarize(data: &[&OrderRecord], opts: &ReportOptions) -> Summaries {
    Summaries {
        kpis: kpis(data),
        monthly_sales: monthly_sales(data),
        region_profit: region_profit(data),
        category_sales: category_sales(data),
        discount_profit: discount_profit(data),
        top_products: top_products(data, opts.top_n),
        top_customers: top_customers(data, opts.top_n),
        shipping_delay: shipping_delay_histogram(data, opts.histogram_bins),
        sales_pivot: sales_pivot(data),
    }
}

pub fn kpis(data: &[&OrderRecord]) -> Kpis {
    // Average order value is a mean of per-order totals, not of rows.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut order_totals: Vec<f64> = Vec::new();
    for r in data {
        let slot = *index.entry(r.order_id.as_str()).or_insert_with(|| {
            order_totals.push(0.0);
            order_totals.len() - 1
        });
        order_totals[slot] += r.sales;
    }
    Kpis {
        total_sales: data.iter().map(|r| r.sales).sum(),
        total_profit: data.iter().map(|r| r.profit).sum(),
        avg_order_value: average(&order_totals),
        row_count: data.len(),
        order_count: order_totals.len(),
    }
}

pub fn monthly_sales(data: &[&OrderRecord]) -> Vec<MonthlySalesRow> {
    let mut map: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in data {
        *map.entry(month_start(r.order_date)).or_default() += r.sales;
    }
    map.into_iter()
        .map(|(month, sales)| MonthlySalesRow { month, sales })
        .collect()
}

pub fn region_profit(data: &[&OrderRecord]) -> Vec<RegionProfitRow> {
    sum_by(data, |r| &r.region, |r| r.profit)
        .into_iter()
        .map(|(region, profit)| RegionProfitRow { region, profit })
        .collect()
}

pub fn category_sales(data: &[&OrderRecord]) -> Vec<CategorySalesRow> {
    sum_by(data, |r| &r.category, |r| r.sales)
        .into_iter()
        .map(|(category, sales)| CategorySalesRow { category, sales })
        .collect()
}

pub fn discount_profit(data: &[&OrderRecord]) -> DiscountProfit {
    let points: Vec<DiscountProfitPoint> = data
        .iter()
        .map(|r| DiscountProfitPoint {
            discount: r.discount,
            profit: r.profit,
        })
        .collect();
    let trend = fit_ols(&points);
    if trend.is_none() {
        debug!("Trend line omitted for {} points", points.len());
    }
    DiscountProfit { points, trend }
}

/// Least-squares line through the points. `None` with fewer than two points
/// or when every discount is the same.
pub fn fit_ols(points: &[DiscountProfitPoint]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        x_min = x_min.min(p.discount);
        x_max = x_max.max(p.discount);
    }
    if x_min == x_max {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.discount).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.profit).sum::<f64>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let dx = p.discount - mean_x;
        let dy = p.profit - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= 0.0 || !sxx.is_finite() {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy > 0.0 {
        Some((sxy * sxy) / (sxx * syy))
    } else {
        None
    };
    Some(TrendLine {
        slope,
        intercept,
        r_squared,
        x_start: x_min,
        x_end: x_max,
        y_start: intercept + slope * x_min,
        y_end: intercept + slope * x_max,
    })
}

pub fn top_products(data: &[&OrderRecord], n: usize) -> Vec<ProductSalesRow> {
    top_n_by(data, |r| &r.product_name, |r| r.sales, n)
        .into_iter()
        .enumerate()
        .map(|(idx, (product_name, sales))| ProductSalesRow {
            rank: idx + 1,
            product_name,
            sales,
        })
        .collect()
}

pub fn top_customers(data: &[&OrderRecord], n: usize) -> Vec<CustomerProfitRow> {
    top_n_by(data, |r| &r.customer_name, |r| r.profit, n)
        .into_iter()
        .enumerate()
        .map(|(idx, (customer_name, profit))| CustomerProfitRow {
            rank: idx + 1,
            customer_name,
            profit,
        })
        .collect()
}

/// Equal-width histogram of shipping delays over `[min, max]`.
///
/// The last bucket is closed on the right so `max` lands in it. When every
/// delay is the same the buckets are one day wide starting at that value.
pub fn shipping_delay_histogram(data: &[&OrderRecord], bins: usize) -> DelayHistogram {
    let delays: Vec<f64> = data
        .iter()
        .filter_map(|r| r.shipping_delay_days)
        .map(|d| d as f64)
        .collect();
    let missing = data.len() - delays.len();
    if delays.is_empty() || bins == 0 {
        return DelayHistogram {
            bins: Vec::new(),
            missing,
        };
    }

    let min = delays.iter().copied().fold(f64::INFINITY, f64::min);
    let max = delays.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        1.0
    };

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    if max > min {
        out[bins - 1].upper = max;
    }
    for d in &delays {
        let idx = (((d - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    DelayHistogram { bins: out, missing }
}

pub fn sales_pivot(data: &[&OrderRecord]) -> SalesPivot {
    let sub_categories: BTreeSet<&str> = data.iter().map(|r| r.sub_category.as_str()).collect();
    let categories: BTreeSet<&str> = data.iter().map(|r| r.category.as_str()).collect();
    let row_of: HashMap<&str, usize> = sub_categories
        .iter()
        .enumerate()
        .map(|(i, s)| (*s, i))
        .collect();
    let col_of: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i))
        .collect();

    let mut cells = vec![vec![0.0; categories.len()]; sub_categories.len()];
    for r in data {
        let (Some(&row), Some(&col)) = (
            row_of.get(r.sub_category.as_str()),
            col_of.get(r.category.as_str()),
        ) else {
            continue;
        };
        cells[row][col] += r.sales;
    }

    SalesPivot {
        sub_categories: sub_categories.into_iter().map(String::from).collect(),
        categories: categories.into_iter().map(String::from).collect(),
        cells,
    }
}

/// Group-by-sum with keys in ascending order.
fn sum_by<K, M>(data: &[&OrderRecord], key: K, measure: M) -> Vec<(String, f64)>
where
    K: Fn(&OrderRecord) -> &String,
    M: Fn(&OrderRecord) -> f64,
{
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for r in data {
        *map.entry(key(*r).as_str()).or_default() += measure(*r);
    }
    map.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Group-by-sum, largest first, truncated to `n`. Equal totals keep the
/// order in which their key first appeared.
fn top_n_by<K, M>(data: &[&OrderRecord], key: K, measure: M, n: usize) -> Vec<(String, f64)>
where
    K: Fn(&OrderRecord) -> &String,
    M: Fn(&OrderRecord) -> f64,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();
    for r in data {
        let k = key(*r);
        match index.get(k.as_str()) {
            Some(&i) => totals[i].1 += measure(*r),
            None => {
                index.insert(k.as_str(), totals.len());
                totals.push((k.clone(), measure(*r)));
            }
        }
    }
    // `sort_by` is stable.
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    totals.truncate(n);
    totals
}
