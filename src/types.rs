use crate::util::{format_currency, format_number};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Header names the loader refuses to run without.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "Order ID",
    "Order Date",
    "Ship Date",
    "Region",
    "Category",
    "Sub-Category",
    "Product Name",
    "Customer Name",
    "Sales",
    "Profit",
    "Discount",
];

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Order ID")]
    pub order_id: Option<String>,
    #[serde(rename = "Order Date")]
    pub order_date: Option<String>,
    #[serde(rename = "Ship Date")]
    pub ship_date: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Sub-Category")]
    pub sub_category: Option<String>,
    #[serde(rename = "Product Name")]
    pub product_name: Option<String>,
    #[serde(rename = "Customer Name")]
    pub customer_name: Option<String>,
    #[serde(rename = "Sales")]
    pub sales: Option<String>,
    #[serde(rename = "Profit")]
    pub profit: Option<String>,
    #[serde(rename = "Discount")]
    pub discount: Option<String>,
}

/// One cleaned order line. Immutable once the dataset is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub ship_date: Option<NaiveDate>,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub customer_name: String,
    pub sales: f64,
    pub profit: f64,
    pub discount: f64,
    /// `profit / sales * 100`; `None` when sales is zero.
    pub profit_margin: Option<f64>,
    /// Ship date minus order date. Negative values are kept as-is.
    pub shipping_delay_days: Option<i64>,
}

fn display_usd(v: &f64) -> String {
    format_currency(*v)
}

fn display_usd_cents(v: &f64) -> String {
    format_number(*v, 2)
}

fn display_days(v: &f64) -> String {
    format!("{:.1}", v)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Mean of per-order sales totals; `None` for an empty selection.
    pub avg_order_value: Option<f64>,
    pub row_count: usize,
    pub order_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthlySalesRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: NaiveDate,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_usd_cents")]
    pub sales: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RegionProfitRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Profit")]
    #[tabled(rename = "Profit", display_with = "display_usd_cents")]
    pub profit: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategorySalesRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_usd_cents")]
    pub sales: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ProductSalesRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Product Name")]
    #[tabled(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_usd")]
    pub sales: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CustomerProfitRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Customer Name")]
    #[tabled(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Profit")]
    #[tabled(rename = "Profit", display_with = "display_usd")]
    pub profit: f64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct DiscountProfitPoint {
    #[serde(rename = "Discount")]
    pub discount: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
}

/// Ordinary least squares fit of profit on discount.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    /// Undefined when every profit value is identical.
    pub r_squared: Option<f64>,
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DiscountProfit {
    pub points: Vec<DiscountProfitPoint>,
    pub trend: Option<TrendLine>,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct HistogramBin {
    #[serde(rename = "Delay From")]
    #[tabled(rename = "Delay From", display_with = "display_days")]
    pub lower: f64,
    #[serde(rename = "Delay To")]
    #[tabled(rename = "Delay To", display_with = "display_days")]
    pub upper: f64,
    #[serde(rename = "Orders")]
    #[tabled(rename = "Orders")]
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DelayHistogram {
    pub bins: Vec<HistogramBin>,
    /// Rows whose shipping delay could not be computed.
    pub missing: usize,
}

impl DelayHistogram {
    pub fn counted(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Sales cross-tab: one row per sub-category, one column per category.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct SalesPivot {
    pub sub_categories: Vec<String>,
    pub categories: Vec<String>,
    /// `cells[row][col]`, aligned with `sub_categories` and `categories`.
    pub cells: Vec<Vec<f64>>,
}

impl SalesPivot {
    pub fn get(&self, sub_category: &str, category: &str) -> Option<f64> {
        let row = self.sub_categories.iter().position(|s| s == sub_category)?;
        let col = self.categories.iter().position(|c| c == category)?;
        Some(self.cells[row][col])
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_categories.is_empty()
    }
}
