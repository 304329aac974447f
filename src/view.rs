//! Chart-ready view model.
//!
//! Each summary table is turned into a `ChartSpec` whose columns carry a name
//! and a unit, so a rendering surface can draw it without knowing how it was
//! computed.

use crate::reports::Summaries;
use crate::types::{DelayHistogram, DiscountProfit, Kpis, SalesPivot, TrendLine};
use crate::util::format_currency;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Usd,
    Days,
    Fraction,
    Count,
    Month,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    HorizontalBar,
    Pie,
    ScatterTrend,
    Histogram,
    Heatmap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub unit: Unit,
}

impl Column {
    fn new(name: impl Into<String>, unit: Unit) -> Self {
        Self {
            name: name.into(),
            unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SummaryTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one numeric column, skipping non-numeric cells.
    #[cfg(test)]
    fn numbers(&self, column: &str) -> Vec<f64> {
        let Some(idx) = self.columns.iter().position(|c| c.name == column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| match row.get(idx) {
                Some(Cell::Number(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub id: &'static str,
    pub label: &'static str,
    pub value: Option<f64>,
    pub display: String,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub table: SummaryTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendLine>,
    /// Set when the chart has nothing to draw, or part of it was omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChartSpec {
    fn new(id: &'static str, title: &'static str, kind: ChartKind, table: SummaryTable) -> Self {
        let note = table
            .is_empty()
            .then(|| "No data for the current selection".to_string());
        Self {
            id,
            title,
            kind,
            table,
            trend: None,
            note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub filtered_rows: usize,
    pub total_rows: usize,
    pub kpis: Vec<KpiCard>,
    pub charts: Vec<ChartSpec>,
}

impl ViewModel {
    pub fn build(s: &Summaries, total_rows: usize) -> Self {
        Self {
            filtered_rows: s.kpis.row_count,
            total_rows,
            kpis: kpi_cards(&s.kpis),
            charts: vec![
                monthly_chart(s),
                region_chart(s),
                category_chart(s),
                discount_chart(&s.discount_profit),
                top_products_chart(s),
                top_customers_chart(s),
                delay_chart(&s.shipping_delay),
                pivot_chart(&s.sales_pivot),
            ],
        }
    }

    pub fn chart(&self, id: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.id == id)
    }

    pub fn kpi(&self, id: &str) -> Option<&KpiCard> {
        self.kpis.iter().find(|k| k.id == id)
    }
}

fn usd_card(id: &'static str, label: &'static str, value: Option<f64>) -> KpiCard {
    KpiCard {
        id,
        label,
        value,
        display: value.map(format_currency).unwrap_or_else(|| "n/a".to_string()),
        unit: Unit::Usd,
    }
}

pub fn kpi_cards(k: &Kpis) -> Vec<KpiCard> {
    vec![
        usd_card("total_sales", "Total Sales", Some(k.total_sales)),
        usd_card("total_profit", "Total Profit", Some(k.total_profit)),
        usd_card("avg_order_value", "Avg Order Value", k.avg_order_value),
    ]
}

fn label_value_table(
    label: &str,
    value: &str,
    unit: Unit,
    rows: impl Iterator<Item = (String, f64)>,
) -> SummaryTable {
    SummaryTable {
        columns: vec![Column::new(label, Unit::Label), Column::new(value, unit)],
        rows: rows
            .map(|(k, v)| vec![Cell::Text(k), Cell::Number(v)])
            .collect(),
    }
}

fn monthly_chart(s: &Summaries) -> ChartSpec {
    let table = SummaryTable {
        columns: vec![Column::new("Month", Unit::Month), Column::new("Sales", Unit::Usd)],
        rows: s
            .monthly_sales
            .iter()
            .map(|r| vec![Cell::Date(r.month), Cell::Number(r.sales)])
            .collect(),
    };
    ChartSpec::new("monthly_sales", "Monthly Sales Trend", ChartKind::Line, table)
}

fn region_chart(s: &Summaries) -> ChartSpec {
    let rows = s.region_profit.iter().map(|r| (r.region.clone(), r.profit));
    ChartSpec::new(
        "region_profit",
        "Profit by Region",
        ChartKind::Bar,
        label_value_table("Region", "Profit", Unit::Usd, rows),
    )
}

fn category_chart(s: &Summaries) -> ChartSpec {
    let rows = s.category_sales.iter().map(|r| (r.category.clone(), r.sales));
    ChartSpec::new(
        "category_sales",
        "Sales by Category",
        ChartKind::Pie,
        label_value_table("Category", "Sales", Unit::Usd, rows),
    )
}

fn discount_chart(dp: &DiscountProfit) -> ChartSpec {
    let table = SummaryTable {
        columns: vec![
            Column::new("Discount", Unit::Fraction),
            Column::new("Profit", Unit::Usd),
        ],
        rows: dp
            .points
            .iter()
            .map(|p| vec![Cell::Number(p.discount), Cell::Number(p.profit)])
            .collect(),
    };
    let mut chart = ChartSpec::new(
        "discount_profit",
        "Discount vs Profit",
        ChartKind::ScatterTrend,
        table,
    );
    chart.trend = dp.trend;
    if chart.trend.is_none() && chart.note.is_none() {
        chart.note = Some("Trend line omitted: not enough distinct discounts".to_string());
    }
    chart
}

fn top_products_chart(s: &Summaries) -> ChartSpec {
    let rows = s
        .top_products
        .iter()
        .map(|r| (r.product_name.clone(), r.sales));
    ChartSpec::new(
        "top_products",
        "Top Products by Sales",
        ChartKind::HorizontalBar,
        label_value_table("Product Name", "Sales", Unit::Usd, rows),
    )
}

fn top_customers_chart(s: &Summaries) -> ChartSpec {
    let rows = s
        .top_customers
        .iter()
        .map(|r| (r.customer_name.clone(), r.profit));
    ChartSpec::new(
        "top_customers",
        "Top Customers by Profit",
        ChartKind::HorizontalBar,
        label_value_table("Customer Name", "Profit", Unit::Usd, rows),
    )
}

fn delay_chart(h: &DelayHistogram) -> ChartSpec {
    let table = SummaryTable {
        columns: vec![
            Column::new("Delay From", Unit::Days),
            Column::new("Delay To", Unit::Days),
            Column::new("Orders", Unit::Count),
        ],
        rows: h
            .bins
            .iter()
            .map(|b| {
                vec![
                    Cell::Number(b.lower),
                    Cell::Number(b.upper),
                    Cell::Number(b.count as f64),
                ]
            })
            .collect(),
    };
    ChartSpec::new(
        "shipping_delay",
        "Shipping Delay Histogram",
        ChartKind::Histogram,
        table,
    )
}

fn pivot_chart(p: &SalesPivot) -> ChartSpec {
    let mut columns = vec![Column::new("Sub-Category", Unit::Label)];
    columns.extend(p.categories.iter().map(|c| Column::new(c.clone(), Unit::Usd)));
    let rows = p
        .sub_categories
        .iter()
        .zip(&p.cells)
        .map(|(sub, cells)| {
            let mut row = vec![Cell::Text(sub.clone())];
            row.extend(cells.iter().map(|v| Cell::Number(*v)));
            row
        })
        .collect();
    ChartSpec::new(
        "sales_pivot",
        "Heatmap of Sales",
        ChartKind::Heatmap,
        SummaryTable { columns, rows },
    )
}
