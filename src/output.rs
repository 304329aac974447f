use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use superstore_dashboard::types::SalesPivot;
use superstore_dashboard::util::{format_int, format_number};
use superstore_dashboard::{Summaries, ViewModel};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_pivot_csv(path: &Path, pivot: &SalesPivot) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut header = vec!["Sub-Category".to_string()];
    header.extend(pivot.categories.iter().cloned());
    wtr.write_record(&header)?;
    for (sub, cells) in pivot.sub_categories.iter().zip(&pivot.cells) {
        let mut record = vec![sub.clone()];
        record.extend(cells.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Dump every summary table as CSV plus the view model as JSON.
pub fn export(dir: &Path, summaries: &Summaries, view: &ViewModel) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    write_csv(&dir.join("monthly_sales.csv"), &summaries.monthly_sales)?;
    write_csv(&dir.join("region_profit.csv"), &summaries.region_profit)?;
    write_csv(&dir.join("category_sales.csv"), &summaries.category_sales)?;
    write_csv(&dir.join("discount_profit.csv"), &summaries.discount_profit.points)?;
    write_csv(&dir.join("top_products.csv"), &summaries.top_products)?;
    write_csv(&dir.join("top_customers.csv"), &summaries.top_customers)?;
    write_csv(&dir.join("shipping_delay.csv"), &summaries.shipping_delay.bins)?;
    write_pivot_csv(&dir.join("sales_pivot.csv"), &summaries.sales_pivot)?;
    write_json(&dir.join("dashboard.json"), view)?;
    Ok(())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("... {} more rows", format_int(rows.len() - max_rows));
    }
    println!();
}

fn preview_pivot(title: &str, pivot: &SalesPivot) {
    println!("\n{}", title);
    println!("(Sub-Category x Category, sum of sales)\n");
    if pivot.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    let mut header = vec!["Sub-Category".to_string()];
    header.extend(pivot.categories.iter().cloned());
    builder.push_record(header);
    for (sub, cells) in pivot.sub_categories.iter().zip(&pivot.cells) {
        let mut record = vec![sub.clone()];
        record.extend(cells.iter().map(|v| format_number(*v, 0)));
        builder.push_record(record);
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Console rendering: KPI cards, then each chart as a markdown table.
pub fn print_dashboard(view: &ViewModel, summaries: &Summaries, max_rows: usize) {
    println!(
        "Showing {} of {} rows\n",
        format_int(view.filtered_rows),
        format_int(view.total_rows)
    );
    for card in &view.kpis {
        println!("{:<16} {}", card.label, card.display);
    }
    println!("\n---");

    let title = |id: &'static str| view.chart(id).map_or(id, |c| c.title);
    preview_table(title("monthly_sales"), None, &summaries.monthly_sales, max_rows);
    preview_table(title("region_profit"), None, &summaries.region_profit, max_rows);
    preview_table(title("category_sales"), None, &summaries.category_sales, max_rows);

    println!("\n{}\n", title("discount_profit"));
    match summaries.discount_profit.trend {
        Some(t) => {
            println!(
                "{} points, trend: profit = {:.2} + {:.2} x discount",
                format_int(summaries.discount_profit.points.len()),
                t.intercept,
                t.slope
            );
            if let Some(r2) = t.r_squared {
                println!("R^2 = {:.4}", r2);
            }
            println!();
        }
        None => println!(
            "{} points, trend line omitted\n",
            format_int(summaries.discount_profit.points.len())
        ),
    }

    preview_table(
        title("top_products"),
        None,
        &summaries.top_products,
        max_rows,
    );
    preview_table(
        title("top_customers"),
        None,
        &summaries.top_customers,
        max_rows,
    );
    let missing_note = (summaries.shipping_delay.missing > 0).then(|| {
        format!(
            "{} rows without a ship date",
            format_int(summaries.shipping_delay.missing)
        )
    });
    preview_table(
        title("shipping_delay"),
        missing_note.as_deref(),
        &summaries.shipping_delay.bins,
        summaries.shipping_delay.bins.len(),
    );
    preview_pivot(title("sales_pivot"), &summaries.sales_pivot);
}
