use crate::error::{DashboardError, LoadResult};
use crate::types::{OrderRecord, RawRow, REQUIRED_COLUMNS};
use crate::util::{days_diff, parse_date_safe, parse_f64_safe, DEFAULT_DATE_FORMATS};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What to do with a row that fails type coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Fail the whole load on the first bad row.
    #[default]
    Abort,
    /// Skip the row and keep going.
    Drop,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub path: PathBuf,
    pub encoding: &'static Encoding,
    pub date_formats: Vec<String>,
    pub row_policy: RowPolicy,
}

impl LoadOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: encoding_rs::WINDOWS_1252,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            row_policy: RowPolicy::Abort,
        }
    }
}

/// Map an encoding label such as `latin1` or `utf-8` to an encoding.
pub fn resolve_encoding(label: &str) -> LoadResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| DashboardError::UnknownEncoding(label.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub dropped_rows: usize,
    pub missing_ship_dates: usize,
    pub negative_delays: usize,
    pub zero_sales_rows: usize,
    pub encoding: &'static str,
    pub lossy_decode: bool,
}

pub fn load(opts: &LoadOptions) -> LoadResult<(Vec<OrderRecord>, LoadReport)> {
    let bytes = std::fs::read(&opts.path).map_err(|source| DashboardError::Io {
        path: opts.path.clone(),
        source,
    })?;
    info!(
        "Reading {} ({} bytes, {})",
        opts.path.display(),
        bytes.len(),
        opts.encoding.name()
    );
    load_from_bytes(&bytes, opts)
}

pub fn load_from_bytes(
    bytes: &[u8],
    opts: &LoadOptions,
) -> LoadResult<(Vec<OrderRecord>, LoadReport)> {
    let (text, used, lossy_decode) = opts.encoding.decode(bytes);
    if lossy_decode {
        warn!("Dataset contains bytes that are invalid in {}", used.name());
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DashboardError::MissingColumn(column.to_string()));
        }
    }

    let mut report = LoadReport {
        encoding: used.name(),
        lossy_decode,
        ..LoadReport::default()
    };
    let mut records: Vec<OrderRecord> = Vec::new();

    for result in rdr.records() {
        let record = result?;
        report.total_rows += 1;
        // Physical line where the record starts; quoted fields may span lines.
        let line = record
            .position()
            .map_or(report.total_rows + 1, |p| p.line() as usize);
        let cleaned = record
            .deserialize::<RawRow>(Some(&headers))
            .map_err(DashboardError::from)
            .and_then(|row| clean_row(row, line, &opts.date_formats));
        let record = match cleaned {
            Ok(r) => r,
            Err(e) if opts.row_policy == RowPolicy::Drop && e.is_row_error() => {
                warn!("Dropping row: {}", e);
                report.dropped_rows += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match record.shipping_delay_days {
            None => report.missing_ship_dates += 1,
            Some(d) if d < 0 => {
                debug!("Line {}: ship date precedes order date ({} days)", line, d);
                report.negative_delays += 1;
            }
            Some(_) => {}
        }
        if record.profit_margin.is_none() {
            report.zero_sales_rows += 1;
        }
        records.push(record);
    }

    report.loaded_rows = records.len();
    if report.negative_delays > 0 {
        warn!(
            "{} rows have a ship date before the order date",
            report.negative_delays
        );
    }
    Ok((records, report))
}

fn clean_row(row: RawRow, line: usize, formats: &[String]) -> LoadResult<OrderRecord> {
    let order_id = match row.order_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(DashboardError::MissingValue { line, column: "Order ID" }),
    };

    let order_date = required_date(row.order_date.as_deref(), line, "Order Date", formats)?;
    // An empty ship date is tolerated; a garbled one is not.
    let ship_date = match row.ship_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(_) => Some(required_date(row.ship_date.as_deref(), line, "Ship Date", formats)?),
    };

    let sales = required_number(row.sales.as_deref(), line, "Sales")?;
    let profit = required_number(row.profit.as_deref(), line, "Profit")?;
    let discount = required_number(row.discount.as_deref(), line, "Discount")?;

    let profit_margin = if sales == 0.0 {
        None
    } else {
        Some(profit / sales * 100.0).filter(|m| m.is_finite())
    };
    let shipping_delay_days = ship_date.map(|s| days_diff(order_date, s));

    Ok(OrderRecord {
        order_id,
        order_date,
        ship_date,
        region: text_or_unknown(row.region),
        category: text_or_unknown(row.category),
        sub_category: text_or_unknown(row.sub_category),
        product_name: text_or_unknown(row.product_name),
        customer_name: text_or_unknown(row.customer_name),
        sales,
        profit,
        discount,
        profit_margin,
        shipping_delay_days,
    })
}

fn required_date(
    value: Option<&str>,
    line: usize,
    column: &'static str,
    formats: &[String],
) -> LoadResult<NaiveDate> {
    match value.map(str::trim) {
        None | Some("") => Err(DashboardError::MissingValue { line, column }),
        Some(v) => parse_date_safe(Some(v), formats).ok_or_else(|| DashboardError::InvalidDate {
            line,
            column,
            value: v.to_string(),
        }),
    }
}

fn required_number(value: Option<&str>, line: usize, column: &'static str) -> LoadResult<f64> {
    match value.map(str::trim) {
        None | Some("") => Err(DashboardError::MissingValue { line, column }),
        Some(v) => parse_f64_safe(Some(v)).ok_or_else(|| DashboardError::InvalidNumber {
            line,
            column,
            value: v.to_string(),
        }),
    }
}

fn text_or_unknown(value: Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Row ID,Order ID,Order Date,Ship Date,Ship Mode,Customer Name,Region,Category,Sub-Category,Product Name,Sales,Quantity,Discount,Profit";

    fn csv_with(rows: &[&str]) -> Vec<u8> {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s.push('\n');
        s.into_bytes()
    }

    fn opts() -> LoadOptions {
        LoadOptions::new("unused.csv")
    }

    #[test]
    fn test_load_derives_columns() {
        let bytes = csv_with(&[
            "1,CA-1,11/8/2016,11/11/2016,Second Class,Claire Gute,South,Furniture,Bookcases,Bush Somerset,261.96,2,0,41.9136",
            "2,CA-2,6/12/2016,6/16/2016,Second Class,Darrin Van Huff,West,Office Supplies,Labels,Self-Adhesive Labels,0,2,0,6.87",
        ]);
        let (records, report) = load_from_bytes(&bytes, &opts()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.zero_sales_rows, 1);

        let first = &records[0];
        assert_eq!(first.order_id, "CA-1");
        assert_eq!(first.order_date, NaiveDate::from_ymd_opt(2016, 11, 8).unwrap());
        assert_eq!(first.shipping_delay_days, Some(3));
        let margin = first.profit_margin.unwrap();
        assert!((margin - 16.0).abs() < 1e-9);

        assert_eq!(records[1].profit_margin, None);
    }

    #[test]
    fn test_decodes_latin1_names() {
        // "Café" with 0xE9 as a single windows-1252 byte.
        let mut bytes = csv_with(&[]);
        bytes.extend_from_slice(b"1,CA-9,1/2/2017,1/4/2017,First Class,");
        bytes.push(0xE9);
        bytes.extend_from_slice(b"mile,East,Technology,Phones,Caf");
        bytes.push(0xE9);
        bytes.extend_from_slice(b" Phone,10,1,0,2\n");
        let (records, report) = load_from_bytes(&bytes, &opts()).unwrap();
        assert_eq!(records[0].customer_name, "\u{e9}mile");
        assert_eq!(records[0].product_name, "Caf\u{e9} Phone");
        assert!(!report.lossy_decode);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let bytes = b"Order ID,Order Date\nCA-1,1/1/2017\n".to_vec();
        let err = load_from_bytes(&bytes, &opts()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(_)));
    }

    #[test]
    fn test_bad_date_aborts_by_default() {
        let bytes = csv_with(&[
            "1,CA-1,13/45/2016,11/11/2016,Second Class,A,South,Furniture,Bookcases,P,10,1,0,1",
        ]);
        let err = load_from_bytes(&bytes, &opts()).unwrap_err();
        match err {
            DashboardError::InvalidDate { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "Order Date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_line_follows_multiline_fields() {
        let bytes = csv_with(&[
            "1,CA-1,11/8/2016,11/11/2016,Second Class,A,South,Furniture,Bookcases,\"Two\nLine Name\",10,1,0,1",
            "2,CA-2,11/8/2016,not-a-date,Second Class,B,South,Furniture,Bookcases,P,10,1,0,1",
        ]);
        match load_from_bytes(&bytes, &opts()).unwrap_err() {
            DashboardError::InvalidDate { line, column, .. } => {
                assert_eq!(line, 4);
                assert_eq!(column, "Ship Date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scientific_notation_and_excel_times_load() {
        let bytes = csv_with(&[
            "1,CA-1,11/8/2016 0:00,11/11/2016 0:00,Second Class,A,South,Furniture,Bookcases,P,1.5e3,1,0,2E-2",
        ]);
        let (records, _) = load_from_bytes(&bytes, &opts()).unwrap();
        assert_eq!(records[0].sales, 1500.0);
        assert!((records[0].profit - 0.02).abs() < 1e-12);
        assert_eq!(records[0].order_date, NaiveDate::from_ymd_opt(2016, 11, 8).unwrap());
        assert_eq!(records[0].shipping_delay_days, Some(3));
    }

    #[test]
    fn test_drop_policy_skips_bad_rows() {
        let bytes = csv_with(&[
            "1,CA-1,11/8/2016,11/11/2016,Second Class,A,South,Furniture,Bookcases,P,abc,1,0,1",
            "2,CA-2,11/8/2016,11/11/2016,Second Class,B,South,Furniture,Bookcases,P,10,1,0,1",
        ]);
        let mut o = opts();
        o.row_policy = RowPolicy::Drop;
        let (records, report) = load_from_bytes(&bytes, &o).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(records[0].order_id, "CA-2");
    }

    #[test]
    fn test_negative_delay_and_missing_ship_date_are_tolerated() {
        let bytes = csv_with(&[
            "1,CA-1,11/8/2016,11/5/2016,Second Class,A,South,Furniture,Bookcases,P,10,1,0,1",
            "2,CA-2,11/8/2016,,Second Class,B,South,Furniture,Bookcases,P,10,1,0,1",
        ]);
        let (records, report) = load_from_bytes(&bytes, &opts()).unwrap();
        assert_eq!(records[0].shipping_delay_days, Some(-3));
        assert_eq!(records[1].shipping_delay_days, None);
        assert_eq!(report.negative_delays, 1);
        assert_eq!(report.missing_ship_dates, 1);
    }

    #[test]
    fn test_resolve_encoding() {
        assert_eq!(resolve_encoding("latin1").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(resolve_encoding(" UTF-8 ").unwrap(), encoding_rs::UTF_8);
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(DashboardError::UnknownEncoding(_))
        ));
    }
}
