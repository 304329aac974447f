// Menu-driven front end.
//
// The dataset is loaded once before the loop starts; every "Show dashboard"
// re-runs the pure render with the current selection.
use crate::output;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::io::{self, Write};
use superstore_dashboard::util::format_int;
use superstore_dashboard::{dashboard, Dataset, FilterCriteria, ReportOptions};
use tracing::debug;

/// Read a single line of input after printing `prompt`.
///
/// Returns `None` on end of input so the caller can exit cleanly.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Interpret a selection typed at the prompt.
///
/// Accepts `all`, `none`, or a comma-separated mix of option names and
/// 1-based indices. Unknown tokens are reported back as the error.
pub fn parse_selection(input: &str, options: &[String]) -> Result<BTreeSet<String>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        return Ok(options.iter().cloned().collect());
    }
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(BTreeSet::new());
    }
    let mut chosen = BTreeSet::new();
    for token in trimmed.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let by_index = token
            .parse::<usize>()
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| options.get(i));
        let by_name = options.iter().find(|o| o.eq_ignore_ascii_case(token));
        match by_index.or(by_name) {
            Some(o) => {
                chosen.insert(o.clone());
            }
            None => return Err(format!("Unknown option: {}", token)),
        }
    }
    Ok(chosen)
}

fn prompt_selection(
    label: &str,
    options: &[String],
    current: &BTreeSet<String>,
) -> Option<BTreeSet<String>> {
    println!("\n{} options:", label);
    for (i, o) in options.iter().enumerate() {
        let mark = if current.contains(o) { "x" } else { " " };
        println!("  [{}] {:>2}. {}", mark, i + 1, o);
    }
    loop {
        let input = read_line("Enter names or numbers (comma-separated), 'all' or 'none': ")?;
        match parse_selection(&input, options) {
            Ok(set) => return Some(set),
            Err(e) => println!("{}", e),
        }
    }
}

fn prompt_date(label: &str, current: NaiveDate) -> Option<NaiveDate> {
    loop {
        let input = read_line(&format!("{} (YYYY-MM-DD, blank keeps {}): ", label, current))?;
        if input.is_empty() {
            return Some(current);
        }
        match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
            Ok(d) => return Some(d),
            Err(_) => println!("Invalid date. Please use YYYY-MM-DD."),
        }
    }
}

fn describe(criteria: &FilterCriteria, dataset: &Dataset) -> String {
    let d = dataset.domain();
    format!(
        "Regions {}/{}, Categories {}/{}, Sub-Categories {}/{}, {} to {}",
        criteria.regions.len(),
        d.regions.len(),
        criteria.categories.len(),
        d.categories.len(),
        criteria.sub_categories.len(),
        d.sub_categories.len(),
        criteria.start,
        criteria.end
    )
}

pub fn run(dataset: &Dataset, opts: &ReportOptions, preview_rows: usize) {
    let domain = dataset.domain();
    let mut criteria = FilterCriteria::full_domain(domain);
    println!("Dataset ready ({} rows).\n", format_int(dataset.len()));

    loop {
        println!("Current filters: {}", describe(&criteria, dataset));
        println!("[1] Select regions");
        println!("[2] Select categories");
        println!("[3] Select sub-categories");
        println!("[4] Set order date range");
        println!("[5] Reset filters");
        println!("[6] Show dashboard");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        let updated = match choice.as_str() {
            "1" => prompt_selection("Region", &domain.regions, &criteria.regions)
                .map(|s| criteria.clone().with_regions(s)),
            "2" => prompt_selection("Category", &domain.categories, &criteria.categories)
                .map(|s| criteria.clone().with_categories(s)),
            "3" => prompt_selection(
                "Sub-Category",
                &domain.sub_categories,
                &criteria.sub_categories,
            )
            .map(|s| criteria.clone().with_sub_categories(s)),
            "4" => prompt_date("Start date", criteria.start).and_then(|start| {
                prompt_date("End date", criteria.end)
                    .map(|end| criteria.clone().with_date_range(start, end))
            }),
            "5" => Some(FilterCriteria::full_domain(domain)),
            "6" => {
                println!();
                let summaries = dashboard::summarize(dataset, &criteria, opts);
                let view = superstore_dashboard::ViewModel::build(&summaries, dataset.len());
                output::print_dashboard(&view, &summaries, preview_rows);
                continue;
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter a number from 0 to 6.\n");
                continue;
            }
        };
        match updated {
            Some(c) => {
                debug!("Filters changed: {:?}", c);
                criteria = c;
            }
            None => break,
        }
        println!();
    }
}
