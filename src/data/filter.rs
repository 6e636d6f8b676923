use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::SalaryRecord;

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    AvgDesc,
    AvgAsc,
    Department,
}

impl SortOrder {
    pub const ALL: [SortOrder; 3] = [SortOrder::AvgDesc, SortOrder::AvgAsc, SortOrder::Department];
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortOrder::AvgDesc => "Average (desc)",
            SortOrder::AvgAsc => "Average (asc)",
            SortOrder::Department => "Department (A-Z)",
        };
        f.write_str(label)
    }
}

/// Parses the query/CLI names `avg_desc`, `avg_asc` and `department`.
impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avg_desc" => Ok(SortOrder::AvgDesc),
            "avg_asc" => Ok(SortOrder::AvgAsc),
            "department" => Ok(SortOrder::Department),
            other => Err(format!(
                "unknown sort order '{other}' (expected avg_desc, avg_asc or department)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Department selection
// ---------------------------------------------------------------------------

/// Keep the records whose department is selected.
///
/// An empty selection means "no filter": every record passes.
pub fn filter_departments(
    records: &[SalaryRecord],
    selected: &BTreeSet<String>,
) -> Vec<SalaryRecord> {
    records
        .iter()
        .filter(|r| selected.is_empty() || selected.contains(&r.department))
        .cloned()
        .collect()
}

/// Sort records in place. Missing averages always sort last.
pub fn sort_records(records: &mut [SalaryRecord], order: SortOrder) {
    match order {
        SortOrder::AvgDesc => records.sort_by(|a, b| cmp_missing_last(a.average, b.average, true)),
        SortOrder::AvgAsc => records.sort_by(|a, b| cmp_missing_last(a.average, b.average, false)),
        SortOrder::Department => records.sort_by(|a, b| a.department.cmp(&b.department)),
    }
}

fn cmp_missing_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter then sort: the records of the current view.
pub fn view_records(
    records: &[SalaryRecord],
    selected: &BTreeSet<String>,
    order: SortOrder,
) -> Vec<SalaryRecord> {
    let mut view = filter_departments(records, selected);
    sort_records(&mut view, order);
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<SalaryRecord> {
        let mut missing = SalaryRecord::new("Legal", 0.0, 0.0, 0.0);
        missing.average = None;
        vec![
            SalaryRecord::new("IT", 300.0, 100.0, 500.0),
            missing,
            SalaryRecord::new("Finance", 500.0, 200.0, 900.0),
            SalaryRecord::new("HR", 100.0, 50.0, 150.0),
        ]
    }

    fn names(records: &[SalaryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.department.as_str()).collect()
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let all = records();
        assert_eq!(filter_departments(&all, &BTreeSet::new()).len(), all.len());
    }

    #[test]
    fn selection_keeps_only_matching_records() {
        let all = records();
        let selected: BTreeSet<String> = ["HR".to_string(), "Nope".to_string()].into();
        let view = filter_departments(&all, &selected);
        assert!(view.len() <= all.len());
        assert!(view.iter().all(|r| selected.contains(&r.department)));
        assert_eq!(names(&view), ["HR"]);
    }

    #[test]
    fn missing_averages_sort_last_both_ways() {
        let mut v = records();
        sort_records(&mut v, SortOrder::AvgDesc);
        assert_eq!(names(&v), ["Finance", "IT", "HR", "Legal"]);
        sort_records(&mut v, SortOrder::AvgAsc);
        assert_eq!(names(&v), ["HR", "IT", "Finance", "Legal"]);
    }

    #[test]
    fn department_sort_is_alphabetical() {
        let v = view_records(&records(), &BTreeSet::new(), SortOrder::Department);
        assert_eq!(names(&v), ["Finance", "HR", "IT", "Legal"]);
    }

    #[test]
    fn sort_order_names_parse() {
        assert_eq!("avg_asc".parse::<SortOrder>(), Ok(SortOrder::AvgAsc));
        assert_eq!(" Department ".parse::<SortOrder>(), Ok(SortOrder::Department));
        assert!("salary".parse::<SortOrder>().is_err());
    }

    #[test]
    fn sort_order_labels() {
        assert_eq!(SortOrder::AvgDesc.to_string(), "Average (desc)");
        assert_eq!(SortOrder::Department.to_string(), "Department (A-Z)");
    }
}
