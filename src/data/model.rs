use std::fmt;

use crate::error::LoadError;

/// Column names every salary table must carry.
pub const DEPARTMENT: &str = "Department";
pub const AVERAGE_SALARY: &str = "Average_Salary";
pub const MIN_SALARY: &str = "Min_Salary";
pub const MAX_SALARY: &str = "Max_Salary";

pub const REQUIRED_COLUMNS: [&str; 4] = [DEPARTMENT, AVERAGE_SALARY, MIN_SALARY, MAX_SALARY];

/// Text cells that read as missing, the same set pandas' `read_csv` uses.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// CellValue – a single cell of the raw table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as read from CSV / JSON / Parquet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Coerce the cell to a salary amount. Anything that is not a finite
    /// number (after parsing strings) becomes `None`.
    pub fn to_number(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// A textual cell kept verbatim, or `Null` for a missing-value token.
    pub fn text(s: &str) -> CellValue {
        if NA_TOKENS.contains(&s) {
            CellValue::Null
        } else {
            CellValue::String(s.to_string())
        }
    }

    /// Guess the type of a textual cell (CSV has no types).
    pub fn infer(s: &str) -> CellValue {
        if NA_TOKENS.contains(&s) {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// RawTable – the file as loaded, before schema checks
// ---------------------------------------------------------------------------

/// Untyped table straight out of a loader. Headers are whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Required columns absent from this table, sorted.
    pub fn missing_columns(&self) -> Vec<String> {
        let mut missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect();
        missing.sort();
        missing
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SalaryRecord – one department summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    pub department: String,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SalaryRecord {
    pub fn new(department: &str, average: f64, min: f64, max: f64) -> Self {
        Self {
            department: department.to_string(),
            average: Some(average),
            min: Some(min),
            max: Some(max),
        }
    }

    /// Distance from the average down to the minimum; 0 if either is missing.
    pub fn error_minus(&self) -> f64 {
        match (self.average, self.min) {
            (Some(avg), Some(min)) => avg - min,
            _ => 0.0,
        }
    }

    /// Distance from the average up to the maximum; 0 if either is missing.
    pub fn error_plus(&self) -> f64 {
        match (self.average, self.max) {
            (Some(avg), Some(max)) => max - avg,
            _ => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// SalaryDataset – validated records, in file order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalaryDataset {
    pub records: Vec<SalaryRecord>,
}

impl SalaryDataset {
    /// Validate the schema and coerce the salary columns.
    ///
    /// Rows without a department are dropped; other departments are
    /// stringified. Salary cells that are not numeric become `None`.
    pub fn from_table(table: &RawTable) -> Result<Self, LoadError> {
        let missing = table.missing_columns();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }
        // Presence checked above.
        let idx = |name: &str| table.column_index(name).unwrap_or_default();
        let (dept, avg, min, max) = (
            idx(DEPARTMENT),
            idx(AVERAGE_SALARY),
            idx(MIN_SALARY),
            idx(MAX_SALARY),
        );

        let number = |row: &[CellValue], i: usize| row.get(i).and_then(CellValue::to_number);

        let records = table
            .rows
            .iter()
            .filter_map(|row| {
                let department = row.get(dept).filter(|c| !c.is_null())?;
                Some(SalaryRecord {
                    department: department.to_string(),
                    average: number(row, avg),
                    min: number(row, min),
                    max: number(row, max),
                })
            })
            .collect();

        Ok(Self { records })
    }

    /// Department names in dataset order.
    pub fn departments(&self) -> Vec<String> {
        self.records.iter().map(|r| r.department.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable::new(
            vec![
                " Department ".into(),
                "Average_Salary".into(),
                "Min_Salary".into(),
                "Max_Salary".into(),
            ],
            rows,
        )
    }

    #[test]
    fn headers_are_trimmed() {
        let t = table(vec![]);
        assert_eq!(t.column_index("Department"), Some(0));
    }

    #[test]
    fn missing_columns_are_reported_sorted() {
        let t = RawTable::new(vec!["Department".into(), "Extra".into()], vec![]);
        let err = SalaryDataset::from_table(&t).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV must contain columns: Average_Salary, Department, Max_Salary, Min_Salary."
        );
    }

    #[test]
    fn coerces_numbers_and_drops_null_departments() {
        let t = table(vec![
            vec![
                CellValue::String("IT".into()),
                CellValue::String("100.5".into()),
                CellValue::Integer(50),
                CellValue::String("n/a".into()),
            ],
            vec![
                CellValue::Null,
                CellValue::Float(1.0),
                CellValue::Float(1.0),
                CellValue::Float(1.0),
            ],
            vec![
                CellValue::Integer(7),
                CellValue::Float(f64::NAN),
                CellValue::Null,
                CellValue::Float(3.0),
            ],
        ]);
        let ds = SalaryDataset::from_table(&t).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].average, Some(100.5));
        assert_eq!(ds.records[0].min, Some(50.0));
        assert_eq!(ds.records[0].max, None);
        assert_eq!(ds.records[1].department, "7");
        assert_eq!(ds.records[1].average, None);
        // Raw table keeps every row for the preview.
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn error_lengths_fall_back_to_zero() {
        let mut r = SalaryRecord::new("HR", 30.0, 10.0, 55.0);
        assert_eq!(r.error_minus(), 20.0);
        assert_eq!(r.error_plus(), 25.0);
        r.min = None;
        assert_eq!(r.error_minus(), 0.0);
    }

    #[test]
    fn infer_cell_types() {
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("12"), CellValue::Integer(12));
        assert_eq!(CellValue::infer("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::infer("true"), CellValue::Bool(true));
        assert_eq!(CellValue::infer("IT"), CellValue::String("IT".into()));
        assert_eq!(CellValue::infer("NA"), CellValue::Null);
        assert_eq!(CellValue::infer("nan"), CellValue::Null);
    }

    #[test]
    fn text_cells_stay_verbatim() {
        assert_eq!(CellValue::text("0042"), CellValue::String("0042".into()));
        assert_eq!(CellValue::text("1e3"), CellValue::String("1e3".into()));
        assert_eq!(CellValue::text("N/A"), CellValue::Null);
        assert_eq!(CellValue::text(""), CellValue::Null);
    }
}
