use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, DEPARTMENT, RawTable};
use crate::error::LoadError;

/// Built-in department summary shown until the user picks a file.
pub const EXAMPLE_CSV: &str = "\
Department,Average_Salary,Min_Salary,Max_Salary
IT,28560.182889,10544.19,115178.51
Finance,28055.533689,8987.86,101294.41
Logistics/Warehousing,27574.698600,9027.53,153451.58
Store Operations,27404.359873,8848.62,177873.61
Fresh Produce,26915.946969,8998.42,110475.60
Marketing,26796.816800,9736.23,65923.63
HR,26539.921733,8823.46,58951.29
Meat/Fish & Bakery,26535.722133,8867.88,116453.67
Customer Service,26244.393800,9449.99,50949.01
";

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the dataset of a session comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Example,
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Example => write!(f, "built-in example"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the raw table behind a data source.
pub fn load_source(source: &DataSource) -> Result<RawTable, LoadError> {
    match source {
        DataSource::Example => example_table(),
        DataSource::File(path) => load_file(path),
    }
}

/// Parse the embedded example CSV.
pub fn example_table() -> Result<RawTable, LoadError> {
    let table = read_csv(EXAMPLE_CSV.as_bytes()).context("parsing built-in example")?;
    Ok(table)
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a salary table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one department per row
/// * `.json`    – `[{ "Department": "IT", "Average_Salary": 1.0, ... }, ...]`
/// * `.parquet` – flat columns of strings / numbers
pub fn load_file(path: &Path) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.headers,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> anyhow::Result<RawTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    read_csv(file)
}

/// Header row with column names. Department labels are kept as written and
/// every other cell's type is guessed; missing-value tokens read as null in
/// both. Short rows are padded with nulls, long rows are an error.
pub fn read_csv<R: Read>(source: R) -> anyhow::Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let label_col = headers.iter().position(|h| h.trim() == DEPARTMENT);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                headers.len(),
                record.len()
            );
        }
        let mut row: Vec<CellValue> = record
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if Some(i) == label_col {
                    CellValue::text(cell)
                } else {
                    CellValue::infer(cell)
                }
            })
            .collect();
        row.resize(headers.len(), CellValue::Null);
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Department": "IT", "Average_Salary": 28560.18, "Min_Salary": 10544.19, "Max_Salary": 115178.51 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys; absent keys read as null.
fn load_json(path: &Path) -> anyhow::Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> anyhow::Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Strings, integers, floats and booleans map onto [`CellValue`]; any other
/// Arrow type is kept as its display string.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> anyhow::Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable::new(headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => array_value_to_string(col, row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::SalaryDataset;

    #[test]
    fn example_has_nine_departments() {
        let table = example_table().unwrap();
        let ds = SalaryDataset::from_table(&table).unwrap();
        assert_eq!(ds.len(), 9);
        assert_eq!(ds.records[0].department, "IT");
        assert_eq!(ds.records[8].max, Some(50949.01));
    }

    #[test]
    fn short_rows_are_padded() {
        let table = read_csv("Department,Average_Salary,Min_Salary,Max_Salary\nIT,1\n".as_bytes())
            .unwrap();
        assert_eq!(table.rows[0].len(), 4);
        assert_eq!(table.rows[0][3], CellValue::Null);
    }

    #[test]
    fn department_labels_are_not_reformatted() {
        let csv = "Department,Average_Salary,Min_Salary,Max_Salary\n\
                   0042,1,1,1\n1.50,2,2,2\n1e3,3,3,3\nNA,4,4,4\nnull,5,5,5\n";
        let ds = SalaryDataset::from_table(&read_csv(csv.as_bytes()).unwrap()).unwrap();
        assert_eq!(ds.departments(), ["0042", "1.50", "1e3"]);
        assert_eq!(ds.records[2].average, Some(3.0));
    }

    #[test]
    fn long_rows_are_rejected() {
        let err = read_csv("a,b\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("expected 2 fields"));
    }

    #[test]
    fn json_columns_are_union_of_keys() {
        let table = parse_json(
            r#"[{"Department": "IT", "Average_Salary": 10},
                {"Department": "HR", "Max_Salary": 20.5}]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        let max = table.column_index("Max_Salary").unwrap();
        assert_eq!(table.rows[0][max], CellValue::Null);
        assert_eq!(table.rows[1][max], CellValue::Float(20.5));
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(parse_json(r#"{"Department": "IT"}"#).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("salaries.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn missing_file_is_malformed() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn loads_parquet_with_nulls_and_narrow_types() {
        use std::sync::Arc;

        use arrow::array::{Float32Array, Float64Array, Int32Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Department", DataType::Utf8, true),
            Field::new("Average_Salary", DataType::Float64, true),
            Field::new("Min_Salary", DataType::Int32, true),
            Field::new("Max_Salary", DataType::Float32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("IT"), None, Some("HR")])),
                Arc::new(Float64Array::from(vec![Some(100.5), Some(1.0), None])),
                Arc::new(Int32Array::from(vec![Some(50), Some(1), Some(20)])),
                Arc::new(Float32Array::from(vec![Some(250.0), Some(2.0), Some(80.0)])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salaries.parquet");
        let mut writer =
            ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.headers,
            ["Department", "Average_Salary", "Min_Salary", "Max_Salary"]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0][2], CellValue::Integer(50));
        assert_eq!(table.rows[0][3], CellValue::Float(250.0));
        assert_eq!(table.rows[1][0], CellValue::Null);
        assert_eq!(table.rows[2][1], CellValue::Null);

        let ds = SalaryDataset::from_table(&table).unwrap();
        assert_eq!(ds.departments(), ["IT", "HR"]);
        assert_eq!(ds.records[0].min, Some(50.0));
        assert_eq!(ds.records[1].average, None);
        assert_eq!(ds.records[1].max, Some(80.0));
    }

    #[test]
    fn loads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, " Department ,Average_Salary,Min_Salary,Max_Salary").unwrap();
        writeln!(file, "Ops,12.5,1,20").unwrap();
        let table = load_source(&DataSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(table.headers[0], "Department");
        assert_eq!(table.rows[0][1], CellValue::Float(12.5));
    }
}
