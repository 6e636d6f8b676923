use std::sync::Arc;

use anyhow::Context;
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PARQUET_PATH: &str = "sample_salaries.parquet";
const CSV_PATH: &str = "sample_salaries.csv";

/// Department and its typical average salary.
const DEPARTMENTS: [(&str, f64); 14] = [
    ("Engineering", 41_000.0),
    ("IT", 28_500.0),
    ("Finance", 28_000.0),
    ("Legal", 33_500.0),
    ("Logistics/Warehousing", 27_500.0),
    ("Store Operations", 27_400.0),
    ("Fresh Produce", 26_900.0),
    ("Marketing", 26_800.0),
    ("HR", 26_500.0),
    ("Meat/Fish & Bakery", 26_500.0),
    ("Customer Service", 26_200.0),
    ("Procurement", 29_300.0),
    ("Security", 24_100.0),
    ("Facilities", 23_700.0),
];

struct Row {
    department: &'static str,
    average: f64,
    min: f64,
    max: f64,
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One summary row per department: the average jitters around the typical
/// value, min sits well below it and max several times above it.
fn generate(rng: &mut StdRng) -> Vec<Row> {
    DEPARTMENTS
        .iter()
        .map(|&(department, typical)| {
            let average = typical * rng.random_range(0.95..1.05);
            Row {
                department,
                average: round_cents(average),
                min: round_cents(average * rng.random_range(0.30..0.45)),
                max: round_cents(average * rng.random_range(1.8..6.5)),
            }
        })
        .collect()
}

fn write_parquet(rows: &[Row]) -> anyhow::Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Department", DataType::Utf8, false),
        Field::new("Average_Salary", DataType::Float64, false),
        Field::new("Min_Salary", DataType::Float64, false),
        Field::new("Max_Salary", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.department).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.average).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.min).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.max).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH)
        .with_context(|| format!("creating {PARQUET_PATH}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(rows: &[Row]) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(CSV_PATH).with_context(|| format!("creating {CSV_PATH}"))?;
    writer.write_record(["Department", "Average_Salary", "Min_Salary", "Max_Salary"])?;
    for r in rows {
        writer.write_record([
            r.department.to_string(),
            format!("{:.2}", r.average),
            format!("{:.2}", r.min),
            format!("{:.2}", r.max),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let rows = generate(&mut rng);

    write_parquet(&rows)?;
    write_csv(&rows)?;

    println!(
        "Wrote {} departments to {PARQUET_PATH} and {CSV_PATH}",
        rows.len()
    );
    Ok(())
}
