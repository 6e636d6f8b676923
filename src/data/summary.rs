use super::model::SalaryRecord;

/// Headline numbers for the records currently shown.
///
/// Each statistic skips missing values and is `None` when nothing is left.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryStats {
    pub departments: usize,
    pub mean_of_averages: Option<f64>,
    pub min_of_mins: Option<f64>,
    pub max_of_maxes: Option<f64>,
}

impl SummaryStats {
    pub fn from_records(records: &[SalaryRecord]) -> Self {
        let averages: Vec<f64> = records.iter().filter_map(|r| r.average).collect();
        let mean_of_averages =
            (!averages.is_empty()).then(|| averages.iter().sum::<f64>() / averages.len() as f64);

        Self {
            departments: records.len(),
            mean_of_averages,
            min_of_mins: records.iter().filter_map(|r| r.min).reduce(f64::min),
            max_of_maxes: records.iter().filter_map(|r| r.max).reduce(f64::max),
        }
    }
}
