//! Reference dataset of prior participants' typing speeds.
//!
//! The CSV carries one row per participant. Only three columns matter here:
//! the typing speed (`typingSpeed`, or the fourth column when the header does
//! not name it), the diagnosis label `gt` and the motor score `updrs108`.
//! Rows whose speed does not parse are skipped one by one.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Column holding typing speed when the header does not name it
pub const SPEED_COLUMN_INDEX: usize = 3;

const SPEED_HEADER: &str = "typingSpeed";
const LABEL_HEADER: &str = "gt";
const UPDRS_HEADER: &str = "updrs108";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read dataset header: {0}")]
    Header(#[from] csv::Error),
    #[error("no dataset configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRecord {
    pub typing_speed: f64,
    pub diagnosed: bool,
    pub updrs: Option<f64>,
}

/// Slope and intercept of `typing_speed = slope * updrs + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupSummary {
    pub count: usize,
    pub mean_speed: Option<f64>,
    pub std_dev_speed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    records: Vec<ReferenceRecord>,
    skipped_rows: usize,
}

impl ReferenceData {
    pub fn from_records(records: Vec<ReferenceRecord>) -> Self {
        Self {
            records,
            skipped_rows: 0,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = data.records.len(),
            skipped = data.skipped_rows,
            "dataset loaded"
        );
        Ok(data)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let speed_col = column(SPEED_HEADER).unwrap_or(SPEED_COLUMN_INDEX);
        let label_col = column(LABEL_HEADER);
        let updrs_col = column(UPDRS_HEADER);

        let mut records = Vec::new();
        let mut skipped_rows = 0;
        for row in rdr.records() {
            let Ok(row) = row else {
                skipped_rows += 1;
                continue;
            };
            let Some(typing_speed) = row.get(speed_col).and_then(parse_number) else {
                skipped_rows += 1;
                continue;
            };
            let diagnosed = label_col
                .and_then(|i| row.get(i))
                .is_some_and(|v| v.eq_ignore_ascii_case("true"));
            let updrs = updrs_col.and_then(|i| row.get(i)).and_then(parse_number);

            records.push(ReferenceRecord {
                typing_speed,
                diagnosed,
                updrs,
            });
        }

        if skipped_rows > 0 {
            warn!(skipped_rows, "skipped malformed dataset rows");
        }

        Ok(Self {
            records,
            skipped_rows,
        })
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every valid typing speed, in file order
    pub fn speeds(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.typing_speed).collect()
    }

    /// (diagnosed, not diagnosed) speeds
    pub fn split_by_diagnosis(&self) -> (Vec<f64>, Vec<f64>) {
        let (yes, no): (Vec<&ReferenceRecord>, Vec<&ReferenceRecord>) =
            self.records.iter().partition(|r| r.diagnosed);
        (
            yes.into_iter().map(|r| r.typing_speed).collect(),
            no.into_iter().map(|r| r.typing_speed).collect(),
        )
    }

    pub fn group_summary(&self, diagnosed: bool) -> GroupSummary {
        let (yes, no) = self.split_by_diagnosis();
        let speeds = if diagnosed { yes } else { no };
        GroupSummary {
            count: speeds.len(),
            mean_speed: mean(&speeds),
            std_dev_speed: std_dev(&speeds),
        }
    }

    /// Ordinary least squares of typing speed on UPDRS over rows that have both.
    /// None when fewer than two such rows exist or all UPDRS values are equal.
    pub fn fit_regression(&self) -> Option<RegressionModel> {
        let points: Vec<(f64, f64)> = self
            .records
            .iter()
            .filter_map(|r| r.updrs.map(|u| (u, r.typing_speed)))
            .collect();
        if points.len() < 2 {
            return None;
        }

        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let x_mean = mean(&xs)?;
        let y_mean = mean(&ys)?;

        let sxy: f64 = points
            .iter()
            .map(|(x, y)| (x - x_mean) * (y - y_mean))
            .sum();
        let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        Some(RegressionModel {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
pID,gt,updrs108,typingSpeed,nqScore
11,True,20,40,0.1
12,false,10,60,0.05
13,TRUE,30,20,0.2
14,False,,80,0.01
15,true,25,,0.3
16,false,5,fast,0.0
";

    #[test]
    fn test_parse_sample_skips_bad_rows() {
        let data = ReferenceData::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(data.records().len(), 4);
        assert_eq!(data.skipped_rows(), 2);
        assert_eq!(data.speeds(), vec![40.0, 60.0, 20.0, 80.0]);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let data = ReferenceData::from_reader(SAMPLE.as_bytes()).unwrap();
        let (yes, no) = data.split_by_diagnosis();

        assert_eq!(yes, vec![40.0, 20.0]);
        assert_eq!(no, vec![60.0, 80.0]);
    }

    #[test]
    fn test_missing_updrs_is_none() {
        let data = ReferenceData::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.records()[3].updrs, None);
        assert_eq!(data.records()[0].updrs, Some(20.0));
    }

    #[test]
    fn test_speed_falls_back_to_fourth_column() {
        let csv = "a,b,c,speed\nx,y,z,42\nx,y,z,nan-ish\n";
        let data = ReferenceData::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(data.speeds(), vec![42.0]);
        assert_eq!(data.skipped_rows(), 1);
        assert!(!data.records()[0].diagnosed);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let csv = "a,b,c,speed\n1,2\n1,2,3,50\n";
        let data = ReferenceData::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(data.speeds(), vec![50.0]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let data = ReferenceData::from_reader("gt,typingSpeed\n".as_bytes()).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = ReferenceData::from_path("/definitely/not/here.csv").unwrap_err();
        assert_matches!(err, DatasetError::Open { .. });
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let data = ReferenceData::from_path(file.path()).unwrap();

        assert_eq!(data.records().len(), 4);
    }

    #[test]
    fn test_fit_regression_recovers_line() {
        // speed = -2 * updrs + 80
        let records = [0.0, 10.0, 20.0, 30.0]
            .iter()
            .map(|&u| ReferenceRecord {
                typing_speed: -2.0 * u + 80.0,
                diagnosed: u > 15.0,
                updrs: Some(u),
            })
            .collect();
        let model = ReferenceData::from_records(records).fit_regression().unwrap();

        assert!((model.slope + 2.0).abs() < 1e-9);
        assert!((model.intercept - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_regression_needs_spread() {
        let same = |speed| ReferenceRecord {
            typing_speed: speed,
            diagnosed: false,
            updrs: Some(10.0),
        };
        let data = ReferenceData::from_records(vec![same(10.0), same(20.0)]);
        assert_eq!(data.fit_regression(), None);

        assert_eq!(ReferenceData::default().fit_regression(), None);
    }

    #[test]
    fn test_group_summary() {
        let data = ReferenceData::from_reader(SAMPLE.as_bytes()).unwrap();

        let yes = data.group_summary(true);
        assert_eq!(yes.count, 2);
        assert_eq!(yes.mean_speed, Some(30.0));
        assert_eq!(yes.std_dev_speed, Some(10.0));

        let empty = ReferenceData::default().group_summary(false);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean_speed, None);
    }
}
