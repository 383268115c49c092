use std::io::Read;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot open dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}, column {column:?}: {value:?} is not a finite number")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("dataset needs at least one feature column and a label column, found {0} column(s)")]
    TooFewColumns(usize),

    #[error("dataset has {0} row(s); at least two are needed to split")]
    TooFewRows(usize),
}

/// A numeric table whose last column is the label.
#[derive(Debug, Clone)]
pub struct Table {
    pub header: Vec<String>,
    /// `(rows, header.len() - 1)` feature matrix.
    pub features: Array2<f64>,
    pub labels: Vec<f64>,
}

impl Table {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// `[rows, columns]` of the whole table, label column included.
    pub fn shape(&self) -> [usize; 2] {
        [self.n_rows(), self.header.len()]
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Vec<f64>) {
        let x = self.features.select(Axis(0), indices);
        let y = indices.iter().map(|&i| self.labels[i]).collect();
        (x, y)
    }
}

/// Read a headered CSV file.
pub fn load_csv(path: &Path) -> Result<Table, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => DatasetError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DatasetError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let table = parse_csv(file)?;
    log::info!(
        "loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.header.len(),
        path.display()
    );
    Ok(table)
}

/// Parse headered CSV text. Every cell must be a finite number.
pub fn parse_csv<R: Read>(reader: R) -> Result<Table, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    if header.len() < 2 {
        return Err(DatasetError::TooFewColumns(header.len()));
    }
    let n_features = header.len() - 1;

    let mut cells = Vec::new();
    let mut labels = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (col, raw) in record.iter().enumerate() {
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DatasetError::NotNumeric {
                    row: row + 1,
                    column: header[col].clone(),
                    value: raw.to_owned(),
                })?;
            if col == n_features {
                labels.push(value);
            } else {
                cells.push(value);
            }
        }
    }

    let features = Array2::from_shape_vec((labels.len(), n_features), cells)
        .map_err(|_| DatasetError::TooFewColumns(header.len()))?;
    Ok(Table {
        header,
        features,
        labels,
    })
}

// ---------------------------------------------------------------------------
// Label encoding
// ---------------------------------------------------------------------------

/// Bidirectional label ↔ class-index mapping; classes sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<f64>,
}

impl LabelEncoder {
    pub fn fit(labels: &[f64]) -> Self {
        let mut classes = labels.to_vec();
        classes.sort_by(f64::total_cmp);
        classes.dedup();
        Self { classes }
    }

    pub fn encode(&self, label: f64) -> Option<usize> {
        self.classes.iter().position(|&c| c == label)
    }

    pub fn decode(&self, idx: usize) -> Option<f64> {
        self.classes.get(idx).copied()
    }

    /// Encode a label sequence known to be drawn from the fitted labels.
    pub fn encode_all(&self, labels: &[f64]) -> Array1<usize> {
        labels
            .iter()
            .map(|&l| self.encode(l).unwrap_or(0))
            .collect()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }
}

// ---------------------------------------------------------------------------
// Train/test splitting
// ---------------------------------------------------------------------------

/// Number of test rows for `n` samples: `ceil(n * test_ratio)`, kept within
/// `1..n` so neither side is empty.
pub fn test_count(n: usize, test_ratio: f64) -> usize {
    let raw = (n as f64 * test_ratio).ceil() as usize;
    raw.clamp(1, n.saturating_sub(1).max(1))
}

/// Shuffle `0..n` with a seeded RNG; the first [`test_count`] indices form
/// the test set and the rest the training set, both in shuffled order.
///
/// Returns `(train_indices, test_indices)`.
pub fn shuffle_split(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = test_count(n, test_ratio).min(n);
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Label-preserving variant of [`shuffle_split`].
///
/// Rows are visited in the same seeded shuffle order; each class sends its
/// first `test_count(class_size, test_ratio)` rows to the test set. A class
/// with a single row stays in training. If no class is large enough to give
/// up a row, this falls back to [`shuffle_split`].
///
/// Returns `(train_indices, test_indices)` in shuffled order.
pub fn stratified_split(labels: &[f64], test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let encoder = LabelEncoder::fit(labels);
    let classes: Vec<Option<usize>> = labels.iter().map(|&l| encoder.encode(l)).collect();

    let mut sizes = vec![0usize; encoder.n_classes()];
    for class in classes.iter().flatten() {
        sizes[*class] += 1;
    }
    let mut quota: Vec<usize> = sizes
        .iter()
        .map(|&n| if n < 2 { 0 } else { test_count(n, test_ratio) })
        .collect();
    if quota.iter().all(|&q| q == 0) {
        return shuffle_split(labels.len(), test_ratio, seed);
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut train = Vec::new();
    let mut test = Vec::new();
    for i in order {
        match classes[i] {
            Some(c) if quota[c] > 0 => {
                quota[c] -= 1;
                test.push(i);
            }
            _ => train.push(i),
        }
    }
    (train, test)
}
