use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use forestboard_core::config::{MaxFeatures, TrainingSection};

use crate::dataset::LabelEncoder;

/// A fitted model that maps feature rows to labels.
pub trait Classifier: Send + Sync {
    /// Predict one label per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Vec<f64>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::from(&TrainingSection::default())
    }
}

impl From<&TrainingSection> for ForestParams {
    fn from(cfg: &TrainingSection) -> Self {
        Self {
            n_trees: cfg.n_trees,
            seed: cfg.seed,
            max_depth: cfg.max_depth,
            max_features: cfg.max_features,
        }
    }
}

/// One tree and the feature columns it was trained on.
struct Member {
    tree: DecisionTree<f64, usize>,
    features: Vec<usize>,
}

/// Bagged ensemble of `linfa-trees` decision trees.
///
/// Each tree sees a bootstrap sample of the rows and, with
/// [`MaxFeatures::Sqrt`], a random subset of the columns. Prediction is a
/// majority vote; ties go to the lowest class.
pub struct RandomForest {
    members: Vec<Member>,
    encoder: LabelEncoder,
}

impl RandomForest {
    pub fn train(
        x: &Array2<f64>,
        labels: &[f64],
        params: &ForestParams,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let n_rows = x.nrows();
        let n_cols = x.ncols();
        if n_rows == 0 || labels.len() != n_rows {
            return Err(format!(
                "cannot fit a forest on {n_rows} feature rows and {} labels",
                labels.len()
            )
            .into());
        }
        if params.n_trees == 0 {
            return Err("a forest needs at least one tree".into());
        }

        let encoder = LabelEncoder::fit(labels);
        let y = encoder.encode_all(labels);
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut members = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let rows: Vec<usize> = (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect();
            let features = pick_features(n_cols, params.max_features, &mut rng);

            let x_boot = x.select(Axis(0), &rows).select(Axis(1), &features);
            let y_boot: Array1<usize> = rows.iter().map(|&i| y[i]).collect();
            let dataset = Dataset::new(x_boot, y_boot);

            let tree = DecisionTree::params()
                .max_depth(params.max_depth)
                .fit(&dataset)?;
            members.push(Member { tree, features });
        }

        log::debug!(
            "fitted {} trees over {} classes",
            members.len(),
            encoder.n_classes()
        );
        Ok(Self { members, encoder })
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }

    /// Per-row vote counts, `(rows, n_classes)`.
    pub fn votes(&self, x: &Array2<f64>) -> Array2<usize> {
        let mut votes = Array2::<usize>::zeros((x.nrows(), self.encoder.n_classes()));
        for member in &self.members {
            let view = x.select(Axis(1), &member.features);
            let pred: Array1<usize> = member.tree.predict(&view);
            for (row, &class) in pred.iter().enumerate() {
                votes[[row, class]] += 1;
            }
        }
        votes
    }

    /// Winning class index per row.
    pub fn predict_classes(&self, x: &Array2<f64>) -> Vec<usize> {
        self.votes(x)
            .outer_iter()
            .map(|row| {
                let mut best = 0;
                for (class, &count) in row.iter().enumerate() {
                    if count > row[best] {
                        best = class;
                    }
                }
                best
            })
            .collect()
    }
}

impl Classifier for RandomForest {
    fn predict(&self, x: &Array2<f64>) -> Vec<f64> {
        self.predict_classes(x)
            .into_iter()
            .map(|c| self.encoder.decode(c).unwrap_or(f64::NAN))
            .collect()
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

fn pick_features(n_cols: usize, mode: MaxFeatures, rng: &mut StdRng) -> Vec<usize> {
    let mut all: Vec<usize> = (0..n_cols).collect();
    match mode {
        MaxFeatures::All => all,
        MaxFeatures::Sqrt => {
            let k = ((n_cols as f64).sqrt().floor() as usize).max(1).min(n_cols);
            all.shuffle(rng);
            all.truncate(k);
            all.sort_unstable();
            all
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::accuracy;

    /// Two well-separated blobs: class 0 near (1, 1, *), class 1 near (8, 8, *).
    fn blobs() -> (Array2<f64>, Vec<f64>) {
        let mut cells = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.1;
            cells.extend_from_slice(&[1.0 + jitter, 1.0 - jitter, (i % 3) as f64]);
            labels.push(0.0);
            cells.extend_from_slice(&[8.0 - jitter, 8.0 + jitter, (i % 3) as f64]);
            labels.push(1.0);
        }
        (Array2::from_shape_vec((40, 3), cells).unwrap(), labels)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 15,
            seed: 42,
            max_depth: Some(4),
            max_features: MaxFeatures::All,
        }
    }

    #[test]
    fn forest_learns_separable_blobs() {
        let (x, y) = blobs();
        let forest = RandomForest::train(&x, &y, &small_params()).unwrap();
        assert_eq!(forest.n_trees(), 15);
        let acc = accuracy(&y, &forest.predict(&x));
        assert!(acc > 0.95, "training accuracy should be near perfect; got {acc}");
    }

    #[test]
    fn predictions_are_original_labels() {
        let (x, y) = blobs();
        let forest = RandomForest::train(&x, &y, &small_params()).unwrap();
        let unseen = Array2::from_shape_vec((2, 3), vec![1.0, 1.0, 0.0, 8.0, 8.0, 1.0]).unwrap();
        assert_eq!(forest.predict(&unseen), [0.0, 1.0]);
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = blobs();
        let a = RandomForest::train(&x, &y, &small_params()).unwrap();
        let b = RandomForest::train(&x, &y, &small_params()).unwrap();
        assert_eq!(a.votes(&x), b.votes(&x));
    }

    #[test]
    fn votes_sum_to_tree_count() {
        let (x, y) = blobs();
        let forest = RandomForest::train(&x, &y, &small_params()).unwrap();
        let votes = forest.votes(&x);
        assert_eq!(votes.shape(), &[40, 2]);
        assert!(votes.outer_iter().all(|row| row.sum() == 15));
    }

    #[test]
    fn sqrt_features_subsets_columns() {
        let (x, y) = blobs();
        let params = ForestParams {
            max_features: MaxFeatures::Sqrt,
            ..small_params()
        };
        let forest = RandomForest::train(&x, &y, &params).unwrap();
        assert!(forest.members.iter().all(|m| m.features.len() == 1));
        let acc = accuracy(&y, &forest.predict(&x));
        assert!(acc > 0.5, "subspace forest should beat chance; got {acc}");
    }

    #[test]
    fn empty_training_set_is_an_error() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(RandomForest::train(&x, &[], &small_params()).is_err());
    }

    #[test]
    fn zero_trees_is_an_error() {
        let (x, y) = blobs();
        let params = ForestParams {
            n_trees: 0,
            ..small_params()
        };
        assert!(RandomForest::train(&x, &y, &params).is_err());
    }

    #[test]
    fn defaults_follow_training_config() {
        let params = ForestParams::default();
        assert_eq!(params.n_trees, 100);
        assert_eq!(params.seed, 42);
        assert_eq!(params.max_depth, None);
    }

    #[test]
    fn classifier_name() {
        let (x, y) = blobs();
        let forest = RandomForest::train(&x, &y, &small_params()).unwrap();
        assert_eq!(forest.name(), "random_forest");
    }

    #[test]
    fn predicting_no_rows_gives_no_labels() {
        let (x, y) = blobs();
        let forest = RandomForest::train(&x, &y, &small_params()).unwrap();
        let none = Array2::<f64>::zeros((0, 3));
        assert!(forest.predict(&none).is_empty());
        assert_eq!(forest.votes(&none).shape(), &[0, 2]);
    }
}
