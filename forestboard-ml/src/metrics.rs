use forestboard_core::document::{class_key, ClassMetrics, ClassificationReport};

use crate::dataset::LabelEncoder;

/// Fraction of positions where `predicted` equals `actual`.
pub fn accuracy(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a == p)
        .count();
    correct as f64 / actual.len() as f64
}

/// Square count matrix over the sorted union of labels in either sequence.
/// Entry `(i, j)` counts samples of true class `i` predicted as class `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: LabelEncoder,
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    pub fn new(actual: &[f64], predicted: &[f64]) -> Self {
        let union: Vec<f64> = actual.iter().chain(predicted).copied().collect();
        let labels = LabelEncoder::fit(&union);
        let k = labels.n_classes();
        let mut counts = vec![vec![0u64; k]; k];
        for (&a, &p) in actual.iter().zip(predicted) {
            if let (Some(i), Some(j)) = (labels.encode(a), labels.encode(p)) {
                counts[i][j] += 1;
            }
        }
        Self { labels, counts }
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn true_positives(&self, class: usize) -> u64 {
        self.counts[class][class]
    }

    /// Samples whose true class is `class`.
    fn support(&self, class: usize) -> u64 {
        self.counts[class].iter().sum()
    }

    /// Samples predicted as `class`.
    fn predicted(&self, class: usize) -> u64 {
        self.counts.iter().map(|row| row[class]).sum()
    }

    fn class_metrics(&self, class: usize) -> ClassMetrics {
        let tp = self.true_positives(class);
        let precision = ratio(tp, self.predicted(class));
        let recall = ratio(tp, self.support(class));
        ClassMetrics {
            precision,
            recall,
            f1_score: f1(precision, recall),
            support: self.support(class) as usize,
        }
    }

    /// Per-class precision / recall / F1 plus accuracy, macro and
    /// support-weighted averages. Undefined ratios are reported as 0.
    pub fn report(&self) -> ClassificationReport {
        let per_class: Vec<(String, ClassMetrics)> = self
            .labels
            .classes()
            .iter()
            .enumerate()
            .map(|(i, &label)| (class_key(label), self.class_metrics(i)))
            .collect();

        let total = self.total();
        let k = per_class.len().max(1) as f64;
        let mut macro_avg = ClassMetrics {
            support: total as usize,
            ..ClassMetrics::default()
        };
        let mut weighted_avg = macro_avg;
        for (_, m) in &per_class {
            macro_avg.precision += m.precision / k;
            macro_avg.recall += m.recall / k;
            macro_avg.f1_score += m.f1_score / k;
            if total > 0 {
                let w = m.support as f64 / total as f64;
                weighted_avg.precision += m.precision * w;
                weighted_avg.recall += m.recall * w;
                weighted_avg.f1_score += m.f1_score * w;
            }
        }

        let correct: u64 = (0..per_class.len()).map(|i| self.true_positives(i)).sum();
        ClassificationReport {
            classes: per_class,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
        }
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    // actual:    0 0 0 0 1 1 1 1 1 1
    // predicted: 0 0 0 1 1 1 1 1 0 0
    fn sample() -> (Vec<f64>, Vec<f64>) {
        (
            vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
        )
    }

    #[test]
    fn accuracy_counts_matches() {
        let (a, p) = sample();
        assert!((accuracy(&a, &p) - 0.7).abs() < EPS);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn confusion_rows_are_true_classes() {
        let (a, p) = sample();
        let cm = ConfusionMatrix::new(&a, &p);
        assert_eq!(cm.counts(), [vec![3, 1], vec![2, 4]]);
        assert_eq!(cm.total(), 10);
    }

    #[test]
    fn confusion_includes_predicted_only_labels() {
        let cm = ConfusionMatrix::new(&[0.0, 0.0], &[0.0, 2.0]);
        assert_eq!(cm.counts(), [vec![1, 1], vec![0, 0]]);
        let report = cm.report();
        let keys: Vec<&str> = report.classes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["0.0", "2.0"]);
    }

    #[test]
    fn report_per_class_scores() {
        let (a, p) = sample();
        let report = ConfusionMatrix::new(&a, &p).report();
        let zero = report.class("0.0").unwrap();
        assert!((zero.precision - 0.6).abs() < EPS);
        assert!((zero.recall - 0.75).abs() < EPS);
        assert!((zero.f1_score - 2.0 * 0.6 * 0.75 / 1.35).abs() < EPS);
        assert_eq!(zero.support, 4);

        let one = report.class("1.0").unwrap();
        assert!((one.precision - 0.8).abs() < EPS);
        assert!((one.recall - 4.0 / 6.0).abs() < EPS);
        assert_eq!(one.support, 6);
        assert!((report.accuracy - 0.7).abs() < EPS);
    }

    #[test]
    fn report_averages() {
        let (a, p) = sample();
        let report = ConfusionMatrix::new(&a, &p).report();
        let zero = *report.class("0.0").unwrap();
        let one = *report.class("1.0").unwrap();

        assert!((report.macro_avg.precision - 0.7).abs() < EPS);
        assert!((report.weighted_avg.precision - (0.6 * 0.4 + 0.8 * 0.6)).abs() < EPS);
        assert!((report.weighted_avg.recall - 0.7).abs() < EPS);
        let weighted_f1 = zero.f1_score * 0.4 + one.f1_score * 0.6;
        assert!((report.weighted_avg.f1_score - weighted_f1).abs() < EPS);
        assert_eq!(report.macro_avg.support, 10);
        assert_eq!(report.weighted_avg.support, 10);
    }

    #[test]
    fn never_predicted_class_scores_zero() {
        let report = ConfusionMatrix::new(&[0.0, 1.0, 1.0], &[1.0, 1.0, 1.0]).report();
        let zero = report.class("0.0").unwrap();
        assert_eq!(zero.precision, 0.0);
        assert_eq!(zero.recall, 0.0);
        assert_eq!(zero.f1_score, 0.0);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = ConfusionMatrix::new(&[], &[]).report();
        assert!(report.classes.is_empty());
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.weighted_avg.support, 0);
    }
}
