//! Decision Tree implementation
//!
//! CART regression tree on a dense feature matrix. Splits minimize the summed
//! squared error of the two children; thresholds sit halfway between two
//! consecutive distinct feature values.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::matrix::FeatureMatrix;
use crate::ml::models::{check_prediction_input, check_training_data, Regressor};

/// Configuration for decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeConfig {
    /// Maximum depth of the tree (None = no limit)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples required at a leaf node
    pub min_samples_leaf: usize,
    /// Maximum number of features to consider for splits (None = all features)
    pub max_features: Option<usize>,
    /// Seed for the per-node feature subsampling
    pub random_seed: u64,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        DecisionTreeConfig {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_seed: 42,
        }
    }
}

/// A node in the decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index used for splitting
    pub feature_index: Option<usize>,
    /// Samples with `value <= threshold` go left
    pub threshold: Option<f64>,
    /// Mean target of the samples reaching this node
    pub prediction: f64,
    pub left_child: Option<usize>,
    pub right_child: Option<usize>,
    pub n_samples: usize,
    /// Mean squared error at this node
    pub impurity: f64,
    pub depth: usize,
    pub is_leaf: bool,
}

impl TreeNode {
    fn new_leaf(prediction: f64, n_samples: usize, impurity: f64, depth: usize) -> Self {
        TreeNode {
            feature_index: None,
            threshold: None,
            prediction,
            left_child: None,
            right_child: None,
            n_samples,
            impurity,
            depth,
            is_leaf: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Decision Tree Regressor
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    config: DecisionTreeConfig,
    nodes: Vec<TreeNode>,
    n_features: usize,
    is_fitted: bool,
}

impl DecisionTreeRegressor {
    /// Create a new decision tree regressor
    pub fn new(config: DecisionTreeConfig) -> Self {
        DecisionTreeRegressor {
            config,
            nodes: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(DecisionTreeConfig::default())
    }

    pub fn config(&self) -> &DecisionTreeConfig {
        &self.config
    }

    /// Nodes in construction order; index 0 is the root
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    /// Depth of the deepest node (a lone root has depth 0)
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Fit on a subset of rows. Indices may repeat (bootstrap samples).
    pub(crate) fn fit_rows(&mut self, x: &FeatureMatrix, y: &[f64], indices: Vec<usize>) {
        self.nodes.clear();
        self.n_features = x.n_cols();
        let mut rng = StdRng::seed_from_u64(self.config.random_seed);
        self.build_node(x.rows(), y, indices, 0, &mut rng);
        self.is_fitted = true;
    }

    fn build_node(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let n = indices.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n as f64;
        let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();

        let node_index = self.nodes.len();
        self.nodes.push(TreeNode::new_leaf(mean, n, sse / n as f64, depth));

        if !self.can_split(y, &indices, depth) {
            return node_index;
        }
        let split = match self.find_best_split(x, y, &indices, sse, rng) {
            Some(split) => split,
            None => return node_index,
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[i][split.feature] <= split.threshold);
        let left_child = self.build_node(x, y, left, depth + 1, rng);
        let right_child = self.build_node(x, y, right, depth + 1, rng);

        let node = &mut self.nodes[node_index];
        node.feature_index = Some(split.feature);
        node.threshold = Some(split.threshold);
        node.left_child = Some(left_child);
        node.right_child = Some(right_child);
        node.is_leaf = false;
        node_index
    }

    fn can_split(&self, y: &[f64], indices: &[usize], depth: usize) -> bool {
        let n = indices.len();
        if self.config.max_depth.map_or(false, |max| depth >= max) {
            return false;
        }
        if n < self.config.min_samples_split.max(2) || n < 2 * self.min_leaf() {
            return false;
        }
        // 純粋なノードは分割しない
        let first = y[indices[0]];
        indices.iter().any(|&i| y[i] != first)
    }

    fn min_leaf(&self) -> usize {
        self.config.min_samples_leaf.max(1)
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        if let Some(k) = self.config.max_features {
            let k = k.max(1);
            if k < self.n_features {
                features.shuffle(rng);
                features.truncate(k);
                features.sort_unstable();
            }
        }
        features
    }

    /// Find the best split for a node
    fn find_best_split(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        node_sse: f64,
        rng: &mut StdRng,
    ) -> Option<Split> {
        let n = indices.len();
        let min_leaf = self.min_leaf();
        let mut best: Option<Split> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in self.candidate_features(rng) {
            // one-hot columns are constant in most nodes
            let first = x[indices[0]][feature];
            if indices.iter().all(|&i| x[i][feature] == first) {
                continue;
            }

            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x[i][feature], y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
            let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 0..n - 1 {
                let (value, target) = pairs[k];
                left_sum += target;
                left_sq += target * target;

                let n_left = k + 1;
                let n_right = n - n_left;
                let next = pairs[k + 1].0;
                if n_left < min_leaf || n_right < min_leaf || value >= next {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                if best.map_or(true, |b| sse < b.sse) {
                    best = Some(Split {
                        feature,
                        threshold: midpoint(value, next),
                        sse,
                    });
                }
            }
        }

        best.filter(|b| node_sse - b.sse > 1e-10 * node_sse.max(1.0))
    }

    fn predict_single(&self, sample: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            match (node.feature_index, node.threshold, node.left_child, node.right_child) {
                (Some(feature), Some(threshold), Some(left), Some(right)) => {
                    index = if sample[feature] <= threshold { left } else { right };
                }
                _ => return node.prediction,
            }
        }
    }
}

/// Halfway point that still separates `low` from `high`
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low / 2.0 + high / 2.0;
    if mid >= high {
        low
    } else {
        mid
    }
}

impl Regressor for DecisionTreeRegressor {
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_training_data(x, y)?;
        self.fit_rows(x, y, (0..x.n_rows()).collect());
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        check_prediction_input(self.is_fitted, self.n_features, x)?;
        Ok(x.rows().iter().map(|row| self.predict_single(row)).collect())
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }
}
