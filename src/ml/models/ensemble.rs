//! Ensemble methods
//!
//! Random forest regressor: every tree is grown on a bootstrap sample drawn
//! from one seeded generator, and predictions are the mean over trees.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::matrix::FeatureMatrix;
use crate::ml::models::tree::{DecisionTreeConfig, DecisionTreeRegressor};
use crate::ml::models::{check_prediction_input, check_training_data, Regressor};

/// Configuration for random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all features)
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree; otherwise every tree sees all rows
    pub bootstrap: bool,
    /// Random seed
    pub random_seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        RandomForestConfig {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            random_seed: 42,
        }
    }
}

/// Builder for RandomForestConfig
pub struct RandomForestConfigBuilder {
    config: RandomForestConfig,
}

impl RandomForestConfigBuilder {
    pub fn new() -> Self {
        RandomForestConfigBuilder {
            config: RandomForestConfig::default(),
        }
    }

    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.n_estimators = n;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    pub fn min_samples_leaf(mut self, samples: usize) -> Self {
        self.config.min_samples_leaf = samples;
        self
    }

    pub fn max_features(mut self, features: usize) -> Self {
        self.config.max_features = Some(features);
        self
    }

    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.config.bootstrap = bootstrap;
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    pub fn build(self) -> RandomForestConfig {
        self.config
    }
}

impl Default for RandomForestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Random Forest Regressor
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: RandomForestConfig,
    trees: Vec<DecisionTreeRegressor>,
    n_features: usize,
    is_fitted: bool,
}

impl RandomForestRegressor {
    /// Create a new random forest regressor
    pub fn new(config: RandomForestConfig) -> Self {
        RandomForestRegressor {
            config,
            trees: Vec::new(),
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Create with default configuration
    pub fn default_config() -> Self {
        Self::new(RandomForestConfig::default())
    }

    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[DecisionTreeRegressor] {
        &self.trees
    }

    pub fn n_estimators(&self) -> usize {
        self.config.n_estimators
    }

    /// Bootstrap sample indices
    fn bootstrap_indices(rng: &mut StdRng, n_samples: usize) -> Vec<usize> {
        (0..n_samples)
            .map(|_| rng.random_range(0..n_samples))
            .collect()
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &FeatureMatrix, y: &[f64]) -> Result<()> {
        check_training_data(x, y)?;
        let n_samples = x.n_rows();
        let mut rng = StdRng::seed_from_u64(self.config.random_seed);

        self.trees.clear();
        for _ in 0..self.config.n_estimators.max(1) {
            let indices = if self.config.bootstrap {
                Self::bootstrap_indices(&mut rng, n_samples)
            } else {
                (0..n_samples).collect()
            };
            let tree_config = DecisionTreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: self.config.max_features,
                random_seed: rng.next_u64(),
            };

            let mut tree = DecisionTreeRegressor::new(tree_config);
            tree.fit_rows(x, y, indices);
            self.trees.push(tree);
        }

        self.n_features = x.n_cols();
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        check_prediction_input(self.is_fitted, self.n_features, x)?;

        let mut sums = vec![0.0; x.n_rows()];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(tree.predict(x)?) {
                *sum += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n_trees).collect())
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}
