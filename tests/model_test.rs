//! 回帰モデルの学習と評価のテスト

mod common;

use laptop_price::config::{ModelConfig, ModelKind, TransformationConfig};
use laptop_price::dataset::Partitioner;
use laptop_price::error::Error;
use laptop_price::ml::metrics::mean_squared_error;
use laptop_price::ml::models::{build_regressor, DecisionTreeRegressor, Regressor};
use laptop_price::ml::{evaluate, ColumnTransformer, FeatureMatrix, ModelTrainer, Transformer};

struct Prepared {
    train: FeatureMatrix,
    test: FeatureMatrix,
    train_y: Vec<f64>,
    test_y: Vec<f64>,
}

fn prepare() -> Result<Prepared, Error> {
    let data = common::cleaned_dataset();
    let pair = Partitioner::default().split(&data)?;
    let mut ct = ColumnTransformer::from_config(&TransformationConfig::default());
    let train = ct.fit_transform(&pair.train)?;
    let test = ct.transform(&pair.test)?;
    Ok(Prepared {
        train,
        test,
        train_y: pair.train.target(),
        test_y: pair.test.target(),
    })
}

#[test]
fn test_full_tree_memorizes_train() -> Result<(), Error> {
    let p = prepare()?;
    let trained = ModelTrainer::new(DecisionTreeRegressor::default_config()).fit(&p.train, &p.train_y)?;
    assert_eq!(trained.predict(&p.train)?, p.train_y);

    let metrics = evaluate(&trained, &p.train, &p.train_y)?;
    assert_eq!(metrics.mse, 0.0);
    assert_eq!(metrics.r2, 1.0);
    Ok(())
}

#[test]
fn test_every_kind_trains_and_evaluates() -> Result<(), Error> {
    let p = prepare()?;
    for kind in [ModelKind::RandomForest, ModelKind::DecisionTree, ModelKind::Ridge] {
        let config = ModelConfig {
            kind,
            n_estimators: 10,
            ..Default::default()
        };
        let trained = ModelTrainer::new(build_regressor(&config)).fit(&p.train, &p.train_y)?;
        assert_eq!(trained.n_features(), p.train.n_cols());

        let predictions = trained.predict(&p.test)?;
        assert_eq!(predictions.len(), p.test_y.len());
        assert!(predictions.iter().all(|v| v.is_finite()));

        let metrics = evaluate(&trained, &p.test, &p.test_y)?;
        assert_eq!(metrics.mse, mean_squared_error(&p.test_y, &predictions)?);
        assert!(metrics.r2.is_finite());
    }
    Ok(())
}

#[test]
fn test_forest_is_reproducible() -> Result<(), Error> {
    let p = prepare()?;
    let config = ModelConfig {
        n_estimators: 15,
        ..Default::default()
    };
    let a = ModelTrainer::new(build_regressor(&config)).fit(&p.train, &p.train_y)?;
    let b = ModelTrainer::new(build_regressor(&config)).fit(&p.train, &p.train_y)?;
    assert_eq!(a.predict(&p.test)?, b.predict(&p.test)?);
    Ok(())
}

#[test]
fn test_unfitted_model_cannot_predict() -> Result<(), Error> {
    let p = prepare()?;
    let model = build_regressor(&ModelConfig::default());
    assert!(!model.is_fitted());
    assert!(matches!(
        model.predict(&p.test),
        Err(Error::InvalidOperation(_))
    ));
    Ok(())
}

#[test]
fn test_target_length_mismatch() -> Result<(), Error> {
    let p = prepare()?;
    let result = ModelTrainer::new(build_regressor(&ModelConfig::default()))
        .fit(&p.train, &p.train_y[1..]);
    assert!(matches!(result, Err(Error::DimensionMismatch(_))));
    Ok(())
}
