//! 学習・テスト分割のテスト

mod common;

use std::collections::HashSet;

use laptop_price::config::SplitConfig;
use laptop_price::dataset::{Dataset, Partitioner};
use laptop_price::error::Error;

fn laptops(data: &Dataset) -> Vec<String> {
    data.records().iter().map(|r| r.laptop.clone()).collect()
}

#[test]
fn test_partitions_cover_dataset() -> Result<(), Error> {
    let data = common::cleaned_dataset();
    let pair = Partitioner::default().split(&data)?;

    assert_eq!(pair.test.len(), 2);
    assert_eq!(pair.train.len(), 8);

    // every cleaned row lands in exactly one half, with its own price
    let mut seen = HashSet::new();
    for record in pair.train.records().iter().chain(pair.test.records()) {
        let original = data
            .records()
            .iter()
            .find(|r| *r == record)
            .expect("row comes from the input");
        assert_eq!(original.price, record.price);
        assert!(seen.insert(format!("{}|{}", record.laptop, record.price)));
    }
    assert_eq!(seen.len(), data.len());
    Ok(())
}

#[test]
fn test_fixed_seed_is_reproducible() -> Result<(), Error> {
    let data = common::cleaned_dataset();
    let partitioner = Partitioner::from_config(&SplitConfig::default())?;

    let a = partitioner.split(&data)?;
    let b = partitioner.split(&data)?;
    assert_eq!(laptops(&a.train), laptops(&b.train));
    assert_eq!(laptops(&a.test), laptops(&b.test));
    Ok(())
}

#[test]
fn test_other_seed_changes_membership() -> Result<(), Error> {
    let (_, test_a) = Partitioner::new(0.2, 42)?.split_indices(200)?;
    let (_, test_b) = Partitioner::new(0.2, 43)?.split_indices(200)?;
    assert_ne!(test_a, test_b);
    Ok(())
}

#[test]
fn test_ratio_within_one_row() -> Result<(), Error> {
    let partitioner = Partitioner::default();
    for n in [5usize, 9, 10, 11, 99, 1000, 1303] {
        let (train, test) = partitioner.split_indices(n)?;
        assert_eq!(train.len() + test.len(), n);
        let expected = 0.2 * n as f64;
        assert!((test.len() as f64 - expected).abs() < 1.0, "n = {}", n);
    }
    Ok(())
}

#[test]
fn test_empty_dataset_is_rejected() {
    let result = Partitioner::default().split(&Dataset::default());
    assert!(matches!(result, Err(Error::EmptyData(_))));
}
