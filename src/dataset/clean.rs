//! Dataset cleaning
//!
//! Turns the raw listing table into a [`Dataset`] of typed rows.

use log::{error, info};

use super::extract::{extract_cpu, extract_memory, extract_ram, extract_resolution, extract_weight};
use super::{CleanedRecord, Dataset, RawRecord, RawTable};
use crate::error::Result;

/// Applies the field extractors to every row of a raw table
#[derive(Debug, Clone, Copy, Default)]
pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Cleaner
    }

    /// Clean a raw table.
    ///
    /// Steps, in order: drop the row identifier, drop exact duplicate rows,
    /// extract the derived fields, build the `Laptop` identifier (company,
    /// type and product concatenated without a separator) and leave every
    /// absorbed raw column behind.
    ///
    /// # Arguments
    /// * `raw` - Table read from the source file; not modified
    ///
    /// # Returns
    /// * `Result<Dataset>` - Cleaned rows, or the first RAM/weight parse error
    pub fn clean(&self, raw: &RawTable) -> Result<Dataset> {
        info!("Cleaning {} raw rows", raw.len());

        let deduplicated = raw.drop_row_id().drop_duplicates();
        let dropped = raw.len() - deduplicated.len();
        if dropped > 0 {
            info!("Dropped {} duplicate rows", dropped);
        }

        let mut records = Vec::with_capacity(deduplicated.len());
        for (row, record) in deduplicated.records().iter().enumerate() {
            match self.clean_record(record) {
                Ok(cleaned) => records.push(cleaned),
                Err(e) => {
                    error!("Cleaning failed at row {}: {}", row, e);
                    return Err(e);
                }
            }
        }

        info!("Cleaned dataset has {} rows", records.len());
        Ok(Dataset::new(records))
    }

    /// Clean a single row
    pub fn clean_record(&self, record: &RawRecord) -> Result<CleanedRecord> {
        let ram = extract_ram(&record.ram)?;
        let weight = extract_weight(&record.weight)?;

        Ok(CleanedRecord {
            inches: record.inches.filter(|v| v.is_finite()),
            ram,
            gpu: record.gpu.clone(),
            op_sys: record.op_sys.clone(),
            weight,
            price: record.price,
            cpu: extract_cpu(&record.cpu),
            memory: extract_memory(&record.memory),
            laptop: format!("{}{}{}", record.company, record.type_name, record.product),
            resolution: extract_resolution(&record.screen_resolution),
        })
    }
}
