//! Laptop listing tables
//!
//! Raw rows as read from the source file, the cleaned typed rows produced by
//! the [`Cleaner`](clean::Cleaner), and the column accessors the feature
//! transformer reads through.

pub mod clean;
pub mod extract;
pub mod split;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use clean::Cleaner;
pub use extract::{CpuInfo, MemoryInfo, Resolution};
pub use split::{PartitionPair, Partitioner};

/// Column names shared by the raw file, the cleaned artifacts and the transformer
pub mod columns {
    pub const LAPTOP_ID: &str = "laptop_ID";
    pub const COMPANY: &str = "Company";
    pub const PRODUCT: &str = "Product";
    pub const TYPE_NAME: &str = "TypeName";
    pub const INCHES: &str = "Inches";
    pub const SCREEN_RESOLUTION: &str = "ScreenResolution";
    pub const CPU: &str = "Cpu";
    pub const RAM: &str = "Ram";
    pub const MEMORY: &str = "Memory";
    pub const GPU: &str = "Gpu";
    pub const OP_SYS: &str = "OpSys";
    pub const WEIGHT: &str = "Weight";
    pub const PRICE: &str = "Price";
    pub const PRICE_EUROS: &str = "Price_euros";

    pub const CPU_MANUFACTURER: &str = "CPU Manufacturer";
    pub const CPU_SERIES: &str = "CPU Series";
    pub const CPU_MODEL: &str = "CPU Model";
    pub const CPU_CLOCK_SPEED: &str = "CPU Clock Speed";
    pub const CAPACITY: &str = "Capacity";
    pub const MEMORY_TYPE: &str = "MemoryType";
    pub const LAPTOP: &str = "Laptop";
    pub const WIDTH: &str = "Width";
    pub const HEIGHT: &str = "Height";

    /// Columns every raw input file must provide
    pub const REQUIRED_RAW: [&str; 11] = [
        COMPANY,
        PRODUCT,
        TYPE_NAME,
        INCHES,
        SCREEN_RESOLUTION,
        CPU,
        RAM,
        MEMORY,
        GPU,
        OP_SYS,
        WEIGHT,
    ];

    /// Raw text columns absorbed into derived fields during cleaning
    pub const ABSORBED_RAW: [&str; 6] = [CPU, MEMORY, SCREEN_RESOLUTION, COMPANY, PRODUCT, TYPE_NAME];

    pub const NUMERIC_FEATURES: [&str; 6] = [INCHES, RAM, WEIGHT, CPU_CLOCK_SPEED, WIDTH, HEIGHT];

    pub const CATEGORICAL_FEATURES: [&str; 8] = [
        GPU,
        OP_SYS,
        CPU_MANUFACTURER,
        CPU_SERIES,
        CPU_MODEL,
        CAPACITY,
        MEMORY_TYPE,
        LAPTOP,
    ];

    /// Header of the cleaned table, in the order it is written
    pub const CLEANED: [&str; 15] = [
        INCHES,
        RAM,
        GPU,
        OP_SYS,
        WEIGHT,
        PRICE,
        CPU_MANUFACTURER,
        CPU_SERIES,
        CPU_MODEL,
        CPU_CLOCK_SPEED,
        CAPACITY,
        MEMORY_TYPE,
        LAPTOP,
        WIDTH,
        HEIGHT,
    ];
}

/// One row of the source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "laptop_ID", default)]
    pub laptop_id: Option<String>,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "TypeName")]
    pub type_name: String,
    /// Missing markers such as `NA` or an empty field read as `None`
    #[serde(rename = "Inches", deserialize_with = "csv::invalid_option")]
    pub inches: Option<f64>,
    #[serde(rename = "ScreenResolution")]
    pub screen_resolution: String,
    #[serde(rename = "Cpu")]
    pub cpu: String,
    #[serde(rename = "Ram")]
    pub ram: String,
    #[serde(rename = "Memory")]
    pub memory: String,
    #[serde(rename = "Gpu")]
    pub gpu: Option<String>,
    #[serde(rename = "OpSys")]
    pub op_sys: Option<String>,
    #[serde(rename = "Weight")]
    pub weight: String,
    #[serde(rename = "Price", alias = "Price_euros")]
    pub price: f64,
}

/// Equality key for duplicate detection; the row identifier is not part of it.
#[derive(PartialEq, Eq, Hash)]
struct RowKey<'a> {
    text: [&'a str; 8],
    gpu: Option<&'a str>,
    op_sys: Option<&'a str>,
    inches: Option<u64>,
    price: u64,
}

impl RawRecord {
    fn row_key(&self) -> RowKey<'_> {
        RowKey {
            text: [
                &self.company,
                &self.product,
                &self.type_name,
                &self.screen_resolution,
                &self.cpu,
                &self.ram,
                &self.memory,
                &self.weight,
            ],
            gpu: self.gpu.as_deref(),
            op_sys: self.op_sys.as_deref(),
            inches: self.inches.map(f64::to_bits),
            price: self.price.to_bits(),
        }
    }
}

/// The raw table: rows in file order plus the header they were read with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    records: Vec<RawRecord>,
}

impl RawTable {
    /// Build a table, checking that every required column is in the header
    pub fn new(columns: Vec<String>, records: Vec<RawRecord>) -> Result<Self> {
        Self::check_schema(&columns)?;
        Ok(RawTable { columns, records })
    }

    /// Fail with `Error::Schema` naming the first required column the header lacks
    pub fn check_schema(header: &[String]) -> Result<()> {
        for required in columns::REQUIRED_RAW {
            if !header.iter().any(|c| c == required) {
                return Err(Error::Schema(required.to_string()));
            }
        }
        if !header
            .iter()
            .any(|c| c == columns::PRICE || c == columns::PRICE_EUROS)
        {
            return Err(Error::Schema(columns::PRICE.to_string()));
        }
        Ok(())
    }

    /// Build a table with the canonical header
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        let mut columns = vec![columns::LAPTOP_ID.to_string()];
        columns.extend(columns::REQUIRED_RAW.iter().map(|c| c.to_string()));
        columns.push(columns::PRICE.to_string());
        RawTable { columns, records }
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Drop the row identifier column if present
    pub fn drop_row_id(&self) -> RawTable {
        RawTable {
            columns: self
                .columns
                .iter()
                .filter(|c| c.as_str() != columns::LAPTOP_ID)
                .cloned()
                .collect(),
            records: self
                .records
                .iter()
                .map(|r| RawRecord {
                    laptop_id: None,
                    ..r.clone()
                })
                .collect(),
        }
    }

    /// Remove exact duplicate rows, keeping the first occurrence
    pub fn drop_duplicates(&self) -> RawTable {
        let mut seen = HashSet::with_capacity(self.records.len());
        let records = self
            .records
            .iter()
            .filter(|r| seen.insert(r.row_key()))
            .cloned()
            .collect();
        RawTable {
            columns: self.columns.clone(),
            records,
        }
    }
}

/// Storage technology named in the memory description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryType {
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "Flash Storage")]
    FlashStorage,
    #[serde(rename = "Hybrid")]
    Hybrid,
}

impl MemoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Ssd => "SSD",
            MemoryType::Hdd => "HDD",
            MemoryType::FlashStorage => "Flash Storage",
            MemoryType::Hybrid => "Hybrid",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "SSD" => Some(MemoryType::Ssd),
            "HDD" => Some(MemoryType::Hdd),
            "Flash Storage" => Some(MemoryType::FlashStorage),
            "Hybrid" => Some(MemoryType::Hybrid),
            _ => None,
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleaned, typed row
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub inches: Option<f64>,
    pub ram: u32,
    pub gpu: Option<String>,
    pub op_sys: Option<String>,
    pub weight: f64,
    pub price: f64,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub laptop: String,
    pub resolution: Option<Resolution>,
}

impl CleanedRecord {
    /// Numeric feature by column name; `None` when the value is absent or
    /// not finite
    pub fn numeric(&self, column: &str) -> Result<Option<f64>> {
        let value = match column {
            columns::INCHES => self.inches,
            columns::RAM => Some(self.ram as f64),
            columns::WEIGHT => Some(self.weight),
            columns::CPU_CLOCK_SPEED => self.cpu.clock_ghz,
            columns::WIDTH => self.resolution.map(|r| r.width as f64),
            columns::HEIGHT => self.resolution.map(|r| r.height as f64),
            other => return Err(Error::Schema(other.to_string())),
        };
        Ok(value.filter(|v| v.is_finite()))
    }

    /// Categorical feature by column name; `None` when the value is absent
    pub fn categorical(&self, column: &str) -> Result<Option<String>> {
        let value = match column {
            columns::GPU => self.gpu.clone(),
            columns::OP_SYS => self.op_sys.clone(),
            columns::CPU_MANUFACTURER => self.cpu.manufacturer.clone(),
            columns::CPU_SERIES => self.cpu.series.clone(),
            columns::CPU_MODEL => self.cpu.model.clone(),
            columns::CAPACITY => self.memory.capacity.clone(),
            columns::MEMORY_TYPE => self.memory.memory_type.map(|m| m.to_string()),
            columns::LAPTOP => Some(self.laptop.clone()),
            other => return Err(Error::Schema(other.to_string())),
        };
        Ok(value)
    }
}

pub fn is_numeric_feature(column: &str) -> bool {
    columns::NUMERIC_FEATURES.contains(&column)
}

pub fn is_categorical_feature(column: &str) -> bool {
    columns::CATEGORICAL_FEATURES.contains(&column)
}

/// Ordered collection of cleaned rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<CleanedRecord>,
}

impl Dataset {
    pub fn new(records: Vec<CleanedRecord>) -> Self {
        Dataset { records }
    }

    pub fn records(&self) -> &[CleanedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CleanedRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header of the cleaned table
    pub fn column_names(&self) -> Vec<&'static str> {
        columns::CLEANED.to_vec()
    }

    /// Rows at the given positions, in the given order
    pub fn select(&self, indices: &[usize]) -> Result<Dataset> {
        let records = indices
            .iter()
            .map(|&i| {
                self.records.get(i).cloned().ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "row index {} out of bounds for {} rows",
                        i,
                        self.records.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Dataset { records })
    }

    pub fn numeric_column(&self, column: &str) -> Result<Vec<Option<f64>>> {
        if !is_numeric_feature(column) {
            return Err(Error::Schema(column.to_string()));
        }
        self.records.iter().map(|r| r.numeric(column)).collect()
    }

    pub fn categorical_column(&self, column: &str) -> Result<Vec<Option<String>>> {
        if !is_categorical_feature(column) {
            return Err(Error::Schema(column.to_string()));
        }
        self.records.iter().map(|r| r.categorical(column)).collect()
    }

    /// Target values (price)
    pub fn target(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }
}
