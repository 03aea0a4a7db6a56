use std::convert::TryFrom;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};

use crate::dataset::{
    columns, CleanedRecord, CpuInfo, Dataset, MemoryInfo, MemoryType, RawRecord, RawTable,
    Resolution,
};
use crate::error::{Error, Result};

/// 生データのCSVファイルを読み込む
///
/// ヘッダーに必須列が揃っていない場合は、行を読む前に `Error::Schema` を返す。
pub fn read_raw_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;
    read_raw_csv_from_reader(file)
}

/// 任意のリーダーから生データを読み込む
pub fn read_raw_csv_from_reader<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(Error::Csv)?.clone();
    let column_names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

    // スキーマを先に検証する
    RawTable::check_schema(&column_names)?;

    let mut records = Vec::new();
    for result in rdr.deserialize::<RawRecord>() {
        records.push(result.map_err(Error::Csv)?);
    }

    RawTable::new(column_names, records)
}

/// クリーニング済みテーブルのCSV上の1行
#[derive(Debug, Serialize, Deserialize)]
struct CleanedRow {
    #[serde(rename = "Inches")]
    inches: Option<f64>,
    #[serde(rename = "Ram")]
    ram: u32,
    #[serde(rename = "Gpu")]
    gpu: Option<String>,
    #[serde(rename = "OpSys")]
    op_sys: Option<String>,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "CPU Manufacturer")]
    cpu_manufacturer: Option<String>,
    #[serde(rename = "CPU Series")]
    cpu_series: Option<String>,
    #[serde(rename = "CPU Model")]
    cpu_model: Option<String>,
    #[serde(rename = "CPU Clock Speed")]
    cpu_clock_speed: Option<f64>,
    #[serde(rename = "Capacity")]
    capacity: Option<String>,
    #[serde(rename = "MemoryType")]
    memory_type: Option<String>,
    #[serde(rename = "Laptop")]
    laptop: String,
    #[serde(rename = "Width")]
    width: Option<u32>,
    #[serde(rename = "Height")]
    height: Option<u32>,
}

impl From<&CleanedRecord> for CleanedRow {
    fn from(record: &CleanedRecord) -> Self {
        CleanedRow {
            inches: record.inches,
            ram: record.ram,
            gpu: record.gpu.clone(),
            op_sys: record.op_sys.clone(),
            weight: record.weight,
            price: record.price,
            cpu_manufacturer: record.cpu.manufacturer.clone(),
            cpu_series: record.cpu.series.clone(),
            cpu_model: record.cpu.model.clone(),
            cpu_clock_speed: record.cpu.clock_ghz,
            capacity: record.memory.capacity.clone(),
            memory_type: record.memory.memory_type.map(|m| m.to_string()),
            laptop: record.laptop.clone(),
            width: record.resolution.map(|r| r.width),
            height: record.resolution.map(|r| r.height),
        }
    }
}

impl TryFrom<CleanedRow> for CleanedRecord {
    type Error = Error;

    fn try_from(row: CleanedRow) -> Result<Self> {
        // 幅と高さは必ず組で存在する
        let resolution = match (row.width, row.height) {
            (Some(width), Some(height)) => Some(Resolution { width, height }),
            (None, None) => None,
            (Some(width), None) => {
                return Err(Error::parse(
                    columns::HEIGHT,
                    "",
                    format!("width {} present without height", width),
                ))
            }
            (None, Some(height)) => {
                return Err(Error::parse(
                    columns::WIDTH,
                    "",
                    format!("height {} present without width", height),
                ))
            }
        };

        let memory_type = match row.memory_type {
            Some(label) => Some(MemoryType::from_label(&label).ok_or_else(|| {
                Error::parse(columns::MEMORY_TYPE, &label, "unknown memory type")
            })?),
            None => None,
        };

        Ok(CleanedRecord {
            inches: row.inches,
            ram: row.ram,
            gpu: row.gpu,
            op_sys: row.op_sys,
            weight: row.weight,
            price: row.price,
            cpu: CpuInfo {
                manufacturer: row.cpu_manufacturer,
                series: row.cpu_series,
                model: row.cpu_model,
                clock_ghz: row.cpu_clock_speed,
            },
            memory: MemoryInfo {
                capacity: row.capacity,
                memory_type,
            },
            laptop: row.laptop,
            resolution,
        })
    }
}

/// クリーニング済みテーブルをCSVファイルに書き込む
///
/// 親ディレクトリが存在しない場合は作成する。
pub fn write_dataset_csv<P: AsRef<Path>>(data: &Dataset, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(Error::Io)?;
        }
    }
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    write_dataset_csv_to_writer(data, file)
}

/// 任意のライターにクリーニング済みテーブルを書き込む
pub fn write_dataset_csv_to_writer<W: Write>(data: &Dataset, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    // 行がない場合もヘッダーは書き出す
    if data.is_empty() {
        wtr.write_record(columns::CLEANED).map_err(Error::Csv)?;
    }

    for record in data.records() {
        wtr.serialize(CleanedRow::from(record)).map_err(Error::Csv)?;
    }

    wtr.flush().map_err(Error::Io)?;
    Ok(())
}

/// クリーニング済みテーブルをCSVファイルから読み込む
pub fn read_dataset_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;
    read_dataset_csv_from_reader(file)
}

/// 任意のリーダーからクリーニング済みテーブルを読み込む
pub fn read_dataset_csv_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers().map_err(Error::Csv)?.clone();
    for required in columns::CLEANED {
        if !headers.iter().any(|h| h == required) {
            return Err(Error::Schema(required.to_string()));
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize::<CleanedRow>() {
        let row = result.map_err(Error::Csv)?;
        records.push(CleanedRecord::try_from(row)?);
    }
    Ok(Dataset::new(records))
}
