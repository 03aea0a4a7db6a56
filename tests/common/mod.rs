//! Common test utilities module
//!
//! Shared fixtures for the integration tests: a small synthetic listing
//! file and helpers to turn it into raw and cleaned tables.

#![allow(dead_code)]

use std::path::Path;

use laptop_price::config::PipelineConfig;
use laptop_price::dataset::{Cleaner, Dataset, RawTable};
use laptop_price::io::read_raw_csv_from_reader;

/// Ten distinct listings in the layout of the source file
pub const RAW_CSV: &str = "\
laptop_ID,Company,Product,TypeName,Inches,ScreenResolution,Cpu,Ram,Memory,Gpu,OpSys,Weight,Price_euros
1,Apple,MacBook Pro,Ultrabook,13.3,IPS Panel Retina Display 2560x1600,Intel Core i5 2.3GHz,8GB,128GB SSD,Intel Iris Plus Graphics 640,macOS,1.37kg,1339.69
2,Apple,Macbook Air,Ultrabook,13.3,1440x900,Intel Core i5 1.8GHz,8GB,128GB Flash Storage,Intel HD Graphics 6000,macOS,1.34kg,898.94
3,HP,250 G6,Notebook,15.6,Full HD 1920x1080,Intel Core i5 7200U 2.5GHz,8GB,256GB SSD,Intel HD Graphics 620,No OS,1.86kg,575.00
4,Apple,MacBook Pro,Ultrabook,15.4,IPS Panel Retina Display 2880x1800,Intel Core i7 2.7GHz,16GB,512GB SSD,AMD Radeon Pro 455,macOS,1.83kg,2537.45
5,Acer,Aspire 3,Notebook,15.6,1366x768,AMD A9-Series 9420 3GHz,4GB,500GB HDD,AMD Radeon R5,Windows 10,2.1kg,400.00
6,Dell,Inspiron 3567,Notebook,15.6,Full HD 1920x1080,Intel Core i3 6006U 2GHz,4GB,1TB HDD,AMD Radeon R5 M430,Windows 10,2.2kg,498.90
7,Asus,ZenBook UX430UN,Ultrabook,14.0,Full HD 1920x1080,Intel Core i7 8550U 1.8GHz,16GB,512GB SSD,Nvidia GeForce MX150,Windows 10,1.3kg,1495.00
8,Lenovo,IdeaPad 320-15IKB,Notebook,15.6,Full HD 1920x1080,Intel Core i5 8250U 1.6GHz,8GB,1TB HDD,Nvidia GeForce MX150,No OS,2.2kg,770.00
9,HP,Pavilion x360,2 in 1 Convertible,14.0,Full HD / Touchscreen 1920x1080,Intel Core i3 7100U 2.4GHz,4GB,128GB SSD +  1TB HDD,Intel HD Graphics 620,Windows 10,1.68kg,699.00
10,MSI,GS73VR 7RG,Gaming,17.3,Full HD 1920x1080,Intel Core i7 7700HQ 2.8GHz,16GB,256GB SSD +  1TB HDD,Nvidia GeForce GTX 1070,Windows 10,2.43kg,2449.00
";

/// The fixture with rows 2 and 5 repeated under new identifiers
pub fn raw_csv_with_duplicates() -> String {
    let mut text = RAW_CSV.to_string();
    text.push_str("11,Apple,Macbook Air,Ultrabook,13.3,1440x900,Intel Core i5 1.8GHz,8GB,128GB Flash Storage,Intel HD Graphics 6000,macOS,1.34kg,898.94\n");
    text.push_str("12,Acer,Aspire 3,Notebook,15.6,1366x768,AMD A9-Series 9420 3GHz,4GB,500GB HDD,AMD Radeon R5,Windows 10,2.1kg,400.00\n");
    text
}

pub fn raw_table() -> RawTable {
    read_raw_csv_from_reader(RAW_CSV.as_bytes()).expect("fixture parses")
}

pub fn cleaned_dataset() -> Dataset {
    Cleaner::new().clean(&raw_table()).expect("fixture cleans")
}

/// Default configuration with every artifact written under `dir`
pub fn config_in(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.ingestion = config.ingestion.with_artifacts_dir(dir);
    config.ingestion.source_path = dir.join("laptop_price.csv");
    config.transformation.preprocessor_path = dir.join("preprocessor.json");
    config.model.n_estimators = 10;
    config
}
