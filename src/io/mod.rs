pub mod csv;
pub mod json;

// Re-export commonly used functions
pub use csv::{
    read_dataset_csv, read_dataset_csv_from_reader, read_raw_csv, read_raw_csv_from_reader,
    write_dataset_csv, write_dataset_csv_to_writer,
};
pub use json::{read_json, write_json};
