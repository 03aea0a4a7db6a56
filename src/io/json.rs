use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// 値をJSONファイルに保存する
///
/// 親ディレクトリが存在しない場合は作成する。
pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(Error::Io)?;
        }
    }
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(Error::Json)?;
    writer.flush().map_err(Error::Io)?;
    Ok(())
}

/// JSONファイルから値を読み込む
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(Error::Json)
}
