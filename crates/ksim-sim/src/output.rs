use std::error::Error;
use std::fs;
use std::path::Path;

use csv::{Writer, WriterBuilder};

pub fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Opens a CSV writer whose records may vary in length.
pub fn csv_writer(path: &Path) -> Result<Writer<fs::File>, Box<dyn Error>> {
    Ok(WriterBuilder::new().flexible(true).from_path(path)?)
}
