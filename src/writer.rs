use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;
use serde::Serialize;
use serde_jsonlines::JsonLinesWriter;

use crate::errors::StatsError;

/// Write every row as one JSON document per line, returning the number of rows written
pub fn write_json_lines<T: Serialize>(file: &Path, rows: &[T]) -> Result<usize, StatsError> {
    let output_file = File::create(file).map_err(|e| StatsError::WriterError { source: e })?;
    let mut writer = JsonLinesWriter::new(BufWriter::new(output_file));
    for row in rows {
        writer
            .write(row)
            .map_err(|e| StatsError::WriterError { source: e })?;
    }
    writer
        .flush()
        .map_err(|e| StatsError::WriterError { source: e })?;
    info!("Wrote {} rows to {:?}", rows.len(), file);
    Ok(rows.len())
}

/// Pretty-printed JSON of a single value, as printed by the CLI
pub fn write_json<T: Serialize, W: Write>(out: &mut W, value: &T) -> Result<(), StatsError> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|e| StatsError::OutputSerializeError { source: e })?;
    writeln!(out).map_err(|e| StatsError::WriterError { source: e })
}
