use crate::domain::ports::GridDecoder;
use crate::utils::error::{MenuError, Result};

/// Reads a CSV export of the week sheet into a grid.
#[derive(Debug, Clone)]
pub struct CsvGridDecoder {
    delimiter: u8,
}

impl Default for CsvGridDecoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvGridDecoder {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl GridDecoder for CsvGridDecoder {
    fn decode(&self, bytes: &[u8], encoding: &str) -> Result<Vec<Vec<String>>> {
        if !encoding.eq_ignore_ascii_case("utf-8") && !encoding.eq_ignore_ascii_case("utf8") {
            return Err(MenuError::DecodeError {
                message: format!("Unsupported text encoding: {}", encoding),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(bytes);

        let mut grid = Vec::new();
        for record in reader.byte_records() {
            let record = record.map_err(|e| MenuError::DecodeError {
                message: format!("CSV processing error: {}", e),
            })?;
            grid.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }

        Ok(grid)
    }
}
