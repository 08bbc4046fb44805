//! Encapsulates plaintext and gzip-compressed file input and output.
//!
//! Genetic map files and interval data files are both line-oriented TSV and
//! may arrive gzip-compressed; [`InputFile`] and [`OutputFile`] hide the
//! difference behind a common reader/writer interface.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::io::{self, BufWriter};
use std::io::{BufReader, Read};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
}

/// Check if a file is gzipped by looking for the magic numbers.
fn is_gzipped_file(file_path: &str) -> io::Result<bool> {
    let mut file = File::open(file_path)?;
    let mut buffer = [0; 2];
    let n = file.read(&mut buffer)?;
    Ok(n == 2 && buffer == [0x1f, 0x8b])
}

/// Represents an input file.
///
/// Compression is detected from the file contents rather than the extension,
/// so `map.txt` and `map.txt.gz` read through the same interface.
pub struct InputFile {
    pub filepath: String,
}

impl InputFile {
    pub fn new(filepath: &str) -> Self {
        Self {
            filepath: filepath.to_string(),
        }
    }

    /// Opens the file and returns a buffered reader, transparently
    /// decompressing gzip input.
    pub fn reader(&self) -> Result<BufReader<Box<dyn Read>>, FileError> {
        let file = File::open(self.filepath.clone())?;
        let is_gzipped = is_gzipped_file(&self.filepath)?;
        let reader: Box<dyn Read> = if is_gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }
}

/// Represents an output file.
///
/// A `.gz` extension on the path selects gzip-compressed output.
pub struct OutputFile {
    pub filepath: String,
}

impl OutputFile {
    pub fn new(filepath: &str) -> Self {
        Self {
            filepath: filepath.to_string(),
        }
    }

    /// Opens the file and returns a buffered writer, compressing if the
    /// path ends with ".gz".
    pub fn writer(&self) -> Result<Box<dyn Write>, io::Error> {
        let outfile = &self.filepath;
        let is_gzip = outfile.ends_with(".gz");
        let writer: Box<dyn Write> = if is_gzip {
            Box::new(BufWriter::new(GzEncoder::new(
                File::create(outfile)?,
                Compression::default(),
            )))
        } else {
            Box::new(BufWriter::new(File::create(outfile)?))
        };
        Ok(writer)
    }
}
