//! Streaming conversion of interval data records to genetic spans.
//!
//! Each input line carries a physical span (chromosome plus start/end base
//! pair positions); the line is echoed to the output with one appended
//! tab-separated field holding the genetic span in centimorgans, computed
//! either from a flat bases-per-centimorgan ratio or by interpolating both
//! endpoints against a loaded [`GeneticMap`].

use log::warn;
use std::io::{BufRead, Write};

use crate::file::{InputFile, OutputFile};
use crate::gpm::{GeneticMap, GpmError, MapFloat, Position};

/// Minimum number of fields in an interval data record.
const MIN_FIELDS: usize = 7;
const CHROM_FIELD: usize = 4;
const START_FIELD: usize = 5;
const END_FIELD: usize = 6;

/// A parsed interval data record: the physical span of one input line.
#[derive(Debug, Clone, PartialEq)]
struct SpanRecord {
    chrom: String,
    start: Position,
    end: Position,
}

/// Parse the chromosome and span fields out of an interval data line.
///
/// A malformed line (too few fields, unparseable position) is an error that
/// halts the whole stream; bad records are not skipped.
fn parse_span_record(line: &str) -> Result<SpanRecord, GpmError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_FIELDS {
        return Err(GpmError::FormatError {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }
    let start: Position = fields[START_FIELD].parse().map_err(|_| GpmError::ParseError {
        column: "interval start",
        value: fields[START_FIELD].to_string(),
    })?;
    let end: Position = fields[END_FIELD].parse().map_err(|_| GpmError::ParseError {
        column: "interval end",
        value: fields[END_FIELD].to_string(),
    })?;
    Ok(SpanRecord {
        chrom: fields[CHROM_FIELD].to_string(),
        start,
        end,
    })
}

/// Converts the physical spans of an interval data file to genetic spans.
pub struct SpanEstimator {
    input: String,
    output: String,
}

impl SpanEstimator {
    pub fn new(input: &str, output: &str) -> Self {
        Self {
            input: input.to_string(),
            output: output.to_string(),
        }
    }

    /// Flat-ratio mode: append `(end - start) / bases_per_cm` to every line.
    pub fn estimate(&self, bases_per_cm: u64) -> Result<(), GpmError> {
        let reader = InputFile::new(&self.input).reader()?;
        let mut writer = OutputFile::new(&self.output).writer()?;

        for result in reader.lines() {
            let line = result?;
            let record = parse_span_record(&line)?;
            let span =
                (record.end as MapFloat - record.start as MapFloat) / bases_per_cm as MapFloat;
            writeln!(writer, "{}\t{}", line, span)?;
        }
        Ok(())
    }

    /// Map mode: interpolate both span endpoints against `gmap` and append
    /// the difference of their genetic positions.
    ///
    /// A span endpoint outside the map's covered range skips that record
    /// with a warning and processing continues; every other error halts the
    /// run.
    pub fn interpolate(&self, gmap: &GeneticMap) -> Result<(), GpmError> {
        let reader = InputFile::new(&self.input).reader()?;
        let mut writer = OutputFile::new(&self.output).writer()?;

        for result in reader.lines() {
            let line = result?;
            let record = parse_span_record(&line)?;
            let cm_end = match gmap.interpolate(&record.chrom, record.end) {
                Ok(cm) => cm,
                Err(err @ GpmError::NoIntervalFound(..)) => {
                    warn!("skipping record: {}", err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let cm_start = match gmap.interpolate(&record.chrom, record.start) {
                Ok(cm) => cm,
                Err(err @ GpmError::NoIntervalFound(..)) => {
                    warn!("skipping record: {}", err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            writeln!(writer, "{}\t{}", line, cm_end - cm_start)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_lines(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn two_locus_map() -> GeneticMap {
        let file = write_lines("chr1\tm1\t0.0\t1000\nchr1\tm2\t5.0\t2000\n");
        GeneticMap::from_path(file.path().to_str().unwrap()).unwrap()
    }

    fn data_line(chrom: &str, start: &str, end: &str) -> String {
        // interval data records carry four leading fields before the span
        format!("f0\tf1\tf2\tf3\t{}\t{}\t{}", chrom, start, end)
    }

    #[test]
    fn test_parse_span_record() {
        let record = parse_span_record(&data_line("chr1", "1000", "2000")).unwrap();
        assert_eq!(
            record,
            SpanRecord {
                chrom: "chr1".to_string(),
                start: 1000,
                end: 2000,
            }
        );
    }

    #[test]
    fn test_parse_span_record_too_few_fields() {
        assert!(matches!(
            parse_span_record("a\tb\tc"),
            Err(GpmError::FormatError {
                expected: 7,
                found: 3
            })
        ));
    }

    #[test]
    fn test_estimate_flat_ratio() {
        let input = write_lines(&(data_line("chr7", "1000000", "3000000") + "\n"));
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.tsv");

        SpanEstimator::new(
            input.path().to_str().unwrap(),
            output.to_str().unwrap(),
        )
        .estimate(1000000)
        .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, data_line("chr7", "1000000", "3000000") + "\t2\n");
    }

    #[test]
    fn test_interpolate_genetic_span() {
        let gmap = two_locus_map();
        let input = write_lines(&(data_line("chr1", "1000", "2000") + "\n"));
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.tsv");

        SpanEstimator::new(
            input.path().to_str().unwrap(),
            output.to_str().unwrap(),
        )
        .interpolate(&gmap)
        .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, data_line("chr1", "1000", "2000") + "\t5\n");
    }

    #[test]
    fn test_interpolate_skips_unmapped_record() {
        let gmap = two_locus_map();
        let lines = [
            data_line("chrX", "1000", "2000"),
            data_line("chr1", "1000", "1500"),
        ]
        .join("\n");
        let input = write_lines(&(lines + "\n"));
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.tsv");

        SpanEstimator::new(
            input.path().to_str().unwrap(),
            output.to_str().unwrap(),
        )
        .interpolate(&gmap)
        .unwrap();

        // the chrX record is dropped, the chr1 record still processed
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, data_line("chr1", "1000", "1500") + "\t2.5\n");
    }

    #[test]
    fn test_interpolate_malformed_record_halts() {
        let gmap = two_locus_map();
        let lines = [
            data_line("chr1", "1000", "not-a-number"),
            data_line("chr1", "1000", "1500"),
        ]
        .join("\n");
        let input = write_lines(&(lines + "\n"));
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.tsv");

        let result = SpanEstimator::new(
            input.path().to_str().unwrap(),
            output.to_str().unwrap(),
        )
        .interpolate(&gmap);

        assert!(matches!(result, Err(GpmError::ParseError { .. })));
    }

    #[test]
    fn test_estimate_missing_input_is_fatal() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.tsv");
        let result = SpanEstimator::new("no-such-file.tsv", output.to_str().unwrap())
            .estimate(1000000);
        assert!(matches!(result, Err(GpmError::FileError(..))));
    }
}
