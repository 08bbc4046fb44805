use csv::{ReaderBuilder, StringRecord};
use genomap::{GenomeMap, GenomeMapError};
use indexmap::IndexMap;
use ndarray::Array1;
use rust_lapper::{Interval, Lapper};
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use super::file::{FileError, InputFile};
use super::numeric::lerp;

/// The integer type for genomic (physical, base-pair) positions.
pub type Position = u64;

/// The float type for genetic (centimorgan) map positions.
pub type MapFloat = f64;

/// Number of fields in a genetic map record.
const MAP_RECORD_FIELDS: usize = 4;

#[derive(Error, Debug)]
pub enum GpmError {
    #[error("IO error: {0}")]
    IOError(#[from] io::Error),
    #[error("file reading error: {0}")]
    FileError(#[from] FileError),
    #[error("genetic map parsing error: {0}")]
    MapParsingError(#[from] csv::Error),
    #[error("found improper number of fields in record: {found} (need {expected})")]
    FormatError { expected: usize, found: usize },
    #[error("failed to parse {column} from string: {value}")]
    ParseError { column: &'static str, value: String },
    #[error("loci out of order on {chrom}: {prev} > {current}")]
    OrderingError {
        chrom: String,
        prev: Position,
        current: Position,
    },
    #[error("chromosome mismatch: {0} vs {1}")]
    ChromMismatch(String, String),
    #[error("failed to add interval {chrom}:{start}-{end}")]
    InsertionFailure {
        chrom: String,
        start: Position,
        end: Position,
    },
    #[error("no intersecting interval found for {0}:{1}")]
    NoIntervalFound(String, Position),
    #[error("GenomeMap error: {0}")]
    GenomeMapError(#[from] GenomeMapError),
}

/// One genetic map record: a marker with both a physical and a genetic
/// coordinate on a chromosome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locus {
    pub chrom: String,
    /// Physical position in base pairs.
    pub position: Position,
    /// Genetic map position in centimorgans.
    pub genetic_position: MapFloat,
}

impl Locus {
    /// Parse a genetic map record.
    ///
    /// The expected columns are chromosome, marker label, genetic position
    /// (cM), and physical position (bp). The label column is unused and the
    /// chromosome name is accepted as-is.
    pub fn from_record(record: &StringRecord) -> Result<Locus, GpmError> {
        if record.len() != MAP_RECORD_FIELDS {
            return Err(GpmError::FormatError {
                expected: MAP_RECORD_FIELDS,
                found: record.len(),
            });
        }
        let genetic_position: MapFloat = record[2].parse().map_err(|_| GpmError::ParseError {
            column: "genetic position",
            value: record[2].to_string(),
        })?;
        let position: Position = record[3].parse().map_err(|_| GpmError::ParseError {
            column: "physical position",
            value: record[3].to_string(),
        })?;
        Ok(Locus {
            chrom: record[0].to_string(),
            position,
            genetic_position,
        })
    }
}

/// A physical span on one chromosome bounded by two consecutive loci, with
/// the genetic map positions of the bounding loci at its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomicInterval {
    pub chrom: String,
    /// Start position in base pairs, inclusive.
    pub start: Position,
    /// End position in base pairs.
    pub end: Position,
    /// Genetic map position at `start`, in centimorgans.
    pub genetic_start: MapFloat,
    /// Genetic map position at `end`, in centimorgans.
    pub genetic_end: MapFloat,
}

impl GenomicInterval {
    /// Build the interval between two consecutive same-chromosome loci.
    ///
    /// Loci on different chromosomes or with decreasing physical positions
    /// are construction errors; input order is trusted, never re-sorted.
    pub fn from_loci(prev: &Locus, current: &Locus) -> Result<GenomicInterval, GpmError> {
        if prev.chrom != current.chrom {
            return Err(GpmError::ChromMismatch(
                prev.chrom.clone(),
                current.chrom.clone(),
            ));
        }
        if prev.position > current.position {
            return Err(GpmError::OrderingError {
                chrom: prev.chrom.clone(),
                prev: prev.position,
                current: current.position,
            });
        }
        Ok(GenomicInterval {
            chrom: prev.chrom.clone(),
            start: prev.position,
            end: current.position,
            genetic_start: prev.genetic_position,
            genetic_end: current.genetic_position,
        })
    }
}

/// Tree payload: the genetic map positions at an interval's endpoints.
///
/// This is the only data the overlap structure carries; chromosome identity
/// lives in the forest key and domain semantics stay in [`GenomicInterval`].
#[derive(Debug, Clone, PartialEq)]
struct GeneticSpan {
    start: MapFloat,
    end: MapFloat,
}

// Lapper requires Eq on the payload; the map positions are plain data here
// and are never compared as keys.
impl Eq for GeneticSpan {}

/// One chromosome's interval tree plus its locus count.
pub struct ChromosomeTree {
    tree: Lapper<Position, GeneticSpan>,
    n_loci: usize,
}

impl Default for ChromosomeTree {
    fn default() -> Self {
        Self {
            tree: Lapper::new(Vec::new()),
            n_loci: 0,
        }
    }
}

/// Per-chromosome interval trees over the physical axis.
///
/// Mutable while a genetic map is being loaded; read-only afterward. Each
/// interval is owned by exactly one chromosome's tree, so interval identity
/// (derived from `start`) is only unique within a chromosome.
pub struct ChromosomeForest {
    trees: GenomeMap<ChromosomeTree>,
}

impl Default for ChromosomeForest {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromosomeForest {
    pub fn new() -> Self {
        Self {
            trees: GenomeMap::new(),
        }
    }

    /// Begin a fresh chromosome seeded with its first locus.
    ///
    /// Map files are expected grouped by chromosome; revisiting a chromosome
    /// surfaces the underlying `GenomeMap` error.
    pub fn begin_chromosome(&mut self, locus: &Locus) -> Result<(), GpmError> {
        let tree = ChromosomeTree {
            tree: Lapper::new(Vec::new()),
            n_loci: 1,
        };
        self.trees.insert(&locus.chrom, tree)?;
        Ok(())
    }

    /// Add an interval to its chromosome's tree, creating the tree on first
    /// use.
    ///
    /// The closed physical span `[start, end]` is stored half-open as
    /// `[start, end + 1)` so a point probe lands inside the interval at
    /// either endpoint. Fails with [`GpmError::InsertionFailure`] if the
    /// tree's element count did not grow.
    pub fn insert(&mut self, interval: GenomicInterval) -> Result<(), GpmError> {
        let entry = self.trees.entry_or_default(&interval.chrom);
        let before = entry.tree.len();
        entry.tree.insert(Interval {
            start: interval.start,
            stop: interval.end + 1,
            val: GeneticSpan {
                start: interval.genetic_start,
                end: interval.genetic_end,
            },
        });
        if entry.tree.len() != before + 1 {
            return Err(GpmError::InsertionFailure {
                chrom: interval.chrom,
                start: interval.start,
                end: interval.end,
            });
        }
        entry.n_loci += 1;
        Ok(())
    }

    /// Find the interval covering `position` on `chrom`.
    ///
    /// The probe is the degenerate range `[position, position + 1)`. Built
    /// maps hold a non-overlapping partition per chromosome, but when a probe
    /// lands on a shared endpoint (or overlapping intervals were inserted
    /// directly) the interval with the smallest `start` is selected, so
    /// results are deterministic.
    pub fn query(&self, chrom: &str, position: Position) -> Option<GenomicInterval> {
        let entry = self.trees.get(chrom)?;
        entry
            .tree
            .find(position, position + 1)
            .min_by_key(|iv| iv.start)
            .map(|iv| GenomicInterval {
                chrom: chrom.to_string(),
                start: iv.start,
                end: iv.stop - 1,
                genetic_start: iv.val.start,
                genetic_end: iv.val.end,
            })
    }

    /// Total interval count across all chromosomes.
    pub fn num_intervals(&self) -> usize {
        self.trees.iter().map(|(_, entry)| entry.tree.len()).sum()
    }

    /// Total locus count across all chromosomes.
    pub fn num_loci(&self) -> usize {
        self.trees.iter().map(|(_, entry)| entry.n_loci).sum()
    }

    /// Number of chromosomes in the forest.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-chromosome `(intervals, loci)` counts, in map order. Diagnostic
    /// reporting only.
    pub fn summary(&self) -> IndexMap<String, (usize, usize)> {
        self.trees
            .iter()
            .map(|(chrom, entry)| (chrom.clone(), (entry.tree.len(), entry.n_loci)))
            .collect()
    }
}

/// A loaded genetic map supporting physical→genetic interpolation queries.
///
/// Built once by streaming a genetic map file; immutable afterward, so
/// queries never race loading.
pub struct GeneticMap {
    forest: ChromosomeForest,
}

impl GeneticMap {
    /// Load a genetic map from a tab-delimited file.
    ///
    /// Each line is `chromosome`, `label`, `genetic position (cM)`,
    /// `physical position (bp)`, with no header row. Lines must be grouped
    /// by chromosome, with physical positions non-decreasing within each
    /// chromosome. Gzip-compressed input is detected automatically.
    ///
    /// The file is scanned once: each adjacent same-chromosome locus pair
    /// becomes one interval, and a chromosome change starts a fresh tree.
    /// The first locus of a new chromosome is never connected backward to
    /// the previous chromosome's last locus. Any malformed record, ordering
    /// violation, or insertion failure aborts the whole load.
    pub fn from_path(filepath: &str) -> Result<GeneticMap, GpmError> {
        let input_file = InputFile::new(filepath);
        let buf_reader = input_file.reader()?;

        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(buf_reader);

        let mut forest = ChromosomeForest::new();
        let mut prev: Option<Locus> = None;

        for result in rdr.records() {
            let record = result?;
            let locus = Locus::from_record(&record)?;
            match prev {
                Some(ref p) if p.chrom == locus.chrom => {
                    forest.insert(GenomicInterval::from_loci(p, &locus)?)?;
                }
                _ => forest.begin_chromosome(&locus)?,
            }
            prev = Some(locus);
        }

        Ok(GeneticMap { forest })
    }

    /// Interpolate the genetic map position at a physical position.
    ///
    /// Locates the enclosing interval and linearly interpolates between its
    /// endpoint map positions. Fails with [`GpmError::NoIntervalFound`] when
    /// the position lies outside the map's covered range for that chromosome
    /// or the chromosome is unknown.
    pub fn interpolate(&self, chrom: &str, position: Position) -> Result<MapFloat, GpmError> {
        let interval = self
            .forest
            .query(chrom, position)
            .ok_or_else(|| GpmError::NoIntervalFound(chrom.to_string(), position))?;
        Ok(lerp(
            interval.start as MapFloat,
            interval.end as MapFloat,
            position as MapFloat,
            interval.genetic_start,
            interval.genetic_end,
        ))
    }

    /// Interpolate the genetic map position at each of the supplied physical
    /// positions, failing on the first uncovered position.
    pub fn interpolate_positions(
        &self,
        chrom: &str,
        positions: &[Position],
    ) -> Result<Array1<MapFloat>, GpmError> {
        let positions: Vec<MapFloat> = positions
            .iter()
            .map(|p| self.interpolate(chrom, *p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Array1::from_vec(positions))
    }

    /// The underlying per-chromosome interval trees.
    pub fn forest(&self) -> &ChromosomeForest {
        &self.forest
    }
}
