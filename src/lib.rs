//! Functionality for converting physical genomic spans to genetic spans.
//!
//! A [`GeneticMap`] is created by reading a tab-delimited genetic map of
//! known physical (base pair) to genetic (centimorgan) coordinate
//! correspondences, grouped by chromosome. Loading builds one interval tree
//! per chromosome from each adjacent pair of loci; point queries locate the
//! enclosing interval and linearly interpolate the genetic position.
//!
//! Here is an example which loads a genetic map and interpolates the
//! genetic position at a physical position:
//!
//! ```no_run
//! use gpm::prelude::*;
//! let gmap = GeneticMap::from_path("plink.chr1.GRCh38.map")
//!                .expect("cannot read genetic map");
//!
//! let cm = gmap.interpolate("chr1", 11975064)
//!              .expect("position not covered by the map");
//! println!("{}", cm);
//! ```
//!
//! The [`span::SpanEstimator`] drivers stream an interval data file and
//! append the genetic span of each record, either from a flat
//! bases-per-centimorgan ratio or by interpolating both span endpoints:
//!
//! ```no_run
//! use gpm::prelude::*;
//! use gpm::span::SpanEstimator;
//!
//! let gmap = GeneticMap::from_path("plink.chr1.GRCh38.map")
//!                .expect("cannot read genetic map");
//! SpanEstimator::new("intervals.tsv", "intervals_cm.tsv")
//!     .interpolate(&gmap)
//!     .expect("interpolation run failed");
//! ```

pub mod file;
mod numeric;
pub mod gpm;
pub mod span;

pub use gpm::{
    ChromosomeForest, GeneticMap, GenomicInterval, GpmError, Locus, MapFloat, Position,
};

pub mod prelude {
    pub use crate::gpm::{
        ChromosomeForest, GeneticMap, GenomicInterval, GpmError, Locus, MapFloat, Position,
    };
}
