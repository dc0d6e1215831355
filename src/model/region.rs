use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Strand;

/// Error for an item identifier whose location part cannot be parsed.
///
/// Always names the offending identifier; a malformed identifier anywhere in
/// the input is fatal for graph construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationError {
    pub id: String,
    pub problem: String,
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed item identifier '{}': {}", self.id, self.problem)
    }
}

impl std::error::Error for LocationError {}

/// Genomic interval parsed from an item identifier.
///
/// Accepted identifier shapes (':'-separated):
/// - `chrom:start-stop:strand`
/// - `type:chrom:start-stop:strand` (e.g. `exon:chr1:100-200:+`)
/// - `type:chrom:start-stop:strand:frame` (coding features)
///
/// Coordinates are kept exactly as encoded (1-based, inclusive on both
/// ends). `length()` is `stop - start`, not the inclusive `stop - start + 1`;
/// downstream length statistics depend on this convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// The full identifier this region was parsed from.
    pub id: String,
    /// Item type prefix, when the identifier carries one ("exon", "junction", ...).
    pub kind: Option<String>,
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
    pub strand: Strand,
    /// Reading frame suffix for coding features.
    pub frame: Option<u8>,
}

impl Region {
    pub fn parse(id: &str) -> Result<Region, LocationError> {
        let err = |problem: &str| LocationError {
            id: id.to_string(),
            problem: problem.to_string(),
        };

        let parts: Vec<&str> = id.split(':').collect();
        let (kind, chrom, loc, strand_s, frame_s) = match parts.as_slice() {
            [chrom, loc, strand] => (None, *chrom, *loc, *strand, None),
            [kind, chrom, loc, strand] => (Some(*kind), *chrom, *loc, *strand, None),
            [kind, chrom, loc, strand, frame] => (Some(*kind), *chrom, *loc, *strand, Some(*frame)),
            _ => return Err(err("expected 3 to 5 ':'-separated fields")),
        };

        if chrom.is_empty() {
            return Err(err("empty chromosome field"));
        }

        let (start_s, stop_s) = loc
            .split_once('-')
            .ok_or_else(|| err("location field must look like start-stop"))?;
        let start: u64 = start_s
            .parse()
            .map_err(|_| err("start coordinate is not a number"))?;
        let stop: u64 = stop_s
            .parse()
            .map_err(|_| err("stop coordinate is not a number"))?;
        if stop < start {
            return Err(err("start coordinate is greater than stop"));
        }

        let strand =
            Strand::from_symbol(strand_s).ok_or_else(|| err("unrecognized strand symbol"))?;

        let frame = match frame_s {
            None => None,
            Some(s) => {
                let f: u8 = s.parse().map_err(|_| err("frame suffix is not a number"))?;
                if f > 2 {
                    return Err(err("frame suffix must be 0, 1 or 2"));
                }
                Some(f)
            }
        };

        Ok(Region {
            id: id.to_string(),
            kind: kind.map(|k| k.to_string()),
            chrom: chrom.to_string(),
            start,
            stop,
            strand,
            frame,
        })
    }

    /// True iff both regions sit on the same chromosome and strand and the
    /// closed intervals [start, stop] intersect.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.chrom == other.chrom
            && self.strand == other.strand
            && self.start <= other.stop
            && other.start <= self.stop
    }

    /// `stop - start`, see type docs.
    pub fn length(&self) -> u64 {
        self.stop - self.start
    }
}

/// Total order by start coordinate, used to assign leftmost/rightmost roles
/// among candidate exons. Ties fall back to stop, chromosome, then the full
/// identifier so the order is total.
impl Ord for Region {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.stop.cmp(&other.stop))
            .then_with(|| self.chrom.cmp(&other.chrom))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Region {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
