use std::fmt;

use serde::{Deserialize, Serialize};

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Parse the single-character strand field of an item identifier.
    pub fn from_symbol(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => Some(Strand::Unknown),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Direction of an adjacency relation between two items.
///
/// An edge (a, Upstream, b) reads "a is upstream of b". Every edge stored in
/// the graph has its inverse under `opposite()`, so the two relations are
/// mirror views of the same adjacency facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Upstream,
    Downstream,
}

impl Direction {
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Upstream => Direction::Downstream,
            Direction::Downstream => Direction::Upstream,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
        }
    }

    /// Parse the direction column of an adjacency table.
    pub fn from_label(s: &str) -> Option<Direction> {
        match s {
            "upstream" => Some(Direction::Upstream),
            "downstream" => Some(Direction::Downstream),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The two supported event topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpliceType {
    SkippedExon,
    MutuallyExclusiveExon,
}

impl SpliceType {
    /// Short form used in event-id templates and output file names.
    pub fn abbrev(self) -> &'static str {
        match self {
            SpliceType::SkippedExon => "se",
            SpliceType::MutuallyExclusiveExon => "mxe",
        }
    }
}

impl fmt::Display for SpliceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpliceType::SkippedExon => "skipped_exon",
            SpliceType::MutuallyExclusiveExon => "mutually_exclusive_exon",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_opposite_round_trips() {
        assert_eq!(Direction::Upstream.opposite(), Direction::Downstream);
        assert_eq!(Direction::Downstream.opposite(), Direction::Upstream);
        assert_eq!(Direction::Upstream.opposite().opposite(), Direction::Upstream);
    }

    #[test]
    fn direction_labels_parse() {
        assert_eq!(Direction::from_label("upstream"), Some(Direction::Upstream));
        assert_eq!(Direction::from_label("downstream"), Some(Direction::Downstream));
        assert_eq!(Direction::from_label("sideways"), None);
    }

    #[test]
    fn strand_symbols() {
        assert_eq!(Strand::from_symbol("+"), Some(Strand::Plus));
        assert_eq!(Strand::from_symbol("-"), Some(Strand::Minus));
        assert_eq!(Strand::from_symbol("."), Some(Strand::Unknown));
        assert_eq!(Strand::from_symbol("x"), None);
        assert_eq!(Strand::Minus.to_string(), "-");
    }

    #[test]
    fn splice_type_names() {
        assert_eq!(SpliceType::SkippedExon.abbrev(), "se");
        assert_eq!(SpliceType::MutuallyExclusiveExon.abbrev(), "mxe");
        assert_eq!(SpliceType::SkippedExon.to_string(), "skipped_exon");
    }
}
