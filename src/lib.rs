//! splice_events
//!
//! Discovers alternative-splicing events from a table of exon/junction
//! adjacency facts. The input says which exons sit immediately upstream or
//! downstream of which splice junctions; the output is one catalog of
//! skipped-exon (SE) events and one of mutually-exclusive-exon (MXE)
//! events, each event being a minimal combination of exons and junctions
//! whose relative usage distinguishes two isoforms.

pub mod adjacencies;
pub mod annotate;
pub mod events;
pub mod graph;
pub mod model;
pub mod types;

pub use adjacencies::{read_adjacencies_path, AdjacencyReader, AdjacencyRow, ParseError};

pub use annotate::{EventAnnotator, ExonAttributes};

pub use events::EventMaker;

pub use graph::AdjacencyGraph;

pub use model::event::{EventRecord, EventTable};
pub use model::region::{LocationError, Region};

pub use types::{Direction, SpliceType, Strand};
