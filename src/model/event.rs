use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::types::{SpliceType, Strand};

/// Delimiter used when joining item identifiers and template components.
pub const ID_DELIMITER: &str = "@";

/// Per-splice-type isoform templates: the logical components that make up
/// each isoform, in isoform1/isoform2 order.
///
/// These are structural motif labels ("junction13", "exon2", ...), not
/// instance identifiers.
pub fn isoform_components(splice_type: SpliceType) -> [(&'static str, &'static [&'static str]); 2] {
    match splice_type {
        SpliceType::SkippedExon => [
            ("isoform1", &["junction13"][..]),
            ("isoform2", &["junction12", "exon2", "junction23"][..]),
        ],
        SpliceType::MutuallyExclusiveExon => [
            ("isoform1", &["junction13", "exon3", "junction34"][..]),
            ("isoform2", &["junction12", "exon2", "junction24"][..]),
        ],
    }
}

/// Per-splice-type isoform view in terms of exon columns, used by the
/// downstream annotator to intersect metadata across an isoform's exons.
pub fn isoform_exon_columns(
    splice_type: SpliceType,
) -> [(&'static str, &'static [&'static str]); 2] {
    match splice_type {
        SpliceType::SkippedExon => [
            ("isoform1", &["exon1", "exon3"][..]),
            ("isoform2", &["exon1", "exon2", "exon3"][..]),
        ],
        SpliceType::MutuallyExclusiveExon => [
            ("isoform1", &["exon1", "exon3", "exon4"][..]),
            ("isoform2", &["exon1", "exon2", "exon4"][..]),
        ],
    }
}

/// Exon column names for a splice type, in genomic-start order.
pub fn exon_columns(splice_type: SpliceType) -> &'static [&'static str] {
    match splice_type {
        SpliceType::SkippedExon => &["exon1", "exon2", "exon3"],
        SpliceType::MutuallyExclusiveExon => &["exon1", "exon2", "exon3", "exon4"],
    }
}

/// Junction column names for a splice type. The order is part of the output
/// contract: SE is [junction12, junction23, junction13], MXE is
/// [junction13, junction34, junction12, junction24].
pub fn junction_columns(splice_type: SpliceType) -> &'static [&'static str] {
    match splice_type {
        SpliceType::SkippedExon => &["junction12", "junction23", "junction13"],
        SpliceType::MutuallyExclusiveExon => {
            &["junction13", "junction34", "junction12", "junction24"]
        }
    }
}

/// Canonical event id for a splice type.
///
/// This is a pure function of the splice type: every SE event carries the
/// same id string, and likewise for MXE. It labels the structural motif the
/// event instantiates and is NOT a per-event unique key; the exon columns
/// are what identify a row.
pub fn event_id(splice_type: SpliceType) -> String {
    isoform_components(splice_type)
        .iter()
        .map(|(isoform, components)| format!("{}={}", isoform, components.join(ID_DELIMITER)))
        .collect::<Vec<_>>()
        .join("|")
}

/// One discovered event.
///
/// `exon_names` is aligned with `exon_columns(splice_type)` and
/// `junction_names` with `junction_columns(splice_type)` of the owning
/// table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub exon_names: Vec<String>,
    pub junction_names: Vec<String>,
    /// All exon identifiers joined with `ID_DELIMITER`.
    pub exons: String,
    /// All junction identifiers joined with `ID_DELIMITER`.
    pub junctions: String,
    /// Strand encoded in the first exon identifier.
    pub strand: Strand,
    pub event_id: String,
}

impl EventRecord {
    pub fn new(
        splice_type: SpliceType,
        exon_names: Vec<String>,
        junction_names: Vec<String>,
        strand: Strand,
    ) -> Self {
        let exons = exon_names.join(ID_DELIMITER);
        let junctions = junction_names.join(ID_DELIMITER);
        Self {
            exon_names,
            junction_names,
            exons,
            junctions,
            strand,
            event_id: event_id(splice_type),
        }
    }
}

/// Result table of one detection scan: one row per event, never mutated
/// after being returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTable {
    pub splice_type: SpliceType,
    pub rows: Vec<EventRecord>,
}

impl EventTable {
    pub fn new(splice_type: SpliceType, rows: Vec<EventRecord>) -> Self {
        Self { splice_type, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn exon_columns(&self) -> &'static [&'static str] {
        exon_columns(self.splice_type)
    }

    pub fn junction_columns(&self) -> &'static [&'static str] {
        junction_columns(self.splice_type)
    }

    /// Column order of the persisted form.
    pub fn header(&self) -> Vec<&'static str> {
        let mut header: Vec<&'static str> = Vec::new();
        header.extend(self.exon_columns());
        header.extend(self.junction_columns());
        header.extend(["exons", "junctions", "strand", "event_id"]);
        header
    }

    /// Look up the exon identifier a named exon column holds in `record`.
    pub fn exon_value<'r>(&self, record: &'r EventRecord, column: &str) -> Option<&'r str> {
        self.exon_columns()
            .iter()
            .position(|c| *c == column)
            .and_then(|i| record.exon_names.get(i))
            .map(|s| s.as_str())
    }

    /// Write the table as TSV, header first.
    pub fn write_tsv<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "{}", self.header().join("\t"))?;
        for row in &self.rows {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.exon_names.join("\t"),
                row.junction_names.join("\t"),
                row.exons,
                row.junctions,
                row.strand,
                row.event_id
            )?;
        }
        Ok(())
    }
}

/// One-line summary for logging and diagnostics.
impl fmt::Display for EventTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EventTable[{}]: {} events ({} exon columns, {} junction columns)",
            self.splice_type,
            self.rows.len(),
            self.exon_columns().len(),
            self.junction_columns().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn se_event_id_is_the_fixed_template() {
        assert_eq!(
            event_id(SpliceType::SkippedExon),
            "isoform1=junction13|isoform2=junction12@exon2@junction23"
        );
    }

    #[test]
    fn mxe_event_id_is_the_fixed_template() {
        assert_eq!(
            event_id(SpliceType::MutuallyExclusiveExon),
            "isoform1=junction13@exon3@junction34|isoform2=junction12@exon2@junction24"
        );
    }

    #[test]
    fn event_id_ignores_instance_data() {
        // Two records with entirely different identifiers share the id.
        let a = EventRecord::new(
            SpliceType::SkippedExon,
            vec!["exon:chr1:1-2:+".into(), "exon:chr1:3-4:+".into(), "exon:chr1:5-6:+".into()],
            vec!["junction:chr1:2-3:+".into(), "junction:chr1:4-5:+".into(), "junction:chr1:2-5:+".into()],
            Strand::Plus,
        );
        let b = EventRecord::new(
            SpliceType::SkippedExon,
            vec!["exon:chrX:10-20:-".into(), "exon:chrX:30-40:-".into(), "exon:chrX:50-60:-".into()],
            vec!["junction:chrX:21-29:-".into(), "junction:chrX:41-49:-".into(), "junction:chrX:21-49:-".into()],
            Strand::Minus,
        );
        assert_eq!(a.event_id, b.event_id);
    }

    #[test]
    fn record_joins_identifiers_with_delimiter() {
        let rec = EventRecord::new(
            SpliceType::SkippedExon,
            vec!["e1".into(), "e2".into(), "e3".into()],
            vec!["j12".into(), "j23".into(), "j13".into()],
            Strand::Plus,
        );
        assert_eq!(rec.exons, "e1@e2@e3");
        assert_eq!(rec.junctions, "j12@j23@j13");
    }

    #[test]
    fn table_header_and_tsv_shape() {
        let rec = EventRecord::new(
            SpliceType::SkippedExon,
            vec!["e1".into(), "e2".into(), "e3".into()],
            vec!["j12".into(), "j23".into(), "j13".into()],
            Strand::Plus,
        );
        let table = EventTable::new(SpliceType::SkippedExon, vec![rec]);

        assert_eq!(
            table.header(),
            vec![
                "exon1", "exon2", "exon3", "junction12", "junction23", "junction13", "exons",
                "junctions", "strand", "event_id"
            ]
        );

        let mut out = Vec::new();
        table.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].split('\t').count(), table.header().len());
        assert!(lines[1].starts_with("e1\te2\te3\tj12\tj23\tj13\t"));
    }

    #[test]
    fn exon_value_resolves_columns() {
        let rec = EventRecord::new(
            SpliceType::MutuallyExclusiveExon,
            vec!["e1".into(), "e2".into(), "e3".into(), "e4".into()],
            vec!["j13".into(), "j34".into(), "j12".into(), "j24".into()],
            Strand::Plus,
        );
        let table = EventTable::new(SpliceType::MutuallyExclusiveExon, vec![rec]);
        let row = &table.rows[0];
        assert_eq!(table.exon_value(row, "exon1"), Some("e1"));
        assert_eq!(table.exon_value(row, "exon4"), Some("e4"));
        assert_eq!(table.exon_value(row, "exon5"), None);
    }
}
