use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::event::{isoform_exon_columns, EventRecord, EventTable};
use crate::model::region::{LocationError, Region};
use crate::types::Strand;

/// Collaborator interface: gene/transcript metadata for a single exon,
/// keyed by attribute name. The annotation database behind it is built
/// elsewhere; the annotator only reads through this seam.
pub trait ExonAttributes {
    /// Attributes of one exon, or None when the exon is unknown to the
    /// database.
    fn attributes_of(&self, exon_id: &str) -> Option<HashMap<String, Vec<String>>>;
}

impl ExonAttributes for HashMap<String, HashMap<String, Vec<String>>> {
    fn attributes_of(&self, exon_id: &str) -> Option<HashMap<String, Vec<String>>> {
        self.get(exon_id).cloned()
    }
}

/// Annotates event rows with the metadata their exons share, per isoform,
/// and with exon/intron length statistics.
pub struct EventAnnotator<'a, D: ExonAttributes> {
    db: &'a D,
}

impl<'a, D: ExonAttributes> EventAnnotator<'a, D> {
    pub fn new(db: &'a D) -> Self {
        Self { db }
    }

    /// Attribute values shared by every exon of each isoform.
    ///
    /// For each isoform of the event's splice type, intersect the value sets
    /// of the isoform's exons attribute by attribute (exons missing an
    /// attribute are skipped rather than emptying the intersection). Only
    /// non-empty intersections are kept; keys come back prefixed
    /// `isoform1_`/`isoform2_`, values sorted and comma-joined.
    pub fn shared_attributes(
        &self,
        table: &EventTable,
        record: &EventRecord,
    ) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();

        for (isoform, columns) in isoform_exon_columns(table.splice_type) {
            let exon_ids: Vec<&str> = columns
                .iter()
                .filter_map(|col| table.exon_value(record, col))
                .collect();

            let Some((first, rest)) = exon_ids.split_first() else {
                continue;
            };
            let Some(first_attrs) = self.db.attributes_of(first) else {
                continue;
            };

            for (key, values) in &first_attrs {
                let mut shared: BTreeSet<&String> = values.iter().collect();

                for exon_id in rest {
                    let Some(attrs) = self.db.attributes_of(exon_id) else {
                        shared.clear();
                        break;
                    };
                    match attrs.get(key) {
                        Some(other) => shared.retain(|v| other.contains(*v)),
                        None => continue,
                    }
                    if shared.is_empty() {
                        break;
                    }
                }

                if !shared.is_empty() {
                    let joined = shared
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(",");
                    out.insert(format!("{isoform}_{key}"), joined);
                }
            }
        }

        out
    }

    /// Exon and intron lengths for one event row.
    ///
    /// Per exon column `<col>_length` is the region length; `intron_length`
    /// spans from the first to the last exon, strand-aware: on plus strand
    /// `last.start - first.stop - 1`, on minus strand
    /// `first.start - last.stop - 1`.
    pub fn lengths(
        &self,
        table: &EventTable,
        record: &EventRecord,
    ) -> Result<BTreeMap<String, i64>, LocationError> {
        let mut out = BTreeMap::new();
        let mut regions: Vec<Region> = Vec::with_capacity(record.exon_names.len());

        for (column, exon_id) in table.exon_columns().iter().zip(&record.exon_names) {
            let region = Region::parse(exon_id)?;
            out.insert(format!("{column}_length"), region.length() as i64);
            regions.push(region);
        }

        if let (Some(first), Some(last)) = (regions.first(), regions.last()) {
            let intron = match record.strand {
                Strand::Minus => first.start as i64 - last.stop as i64 - 1,
                _ => last.start as i64 - first.stop as i64 - 1,
            };
            out.insert("intron_length".to_string(), intron);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpliceType;

    type FakeDb = HashMap<String, HashMap<String, Vec<String>>>;

    fn attrs(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    fn se_table() -> EventTable {
        let record = EventRecord::new(
            SpliceType::SkippedExon,
            vec![
                "exon:chr1:100-200:+".into(),
                "exon:chr1:300-400:+".into(),
                "exon:chr1:500-600:+".into(),
            ],
            vec![
                "junction:chr1:201-299:+".into(),
                "junction:chr1:401-499:+".into(),
                "junction:chr1:201-499:+".into(),
            ],
            Strand::Plus,
        );
        EventTable::new(SpliceType::SkippedExon, vec![record])
    }

    #[test]
    fn shared_attributes_intersect_across_isoform_exons() {
        let table = se_table();
        let row = &table.rows[0];

        let mut db: FakeDb = HashMap::new();
        db.insert(
            "exon:chr1:100-200:+".into(),
            attrs(&[
                ("gene_id", &["G1"][..]),
                ("transcript_id", &["T1", "T2"][..]),
            ]),
        );
        db.insert(
            "exon:chr1:300-400:+".into(),
            attrs(&[("gene_id", &["G1"][..]), ("transcript_id", &["T2"][..])]),
        );
        db.insert(
            "exon:chr1:500-600:+".into(),
            attrs(&[
                ("gene_id", &["G1"][..]),
                ("transcript_id", &["T1", "T2"][..]),
            ]),
        );

        let annotator = EventAnnotator::new(&db);
        let shared = annotator.shared_attributes(&table, row);

        // isoform1 = exon1 + exon3: both transcripts survive
        assert_eq!(shared.get("isoform1_gene_id").unwrap(), "G1");
        assert_eq!(shared.get("isoform1_transcript_id").unwrap(), "T1,T2");
        // isoform2 includes exon2, which only T2 contains
        assert_eq!(shared.get("isoform2_gene_id").unwrap(), "G1");
        assert_eq!(shared.get("isoform2_transcript_id").unwrap(), "T2");
    }

    #[test]
    fn attributes_missing_everywhere_are_dropped() {
        let table = se_table();
        let row = &table.rows[0];

        let mut db: FakeDb = HashMap::new();
        db.insert(
            "exon:chr1:100-200:+".into(),
            attrs(&[("gene_id", &["G1"][..])]),
        );
        db.insert(
            "exon:chr1:300-400:+".into(),
            attrs(&[("gene_id", &["G2"][..])]),
        );
        db.insert(
            "exon:chr1:500-600:+".into(),
            attrs(&[("gene_id", &["G2"][..])]),
        );

        let annotator = EventAnnotator::new(&db);
        let shared = annotator.shared_attributes(&table, row);

        // disjoint values -> nothing shared for either isoform
        assert!(shared.get("isoform1_gene_id").is_none());
        assert!(shared.get("isoform2_gene_id").is_none());
    }

    #[test]
    fn lengths_include_exons_and_intron() {
        let table = se_table();
        let row = &table.rows[0];

        let db: FakeDb = HashMap::new();
        let annotator = EventAnnotator::new(&db);
        let lengths = annotator.lengths(&table, row).unwrap();

        assert_eq!(lengths["exon1_length"], 100);
        assert_eq!(lengths["exon2_length"], 100);
        assert_eq!(lengths["exon3_length"], 100);
        // plus strand: last.start - first.stop - 1 = 500 - 200 - 1
        assert_eq!(lengths["intron_length"], 299);
    }
}
