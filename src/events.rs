use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use itertools::Itertools;
use rayon::prelude::*;

use crate::adjacencies::AdjacencyRow;
use crate::graph::AdjacencyGraph;
use crate::model::event::{EventRecord, EventTable};
use crate::model::region::Region;
use crate::types::{Direction, SpliceType};

/// Discovered events of one scan: exon index tuple (the deduplication key)
/// to junction indices in column order. BTreeMap keys give the output tables
/// a deterministic row order regardless of how the scan was sharded.
type EventMap = BTreeMap<Vec<usize>, Vec<usize>>;

fn log_report(msg: &str) {
    log::info!("{msg}");
}

/// Combines splice junctions into splicing events.
///
/// Items (exons first, then junctions, each in first-seen input order) are
/// assigned stable integer indices at construction time; the graph and both
/// detection scans work on indices only. The graph is built once and is
/// immutable afterwards; the scans are read-only and may run in any order,
/// any number of times.
#[derive(Debug, Clone)]
pub struct EventMaker {
    items: Vec<String>,
    regions: Vec<Region>,
    n_exons: usize,
    graph: AdjacencyGraph,
}

impl EventMaker {
    /// Build the adjacency graph from the input table.
    ///
    /// Fails on a malformed item identifier (naming it) and on an identifier
    /// used as both an exon and a junction. Duplicate rows are tolerated:
    /// edge insertion is idempotent.
    pub fn new(rows: &[AdjacencyRow]) -> Result<Self> {
        let mut exon_ids: Vec<String> = Vec::new();
        let mut exon_index: HashMap<String, usize> = HashMap::new();
        let mut junction_ids: Vec<String> = Vec::new();
        let mut junction_index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            if !exon_index.contains_key(&row.exon) {
                exon_index.insert(row.exon.clone(), exon_ids.len());
                exon_ids.push(row.exon.clone());
            }
            if !junction_index.contains_key(&row.junction) {
                junction_index.insert(row.junction.clone(), junction_ids.len());
                junction_ids.push(row.junction.clone());
            }
        }

        // A shared identifier would alias two different item indices.
        for junction in &junction_ids {
            if exon_index.contains_key(junction) {
                bail!(
                    "identifier '{}' is used as both an exon and a junction",
                    junction
                );
            }
        }

        let n_exons = exon_ids.len();
        let mut items = exon_ids;
        items.extend(junction_ids);

        let regions = items
            .iter()
            .map(|id| Region::parse(id).map_err(anyhow::Error::new))
            .collect::<Result<Vec<_>>>()?;

        let mut graph = AdjacencyGraph::with_items(items.len());
        for row in rows {
            let exon_i = exon_index[&row.exon];
            let junction_i = n_exons + junction_index[&row.junction];
            // insert() also stores the mandatory inverse edge
            graph.insert(exon_i, row.direction, junction_i);
        }

        Ok(Self {
            items,
            regions,
            n_exons,
            graph,
        })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Exon identifiers, in index order.
    pub fn exons(&self) -> &[String] {
        &self.items[..self.n_exons]
    }

    pub fn n_exons(&self) -> usize {
        self.n_exons
    }

    pub fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    pub fn index_of(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    // -----------------------
    // Traversal primitives
    // -----------------------

    /// Exons immediately downstream of `exon`, across a single junction:
    /// the junctions `exon` is upstream of, then the exons those junctions
    /// are upstream of.
    fn exons_one_junction_downstream(&self, exon: usize) -> BTreeSet<usize> {
        let junctions = self.graph.find(exon, Direction::Upstream);
        self.graph.traverse(junctions, Direction::Upstream)
    }

    /// Inverse of the above, applied to a set: two "downstream" hops.
    fn exons_one_junction_upstream(&self, exons: &BTreeSet<usize>) -> BTreeSet<usize> {
        let junctions = self.graph.traverse(exons, Direction::Downstream);
        self.graph.traverse(&junctions, Direction::Downstream)
    }

    /// Exons separated from `exon` by junction-exon-junction.
    fn exons_two_junctions_downstream(&self, exon: usize) -> BTreeSet<usize> {
        let first = self.exons_one_junction_downstream(exon);
        let junctions = self.graph.traverse(&first, Direction::Upstream);
        self.graph.traverse(&junctions, Direction::Upstream)
    }

    /// The junction directly linking `a` to `b`, in that order.
    ///
    /// Well-formed input yields at most one. Zero is "no link" (Ok(None),
    /// the caller discards the candidate pair); more than one is a
    /// validation error naming both exons.
    fn junction_between(&self, a: usize, b: usize) -> Result<Option<usize>> {
        let junctions = AdjacencyGraph::intersect(
            self.graph.find(a, Direction::Upstream),
            self.graph.find(b, Direction::Downstream),
        );
        match junctions.len() {
            0 => Ok(None),
            1 => Ok(junctions.first().copied()),
            _ => {
                let names: Vec<&str> = junctions.iter().map(|&j| self.items[j].as_str()).collect();
                bail!(
                    "multiple junctions directly link '{}' and '{}': {}",
                    self.items[a],
                    self.items[b],
                    names.join(", ")
                )
            }
        }
    }

    // -----------------------
    // Detection scans
    // -----------------------

    /// Skipped-exon events for one flanking exon1 candidate.
    fn se_events_for_exon(&self, exon1: usize) -> Result<EventMap> {
        let mut events = EventMap::new();

        let candidates: Vec<usize> = self
            .exons_one_junction_downstream(exon1)
            .into_iter()
            .collect();

        for (a, b) in candidates.iter().copied().tuple_combinations() {
            if self.regions[a].overlaps(&self.regions[b]) {
                continue;
            }
            // exon2 is the leftmost (smaller start) of the pair.
            let (exon2, exon3) = if self.regions[a] <= self.regions[b] {
                (a, b)
            } else {
                (b, a)
            };

            // Without a direct exon2->exon3 junction there is no inclusion
            // isoform; the pair is not an event.
            let Some(junction23) = self.junction_between(exon2, exon3)? else {
                continue;
            };
            // Both exist by construction (exon2/exon3 came from one junction
            // downstream of exon1); tolerate absence as "no link" anyway.
            let Some(junction13) = self.junction_between(exon1, exon3)? else {
                continue;
            };
            let Some(junction12) = self.junction_between(exon1, exon2)? else {
                continue;
            };

            events.insert(
                vec![exon1, exon2, exon3],
                vec![junction12, junction23, junction13],
            );
        }

        Ok(events)
    }

    /// Mutually-exclusive-exon events for one flanking exon1 candidate.
    fn mxe_events_for_exon(&self, exon1: usize) -> Result<EventMap> {
        let mut events = EventMap::new();

        // Candidates must be one junction downstream of exon1 AND one
        // junction upstream of something two junctions downstream of exon1:
        // exons on a path that reconverges two junctions later.
        let from_exon1 = self.exons_one_junction_downstream(exon1);
        let from_convergence =
            self.exons_one_junction_upstream(&self.exons_two_junctions_downstream(exon1));
        let candidates: Vec<usize> = AdjacencyGraph::intersect(&from_exon1, &from_convergence)
            .into_iter()
            .collect();

        for (a, b) in candidates.iter().copied().tuple_combinations() {
            if self.regions[a].overlaps(&self.regions[b]) {
                continue;
            }
            let (exon2, exon3) = if self.regions[a] <= self.regions[b] {
                (a, b)
            } else {
                (b, a)
            };

            let convergence = AdjacencyGraph::intersect(
                &self.exons_one_junction_downstream(exon2),
                &self.exons_one_junction_downstream(exon3),
            );
            // Smallest index: deterministic pick among multiple convergence
            // exons.
            let Some(&exon4) = convergence.first() else {
                continue;
            };

            let Some(junction13) = self.junction_between(exon1, exon3)? else {
                continue;
            };
            let Some(junction34) = self.junction_between(exon3, exon4)? else {
                continue;
            };
            let Some(junction12) = self.junction_between(exon1, exon2)? else {
                continue;
            };
            let Some(junction24) = self.junction_between(exon2, exon4)? else {
                continue;
            };

            events.insert(
                vec![exon1, exon2, exon3, exon4],
                vec![junction13, junction34, junction12, junction24],
            );
        }

        Ok(events)
    }

    /// Shard the outer exon loop across rayon workers and merge the
    /// per-worker event maps. Keys are deterministic for a fixed input, so
    /// merge order does not matter.
    fn scan<F>(&self, per_exon: F, report: &(dyn Fn(&str) + Sync)) -> Result<EventMap>
    where
        F: Fn(usize) -> Result<EventMap> + Sync,
    {
        let n = self.n_exons;
        report(&format!("Trying out {n} exons ..."));
        if n == 0 {
            return Ok(EventMap::new());
        }

        let interval = (n + 99) / 100; // ceil(n / 100), always >= 1
        let tested = AtomicUsize::new(0);

        (0..n)
            .into_par_iter()
            .map(|exon1| {
                let events = per_exon(exon1)?;
                let done = tested.fetch_add(1, Ordering::Relaxed) + 1;
                if done % interval == 0 {
                    report(&format!(
                        "\t{}/{} exons tested ({:.1}%)",
                        done,
                        n,
                        100.0 * done as f64 / n as f64
                    ));
                }
                Ok(events)
            })
            .try_reduce(EventMap::new, |mut acc, part| {
                acc.extend(part);
                Ok(acc)
            })
    }

    fn build_table(&self, splice_type: SpliceType, events: EventMap) -> EventTable {
        let rows = events
            .into_iter()
            .map(|(exon_is, junction_is)| {
                let strand = self.regions[exon_is[0]].strand;
                let exon_names = exon_is.iter().map(|&i| self.items[i].clone()).collect();
                let junction_names = junction_is.iter().map(|&i| self.items[i].clone()).collect();
                EventRecord::new(splice_type, exon_names, junction_names, strand)
            })
            .collect();
        EventTable::new(splice_type, rows)
    }

    // -----------------------
    // Public API
    // -----------------------

    /// Find all skipped-exon events, reporting progress via `log`.
    pub fn skipped_exon(&self) -> Result<EventTable> {
        self.skipped_exon_with_progress(&log_report)
    }

    /// Find all skipped-exon events with an injected progress sink, invoked
    /// every ceil(n_exons/100) exons.
    pub fn skipped_exon_with_progress(
        &self,
        report: &(dyn Fn(&str) + Sync),
    ) -> Result<EventTable> {
        let events = self.scan(|exon1| self.se_events_for_exon(exon1), report)?;
        Ok(self.build_table(SpliceType::SkippedExon, events))
    }

    /// Find all mutually-exclusive-exon events, reporting progress via `log`.
    pub fn mutually_exclusive_exon(&self) -> Result<EventTable> {
        self.mutually_exclusive_exon_with_progress(&log_report)
    }

    /// Find all mutually-exclusive-exon events with an injected progress
    /// sink, invoked every ceil(n_exons/100) exons.
    pub fn mutually_exclusive_exon_with_progress(
        &self,
        report: &(dyn Fn(&str) + Sync),
    ) -> Result<EventTable> {
        let events = self.scan(|exon1| self.mxe_events_for_exon(exon1), report)?;
        Ok(self.build_table(SpliceType::MutuallyExclusiveExon, events))
    }
}
