//! Virus–host chimeric reads.
//!
//! A read is chimeric when it has a hit to the viral reference of interest
//! and, in a separate report of the same reads against a host database, a
//! hit to the host as well.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::model::{ReferenceMatcher, Search};

/// Searches of the same reads against one host database.
#[derive(Debug, Clone, Copy)]
pub struct HostReport<'a> {
    /// Source label such as `transcripts` or `genome`.
    pub label: &'a str,
    /// Searches from the host report.
    pub searches: &'a [Search],
}

/// Chimeric reads found in one host report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostChimeras {
    /// Source label.
    pub label: String,
    /// Chimeric read ids in host report order, without repeats.
    pub read_ids: Vec<String>,
}

impl HostChimeras {
    /// Returns `true` if `read_id` is chimeric with this host source.
    pub fn contains(&self, read_id: &str) -> bool {
        self.read_ids.iter().any(|id| id == read_id)
    }
}

/// Chimeric reads across every host report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChimeraReport {
    /// Number of reads with a viral hit of interest.
    pub viral_reads: usize,
    /// Per-source results in the order the reports were given.
    pub hosts: Vec<HostChimeras>,
}

impl ChimeraReport {
    /// Union of chimeric read ids over all sources.
    pub fn unique_read_ids(&self) -> BTreeSet<&str> {
        self.hosts
            .iter()
            .flat_map(|host| host.read_ids.iter().map(String::as_str))
            .collect()
    }

    /// Read id → labels of the host sources it was found in.
    pub fn sources_by_read(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut sources: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for host in &self.hosts {
            for id in &host.read_ids {
                sources.entry(id.as_str()).or_default().push(host.label.as_str());
            }
        }
        sources
    }

    /// Result for the source named `label`.
    pub fn host(&self, label: &str) -> Option<&HostChimeras> {
        self.hosts.iter().find(|host| host.label == label)
    }
}

/// Find viral reads that also hit a host.
///
/// A viral read is one with a single hit matching `references`; a host read
/// is one with any hit at all in its report.
pub fn find_chimeras(
    viral: &[Search],
    references: &[ReferenceMatcher],
    hosts: &[HostReport<'_>],
) -> ChimeraReport {
    let viral_ids: HashSet<&str> = viral
        .iter()
        .filter(|search| search.find_hit_matching(references).is_some())
        .map(Search::read_id)
        .collect();

    let hosts = hosts
        .iter()
        .map(|report| {
            let mut seen = HashSet::new();
            let read_ids: Vec<String> = report
                .searches
                .iter()
                .filter(|search| search.has_hit())
                .map(Search::read_id)
                .filter(|id| viral_ids.contains(id) && seen.insert(*id))
                .map(str::to_string)
                .collect();
            debug!(source = report.label, chimeric = read_ids.len(), "host report scanned");
            HostChimeras {
                label: report.label.to_string(),
                read_ids,
            }
        })
        .collect();

    ChimeraReport {
        viral_reads: viral_ids.len(),
        hosts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Hit, Segment, Strand};

    fn with_hit(id: &str, reference: &str) -> Search {
        let segment = Segment::new(1, 100, 1, 100, Strand::Forward).unwrap();
        Search::new(id, 500, vec![Hit::new(reference, vec![segment]).unwrap()]).unwrap()
    }

    fn without_hit(id: &str) -> Search {
        Search::new(id, 500, Vec::new()).unwrap()
    }

    #[test]
    fn reads_in_both_reports_are_chimeric() {
        let viral = vec![with_hit("r1", "CY1"), with_hit("r2", "CY1"), without_hit("r3")];
        let transcripts = vec![with_hit("r2", "Niben.tx1"), with_hit("r3", "Niben.tx2")];
        let genome = vec![with_hit("r1", "Niben.chr4"), with_hit("r2", "Niben.chr7"), without_hit("r9")];
        let references = [ReferenceMatcher::Exact("CY1".into())];

        let report = find_chimeras(
            &viral,
            &references,
            &[
                HostReport { label: "transcripts", searches: &transcripts },
                HostReport { label: "genome", searches: &genome },
            ],
        );

        assert_eq!(report.viral_reads, 2);
        assert_eq!(report.host("transcripts").unwrap().read_ids, vec!["r2"]);
        assert_eq!(report.host("genome").unwrap().read_ids, vec!["r1", "r2"]);
        assert_eq!(report.unique_read_ids().into_iter().collect::<Vec<_>>(), vec!["r1", "r2"]);
        assert_eq!(report.sources_by_read()["r2"], vec!["transcripts", "genome"]);
    }

    #[test]
    fn host_searches_without_hits_do_not_count() {
        let viral = vec![with_hit("r1", "CY2")];
        let host = vec![without_hit("r1")];
        let report = find_chimeras(
            &viral,
            &[],
            &[HostReport { label: "genome", searches: &host }],
        );
        assert!(report.unique_read_ids().is_empty());
        assert!(!report.hosts[0].contains("r1"));
    }

    #[test]
    fn repeated_host_entries_are_reported_once() {
        let viral = vec![with_hit("r1", "CY1")];
        let host = vec![with_hit("r1", "a"), with_hit("r1", "b")];
        let report = find_chimeras(&viral, &[], &[HostReport { label: "genome", searches: &host }]);
        assert_eq!(report.hosts[0].read_ids, vec!["r1"]);
    }
}
