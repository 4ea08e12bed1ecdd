//! # Strand and fragment classification of BLAST read alignments
//!
//! This library sorts nanopore direct-RNA reads aligned to a small viral
//! reference into biologically meaningful categories from the geometry of
//! their HSPs alone. It never touches sequence; it consumes coordinates that
//! BLAST already computed.
//!
//! ## Pipeline
//!
//! 1. **Model**: validate raw report records into `Search → Hit → Segment`
//! 2. **Geometry**: order segments by read start, compute covered positions
//! 3. **Strand**: orientation (plus / minus / mixed) and foldback bands
//! 4. **Pattern**: match the segment layout against named templates
//! 5. **Aggregate**: one category per read, counts and percentages
//!
//! ## Usage Example
//!
//! ```no_run
//! use readclass::{Classifier, ClassifierConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let items = readclass::io::load_blast_json("blast_output_cy1_nb_6wpi_leaf.json")?;
//! let classifier = Classifier::new(ClassifierConfig::cy1())?;
//! let batch = classifier.classify_batch(&items);
//! for (category, count) in batch.counts().iter() {
//!     println!("{category}\t{count}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod aggregate; // Categories, counts and percentages
pub mod chimera; // Reads that also hit a host reference
pub mod geometry; // Position sets, ordering, tolerance
pub mod io; // BLAST JSON loading and TSV rendering
pub mod model; // Search / Hit / Segment records
pub mod pattern; // Fragment templates
pub mod strand; // Orientation and foldback calls

// Re-exports for convenience
pub use aggregate::{
    classify, counts_by_category, coverage_by_position, percentage, Category, CategoryCounts,
    Classification, CoverageProfile,
};
pub use geometry::{GeometryError, PositionSet};
pub use model::{
    Hit, MalformedRecordError, RawItem, RawSearch, ReferenceMatcher, Search, Segment, Strand,
};
pub use pattern::{Template, TemplateLibrary};
pub use strand::{FoldbackPolicy, Orientation};

use rayon::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Tunables for a classification run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Hit titles that count as the reference of interest (empty = any).
    pub references: Vec<ReferenceMatcher>,

    /// Offset bands for minus-strand subtypes.
    pub foldback: FoldbackPolicy,

    /// Templates tried on all-forward hits.
    pub plus_templates: TemplateLibrary,

    /// Templates tried on type-I minus hits.
    pub minus_templates: TemplateLibrary,

    /// Worker threads (0 = rayon's shared pool).
    pub threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            references: vec![
                ReferenceMatcher::Exact("CY1".into()),
                ReferenceMatcher::Exact("CY2".into()),
            ],
            foldback: FoldbackPolicy::default(),
            plus_templates: TemplateLibrary::cy1_plus(),
            minus_templates: TemplateLibrary::cy2_minus(),
            threads: 0,
        }
    }
}

impl ClassifierConfig {
    /// CY1 reads with the plus-strand fragment templates.
    pub fn cy1() -> Self {
        Self {
            references: vec![ReferenceMatcher::Exact("CY1".into())],
            minus_templates: TemplateLibrary::default(),
            ..Self::default()
        }
    }

    /// CY2 reads with the minus-strand fragment templates.
    pub fn cy2() -> Self {
        Self {
            references: vec![ReferenceMatcher::Exact("CY2".into())],
            plus_templates: TemplateLibrary::default(),
            ..Self::default()
        }
    }

    /// Rubisco large subunit (`JF419563.1`) reads, the host mRNA control.
    pub fn rubisco_large() -> Self {
        Self {
            references: vec![ReferenceMatcher::Contains("JF419563.1".into())],
            plus_templates: TemplateLibrary::rubisco_large(),
            minus_templates: TemplateLibrary::default(),
            ..Self::default()
        }
    }

    /// Accept whichever single hit a search has.
    pub fn any_reference() -> Self {
        Self {
            references: Vec::new(),
            ..Self::default()
        }
    }

    /// Builder-style thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

/// Errors that reject a record or a run.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Structurally invalid input record.
    #[error("malformed record: {0}")]
    Malformed(#[from] MalformedRecordError),

    /// Coordinates contradict the declared strand.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Configuration that cannot produce consistent calls.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// A record that was rejected instead of classified.
#[derive(Debug)]
pub struct RejectedRecord {
    /// Position of the record in the input.
    pub index: usize,
    /// Read identifier, when the record carried one.
    pub read_id: Option<String>,
    /// Why the record was rejected.
    pub error: ClassifyError,
}

/// Result of classifying a whole report.
#[derive(Debug, Default)]
pub struct ClassificationBatch {
    /// Classified reads in input order.
    pub classifications: Vec<Classification>,
    /// Rejected records in input order.
    pub rejected: Vec<RejectedRecord>,
}

impl ClassificationBatch {
    /// Number of records classified.
    pub fn processed(&self) -> usize {
        self.classifications.len()
    }

    /// Number of records rejected.
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Category counts over the classified reads.
    pub fn counts(&self) -> CategoryCounts {
        counts_by_category(&self.classifications)
    }
}

/// Classification orchestrator.
///
/// Holds the validated configuration and, when a thread count is configured,
/// a dedicated worker pool.
#[derive(Debug)]
pub struct Classifier {
    config: ClassifierConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Classifier {
    /// Validate `config` and build the worker pool.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifyError> {
        if !config.foldback.is_consistent() {
            return Err(ClassifyError::InvalidConfig(format!(
                "type-I band (<= {}) overlaps foldback band [{}, {}]",
                config.foldback.type_one_max, config.foldback.foldback_min, config.foldback.foldback_max
            )));
        }

        let pool = if config.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build()
                .map_err(|err| ClassifyError::ThreadPool(err.to_string()))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self { config, pool })
    }

    /// Classify one validated search.
    pub fn classify(&self, search: &Search) -> Result<Classification, ClassifyError> {
        classify(search, &self.config).map_err(ClassifyError::from)
    }

    /// Validate and classify one raw search.
    pub fn classify_raw(&self, raw: &RawSearch) -> Result<Classification, ClassifyError> {
        let search = Search::try_from(raw)?;
        self.classify(&search)
    }

    /// Classify every item, collecting rejections instead of stopping.
    pub fn classify_batch(&self, items: &[RawItem]) -> ClassificationBatch {
        let run = || -> Vec<Result<Classification, RejectedRecord>> {
            items
                .par_iter()
                .enumerate()
                .map(|(index, item)| self.classify_item(index, item))
                .collect()
        };
        let results = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let mut batch = ClassificationBatch::default();
        for result in results {
            match result {
                Ok(classification) => batch.classifications.push(classification),
                Err(rejected) => {
                    warn!(
                        index = rejected.index,
                        read_id = rejected.read_id.as_deref().unwrap_or("<unknown>"),
                        error = %rejected.error,
                        "rejected record"
                    );
                    batch.rejected.push(rejected);
                }
            }
        }

        info!(
            processed = batch.processed(),
            rejected = batch.rejected_count(),
            "classification complete"
        );
        batch
    }

    fn classify_item(&self, index: usize, item: &RawItem) -> Result<Classification, RejectedRecord> {
        let reject = |read_id: Option<String>, error: ClassifyError| RejectedRecord {
            index,
            read_id,
            error,
        };
        match item {
            RawItem::Search(raw) => self
                .classify_raw(raw)
                .map_err(|error| reject(raw.query_title.clone(), error)),
            RawItem::Undecodable(message) => Err(reject(
                None,
                MalformedRecordError::Decode {
                    index,
                    message: message.clone(),
                }
                .into(),
            )),
        }
    }
}
