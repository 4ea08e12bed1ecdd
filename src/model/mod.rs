//! Typed views over BLAST search, hit and HSP records.
//!
//! A [`Search`] is one sequencing read queried against a reference database,
//! a [`Hit`] is one reference the read aligned to, and a [`Segment`] is one
//! contiguous aligned block (an HSP) within that hit. Records are validated
//! once on construction from [`raw`] report data and are read-only afterwards.

pub mod raw;

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::strand::{orientation_of, Orientation};

pub use raw::{RawDescription, RawHit, RawItem, RawSearch, RawSegment};

/// Errors raised when report data does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecordError {
    /// A required field was absent from the record.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Name of the absent field as it appears in the report.
        field: &'static str,
    },

    /// A length or coordinate field was zero or negative.
    #[error("field `{field}` must be a positive integer, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the report.
        value: i64,
    },

    /// A hit carried no HSPs.
    #[error("hit to `{reference}` has no segments")]
    EmptyHit {
        /// Reference title of the empty hit.
        reference: String,
    },

    /// The strand flag was neither `Plus` nor `Minus`.
    #[error("unknown hit strand `{value}`")]
    UnknownStrand {
        /// Flag found in the report.
        value: String,
    },

    /// `query_from` lies after `query_to`.
    #[error("query interval is inverted: query_from={query_from} > query_to={query_to}")]
    InvertedQueryInterval {
        /// Start position on the read.
        query_from: u32,
        /// End position on the read.
        query_to: u32,
    },

    /// The report item could not be decoded into a search record at all.
    #[error("report item {index} could not be decoded: {message}")]
    Decode {
        /// Position of the item within the report.
        index: usize,
        /// Decoder message.
        message: String,
    },
}

/// Alignment direction of a segment relative to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Strand {
    /// Same direction as the reference (`Plus`).
    Forward,
    /// Reverse-complement direction (`Minus`).
    Reverse,
}

impl Strand {
    /// Parse a BLAST `hit_strand` flag (`Plus` / `Minus`, any case).
    pub fn parse(flag: &str) -> Result<Self, MalformedRecordError> {
        if flag.eq_ignore_ascii_case("plus") {
            Ok(Strand::Forward)
        } else if flag.eq_ignore_ascii_case("minus") {
            Ok(Strand::Reverse)
        } else {
            Err(MalformedRecordError::UnknownStrand {
                value: flag.to_string(),
            })
        }
    }

    /// Returns `true` for [`Strand::Forward`].
    pub fn is_forward(self) -> bool {
        matches!(self, Strand::Forward)
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => f.write_str("Plus"),
            Strand::Reverse => f.write_str("Minus"),
        }
    }
}

/// One contiguous aligned block (HSP).
///
/// Query positions are 1-based inclusive read offsets. Reference positions are
/// 1-based inclusive; the direction of a reverse segment is encoded by
/// `hit_from > hit_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    query_from: u32,
    query_to: u32,
    hit_from: u32,
    hit_to: u32,
    strand: Strand,
}

impl Segment {
    /// Construct a segment, checking that the query interval is directed.
    pub fn new(
        query_from: u32,
        query_to: u32,
        hit_from: u32,
        hit_to: u32,
        strand: Strand,
    ) -> Result<Self, MalformedRecordError> {
        if query_from > query_to {
            return Err(MalformedRecordError::InvertedQueryInterval {
                query_from,
                query_to,
            });
        }
        Ok(Self {
            query_from,
            query_to,
            hit_from,
            hit_to,
            strand,
        })
    }

    /// First aligned read position.
    pub fn query_from(&self) -> u32 {
        self.query_from
    }

    /// Last aligned read position.
    pub fn query_to(&self) -> u32 {
        self.query_to
    }

    /// Reference position aligned to `query_from`.
    pub fn hit_from(&self) -> u32 {
        self.hit_from
    }

    /// Reference position aligned to `query_to`.
    pub fn hit_to(&self) -> u32 {
        self.hit_to
    }

    /// Alignment direction.
    pub fn strand(&self) -> Strand {
        self.strand
    }
}

/// How a hit title is recognised as the reference of interest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMatcher {
    /// Whole-title comparison ignoring ASCII case (`CY1`, `cy1`).
    Exact(String),
    /// Title contains the given accession (`JF419563.1`).
    Contains(String),
}

impl ReferenceMatcher {
    /// Returns `true` when `title` names this reference.
    pub fn matches(&self, title: &str) -> bool {
        match self {
            ReferenceMatcher::Exact(name) => title.eq_ignore_ascii_case(name),
            ReferenceMatcher::Contains(accession) => title.contains(accession.as_str()),
        }
    }
}

/// One reference sequence a read aligned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    reference_id: String,
    segments: Vec<Segment>,
}

impl Hit {
    /// Construct a hit; a hit must carry at least one segment.
    pub fn new(
        reference_id: impl Into<String>,
        segments: Vec<Segment>,
    ) -> Result<Self, MalformedRecordError> {
        let reference_id = reference_id.into();
        if segments.is_empty() {
            return Err(MalformedRecordError::EmptyHit {
                reference: reference_id,
            });
        }
        Ok(Self {
            reference_id,
            segments,
        })
    }

    /// Reference title as reported.
    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    /// Segments in report order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments (always at least one).
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of forward segments.
    pub fn forward_count(&self) -> usize {
        self.segments.iter().filter(|s| s.strand().is_forward()).count()
    }

    /// Number of reverse segments.
    pub fn reverse_count(&self) -> usize {
        self.segment_count() - self.forward_count()
    }

    /// Strand orientation over all segments.
    pub fn orientation(&self) -> Orientation {
        orientation_of(&self.segments)
    }
}

/// One query read and its hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    read_id: String,
    read_length: u32,
    hits: Vec<Hit>,
}

impl Search {
    /// Construct a search; the read length must be positive.
    pub fn new(
        read_id: impl Into<String>,
        read_length: u32,
        hits: Vec<Hit>,
    ) -> Result<Self, MalformedRecordError> {
        if read_length == 0 {
            return Err(MalformedRecordError::NonPositive {
                field: "query_len",
                value: 0,
            });
        }
        Ok(Self {
            read_id: read_id.into(),
            read_length,
            hits,
        })
    }

    /// Opaque read identifier (normally a UUID).
    pub fn read_id(&self) -> &str {
        &self.read_id
    }

    /// Read length in nucleotides.
    pub fn read_length(&self) -> u32 {
        self.read_length
    }

    /// Hits in report order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Returns `true` when the read aligned to anything.
    pub fn has_hit(&self) -> bool {
        !self.hits.is_empty()
    }

    /// The single hit whose title satisfies one of `references`.
    ///
    /// An empty matcher list accepts every hit. Returns `None` when no hit or
    /// more than one hit qualifies.
    pub fn find_hit_matching(&self, references: &[ReferenceMatcher]) -> Option<&Hit> {
        let mut candidates = self.hits.iter().filter(|hit| {
            references.is_empty()
                || references
                    .iter()
                    .any(|matcher| matcher.matches(hit.reference_id()))
        });
        let first = candidates.next()?;
        match candidates.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}
