//! Raw report records as delivered by a BLAST JSON parser.
//!
//! Every field is optional so that a missing value surfaces as a
//! [`MalformedRecordError`] on the offending search instead of failing the
//! decode of the whole report.

use serde::Deserialize;

use super::{Hit, MalformedRecordError, Search, Segment, Strand};

/// `report.results.search` of one BLAST output item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSearch {
    /// Read identifier.
    pub query_title: Option<String>,
    /// Read length.
    pub query_len: Option<i64>,
    /// Hits of the search.
    pub hits: Option<Vec<RawHit>>,
}

/// One hit of a raw search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawHit {
    /// Descriptions; the first title names the reference.
    pub description: Option<Vec<RawDescription>>,
    /// HSPs of the hit.
    pub hsps: Option<Vec<RawSegment>>,
}

/// Hit description entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDescription {
    /// Reference title.
    pub title: Option<String>,
}

/// One raw HSP.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSegment {
    /// First aligned read position.
    pub query_from: Option<i64>,
    /// Last aligned read position.
    pub query_to: Option<i64>,
    /// Reference position aligned to `query_from`.
    pub hit_from: Option<i64>,
    /// Reference position aligned to `query_to`.
    pub hit_to: Option<i64>,
    /// `Plus` or `Minus`.
    pub hit_strand: Option<String>,
}

/// One item of a report: a search, or the decoder's complaint about it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    /// Decoded search record.
    Search(RawSearch),
    /// Item that did not have the shape of a search record.
    Undecodable(String),
}

impl From<RawSearch> for RawItem {
    fn from(search: RawSearch) -> Self {
        RawItem::Search(search)
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, MalformedRecordError> {
    value.ok_or(MalformedRecordError::MissingField { field })
}

fn positive(value: Option<i64>, field: &'static str) -> Result<u32, MalformedRecordError> {
    let value = require(value, field)?;
    if value <= 0 || value > u32::MAX as i64 {
        return Err(MalformedRecordError::NonPositive { field, value });
    }
    Ok(value as u32)
}

impl TryFrom<&RawSegment> for Segment {
    type Error = MalformedRecordError;

    fn try_from(raw: &RawSegment) -> Result<Self, Self::Error> {
        let strand = Strand::parse(require(raw.hit_strand.as_deref(), "hit_strand")?)?;
        Segment::new(
            positive(raw.query_from, "query_from")?,
            positive(raw.query_to, "query_to")?,
            positive(raw.hit_from, "hit_from")?,
            positive(raw.hit_to, "hit_to")?,
            strand,
        )
    }
}

impl TryFrom<&RawHit> for Hit {
    type Error = MalformedRecordError;

    fn try_from(raw: &RawHit) -> Result<Self, Self::Error> {
        let title = require(raw.description.as_ref(), "description")?
            .first()
            .and_then(|description| description.title.clone());
        let title = require(title, "title")?;
        let segments = require(raw.hsps.as_ref(), "hsps")?
            .iter()
            .map(Segment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Hit::new(title, segments)
    }
}

impl TryFrom<&RawSearch> for Search {
    type Error = MalformedRecordError;

    fn try_from(raw: &RawSearch) -> Result<Self, Self::Error> {
        let read_id = require(raw.query_title.clone(), "query_title")?;
        let read_length = positive(raw.query_len, "query_len")?;
        let hits = require(raw.hits.as_ref(), "hits")?
            .iter()
            .map(Hit::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Search::new(read_id, read_length, hits)
    }
}

impl RawSegment {
    /// Convenience constructor for a fully populated segment.
    pub fn new(query_from: i64, query_to: i64, hit_from: i64, hit_to: i64, strand: &str) -> Self {
        Self {
            query_from: Some(query_from),
            query_to: Some(query_to),
            hit_from: Some(hit_from),
            hit_to: Some(hit_to),
            hit_strand: Some(strand.to_string()),
        }
    }
}

impl RawHit {
    /// Convenience constructor for a hit with a single description title.
    pub fn new(title: &str, hsps: Vec<RawSegment>) -> Self {
        Self {
            description: Some(vec![RawDescription {
                title: Some(title.to_string()),
            }]),
            hsps: Some(hsps),
        }
    }
}

impl RawSearch {
    /// Convenience constructor for a fully populated search.
    pub fn new(query_title: &str, query_len: i64, hits: Vec<RawHit>) -> Self {
        Self {
            query_title: Some(query_title.to_string()),
            query_len: Some(query_len),
            hits: Some(hits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_search_converts_to_model() {
        let raw = RawSearch::new(
            "5c1f7a52-0d3e-4b8e-9d5b-2f6c1e8a9b10",
            2700,
            vec![RawHit::new("CY1", vec![RawSegment::new(5, 2696, 1, 2692, "Plus")])],
        );
        let search = Search::try_from(&raw).unwrap();
        assert_eq!(search.read_length(), 2700);
        assert_eq!(search.hits()[0].reference_id(), "CY1");
        assert_eq!(search.hits()[0].segments()[0].strand(), Strand::Forward);
    }

    #[test]
    fn zero_hits_are_retained() {
        let raw = RawSearch::new("r", 500, Vec::new());
        let search = Search::try_from(&raw).unwrap();
        assert!(!search.has_hit());
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let mut raw = RawSearch::new("r", 500, vec![RawHit::new("CY1", vec![RawSegment::new(1, 10, 1, 10, "Plus")])]);
        raw.hits.as_mut().unwrap()[0].hsps.as_mut().unwrap()[0].hit_to = None;
        assert_eq!(
            Search::try_from(&raw).unwrap_err(),
            MalformedRecordError::MissingField { field: "hit_to" }
        );

        let no_length = RawSearch {
            query_len: None,
            ..RawSearch::new("r", 1, Vec::new())
        };
        assert_eq!(
            Search::try_from(&no_length).unwrap_err(),
            MalformedRecordError::MissingField { field: "query_len" }
        );
    }

    #[test]
    fn non_positive_lengths_are_rejected() {
        let raw = RawSearch::new("r", -4, Vec::new());
        assert_eq!(
            Search::try_from(&raw).unwrap_err(),
            MalformedRecordError::NonPositive {
                field: "query_len",
                value: -4
            }
        );
    }

    #[test]
    fn hit_without_hsps_is_rejected() {
        let raw = RawSearch::new("r", 100, vec![RawHit::new("CY2", Vec::new())]);
        assert!(matches!(
            Search::try_from(&raw),
            Err(MalformedRecordError::EmptyHit { .. })
        ));
    }
}
