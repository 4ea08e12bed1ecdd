//! Per-read categories and the pure read path over them.
//!
//! [`classify`] assigns one [`Category`] per search together with the
//! quantities it was derived from. Everything else in this module is a fold
//! over finished [`Classification`] records; nothing here mutates shared state.

mod coverage;

pub use coverage::{coverage_by_position, CoverageProfile};

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::geometry::{
    extra_three_prime_length, first_aligned_read_position, ordered_by_segment_start,
    unaligned_read_positions, unique_covered_positions, GeometryError, PositionSet,
};
use crate::model::Search;
use crate::pattern::{match_pattern, TemplateLibrary};
use crate::strand::{call_strand, MinusSubtype, Orientation};
use crate::ClassifierConfig;

/// Category assigned to one read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// All segments forward, no fragment template matched.
    Plus,
    /// All forward and matching the named plus-strand template.
    PlusFragment(String),
    /// All reverse, alignment starts at the read terminus.
    MinusTypeI,
    /// Type-I minus matching the named minus-strand template.
    MinusFragment(String),
    /// All reverse, alignment starts near the read midpoint (foldback).
    MinusTypeII,
    /// All reverse, start offset in neither band.
    Minus,
    /// Mixed orientation, not a two-segment foldback.
    Hybrid,
    /// Mixed orientation with exactly one forward and one reverse segment.
    Foldback,
    /// No single hit to a reference of interest.
    Unclassified,
}

impl Category {
    /// Template name for fragment categories.
    pub fn fragment_name(&self) -> Option<&str> {
        match self {
            Category::PlusFragment(name) | Category::MinusFragment(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Plus => f.write_str("plus"),
            Category::PlusFragment(name) => write!(f, "plus/{name}"),
            Category::MinusTypeI => f.write_str("minus-type-I"),
            Category::MinusFragment(name) => write!(f, "minus-type-I/{name}"),
            Category::MinusTypeII => f.write_str("minus-type-II"),
            Category::Minus => f.write_str("minus"),
            Category::Hybrid => f.write_str("hybrid"),
            Category::Foldback => f.write_str("foldback"),
            Category::Unclassified => f.write_str("unclassified"),
        }
    }
}

/// Category of one read plus the numbers behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Read identifier.
    pub read_id: String,
    /// Read length.
    pub read_length: u32,
    /// Assigned category.
    pub category: Category,
    /// Orientation of the hit of interest, if any.
    pub orientation: Option<Orientation>,
    /// Foldback by either rule (a type-II minus read is a foldback too).
    pub foldback: bool,
    /// Plus/minus hybrid (mixed orientation).
    pub hybrid: bool,
    /// First aligned read position over read length.
    pub normalized_start_offset: f64,
    /// First aligned read position.
    pub first_aligned_position: Option<u32>,
    /// Unique reference positions covered by the hit.
    pub unique_covered_positions: usize,
    /// Reference positions covered by the hit.
    pub covered: PositionSet,
    /// `hit_from` of the first segment in read order (the read's 5′ end on the reference).
    pub five_prime_end: Option<u32>,
    /// `hit_to` of the last segment in read order (the read's 3′ end on the reference).
    pub three_prime_end: Option<u32>,
    /// Number of segments of the hit.
    pub segment_count: usize,
    /// Read positions outside every segment.
    pub unaligned_read_positions: u32,
    /// Read sequence past the last aligned position.
    pub extra_three_prime_length: u32,
}

impl Classification {
    /// Smallest covered reference position.
    pub fn min_covered_position(&self) -> Option<u32> {
        self.covered.min()
    }

    /// Largest covered reference position.
    pub fn max_covered_position(&self) -> Option<u32> {
        self.covered.max()
    }

    fn unclassified(search: &Search) -> Self {
        Self {
            read_id: search.read_id().to_string(),
            read_length: search.read_length(),
            category: Category::Unclassified,
            orientation: None,
            foldback: false,
            hybrid: false,
            normalized_start_offset: 0.0,
            first_aligned_position: None,
            unique_covered_positions: 0,
            covered: PositionSet::default(),
            five_prime_end: None,
            three_prime_end: None,
            segment_count: 0,
            unaligned_read_positions: search.read_length(),
            extra_three_prime_length: search.read_length(),
        }
    }
}

/// Assign a category to `search`.
///
/// Deterministic; the only failure is coordinates that contradict their strand.
pub fn classify(search: &Search, config: &ClassifierConfig) -> Result<Classification, GeometryError> {
    let Some(hit) = search.find_hit_matching(&config.references) else {
        return Ok(Classification::unclassified(search));
    };

    let segments = hit.segments();
    let covered = unique_covered_positions(segments)?;
    let footprint = covered.len();
    let call = call_strand(hit, search.read_length(), &config.foldback);
    let ordered = ordered_by_segment_start(segments);

    let template = |library: &TemplateLibrary| {
        match_pattern(hit, footprint, library).name().map(str::to_string)
    };

    let category = match (call.orientation, call.minus_subtype) {
        (Orientation::AllForward, _) => template(&config.plus_templates)
            .map_or(Category::Plus, Category::PlusFragment),
        (Orientation::AllReverse, Some(MinusSubtype::TypeTwo)) => Category::MinusTypeII,
        (Orientation::AllReverse, Some(MinusSubtype::TypeOne)) => template(&config.minus_templates)
            .map_or(Category::MinusTypeI, Category::MinusFragment),
        (Orientation::AllReverse, _) => Category::Minus,
        (Orientation::Mixed, _) if call.foldback => Category::Foldback,
        (Orientation::Mixed, _) => Category::Hybrid,
    };

    debug!(
        read_id = search.read_id(),
        %category,
        offset = call.normalized_start_offset,
        footprint,
        "classified read"
    );

    Ok(Classification {
        read_id: search.read_id().to_string(),
        read_length: search.read_length(),
        category,
        orientation: Some(call.orientation),
        foldback: call.foldback,
        hybrid: call.hybrid,
        normalized_start_offset: call.normalized_start_offset,
        first_aligned_position: first_aligned_read_position(segments),
        unique_covered_positions: footprint,
        covered,
        five_prime_end: ordered.first().map(|segment| segment.hit_from()),
        three_prime_end: ordered.last().map(|segment| segment.hit_to()),
        segment_count: hit.segment_count(),
        unaligned_read_positions: unaligned_read_positions(search.read_length(), segments),
        extra_three_prime_length: extra_three_prime_length(search.read_length(), segments),
    })
}

/// Category counts in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    entries: Vec<(Category, usize)>,
}

impl CategoryCounts {
    /// Count of `category` (zero when never seen).
    pub fn get(&self, category: &Category) -> usize {
        self.entries
            .iter()
            .find(|(seen, _)| seen == category)
            .map_or(0, |(_, count)| *count)
    }

    /// `(category, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Category, usize)> + '_ {
        self.entries.iter().map(|(category, count)| (category, *count))
    }

    /// Number of distinct categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    fn increment(mut self, category: &Category) -> Self {
        match self.entries.iter_mut().find(|(seen, _)| seen == category) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((category.clone(), 1)),
        }
        self
    }
}

/// Count classifications per category.
pub fn counts_by_category<'a, I>(classifications: I) -> CategoryCounts
where
    I: IntoIterator<Item = &'a Classification>,
{
    classifications
        .into_iter()
        .fold(CategoryCounts::default(), |counts, c| counts.increment(&c.category))
}

/// `100 * count / total`, or `0.0` when `total` is zero.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * count as f64 / total as f64
}

/// Strand-level tallies over classified reads.
///
/// `plus + minus + hybrid` equals the number of reads with a hit of interest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrandTally {
    /// All-forward reads.
    pub plus: usize,
    /// All-reverse reads.
    pub minus: usize,
    /// Mixed reads.
    pub hybrid: usize,
    /// Foldbacks from either branch.
    pub foldback: usize,
    /// Type-I minus reads (fragment matches included).
    pub type_one_minus: usize,
    /// Type-II minus reads.
    pub type_two_minus: usize,
    /// Reads without a hit of interest.
    pub unclassified: usize,
}

impl StrandTally {
    /// Reads with a hit of interest.
    pub fn classified(&self) -> usize {
        self.plus + self.minus + self.hybrid
    }
}

/// Fold classifications into strand tallies.
pub fn tally<'a, I>(classifications: I) -> StrandTally
where
    I: IntoIterator<Item = &'a Classification>,
{
    classifications
        .into_iter()
        .fold(StrandTally::default(), |mut acc, c| {
            match c.orientation {
                Some(Orientation::AllForward) => acc.plus += 1,
                Some(Orientation::AllReverse) => acc.minus += 1,
                Some(Orientation::Mixed) => acc.hybrid += 1,
                None => acc.unclassified += 1,
            }
            match c.category {
                Category::MinusTypeI | Category::MinusFragment(_) => acc.type_one_minus += 1,
                Category::MinusTypeII => acc.type_two_minus += 1,
                _ => {}
            }
            if c.foldback {
                acc.foldback += 1;
            }
            acc
        })
}

/// Segment count → number of reads, over reads selected by `keep`.
pub fn segment_count_histogram<'a, I, F>(classifications: I, keep: F) -> BTreeMap<usize, usize>
where
    I: IntoIterator<Item = &'a Classification>,
    F: Fn(&Classification) -> bool,
{
    classifications
        .into_iter()
        .filter(|c| keep(c))
        .fold(BTreeMap::new(), |mut histogram, c| {
            *histogram.entry(c.segment_count).or_insert(0) += 1;
            histogram
        })
}

/// Longest reads first; ties keep input order.
pub fn sort_by_read_length_desc(classifications: &mut [Classification]) {
    classifications.sort_by(|a, b| b.read_length.cmp(&a.read_length));
}

/// Earliest first aligned read position first; reads without a hit last.
pub fn sort_by_first_aligned_position(classifications: &mut [Classification]) {
    classifications.sort_by_key(|c| c.first_aligned_position.unwrap_or(u32::MAX));
}

/// Largest reference footprint first.
pub fn sort_by_footprint_desc(classifications: &mut [Classification]) {
    classifications.sort_by(|a, b| b.unique_covered_positions.cmp(&a.unique_covered_positions));
}
