//! Fragment-pattern classification against a library of named templates.

mod library;
mod template;

pub use library::{
    PatternMatch, TemplateError, TemplateLibrary, CY1_LENGTH, CY2_LENGTH, RUBISCO_LARGE_LENGTH,
};
pub use template::Template;

use crate::geometry::ordered_by_segment_start;
use crate::model::Hit;
use crate::strand::Orientation;

/// Match a hit's segment layout against `library`.
///
/// `footprint` is the hit's unique covered reference position count. Mixed
/// orientation hits never match a template.
pub fn match_pattern<'a>(hit: &Hit, footprint: usize, library: &'a TemplateLibrary) -> PatternMatch<'a> {
    if library.is_empty() || hit.orientation() == Orientation::Mixed {
        return PatternMatch::Unclassified;
    }
    let ordered = ordered_by_segment_start(hit.segments());
    library.first_match(&ordered, footprint)
}
