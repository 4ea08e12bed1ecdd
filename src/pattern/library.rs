use serde::Deserialize;
use thiserror::Error;

use crate::model::{Segment, Strand};
use crate::pattern::Template;

/// CY1 genomic RNA length.
pub const CY1_LENGTH: u32 = 2692;
/// CY2 genomic RNA length.
pub const CY2_LENGTH: u32 = 2983;
/// Rubisco large subunit mRNA length (host control, `JF419563.1`).
pub const RUBISCO_LARGE_LENGTH: u32 = 1434;

/// Errors raised while assembling a template library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Two templates share a name.
    #[error("duplicate template name `{0}`")]
    DuplicateName(String),

    /// Only one- and two-segment templates are supported.
    #[error("template `{name}` has unsupported segment count {count}")]
    UnsupportedSegmentCount {
        /// Template name.
        name: String,
        /// Declared segment count.
        count: usize,
    },

    /// Two-segment templates need a footprint ceiling.
    #[error("duplex template `{0}` has no footprint ceiling")]
    MissingFootprint(String),
}

/// Outcome of matching a hit against the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch<'a> {
    /// First template in priority order that matched.
    Template(&'a Template),
    /// No template matched.
    Unclassified,
}

impl<'a> PatternMatch<'a> {
    /// Name of the matched template.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            PatternMatch::Template(template) => Some(template.name.as_str()),
            PatternMatch::Unclassified => None,
        }
    }
}

/// Ordered collection of templates; earlier entries win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Template>")]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TryFrom<Vec<Template>> for TemplateLibrary {
    type Error = TemplateError;

    fn try_from(templates: Vec<Template>) -> Result<Self, Self::Error> {
        Self::new(templates)
    }
}

impl TemplateLibrary {
    /// Build a library from templates listed in priority order.
    pub fn new(templates: Vec<Template>) -> Result<Self, TemplateError> {
        let mut library = Self::default();
        for template in templates {
            library.register(template)?;
        }
        Ok(library)
    }

    /// Append a template at the lowest priority.
    pub fn register(&mut self, template: Template) -> Result<(), TemplateError> {
        if self.get(&template.name).is_some() {
            return Err(TemplateError::DuplicateName(template.name));
        }
        match template.segment_count {
            1 => {}
            2 if template.max_footprint.is_none() => {
                return Err(TemplateError::MissingFootprint(template.name));
            }
            2 => {}
            count => {
                return Err(TemplateError::UnsupportedSegmentCount {
                    name: template.name,
                    count,
                })
            }
        }
        self.templates.push(template);
        Ok(())
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.name == name)
    }

    /// Templates in priority order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` when no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// First template matching the ordered segments of a single-strand hit.
    pub fn first_match(&self, ordered: &[Segment], footprint: usize) -> PatternMatch<'_> {
        self.templates
            .iter()
            .find(|template| template.matches(ordered, footprint))
            .map_or(PatternMatch::Unclassified, PatternMatch::Template)
    }

    /// Templates for plus-strand CY1 transcripts.
    ///
    /// 5′ ends carry 30 nt of slack and 3′ ends 10 nt; direct RNA sequencing
    /// loses a few bases at the 5′ end.
    pub fn cy1_plus() -> Self {
        let end5 = 30;
        let end3 = 10;
        Self {
            templates: vec![
                Template::single("full-length", Strand::Forward, 1, CY1_LENGTH, end5, end3),
                Template::duplex("DRNA", Strand::Forward, 1, CY1_LENGTH, end5, end3, 2000),
                Template::single("F1600", Strand::Forward, 1, 1600, end5, end3),
                Template::single("F1070", Strand::Forward, 1, 1070, end5, end3),
                Template::single("F671", Strand::Forward, 1, 671, end5, end3),
                Template::single("F442", Strand::Forward, 1, 442, end5, end3),
                Template::single("F281", Strand::Forward, 1, 281, end5, end3),
            ],
        }
    }

    /// Full-length rubisco large subunit transcripts, a host mRNA control.
    pub fn rubisco_large() -> Self {
        Self {
            templates: vec![Template::single(
                "full-length",
                Strand::Forward,
                1,
                RUBISCO_LARGE_LENGTH,
                30,
                10,
            )],
        }
    }

    /// Templates for type-I minus-strand CY2 reads (30 nt at both ends).
    pub fn cy2_minus() -> Self {
        let tol = 30;
        Self {
            templates: vec![
                Template::single("full-length", Strand::Reverse, CY2_LENGTH, 1, tol, tol),
                Template::single("sgRNA", Strand::Reverse, CY2_LENGTH, 2068, tol, tol),
                Template::duplex("DRNA", Strand::Reverse, CY2_LENGTH, 1, tol, tol, 2000),
                Template::single("F671", Strand::Reverse, 671, 1, tol, tol),
                Template::single("F442", Strand::Reverse, 442, 1, tol, tol),
                Template::single("F281", Strand::Reverse, 281, 1, tol, tol),
            ],
        }
    }
}
