//! BLAST JSON loading and tab-separated rendering.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::warn;

use crate::aggregate::{percentage, CategoryCounts, Classification};
use crate::model::{RawItem, RawSearch, Search};

#[derive(Deserialize)]
struct BlastOutput {
    #[serde(rename = "BlastOutput2")]
    items: Vec<Value>,
}

const SEARCH_POINTER: &str = "/report/results/search";

/// Decode BLAST JSON output (format 2, single file) into report items.
///
/// Only the outer `BlastOutput2` array must be well formed; an item whose
/// search record has the wrong shape becomes [`RawItem::Undecodable`].
pub fn parse_blast_json(json: &str) -> Result<Vec<RawItem>> {
    let output: BlastOutput =
        serde_json::from_str(json).context("input is not BLAST JSON output")?;

    Ok(output.items.into_iter().map(decode_item).collect())
}

fn decode_item(mut item: Value) -> RawItem {
    let Some(search) = item.pointer_mut(SEARCH_POINTER).map(Value::take) else {
        return RawItem::Undecodable("missing report.results.search".to_string());
    };
    match serde_json::from_value::<RawSearch>(search) {
        Ok(search) => RawItem::Search(search),
        Err(err) => RawItem::Undecodable(err.to_string()),
    }
}

/// Read and decode a BLAST JSON file.
pub fn load_blast_json<P: AsRef<Path>>(path: P) -> Result<Vec<RawItem>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_blast_json(&json).with_context(|| format!("failed to parse {}", path.display()))
}

/// Validated searches among `items`; invalid ones are logged and skipped.
pub fn valid_searches(items: &[RawItem]) -> Vec<Search> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            RawItem::Search(raw) => match Search::try_from(raw) {
                Ok(search) => Some(search),
                Err(err) => {
                    warn!(index, error = %err, "skipping invalid search");
                    None
                }
            },
            RawItem::Undecodable(message) => {
                warn!(index, error = %message, "skipping undecodable item");
                None
            }
        })
        .collect()
}

/// Write `category\tcount\tpercent` lines.
pub fn write_counts_tsv<W: Write>(writer: &mut W, counts: &CategoryCounts, total: usize) -> Result<()> {
    writer.write_all(b"category\tcount\tpercent\n")?;
    for (category, count) in counts.iter() {
        writeln!(writer, "{category}\t{count}\t{:.2}", percentage(count, total))?;
    }
    writer.flush()?;
    Ok(())
}

/// Render category counts into a string.
pub fn render_counts_tsv(counts: &CategoryCounts, total: usize) -> Result<String> {
    let mut buffer = Vec::new();
    write_counts_tsv(&mut buffer, counts, total)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered counts are not valid UTF-8"))
}

const CLASSIFICATION_HEADER: &str = "read_id\tread_length\tcategory\torientation\tfoldback\thybrid\t\
start_offset\tfirst_aligned\tcovered\tref_min\tref_max\tend_5prime\tend_3prime\tsegments\tunaligned\textra_3prime\n";

/// Write one row per classified read.
pub fn write_classifications_tsv<W: Write>(
    writer: &mut W,
    classifications: &[Classification],
) -> Result<()> {
    writer.write_all(CLASSIFICATION_HEADER.as_bytes())?;
    for c in classifications {
        let orientation = c
            .orientation
            .map_or_else(|| "-".to_string(), |o| o.to_string());
        let first_aligned = position_or_dash(c.first_aligned_position);
        let ref_min = position_or_dash(c.min_covered_position());
        let ref_max = position_or_dash(c.max_covered_position());
        let five_prime = position_or_dash(c.five_prime_end);
        let three_prime = position_or_dash(c.three_prime_end);
        writeln!(
            writer,
            "{id}\t{len}\t{category}\t{orientation}\t{foldback}\t{hybrid}\t{offset:.4}\t{first_aligned}\t{covered}\t{ref_min}\t{ref_max}\t{five_prime}\t{three_prime}\t{segments}\t{unaligned}\t{extra}",
            id = c.read_id,
            len = c.read_length,
            category = c.category,
            foldback = c.foldback,
            hybrid = c.hybrid,
            offset = c.normalized_start_offset,
            covered = c.unique_covered_positions,
            segments = c.segment_count,
            unaligned = c.unaligned_read_positions,
            extra = c.extra_three_prime_length,
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn position_or_dash(position: Option<u32>) -> String {
    position.map_or_else(|| "-".to_string(), |p| p.to_string())
}

/// Render the per-read table into a string.
pub fn render_classifications_tsv(classifications: &[Classification]) -> Result<String> {
    let mut buffer = Vec::new();
    write_classifications_tsv(&mut buffer, classifications)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered table is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{counts_by_category, Category};
    use crate::model::MalformedRecordError;

    const REPORT: &str = r#"{
      "BlastOutput2": [
        {"report": {"results": {"search": {
          "query_title": "3f2b9c1e-8a7d-4e6f-b5c4-d3e2f1a0b9c8",
          "query_len": 2700,
          "hits": [{
            "description": [{"title": "CY1"}],
            "hsps": [{"query_from": 5, "query_to": 2696, "hit_from": 1, "hit_to": 2692, "hit_strand": "Plus"}]
          }]
        }}}},
        {"report": {"results": {"search": {"query_title": "r2", "query_len": "long", "hits": []}}}},
        {"report": {"results": {}}}
      ]
    }"#;

    #[test]
    fn report_items_decode_independently() {
        let items = parse_blast_json(REPORT).unwrap();
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], RawItem::Search(s) if s.query_len == Some(2700)));
        assert!(matches!(&items[1], RawItem::Undecodable(_)));
        assert!(matches!(&items[2], RawItem::Undecodable(m) if m.contains("search")));

        let searches = valid_searches(&items);
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].hits()[0].segments()[0].hit_to(), 2692);
    }

    #[test]
    fn missing_fields_survive_decoding() {
        let json = r#"{"BlastOutput2": [{"report": {"results": {"search": {"query_title": "r"}}}}]}"#;
        let items = parse_blast_json(json).unwrap();
        let RawItem::Search(raw) = &items[0] else {
            panic!("expected a search record");
        };
        assert_eq!(
            Search::try_from(raw).unwrap_err(),
            MalformedRecordError::MissingField { field: "query_len" }
        );
    }

    #[test]
    fn non_blast_input_is_an_error() {
        assert!(parse_blast_json("[1, 2, 3]").is_err());
        assert!(load_blast_json("/nonexistent/blast.json").is_err());
    }

    #[test]
    fn counts_render_with_percentages() {
        let make = |category: Category| Classification {
            read_id: "r".into(),
            read_length: 10,
            category,
            orientation: None,
            foldback: false,
            hybrid: false,
            normalized_start_offset: 0.0,
            first_aligned_position: None,
            unique_covered_positions: 0,
            covered: Default::default(),
            five_prime_end: None,
            three_prime_end: None,
            segment_count: 0,
            unaligned_read_positions: 10,
            extra_three_prime_length: 10,
        };
        let cs = [make(Category::Plus), make(Category::Plus), make(Category::Unclassified)];
        let rendered = render_counts_tsv(&counts_by_category(&cs), 4).unwrap();
        assert_eq!(
            rendered,
            "category\tcount\tpercent\nplus\t2\t50.00\nunclassified\t1\t25.00\n"
        );
        assert_eq!(
            render_counts_tsv(&CategoryCounts::default(), 0).unwrap(),
            "category\tcount\tpercent\n"
        );
    }
}
