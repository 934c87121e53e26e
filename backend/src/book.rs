//! Per-book pipeline: blacklist filtering, loading, dispatch between
//! simple (uniform section array) and complex (named-node) book shapes,
//! and the output-file write.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::flatten::{BookContext, RefPath, process_node, recurse_sections};
use crate::logger;
use crate::types::{BookSchema, CitationRecord, ContentFile, ConvertError, NodeKind};

/// Book titles to exclude from the conversion, one exact title per line.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    titles: HashSet<String>,
}

impl Blacklist {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read blacklist file: {:?}", path))?;
        let titles = data
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Ok(Blacklist { titles })
    }

    /// A missing or unreadable blacklist file logs a warning and skips
    /// nothing.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(blacklist) => blacklist,
            Err(e) => {
                logger::warn(&format!("No blacklist loaded: {:#}", e));
                Blacklist::default()
            }
        }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }
}

/// Flatten one book into its output document and citation records.
///
/// Returns `Ok(None)` for a blacklisted book (nothing written). Any
/// schema/content mismatch aborts the book: no file is written and no
/// citations are returned. The write happens only after the whole book
/// accumulated in memory, so aborted books leave no partial output.
pub fn process_book(
    text_path: &Path,
    schema: &BookSchema,
    out_file: &Path,
    rel_path: &str,
    blacklist: &Blacklist,
) -> Result<Option<Vec<CitationRecord>>> {
    if blacklist.contains(schema.title()) {
        logger::debug(&format!("Blacklisted, skipping: {}", schema.title()));
        return Ok(None);
    }

    let content = ContentFile::load(text_path)?;

    let mut ctx = BookContext::new(rel_path);
    ctx.push_heading(0, schema.he_title().to_string());
    for author in &schema.authors {
        ctx.push_line(author.he.clone());
    }

    let refs = RefPath::new(schema.title(), schema.he_title());
    match &schema.root.kind {
        NodeKind::Composite(children) => {
            for node in children {
                let (slot_key, node_refs) = if node.key == "default" {
                    ("", refs.clone())
                } else {
                    (node.title.as_str(), refs.with_name(&node.title, &node.he_title))
                };

                let slot = content.text.slot(slot_key).ok_or_else(|| {
                    ConvertError::SchemaContentMismatch(node.title.clone())
                })?;

                process_node(&mut ctx, node, slot, 1, &node_refs)?;
            }
        }
        NodeKind::Sections { names, depth } => {
            recurse_sections(&mut ctx, names, &content.text, *depth, 0, &refs)?;
        }
    }

    fs::write(out_file, ctx.render())
        .with_context(|| format!("Failed to write output file: {:?}", out_file))?;

    Ok(Some(ctx.citations))
}
