//! Schema-driven flattening of a book's content tree into an ordered
//! document plus per-line citation records.
//!
//! Composite books are walked node by node (`process_node`); section
//! arrays are walked by nesting depth (`recurse_sections`). Both append
//! to a `BookContext`, which is merged upward only when the whole book
//! succeeds.

use crate::gematria::{to_daf, to_daf_latin, to_gematria};
use crate::types::{CitationRecord, ContentNode, ConvertError, NodeKind, OutputLine, SchemaNode};

/// The section name that selects folio (daf) numbering instead of
/// ordinal numbering.
pub const DAF_SECTION: &str = "דף";

/// Ref segments accumulated during recursion, joined once at the leaf.
///
/// Name segments come from book and node titles; address segments from
/// section positions. English and Hebrew are kept in lockstep.
#[derive(Debug, Clone, Default)]
pub struct RefPath {
    names: Vec<String>,
    he_names: Vec<String>,
    address: Vec<String>,
    he_address: Vec<String>,
}

impl RefPath {
    pub fn new(title: &str, he_title: &str) -> Self {
        RefPath {
            names: vec![title.to_string()],
            he_names: vec![he_title.to_string()],
            address: Vec::new(),
            he_address: Vec::new(),
        }
    }

    /// Extend with a named subdivision (non-default composite child).
    pub fn with_name(&self, title: &str, he_title: &str) -> Self {
        let mut refs = self.clone();
        refs.names.push(title.to_string());
        refs.he_names.push(he_title.to_string());
        refs
    }

    /// Extend with a section position label.
    pub fn with_address(&self, latin: String, hebrew: String) -> Self {
        let mut refs = self.clone();
        refs.address.push(latin);
        refs.he_address.push(hebrew);
        refs
    }

    /// E.g. "Tanya, Part One 2:1".
    pub fn en_ref(&self) -> String {
        let names = self.names.join(", ");
        if self.address.is_empty() {
            names
        } else {
            format!("{} {}", names, self.address.join(":"))
        }
    }

    /// E.g. "תניא, חלק א ב, א".
    pub fn he_ref(&self) -> String {
        let names = self.he_names.join(", ");
        if self.he_address.is_empty() {
            names
        } else {
            format!("{} {}", names, self.he_address.join(", "))
        }
    }
}

/// Accumulated document and citations of one book in progress.
#[derive(Debug, Default)]
pub struct BookContext {
    pub output: Vec<OutputLine>,
    pub citations: Vec<CitationRecord>,
    path: String,
}

impl BookContext {
    /// `path` is the normalized output-file path recorded on every
    /// citation of this book.
    pub fn new(path: &str) -> Self {
        BookContext {
            output: Vec::new(),
            citations: Vec::new(),
            path: path.to_string(),
        }
    }

    pub fn push_heading(&mut self, level: usize, text: String) {
        self.output.push(OutputLine::Heading { level, text });
    }

    /// A plain document line without a citation (authors, etc). Still
    /// counts toward line indexes.
    pub fn push_line(&mut self, text: String) {
        self.output.push(OutputLine::Text(text));
    }

    /// A terminal text line plus its citation record.
    fn push_text(&mut self, text: &str, refs: &RefPath) {
        self.output.push(OutputLine::Text(text.replace("\n\n", "\n")));
        self.citations.push(CitationRecord {
            en_ref: refs.en_ref(),
            he_ref: refs.he_ref(),
            path: self.path.clone(),
            line_index: self.output.len(),
        });
    }

    pub fn render(&self) -> String {
        self.output.iter().map(|line| line.render()).collect()
    }
}

/// Walk a section array `depth` levels deep, emitting section headings
/// at intermediate levels and terminal text lines at the leaves.
///
/// Section positions are 1-based. Empty branches are skipped without
/// renumbering their siblings. The immediate parent level of the leaves
/// gets no heading; the leaf refs already encode the position.
pub fn recurse_sections(
    ctx: &mut BookContext,
    names: &[String],
    content: &ContentNode,
    depth: usize,
    level: usize,
    refs: &RefPath,
) -> Result<(), ConvertError> {
    if depth == 0 {
        let text = content
            .as_text()
            .ok_or_else(|| ConvertError::SchemaContentMismatch(refs.en_ref()))?;
        if !text.is_empty() {
            ctx.push_text(text, refs);
        }
        return Ok(());
    }

    let items = content
        .as_list()
        .ok_or_else(|| ConvertError::SchemaContentMismatch(refs.en_ref()))?;

    // Section names run outer to inner; index from the end by the
    // remaining depth.
    let idx = names
        .len()
        .checked_sub(depth)
        .ok_or(ConvertError::DepthMismatch { depth, names: names.len() })?;
    let name = &names[idx];
    let is_daf = name == DAF_SECTION;

    for (i, item) in items.iter().enumerate() {
        let pos = i + 1;
        if item.is_empty() {
            continue;
        }

        let hebrew = if is_daf { to_daf(pos) } else { to_gematria(pos) };
        if depth > 1 {
            ctx.push_heading(level, format!("{} {}", name, hebrew));
        }

        let latin = if is_daf { to_daf_latin(pos) } else { pos.to_string() };
        recurse_sections(
            ctx,
            names,
            item,
            depth - 1,
            level + 1,
            &refs.with_address(latin, hebrew),
        )?;
    }

    Ok(())
}

/// Walk one schema node of a composite book, dispatching into
/// `recurse_sections` at section-array leaves of the node tree.
///
/// A content slot missing for a required child is a
/// `SchemaContentMismatch`, aborting the whole book.
pub fn process_node(
    ctx: &mut BookContext,
    node: &SchemaNode,
    content: &ContentNode,
    level: usize,
    refs: &RefPath,
) -> Result<(), ConvertError> {
    match &node.kind {
        NodeKind::Composite(children) => {
            ctx.push_heading(level, node.he_title.clone());

            for child in children {
                // Default-key children sit in the unkeyed slot and
                // contribute no ref segment.
                let (slot_key, child_refs) = if child.key == "default" {
                    ("", refs.clone())
                } else {
                    (child.title.as_str(), refs.with_name(&child.title, &child.he_title))
                };

                let slot = content.slot(slot_key).ok_or_else(|| {
                    ConvertError::SchemaContentMismatch(if child.title.is_empty() {
                        child.key.clone()
                    } else {
                        child.title.clone()
                    })
                })?;

                process_node(ctx, child, slot, level + 1, &child_refs)?;
            }
        }
        NodeKind::Sections { names, depth } => {
            ctx.push_heading(level, node.he_title.clone());
            recurse_sections(ctx, names, content, *depth, level + 1, refs)?;
        }
    }

    Ok(())
}
