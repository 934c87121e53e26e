//! Corpus walker: discovers book file pairs under a Sefaria-style JSON
//! export, converts each book, and serializes the corpus-wide citation
//! index.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::book::{Blacklist, process_book};
use crate::logger;
use crate::types::{BookSchema, CitationRecord};

/// Summary totals of one corpus conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub books_written: usize,
    pub books_blacklisted: usize,
    pub books_failed: usize,
    pub citation_count: usize,
}

/// Convert every book under `json_dir` (one `<Title>/Hebrew/merged.json`
/// per book, schema at `schemas_dir/<Title with underscores>.json`) into
/// flat text files under `output_dir`, then write the citation index to
/// `refs_csv`.
///
/// Books are visited in path order, so repeated runs over unchanged
/// inputs produce byte-identical outputs and an identical index. A
/// malformed book is logged and skipped; the walk continues.
pub fn convert_corpus(
    json_dir: &Path,
    schemas_dir: &Path,
    output_dir: &Path,
    blacklist_path: &Path,
    refs_csv: &Path,
) -> Result<ConvertStats> {
    let blacklist = Blacklist::load_or_empty(blacklist_path);
    let mut stats = ConvertStats::default();
    let mut citations: Vec<CitationRecord> = Vec::new();

    // Citation paths start with the output root's own directory name.
    let output_root = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    logger::info(&format!("Converting corpus: {:?}", json_dir));

    for entry in WalkDir::new(json_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file()
            || entry.file_name().to_str() != Some("merged.json")
        {
            continue;
        }
        let text_path = entry.path();
        let Some(hebrew_dir) = text_path.parent() else { continue };
        if hebrew_dir.file_name().and_then(|n| n.to_str()) != Some("Hebrew") {
            continue;
        }
        let Some(title) = hebrew_dir
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };

        if blacklist.contains(&title) {
            stats.books_blacklisted += 1;
            continue;
        }

        let schema_path = schemas_dir.join(format!("{}.json", title.replace(' ', "_")));
        match convert_one_book(
            text_path,
            &schema_path,
            output_dir,
            &output_root,
            &blacklist,
            &mut citations,
        ) {
            Ok(true) => stats.books_written += 1,
            Ok(false) => stats.books_blacklisted += 1,
            Err(e) => {
                logger::error(&format!("Skipping '{}': {:#}", title, e));
                stats.books_failed += 1;
            }
        }
    }

    stats.citation_count = citations.len();
    write_citation_index(refs_csv, &citations)?;

    logger::info(&format!(
        "Corpus done: {} written, {} blacklisted, {} failed, {} citations",
        stats.books_written, stats.books_blacklisted, stats.books_failed, stats.citation_count
    ));

    Ok(stats)
}

fn convert_one_book(
    text_path: &Path,
    schema_path: &Path,
    output_dir: &Path,
    output_root: &str,
    blacklist: &Blacklist,
    citations: &mut Vec<CitationRecord>,
) -> Result<bool> {
    let schema = BookSchema::load(schema_path)?;

    let mut book_dir: PathBuf = output_dir.to_path_buf();
    let mut rel_segments: Vec<String> = Vec::new();
    if !output_root.is_empty() {
        rel_segments.push(output_root.to_string());
    }
    for category in &schema.he_categories {
        let segment = category.replace('"', "");
        book_dir.push(&segment);
        rel_segments.push(segment);
    }
    fs::create_dir_all(&book_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", book_dir))?;

    let display_title = schema.he_title().replace(['"', '\''], "");
    let out_file = book_dir.join(&display_title);
    rel_segments.push(display_title);
    let rel_path = rel_segments.join("/");

    match process_book(text_path, &schema, &out_file, &rel_path, blacklist)? {
        Some(mut records) => {
            logger::debug(&format!("Wrote {:?} ({} citations)", out_file, records.len()));
            citations.append(&mut records);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Serialize the accumulated citation records as a CSV table with
/// columns ref, heRef, path, line_index, one row per emitted text line
/// in corpus-walk order.
fn write_citation_index(refs_csv: &Path, citations: &[CitationRecord]) -> Result<()> {
    if let Some(parent) = refs_csv.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let mut writer = csv::Writer::from_path(refs_csv)
        .with_context(|| format!("Failed to create citation index: {:?}", refs_csv))?;
    if citations.is_empty() {
        // serialize() below emits the header row; keep it for empty runs too.
        writer
            .write_record(["ref", "heRef", "path", "line_index"])
            .context("Failed to write citation index header")?;
    }
    for record in citations {
        writer
            .serialize(record)
            .context("Failed to write citation record")?;
    }
    writer.flush().context("Failed to flush citation index")?;

    Ok(())
}
