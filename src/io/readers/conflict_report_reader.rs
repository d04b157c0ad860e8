use crate::formulas::FormulaStore;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader};

/// Reads a conflict-set report and populates the given [`FormulaStore`].
///
/// The report is the plain-text explanation output of an ontology reasoner.
/// It is a sequence of blocks: a block is opened by a line starting (after
/// trimming) with `Found explanation <` or `Explanation <`. Inside an open
/// block, every line starting with `[` contributes one formula, whose
/// canonical text is everything after the first `]`, trimmed. Any other line
/// closes the block and flushes the accumulated formula set as one conflict
/// set; sets that are equal to an already flushed set are discarded.
///
/// Formula identifiers are assigned by [`FormulaStore::intern`] in strict
/// first-encounter order over the whole report.
///
/// The reader is deliberately permissive and mirrors the shape of real
/// reasoner output: bracketed lines outside an open block are ignored, a
/// marker line immediately following block content re-opens the block
/// without flushing it, and a block still open at the end of input is
/// dropped. A report therefore has to terminate its final block with a
/// non-bracketed line (usually a blank one) for that block to be kept.
///
/// Returns the conflict sets as sets of formula texts. If the file cannot be
/// read, a respective [`io::Error`] is returned.
///
/// # Example
///
/// Assume there is a file `data/mups/university/res.txt` with the contents:
/// ```text
/// Found explanation <http://example.org/university#0>
/// [1] SubClassOf(Professor, Staff)
/// [2] DisjointClasses(Professor, Staff)
/// ```
/// followed by a blank line. Then:
///
/// ```no_run
/// # use ontodiag::formulas::FormulaStore;
/// # use ontodiag::io::read_conflict_report;
/// let mut store = FormulaStore::new();
/// let conflict_sets = read_conflict_report("data/mups/university/res.txt", &mut store).unwrap();
/// assert_eq!(conflict_sets.len(), 1);
/// assert_eq!(store.id_of("SubClassOf(Professor, Staff)"), Some(0));
/// ```
pub fn read_conflict_report(file_path: &str, store: &mut FormulaStore) -> io::Result<Vec<BTreeSet<String>>> {
    let reader = BufReader::new(File::open(file_path)?);
    let marker = Regex::new(r"^(Found explanation|Explanation) <").unwrap();

    let mut conflict_sets: Vec<BTreeSet<String>> = Vec::new();
    let mut block: Vec<String> = Vec::new();
    let mut block_open = false;

    for l in reader.lines() {
        let line = l?;
        let trimmed = line.trim();
        if marker.is_match(trimmed) {
            block_open = true;
        } else if !trimmed.is_empty() && trimmed.starts_with('[') {
            if block_open {
                let content_start = trimmed.find(']').map_or(0, |i| i + 1);
                let text = trimmed[content_start..].trim();
                if !block.iter().any(|known| known == text) {
                    block.push(text.to_string());
                }
                store.intern(text);
            }
        } else {
            block_open = false;
            if !block.is_empty() {
                let set: BTreeSet<String> = block.drain(..).collect();
                if !conflict_sets.contains(&set) {
                    conflict_sets.push(set);
                }
            }
        }
    }
    Ok(conflict_sets)
}
