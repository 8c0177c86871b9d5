//! Result-file selection and algorithm label derivation.
//!
//! The caller lists the results directory; this module decides which entries
//! are result tables, fixes their order and names the algorithm behind each
//! one. The order established here is authoritative for the rest of the
//! pipeline: it drives the `algo<N>` fallback numbering, the left-to-right
//! order of per-algorithm output columns and the collapse tie-break.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::MergeError;

/// File names must start with this prefix (ASCII case-insensitive).
pub const RESULT_PREFIX: &str = "result";

/// Required file extension (ASCII case-insensitive).
pub const RESULT_EXTENSION: &str = "csv";

// Never fails: the pattern is a literal. The fallback exists only because the
// workspace bans unwrap() and expect().
static LABEL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^results?").unwrap_or_else(|_| {
        Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
    })
});

/// One selected input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultFile {
    /// Full path as listed by the caller.
    pub path: PathBuf,
    /// The file name component, used in messages.
    pub name: String,
    /// Algorithm label, unique within a run.
    pub label: String,
}

/// Returns `true` when `path` names a result table by file name alone.
pub fn is_result_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let has_prefix = name
        .get(..RESULT_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(RESULT_PREFIX));
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(RESULT_EXTENSION));
    has_prefix && has_extension
}

/// Derives the algorithm label for the file at discovery position `index`
/// (0-based).
///
/// The stem loses a leading `result` or `results` (any case) and then any
/// leading `_` or `-`. An empty remainder falls back to `algo<index + 1>`.
pub fn algorithm_label(path: &Path, index: usize) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stripped = LABEL_PREFIX_RE.replace(&stem, "");
    let label = stripped.trim_start_matches(['_', '-']);
    if label.is_empty() {
        format!("algo{}", index + 1)
    } else {
        label.to_owned()
    }
}

/// Selects the result tables among `entries`, sorted ascending by file name,
/// and labels each one.
///
/// `dir` is only used for error reporting.
///
/// # Errors
///
/// - [`MergeError::NoMatchingFiles`] when nothing matches.
/// - [`MergeError::SingleFileOnly`] when exactly one file matches.
/// - [`MergeError::DuplicateAlgorithmLabel`] when two files derive the same label.
pub fn select_result_files<I>(dir: &Path, entries: I) -> Result<Vec<ResultFile>, MergeError>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut named: Vec<(String, PathBuf)> = entries
        .into_iter()
        .filter(|p| is_result_file(p))
        .filter_map(|p| {
            let name = p.file_name()?.to_str()?.to_owned();
            Some((name, p))
        })
        .collect();
    named.sort_by(|a, b| a.0.cmp(&b.0));

    match named.as_slice() {
        [] => {
            return Err(MergeError::NoMatchingFiles {
                dir: dir.to_path_buf(),
            });
        }
        [(_, only)] => {
            return Err(MergeError::SingleFileOnly { file: only.clone() });
        }
        [_, _, ..] => {}
    }

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut files = Vec::with_capacity(named.len());
    for (index, (name, path)) in named.into_iter().enumerate() {
        let label = algorithm_label(&path, index);
        if let Some(first) = seen.get(&label) {
            return Err(MergeError::DuplicateAlgorithmLabel {
                label,
                first: first.clone(),
                second: name,
            });
        }
        seen.insert(label.clone(), name.clone());
        files.push(ResultFile { path, name, label });
    }
    Ok(files)
}
