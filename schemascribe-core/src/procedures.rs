//! Stored-procedure categorisation by name.
//!
//! Procedures are bucketed by case-insensitive keyword containment. The
//! categories are tried in a fixed order and the first one with a matching
//! keyword wins, so `getSettings` lands in `Update/Edit` (via `set`) rather
//! than `Get/Generate`.

use std::collections::BTreeMap;
use std::fmt;

/// Semantic bucket for a stored procedure.
///
/// Variant order is the evaluation and rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcedureCategory {
    /// Names containing `add`, `save`, `create`, `insert` or `clone`
    CreateAdd,
    /// Names containing `delete` or `remove`
    DeleteRemove,
    /// Names containing `link` or `join`
    LinkJoin,
    /// Names containing `update`, `edit`, `set` or `domark`
    UpdateEdit,
    /// Names containing `get` or `generate`
    GetGenerate,
    /// Everything no keyword matched
    Miscellaneous,
}

impl ProcedureCategory {
    /// All categories in evaluation order, `Miscellaneous` last.
    pub const ALL: [Self; 6] = [
        Self::CreateAdd,
        Self::DeleteRemove,
        Self::LinkJoin,
        Self::UpdateEdit,
        Self::GetGenerate,
        Self::Miscellaneous,
    ];

    /// Heading used for the category in the document.
    pub fn label(self) -> &'static str {
        match self {
            Self::CreateAdd => "Create/Add",
            Self::DeleteRemove => "Delete/Remove",
            Self::LinkJoin => "Link/Join",
            Self::UpdateEdit => "Update/Edit",
            Self::GetGenerate => "Get/Generate",
            Self::Miscellaneous => "Miscellaneous",
        }
    }

    /// Lowercase keywords that select this category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::CreateAdd => &["add", "save", "create", "insert", "doinsert", "clone"],
            Self::DeleteRemove => &["delete", "remove", "quickdelete", "doremove"],
            Self::LinkJoin => &["link", "join", "dolink", "dojoin"],
            Self::UpdateEdit => &["update", "edit", "set", "domark"],
            Self::GetGenerate => &["get", "generate", "getnext"],
            Self::Miscellaneous => &[],
        }
    }

    /// Classifies a single procedure name.
    pub fn classify(name: &str) -> Self {
        let lowered = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| {
                category
                    .keywords()
                    .iter()
                    .any(|keyword| lowered.contains(keyword))
            })
            .unwrap_or(Self::Miscellaneous)
    }
}

impl fmt::Display for ProcedureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Procedures grouped by category.
///
/// Every category is present, possibly empty, and iterates in
/// [`ProcedureCategory::ALL`] order. Names keep their input order inside a
/// bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedProcedures {
    buckets: BTreeMap<ProcedureCategory, Vec<String>>,
}

impl Default for CategorizedProcedures {
    fn default() -> Self {
        Self {
            buckets: ProcedureCategory::ALL
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
        }
    }
}

impl CategorizedProcedures {
    /// Procedures assigned to `category`.
    pub fn get(&self, category: ProcedureCategory) -> &[String] {
        self.buckets.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Iterates over `(category, procedures)` in fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (ProcedureCategory, &[String])> {
        self.buckets
            .iter()
            .map(|(category, procs)| (*category, procs.as_slice()))
    }

    /// Total number of categorised procedures.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether no procedure was categorised.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    fn push(&mut self, category: ProcedureCategory, name: String) {
        self.buckets.entry(category).or_default().push(name);
    }
}

/// Buckets procedure names by their inferred operation.
pub fn categorize_procedures<I, S>(names: I) -> CategorizedProcedures
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut categorized = CategorizedProcedures::default();
    for name in names {
        let name = name.into();
        let category = ProcedureCategory::classify(&name);
        tracing::trace!("Procedure '{}' categorized as {}", name, category);
        categorized.push(category, name);
    }
    categorized
}

/// Splits an identifier into word tokens.
///
/// Tokens are runs of lowercase ASCII letters, runs of uppercase letters not
/// followed by a lowercase letter (acronyms), and capitalised words. Any other
/// character only separates tokens.
///
/// ```rust
/// use schemascribe_core::procedures::tokenize_identifier;
///
/// assert_eq!(tokenize_identifier("getNextId"), vec!["get", "Next", "Id"]);
/// assert_eq!(tokenize_identifier("loadXMLFeed"), vec!["load", "XML", "Feed"]);
/// ```
pub fn tokenize_identifier(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        if bytes[pos].is_ascii_lowercase() {
            pos = run_end(bytes, pos, u8::is_ascii_lowercase);
            tokens.push(&name[start..pos]);
        } else if bytes[pos].is_ascii_uppercase() {
            let upper_end = run_end(bytes, pos, u8::is_ascii_uppercase);
            let followed_by_lower = bytes.get(upper_end).is_some_and(u8::is_ascii_lowercase);
            if !followed_by_lower {
                tokens.push(&name[start..upper_end]);
                pos = upper_end;
            } else if upper_end - start > 1 {
                // The last capital starts the next word.
                pos = upper_end - 1;
                tokens.push(&name[start..pos]);
            } else {
                pos = run_end(bytes, upper_end, u8::is_ascii_lowercase);
                tokens.push(&name[start..pos]);
            }
        } else {
            pos += name[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }

    tokens
}

fn run_end(bytes: &[u8], from: usize, pred: fn(&u8) -> bool) -> usize {
    bytes[from..]
        .iter()
        .position(|b| !pred(b))
        .map_or(bytes.len(), |offset| from + offset)
}

/// Produces a readable gloss for a procedure name.
///
/// Tokens that are entirely uppercase stay as they are; every other token is
/// capitalised.
///
/// ```rust
/// use schemascribe_core::procedures::describe_procedure;
///
/// assert_eq!(describe_procedure("getNextId"), "Get Next Id");
/// assert_eq!(describe_procedure("add_user_to_group"), "Add User To Group");
/// ```
pub fn describe_procedure(name: &str) -> String {
    tokenize_identifier(name)
        .into_iter()
        .map(|token| {
            if token.bytes().all(|b| b.is_ascii_uppercase()) {
                token.to_string()
            } else {
                capitalize(token)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
