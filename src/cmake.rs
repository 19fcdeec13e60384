use std::collections::{HashMap, HashSet};

/// Call that declares an imported library target.
const ADD_LIBRARY: &str = "add_library(";
/// Call that attaches link interface properties to a target.
const SET_TARGET_PROPERTIES: &str = "set_target_properties(";

/// Generator expression cmake wraps around link-only dependencies. The dollar
/// sign is escaped in exported files.
const LINK_ONLY_PREFIX: &str = "\\$<LINK_ONLY:";
const LINK_ONLY_SUFFIX: &str = ">";

/// A library target recovered from a cmake export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRecord {
    /// Name of the target, e.g. `LLVMSupport`.
    pub name: String,
    /// Link interface of the target, deduplicated, in first-seen order.
    pub deps: Vec<String>,
}

/// Library records keyed by name. Iteration follows the order in which names
/// were first inserted.
#[derive(Debug, Default)]
pub struct Libraries {
    records: Vec<LibraryRecord>,
    index: HashMap<String, usize>,
}

impl Libraries {
    pub fn new() -> Libraries {
        Libraries::default()
    }

    /// Set the dependency list for `name`. A name that is already present
    /// keeps its position and has its list replaced.
    pub fn insert(&mut self, name: &str, deps: Vec<String>) {
        match self.index.get(name) {
            Some(&i) => self.records[i].deps = deps,
            None => {
                self.index.insert(name.to_owned(), self.records.len());
                self.records.push(LibraryRecord {
                    name: name.to_owned(),
                    deps,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LibraryRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Libraries {
    type Item = &'a LibraryRecord;
    type IntoIter = std::slice::Iter<'a, LibraryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Extract every library target and its link interface from the contents of
/// a cmake export file.
///
/// ```text
/// add_library(LLVMSystemZAsmParser STATIC IMPORTED)
///
/// set_target_properties(LLVMSystemZAsmParser PROPERTIES
///   INTERFACE_LINK_LIBRARIES "LLVMMC;LLVMMCParser;LLVMSupport"
/// )
/// ```
///
/// yields `LLVMSystemZAsmParser -> [LLVMMC, LLVMMCParser, LLVMSupport]`.
///
/// Every `add_library` target is entered with an empty list first, then the
/// `set_target_properties` lists are applied on top. Properties for a target
/// that was never added are kept as a new entry. Anything that does not match
/// either call shape is skipped.
pub fn extract_libraries(contents: &str) -> Libraries {
    let mut libraries = Libraries::new();

    for name in scan(contents, ADD_LIBRARY, parse_add_library) {
        libraries.insert(name, Vec::new());
    }

    for (name, list) in scan(contents, SET_TARGET_PROPERTIES, parse_properties)
    {
        libraries.insert(name, split_dependencies(list));
    }

    libraries
}

/// Split a `;` separated link interface into dependency names, unwrapping
/// link-only generator expressions and dropping repeats.
pub fn split_dependencies(list: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    list.split(';')
        .map(normalize_dependency)
        .filter(|dep| seen.insert(*dep))
        .map(str::to_owned)
        .collect()
}

/// Rewrite `\$<LINK_ONLY:name>` to `name`. Other tokens pass through.
pub fn normalize_dependency(dep: &str) -> &str {
    dep.strip_prefix(LINK_ONLY_PREFIX)
        .and_then(|d| d.strip_suffix(LINK_ONLY_SUFFIX))
        .unwrap_or(dep)
}

/// Find every occurrence of `call` in `contents` and hand the text following
/// it to `parse`. A successful parse reports how many bytes it consumed and
/// scanning resumes after them; a failed one resumes just past the start of
/// the candidate.
fn scan<'a, T>(
    contents: &'a str,
    call: &str,
    parse: impl Fn(&'a str) -> Option<(T, usize)>,
) -> Vec<T> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(offset) = contents[pos..].find(call) {
        let start = pos + offset + call.len();
        match parse(&contents[start..]) {
            Some((item, consumed)) => {
                found.push(item);
                pos = start + consumed;
            }
            // call names are ascii, so this stays on a char boundary
            None => pos += offset + 1,
        }
    }
    found
}

/// `<name> <anything>)`, where the arguments may span lines.
fn parse_add_library(rest: &str) -> Option<(&str, usize)> {
    let (name, tail) = identifier(rest)?;
    let tail = tail.strip_prefix(' ')?;
    let close = tail.find(')')?;
    Some((name, consumed(rest, tail) + close + 1))
}

/// `<name> PROPERTIES <whitespace> INTERFACE_LINK_LIBRARIES "<list>" ...)`.
/// The list ends at the first closing quote.
fn parse_properties(rest: &str) -> Option<((&str, &str), usize)> {
    let (name, tail) = identifier(rest)?;
    let tail = tail.strip_prefix(" PROPERTIES")?;
    let trimmed = tail.trim_start();
    if trimmed.len() == tail.len() {
        return None;
    }
    let tail = trimmed.strip_prefix("INTERFACE_LINK_LIBRARIES \"")?;
    let quote = tail.find('"')?;
    let list = &tail[..quote];
    let tail = &tail[quote + 1..];
    let close = tail.find(')')?;
    Some(((name, list), consumed(rest, tail) + close + 1))
}

/// Split a leading run of word characters off `s`.
fn identifier(s: &str) -> Option<(&str, &str)> {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some(s.split_at(end))
    }
}

/// Bytes of `rest` already consumed when only `tail` remains.
fn consumed(rest: &str, tail: &str) -> usize {
    rest.len() - tail.len()
}
