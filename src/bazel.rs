use crate::cmake::{Libraries, LibraryRecord};
use serde_derive::Deserialize;
use std::collections::HashMap;
use tracing::trace;

/// Directory the prebuilt static archives live in, relative to the BUILD
/// file.
const LIB_DIR: &str = "lib";

/// Prefix given to every generated rule name.
const RULE_PREFIX: &str = "lib_";

/// System libraries that are passed to the linker rather than built.
const SYSTEM_LIBRARIES: &[(&str, &str)] = &[
    ("m", "-lm"),
    ("ZLIB::ZLIB", "-lz"),
    ("Terminfo::terminfo", "-lncurses"),
    ("LibEdit::LibEdit", "-ledit"),
    ("LibXml2::LibXml2", "-lxml2"),
    ("-framework CoreServices", "-framework CoreServices"),
    ("rt", "-lrt"),
    ("dl", "-ldl"),
    ("-lpthread", "-lpthread"),
];

/// Dependencies provided by external repositories.
const EXTERNAL_DEPS: &[(&str, &str)] = &[
    ("zstd::libzstd_static", "@zstd"),
    ("zstd::libzstd_shared", "@zstd"),
];

/// Where a cmake dependency ends up in the generated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Raw linker flag for `linkopts`.
    LinkOpt(String),
    /// Label of a rule in another repository.
    External(String),
    /// Another library converted from the same export file.
    Internal(String),
}

/// Lookup tables used to classify dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tables {
    /// cmake dependency name -> linker flag.
    #[serde(default)]
    pub system_libraries: HashMap<String, String>,
    /// cmake dependency name -> external label.
    #[serde(default)]
    pub external_deps: HashMap<String, String>,
}

impl Default for Tables {
    fn default() -> Tables {
        fn table(entries: &[(&str, &str)]) -> HashMap<String, String> {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }
        Tables {
            system_libraries: table(SYSTEM_LIBRARIES),
            external_deps: table(EXTERNAL_DEPS),
        }
    }
}

impl Tables {
    /// Classify a dependency. System libraries win over external
    /// dependencies; anything unknown is assumed to be a sibling library.
    pub fn classify(&self, dep: &str) -> Dependency {
        if let Some(flag) = self.system_libraries.get(dep) {
            Dependency::LinkOpt(flag.clone())
        } else if let Some(label) = self.external_deps.get(dep) {
            Dependency::External(label.clone())
        } else {
            Dependency::Internal(dep.to_owned())
        }
    }
}

/// A set of rules making up one generated BUILD fragment.
pub struct BuildFile {
    /// Rules in emission order.
    pub rules: Vec<CcLibrary>,
}

impl BuildFile {
    /// Produce one rule per library, in the order the libraries were found.
    pub fn from_libraries(libraries: &Libraries, tables: &Tables) -> BuildFile {
        BuildFile {
            rules: libraries
                .iter()
                .map(|record| CcLibrary::from_record(record, tables))
                .collect(),
        }
    }

    /// Emit every rule in text form, each followed by a blank line.
    pub fn emit(&self) -> String {
        let mut s = String::new();
        for rule in &self.rules {
            s += &rule.emit();
            s += "\n";
        }
        s
    }
}

/// A `cc_library` rule wrapping a prebuilt static archive.
#[derive(Debug, PartialEq, Eq)]
pub struct CcLibrary {
    /// Rule name.
    pub name: String,
    /// Archive paths.
    pub srcs: Vec<String>,
    /// Local labels followed by external labels.
    pub deps: Vec<String>,
    /// Linker flags.
    pub linkopts: Vec<String>,
}

impl CcLibrary {
    /// Build the rule for one library. Local dependencies come before
    /// external ones in `deps`; each group keeps the cmake order.
    pub fn from_record(record: &LibraryRecord, tables: &Tables) -> CcLibrary {
        let mut internal = Vec::new();
        let mut external = Vec::new();
        let mut linkopts = Vec::new();

        for dep in &record.deps {
            let class = tables.classify(dep);
            trace!(library = %record.name, dep = %dep, ?class, "classified");
            match class {
                Dependency::LinkOpt(flag) => linkopts.push(flag),
                Dependency::External(label) => external.push(label),
                Dependency::Internal(name) => {
                    internal.push(format!(":{}{}", RULE_PREFIX, name))
                }
            }
        }
        internal.extend(external);

        CcLibrary {
            name: format!("{}{}", RULE_PREFIX, record.name),
            srcs: vec![format!("{}/lib{}.a", LIB_DIR, record.name)],
            deps: internal,
            linkopts,
        }
    }

    /// Emit this rule in text form. Empty list attributes are left out.
    pub fn emit(&self) -> String {
        let mut s = String::from("cc_library(\n");
        s += &format!("    name = \"{}\",\n", self.name);
        s += &emit_list("srcs", &self.srcs);
        s += &emit_list("deps", &self.deps);
        s += &emit_list("linkopts", &self.linkopts);
        s += ")\n";
        s
    }
}

/// Emit a list attribute with one quoted item per line.
fn emit_list(attr: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut s = format!("    {} = [\n", attr);
    for item in items {
        s += &format!("        \"{}\",\n", item);
    }
    s += "    ],\n";
    s
}
