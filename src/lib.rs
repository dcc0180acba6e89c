//! Static API documentation extraction for PHP source trees.
//!
//! An [`ApiParser`] scans one or more source roots, extracts the single
//! class, interface or trait each file declares, resolves every name and
//! documented type to its fully-qualified form, and flattens inheritance
//! so that each class lists all of its members (own and inherited, with
//! provenance).  The result is a symbol table of [`ClassRecord`]s that
//! serialises to JSON.
//!
//! ```no_run
//! use phpdoc_api::{ApiParser, Config};
//!
//! let mut config = Config::new("/srv/app");
//! config.sources = vec!["src".into()];
//! let mut parser = ApiParser::new(config)?;
//! parser.parse();
//! for failed in parser.failed_paths() {
//!     eprintln!("{}: {}", failed.path.display(), failed.error);
//! }
//! # Ok::<(), phpdoc_api::ConfigError>(())
//! ```
//!
//! The pipeline runs in fixed phases, each one a method on the parser so
//! it can also be driven step by step:
//!
//! 1. [`ApiParser::extract_all`] parses every discovered file into the
//!    symbol table (failures go to [`ApiParser::failed_paths`]).
//! 2. [`ApiParser::resolve_inheritance`] merges ancestor members and
//!    resolves `{@inheritDoc}`.
//! 3. [`ApiParser::link_references`] marks type references that point at
//!    parsed classes.
//! 4. [`ApiParser::sort_definitions`] puts members into display order.

use std::path::{Path, PathBuf};

use glob::Pattern;
use indexmap::IndexSet;

pub mod config;
pub mod docblock;
pub mod error;
mod events;
mod inheritance;
mod linking;
pub mod parser;
pub mod paths;
pub mod resolution;
pub mod symbols;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, ConstExprError, MalformedType, ParseError};
pub use inheritance::PendingDoc;
pub use symbols::{ClassMap, ClassMapNode, SymbolTable};
pub use types::*;

/// One documentation run: configuration plus everything it produced.
///
/// Each parser owns its own symbol table; independent runs never share
/// state.
#[derive(Debug)]
pub struct ApiParser {
    config: Config,
    ignore: Vec<Pattern>,
    /// Discovered source files, cached until [`ApiParser::refresh_paths`].
    paths: Option<Vec<PathBuf>>,
    classes: SymbolTable,
    namespaces: IndexSet<String>,
    failed: Vec<FailedPath>,
    unresolved_docs: Vec<PendingDoc>,
}

impl ApiParser {
    /// Create a parser.  Fails only when an ignore pattern is not a valid
    /// glob.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let ignore = config.ignore_patterns()?;
        Ok(ApiParser {
            config,
            ignore,
            paths: None,
            classes: SymbolTable::new(),
            namespaces: IndexSet::new(),
            failed: Vec::new(),
            unresolved_docs: Vec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The source files to parse.  Discovered once and cached.
    pub fn paths(&mut self) -> &[PathBuf] {
        if self.paths.is_none() {
            return self.refresh_paths();
        }
        self.paths.as_deref().unwrap_or_default()
    }

    /// Re-walk the source roots, replacing the cached file list.
    pub fn refresh_paths(&mut self) -> &[PathBuf] {
        let found = paths::discover(
            &self.config.source_roots(),
            &self.config.extensions,
            &self.ignore,
        );
        self.paths.insert(found)
    }

    /// Run the whole pipeline and return the finished symbol table.
    pub fn parse(&mut self) -> &SymbolTable {
        self.extract_all();
        self.resolve_inheritance();
        self.link_references();
        self.sort_definitions();
        &self.classes
    }

    /// Parse every source file into the symbol table, starting from an
    /// empty table.
    pub fn extract_all(&mut self) {
        self.classes.clear();
        self.namespaces.clear();
        self.failed.clear();
        self.unresolved_docs.clear();

        let paths = self.paths().to_vec();
        for path in &paths {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(source) => {
                    let err = ParseError::Io {
                        path: path.clone(),
                        source,
                    };
                    self.record_failure(path, &err);
                    continue;
                }
            };
            // Failures are already recorded.
            let _ = self.extract_source(path, &content);
        }

        tracing::debug!(
            "extracted {} classes, {} failed",
            self.classes.len(),
            self.failed.len()
        );
    }

    /// Parse one unit from memory and add it to the symbol table.
    ///
    /// On failure the unit is also recorded in [`ApiParser::failed_paths`].
    pub fn extract_source(&mut self, path: &Path, content: &str) -> Result<&ClassRecord, ParseError> {
        let record = match parser::parse_unit(path, content) {
            Ok(record) => record,
            Err(err) => {
                self.record_failure(path, &err);
                return Err(err);
            }
        };

        if let Some(first) = self.classes.get(&record.fqn) {
            let err = ParseError::DuplicateClass {
                name: record.fqn.clone(),
                first: first.file.clone(),
            };
            self.record_failure(path, &err);
            return Err(err);
        }

        self.namespaces.insert(record.namespace.clone());
        let fqn = record.fqn.clone();
        Ok(self.classes.entry(fqn).or_insert(record))
    }

    /// Merge ancestor members into every class and trait, then resolve
    /// inherited documentation in a second pass.
    pub fn resolve_inheritance(&mut self) {
        let pending = inheritance::resolve_inheritance(&mut self.classes);
        self.unresolved_docs = inheritance::second_pass_inherited_docs(&mut self.classes, pending);
    }

    /// Mark type references that point at parsed classes.  Run after
    /// [`ApiParser::resolve_inheritance`].
    pub fn link_references(&mut self) {
        linking::link_references(&mut self.classes);
    }

    /// Put members into display order: own before inherited, then by
    /// visibility, then by name.
    pub fn sort_definitions(&mut self) {
        symbols::sort_definitions(&mut self.classes);
    }

    /// Every namespace that declared a parsed class, in discovery order.
    pub fn namespaces(&self) -> &IndexSet<String> {
        &self.namespaces
    }

    pub fn classes(&self) -> &SymbolTable {
        &self.classes
    }

    /// Look up a class by fully-qualified name (a leading `\` is allowed).
    pub fn class(&self, fqn: &str) -> Option<&ClassRecord> {
        self.classes.get(resolution::normalize_fqn(fqn))
    }

    pub fn class_map(&self) -> ClassMap {
        symbols::build_class_map(&self.classes)
    }

    pub fn failed_paths(&self) -> &[FailedPath] {
        &self.failed
    }

    /// `{@inheritDoc}` requests no ancestor could satisfy.
    pub fn unresolved_inherited_docs(&self) -> &[PendingDoc] {
        &self.unresolved_docs
    }

    fn record_failure(&mut self, path: &Path, err: &ParseError) {
        tracing::warn!("{}: {}", path.display(), err);
        self.failed.push(FailedPath {
            path: path.to_path_buf(),
            error: err.to_string(),
        });
    }
}
