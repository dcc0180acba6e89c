#![allow(dead_code)]

use std::fs;

use phpdoc_api::{ApiParser, Config};

/// Helper: create a temp workspace containing the given PHP files and
/// return a parser configured with that workspace as its base path.
pub fn create_workspace(files: &[(&str, &str)]) -> (ApiParser, tempfile::TempDir) {
    create_workspace_with(files, |_| {})
}

/// Like [`create_workspace`], with a hook to adjust the config first.
pub fn create_workspace_with(
    files: &[(&str, &str)],
    configure: impl FnOnce(&mut Config),
) -> (ApiParser, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (rel_path, content) in files {
        let full = dir.path().join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write PHP file");
    }

    let mut config = Config::new(dir.path());
    configure(&mut config);
    let parser = ApiParser::new(config).expect("valid config");
    (parser, dir)
}

/// Helper: build a workspace and run the whole pipeline on it.
pub fn parse_workspace(files: &[(&str, &str)]) -> (ApiParser, tempfile::TempDir) {
    let (mut parser, dir) = create_workspace(files);
    parser.parse();
    (parser, dir)
}

/// Names of a member list, in order.
pub fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|i| name(i).to_string()).collect()
}
