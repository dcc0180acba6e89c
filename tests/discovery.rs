mod common;

use std::fs;

use common::{create_workspace, create_workspace_with, parse_workspace};
use phpdoc_api::{ApiParser, ClassMapNode, Config, ConfigError};

fn file_names(parser: &mut ApiParser) -> Vec<String> {
    parser
        .paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

// ─── Discovery ──────────────────────────────────────────────────────────────

#[test]
fn test_discovery_recurses_and_filters_extensions() {
    let (mut parser, dir) = create_workspace(&[
        ("src/Models/User.php", "<?php\nclass User {}\n"),
        ("src/Post.php", "<?php\nclass Post {}\n"),
        ("src/notes.txt", "not php"),
        ("src/Legacy.PHP", "<?php\nclass Legacy {}\n"),
    ]);

    // Depth-first, entries in file-name order.
    assert_eq!(file_names(&mut parser), vec!["Legacy.PHP", "User.php", "Post.php"]);
    assert!(parser.paths().iter().all(|p| p.is_absolute()));
    assert!(parser.paths().iter().all(|p| p.starts_with(dir.path())));
}

#[test]
fn test_discovery_order_is_stable() {
    let files = [
        ("b/Second.php", "<?php\nclass Second {}\n"),
        ("a/First.php", "<?php\nclass First {}\n"),
        ("c/d/Third.php", "<?php\nclass Third {}\n"),
    ];
    let (mut parser, _dir) = create_workspace(&files);
    let first = parser.paths().to_vec();
    let second = parser.refresh_paths().to_vec();
    assert_eq!(first, second);
    assert_eq!(file_names(&mut parser), vec!["First.php", "Second.php", "Third.php"]);
}

#[test]
fn test_sources_restrict_the_walk() {
    let (mut parser, _dir) = create_workspace_with(
        &[
            ("src/App.php", "<?php\nclass App {}\n"),
            ("vendor/Lib.php", "<?php\nclass Lib {}\n"),
        ],
        |config| config.sources = vec!["src".into(), "missing".into()],
    );
    assert_eq!(file_names(&mut parser), vec!["App.php"]);
}

#[test]
fn test_ignore_patterns_match_absolute_paths() {
    let (mut parser, _dir) = create_workspace_with(
        &[
            ("src/App.php", "<?php\nclass App {}\n"),
            ("src/Tests/AppTest.php", "<?php\nclass AppTest {}\n"),
            ("src/Fixtures/fixture.php", "<?php\nclass Fixture {}\n"),
        ],
        |config| {
            config.ignore = vec!["*/Tests/*".to_string(), "*/fixture.php".to_string()];
        },
    );
    assert_eq!(file_names(&mut parser), vec!["App.php"]);
}

#[test]
fn test_custom_extensions() {
    let (mut parser, _dir) = create_workspace_with(
        &[
            ("View.inc", "<?php\nclass View {}\n"),
            ("Model.php", "<?php\nclass Model {}\n"),
        ],
        |config| config.extensions = vec!["inc".to_string()],
    );
    assert_eq!(file_names(&mut parser), vec!["View.inc"]);
}

#[test]
fn test_invalid_ignore_pattern_is_rejected() {
    let mut config = Config::new("/tmp");
    config.ignore = vec!["[unclosed".to_string()];
    let err = ApiParser::new(config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidIgnorePattern { .. }));
}

// ─── Whole runs ─────────────────────────────────────────────────────────────

#[test]
fn test_parse_collects_classes_namespaces_and_failures() {
    let (parser, _dir) = parse_workspace(&[
        ("a/User.php", "<?php\nnamespace App\\Models;\nclass User {}\n"),
        ("b/Helpers.php", "<?php\nfunction helper() {}\n"),
        ("c/Plain.php", "<?php\nclass Plain {}\n"),
        ("d/Post.php", "<?php\nnamespace App\\Models;\nclass Post {}\n"),
        ("e/User.php", "<?php\nnamespace App\\Models;\nclass User {}\n"),
    ]);

    assert_eq!(
        parser.classes().keys().collect::<Vec<_>>(),
        vec!["App\\Models\\User", "Plain", "App\\Models\\Post"]
    );
    assert_eq!(
        parser.namespaces().iter().collect::<Vec<_>>(),
        vec!["App\\Models", "__GLOBAL__"]
    );

    let failed: Vec<String> = parser
        .failed_paths()
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(failed, vec!["Helpers.php", "User.php"]);
    assert!(parser.failed_paths()[1].error.contains("duplicate class"));
    assert!(
        parser
            .class("App\\Models\\User")
            .unwrap()
            .file
            .ends_with("a/User.php")
    );
}

#[test]
fn test_parse_twice_starts_from_scratch() {
    let (mut parser, dir) = parse_workspace(&[("One.php", "<?php\nclass One {}\n")]);
    assert_eq!(parser.classes().len(), 1);

    fs::write(dir.path().join("Two.php"), "<?php\nclass Two {}\n").unwrap();
    parser.refresh_paths();
    parser.parse();
    assert_eq!(parser.classes().len(), 2);
    assert!(parser.failed_paths().is_empty());
}

#[test]
fn test_class_map_nests_namespaces() {
    let (parser, _dir) = parse_workspace(&[
        ("User.php", "<?php\nnamespace App\\Models;\nclass User {}\n"),
        ("Kernel.php", "<?php\nnamespace App;\nclass Kernel {}\n"),
        ("Plain.php", "<?php\nclass Plain {}\n"),
    ]);

    let map = parser.class_map();
    assert_eq!(
        map.get("Plain"),
        Some(&ClassMapNode::Class("Plain".to_string()))
    );
    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "App": {
                "Kernel": "App\\Kernel",
                "Models": { "User": "App\\Models\\User" }
            },
            "Plain": "Plain"
        })
    );
}

#[test]
fn test_config_file_drives_the_run() {
    let (_parser, dir) = create_workspace(&[
        ("lib/Service.php", "<?php\nnamespace Lib;\nclass Service {}\n"),
        ("lib/Internal/Secret.php", "<?php\nnamespace Lib\\Internal;\nclass Secret {}\n"),
    ]);
    let config_path = dir.path().join("phpdoc.toml");
    fs::write(
        &config_path,
        "sources = [\"lib\"]\nignore = [\"*/Internal/*\"]\n",
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    let mut parser = ApiParser::new(config).unwrap();
    parser.parse();
    assert_eq!(
        parser.classes().keys().collect::<Vec<_>>(),
        vec!["Lib\\Service"]
    );
}
