mod common;

use common::{names, parse_workspace};
use phpdoc_api::{Inherited, MemberKind, PendingDoc, TypeRef, Visibility};

fn inherited(from: &str, name: &str) -> Option<Inherited> {
    Some(Inherited {
        from_class: from.to_string(),
        from_name: name.to_string(),
    })
}

#[test]
fn test_parent_method_is_inherited_with_provenance() {
    let (parser, _dir) = parse_workspace(&[
        (
            "A.php",
            "<?php\nnamespace Docs;\nclass A {\n    /** Does foo. */\n    public function foo() {}\n}\n",
        ),
        ("B.php", "<?php\nnamespace Docs;\nclass B extends A {}\n"),
    ]);

    let b = parser.class("Docs\\B").unwrap();
    assert_eq!(names(&b.methods, |m| &m.name), vec!["foo"]);
    let foo = &b.methods[0];
    assert_eq!(foo.inherited, inherited("Docs\\A", "foo"));
    assert_eq!(
        foo.docs.as_ref().and_then(|d| d.summary.as_deref()),
        Some("<p>Does foo.</p>")
    );

    // The ancestor itself is untouched.
    let a = parser.class("\\Docs\\A").unwrap();
    assert_eq!(a.methods[0].inherited, None);
}

#[test]
fn test_transitive_members_point_at_declaring_class() {
    // C is discovered (and therefore merged) before its ancestors.
    let (parser, _dir) = parse_workspace(&[
        ("a/C.php", "<?php\nnamespace Docs;\nclass C extends B {}\n"),
        (
            "b/B.php",
            "<?php\nnamespace Docs;\nclass B extends A {\n    protected $fromB;\n}\n",
        ),
        (
            "c/A.php",
            "<?php\nnamespace Docs;\nclass A {\n    const VERSION = 2;\n    public function root() {}\n}\n",
        ),
    ]);

    let c = parser.class("Docs\\C").unwrap();
    assert_eq!(c.method("root").unwrap().inherited, inherited("Docs\\A", "root"));
    assert_eq!(
        c.constant("VERSION").unwrap().inherited,
        inherited("Docs\\A", "VERSION")
    );
    assert_eq!(
        c.property("fromB").unwrap().inherited,
        inherited("Docs\\B", "fromB")
    );
}

#[test]
fn test_own_member_shadows_ancestor() {
    let (parser, _dir) = parse_workspace(&[
        (
            "Base.php",
            "<?php\nnamespace Docs;\nclass Base {\n    public function run(): int { return 1; }\n}\n",
        ),
        (
            "Child.php",
            "<?php\nnamespace Docs;\nclass Child extends Base {\n    protected function run(): string { return ''; }\n}\n",
        ),
    ]);

    let child = parser.class("Docs\\Child").unwrap();
    assert_eq!(child.methods.len(), 1);
    let run = &child.methods[0];
    assert_eq!(run.inherited, None);
    assert_eq!(run.visibility, Visibility::Protected);
    assert_eq!(run.return_type, Some(TypeRef::scalar("string")));
}

#[test]
fn test_trait_members_win_over_parent() {
    let (parser, _dir) = parse_workspace(&[
        (
            "Base.php",
            "<?php\nnamespace Docs;\nclass Base {\n    public function hello() {}\n}\n",
        ),
        (
            "Greets.php",
            "<?php\nnamespace Docs;\ntrait Greets {\n    public function hello() {}\n}\n",
        ),
        (
            "Person.php",
            "<?php\nnamespace Docs;\nclass Person extends Base {\n    use Greets;\n}\n",
        ),
    ]);

    let person = parser.class("Docs\\Person").unwrap();
    assert_eq!(
        person.method("hello").unwrap().inherited,
        inherited("Docs\\Greets", "hello")
    );
}

#[test]
fn test_interfaces_do_not_inherit() {
    let (parser, _dir) = parse_workspace(&[
        (
            "Readable.php",
            "<?php\nnamespace Docs;\ninterface Readable {\n    public function read(): string;\n}\n",
        ),
        (
            "Stream.php",
            "<?php\nnamespace Docs;\ninterface Stream extends Readable {\n    public function close(): void;\n}\n",
        ),
        (
            "File.php",
            "<?php\nnamespace Docs;\nabstract class File implements Readable {}\n",
        ),
    ]);

    let stream = parser.class("Docs\\Stream").unwrap();
    assert_eq!(names(&stream.methods, |m| &m.name), vec!["close"]);

    let file = parser.class("Docs\\File").unwrap();
    assert_eq!(
        file.method("read").unwrap().inherited,
        inherited("Docs\\Readable", "read")
    );
}

#[test]
fn test_external_ancestors_are_skipped() {
    let (parser, _dir) = parse_workspace(&[(
        "Job.php",
        "<?php\nnamespace Docs;\nuse Vendor\\Queue\\Job as BaseJob;\nclass Job extends BaseJob {\n    public function handle() {}\n}\n",
    )]);

    let job = parser.class("Docs\\Job").unwrap();
    assert_eq!(names(&job.methods, |m| &m.name), vec!["handle"]);
    assert_eq!(
        job.parent,
        Some(TypeRef::reference("BaseJob", "Vendor\\Queue\\Job"))
    );
    assert!(parser.failed_paths().is_empty());
}

// ─── {@inheritDoc} ──────────────────────────────────────────────────────────

#[test]
fn test_inherit_doc_copies_ancestor_docs() {
    let (parser, _dir) = parse_workspace(&[
        (
            "Repository.php",
            concat!(
                "<?php\nnamespace Docs;\n",
                "class Repository {\n",
                "    /**\n",
                "     * Finds a record.\n",
                "     * @param int $id The key.\n",
                "     * @return Model\n",
                "     */\n",
                "    public function find($id) {}\n",
                "}\n",
            ),
        ),
        (
            "Users.php",
            concat!(
                "<?php\nnamespace Docs;\n",
                "class Users extends Repository {\n",
                "    /** {@inheritDoc} */\n",
                "    public function find($id) {}\n",
                "}\n",
            ),
        ),
    ]);

    let users = parser.class("Docs\\Users").unwrap();
    let find = users.method("find").unwrap();
    assert_eq!(find.inherited, None);
    let docs = find.docs.as_ref().unwrap();
    assert!(!docs.inherit);
    assert_eq!(docs.summary.as_deref(), Some("<p>Finds a record.</p>"));

    // The copied docs flow into the signature like local docs would.
    assert_eq!(find.parameters[0].type_ref, Some(TypeRef::scalar("int")));
    assert_eq!(find.parameters[0].summary.as_deref(), Some("<p>The key.</p>"));
    assert!(matches!(
        &find.return_type,
        Some(TypeRef::Reference { fqn, linked: false, .. }) if fqn == "Docs\\Model"
    ));
    assert!(parser.unresolved_inherited_docs().is_empty());
}

#[test]
fn test_inherit_doc_skips_markers_up_the_chain() {
    let (parser, _dir) = parse_workspace(&[
        (
            "a/Leaf.php",
            "<?php\nnamespace Docs;\nclass Leaf extends Middle {\n    /** @inheritdoc */\n    public function size() {}\n}\n",
        ),
        (
            "b/Middle.php",
            "<?php\nnamespace Docs;\nclass Middle extends Root {\n    /** {@inheritDoc} */\n    public function size() {}\n}\n",
        ),
        (
            "c/Root.php",
            "<?php\nnamespace Docs;\nclass Root {\n    /** Number of items. */\n    public function size() {}\n}\n",
        ),
    ]);

    for fqn in ["Docs\\Leaf", "Docs\\Middle"] {
        let size = parser.class(fqn).unwrap().method("size").unwrap();
        assert_eq!(
            size.docs.as_ref().and_then(|d| d.summary.as_deref()),
            Some("<p>Number of items.</p>"),
            "{fqn}"
        );
    }
    assert!(parser.unresolved_inherited_docs().is_empty());
}

#[test]
fn test_unsatisfiable_inherit_doc_is_reported() {
    let (parser, _dir) = parse_workspace(&[
        (
            "Orphan.php",
            "<?php\nnamespace Docs;\nclass Orphan extends \\External\\Base {\n    /** {@inheritDoc} */\n    public function run() {}\n}\n",
        ),
        (
            "Lonely.php",
            "<?php\nnamespace Docs;\nclass Lonely {\n    /** {@inheritDoc} */\n    public function run() {}\n}\n",
        ),
    ]);

    // Classes without ancestors never ask.
    assert_eq!(
        parser.unresolved_inherited_docs(),
        &[PendingDoc {
            class: "Docs\\Orphan".to_string(),
            kind: MemberKind::Method,
            member: "run".to_string(),
        }]
    );
    let run = parser.class("Docs\\Orphan").unwrap().method("run").unwrap();
    assert!(run.docs.as_ref().unwrap().inherit);
}

// ─── Sorting and linking ────────────────────────────────────────────────────

#[test]
fn test_own_members_sort_before_inherited() {
    let (parser, _dir) = parse_workspace(&[
        (
            "Parent.php",
            "<?php\nnamespace Docs;\nclass ParentClass {\n    public function a() {}\n    private function z() {}\n}\n",
        ),
        (
            "Kid.php",
            concat!(
                "<?php\nnamespace Docs;\n",
                "class Kid extends ParentClass {\n",
                "    use Zeta, Alpha;\n",
                "    private function c() {}\n",
                "    protected function b() {}\n",
                "    public function d() {}\n",
                "}\n",
            ),
        ),
    ]);

    let kid = parser.class("Docs\\Kid").unwrap();
    assert_eq!(names(&kid.methods, |m| &m.name), vec!["d", "b", "c", "a", "z"]);
    assert_eq!(
        kid.traits
            .iter()
            .map(|t| match t {
                TypeRef::Reference { fqn, .. } => fqn.as_str(),
                _ => "",
            })
            .collect::<Vec<_>>(),
        vec!["Docs\\Alpha", "Docs\\Zeta"]
    );
}

#[test]
fn test_references_to_parsed_classes_are_linked() {
    let (parser, _dir) = parse_workspace(&[
        ("Model.php", "<?php\nnamespace Docs;\nclass Model {}\n"),
        (
            "Post.php",
            concat!(
                "<?php\nnamespace Docs;\n",
                "use Carbon\\Carbon;\n",
                "class Post extends Model {\n",
                "    public function author(): Model {}\n",
                "    public function published(): Carbon {}\n",
                "}\n",
            ),
        ),
    ]);

    let post = parser.class("Docs\\Post").unwrap();
    assert!(matches!(&post.parent, Some(TypeRef::Reference { linked: true, .. })));
    assert!(matches!(
        &post.method("author").unwrap().return_type,
        Some(TypeRef::Reference { linked: true, .. })
    ));
    assert!(matches!(
        &post.method("published").unwrap().return_type,
        Some(TypeRef::Reference { fqn, linked: false, .. }) if fqn == "Carbon\\Carbon"
    ));
}

#[test]
fn test_inherited_member_links_in_declaring_context() {
    let (parser, _dir) = parse_workspace(&[
        (
            "lib/Tools/Hammer.php",
            "<?php\nnamespace Lib\\Tools;\nclass Hammer {}\n",
        ),
        (
            "lib/Box.php",
            concat!(
                "<?php\nnamespace Lib;\n",
                "use Lib\\Tools\\Hammer as Tool;\n",
                "class Box {\n",
                "    /** @var Tool */\n",
                "    public $tool;\n",
                "}\n",
            ),
        ),
        (
            "app/Crate.php",
            "<?php\nnamespace App;\nclass Crate extends \\Lib\\Box {}\n",
        ),
    ]);

    let crate_record = parser.class("App\\Crate").unwrap();
    let tool = crate_record.property("tool").unwrap();
    assert_eq!(tool.inherited, inherited("Lib\\Box", "tool"));
    assert!(matches!(
        &tool.type_ref,
        Some(TypeRef::Reference { fqn, linked: true, .. }) if fqn == "Lib\\Tools\\Hammer"
    ));
}

#[test]
fn test_inherit_doc_links_in_the_documenting_context() {
    // Both classes import a different `Model` under the same short name.
    let (parser, _dir) = parse_workspace(&[
        (
            "a/Child.php",
            concat!(
                "<?php\nnamespace App;\n",
                "use Other\\Model;\n",
                "class Child extends \\Lib\\Base {\n",
                "    /** {@inheritDoc} */\n",
                "    public $model;\n",
                "    /** {@inheritDoc} */\n",
                "    public function find($id, Model $into) {}\n",
                "}\n",
            ),
        ),
        (
            "b/Base.php",
            concat!(
                "<?php\nnamespace Lib;\n",
                "use Lib\\Models\\Model;\n",
                "class Base {\n",
                "    /** @var Model */\n",
                "    public $model;\n",
                "    /**\n",
                "     * @param Model $id\n",
                "     * @return Model\n",
                "     */\n",
                "    public function find($id, $into) {}\n",
                "}\n",
            ),
        ),
        (
            "c/Model.php",
            "<?php\nnamespace Lib\\Models;\nclass Model {}\n",
        ),
    ]);

    let child = parser.class("App\\Child").unwrap();
    let is_lib_model = |t: Option<&TypeRef>| {
        matches!(t, Some(TypeRef::Reference { fqn, linked: true, .. }) if fqn == "Lib\\Models\\Model")
    };

    let find = child.method("find").unwrap();
    assert_eq!(find.inherited, None);
    assert!(is_lib_model(find.return_type.as_ref()));
    assert!(is_lib_model(
        find.docs.as_ref().and_then(|d| d.returns.as_ref()).map(|r| &r.type_ref)
    ));
    assert!(is_lib_model(find.parameters[0].type_ref.as_ref()));
    // The native hint was written in the child and keeps its import.
    assert!(matches!(
        &find.parameters[1].type_ref,
        Some(TypeRef::Reference { fqn, linked: false, .. }) if fqn == "Other\\Model"
    ));

    let model = child.property("model").unwrap();
    assert!(is_lib_model(model.type_ref.as_ref()));
}

#[test]
fn test_inherited_member_serialises_provenance() {
    let (parser, _dir) = parse_workspace(&[
        ("A.php", "<?php\nnamespace Docs;\nclass A {\n    public function foo() {}\n}\n"),
        ("B.php", "<?php\nnamespace Docs;\nclass B extends A {\n    public function bar() {}\n}\n"),
    ]);

    let json = serde_json::to_value(parser.class("Docs\\B").unwrap()).unwrap();
    let methods = json["methods"].as_array().unwrap();
    assert_eq!(methods[0]["name"], "bar");
    assert_eq!(methods[0]["inherited"], serde_json::json!(false));
    assert_eq!(methods[1]["name"], "foo");
    assert_eq!(
        methods[1]["inherited"],
        serde_json::json!({ "fromClass": "Docs\\A", "fromName": "foo" })
    );
}
