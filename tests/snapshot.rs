use phpintel::snapshot::build_snapshots;
use phpintel::types::ClasslikeKind;

// ─── Classlike Snapshot Building ────────────────────────────────────────────

#[test]
fn test_class_with_members() {
    let php = concat!(
        "<?php\n",
        "class User {\n",
        "    const ROLE_ADMIN = 'admin';\n",
        "    public $name;\n",
        "    private static $count;\n",
        "    public function getName() {}\n",
        "    protected function reset() {}\n",
        "}\n",
    );

    let snapshots = build_snapshots("User.php", php);
    assert_eq!(snapshots.len(), 1);

    let user = &snapshots[0];
    assert_eq!(user.name, "User");
    assert_eq!(user.filename, "User.php");
    assert_eq!(user.kind, ClasslikeKind::Class);
    assert_eq!(user.start_line, 2);
    assert_eq!(user.end_line, 8);

    assert_eq!(user.constants.len(), 1);
    assert!(user.constants.contains_key("ROLE_ADMIN"));

    let name = &user.properties["name"];
    assert!(name.is_public && !name.is_static);
    let count = &user.properties["count"];
    assert!(count.is_private && count.is_static);

    let get_name = &user.methods["getName"];
    assert!(get_name.is_public);
    assert_eq!(get_name.declaring_class.name, "User");
    assert!(user.methods["reset"].is_protected);
}

#[test]
fn test_modifiers_are_recorded() {
    let php = concat!(
        "<?php\n",
        "abstract class Base {\n",
        "    abstract public function run();\n",
        "    final public function stop() {}\n",
        "}\n",
        "final class Leaf {}\n",
    );

    let snapshots = build_snapshots("Base.php", php);
    assert_eq!(snapshots.len(), 2);

    let base = &snapshots[0];
    assert!(base.is_abstract && !base.is_final);
    assert!(base.methods["run"].is_abstract);
    assert!(base.methods["stop"].is_final);

    let leaf = &snapshots[1];
    assert!(leaf.is_final && !leaf.is_abstract);
}

#[test]
fn test_namespace_and_use_resolution() {
    let php = concat!(
        "<?php\n",
        "namespace App\\Model;\n",
        "\n",
        "use App\\Contract\\Jsonable;\n",
        "use Vendor\\Orm\\Model as BaseModel;\n",
        "\n",
        "class User extends BaseModel implements Jsonable, \\Countable {\n",
        "    use Concerns\\HasTimestamps;\n",
        "}\n",
    );

    let snapshots = build_snapshots("User.php", php);
    assert_eq!(snapshots.len(), 1);

    let user = &snapshots[0];
    assert_eq!(user.name, "App\\Model\\User");
    assert_eq!(
        user.parents,
        vec!["Vendor\\Orm\\Model"],
        "an aliased import resolves through the alias"
    );
    assert_eq!(
        user.interfaces,
        vec!["App\\Contract\\Jsonable", "Countable"],
        "absolute names lose the leading backslash"
    );
    assert_eq!(
        user.traits,
        vec!["App\\Model\\Concerns\\HasTimestamps"],
        "relative names resolve against the current namespace"
    );
}

#[test]
fn test_grouped_use_imports_resolve() {
    let php = concat!(
        "<?php\n",
        "namespace App;\n",
        "use App\\Contract\\{Jsonable, Arrayable as ToArray};\n",
        "class Payload implements Jsonable, ToArray {}\n",
    );

    let snapshots = build_snapshots("Payload.php", php);
    assert_eq!(
        snapshots[0].interfaces,
        vec!["App\\Contract\\Jsonable", "App\\Contract\\Arrayable"]
    );
}

#[test]
fn test_interface_extends_are_parents() {
    let php = concat!(
        "<?php\n",
        "interface Collection extends \\Countable, \\IteratorAggregate {\n",
        "    public function first();\n",
        "}\n",
    );

    let snapshots = build_snapshots("Collection.php", php);
    let collection = &snapshots[0];
    assert_eq!(collection.kind, ClasslikeKind::Interface);
    assert_eq!(collection.parents, vec!["Countable", "IteratorAggregate"]);
    assert!(collection.interfaces.is_empty());
    assert!(collection.methods.contains_key("first"));
}

#[test]
fn test_trait_snapshot() {
    let php = concat!(
        "<?php\n",
        "trait HasTimestamps {\n",
        "    public $updatedAt;\n",
        "    public function touch() {}\n",
        "}\n",
    );

    let snapshots = build_snapshots("HasTimestamps.php", php);
    let with_timestamps = &snapshots[0];
    assert_eq!(with_timestamps.kind, ClasslikeKind::Trait);
    assert!(with_timestamps.properties.contains_key("updatedAt"));
    assert!(with_timestamps.methods.contains_key("touch"));
}

#[test]
fn test_enum_surfaces_as_class_with_constant_cases() {
    let php = concat!(
        "<?php\n",
        "enum Status: string implements \\JsonSerializable {\n",
        "    case Active = 'active';\n",
        "    case Archived = 'archived';\n",
        "    public function label(): string {}\n",
        "}\n",
    );

    let snapshots = build_snapshots("Status.php", php);
    let status = &snapshots[0];
    assert_eq!(status.kind, ClasslikeKind::Class);
    assert_eq!(status.interfaces, vec!["JsonSerializable"]);
    assert!(status.constants.contains_key("Active"));
    assert!(status.constants.contains_key("Archived"));
    assert!(status.methods.contains_key("label"));
}

#[test]
fn test_docblocks_become_descriptions() {
    let php = concat!(
        "<?php\n",
        "/**\n",
        " * A user of the system.\n",
        " *\n",
        " * Carries identity and credentials.\n",
        " */\n",
        "class User {\n",
        "    /**\n",
        "     * The display name.\n",
        "     *\n",
        "     * @var string\n",
        "     */\n",
        "    public $name;\n",
        "    public $undocumented;\n",
        "}\n",
    );

    let snapshots = build_snapshots("User.php", php);
    let user = &snapshots[0];
    assert!(user.has_documentation);
    assert_eq!(user.short_description.as_deref(), Some("A user of the system."));
    assert_eq!(
        user.long_description.as_deref(),
        Some("Carries identity and credentials.")
    );

    let name = &user.properties["name"];
    assert!(name.has_documentation);
    assert_eq!(name.short_description.as_deref(), Some("The display name."));

    let undocumented = &user.properties["undocumented"];
    assert!(!undocumented.has_documentation);
    assert_eq!(undocumented.short_description, None);
}

#[test]
fn test_grouped_constant_declaration() {
    let php = "<?php\nclass Config {\n    const A = 1, B = 2;\n}\n";
    let snapshots = build_snapshots("Config.php", php);
    let config = &snapshots[0];
    assert!(config.constants.contains_key("A"));
    assert!(config.constants.contains_key("B"));
    assert_eq!(config.constants["A"].start_line, 3);
}

#[test]
fn test_functions_and_globals_produce_no_snapshots() {
    let php = "<?php\nfunction helper() {}\n$x = 1;\n";
    assert!(build_snapshots("helpers.php", php).is_empty());
}

#[test]
fn test_member_lines_point_at_the_declaration() {
    let php = concat!(
        "<?php\n",
        "class Report {\n",
        "    public function build()\n",
        "    {\n",
        "        return 1;\n",
        "    }\n",
        "}\n",
    );

    let snapshots = build_snapshots("Report.php", php);
    let build = &snapshots[0].methods["build"];
    assert_eq!(build.start_line, 3);
    assert_eq!(build.end_line, 6);
    assert_eq!(build.declaring_structure.start_line_member, 3);
    assert_eq!(build.declaring_structure.end_line_member, 6);
}

#[test]
fn test_snapshots_serialize_in_editor_facing_shape() {
    let php = "<?php\nclass User {\n    public $name;\n}\n";
    let snapshots = build_snapshots("User.php", php);
    let value = serde_json::to_value(&snapshots[0]).unwrap();

    assert_eq!(value["name"], "User");
    assert_eq!(value["type"], "class");
    assert_eq!(value["startLine"], 2);
    assert_eq!(value["isAbstract"], false);
    assert_eq!(value["shortDescription"], serde_json::Value::Null);

    let name = &value["properties"]["name"];
    assert_eq!(name["isPublic"], true);
    assert_eq!(name["override"], serde_json::Value::Null);
    assert_eq!(name["declaringClass"]["name"], "User");
    assert_eq!(name["declaringStructure"]["startLineMember"], 3);
}
