use proguard_reconcile::{prune, MappingFile, UnresolvedWarning, WarningLog};

static MAPPING_PROGUARD: &str = include_str!("res/mapping-proguard.txt");
static MAPPING_PRUNED: &str = include_str!("res/mapping-pruned.txt");
static WARNINGS: &str = include_str!("res/warnings.txt");

#[test]
fn test_prune_fixture() {
    let mapping = MappingFile::parse(MAPPING_PROGUARD).unwrap();
    let warnings = WarningLog::new(WARNINGS).parse().unwrap();
    assert_eq!(warnings.len(), 6);

    let pruned = prune(&mapping, &warnings);
    assert_eq!(pruned.mapping.to_string(), MAPPING_PRUNED);

    let report = pruned.report;
    assert_eq!(report.warnings, 6);
    assert_eq!(report.members_removed, 3);
    assert_eq!(
        report.classes_dropped,
        vec!["com.example.app.util.Strings".to_owned()]
    );
    assert_eq!(
        report.unresolved,
        vec![
            UnresolvedWarning::UnknownClass {
                line_number: 4,
                class: "com.example.app.util.Strings".to_owned(),
            },
            UnresolvedWarning::UnknownClass {
                line_number: 5,
                class: "com.example.app.Missing".to_owned(),
            },
            UnresolvedWarning::MemberNotFound {
                line_number: 6,
                class: "com.example.app.data.Repository".to_owned(),
                member: "void save() -> b".to_owned(),
            },
        ]
    );
}

#[test]
fn test_prune_removes_at_most_one_line_per_warning() {
    let mapping = MappingFile::parse(
        "\
a.B -> x.Y:
    java.lang.String name -> a
    int count -> b
    java.lang.String name -> a
",
    )
    .unwrap();
    let warnings = WarningLog::new(
        "Warning: a.B: field 'java.lang.String name' is not being kept as 'c', but remapped to 'a'\n",
    )
    .parse()
    .unwrap();

    let pruned = prune(&mapping, &warnings);
    assert_eq!(
        pruned.mapping.to_string(),
        "\
a.B -> x.Y:
    int count -> b
    java.lang.String name -> a
"
    );
    assert_eq!(pruned.report.members_removed, 1);
}

#[test]
fn test_prune_empty_class_elimination() {
    let mapping = MappingFile::parse(
        "\
a.B -> x.Y:
# {\"id\":\"sourceFile\",\"fileName\":\"B.kt\"}
    int count -> b
c.D -> x.Z:
    int size -> a
",
    )
    .unwrap();
    let warnings = WarningLog::new(
        "Warning: a.B: field 'int count' is not being kept as 'c', but remapped to 'b'\n",
    )
    .parse()
    .unwrap();

    let pruned = prune(&mapping, &warnings);
    assert_eq!(pruned.mapping.to_string(), "c.D -> x.Z:\n    int size -> a\n");
    assert!(pruned.mapping.get("a.B").is_none());
}

#[test]
fn test_prune_without_warnings_is_identity() {
    let mapping = MappingFile::parse(MAPPING_PROGUARD).unwrap();
    let pruned = prune(&mapping, &[]);
    assert_eq!(pruned.mapping.to_string(), MAPPING_PROGUARD);
    assert_eq!(pruned.report.warnings, 0);
}
