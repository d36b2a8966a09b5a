use lazy_static::lazy_static;

use proguard_reconcile::MappingFile;

static MAPPING_OLD: &str = include_str!("res/mapping-old.txt");
static MAPPING_CURRENT: &str = include_str!("res/mapping-current.txt");
static MAPPING_PROGUARD: &str = include_str!("res/mapping-proguard.txt");

lazy_static! {
    static ref MAPPING_WIN_OLD: String = MAPPING_OLD.replace('\n', "\r\n");
}

fn roundtrip(source: &str) -> Vec<u8> {
    let mapping = MappingFile::parse(source).unwrap();
    let mut buf = Vec::new();
    mapping.write(&mut buf).unwrap();
    buf
}

#[test]
fn test_roundtrip_fixtures() {
    for source in [MAPPING_OLD, MAPPING_CURRENT, MAPPING_PROGUARD] {
        assert_eq!(roundtrip(source), source.as_bytes());
    }
}

#[test]
fn test_roundtrip_crlf() {
    assert_eq!(roundtrip(&MAPPING_WIN_OLD), MAPPING_WIN_OLD.as_bytes());
}

#[test]
fn test_roundtrip_mixed_line_endings() {
    let source = "# compiler: R8\r\na.B -> x.Y:\n    int f -> a\r\n    int g -> b\nc.D -> y.Z:\r\n    void h() -> c";
    assert_eq!(roundtrip(source), source.as_bytes());

    let mixed: String = MAPPING_OLD
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            let terminator = if idx % 2 == 0 { "\r\n" } else { "\n" };
            format!("{line}{terminator}")
        })
        .collect();
    assert_eq!(roundtrip(&mixed), mixed.as_bytes());
}

#[test]
fn test_roundtrip_without_trailing_newline() {
    let source = MAPPING_PROGUARD.trim_end();
    assert_eq!(roundtrip(source), source.as_bytes());
}

#[test]
fn test_roundtrip_r8_metadata() {
    let source = r#"# compiler: R8
# compiler_version: 3.3.75
# min_api: 21
# {"id":"com.android.tools.r8.mapping","version":"2.0"}
com.example.Main -> a.a:
# {"id":"sourceFile","fileName":"Main.kt"}
    1:1:void main(java.lang.String[]):101:101 -> a
    2:2:void foo.bar.Baz.inlinee():42:42 -> a
    1:1:void lambda$main$0():0:0 -> b
      # {"id":"com.android.tools.r8.synthesized"}
"#;
    assert_eq!(roundtrip(source), source.as_bytes());

    let mapping = MappingFile::parse(source).unwrap();
    assert_eq!(mapping.preamble().len(), 4);
    assert_eq!(mapping.get("com.example.Main").unwrap().metadata().len(), 1);
}

#[test]
fn test_parse_fixture_structure() {
    let mapping = MappingFile::parse(MAPPING_OLD).unwrap();
    assert_eq!(
        mapping.keys().collect::<Vec<_>>(),
        vec![
            "com.example.app.MainActivity",
            "com.example.app.data.Repository",
            "com.example.app.data.Repository$Entry",
            "com.example.app.util.Logger",
            "com.example.app.util.Strings",
            "com.example.app.legacy.Removed",
        ]
    );
    assert_eq!(mapping.member_count(), 14);

    let class = mapping.get("com.example.app.data.Repository$Entry").unwrap();
    assert_eq!(class.obfuscated_name(), "com.example.app.a.a$a");
    assert_eq!(class.declaration().number(), 14);
}

#[cfg(feature = "uuid")]
#[test]
fn test_uuid_matches_written_bytes() {
    let mapping = MappingFile::parse(MAPPING_OLD).unwrap();
    assert_eq!(
        mapping.uuid(),
        proguard_reconcile::mapping_uuid(MAPPING_OLD.as_bytes())
    );
}
