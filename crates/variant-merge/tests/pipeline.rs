//! End-to-end generation passes over scratch source trees.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use variant_merge::{
    CompilationUnit, Error, ErrorKind, GeneratorConfig, Generator, ShapeMismatch,
    emit::GENERATED_HEADER,
};

const MAIN_SIMPLE: &str = r#"
#[variant_merge(name = "SimpleConstructorClass", priority = 1)]
pub struct MainSimple {
    pub flavor: String,
}

impl MainSimple {
    pub fn new() -> Self {
        Self { flavor: "main".to_string() }
    }
}
"#;

const FLAVOR_SIMPLE: &str = r#"
#[variant_merge(name = "SimpleConstructorClass", priority = 2)]
pub struct FlavorSimple {
    pub flavor: String,
}

impl FlavorSimple {
    pub fn new() -> Self {
        Self { flavor: "flavor".to_string() }
    }
}
"#;

const MAIN_GENERIC: &str = r#"
#[variant_merge(name = "ConstructorWithGenericClass", priority = 1)]
pub struct MainGeneric<T: Number> {
    pub arg: T,
    pub flavor: String,
}

impl<T: Number> MainGeneric<T> {
    pub fn new(arg: T) -> Self {
        Self { arg, flavor: "main".to_string() }
    }
}
"#;

const FLAVOR_GENERIC: &str = r#"
#[variant_merge(name = "ConstructorWithGenericClass", priority = 2)]
pub struct FlavorGeneric<T: Number> {
    pub arg: T,
    pub flavor: String,
}

impl<T: Number> FlavorGeneric<T> {
    pub fn new(arg: T) -> Self {
        Self { arg, flavor: "flavor".to_string() }
    }
}
"#;

/// Scratch crate with a `base` and a `flavor` source set.
fn source_sets(base: &[(&str, &str)], flavor: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (set, files) in [("base", base), ("flavor", flavor)] {
        let root = dir.path().join("src").join(set);
        fs::create_dir_all(&root).unwrap();
        for (file, source) in files {
            fs::write(root.join(file), source).unwrap();
        }
    }
    dir
}

fn config(dir: &Path) -> GeneratorConfig {
    GeneratorConfig::new(dir.join("out"))
        .root(dir.join("src/base"), "crate::base")
        .root(dir.join("src/flavor"), "crate::flavor")
}

#[test]
fn test_generate_writes_one_artifact_per_group() {
    let dir = source_sets(
        &[("simple.rs", MAIN_SIMPLE), ("generic.rs", MAIN_GENERIC)],
        &[("simple.rs", FLAVOR_SIMPLE), ("generic.rs", FLAVOR_GENERIC)],
    );
    let report = Generator::new(config(dir.path())).generate().unwrap();

    assert_eq!(report.units, 4);
    assert_eq!(report.groups, 2);

    let out = dir.path().join("out");
    let index = fs::read_to_string(out.join("variant_merge.rs")).unwrap();
    assert_eq!(
        index,
        format!(
            "{}\ninclude!(\"ConstructorWithGenericClass.rs\");\ninclude!(\"SimpleConstructorClass.rs\");\n",
            GENERATED_HEADER
        )
    );

    let simple = fs::read_to_string(out.join("SimpleConstructorClass.rs")).unwrap();
    let squashed: String = simple.chars().filter(|c| !c.is_whitespace()).collect();
    assert!(squashed.contains("inner:crate::flavor::simple::FlavorSimple,"));
    assert!(squashed.contains("<crate::flavor::simple::FlavorSimple>::new()"));
}

#[test]
fn test_second_pass_is_byte_identical_and_untouched() {
    let dir = source_sets(&[("simple.rs", MAIN_SIMPLE)], &[("simple.rs", FLAVOR_SIMPLE)]);
    let generator = Generator::new(config(dir.path()));

    let first = generator.generate().unwrap();
    let artifact = dir.path().join("out/SimpleConstructorClass.rs");
    let before = fs::read(&artifact).unwrap();

    let second = generator.generate().unwrap();
    assert_eq!(first.written.len(), 2);
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 2);
    assert_eq!(fs::read(&artifact).unwrap(), before);
}

#[test]
fn test_plan_is_independent_of_unit_order() {
    let units = vec![
        CompilationUnit::new("src/base/simple.rs", "crate::base::simple", MAIN_SIMPLE),
        CompilationUnit::new("src/flavor/simple.rs", "crate::flavor::simple", FLAVOR_SIMPLE),
        CompilationUnit::new("src/base/generic.rs", "crate::base::generic", MAIN_GENERIC),
        CompilationUnit::new("src/flavor/generic.rs", "crate::flavor::generic", FLAVOR_GENERIC),
    ];
    let generator = Generator::new(GeneratorConfig::default());
    let expected = generator.plan_units(&units).unwrap();

    let mut reversed = units.clone();
    reversed.reverse();
    let mut rotated = units.clone();
    rotated.rotate_left(1);

    for permutation in [reversed, rotated] {
        assert_eq!(generator.plan_units(&permutation).unwrap(), expected);
    }

    let summary = expected.summary();
    assert_eq!(summary[0].name, "ConstructorWithGenericClass");
    assert_eq!(summary[0].winner, "crate::flavor::generic::FlavorGeneric");
    assert_eq!(summary[1].priority, 2);
    assert_eq!(summary[1].chain.len(), 2);
}

#[test]
fn test_plan_summary_serializes() {
    let dir = source_sets(&[("simple.rs", MAIN_SIMPLE)], &[("simple.rs", FLAVOR_SIMPLE)]);
    let plan = Generator::new(config(dir.path())).plan().unwrap();
    let json = serde_json::to_value(plan.summary()).unwrap();

    assert_eq!(json[0]["name"], "SimpleConstructorClass");
    assert_eq!(json[0]["file_name"], "SimpleConstructorClass.rs");
    assert_eq!(json[0]["chain"][1]["priority"], 1);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_duplicate_priority_aborts_before_writing() {
    let duplicate = |ty: &str| {
        format!(
            "#[variant_merge(name = \"X\", priority = 2)]\npub struct {ty};\nimpl {ty} {{ pub fn new() -> Self {{ {ty} }} }}\n"
        )
    };
    let (main, flavor) = (duplicate("MainX"), duplicate("FlavorX"));
    let dir = source_sets(
        &[("x.rs", main.as_str()), ("simple.rs", MAIN_SIMPLE)],
        &[("x.rs", flavor.as_str()), ("simple.rs", FLAVOR_SIMPLE)],
    );

    let err = Generator::new(config(dir.path())).generate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicatePriority);
    assert_eq!(err.group(), Some("X"));
    assert_eq!(err.locations().len(), 2);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_parameter_count_mismatch_is_reported() {
    let y = |ty: &str, priority: i64, params: &str| {
        format!(
            "#[variant_merge(name = \"Y\", priority = {priority})]\npub struct {ty};\nimpl {ty} {{ pub fn new({params}) -> Self {{ {ty} }} }}\n"
        )
    };
    let main = y("MainY", 1, "a: u32");
    let flavor = y("FlavorY", 2, "a: u32, b: u32");
    let dir = source_sets(&[("y.rs", main.as_str())], &[("y.rs", flavor.as_str())]);

    match Generator::new(config(dir.path())).check().unwrap_err() {
        Error::SignatureMismatch {
            name,
            winner,
            offending,
            mismatch,
        } => {
            assert_eq!(name, "Y");
            assert!(winner.file.ends_with("flavor/y.rs"));
            assert!(offending.file.ends_with("base/y.rs"));
            assert_eq!(
                mismatch,
                ShapeMismatch::ParameterCount {
                    expected: 2,
                    found: 1
                }
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_scan_error_reports_location() {
    let broken = r#"
#[variant_merge(name = "Broken", priority = 1)]
pub struct Broken;
"#;
    let dir = source_sets(&[("broken.rs", broken)], &[]);
    let err = Generator::new(config(dir.path())).check().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Scan);
    let location = err.locations()[0];
    assert!(location.file.ends_with("base/broken.rs"));
    assert_eq!(location.line, 3);
}

#[test]
fn test_output_directory_occupied_by_file() {
    let dir = source_sets(&[("simple.rs", MAIN_SIMPLE)], &[]);
    fs::write(dir.path().join("out"), "occupied").unwrap();

    let err = Generator::new(config(dir.path())).generate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Emission);
}

#[test]
fn test_unconfigured_output_directory() {
    let dir = source_sets(&[("simple.rs", MAIN_SIMPLE)], &[]);
    let config = GeneratorConfig::default().root(dir.path().join("src/base"), "crate::base");

    let err = Generator::new(config).generate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Emission);
    assert!(err.to_string().contains("no output directory configured"));
}
