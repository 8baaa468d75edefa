//! Integration tests for complete stub runs.
//!
//! Each test describes a small library through the public builders, renders it with the
//! emitter and checks the text a Python consumer would see.

use dotstub::{prelude::*, stubs::PREAMBLE, Result};

/// The Acme library used across scenarios
fn acme_snapshot() -> Result<LibrarySnapshot> {
    // public class Widget {
    //     public Widget(int count);
    //     public int Size { get; set; }
    // }
    let widget = TypeBuilder::class("Acme", "Widget")
        .constructor(MethodBuilder::constructor().param("count", "System.Int32"))
        .getter("Size", "System.Int32")
        .setter("Size", "System.Int32")
        .build()?;

    let color = TypeBuilder::enumeration("Acme", "Color", PrimitiveKind::I4)
        .enum_value("Red", ConstantValue::I4(0))
        .enum_value("Green", ConstantValue::I4(1))
        .enum_value("None", ConstantValue::I4(2))
        .build()?;

    let io = TypeBuilder::class("Acme", "Io")
        .method(
            MethodBuilder::new("TryParse")
                .static_method()
                .param("value", "System.String")
                .out_param("result", "System.Int32")
                .returns("System.Boolean"),
        )
        .method(MethodBuilder::new("Drain").out_param("buffer", "System.Byte[]"))
        .method(MethodBuilder::new("Flush"))
        .build()?;

    let derived = TypeBuilder::class("Acme", "Derived")
        .base("Other.Unrelated")
        .build()?;

    let reader = TypeBuilder::class("Acme.Text", "Reader")
        .constructor(MethodBuilder::constructor())
        .constructor(MethodBuilder::constructor().param("path", "System.String"))
        .method(
            MethodBuilder::new("ReadLines")
                .returns("System.Collections.Generic.IEnumerable`1[System.String]"),
        )
        .build()?;

    let point = TypeBuilder::value_type("Acme.Geometry", "Point")
        .constructor(
            MethodBuilder::constructor()
                .param("x", "System.Int32")
                .param("y", "System.Int32"),
        )
        .field("X", "System.Int32", FieldAttributes::PUBLIC)
        .field("Y", "System.Int32", FieldAttributes::PUBLIC)
        .build()?;

    let polygon = TypeBuilder::class("Acme.Geometry.Shapes", "Polygon")
        .method(
            MethodBuilder::new("Points")
                .returns("System.Collections.Generic.List`1[valuetype Acme.Geometry.Point]"),
        )
        .build()?;

    Ok(LibrarySnapshot::new("Acme")
        .with_version("2.1.0.0")
        .with_location("/opt/acme/Acme.dll")
        .with_type(widget)
        .with_type(color)
        .with_type(io)
        .with_type(derived)
        .with_type(reader)
        .with_type(point)
        .with_type(polygon))
}

fn render(config: StubConfig) -> Result<StubRun> {
    let provider = SnapshotProvider::new(acme_snapshot()?);
    StubEmitter::new(&provider, config).run()
}

fn unit_text(run: &StubRun, namespace: &str) -> String {
    run.unit(namespace)
        .map(|unit| unit.text.clone())
        .unwrap_or_default()
}

#[test]
fn scenario_widget_constructor_and_property() -> Result<()> {
    let run = render(StubConfig::default())?;
    let text = unit_text(&run, "Acme");

    assert!(text.contains(
        "class Widget:\n\
         \x20   def __init__(self, count: int) -> None: ...\n\
         \x20   @property\n\
         \x20   def Size(self) -> int: ...\n\
         \x20   @Size.setter\n\
         \x20   def Size(self, value: int) -> None: ...\n"
    ));
    assert_eq!(text.matches("def Size(").count(), 2);
    assert!(!text.contains("get_Size"));
    Ok(())
}

#[test]
fn scenario_enum_escapes_none() -> Result<()> {
    let run = render(StubConfig::default())?;
    let text = unit_text(&run, "Acme");

    assert!(text.contains("class Color:\n    Red = 0\n    Green = 1\n    _None = 2\n"));
    Ok(())
}

#[test]
fn scenario_out_parameter_becomes_tuple() -> Result<()> {
    let run = render(StubConfig::default())?;
    let text = unit_text(&run, "Acme");

    assert!(text.contains(
        "    @staticmethod\n    def TryParse(value: str) -> Tuple[bool, int]: ...\n"
    ));
    assert!(text.contains("    def Drain(self) -> Tuple[List[int]]: ...\n"));
    assert!(text.contains("    def Flush(self) -> None: ...\n"));
    Ok(())
}

#[test]
fn scenario_foreign_base_is_dropped() -> Result<()> {
    let run = render(StubConfig::default())?;
    let text = unit_text(&run, "Acme");

    assert!(text.contains("class Derived:\n    pass\n"));
    assert!(!text.contains("Unrelated"));

    let acme = run.unit("Acme").unwrap();
    assert!(acme
        .diagnostics
        .by_category(DiagnosticCategory::Inheritance)
        .iter()
        .any(|diagnostic| diagnostic.subject.as_deref() == Some("Acme.Derived")));
    Ok(())
}

#[test]
fn constructors_are_overloads_only_when_several() -> Result<()> {
    let run = render(StubConfig::default())?;

    let reader = unit_text(&run, "Acme.Text");
    assert_eq!(reader.matches("@overload\n    def __init__").count(), 2);
    assert!(reader.contains("def ReadLines(self) -> Iterable[str]: ..."));

    let acme = unit_text(&run, "Acme");
    assert!(!acme.contains("@overload"));
    Ok(())
}

#[test]
fn namespace_unit_text() -> Result<()> {
    let run = render(StubConfig::default())?;

    assert_eq!(
        unit_text(&run, "Acme.Geometry"),
        format!(
            "__all__ = [\"Shapes\"]\n\n{PREAMBLE}\n\n\
             class Point:\n\
             \x20   def __init__(self, x: int, y: int) -> None: ...\n\
             \x20   X: int\n\
             \x20   Y: int\n"
        )
    );
    Ok(())
}

#[test]
fn manifests_list_direct_children() -> Result<()> {
    let run = render(StubConfig::default())?;

    assert_eq!(run.unit("").unwrap().children, vec!["Acme"]);
    assert_eq!(run.unit("Acme").unwrap().children, vec!["Geometry", "Text"]);
    assert!(unit_text(&run, "Acme").starts_with("__all__ = [\"Geometry\", \"Text\"]\n"));

    for unit in &run.units {
        let has_manifest = unit.text.starts_with("__all__");
        assert_eq!(has_manifest, !unit.children.is_empty(), "{}", unit.namespace);

        let mut sorted = unit.children.clone();
        sorted.sort();
        assert_eq!(unit.children, sorted);
    }
    Ok(())
}

#[test]
fn rendering_is_idempotent() -> Result<()> {
    let first = render(StubConfig::default())?;
    let second = render(StubConfig::sequential())?;

    assert_eq!(first.units.len(), second.units.len());
    for unit in &first.units {
        assert_eq!(Some(&unit.text), second.unit(&unit.namespace).map(|u| &u.text));
    }
    Ok(())
}

#[test]
fn imports_name_other_namespaces() -> Result<()> {
    let run = render(StubConfig::complete())?;
    let shapes = unit_text(&run, "Acme.Geometry.Shapes");

    assert!(shapes.contains("from Acme.Geometry import Point\n"));
    assert!(shapes.contains("def Points(self) -> List[Point]: ..."));
    Ok(())
}

#[test]
fn provider_failure_is_scoped_to_its_namespace() -> Result<()> {
    let bridge = TypeBuilder::class("Acme.Plugins", "Bridge")
        .method(MethodBuilder::new("Attach").param("handle", "Vendor.Api.Handle"))
        .build()?;
    let snapshot = acme_snapshot()?
        .with_type(bridge)
        .with_unresolvable("Vendor.");
    let provider = SnapshotProvider::new(snapshot);

    let run = StubEmitter::new(&provider, StubConfig::default()).run()?;

    assert_eq!(run.failures.len(), 1);
    assert!(run.failures[0].to_string().contains("Acme.Plugins"));
    assert!(run.unit("Acme.Plugins").is_none());
    assert!(run.unit("Acme").is_some());
    assert!(run.unit("Acme.Geometry.Shapes").is_some());
    Ok(())
}

#[test]
fn json_snapshot_renders_the_same() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("acme.json");
    std::fs::write(&path, acme_snapshot()?.to_json()?)?;

    let loaded = SnapshotProvider::from_file(&path)?;
    let from_json = StubEmitter::new(&loaded, StubConfig::default()).run()?;
    let direct = render(StubConfig::default())?;

    assert_eq!(loaded.library().version.as_deref(), Some("2.1.0.0"));
    for unit in &direct.units {
        assert_eq!(
            Some(&unit.text),
            from_json.unit(&unit.namespace).map(|u| &u.text)
        );
    }
    Ok(())
}

#[test]
fn package_tree_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manifest = dir.path().join("setup.py");
    std::fs::write(&manifest, "setup(\n    name=\"acme\",\n    version=\"0.0.0\",\n)\n")?;

    let run = render(StubConfig::default())?;
    let mut sink = DirectorySink::new(
        dir.path(),
        OutputConfig {
            prefix: "py".to_string(),
            write_shims: true,
            ..OutputConfig::default()
        },
    );
    let written = run.write_to(&mut sink)?;
    assert_eq!(written, run.units.len());

    let root = dir.path().join("pyAcme");
    assert!(root.join("__init__.pyi").is_file());
    assert!(root.join("Acme").join("Text").join("__init__.pyi").is_file());
    assert!(root.join("Acme").join("Text").join("__init__.py").is_file());

    let version = run.library.version.clone().unwrap_or_default();
    assert!(bump_manifest_version(&sink.manifest_path(), &version)?);
    assert!(std::fs::read_to_string(&manifest)?.contains("version=\"2.1.0.0\","));
    Ok(())
}
