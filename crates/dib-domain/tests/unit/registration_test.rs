//! Tests for module registration artifacts

use dib_domain::{
    BindingDescriptor, BindingKey, BindingKind, ConstructionPoint, DependencyRef, DescriptorId,
    ModuleRegistration, Scope, SourceLocation,
};
use tempfile::TempDir;

fn component(id: u32, name: &str, deps: Vec<DependencyRef>) -> BindingDescriptor {
    BindingDescriptor {
        id: DescriptorId(id),
        key: BindingKey::new(name),
        kind: BindingKind::Component,
        scope: Scope::Singleton,
        eager: false,
        construction: ConstructionPoint::Constructor { name: "new".into() },
        dependencies: deps,
        environments: Vec::new(),
        order: 0,
        source: SourceLocation {
            file: "lib.rs".into(),
            line: 1,
        },
    }
}

fn sample() -> ModuleRegistration {
    let foo = component(0, "Foo", Vec::new());
    let bar = component(
        1,
        "Bar",
        vec![DependencyRef::local(BindingKey::new("Foo"), 0, DescriptorId(0))],
    );
    ModuleRegistration::new("app", vec![foo, bar]).unwrap()
}

#[test]
fn test_file_round_trip_preserves_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("app.dib.json");
    let registration = sample();

    registration.write_to(&path).unwrap();
    let loaded = ModuleRegistration::read_from(&path).unwrap();

    assert_eq!(loaded, registration);
    let names: Vec<&str> = loaded.iter().map(|d| d.key.type_name.as_str()).collect();
    assert_eq!(names, ["Foo", "Bar"]);
}

#[test]
fn test_fingerprint_is_deterministic() {
    assert_eq!(sample().fingerprint, sample().fingerprint);
    assert_eq!(sample().fingerprint.len(), 64);
}

#[test]
fn test_tampered_artifact_is_rejected() {
    let mut registration = sample();
    registration.descriptors[0].scope = Scope::Prototype;
    let json = serde_json::to_string(&registration).unwrap();

    let err = ModuleRegistration::from_json(&json).unwrap_err();
    assert!(err.to_string().contains("fingerprint"));
}

#[test]
fn test_out_of_bounds_local_target_is_rejected() {
    let bar = component(
        0,
        "Bar",
        vec![DependencyRef::local(BindingKey::new("Foo"), 0, DescriptorId(7))],
    );
    let registration = ModuleRegistration::new("app", vec![bar]).unwrap();

    assert!(registration.verify().is_err());
}

#[test]
fn test_find_by_key() {
    let registration = sample();
    let bar = registration.find(&BindingKey::new("Bar")).unwrap();
    assert_eq!(bar.local_dependencies().collect::<Vec<_>>(), [DescriptorId(0)]);
    assert!(registration.find(&BindingKey::named("Bar", "x")).is_none());
}
