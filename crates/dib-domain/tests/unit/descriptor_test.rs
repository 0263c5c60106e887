//! Tests for binding descriptors

use dib_domain::{
    BindingDescriptor, BindingKey, BindingKind, ConstructionPoint, DependencyMode, DependencyRef,
    DescriptorId, Scope, SourceLocation,
};

fn descriptor(environments: &[&str]) -> BindingDescriptor {
    BindingDescriptor {
        id: DescriptorId(0),
        key: BindingKey::new("billing::Log"),
        kind: BindingKind::Component,
        scope: Scope::Prototype,
        eager: false,
        construction: ConstructionPoint::Default,
        dependencies: vec![DependencyRef::external(BindingKey::new("Connection"), 0)],
        environments: environments.iter().map(ToString::to_string).collect(),
        order: 0,
        source: SourceLocation::default(),
    }
}

#[test]
fn test_activation_by_environment() {
    let everywhere = descriptor(&[]);
    let only_test = descriptor(&["test"]);
    let active = vec!["test".to_string()];

    assert!(everywhere.is_active_in(&[]));
    assert!(only_test.is_active_in(&active));
    assert!(!only_test.is_active_in(&[]));
}

#[test]
fn test_same_binding_ignores_position_and_source() {
    let a = descriptor(&[]);
    let mut b = descriptor(&[]);
    b.id = DescriptorId(4);
    b.source.line = 99;
    assert!(a.same_binding(&b));

    b.scope = Scope::Singleton;
    assert!(!a.same_binding(&b));
}

#[test]
fn test_descriptor_json_shape() {
    let json = serde_json::to_value(descriptor(&[])).unwrap();
    assert_eq!(json["kind"]["type"], "component");
    assert_eq!(json["scope"], "prototype");
    assert_eq!(json["dependencies"][0]["origin"], "external");
    assert!(json.get("environments").is_none());
}

#[test]
fn test_dependency_mode_serialized_only_when_not_direct() {
    let mut set = descriptor(&[]);
    set.kind = BindingKind::Set;
    set.construction = ConstructionPoint::Collect;
    set.dependencies = vec![
        DependencyRef::external(BindingKey::named("billing::Audit", "billing::Plugins::audit"), 0)
            .with_mode(DependencyMode::Optional),
    ];

    let json = serde_json::to_value(&set).unwrap();
    assert_eq!(json["kind"]["type"], "set");
    assert_eq!(json["construction"]["type"], "collect");
    assert_eq!(json["dependencies"][0]["mode"], "optional");
    assert!(!set.dependencies[0].is_required());

    let plain = serde_json::to_value(descriptor(&[])).unwrap();
    assert!(plain["dependencies"][0].get("mode").is_none());
    let back: BindingDescriptor = serde_json::from_value(plain).unwrap();
    assert_eq!(back.dependencies[0].mode, DependencyMode::Direct);
}

#[test]
fn test_same_binding_compares_dependency_modes() {
    let a = descriptor(&[]);
    let mut b = descriptor(&[]);
    b.dependencies[0].mode = DependencyMode::Lazy;
    assert!(!a.same_binding(&b));
}
