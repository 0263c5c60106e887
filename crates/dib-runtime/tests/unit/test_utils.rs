//! Shared test utilities for dib-runtime tests

#![allow(dead_code)] // Test utilities may not all be used in every test file

use dib_domain::{
    BindingDescriptor, BindingKey, BindingKind, ConstructionPoint, DependencyRef, DescriptorId,
    ModuleRegistration, Scope, SourceLocation,
};
use dib_runtime::{FactoryRegistry, Instance};
use std::sync::Arc;

/// Component descriptor with constructor `new`
pub fn component(id: u32, name: &str, scope: Scope, dependencies: Vec<DependencyRef>) -> BindingDescriptor {
    BindingDescriptor {
        id: DescriptorId(id),
        key: key(name),
        kind: BindingKind::Component,
        scope,
        eager: false,
        construction: ConstructionPoint::Constructor { name: "new".into() },
        dependencies,
        environments: Vec::new(),
        order: 0,
        source: SourceLocation {
            file: "src/lib.rs".into(),
            line: id as usize + 1,
        },
    }
}

/// Parse `Type` or `Type@qualifier`
pub fn key(text: &str) -> BindingKey {
    match text.split_once('@') {
        Some((type_name, qualifier)) => BindingKey::named(type_name, qualifier),
        None => BindingKey::new(text),
    }
}

/// Dependency on another descriptor of the same registration
pub fn local(text: &str, position: usize, target: u32) -> DependencyRef {
    DependencyRef::local(key(text), position, DescriptorId(target))
}

/// Dependency satisfied outside the registration
pub fn external(text: &str, position: usize) -> DependencyRef {
    DependencyRef::external(key(text), position)
}

/// Registration for crate `app`
pub fn registration(descriptors: Vec<BindingDescriptor>) -> ModuleRegistration {
    ModuleRegistration::new("app", descriptors).unwrap()
}

#[derive(Debug)]
pub struct Foo {
    pub label: &'static str,
}

#[derive(Debug)]
pub struct Bar {
    pub foo: Arc<Foo>,
}

/// `app::Foo` (no dependencies) and `app::Bar` (prototype, depends on `Foo`)
pub fn foo_bar(foo_scope: Scope) -> ModuleRegistration {
    registration(vec![
        component(0, "app::Foo", foo_scope, Vec::new()),
        component(1, "app::Bar", Scope::Prototype, vec![local("app::Foo", 0, 0)]),
    ])
}

/// Explicit factories for [`foo_bar`]
pub fn foo_bar_factories() -> FactoryRegistry {
    FactoryRegistry::empty()
        .with(BindingKey::new("app::Foo"), |_| {
            Ok(Instance::new(Arc::new(Foo { label: "foo" })))
        })
        .with(BindingKey::new("app::Bar"), |ctx| {
            Ok(Instance::new(Arc::new(Bar {
                foo: ctx.dependency(0)?,
            })))
        })
}
