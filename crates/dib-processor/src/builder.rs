//! Descriptor construction
//!
//! Turns collected declarations into the descriptor arena. Building happens in
//! two passes: the first assigns ids and keys to every annotated declaration
//! in registration order, the second resolves the written dependency paths
//! against the keys of the first pass.
//!
//! Registration order is: components, linked bindings, modules sorted by
//! their `order` argument (each module immediately followed by its
//! providers), then one set binding per `#[provides(into_set)]` element type.
//!
//! Key type names keep their generic arguments. Every path inside the
//! arguments is canonicalised the same way as a top-level written path.

use crate::collect::{Declarations, ImplDecl, MethodDecl, ParamDecl, ReceiverKind, StructDecl, join_path};
use crate::construction::{self, Selected};
use crate::diagnostics::ProcessorDiagnostic;
use crate::markers::{MarkerError, MarkerSet};
use crate::types::WrittenType;
use dib_domain::{
    BindingDescriptor, BindingKey, BindingKind, ConstructionPoint, DependencyMode, DependencyRef,
    DescriptorId, Scope, SourceLocation,
};

/// Result of building the arena
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// Descriptors in registration order, `descriptors[i].id == i`
    pub descriptors: Vec<BindingDescriptor>,
    /// Problems found while building
    pub diagnostics: Vec<ProcessorDiagnostic>,
}

/// Dependency as written, before resolution
#[derive(Debug, Clone)]
enum Pending {
    /// Parameter type, normalised, with its qualifier
    Written(BindingKey, DependencyMode),
    /// Already known local descriptor (a provider's module)
    Local(DescriptorId),
    /// Contribution to a set, skipped at runtime when unbound
    Contribution(DescriptorId),
    /// `implemented_by` target, must resolve to a local component
    Implementation(String),
}

#[derive(Debug)]
struct Draft {
    key: BindingKey,
    kind: BindingKind,
    scope: Scope,
    eager: bool,
    construction: ConstructionPoint,
    pending: Vec<Pending>,
    environments: Vec<String>,
    order: u32,
    source: SourceLocation,
}

/// Set binding collected from `into_set` providers
#[derive(Debug)]
struct SetDraft {
    key: BindingKey,
    contributions: Vec<DescriptorId>,
    source: SourceLocation,
}

/// Build the descriptor arena of one crate
pub fn build(crate_name: &str, decls: &Declarations) -> BuildOutput {
    let mut builder = Builder {
        crate_name,
        decls,
        drafts: Vec::new(),
        sets: Vec::new(),
        diagnostics: Vec::new(),
    };
    builder.components();
    builder.linked_bindings();
    builder.modules();
    builder.sets();
    builder.stray_provides();
    builder.finish()
}

struct Builder<'a> {
    crate_name: &'a str,
    decls: &'a Declarations,
    drafts: Vec<Draft>,
    sets: Vec<SetDraft>,
    diagnostics: Vec<ProcessorDiagnostic>,
}

impl<'a> Builder<'a> {
    fn canonical(&self, module_path: &[String], ident: &str) -> String {
        format!("{}::{}", self.crate_name, join_path(module_path, ident))
    }

    /// Drop a leading crate-name segment from a written path
    fn strip_crate<'s>(&self, written: &'s str) -> &'s str {
        written
            .strip_prefix(self.crate_name)
            .and_then(|rest| rest.strip_prefix("::"))
            .unwrap_or(written)
    }

    /// Canonical name of a type written outside any local binding
    ///
    /// A unique path-suffix match in the crate's type index gives the crate
    /// path, anything else is kept as written.
    fn canonical_written(&self, written: &str) -> String {
        let written = self.strip_crate(written);
        let key = BindingKey::new(written);
        let matches: Vec<&String> = self
            .decls
            .type_index
            .iter()
            .filter(|path| BindingKey::new(path.as_str()).matches_written(&key))
            .collect();
        match matches.as_slice() {
            [only] => format!("{}::{}", self.crate_name, only),
            _ => written.to_string(),
        }
    }

    /// Canonical key type name: every path canonicalised, arguments included
    fn canonical_type(&self, ty: &WrittenType) -> String {
        ty.render(|path| self.canonical_written(path), |arg| self.canonical_type(arg))
    }

    /// Key type name of a parameter, matched later against local keys
    ///
    /// The outer path stays as written for suffix matching; generic
    /// arguments are canonicalised so they compare exactly.
    fn written_name(&self, ty: &WrittenType) -> String {
        ty.render(
            |path| self.strip_crate(path).to_string(),
            |arg| self.canonical_type(arg),
        )
    }

    fn scope_of(&mut self, markers: &MarkerSet, type_name: &str, location: &SourceLocation) -> Scope {
        match markers.scope() {
            Ok(scope) => scope,
            Err(err) => {
                self.report_marker(err, type_name, location);
                Scope::Prototype
            }
        }
    }

    fn report_marker(&mut self, err: MarkerError, type_name: &str, location: &SourceLocation) {
        let diagnostic = match err {
            MarkerError::UnsupportedScope(scope) => ProcessorDiagnostic::UnsupportedScope {
                type_name: type_name.to_string(),
                scope,
                location: location.clone(),
            },
            MarkerError::Invalid { marker, message } => ProcessorDiagnostic::InvalidMarker {
                type_name: type_name.to_string(),
                marker: marker.to_string(),
                message,
                location: location.clone(),
            },
        };
        self.diagnostics.push(diagnostic);
    }

    fn invalid(&mut self, type_name: &str, marker: &str, message: &str, location: &SourceLocation) {
        self.diagnostics.push(ProcessorDiagnostic::InvalidMarker {
            type_name: type_name.to_string(),
            marker: marker.to_string(),
            message: message.to_string(),
            location: location.clone(),
        });
    }

    fn params(&mut self, owner: &str, params: &[ParamDecl], location: &SourceLocation) -> Vec<Pending> {
        let mut pending = Vec::with_capacity(params.len());
        for param in params {
            let mode = if param.lazy {
                DependencyMode::Lazy
            } else {
                DependencyMode::Direct
            };
            match &param.binding_type {
                Some(ty) => pending.push(Pending::Written(
                    BindingKey::new(self.written_name(ty)).with_qualifier(param.qualifier.clone()),
                    mode,
                )),
                None => self.diagnostics.push(ProcessorDiagnostic::UnsupportedParameter {
                    type_name: owner.to_string(),
                    parameter: param.name.clone(),
                    location: location.clone(),
                }),
            }
        }
        pending
    }

    fn push(&mut self, draft: Draft) -> DescriptorId {
        let id = DescriptorId(self.drafts.len() as u32);
        tracing::debug!(id = %id, key = %draft.key, scope = %draft.scope, "Binding descriptor");
        self.drafts.push(draft);
        id
    }

    fn is_module_type(&self, decl: &StructDecl) -> bool {
        self.decls
            .impls_of(decl)
            .any(|imp| imp.markers.module.is_some())
    }

    /// Construction point and its dependencies
    fn constructed(
        &mut self,
        decl: &'a StructDecl,
        type_name: &str,
    ) -> Option<(ConstructionPoint, Vec<Pending>)> {
        if decl.is_generic {
            self.invalid(
                type_name,
                "#[injectable]",
                "generic types cannot be bound",
                &decl.location,
            );
            return None;
        }
        let decls = self.decls;
        match construction::select(decl, type_name, decls.impls_of(decl)) {
            Ok(selected) => {
                let pending = match selected {
                    Selected::Constructor(method) => {
                        self.params(type_name, &method.params, &method.location)
                    }
                    Selected::Default | Selected::UnitStruct => Vec::new(),
                };
                Some((selected.construction_point(), pending))
            }
            Err(diagnostic) => {
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }

    fn components(&mut self) {
        let decls = self.decls;
        for decl in decls.structs.iter().filter(|s| s.markers.injectable) {
            if self.is_module_type(decl) {
                continue;
            }
            let type_name = self.canonical(&decl.module_path, &decl.ident);
            let scope = self.scope_of(&decl.markers, &type_name, &decl.location);
            let Some((construction, pending)) = self.constructed(decl, &type_name) else {
                continue;
            };
            self.push(Draft {
                key: BindingKey::new(type_name).with_qualifier(decl.markers.qualifier.clone()),
                kind: BindingKind::Component,
                scope,
                eager: decl.markers.eager,
                construction,
                pending,
                environments: Vec::new(),
                order: 0,
                source: decl.location.clone(),
            });
        }
    }

    fn linked_bindings(&mut self) {
        let decls = self.decls;
        for decl in &decls.traits {
            let Some(target) = &decl.markers.implemented_by else {
                continue;
            };
            let type_name = self.canonical(&decl.module_path, &decl.ident);
            self.push(Draft {
                key: BindingKey::new(type_name).with_qualifier(decl.markers.qualifier.clone()),
                // Target key is filled in once components are resolved
                kind: BindingKind::Linked {
                    target: BindingKey::new(target.clone()),
                },
                scope: Scope::Prototype,
                eager: false,
                construction: ConstructionPoint::Link,
                pending: vec![Pending::Implementation(target.clone())],
                environments: Vec::new(),
                order: 0,
                source: decl.location.clone(),
            });
        }
    }

    fn modules(&mut self) {
        let decls = self.decls;
        let mut modules: Vec<&ImplDecl> = decls
            .impls
            .iter()
            .filter(|imp| imp.markers.module.is_some())
            .collect();
        modules.sort_by_key(|imp| imp.markers.module.as_ref().map_or(0, |m| m.order));

        let mut seen: Vec<(String, SourceLocation)> = Vec::new();
        for imp in modules {
            let owner = self.canonical(&imp.module_path, &imp.self_ident);
            let Some(decl) = self.struct_for(imp) else {
                self.invalid(
                    &owner,
                    "#[module]",
                    "module type must be a struct declared in this crate",
                    &imp.location,
                );
                continue;
            };
            let type_name = self.canonical(&decl.module_path, &decl.ident);
            if let Some((_, first)) = seen.iter().find(|(name, _)| *name == type_name) {
                self.diagnostics.push(ProcessorDiagnostic::DuplicateBinding {
                    type_name,
                    first: first.clone(),
                    location: imp.location.clone(),
                });
                continue;
            }
            seen.push((type_name.clone(), imp.location.clone()));
            self.module(imp, decl, type_name);
        }
    }

    fn struct_for(&self, imp: &ImplDecl) -> Option<&'a StructDecl> {
        let decls = self.decls;
        decls.struct_at(&imp.module_path, &imp.self_ident).or_else(|| {
            decls
                .structs
                .iter()
                .find(|s| join_path(&s.module_path, &s.ident) == imp.self_path)
        })
    }

    fn module(&mut self, imp: &'a ImplDecl, decl: &'a StructDecl, type_name: String) {
        let args = imp.markers.module.clone().unwrap_or_default();
        let Some((construction, pending)) = self.constructed(decl, &type_name) else {
            return;
        };
        let module_id = self.push(Draft {
            key: BindingKey::new(type_name.clone()),
            kind: BindingKind::Module,
            scope: Scope::Singleton,
            eager: false,
            construction,
            pending,
            environments: args.environments.clone(),
            order: args.order,
            source: imp.location.clone(),
        });

        for method in imp.methods.iter().filter(|m| m.markers.provides) {
            self.provider(method, module_id, &type_name, args.environments.clone(), args.order);
        }
    }

    fn provider(
        &mut self,
        method: &MethodDecl,
        module: DescriptorId,
        module_name: &str,
        environments: Vec<String>,
        order: u32,
    ) {
        let owner = format!("{module_name}::{}", method.name);
        if !method.is_pub {
            self.diagnostics.push(ProcessorDiagnostic::ProvidesNotPublic {
                type_name: module_name.to_string(),
                method: method.name.clone(),
                location: method.location.clone(),
            });
            return;
        }
        if method.returns_unit {
            self.diagnostics.push(ProcessorDiagnostic::ProvidesReturnsUnit {
                type_name: module_name.to_string(),
                method: method.name.clone(),
                location: method.location.clone(),
            });
            return;
        }
        let has_receiver = match method.receiver {
            ReceiverKind::None => false,
            ReceiverKind::Ref => true,
            ReceiverKind::RefMut | ReceiverKind::Value => {
                self.diagnostics.push(ProcessorDiagnostic::UnsupportedReceiver {
                    type_name: module_name.to_string(),
                    method: method.name.clone(),
                    location: method.location.clone(),
                });
                return;
            }
        };
        let Some(returned) = &method.return_type else {
            self.invalid(
                &owner,
                "#[provides]",
                "return type must be a type path or Arc<..>",
                &method.location,
            );
            return;
        };

        let scope = self.scope_of(&method.markers, &owner, &method.location);
        let mut pending = Vec::with_capacity(method.params.len() + 1);
        if has_receiver {
            pending.push(Pending::Local(module));
        }
        pending.extend(self.params(&owner, &method.params, &method.location));

        let value_type = self.canonical_type(returned);
        let (key, set_key) = if method.markers.into_set {
            let Some(set_key) = self.set_key(method, &owner) else {
                return;
            };
            // Contributions are told apart by their provider
            (BindingKey::named(value_type, owner.clone()), Some(set_key))
        } else {
            let key = BindingKey::new(value_type).with_qualifier(method.markers.qualifier.clone());
            (key, None)
        };
        let id = self.push(Draft {
            key,
            kind: BindingKind::Provider {
                module,
                method: method.name.clone(),
            },
            scope,
            eager: method.markers.eager,
            construction: ConstructionPoint::ProviderMethod {
                name: method.name.clone(),
                has_receiver,
            },
            pending,
            environments,
            order,
            source: method.location.clone(),
        });
        if let Some(set_key) = set_key {
            self.contribute(set_key, id, &method.location);
        }
    }

    /// `Vec<..>` of the provider's return type, qualified by its `named` marker
    fn set_key(&mut self, method: &MethodDecl, owner: &str) -> Option<BindingKey> {
        if !method.returns_thread_safe {
            self.invalid(
                owner,
                "#[provides(into_set)]",
                "trait objects in a set must be `dyn Trait + Send + Sync`",
                &method.location,
            );
            return None;
        }
        let element = method.returned.clone()?;
        let set = WrittenType::new("Vec").with_args(vec![element]);
        Some(BindingKey::new(self.canonical_type(&set)).with_qualifier(method.markers.qualifier.clone()))
    }

    fn contribute(&mut self, key: BindingKey, id: DescriptorId, location: &SourceLocation) {
        match self.sets.iter_mut().find(|s| s.key == key) {
            Some(set) => set.contributions.push(id),
            None => self.sets.push(SetDraft {
                key,
                contributions: vec![id],
                source: location.clone(),
            }),
        }
    }

    fn sets(&mut self) {
        for set in std::mem::take(&mut self.sets) {
            self.push(Draft {
                key: set.key,
                kind: BindingKind::Set,
                scope: Scope::Prototype,
                eager: false,
                construction: ConstructionPoint::Collect,
                pending: set.contributions.into_iter().map(Pending::Contribution).collect(),
                environments: Vec::new(),
                order: 0,
                source: set.source,
            });
        }
    }

    fn stray_provides(&mut self) {
        let decls = self.decls;
        for imp in decls.impls.iter().filter(|imp| imp.markers.module.is_none()) {
            let type_name = self.canonical(&imp.module_path, &imp.self_ident);
            for method in imp.methods.iter().filter(|m| m.markers.provides) {
                self.diagnostics.push(ProcessorDiagnostic::ProvidesOutsideModule {
                    type_name: type_name.clone(),
                    method: method.name.clone(),
                    location: method.location.clone(),
                });
            }
        }
    }

    fn finish(mut self) -> BuildOutput {
        self.check_duplicates();

        let keys: Vec<(BindingKey, BindingKind)> = self
            .drafts
            .iter()
            .map(|d| (d.key.clone(), d.kind.clone()))
            .collect();
        let drafts = std::mem::take(&mut self.drafts);

        let mut descriptors = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.into_iter().enumerate() {
            let mut kind = draft.kind;
            let mut dependencies = Vec::with_capacity(draft.pending.len());
            for (position, pending) in draft.pending.into_iter().enumerate() {
                let resolved = match pending {
                    Pending::Local(id) => Some(DependencyRef::local(
                        keys[id.index()].0.clone(),
                        position,
                        id,
                    )),
                    Pending::Contribution(id) => Some(
                        DependencyRef::local(keys[id.index()].0.clone(), position, id)
                            .with_mode(DependencyMode::Optional),
                    ),
                    Pending::Written(written, mode) => self
                        .resolve(&keys, &draft.key, written, position, &draft.source)
                        .map(|dependency| dependency.with_mode(mode)),
                    Pending::Implementation(target) => {
                        let found = self.implementation(&keys, &draft.key, &target, &draft.source);
                        found.map(|(id, key)| {
                            kind = BindingKind::Linked {
                                target: key.clone(),
                            };
                            DependencyRef::local(key, position, id)
                        })
                    }
                };
                dependencies.extend(resolved);
            }

            descriptors.push(BindingDescriptor {
                id: DescriptorId(index as u32),
                key: draft.key,
                kind,
                scope: draft.scope,
                eager: draft.eager,
                construction: draft.construction,
                dependencies,
                environments: draft.environments,
                order: draft.order,
                source: draft.source,
            });
        }

        BuildOutput {
            descriptors,
            diagnostics: self.diagnostics,
        }
    }

    /// Resolve a written dependency against the local keys
    fn resolve(
        &mut self,
        keys: &[(BindingKey, BindingKind)],
        owner: &BindingKey,
        written: BindingKey,
        position: usize,
        location: &SourceLocation,
    ) -> Option<DependencyRef> {
        let matches: Vec<(usize, &BindingKey)> = keys
            .iter()
            .enumerate()
            .filter(|(_, (key, _))| key.matches_written(&written))
            .map(|(i, (key, _))| (i, key))
            .collect();

        let mut distinct: Vec<&BindingKey> = matches.iter().map(|(_, k)| *k).collect();
        distinct.sort();
        distinct.dedup();

        match (matches.as_slice(), distinct.as_slice()) {
            ([(index, key)], _) => Some(DependencyRef::local(
                (*key).clone(),
                position,
                DescriptorId(*index as u32),
            )),
            // Environment variants of one key: left to the runtime
            (_, [key]) => Some(DependencyRef::external((*key).clone(), position)),
            ([], _) => {
                let (base, args) = written.split_generics();
                let key = BindingKey::new(format!("{}{args}", self.canonical_written(base)))
                    .with_qualifier(written.qualifier.clone());
                Some(DependencyRef::external(key, position))
            }
            _ => {
                self.diagnostics.push(ProcessorDiagnostic::AmbiguousDependency {
                    type_name: owner.to_string(),
                    dependency: written.to_string(),
                    candidates: distinct.iter().map(ToString::to_string).collect(),
                    location: location.clone(),
                });
                None
            }
        }
    }

    fn implementation(
        &mut self,
        keys: &[(BindingKey, BindingKind)],
        owner: &BindingKey,
        target: &str,
        location: &SourceLocation,
    ) -> Option<(DescriptorId, BindingKey)> {
        let written = BindingKey::new(target);
        let matches: Vec<(usize, &BindingKey)> = keys
            .iter()
            .enumerate()
            .filter(|(_, (key, kind))| {
                *kind == BindingKind::Component
                    && key.qualifier.is_none()
                    && key.matches_written(&written)
            })
            .map(|(i, (key, _))| (i, key))
            .collect();

        match matches.as_slice() {
            [(index, key)] => Some((DescriptorId(*index as u32), (*key).clone())),
            [] => {
                self.diagnostics.push(ProcessorDiagnostic::UnresolvedImplementation {
                    type_name: owner.to_string(),
                    target: target.to_string(),
                    location: location.clone(),
                });
                None
            }
            many => {
                self.diagnostics.push(ProcessorDiagnostic::AmbiguousDependency {
                    type_name: owner.to_string(),
                    dependency: target.to_string(),
                    candidates: many.iter().map(|(_, k)| k.to_string()).collect(),
                    location: location.clone(),
                });
                None
            }
        }
    }

    /// Same key bound twice in overlapping environments
    fn check_duplicates(&mut self) {
        for (i, later) in self.drafts.iter().enumerate() {
            let clash = self.drafts[..i].iter().find(|earlier| {
                earlier.key == later.key
                    && environments_overlap(&earlier.environments, &later.environments)
            });
            if let Some(earlier) = clash {
                self.diagnostics.push(ProcessorDiagnostic::DuplicateBinding {
                    type_name: later.key.to_string(),
                    first: earlier.source.clone(),
                    location: later.source.clone(),
                });
            }
        }
    }
}

fn environments_overlap(a: &[String], b: &[String]) -> bool {
    a.is_empty() || b.is_empty() || a.iter().any(|e| b.contains(e))
}
