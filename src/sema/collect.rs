// src/sema/collect.rs
//
// Pass 1: register every top-level definition under its canonical
// `package.Name`. Pass 2 (first half): build each source file's name
// environment from its own package and its imports.

use crate::errors::SemanticError;
use crate::frontend::{Definition, Import, Source};
use crate::sema::context::{
    EntityAlias, EntityDef, EntityKind, NamespaceBinding, ProgramContext, SourceContext, TypeScope,
};

/// Walk every source and register its record and interface definitions.
/// Member tables stay empty; only identity and binding location are known.
pub(crate) fn collect_entities(
    ctx: &mut ProgramContext,
    sources: &[Source],
) -> Result<(), SemanticError> {
    for source in sources {
        let package = &source.package.name;
        for def in &source.definitions {
            let name = def.name();
            let canonical = format!("{package}.{}", name.name);
            if let Some(existing) = ctx.entities.get(&canonical) {
                return Err(SemanticError::EntityRedefined {
                    name: canonical,
                    span: name.span,
                    original: existing.loc,
                });
            }
            let (kind, scope) = match def {
                Definition::Record(_) => (EntityKind::Record, TypeScope::for_record()),
                Definition::Interface(_) => (EntityKind::Interface, TypeScope::for_interface()),
            };
            ctx.packages
                .entry(package.clone())
                .or_default()
                .insert(name.name.clone(), canonical.clone());
            ctx.entities.insert(
                canonical.clone(),
                EntityDef {
                    kind,
                    canonical,
                    file: source.file,
                    loc: name.span,
                    scope,
                    fields: Vec::new(),
                    functions: Vec::new(),
                    impls: Vec::new(),
                },
            );
        }
    }
    tracing::debug!(entities = ctx.entities.len(), "collected entities");
    Ok(())
}

/// Build the per-file [`SourceContext`]s: the source's own package's
/// entities first, then each import in order.
pub(crate) fn build_source_contexts(
    ctx: &mut ProgramContext,
    sources: &[Source],
) -> Result<(), SemanticError> {
    for source in sources {
        let mut sc = SourceContext::default();

        if let Some(names) = ctx.packages.get(&source.package.name) {
            for (short, canonical) in names {
                let loc = ctx.expect_entity(canonical)?.loc;
                sc.entity_aliases.insert(
                    short.clone(),
                    EntityAlias {
                        canonical: canonical.clone(),
                        loc,
                    },
                );
            }
        }

        for import in &source.imports {
            match import {
                Import::Package { package } => {
                    if package.name == source.package.name {
                        return Err(SemanticError::NamespaceAlreadyDefined {
                            name: package.name.clone(),
                            span: package.span,
                            original: source.package.span,
                        });
                    }
                    if !ctx.packages.contains_key(&package.name) {
                        return Err(SemanticError::NoSuchPackage {
                            name: package.name.clone(),
                            span: package.span,
                        });
                    }
                    if let Some(existing) = sc.namespaces.get(&package.name) {
                        return Err(SemanticError::NamespaceAlreadyDefined {
                            name: package.name.clone(),
                            span: package.span,
                            original: existing.loc,
                        });
                    }
                    sc.namespaces.insert(
                        package.name.clone(),
                        NamespaceBinding {
                            package: package.name.clone(),
                            loc: package.span,
                        },
                    );
                }
                Import::Entity { package, name } => {
                    let Some(names) = ctx.packages.get(&package.name) else {
                        return Err(SemanticError::NoSuchPackage {
                            name: package.name.clone(),
                            span: package.span,
                        });
                    };
                    let Some(canonical) = names.get(&name.name) else {
                        return Err(SemanticError::NoSuchEntity {
                            name: name.name.clone(),
                            place: format!("package '{}'", package.name),
                            span: name.span,
                        });
                    };
                    if let Some(existing) = sc.entity_aliases.get(&name.name) {
                        return Err(SemanticError::EntityRedefined {
                            name: name.name.clone(),
                            span: name.span,
                            original: existing.loc,
                        });
                    }
                    sc.entity_aliases.insert(
                        name.name.clone(),
                        EntityAlias {
                            canonical: canonical.clone(),
                            loc: name.span,
                        },
                    );
                }
            }
        }

        ctx.source_contexts.insert(source.file, sc);
    }
    Ok(())
}
