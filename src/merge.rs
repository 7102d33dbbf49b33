//! Cross-platform merge of per-platform AST documents.
//!
//! A declaration survives only if every merged platform declares it with the
//! same kind and the same definition (source locations aside). Everything
//! else is dropped and reported.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::ast::{CAbstractSyntaxTree, CAbstractSyntaxTreeCrossPlatform, CKind, CNode};
use crate::error::FixtureError;
use crate::platform::TargetPlatform;

/// Why a declaration was left out of the cross-platform document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    /// Not declared on some of the merged platforms.
    MissingOnPlatforms { missing: Vec<TargetPlatform> },
    /// Declared as different kinds of node.
    KindMismatch { kinds: Vec<CKind> },
    /// Same kind, different definition.
    DefinitionMismatch { platforms: Vec<TargetPlatform> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedNode {
    pub name: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Merged document plus the declarations that did not make it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub ast: CAbstractSyntaxTreeCrossPlatform,
    pub dropped: Vec<DroppedNode>,
}

impl MergeOutcome {
    pub fn dropped_names(&self) -> Vec<&str> {
        self.dropped.iter().map(|node| node.name.as_str()).collect()
    }
}

/// Merge per-platform documents into the declarations they all share.
///
/// Each document is keyed by the platform it was requested for, falling back
/// to the platform it actually ran on. Documents where both are unknown are
/// skipped. Fails when no document is left to merge.
pub fn merge(documents: &[CAbstractSyntaxTree]) -> Result<MergeOutcome, FixtureError> {
    let mut merged: Vec<(TargetPlatform, &CAbstractSyntaxTree)> = Vec::new();
    for document in documents {
        match document.platform_requested.or(document.platform_actual) {
            Some(platform) => merged.push((platform, document)),
            None => log::warn!(
                "[Merge] Skipping {} (platform unknown)",
                display_file_name(document)
            ),
        }
    }

    if merged.is_empty() {
        return Err(FixtureError::InvalidDocument {
            reason: "no platform-specific documents to merge".to_string(),
        });
    }

    let mut platforms: Vec<TargetPlatform> = merged.iter().map(|(platform, _)| *platform).collect();
    platforms.sort();
    platforms.dedup();

    // name -> one entry per (document, node)
    let mut by_name: BTreeMap<String, Vec<(TargetPlatform, CNode)>> = BTreeMap::new();
    for (platform, document) in &merged {
        for (name, node) in document.nodes() {
            by_name.entry(name).or_default().push((*platform, node));
        }
    }

    let mut ast = CAbstractSyntaxTreeCrossPlatform {
        platforms: platforms.clone(),
        ..Default::default()
    };
    let mut dropped = Vec::new();

    for (name, candidates) in by_name {
        match check_candidates(&candidates, &platforms, merged.len()) {
            Ok(()) => {
                if let Some((_, node)) = candidates.into_iter().next() {
                    insert_node(&mut ast, name, node);
                }
            }
            Err(reason) => {
                log_drop(&name, &reason);
                dropped.push(DroppedNode { name, reason });
            }
        }
    }

    log::info!(
        "[Merge] Merged {} documents ({} platforms): kept {} declarations, dropped {}",
        merged.len(),
        platforms.len(),
        ast.enums.len() + ast.functions.len() + ast.opaque_types.len(),
        dropped.len()
    );

    Ok(MergeOutcome { ast, dropped })
}

fn check_candidates(
    candidates: &[(TargetPlatform, CNode)],
    platforms: &[TargetPlatform],
    document_count: usize,
) -> Result<(), DropReason> {
    let mut kinds: Vec<CKind> = Vec::new();
    for (_, node) in candidates {
        if !kinds.contains(&node.kind()) {
            kinds.push(node.kind());
        }
    }
    if kinds.len() > 1 {
        return Err(DropReason::KindMismatch { kinds });
    }

    if candidates.len() < document_count {
        let missing: Vec<TargetPlatform> = platforms
            .iter()
            .copied()
            .filter(|platform| !candidates.iter().any(|(seen, _)| seen == platform))
            .collect();
        return Err(DropReason::MissingOnPlatforms { missing });
    }

    let Some((_, first)) = candidates.first() else {
        return Ok(());
    };
    let differing: Vec<TargetPlatform> = candidates
        .iter()
        .filter(|(_, node)| !node.same_definition(first))
        .map(|(platform, _)| *platform)
        .collect();
    if !differing.is_empty() {
        return Err(DropReason::DefinitionMismatch {
            platforms: differing,
        });
    }
    Ok(())
}

fn insert_node(ast: &mut CAbstractSyntaxTreeCrossPlatform, name: String, node: CNode) {
    match node {
        CNode::Enum(node) => {
            ast.enums.insert(name, node);
        }
        CNode::Function(node) => {
            ast.functions.insert(name, node);
        }
        CNode::OpaqueType(node) => {
            ast.opaque_types.insert(name, node);
        }
    }
}

fn log_drop(name: &str, reason: &DropReason) {
    match reason {
        DropReason::MissingOnPlatforms { missing } => {
            log::warn!("[Merge] Dropping {} (missing on {:?})", name, missing)
        }
        DropReason::KindMismatch { kinds } => {
            log::error!("[Merge] Dropping {} (kind differs across platforms: {:?})", name, kinds)
        }
        DropReason::DefinitionMismatch { platforms } => {
            log::error!(
                "[Merge] Dropping {} (definition differs on {:?})",
                name,
                platforms
            )
        }
    }
}

fn display_file_name(document: &CAbstractSyntaxTree) -> &str {
    if document.file_name.is_empty() {
        "<unnamed document>"
    } else {
        &document.file_name
    }
}
