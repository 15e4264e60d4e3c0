//! Inheritance-aware walks over the reflection graph
//!
//! Lookup precedence is fixed: the local list of the starting type first,
//! then the lists reached through base edges, depth-first in declaration
//! order. Detached descriptors terminate a walk silently.

use crate::node::{TypeKey, TypeNode};
use crate::registry::TypeRegistry;

/// Find the first node satisfying `pred`, searching the local list before
/// the base chain.
pub(crate) fn find_first<'r, N>(
    registry: &'r TypeRegistry,
    key: TypeKey,
    list: fn(&TypeNode) -> &[N],
    pred: &mut dyn FnMut(&N) -> bool,
) -> Option<&'r N> {
    let node = registry.node(key)?;
    if !node.registered {
        return None;
    }
    for n in list(node) {
        if pred(n) {
            return Some(n);
        }
    }
    for base in &node.bases {
        if let Some(found) = find_first(registry, base.target, list, pred) {
            return Some(found);
        }
    }
    None
}

/// Visit every node in the local list and then in the base chain,
/// depth-first in declaration order.
pub(crate) fn visit_all<'r, N>(
    registry: &'r TypeRegistry,
    key: TypeKey,
    list: fn(&TypeNode) -> &[N],
    visit: &mut dyn FnMut(&'r N),
) {
    let Some(node) = registry.node(key) else {
        return;
    };
    if !node.registered {
        return;
    }
    for n in list(node) {
        visit(n);
    }
    for base in &node.bases {
        visit_all(registry, base.target, list, visit);
    }
}
