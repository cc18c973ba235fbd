// crates/tableau-layout/src/lib.rs

use std::collections::HashMap;
use tableau_core::{NodeId, NodeTree, Result, TickContext, Transform};
use tracing::{debug, warn};

pub mod resolver;
pub mod scheduler;

pub use resolver::*;
pub use scheduler::*;

pub trait LayoutEngine {
    /// Rewrites the absolute transform of every node under `root`, parents
    /// before children.
    fn update_transforms(&mut self, tree: &mut NodeTree, root: NodeId, ctx: &TickContext) -> Result<()>;
}

#[derive(Debug)]
pub struct ConstraintLayoutEngine {
    debug: bool,
}

impl ConstraintLayoutEngine {
    pub fn new() -> Self {
        Self { debug: false }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for ConstraintLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine for ConstraintLayoutEngine {
    fn update_transforms(&mut self, tree: &mut NodeTree, root: NodeId, ctx: &TickContext) -> Result<()> {
        let root_node = tree.get_mut(root)?;
        let absolute = Transform::root(root_node.local());
        root_node.set_absolute(absolute);

        if self.debug {
            debug!(
                "Layout root {} at {:?} (scale={:.3}, canvas scale={:.3})",
                root, absolute.position, absolute.scale, ctx.canvas_scale
            );
        }

        self.layout_children(tree, root)
    }
}

impl ConstraintLayoutEngine {
    fn layout_children(&self, tree: &mut NodeTree, parent: NodeId) -> Result<()> {
        let children = tree.children(parent).to_vec();
        if children.is_empty() {
            return Ok(());
        }
        let parent_absolute = tree.get(parent)?.absolute();

        let schedule = update_order(&children, &self.sibling_dependencies(tree, &children));
        if schedule.has_cycle() {
            let names: Vec<&str> = schedule
                .unsorted
                .iter()
                .filter_map(|id| tree.get(*id).ok().map(|n| n.name()))
                .collect();
            warn!(
                "Constraint cycle under '{}' between {:?}; updating them in list order",
                tree.get(parent)?.name(),
                names
            );
        }

        for child in schedule.order {
            let node = tree.get(child)?;
            let absolute = match node.layout() {
                Some(constraints) => resolve_constrained(tree, child, parent_absolute, constraints)?,
                None => Transform::compose(parent_absolute, node.local()),
            };

            if self.debug {
                debug!(
                    "Layout node '{}': pos={:?}, scale={:.3}",
                    tree.get(child)?.name(),
                    absolute.position,
                    absolute.scale
                );
            }

            tree.get_mut(child)?.set_absolute(absolute);
            self.layout_children(tree, child)?;
        }
        Ok(())
    }

    /// Constraint alters of each child that are also its siblings.
    fn sibling_dependencies(&self, tree: &NodeTree, children: &[NodeId]) -> HashMap<NodeId, Vec<NodeId>> {
        let mut dependencies = HashMap::new();
        for &child in children {
            let Ok(node) = tree.get(child) else {
                continue;
            };
            let Some(constraints) = node.layout() else {
                continue;
            };
            // Unresolvable alters surface as errors when the child itself is resolved.
            let alters: Vec<NodeId> = constraints
                .alters()
                .filter_map(|alter| resolve_alter(tree, child, alter).ok())
                .filter(|alter| *alter != child && tree.parent(*alter) == node.parent())
                .collect();
            if !alters.is_empty() {
                dependencies.insert(child, alters);
            }
        }
        dependencies
    }
}
