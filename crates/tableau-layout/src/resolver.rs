// crates/tableau-layout/src/resolver.rs
use glam::Vec2;
use tableau_core::{AlterRef, Axis, Constraint, Constraints, Edge, Node, NodeId, NodeTree, Result, TableauError, Transform};
use tracing::debug;

fn component(v: Vec2, axis: Axis) -> f32 {
    match axis {
        Axis::Horizontal => v.x,
        Axis::Vertical => v.y,
    }
}

/// Finds the node a constraint points at. Names are looked up among the
/// descendants of the focal node's scene, or of its root when it is not in
/// a scene yet.
pub fn resolve_alter(tree: &NodeTree, focal: NodeId, alter: &AlterRef) -> Result<NodeId> {
    let found = match alter {
        AlterRef::Node(id) => Some(*id).filter(|id| tree.contains(*id)),
        AlterRef::Named(name) => {
            let scope = tree.owning_scene(focal).unwrap_or_else(|| tree.root_of(focal));
            tree.find_descendant(scope, name)
        }
    };
    found.ok_or_else(|| TableauError::AlterNotFound {
        node: tree.get(focal).map(|n| n.name().to_string()).unwrap_or_else(|_| focal.to_string()),
        alter: alter.to_string(),
    })
}

/// Absolute coordinate of one of the alter's edges. A scene's minimum edge
/// is its origin and its maximum edge is the origin plus its full size.
pub fn alter_edge(alter: &Node, axis: Axis, edge: Edge) -> f32 {
    match edge {
        Edge::Min => component(alter.absolute_min(), axis),
        Edge::Max => component(alter.absolute_max(), axis),
    }
}

/// Center coordinate the focal node must take so that its `edge` sits
/// `margin` inside `target`.
pub fn pin_center(target: f32, edge: Edge, margin: f32, half_extent: f32) -> f32 {
    match edge {
        Edge::Min => target + margin + half_extent,
        Edge::Max => target - margin - half_extent,
    }
}

fn pin(tree: &NodeTree, focal: &Node, constraints: &Constraints, constraint: &Constraint, half_extent: f32) -> Result<f32> {
    let axis = constraint.kind.axis();
    let alter_id = resolve_alter(tree, focal.id(), &constraint.alter)?;
    let alter = tree.get(alter_id)?;
    let target = alter_edge(alter, axis, constraint.kind.alter_edge());
    let margin = constraints.margins.for_edge(axis, constraint.kind.focal_edge());
    Ok(pin_center(target, constraint.kind.focal_edge(), margin, half_extent))
}

/// Resolves one axis of a constrained node.
///
/// `relative` is what the plain parent-relative rule would give; it is used
/// when the axis has no constraints. `previous` is kept when the axis is
/// over-constrained.
pub fn resolve_axis(
    tree: &NodeTree,
    focal: &Node,
    constraints: &Constraints,
    axis: Axis,
    absolute_scale: f32,
    relative: f32,
    previous: f32,
) -> Result<f32> {
    let mut on_axis: Vec<&Constraint> = constraints.on_axis(axis).collect();
    let half_extent = component(focal.size(), axis) * absolute_scale / 2.0;

    match on_axis.len() {
        0 => Ok(relative),
        1 => pin(tree, focal, constraints, on_axis[0], half_extent),
        2 => {
            on_axis.sort_by_key(|c| c.kind.focal_edge() == Edge::Max);
            let low = pin(tree, focal, constraints, on_axis[0], half_extent)?;
            let high = pin(tree, focal, constraints, on_axis[1], half_extent)?;
            Ok(low + (high - low) * constraints.bias(axis))
        }
        n => {
            debug!("Node '{}' keeps its previous {:?} position ({} constraints)", focal.name(), axis, n);
            Ok(previous)
        }
    }
}

/// Absolute transform of a constrained child. The node's own `position` is
/// only read for an axis that carries no constraint.
pub fn resolve_constrained(tree: &NodeTree, id: NodeId, parent: Transform, constraints: &Constraints) -> Result<Transform> {
    let focal = tree.get(id)?;
    let relative = Transform::compose(parent, focal.local());
    let previous = focal.absolute_position();

    let x = resolve_axis(
        tree,
        focal,
        constraints,
        Axis::Horizontal,
        relative.scale,
        relative.position.x,
        previous.x,
    )?;
    let y = resolve_axis(
        tree,
        focal,
        constraints,
        Axis::Vertical,
        relative.scale,
        relative.position.y,
        previous.y,
    )?;
    Ok(Transform::new(Vec2::new(x, y), relative.scale))
}
