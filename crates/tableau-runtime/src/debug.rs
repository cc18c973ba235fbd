// crates/tableau-runtime/src/debug.rs
use tableau_core::{NodeId, NodeKind, NodeTree};

/// Renders `root`'s subtree as an indented outline, one node per line.
/// With `show_layout`, each line carries the node's absolute position and
/// size.
pub fn dump_tree(tree: &NodeTree, root: NodeId, show_layout: bool) -> String {
    let mut output = String::new();
    dump_node(tree, root, "", None, show_layout, &mut output);
    output
}

fn dump_node(tree: &NodeTree, id: NodeId, prefix: &str, is_last: Option<bool>, show_layout: bool, output: &mut String) {
    let Ok(node) = tree.get(id) else {
        return;
    };

    let tree_char = match is_last {
        None => "",
        Some(true) => "└── ",
        Some(false) => "├── ",
    };
    output.push_str(&format!("{}{}{} '{}'", prefix, tree_char, node.kind().type_name(), node.name()));

    if let NodeKind::Label(label) = node.kind() {
        output.push_str(&format!(" \"{}\"", label.text));
    }
    if let NodeKind::Sprite(sprite) = node.kind() {
        output.push_str(&format!(" <{}>", sprite.image_name));
    }
    if show_layout {
        let position = node.absolute_position();
        let size = node.size();
        output.push_str(&format!(
            " pos:({:.0},{:.0}) size:({:.0},{:.0})",
            position.x, position.y, size.x, size.y
        ));
        if node.absolute_scale() != 1.0 {
            output.push_str(&format!(" scale:{:.2}", node.absolute_scale()));
        }
    }

    let mut markers = Vec::new();
    if node.is_hidden() {
        markers.push("hidden".to_string());
    }
    if node.is_interactive() {
        markers.push("interactive".to_string());
    }
    if node.layout().is_some() {
        markers.push("constrained".to_string());
    }
    if node.has_actions() {
        markers.push(format!("actions:{}", node.actions().len()));
    }
    if !markers.is_empty() {
        output.push_str(&format!(" [{}]", markers.join(", ")));
    }
    output.push('\n');

    let child_prefix = match is_last {
        None => prefix.to_string(),
        Some(true) => format!("{}    ", prefix),
        Some(false) => format!("{}│   ", prefix),
    };
    let children = node.children();
    for (index, &child) in children.iter().enumerate() {
        dump_node(tree, child, &child_prefix, Some(index + 1 == children.len()), show_layout, output);
    }
}
