// crates/tableau-core/src/tree.rs
use crate::{
    Action, Axis, Constraints, InitState, LabelData, Node, NodeId, NodeKind, ResourceManager, ResourceType, Result,
    TableauError, TapEvent, TapListener,
};
use glam::Vec2;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Arena that owns every node and the parent/child links between them.
///
/// A node with no parent is either a root (scenes, or a tree under
/// construction) or an orphan that was detached; both stay in the arena
/// until removed.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    transient_depth: u32,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(TableauError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(TableauError::NodeNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Adds a node to the arena without a parent. A node whose id is
    /// already taken (a clone of an inserted node) is refused.
    pub fn insert(&mut self, mut node: Node) -> Result<NodeId> {
        if self.contains(node.id) {
            return Err(TableauError::NodeIdInUse(node.id));
        }
        if let Some(constraints) = &node.layout {
            check_constraints(constraints, &node.name)?;
        }
        node.parent = None;
        node.children.clear();
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Inserts `child` and appends it to `parent`'s children. On error the
    /// tree is left untouched.
    pub fn add_child(&mut self, parent: NodeId, child: Node) -> Result<NodeId> {
        if self.contains(child.id) {
            return Err(TableauError::NodeIdInUse(child.id));
        }
        self.check_attach(parent, &child)?;
        let id = self.insert(child)?;
        self.link(parent, id)?;
        Ok(id)
    }

    /// Moves an existing node under `parent`, detaching it from its current
    /// parent first.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.get(child)?.parent == Some(parent) {
            return Ok(());
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(TableauError::CyclicAttachment(self.get(child)?.name.clone()));
            }
            ancestor = self.get(current)?.parent;
        }
        self.check_attach(parent, self.get(child)?)?;
        self.detach(child)?;
        self.link(parent, child)
    }

    fn check_attach(&self, parent: NodeId, child: &Node) -> Result<()> {
        let parent_node = self.get(parent)?;
        if child.is_scene() {
            return Err(TableauError::SceneNotRoot(child.name.clone()));
        }
        if self.child_named(parent, &child.name).is_some() {
            return Err(TableauError::DuplicateName {
                name: child.name.clone(),
                parent: parent_node.name.clone(),
            });
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Orphans a node. It keeps its subtree and stays in the arena.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        if let Some(parent) = self.get_mut(child)?.parent.take() {
            self.get_mut(parent)?.children.retain(|&id| id != child);
        }
        Ok(())
    }

    /// Detaches a node and drops it together with its descendants.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)?;
        for node in self.subtree(id) {
            self.nodes.remove(&node);
        }
        Ok(())
    }

    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<()> {
        let children = self.get(parent)?.children.clone();
        for child in children {
            self.remove_subtree(child)?;
        }
        Ok(())
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(parent) = self.get(id)?.parent {
            if self.child_named(parent, &name).is_some_and(|existing| existing != id) {
                return Err(TableauError::DuplicateName {
                    name,
                    parent: self.get(parent)?.name.clone(),
                });
            }
        }
        self.get_mut(id)?.name = name;
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|node| node.children.as_slice()).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// The scene at the root of `id`'s tree, if that root is a scene.
    pub fn owning_scene(&self, id: NodeId) -> Option<NodeId> {
        let root = self.root_of(id);
        self.nodes.get(&root).filter(|node| node.is_scene()).map(|node| node.id)
    }

    /// `id` followed by its descendants, in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut subtree = self.subtree(id);
        if !subtree.is_empty() {
            subtree.remove(0);
        }
        subtree
    }

    pub fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.nodes.get(&child).is_some_and(|node| node.name == name))
    }

    /// First node named `name` in `ancestor`'s subtree, `ancestor` included.
    pub fn find_descendant(&self, ancestor: NodeId, name: &str) -> Option<NodeId> {
        self.subtree(ancestor)
            .into_iter()
            .find(|&id| self.nodes.get(&id).is_some_and(|node| node.name == name))
    }

    pub fn set_layout(&mut self, id: NodeId, constraints: Option<Constraints>) -> Result<()> {
        let node = self.get_mut(id)?;
        if let Some(constraints) = &constraints {
            check_constraints(constraints, &node.name)?;
        }
        node.layout = constraints;
        Ok(())
    }

    /// Queues `action` on a node, after anything already queued.
    ///
    /// Outside of engine callbacks the action is also recorded in the
    /// node's original set, which [`NodeTree::rearm_actions`] replays.
    pub fn run_action(&mut self, id: NodeId, action: Action) -> Result<()> {
        let record = self.transient_depth == 0;
        let node = self.get_mut(id)?;
        let action = action.rearmed();
        if record {
            node.original_actions.push(action.clone());
        }
        node.actions.push(action);
        Ok(())
    }

    /// Removes every action with `key`, queued or original. Returns whether
    /// anything was removed, counting actions checked out for evaluation.
    pub fn remove_action(&mut self, id: NodeId, key: &str) -> Result<bool> {
        let node = self.get_mut(id)?;
        let before = node.actions.len() + node.original_actions.len();
        node.actions.retain(|a| a.key.as_deref() != Some(key));
        node.original_actions.retain(|a| a.key.as_deref() != Some(key));
        let mut removed = before != node.actions.len() + node.original_actions.len();
        if let Some(index) = node.checked_out_keys.iter().position(|k| k == key) {
            node.checked_out_keys.remove(index);
            node.pending_removals.push(Some(key.to_string()));
            removed = true;
        }
        Ok(removed)
    }

    pub fn remove_all_actions(&mut self, id: NodeId) -> Result<()> {
        let node = self.get_mut(id)?;
        node.actions.clear();
        node.original_actions.clear();
        if node.actions_checked_out {
            node.checked_out_keys.clear();
            node.pending_removals.push(None);
        }
        Ok(())
    }

    /// Resets the queue of every node in `root`'s subtree to fresh copies of
    /// its original actions.
    pub fn rearm_actions(&mut self, root: NodeId) -> Result<()> {
        for id in self.subtree(root) {
            let node = self.get_mut(id)?;
            node.actions = node.original_actions.iter().map(Action::rearmed).collect();
        }
        Ok(())
    }

    /// Hands a node's queue to the evaluator. Actions run on the node while
    /// the queue is out land in a fresh queue, and removals are remembered.
    pub fn checkout_actions(&mut self, id: NodeId) -> Result<Vec<Action>> {
        let node = self.get_mut(id)?;
        node.actions_checked_out = true;
        node.checked_out_keys = node.actions.iter().filter_map(|a| a.key.clone()).collect();
        Ok(std::mem::take(&mut node.actions))
    }

    /// Puts an evaluated queue back in front of anything queued meanwhile,
    /// applying removals that happened during evaluation.
    pub fn return_actions(&mut self, id: NodeId, mut evaluated: Vec<Action>) -> Result<()> {
        let node = self.get_mut(id)?;
        for removal in node.pending_removals.drain(..) {
            match removal {
                Some(key) => evaluated.retain(|a| a.key.as_deref() != Some(key.as_str())),
                None => evaluated.clear(),
            }
        }
        evaluated.append(&mut node.actions);
        node.actions = evaluated;
        node.actions_checked_out = false;
        node.checked_out_keys.clear();
        Ok(())
    }

    /// Runs `f` with original-action recording switched off. Engine
    /// callbacks (scene hooks, custom actions, tap listeners) run inside it,
    /// so replaying a scene does not replay what its callbacks queued.
    pub fn with_transient_actions<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.transient_depth += 1;
        let result = f(self);
        self.transient_depth -= 1;
        result
    }

    pub fn on_tap<F>(&mut self, id: NodeId, listener: F) -> Result<()>
    where
        F: Fn(&mut TapEvent, &mut NodeTree) -> Result<()> + 'static,
    {
        self.get_mut(id)?.tap_listeners.push(TapListener::new(None, listener));
        Ok(())
    }

    pub fn on_tap_keyed<F>(&mut self, id: NodeId, key: impl Into<String>, listener: F) -> Result<()>
    where
        F: Fn(&mut TapEvent, &mut NodeTree) -> Result<()> + 'static,
    {
        self.get_mut(id)?
            .tap_listeners
            .push(TapListener::new(Some(key.into()), listener));
        Ok(())
    }

    pub fn remove_tap_listener(&mut self, id: NodeId, key: &str) -> Result<bool> {
        let listeners = &mut self.get_mut(id)?.tap_listeners;
        let before = listeners.len();
        listeners.retain(|l| l.key.as_deref() != Some(key));
        Ok(before != listeners.len())
    }

    /// Deep-copies a subtree. Every copy gets a fresh id (and a fresh
    /// default name if it still had one); everything else is kept, and the
    /// copies' queues start from their original actions. The copy is an
    /// orphan.
    pub fn duplicate(&mut self, id: NodeId, name: Option<&str>) -> Result<NodeId> {
        let copy = self.duplicate_subtree(id, None)?;
        if let Some(name) = name {
            self.get_mut(copy)?.name = name.to_string();
        }
        Ok(copy)
    }

    fn duplicate_subtree(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<NodeId> {
        let source = self.get(id)?;
        let mut copy = source.clone();
        let new_id = NodeId::next();
        if copy.name == source.id.to_string() {
            copy.name = new_id.to_string();
        }
        let children = std::mem::take(&mut copy.children);
        copy.id = new_id;
        copy.parent = parent;
        copy.actions = copy.original_actions.iter().map(Action::rearmed).collect();
        copy.actions_checked_out = false;
        copy.pending_removals.clear();
        copy.checked_out_keys.clear();
        copy.init_state = InitState::Dirty;
        self.nodes.insert(new_id, copy);

        for child in children {
            let child_copy = self.duplicate_subtree(child, Some(new_id))?;
            self.get_mut(new_id)?.children.push(child_copy);
        }
        Ok(new_id)
    }

    /// Resolves every dirty node in `root`'s subtree: looks up the resources
    /// drawables need and sizes labels and sprites that were not given an
    /// explicit size. Returns how many nodes were initialized.
    pub fn initialize_pending(&mut self, root: NodeId, resources: &ResourceManager) -> Result<usize> {
        let mut initialized = 0;
        for id in self.subtree(root) {
            let node = self.get_mut(id)?;
            if node.init_state == InitState::Clean {
                continue;
            }
            match &node.kind {
                NodeKind::Sprite(sprite) => {
                    let entry = resources.require(&sprite.image_name, ResourceType::Image, &node.name)?;
                    if !node.explicit_size {
                        node.size = entry.size;
                    }
                }
                NodeKind::Label(label) => {
                    if let Some(font) = &label.font_name {
                        resources.require(font, ResourceType::Font, &node.name)?;
                    }
                    if !node.explicit_size {
                        node.size = measure_label(label);
                    }
                }
                _ => {}
            }
            node.init_state = InitState::Clean;
            initialized += 1;
        }
        if initialized > 0 {
            debug!("Initialized {} node(s) under {}", initialized, root);
        }
        Ok(initialized)
    }
}

/// Rough text extent: 0.6em per character, 1.2em per line.
pub fn measure_label(label: &LabelData) -> Vec2 {
    let longest = label.text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    let lines = label.text.lines().count().max(1);
    Vec2::new(
        longest as f32 * label.font_size * 0.6,
        lines as f32 * label.font_size * 1.2,
    )
}

fn check_constraints(constraints: &Constraints, node_name: &str) -> Result<()> {
    constraints.validate(node_name)?;
    for axis in [Axis::Horizontal, Axis::Vertical] {
        match constraints.on_axis(axis).count() {
            0 => warn!(
                "Node '{}' has no {:?} constraint; that axis uses its plain position",
                node_name, axis
            ),
            1 | 2 => {}
            n => warn!(
                "Node '{}' has {} {:?} constraints; that axis will not be resolved",
                node_name, n, axis
            ),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn scene_tree() -> (NodeTree, NodeId) {
        let mut tree = NodeTree::new();
        let scene = tree
            .insert(Node::scene(Vec4::ONE).with_name("scene").with_size(Vec2::new(400.0, 300.0)))
            .unwrap();
        (tree, scene)
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let (mut tree, scene) = scene_tree();
        let child = tree.add_child(scene, Node::group().with_name("group")).unwrap();
        assert_eq!(tree.children(scene), &[child]);
        assert_eq!(tree.parent(child), Some(scene));
        assert_eq!(tree.owning_scene(child), Some(scene));
    }

    #[test]
    fn test_duplicate_sibling_name_is_rejected_without_mutation() {
        let (mut tree, scene) = scene_tree();
        let first = tree.add_child(scene, Node::group().with_name("card")).unwrap();
        let len_before = tree.len();

        let result = tree.add_child(scene, Node::label("again").with_name("card"));
        assert!(matches!(result, Err(TableauError::DuplicateName { .. })));
        assert_eq!(tree.children(scene), &[first]);
        assert_eq!(tree.len(), len_before);
    }

    #[test]
    fn test_same_name_allowed_under_different_parents() {
        let (mut tree, scene) = scene_tree();
        let a = tree.add_child(scene, Node::group().with_name("a")).unwrap();
        let b = tree.add_child(scene, Node::group().with_name("b")).unwrap();
        assert!(tree.add_child(a, Node::group().with_name("item")).is_ok());
        assert!(tree.add_child(b, Node::group().with_name("item")).is_ok());
    }

    #[test]
    fn test_cloned_node_is_refused_a_second_slot() {
        let (mut tree, scene) = scene_tree();
        let a = tree.add_child(scene, Node::group().with_name("a")).unwrap();
        let b = tree.add_child(scene, Node::group().with_name("b")).unwrap();
        let card = Node::group().with_name("card");

        let first = tree.add_child(a, card.clone()).unwrap();
        let result = tree.add_child(b, card.clone());
        assert!(matches!(result, Err(TableauError::NodeIdInUse(id)) if id == first));
        assert!(matches!(tree.insert(card), Err(TableauError::NodeIdInUse(_))));

        assert_eq!(tree.children(a), &[first]);
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.parent(first), Some(a));

        tree.detach(first).unwrap();
        assert!(tree.children(a).is_empty());
    }

    #[test]
    fn test_scene_cannot_be_a_child() {
        let (mut tree, scene) = scene_tree();
        let group = tree.add_child(scene, Node::group()).unwrap();
        let result = tree.add_child(group, Node::scene(Vec4::ONE).with_name("nested"));
        assert!(matches!(result, Err(TableauError::SceneNotRoot(name)) if name == "nested"));
    }

    #[test]
    fn test_attach_rejects_cycles_and_moves_nodes() {
        let (mut tree, scene) = scene_tree();
        let a = tree.add_child(scene, Node::group().with_name("a")).unwrap();
        let b = tree.add_child(a, Node::group().with_name("b")).unwrap();

        assert!(matches!(tree.attach(b, a), Err(TableauError::CyclicAttachment(_))));

        tree.attach(scene, b).unwrap();
        assert_eq!(tree.children(scene), &[a, b]);
        assert!(tree.children(a).is_empty());
    }

    #[test]
    fn test_detach_orphans_and_remove_drops() {
        let (mut tree, scene) = scene_tree();
        let a = tree.add_child(scene, Node::group().with_name("a")).unwrap();
        let b = tree.add_child(a, Node::group().with_name("b")).unwrap();

        tree.detach(a).unwrap();
        assert!(tree.children(scene).is_empty());
        assert_eq!(tree.parent(a), None);
        assert_eq!(tree.parent(b), Some(a));

        tree.remove_subtree(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
    }

    #[test]
    fn test_set_name_checks_siblings() {
        let (mut tree, scene) = scene_tree();
        tree.add_child(scene, Node::group().with_name("a")).unwrap();
        let b = tree.add_child(scene, Node::group().with_name("b")).unwrap();
        assert!(tree.set_name(b, "a").is_err());
        assert!(tree.set_name(b, "b").is_ok());
        assert!(tree.set_name(b, "c").is_ok());
        assert_eq!(tree.get(b).unwrap().name(), "c");
    }

    #[test]
    fn test_find_descendant_searches_whole_scene() {
        let (mut tree, scene) = scene_tree();
        let a = tree.add_child(scene, Node::group().with_name("a")).unwrap();
        let deep = tree.add_child(a, Node::group().with_name("deep")).unwrap();
        assert_eq!(tree.find_descendant(scene, "deep"), Some(deep));
        assert_eq!(tree.find_descendant(scene, "scene"), Some(scene));
        assert_eq!(tree.find_descendant(scene, "missing"), None);
    }

    #[test]
    fn test_malformed_layout_rejected_on_insert() {
        let (mut tree, scene) = scene_tree();
        let bad = Node::group().with_layout(Constraints::new().top_to_top_of("scene").vertical_bias(-0.1));
        assert!(matches!(
            tree.add_child(scene, bad),
            Err(TableauError::MalformedConstraint { .. })
        ));
    }

    #[test]
    fn test_run_action_appends_and_records_original() {
        let (mut tree, scene) = scene_tree();
        tree.run_action(scene, Action::wait(10.0).with_key("a")).unwrap();
        tree.run_action(scene, Action::wait(20.0).with_key("b")).unwrap();

        let node = tree.get(scene).unwrap();
        assert_eq!(node.actions().len(), 2);
        assert_eq!(node.original_actions.len(), 2);

        assert!(tree.remove_action(scene, "a").unwrap());
        assert!(!tree.remove_action(scene, "a").unwrap());
        let node = tree.get(scene).unwrap();
        assert_eq!(node.actions().len(), 1);
        assert_eq!(node.original_actions.len(), 1);
    }

    #[test]
    fn test_transient_actions_are_not_recorded() {
        let (mut tree, scene) = scene_tree();
        tree.with_transient_actions(|tree| tree.run_action(scene, Action::wait(5.0))).unwrap();
        let node = tree.get(scene).unwrap();
        assert_eq!(node.actions().len(), 1);
        assert!(node.original_actions.is_empty());
    }

    #[test]
    fn test_checkout_merges_new_actions_and_removals() {
        let (mut tree, scene) = scene_tree();
        tree.run_action(scene, Action::wait(10.0).with_key("keep")).unwrap();
        tree.run_action(scene, Action::wait(10.0).with_key("drop")).unwrap();

        let queue = tree.checkout_actions(scene).unwrap();
        tree.run_action(scene, Action::wait(1.0).with_key("late")).unwrap();
        tree.remove_action(scene, "drop").unwrap();
        tree.return_actions(scene, queue).unwrap();

        let keys: Vec<_> = tree
            .get(scene)
            .unwrap()
            .actions()
            .iter()
            .map(|a| a.key.clone().unwrap())
            .collect();
        assert_eq!(keys, vec!["keep", "late"]);
    }

    #[test]
    fn test_remove_action_while_checked_out_reports_only_matches() {
        let (mut tree, scene) = scene_tree();
        tree.run_action(scene, Action::wait(10.0).with_key("pulse")).unwrap();

        let queue = tree.checkout_actions(scene).unwrap();
        assert!(!tree.remove_action(scene, "missing").unwrap());
        assert!(tree.remove_action(scene, "pulse").unwrap());
        assert!(!tree.remove_action(scene, "pulse").unwrap());
        tree.return_actions(scene, queue).unwrap();

        assert!(tree.get(scene).unwrap().actions().is_empty());
    }

    #[test]
    fn test_rearm_restores_completed_actions() {
        let (mut tree, scene) = scene_tree();
        tree.run_action(scene, Action::wait(10.0)).unwrap();
        tree.get_mut(scene).unwrap().actions.clear();

        tree.rearm_actions(scene).unwrap();
        assert_eq!(tree.get(scene).unwrap().actions().len(), 1);
    }

    #[test]
    fn test_duplicate_regenerates_identity_and_keeps_fields() {
        let (mut tree, scene) = scene_tree();
        let card = tree
            .add_child(
                scene,
                Node::rect(Vec2::new(40.0, 60.0), Vec4::ONE)
                    .with_name("card")
                    .at(Vec2::new(10.0, 20.0))
                    .with_z(3.0)
                    .interactive(),
            )
            .unwrap();
        let pip = tree.add_child(card, Node::circle(4.0, Vec4::ONE)).unwrap();
        tree.run_action(card, Action::wait(100.0)).unwrap();

        let copy = tree.duplicate(card, Some("card-2")).unwrap();
        assert_ne!(copy, card);
        assert_eq!(tree.parent(copy), None);

        let original = tree.get(card).unwrap();
        let duplicated = tree.get(copy).unwrap();
        assert_eq!(duplicated.name(), "card-2");
        assert_eq!(duplicated.position, original.position);
        assert_eq!(duplicated.z_position, original.z_position);
        assert_eq!(duplicated.size(), original.size());
        assert_eq!(duplicated.flags, original.flags);
        assert_eq!(duplicated.actions().len(), 1);

        let copied_pip = duplicated.children()[0];
        assert_ne!(copied_pip, pip);
        assert_eq!(tree.parent(copied_pip), Some(copy));
        assert_eq!(tree.get(copied_pip).unwrap().name(), copied_pip.to_string());

        tree.attach(scene, copy).unwrap();
        assert_eq!(tree.children(scene), &[card, copy]);
    }

    #[test]
    fn test_initialize_pending_sizes_drawables() {
        let (mut tree, scene) = scene_tree();
        let mut resources = ResourceManager::new();
        resources.add_image("star", Vec2::new(32.0, 16.0));

        let sprite = tree.add_child(scene, Node::sprite("star")).unwrap();
        let label = tree.add_child(scene, Node::label("abcd").with_font_size(10.0)).unwrap();

        let count = tree.initialize_pending(scene, &resources).unwrap();
        assert_eq!(count, 3);
        assert_eq!(tree.get(sprite).unwrap().size(), Vec2::new(32.0, 16.0));
        assert_eq!(tree.get(label).unwrap().size(), Vec2::new(24.0, 12.0));
        assert_eq!(tree.get(label).unwrap().init_state(), InitState::Clean);

        assert_eq!(tree.initialize_pending(scene, &resources).unwrap(), 0);

        if let NodeKind::Label(data) = tree.get_mut(label).unwrap().kind_mut() {
            data.text = "abcdefgh".to_string();
        }
        tree.initialize_pending(scene, &resources).unwrap();
        assert_eq!(tree.get(label).unwrap().size(), Vec2::new(48.0, 12.0));
    }

    #[test]
    fn test_missing_image_fails_at_initialization() {
        let (mut tree, scene) = scene_tree();
        tree.add_child(scene, Node::sprite("ghost").with_name("sprite")).unwrap();
        let result = tree.initialize_pending(scene, &ResourceManager::new());
        assert!(matches!(
            result,
            Err(TableauError::ResourceNotFound { node, resource }) if node == "sprite" && resource == "ghost"
        ));
    }
}
