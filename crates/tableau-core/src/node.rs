// crates/tableau-core/src/node.rs
use crate::{Action, Constraints, NodeTree, Result, TapListener, Transform};
use bitflags::bitflags;
use glam::{Vec2, Vec4};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Receives taps.
        const INTERACTIVE = 0b0000_0001;
        /// Skipped, with its subtree, by drawing and hit-testing.
        const HIDDEN = 0b0000_0010;
    }
}

/// Whether a node's derived state (measured size, looked-up resources) is
/// up to date with its properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Dirty,
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    Start,
    #[default]
    Center,
    End,
}

#[derive(Clone)]
pub struct SceneHook(Rc<dyn Fn(&mut NodeTree, NodeId) -> Result<()>>);

impl SceneHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut NodeTree, NodeId) -> Result<()> + 'static,
    {
        Self(Rc::new(hook))
    }

    pub fn call(&self, tree: &mut NodeTree, scene: NodeId) -> Result<()> {
        (self.0)(tree, scene)
    }
}

impl fmt::Debug for SceneHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SceneHook(..)")
    }
}

#[derive(Debug, Clone)]
pub struct SceneData {
    pub background_color: Vec4,
    /// Fired once per presentation, before any transition animation.
    pub on_setup: Vec<SceneHook>,
    /// Fired once the scene is fully presented.
    pub on_appear: Vec<SceneHook>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeGeometry {
    Rect { corner_radius: f32 },
    Circle { radius: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeData {
    pub geometry: ShapeGeometry,
    pub fill_color: Vec4,
    pub stroke_color: Option<Vec4>,
    pub line_width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelData {
    pub text: String,
    pub font_name: Option<String>,
    pub font_size: f32,
    pub font_color: Vec4,
    pub alignment: TextAlignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteData {
    pub image_name: String,
}

/// The closed set of node variants.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Scene(SceneData),
    Shape(ShapeData),
    Label(LabelData),
    Sprite(SpriteData),
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::Scene(_) => "Scene",
            NodeKind::Shape(_) => "Shape",
            NodeKind::Label(_) => "Label",
            NodeKind::Sprite(_) => "Sprite",
        }
    }

    pub fn is_drawable(&self) -> bool {
        !matches!(self, NodeKind::Group)
    }
}

/// One element of the presentation tree. Structure (parent, children, name)
/// is owned by the [`NodeTree`]; geometry and flags are free to edit.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    pub position: Vec2,
    pub scale: f32,
    pub z_position: f32,
    pub flags: NodeFlags,

    pub(crate) size: Vec2,
    pub(crate) explicit_size: bool,
    pub(crate) absolute: Transform,
    pub(crate) layout: Option<Constraints>,
    pub(crate) init_state: InitState,

    pub(crate) actions: Vec<Action>,
    pub(crate) original_actions: Vec<Action>,
    pub(crate) actions_checked_out: bool,
    pub(crate) pending_removals: Vec<Option<String>>,
    pub(crate) checked_out_keys: Vec<String>,
    pub(crate) tap_listeners: Vec<TapListener>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        let id = NodeId::next();
        Self {
            id,
            name: id.to_string(),
            kind,
            parent: None,
            children: Vec::new(),
            position: Vec2::ZERO,
            scale: 1.0,
            z_position: 0.0,
            flags: NodeFlags::empty(),
            size: Vec2::ZERO,
            explicit_size: false,
            absolute: Transform::IDENTITY,
            layout: None,
            init_state: InitState::Dirty,
            actions: Vec::new(),
            original_actions: Vec::new(),
            actions_checked_out: false,
            pending_removals: Vec::new(),
            checked_out_keys: Vec::new(),
            tap_listeners: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn scene(background_color: Vec4) -> Self {
        Self::new(NodeKind::Scene(SceneData {
            background_color,
            on_setup: Vec::new(),
            on_appear: Vec::new(),
        }))
    }

    pub fn rect(size: Vec2, fill_color: Vec4) -> Self {
        Self::new(NodeKind::Shape(ShapeData {
            geometry: ShapeGeometry::Rect { corner_radius: 0.0 },
            fill_color,
            stroke_color: None,
            line_width: 0.0,
        }))
        .with_size(size)
    }

    pub fn circle(radius: f32, fill_color: Vec4) -> Self {
        Self::new(NodeKind::Shape(ShapeData {
            geometry: ShapeGeometry::Circle { radius },
            fill_color,
            stroke_color: None,
            line_width: 0.0,
        }))
        .with_size(Vec2::splat(radius * 2.0))
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Label(LabelData {
            text: text.into(),
            font_name: None,
            font_size: 16.0,
            font_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            alignment: TextAlignment::Center,
        }))
    }

    pub fn sprite(image_name: impl Into<String>) -> Self {
        Self::new(NodeKind::Sprite(SpriteData {
            image_name: image_name.into(),
        }))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.set_size(size);
        self
    }

    pub fn with_z(mut self, z_position: f32) -> Self {
        self.z_position = z_position;
        self
    }

    pub fn with_layout(mut self, constraints: Constraints) -> Self {
        self.layout = Some(constraints);
        self
    }

    pub fn interactive(mut self) -> Self {
        self.flags.insert(NodeFlags::INTERACTIVE);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.flags.insert(NodeFlags::HIDDEN);
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        if let NodeKind::Label(label) = self.kind_mut() {
            label.font_size = font_size;
        }
        self
    }

    pub fn with_font_color(mut self, color: Vec4) -> Self {
        if let NodeKind::Label(label) = self.kind_mut() {
            label.font_color = color;
        }
        self
    }

    pub fn with_font_name(mut self, font_name: impl Into<String>) -> Self {
        if let NodeKind::Label(label) = self.kind_mut() {
            label.font_name = Some(font_name.into());
        }
        self
    }

    pub fn with_stroke(mut self, color: Vec4, line_width: f32) -> Self {
        if let NodeKind::Shape(shape) = self.kind_mut() {
            shape.stroke_color = Some(color);
            shape.line_width = line_width;
        }
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        if let NodeKind::Shape(ShapeData {
            geometry: ShapeGeometry::Rect { corner_radius },
            ..
        }) = self.kind_mut()
        {
            *corner_radius = radius;
        }
        self
    }

    /// No-op on anything but a scene.
    pub fn on_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut NodeTree, NodeId) -> Result<()> + 'static,
    {
        if let NodeKind::Scene(scene) = &mut self.kind {
            scene.on_setup.push(SceneHook::new(hook));
        }
        self
    }

    /// No-op on anything but a scene.
    pub fn on_appear<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut NodeTree, NodeId) -> Result<()> + 'static,
    {
        if let NodeKind::Scene(scene) = &mut self.kind {
            scene.on_appear.push(SceneHook::new(hook));
        }
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Mutable access to the variant data. Marks the node dirty.
    pub fn kind_mut(&mut self) -> &mut NodeKind {
        self.init_state = InitState::Dirty;
        &mut self.kind
    }

    pub fn is_scene(&self) -> bool {
        matches!(self.kind, NodeKind::Scene(_))
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// An explicit size stops labels and sprites from sizing themselves.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.explicit_size = true;
        self.init_state = InitState::Dirty;
    }

    pub fn layout(&self) -> Option<&Constraints> {
        self.layout.as_ref()
    }

    pub fn init_state(&self) -> InitState {
        self.init_state
    }

    pub fn local(&self) -> Transform {
        Transform::new(self.position, self.scale)
    }

    pub fn absolute(&self) -> Transform {
        self.absolute
    }

    pub fn absolute_position(&self) -> Vec2 {
        self.absolute.position
    }

    pub fn absolute_scale(&self) -> f32 {
        self.absolute.scale
    }

    /// Written by the layout pass only.
    pub fn set_absolute(&mut self, absolute: Transform) {
        self.absolute = absolute;
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(NodeFlags::HIDDEN)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.flags.set(NodeFlags::HIDDEN, hidden);
    }

    pub fn is_interactive(&self) -> bool {
        self.flags.contains(NodeFlags::INTERACTIVE)
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.flags.set(NodeFlags::INTERACTIVE, interactive);
    }

    /// Absolute size, after ancestor scaling.
    pub fn scaled_size(&self) -> Vec2 {
        self.size * self.absolute.scale
    }

    /// Absolute top-left corner. A scene's position is its origin; every
    /// other node is positioned by its center.
    pub fn absolute_min(&self) -> Vec2 {
        if self.is_scene() {
            self.absolute.position
        } else {
            self.absolute.position - self.scaled_size() / 2.0
        }
    }

    pub fn absolute_max(&self) -> Vec2 {
        self.absolute_min() + self.scaled_size()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        let (min, max) = (self.absolute_min(), self.absolute_max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Pending actions, in attachment order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn tap_listeners(&self) -> &[TapListener] {
        &self.tap_listeners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_default_names() {
        let a = Node::group();
        let b = Node::group();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.name(), a.id().to_string());
    }

    #[test]
    fn test_builders_mark_dirty_and_set_fields() {
        let node = Node::label("Ready?")
            .with_name("prompt")
            .with_font_size(24.0)
            .at(Vec2::new(5.0, 6.0))
            .interactive();
        assert_eq!(node.name(), "prompt");
        assert_eq!(node.init_state(), InitState::Dirty);
        assert!(node.is_interactive());
        assert!(!node.is_hidden());
        match node.kind() {
            NodeKind::Label(label) => assert_eq!(label.font_size, 24.0),
            other => panic!("unexpected kind {}", other.type_name()),
        }
    }

    #[test]
    fn test_bounds_for_centered_nodes_and_scenes() {
        let mut rect = Node::rect(Vec2::new(20.0, 10.0), Vec4::ONE);
        rect.set_absolute(Transform::new(Vec2::new(100.0, 100.0), 2.0));
        assert_eq!(rect.absolute_min(), Vec2::new(80.0, 90.0));
        assert_eq!(rect.absolute_max(), Vec2::new(120.0, 110.0));
        assert!(rect.contains_point(Vec2::new(119.0, 91.0)));
        assert!(!rect.contains_point(Vec2::new(121.0, 100.0)));

        let mut scene = Node::scene(Vec4::ONE).with_size(Vec2::new(400.0, 300.0));
        scene.set_absolute(Transform::new(Vec2::new(-400.0, 0.0), 1.0));
        assert_eq!(scene.absolute_min(), Vec2::new(-400.0, 0.0));
        assert_eq!(scene.absolute_max(), Vec2::new(0.0, 300.0));
    }

    #[test]
    fn test_circle_size_and_hooks_only_on_scenes() {
        let circle = Node::circle(12.0, Vec4::ONE).on_setup(|_, _| Ok(()));
        assert_eq!(circle.size(), Vec2::splat(24.0));

        let scene = Node::scene(Vec4::ONE).on_setup(|_, _| Ok(())).on_appear(|_, _| Ok(()));
        let NodeKind::Scene(data) = scene.kind() else {
            panic!("expected a scene");
        };
        assert_eq!(data.on_setup.len(), 1);
        assert_eq!(data.on_appear.len(), 1);
    }
}
