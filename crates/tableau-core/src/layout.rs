// crates/tableau-core/src/layout.rs
use crate::{NodeId, Result, TableauError};

/// How a constraint names its alter: directly, or by name within the
/// focal node's scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterRef {
    Node(NodeId),
    Named(String),
}

impl From<NodeId> for AlterRef {
    fn from(id: NodeId) -> Self {
        AlterRef::Node(id)
    }
}

impl From<&str> for AlterRef {
    fn from(name: &str) -> Self {
        AlterRef::Named(name.to_string())
    }
}

impl From<String> for AlterRef {
    fn from(name: String) -> Self {
        AlterRef::Named(name)
    }
}

impl std::fmt::Display for AlterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlterRef::Node(id) => write!(f, "{}", id),
            AlterRef::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Minimum is top/start, maximum is bottom/end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Min,
    Max,
}

/// `<focal edge>To<alter edge>Of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    TopToTopOf,
    TopToBottomOf,
    BottomToTopOf,
    BottomToBottomOf,
    StartToStartOf,
    StartToEndOf,
    EndToEndOf,
    EndToStartOf,
}

impl ConstraintType {
    pub fn axis(self) -> Axis {
        match self {
            ConstraintType::TopToTopOf
            | ConstraintType::TopToBottomOf
            | ConstraintType::BottomToTopOf
            | ConstraintType::BottomToBottomOf => Axis::Vertical,
            _ => Axis::Horizontal,
        }
    }

    pub fn focal_edge(self) -> Edge {
        match self {
            ConstraintType::TopToTopOf
            | ConstraintType::TopToBottomOf
            | ConstraintType::StartToStartOf
            | ConstraintType::StartToEndOf => Edge::Min,
            _ => Edge::Max,
        }
    }

    pub fn alter_edge(self) -> Edge {
        match self {
            ConstraintType::TopToTopOf
            | ConstraintType::BottomToTopOf
            | ConstraintType::StartToStartOf
            | ConstraintType::EndToStartOf => Edge::Min,
            _ => Edge::Max,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintType,
    pub alter: AlterRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub start: f32,
    pub end: f32,
}

impl Margins {
    /// Margin applied when the focal node's `edge` on `axis` is pinned.
    pub fn for_edge(&self, axis: Axis, edge: Edge) -> f32 {
        match (axis, edge) {
            (Axis::Vertical, Edge::Min) => self.top,
            (Axis::Vertical, Edge::Max) => self.bottom,
            (Axis::Horizontal, Edge::Min) => self.start,
            (Axis::Horizontal, Edge::Max) => self.end,
        }
    }
}

/// Declarative layout for one node, resolved against its alters every
/// frame instead of reading the node's own `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub constraints: Vec<Constraint>,
    pub margins: Margins,
    pub horizontal_bias: f32,
    pub vertical_bias: f32,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            constraints: Vec::new(),
            margins: Margins::default(),
            horizontal_bias: 0.5,
            vertical_bias: 0.5,
        }
    }
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ConstraintType, alter: impl Into<AlterRef>) -> Self {
        self.constraints.push(Constraint {
            kind,
            alter: alter.into(),
        });
        self
    }

    pub fn top_to_top_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::TopToTopOf, alter)
    }

    pub fn top_to_bottom_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::TopToBottomOf, alter)
    }

    pub fn bottom_to_top_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::BottomToTopOf, alter)
    }

    pub fn bottom_to_bottom_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::BottomToBottomOf, alter)
    }

    pub fn start_to_start_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::StartToStartOf, alter)
    }

    pub fn start_to_end_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::StartToEndOf, alter)
    }

    pub fn end_to_end_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::EndToEndOf, alter)
    }

    pub fn end_to_start_of(self, alter: impl Into<AlterRef>) -> Self {
        self.with(ConstraintType::EndToStartOf, alter)
    }

    /// Pins both horizontal edges to the same alter; with the default bias
    /// the node ends up centered in it.
    pub fn center_horizontally_in(self, alter: impl Into<AlterRef>) -> Self {
        let alter = alter.into();
        self.start_to_start_of(alter.clone()).end_to_end_of(alter)
    }

    pub fn center_vertically_in(self, alter: impl Into<AlterRef>) -> Self {
        let alter = alter.into();
        self.top_to_top_of(alter.clone()).bottom_to_bottom_of(alter)
    }

    pub fn margin_top(mut self, margin: f32) -> Self {
        self.margins.top = margin;
        self
    }

    pub fn margin_bottom(mut self, margin: f32) -> Self {
        self.margins.bottom = margin;
        self
    }

    pub fn margin_start(mut self, margin: f32) -> Self {
        self.margins.start = margin;
        self
    }

    pub fn margin_end(mut self, margin: f32) -> Self {
        self.margins.end = margin;
        self
    }

    pub fn horizontal_bias(mut self, bias: f32) -> Self {
        self.horizontal_bias = bias;
        self
    }

    pub fn vertical_bias(mut self, bias: f32) -> Self {
        self.vertical_bias = bias;
        self
    }

    pub fn bias(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal_bias,
            Axis::Vertical => self.vertical_bias,
        }
    }

    pub fn on_axis(&self, axis: Axis) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.kind.axis() == axis)
    }

    pub fn alters(&self) -> impl Iterator<Item = &AlterRef> {
        self.constraints.iter().map(|c| &c.alter)
    }

    /// Rejects values the resolver cannot interpolate with.
    pub fn validate(&self, node_name: &str) -> Result<()> {
        for (axis, bias) in [("horizontal", self.horizontal_bias), ("vertical", self.vertical_bias)] {
            if !bias.is_finite() || !(0.0..=1.0).contains(&bias) {
                return Err(TableauError::MalformedConstraint {
                    node: node_name.to_string(),
                    reason: format!("{} bias {} is outside [0, 1]", axis, bias),
                });
            }
        }
        let m = self.margins;
        if [m.top, m.bottom, m.start, m.end].iter().any(|v| !v.is_finite()) {
            return Err(TableauError::MalformedConstraint {
                node: node_name.to_string(),
                reason: "margins must be finite".to_string(),
            });
        }
        Ok(())
    }
}
