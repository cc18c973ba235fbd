// crates/tableau-render/src/lib.rs

use glam::{Vec2, Vec4};
use tableau_core::{InitState, Node, NodeId, NodeKind, NodeTree, ShapeGeometry, TableauError, TextAlignment};
use tracing::debug;

pub mod events;
pub mod primitives;
pub mod recording;

pub use events::*;
pub use primitives::*;
pub use recording::*;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),
    #[error("Render operation failed: {0}")]
    RenderFailed(String),
    #[error(transparent)]
    Scene(#[from] TableauError),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Core rendering trait that all backends must implement
pub trait Renderer {
    type Surface;
    type Context;

    /// Initialize the renderer with the given surface
    fn initialize(surface: Self::Surface) -> RenderResult<Self>
    where
        Self: Sized;

    /// Begin a new frame
    fn begin_frame(&mut self, clear_color: Vec4) -> RenderResult<Self::Context>;

    /// End the current frame and present it
    fn end_frame(&mut self, context: Self::Context) -> RenderResult<()>;

    /// Handle window resize
    fn resize(&mut self, new_size: Vec2) -> RenderResult<()>;

    /// Current viewport size in device pixels
    fn viewport_size(&self) -> Vec2;
}

/// Primitive draw calls, already in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Size of the full canvas in device pixels; backends that resample
    /// (the terminal) map it onto their own surface.
    SetCanvasSize(Vec2),
    Clear {
        color: Vec4,
    },
    DrawRect {
        /// Top-left corner.
        position: Vec2,
        size: Vec2,
        color: Vec4,
        corner_radius: f32,
        stroke_color: Option<Vec4>,
        line_width: f32,
    },
    DrawCircle {
        center: Vec2,
        radius: f32,
        color: Vec4,
        stroke_color: Option<Vec4>,
        line_width: f32,
    },
    DrawText {
        position: Vec2,
        size: Vec2,
        text: String,
        font_name: Option<String>,
        font_size: f32,
        color: Vec4,
        alignment: TextAlignment,
    },
    DrawImage {
        position: Vec2,
        size: Vec2,
        image: String,
    },
}

impl RenderCommand {
    /// Screen-space bounds of a drawing command.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            RenderCommand::DrawRect { position, size, .. }
            | RenderCommand::DrawText { position, size, .. }
            | RenderCommand::DrawImage { position, size, .. } => Some(Rect::from_position_size(*position, *size)),
            RenderCommand::DrawCircle { center, radius, .. } => {
                Some(Rect::from_position_size(*center - Vec2::splat(*radius), Vec2::splat(radius * 2.0)))
            }
            RenderCommand::SetCanvasSize(_) | RenderCommand::Clear { .. } => None,
        }
    }
}

/// Trait for backends that use command-based rendering
pub trait CommandRenderer: Renderer {
    /// Execute a batch of render commands
    fn execute_commands(&mut self, context: &mut Self::Context, commands: &[RenderCommand]) -> RenderResult<()>;
}

/// Walks live scenes and turns their drawable nodes into commands for a
/// backend.
pub struct SceneRenderer<R: CommandRenderer> {
    backend: R,
    viewport_size: Vec2,
    canvas_size: Vec2,
}

impl<R: CommandRenderer> SceneRenderer<R> {
    pub fn new(backend: R, canvas_size: Vec2) -> Self {
        let viewport_size = backend.viewport_size();
        Self {
            backend,
            viewport_size,
            canvas_size,
        }
    }

    /// Draws `scenes` in order (an outgoing scene before the incoming one).
    /// `device_scale` maps root space to device pixels.
    pub fn render_frame(&mut self, tree: &NodeTree, scenes: &[NodeId], clear_color: Vec4, device_scale: f32) -> RenderResult<()> {
        let commands = self.frame_commands(tree, scenes, clear_color, device_scale)?;
        let mut context = self.backend.begin_frame(clear_color)?;
        self.backend.execute_commands(&mut context, &commands)?;
        self.backend.end_frame(context)?;
        Ok(())
    }

    pub fn frame_commands(
        &self,
        tree: &NodeTree,
        scenes: &[NodeId],
        clear_color: Vec4,
        device_scale: f32,
    ) -> RenderResult<Vec<RenderCommand>> {
        let mut commands = vec![
            RenderCommand::SetCanvasSize(self.canvas_size * device_scale),
            RenderCommand::Clear { color: clear_color },
        ];
        for &scene in scenes {
            let mut drawables = Vec::new();
            collect_visible(tree, scene, &mut drawables)?;
            // Stable, so equal z keeps tree order.
            drawables.sort_by(|a, b| a.z_position.total_cmp(&b.z_position));
            for node in drawables {
                if node.init_state() == InitState::Dirty {
                    debug!("Skipping uninitialized node '{}'", node.name());
                    continue;
                }
                commands.extend(node_to_command(node, device_scale));
            }
        }
        Ok(commands)
    }

    pub fn resize(&mut self, new_size: Vec2) -> RenderResult<()> {
        self.viewport_size = new_size;
        self.backend.resize(new_size)
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }
}

fn collect_visible<'a>(tree: &'a NodeTree, id: NodeId, out: &mut Vec<&'a Node>) -> RenderResult<()> {
    let node = tree.get(id)?;
    if node.is_hidden() {
        return Ok(());
    }
    if node.kind().is_drawable() {
        out.push(node);
    }
    for &child in node.children() {
        collect_visible(tree, child, out)?;
    }
    Ok(())
}

fn node_to_command(node: &Node, device_scale: f32) -> Option<RenderCommand> {
    let scale = node.absolute_scale() * device_scale;
    let position = node.absolute_min() * device_scale;
    let size = node.scaled_size() * device_scale;

    match node.kind() {
        NodeKind::Group => None,
        NodeKind::Scene(scene) => Some(RenderCommand::DrawRect {
            position,
            size,
            color: scene.background_color,
            corner_radius: 0.0,
            stroke_color: None,
            line_width: 0.0,
        }),
        NodeKind::Shape(shape) => match shape.geometry {
            ShapeGeometry::Rect { corner_radius } => Some(RenderCommand::DrawRect {
                position,
                size,
                color: shape.fill_color,
                corner_radius: corner_radius * scale,
                stroke_color: shape.stroke_color,
                line_width: shape.line_width * scale,
            }),
            ShapeGeometry::Circle { radius } => Some(RenderCommand::DrawCircle {
                center: node.absolute_position() * device_scale,
                radius: radius * scale,
                color: shape.fill_color,
                stroke_color: shape.stroke_color,
                line_width: shape.line_width * scale,
            }),
        },
        NodeKind::Label(label) => Some(RenderCommand::DrawText {
            position,
            size,
            text: label.text.clone(),
            font_name: label.font_name.clone(),
            font_size: label.font_size * scale,
            color: label.font_color,
            alignment: label.alignment,
        }),
        NodeKind::Sprite(sprite) => Some(RenderCommand::DrawImage {
            position,
            size,
            image: sprite.image_name.clone(),
        }),
    }
}
