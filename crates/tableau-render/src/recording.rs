// crates/tableau-render/src/recording.rs
use crate::{CommandRenderer, RenderCommand, RenderResult, Renderer};
use glam::{Vec2, Vec4};

/// Headless backend that keeps every frame's commands. Used by the debug
/// binary and by tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Vec<RenderCommand>>,
    viewport: Vec2,
}

impl RecordingRenderer {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            frames: Vec::new(),
            viewport,
        }
    }

    pub fn last_frame(&self) -> Option<&[RenderCommand]> {
        self.frames.last().map(Vec::as_slice)
    }
}

impl Renderer for RecordingRenderer {
    type Surface = Vec2;
    type Context = Vec<RenderCommand>;

    fn initialize(surface: Self::Surface) -> RenderResult<Self> {
        Ok(Self::new(surface))
    }

    fn begin_frame(&mut self, _clear_color: Vec4) -> RenderResult<Self::Context> {
        Ok(Vec::new())
    }

    fn end_frame(&mut self, context: Self::Context) -> RenderResult<()> {
        self.frames.push(context);
        Ok(())
    }

    fn resize(&mut self, new_size: Vec2) -> RenderResult<()> {
        self.viewport = new_size;
        Ok(())
    }

    fn viewport_size(&self) -> Vec2 {
        self.viewport
    }
}

impl CommandRenderer for RecordingRenderer {
    fn execute_commands(&mut self, context: &mut Self::Context, commands: &[RenderCommand]) -> RenderResult<()> {
        context.extend_from_slice(commands);
        Ok(())
    }
}
