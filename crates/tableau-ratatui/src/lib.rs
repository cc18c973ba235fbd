// crates/tableau-ratatui/src/lib.rs
use glam::{Vec2, Vec4};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use tableau_core::TextAlignment;
use tableau_render::{CommandRenderer, RenderCommand, RenderError, RenderResult, Renderer};

/// Draws scenes into a terminal, resampling the canvas onto the cell grid.
pub struct RatatuiRenderer<B: Backend> {
    pub terminal: Terminal<B>,
    source_size: Vec2,
}

pub struct RatatuiContext;

impl<B: Backend> RatatuiRenderer<B> {
    /// Point in draw-command space at the middle of a terminal cell. Inverse
    /// of the mapping draws go through, so mouse cells can be hit-tested.
    pub fn cell_to_source(&self, column: u16, row: u16) -> Vec2 {
        let area = self.terminal.size().unwrap_or_default();
        if area.width == 0 || area.height == 0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (column as f32 + 0.5) / area.width as f32 * self.source_size.x,
            (row as f32 + 0.5) / area.height as f32 * self.source_size.y,
        )
    }
}

impl<B: Backend> Renderer for RatatuiRenderer<B> {
    type Surface = B;
    type Context = RatatuiContext;

    fn initialize(surface: Self::Surface) -> RenderResult<Self> {
        let terminal = Terminal::new(surface).map_err(|e| RenderError::InitializationFailed(e.to_string()))?;
        Ok(Self {
            terminal,
            source_size: Vec2::new(800.0, 600.0), // Replaced by the first SetCanvasSize
        })
    }

    fn begin_frame(&mut self, _clear_color: Vec4) -> RenderResult<Self::Context> {
        Ok(RatatuiContext)
    }

    fn end_frame(&mut self, _context: Self::Context) -> RenderResult<()> {
        Ok(())
    }

    fn resize(&mut self, new_size: Vec2) -> RenderResult<()> {
        self.terminal
            .resize(Rect::new(0, 0, new_size.x as u16, new_size.y as u16))
            .map_err(|e| RenderError::RenderFailed(format!("Terminal resize failed: {}", e)))
    }

    fn viewport_size(&self) -> Vec2 {
        let size = self.terminal.size().unwrap_or_default();
        Vec2::new(size.width as f32, size.height as f32)
    }
}

impl<B: Backend> CommandRenderer for RatatuiRenderer<B> {
    fn execute_commands(&mut self, _context: &mut Self::Context, commands: &[RenderCommand]) -> RenderResult<()> {
        for command in commands {
            if let RenderCommand::SetCanvasSize(size) = command {
                if size.x > 0.0 && size.y > 0.0 {
                    self.source_size = *size;
                }
            }
        }

        let source_size = self.source_size;
        self.terminal
            .draw(|frame| draw_commands(commands, frame, source_size))
            .map_err(|e| RenderError::RenderFailed(e.to_string()))?;
        Ok(())
    }
}

fn draw_commands(commands: &[RenderCommand], frame: &mut Frame, canvas: Vec2) {
    let screen = frame.size();

    for command in commands {
        match command {
            RenderCommand::SetCanvasSize(_) => {}
            RenderCommand::Clear { color } => {
                frame.render_widget(Block::default().style(Style::default().bg(to_terminal_color(*color))), screen);
            }
            RenderCommand::DrawRect {
                position,
                size,
                color,
                stroke_color,
                ..
            } => {
                if let Some(area) = translate_rect(*position, *size, canvas, screen) {
                    let mut block = Block::default().style(Style::default().bg(to_terminal_color(*color)));
                    if let Some(stroke) = stroke_color {
                        block = block
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(to_terminal_color(*stroke)));
                    }
                    frame.render_widget(Clear, area);
                    frame.render_widget(block, area);
                }
            }
            // Cells are too coarse for curves; a circle fills its bounding box.
            RenderCommand::DrawCircle { center, radius, color, .. } => {
                let origin = *center - Vec2::splat(*radius);
                let size = Vec2::splat(radius * 2.0);
                if let Some(area) = translate_rect(origin, size, canvas, screen) {
                    frame.render_widget(Block::default().style(Style::default().bg(to_terminal_color(*color))), area);
                }
            }
            RenderCommand::DrawText {
                position,
                size,
                text,
                color,
                alignment,
                ..
            } => {
                if let Some(area) = translate_rect(*position, *size, canvas, screen) {
                    let paragraph = Paragraph::new(text.as_str())
                        .style(Style::default().fg(to_terminal_color(*color)))
                        .alignment(match alignment {
                            TextAlignment::Start => Alignment::Left,
                            TextAlignment::Center => Alignment::Center,
                            TextAlignment::End => Alignment::Right,
                        });
                    frame.render_widget(paragraph, area);
                }
            }
            RenderCommand::DrawImage { position, size, image } => {
                if let Some(area) = translate_rect(*position, *size, canvas, screen) {
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray))
                        .title(image.as_str());
                    frame.render_widget(block, area);
                }
            }
        }
    }
}

/// Maps a box in command space onto terminal cells. Content hanging off the
/// top or left edge (a scene mid-slide) is clipped rather than clamped.
fn translate_rect(position: Vec2, size: Vec2, canvas: Vec2, area: Rect) -> Option<Rect> {
    if canvas.x <= 0.0 || canvas.y <= 0.0 {
        return None;
    }
    let far = position + size;
    if far.x <= 0.0 || far.y <= 0.0 {
        return None;
    }
    let near = position.max(Vec2::ZERO);

    let cells = Vec2::new(area.width as f32, area.height as f32);
    let start = (near / canvas * cells).floor();
    let extent = ((far - near) / canvas * cells).ceil();

    let x = (start.x as u16).min(area.width);
    let y = (start.y as u16).min(area.height);
    let width = (extent.x as u16).min(area.width - x);
    let height = (extent.y as u16).min(area.height - y);

    (width > 0 && height > 0).then(|| Rect::new(area.x + x, area.y + y, width, height))
}

fn to_terminal_color(color: Vec4) -> Color {
    if color.w < 0.1 {
        return Color::Reset;
    }
    let [r, g, b, _] = color.to_array().map(|channel| (channel.clamp(0.0, 1.0) * 255.0) as u8);
    Color::Rgb(r, g, b)
}
