// src/bin/tableau-debug.rs
use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec4;
use std::fs;
use tracing::info;

use tableau::{build_demo, device_center};
use tableau_render::{RecordingRenderer, RenderCommand};
use tableau_runtime::{dump_tree, Session, SessionOptions};

#[derive(Parser)]
#[command(name = "tableau-debug")]
#[command(about = "Runs the demo headless and prints the node tree and draw commands")]
struct Args {
    /// Output format (tree, commands, both)
    #[arg(long, default_value = "tree")]
    format: String,

    /// Save output to file instead of stdout
    #[arg(long)]
    output: Option<String>,

    /// Show node positions and sizes
    #[arg(long)]
    show_layout: bool,

    /// Frames to run before and after every scripted tap
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Milliseconds per simulated frame
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Tap the named node in the current scene; repeatable, applied in order
    #[arg(long = "tap")]
    taps: Vec<String>,

    /// Design canvas width
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Design canvas height
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug)?;

    let options = SessionOptions {
        canvas_width: args.width,
        canvas_height: args.height,
        ..SessionOptions::default()
    };
    let mut session = Session::new(RecordingRenderer::new(options.canvas_size()), options);
    let log = build_demo(&mut session).context("Failed to build demo scenes")?;

    let mut now = 0.0;
    run_frames(&mut session, args.frames, args.frame_ms, &mut now)?;
    for name in &args.taps {
        let point = device_center(&session, name)
            .with_context(|| format!("No node named '{}' in the current scene", name))?;
        let delivered = session.handle_tap(point).context("Failed to deliver tap")?;
        info!("Tap on '{}' at {:?} delivered: {}", name, point, delivered);
        run_frames(&mut session, args.frames, args.frame_ms, &mut now)?;
    }

    let mut output_text = String::new();
    let scene = session.current_scene().context("No scene is current")?;
    output_text.push_str(&format!(
        "Scene '{}' after {} frame(s), {:.0}ms\n",
        session.tree().get(scene)?.name(),
        session.frame_count(),
        now
    ));
    for choice in log.choices() {
        output_text.push_str(&format!("Choice: {} -> {}\n", choice.trial, choice.card));
    }
    output_text.push('\n');

    match args.format.as_str() {
        "tree" => output_text.push_str(&dump_tree(session.tree(), scene, args.show_layout)),
        "commands" => output_text.push_str(&generate_command_output(&session)),
        "both" => {
            output_text.push_str(&dump_tree(session.tree(), scene, args.show_layout));
            output_text.push('\n');
            output_text.push_str(&generate_command_output(&session));
        }
        _ => anyhow::bail!("Unknown format: {}. Use 'tree', 'commands', or 'both'", args.format),
    }

    // Output to file or stdout
    if let Some(output_file) = args.output {
        fs::write(&output_file, output_text).with_context(|| format!("Failed to write to file: {}", output_file))?;
        println!("Output written to: {}", output_file);
    } else {
        print!("{}", output_text);
    }

    Ok(())
}

fn run_frames(session: &mut Session<RecordingRenderer>, frames: u32, frame_ms: f64, now: &mut f64) -> Result<()> {
    for _ in 0..frames {
        session.tick(*now)?;
        *now += frame_ms;
    }
    Ok(())
}

fn generate_command_output(session: &Session<RecordingRenderer>) -> String {
    let Some(commands) = session.renderer().backend().last_frame() else {
        return "No frame drawn\n".to_string();
    };
    let mut output = format!("Draw commands ({}):\n", commands.len());
    for command in commands {
        output.push_str("  ");
        output.push_str(&describe_command(command));
        output.push('\n');
    }
    output
}

fn describe_command(command: &RenderCommand) -> String {
    let (kind, detail) = match command {
        RenderCommand::SetCanvasSize(size) => ("Canvas", format!("{:.0}x{:.0}", size.x, size.y)),
        RenderCommand::Clear { color } => ("Clear", hex(*color)),
        RenderCommand::DrawRect {
            color, stroke_color, ..
        } => match stroke_color {
            Some(stroke) => ("Rect", format!("{} stroke:{}", hex(*color), hex(*stroke))),
            None => ("Rect", hex(*color)),
        },
        RenderCommand::DrawCircle { color, .. } => ("Circle", hex(*color)),
        RenderCommand::DrawText { text, font_size, .. } => ("Text", format!("{:.0}px \"{}\"", font_size, text)),
        RenderCommand::DrawImage { image, .. } => ("Image", format!("<{}>", image)),
    };
    match command.bounds() {
        Some(rect) => format!(
            "{:<6} [{:.0},{:.0} {:.0}x{:.0}] {}",
            kind,
            rect.min.x,
            rect.min.y,
            rect.size().x,
            rect.size().y,
            detail
        ),
        None => format!("{:<6} {}", kind, detail),
    }
}

fn hex(color: Vec4) -> String {
    let [r, g, b, a] = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
}

fn init_logging(debug: bool) -> Result<()> {
    let level = if debug { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}
