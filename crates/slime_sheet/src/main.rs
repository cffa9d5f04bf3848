use image::GenericImageView;
use serde::Serialize;
use slime_core::sprite_sheet::{FrameRect, SheetLayout, SheetPlayer};
use std::fs;
use std::path::{Path, PathBuf};

const FRAME_INTERVAL_MS: u64 = 100;

#[derive(Debug, Serialize, PartialEq)]
struct FrameLine {
    time_ms: u64,
    frame: u32,
    rect: FrameRect,
}

struct SheetArgs {
    sheet: PathBuf,
    frame_w: u32,
    frame_h: u32,
    ticks: u32,
    extract_dir: Option<PathBuf>,
}

fn usage() -> String {
    "Usage: cargo run -p slime_sheet -- <sheet.png> [frame_w] [frame_h] [ticks] [--extract <dir>]\nExample: cargo run -p slime_sheet -- assets/blue_slime.png 32 32 24".to_string()
}

fn parse_args(args: &[String]) -> Result<SheetArgs, String> {
    let mut positional = Vec::new();
    let mut extract_dir = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--extract" {
            let dir = iter.next().ok_or_else(usage)?;
            extract_dir = Some(PathBuf::from(dir));
        } else {
            positional.push(arg.as_str());
        }
    }
    if positional.is_empty() || positional.len() > 4 {
        return Err(usage());
    }

    let number = |index: usize, name: &str, default: u32| -> Result<u32, String> {
        match positional.get(index) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| format!("Invalid {name} '{raw}': {e}")),
            None => Ok(default),
        }
    };
    Ok(SheetArgs {
        sheet: PathBuf::from(positional[0]),
        frame_w: number(1, "frame_w", 32)?,
        frame_h: number(2, "frame_h", 32)?,
        ticks: number(3, "ticks", 24)?,
        extract_dir,
    })
}

/// Play the sheet for `ticks` intervals, recording the frame shown after each.
fn play(layout: SheetLayout, ticks: u32) -> Vec<FrameLine> {
    let mut player = SheetPlayer::new(layout, FRAME_INTERVAL_MS);
    let mut lines = vec![FrameLine {
        time_ms: 0,
        frame: player.frame,
        rect: player.current_rect(),
    }];
    for i in 1..=u64::from(ticks) {
        player.tick(FRAME_INTERVAL_MS);
        lines.push(FrameLine {
            time_ms: i * FRAME_INTERVAL_MS,
            frame: player.frame,
            rect: player.current_rect(),
        });
    }
    lines
}

/// Crop every frame of the sheet into `<dir>/frame_NN.png`.
fn extract_frames(sheet: &Path, layout: SheetLayout, dir: &Path) -> Result<u32, String> {
    let image = image::open(sheet)
        .map_err(|e| format!("Failed to open '{}': {e}", sheet.display()))?;
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create output dir '{}': {e}", dir.display()))?;

    for frame in 0..layout.total_frames() {
        let rect = layout.source_rect(frame);
        let cell = image.view(rect.x, rect.y, rect.w, rect.h).to_image();
        let out = dir.join(format!("frame_{frame:02}.png"));
        cell.save_with_format(&out, image::ImageFormat::Png)
            .map_err(|e| format!("Failed to write '{}': {e}", out.display()))?;
    }
    Ok(layout.total_frames())
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let (width, height) = image::image_dimensions(&args.sheet)
        .map_err(|e| format!("Failed to read '{}': {e}", args.sheet.display()))?;
    let layout = SheetLayout::from_image_size(width, height, args.frame_w, args.frame_h)?;
    log::info!(
        "Sheet {} is {}x{}: {} x {} frames of {}x{}",
        args.sheet.display(),
        width,
        height,
        layout.per_row,
        layout.rows,
        layout.frame_w,
        layout.frame_h
    );

    for line in play(layout, args.ticks) {
        let json = serde_json::to_string(&line)
            .map_err(|e| format!("Failed to encode frame line: {e}"))?;
        println!("{json}");
    }

    if let Some(dir) = &args.extract_dir {
        let count = extract_frames(&args.sheet, layout, dir)?;
        log::info!("Extracted {count} frames to {}", dir.display());
    }
    Ok(())
}
