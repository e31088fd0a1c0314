//! Captured terminal frames and their rasterization.

use std::collections::HashMap;
use std::fmt;

use image::{Rgb, RgbImage};
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};

use super::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::ExportError;

/// Pixels per terminal cell, horizontally.
pub const CELL_WIDTH: u32 = 12;
/// Pixels per terminal cell, vertically.
pub const CELL_HEIGHT: u32 = 16;

const GLYPH_SCALE: u32 = 2;
const GLYPH_OFFSET_X: u32 = (CELL_WIDTH - GLYPH_WIDTH * GLYPH_SCALE) / 2;
const GLYPH_OFFSET_Y: u32 = (CELL_HEIGHT - GLYPH_HEIGHT * GLYPH_SCALE) / 2;

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Name of a region registered while a frame was drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionHandle(String);

impl RegionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named areas of a frame, filled in by the widgets that draw them.
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    regions: HashMap<RegionHandle, Rect>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handle: RegionHandle, area: Rect) {
        self.regions.insert(handle, area);
    }

    pub fn get(&self, handle: &RegionHandle) -> Option<Rect> {
        self.regions.get(handle).copied()
    }
}

/// Source of the image that ends up in a report.
pub trait Rasterize {
    /// Render the region named by `handle` into an RGB image.
    ///
    /// Returns [`ExportError::TargetMissing`] when the region cannot be found.
    fn rasterize(&self, handle: &RegionHandle) -> Result<RgbImage, ExportError>;
}

/// A snapshot of a drawn frame together with its named regions.
#[derive(Debug, Clone)]
pub struct Canvas {
    buffer: Buffer,
    regions: RegionMap,
}

impl Canvas {
    pub fn capture(buffer: &Buffer, regions: RegionMap) -> Self {
        Self {
            buffer: buffer.clone(),
            regions,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The on-screen area of `handle`, clipped to the frame.
    ///
    /// Regions that are unknown or fall entirely outside the frame do not
    /// resolve.
    pub fn resolve(&self, handle: &RegionHandle) -> Option<Rect> {
        let area = self.regions.get(handle)?.intersection(self.buffer.area);
        (!area.is_empty()).then_some(area)
    }
}

impl Rasterize for Canvas {
    fn rasterize(&self, handle: &RegionHandle) -> Result<RgbImage, ExportError> {
        let area = self
            .resolve(handle)
            .ok_or_else(|| ExportError::TargetMissing(handle.clone()))?;

        let mut image = RgbImage::new(
            u32::from(area.width) * CELL_WIDTH,
            u32::from(area.height) * CELL_HEIGHT,
        );

        for row in 0..area.height {
            for col in 0..area.width {
                if let Some(cell) = self.buffer.cell((area.x + col, area.y + row)) {
                    paint_cell(
                        &mut image,
                        u32::from(col) * CELL_WIDTH,
                        u32::from(row) * CELL_HEIGHT,
                        cell,
                    );
                }
            }
        }

        Ok(image)
    }
}

fn paint_cell(image: &mut RgbImage, left: u32, top: u32, cell: &Cell) {
    let (mut fg, mut bg) = (foreground(cell.fg), background(cell.bg));
    if cell.modifier.contains(Modifier::REVERSED) {
        std::mem::swap(&mut fg, &mut bg);
    }

    for y in 0..CELL_HEIGHT {
        for x in 0..CELL_WIDTH {
            image.put_pixel(left + x, top + y, bg);
        }
    }

    let Some(c) = cell.symbol().chars().next() else {
        return;
    };
    if c == ' ' {
        return;
    }

    let glyph = font::glyph_or_box(c);
    for row in 0..GLYPH_HEIGHT {
        for col in 0..GLYPH_WIDTH {
            if !font::is_set(glyph, col, row) {
                continue;
            }
            let x = left + GLYPH_OFFSET_X + col * GLYPH_SCALE;
            let y = top + GLYPH_OFFSET_Y + row * GLYPH_SCALE;
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    image.put_pixel(x + dx, y + dy, fg);
                }
            }
        }
    }
}

/// Text colors tuned for a white page.
fn foreground(color: Color) -> Rgb<u8> {
    match color {
        Color::Reset | Color::White | Color::Black => INK,
        other => palette(other),
    }
}

fn background(color: Color) -> Rgb<u8> {
    match color {
        Color::Reset => PAPER,
        other => palette(other),
    }
}

fn palette(color: Color) -> Rgb<u8> {
    let [r, g, b] = match color {
        Color::Reset | Color::White => [255, 255, 255],
        Color::Black => [0, 0, 0],
        Color::Red => [192, 32, 32],
        Color::Green => [16, 128, 48],
        Color::Yellow => [176, 128, 0],
        Color::Blue => [32, 96, 192],
        Color::Magenta => [160, 48, 160],
        Color::Cyan => [0, 128, 144],
        Color::Gray => [64, 64, 64],
        Color::DarkGray => [112, 112, 112],
        Color::LightRed => [224, 80, 80],
        Color::LightGreen => [64, 176, 80],
        Color::LightYellow => [208, 176, 32],
        Color::LightBlue => [80, 144, 224],
        Color::LightMagenta => [208, 96, 208],
        Color::LightCyan => [48, 176, 192],
        Color::Rgb(r, g, b) => [r, g, b],
        Color::Indexed(index) => indexed(index),
    };
    Rgb([r, g, b])
}

/// xterm 256-color table.
fn indexed(index: u8) -> [u8; 3] {
    const BASIC: [Color; 16] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::Gray,
        Color::DarkGray,
        Color::LightRed,
        Color::LightGreen,
        Color::LightYellow,
        Color::LightBlue,
        Color::LightMagenta,
        Color::LightCyan,
        Color::White,
    ];

    match index {
        0..=15 => palette(BASIC[usize::from(index)]).0,
        16..=231 => {
            let cube = index - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            [level(cube / 36), level((cube / 6) % 6), level(cube % 6)]
        }
        _ => {
            let gray = 8 + (index - 232) * 10;
            [gray, gray, gray]
        }
    }
}
