//! Maps the aim play area onto terminal cells.
//!
//! Sessions think in pixels; a cell is treated as `CELL_WIDTH_PX` x
//! `CELL_HEIGHT_PX`. Rendering and mouse hit-testing both go through
//! [`cell_center`] so a painted cell is always a clickable cell.

use quickbench::aim::{PlayArea, Target, TargetSize};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub fn play_area(field: Rect) -> PlayArea {
    PlayArea::new(
        field.width as f64 * CELL_WIDTH_PX,
        field.height as f64 * CELL_HEIGHT_PX,
    )
}

pub fn target_diameter(term_cols: u16) -> f64 {
    TargetSize::for_viewport(term_cols as f64 * CELL_WIDTH_PX).diameter()
}

/// Pixel center of an absolute cell, relative to the field origin
fn cell_center(field: Rect, col: u16, row: u16) -> (f64, f64) {
    (
        (col - field.x) as f64 * CELL_WIDTH_PX + CELL_WIDTH_PX / 2.0,
        (row - field.y) as f64 * CELL_HEIGHT_PX + CELL_HEIGHT_PX / 2.0,
    )
}

/// Pixel point for a terminal cell, or None when the cell is outside the field
pub fn cell_to_point(field: Rect, col: u16, row: u16) -> Option<(f64, f64)> {
    let inside = col >= field.left()
        && col < field.right()
        && row >= field.top()
        && row < field.bottom();
    inside.then(|| cell_center(field, col, row))
}

/// Concentric target rings
pub struct TargetWidget<'a> {
    pub target: &'a Target,
}

impl Widget for TargetWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let t = self.target;
        let radius = t.diameter / 2.0;
        if radius <= 0.0 {
            return;
        }

        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                let (x, y) = cell_center(area, col, row);
                if !t.contains(x, y) {
                    continue;
                }
                let dist = ((x - t.x).powi(2) + (y - t.y).powi(2)).sqrt() / radius;
                let color = match dist {
                    d if d <= 0.2 => Color::Red,
                    d if d <= 0.6 => Color::White,
                    _ => Color::Red,
                };
                buf[(col, row)].set_char(' ').set_bg(color);
            }
        }
    }
}
