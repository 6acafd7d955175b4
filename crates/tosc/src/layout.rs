//! Layout helpers that derive child frames from a parent frame.
//!
//! Frames written here are relative to the parent, like every frame in the
//! format. [`arrange_grid`] divides the parent width by the row count and the
//! height by the column count, matching how the authoring tool has always
//! laid out its grids.

use log::debug;

use crate::error::LayoutError;
use crate::model::{Color, Control, ControlType, Frame};

/// Assigns grid cell frames to the children of `parent` in row-major order.
///
/// Cell `n` sits at row `n / columns`, column `n % columns`. With `zero_pad`
/// unset the child count must equal `rows * columns`; with it set, cells past
/// the last child stay empty and children past the last cell are untouched.
pub fn arrange_grid(
    parent: &mut Control,
    rows: usize,
    columns: usize,
    zero_pad: bool,
) -> Result<(), LayoutError> {
    if rows == 0 || columns == 0 {
        return Err(LayoutError::EmptyGrid);
    }
    let frame = parent
        .frame()
        .ok_or(LayoutError::MissingFrame { id: parent.id() })?;

    let cells = rows * columns;
    let count = parent.children().len();
    if !zero_pad && count != cells {
        return Err(LayoutError::ChildCountMismatch {
            expected: cells,
            actual: count,
        });
    }

    let cell_w = frame.w / rows as f64;
    let cell_h = frame.h / columns as f64;
    debug!("arranging {count} children in {rows}x{columns} cells of {cell_w}x{cell_h}");

    for (n, child) in parent.children_mut().take(cells).enumerate() {
        let (row, col) = (n / columns, n % columns);
        child.set_frame(Frame::new(
            col as f64 * cell_w,
            row as f64 * cell_h,
            cell_w,
            cell_h,
        ));
    }
    Ok(())
}

/// Builds a GROUP sized to `frame` holding one GROUP per ratio, stacked
/// top to bottom. Children are named `group1`, `group2`, ...
pub fn layout_column(ratios: &[f64], frame: Frame) -> Result<Control, LayoutError> {
    let heights = split(ratios, frame.h)?;
    Ok(stack(frame, heights.iter().scan(0.0, |y, &h| {
        let child = Frame::new(frame.x, *y, frame.w, h);
        *y += h;
        Some(child)
    })))
}

/// Horizontal counterpart of [`layout_column`]: children side by side, left
/// to right.
pub fn layout_row(ratios: &[f64], frame: Frame) -> Result<Control, LayoutError> {
    let widths = split(ratios, frame.w)?;
    Ok(stack(frame, widths.iter().scan(0.0, |x, &w| {
        let child = Frame::new(*x, frame.y, w, frame.h);
        *x += w;
        Some(child)
    })))
}

/// Colors the children of `parent` along a linear gradient from `from` to `to`.
pub fn apply_gradient(parent: &mut Control, from: Color, to: Color) {
    let count = parent.children().len();
    let steps = count.saturating_sub(1).max(1) as f64;
    for (i, child) in parent.children_mut().enumerate() {
        let t = i as f64 / steps;
        let mix = |a: f64, b: f64| a + (b - a) * t;
        child.set_color(Color::new(
            mix(from.r, to.r),
            mix(from.g, to.g),
            mix(from.b, to.b),
            mix(from.a, to.a),
        ));
    }
}

/// Splits `total` proportionally to `ratios`.
fn split(ratios: &[f64], total: f64) -> Result<Vec<f64>, LayoutError> {
    if ratios.is_empty() || ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
        return Err(LayoutError::InvalidRatios);
    }
    let sum: f64 = ratios.iter().sum();
    if sum <= 0.0 {
        return Err(LayoutError::InvalidRatios);
    }
    Ok(ratios.iter().map(|r| total * r / sum).collect())
}

fn stack(frame: Frame, frames: impl Iterator<Item = Frame>) -> Control {
    let mut parent = Control::new(ControlType::Group);
    parent.set_frame(frame);
    for (i, child_frame) in frames.enumerate() {
        let mut group = Control::new(ControlType::Group);
        group.set_name(format!("group{}", i + 1)).set_frame(child_frame);
        parent.children.push(group);
    }
    parent
}
