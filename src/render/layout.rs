//! Figure and panel geometry.
//!
//! A figure is split into a `rows × columns` grid of cells. Inside each cell the
//! margins leave room for tick labels and axis titles, and the map axes take the
//! largest box with the extent's plate carrée aspect ratio, centred in what is left.

use serde::{Deserialize, Serialize};

use crate::error::{GeoScatterError, Result};
use crate::geoutil::{AxesBox, Extent};

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Space around the axes box inside a panel cell, in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 64.0,
            right: 20.0,
            top: 20.0,
            bottom: 52.0,
        }
    }
}

/// Cells of a `rows × columns` grid over the page, row-major
pub fn grid_cells(width: f64, height: f64, rows: usize, columns: usize) -> Vec<AxesBox> {
    if rows == 0 || columns == 0 {
        return Vec::new();
    }
    let cell_w = width / columns as f64;
    let cell_h = height / rows as f64;
    (0..rows)
        .flat_map(|r| {
            (0..columns).map(move |c| AxesBox {
                x: c as f64 * cell_w,
                y: r as f64 * cell_h,
                width: cell_w,
                height: cell_h,
            })
        })
        .collect()
}

/// The map axes inside one cell
pub fn fit_axes(cell: &AxesBox, margins: &Margins, extent: &Extent) -> Result<AxesBox> {
    let avail_w = cell.width - margins.left - margins.right;
    let avail_h = cell.height - margins.top - margins.bottom;
    if avail_w <= 0.0 || avail_h <= 0.0 {
        return Err(GeoScatterError::InvalidParameter {
            param: "margins".to_string(),
            message: format!(
                "Margins leave no room for the map in a {:.1} x {:.1} pt panel",
                cell.width, cell.height
            ),
        });
    }

    let aspect = extent.aspect();
    let (width, height) = if avail_w / avail_h > aspect {
        (avail_h * aspect, avail_h)
    } else {
        (avail_w, avail_w / aspect)
    };

    Ok(AxesBox {
        x: cell.x + margins.left + (avail_w - width) / 2.0,
        y: cell.y + margins.top + (avail_h - height) / 2.0,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_cells() {
        let cells = grid_cells(300.0, 100.0, 1, 3);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[1].x, 100.0);
        assert_eq!(cells[2].width, 100.0);
        assert_eq!(cells[2].height, 100.0);

        let cells = grid_cells(200.0, 200.0, 2, 2);
        assert_eq!(cells[2].y, 100.0);
        assert_eq!(cells[3].x, 100.0);

        assert!(grid_cells(100.0, 100.0, 0, 2).is_empty());
    }

    #[test]
    fn test_fit_axes_keeps_aspect() {
        let extent = Extent::from([126.0, 162.0, 26.0, 50.0]);
        let cell = AxesBox {
            x: 0.0,
            y: 0.0,
            width: 720.0,
            height: 432.0,
        };
        let axes = fit_axes(&cell, &Margins::default(), &extent).unwrap();

        assert!((axes.width / axes.height - 1.5).abs() < 1e-9);
        // Height-limited: fills the vertical space between margins
        assert!((axes.height - (432.0 - 20.0 - 52.0)).abs() < 1e-9);
        assert!(axes.x >= 64.0);
        assert!(axes.right() <= 700.0 + 1e-9);
    }

    #[test]
    fn test_fit_axes_width_limited() {
        let extent = Extent::from([126.0, 162.0, 26.0, 50.0]);
        let cell = AxesBox {
            x: 100.0,
            y: 0.0,
            width: 200.0,
            height: 1000.0,
        };
        let margins = Margins {
            left: 10.0,
            right: 10.0,
            top: 10.0,
            bottom: 10.0,
        };
        let axes = fit_axes(&cell, &margins, &extent).unwrap();
        assert_eq!(axes.x, 110.0);
        assert_eq!(axes.width, 180.0);
        assert!((axes.height - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_axes_no_room() {
        let extent = Extent::from([0.0, 10.0, 0.0, 10.0]);
        let cell = AxesBox {
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
        };
        assert!(fit_axes(&cell, &Margins::default(), &extent).is_err());
    }
}
