//! An interactive SVG coloring widget for GPUI applications.
//!
//! Three composable pieces:
//!
//! - [`VectorImage`]: loads an SVG by reference and makes its drawable shapes
//!   (polygons, paths, circles, rects) clickable.
//! - [`Palette`]: a row or grid of selectable color swatches, with optional
//!   auto-generated hues, grouping, and an eraser.
//! - [`Colorer`]: composes the two, tracking the selected swatch and applying
//!   the active color to clicked shapes.
//!
//! Call [`init`] once before using any widget:
//!
//! ```ignore
//! use gpui_colorer::{Colorer, ColorerConfig};
//!
//! gpui_colorer::init(cx);
//! let colorer = Colorer::build(
//!     ColorerConfig::default().url("drawings/flower.svg").add_eraser(true),
//!     cx,
//! );
//! ```

use gpui::App;

mod color;
mod colorer;
mod styled;
mod theme;

pub use color::{hsl, parse_color};
pub use colorer::*;
pub use styled::{StyledExt, h_flex, v_flex};
pub use theme::{ActiveTheme, Theme, ThemeColor, ThemeMode};

/// Initialize the crate's global state (the theme). This must be called
/// before rendering any of the widgets.
pub fn init(cx: &mut App) {
    theme::init(cx);
}
