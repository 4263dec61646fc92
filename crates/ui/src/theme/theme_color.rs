use gpui::Hsla;
use serde::{Deserialize, Serialize};

use crate::color::hsl;

/// The color set used by the widgets in this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThemeColor {
    pub background: Hsla,
    pub foreground: Hsla,
    pub card: Hsla,
    pub card_foreground: Hsla,
    pub border: Hsla,
    pub muted: Hsla,
    pub muted_foreground: Hsla,
    pub primary: Hsla,
    pub primary_foreground: Hsla,
    pub secondary: Hsla,
    pub secondary_foreground: Hsla,
    pub ring: Hsla,
}

impl ThemeColor {
    pub fn light() -> Self {
        Self {
            background: hsl(0., 0., 100.),
            foreground: hsl(240., 10., 3.9),
            card: hsl(0., 0., 100.),
            card_foreground: hsl(240., 10., 3.9),
            border: hsl(240., 5.9, 90.),
            muted: hsl(240., 4.8, 95.9),
            muted_foreground: hsl(240., 3.8, 46.1),
            primary: hsl(240., 5.9, 10.),
            primary_foreground: hsl(0., 0., 98.),
            secondary: hsl(240., 4.8, 95.9),
            secondary_foreground: hsl(240., 5.9, 10.),
            ring: hsl(240., 5.9, 10.),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: hsl(240., 10., 3.9),
            foreground: hsl(0., 0., 98.),
            card: hsl(240., 10., 3.9),
            card_foreground: hsl(0., 0., 98.),
            border: hsl(240., 3.7, 15.9),
            muted: hsl(240., 3.7, 15.9),
            muted_foreground: hsl(240., 5., 64.9),
            primary: hsl(0., 0., 98.),
            primary_foreground: hsl(240., 5.9, 10.),
            secondary: hsl(240., 3.7, 15.9),
            secondary_foreground: hsl(0., 0., 98.),
            ring: hsl(240., 4.9, 83.9),
        }
    }
}
