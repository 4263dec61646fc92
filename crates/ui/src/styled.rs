use gpui::{Div, Refineable as _, StyleRefinement, Styled, div};

/// Create a horizontal flex layout with center-aligned items.
pub fn h_flex() -> Div {
    div().h_flex()
}

/// Create a vertical flex layout.
pub fn v_flex() -> Div {
    div().v_flex()
}

/// Extends [`gpui::Styled`] with helpers shared by the widgets in this crate.
pub trait StyledExt: Styled + Sized {
    /// Horizontal flex, items centered on the cross axis.
    fn h_flex(self) -> Self {
        self.flex().flex_row().items_center()
    }

    /// Vertical flex.
    fn v_flex(self) -> Self {
        self.flex().flex_col()
    }

    /// Refine the element's style with a caller-provided refinement.
    fn refine_style(mut self, style: &StyleRefinement) -> Self {
        self.style().refine(style);
        self
    }
}

impl<E: Styled> StyledExt for E {}
