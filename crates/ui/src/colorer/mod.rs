//! The colorer widget: a vector image whose shapes are filled with the color
//! selected from an accompanying palette.
//!
//! [`VectorImage`] and [`Palette`] are independent building blocks; [`Colorer`]
//! composes one of each and owns the selection state between them.

use gpui::{
    App, Context, Entity, EventEmitter, Hsla, InteractiveElement as _, IntoElement,
    ParentElement as _, Render, SharedString, Styled, Subscription, Window, div,
};
use serde::Deserialize;

use crate::color::serde_color;
use crate::v_flex;

mod document;
mod image;
mod palette;

pub use document::{Shape, ShapeKind, VectorDocument};
pub use image::{ImageConfig, ImageEvent, ShapeClickEvent, VectorImage};
pub use palette::{
    ColorSpec, GroupId, Palette, PaletteConfig, PaletteLayout, PaletteModel, Swatch, SwatchGroup,
    SwatchId,
};

/// Element name of the composed widget's wrapper.
pub const WRAPPER_CLASS: &str = "colorer_wrapper";
/// Name prefix of the composed widget's image elements.
pub const IMAGE_CLASS: &str = "colorer_image";
/// Name prefix of the composed widget's palette elements.
pub const PALETTE_CLASS: &str = "colorer_palette";
/// Marker name for the selected swatch, rendered as a highlight ring.
pub const SELECTED_CLASS: &str = "colorer_selected_color";

/// The erase color when none is configured: fully transparent white.
pub const DEFAULT_ERASER_COLOR: Hsla = Hsla {
    h: 0.,
    s: 0.,
    l: 1.,
    a: 0.,
};

/// The widget's selection record: which swatch is selected, and the color the
/// next shape click applies. Each widget instance owns its own copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    swatch: SwatchId,
    color: Option<Hsla>,
}

impl Selection {
    /// Select the palette's first swatch, taking its background as the active
    /// color. An empty palette selects nothing.
    fn initial(palette: &PaletteModel, eraser_color: Hsla) -> Option<Self> {
        palette
            .first()
            .map(|swatch| Self::from_swatch(swatch, eraser_color))
    }

    fn from_swatch(swatch: &Swatch, eraser_color: Hsla) -> Self {
        Self {
            swatch: swatch.id,
            color: if swatch.id.is_eraser() {
                Some(eraser_color)
            } else {
                swatch.color
            },
        }
    }

    pub fn swatch(&self) -> SwatchId {
        self.swatch
    }

    /// The active color. `None` for unstyled swatches: applying it reverts a
    /// shape to its document fill.
    pub fn color(&self) -> Option<Hsla> {
        self.color
    }
}

/// Configuration for [`Colorer`]. Field names deserialize from the camelCase
/// keys config-driven hosts use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorerConfig {
    /// Path to the SVG image. Required; without it no widget is produced.
    pub url: Option<SharedString>,
    /// Wrapper element id, overriding the default.
    pub id: Option<SharedString>,
    pub colors: Option<ColorSpec>,
    pub auto_colors: bool,
    pub group_by: Option<usize>,
    pub add_eraser: bool,
    /// What color the eraser applies. Default: fully transparent white.
    #[serde(deserialize_with = "serde_color::deserialize_opt")]
    pub eraser_color: Option<Hsla>,
    /// Initial fill for the image's shapes.
    #[serde(deserialize_with = "serde_color::deserialize_opt")]
    pub default_fill: Option<Hsla>,
}

impl ColorerConfig {
    pub fn url(mut self, url: impl Into<SharedString>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn id(mut self, id: impl Into<SharedString>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn colors(mut self, colors: impl Into<ColorSpec>) -> Self {
        self.colors = Some(colors.into());
        self
    }

    pub fn auto_colors(mut self, auto_colors: bool) -> Self {
        self.auto_colors = auto_colors;
        self
    }

    pub fn group_by(mut self, group_by: usize) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn add_eraser(mut self, add_eraser: bool) -> Self {
        self.add_eraser = add_eraser;
        self
    }

    pub fn eraser_color(mut self, color: Hsla) -> Self {
        self.eraser_color = Some(color);
        self
    }

    pub fn default_fill(mut self, fill: Hsla) -> Self {
        self.default_fill = Some(fill);
        self
    }

    /// Parse a configuration from loose JSON. Returns `None` when the value
    /// has an unrecognized shape.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorerEvent {
    /// The active color changed via swatch selection.
    ColorSelected {
        swatch: SwatchId,
        color: Option<Hsla>,
    },
    /// A shape received the active color.
    ShapeFilled { index: usize, color: Option<Hsla> },
}

/// An image and a palette wired together: swatch clicks move the selection,
/// shape clicks apply the selected color.
pub struct Colorer {
    id: Option<SharedString>,
    image: Entity<VectorImage>,
    palette: PaletteModel,
    selection: Option<Selection>,
    eraser_color: Hsla,
    _subscriptions: Vec<Subscription>,
}

impl EventEmitter<ColorerEvent> for Colorer {}

impl Colorer {
    /// Build the composed widget. Returns `None` when the image reference is
    /// absent.
    pub fn build(config: ColorerConfig, cx: &mut App) -> Option<Entity<Self>> {
        let url = config.url.clone()?;

        Some(cx.new(|cx| {
            let image_config = ImageConfig::default()
                .url(url)
                .used_class(IMAGE_CLASS);
            let image_config = match config.default_fill {
                Some(fill) => image_config.default_fill(fill),
                None => image_config,
            };
            let image = cx.new(|cx| VectorImage::new(image_config, cx));

            let palette = PaletteModel::resolve(&PaletteConfig {
                colors: config.colors.clone(),
                auto_colors: config.auto_colors,
                group_by: config.group_by,
                add_eraser: config.add_eraser,
                used_class: None,
                id: None,
            });

            // Resolved once; every eraser click reuses this value.
            let eraser_color = config.eraser_color.unwrap_or(DEFAULT_ERASER_COLOR);
            let selection = Selection::initial(&palette, eraser_color);

            let _subscriptions = vec![cx.subscribe(&image, Self::handle_image_event)];

            Self {
                id: config.id,
                image,
                palette,
                selection,
                eraser_color,
                _subscriptions,
            }
        }))
    }

    fn handle_image_event(
        &mut self,
        image: Entity<VectorImage>,
        event: &ImageEvent,
        cx: &mut Context<Self>,
    ) {
        match event {
            ImageEvent::ShapeClicked(clicked) => {
                let Some(selection) = &self.selection else {
                    return;
                };
                let color = selection.color();
                let index = clicked.index;
                image.update(cx, |image, cx| image.set_fill(index, color, cx));
                cx.emit(ColorerEvent::ShapeFilled { index, color });
            }
            ImageEvent::Loaded { .. } => cx.notify(),
        }
    }

    /// Move the selection to `swatch` and derive the new active color: the
    /// eraser selects the configured erase color, any other swatch its own
    /// background.
    pub fn select_swatch(&mut self, swatch: &Swatch, cx: &mut Context<Self>) {
        let selection = Selection::from_swatch(swatch, self.eraser_color);
        self.selection = Some(selection);
        cx.emit(ColorerEvent::ColorSelected {
            swatch: selection.swatch(),
            color: selection.color(),
        });
        cx.notify();
    }

    pub fn image(&self) -> &Entity<VectorImage> {
        &self.image
    }

    pub fn palette(&self) -> &PaletteModel {
        &self.palette
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_swatch(&self) -> Option<SwatchId> {
        self.selection.map(|selection| selection.swatch())
    }

    /// The color the next shape click applies.
    pub fn active_color(&self) -> Option<Hsla> {
        self.selection.and_then(|selection| selection.color())
    }

    pub fn eraser_color(&self) -> Hsla {
        self.eraser_color
    }
}

impl Render for Colorer {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let wrapper_id: SharedString = self.id.clone().unwrap_or_else(|| WRAPPER_CLASS.into());
        let on_click = cx.listener(|this, swatch: &Swatch, _, cx| this.select_swatch(swatch, cx));

        v_flex()
            .id(wrapper_id)
            .size_full()
            .gap_2()
            .child(div().w_full().flex_1().child(self.image.clone()))
            .child(
                Palette::new(self.palette.clone())
                    .used_class(PALETTE_CLASS)
                    .selected(self.selection.map(|selection| selection.swatch()))
                    .on_click(on_click),
            )
    }
}
