use std::rc::Rc;

use gpui::{
    App, Div, Hsla, InteractiveElement as _, IntoElement, ParentElement, RenderOnce, SharedString,
    Stateful, StatefulInteractiveElement as _, StyleRefinement, Styled, Window, div, hsla,
    prelude::FluentBuilder as _,
};
use serde::{Deserialize, Deserializer, de};

use crate::color::parse_color;
use crate::theme::{ActiveTheme as _, Theme};
use crate::{StyledExt as _, h_flex};

/// The palette shown when no colors are configured: red, yellow, green,
/// cyan, blue, magenta.
const DEFAULT_PALETTE: [&str; 6] = ["#f00", "#ff0", "#0f0", "#0ff", "#00f", "#f0f"];

/// How the palette's colors are specified: a fixed count of swatches, or an
/// explicit ordered list.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Count(usize),
    List(Vec<Hsla>),
}

impl From<usize> for ColorSpec {
    fn from(count: usize) -> Self {
        Self::Count(count)
    }
}

impl From<Vec<Hsla>> for ColorSpec {
    fn from(colors: Vec<Hsla>) -> Self {
        Self::List(colors)
    }
}

impl<'de> Deserialize<'de> for ColorSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(usize),
            List(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(count) => Ok(Self::Count(count)),
            Raw::List(values) => values
                .iter()
                .map(|value| {
                    parse_color(value)
                        .ok_or_else(|| de::Error::custom(format!("invalid color: {:?}", value)))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
        }
    }
}

/// The tagged identity of a swatch. The eraser is distinguished here, at
/// construction time, rather than re-derived from rendered names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwatchId {
    /// A regular color swatch, 1-indexed.
    Color(usize),
    Eraser,
}

impl SwatchId {
    pub fn is_eraser(&self) -> bool {
        matches!(self, Self::Eraser)
    }

    /// The element name of this swatch: `<used_class>_colorN`, or
    /// `<used_class>_color_eraser`.
    pub fn element_name(&self, used_class: &str) -> SharedString {
        match self {
            Self::Color(n) => format!("{used_class}_color{n}").into(),
            Self::Eraser => format!("{used_class}_color_eraser").into(),
        }
    }
}

/// One selectable swatch: its identity and its assigned color, if any.
/// Unstyled swatches (`color: None`) are left to the host to decorate.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub id: SwatchId,
    pub color: Option<Hsla>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupId {
    /// A regular swatch group, 1-indexed.
    Index(usize),
    Eraser,
}

impl GroupId {
    /// The element name of this group: `<used_class>_groupN`, or
    /// `<used_class>_group_eraser`.
    pub fn element_name(&self, used_class: &str) -> SharedString {
        match self {
            Self::Index(n) => format!("{used_class}_group{n}").into(),
            Self::Eraser => format!("{used_class}_group_eraser").into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwatchGroup {
    pub id: GroupId,
    pub swatches: Vec<Swatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaletteLayout {
    Flat(Vec<Swatch>),
    Grouped(Vec<SwatchGroup>),
}

/// Configuration for [`Palette`]. Field names deserialize from the camelCase
/// keys config-driven hosts use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaletteConfig {
    pub colors: Option<ColorSpec>,
    pub auto_colors: bool,
    pub group_by: Option<usize>,
    pub add_eraser: bool,
    pub used_class: Option<SharedString>,
    pub id: Option<SharedString>,
}

impl PaletteConfig {
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

    pub fn used_class(mut self, used_class: impl Into<SharedString>) -> Self {
        self.used_class = Some(used_class.into());
        self
    }

    pub fn id(mut self, id: impl Into<SharedString>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Parse a configuration from loose JSON. Returns `None` when the value
    /// has an unrecognized shape (for example, `colors` that is neither a
    /// number nor an array of colors).
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// The resolved palette: an ordered swatch list plus the grouping rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteModel {
    swatches: Vec<Swatch>,
    group_by: Option<usize>,
}

impl PaletteModel {
    /// Resolve a configuration into concrete swatch descriptors.
    pub fn resolve(config: &PaletteConfig) -> Self {
        let colors: Vec<Option<Hsla>> = match &config.colors {
            None => DEFAULT_PALETTE
                .iter()
                .map(|value| parse_color(value))
                .collect(),
            Some(ColorSpec::Count(count)) if config.auto_colors => hue_wheel(*count)
                .into_iter()
                .take(*count)
                .map(|angle| Some(hsla((angle / 360.) as f32, 0.9, 0.5, 1.)))
                .collect(),
            Some(ColorSpec::Count(count)) => vec![None; *count],
            Some(ColorSpec::List(list)) => list.iter().map(|color| Some(*color)).collect(),
        };

        let mut swatches: Vec<Swatch> = colors
            .into_iter()
            .enumerate()
            .map(|(index, color)| Swatch {
                id: SwatchId::Color(index + 1),
                color,
            })
            .collect();

        if config.add_eraser {
            swatches.push(Swatch {
                id: SwatchId::Eraser,
                color: config.auto_colors.then(|| hsla(0., 0., 1., 1.)),
            });
        }

        Self {
            swatches,
            group_by: config.group_by.filter(|size| *size > 0),
        }
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn first(&self) -> Option<&Swatch> {
        self.swatches.first()
    }

    /// Partition the swatches for display. With grouping active the eraser
    /// always forms its own trailing group, whatever the group size.
    pub fn layout(&self) -> PaletteLayout {
        let Some(size) = self.group_by else {
            return PaletteLayout::Flat(self.swatches.clone());
        };

        let (colors, erasers): (Vec<_>, Vec<_>) = self
            .swatches
            .iter()
            .cloned()
            .partition(|swatch| !swatch.id.is_eraser());

        let mut groups: Vec<SwatchGroup> = colors
            .chunks(size)
            .enumerate()
            .map(|(index, chunk)| SwatchGroup {
                id: GroupId::Index(index + 1),
                swatches: chunk.to_vec(),
            })
            .collect();
        for eraser in erasers {
            groups.push(SwatchGroup {
                id: GroupId::Eraser,
                swatches: vec![eraser],
            });
        }
        PaletteLayout::Grouped(groups)
    }
}

/// The candidate hues for an auto-colored palette of `count` swatches:
/// angles from 0 stepping by `360 / count`, up to and including 360 under
/// f64 accumulation. Only the first `count` candidates become swatches, but
/// the full sequence is part of the palette's observable behavior.
pub(crate) fn hue_wheel(count: usize) -> Vec<f64> {
    let step = 360. / count as f64;
    let mut angles = Vec::new();
    let mut angle = 0.;
    while angle <= 360. {
        angles.push(angle);
        angle += step;
    }
    angles
}

pub(crate) type OnSwatchClick = dyn Fn(&Swatch, &mut Window, &mut App);

/// A row (or grid of groups) of selectable color swatches.
#[derive(IntoElement)]
pub struct Palette {
    model: PaletteModel,
    used_class: SharedString,
    id: Option<SharedString>,
    selected: Option<SwatchId>,
    style: StyleRefinement,
    on_click: Option<Rc<OnSwatchClick>>,
}

impl Palette {
    /// Build a palette element from a configuration.
    pub fn build(config: &PaletteConfig) -> Self {
        let mut this = Self::new(PaletteModel::resolve(config));
        if let Some(used_class) = &config.used_class {
            this.used_class = used_class.clone();
        }
        this.id = config.id.clone();
        this
    }

    /// Create a palette element from an already-resolved model.
    pub fn new(model: PaletteModel) -> Self {
        Self {
            model,
            used_class: SharedString::default(),
            id: None,
            selected: None,
            style: StyleRefinement::default(),
            on_click: None,
        }
    }

    /// Set the name prefix used for the palette's element ids.
    pub fn used_class(mut self, used_class: impl Into<SharedString>) -> Self {
        self.used_class = used_class.into();
        self
    }

    /// Set the container element id, overriding the `used_class` default.
    pub fn id(mut self, id: impl Into<SharedString>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mark one swatch as the current selection.
    pub fn selected(mut self, selected: impl Into<Option<SwatchId>>) -> Self {
        self.selected = selected.into();
        self
    }

    /// Add a handler invoked when any swatch (the eraser included) is
    /// clicked.
    pub fn on_click(mut self, handler: impl Fn(&Swatch, &mut Window, &mut App) + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }
}

impl Styled for Palette {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for Palette {
    fn render(self, _: &mut Window, cx: &mut App) -> impl IntoElement {
        let used_class = self.used_class;
        let container_id = self.id.unwrap_or_else(|| used_class.clone());
        let selected = self.selected;
        let on_click = self.on_click;
        let theme = cx.theme().clone();

        let base = div().id(container_id).refine_style(&self.style);

        match self.model.layout() {
            PaletteLayout::Flat(swatches) => {
                base.h_flex().flex_wrap().gap_1().children(swatches.iter().map(|swatch| {
                    render_swatch(
                        swatch,
                        selected == Some(swatch.id),
                        &used_class,
                        on_click.clone(),
                        &theme,
                    )
                }))
            }
            PaletteLayout::Grouped(groups) => {
                base.v_flex().gap_1().children(groups.iter().map(|group| {
                    h_flex()
                        .id(group.id.element_name(&used_class))
                        .gap_1()
                        .children(group.swatches.iter().map(|swatch| {
                            render_swatch(
                                swatch,
                                selected == Some(swatch.id),
                                &used_class,
                                on_click.clone(),
                                &theme,
                            )
                        }))
                }))
            }
        }
    }
}

fn render_swatch(
    swatch: &Swatch,
    selected: bool,
    used_class: &str,
    on_click: Option<Rc<OnSwatchClick>>,
    theme: &Theme,
) -> Stateful<Div> {
    div()
        .id(swatch.id.element_name(used_class))
        .size_6()
        .flex_shrink_0()
        .rounded(theme.radius)
        .border_1()
        .border_color(theme.border)
        .cursor_pointer()
        .when_some(swatch.color, |this, color| this.bg(color))
        .when(selected, |this| this.border_2().border_color(theme.ring))
        .when_some(on_click, |this, on_click| {
            let swatch = swatch.clone();
            this.on_click(move |_, window, cx| on_click(&swatch, window, cx))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_default_palette() {
        let model = PaletteModel::resolve(&PaletteConfig::default());
        assert_eq!(model.swatches().len(), 6);
        let expected = ["#f00", "#ff0", "#0f0", "#0ff", "#00f", "#f0f"];
        for (index, swatch) in model.swatches().iter().enumerate() {
            assert_eq!(swatch.id, SwatchId::Color(index + 1));
            assert_eq!(swatch.color, parse_color(expected[index]));
        }
    }

    #[test]
    fn test_count_without_auto_colors_is_unstyled() {
        let model = PaletteModel::resolve(&PaletteConfig::default().colors(6));
        assert_eq!(model.swatches().len(), 6);
        assert!(model.swatches().iter().all(|swatch| swatch.color.is_none()));
    }

    #[test]
    fn test_count_with_auto_colors() {
        let model = PaletteModel::resolve(&PaletteConfig::default().colors(6).auto_colors(true));
        assert_eq!(model.swatches().len(), 6);
        for (index, swatch) in model.swatches().iter().enumerate() {
            let color = swatch.color.unwrap();
            assert!(approx_eq(color.h, index as f32 * 60. / 360.));
            assert!(approx_eq(color.s, 0.9));
            assert!(approx_eq(color.l, 0.5));
        }
        // All six hues are distinct.
        let hues: Vec<_> = model
            .swatches()
            .iter()
            .map(|s| s.color.unwrap().h.to_bits())
            .collect();
        let mut deduped = hues.clone();
        deduped.dedup();
        assert_eq!(hues, deduped);
    }

    #[test]
    fn test_hue_wheel_inclusive_endpoint() {
        // 360/6 steps exactly: the inclusive endpoint appears as a 7th
        // candidate, and only the first 6 are consumed.
        let angles = hue_wheel(6);
        assert_eq!(angles, vec![0., 60., 120., 180., 240., 300., 360.]);

        let angles = hue_wheel(3);
        assert_eq!(angles, vec![0., 120., 240., 360.]);

        // 360/7 does not accumulate back to 360 exactly; the endpoint drops.
        let angles = hue_wheel(7);
        assert_eq!(angles.len(), 7);
        assert!(angles[6] < 360.);

        // Degenerate count keeps the single zero-angle candidate.
        assert_eq!(hue_wheel(0), vec![0.]);
    }

    #[test]
    fn test_explicit_color_list() {
        let colors = vec![parse_color("#f00").unwrap(), parse_color("#0f0").unwrap()];
        let model = PaletteModel::resolve(&PaletteConfig::default().colors(colors.clone()));
        assert_eq!(model.swatches().len(), 2);
        assert_eq!(model.swatches()[0].color, Some(colors[0]));
        assert_eq!(model.swatches()[1].color, Some(colors[1]));
    }

    #[test]
    fn test_grouping_by_one() {
        let colors = vec![parse_color("#f00").unwrap(), parse_color("#0f0").unwrap()];
        let model = PaletteModel::resolve(&PaletteConfig::default().colors(colors).group_by(1));

        let PaletteLayout::Grouped(groups) = model.layout() else {
            panic!("expected grouped layout");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, GroupId::Index(1));
        assert_eq!(groups[0].swatches.len(), 1);
        assert_eq!(groups[0].swatches[0].color, parse_color("#f00"));
        assert_eq!(groups[1].swatches[0].color, parse_color("#0f0"));
    }

    #[test]
    fn test_eraser_gets_its_own_group() {
        let model = PaletteModel::resolve(
            &PaletteConfig::default()
                .colors(3)
                .add_eraser(true)
                .group_by(2),
        );

        let PaletteLayout::Grouped(groups) = model.layout() else {
            panic!("expected grouped layout");
        };
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].id, GroupId::Index(1));
        assert_eq!(
            groups[0].swatches.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![SwatchId::Color(1), SwatchId::Color(2)]
        );
        assert_eq!(
            groups[1].swatches.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![SwatchId::Color(3)]
        );
        assert_eq!(groups[2].id, GroupId::Eraser);
        assert_eq!(groups[2].swatches[0].id, SwatchId::Eraser);
    }

    #[test]
    fn test_zero_group_size_disables_grouping() {
        let model = PaletteModel::resolve(&PaletteConfig::default().colors(3).group_by(0));
        assert!(matches!(model.layout(), PaletteLayout::Flat(_)));
    }

    #[test]
    fn test_eraser_background() {
        // Auto-color mode paints the eraser swatch white.
        let model = PaletteModel::resolve(
            &PaletteConfig::default()
                .colors(3)
                .auto_colors(true)
                .add_eraser(true),
        );
        let eraser = model.swatches().last().unwrap();
        assert!(eraser.id.is_eraser());
        assert_eq!(eraser.color, Some(hsla(0., 0., 1., 1.)));

        // Without auto colors it stays unstyled.
        let model = PaletteModel::resolve(&PaletteConfig::default().colors(3).add_eraser(true));
        assert_eq!(model.swatches().last().unwrap().color, None);
    }

    #[test]
    fn test_element_names() {
        assert_eq!(
            SwatchId::Color(1).element_name("colorer_palette").as_ref(),
            "colorer_palette_color1"
        );
        assert_eq!(
            SwatchId::Eraser.element_name("colorer_palette").as_ref(),
            "colorer_palette_color_eraser"
        );
        assert_eq!(GroupId::Index(2).element_name("p").as_ref(), "p_group2");
        assert_eq!(GroupId::Eraser.element_name("p").as_ref(), "p_group_eraser");
    }

    #[test]
    fn test_config_from_json() {
        let config = PaletteConfig::from_json(serde_json::json!({
            "colors": ["#f00", "#0f0"],
            "groupBy": 1,
            "addEraser": true,
        }))
        .unwrap();
        assert_eq!(
            config.colors,
            Some(ColorSpec::List(vec![
                parse_color("#f00").unwrap(),
                parse_color("#0f0").unwrap()
            ]))
        );
        assert_eq!(config.group_by, Some(1));
        assert!(config.add_eraser);

        let config = PaletteConfig::from_json(serde_json::json!({ "colors": 6 })).unwrap();
        assert_eq!(config.colors, Some(ColorSpec::Count(6)));

        // Unrecognized color-specification shapes produce nothing.
        assert!(PaletteConfig::from_json(serde_json::json!({ "colors": { "bad": true } })).is_none());
        assert!(PaletteConfig::from_json(serde_json::json!({ "colors": ["not-a-color"] })).is_none());
    }
}
