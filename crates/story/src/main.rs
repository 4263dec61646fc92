use gpui::{
    App, Application, Context, Entity, IntoElement, ParentElement, Render, Styled, Window,
    WindowOptions,
};
use gpui_colorer::{
    ActiveTheme as _, Colorer, ColorerConfig, Palette, PaletteConfig, StyledExt as _, v_flex,
};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

struct ColorerStory {
    colorer: Option<Entity<Colorer>>,
}

impl ColorerStory {
    fn new(cx: &mut Context<Self>) -> Self {
        // Pass a path on the command line to color your own drawing.
        let url = std::env::args()
            .nth(1)
            .unwrap_or_else(|| "crates/story/assets/flower.svg".into());

        let config = ColorerConfig::default()
            .url(url)
            .colors(12)
            .auto_colors(true)
            .group_by(6)
            .add_eraser(true);
        Self {
            colorer: Colorer::build(config, cx),
        }
    }

    fn view(cx: &mut App) -> Entity<Self> {
        cx.new(|cx| Self::new(cx))
    }
}

impl Render for ColorerStory {
    fn render(&mut self, _: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        v_flex()
            .size_full()
            .p_4()
            .gap_4()
            .bg(cx.theme().background)
            .text_color(cx.theme().foreground)
            .child("SVG Colorer")
            .children(self.colorer.clone())
            // A standalone palette, for reference: same swatches, no wiring.
            .child(
                Palette::build(&PaletteConfig::default().used_class("demo_palette"))
                    .on_click(|swatch, _, _| tracing::info!(?swatch, "clicked")),
            )
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gpui_colorer=debug".parse().unwrap()),
        )
        .init();

    let app = Application::new();

    app.run(move |cx| {
        gpui_colorer::init(cx);
        cx.activate(true);

        cx.spawn(async move |cx| {
            cx.open_window(WindowOptions::default(), |_, cx| ColorerStory::view(cx))?;
            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });
}
