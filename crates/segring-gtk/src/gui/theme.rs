use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub progress: Srgba<f64>,
    pub track: Srgba<f64>,
    pub placeholder: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let fallback = Self::fallback();
        Self {
            progress: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                fallback.progress,
                None,
            ),
            track: Self::lookup_color(context, "theme_fg_color", fallback.track, Some(0.25)),
            placeholder: Self::lookup_color(
                context,
                "theme_fg_color",
                fallback.placeholder,
                Some(0.15),
            ),
        }
    }

    /// Colors used when no widget is around to ask, e.g. for PNG export.
    pub fn fallback() -> Self {
        Self {
            progress: Srgba::new(0.4, 0.31, 0.64, 1.0),
            track: Srgba::new(0.11, 0.11, 0.12, 0.25),
            placeholder: Srgba::new(0.11, 0.11, 0.12, 0.15),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}
