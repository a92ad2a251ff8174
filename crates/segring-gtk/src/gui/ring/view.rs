use super::AVATAR_SOURCE_SIZE;
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use segring::{RingGeometry, SegmentArc, UiState, arcs_for};
use std::f64::consts::PI;
use std::path::Path;

pub struct RingRenderer<'a> {
    geometry: RingGeometry,
    arcs: Vec<SegmentArc>,
    avatar: Option<&'a Pixbuf>,
}

impl<'a> RingRenderer<'a> {
    pub fn new(state: &UiState, avatar: Option<&'a Pixbuf>) -> Self {
        Self {
            geometry: RingGeometry::new(&state.parameters),
            arcs: arcs_for(state),
            avatar,
        }
    }

    pub fn size(&self) -> f64 {
        self.geometry.canvas_size
    }

    /// Draws avatar and ring with the canvas' top-left corner at `(x, y)`.
    pub fn draw(
        &self,
        cr: &Context,
        colors: &ThemeColors,
        x: f64,
        y: f64,
    ) -> Result<(), cairo::Error> {
        cr.save()?;
        cr.translate(x, y);
        self.draw_avatar(cr, colors)?;
        if !self.arcs.is_empty() {
            cr.set_line_width(self.geometry.stroke_width);
            cr.set_line_cap(cairo::LineCap::Butt);
            self.draw_arcs(cr, colors.track, |arc| arc.track_sweep_angle)?;
            self.draw_arcs(cr, colors.progress, |arc| arc.progress_sweep_angle)?;
        }
        cr.restore()
    }

    fn draw_arcs(
        &self,
        cr: &Context,
        color: Srgba<f64>,
        sweep: impl Fn(&SegmentArc) -> f64,
    ) -> Result<(), cairo::Error> {
        set_source(cr, color);
        let c = self.geometry.center;
        for arc in &self.arcs {
            let sweep = sweep(arc);
            if sweep <= 0.0 {
                continue;
            }
            cr.new_path();
            cr.arc(
                c,
                c,
                self.geometry.arc_radius,
                arc.start_radians(),
                (arc.start_angle + sweep).to_radians(),
            );
            cr.stroke()?;
        }
        Ok(())
    }

    fn draw_avatar(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let c = self.geometry.center;
        let radius = self.geometry.avatar_diameter / 2.0;
        if radius <= 0.0 {
            return Ok(());
        }

        cr.save()?;
        cr.new_path();
        cr.arc(c, c, radius, 0.0, 2.0 * PI);

        match self.avatar {
            Some(pixbuf) => {
                cr.clip();
                // cover the circle, cropping whichever side overflows
                let (w, h) = (pixbuf.width() as f64, pixbuf.height() as f64);
                let d = self.geometry.avatar_diameter;
                let scale = (d / w).max(d / h);
                cr.translate(c - w * scale / 2.0, c - h * scale / 2.0);
                cr.scale(scale, scale);
                cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
                cr.paint()?;
            }
            None => {
                set_source(cr, colors.placeholder);
                cr.fill()?;
            }
        }
        cr.restore()
    }
}

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Draws the ring centered in a `width` x `height` area.
pub fn draw(
    cr: &Context,
    state: &UiState,
    colors: &ThemeColors,
    avatar: Option<&Pixbuf>,
    width: f64,
    height: f64,
) -> Result<(), cairo::Error> {
    let renderer = RingRenderer::new(state, avatar);
    let size = renderer.size();
    renderer.draw(cr, colors, (width - size) / 2.0, (height - size) / 2.0)
}

pub fn render_png(path: &Path, state: &UiState, avatar: Option<&Pixbuf>) -> anyhow::Result<()> {
    let renderer = RingRenderer::new(state, avatar);
    let side = renderer.size().ceil().max(1.0) as i32;

    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, side, side)?;
    {
        let cr = Context::new(&surface)?;
        renderer.draw(&cr, &ThemeColors::fallback(), 0.0, 0.0)?;
    }

    let mut file = fs_err::File::create(path)?;
    surface.write_to_png(&mut file)?;
    Ok(())
}

pub fn load_avatar(path: &Path) -> Option<Pixbuf> {
    Pixbuf::from_file_at_scale(path, AVATAR_SOURCE_SIZE, AVATAR_SOURCE_SIZE, true)
        .inspect_err(|e| log::error!("Failed to load avatar {}: {}", path.display(), e))
        .ok()
}
