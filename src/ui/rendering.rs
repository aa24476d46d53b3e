use std::cell::RefCell;
use std::collections::HashMap;

use cairo::{Context, FontSlant, FontWeight};
use gdk_pixbuf::Pixbuf;
use gtk4::prelude::*;

use super::board::{FlashKind, ViewState};
use super::resources::{GameImage, GameResources};
use crate::game::logic::GameState;
use crate::game::types::{CandyKind, Cell, Coord};

// Layout constants in reference coordinates; the scene is scaled uniformly
// to fit the widget.
const MARGIN: f64 = 10.0;
const CELL_SIZE: f64 = 56.0;
const CELL_GAP: f64 = 2.0;
const CANDY_INSET: f64 = 6.0;
const POPUP_RISE: f64 = 40.0;

const CELL_COLOR: (f64, f64, f64) = (0.93, 0.93, 0.93);
const SELECTED_COLOR: (f64, f64, f64) = (1.0, 0.9, 0.1);
const FLASH_COLOR: (f64, f64, f64) = (0.68, 0.85, 0.9);
const REMOVED_FLASH_COLOR: (f64, f64, f64) = (1.0, 1.0, 1.0);
const TIP_COLOR: (f64, f64, f64) = (0.1, 0.75, 0.3);

// ── SVG rasterization cache ──────────────────────────────────────────────────
// Key: (pointer to usvg::Tree as usize, render_w_px, render_h_px)
// The cache is thread-local because GTK rendering happens on the main thread.
thread_local! {
    static SVG_CACHE: RefCell<HashMap<(usize, u32, u32), Pixbuf>> = RefCell::new(HashMap::new());
}

/// Size of the scene in reference coordinates for a rows × cols board.
pub fn ref_size(rows: usize, cols: usize) -> (f64, f64) {
    (
        2.0 * MARGIN + cols as f64 * CELL_SIZE,
        2.0 * MARGIN + rows as f64 * CELL_SIZE,
    )
}

struct Layout {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Layout {
    fn new(rows: usize, cols: usize, widget_w: i32, widget_h: i32) -> Self {
        let (ref_w, ref_h) = ref_size(rows, cols);
        let w = widget_w as f64;
        let h = widget_h as f64;
        let scale = (w / ref_w).min(h / ref_h);
        Self {
            scale,
            offset_x: (w - ref_w * scale) / 2.0,
            offset_y: (h - ref_h * scale) / 2.0,
        }
    }
}

fn cell_origin(at: Coord) -> (f64, f64) {
    (
        MARGIN + at.col as f64 * CELL_SIZE,
        MARGIN + at.row as f64 * CELL_SIZE,
    )
}

/// Render the board, highlights and cosmetic effects, scaled to fit
/// (widget_w, widget_h).
pub fn render(
    cr: &Context,
    state: &GameState,
    res: &GameResources,
    view: &ViewState,
    widget_w: i32,
    widget_h: i32,
    raster_quality: f64,
) {
    let board = state.board();
    let layout = Layout::new(board.rows(), board.cols(), widget_w, widget_h);
    if layout.scale <= 0.0 {
        return;
    }

    let _ = cr.save();
    cr.translate(layout.offset_x, layout.offset_y);
    cr.scale(layout.scale, layout.scale);

    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let at = Coord::new(row, col);
            let (x, y) = cell_origin(at);

            let color = if state.selected() == Some(at) {
                SELECTED_COLOR
            } else {
                CELL_COLOR
            };
            fill_cell(cr, x, y, color, 1.0);

            for (kind, alpha) in view.flashes_at(at) {
                let color = match kind {
                    FlashKind::Removed => REMOVED_FLASH_COLOR,
                    FlashKind::Refilled => FLASH_COLOR,
                };
                fill_cell(cr, x, y, color, alpha);
            }

            if let Cell::Candy(kind) = board.get(at) {
                draw_candy(cr, res, kind, x, y, layout.scale, raster_quality);
            }

            if view.hovered == Some(at) && !state.outcome().is_terminal() {
                fill_cell(cr, x, y, (0.0, 0.0, 0.0), 0.12);
            }
        }
    }

    if let Some((a, b)) = state.tip() {
        for at in [a, b] {
            let (x, y) = cell_origin(at);
            stroke_cell(cr, x, y, TIP_COLOR, 3.0);
        }
    }

    for popup in view.popups() {
        let (x, y) = cell_origin(popup.at);
        let rise = popup.progress() * POPUP_RISE;
        draw_points_popup(cr, popup.points, x, y - rise, 1.0 - popup.progress());
    }

    if state.outcome().is_terminal() {
        let (ref_w, ref_h) = ref_size(board.rows(), board.cols());
        cr.set_source_rgba(0.0, 0.0, 0.0, 0.35);
        cr.rectangle(0.0, 0.0, ref_w, ref_h);
        let _ = cr.fill();
    }

    let _ = cr.restore();
}

/// Convert widget-space mouse coordinates to a board cell.
pub fn mouse_to_cell(
    x: f64,
    y: f64,
    widget_w: i32,
    widget_h: i32,
    rows: usize,
    cols: usize,
) -> Option<Coord> {
    let layout = Layout::new(rows, cols, widget_w, widget_h);
    if layout.scale <= 0.0 {
        return None;
    }
    let rx = (x - layout.offset_x) / layout.scale;
    let ry = (y - layout.offset_y) / layout.scale;

    let col = ((rx - MARGIN) / CELL_SIZE).floor();
    let row = ((ry - MARGIN) / CELL_SIZE).floor();

    if col >= 0.0 && col < cols as f64 && row >= 0.0 && row < rows as f64 {
        Some(Coord::new(row as usize, col as usize))
    } else {
        None
    }
}

fn fill_cell(cr: &Context, x: f64, y: f64, (r, g, b): (f64, f64, f64), alpha: f64) {
    let half_gap = CELL_GAP / 2.0;
    cr.set_source_rgba(r, g, b, alpha);
    cr.rectangle(
        x + half_gap,
        y + half_gap,
        CELL_SIZE - CELL_GAP,
        CELL_SIZE - CELL_GAP,
    );
    let _ = cr.fill();
}

fn stroke_cell(cr: &Context, x: f64, y: f64, (r, g, b): (f64, f64, f64), line_w: f64) {
    let inset = CELL_GAP / 2.0 + line_w / 2.0;
    cr.set_source_rgb(r, g, b);
    cr.set_line_width(line_w);
    cr.rectangle(
        x + inset,
        y + inset,
        CELL_SIZE - 2.0 * inset,
        CELL_SIZE - 2.0 * inset,
    );
    let _ = cr.stroke();
}

fn draw_candy(
    cr: &Context,
    res: &GameResources,
    kind: CandyKind,
    x: f64,
    y: f64,
    scale: f64,
    raster_quality: f64,
) {
    let size = CELL_SIZE - 2.0 * CANDY_INSET;
    match res.candy(kind) {
        Some(img) => draw_image_scaled(
            cr,
            img,
            x + CANDY_INSET,
            y + CANDY_INSET,
            size,
            size,
            scale,
            raster_quality,
        ),
        None => {
            cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Normal);
            draw_centered_text(cr, kind.symbol(), x, y, size * 0.8, (0.1, 0.1, 0.1), 1.0);
        }
    }
}

fn draw_points_popup(cr: &Context, points: u32, x: f64, y: f64, alpha: f64) {
    let text = format!("+{}", points);
    cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Bold);
    draw_centered_text(cr, &text, x, y, 22.0, (0.0, 0.55, 0.0), alpha);
}

/// Draw `text` centered in the cell whose top-left corner is (x, y).
fn draw_centered_text(
    cr: &Context,
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    (r, g, b): (f64, f64, f64),
    alpha: f64,
) {
    cr.set_font_size(font_size);
    let Ok(ext) = cr.text_extents(text) else {
        return;
    };
    let tx = x + (CELL_SIZE - ext.width()) / 2.0 - ext.x_bearing();
    let ty = y + (CELL_SIZE - ext.height()) / 2.0 - ext.y_bearing();
    cr.set_source_rgba(r, g, b, alpha);
    cr.move_to(tx, ty);
    let _ = cr.show_text(text);
}

// ── Image drawing helpers ────────────────────────────────────────────────────

/// Draw a GameImage scaled to fit (target_w × target_h) in reference coords.
fn draw_image_scaled(
    cr: &Context,
    img: &GameImage,
    x: f64,
    y: f64,
    target_w: f64,
    target_h: f64,
    scale: f64,
    raster_quality: f64,
) {
    match img {
        GameImage::Raster(pb) => {
            let pw = pb.width() as f64;
            let ph = pb.height() as f64;
            if pw <= 0.0 || ph <= 0.0 {
                return;
            }
            let _ = cr.save();
            cr.translate(x, y);
            cr.scale(target_w / pw, target_h / ph);
            cr.set_source_pixbuf(pb, 0.0, 0.0);
            let _ = cr.paint();
            let _ = cr.restore();
        }
        GameImage::Svg { tree } => {
            render_svg(cr, tree, x, y, target_w, target_h, scale, raster_quality);
        }
    }
}

/// Render an SVG tree at reference position (x, y) with reference size
/// (w × h).
///
/// The SVG is rasterized at device-pixel resolution and painted 1:1 with the
/// CTM scale undone, so it stays crisp instead of being upscaled by Cairo.
/// Rasterizations are cached per target pixel size.
fn render_svg(
    cr: &Context,
    tree: &resvg::usvg::Tree,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    scale: f64,
    raster_quality: f64,
) {
    if w <= 0.0 || h <= 0.0 || scale <= 0.0 {
        return;
    }

    let raster_scale = scale * raster_quality.clamp(0.25, 1.0);
    let render_w = (w * raster_scale).round().max(1.0) as u32;
    let render_h = (h * raster_scale).round().max(1.0) as u32;

    let cache_key = (tree as *const _ as usize, render_w, render_h);
    let pixbuf = SVG_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(pb) = cache.get(&cache_key) {
            return Some(pb.clone());
        }
        let pb = rasterize_svg(tree, render_w, render_h)?;
        cache.insert(cache_key, pb.clone());
        Some(pb)
    });
    let Some(pixbuf) = pixbuf else {
        return;
    };

    let _ = cr.save();
    cr.translate(x, y);
    cr.scale(1.0 / raster_scale, 1.0 / raster_scale);
    cr.set_source_pixbuf(&pixbuf, 0.0, 0.0);
    let _ = cr.paint();
    let _ = cr.restore();
}

fn rasterize_svg(tree: &resvg::usvg::Tree, render_w: u32, render_h: u32) -> Option<Pixbuf> {
    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return None;
    }
    let mut pixmap = tiny_skia::Pixmap::new(render_w, render_h)?;
    let transform = tiny_skia::Transform::from_scale(
        render_w as f32 / size.width(),
        render_h as f32 / size.height(),
    );
    resvg::render(tree, transform, &mut pixmap.as_mut());

    // tiny-skia produces premultiplied RGBA; Pixbuf wants straight alpha.
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    Some(Pixbuf::from_mut_slice(
        rgba,
        gdk_pixbuf::Colorspace::Rgb,
        true,
        8,
        render_w as i32,
        render_h as i32,
        render_w as i32 * 4,
    ))
}
