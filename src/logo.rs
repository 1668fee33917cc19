use eframe::egui;
use usvg::TreeParsing;

/// The magnifier-over-brackets mark used for the window icon and the header.
pub const LOGO_SVG: &str = include_str!("../assets/logo.svg");

/// Rasterize an SVG document into straight (unpremultiplied) RGBA8 pixels.
///
/// `resvg` renders into a premultiplied tiny-skia pixmap; encoding it to PNG
/// and decoding with `image` gives back the straight alpha egui expects.
fn rasterize(svg_data: &str) -> Option<(u32, u32, Vec<u8>)> {
    let opt = usvg::Options::default();
    let rtree = usvg::Tree::from_data(svg_data.as_bytes(), &opt).ok()?;

    let size = rtree.size.to_int_size();
    let width = size.width().max(1);
    let height = size.height().max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    let render_rtree = resvg::Tree::from_usvg(&rtree);
    render_rtree.render(usvg::Transform::default(), &mut pixmap.as_mut());

    let png = pixmap.encode_png().ok()?;
    let dyn_img = image::load_from_memory(&png).ok()?.to_rgba8();
    let (w, h) = dyn_img.dimensions();
    Some((w, h, dyn_img.into_raw()))
}

/// Header-sized logo, cached by the caller as a texture.
pub fn color_image_from_svg(svg_data: &str) -> Option<egui::ColorImage> {
    let (w, h, pixels) = rasterize(svg_data)?;
    Some(egui::ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        &pixels,
    ))
}

pub fn icon_data_from_svg(svg_data: &str) -> Option<egui::IconData> {
    let (width, height, rgba) = rasterize(svg_data)?;
    Some(egui::IconData {
        rgba,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_logo_rasterizes() {
        let icon = icon_data_from_svg(LOGO_SVG).expect("icon");
        assert_eq!((icon.width, icon.height), (128, 128));
        assert_eq!(icon.rgba.len(), 128 * 128 * 4);

        let image = color_image_from_svg(LOGO_SVG).expect("image");
        assert_eq!(image.size, [128, 128]);
    }

    #[test]
    fn invalid_svg_yields_none() {
        assert!(icon_data_from_svg("<not-svg").is_none());
    }
}
