//! UV layout template rendering.

use crate::buffer::TextureBuffer;
use crate::color::{BlendMode, Color};

/// Radius of the dot drawn per vertex (a 5px disc).
pub const UV_DOT_RADIUS: i64 = 2;

/// Renders a layout guide: one black dot per UV on a transparent canvas.
///
/// `v` is flipped so that `v = 1` lands on the top row.
pub fn render_uv_template(uvs: &[[f32; 2]], size: u32) -> TextureBuffer {
    let mut canvas = TextureBuffer::new_transparent(size, size);
    let extent = size.saturating_sub(1) as f64;
    for uv in uvs {
        let x = (uv[0] as f64 * extent) as i64;
        let y = ((1.0 - uv[1] as f64) * extent) as i64;
        canvas.fill_disc(x, y, UV_DOT_RADIUS, Color::black(), BlendMode::Replace);
    }
    canvas
}
