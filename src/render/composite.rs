use crate::foundation::{
    error::{ComicError, ComicResult},
    math::mul_div255_u8,
};

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ]
}

pub fn unpremultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    match a {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => {
            let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
            [un(px[0]), un(px[1]), un(px[2]), px[3]]
        }
    }
}

/// Composite a premultiplied source over one straight-alpha pixel.
pub fn over_straight(dst: [u8; 4], src: PremulRgba8) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    unpremultiply(over(premultiply(dst), src, 1.0))
}

/// Composite a premultiplied overlay of the same size over a straight-alpha image in place.
pub fn overlay_premul(dst: &mut image::RgbaImage, overlay: &[u8]) -> ComicResult<()> {
    if dst.as_raw().len() != overlay.len() {
        return Err(ComicError::validation(
            "overlay_premul expects an overlay matching the image size",
        ));
    }
    for (d, s) in dst.pixels_mut().zip(overlay.chunks_exact(4)) {
        d.0 = over_straight(d.0, [s[0], s[1], s[2], s[3]]);
    }
    Ok(())
}

/// Convert a premultiplied RGBA8 buffer into a straight-alpha image.
pub fn premul_to_image(
    width: u32,
    height: u32,
    mut data: Vec<u8>,
) -> ComicResult<image::RgbaImage> {
    for px in data.chunks_exact_mut(4) {
        let straight = unpremultiply([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&straight);
    }
    image::RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| ComicError::validation("pixel buffer does not match image dimensions"))
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
