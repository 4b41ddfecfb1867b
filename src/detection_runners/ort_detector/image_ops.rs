//! Functions to preprocess frames for the model.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use ndarray::Array;
use rayon::prelude::*;
use crate::detection_runners::input_wrapper::X;

/// Padding value used by the Ultralytics letterbox.
pub const LETTERBOX_FILL: u8 = 114;

/// Letterboxes every frame to `target_h` x `target_w` and stacks them into one NCHW batch in [0, 1].
pub fn preprocess(xs: &[RgbImage], target_h: u32, target_w: u32) -> Result<X> {
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Nearest);

    let image_tensors: Vec<Vec<f32>> = xs
        .par_iter()
        .map(|img| {
            let mut resizer = Resizer::new();
            let padded = letterbox_image(img, target_h, target_w, LETTERBOX_FILL, &mut resizer, &options)?;
            nchw_normalize_flat(&padded, target_w as usize, target_h as usize)
        })
        .collect::<Result<_>>()?;

    let channels = 3;
    let height = target_h as usize;
    let width = target_w as usize;
    let image_size = channels * height * width;

    let mut batch_flat: Vec<f32> = Vec::with_capacity(xs.len() * image_size);
    for img in image_tensors.iter() {
        batch_flat.extend_from_slice(img);
    }

    let batch = Array::from_shape_vec(
        (xs.len(), channels, height, width),
        batch_flat,
    )?.into_dyn();

    Ok(X::from(batch))
}

/// Scale that maps a `w0` x `h0` frame into the model input without distortion.
pub fn letterbox_ratio(w0: u32, h0: u32, target_w: u32, target_h: u32) -> f32 {
    (target_w as f32 / w0 as f32).min(target_h as f32 / h0 as f32)
}

/// Resizes into the top-left corner of a `target_w` x `target_h` canvas filled with `bg`.
pub fn letterbox_image(
    img: &RgbImage,
    target_h: u32,
    target_w: u32,
    bg: u8,
    resizer: &mut Resizer,
    resize_options: &ResizeOptions,
) -> Result<Vec<u8>> {
    let (w0, h0) = img.dimensions();
    if w0 == 0 || h0 == 0 {
        bail!("Cannot letterbox an empty frame");
    }
    let scale = letterbox_ratio(w0, h0, target_w, target_h);
    let new_w = ((w0 as f32 * scale).round() as u32).clamp(1, target_w);
    let new_h = ((h0 as f32 * scale).round() as u32).clamp(1, target_h);

    let src = FirImage::from_vec_u8(w0, h0, img.as_raw().clone(), PixelType::U8x3)?;
    let mut resized = FirImage::new(new_w, new_h, PixelType::U8x3);
    resizer.resize(&src, &mut resized, resize_options)?;

    let mut padded = vec![bg; (target_w * target_h * 3) as usize];
    let row_len = (new_w * 3) as usize;
    let stride = (target_w * 3) as usize;
    for (y, row) in resized.buffer().chunks_exact(row_len).enumerate() {
        let start = y * stride;
        padded[start..start + row_len].copy_from_slice(row);
    }

    Ok(padded)
}

fn nchw_normalize_flat(buf: &[u8], w: usize, h: usize) -> Result<Vec<f32>> {
    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let mut out = vec![0.0f32; buf.len()];
    let hw = w * h;

    for i in 0..hw {
        out[i] = buf[3 * i] as f32 / 255.0;
        out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
        out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
    }

    Ok(out)
}
