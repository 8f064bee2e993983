//! Tract backend for background removal segmentation models
//!
//! Runs an ONNX salient-object segmentation model (U²-Net style: RGB input,
//! single-channel saliency output) through Tract, a pure Rust inference
//! library with no external dependencies. The model is loaded and optimized
//! once; `SimplePlan::run` takes `&self`, so one session is safely shared
//! across all worker threads.

use crate::error::{BgBatchError, Result};
use crate::remover::BackgroundRemover;
use image::imageops::FilterType as ResizeFilter;
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbaImage};
use ndarray::Array4;
use std::path::Path;
use tracing::debug;
use tract_onnx::prelude::*;

/// Type alias for the complex Tract model type to reduce complexity warnings
type TractModel = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Square model input edge used by U²-Net
const DEFAULT_INPUT_SIZE: u32 = 320;

/// Per-channel normalization applied before inference (U²-Net convention)
const NORM_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const NORM_STD: [f32; 3] = [1.0, 1.0, 1.0];

/// Background remover backed by a Tract-compiled ONNX model
pub struct TractRemover {
    model: TractModel,
    input_size: u32,
}

/// Placement of the aspect-preserved image on the square model canvas
struct CanvasLayout {
    scaled_width: u32,
    scaled_height: u32,
    offset_x: u32,
    offset_y: u32,
}

impl TractRemover {
    /// Load and optimize an ONNX model from `path` with the default
    /// U²-Net input size.
    ///
    /// # Errors
    /// - `Io` if the model file cannot be read
    /// - `Model` if Tract fails to parse, optimize, or compile the model
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_input_size(path, DEFAULT_INPUT_SIZE)
    }

    /// Load a model that expects a different square input edge.
    ///
    /// # Errors
    /// See [`TractRemover::load`].
    pub fn load_with_input_size(path: &Path, input_size: u32) -> Result<Self> {
        if input_size == 0 {
            return Err(BgBatchError::invalid_config("model input size must be non-zero"));
        }

        let model_data = std::fs::read(path)
            .map_err(|e| BgBatchError::file_io_error("read model file", path, e))?;

        debug!(path = %path.display(), bytes = model_data.len(), "compiling Tract model");
        let model = onnx()
            .model_for_read(&mut std::io::Cursor::new(model_data))
            .map_err(|e| BgBatchError::model(format!("failed to load ONNX model: {e}")))?
            .into_optimized()
            .map_err(|e| BgBatchError::model(format!("failed to optimize model: {e}")))?
            .into_runnable()
            .map_err(|e| BgBatchError::model(format!("failed to create runnable model: {e}")))?;

        Ok(Self { model, input_size })
    }

    /// Aspect-preserving resize onto a centered white canvas, normalized
    /// into an NCHW tensor.
    fn preprocess(&self, image: &RgbaImage) -> (Array4<f32>, CanvasLayout) {
        let size = self.input_size;
        let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
        let (orig_width, orig_height) = rgb.dimensions();

        let scale =
            (size as f32 / orig_width as f32).min(size as f32 / orig_height as f32);
        let scaled_width = ((orig_width as f32 * scale).round() as u32).clamp(1, size);
        let scaled_height = ((orig_height as f32 * scale).round() as u32).clamp(1, size);

        let resized =
            image::imageops::resize(&rgb, scaled_width, scaled_height, ResizeFilter::Triangle);

        let offset_x = (size - scaled_width) / 2;
        let offset_y = (size - scaled_height) / 2;
        let mut canvas = ImageBuffer::from_pixel(size, size, Rgb([255u8, 255, 255]));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let canvas_x = x + offset_x;
            let canvas_y = y + offset_y;
            if canvas_x < size && canvas_y < size {
                canvas.put_pixel(canvas_x, canvas_y, *pixel);
            }
        }

        let mut tensor = Array4::<f32>::zeros((1, 3, size as usize, size as usize));
        for (x, y, pixel) in canvas.enumerate_pixels() {
            for channel in 0..3 {
                let value = f32::from(pixel[channel]) / 255.0;
                tensor[[0, channel, y as usize, x as usize]] =
                    (value - NORM_MEAN[channel]) / NORM_STD[channel];
            }
        }

        (
            tensor,
            CanvasLayout {
                scaled_width,
                scaled_height,
                offset_x,
                offset_y,
            },
        )
    }

}

/// Extract the saliency mask from the model output, min-max normalized,
/// cropped to the image region of the canvas and resized to the original
/// dimensions.
///
/// The canvas coordinates in `layout` are only valid against a mask of
/// exactly `input_size` square, so a mismatched spatial output is rejected
/// here instead of panicking on out-of-bounds indexing.
fn extract_mask(
    output: &Array4<f32>,
    layout: &CanvasLayout,
    original: (u32, u32),
    input_size: u32,
) -> Result<GrayImage> {
    let shape = output.shape();
    let expected = input_size as usize;
    if shape.first() != Some(&1)
        || shape.get(1) != Some(&1)
        || shape.get(2) != Some(&expected)
        || shape.get(3) != Some(&expected)
    {
        return Err(BgBatchError::processing(format!(
            "unexpected output tensor shape {shape:?}, expected [1, 1, {expected}, {expected}]"
        )));
    }

    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &value in output.iter() {
        min = min.min(value);
        max = max.max(value);
    }
    let range = (max - min).max(f32::EPSILON);

    let mut mask = GrayImage::new(layout.scaled_width, layout.scaled_height);
    for (x, y, pixel) in mask.enumerate_pixels_mut() {
        let value = output[[
            0,
            0,
            (y + layout.offset_y) as usize,
            (x + layout.offset_x) as usize,
        ]];
        let normalized = (value - min) / range;
        *pixel = Luma([(normalized * 255.0).round() as u8]);
    }

    let (orig_width, orig_height) = original;
    Ok(image::imageops::resize(
        &mask,
        orig_width,
        orig_height,
        ResizeFilter::Triangle,
    ))
}

impl BackgroundRemover for TractRemover {
    fn remove(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let (tensor, layout) = self.preprocess(image);

        let input = Tensor::from(tensor);
        let outputs = self
            .model
            .run(tvec![input.into()])
            .map_err(|e| BgBatchError::processing(format!("Tract inference failed: {e}")))?;

        // U²-Net emits several side outputs; the first is the fused mask
        let output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| BgBatchError::processing("model produced no output tensor"))?
            .into_arc_tensor();
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| BgBatchError::processing(format!("failed to read output tensor: {e}")))?;
        let shape = view.shape();
        if shape.len() != 4 {
            return Err(BgBatchError::processing(format!(
                "expected 4D output tensor, got {}D",
                shape.len()
            )));
        }
        let output_array = Array4::from_shape_vec(
            (
                shape.first().copied().unwrap_or(1),
                shape.get(1).copied().unwrap_or(1),
                shape.get(2).copied().unwrap_or(self.input_size as usize),
                shape.get(3).copied().unwrap_or(self.input_size as usize),
            ),
            view.iter().copied().collect(),
        )
        .map_err(|e| BgBatchError::processing(format!("failed to reshape output tensor: {e}")))?;

        let mask = extract_mask(&output_array, &layout, image.dimensions(), self.input_size)?;

        let mut result = image.clone();
        for (x, y, pixel) in result.enumerate_pixels_mut() {
            let saliency = u16::from(mask.get_pixel(x, y)[0]);
            let alpha = u16::from(pixel[3]);
            pixel[3] = ((alpha * saliency) / 255) as u8;
        }
        Ok(result)
    }
}
