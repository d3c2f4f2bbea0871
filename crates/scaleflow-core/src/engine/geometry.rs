//! Pure dimension math for fitting a source into a bounding box.
//!
//! Nothing here touches pixels; [`plan`] turns source dimensions, the
//! requested box, a [`Fit`] and the enlargement policy into a [`Placement`]
//! that the engine then executes.

use crate::scale::Fit;

/// What the engine has to do to the decoded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Source already satisfies the box
    Keep,
    /// Resample to exactly these dimensions
    Scale { width: u32, height: u32 },
    /// Resample, then crop the centered `crop` region
    ScaleCrop {
        width: u32,
        height: u32,
        crop_width: u32,
        crop_height: u32,
    },
    /// Resample, then center on a transparent `canvas`
    ScalePad {
        width: u32,
        height: u32,
        canvas_width: u32,
        canvas_height: u32,
    },
}

impl Placement {
    /// Final output dimensions for a source of the given size.
    pub fn output_dimensions(self, source: (u32, u32)) -> (u32, u32) {
        match self {
            Placement::Keep => source,
            Placement::Scale { width, height } => (width, height),
            Placement::ScaleCrop {
                crop_width,
                crop_height,
                ..
            } => (crop_width, crop_height),
            Placement::ScalePad {
                canvas_width,
                canvas_height,
                ..
            } => (canvas_width, canvas_height),
        }
    }

    /// Dimensions the source is resampled to before any crop or pad.
    pub fn resample_dimensions(self, source: (u32, u32)) -> (u32, u32) {
        match self {
            Placement::Keep => source,
            Placement::Scale { width, height }
            | Placement::ScaleCrop { width, height, .. }
            | Placement::ScalePad { width, height, .. } => (width, height),
        }
    }

    /// Largest width and height the engine allocates for this placement.
    pub fn peak_dimensions(self, source: (u32, u32)) -> (u32, u32) {
        let (rw, rh) = self.resample_dimensions(source);
        let (ow, oh) = self.output_dimensions(source);
        (rw.max(ow), rh.max(oh))
    }
}

/// Plan how to fit `source` into the `(max_width, max_height)` box.
///
/// A missing dimension is unconstrained; with only one dimension every fit
/// scales proportionally to it. With `enlarge == false` the source is never
/// resampled above its own size.
pub fn plan(
    source: (u32, u32),
    bounds: (Option<u32>, Option<u32>),
    fit: Fit,
    enlarge: bool,
) -> Placement {
    let (sw, sh) = source;
    if sw == 0 || sh == 0 {
        return Placement::Keep;
    }

    let (bw, bh) = match bounds {
        (None, None) => return Placement::Keep,
        (Some(w), None) => return proportional(source, w as f64 / sw as f64, enlarge),
        (None, Some(h)) => return proportional(source, h as f64 / sh as f64, enlarge),
        (Some(w), Some(h)) => (w, h),
    };

    let rw = bw as f64 / sw as f64;
    let rh = bh as f64 / sh as f64;

    match fit {
        Fit::Inside => {
            let ratio = clamp_ratio(rw.min(rh), enlarge);
            let (w, h) = scaled(source, ratio);
            finish(source, w.min(bw), h.min(bh))
        }
        Fit::Outside => {
            let ratio = clamp_ratio(rw.max(rh), enlarge);
            let (w, h) = scaled(source, ratio);
            if enlarge || ratio < 1.0 {
                finish(source, w.max(bw), h.max(bh))
            } else {
                finish(source, w, h)
            }
        }
        Fit::Fill => {
            if enlarge {
                finish(source, bw, bh)
            } else {
                finish(source, bw.min(sw), bh.min(sh))
            }
        }
        Fit::Cover => {
            let ratio = clamp_ratio(rw.max(rh), enlarge);
            let (w, h) = scaled(source, ratio);
            let (cw, ch) = (bw.min(w), bh.min(h));
            if (cw, ch) == (w, h) {
                finish(source, w, h)
            } else {
                Placement::ScaleCrop {
                    width: w,
                    height: h,
                    crop_width: cw,
                    crop_height: ch,
                }
            }
        }
        Fit::Contain => {
            let ratio = clamp_ratio(rw.min(rh), enlarge);
            let (w, h) = scaled(source, ratio);
            let (w, h) = (w.min(bw), h.min(bh));
            if (w, h) == (bw, bh) {
                finish(source, w, h)
            } else {
                Placement::ScalePad {
                    width: w,
                    height: h,
                    canvas_width: bw,
                    canvas_height: bh,
                }
            }
        }
    }
}

fn proportional(source: (u32, u32), ratio: f64, enlarge: bool) -> Placement {
    let (w, h) = scaled(source, clamp_ratio(ratio, enlarge));
    finish(source, w, h)
}

fn clamp_ratio(ratio: f64, enlarge: bool) -> f64 {
    if enlarge {
        ratio
    } else {
        ratio.min(1.0)
    }
}

fn scaled((sw, sh): (u32, u32), ratio: f64) -> (u32, u32) {
    let w = (sw as f64 * ratio).round().max(1.0) as u32;
    let h = (sh as f64 * ratio).round().max(1.0) as u32;
    (w, h)
}

fn finish(source: (u32, u32), width: u32, height: u32) -> Placement {
    if (width, height) == source {
        Placement::Keep
    } else {
        Placement::Scale { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(source: (u32, u32), bounds: (Option<u32>, Option<u32>), fit: Fit, enlarge: bool) -> (u32, u32) {
        plan(source, bounds, fit, enlarge).output_dimensions(source)
    }

    #[test]
    fn test_inside_landscape_binds_width() {
        assert_eq!(out((2000, 1500), (Some(500), Some(500)), Fit::Inside, false), (500, 375));
    }

    #[test]
    fn test_inside_portrait_binds_height() {
        assert_eq!(out((1000, 2000), (Some(500), Some(500)), Fit::Inside, false), (250, 500));
    }

    #[test]
    fn test_inside_never_enlarges_by_default() {
        assert_eq!(
            plan((300, 200), (Some(500), Some(500)), Fit::Inside, false),
            Placement::Keep
        );
        assert_eq!(out((300, 200), (Some(600), Some(600)), Fit::Inside, true), (600, 400));
    }

    #[test]
    fn test_single_dimension_scales_proportionally() {
        assert_eq!(out((1400, 700), (Some(700), None), Fit::Inside, false), (700, 350));
        assert_eq!(out((1400, 700), (None, Some(100)), Fit::Cover, false), (200, 100));
        assert_eq!(out((100, 50), (Some(700), None), Fit::Inside, false), (100, 50));
    }

    #[test]
    fn test_outside_covers_box() {
        assert_eq!(out((2000, 1000), (Some(500), Some(500)), Fit::Outside, false), (1000, 500));
    }

    #[test]
    fn test_cover_crops_to_box() {
        let p = plan((2000, 1000), (Some(500), Some(500)), Fit::Cover, false);
        assert_eq!(
            p,
            Placement::ScaleCrop {
                width: 1000,
                height: 500,
                crop_width: 500,
                crop_height: 500,
            }
        );
    }

    #[test]
    fn test_contain_pads_to_box() {
        let p = plan((2000, 1000), (Some(500), Some(500)), Fit::Contain, false);
        assert_eq!(
            p,
            Placement::ScalePad {
                width: 500,
                height: 250,
                canvas_width: 500,
                canvas_height: 500,
            }
        );
    }

    #[test]
    fn test_contain_pads_small_source_without_upscaling() {
        let p = plan((100, 80), (Some(500), Some(500)), Fit::Contain, false);
        assert_eq!(
            p,
            Placement::ScalePad {
                width: 100,
                height: 80,
                canvas_width: 500,
                canvas_height: 500,
            }
        );
        assert_eq!(p.output_dimensions((100, 80)), (500, 500));
    }

    #[test]
    fn test_peak_dimensions_cover_intermediate_and_output() {
        let cover = plan((2000, 1000), (Some(500), Some(500)), Fit::Cover, false);
        assert_eq!(cover.peak_dimensions((2000, 1000)), (1000, 500));

        let huge = plan((1, 1), (Some(200_000), Some(200_000)), Fit::Inside, true);
        assert_eq!(huge.peak_dimensions((1, 1)), (200_000, 200_000));
        assert_eq!(Placement::Keep.peak_dimensions((30, 40)), (30, 40));
    }

    #[test]
    fn test_fill_ignores_aspect_ratio() {
        assert_eq!(out((2000, 1000), (Some(300), Some(300)), Fit::Fill, false), (300, 300));
        assert_eq!(out((200, 100), (Some(300), Some(300)), Fit::Fill, false), (200, 100));
    }

    #[test]
    fn test_tiny_results_stay_at_least_one_pixel() {
        assert_eq!(out((10000, 10), (Some(100), Some(100)), Fit::Inside, false), (100, 1));
    }
}
