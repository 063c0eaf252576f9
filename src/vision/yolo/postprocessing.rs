// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding YOLO output tensors into detections

use anyhow::Result;
use ndarray::{ArrayViewD, Axis, Ix3};

use super::preprocessing::LetterboxInfo;
use crate::vision::detection::RawDetection;

/// Thresholds applied when decoding a raw detection head
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostprocessParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for PostprocessParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

/// Layout of the model's single output tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// `[1, 4 + nc, anchors]`, the default export
    ChannelsFirst { num_classes: usize },
    /// `[1, anchors, 4 + nc]`
    ChannelsLast { num_classes: usize },
    /// `[1, N, 6]` with `x1, y1, x2, y2, score, class`, NMS already applied
    EndToEnd,
}

impl OutputLayout {
    /// Infer the layout from a `[1, a, b]` output shape
    ///
    /// Raw heads have far more anchors than channels, which is what tells the
    /// two orientations apart.
    pub fn detect(shape: &[usize]) -> Result<Self> {
        if shape.len() != 3 || shape[0] != 1 {
            anyhow::bail!("Unexpected detection output shape: {:?}, expected [1, a, b]", shape);
        }

        let (a, b) = (shape[1], shape[2]);
        if b == 6 && a > 6 {
            return Ok(Self::EndToEnd);
        }
        if a > 4 && a < b {
            return Ok(Self::ChannelsFirst { num_classes: a - 4 });
        }
        if b > 4 && b < a {
            return Ok(Self::ChannelsLast { num_classes: b - 4 });
        }

        anyhow::bail!("Cannot infer detection layout from output shape {:?}", shape)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    bbox: [f32; 4],
    score: f32,
    /// Class value as emitted by the head; validated downstream
    class: f32,
}

/// Decode a detector output tensor into boxes in original image coordinates
///
/// Results are ordered by descending confidence.
pub fn decode_output(
    output: ArrayViewD<f32>,
    letterbox: &LetterboxInfo,
    params: &PostprocessParams,
) -> Result<Vec<RawDetection>> {
    let layout = OutputLayout::detect(output.shape())?;
    let output = output.into_dimensionality::<Ix3>()?;

    let mut candidates = Vec::new();
    match layout {
        OutputLayout::EndToEnd => {
            for row in output.index_axis(Axis(0), 0).outer_iter() {
                let score = row[4];
                if score < params.confidence_threshold {
                    continue;
                }
                candidates.push(Candidate {
                    bbox: [row[0], row[1], row[2], row[3]],
                    score,
                    class: row[5],
                });
            }
        }
        OutputLayout::ChannelsFirst { num_classes } | OutputLayout::ChannelsLast { num_classes } => {
            let channels_first = matches!(layout, OutputLayout::ChannelsFirst { .. });
            let anchors = if channels_first { output.shape()[2] } else { output.shape()[1] };
            let at = |channel: usize, anchor: usize| {
                if channels_first {
                    output[[0, channel, anchor]]
                } else {
                    output[[0, anchor, channel]]
                }
            };

            for anchor in 0..anchors {
                let (class_id, score) = (0..num_classes)
                    .map(|c| (c, at(4 + c, anchor)))
                    .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

                if score < params.confidence_threshold {
                    continue;
                }

                let (cx, cy, w, h) = (at(0, anchor), at(1, anchor), at(2, anchor), at(3, anchor));
                candidates.push(Candidate {
                    bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
                    score,
                    class: class_id as f32,
                });
            }

            candidates = non_max_suppression(candidates, params.iou_threshold);
        }
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(params.max_detections);

    Ok(candidates
        .into_iter()
        .map(|c| RawDetection::new(c.class, letterbox.map_box_to_original(c.bbox), c.score))
        .collect())
}

/// Greedy per-class NMS; boxes of different classes never suppress each other
fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let suppressed = kept
            .iter()
            .any(|k| k.class == candidate.class && iou(&k.bbox, &candidate.bbox) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let iw = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let ih = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let inter = iw * ih;

    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - inter;

    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}
