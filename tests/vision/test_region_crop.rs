// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Cropping detected regions out of label images

use care_label_node::vision::region::clamp_to_image;
use care_label_node::vision::{crop, BoundingBox};
use image::{Rgb, RgbImage};

fn bbox(x1: f32, y1: f32, x2: f32, y2: f32) -> BoundingBox {
    BoundingBox { x1, y1, x2, y2 }
}

#[test]
fn test_integer_box_crops_exact_pixels() {
    let image = RgbImage::from_fn(100, 80, |x, y| Rgb([x as u8, y as u8, 0]));
    let region = crop(&image, &bbox(10.0, 20.0, 30.0, 50.0)).unwrap();

    assert_eq!(region.dimensions(), (20, 30));
    assert_eq!(region.get_pixel(0, 0), &Rgb([10, 20, 0]));
    assert_eq!(region.get_pixel(19, 29), &Rgb([29, 49, 0]));
}

#[test]
fn test_fractional_box_rounds_to_nearest_pixel() {
    let rect = clamp_to_image(&bbox(10.4, 10.6, 50.6, 49.4), 100, 100).unwrap();
    assert_eq!((rect.x, rect.y), (10, 11));
    assert_eq!((rect.width, rect.height), (41, 38));
}

#[test]
fn test_box_past_the_edge_is_clamped() {
    let image = RgbImage::new(64, 48);
    let region = crop(&image, &bbox(-5.0, 40.0, 70.0, 60.0)).unwrap();
    assert_eq!(region.dimensions(), (64, 8));
}

#[test]
fn test_box_without_area_is_rejected() {
    let image = RgbImage::new(64, 48);
    assert!(crop(&image, &bbox(20.0, 20.0, 20.2, 30.0)).is_err());
    assert!(crop(&image, &bbox(100.0, 100.0, 120.0, 120.0)).is_err());
    assert!(crop(&image, &bbox(30.0, 10.0, 10.0, 30.0)).is_err());
}
