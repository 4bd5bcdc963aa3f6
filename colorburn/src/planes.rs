// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Borrowed per-channel views of planar RGB data.

use crate::error::{Error, Result};

pub const RGB_CHANNELS: usize = 3;

fn check_len(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::ChannelLengthMismatch { expected, found });
    }
    Ok(())
}

fn split_planar_len(len: usize, pixel_count: usize) -> Result<()> {
    let expected = pixel_count
        .checked_mul(RGB_CHANNELS)
        .ok_or(Error::ImageSizeTooLarge(pixel_count, RGB_CHANNELS))?;
    check_len(expected, len)
}

/// Red, green and blue channels of one image, each with one value per pixel.
#[derive(Debug, Clone, Copy)]
pub struct RgbPlanes<'a> {
    // Invariant: all three slices have the same length.
    r: &'a [f32],
    g: &'a [f32],
    b: &'a [f32],
}

impl<'a> RgbPlanes<'a> {
    pub fn new(r: &'a [f32], g: &'a [f32], b: &'a [f32]) -> Result<Self> {
        check_len(r.len(), g.len())?;
        check_len(r.len(), b.len())?;
        Ok(Self { r, g, b })
    }

    /// Splits a planar buffer laid out as all red values, then all green, then all blue.
    pub fn from_planar(data: &'a [f32], pixel_count: usize) -> Result<Self> {
        split_planar_len(data.len(), pixel_count)?;
        let (r, rest) = data.split_at(pixel_count);
        let (g, b) = rest.split_at(pixel_count);
        Ok(Self { r, g, b })
    }

    pub fn pixel_count(&self) -> usize {
        self.r.len()
    }

    pub fn channels(&self) -> [&'a [f32]; RGB_CHANNELS] {
        [self.r, self.g, self.b]
    }

    /// Restricts all three channels to `range`. Panics if `range` is out of bounds.
    pub fn slice(&self, range: std::ops::Range<usize>) -> RgbPlanes<'a> {
        RgbPlanes {
            r: &self.r[range.clone()],
            g: &self.g[range.clone()],
            b: &self.b[range],
        }
    }
}

/// Mutable counterpart of [`RgbPlanes`], used for the destination image.
#[derive(Debug)]
pub struct RgbPlanesMut<'a> {
    // Invariant: all three slices have the same length.
    r: &'a mut [f32],
    g: &'a mut [f32],
    b: &'a mut [f32],
}

impl<'a> RgbPlanesMut<'a> {
    pub fn new(r: &'a mut [f32], g: &'a mut [f32], b: &'a mut [f32]) -> Result<Self> {
        check_len(r.len(), g.len())?;
        check_len(r.len(), b.len())?;
        Ok(Self { r, g, b })
    }

    pub fn from_planar(data: &'a mut [f32], pixel_count: usize) -> Result<Self> {
        split_planar_len(data.len(), pixel_count)?;
        let (r, rest) = data.split_at_mut(pixel_count);
        let (g, b) = rest.split_at_mut(pixel_count);
        Ok(Self { r, g, b })
    }

    pub fn pixel_count(&self) -> usize {
        self.r.len()
    }

    pub fn channels_mut(&mut self) -> [&mut [f32]; RGB_CHANNELS] {
        [&mut *self.r, &mut *self.g, &mut *self.b]
    }

    /// Consumes the view and returns the three channel slices.
    pub fn into_channels(self) -> [&'a mut [f32]; RGB_CHANNELS] {
        [self.r, self.g, self.b]
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn from_planar_splits_channels() -> Result<()> {
        let data: Vec<f32> = (0..6).map(|v| v as f32).collect();
        let planes = RgbPlanes::from_planar(&data, 2)?;
        assert_eq!(planes.pixel_count(), 2);
        let [r, g, b] = planes.channels();
        assert_eq!(r, &[0.0, 1.0]);
        assert_eq!(g, &[2.0, 3.0]);
        assert_eq!(b, &[4.0, 5.0]);
        Ok(())
    }

    #[test]
    fn from_planar_rejects_wrong_length() {
        let data = vec![0.0f32; 7];
        assert!(matches!(
            RgbPlanes::from_planar(&data, 2),
            Err(Error::ChannelLengthMismatch {
                expected: 6,
                found: 7
            })
        ));
    }

    #[test]
    fn from_planar_rejects_overflow() {
        assert!(matches!(
            RgbPlanes::from_planar(&[], usize::MAX),
            Err(Error::ImageSizeTooLarge(..))
        ));
    }

    #[test]
    fn new_rejects_ragged_channels() {
        let (r, g, b) = (vec![0.0f32; 4], vec![0.0f32; 4], vec![0.0f32; 3]);
        assert!(RgbPlanes::new(&r, &g, &b).is_err());
        let (mut r, mut g, mut b) = (vec![0.0f32; 4], vec![0.0f32; 5], vec![0.0f32; 4]);
        assert!(RgbPlanesMut::new(&mut r, &mut g, &mut b).is_err());
    }

    #[test]
    fn empty_planes() -> Result<()> {
        let planes = RgbPlanes::from_planar(&[], 0)?;
        assert_eq!(planes.pixel_count(), 0);
        let mut data: Vec<f32> = vec![];
        let planes = RgbPlanesMut::from_planar(&mut data, 0)?;
        assert_eq!(planes.pixel_count(), 0);
        Ok(())
    }

    #[test]
    fn mut_views_write_through() -> Result<()> {
        let mut data = vec![0.0f32; 6];
        {
            let mut planes = RgbPlanesMut::from_planar(&mut data, 2)?;
            let [r, g, b] = planes.channels_mut();
            r[1] = 1.0;
            g[0] = 2.0;
            b[1] = 3.0;
        }
        assert_eq!(data, [0.0, 1.0, 2.0, 0.0, 0.0, 3.0]);
        Ok(())
    }

    #[test]
    fn slice_restricts_all_channels() -> Result<()> {
        let data: Vec<f32> = (0..9).map(|v| v as f32).collect();
        let planes = RgbPlanes::from_planar(&data, 3)?.slice(1..3);
        let [r, g, b] = planes.channels();
        assert_eq!(r, &[1.0, 2.0]);
        assert_eq!(g, &[4.0, 5.0]);
        assert_eq!(b, &[7.0, 8.0]);
        Ok(())
    }
}
