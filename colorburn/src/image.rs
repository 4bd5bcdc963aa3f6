// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    error::{Error, Result},
    planes::{RGB_CHANNELS, RgbPlanes, RgbPlanesMut},
    util::tracing_wrappers::*,
};

/// An owned planar image: `channels` consecutive planes of `width * height` values each, in
/// row-major pixel order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarImage {
    width: usize,
    height: usize,
    channels: usize,
    // Invariant: data.len() == width * height * channels.
    data: Vec<f32>,
}

fn buffer_len(width: usize, height: usize, channels: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(channels))
        .ok_or(Error::ImageSizeTooLarge(width, height))
}

impl PlanarImage {
    /// Allocates a zero-filled image. Allocation failure is reported, not aborted on.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", err))]
    pub fn new(width: usize, height: usize, channels: usize) -> Result<PlanarImage> {
        let len = buffer_len(width, height, channels)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0.0);
        debug!(len, "allocated planar image");
        Ok(PlanarImage {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn from_vec(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<PlanarImage> {
        let expected = buffer_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::ChannelLengthMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(PlanarImage {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn planes(&self) -> Result<RgbPlanes<'_>> {
        if self.channels != RGB_CHANNELS {
            return Err(Error::UnsupportedChannelCount(self.channels));
        }
        RgbPlanes::from_planar(&self.data, self.pixel_count())
    }

    pub fn planes_mut(&mut self) -> Result<RgbPlanesMut<'_>> {
        if self.channels != RGB_CHANNELS {
            return Err(Error::UnsupportedChannelCount(self.channels));
        }
        let pixels = self.pixel_count();
        RgbPlanesMut::from_planar(&mut self.data, pixels)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn new_is_zeroed() -> Result<()> {
        let image = PlanarImage::new(5, 3, 3)?;
        assert_eq!(image.size(), (5, 3));
        assert_eq!(image.channels(), 3);
        assert_eq!(image.data().len(), 45);
        assert!(image.data().iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn new_rejects_overflowing_size() {
        assert!(matches!(
            PlanarImage::new(usize::MAX, 2, 3),
            Err(Error::ImageSizeTooLarge(_, 2))
        ));
    }

    #[test]
    fn new_reports_allocation_failure() {
        // Fits in usize but not in any address space.
        assert!(matches!(
            PlanarImage::new(usize::MAX / 16, 1, 3),
            Err(Error::OutOfMemory(_))
        ));
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(PlanarImage::from_vec(2, 2, 3, vec![0.0; 12]).is_ok());
        assert!(matches!(
            PlanarImage::from_vec(2, 2, 3, vec![0.0; 11]),
            Err(Error::ChannelLengthMismatch {
                expected: 12,
                found: 11
            })
        ));
    }

    #[test]
    fn planes_follow_planar_layout() -> Result<()> {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let image = PlanarImage::from_vec(2, 2, 3, data)?;
        let [r, g, b] = image.planes()?.channels();
        assert_eq!(r, &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(g, &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(b, &[8.0, 9.0, 10.0, 11.0]);
        Ok(())
    }

    #[test]
    fn planes_require_rgb() -> Result<()> {
        let mut gray = PlanarImage::new(4, 4, 1)?;
        assert!(matches!(gray.planes(), Err(Error::UnsupportedChannelCount(1))));
        assert!(matches!(
            gray.planes_mut(),
            Err(Error::UnsupportedChannelCount(1))
        ));
        Ok(())
    }
}
