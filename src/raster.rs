//! In-memory pixel containers: the RGBA [`RasterBuffer`] every effect reads
//! and writes, and the single-channel [`ScalarField`] used for intermediate
//! luma, gradient and dilation maps.
//!
//! Both wrap `ndarray` arrays in (height, width[, channel]) order so filter
//! kernels can index `[[y, x, c]]` directly.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3};

use crate::error::{EffectError, Result};

/// Number of interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
}

// ============================================================================
// RasterBuffer
// ============================================================================

/// RGBA8 image with fixed channel order.
///
/// Invariant: the backing array is shaped `(height, width, 4)` in standard
/// layout and owns exactly `width * height * 4` bytes starting at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    data: Array3<u8>,
}

impl RasterBuffer {
    /// Build a raster from interleaved RGBA bytes.
    ///
    /// Fails with [`EffectError::InvalidBuffer`] unless
    /// `pixels.len() == width * height * 4`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let invalid = |expected| EffectError::InvalidBuffer {
            width,
            height,
            expected,
            actual: pixels.len(),
        };
        let expected = rgba_len(width, height).ok_or_else(|| invalid(usize::MAX))?;
        if pixels.len() != expected {
            return Err(invalid(expected));
        }
        let actual = pixels.len();
        let data = Array3::from_shape_vec((height as usize, width as usize, CHANNELS), pixels)
            .map_err(|_| EffectError::InvalidBuffer { width, height, expected, actual })?;
        Ok(Self { data })
    }

    /// Build a raster where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let count = rgba_len(width, height).ok_or(EffectError::InvalidBuffer {
            width,
            height,
            expected: usize::MAX,
            actual: 0,
        })? / CHANNELS;
        let pixels = rgba.iter().copied().cycle().take(count * CHANNELS).collect();
        Self::new(width, height, pixels)
    }

    /// Wrap an existing `(height, width, 4)` array.
    ///
    /// Arrays that are not in standard layout, or that view only part of
    /// their allocation (e.g. after `slice_move`), are copied into a fresh
    /// buffer.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        let (w, h) = (width as u32, height as u32);
        if channels != CHANNELS || w as usize != width || h as usize != height {
            return Err(EffectError::InvalidBuffer {
                width: w,
                height: h,
                expected: width * height * CHANNELS,
                actual: data.len(),
            });
        }
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };

        let len = data.len();
        let (mut bytes, offset) = data.into_raw_vec_and_offset();
        let offset = offset.unwrap_or(0);
        if offset != 0 || bytes.len() != len {
            bytes = bytes[offset..offset + len].to_vec();
        }
        Self::new(w, h, bytes)
    }

    /// Wrap an array the caller shaped as `(height, width, 4)` from an
    /// existing raster or field.
    pub(crate) fn from_parts(data: Array3<u8>) -> Self {
        debug_assert_eq!(data.dim().2, CHANNELS);
        Self { data }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    fn check(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width() || y >= self.height() {
            return Err(EffectError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    /// Read the four channels of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        self.check(x, y)?;
        let (x, y) = (x as usize, y as usize);
        Ok([
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
            self.data[[y, x, 3]],
        ])
    }

    /// Overwrite the pixel at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<()> {
        self.check(x, y)?;
        let (x, y) = (x as usize, y as usize);
        for (c, value) in rgba.into_iter().enumerate() {
            self.data[[y, x, c]] = value;
        }
        Ok(())
    }

    /// Interleaved RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        // Constructors only ever store standard-layout arrays.
        self.data.as_slice().unwrap_or_default()
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data.as_slice_mut().unwrap_or_default()
    }

    /// Consume the raster and return its interleaved RGBA bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_raw_vec_and_offset().0
    }

    /// Consume the raster and return its `(height, width, 4)` array.
    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// `(height, width, 4)` view of the pixels.
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub(crate) fn view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }
}

// ============================================================================
// ScalarField
// ============================================================================

/// One `f32` per pixel, shaped `(height, width)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    data: Array2<f32>,
}

impl ScalarField {
    /// A zero-filled field.
    pub fn zeros(width: u32, height: u32) -> Self {
        Self {
            data: Array2::zeros((height as usize, width as usize)),
        }
    }

    /// Build a field from row-major values.
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> Result<Self> {
        let actual = values.len();
        let expected = (width as usize) * (height as usize);
        let data = Array2::from_shape_vec((height as usize, width as usize), values).map_err(
            |_| EffectError::InvalidBuffer {
                width,
                height,
                expected,
                actual,
            },
        )?;
        Ok(Self { data })
    }

    pub(crate) fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    /// Value at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<f32> {
        self.data
            .get((y as usize, x as usize))
            .copied()
            .ok_or(EffectError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
    }

    /// Overwrite the value at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, value: f32) -> Result<()> {
        let (width, height) = (self.width(), self.height());
        let slot = self
            .data
            .get_mut((y as usize, x as usize))
            .ok_or(EffectError::OutOfBounds { x, y, width, height })?;
        *slot = value;
        Ok(())
    }

    /// Largest value in the field, or 0 for an empty field.
    ///
    /// NaN entries are ignored.
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(0.0f32, f32::max)
    }

    /// Apply `f` to every value, producing a new field.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.mapv(f),
        }
    }

    /// Row-major values.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }

    /// `(height, width)` view of the values.
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    pub(crate) fn view_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.data.view_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    #[test]
    fn test_round_trip_bytes() {
        let bytes: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 7 % 256) as u8).collect();
        let raster = RasterBuffer::new(3, 2, bytes.clone()).unwrap();

        let mut read_back = Vec::new();
        for y in 0..2 {
            for x in 0..3 {
                read_back.extend_from_slice(&raster.pixel(x, y).unwrap());
            }
        }
        assert_eq!(read_back, bytes);
        assert_eq!(raster.as_bytes(), bytes.as_slice());
        assert_eq!(raster.into_bytes(), bytes);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = RasterBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            EffectError::InvalidBuffer { width: 2, height: 2, expected: 16, actual: 15 }
        );
        assert!(RasterBuffer::new(2, 2, vec![0; 17]).is_err());
    }

    #[test]
    fn test_empty_raster_is_valid() {
        let raster = RasterBuffer::new(0, 5, Vec::new()).unwrap();
        assert_eq!(raster.width(), 0);
        assert_eq!(raster.height(), 5);
        assert!(raster.as_bytes().is_empty());
    }

    #[test]
    fn test_out_of_bounds_is_reported() {
        let mut raster = RasterBuffer::filled(4, 3, [1, 2, 3, 4]).unwrap();
        assert_eq!(
            raster.pixel(4, 0),
            Err(EffectError::OutOfBounds { x: 4, y: 0, width: 4, height: 3 })
        );
        assert!(raster.pixel(0, 3).is_err());
        assert!(raster.set_pixel(10, 10, [0; 4]).is_err());
        // untouched
        assert!(raster.as_bytes().chunks(4).all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn test_set_pixel() {
        let mut raster = RasterBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
        raster.set_pixel(1, 0, [10, 20, 30, 40]).unwrap();
        assert_eq!(raster.pixel(1, 0).unwrap(), [10, 20, 30, 40]);
        assert_eq!(&raster.as_bytes()[4..8], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_from_array_requires_four_channels() {
        assert!(RasterBuffer::from_array(Array3::zeros((2, 2, 3))).is_err());
        let raster = RasterBuffer::from_array(Array3::zeros((2, 3, 4))).unwrap();
        assert_eq!((raster.width(), raster.height()), (3, 2));
    }

    #[test]
    fn test_from_sliced_array_owns_exact_bytes() {
        // rows 0 and 1 are sliced away but stay in the allocation
        let tall = Array3::from_shape_fn((4, 2, 4), |(y, _, _)| y as u8);
        let raster = RasterBuffer::from_array(tall.slice_move(s![2..4, .., ..])).unwrap();
        assert_eq!((raster.width(), raster.height()), (2, 2));
        assert_eq!(raster.pixel(0, 0).unwrap(), [2, 2, 2, 2]);

        let bytes = raster.clone().into_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &[2; 8]);
        assert_eq!(&bytes[8..], &[3; 8]);
        assert_eq!(raster.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_from_transposed_array() {
        let wide = Array3::from_shape_fn((2, 3, 4), |(y, x, _)| (y * 10 + x) as u8);
        let raster = RasterBuffer::from_array(wide.permuted_axes([1, 0, 2])).unwrap();
        assert_eq!((raster.width(), raster.height()), (2, 3));
        assert_eq!(raster.pixel(1, 2).unwrap(), [12; 4]);
        assert_eq!(raster.into_bytes().len(), 24);
    }

    #[test]
    fn test_scalar_field_access() {
        let mut field = ScalarField::zeros(3, 2);
        field.set(2, 1, 7.5).unwrap();
        assert_eq!(field.get(2, 1).unwrap(), 7.5);
        assert_eq!(field.max(), 7.5);
        assert!(field.get(3, 0).is_err());
        assert!(field.set(0, 2, 1.0).is_err());

        assert!(ScalarField::from_values(2, 2, vec![0.0; 3]).is_err());
        let doubled = ScalarField::from_values(2, 1, vec![1.0, 2.0]).unwrap().map(|v| v * 2.0);
        assert_eq!(doubled.values().collect::<Vec<_>>(), vec![2.0, 4.0]);
    }
}
