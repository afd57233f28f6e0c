use linemorph_image::Image;

/// Kernel for nearest neighbor interpolation
///
/// The coordinates are truncated towards zero and clamped to the image, so
/// the lookup never reads outside the pixel buffer.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to sample.
/// * `v` - The y coordinate of the pixel to sample.
///
/// # Returns
///
/// The channel values of the sampled pixel.
///
/// # Example
///
/// ```
/// use linemorph_image::Image;
/// use linemorph_imgproc::interpolation::nearest_neighbor_interpolation;
///
/// let image = Image::<u8, 1>::from_fn([3, 3].into(), |x, y| [(y * 3 + x) as u8]).unwrap();
///
/// assert_eq!(nearest_neighbor_interpolation(&image, 1.9, 2.2), [7]);
/// assert_eq!(nearest_neighbor_interpolation(&image, -4.0, 9.0), [6]);
/// ```
pub fn nearest_neighbor_interpolation<T: Copy, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> [T; C] {
    let (rows, cols) = (image.rows(), image.cols());

    // NOTE: float to int casts saturate, negatives and NaN become 0
    let iu = (u.trunc() as usize).min(cols - 1);
    let iv = (v.trunc() as usize).min(rows - 1);

    let base = (iv * cols + iu) * C;
    let src = &image.as_slice()[base..base + C];

    std::array::from_fn(|c| src[c])
}
