use std::ops::Add;

use rayon::prelude::*;
use thiserror::Error;

use linemorph_image::Image;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how row operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelRows,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

/// Apply a function to every row of the image and combine the per row results.
///
/// Each call of `f` gets the row index and exclusive access to that row's
/// interleaved pixel data, so rows can be written without locking. The per row
/// results are summed with `Add`, starting from `R::default()`.
///
/// # Arguments
///
/// * `dst` - The image whose rows are visited.
/// * `strategy` - How to schedule the rows.
/// * `f` - The row operation.
///
/// # Errors
///
/// Fails only when a [`ExecutionStrategy::Fixed`] pool cannot be built.
///
/// # Examples
///
/// ```
/// use linemorph_image::Image;
/// use linemorph_imgproc::parallel::{map_reduce_rows, ExecutionStrategy};
///
/// let mut image = Image::<u8, 1>::from_size_val([3, 2].into(), 0).unwrap();
/// let visited: usize = map_reduce_rows(&mut image, ExecutionStrategy::Serial, |j, row| {
///     row.iter_mut().for_each(|v| *v = j as u8);
///     1
/// })
/// .unwrap();
///
/// assert_eq!(visited, 2);
/// assert_eq!(image.as_slice(), &[0, 0, 0, 1, 1, 1]);
/// ```
pub fn map_reduce_rows<T, const C: usize, R, F>(
    dst: &mut Image<T, C>,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<R, ParallelError>
where
    T: Send,
    R: Default + Add<Output = R> + Send,
    F: Fn(usize, &mut [T]) -> R + Send + Sync,
{
    let row_stride = C * dst.cols();
    let data = dst.as_slice_mut();

    match strategy {
        ExecutionStrategy::Serial => Ok(data
            .chunks_exact_mut(row_stride)
            .enumerate()
            .map(|(j, row)| f(j, row))
            .fold(R::default(), |acc, r| acc + r)),
        ExecutionStrategy::ParallelRows => Ok(par_map_reduce_rows(data, row_stride, &f)),
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            Ok(pool.install(|| par_map_reduce_rows(data, row_stride, &f)))
        }
    }
}

fn par_map_reduce_rows<T, R, F>(data: &mut [T], row_stride: usize, f: &F) -> R
where
    T: Send,
    R: Default + Add<Output = R> + Send,
    F: Fn(usize, &mut [T]) -> R + Send + Sync,
{
    data.par_chunks_exact_mut(row_stride)
        .enumerate()
        .map(|(j, row)| f(j, row))
        .reduce(R::default, |a, b| a + b)
}
