use crate::decoder::error::DecodeError;

/// Primitive sample type that can be read from little-endian row bytes.
pub trait Sample: Copy + PartialEq + Send + Sync + 'static {
    /// Size of one encoded sample in bytes.
    const SIZE: usize;

    /// Decode one sample; `bytes` is exactly `SIZE` long.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Whether the sample is the missing-data sentinel (zero).
    fn is_missing(self) -> bool;

    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sample for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }

                #[allow(clippy::float_cmp)]
                fn is_missing(self) -> bool {
                    self == 0 as $ty
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(u8, u16, u32, i32, f32);

/// Row-major grid of typed samples for a row range of one sub-channel.
///
/// # Examples
/// ```
/// use scanstat_core::SampleMatrix;
///
/// let bytes = [1u8, 0, 2, 0, 3, 0, 4, 0];
/// let matrix = SampleMatrix::<u16>::from_le_bytes(&bytes, 2, 2).unwrap();
/// assert_eq!(matrix.row(1), Some(&[3u16, 4][..]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix<T> {
    rows: usize,
    columns: usize,
    samples: Vec<T>,
}

impl<T: Sample> SampleMatrix<T> {
    /// Decode `rows × columns` samples from the start of `bytes`.
    ///
    /// # Errors
    /// Returns `DecodeError::TooShort` when `bytes` holds fewer samples than
    /// requested. Trailing bytes are ignored.
    pub fn from_le_bytes(bytes: &[u8], rows: usize, columns: usize) -> Result<Self, DecodeError> {
        let needed = rows
            .checked_mul(columns)
            .and_then(|count| count.checked_mul(T::SIZE))
            .ok_or(DecodeError::TooShort {
                needed: usize::MAX,
                actual: bytes.len(),
            })?;
        let data = bytes.get(..needed).ok_or(DecodeError::TooShort {
            needed,
            actual: bytes.len(),
        })?;
        let samples = data.chunks_exact(T::SIZE).map(T::from_le_slice).collect();
        Ok(Self {
            rows,
            columns,
            samples,
        })
    }
}

impl<T> SampleMatrix<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, index: usize) -> Option<&[T]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.columns;
        self.samples.get(start..start + self.columns)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        if column >= self.columns {
            return None;
        }
        self.row(row).and_then(|r| r.get(column))
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[T] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::{Sample, SampleMatrix};
    use crate::decoder::error::DecodeError;

    #[test]
    fn decodes_little_endian_rows() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];
        let matrix = SampleMatrix::<i32>::from_le_bytes(&bytes, 1, 2).unwrap();
        assert_eq!(matrix.rows(), 1);
        assert_eq!(matrix.columns(), 2);
        assert_eq!(matrix.get(0, 0), Some(&1));
        assert_eq!(matrix.get(0, 1), Some(&-1));
        assert_eq!(matrix.get(0, 2), None);
        assert_eq!(matrix.get(1, 0), None);
    }

    #[test]
    fn ignores_trailing_rows() {
        let bytes = [1u8, 2, 3, 4, 5, 6];
        let matrix = SampleMatrix::<u8>::from_le_bytes(&bytes, 1, 3).unwrap();
        assert_eq!(matrix.samples(), &[1, 2, 3]);
    }

    #[test]
    fn short_data_is_rejected() {
        let bytes = [0u8; 7];
        let err = SampleMatrix::<u32>::from_le_bytes(&bytes, 2, 1).unwrap_err();
        assert!(matches!(err, DecodeError::TooShort { needed: 8, actual: 7 }));
    }

    #[test]
    fn empty_matrix_has_no_rows() {
        let matrix = SampleMatrix::<f32>::from_le_bytes(&[], 0, 4).unwrap();
        assert!(matrix.samples().is_empty());
        assert_eq!(matrix.row(0), None);
    }

    #[test]
    fn zero_is_missing_for_every_type() {
        assert!(0u8.is_missing());
        assert!(0u16.is_missing());
        assert!(0u32.is_missing());
        assert!(0i32.is_missing());
        assert!(0.0f32.is_missing());
        assert!(!(-1i32).is_missing());
        assert!(!0.5f32.is_missing());
    }
}
