use thiserror::Error;

/// Errors raised while describing a tensor layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The shape and the strides don't have the same number of axes.
    #[error("Shape has rank {shape} but strides have rank {strides}")]
    RankMismatch {
        /// Rank of the shape.
        shape: usize,
        /// Rank of the strides.
        strides: usize,
    },
    /// The requested axis doesn't exist.
    #[error("Axis {axis} is out of bounds for a tensor of rank {rank}")]
    InvalidAxis {
        /// The requested axis.
        axis: usize,
        /// Rank of the tensor.
        rank: usize,
    },
}

/// Immutable description of a strided tensor: its extents and the distance, in elements,
/// between two consecutive coordinates of each axis.
///
/// Logical indices are enumerated in row-major order, the last axis being the fastest.
/// The memory offset of a logical index is independent of that order and only depends on
/// the strides, so transposed or broadcast views are addressed without any copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TensorLayout {
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl TensorLayout {
    /// Creates a layout from explicit strides.
    pub fn new(shape: Vec<usize>, strides: Vec<usize>) -> Result<Self, LayoutError> {
        if shape.len() != strides.len() {
            return Err(LayoutError::RankMismatch {
                shape: shape.len(),
                strides: strides.len(),
            });
        }

        Ok(Self { shape, strides })
    }

    /// Creates a row-major contiguous layout.
    pub fn contiguous(shape: Vec<usize>) -> Self {
        let mut strides = vec![0; shape.len()];
        let mut current = 1;
        for (axis, extent) in shape.iter().enumerate().rev() {
            strides[axis] = current;
            current *= *extent;
        }

        Self { shape, strides }
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the tensor has no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The extents.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Extent of the given axis.
    pub fn shape_of(&self, axis: usize) -> Result<usize, LayoutError> {
        self.check_axis(axis)?;
        Ok(self.shape[axis])
    }

    /// Stride of the given axis.
    pub fn stride_of(&self, axis: usize) -> Result<usize, LayoutError> {
        self.check_axis(axis)?;
        Ok(self.strides[axis])
    }

    /// Whether the layout is row-major contiguous.
    pub fn is_contiguous(&self) -> bool {
        *self == Self::contiguous(self.shape.clone())
    }

    /// Minimum number of elements a buffer must hold to back this layout.
    pub fn required_len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        self.shape
            .iter()
            .zip(self.strides.iter())
            .map(|(extent, stride)| (extent - 1) * stride)
            .sum::<usize>()
            + 1
    }

    /// Maps a logical index to a memory offset.
    ///
    /// The index must be smaller than [len](Self::len).
    pub fn offset_of(&self, index: usize) -> usize {
        debug_assert!(index < self.len(), "Index {index} out of bounds");

        let mut remainder = index;
        let mut offset = 0;
        for axis in (0..self.rank()).rev() {
            let extent = self.shape[axis];
            offset += (remainder % extent) * self.strides[axis];
            remainder /= extent;
        }
        offset
    }

    /// The layout of the tensor with the given axis removed, keeping the original strides.
    ///
    /// Each logical index of the returned layout identifies one segment along `axis`, and its
    /// offset is where that segment starts in memory.
    pub fn remove_axis(&self, axis: usize) -> Result<Self, LayoutError> {
        self.check_axis(axis)?;

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.remove(axis);
        strides.remove(axis);

        Ok(Self { shape, strides })
    }

    fn check_axis(&self, axis: usize) -> Result<(), LayoutError> {
        if axis >= self.rank() {
            return Err(LayoutError::InvalidAxis {
                axis,
                rank: self.rank(),
            });
        }
        Ok(())
    }
}
