//! Strided views over a flat buffer

use smallvec::SmallVec;
use std::fmt;

/// Most operator tensors are matrices with at most two batch dimensions
const STACK_DIMS: usize = 4;

/// Axis lengths
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Per-axis step in elements; zero on a broadcast axis
pub type Strides = SmallVec<[isize; STACK_DIMS]>;

/// Memory layout of a tensor view
///
/// Element `[i0, ..., in]` lives at `offset + Σ ik * strides[k]` in storage.
/// Views (transpose, permute, broadcast, unsqueeze) only rewrite the layout.
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
    offset: usize,
}

impl Layout {
    /// Row-major layout for `shape`
    ///
    /// ```
    /// use linopr::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        Self {
            shape: shape.iter().copied().collect(),
            strides: row_major_strides(shape),
            offset: 0,
        }
    }

    /// Layout with explicit shape, strides, and offset
    pub fn new(shape: Shape, strides: Strides, offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape,
            strides,
            offset,
        }
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Rank
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Product of the axis lengths
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// True for 0-dimensional layouts
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// True when elements are stored densely in row-major order from offset 0
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.strides == row_major_strides(&self.shape)
    }

    /// Resolve a possibly negative dimension index
    pub fn normalize_dim(&self, d: isize) -> Option<usize> {
        let rank = self.ndim() as isize;
        let idx = if d < 0 { d + rank } else { d };
        (0..rank).contains(&idx).then_some(idx as usize)
    }

    /// Size along `d` (negative indexing allowed)
    /// Leading dimensions in front of the trailing matrix dimensions
    pub fn batch_shape(&self) -> &[usize] {
        &self.shape[..self.ndim().saturating_sub(2)]
    }

    /// Swap two dimensions
    pub fn transpose(&self, dim0: isize, dim1: isize) -> Option<Self> {
        let d0 = self.normalize_dim(dim0)?;
        let d1 = self.normalize_dim(dim1)?;

        let mut out = self.clone();
        out.shape.swap(d0, d1);
        out.strides.swap(d0, d1);
        Some(out)
    }

    /// Reorder dimensions; `dims` must be a permutation of `0..ndim`
    pub fn permute(&self, dims: &[usize]) -> Option<Self> {
        if dims.len() != self.ndim() {
            return None;
        }
        let mut seen: SmallVec<[bool; STACK_DIMS]> = SmallVec::from_elem(false, dims.len());
        for &d in dims {
            if d >= dims.len() || seen[d] {
                return None;
            }
            seen[d] = true;
        }

        Some(Self {
            shape: dims.iter().map(|&d| self.shape[d]).collect(),
            strides: dims.iter().map(|&d| self.strides[d]).collect(),
            offset: self.offset,
        })
    }

    /// Reinterpret a contiguous layout under a new shape with the same element count
    pub fn reshape(&self, new_shape: &[usize]) -> Option<Self> {
        if !self.is_contiguous() || new_shape.iter().product::<usize>() != self.elem_count() {
            return None;
        }
        Some(Self::contiguous(new_shape))
    }

    /// Drop size-1 dimensions (only `dim` when given)
    pub fn squeeze(&self, dim: Option<isize>) -> Self {
        let keep = |idx: usize| match dim {
            Some(d) => self.normalize_dim(d) != Some(idx) || self.shape[idx] != 1,
            None => self.shape[idx] != 1,
        };

        let mut shape = Shape::new();
        let mut strides = Strides::new();
        for idx in 0..self.ndim() {
            if keep(idx) {
                shape.push(self.shape[idx]);
                strides.push(self.strides[idx]);
            }
        }
        Self::new(shape, strides, self.offset)
    }

    /// Insert a size-1 dimension at `dim` (negative counts from the end, -1 appends)
    pub fn unsqueeze(&self, dim: isize) -> Option<Self> {
        let ndim = self.ndim() as isize;
        let idx = if dim < 0 { ndim + dim + 1 } else { dim };
        if !(0..=ndim).contains(&idx) {
            return None;
        }
        let idx = idx as usize;

        let stride = if idx < self.ndim() {
            self.strides[idx] * self.shape[idx] as isize
        } else {
            1
        };

        let mut out = self.clone();
        out.shape.insert(idx, 1);
        out.strides.insert(idx, stride);
        Some(out)
    }

    /// Expand to `target` using stride-0 dimensions
    pub fn broadcast_to(&self, target: &[usize]) -> Option<Self> {
        if target.len() < self.ndim() {
            return None;
        }

        let pad = target.len() - self.ndim();
        let mut shape: Shape = target.iter().copied().collect();
        let mut strides: Strides = SmallVec::from_elem(0, target.len());

        for (i, (&s, &st)) in self.shape.iter().zip(self.strides.iter()).enumerate() {
            let t = target[pad + i];
            if s == t {
                strides[pad + i] = st;
            } else if s != 1 {
                return None;
            }
            shape[pad + i] = t;
        }

        Some(Self::new(shape, strides, self.offset))
    }

    /// Storage offsets of every element, in row-major order of this view
    pub fn element_offsets(&self) -> Vec<usize> {
        let numel = self.elem_count();
        let mut out = Vec::with_capacity(numel);
        if numel == 0 {
            return out;
        }

        let ndim = self.ndim();
        let mut index: Shape = SmallVec::from_elem(0, ndim);
        let mut linear = self.offset as isize;

        for _ in 0..numel {
            out.push(linear as usize);

            for d in (0..ndim).rev() {
                index[d] += 1;
                linear += self.strides[d];
                if index[d] < self.shape[d] {
                    break;
                }
                linear -= self.strides[d] * self.shape[d] as isize;
                index[d] = 0;
            }
        }
        out
    }
}

fn row_major_strides(shape: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(0, shape.len());
    let mut step = 1isize;
    for (slot, &len) in strides.iter_mut().zip(shape).rev() {
        *slot = step;
        step *= len as isize;
    }
    strides
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.shape.as_slice(), self.strides.as_slice())?;
        if self.offset != 0 {
            write!(f, "+{}", self.offset)?;
        }
        Ok(())
    }
}

/// NumPy-style broadcast of two shapes (right-aligned, size-1 dims expand)
pub fn broadcast_shapes(a: &[usize], b: &[usize]) -> Option<Shape> {
    let ndim = a.len().max(b.len());
    let mut out: Shape = SmallVec::from_elem(0, ndim);

    for i in 0..ndim {
        // i-th axis counted from the right
        let a_dim = a.len().checked_sub(i + 1).map_or(1, |j| a[j]);
        let b_dim = b.len().checked_sub(i + 1).map_or(1, |j| b[j]);

        out[ndim - 1 - i] = match (a_dim, b_dim) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => return None,
        };
    }
    Some(out)
}
