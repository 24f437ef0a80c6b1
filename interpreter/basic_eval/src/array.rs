//! DIM arrays.
//!
//! `DIM A(d1,...,dk)` reserves `(d1+1) * ... * (dk+1)` cells: each declared
//! size is an inclusive upper bound and indexing is 0-based. The flat
//! position is row-major over the extents (`x + y*X + z*X*Y + ...`), every
//! index is range-checked against its own dimension first, and the buffer
//! length never changes after construction.

use basic_diagnostic::{index_out_of_bounds, semantic, wanted_value, DiagResult};

use crate::value::Value;

/// The backing store of one array.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayValue {
    cells: Vec<Value>,
    /// Per-dimension extent: declared size + 1.
    extents: Vec<usize>,
}

impl ArrayValue {
    /// Allocate from the declared sizes of a `DIM`.
    ///
    /// A negative declared size yields a zero extent, which makes every
    /// access out of bounds rather than panicking.
    pub fn new(dims: &[i64]) -> Self {
        #[allow(
            clippy::cast_sign_loss,
            reason = "negative sizes are clamped to zero before the cast"
        )]
        let extents: Vec<usize> = dims.iter().map(|&d| (d + 1).max(0) as usize).collect();
        let len = extents.iter().product();
        ArrayValue {
            cells: vec![Value::Nil; len],
            extents,
        }
    }

    /// Number of cells: the product of the extents.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when any dimension has a zero extent.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Per-dimension extents.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Read one cell; uninitialized cells read as `Nil`.
    pub fn get(&self, indices: &[Value]) -> DiagResult<Value> {
        let pos = self.flat_index(indices)?;
        Ok(self.cells[pos].clone())
    }

    /// Write one cell.
    pub fn set(&mut self, indices: &[Value], value: Value) -> DiagResult<()> {
        let pos = self.flat_index(indices)?;
        self.cells[pos] = value;
        Ok(())
    }

    /// Map subscripts to the flat position, checking rank and range.
    fn flat_index(&self, indices: &[Value]) -> DiagResult<usize> {
        if indices.len() != self.extents.len() {
            return Err(semantic(format!(
                "mismatched dimensions: wanted {}, got {}",
                self.extents.len(),
                indices.len()
            )));
        }
        let mut pos = 0usize;
        let mut stride = 1usize;
        for (value, &extent) in indices.iter().zip(&self.extents) {
            let idx = match value {
                Value::Int(n) => *n,
                other => return Err(wanted_value("integer index", other.type_name())),
            };
            #[allow(
                clippy::cast_sign_loss,
                reason = "negative indices are rejected before the cast"
            )]
            if idx < 0 || idx as usize >= extent {
                return Err(index_out_of_bounds(idx, extent));
            }
            #[allow(clippy::cast_sign_loss, reason = "checked non-negative above")]
            {
                pos += idx as usize * stride;
            }
            stride *= extent;
        }
        Ok(pos)
    }
}
