/// Column-major 4x4 matrix, the layout both WebGL and the map's camera
/// transformer use.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    m: [f64; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Builds a matrix from a column-major slice.
    ///
    /// Returns `None` unless the slice holds exactly 16 values.
    pub fn from_column_major(values: &[f64]) -> Option<Self> {
        let m: [f64; 16] = values.try_into().ok()?;
        Some(Self { m })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.m
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }
}
