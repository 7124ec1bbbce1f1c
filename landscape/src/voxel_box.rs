use nalgebra::Vector3;

/// One axis-aligned box produced by a merge pass.
///
/// The box spans cells `[xi, xi + nx) x [yi, yi + ny) x [zi, zi + nz)`. It is a plain value:
/// two boxes with the same origin and extents are the same box, regardless of which pass
/// produced them. Ordering is by origin (x, y, z) and then by extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoxelBox {
    /// Grid-space origin (minimum cell).
    pub origin: [usize; 3],
    /// Number of cells along each axis, always >= 1.
    pub extents: [usize; 3],
}

impl VoxelBox {
    #[inline]
    pub fn new(origin: [usize; 3], extents: [usize; 3]) -> Self {
        debug_assert!(extents.iter().all(|&e| e >= 1));
        Self { origin, extents }
    }

    /// Exclusive maximum cell along each axis.
    #[inline]
    pub fn end(&self) -> [usize; 3] {
        [
            self.origin[0] + self.extents[0],
            self.origin[1] + self.extents[1],
            self.origin[2] + self.extents[2],
        ]
    }

    /// Number of cells covered by this box.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.extents[0] * self.extents[1] * self.extents[2]
    }

    /// Whether the cell `(x, y, z)` lies inside this box.
    #[inline]
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        let end = self.end();
        (self.origin[0]..end[0]).contains(&x)
            && (self.origin[1]..end[1]).contains(&y)
            && (self.origin[2]..end[2]).contains(&z)
    }

    /// Whether two boxes share at least one cell.
    #[inline]
    pub fn intersects(&self, other: &VoxelBox) -> bool {
        let (a_end, b_end) = (self.end(), other.end());
        (0..3).all(|axis| self.origin[axis] < b_end[axis] && other.origin[axis] < a_end[axis])
    }

    /// Iterate every cell covered by this box.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, usize)> {
        let [x0, y0, z0] = self.origin;
        let [x1, y1, z1] = self.end();
        (x0..x1).flat_map(move |x| (y0..y1).flat_map(move |y| (z0..z1).map(move |z| (x, y, z))))
    }

    /// World-space center, given the grid's cell size.
    ///
    /// `center = origin * cell + extent * cell / 2` per axis.
    #[inline]
    pub fn world_center(&self, cell_size: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            self.origin[0] as f32 * cell_size.x + self.extents[0] as f32 * cell_size.x * 0.5,
            self.origin[1] as f32 * cell_size.y + self.extents[1] as f32 * cell_size.y * 0.5,
            self.origin[2] as f32 * cell_size.z + self.extents[2] as f32 * cell_size.z * 0.5,
        )
    }

    /// World-space half extents, given the grid's cell size.
    #[inline]
    pub fn world_half_extents(&self, cell_size: Vector3<f32>) -> Vector3<f32> {
        self.world_size(cell_size) * 0.5
    }

    /// World-space full size, given the grid's cell size.
    #[inline]
    pub fn world_size(&self, cell_size: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            self.extents[0] as f32 * cell_size.x,
            self.extents[1] as f32 * cell_size.y,
            self.extents[2] as f32 * cell_size.z,
        )
    }
}
