//! Particle grid geometry and double-buffer bookkeeping.
//!
//! Particle state lives in two equally sized textures. [`PingPong`] owns
//! both and tracks which one is current; the GPU store and the CPU
//! reference both use it so the swap rules are tested in one place.

/// Dimensions of the particle grid. One particle per texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    /// Create a grid. Zero dimensions are raised to one.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Number of particles.
    #[inline]
    pub fn count(&self) -> u32 {
        self.width * self.height
    }

    /// Texel for particle `index` in raster order.
    #[inline]
    pub fn texel(&self, index: u32) -> (u32, u32) {
        (index % self.width, index / self.width)
    }

    /// Raster index of texel `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> u32 {
        y * self.width + x
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

/// Two owned buffers and the index of the current one.
///
/// `step` hands the caller the current buffer for reading and the other
/// one for writing, then flips. The buffer exposed by [`current`](Self::current)
/// is never the one being written.
#[derive(Debug)]
pub struct PingPong<T> {
    buffers: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    /// Create with `a` as the current buffer.
    pub fn new(a: T, b: T) -> Self {
        Self {
            buffers: [a, b],
            current: 0,
        }
    }

    /// The buffer last completed by a step.
    #[inline]
    pub fn current(&self) -> &T {
        &self.buffers[self.current]
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Index of the buffer the next step will write.
    #[inline]
    pub fn write_index(&self) -> usize {
        1 - self.current
    }

    /// Both buffers, in index order.
    pub fn buffers(&self) -> &[T; 2] {
        &self.buffers
    }

    /// Run one step: `f(read, write)` then make `write` current.
    pub fn step<R>(&mut self, f: impl FnOnce(&T, &mut T) -> R) -> R {
        let (a, b) = self.buffers.split_at_mut(1);
        let (read, write) = if self.current == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        };
        let result = f(read, write);
        self.current = 1 - self.current;
        result
    }

    /// Like [`step`](Self::step), but the closure only receives indices.
    ///
    /// Used when the buffers are GPU resources addressed through
    /// pre-built bind groups.
    pub fn step_indexed<R>(&mut self, f: impl FnOnce(usize, usize) -> R) -> R {
        let read = self.current;
        let write = 1 - read;
        let result = f(read, write);
        self.current = write;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_texel_round_trip_non_square() {
        let grid = GridSize::new(4, 3);
        assert_eq!(grid.count(), 12);
        assert_eq!(grid.texel(5), (1, 1));
        assert_eq!(grid.texel(11), (3, 2));
        assert_eq!(grid.index(3, 2), 11);
    }

    #[test]
    fn test_zero_grid_clamped() {
        let grid = GridSize::new(0, 0);
        assert_eq!(grid.count(), 1);
    }

    #[test]
    fn test_step_swaps_and_never_aliases() {
        let mut pp = PingPong::new(vec![1], vec![0]);
        for i in 0..10 {
            let before = pp.current_index();
            assert_ne!(pp.current_index(), pp.write_index());
            pp.step(|read, write| {
                write[0] = read[0] + 1;
            });
            assert_ne!(before, pp.current_index());
            assert_eq!(pp.current()[0], i + 2);
        }
    }

    #[test]
    fn test_step_indexed_reports_distinct_buffers() {
        let mut pp = PingPong::new((), ());
        for _ in 0..5 {
            let current = pp.current_index();
            let (read, write) = pp.step_indexed(|r, w| (r, w));
            assert_eq!(read, current);
            assert_ne!(read, write);
            assert_eq!(pp.current_index(), write);
        }
    }
}
