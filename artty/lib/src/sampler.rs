//! Fixed-stride image sampling.

/// Returns the source coordinates to sample for a `target_width` x
/// `target_height` grid.
///
/// When the target equals the source every pixel is visited in row-major order.
/// Otherwise both axes are walked with integer strides
/// (`source / target`), starting at half the row stride so each sample sits in
/// the middle of its block. The walk stops at the source bound, so the result
/// can be a row or column off from the requested size when the strides do not
/// divide evenly; use the returned grid's own dimensions.
///
/// ## Examples
///
/// ```
/// use artty_lib::sampler::sample;
///
/// let grid = sample(4, 4, 2, 2);
/// assert_eq!(grid, vec![vec![(1, 1), (3, 1)], vec![(1, 3), (3, 3)]]);
/// ```
pub fn sample(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> Vec<Vec<(u32, u32)>> {
    let (row_stride, col_stride, offset) =
        if target_width == source_width && target_height == source_height {
            (1, 1, 0)
        } else {
            let row_stride = (source_height / target_height.max(1)).max(1);
            let col_stride = (source_width / target_width.max(1)).max(1);
            (row_stride, col_stride, row_stride / 2)
        };

    (offset..source_height)
        .step_by(row_stride as usize)
        .map(|y| {
            (offset..source_width)
                .step_by(col_stride as usize)
                .map(|x| (x, y))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_visits_every_pixel() {
        let grid = sample(3, 2, 3, 2);
        assert_eq!(
            grid,
            vec![vec![(0, 0), (1, 0), (2, 0)], vec![(0, 1), (1, 1), (2, 1)]]
        );
    }

    #[test]
    fn even_downsample_hits_block_centers() {
        let grid = sample(20, 10, 10, 5);
        assert_eq!(grid.len(), 5);
        assert!(grid.iter().all(|row| row.len() == 10));
        assert_eq!(grid[0][0], (1, 1));
        assert_eq!(grid[4][9], (19, 9));
    }

    #[test]
    fn uneven_strides_can_overshoot_requested_size() {
        // 10 / 3 = 3 -> y at 1, 4, 7
        let grid = sample(10, 10, 3, 3);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0].len(), 3);

        // 11 / 3 = 3 -> y at 1, 4, 7, 10: one more row than requested
        let grid = sample(11, 11, 3, 3);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0].len(), 4);
    }

    #[test]
    fn offset_uses_row_stride_for_both_axes() {
        // row stride 4 (offset 2), column stride 1
        let grid = sample(4, 8, 4, 2);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0], vec![(2, 2), (3, 2)]);
    }

    #[test]
    fn upscale_targets_fall_back_to_stride_one() {
        let grid = sample(2, 2, 8, 8);
        assert_eq!(grid, vec![vec![(0, 0), (1, 0)], vec![(0, 1), (1, 1)]]);
    }

    #[test]
    fn zero_target_does_not_panic() {
        let grid = sample(4, 4, 0, 0);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0], vec![(2, 2)]);
    }

    #[test]
    fn empty_source_yields_empty_grid() {
        assert!(sample(0, 0, 0, 0).is_empty());
        assert!(sample(0, 0, 5, 5).is_empty());
    }
}
