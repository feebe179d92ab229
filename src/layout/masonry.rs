/// Configuration for the masonry column layout.
///
/// Items are distributed round-robin across a column count derived from the
/// viewport width. Tiles render square, so balancing item counts per column
/// also balances column heights.
#[derive(Debug, Clone)]
pub struct MasonryLayout {
    /// Gap between columns and between tiles within a column, in pixels.
    pub gap: f32,
}

impl Default for MasonryLayout {
    fn default() -> Self {
        Self { gap: 16.0 }
    }
}

/// Breakpoint table mapping viewport width to column count.
///
/// Ordered and monotonic: the first entry whose width bound exceeds the
/// viewport width wins, widths past the last bound get `MAX_COLUMNS`.
const BREAKPOINTS: [(f32, usize); 4] = [(640.0, 1), (768.0, 2), (1024.0, 3), (1280.0, 4)];

/// Column count used for widths at or beyond the widest breakpoint.
pub const MAX_COLUMNS: usize = 5;

/// Resolves the column count for a viewport width.
///
/// Every finite width maps to exactly one count; non-positive widths fall
/// into the narrowest bucket.
pub fn column_count_for_width(viewport_width: f32) -> usize {
    for (bound, columns) in BREAKPOINTS {
        if viewport_width < bound {
            return columns;
        }
    }
    MAX_COLUMNS
}

/// Partitions `items` into `column_count` columns by round-robin placement:
/// item `i` lands in column `i % column_count`.
///
/// Pure function of its inputs. Every item appears in exactly one column and
/// relative order within a column is preserved. A zero `column_count` is
/// clamped to one column; empty input yields `column_count` empty columns.
pub fn partition<T: Clone>(items: &[T], column_count: usize) -> Vec<Vec<T>> {
    let column_count = column_count.max(1);
    let mut columns: Vec<Vec<T>> = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        columns.push(Vec::with_capacity(items.len() / column_count + 1));
    }

    for (i, item) in items.iter().enumerate() {
        columns[i % column_count].push(item.clone());
    }

    columns
}

impl MasonryLayout {
    /// Width of a single column for a given viewport width and column count.
    pub fn column_width(&self, viewport_width: f32, column_count: usize) -> f32 {
        let column_count = column_count.max(1) as f32;
        let gaps = self.gap * (column_count - 1.0);
        ((viewport_width - gaps) / column_count).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_table() {
        assert_eq!(column_count_for_width(500.0), 1);
        assert_eq!(column_count_for_width(700.0), 2);
        assert_eq!(column_count_for_width(800.0), 3);
        assert_eq!(column_count_for_width(1100.0), 4);
        assert_eq!(column_count_for_width(1300.0), 5);
    }

    #[test]
    fn test_breakpoint_boundaries() {
        assert_eq!(column_count_for_width(639.9), 1);
        assert_eq!(column_count_for_width(640.0), 2);
        assert_eq!(column_count_for_width(768.0), 3);
        assert_eq!(column_count_for_width(1024.0), 4);
        assert_eq!(column_count_for_width(1280.0), 5);
    }

    #[test]
    fn test_breakpoint_degenerate_widths() {
        assert_eq!(column_count_for_width(0.0), 1);
        assert_eq!(column_count_for_width(-100.0), 1);
        assert_eq!(column_count_for_width(100_000.0), MAX_COLUMNS);
    }

    #[test]
    fn test_partition_round_robin_placement() {
        let items: Vec<u32> = (0..12).collect();
        let columns = partition(&items, 5);

        assert_eq!(columns.len(), 5);
        for (i, item) in items.iter().enumerate() {
            assert!(columns[i % 5].contains(item));
        }
        assert_eq!(columns[0], vec![0, 5, 10]);
        assert_eq!(columns[1], vec![1, 6, 11]);
        assert_eq!(columns[4], vec![4, 9]);
    }

    #[test]
    fn test_partition_conserves_items() {
        for column_count in 1..=7 {
            for n in [0usize, 1, 4, 13, 50] {
                let items: Vec<usize> = (0..n).collect();
                let columns = partition(&items, column_count);

                assert_eq!(columns.len(), column_count);
                let total: usize = columns.iter().map(|c| c.len()).sum();
                assert_eq!(total, n);
            }
        }
    }

    #[test]
    fn test_partition_preserves_column_order() {
        let items: Vec<u32> = (0..20).collect();
        let columns = partition(&items, 3);

        for column in &columns {
            assert!(column.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_partition_empty_items() {
        let columns = partition::<u32>(&[], 4);
        assert_eq!(columns.len(), 4);
        assert!(columns.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_partition_zero_columns_clamps_to_one() {
        let items = vec![1, 2, 3];
        let columns = partition(&items, 0);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0], items);
    }

    #[test]
    fn test_column_width() {
        let layout = MasonryLayout { gap: 16.0 };
        // 5 columns across 1296px: 4 gaps of 16px leave 1232px of tile space.
        let width = layout.column_width(1296.0, 5);
        assert!((width - 246.4).abs() < 0.01);

        // Never collapses below 1px.
        assert!(layout.column_width(10.0, 5) >= 1.0);
    }
}
