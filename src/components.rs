//! Layout components – Box, Row, Col and Grid builders.
//!
//! Components wrap arbitrary child fragments and know nothing about content
//! tags or document semantics. They never drop or truncate children; overflow
//! is left to the output medium.

use thiserror::Error;

use crate::fragment::{BoxFragment, FlexFragment, FlexItem, Fragment, Gap, GridFragment, TitlePosition};

/// Definition errors raised while placing children.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("column {column} is outside the grid's 1..={columns} columns")]
    ColumnOutOfRange { column: usize, columns: usize },
}

// ---------------------------------------------------------------------------
// Box
// ---------------------------------------------------------------------------

/// Builder for a titled box.
#[derive(Debug, Clone, Default)]
pub struct BoxBuilder {
    inner: BoxFragment,
}

impl BoxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: &str) -> Self {
        self.inner.role = Some(role.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.inner.title = Some(title.to_string());
        self
    }

    /// Title bar below the body instead of above it.
    pub fn title_bottom(mut self) -> Self {
        self.inner.title_position = TitlePosition::Bottom;
        self
    }

    pub fn title_at(mut self, position: TitlePosition) -> Self {
        self.inner.title_position = position;
        self
    }

    pub fn fill(mut self, fill: bool) -> Self {
        self.inner.fill = fill;
        self
    }

    pub fn centered(mut self, centered: bool) -> Self {
        self.inner.centered = centered;
        self
    }

    pub fn child(mut self, child: Fragment) -> Self {
        self.inner.body.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Fragment>) -> Self {
        self.inner.body.extend(children);
        self
    }

    pub fn build(self) -> Fragment {
        Fragment::Box(self.inner)
    }
}

// ---------------------------------------------------------------------------
// Row / Col
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Builder shared by [`Row`] and [`Col`].
#[derive(Debug, Clone)]
pub struct FlexBuilder {
    axis: Axis,
    inner: FlexFragment,
}

/// Horizontal flex container.
pub struct Row;

/// Vertical flex container.
pub struct Col;

impl Row {
    pub fn new() -> FlexBuilder {
        FlexBuilder::new(Axis::Horizontal)
    }
}

impl Col {
    pub fn new() -> FlexBuilder {
        FlexBuilder::new(Axis::Vertical)
    }
}

impl FlexBuilder {
    fn new(axis: Axis) -> Self {
        Self {
            axis,
            inner: FlexFragment {
                role: None,
                gap: Gap::default(),
                children: Vec::new(),
            },
        }
    }

    pub fn role(mut self, role: &str) -> Self {
        self.inner.role = Some(role.to_string());
        self
    }

    pub fn gap(mut self, gap: Gap) -> Self {
        self.inner.gap = gap;
        self
    }

    pub fn child(self, child: Fragment) -> Self {
        self.grow_child(child, 0)
    }

    /// Add a child that consumes remaining space in proportion to `grow`.
    pub fn grow_child(mut self, child: Fragment, grow: u32) -> Self {
        self.inner.children.push(FlexItem {
            grow,
            fragment: child,
        });
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Fragment>) -> Self {
        self.inner
            .children
            .extend(children.into_iter().map(|fragment| FlexItem { grow: 0, fragment }));
        self
    }

    pub fn build(self) -> Fragment {
        match self.axis {
            Axis::Horizontal => Fragment::Row(self.inner),
            Axis::Vertical => Fragment::Col(self.inner),
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Fixed N-column grid. Children are assigned to columns by explicit
/// 1-based index, not by flow order.
#[derive(Debug, Clone)]
pub struct Grid {
    inner: GridFragment,
}

impl Grid {
    /// A grid with `columns` columns (at least one).
    pub fn new(columns: usize) -> Self {
        Self {
            inner: GridFragment {
                role: None,
                gap: Gap::Md,
                columns: vec![Vec::new(); columns.max(1)],
            },
        }
    }

    pub fn role(mut self, role: &str) -> Self {
        self.inner.role = Some(role.to_string());
        self
    }

    pub fn gap(mut self, gap: Gap) -> Self {
        self.inner.gap = gap;
        self
    }

    pub fn column_count(&self) -> usize {
        self.inner.columns.len()
    }

    /// Append `child` to column `column` (1-based).
    pub fn place(&mut self, column: usize, child: Fragment) -> Result<(), LayoutError> {
        let columns = self.column_count();
        if column == 0 || column > columns {
            return Err(LayoutError::ColumnOutOfRange { column, columns });
        }
        self.inner.columns[column - 1].push(child);
        Ok(())
    }

    /// Like [`Grid::place`], but a child with an out-of-range column lands
    /// in column 1 behind a warning placeholder instead of being rejected.
    pub fn place_or_degrade(&mut self, column: usize, child: Fragment) {
        let columns = self.column_count();
        if column == 0 || column > columns {
            let err = LayoutError::ColumnOutOfRange { column, columns };
            log::warn!("{err}; placing in column 1");
            self.inner.columns[0].push(Fragment::warning(format!("[{err}]")));
            self.inner.columns[0].push(child);
            return;
        }
        self.inner.columns[column - 1].push(child);
    }

    pub fn build(self) -> Fragment {
        Fragment::Grid(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::PlaceholderKind;

    #[test]
    fn box_builder_sets_all_modifiers() {
        let frag = BoxBuilder::new()
            .role("combat-stat")
            .title("Armor Class")
            .title_bottom()
            .fill(true)
            .centered(true)
            .child(Fragment::literal("value", "16"))
            .build();
        match frag {
            Fragment::Box(b) => {
                assert_eq!(b.title.as_deref(), Some("Armor Class"));
                assert_eq!(b.title_position, TitlePosition::Bottom);
                assert!(b.fill && b.centered);
                assert_eq!(b.body.len(), 1);
            }
            other => panic!("expected box, got {other:?}"),
        }
    }

    #[test]
    fn row_and_col_keep_grow_factors() {
        let row = Row::new()
            .child(Fragment::literal("a", "a"))
            .grow_child(Fragment::literal("b", "b"), 1)
            .build();
        let Fragment::Row(flex) = row else {
            panic!("expected row");
        };
        assert_eq!(flex.children[0].grow, 0);
        assert_eq!(flex.children[1].grow, 1);

        assert!(matches!(Col::new().build(), Fragment::Col(_)));
    }

    #[test]
    fn grid_places_by_explicit_column() {
        let mut grid = Grid::new(2);
        grid.place(2, Fragment::literal("x", "right")).unwrap();
        grid.place(1, Fragment::literal("x", "left")).unwrap();
        grid.place(1, Fragment::literal("x", "left again")).unwrap();
        let Fragment::Grid(g) = grid.build() else {
            panic!("expected grid");
        };
        assert_eq!(g.columns[0].len(), 2);
        assert_eq!(g.columns[1].len(), 1);
        assert_eq!(g.columns[0][0].plain_text(), "left");
    }

    #[test]
    fn grid_rejects_out_of_range_columns() {
        let mut grid = Grid::new(2);
        assert_eq!(
            grid.place(3, Fragment::dash()),
            Err(LayoutError::ColumnOutOfRange { column: 3, columns: 2 })
        );
        assert!(grid.place(0, Fragment::dash()).is_err());
    }

    #[test]
    fn degraded_placement_lands_in_first_column() {
        let mut grid = Grid::new(2);
        grid.place_or_degrade(5, Fragment::literal("x", "stray"));
        grid.place_or_degrade(2, Fragment::literal("x", "fine"));
        let Fragment::Grid(g) = grid.build() else {
            panic!("expected grid");
        };
        assert_eq!(g.columns[0].len(), 2);
        assert!(matches!(&g.columns[0][0], Fragment::Placeholder(p) if p.kind == PlaceholderKind::Warning));
        assert_eq!(g.columns[0][1].plain_text(), "stray");
        assert_eq!(g.columns[1][0].plain_text(), "fine");
    }
}
