//! Per-region borrow sets and the alias rule: at any program point a
//! region's live views are either empty, a single mutable view, or any
//! number of compatible immutable views. Views over disjoint `[start,
//! end)` ranges of the same region never alias.

use crate::base::TextRange;
use crate::parser::ast::BorrowKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A live view: the binding it's stored in, its range within the region,
/// its mutability, and the span of the `borrow` expression that created
/// it (cited as the conflicting-borrow origin in diagnostics).
#[derive(Debug, Clone)]
pub struct OwnedView {
    pub binding: String,
    pub interval: Interval,
    pub kind: BorrowKind,
    pub span: TextRange,
}

#[derive(Debug, Clone, Default)]
pub struct RegionState {
    views: Vec<OwnedView>,
    /// The buffer's size in bytes, known when it was created with a
    /// literal-sized `buffer(N)`; lets a whole-region `borrow r` resolve
    /// its `[0, size)` range at check time.
    pub size: Option<i64>,
}

impl RegionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_size(&mut self, size: i64) {
        self.size = Some(size);
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Attempt to add `view`; fails with the first conflicting existing
    /// view if the alias rule would be violated (any overlap where
    /// either side is mutable).
    pub fn borrow(&mut self, view: OwnedView) -> Result<(), OwnedView> {
        for existing in &self.views {
            if existing.interval.overlaps(&view.interval)
                && (existing.kind == BorrowKind::Mut || view.kind == BorrowKind::Mut)
            {
                return Err(existing.clone());
            }
        }
        self.views.push(view);
        Ok(())
    }

    pub fn remove(&mut self, binding: &str) {
        self.views.retain(|v| v.binding != binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    fn span() -> TextRange {
        TextRange::new(TextSize::from(0), TextSize::from(1))
    }

    fn view(binding: &str, start: i64, end: i64, kind: BorrowKind) -> OwnedView {
        OwnedView {
            binding: binding.to_string(),
            interval: Interval { start, end },
            kind,
            span: span(),
        }
    }

    #[test]
    fn disjoint_mutable_views_do_not_conflict() {
        let mut region = RegionState::new();
        region.borrow(view("v1", 0, 4, BorrowKind::Mut)).unwrap();
        assert!(region.borrow(view("v2", 4, 8, BorrowKind::Mut)).is_ok());
    }

    #[test]
    fn overlapping_mutable_views_conflict() {
        let mut region = RegionState::new();
        region.borrow(view("v1", 0, 8, BorrowKind::Mut)).unwrap();
        let err = region.borrow(view("v2", 0, 4, BorrowKind::Immut)).unwrap_err();
        assert_eq!(err.binding, "v1");
    }

    #[test]
    fn overlapping_immutable_views_are_compatible() {
        let mut region = RegionState::new();
        region.borrow(view("v1", 0, 8, BorrowKind::Immut)).unwrap();
        assert!(region.borrow(view("v2", 0, 4, BorrowKind::Immut)).is_ok());
    }

    #[test]
    fn removing_a_view_frees_its_range() {
        let mut region = RegionState::new();
        region.borrow(view("v1", 0, 8, BorrowKind::Mut)).unwrap();
        region.remove("v1");
        assert!(region.is_empty());
    }
}
