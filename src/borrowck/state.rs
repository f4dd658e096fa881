//! Per-local move-state overlay: `Owned | Moved(span) | Consumed`. Cloned
//! at branch entry and joined at merge points — if any branch moved or
//! consumed a local, the joined state reflects that.

use rustc_hash::FxHashMap;

use crate::base::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Owned,
    Moved(TextRange),
    Consumed,
}

#[derive(Debug, Clone, Default)]
pub struct MoveTable {
    locals: FxHashMap<String, MoveState>,
}

impl MoveTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str) {
        self.locals.insert(name.to_string(), MoveState::Owned);
    }

    pub fn mark_moved(&mut self, name: &str, at: TextRange) {
        self.locals.insert(name.to_string(), MoveState::Moved(at));
    }

    pub fn mark_consumed(&mut self, name: &str) {
        self.locals.insert(name.to_string(), MoveState::Consumed);
    }

    pub fn state(&self, name: &str) -> Option<MoveState> {
        self.locals.get(name).copied()
    }

    /// Upper bound of two branch outcomes for the same local: `Owned`
    /// only if both branches left it `Owned`, otherwise whichever
    /// non-`Owned` state appears (first one found, if they disagree).
    fn join_one(a: Option<MoveState>, b: Option<MoveState>) -> Option<MoveState> {
        match (a, b) {
            (None, x) | (x, None) => x,
            (Some(MoveState::Owned), Some(MoveState::Owned)) => Some(MoveState::Owned),
            (Some(MoveState::Owned), Some(other)) | (Some(other), Some(MoveState::Owned)) => {
                Some(other)
            }
            (Some(first), Some(_)) => Some(first),
        }
    }

    /// Join two branches' end states into one, covering every local
    /// either branch declared.
    pub fn join(a: &MoveTable, b: &MoveTable) -> MoveTable {
        let mut result = MoveTable::new();
        for name in a.locals.keys().chain(b.locals.keys()) {
            if let Some(joined) = Self::join_one(a.state(name), b.state(name)) {
                result.locals.insert(name.clone(), joined);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    fn span(n: u32) -> TextRange {
        TextRange::new(TextSize::from(n), TextSize::from(n + 1))
    }

    #[test]
    fn fresh_local_is_owned() {
        let mut t = MoveTable::new();
        t.declare("a");
        assert_eq!(t.state("a"), Some(MoveState::Owned));
    }

    #[test]
    fn moved_local_is_remembered_with_its_span() {
        let mut t = MoveTable::new();
        t.declare("a");
        t.mark_moved("a", span(5));
        assert_eq!(t.state("a"), Some(MoveState::Moved(span(5))));
    }

    #[test]
    fn join_prefers_moved_over_owned() {
        let mut owned = MoveTable::new();
        owned.declare("a");
        let mut moved = MoveTable::new();
        moved.declare("a");
        moved.mark_moved("a", span(1));

        let joined = MoveTable::join(&owned, &moved);
        assert_eq!(joined.state("a"), Some(MoveState::Moved(span(1))));
    }

    #[test]
    fn join_keeps_owned_when_both_branches_owned() {
        let mut a = MoveTable::new();
        a.declare("x");
        let mut b = MoveTable::new();
        b.declare("x");
        let joined = MoveTable::join(&a, &b);
        assert_eq!(joined.state("x"), Some(MoveState::Owned));
    }
}
