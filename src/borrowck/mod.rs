//! Lexical borrow checker: move-by-default semantics and per-region view
//! aliasing, enforced after type checking and before IR lowering.

pub mod check;
pub mod region;
pub mod state;

pub use check::BorrowChecker;
pub use region::{Interval, OwnedView, RegionState};
pub use state::{MoveState, MoveTable};
