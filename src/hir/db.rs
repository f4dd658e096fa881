//! Salsa-backed incremental queries over a single file's text: parsing
//! and type-checking are memoized per [`FileText`] input and recomputed
//! automatically only when that input's text actually changes.

use crate::base::FileId;
use crate::hir::check::Checker;
use crate::hir::diagnostics::Diagnostic;
use crate::parser::{self, Module, SyntaxError};
use crate::resolve::ModuleId;

/// Input: the raw text of one file. Set this when a file is first loaded
/// or edited; every tracked query below is keyed off it.
#[salsa::input]
pub struct FileText {
    pub file: FileId,
    #[return_ref]
    pub text: String,
}

#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {
    fn salsa_event(&self, _event: &dyn Fn() -> salsa::Event) {}
}

impl RootDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseResult {
    pub module: Module,
    pub errors: Vec<SyntaxError>,
}

// Module/SyntaxError derive only PartialEq (their variants never hold
// floats), so equality really is total; Salsa just needs the marker.
impl Eq for ParseResult {}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[salsa::tracked]
pub fn parse_file(db: &dyn salsa::Database, file_text: FileText) -> ParseResult {
    let text = file_text.text(db);
    let (module, errors) = parser::parse(text);
    ParseResult { module, errors }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses (via [`parse_file`]) then type-checks the result. Syntax errors
/// from a malformed file are not re-reported here; callers combine
/// `parse_file(..).errors` with `check_file(..).diagnostics`.
#[salsa::tracked]
pub fn check_file(db: &dyn salsa::Database, file_text: FileText) -> CheckResult {
    let parsed = parse_file(db, file_text);
    let mut checker = Checker::new();
    checker.check_module(&parsed.module, ModuleId::default());
    CheckResult {
        diagnostics: checker.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_id() -> FileId {
        let mut table = crate::base::FileTable::new();
        table.intern(std::path::Path::new("mem.dsy"))
    }

    #[test]
    fn database_creation() {
        let _db = RootDatabase::new();
    }

    #[test]
    fn parse_file_is_memoized() {
        let db = RootDatabase::new();
        let text = FileText::new(&db, file_id(), "fn main() -> int:\n  return 0\n".to_string());
        let first = parse_file(&db, text);
        let second = parse_file(&db, text);
        assert_eq!(first, second);
        assert!(!first.has_errors());
    }

    #[test]
    fn check_file_reports_type_errors() {
        let db = RootDatabase::new();
        let text = FileText::new(&db, file_id(), "fn f() -> int:\n  return true\n".to_string());
        let result = check_file(&db, text);
        assert!(!result.diagnostics.is_empty());
    }

    #[test]
    fn check_file_is_clean_for_well_typed_input() {
        let db = RootDatabase::new();
        let text = FileText::new(&db, file_id(), "fn add(a: int, b: int) -> int:\n  return a + b\n".to_string());
        let result = check_file(&db, text);
        assert!(result.diagnostics.is_empty());
    }
}
