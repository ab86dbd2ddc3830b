//! Borrow and lifetime enforcement.
//!
//! For every variable the analyzer tracks an aggregate borrow state:
//! either any number of shared borrows or exactly one mutable borrow is
//! live at a time, never both. Borrows are keyed to the lifetime id of
//! the scope they were taken in and released by a sweep when that scope
//! dies. Individual reference identities are not tracked; shared borrows
//! commute and a mutable borrow excludes everything else, so a counter
//! and a tag on the referent suffice.

use crate::diagnostics::DiagnosticKind;

use super::symbol_table::{BorrowState, ScopeStack};
use super::types::TypeInfo;
use super::SemanticAnalyzer;

impl ScopeStack {
    /// Release sweep for a dying scope. Walks every symbol still reachable
    /// through the live stack, not just the dying scope's own table: a
    /// borrow may have been taken against a symbol declared in an
    /// ancestor scope.
    pub fn release_borrows(&mut self, dying_lifetime_id: usize) {
        for scope in self.scopes_mut() {
            for symbol in scope.symbols_mut() {
                if symbol.borrow_lifetime_id != Some(dying_lifetime_id) {
                    continue;
                }
                match symbol.borrow_state {
                    BorrowState::Mutable => {
                        symbol.borrow_state = BorrowState::None;
                    }
                    BorrowState::Shared => {
                        symbol.shared_borrow_count -= 1;
                        if symbol.shared_borrow_count == 0 {
                            symbol.borrow_state = BorrowState::None;
                        }
                    }
                    BorrowState::None => {}
                }
                symbol.borrow_lifetime_id = None;
            }
        }
    }
}

impl SemanticAnalyzer {
    /// Applies the borrow rules for `&name` / `&mut name` evaluated in the
    /// current scope and returns the resulting reference type, or the
    /// unknown sentinel after reporting a violation.
    pub(crate) fn check_borrow(
        &mut self,
        name: &str,
        mutable: bool,
        line: usize,
        column: usize,
    ) -> TypeInfo {
        let current_lifetime_id = self.scopes.current_lifetime_id();

        let Some(symbol) = self.scopes.lookup(name) else {
            self.report(
                DiagnosticKind::UndefinedVariable,
                format!("Undefined variable: {}", name),
                line,
                column,
            );
            return TypeInfo::unknown();
        };

        let borrow_state = symbol.borrow_state;
        let referent_mutable = symbol.is_mutable;
        let referent_lifetime_id = symbol.lifetime_id;
        let referent_type = symbol.ty.clone();

        if mutable {
            if borrow_state != BorrowState::None {
                self.report(
                    DiagnosticKind::MemorySafety,
                    format!("cannot borrow '{}' as mutable because it is already borrowed", name),
                    line,
                    column,
                );
                return TypeInfo::unknown();
            }
            if !referent_mutable {
                self.report(
                    DiagnosticKind::ImmutableAssignment,
                    format!("cannot mutably borrow immutable variable '{}'", name),
                    line,
                    column,
                );
                return TypeInfo::unknown();
            }
        } else if borrow_state == BorrowState::Mutable {
            self.report(
                DiagnosticKind::MemorySafety,
                format!(
                    "cannot borrow '{}' as immutable because it is already borrowed as mutable",
                    name
                ),
                line,
                column,
            );
            return TypeInfo::unknown();
        }

        // The borrow lives in the current scope; a referent declared in a
        // younger scope than the borrow would be dropped first.
        if referent_lifetime_id > current_lifetime_id {
            self.report(
                DiagnosticKind::LifetimeViolation,
                "borrowed value does not live long enough",
                line,
                column,
            );
            return TypeInfo::unknown();
        }

        if let Some(symbol) = self.scopes.lookup_mut(name) {
            if mutable {
                symbol.borrow_state = BorrowState::Mutable;
                symbol.borrow_lifetime_id = Some(current_lifetime_id);
            } else {
                symbol.shared_borrow_count += 1;
                if symbol.borrow_state == BorrowState::None {
                    symbol.borrow_state = BorrowState::Shared;
                    symbol.borrow_lifetime_id = Some(current_lifetime_id);
                }
            }
        }

        TypeInfo::Reference {
            mutable,
            pointed_to: Box::new(referent_type),
            lifetime_id: current_lifetime_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::symbol_table::{Symbol, SymbolKind};
    use crate::semantic::types::BuiltinType;

    fn analyzer_with_variable(name: &str, mutable: bool) -> SemanticAnalyzer {
        let mut analyzer = SemanticAnalyzer::new();
        let mut symbol = Symbol::new(
            name,
            SymbolKind::Variable,
            TypeInfo::Builtin(BuiltinType::Int),
            1,
            1,
        );
        symbol.is_mutable = mutable;
        symbol.is_initialized = true;
        assert!(analyzer.scopes.add(symbol));
        analyzer
    }

    #[test]
    fn shared_then_shared_increments_count() {
        let mut analyzer = analyzer_with_variable("x", true);
        analyzer.check_borrow("x", false, 1, 1);
        analyzer.check_borrow("x", false, 1, 5);

        assert_eq!(analyzer.error_count(), 0);
        let symbol = analyzer.scopes.lookup("x").expect("symbol should exist");
        assert_eq!(symbol.borrow_state, BorrowState::Shared);
        assert_eq!(symbol.shared_borrow_count, 2);
    }

    #[test]
    fn shared_then_mutable_is_memory_safety() {
        let mut analyzer = analyzer_with_variable("x", true);
        analyzer.check_borrow("x", false, 1, 1);
        let result = analyzer.check_borrow("x", true, 1, 5);

        assert!(result.is_unknown());
        assert_eq!(analyzer.diagnostics()[0].kind, DiagnosticKind::MemorySafety);
    }

    #[test]
    fn mutable_then_shared_is_memory_safety() {
        let mut analyzer = analyzer_with_variable("x", true);
        analyzer.check_borrow("x", true, 1, 1);
        let result = analyzer.check_borrow("x", false, 1, 5);

        assert!(result.is_unknown());
        assert_eq!(analyzer.diagnostics()[0].kind, DiagnosticKind::MemorySafety);
    }

    #[test]
    fn mutable_then_mutable_is_memory_safety() {
        let mut analyzer = analyzer_with_variable("x", true);
        analyzer.check_borrow("x", true, 1, 1);
        let result = analyzer.check_borrow("x", true, 1, 5);

        assert!(result.is_unknown());
        assert_eq!(analyzer.diagnostics()[0].kind, DiagnosticKind::MemorySafety);
    }

    #[test]
    fn mutable_borrow_of_immutable_is_rejected_even_when_unborrowed() {
        let mut analyzer = analyzer_with_variable("x", false);
        let result = analyzer.check_borrow("x", true, 1, 1);

        assert!(result.is_unknown());
        assert_eq!(
            analyzer.diagnostics()[0].kind,
            DiagnosticKind::ImmutableAssignment
        );
        assert_eq!(
            analyzer.diagnostics()[0].message,
            "cannot mutably borrow immutable variable 'x'"
        );
    }

    #[test]
    fn borrow_type_carries_current_scope_lifetime() {
        let mut analyzer = analyzer_with_variable("x", true);
        analyzer.scopes.push_scope();
        let inner_lifetime = analyzer.scopes.current_lifetime_id();
        let result = analyzer.check_borrow("x", false, 2, 1);

        match result {
            TypeInfo::Reference { lifetime_id, mutable, .. } => {
                assert_eq!(lifetime_id, inner_lifetime);
                assert!(!mutable);
            }
            other => panic!("expected reference type, got {:?}", other),
        }
    }

    #[test]
    fn scope_exit_releases_mutable_borrow() {
        let mut analyzer = analyzer_with_variable("x", true);
        analyzer.scopes.push_scope();
        analyzer.check_borrow("x", true, 2, 1);
        analyzer.scopes.pop_scope();

        let symbol = analyzer.scopes.lookup("x").expect("symbol should exist");
        assert_eq!(symbol.borrow_state, BorrowState::None);
        assert_eq!(symbol.borrow_lifetime_id, None);

        // Released, so a fresh mutable borrow is legal again.
        analyzer.check_borrow("x", true, 3, 1);
        assert_eq!(analyzer.error_count(), 0);
    }

    #[test]
    fn scope_exit_releases_shared_borrow_taken_in_inner_scope() {
        let mut analyzer = analyzer_with_variable("x", true);
        analyzer.scopes.push_scope();
        analyzer.check_borrow("x", false, 2, 1);
        analyzer.scopes.pop_scope();

        let symbol = analyzer.scopes.lookup("x").expect("symbol should exist");
        assert_eq!(symbol.borrow_state, BorrowState::None);
        assert_eq!(symbol.shared_borrow_count, 0);
    }

    #[test]
    fn sweep_only_touches_borrows_of_the_dying_scope() {
        let mut analyzer = analyzer_with_variable("x", true);
        // Borrow in the global scope, then push and pop an unrelated scope.
        analyzer.check_borrow("x", false, 1, 1);
        analyzer.scopes.push_scope();
        analyzer.scopes.pop_scope();

        let symbol = analyzer.scopes.lookup("x").expect("symbol should exist");
        assert_eq!(symbol.borrow_state, BorrowState::Shared);
        assert_eq!(symbol.shared_borrow_count, 1);
    }

    #[test]
    fn borrow_of_undefined_variable_reports_undefined() {
        let mut analyzer = SemanticAnalyzer::new();
        let result = analyzer.check_borrow("ghost", false, 1, 1);

        assert!(result.is_unknown());
        assert_eq!(
            analyzer.diagnostics()[0].kind,
            DiagnosticKind::UndefinedVariable
        );
    }
}
