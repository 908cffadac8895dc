//! Constant-time tracking of nested `IF` / `NOT_IF` / `ELSE` / `END_IF` scopes
//!
//! Instead of a stack of booleans, only the depth and the index of the
//! outermost false scope are kept. Everything nested inside a false scope is
//! skipped no matter what its own condition is, so the outermost false scope
//! is all that decides whether execution is live.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeCondition {
    scope_count: usize,
    /// Index of the outermost scope whose condition is false
    false_idx: Option<usize>,
}

impl ScopeCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.scope_count == 0
    }

    /// Whether every enclosing scope is true
    pub fn is_true(&self) -> bool {
        self.false_idx.is_none()
    }

    /// Enter a scope
    pub fn push(&mut self, cond: bool) {
        if !cond && self.false_idx.is_none() {
            self.false_idx = Some(self.scope_count);
        }
        self.scope_count += 1;
    }

    /// Leave the innermost scope
    ///
    /// # Panics
    ///
    /// If there is no open scope.
    pub fn pop(&mut self) {
        assert!(!self.is_empty(), "ScopeCondition::pop called without an open scope");
        self.scope_count -= 1;
        if self.false_idx == Some(self.scope_count) {
            self.false_idx = None;
        }
    }

    /// Flip the innermost scope, as done by `ELSE`.
    ///
    /// Has no visible effect while an outer scope is false.
    pub fn try_toggle(&mut self) {
        if self.is_empty() {
            return;
        }
        let top = self.scope_count - 1;
        match self.false_idx {
            None => self.false_idx = Some(top),
            Some(idx) if idx == top => self.false_idx = None,
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_if_else() {
        // IF true { A } ELSE { B } END_IF
        let mut sc = ScopeCondition::new();
        sc.push(true);
        assert!(sc.is_true());
        sc.try_toggle();
        assert!(!sc.is_true());
        sc.pop();
        assert!(sc.is_true());
        assert!(sc.is_empty());

        // IF false { A } ELSE { B } END_IF
        sc.push(false);
        assert!(!sc.is_true());
        sc.try_toggle();
        assert!(sc.is_true());
        sc.pop();
        assert!(sc.is_true());
    }

    #[test]
    fn test_nested_false_outer_stays_false() {
        // IF false { IF true { A } ELSE { B } END_IF } END_IF
        let mut sc = ScopeCondition::new();
        sc.push(false);
        sc.push(true);
        assert!(!sc.is_true());
        sc.try_toggle();
        assert!(!sc.is_true());
        sc.pop();
        assert!(!sc.is_true());
        sc.pop();
        assert!(sc.is_true());
    }

    #[test]
    fn test_inner_false_recovers() {
        let mut sc = ScopeCondition::new();
        sc.push(true);
        sc.push(false);
        assert!(!sc.is_true());
        sc.pop();
        assert!(sc.is_true());
        sc.pop();
        assert!(sc.is_empty());
    }

    #[test]
    fn test_repeated_else_keeps_toggling() {
        let mut sc = ScopeCondition::new();
        sc.push(true);
        sc.try_toggle();
        sc.try_toggle();
        assert!(sc.is_true());
    }

    #[test]
    #[should_panic]
    fn test_pop_empty_panics() {
        ScopeCondition::new().pop();
    }
}
