use std::cell::Cell;

/// Marks that a request is outstanding.
///
/// Every controller operation holds a [`BusyGuard`] for the length of its
/// request. The controller is single-threaded and its mutating operations
/// take `&mut self`, so no caller can observe the flag raised between
/// calls. Only the unit test below sees it set.
#[derive(Debug, Default)]
pub struct BusyFlag(Cell<bool>);

impl BusyFlag {
    /// Raises the flag, or returns `None` if it is already raised.
    ///
    /// The flag is lowered when the returned guard is dropped.
    pub fn try_begin(&self) -> Option<BusyGuard<'_>> {
        if self.0.replace(true) {
            None
        } else {
            Some(BusyGuard(&self.0))
        }
    }

    /// Whether the flag is raised.
    pub fn is_busy(&self) -> bool {
        self.0.get()
    }
}

/// Lowers the flag when dropped.
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_guard_drops() {
        let flag = BusyFlag::default();

        let guard = flag.try_begin().unwrap();
        assert!(flag.is_busy());
        assert!(flag.try_begin().is_none());

        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_begin().is_some());
    }
}
