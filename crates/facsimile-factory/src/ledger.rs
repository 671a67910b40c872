//! Per-call recursion depth tracking
//!
//! The ledger counts how many times each class is currently being
//! manufactured on the active path of one top-level call. The first entry of a
//! class is depth 0; descending into a class is allowed while its depth does
//! not exceed the configured maximum, so a self-referential class with maximum
//! depth `d` is re-entered `d + 1` times below its root instance.
//!
//! ## Features
//!
//! - **Call-scoped**: a fresh ledger per top-level call, never shared across threads
//! - **Keyed by class**: unrelated branches of the same class share one counter
//! - **RAII**: automatic decrement via `DepthGuard`

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use facsimile_types::ClassId;

/// Active entry counts per class.
#[derive(Debug, Clone, Default)]
pub struct DepthLedger {
	entries: Rc<RefCell<HashMap<ClassId, usize>>>,
}

impl DepthLedger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current depth of `class`, or `None` when it is not being manufactured.
	pub fn depth(&self, class: ClassId) -> Option<usize> {
		self.entries
			.borrow()
			.get(&class)
			.and_then(|count| count.checked_sub(1))
	}

	/// Returns true if `class` may be entered once more under `max_depth`.
	pub fn allows(&self, class: ClassId, max_depth: usize) -> bool {
		self.depth(class).is_none_or(|depth| depth <= max_depth)
	}

	/// Records an entry into `class` until the returned guard is dropped.
	pub fn enter(&self, class: ClassId) -> DepthGuard {
		*self.entries.borrow_mut().entry(class).or_insert(0) += 1;
		DepthGuard {
			entries: Rc::clone(&self.entries),
			class,
		}
	}

	/// Enters `class` if [`allows`](Self::allows) permits it.
	pub fn try_enter(&self, class: ClassId, max_depth: usize) -> Option<DepthGuard> {
		self.allows(class, max_depth).then(|| self.enter(class))
	}
}

/// RAII guard: decrements the entry count of its class on drop.
#[derive(Debug)]
pub struct DepthGuard {
	entries: Rc<RefCell<HashMap<ClassId, usize>>>,
	class: ClassId,
}

impl Drop for DepthGuard {
	fn drop(&mut self) {
		let mut entries = self.entries.borrow_mut();
		if let Some(count) = entries.get_mut(&self.class) {
			*count = count.saturating_sub(1);
			if *count == 0 {
				entries.remove(&self.class);
			}
		}
	}
}
