use std::time::Duration;

/// A cancellable one-shot deadline, polled from the host's tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deferred {
	deadline: Option<Duration>,
}

impl Deferred {
	/// (Re)arms the deadline at `now + delay`.
	pub fn schedule(&mut self, now: Duration, delay: Duration) {
		self.deadline = Some(now.saturating_add(delay));
	}

	pub fn cancel(&mut self) -> bool {
		self.deadline.take().is_some()
	}

	pub fn is_pending(&self) -> bool {
		self.deadline.is_some()
	}

	/// Fires at most once per schedule.
	pub fn poll(&mut self, now: Duration) -> bool {
		match self.deadline {
			Some(deadline) if now >= deadline => {
				self.deadline = None;
				true
			}
			_ => false,
		}
	}
}
