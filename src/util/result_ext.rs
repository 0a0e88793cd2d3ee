pub trait ResultExt<T, E> {
	/// Logs the error, if any, and discards it.
	fn ok_or_log(self) -> Option<T>
	where
		E: std::fmt::Display;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
	fn ok_or_log(self) -> Option<T>
	where
		E: std::fmt::Display,
	{
		self.inspect_err(|err| tracing::error!(%err)).ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ok_or_log() {
		assert_eq!(Ok::<_, String>(3).ok_or_log(), Some(3));
		assert_eq!(Err::<i32, _>("bad".to_owned()).ok_or_log(), None);
	}
}
