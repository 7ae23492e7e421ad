//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	session::{SessionFuture, SessionRecord, SessionStore},
};

type SessionMap = Arc<RwLock<HashMap<SessionId, SessionRecord>>>;

/// Session backend that keeps records in-process.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionMap);
impl MemorySessionStore {
	/// Returns the number of stored sessions.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no session has been stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Returns a snapshot of every stored session.
	pub fn snapshot(&self) -> Vec<(SessionId, SessionRecord)> {
		self.0.read().iter().map(|(id, record)| (id.clone(), record.clone())).collect()
	}
}
impl SessionStore for MemorySessionStore {
	fn save<'a>(&'a self, id: &'a SessionId, record: SessionRecord) -> SessionFuture<'a, ()> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move {
			map.write().insert(id, record);

			Ok(())
		})
	}

	fn load<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, Option<SessionRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(id).cloned()) })
	}
}
