use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use courier_core::conversation::state::ConversationState;

/// Per-thread conversation state, sharded by caller-supplied thread id.
///
/// Turn processing is read-modify-write: a turn snapshots its thread's
/// state, works on the copy, and commits the result. Hosts that deliver
/// multiple concurrent requests for the same thread must serialize them —
/// interleaved turns would race on the commit (single-writer discipline).
#[derive(Clone, Default)]
pub struct SessionStore {
    threads: Arc<Mutex<HashMap<String, ConversationState>>>,
}

impl SessionStore {
    pub fn snapshot(&self, thread_id: &str) -> ConversationState {
        match self.threads.lock() {
            Ok(threads) => threads.get(thread_id).cloned().unwrap_or_default(),
            Err(poisoned) => poisoned.into_inner().get(thread_id).cloned().unwrap_or_default(),
        }
    }

    pub fn commit(&self, thread_id: &str, state: ConversationState) {
        match self.threads.lock() {
            Ok(mut threads) => {
                threads.insert(thread_id.to_string(), state);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(thread_id.to_string(), state);
            }
        }
    }

    /// Destroys a thread's state entirely (the "clear chat" action).
    pub fn clear(&self, thread_id: &str) {
        match self.threads.lock() {
            Ok(mut threads) => {
                threads.remove(thread_id);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(thread_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStore;

    #[test]
    fn threads_are_isolated_from_each_other() {
        let store = SessionStore::default();

        let mut a = store.snapshot("thread-a");
        a.push_user("hello from a");
        store.commit("thread-a", a);

        let b = store.snapshot("thread-b");
        assert!(b.messages.is_empty());
        assert_eq!(store.snapshot("thread-a").messages.len(), 1);
    }

    #[test]
    fn clear_destroys_thread_state() {
        let store = SessionStore::default();
        let mut state = store.snapshot("thread");
        state.push_user("hi");
        store.commit("thread", state);

        store.clear("thread");
        assert!(store.snapshot("thread").messages.is_empty());
    }

    #[test]
    fn commit_overwrites_previous_snapshot() {
        let store = SessionStore::default();
        let mut first = store.snapshot("t");
        first.push_user("one");
        store.commit("t", first);

        let mut second = store.snapshot("t");
        second.push_user("two");
        store.commit("t", second);

        assert_eq!(store.snapshot("t").messages.len(), 2);
    }
}
