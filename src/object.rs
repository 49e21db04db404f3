//! Proxy objects over engine handles.
//!
//! A handle is an opaque integer with meaning only inside the session that
//! produced it. [`IndigoObject`] pins the handle to that session: every
//! operation re-activates the owning session first, and a freed handle is
//! replaced by the disposed sentinel so it cannot be silently reused.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::error::Result;
use crate::session::SessionState;

/// Sentinel handle of a disposed object.
pub const DISPOSED_HANDLE: i32 = -1;

/// Handle plus owning session; shared so a derived object can keep a
/// non-owning reference to its parent.
struct ObjectState {
    session: Arc<SessionState>,
    handle: AtomicI32,
}

/// A managed engine object: molecule, query, matcher, buffer writer, saver.
///
/// Ownership is manual. Objects are created by the session-level calls on
/// [`crate::Indigo`] and freed by [`dispose`](Self::dispose); nothing is
/// collected automatically. Identity never changes after creation except
/// the handle's one-way transition to [`DISPOSED_HANDLE`].
pub struct IndigoObject {
    state: Arc<ObjectState>,
    parent: Option<Arc<ObjectState>>,
}

impl std::fmt::Debug for IndigoObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndigoObject")
            .field("handle", &self.id())
            .field("parent_handle", &self.parent_id())
            .finish()
    }
}

impl IndigoObject {
    pub(crate) fn new(session: Arc<SessionState>, handle: i32) -> Self {
        Self {
            state: Arc::new(ObjectState {
                session,
                handle: AtomicI32::new(handle),
            }),
            parent: None,
        }
    }

    /// A derived object (e.g. a matcher) tied to the target it was built
    /// from. The tie is non-owning: disposing either side never frees the
    /// other.
    pub(crate) fn with_parent(session: Arc<SessionState>, handle: i32, parent: &IndigoObject) -> Self {
        Self {
            state: Arc::new(ObjectState {
                session,
                handle: AtomicI32::new(handle),
            }),
            parent: Some(parent.state.clone()),
        }
    }

    /// The engine handle, or [`DISPOSED_HANDLE`] once disposed.
    pub fn id(&self) -> i32 {
        self.state.handle.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.id() < 0
    }

    /// Current handle of the parent this object was derived from, if any.
    pub fn parent_id(&self) -> Option<i32> {
        self.parent.as_ref().map(|p| p.handle.load(Ordering::SeqCst))
    }

    /// Frees the handle in the owning session.
    ///
    /// Idempotent: the handle goes to the disposed sentinel on the first
    /// call and stays there. The native free is best-effort; it is skipped
    /// entirely once the session has been released, and its status is not
    /// consulted.
    pub fn dispose(&self) {
        let handle = self.state.handle.swap(DISPOSED_HANDLE, Ordering::SeqCst);
        if handle >= 0 && !self.state.session.is_released() {
            self.state.session.with_active(|api| {
                api.free(handle);
            });
        }
    }

    /// Duplicates the handle into a fresh object with no parent reference.
    /// The source object is left untouched.
    pub fn try_clone(&self) -> Result<IndigoObject> {
        let handle = self.id();
        let cloned = self
            .state
            .session
            .with_active(|api| self.state.session.check_result(api.clone_object(handle)))?;
        Ok(IndigoObject::new(self.state.session.clone(), cloned))
    }
}
