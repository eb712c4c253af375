//! # Context nodes, cancel scopes, and termination causes.
//!
//! Every [`Context`] wraps an immutable `Node`. A cancel scope owns a child
//! [`CancellationToken`] of its parent, so cancelling a scope is broadcast to every
//! descendant; a value node shares its parent's token and only adds a binding.
//!
//! Deadlines are not driven by timers: each node stores its effective deadline
//! (the earliest along the ancestry) and both [`Context::done`] and [`Context::err`]
//! compare against it.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use super::values::Binding;

/// Why a context ended.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cause {
    /// A [`CancelHandle`] of this scope or an ancestor was used.
    #[error("context canceled")]
    Canceled,
    /// The earliest deadline along the ancestry passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

pub(super) struct Node {
    pub(super) parent: Option<Context>,
    pub(super) binding: Option<Binding>,
    token: CancellationToken,
    /// Cause and the instant it took effect.
    cause: OnceLock<(Cause, Instant)>,
    deadline: Option<Instant>,
}

/// Cancellable, deadline-aware execution context carrying typed capabilities.
///
/// Cloning is cheap (`Arc`); clones observe the same node.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use servisor::{Cause, Context};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (ctx, cancel) = Context::background().with_timeout(Duration::from_secs(30));
/// assert!(ctx.err().is_none());
///
/// cancel.cancel();
/// assert_eq!(ctx.done().await, Cause::Canceled);
/// # }
/// ```
#[derive(Clone)]
pub struct Context {
    pub(super) inner: Arc<Node>,
}

impl Context {
    /// Returns a root context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Node {
                parent: None,
                binding: None,
                token: CancellationToken::new(),
                cause: OnceLock::new(),
                deadline: None,
            }),
        }
    }

    /// Derives a cancel scope; the returned handle cancels it and its descendants.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        self.scope(self.inner.deadline)
    }

    /// Derives a cancel scope that also ends at `at`.
    ///
    /// A later deadline than the parent's has no effect: the parent's wins.
    pub fn with_deadline(&self, at: Instant) -> (Context, CancelHandle) {
        let effective = match self.inner.deadline {
            Some(inherited) if inherited <= at => inherited,
            _ => at,
        };
        self.scope(Some(effective))
    }

    /// Derives a cancel scope that ends `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns the effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns why the context ended, or `None` while it is still live.
    ///
    /// The earliest ending along the ancestry wins: an own deadline that passed before
    /// an ancestor was canceled reports [`Cause::DeadlineExceeded`]. Once a cause is
    /// reported it never changes for this node.
    pub fn err(&self) -> Option<Cause> {
        if let Some((cause, _)) = self.inner.cause.get() {
            return Some(*cause);
        }

        let now = Instant::now();
        let mut earliest = self
            .inner
            .deadline
            .filter(|at| *at <= now)
            .map(|at| (Cause::DeadlineExceeded, at));

        let mut ancestor = self.inner.parent.as_ref();
        while let Some(node) = ancestor {
            if let Some(&(cause, at)) = node.inner.cause.get() {
                if earliest.is_none_or(|(_, first)| at < first) {
                    earliest = Some((cause, at));
                }
            }
            ancestor = node.inner.parent.as_ref();
        }

        earliest.map(|ended| self.inner.cause.get_or_init(|| ended).0)
    }

    /// Non-blocking check: `true` once [`err`](Self::err) reports a cause.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Completes when the context ends and returns the cause.
    ///
    /// Cancel-safe; every waiter observes completion, in no particular order.
    pub async fn done(&self) -> Cause {
        match self.inner.deadline {
            Some(at) => {
                tokio::select! {
                    _ = self.inner.token.cancelled() => {}
                    _ = time::sleep_until(at) => {}
                }
            }
            None => self.inner.token.cancelled().await,
        }
        self.err().unwrap_or(Cause::Canceled)
    }

    pub(super) fn bind(&self, binding: Binding) -> Context {
        Context {
            inner: Arc::new(Node {
                parent: Some(self.clone()),
                binding: Some(binding),
                token: self.inner.token.clone(),
                cause: OnceLock::new(),
                deadline: self.inner.deadline,
            }),
        }
    }

    fn scope(&self, deadline: Option<Instant>) -> (Context, CancelHandle) {
        let node = Arc::new(Node {
            parent: Some(self.clone()),
            binding: None,
            token: self.inner.token.child_token(),
            cause: OnceLock::new(),
            deadline,
        });
        let handle = CancelHandle {
            node: Arc::clone(&node),
        };
        (Context { inner: node }, handle)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.inner.deadline)
            .field("err", &self.err())
            .field("bound", &self.inner.binding.is_some())
            .finish()
    }
}

/// Cancel control of one scope, returned by [`Context::with_cancel`] and friends.
///
/// Dropping the handle does **not** cancel the scope.
#[derive(Clone)]
pub struct CancelHandle {
    node: Arc<Node>,
}

impl CancelHandle {
    /// Cancels the scope and all of its descendants. Idempotent.
    ///
    /// A scope that already ended (own deadline or an ancestor) keeps its cause.
    pub fn cancel(&self) {
        let scope = Context {
            inner: Arc::clone(&self.node),
        };
        if scope.err().is_none() {
            let _ = self.node.cause.set((Cause::Canceled, Instant::now()));
        }
        self.node.token.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called on this scope or an ancestor.
    pub fn is_cancelled(&self) -> bool {
        self.node.token.is_cancelled()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
