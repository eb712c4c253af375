//! # Typed capability store.
//!
//! Capabilities are bound on new context nodes and found by walking towards the root.
//! Two kinds of binding token exist:
//! - **type token**: the [`TypeId`] of the value (`with_value::<T>` / `value::<T>`);
//!   this is how the supervisor injects its [`Logger`](crate::Logger);
//! - **keyed token**: an arbitrary comparable key (`with_keyed` / `keyed`). Keys of
//!   different types never match, even if they compare "equal" as text.

use std::any::{Any, TypeId};
use std::sync::Arc;

use super::node::Context;

pub(super) struct Binding {
    token: Token,
    value: Arc<dyn Any + Send + Sync>,
}

enum Token {
    Type(TypeId),
    Key(Box<dyn KeyToken>),
}

trait KeyToken: Send + Sync {
    fn matches(&self, probe: &dyn Any) -> bool;
}

impl<K> KeyToken for K
where
    K: PartialEq + Send + Sync + 'static,
{
    fn matches(&self, probe: &dyn Any) -> bool {
        probe.downcast_ref::<K>().is_some_and(|k| k == self)
    }
}

impl Context {
    /// Returns a child node binding `value` under its type.
    ///
    /// The receiver is left untouched; only the returned branch sees the binding.
    pub fn with_value<T>(&self, value: T) -> Context
    where
        T: Send + Sync + 'static,
    {
        self.bind(Binding {
            token: Token::Type(TypeId::of::<T>()),
            value: Arc::new(value),
        })
    }

    /// Returns a child node binding `value` under `key`.
    pub fn with_keyed<K, V>(&self, key: K, value: V) -> Context
    where
        K: PartialEq + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        self.bind(Binding {
            token: Token::Key(Box::new(key)),
            value: Arc::new(value),
        })
    }

    /// Returns the nearest value bound under type `T`.
    ///
    /// Wrap non-`Clone` capabilities in an `Arc` before binding them.
    pub fn value<T>(&self) -> Option<T>
    where
        T: Clone + 'static,
    {
        let id = TypeId::of::<T>();
        self.lookup(|token| matches!(token, Token::Type(t) if *t == id))
            .and_then(|v| v.downcast_ref::<T>().cloned())
    }

    /// Returns the nearest value bound under type `T`, or `T::default()`.
    pub fn get<T>(&self) -> T
    where
        T: Clone + Default + 'static,
    {
        self.value::<T>().unwrap_or_default()
    }

    /// Returns the nearest value bound under `key`, if it has type `V`.
    pub fn keyed<K, V>(&self, key: &K) -> Option<V>
    where
        K: 'static,
        V: Clone + 'static,
    {
        self.lookup(|token| match token {
            Token::Key(k) => k.matches(key),
            Token::Type(_) => false,
        })
        .and_then(|v| v.downcast_ref::<V>().cloned())
    }

    fn lookup(&self, hit: impl Fn(&Token) -> bool) -> Option<&(dyn Any + Send + Sync)> {
        let mut node = Some(self);
        while let Some(ctx) = node {
            if let Some(binding) = &ctx.inner.binding {
                if hit(&binding.token) {
                    return Some(binding.value.as_ref());
                }
            }
            node = ctx.inner.parent.as_ref();
        }
        None
    }
}

/// Binds `value` under its type on a new node derived from `ctx`.
pub fn set<T>(ctx: &Context, value: T) -> Context
where
    T: Send + Sync + 'static,
{
    ctx.with_value(value)
}

/// Returns the value bound under type `T`, or `T::default()` when nothing is bound.
///
/// # Example
/// ```
/// use servisor::{Context, context};
///
/// #[derive(Clone, Default, Debug, PartialEq)]
/// struct Region(&'static str);
///
/// let ctx = Context::background();
/// assert_eq!(context::get::<Region>(&ctx), Region(""));
///
/// let ctx = context::set(&ctx, Region("eu-west"));
/// assert_eq!(context::get::<Region>(&ctx), Region("eu-west"));
/// ```
pub fn get<T>(ctx: &Context) -> T
where
    T: Clone + Default + 'static,
{
    ctx.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Port(u16);

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Host(String);

    #[test]
    fn test_get_returns_set_value() {
        let ctx = set(&Context::background(), Port(8080));
        assert_eq!(get::<Port>(&ctx), Port(8080));
    }

    #[test]
    fn test_unbound_type_yields_default() {
        let ctx = set(&Context::background(), Port(1));
        assert_eq!(get::<Host>(&ctx), Host::default());
        assert_eq!(ctx.value::<Host>(), None);
        assert_eq!(get::<u64>(&ctx), 0);
    }

    #[test]
    fn test_lookup_walks_ancestors() {
        let ctx = Context::background().with_value(Port(80));
        let (scope, _cancel) = ctx.with_cancel();
        let leaf = scope.with_value(Host("db".into()));
        assert_eq!(leaf.value::<Port>(), Some(Port(80)));
        assert_eq!(leaf.value::<Host>(), Some(Host("db".into())));
    }

    #[test]
    fn test_shadowing_is_branch_local() {
        let parent = Context::background().with_value(Port(80));
        let left = parent.with_value(Port(81));
        let right = parent.with_value(Host("right".into()));

        assert_eq!(left.value::<Port>(), Some(Port(81)));
        assert_eq!(right.value::<Port>(), Some(Port(80)));
        assert_eq!(parent.value::<Port>(), Some(Port(80)));
        assert_eq!(parent.value::<Host>(), None);
    }

    #[test]
    fn test_keyed_values_match_on_type_and_equality() {
        #[derive(PartialEq)]
        struct Tag(&'static str);

        let ctx = Context::background()
            .with_keyed("key", "from str".to_string())
            .with_keyed(Tag("key"), 42u32);

        assert_eq!(ctx.keyed::<_, String>(&"key"), Some("from str".to_string()));
        assert_eq!(ctx.keyed::<_, u32>(&Tag("key")), Some(42));
        assert_eq!(ctx.keyed::<_, u32>(&Tag("other")), None);
        // Wrong value type behaves like an unbound key.
        assert_eq!(ctx.keyed::<_, u64>(&Tag("key")), None);
    }

    #[test]
    fn test_keyed_and_typed_bindings_do_not_mix() {
        let ctx = Context::background().with_keyed(7u16, Port(7));
        assert_eq!(ctx.value::<Port>(), None);
        assert_eq!(ctx.keyed::<u16, Port>(&7), Some(Port(7)));
    }
}
