//! Ordered broadcast over many delegates
//!
//! A [`MulticastDelegate`] keeps delegates in registration order and calls
//! every one of them with the same arguments. Return values are dropped.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use multicast_delegate::{bind_free, bind_member, MulticastDelegate};
//!
//! struct Logger {
//!     lines: RefCell<Vec<String>>,
//! }
//!
//! impl Logger {
//!     fn record(&self, value: i32) {
//!         self.lines.borrow_mut().push(format!("value={}", value));
//!     }
//! }
//!
//! fn ignore(_value: i32) {}
//!
//! let logger = Rc::new(Logger { lines: RefCell::new(Vec::new()) });
//!
//! let mut on_value = MulticastDelegate::<(i32,)>::new();
//! on_value += bind_member(Logger::record, &logger);
//! on_value += bind_free(ignore);
//!
//! assert_eq!(on_value.call(7), Ok(2));
//! assert_eq!(*logger.lines.borrow(), vec!["value=7".to_string()]);
//!
//! on_value -= bind_member(Logger::record, &logger);
//! assert_eq!(on_value.len(), 1);
//! ```

use std::fmt;
use std::ops::{AddAssign, SubAssign};

use crate::config::{BroadcastConfig, DispatchPolicy};
use crate::delegate::Delegate;
use crate::error::{DelegateError, Result};

/// Ordered list of delegates invoked together
///
/// Duplicates are allowed and each copy runs separately. Invocation order
/// is always the registration order at the moment the call starts.
pub struct MulticastDelegate<Args, R = ()> {
    entries: Vec<Delegate<Args, R>>,
    config: BroadcastConfig,
}

impl<Args, R> MulticastDelegate<Args, R> {
    /// Create an empty list with the default configuration
    pub fn new() -> Self {
        Self::with_config(BroadcastConfig::default())
    }

    /// Create an empty list with the given configuration
    pub fn with_config(config: BroadcastConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
        }
    }

    /// Dispatch configuration
    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Append a delegate to the end of the list
    pub fn register(&mut self, delegate: Delegate<Args, R>) {
        tracing::trace!(
            binding = ?delegate.binding(),
            position = self.entries.len(),
            "Registering delegate"
        );
        self.entries.push(delegate);
    }

    /// Remove the first entry equal to `delegate`
    ///
    /// Returns whether an entry was removed. Later duplicates stay in place.
    pub fn unregister(&mut self, delegate: &Delegate<Args, R>) -> bool {
        match self.entries.iter().position(|entry| entry == delegate) {
            Some(position) => {
                self.entries.remove(position);
                tracing::trace!(binding = ?delegate.binding(), position, "Unregistered delegate");
                true
            }
            None => {
                tracing::trace!(binding = ?delegate.binding(), "Delegate not registered, nothing removed");
                false
            }
        }
    }

    /// Whether an entry equal to `delegate` is registered
    pub fn contains(&self, delegate: &Delegate<Args, R>) -> bool {
        self.entries.contains(delegate)
    }

    /// Number of registered entries, duplicates included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Delegate<Args, R>> {
        self.entries.iter()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove entries whose receiver has been dropped
    ///
    /// Returns the number of entries removed.
    pub fn prune_stale(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(Delegate::is_alive);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "Pruned stale delegates");
        }
        removed
    }

    fn first_stale(&self) -> Option<(usize, &Delegate<Args, R>)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| !entry.is_alive())
    }
}

impl<Args: Clone, R> MulticastDelegate<Args, R> {
    /// Call every entry, in order, with a copy of `args`
    ///
    /// Returns the number of entries that ran. An empty list does nothing
    /// and returns `Ok(0)`. What happens when an entry cannot run is
    /// controlled by [`BroadcastConfig`].
    ///
    /// Failures are always wrapped in [`DelegateError::Broadcast`] with the
    /// failing position, even for a single-entry list, so the error from a
    /// one-entry list differs from calling that entry directly.
    /// [`DelegateError::root_cause`] recovers the entry's own error.
    pub fn invoke(&self, args: Args) -> Result<usize> {
        let total = self.entries.len();
        let Some((last, rest)) = self.entries.split_last() else {
            tracing::trace!("Broadcast to empty delegate list");
            return Ok(0);
        };

        if self.config.checks_before_dispatch() {
            if let Some((position, entry)) = self.first_stale() {
                tracing::warn!(
                    position,
                    total,
                    receiver = entry.receiver_type().unwrap_or("<free>"),
                    "Broadcast refused, receiver dropped"
                );
                return Err(DelegateError::Broadcast {
                    position,
                    total,
                    source: Box::new(DelegateError::StaleReceiver {
                        receiver: entry.receiver_type().unwrap_or("<free>"),
                    }),
                });
            }
        }

        tracing::debug!(total, policy = ?self.config.dispatch_policy, "Broadcasting");

        let mut dispatched = 0;
        for (position, entry) in rest.iter().enumerate() {
            dispatched += self.settle(position, total, entry.call_discard(args.clone()))?;
        }
        // The last entry takes the caller's arguments
        dispatched += self.settle(total - 1, total, last.call_discard(args))?;

        tracing::debug!(dispatched, total, "Broadcast complete");
        Ok(dispatched)
    }

    /// Apply the dispatch policy to one entry's outcome
    ///
    /// Returns how many entries ran (0 or 1), or the error that ends the
    /// broadcast.
    fn settle(&self, position: usize, total: usize, outcome: Result<()>) -> Result<usize> {
        match outcome {
            Ok(()) => Ok(1),
            Err(err) => match self.config.dispatch_policy {
                DispatchPolicy::FailFast => {
                    tracing::warn!(position, total, "Broadcast aborted: {}", err);
                    Err(DelegateError::Broadcast {
                        position,
                        total,
                        source: Box::new(err),
                    })
                }
                DispatchPolicy::SkipUnavailable => {
                    tracing::warn!(position, total, "Skipping delegate: {}", err);
                    Ok(0)
                }
            },
        }
    }
}

macro_rules! impl_call {
    ($($arg:ident : $ty:ident),*) => {
        impl<R, $($ty: Clone,)*> MulticastDelegate<($($ty,)*), R> {
            /// Broadcast with the arguments passed individually
            #[allow(clippy::too_many_arguments)]
            pub fn call(&self, $($arg: $ty),*) -> Result<usize> {
                self.invoke(($($arg,)*))
            }
        }
    };
}

impl_call!();
impl_call!(a1: A1);
impl_call!(a1: A1, a2: A2);
impl_call!(a1: A1, a2: A2, a3: A3);
impl_call!(a1: A1, a2: A2, a3: A3, a4: A4);
impl_call!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_call!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);

impl<Args, R> Default for MulticastDelegate<Args, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args, R> Clone for MulticastDelegate<Args, R> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            config: self.config.clone(),
        }
    }
}

impl<Args, R> fmt::Debug for MulticastDelegate<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticastDelegate")
            .field("entries", &self.entries)
            .field("config", &self.config)
            .finish()
    }
}

impl<Args, R> AddAssign<Delegate<Args, R>> for MulticastDelegate<Args, R> {
    fn add_assign(&mut self, delegate: Delegate<Args, R>) {
        self.register(delegate);
    }
}

impl<Args, R> SubAssign<Delegate<Args, R>> for MulticastDelegate<Args, R> {
    fn sub_assign(&mut self, delegate: Delegate<Args, R>) {
        self.unregister(&delegate);
    }
}

impl<Args, R> SubAssign<&Delegate<Args, R>> for MulticastDelegate<Args, R> {
    fn sub_assign(&mut self, delegate: &Delegate<Args, R>) {
        self.unregister(delegate);
    }
}

impl<Args, R> Extend<Delegate<Args, R>> for MulticastDelegate<Args, R> {
    fn extend<I: IntoIterator<Item = Delegate<Args, R>>>(&mut self, iter: I) {
        for delegate in iter {
            self.register(delegate);
        }
    }
}

impl<Args, R> FromIterator<Delegate<Args, R>> for MulticastDelegate<Args, R> {
    fn from_iter<I: IntoIterator<Item = Delegate<Args, R>>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a, Args, R> IntoIterator for &'a MulticastDelegate<Args, R> {
    type Item = &'a Delegate<Args, R>;
    type IntoIter = std::slice::Iter<'a, Delegate<Args, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
