//! Binding identity for delegates
//!
//! Two delegates are equal when they were bound at the same *binding site*:
//! the same receiver object and the same target function. A `BindingId`
//! captures exactly that pair and nothing about what the call computes.

use std::any::TypeId;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Identity of the function or method a delegate forwards to
///
/// Function items, method items and non-capturing closures are zero-sized
/// and each has its own type, so their `TypeId` identifies them. Function
/// pointers are identified by address. Anything else (capturing closures)
/// gets a serial number that is unique per bind.
///
/// An item and a pointer to the same function are different targets:
/// `Type::method` and `Type::method as fn(..)` never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetId {
    /// A zero-sized callable identified by its type
    Item(TypeId),
    /// A function pointer identified by its address
    Pointer(usize),
    /// A callable carrying state, identified per bind
    Instance(u64),
}

impl TargetId {
    /// Derive the identity of callable `F` from its type alone
    ///
    /// Function pointers are not recognised here since that needs the
    /// signature; the callable traits' `target_id` handles them.
    pub fn of<F: 'static>(_target: &F) -> Self {
        if mem::size_of::<F>() == 0 {
            TargetId::Item(TypeId::of::<F>())
        } else {
            TargetId::Instance(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed))
        }
    }

    /// Whether this is a zero-sized item identity
    pub fn is_item(&self) -> bool {
        matches!(self, TargetId::Item(_))
    }

    /// Whether binding the same target again yields the same identity
    pub fn is_stable(&self) -> bool {
        !matches!(self, TargetId::Instance(_))
    }
}

/// Receiver address plus target identity
///
/// The receiver is recorded only by address. Delegates hold a `Weak`
/// handle to it, which keeps the allocation reserved, so an address can't
/// be handed to a different object while a delegate still refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId {
    /// Address of the receiver object, `None` for free functions
    pub receiver: Option<usize>,

    /// Identity of the bound function or method
    pub target: TargetId,
}

impl BindingId {
    /// Identity for a free function binding
    pub fn free(target: TargetId) -> Self {
        Self {
            receiver: None,
            target,
        }
    }

    /// Identity for a member binding on the object at `receiver`
    pub fn member<T: ?Sized>(receiver: *const T, target: TargetId) -> Self {
        Self {
            receiver: Some(receiver as *const () as usize),
            target,
        }
    }
}
