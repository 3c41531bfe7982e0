//! Single-target delegates
//!
//! A [`Delegate`] is a uniform callable value bound either to a free
//! function or to a method on a specific receiver object. Whatever the
//! original shape, every delegate with the same `Args`/`R` has the same
//! type and can be stored next to any other.
//!
//! # Receivers
//!
//! Member delegates never own their receiver. They hold a `Weak` handle
//! to an `Rc`-managed object, and invoking a delegate whose receiver has
//! been dropped fails with [`DelegateError::StaleReceiver`] instead of
//! touching freed memory.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use multicast_delegate::{Delegate, DelegateError};
//!
//! struct Shape {
//!     side: i32,
//! }
//!
//! impl Shape {
//!     fn area(&self) -> i32 {
//!         self.side * self.side
//!     }
//! }
//!
//! let shape = Rc::new(Shape { side: 3 });
//! let area: Delegate<(), i32> = Delegate::bind_member(Shape::area, &shape);
//! assert_eq!(area.call(), Ok(9));
//!
//! drop(shape);
//! assert_eq!(
//!     area.call(),
//!     Err(DelegateError::StaleReceiver { receiver: std::any::type_name::<Shape>() })
//! );
//! ```

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::binding::BindingId;
use crate::callable::{FreeFunction, Method, MethodMut};
use crate::error::{DelegateError, Result};

type Trampoline<Args, R> = Rc<dyn Fn(Args) -> Result<R>>;

/// Non-owning handle to a member delegate's receiver
#[derive(Clone)]
struct Receiver {
    handle: Weak<dyn Any>,
    type_name: &'static str,
}

/// A bound callback taking the argument tuple `Args` and returning `R`
///
/// Cloning is cheap and clones compare equal. Two delegates are equal when
/// they share a receiver object and a target function; see
/// [`BindingId`](crate::binding::BindingId).
pub struct Delegate<Args, R = ()> {
    binding: BindingId,
    receiver: Option<Receiver>,
    trampoline: Trampoline<Args, R>,
}

impl<Args: 'static, R: 'static> Delegate<Args, R> {
    /// Bind a free function
    ///
    /// The receiver slot is left empty; the delegate is always callable.
    pub fn bind_free<F>(function: F) -> Self
    where
        F: FreeFunction<Args, R>,
    {
        let binding = BindingId::free(function.target_id());
        let trampoline: Trampoline<Args, R> = Rc::new(move |args: Args| -> Result<R> {
            Ok(function.call_with(args))
        });

        Self {
            binding,
            receiver: None,
            trampoline,
        }
    }

    /// Bind `method` to the object behind `receiver`
    ///
    /// The delegate keeps only a weak handle, so the object's lifetime stays
    /// with its owner. Once the last strong `Rc` is gone, invoking returns
    /// [`DelegateError::StaleReceiver`].
    pub fn bind_member<T, M>(method: M, receiver: &Rc<T>) -> Self
    where
        T: 'static,
        M: Method<T, Args, R>,
    {
        let binding = BindingId::member(Rc::as_ptr(receiver), method.target_id());
        let weak = Rc::downgrade(receiver);
        let trampoline: Trampoline<Args, R> = Rc::new(move |args: Args| -> Result<R> {
            let receiver = weak.upgrade().ok_or(DelegateError::StaleReceiver {
                receiver: type_name::<T>(),
            })?;
            Ok(method.call_on(&receiver, args))
        });

        Self {
            binding,
            receiver: Some(Receiver {
                handle: Rc::downgrade(receiver) as Weak<dyn Any>,
                type_name: type_name::<T>(),
            }),
            trampoline,
        }
    }

    /// Bind a mutating `method` to the object behind `receiver`
    ///
    /// The receiver is mutably borrowed for the duration of each call. A call
    /// that finds it already borrowed (for instance a method that re-enters a
    /// delegate bound to its own object) fails with
    /// [`DelegateError::ReceiverBusy`].
    pub fn bind_member_mut<T, M>(method: M, receiver: &Rc<RefCell<T>>) -> Self
    where
        T: 'static,
        M: MethodMut<T, Args, R>,
    {
        let binding = BindingId::member(Rc::as_ptr(receiver), method.target_id());
        let weak = Rc::downgrade(receiver);
        let trampoline: Trampoline<Args, R> = Rc::new(move |args: Args| -> Result<R> {
            let cell = weak.upgrade().ok_or(DelegateError::StaleReceiver {
                receiver: type_name::<T>(),
            })?;
            let mut receiver = cell.try_borrow_mut().map_err(|_| DelegateError::ReceiverBusy {
                receiver: type_name::<T>(),
            })?;
            Ok(method.call_on_mut(&mut receiver, args))
        });

        Self {
            binding,
            receiver: Some(Receiver {
                handle: Rc::downgrade(receiver) as Weak<dyn Any>,
                type_name: type_name::<T>(),
            }),
            trampoline,
        }
    }
}

impl<Args, R> Delegate<Args, R> {
    /// Dispatch to the bound function or method
    ///
    /// Returns exactly what the target returns.
    pub fn invoke(&self, args: Args) -> Result<R> {
        let result = (self.trampoline)(args);
        if let Err(err) = &result {
            tracing::debug!(binding = ?self.binding, "Delegate dispatch failed: {}", err);
        }
        result
    }

    /// Dispatch and drop the return value
    pub fn call_discard(&self, args: Args) -> Result<()> {
        self.invoke(args).map(drop)
    }

    /// The identity this delegate compares by
    pub fn binding(&self) -> BindingId {
        self.binding
    }

    /// Whether this delegate is bound to a receiver object
    pub fn is_member(&self) -> bool {
        self.receiver.is_some()
    }

    /// Whether the receiver is still alive
    ///
    /// Free function delegates are always alive.
    pub fn is_alive(&self) -> bool {
        self.receiver
            .as_ref()
            .map(|r| r.handle.strong_count() > 0)
            .unwrap_or(true)
    }

    /// Type name of the receiver, if any
    pub fn receiver_type(&self) -> Option<&'static str> {
        self.receiver.as_ref().map(|r| r.type_name)
    }
}

macro_rules! impl_call {
    ($($arg:ident : $ty:ident),*) => {
        impl<R, $($ty,)*> Delegate<($($ty,)*), R> {
            /// Dispatch with the arguments passed individually
            #[allow(clippy::too_many_arguments)]
            pub fn call(&self, $($arg: $ty),*) -> Result<R> {
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

/// Bind `method` to `receiver`. See [`Delegate::bind_member`].
pub fn bind_member<T, M, Args, R>(method: M, receiver: &Rc<T>) -> Delegate<Args, R>
where
    T: 'static,
    Args: 'static,
    R: 'static,
    M: Method<T, Args, R>,
{
    Delegate::bind_member(method, receiver)
}

/// Bind a mutating `method` to `receiver`. See [`Delegate::bind_member_mut`].
pub fn bind_member_mut<T, M, Args, R>(method: M, receiver: &Rc<RefCell<T>>) -> Delegate<Args, R>
where
    T: 'static,
    Args: 'static,
    R: 'static,
    M: MethodMut<T, Args, R>,
{
    Delegate::bind_member_mut(method, receiver)
}

/// Bind a free function. See [`Delegate::bind_free`].
pub fn bind_free<F, Args, R>(function: F) -> Delegate<Args, R>
where
    Args: 'static,
    R: 'static,
    F: FreeFunction<Args, R>,
{
    Delegate::bind_free(function)
}

impl<Args, R> Clone for Delegate<Args, R> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding,
            receiver: self.receiver.clone(),
            trampoline: Rc::clone(&self.trampoline),
        }
    }
}

impl<Args, R> PartialEq for Delegate<Args, R> {
    fn eq(&self, other: &Self) -> bool {
        self.binding == other.binding
    }
}

impl<Args, R> Eq for Delegate<Args, R> {}

impl<Args, R> Hash for Delegate<Args, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.binding.hash(state);
    }
}

impl<Args, R> fmt::Debug for Delegate<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("binding", &self.binding)
            .field("receiver_type", &self.receiver_type())
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClassTest;

    impl ClassTest {
        fn square(&self, x: i32) -> i32 {
            x * x
        }

        fn double(&self, x: i32) -> i32 {
            x + x
        }

        fn bar(&self, x: i32, y: i32, a: char) -> i32 {
            if a == 'a' {
                x + y
            } else {
                x * y
            }
        }
    }

    struct Tally {
        total: i64,
    }

    impl Tally {
        fn add(&mut self, amount: i64) -> i64 {
            self.total += amount;
            self.total
        }
    }

    fn identity(x: i32) -> i32 {
        x
    }

    #[test]
    fn test_bind_member_invoke() {
        let temp = Rc::new(ClassTest);
        let d: Delegate<(i32,), i32> = Delegate::bind_member(ClassTest::square, &temp);

        assert_eq!(d.invoke((4,)), Ok(16));
        assert_eq!(d.call(5), Ok(25));
        assert!(d.is_member());
        assert!(d.is_alive());
    }

    #[test]
    fn test_bind_member_multiple_args() {
        let temp = Rc::new(ClassTest);
        let d: Delegate<(i32, i32, char), i32> = bind_member(ClassTest::bar, &temp);

        assert_eq!(d.call(3, 4, 'a'), Ok(7));
        assert_eq!(d.call(3, 4, 'x'), Ok(12));
    }

    #[test]
    fn test_bind_free_invoke() {
        let d: Delegate<(i32,), i32> = bind_free(identity);

        assert_eq!(d.call(42), Ok(42));
        assert!(!d.is_member());
        assert!(d.is_alive());
        assert_eq!(d.receiver_type(), None);
    }

    #[test]
    fn test_member_equality_same_site() {
        let temp = Rc::new(ClassTest);
        let a: Delegate<(i32,), i32> = bind_member(ClassTest::square, &temp);
        let b: Delegate<(i32,), i32> = bind_member(ClassTest::square, &temp);

        assert_eq!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_member_inequality() {
        let temp = Rc::new(ClassTest);
        let temp1 = Rc::new(ClassTest);
        let base: Delegate<(i32,), i32> = bind_member(ClassTest::square, &temp);

        // Different object
        assert_ne!(base, bind_member(ClassTest::square, &temp1));

        // Different method on the same object
        assert_ne!(base, bind_member(ClassTest::double, &temp));

        // Same computation through a free function
        assert_ne!(base, bind_free(|x: i32| x * x));
    }

    #[test]
    fn test_function_pointer_rebind_is_equal() {
        let temp = Rc::new(ClassTest);
        let square: fn(&ClassTest, i32) -> i32 = ClassTest::square;
        let double: fn(&ClassTest, i32) -> i32 = ClassTest::double;
        let a: Delegate<(i32,), i32> = bind_member(square, &temp);

        assert_eq!(a, bind_member(square, &temp));
        assert_ne!(a, bind_member(double, &temp));

        let free: fn(i32) -> i32 = identity;
        let f: Delegate<(i32,), i32> = bind_free(free);
        assert_eq!(f, bind_free(free));
    }

    #[test]
    fn test_stale_receiver_is_reported() {
        let temp = Rc::new(ClassTest);
        let d: Delegate<(i32,), i32> = bind_member(ClassTest::square, &temp);
        drop(temp);

        assert!(!d.is_alive());
        let err = d.call(4).unwrap_err();
        assert!(err.is_stale());
        assert_eq!(d.receiver_type(), Some(type_name::<ClassTest>()));
    }

    #[test]
    fn test_delegate_does_not_own_receiver() {
        let temp = Rc::new(ClassTest);
        let _d: Delegate<(i32,), i32> = bind_member(ClassTest::square, &temp);

        assert_eq!(Rc::strong_count(&temp), 1);
    }

    #[test]
    fn test_bind_member_mut() {
        let tally = Rc::new(RefCell::new(Tally { total: 0 }));
        let d: Delegate<(i64,), i64> = bind_member_mut(Tally::add, &tally);

        assert_eq!(d.call(5), Ok(5));
        assert_eq!(d.call(7), Ok(12));
        assert_eq!(tally.borrow().total, 12);
    }

    #[test]
    fn test_bind_member_mut_busy_receiver() {
        let tally = Rc::new(RefCell::new(Tally { total: 0 }));
        let d: Delegate<(i64,), i64> = bind_member_mut(Tally::add, &tally);

        let guard = tally.borrow();
        assert_eq!(
            d.call(1),
            Err(DelegateError::ReceiverBusy {
                receiver: type_name::<Tally>()
            })
        );
        drop(guard);

        assert_eq!(d.call(1), Ok(1));
    }

    #[test]
    fn test_call_discard() {
        let temp = Rc::new(ClassTest);
        let d: Delegate<(i32,), i32> = bind_member(ClassTest::double, &temp);

        assert_eq!(d.call_discard((3,)), Ok(()));
    }

    #[test]
    fn test_zero_arity() {
        let d: Delegate<(), &'static str> = bind_free(|| "ping");
        assert_eq!(d.call(), Ok("ping"));
    }

    #[test]
    fn test_hash_matches_equality() {
        use std::collections::HashSet;

        let temp = Rc::new(ClassTest);
        let mut set = HashSet::new();
        set.insert(bind_member::<_, _, (i32,), i32>(ClassTest::square, &temp));
        set.insert(bind_member::<_, _, (i32,), i32>(ClassTest::square, &temp));
        set.insert(bind_member::<_, _, (i32,), i32>(ClassTest::double, &temp));

        assert_eq!(set.len(), 2);
    }
}
