//! Callable shapes that can be bound into a delegate
//!
//! Argument lists are modelled as tuples: a function taking `(i32, char)`
//! binds as `Args = (i32, char)`, a function taking nothing as `Args = ()`.
//! Implementations are provided for every `Fn` of arity 0 through 6.
//!
//! # Example
//!
//! ```rust
//! use multicast_delegate::callable::{FreeFunction, Method};
//!
//! struct Calculator;
//!
//! impl Calculator {
//!     fn add(&self, x: i32, y: i32) -> i32 {
//!         x + y
//!     }
//! }
//!
//! fn negate(x: i32) -> i32 {
//!     -x
//! }
//!
//! assert_eq!(FreeFunction::<(i32,), i32>::call_with(&negate, (5,)), -5);
//! assert_eq!(Method::<Calculator, (i32, i32), i32>::call_on(&Calculator::add, &Calculator, (2, 3)), 5);
//! ```

use std::any::Any;

use crate::binding::TargetId;

/// A free function (or non-receiver closure) taking `Args` and returning `R`
pub trait FreeFunction<Args, R>: 'static {
    /// Call the function with an unpacked argument tuple
    fn call_with(&self, args: Args) -> R;

    /// Identity used for delegate equality
    fn target_id(&self) -> TargetId;
}

/// A method taking `&T` as its receiver
///
/// Method items such as `Type::method` for `fn method(&self, ..)` satisfy
/// this trait directly.
pub trait Method<T: ?Sized, Args, R>: 'static {
    /// Call the method on `receiver`
    fn call_on(&self, receiver: &T, args: Args) -> R;

    /// Identity used for delegate equality
    fn target_id(&self) -> TargetId;
}

/// A method taking `&mut T` as its receiver
pub trait MethodMut<T: ?Sized, Args, R>: 'static {
    /// Call the method on `receiver`
    fn call_on_mut(&self, receiver: &mut T, args: Args) -> R;

    /// Identity used for delegate equality
    fn target_id(&self) -> TargetId;
}

/// Address identity if `target` is the function pointer type `P`
fn pointer_or_type_id<F: 'static, P: Copy + 'static>(target: &F, address: fn(P) -> usize) -> TargetId {
    match (target as &dyn Any).downcast_ref::<P>() {
        Some(pointer) => TargetId::Pointer(address(*pointer)),
        None => TargetId::of(target),
    }
}

macro_rules! impl_callables {
    ($($arg:ident : $ty:ident),*) => {
        impl<Func, R, $($ty,)*> FreeFunction<($($ty,)*), R> for Func
        where
            Func: Fn($($ty),*) -> R + 'static,
            R: 'static,
            $($ty: 'static,)*
        {
            #[inline]
            fn call_with(&self, ($($arg,)*): ($($ty,)*)) -> R {
                (self)($($arg),*)
            }

            fn target_id(&self) -> TargetId {
                pointer_or_type_id::<Self, fn($($ty),*) -> R>(self, |pointer| pointer as usize)
            }
        }

        impl<Func, T, R, $($ty,)*> Method<T, ($($ty,)*), R> for Func
        where
            T: ?Sized + 'static,
            Func: Fn(&T, $($ty),*) -> R + 'static,
            R: 'static,
            $($ty: 'static,)*
        {
            #[inline]
            fn call_on(&self, receiver: &T, ($($arg,)*): ($($ty,)*)) -> R {
                (self)(receiver, $($arg),*)
            }

            fn target_id(&self) -> TargetId {
                pointer_or_type_id::<Self, fn(&T, $($ty),*) -> R>(self, |pointer| pointer as usize)
            }
        }

        impl<Func, T, R, $($ty,)*> MethodMut<T, ($($ty,)*), R> for Func
        where
            T: ?Sized + 'static,
            Func: Fn(&mut T, $($ty),*) -> R + 'static,
            R: 'static,
            $($ty: 'static,)*
        {
            #[inline]
            fn call_on_mut(&self, receiver: &mut T, ($($arg,)*): ($($ty,)*)) -> R {
                (self)(receiver, $($arg),*)
            }

            fn target_id(&self) -> TargetId {
                pointer_or_type_id::<Self, fn(&mut T, $($ty),*) -> R>(self, |pointer| pointer as usize)
            }
        }
    };
}

impl_callables!();
impl_callables!(a1: A1);
impl_callables!(a1: A1, a2: A2);
impl_callables!(a1: A1, a2: A2, a3: A3);
impl_callables!(a1: A1, a2: A2, a3: A3, a4: A4);
impl_callables!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_callables!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);
