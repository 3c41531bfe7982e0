//! Single and Multicast Delegates
//!
//! Bind a free function or an object's method into one uniform callable
//! value, compare those values by binding site, and broadcast a call to
//! many of them in registration order.
//!
//! # Features
//!
//! - **Uniform Callables**: Free functions and methods share one `Delegate<Args, R>` type
//! - **Identity Equality**: Delegates compare equal when bound to the same object and method
//! - **Ordered Broadcast**: `MulticastDelegate` calls every entry in registration order
//! - **Checked Receivers**: Dropped receivers are reported as errors, never dereferenced
//!
//! # Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use multicast_delegate::{bind_member, Delegate, MulticastDelegate};
//!
//! struct ClassTest {
//!     seen: RefCell<Vec<i32>>,
//! }
//!
//! impl ClassTest {
//!     fn square(&self, x: i32) -> i32 {
//!         self.seen.borrow_mut().push(x * x);
//!         x * x
//!     }
//!
//!     fn double(&self, x: i32) -> i32 {
//!         self.seen.borrow_mut().push(x + x);
//!         x + x
//!     }
//! }
//!
//! let temp = Rc::new(ClassTest { seen: RefCell::new(Vec::new()) });
//!
//! // Same object, same method: equal delegates
//! let square: Delegate<(i32,), i32> = bind_member(ClassTest::square, &temp);
//! assert_eq!(square, bind_member(ClassTest::square, &temp));
//! assert_eq!(square.call(3), Ok(9));
//!
//! let mut list = MulticastDelegate::<(i32,), i32>::new();
//! list += square;
//! list += bind_member(ClassTest::double, &temp);
//!
//! list.call(4).unwrap();
//! assert_eq!(*temp.seen.borrow(), vec![9, 16, 8]);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Delegate<Args, R>
//!     │
//!     ├── binding: BindingId { receiver address, TargetId }   (equality)
//!     ├── receiver: Weak<dyn Any>                              (liveness)
//!     └── trampoline: Rc<dyn Fn(Args) -> Result<R>>           (dispatch)
//!
//! MulticastDelegate<Args, R>
//!     │
//!     ├── entries: Vec<Delegate<Args, R>>   (registration order)
//!     └── config: BroadcastConfig           (dispatch policy)
//! ```

// Modules
pub mod binding;
pub mod callable;
pub mod config;
pub mod delegate;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod multicast;

// Re-exports - Public API
pub use binding::{BindingId, TargetId};
pub use callable::{FreeFunction, Method, MethodMut};
pub use config::{BroadcastConfig, DispatchPolicy};
pub use delegate::{bind_free, bind_member, bind_member_mut, Delegate};
pub use error::{DelegateError, Result};
pub use multicast::MulticastDelegate;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{BroadcastConfig, DispatchPolicy};
    pub use crate::delegate::{bind_free, bind_member, bind_member_mut, Delegate};
    pub use crate::error::DelegateError;
    pub use crate::multicast::MulticastDelegate;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct ClassTest {
        calls: RefCell<Vec<String>>,
    }

    impl ClassTest {
        fn test_foo(&self, x: i32) -> i32 {
            self.calls.borrow_mut().push(format!("test_foo({})", x));
            x * x
        }

        fn test_foo1(&self, x: i32) -> i32 {
            self.calls.borrow_mut().push(format!("test_foo1({})", x));
            x + x
        }
    }

    fn free_function(x: i32) -> i32 {
        x
    }

    #[test]
    fn test_full_workflow() {
        let temp = Rc::new(ClassTest {
            calls: RefCell::new(Vec::new()),
        });

        let d = bind_member(ClassTest::test_foo, &temp);
        let mut d2 = MulticastDelegate::<(i32,), i32>::new();
        d2 += bind_member(ClassTest::test_foo, &temp);
        d2 += d.clone();

        // Both entries share a binding site
        assert_eq!(d2.iter().filter(|entry| **entry == d).count(), 2);

        assert_eq!(d2.call(4), Ok(2));
        assert_eq!(
            *temp.calls.borrow(),
            vec!["test_foo(4)".to_string(), "test_foo(4)".to_string()]
        );
    }

    #[test]
    fn test_mixed_free_and_member() {
        let temp = Rc::new(ClassTest {
            calls: RefCell::new(Vec::new()),
        });

        let mut list = MulticastDelegate::<(i32,), i32>::new();
        list.register(bind_free(free_function));
        list.register(bind_member(ClassTest::test_foo1, &temp));

        assert_eq!(list.len(), 2);
        assert_eq!(list.call(5), Ok(2));
        assert_eq!(*temp.calls.borrow(), vec!["test_foo1(5)".to_string()]);

        assert!(list.unregister(&bind_free(free_function)));
        assert_eq!(list.len(), 1);
    }
}
