//! Receiver Demo - minimal delegate walkthrough
//!
//! Binds two methods of one receiver plus a free function, broadcasts a
//! value to all of them, then drops the receiver to show stale detection.
//!
//! Run: DELEGATE_LOG_MODE=registrations cargo run -p multicast-delegate --features logging --example receiver_demo

use std::rc::Rc;

use multicast_delegate::logging::init_logging_from_env;
use multicast_delegate::prelude::*;

struct ClassTest;

impl ClassTest {
    fn test_foo(&self, x: i32) -> i32 {
        println!("test_foo: {}", x * x);
        x * x
    }

    fn test_foo1(&self, x: i32) -> i32 {
        println!("test_foo1: {}", x + x);
        x + x
    }
}

fn free_function(x: i32) -> i32 {
    println!("free_function: {}", x);
    x
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let temp = Rc::new(ClassTest);
    let d: Delegate<(i32,), i32> = bind_member(ClassTest::test_foo, &temp);
    println!("d(3) = {}", d.call(3)?);

    let mut d2 = MulticastDelegate::<(i32,), i32>::new();
    d2 += bind_member(ClassTest::test_foo, &temp);
    d2 += d.clone();
    d2 += bind_member(ClassTest::test_foo1, &temp);
    d2 += bind_free(free_function);

    println!("broadcast(4) reached {} delegates", d2.call(4)?);

    d2 -= &d;
    println!("after one unregister: {} delegates", d2.len());

    drop(temp);
    match d2.call(4) {
        Ok(n) => println!("broadcast(4) reached {} delegates", n),
        Err(e) => println!("broadcast refused: {}", e),
    }

    let pruned = d2.prune_stale();
    println!("pruned {} stale delegates, broadcast(4) reached {}", pruned, d2.call(4)?);

    Ok(())
}
