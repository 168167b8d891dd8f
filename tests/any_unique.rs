//! Integration tests for the owning handle.
//!
//! ## Access Tests
//! - `test_get_matches_direct_construction`: stored values equal values built
//!   directly
//! - `test_get_rejects_same_layout_types`: identity is never based on layout
//!
//! ## Ownership Tests
//! - `test_move_keeps_payload`: moves transfer ownership without copying
//! - `test_clone_is_independent`: clones live at their own address and drop
//!   on their own
//! - `test_take_empties_source`: extraction moves the value out once
//! - `test_drop_runs_exactly_once`: a dropped handle drops its value once
//! - `test_release_hands_off_ownership`: a released value is not dropped by
//!   its former handle
//! - `test_swap_and_reset`: ownership transfer between handles
//! - `test_full_lifecycle`: construct, move, clone, extract, drop

use std::{cell::RefCell, rc::Rc};

use unique_any::{AccessError, AnyUnique, ErasedValue, TypeIdentity, markers::Cloneable};

type DropLog = Rc<RefCell<Vec<String>>>;

#[derive(Debug)]
struct Tracked {
    name: String,
    payload: [u64; 4],
    log: DropLog,
}

impl Tracked {
    fn new(name: &str, log: &DropLog) -> Self {
        log.borrow_mut().push(format!("Created: {name}"));
        Self {
            name: name.to_owned(),
            payload: [1, 2, 3, 4],
            log: log.clone(),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Self::new(&format!("{}'", self.name), &self.log)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.borrow_mut().push(format!("Dropped: {}", self.name));
    }
}

fn drops(log: &DropLog) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|entry| entry.starts_with("Dropped"))
        .cloned()
        .collect()
}

#[test]
fn test_get_matches_direct_construction() {
    let handle: AnyUnique = AnyUnique::new(String::from("value"));
    assert_eq!(handle.get::<String>(), Some(&String::from("value")));

    let handle: AnyUnique = AnyUnique::new((1_u8, 'x', 2.5_f32));
    assert_eq!(handle.get::<(u8, char, f32)>(), Some(&(1, 'x', 2.5)));

    let handle: AnyUnique = AnyUnique::new(());
    assert_eq!(handle.get::<()>(), Some(&()));
    assert!(handle.is_some());
}

#[test]
fn test_get_rejects_same_layout_types() {
    #[derive(Debug)]
    struct Meters(u32);
    #[derive(Debug)]
    #[allow(dead_code)]
    struct Seconds(u32);

    let mut handle: AnyUnique = AnyUnique::new(Meters(5));
    assert!(handle.get::<u32>().is_none());
    assert!(handle.get::<i32>().is_none());
    assert!(handle.get::<f32>().is_none());
    assert!(handle.get::<Seconds>().is_none());
    assert!(handle.get_mut::<Seconds>().is_none());
    assert!(handle.take::<Seconds>().is_none());
    assert_eq!(
        handle.try_get::<Seconds>().unwrap_err(),
        AccessError::TypeMismatch {
            expected: TypeIdentity::of::<Seconds>(),
            found: TypeIdentity::of::<Meters>(),
        }
    );
    assert_eq!(handle.get::<Meters>().map(|m| m.0), Some(5));
}

#[test]
fn test_move_keeps_payload() {
    let log = DropLog::default();
    let mut first: AnyUnique = AnyUnique::new(Tracked::new("a", &log));
    let address: *const Tracked = first.get::<Tracked>().unwrap();

    let mut second: AnyUnique = AnyUnique::empty();
    second.swap(&mut first);
    assert!(first.is_empty());

    let third = second;
    let moved: *const Tracked = third.get::<Tracked>().unwrap();
    assert_eq!(address, moved);
    assert!(drops(&log).is_empty());
}

#[test]
fn test_clone_is_independent() {
    let log = DropLog::default();
    let original: AnyUnique<Cloneable> = AnyUnique::new(Tracked::new("a", &log));
    let copy = original.clone();

    let a = original.get::<Tracked>().unwrap();
    let b = copy.get::<Tracked>().unwrap();
    assert!(!std::ptr::eq(a, b));
    assert_eq!(a.payload, b.payload);
    assert_eq!(b.name, "a'");

    drop(copy);
    assert_eq!(drops(&log), ["Dropped: a'"]);
    assert_eq!(original.get::<Tracked>().map(|t| t.name.as_str()), Some("a"));

    drop(original);
    assert_eq!(drops(&log), ["Dropped: a'", "Dropped: a"]);
}

#[test]
fn test_take_empties_source() {
    let log = DropLog::default();
    let mut handle: AnyUnique = AnyUnique::new(Tracked::new("a", &log));

    let value = handle.take::<Tracked>().unwrap();
    assert_eq!(value.name, "a");
    assert!(handle.is_empty());
    assert!(handle.identity().is_none());
    assert!(drops(&log).is_empty());

    assert!(handle.take::<Tracked>().is_none());
    assert_eq!(handle.try_take::<Tracked>().unwrap_err(), AccessError::Empty);

    drop(value);
    assert_eq!(drops(&log), ["Dropped: a"]);
}

#[test]
fn test_drop_runs_exactly_once() {
    let log = DropLog::default();
    {
        let _handle: AnyUnique = AnyUnique::new(Tracked::new("a", &log));
        assert!(drops(&log).is_empty());
    }
    assert_eq!(drops(&log), ["Dropped: a"]);

    {
        let _empty: AnyUnique = AnyUnique::empty();
    }
    assert_eq!(drops(&log).len(), 1);
}

#[test]
fn test_release_hands_off_ownership() {
    let log = DropLog::default();
    let released: ErasedValue = {
        let mut handle: AnyUnique = AnyUnique::new(Tracked::new("a", &log));
        let released = handle.release().unwrap();
        assert!(handle.is_empty());
        released
    };
    assert!(drops(&log).is_empty());
    assert_eq!(released.downcast_ref::<Tracked>().map(|t| t.name.as_str()), Some("a"));

    let mut adopted = AnyUnique::from_erased(released);
    assert!(drops(&log).is_empty());
    adopted.reset(None);
    assert_eq!(drops(&log), ["Dropped: a"]);
}

#[test]
fn test_swap_and_reset() {
    let log = DropLog::default();
    let mut a: AnyUnique = AnyUnique::new(Tracked::new("a", &log));
    let mut b: AnyUnique = AnyUnique::new(7_u64);

    a.swap(&mut b);
    assert!(a.is::<u64>());
    assert!(b.is::<Tracked>());

    b.reset(Some(ErasedValue::new(Tracked::new("c", &log))));
    assert_eq!(drops(&log), ["Dropped: a"]);

    let previous = b.replace(String::from("d")).unwrap();
    assert!(previous.is::<Tracked>());
    assert_eq!(drops(&log), ["Dropped: a"]);
    drop(previous);
    assert_eq!(drops(&log), ["Dropped: a", "Dropped: c"]);
}

#[test]
fn test_full_lifecycle() {
    let log = DropLog::default();

    let handle: AnyUnique<Cloneable> = AnyUnique::new(Tracked::new("a", &log));
    let moved_once = handle;
    let moved_twice = moved_once;

    let clone = moved_twice.clone();
    assert_eq!(*log.borrow(), ["Created: a", "Created: a'"]);

    drop(clone);
    assert_eq!(drops(&log), ["Dropped: a'"]);

    let mut source = moved_twice;
    let extracted = source.take::<Tracked>().unwrap();
    drop(extracted);
    assert_eq!(drops(&log), ["Dropped: a'", "Dropped: a"]);

    drop(source);
    assert_eq!(drops(&log), ["Dropped: a'", "Dropped: a"]);
}
