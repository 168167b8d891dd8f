//! The lifecycle of an owning handle.
//!
//! This demo walks one value through every ownership transition:
//! 1. Construction with `AnyUnique::new`
//! 2. Moving the handle around
//! 3. Cloning it (requires the `Cloneable` marker)
//! 4. Checked access with `get` and `try_get`
//! 5. Extraction with `take`
//! 6. Dropping everything
//!
//! Run with `cargo run --example lifecycle --features tracing` to also see the
//! trace events emitted by the crate.

use tracing::info;
use unique_any::prelude::*;

/// A payload that announces its own destruction.
#[derive(Clone, Debug)]
struct Noisy {
    label: String,
}

impl Drop for Noisy {
    fn drop(&mut self) {
        info!(label = %self.label, "destructor ran");
    }
}

fn build() -> AnyUnique<markers::Cloneable> {
    AnyUnique::new(Noisy {
        label: "original".to_owned(),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // Moving the handle never touches the payload
    let first = build();
    let second = first;
    let mut handle = second;
    info!(identity = %handle.identity(), "constructed and moved twice");

    let mut copy = handle.clone();
    if let Some(noisy) = copy.get_mut::<Noisy>() {
        noisy.label = "copy".to_owned();
    }

    match copy.try_get::<String>() {
        Ok(_) => unreachable!("the handle owns a `Noisy`"),
        Err(error) => info!(%error, "checked access failed as expected"),
    }

    info!("dropping the copy");
    drop(copy);

    let extracted: Box<Noisy> = match handle.take() {
        Some(value) => value,
        None => return,
    };
    info!(
        label = %extracted.label,
        handle_empty = handle.is_empty(),
        "extracted the payload"
    );

    info!("dropping the extracted value");
    drop(extracted);

    info!("dropping the empty handle");
    drop(handle);
}
