//! Nesting limits applied while decoding layers.
//!
//! The binary decoder has no recursion limit of its own, so every recursive
//! serialized type enters a [`NestingGuard`] before decoding its contents.
//! The counters are per thread and the guard releases its level on drop,
//! including when decoding fails part way.

use std::cell::Cell;
use std::thread::LocalKey;

use serde::de::Error;

/// Deepest [`Value`](super::Value) nesting a layer may hold. A scalar has
/// depth 1.
pub const MAX_VALUE_DEPTH: usize = 32;

thread_local! {
    static VALUE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PRIM_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Which recursive structure a guard counts.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Nesting {
    Value,
    Prim,
}

impl Nesting {
    fn counter(self) -> &'static LocalKey<Cell<usize>> {
        match self {
            Self::Value => &VALUE_DEPTH,
            Self::Prim => &PRIM_DEPTH,
        }
    }

    fn limit(self) -> usize {
        match self {
            Self::Value => MAX_VALUE_DEPTH,
            Self::Prim => crate::scene::path::MAX_DEPTH,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Value => "metadata values",
            Self::Prim => "prims",
        }
    }
}

/// One level of nesting held for the lifetime of the guard.
pub(crate) struct NestingGuard(Nesting);

impl NestingGuard {
    pub fn enter<E: Error>(nesting: Nesting) -> Result<Self, E> {
        let depth = nesting.counter().with(|depth| {
            depth.set(depth.get() + 1);
            depth.get()
        });
        let guard = Self(nesting);
        if depth > nesting.limit() {
            return Err(E::custom(format!(
                "{} nested deeper than {} levels",
                nesting.label(),
                nesting.limit()
            )));
        }
        Ok(guard)
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        self.0
            .counter()
            .with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
