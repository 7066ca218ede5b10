//! Scene-node handles consumed by the message list.
//!
//! Rendering is external; an [`Actor`] only carries the state the core reads
//! and writes (visibility, hover, scale, opacity, size requests, the child
//! tree) plus its signal registry.

mod actor;

pub use actor::{Actor, ActorSignal, WeakActor};

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique actor ID.
pub fn next_actor_id() -> u64 {
    NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed)
}
