//! Typed callback relay between Rust handlers and the NewtonDynamics C API.
//!
//! A [`Relay`] is attached to a world and owns every persistent handler
//! registered for it. The engine calls small `extern "C"` trampolines which
//! find the handler of the object they were called for and forward the call
//! with typed arguments.
//!
//! Queries that take a closure (ray casts, iteration, serialization, mesh
//! operations) pass it to the engine for the duration of one call only.
pub use ffi;

#[macro_use]
mod macros;

pub mod array;
mod callbacks;
pub mod engine;
mod error;
pub mod handle;
pub mod handler;
#[cfg(feature = "mock")]
pub mod mock;
mod registry;
mod relay;

pub mod body;
pub mod collision;
pub mod joint;
pub mod material;
pub mod math;
pub mod mesh;
pub mod world;

// reexports
pub use body::{Body, BuoyancyParams};
pub use collision::{Collision, OwnedCollision};
#[cfg(feature = "native")]
pub use engine::Newton;
pub use engine::Engine;
pub use error::{Error, Result};
pub use handle::{AsHandle, Handle};
pub use joint::{Joint, JointStatus, JointStop, UpdateDesc};
pub use material::{GroupId, Material};
pub use mesh::Mesh;
pub use registry::CallbackKind;
pub use relay::{MonotonicClock, PerformanceClock, Relay, RelayConfig};
pub use world::{ConvexCastInfo, ConvexCastResult, NoPrefilter, World};
