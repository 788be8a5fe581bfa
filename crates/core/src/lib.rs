#![deny(unsafe_code)]
//! Core of the raybend beam renderer.
//!
//! Emitters shoot bundles of rays that bend through a field accumulated from
//! weighted point sources. Each ray is integrated with an adaptive step,
//! optionally stopped by a two-tier collision test, and shaded into
//! camera-facing billboard instances for an external instanced renderer.
//!
//! The per-frame entry point is [`BeamRenderer`]: feed it a [`FrameInputs`]
//! snapshot and a [`CollisionQuery`] and read back [`BeamRenderer::instances`].

pub mod camera;
pub mod colliders;
pub mod collision;
pub mod color;
pub mod config;
pub mod emitter;
pub mod error;
pub mod field;
pub mod field_source;
pub mod integrator;
pub mod params;
pub mod prng;
pub mod rebuild;
pub mod sampler;
pub mod shading;

pub use camera::CameraSnapshot;
pub use colliders::{Collider, Shape, StaticColliders};
pub use collision::{
    CollisionDetector, CollisionQuery, NarrowPhase, NoCollision, PlaneFilter, SphereSweep,
    SubdividedRaycast,
};
pub use color::Rgba;
pub use config::RendererConfig;
pub use emitter::{Emitter, EmitterPattern};
pub use error::RayError;
pub use field::{acceleration_at, FieldTuning, GlobalFieldParams};
pub use field_source::{FieldSource, Profile};
pub use integrator::{RaySample, RayTrace, Termination};
pub use prng::Xorshift64;
pub use rebuild::{BeamRenderer, FrameInputs};
pub use shading::{Instance, InstanceRecord};
