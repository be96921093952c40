//! Showcase scene planning core
//!
//! Decides where the camera, lights and assets go for product-showcase clips
//! and how they move over time:
//! - Scene session: arena hierarchies of imported assets and their world bounds
//! - Camera fit and light rigs derived from the subject size
//! - Lineup arrangement with periodic padding
//! - Turntable spins and seamlessly looping lineup travel
//! - Stage plans: the serializable hand-off to the renderer host

pub mod animation;
pub mod camera;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod light;
pub mod lineup;
pub mod math;
pub mod pipeline;
pub mod scene;

pub use animation::*;
pub use camera::*;
pub use config::*;
pub use constants::*;
pub use environment::*;
pub use error::*;
pub use light::*;
pub use lineup::*;
pub use math::*;
pub use pipeline::*;
pub use scene::*;
