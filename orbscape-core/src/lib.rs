/// Orbscape Core Library - Scene composition and per-frame animation
///
/// This library holds everything the render hosts share: procedural meshes,
/// transforms, the camera, materials and lighting, the Scene Composer, the
/// Frame Updater and the cancellable frame loop that drives them.

pub mod animation;
pub mod clock;
pub mod error;
pub mod frame_loop;
pub mod geometry;
pub mod lighting;
pub mod material;
pub mod pointer;
pub mod projection;
pub mod reveal;
pub mod scene;
pub mod transform;
pub mod viewport;

// Re-export commonly used types
pub use animation::{FrameInput, ScenePose};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{Error, Result};
pub use frame_loop::{
    CancellationToken, FrameLoop, FrameScheduler, FrameSink, FrameStatus, HostEvent, LoopState,
};
pub use geometry::{Mesh, Triangle, Vertex};
pub use lighting::{Lighting, PointLight};
pub use material::{Color, Material, PointMaterial};
pub use pointer::PointerState;
pub use projection::Camera;
pub use reveal::RevealConfig;
pub use scene::{Drawable, Group, Scene, SceneConfig, SceneObject, StarField};
pub use transform::{RotationState, Transform};
pub use viewport::Viewport;
