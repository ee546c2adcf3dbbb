pub mod camera;
pub mod scene;

pub use camera::Camera;
pub use scene::{Model, Scene};
