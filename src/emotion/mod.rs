pub mod dataset;
pub mod features;
pub mod label;
pub mod live;
pub mod model;

pub use label::Emotion;
