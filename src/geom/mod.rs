mod proj;

pub use proj::{bounds, Projection, Reprojector};
