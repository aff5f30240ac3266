mod executor;
mod navigator;
mod request;
mod response;

pub use executor::RequestPipeline;
pub use navigator::{MemoryNavigator, Navigator};
