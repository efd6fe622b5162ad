pub mod modules;
pub mod relay;
pub mod upstream;

pub use crate::domain::model::{DispatchStrategy, ModuleSpec, RelayRequest, UpstreamCredentials};
pub use crate::domain::ports::UpstreamClient;
pub use crate::utils::error::Result;
