pub mod api;
pub mod hostname;
pub mod labels;
pub mod types;

pub use hostname::{HostnameCodec, MalformedHostname};
pub use labels::{Labels, LabelsCollection};
pub use types::{NetworkEndpoint, Port, Protocol, Service, ServiceInstance};
