pub mod client;
pub mod conversion;

pub use client::ConsulClient;
pub use conversion::TagTranslator;
