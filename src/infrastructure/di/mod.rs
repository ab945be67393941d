//! Dependency injection: wiring settings and I/O into services

mod service_container;

pub use service_container::ServiceContainer;
