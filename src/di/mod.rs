//! Service-side dependency injection infrastructure
//!
//! The container that holds constructed services, the capability traits a
//! service type can implement and the [`ServiceClass`] builder that records
//! those capabilities on the type's class descriptor.
//!
//! # Example
//! ```
//! use servicewire::di::{HasDependencies, Service, ServiceClass};
//! use servicewire::injector::{Arguments, ClassDescriptor, Injectable};
//! use servicewire::core::InjectorResult;
//!
//! struct Newsletter;
//!
//! impl Service for Newsletter {}
//!
//! impl HasDependencies for Newsletter {
//!     fn dependencies() -> &'static [&'static str] {
//!         &["mailer"]
//!     }
//! }
//!
//! impl Injectable for Newsletter {
//!     const NAME: &'static str = "Newsletter";
//!
//!     fn construct(_args: &Arguments<'_>) -> InjectorResult<Self> {
//!         Ok(Newsletter)
//!     }
//! }
//!
//! let descriptor: ClassDescriptor = ServiceClass::<Newsletter>::new()
//!     .with_dependencies()
//!     .into();
//! let dependencies = descriptor.capabilities().dependencies.unwrap();
//! assert_eq!(dependencies(), ["mailer"]);
//! ```

pub mod class;
pub mod container;
pub mod mocks;
pub mod traits;

// Re-export key types
pub use class::ServiceClass;
pub use container::ServiceContainer;
pub use traits::{
    Activateable, Conditional, Deactivateable, Delayed, HasDependencies, Registerable, Service,
};
