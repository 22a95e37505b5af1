//! Pluggable construction strategy

use super::arguments::Arguments;
use super::class::ClassDescriptor;
use super::Instance;
use crate::core::InjectorResult;

/// Turns a class descriptor and its resolved arguments into an instance.
///
/// Swap the implementation to wrap construction, e.g. for proxying or
/// instrumentation. The returned instance must be of the described type.
pub trait Instantiator {
    fn instantiate(
        &self,
        class: &ClassDescriptor,
        arguments: &Arguments<'_>,
    ) -> InjectorResult<Instance>;
}

/// Calls the constructor declared by the class.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstructorInstantiator;

impl Instantiator for ConstructorInstantiator {
    fn instantiate(
        &self,
        class: &ClassDescriptor,
        arguments: &Arguments<'_>,
    ) -> InjectorResult<Instance> {
        class.construct(arguments)
    }
}
