use thiserror::Error;

pub type InjectorResult<T> = Result<T, InstantiationError>;

pub type WireResult<T> = Result<T, WireError>;

/// Failures raised while the injector builds an object graph.
#[derive(Error, Debug)]
pub enum InstantiationError {
    #[error("Circular reference detected while trying to resolve the interface or class \"{class}\" (chain: {path})", path = .chain.join(" <- "))]
    CircularReference { class: String, chain: Vec<String> },

    #[error("Could not resolve the interface \"{0}\" to an instantiable class, probably forgot to bind an implementation")]
    UnresolvedInterface(String),

    #[error("Could not reflect on the interface or class \"{0}\", no class descriptor was registered")]
    UnreflectableClass(String),

    #[error("Could not resolve the argument \"{argument}\" while trying to instantiate the class \"{class}\"")]
    UnresolvedArgument { argument: String, class: String },

    #[error("The argument \"{argument}\" of class \"{class}\" has an unexpected value: {reason}")]
    InvalidArgument {
        argument: String,
        class: String,
        reason: String,
    },

    #[error("Could not retrieve the shared instance for \"{0}\" as it was not instantiated yet")]
    UninstantiatedSharedInstance(String),

    #[error("The delegate for \"{0}\" did not produce a valid instance")]
    InvalidDelegate(String),

    #[error("Could not create a reflection for the class \"{0}\", the constructed type does not match its descriptor")]
    InvalidReflection(String),

    #[error("Access to injection chain before any resolution was made")]
    EmptyInjectionChain,
}

impl InstantiationError {
    /// Stable numeric code, so callers can tell failures apart without matching.
    pub fn code(&self) -> u16 {
        match self {
            InstantiationError::CircularReference { .. } => 100,
            InstantiationError::UnresolvedInterface(_) => 200,
            InstantiationError::UnreflectableClass(_) => 300,
            InstantiationError::UnresolvedArgument { .. } => 400,
            InstantiationError::InvalidArgument { .. } => 450,
            InstantiationError::UninstantiatedSharedInstance(_) => 500,
            InstantiationError::InvalidDelegate(_) => 600,
            InstantiationError::InvalidReflection(_) => 700,
            InstantiationError::EmptyInjectionChain => 800,
        }
    }
}

/// Failures tied to the declared service table.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("The identifier \"{0}\" is not valid and cannot be registered as a service")]
    InvalidIdentifier(String),

    #[error("The class name \"{0}\" is not valid and cannot be registered as a service")]
    InvalidClassName(String),

    #[error("The service \"{0}\" is not recognized and cannot be registered")]
    InvalidService(String),

    #[error("The service ID \"{0}\" is not recognized and cannot be retrieved")]
    ServiceNotFound(String),

    #[error("The service \"{id}\" is not a {expected}")]
    UnexpectedType { id: String, expected: &'static str },

    #[error("The service \"{service}\" depends on \"{dependency}\", which is not a declared service")]
    MissingService { service: String, dependency: String },

    #[error("Circular dependency detected between services: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },
}

/// Failures in the configuration tables handed to the orchestrator.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("The {table} configuration is a {found} table, expected a {expected} table")]
    InvalidTable {
        table: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("The argument map for \"{class}\" is invalid: {reason}")]
    InvalidArgumentMap { class: String, reason: String },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Instantiation error: {0}")]
    Instantiation(#[from] InstantiationError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
