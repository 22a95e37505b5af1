use crate::core::{ConfigurationError, WireResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Orchestrator settings, passed explicitly at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether configuration tables are routed through host extension points
    #[serde(default = "default_true")]
    pub enable_extensions: bool,

    /// Prefix for extension point names
    /// Example: "acme." turns the `services` extension point into "acme.services"
    #[serde(default)]
    pub hook_prefix: String,

    /// Prefix for the well-known service ids seeded by the orchestrator
    #[serde(default)]
    pub service_prefix: String,

    /// Host event that triggers the registration pass
    #[serde(default = "default_registration_event")]
    pub registration_event: String,

    /// Id the injector itself is stored under in the container
    #[serde(default = "default_injector_id")]
    pub injector_id: String,
}

fn default_true() -> bool {
    true
}

fn default_registration_event() -> String {
    "plugins_loaded".to_string()
}

fn default_injector_id() -> String {
    "injector".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_extensions: true,
            hook_prefix: String::new(),
            service_prefix: String::new(),
            registration_event: default_registration_event(),
            injector_id: default_injector_id(),
        }
    }
}

impl Settings {
    /// Full name of an extension point
    pub fn extension_name(&self, extension: &str) -> String {
        format!("{}{}", self.hook_prefix, extension)
    }

    /// Container id of the injector
    pub fn injector_service_id(&self) -> String {
        format!("{}{}", self.service_prefix, self.injector_id)
    }
}

/// Declarative manifest document.
///
/// Holds the tables that can be written down as data. Delegates, factories
/// and class descriptors are code and are added on the
/// [`ServiceManifest`](crate::orchestrator::ServiceManifest) directly.
///
/// ```yaml
/// settings:
///   registration_event: init
/// services:
///   mailer: Mailer
/// bindings:
///   Transport: SmtpTransport
/// shared_instances:
///   - SmtpTransport
/// arguments:
///   SmtpTransport:
///     host: localhost
///   __global__:
///     timeout: 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(default)]
    pub settings: Settings,

    /// Service id -> class name
    #[serde(default)]
    pub services: IndexMap<String, String>,

    /// Interface or class -> replacement class
    #[serde(default)]
    pub bindings: IndexMap<String, String>,

    #[serde(default)]
    pub shared_instances: Vec<String>,

    /// Class (or `__global__`) -> argument name -> value
    #[serde(default)]
    pub arguments: IndexMap<String, IndexMap<String, Value>>,
}

impl ManifestConfig {
    pub fn from_yaml_str(content: &str) -> WireResult<Self> {
        let config = serde_yaml::from_str(content).map_err(ConfigurationError::from)?;
        Ok(config)
    }

    /// Load a manifest from a YAML file
    pub fn load(path: impl AsRef<Path>) -> WireResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(ConfigurationError::from)?;
        Self::from_yaml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> WireResult<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigurationError::from)?;
        fs::write(path.as_ref(), content).map_err(ConfigurationError::from)?;
        Ok(())
    }
}
