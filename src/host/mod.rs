//! Boundary to the embedding application
//!
//! The orchestrator never drives lifecycle events itself. It asks the host
//! whether an event already fired, subscribes callbacks for the ones that
//! did not, and lets the host rewrite configuration tables through named
//! extension points.

pub mod dispatcher;

pub use dispatcher::EventDispatcher;

use crate::core::WireResult;
use crate::orchestrator::{ArgumentTable, BindingTable, DelegationTable, ServiceTable, SharedTable};

/// Zero-argument callback run when an event fires.
pub type Callback = Box<dyn FnOnce() -> WireResult<()>>;

/// Services the embedding application provides to the orchestrator.
pub trait Host {
    /// Run `callback` the next time `event` fires
    fn subscribe(&self, event: &str, callback: Callback);

    /// Whether `event` already fired at least once
    fn has_fired(&self, event: &str) -> bool;

    /// Let the application add, remove or replace entries of a table.
    ///
    /// The default leaves every table untouched.
    fn apply_extension(&self, _name: &str, table: ExtensionTable) -> ExtensionTable {
        table
    }
}

/// Any of the configuration tables, as handed to an extension point.
pub enum ExtensionTable {
    Services(ServiceTable),
    Bindings(BindingTable),
    Arguments(ArgumentTable),
    SharedInstances(SharedTable),
    Delegations(DelegationTable),
}

impl ExtensionTable {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtensionTable::Services(_) => ServiceTable::KIND,
            ExtensionTable::Bindings(_) => BindingTable::KIND,
            ExtensionTable::Arguments(_) => ArgumentTable::KIND,
            ExtensionTable::SharedInstances(_) => SharedTable::KIND,
            ExtensionTable::Delegations(_) => DelegationTable::KIND,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ExtensionTable::Services(table) => table.len(),
            ExtensionTable::Bindings(table) => table.len(),
            ExtensionTable::Arguments(table) => table.len(),
            ExtensionTable::SharedInstances(table) => table.len(),
            ExtensionTable::Delegations(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A table type that can travel through an extension point.
pub trait ExtensibleTable: Sized {
    /// Human readable table name, used in shape errors
    const KIND: &'static str;

    fn into_extension(self) -> ExtensionTable;

    /// Take the table back, or return what the extension point produced instead
    fn from_extension(table: ExtensionTable) -> Result<Self, ExtensionTable>;
}

macro_rules! extensible_table {
    ($table:ty, $variant:ident, $kind:literal) => {
        impl ExtensibleTable for $table {
            const KIND: &'static str = $kind;

            fn into_extension(self) -> ExtensionTable {
                ExtensionTable::$variant(self)
            }

            fn from_extension(table: ExtensionTable) -> Result<Self, ExtensionTable> {
                match table {
                    ExtensionTable::$variant(table) => Ok(table),
                    other => Err(other),
                }
            }
        }
    };
}

extensible_table!(ServiceTable, Services, "services");
extensible_table!(BindingTable, Bindings, "bindings");
extensible_table!(ArgumentTable, Arguments, "arguments");
extensible_table!(SharedTable, SharedInstances, "shared instances");
extensible_table!(DelegationTable, Delegations, "delegations");
