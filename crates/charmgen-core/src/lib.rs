pub mod charm_ref;
pub mod config;
pub mod error;
pub mod types;

pub use charm_ref::{CharmReference, CharmSource, ResolvedIdentifier, ServiceIdentifier, TopologyService};
pub use config::{CatalogConfig, DeploymentConfig};
pub use error::CatalogError;
pub use types::*;
