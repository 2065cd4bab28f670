//! Weight editing and association resolution for Application Load Balancer
//! cloudlets.
//!
//! The crate reads load-balancing configurations from the cloudlets control
//! plane, rewrites their data-center weights, and publishes the result as a
//! new version. It also walks the graph that links properties to policies,
//! policies to load-balancing IDs, and load-balancing IDs to origins.
//!
//! # Pipeline
//!
//! - [`VersionResolver`] finds the version active on a network and fetches it
//! - [`OriginIndex`] maps data-center names to positions
//! - [`weights::apply`] rewrites weights on a copy and enforces the 100 total
//! - [`Publisher`] creates the new version and activates it
//!
//! [`run_update`] chains these steps. [`AssociationResolver`] is the separate
//! read-only path used for searches.
//!
//! # Transport
//!
//! Every remote call goes through the [`ControlPlane`] trait.
//! [`EdgeGridClient`] implements it with `EG1-HMAC-SHA256` signed blocking
//! requests; tests use in-memory implementations.
//!
//! # Example
//!
//! ```ignore
//! use alb_cloudlets::{EdgeGridClient, WeightUpdate, run_update};
//!
//! let client = EdgeGridClient::new(&credentials, timeout)?;
//! let request = WeightUpdate::new("alb_example", "Dallas:10,Fairfield:90".parse()?);
//! let outcome = run_update(&client, &request)?;
//! ```

mod associations;
mod client;
mod error;
mod http;
mod index;
mod model;
mod publish;
pub mod signing;
mod update;
mod versions;
pub mod weights;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use associations::{
    AssociationEntry, AssociationResolver, AssociationTable, LoadBalancerLinks, PolicyAssociation,
    PolicyVersion, ResolveError,
};
pub use client::ControlPlane;
pub use error::ApiError;
pub use http::EdgeGridClient;
pub use index::OriginIndex;
pub use model::{
    Activation, ActivationRequest, ActivationStatus, ActiveVersionInfo, CurrentActivations,
    DataCenterEntry, ForwardSettings, LoadBalancerConfiguration, MatchRule, Network, NewVersion,
    Policy, PolicyId, PolicyVersionDocument,
};
pub use publish::{PublishError, Publisher};
pub use update::{
    ActivationOutcome, UpdateError, UpdateOutcome, WeightUpdate, clone_description, run_update,
};
pub use versions::VersionResolver;
pub use weights::{OverrideParseError, WeightError, WeightOverrides};

#[cfg(test)]
mod tests;
