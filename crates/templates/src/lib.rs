//! Organization deployment from pre-published on-chain templates.
//!
//! Standing up one organization takes two related transactions against the
//! template contract: mint the governance token, then instantiate the
//! organization that wraps it. This crate orchestrates both and merges their
//! lifecycles into a single progress feed:
//!
//! 1. [`Catalog`] maps a template name to its interface description, registry
//!    id and ordered parameter names (static configuration).
//! 2. [`Deployer::new_org`] resolves the template, and the returned
//!    [`Deployment`] submits both transactions on subscription, each tracked
//!    into a finite `SIGNED -> MINED | ERROR` event sequence.
//! 3. The two sequences are fanned into one [`ProgressStream`] that terminates
//!    exactly when both transactions have reached a terminal state.
//!
//! [`is_name_used`] is an independent utility checking whether an organization
//! name is already claimed in the naming registry.

pub mod catalog;
pub mod names;
pub mod orchestrator;
pub mod progress;

mod tracker;

pub use catalog::{Catalog, TemplateDescriptor};
pub use names::{is_name_used, NameCheckError, ORG_NAME_DOMAIN};
pub use orchestrator::{
    DeployError, DeployRequest, Deployer, Deployment, ProgressItem, ProgressStream,
    ORG_CREATION_GAS, TOKEN_CREATION_GAS,
};
pub use progress::{ProgressEvent, ProgressMeta, TxKind, TxStatus};
