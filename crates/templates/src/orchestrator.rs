//! Deployment orchestrator.
//!
//! [`Deployer::new_org`] resolves the requested template in the catalog and
//! hands back a [`Deployment`]. Nothing touches the network until the caller
//! subscribes; subscription resolves the template's deployed contract through
//! the registry, submits the token-creation and organization-instantiation
//! transactions concurrently, and fans both trackers into one
//! [`ProgressStream`].
//!
//! The fan-in completion rule is carried by the channel itself: both trackers
//! hold clones of one mpsc sender, and the stream ends exactly when every
//! clone has been dropped, i.e. when both transaction legs are terminal. An
//! error on one leg never cancels the sibling; partial deployment is an
//! observable outcome the subscriber must handle.

use std::pin::Pin;
use std::task::{Context, Poll};

use chains::{CallOptions, RegistryError, SharedChainClient, SharedRegistry};
use common::CallValue;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, TemplateDescriptor};
use crate::progress::{ProgressEvent, TxKind};
use crate::tracker;

/// Gas limit for the token-creation transaction.
pub const TOKEN_CREATION_GAS: u64 = 4_000_000;

/// Gas limit for the organization-instantiation transaction.
pub const ORG_CREATION_GAS: u64 = 6_900_000;

/// Buffered events before trackers block on a slow subscriber.
const PROGRESS_CHANNEL_CAPACITY: usize = 16;

/// Error type for deployment setup.
///
/// Per-transaction runtime failures are never surfaced here; they arrive as
/// in-band `ERROR` progress events so the sibling transaction can still
/// complete.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeployError {
    /// Requested template name is absent from the catalog. Raised
    /// synchronously, before any network call.
    #[error("no template registered under name '{0}'")]
    UnknownTemplate(String),

    /// The registry knows no deployed contract for the template id. Delivered
    /// as the stream's single terminal error.
    #[error("no deployed contract found for template id '{0}'")]
    TemplateContractNotFound(String),

    /// The registry lookup itself failed. Delivered as the stream's single
    /// terminal error.
    #[error("template registry lookup failed: {0}")]
    Registry(#[from] RegistryError),
}

/// What the progress stream yields: in-band events, or a single terminal
/// setup error.
pub type ProgressItem = Result<ProgressEvent, DeployError>;

/// Caller request to stand up one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    /// Catalog name of the template to instantiate.
    pub template: String,
    /// Organization name; also used as the token's display name and symbol.
    pub org_name: String,
    /// Ordered instantiation parameters following the organization name.
    pub params: Vec<CallValue>,
}

/// Entry point for organization deployments.
pub struct Deployer {
    client: SharedChainClient,
    registry: SharedRegistry,
    catalog: Catalog,
}

impl Deployer {
    /// Deployer over the built-in template catalog.
    pub fn new(client: SharedChainClient, registry: SharedRegistry) -> Self {
        Self::with_catalog(client, registry, Catalog::builtin())
    }

    /// Deployer over a host-provided catalog.
    pub fn with_catalog(
        client: SharedChainClient,
        registry: SharedRegistry,
        catalog: Catalog,
    ) -> Self {
        Self {
            client,
            registry,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Prepare a deployment.
    ///
    /// Fails synchronously with [`DeployError::UnknownTemplate`] on a catalog
    /// miss; performs no I/O. The returned [`Deployment`] does nothing until
    /// subscribed.
    pub fn new_org(&self, request: DeployRequest) -> Result<Deployment, DeployError> {
        let template = self
            .catalog
            .get(&request.template)
            .cloned()
            .ok_or_else(|| DeployError::UnknownTemplate(request.template.clone()))?;

        let id = Uuid::new_v4();
        debug!(
            deployment = %id,
            template = %template.name,
            org = %request.org_name,
            "deployment prepared"
        );

        Ok(Deployment {
            id,
            template,
            request,
            client: self.client.clone(),
            registry: self.registry.clone(),
        })
    }
}

/// A prepared deployment, not yet started.
///
/// [`Deployment::subscribe`] consumes the handle: subscription is what
/// triggers contract resolution and transaction submission, and taking `self`
/// by value makes re-subscription (which would re-broadcast and re-pay both
/// transactions) unrepresentable.
pub struct Deployment {
    id: Uuid,
    template: TemplateDescriptor,
    request: DeployRequest,
    client: SharedChainClient,
    registry: SharedRegistry,
}

impl Deployment {
    /// Identifier used to tag this deployment's log records.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Start the deployment and return its merged progress stream.
    pub fn subscribe(self) -> ProgressStream {
        let (events, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        tokio::spawn(run(self, events));
        ProgressStream {
            inner: ReceiverStream::new(rx),
        }
    }
}

/// Setup task: resolve the template contract, submit both transactions, hand
/// the fan-in sender to the trackers.
async fn run(deployment: Deployment, events: mpsc::Sender<ProgressItem>) {
    let Deployment {
        id,
        template,
        request,
        client,
        registry,
    } = deployment;

    info!(
        deployment = %id,
        registry_id = %template.registry_id,
        "resolving template contract"
    );

    let address = match registry.latest_contract(&template.registry_id).await {
        Ok(Some(address)) => address,
        Ok(None) => {
            warn!(
                deployment = %id,
                registry_id = %template.registry_id,
                "no contract published for template"
            );
            let _ = events
                .send(Err(DeployError::TemplateContractNotFound(
                    template.registry_id,
                )))
                .await;
            return;
        }
        Err(err) => {
            warn!(deployment = %id, error = %err, "registry lookup failed");
            let _ = events.send(Err(err.into())).await;
            return;
        }
    };

    let contract = client.bind_contract(&template.abi, address);
    let from = client.sender();

    info!(
        deployment = %id,
        contract = %address,
        from = %from,
        org = %request.org_name,
        "submitting deployment transactions"
    );

    // Token name and symbol are both the organization name.
    let token_args = vec![
        CallValue::Text(request.org_name.clone()),
        CallValue::Text(request.org_name.clone()),
    ];
    let token_pending = contract.submit(
        "newToken",
        &token_args,
        &CallOptions {
            from,
            gas: TOKEN_CREATION_GAS,
        },
    );

    let mut org_args = Vec::with_capacity(request.params.len() + 1);
    org_args.push(CallValue::Text(request.org_name.clone()));
    org_args.extend(request.params);
    let org_pending = contract.submit(
        "newInstance",
        &org_args,
        &CallOptions {
            from,
            gas: ORG_CREATION_GAS,
        },
    );

    tracker::spawn(TxKind::Token, token_pending, events.clone());
    tracker::spawn(TxKind::Organization, org_pending, events);
    // Both trackers now hold the only senders; the stream closes when the
    // second one finishes.
}

/// Merged progress feed of one deployment.
///
/// Yields `Ok` progress events interleaved by arrival (per-kind order
/// preserved), or a single `Err` when setup failed, then ends. Dropping the
/// stream stops delivery but cannot retract transactions that were already
/// broadcast.
pub struct ProgressStream {
    inner: ReceiverStream<ProgressItem>,
}

impl ProgressStream {
    /// Receive the next item, `None` once both transactions are terminal.
    pub async fn recv(&mut self) -> Option<ProgressItem> {
        self.inner.next().await
    }
}

impl Stream for ProgressStream {
    type Item = ProgressItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
