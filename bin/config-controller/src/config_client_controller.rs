//! ConfigClient controller for reconciling ConfigClient resources

use crate::config::ControllerConfig;
use config_api::ConfigClient;
use config_core::{ConfigClientReconciler, CoreError, KubeConfigMaps, Outcome, Request};
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use kube_runtime::controller::{self, Action, Controller};
use kube_runtime::reflector::Store;
use kube_runtime::watcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{info, debug, error};

/// Shared state handed to every reconcile
pub struct Context {
    reconciler: ConfigClientReconciler<Store<ConfigClient>, KubeConfigMaps>,
    error_requeue: Duration,
}

pub struct ConfigClientController {
    client: Client,
    config: ControllerConfig,
}

impl ConfigClientController {
    pub fn new(client: Client, config: ControllerConfig) -> Self {
        Self { client, config }
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match &self.config.namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        info!(
            "Starting ConfigClient reconciliation in {} with {} workers",
            self.config.namespace.as_deref().unwrap_or("all namespaces"),
            self.config.workers
        );

        let config_clients: Api<ConfigClient> = self.api();
        let config_maps: Api<ConfigMap> = self.api();

        // Watch ConfigClients and the ConfigMaps they own
        let mut controller = Controller::new(config_clients, watcher::Config::default())
            .owns(config_maps, watcher::Config::default())
            .with_config(controller::Config::default().concurrency(self.config.workers));
        if let Some(period) = self.config.resync_period() {
            controller = controller.reconcile_all_on(resync(period));
        }

        let context = Arc::new(Context {
            reconciler: ConfigClientReconciler::new(
                controller.store(),
                KubeConfigMaps::new(self.client.clone()),
            ),
            error_requeue: self.config.error_requeue(),
        });

        let mut stream = controller.run(reconcile, error_policy, context).boxed();

        // Process the reconciliation stream
        while let Some(item) = stream.next().await {
            match item {
                Ok((object, _)) => debug!("Reconciled {} successfully", object),
                Err(e) => error!("Error in reconciliation stream: {}", e),
            }
        }

        Ok(())
    }
}

async fn reconcile(
    config_client: Arc<ConfigClient>,
    ctx: Arc<Context>,
) -> Result<Action, CoreError> {
    let request = Request::for_object(&config_client)?;
    debug!("Dispatching ConfigClient: {}", request);

    let outcome = ctx.reconciler.reconcile(&request).await?;
    Ok(outcome.into())
}

fn error_policy(
    config_client: Arc<ConfigClient>,
    error: &CoreError,
    ctx: Arc<Context>,
) -> Action {
    error!(
        "Error reconciling ConfigClient {}/{}: {}",
        config_client.namespace().unwrap_or_default(),
        config_client.name_any(),
        error
    );
    Outcome::RequeueAfter(ctx.error_requeue).into()
}

/// Ticks once per `period`, starting one period from now
fn resync(period: Duration) -> impl Stream<Item = ()> + Send + Sync + 'static {
    futures::stream::unfold(
        interval_at(Instant::now() + period, period),
        |mut interval| async move {
            interval.tick().await;
            Some(((), interval))
        },
    )
}
