use std::sync::Arc;

use tracing::{debug, info};
use warren_broker::{BrokerAdmin, BrokerAdminError};

use crate::Error;

/// Makes sure broker plugins are enabled.
#[derive(Debug)]
pub struct PluginEnabler<A> {
    admin: Arc<A>,
}

impl<A> PluginEnabler<A>
where
    A: BrokerAdmin,
{
    /// Creates an enabler acting through `admin`.
    pub const fn new(admin: Arc<A>) -> Self {
        Self { admin }
    }

    /// Enable whichever of `plugins` are not already enabled, returning those
    /// that were newly enabled.
    ///
    /// # Errors
    ///
    /// Returns `Error::Plugin` if plugins cannot be listed or enabled.
    pub async fn ensure_enabled(&self, plugins: &[String]) -> Result<Vec<String>, Error> {
        let enabled = self
            .admin
            .list_enabled_plugins()
            .await
            .map_err(plugin_error)?;

        let mut newly_enabled = Vec::new();
        for plugin in plugins {
            if enabled.contains(plugin) || newly_enabled.contains(plugin) {
                debug!("plugin {} already enabled", plugin);
                continue;
            }

            self.admin
                .enable_plugin(plugin)
                .await
                .map_err(plugin_error)?;
            info!("plugin {} enabled", plugin);

            newly_enabled.push(plugin.clone());
        }

        Ok(newly_enabled)
    }
}

fn plugin_error<E: BrokerAdminError>(e: E) -> Error {
    Error::Plugin {
        kind: e.kind(),
        message: e.to_string(),
    }
}
