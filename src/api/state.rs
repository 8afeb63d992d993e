// src/api/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::rate_limit::FixedWindowLimiter;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub client: Client,
    pub limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.upstream_timeout);

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = reqwest::Proxy::all(proxy_config.url())?;
            if let (Some(user), Some(pass)) = (&proxy_config.username, &proxy_config.password) {
                proxy = proxy.basic_auth(user, pass);
            }
            builder = builder.proxy(proxy);
        }

        let limiter = Arc::new(FixedWindowLimiter::new(config.rate_limit.clone()));

        Ok(Self {
            config: Arc::new(config),
            client: builder.build()?,
            limiter,
        })
    }
}
