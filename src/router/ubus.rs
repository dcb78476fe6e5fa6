use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::rpc::{
    self, Call, Reply, ANONYMOUS_SESSION, RPC_ACCESS_DENIED, STATUS_PERMISSION_DENIED,
};
use super::{url_join, CounterSource, Counters, UbusError};
use crate::config::RouterConfig;

/// ubus JSON-RPC client holding one authenticated session
pub struct UbusClient {
    http: Client,
    endpoint: String,
    user: String,
    password: String,
    interface: String,
    session: String,
}

impl UbusClient {
    /// Build the HTTP client and establish a session
    pub fn connect(cfg: &RouterConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(cfg.request_timeout)
            .connect_timeout(cfg.request_timeout.min(Duration::from_secs(3)))
            .build()
            .context("building HTTP client")?;

        let mut client = Self {
            http,
            endpoint: url_join(&cfg.url, "/ubus/"),
            user: cfg.user.clone(),
            password: cfg.password.clone(),
            interface: cfg.interface.clone(),
            session: String::new(),
        };
        client.session = client.acquire_session()?;
        log::info!("ubus session established with {}", client.endpoint);
        Ok(client)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn post<B, R>(&self, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .json(body)
            .send()
            .with_context(|| format!("POST {}", self.endpoint))?;

        let status = response.status();
        if status.as_u16() > 299 {
            return Err(UbusError::HttpStatus(status.as_u16()).into());
        }
        response.json::<R>().context("decoding ubus response")
    }

    fn acquire_session(&self) -> Result<String> {
        let reply: Reply = self.post(&Call::new(1, ANONYMOUS_SESSION, "admb", "getSid"))?;
        rpc::parse_session(reply).context("acquiring ubus session")
    }

    fn fetch_counters(&self) -> Result<Counters> {
        let batch = [Call::new(32, &self.session, "luci-rpc", "getNetworkDevices")];
        let replies: Vec<Reply> = self.post(&batch[..])?;
        Ok(rpc::extract_counters(replies, &self.interface)?)
    }
}

impl CounterSource for UbusClient {
    /// Read the interface counters, logging in again once if the session expired
    fn read_counters(&mut self) -> Result<Counters> {
        match self.fetch_counters() {
            Err(e) if session_expired(&e) => {
                log::warn!("ubus session expired, logging in again");
                self.session = self.acquire_session()?;
                self.fetch_counters()
            }
            other => other,
        }
    }
}

fn session_expired(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<UbusError>(),
        Some(UbusError::Status(STATUS_PERMISSION_DENIED))
            | Some(UbusError::Rpc {
                code: RPC_ACCESS_DENIED,
                ..
            })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_means_expired_session() {
        let err: anyhow::Error = UbusError::Status(STATUS_PERMISSION_DENIED).into();
        assert!(session_expired(&err));
    }

    #[test]
    fn access_denied_fault_means_expired_session() {
        let err: anyhow::Error = UbusError::Rpc {
            code: RPC_ACCESS_DENIED,
            message: "Access denied".into(),
        }
        .into();
        assert!(session_expired(&err));
    }

    #[test]
    fn other_failures_are_not_retried() {
        let err: anyhow::Error = UbusError::Status(4).into();
        assert!(!session_expired(&err));
        let err: anyhow::Error = UbusError::MissingInterface("wan".into()).into();
        assert!(!session_expired(&err));
        let err: anyhow::Error = UbusError::Rpc {
            code: -32601,
            message: "Method not found".into(),
        }
        .into();
        assert!(!session_expired(&err));
        assert!(!session_expired(&anyhow::anyhow!("connection refused")));
    }
}
