//! Shared test helpers: a scripted in-memory transport.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use v20_client::{
    BrokerError, BrokerResult, HttpMethod, InstrumentCatalog, Transport, TransportResponse,
    V20Client,
};

pub const ACCOUNT: &str = "101-004-1234567-001";

/// One request as the transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: HttpMethod,
    pub endpoint: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<BrokerResult<TransportResponse>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    pub fn fail(&self, error: BrokerError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.endpoint).collect()
    }

    pub fn pending_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> BrokerResult<TransportResponse> {
        self.requests.lock().unwrap().push(Recorded {
            method,
            endpoint: endpoint.to_string(),
            body: body.cloned(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", method, endpoint))
    }
}

pub fn client(transport: &Arc<ScriptedTransport>) -> V20Client {
    V20Client::new(
        transport.clone(),
        Arc::new(InstrumentCatalog::standard()),
        ACCOUNT,
    )
}

pub fn path(suffix: &str) -> String {
    format!("/{}{}", ACCOUNT, suffix)
}
