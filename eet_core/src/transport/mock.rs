// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scripted transport for tests.

use std::{
    collections::VecDeque,
    sync::Mutex,
};

use async_trait::async_trait;

use super::{RegistrationTransport, TransportError, TransportOptions, TransportResponse};
use crate::service::ServiceEndpoint;

/// One recorded [`RegistrationTransport::invoke`] call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub url: String,
    pub soap_action: String,
    pub payload: String,
    pub options: TransportOptions,
}

/// Transport that answers from a scripted reply queue and records every
/// invocation it sees.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response.
    pub fn enqueue_response(&self, body: impl Into<String>, status: u16) {
        self.replies.lock().unwrap().push_back(Ok(TransportResponse {
            body: body.into(),
            status,
        }));
    }

    /// Queues a transport failure.
    pub fn enqueue_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Everything invoked so far, oldest first.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistrationTransport for MockTransport {
    async fn invoke(
        &self,
        endpoint: &ServiceEndpoint,
        soap_action: &str,
        payload: &str,
        options: &TransportOptions,
    ) -> Result<TransportResponse, TransportError> {
        self.invocations.lock().unwrap().push(Invocation {
            url: endpoint.url().to_string(),
            soap_action: soap_action.to_string(),
            payload: payload.to_string(),
            options: options.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Other {
                    detail: "no scripted reply left in the mock".to_string(),
                })
            })
    }
}
