// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;

use crate::{CompletionRequest, LlmResponse, ModelError};

/// A remote completion backend.
///
/// One operation: send the composed conversation, get a normalized response
/// or a typed error. Implementations carry their own model id, credentials,
/// and endpoint; conversation bookkeeping lives elsewhere.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Stable provider id for status display and error messages.
    fn name(&self) -> &str;

    /// Model identifier as reported to users.
    fn model(&self) -> &str;

    /// Perform one completion call. No streaming; one request, one response.
    async fn complete(&self, req: CompletionRequest) -> Result<LlmResponse, ModelError>;
}
