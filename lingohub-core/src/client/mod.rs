// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Distribution service client
//!
//! - **Transport trait**: the HTTP seam (`ReqwestTransport` in production,
//!   `MockTransport` in tests)
//! - **UpdateClient**: the check request and archive download
//! - **Wire types**: request body, release descriptor, error envelope

mod api;
#[cfg(feature = "remote-updates")]
mod http;
mod mock;
mod transport;
mod types;

pub use api::{CheckOutcome, CheckRequest, ClientError, UpdateClient, CHECK_PATH};
#[cfg(feature = "remote-updates")]
pub use http::ReqwestTransport;
pub use mock::MockTransport;
pub use transport::{
    DownloadResponse, HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError,
    TransportResult,
};
pub use types::{
    parse_created_at, ArtifactDescriptor, CheckRequestBody, DescriptorError, ErrorResponse,
};
