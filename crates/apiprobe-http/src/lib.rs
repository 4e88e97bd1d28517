// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Request dispatch layer for apiprobe.
//!
//! [`RequestDispatcher`] wraps a [`Transport`] with the session policy:
//! config-derived timeout and headers, repeated-key query encoding for list
//! parameters, and failure normalization. `request` always resolves to a
//! [`ResponseOutcome`]; transport failures become an error toast plus a
//! degraded outcome of the same shape.

pub mod descriptor;
pub mod dispatcher;
pub mod failure;
pub mod outcome;
pub mod query;
pub mod reqwest_transport;
pub mod transport;

pub use descriptor::{ParamValue, Params, RequestDescriptor};
pub use dispatcher::{RequestDispatcher, FAILURE_TOAST_DURATION};
pub use failure::{failure_message, FALLBACK_MESSAGE};
pub use outcome::ResponseOutcome;
pub use query::QueryEncoding;
pub use reqwest::header;
pub use reqwest::Method;
pub use reqwest_transport::ReqwestTransport;
pub use transport::{PreparedRequest, Transport, TransportError, TransportErrorKind};
pub use url::Url;
