//! Jobservice Test Stub
//!
//! Stand-ins for the control plane used by integration tests:
//!
//! - [`StubControlPlane`]: plain HTTP, records every request and answers
//!   with a fixed status and body.
//! - [`TlsStubControlPlane`]: HTTPS with a freshly generated self-signed
//!   certificate for `localhost`; answers `200` to every request it can read.
//!
//! Both bind an ephemeral port on `127.0.0.1` and stop when dropped.

mod http;
mod tls;

pub use http::{RecordedRequest, StubControlPlane};
pub use tls::TlsStubControlPlane;
