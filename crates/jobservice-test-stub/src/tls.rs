use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};

const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

/// HTTPS control plane presenting a self-signed certificate for `localhost`.
pub struct TlsStubControlPlane {
  pub base_url: String,
  served: Arc<AtomicUsize>,
  handle: tokio::task::JoinHandle<()>,
}

impl TlsStubControlPlane {
  pub async fn spawn() -> Self {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
      .expect("failed to generate self-signed certificate");
    let cert = certified.cert.der().clone();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
      certified.key_pair.serialize_der(),
    ));

    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
      .with_safe_default_protocol_versions()
      .expect("no usable tls protocol versions")
      .with_no_client_auth()
      .with_single_cert(vec![cert], key)
      .expect("invalid certificate or key");
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0")
      .await
      .expect("failed to bind ephemeral port");
    let port = listener.local_addr().expect("listener has no local addr").port();
    let base_url = format!("https://localhost:{}", port);

    let served = Arc::new(AtomicUsize::new(0));
    let counter = served.clone();
    let handle = tokio::spawn(async move {
      while let Ok((stream, _)) = listener.accept().await {
        let acceptor = acceptor.clone();
        let counter = counter.clone();
        tokio::spawn(async move {
          // The handshake fails when the client rejects the certificate.
          let Ok(mut tls) = acceptor.accept(stream).await else {
            return;
          };
          if read_request(&mut tls).await.is_ok() {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tls.write_all(OK_RESPONSE).await;
            let _ = tls.shutdown().await;
          }
        });
      }
    });

    Self {
      base_url,
      served,
      handle,
    }
  }

  /// Requests that completed a TLS handshake and were answered.
  pub fn served(&self) -> usize {
    self.served.load(Ordering::SeqCst)
  }
}

impl Drop for TlsStubControlPlane {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

/// Read one HTTP/1.1 request: headers plus a `content-length` body.
async fn read_request<S: AsyncRead + Unpin>(stream: &mut S) -> io::Result<()> {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 1024];

  loop {
    if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
      let body_len = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
      if buf.len() >= end + 4 + body_len {
        return Ok(());
      }
    }

    let n = stream.read(&mut chunk).await?;
    if n == 0 {
      return Err(io::ErrorKind::UnexpectedEof.into());
    }
    buf.extend_from_slice(&chunk[..n]);
  }
}
