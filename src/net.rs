//! Connection establishment for the WHOIS transport: plain dual-stack TCP
//! with optional IPv6 source rotation, or SOCKS5 when the `SOCKS`
//! environment variable is set.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio::time::timeout;
use tokio_socks::tcp::Socks5Stream;
use tracing::debug;

use crate::errors::WhoisError;

pub const WHOIS_PORT: u16 = 43;

pub trait WhoisStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> WhoisStream for T {}

pub type BoxedStream = Box<dyn WhoisStream>;

/// Opens the stream a query runs over. Injectable so tests never touch
/// real DNS or the environment.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, host: &str, deadline: Duration) -> Result<BoxedStream, WhoisError>;
}

/// Iterator of local IPv6 addresses used to rotate the egress IP; the
/// transport pulls at most one per IPv6 connection attempt.
pub type Ipv6SourceCycle = Box<dyn Iterator<Item = Ipv6Addr> + Send>;

pub struct TcpConnector {
    prefer_ipv6: bool,
    ipv6_sources: Option<Mutex<Ipv6SourceCycle>>,
}

impl TcpConnector {
    pub fn new(prefer_ipv6: bool) -> Self {
        Self {
            prefer_ipv6,
            ipv6_sources: None,
        }
    }

    pub fn with_ipv6_sources(prefer_ipv6: bool, sources: Ipv6SourceCycle) -> Self {
        Self {
            prefer_ipv6,
            ipv6_sources: Some(Mutex::new(sources)),
        }
    }

    fn next_ipv6_source(&self) -> Option<Ipv6Addr> {
        let cycle = self.ipv6_sources.as_ref()?;
        cycle.lock().ok()?.next()
    }

    async fn connect_addr(&self, addr: SocketAddr) -> Result<TcpStream, WhoisError> {
        let stream = match addr {
            SocketAddr::V6(_) => match self.next_ipv6_source() {
                Some(source) => {
                    let socket = TcpSocket::new_v6()?;
                    socket.bind(SocketAddr::new(IpAddr::V6(source), 0))?;
                    socket.connect(addr).await?
                }
                None => TcpStream::connect(addr).await?,
            },
            SocketAddr::V4(_) => TcpStream::connect(addr).await?,
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("failed to set TCP_NODELAY: {e}");
        }

        Ok(stream)
    }

    async fn connect_direct(&self, host: &str, deadline: Duration) -> Result<BoxedStream, WhoisError> {
        // One deadline across resolution and every address attempt.
        timeout(deadline, async {
            let mut addrs: Vec<SocketAddr> = lookup_host((host, WHOIS_PORT)).await?.collect();
            if self.prefer_ipv6 {
                addrs.sort_by_key(|addr| !addr.is_ipv6());
            }

            let mut last_err = None;
            for addr in addrs {
                match self.connect_addr(addr).await {
                    Ok(stream) => return Ok(Box::new(stream) as BoxedStream),
                    Err(e) => {
                        debug!("connection attempt to {addr} failed: {e}");
                        last_err = Some(e);
                    }
                }
            }

            Err(last_err
                .unwrap_or_else(|| WhoisError::Network(format!("could not connect to {host}"))))
        })
        .await?
    }

    async fn connect_socks(
        &self,
        raw: &str,
        host: &str,
        deadline: Duration,
    ) -> Result<BoxedStream, WhoisError> {
        let proxy = parse_socks_env(raw)?;
        let target = (host, WHOIS_PORT);

        let stream = timeout(deadline, async {
            match &proxy.auth {
                Some((user, password)) => {
                    Socks5Stream::connect_with_password(proxy.addr.as_str(), target, user, password)
                        .await
                }
                None => Socks5Stream::connect(proxy.addr.as_str(), target).await,
            }
        })
        .await?
        .map_err(|e| WhoisError::Network(format!("SOCKS proxy error: {e}")))?;

        Ok(Box::new(stream))
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, deadline: Duration) -> Result<BoxedStream, WhoisError> {
        // Read at connect time, never cached.
        match std::env::var("SOCKS") {
            Ok(proxy) => self.connect_socks(&proxy, host, deadline).await,
            Err(_) => self.connect_direct(host, deadline).await,
        }
    }
}

pub(crate) struct SocksProxy {
    pub addr: String,
    pub auth: Option<(String, String)>,
}

/// Parse the `SOCKS` variable: `[user:pass@]host:port`.
pub(crate) fn parse_socks_env(raw: &str) -> Result<SocksProxy, WhoisError> {
    let (auth, addr) = match raw.split_once('@') {
        Some((credentials, addr)) => {
            let (user, password) = credentials.split_once(':').ok_or_else(|| {
                WhoisError::InvalidQuery(format!(
                    "SOCKS credentials must be user:pass, got {credentials:?}"
                ))
            })?;
            (Some((user.to_string(), password.to_string())), addr)
        }
        None => (None, raw),
    };

    if addr.rsplit_once(':').is_none() {
        return Err(WhoisError::InvalidQuery(format!(
            "SOCKS proxy must be host:port, got {addr:?}"
        )));
    }

    Ok(SocksProxy {
        addr: addr.to_string(),
        auth,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted connector for transport-free tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[derive(Default)]
    pub(crate) struct MockConnector {
        replies: HashMap<String, String>,
        queries: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl MockConnector {
        pub(crate) fn with_reply(mut self, host: &str, reply: &str) -> Self {
            self.replies.insert(host.to_string(), reply.to_string());
            self
        }

        /// Shared log of `(host, query-line)` pairs in send order.
        pub(crate) fn queries(&self) -> Arc<Mutex<Vec<(String, String)>>> {
            self.queries.clone()
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        async fn connect(
            &self,
            host: &str,
            _deadline: Duration,
        ) -> Result<BoxedStream, WhoisError> {
            let reply = self
                .replies
                .get(host)
                .cloned()
                .ok_or_else(|| WhoisError::Network(format!("connection refused by {host}")))?;

            let (client, mut server) = tokio::io::duplex(64 * 1024);
            let host = host.to_string();
            let queries = self.queries.clone();

            tokio::spawn(async move {
                let mut received = Vec::new();
                let mut buffer = [0u8; 512];
                while !received.ends_with(b"\r\n") {
                    match server.read(&mut buffer).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => received.extend_from_slice(&buffer[..n]),
                    }
                }
                let query = String::from_utf8_lossy(&received).trim_end().to_string();
                queries.lock().unwrap().push((host, query));
                let _ = server.write_all(reply.as_bytes()).await;
                // Dropping the server half closes the stream (EOF).
            });

            Ok(Box::new(client))
        }
    }
}
