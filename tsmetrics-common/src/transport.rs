//! Sink endpoints and the sockets that carry encoded measurements.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
#[cfg(unix)]
use tokio::net::UnixStream;

use crate::error::{Error, Result};

/// Where measurements are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SinkEndpoint {
    /// Unix stream socket path.
    Unix(PathBuf),
    /// TCP `host:port`.
    Tcp(String),
    /// UDP `host:port`.
    Udp(String),
}

impl SinkEndpoint {
    /// Get the scheme name used in endpoint URLs.
    pub fn scheme(&self) -> &'static str {
        match self {
            SinkEndpoint::Unix(_) => "unix",
            SinkEndpoint::Tcp(_) => "tcp",
            SinkEndpoint::Udp(_) => "udp",
        }
    }
}

impl FromStr for SinkEndpoint {
    type Err = Error;

    fn from_str(url: &str) -> Result<Self> {
        let (scheme, rest) = url
            .split_once(':')
            .ok_or_else(|| Error::endpoint(url, "expected unix:, tcp: or udp: prefix"))?;

        match scheme {
            "unix" => {
                if rest.is_empty() {
                    return Err(Error::endpoint(url, "missing socket path"));
                }
                Ok(SinkEndpoint::Unix(PathBuf::from(rest)))
            }
            "tcp" => validate_host_port(url, rest).map(SinkEndpoint::Tcp),
            "udp" => validate_host_port(url, rest).map(SinkEndpoint::Udp),
            other => Err(Error::endpoint(url, format!("unknown scheme '{}'", other))),
        }
    }
}

fn validate_host_port(url: &str, addr: &str) -> Result<String> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| Error::endpoint(url, "expected host:port"))?;

    if host.is_empty() {
        return Err(Error::endpoint(url, "missing host"));
    }
    port.parse::<u16>()
        .map_err(|_| Error::endpoint(url, format!("invalid port '{}'", port)))?;

    Ok(addr.to_string())
}

impl fmt::Display for SinkEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkEndpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            SinkEndpoint::Tcp(addr) => write!(f, "tcp:{}", addr),
            SinkEndpoint::Udp(addr) => write!(f, "udp:{}", addr),
        }
    }
}

/// An open connection to a sink endpoint.
#[derive(Debug)]
pub enum SinkConnection {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
    Udp(UdpSocket),
}

impl SinkConnection {
    /// Send one encoded payload.
    ///
    /// Stream transports write the whole buffer; UDP sends it as a single
    /// datagram.
    pub async fn send(&mut self, payload: &[u8]) -> Result<()> {
        match self {
            #[cfg(unix)]
            SinkConnection::Unix(stream) => stream.write_all(payload).await?,
            SinkConnection::Tcp(stream) => stream.write_all(payload).await?,
            SinkConnection::Udp(socket) => {
                let sent = socket.send(payload).await?;
                if sent != payload.len() {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::WriteZero,
                        format!("datagram truncated ({} of {} bytes)", sent, payload.len()),
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Connect to a sink endpoint.
pub async fn connect(endpoint: &SinkEndpoint) -> Result<SinkConnection> {
    tracing::info!(endpoint = %endpoint, "Connecting to metrics sink");

    let connect_error = |source| Error::Connect {
        endpoint: endpoint.to_string(),
        source,
    };

    let connection = match endpoint {
        #[cfg(unix)]
        SinkEndpoint::Unix(path) => {
            SinkConnection::Unix(UnixStream::connect(path).await.map_err(connect_error)?)
        }
        #[cfg(not(unix))]
        SinkEndpoint::Unix(_) => {
            return Err(Error::endpoint(
                endpoint.to_string(),
                "unix sockets are not supported on this platform",
            ));
        }
        SinkEndpoint::Tcp(addr) => {
            let stream = TcpStream::connect(addr.as_str())
                .await
                .map_err(connect_error)?;
            stream.set_nodelay(true).map_err(connect_error)?;
            SinkConnection::Tcp(stream)
        }
        SinkEndpoint::Udp(addr) => {
            let bind = if addr.starts_with('[') {
                "[::]:0"
            } else {
                "0.0.0.0:0"
            };
            let socket = UdpSocket::bind(bind).await.map_err(connect_error)?;
            socket
                .connect(addr.as_str())
                .await
                .map_err(connect_error)?;
            SinkConnection::Udp(socket)
        }
    };

    tracing::info!(endpoint = %endpoint, "Connected to metrics sink");

    Ok(connection)
}
