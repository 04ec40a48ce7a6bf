//! ServerQuery client over a byte stream (normally TCP port 10011).

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use super::codec::{is_status_line, parse_records, parse_status};
use super::command::Command;
use super::error::QueryError;
use super::session::{QuerySession, Response};

/// Greeting line every ServerQuery interface sends first.
const GREETING: &str = "TS3";

/// Longest response line accepted, terminator included.
const MAX_LINE_LEN: u64 = 1 << 20;

/// A ServerQuery connection.
///
/// Each [`execute`](QuerySession::execute) is one request/response exchange
/// bounded by the configured timeout. A timed-out exchange leaves unread
/// response lines on the wire, so the client refuses further commands.
pub struct ServerQueryClient<T = TcpStream> {
    stream: BufStream<T>,
    peer: String,
    timeout: Duration,
    desynchronized: bool,
}

impl ServerQueryClient<TcpStream> {
    /// Connect to `host:port` and consume the greeting.
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self, QueryError> {
        debug!(server = addr, "Connecting to ServerQuery");

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| QueryError::Timeout(timeout))??;
        stream.set_nodelay(true)?;

        Self::handshake(stream, addr, timeout).await
    }
}

impl<T> ServerQueryClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an established stream and consume the greeting.
    pub async fn handshake(
        stream: T,
        peer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, QueryError> {
        let mut client = Self {
            stream: BufStream::new(stream),
            peer: peer.into(),
            timeout,
            desynchronized: false,
        };

        let greeting = client.read_line_timed().await?;
        if greeting != GREETING {
            return Err(QueryError::Protocol(format!(
                "{} is not a ServerQuery interface (greeting '{}')",
                client.peer, greeting
            )));
        }

        let banner = client.read_line_timed().await?;
        debug!(server = %client.peer, banner = %banner, "ServerQuery connected");

        Ok(client)
    }

    /// Peer address this client talks to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    async fn read_line_timed(&mut self) -> Result<String, QueryError> {
        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.read_line())
            .await
            .map_err(|_| QueryError::Timeout(timeout))?
    }

    /// Read the next non-empty line. Server lines end in `\n\r`, which
    /// leaves a `\r` at the start of the following read.
    async fn read_line(&mut self) -> Result<String, QueryError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = (&mut self.stream)
                .take(MAX_LINE_LEN)
                .read_until(b'\n', &mut buf)
                .await?;
            if read == 0 {
                return Err(QueryError::Closed);
            }
            if buf.last() != Some(&b'\n') && read as u64 == MAX_LINE_LEN {
                return Err(QueryError::Protocol(format!(
                    "{} sent a line longer than {} bytes",
                    self.peer, MAX_LINE_LEN
                )));
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_matches(&['\r', '\n'][..]);
            if !line.is_empty() {
                return Ok(line.to_string());
            }
        }
    }

    async fn round_trip(&mut self, command: &Command) -> Result<Response, QueryError> {
        self.stream.write_all(command.encode().as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;

        let mut records = Vec::new();
        loop {
            let line = self.read_line().await?;

            if is_status_line(&line) {
                parse_status(&line)?.into_result()?;
                return Ok(Response { records });
            }

            if line.starts_with("notify") {
                trace!(server = %self.peer, line = %line, "Skipping notification");
                continue;
            }

            records.extend(parse_records(&line));
        }
    }
}

#[async_trait]
impl<T> QuerySession for ServerQueryClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn execute(&mut self, command: &Command) -> Result<Response, QueryError> {
        if self.desynchronized {
            return Err(QueryError::Protocol(
                "session desynchronized by an earlier timeout".to_string(),
            ));
        }

        trace!(server = %self.peer, command = %command.redacted(), "Sending command");

        let timeout = self.timeout;
        match tokio::time::timeout(timeout, self.round_trip(command)).await {
            Ok(result) => result,
            Err(_) => {
                self.desynchronized = true;
                Err(QueryError::Timeout(timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

    const BANNER: &str = "TS3\n\rWelcome to the TeamSpeak 3 ServerQuery interface, type \"help\" for a list of commands.\n\r";

    /// Serve a scripted exchange: for each expected request line, reply with
    /// the given raw text. Returns the requests actually received.
    fn serve(
        server: DuplexStream,
        greeting: &'static str,
        script: Vec<(&'static str, &'static str)>,
    ) -> tokio::task::JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let (reader, mut writer) = tokio::io::split(server);
            let mut lines = BufReader::new(reader).lines();
            writer.write_all(greeting.as_bytes()).await.unwrap();

            let mut received = Vec::new();
            for (expected, reply) in script {
                let Some(line) = lines.next_line().await.unwrap() else {
                    break;
                };
                assert!(line.starts_with(expected), "unexpected request '{}'", line);
                received.push(line);
                writer.write_all(reply.as_bytes()).await.unwrap();
            }
            received
        })
    }

    async fn client(
        script: Vec<(&'static str, &'static str)>,
    ) -> (
        ServerQueryClient<DuplexStream>,
        tokio::task::JoinHandle<Vec<String>>,
    ) {
        let (local, remote) = tokio::io::duplex(4096);
        let server = serve(remote, BANNER, script);
        let client = ServerQueryClient::handshake(local, "test", Duration::from_secs(5))
            .await
            .unwrap();
        (client, server)
    }

    #[tokio::test]
    async fn test_login_success() {
        let (mut client, server) = client(vec![(
            "login",
            "error id=0 msg=ok\n\r",
        )])
        .await;

        client.login("serveradmin", "s3cret pw").await.unwrap();
        drop(client);

        let received = server.await.unwrap();
        assert_eq!(
            received,
            vec!["login client_login_name=serveradmin client_login_password=s3cret\\spw"]
        );
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (mut client, _server) = client(vec![(
            "login",
            "error id=520 msg=invalid\\sloginname\\sor\\spassword\n\r",
        )])
        .await;

        let err = client.login("serveradmin", "wrong").await.unwrap_err();
        assert_eq!(err.server_id(), Some(520));
    }

    #[tokio::test]
    async fn test_execute_multi_record_response() {
        let (mut client, _server) = client(vec![(
            "serverlist",
            "virtualserver_id=1 virtualserver_port=9987 virtualserver_status=online\
             |virtualserver_id=2 virtualserver_port=9988 virtualserver_status=offline\n\r\
             error id=0 msg=ok\n\r",
        )])
        .await;

        let response = client.execute(&Command::new("serverlist")).await.unwrap();
        assert_eq!(response.records.len(), 2);
        assert_eq!(response.records[1].get("virtualserver_port"), Some("9988"));
    }

    #[tokio::test]
    async fn test_notifications_are_skipped() {
        let (mut client, _server) = client(vec![(
            "whoami",
            "notifycliententerview cfid=0 ctid=1 clid=5\n\r\
             virtualserver_status=online virtualserver_id=1 virtualserver_port=9987\n\r\
             error id=0 msg=ok\n\r",
        )])
        .await;

        let whoami = client.whoami().await.unwrap();
        assert_eq!(whoami.selected_port, 9987);
    }

    #[tokio::test]
    async fn test_use_commands() {
        let (mut client, server) = client(vec![
            ("use sid=3", "error id=0 msg=ok\n\r"),
            ("use port=9987", "error id=0 msg=ok\n\r"),
        ])
        .await;

        client.use_server(3).await.unwrap();
        client.use_port(9987).await.unwrap();
        drop(client);

        assert_eq!(server.await.unwrap(), vec!["use sid=3", "use port=9987"]);
    }

    #[tokio::test]
    async fn test_empty_result_set() {
        let (mut client, _server) = client(vec![(
            "serverlist",
            "error id=1281 msg=database\\sempty\\sresult\\sset\n\r",
        )])
        .await;

        let response = client.execute(&Command::new("serverlist")).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_connection_closed_mid_response() {
        let (mut client, _server) = client(vec![]).await;

        let err = client.execute(&Command::new("whoami")).await.unwrap_err();
        assert!(matches!(err, QueryError::Closed | QueryError::Io(_)));
    }

    #[tokio::test]
    async fn test_rejects_non_serverquery_peer() {
        let (local, remote) = tokio::io::duplex(1024);
        let _server = serve(remote, "SSH-2.0-OpenSSH_9.6\r\n", vec![]);

        let result = ServerQueryClient::handshake(local, "test", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(QueryError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_overlong_line_is_rejected() {
        let (local, remote) = tokio::io::duplex(4096);
        let _server = tokio::spawn(async move {
            let mut remote = remote;
            remote.write_all(BANNER.as_bytes()).await.unwrap();
            let mut request = [0u8; 64];
            let _ = tokio::io::AsyncReadExt::read(&mut remote, &mut request).await;
            let line = vec![b'a'; MAX_LINE_LEN as usize + 1];
            let _ = remote.write_all(&line).await;
        });

        let mut client = ServerQueryClient::handshake(local, "test", Duration::from_secs(5))
            .await
            .unwrap();

        let err = client.execute(&Command::new("serverlist")).await.unwrap_err();
        assert!(matches!(err, QueryError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_timeout_desynchronizes_session() {
        let (local, remote) = tokio::io::duplex(1024);
        // Greets, then never answers.
        let _server = tokio::spawn(async move {
            let mut remote = remote;
            remote.write_all(BANNER.as_bytes()).await.unwrap();
            std::future::pending::<()>().await;
        });

        let mut client = ServerQueryClient::handshake(local, "test", Duration::from_millis(50))
            .await
            .unwrap();

        let err = client.execute(&Command::new("whoami")).await.unwrap_err();
        assert!(matches!(err, QueryError::Timeout(_)));

        let err = client.execute(&Command::new("whoami")).await.unwrap_err();
        assert!(matches!(err, QueryError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_connect_over_tcp() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(BANNER.as_bytes()).await.unwrap();
            let mut lines = BufReader::new(socket);
            let mut line = String::new();
            lines.read_line(&mut line).await.unwrap();
            lines
                .get_mut()
                .write_all(b"version=3.13.7 build=1655727713 platform=Linux\n\rerror id=0 msg=ok\n\r")
                .await
                .unwrap();
        });

        let mut client = ServerQueryClient::connect(&addr.to_string(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(client.peer(), addr.to_string());

        let response = client.execute(&Command::new("version")).await.unwrap();
        assert_eq!(
            response.first().and_then(|r| r.get("version")),
            Some("3.13.7")
        );
    }
}
