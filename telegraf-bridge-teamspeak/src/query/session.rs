//! The query session seam: what the collector needs from a ServerQuery connection.

use async_trait::async_trait;

use super::codec::Properties;
use super::command::Command;
use super::error::QueryError;

/// Decoded response to one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Records from all data lines, in order.
    pub records: Vec<Properties>,
}

impl Response {
    /// First record, for single-record responses such as `serverinfo`.
    pub fn first(&self) -> Option<&Properties> {
        self.records.first()
    }

    /// Whether the response carried no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Which virtual server a session has selected.
///
/// Produced by [`QuerySession::whoami`] and handed back to restore the
/// session afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// No virtual server selected.
    None,
    /// The virtual server listening on this port.
    Port(u16),
}

impl Selection {
    /// Selection from a reported `virtualserver_port`; 0 means none.
    pub fn from_port(port: u16) -> Self {
        if port == 0 {
            Selection::None
        } else {
            Selection::Port(port)
        }
    }

    /// Selected port, if any.
    pub fn port(&self) -> Option<u16> {
        match self {
            Selection::None => None,
            Selection::Port(port) => Some(*port),
        }
    }
}

/// Result of `whoami`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhoAmI {
    /// `virtualserver_id` of the selected server, 0 when none.
    pub selected_id: u32,
    /// `virtualserver_port` of the selected server, 0 when none.
    pub selected_port: u16,
    /// Login the session is authenticated as.
    pub login_name: String,
}

impl WhoAmI {
    /// Decode a `whoami` record.
    pub fn from_properties(props: &Properties) -> Result<Self, QueryError> {
        Ok(Self {
            selected_id: props.parse_or_default("virtualserver_id")?,
            selected_port: props.parse_or_default("virtualserver_port")?,
            login_name: props.text("client_login_name"),
        })
    }

    /// The session's current selection.
    pub fn selection(&self) -> Selection {
        Selection::from_port(self.selected_port)
    }
}

/// A stateful ServerQuery session.
///
/// Commands after a `use` apply to the selected virtual server; that
/// selection is shared by everything issued over the connection, so a
/// session must have a single owner at a time.
#[async_trait]
pub trait QuerySession: Send {
    /// Execute a command and decode its records.
    async fn execute(&mut self, command: &Command) -> Result<Response, QueryError>;

    /// Authenticate the session.
    async fn login(&mut self, username: &str, password: &str) -> Result<(), QueryError> {
        let command = Command::new("login")
            .arg("client_login_name", username)
            .arg("client_login_password", password);
        self.execute(&command).await.map(|_| ())
    }

    /// Ask the server which virtual server this session has selected.
    async fn whoami(&mut self) -> Result<WhoAmI, QueryError> {
        let response = self.execute(&Command::new("whoami")).await?;
        let record = response
            .first()
            .ok_or_else(|| QueryError::Decode("empty whoami response".to_string()))?;
        WhoAmI::from_properties(record)
    }

    /// Select a virtual server by id.
    async fn use_server(&mut self, id: u32) -> Result<(), QueryError> {
        self.execute(&Command::new("use").arg("sid", id))
            .await
            .map(|_| ())
    }

    /// Select a virtual server by port.
    async fn use_port(&mut self, port: u16) -> Result<(), QueryError> {
        self.execute(&Command::new("use").arg("port", port))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_port() {
        assert_eq!(Selection::from_port(0), Selection::None);
        assert_eq!(Selection::from_port(9987), Selection::Port(9987));
        assert_eq!(Selection::Port(9987).port(), Some(9987));
        assert_eq!(Selection::None.port(), None);
    }

    #[test]
    fn test_whoami_decode() {
        let props = Properties::default()
            .with("virtualserver_status", "online")
            .with("virtualserver_id", "1")
            .with("virtualserver_port", "9987")
            .with("client_login_name", "serveradmin");

        let whoami = WhoAmI::from_properties(&props).unwrap();
        assert_eq!(whoami.selected_id, 1);
        assert_eq!(whoami.selection(), Selection::Port(9987));
        assert_eq!(whoami.login_name, "serveradmin");
    }

    #[test]
    fn test_whoami_unselected() {
        let props = Properties::default()
            .with("virtualserver_status", "unknown")
            .with("virtualserver_id", "0")
            .with("virtualserver_port", "0");

        let whoami = WhoAmI::from_properties(&props).unwrap();
        assert_eq!(whoami.selection(), Selection::None);
    }

    #[test]
    fn test_response_first() {
        let response = Response {
            records: vec![Properties::default().with("a", "1")],
        };
        assert_eq!(response.first().and_then(|r| r.get("a")), Some("1"));
        assert!(Response::default().is_empty());
    }
}
