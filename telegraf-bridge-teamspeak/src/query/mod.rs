//! TeamSpeak 3 ServerQuery client.
//!
//! Only what the collector needs: login, `serverlist`, `whoami`, `use` and
//! `serverinfo`, over the plain-text query port.

pub mod client;
pub mod codec;
pub mod command;
pub mod error;
pub mod session;

pub use client::ServerQueryClient;
pub use codec::Properties;
pub use command::Command;
pub use error::QueryError;
pub use session::{QuerySession, Response, Selection, WhoAmI};
