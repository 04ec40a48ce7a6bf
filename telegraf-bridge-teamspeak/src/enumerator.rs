//! Virtual server enumeration.
//!
//! Lists every virtual server on the instance and, for the running ones,
//! selects each in turn to read its extended statistics. Selecting a server
//! changes state shared by the whole query connection, so the selection the
//! session had beforehand is put back before returning, whether or not the
//! enumeration succeeded.

use tracing::{debug, warn};

use crate::error::CollectError;
use crate::query::{Command, QueryError, QuerySession, Selection};
use crate::record::RawServerRecord;

/// List all virtual servers with extended statistics for online ones.
///
/// Output order matches `serverlist`. Offline servers are returned as
/// listed. Any failure fails the whole call with no partial output; once the
/// original selection is known it is restored exactly once.
pub async fn list_servers<S>(
    session: &mut S,
    options: &[String],
) -> Result<Vec<RawServerRecord>, CollectError>
where
    S: QuerySession + ?Sized,
{
    let listed = list(session, options).await?;

    let original = session
        .whoami()
        .await
        .map_err(CollectError::SessionQuery)?
        .selection();

    let body = collect_details(session, listed).await;
    let restore = restore_selection(session, original).await;

    CollectError::combine(body, restore)
}

async fn list<S>(session: &mut S, options: &[String]) -> Result<Vec<RawServerRecord>, CollectError>
where
    S: QuerySession + ?Sized,
{
    let command = Command::new("serverlist").options(options.iter().cloned());
    let response = session
        .execute(&command)
        .await
        .map_err(|e| CollectError::command(command.name(), e))?;

    response
        .records
        .iter()
        .map(RawServerRecord::from_properties)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CollectError::command(command.name(), e))
}

async fn collect_details<S>(
    session: &mut S,
    listed: Vec<RawServerRecord>,
) -> Result<Vec<RawServerRecord>, CollectError>
where
    S: QuerySession + ?Sized,
{
    let mut servers = Vec::with_capacity(listed.len());

    for server in listed {
        if !server.is_online() {
            debug!(id = server.id, status = %server.status, "Skipping details of server");
            servers.push(server);
            continue;
        }

        session
            .use_server(server.id)
            .await
            .map_err(|source| CollectError::Selection {
                id: server.id,
                source,
            })?;

        servers.push(server_info(session).await?);
    }

    Ok(servers)
}

async fn server_info<S>(session: &mut S) -> Result<RawServerRecord, CollectError>
where
    S: QuerySession + ?Sized,
{
    let command = Command::new("serverinfo");
    let response = session
        .execute(&command)
        .await
        .map_err(|e| CollectError::command(command.name(), e))?;

    let record = response.first().ok_or_else(|| {
        CollectError::command(
            command.name(),
            QueryError::Decode("empty serverinfo response".to_string()),
        )
    })?;

    RawServerRecord::from_properties(record).map_err(|e| CollectError::command(command.name(), e))
}

async fn restore_selection<S>(session: &mut S, original: Selection) -> Result<(), CollectError>
where
    S: QuerySession + ?Sized,
{
    let Selection::Port(port) = original else {
        // The protocol has no way to deselect a server.
        warn!("No server was selected before enumeration, session stays on the last one used");
        return Ok(());
    };

    session.use_port(port).await.map_err(|source| {
        warn!(port, error = %source, "Failed to restore server selection");
        CollectError::Restoration { port, source }
    })
}
