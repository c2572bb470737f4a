//! PostgreSQL + pgvector backend. Each upsert opens its own connection and closes it before
//! returning; nothing is pooled.

use super::{DatabaseTarget, DocumentRow, DocumentStore, PersistenceError, TableName, tls};
use async_trait::async_trait;
use pgvector::Vector;
use tokio_postgres::Client;

const APPLICATION_NAME: &str = "docpipe";

/// [`DocumentStore`] writing to PostgreSQL with the pgvector extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDocumentStore;

impl PostgresDocumentStore {
    /// Create the store. Connections are opened per write.
    pub const fn new() -> Self {
        Self
    }
}

/// Upsert statement for `table`; `updated_at` is refreshed on conflict.
pub fn upsert_sql(table: &TableName) -> String {
    format!(
        "INSERT INTO {} (id, content, embedding) \
            VALUES ($1, $2, $3) \
            ON CONFLICT (id) DO UPDATE SET \
                content = EXCLUDED.content, \
                embedding = EXCLUDED.embedding, \
                updated_at = NOW()",
        table.qualified()
    )
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn upsert(
        &self,
        target: &DatabaseTarget,
        row: &DocumentRow,
    ) -> Result<(), PersistenceError> {
        let credentials = &target.credentials;
        let connect_error = |message: String| PersistenceError::Connect {
            host: credentials.host.clone(),
            port: credentials.port,
            message,
        };
        let connector = tls::connector(&target.tls).map_err(|err| connect_error(err.to_string()))?;

        let mut config = tokio_postgres::Config::new();
        config
            .host(&credentials.host)
            .port(credentials.port)
            .dbname(&credentials.dbname)
            .user(&credentials.username)
            .password(&credentials.password)
            .application_name(APPLICATION_NAME)
            .connect_timeout(target.connect_timeout)
            .ssl_mode(target.tls.mode.to_postgres());

        let (mut client, connection) = config
            .connect(connector)
            .await
            .map_err(|err| connect_error(describe(&err)))?;
        let connection_task = tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::warn!(error = %err, "PostgreSQL connection closed with error");
            }
        });

        let result = write_row(&mut client, &target.table, row).await;

        drop(client);
        if let Err(err) = connection_task.await {
            tracing::warn!(error = %err, "PostgreSQL connection task failed");
        }

        if result.is_ok() {
            tracing::debug!(
                id = %row.id,
                table = %target.table,
                ssl_mode = %target.tls.mode,
                dimension = row.embedding.len(),
                "Document row upserted"
            );
        }
        result
    }
}

async fn write_row(
    client: &mut Client,
    table: &TableName,
    row: &DocumentRow,
) -> Result<(), PersistenceError> {
    let write_error = |err: tokio_postgres::Error| PersistenceError::Write {
        id: row.id.clone(),
        message: describe(&err),
    };

    let sql = upsert_sql(table);
    let transaction = client.transaction().await.map_err(write_error)?;
    let embedding = Vector::from(row.embedding.clone());
    transaction
        .execute(&sql, &[&row.id, &row.content, &embedding])
        .await
        .map_err(write_error)?;
    transaction
        .commit()
        .await
        .map_err(|err| PersistenceError::Commit {
            id: row.id.clone(),
            message: describe(&err),
        })
}

fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => db.to_string(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{SslMode, TlsSettings};
    use crate::secrets::DatabaseCredentials;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const SSL_REQUEST: [u8; 8] = [0, 0, 0, 8, 0x04, 0xd2, 0x16, 0x2f];

    fn local_target(port: u16, mode: SslMode) -> DatabaseTarget {
        DatabaseTarget {
            credentials: DatabaseCredentials {
                host: "127.0.0.1".into(),
                port,
                dbname: "docs".into(),
                username: "docpipe".into(),
                password: "pw".into(),
            },
            table: TableName::new("public", "documents").unwrap(),
            connect_timeout: Duration::from_secs(5),
            tls: TlsSettings {
                mode,
                root_cert: None,
            },
        }
    }

    fn row() -> DocumentRow {
        DocumentRow {
            id: "a.txt".into(),
            content: "hello".into(),
            embedding: vec![0.1, 0.2],
        }
    }

    /// Accepts one connection, records the first 8 bytes the client sends, declines TLS and
    /// hangs up.
    async fn first_frame(mode: SslMode) -> ([u8; 8], Result<(), PersistenceError>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut header = [0u8; 8];
            socket.read_exact(&mut header).await.expect("read");
            let _ = socket.write_all(b"N").await;
            header
        });

        let result = PostgresDocumentStore::new()
            .upsert(&local_target(port, mode), &row())
            .await;
        (server.await.expect("server task"), result)
    }

    #[tokio::test]
    async fn prefer_opens_with_ssl_request() {
        let (header, result) = first_frame(SslMode::Prefer).await;
        assert_eq!(header, SSL_REQUEST);
        assert!(matches!(result, Err(PersistenceError::Connect { port, .. }) if port > 0));
    }

    #[tokio::test]
    async fn require_fails_when_server_declines_tls() {
        let (header, result) = first_frame(SslMode::Require).await;
        assert_eq!(header, SSL_REQUEST);
        assert!(matches!(result, Err(PersistenceError::Connect { .. })));
    }

    #[tokio::test]
    async fn disable_starts_in_plaintext() {
        let (header, result) = first_frame(SslMode::Disable).await;
        // Startup message: length, then protocol version 3.0.
        assert_eq!(&header[4..], &[0, 3, 0, 0]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unreadable_root_bundle_fails_before_connecting() {
        let mut target = local_target(1, SslMode::VerifyFull);
        target.tls.root_cert = Some("/nonexistent/docpipe/rds-bundle.pem".into());

        let error = PostgresDocumentStore::new()
            .upsert(&target, &row())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            PersistenceError::Connect { ref message, .. } if message.contains("root certificates")
        ));
    }

    #[test]
    fn upsert_sql_targets_quoted_table() {
        let table = TableName::new("public", "documents").unwrap();
        let sql = upsert_sql(&table);
        assert!(sql.starts_with(
            "INSERT INTO \"public\".\"documents\" (id, content, embedding) VALUES ($1, $2, $3)"
        ));
        assert!(sql.contains("ON CONFLICT (id) DO UPDATE SET"));
        assert!(sql.contains("content = EXCLUDED.content"));
        assert!(sql.contains("embedding = EXCLUDED.embedding"));
        assert!(sql.ends_with("updated_at = NOW()"));
    }
}
