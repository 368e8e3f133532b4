//! # panelgate-directory
//!
//! Resolves a signed-in email to a [`Role`](panelgate_contracts::role::Role)
//! from a remote, delimiter-separated table.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use panelgate_core::traits::RoleDirectory;
//! use panelgate_directory::{DirectoryClient, DirectoryConfig};
//!
//! let client = DirectoryClient::from_config(&DirectoryConfig {
//!     url: "https://example.com/roles.csv".to_string(),
//!     ..DirectoryConfig::default()
//! })?;
//! let role = client.resolve_role("jane@example.com").await;
//! ```
//!
//! ## Failure model
//!
//! Every failure (network, non-2xx, malformed table, no match) resolves to
//! `author`. The single fetch is bounded by `timeout_ms`.

pub mod client;
pub mod source;
pub mod table;

pub use client::{DirectoryClient, SessionCache};
pub use source::{DirectoryConfig, HttpTableSource, StaticTableSource, TableSource};
pub use table::{find_role, parse_table};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use panelgate_contracts::{
        error::{GateError, GateResult},
        role::Role,
    };
    use panelgate_core::traits::RoleDirectory;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const TABLE: &str = "email,role,team\n\
                         jane@example.com,publisher,web\n\
                         A@X.com,approver,docs\n\
                         a@x.com,publisher,docs\n\
                         sam@example.com,,ops\n";

    fn static_client(text: &str) -> DirectoryClient<StaticTableSource> {
        DirectoryClient::new(StaticTableSource(text.to_string()), ',')
    }

    struct FailingSource;

    #[async_trait]
    impl TableSource for FailingSource {
        async fn fetch(&self) -> GateResult<String> {
            Err(GateError::Directory {
                reason: "connection reset".to_string(),
            })
        }
    }

    /// Counts fetches so caching can be observed.
    struct CountingSource {
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TableSource for CountingSource {
        async fn fetch(&self) -> GateResult<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(TABLE.to_string())
        }
    }

    /// Serve exactly one HTTP response on a local port and return its URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = Vec::new();
            while !read.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                read.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{status_line}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/roles.csv")
    }

    // ── Table parsing ─────────────────────────────────────────────────────────

    #[test]
    fn parses_rows_using_header_positions() {
        let rows = parse_table("role ; email\npublisher;jane@example.com\n", ';').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "jane@example.com");
        assert_eq!(rows[0].role, Role::Publisher);
    }

    #[test]
    fn tolerates_crlf_blank_lines_and_short_rows() {
        let rows = parse_table("email,role\r\n\r\nx@y.z,approver\r\nonly@email.com\r\n", ',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role, Role::Approver);
        assert_eq!(rows[1].role, Role::Author);
    }

    #[test]
    fn table_without_required_columns_is_malformed() {
        for bad in ["", "   \n", "name,team\nx,y", "email\nx@y.z"] {
            assert!(
                matches!(parse_table(bad, ','), Err(GateError::Directory { .. })),
                "expected malformed table for {bad:?}"
            );
        }
    }

    #[test]
    fn delimiter_inside_a_value_misaligns_columns() {
        // No quoting support: the quoted comma splits the value.
        let rows = parse_table("name,email,role\n\"Doe, Jane\",jane@example.com,publisher", ',').unwrap();
        assert_eq!(rows[0].email, "Jane\"");
        assert_eq!(rows[0].role, Role::Author);
    }

    #[test]
    fn first_match_wins() {
        let rows = parse_table(TABLE, ',').unwrap();
        assert_eq!(find_role(&rows, "a@x.com"), Some(Role::Approver));
        assert_eq!(find_role(&rows, "nobody@x.com"), None);
    }

    // ── Resolution ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn resolves_matching_email() {
        let client = static_client(TABLE);
        assert_eq!(client.resolve_role("jane@example.com").await, Role::Publisher);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let client = static_client(TABLE);
        assert_eq!(
            client.resolve_role("A@X.com").await,
            client.resolve_role("a@x.com").await
        );
        assert_eq!(client.resolve_role("JANE@EXAMPLE.COM").await, Role::Publisher);
    }

    #[tokio::test]
    async fn degrades_to_author() {
        // Empty response.
        assert_eq!(static_client("").resolve_role("jane@example.com").await, Role::Author);
        // Malformed table.
        assert_eq!(
            static_client("who,what\njane@example.com,publisher").resolve_role("jane@example.com").await,
            Role::Author
        );
        // No match.
        assert_eq!(static_client(TABLE).resolve_role("nobody@example.com").await, Role::Author);
        // Empty role cell.
        assert_eq!(static_client(TABLE).resolve_role("sam@example.com").await, Role::Author);
        // Network failure.
        let failing = DirectoryClient::new(FailingSource, ',');
        assert_eq!(failing.resolve_role("jane@example.com").await, Role::Author);
        assert!(failing.lookup("jane@example.com").await.is_err());
    }

    #[tokio::test]
    async fn client_does_not_cache() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let client = DirectoryClient::new(CountingSource { fetches: fetches.clone() }, ',');
        client.resolve_role("jane@example.com").await;
        client.resolve_role("jane@example.com").await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn session_cache_resolves_once_per_email() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let cache = SessionCache::new(DirectoryClient::new(
            CountingSource { fetches: fetches.clone() },
            ',',
        ));
        assert_eq!(cache.cached("jane@example.com").await, None);
        assert_eq!(cache.resolve_role("jane@example.com").await, Role::Publisher);
        assert_eq!(cache.resolve_role("Jane@Example.com").await, Role::Publisher);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached("jane@example.com").await, Some(Role::Publisher));

        cache.resolve_role("a@x.com").await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    // ── HTTP source ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn http_source_resolves_from_live_response() {
        let url = serve_once("HTTP/1.1 200 OK", "email,role\njane@example.com,approver\n").await;
        let client = DirectoryClient::new(HttpTableSource::new(url, Duration::from_secs(5)).unwrap(), ',');
        assert_eq!(client.resolve_role("jane@example.com").await, Role::Approver);
    }

    #[tokio::test]
    async fn http_non_success_status_degrades_to_author() {
        let url = serve_once("HTTP/1.1 404 Not Found", "email,role\njane@example.com,publisher\n").await;
        let client = DirectoryClient::new(HttpTableSource::new(url, Duration::from_secs(5)).unwrap(), ',');
        // The body would grant publisher; the status must win.
        assert_eq!(client.resolve_role("jane@example.com").await, Role::Author);
    }

    #[tokio::test]
    async fn http_connection_failure_degrades_to_author() {
        // Bind then drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpTableSource::new(format!("http://{addr}/roles.csv"), Duration::from_secs(2)).unwrap();
        let client = DirectoryClient::new(source, ',');
        assert_eq!(client.resolve_role("jane@example.com").await, Role::Author);
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn config_defaults_and_overrides() {
        let config: DirectoryConfig = toml::from_str(
            r#"
            url = "https://example.com/roles.tsv"
            delimiter = "\t"
            "#,
        )
        .unwrap();
        assert_eq!(config.delimiter, '\t');
        assert_eq!(config.timeout_ms, 5_000);

        let empty = DirectoryConfig::default();
        assert!(matches!(
            HttpTableSource::from_config(&empty),
            Err(GateError::Config { .. })
        ));
    }
}
