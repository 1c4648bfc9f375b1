use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "jwdb", version, about = "NDJSON bridge to a JsonWebDB backend")]
pub struct Args {
    /// Backend endpoint, e.g. http://localhost:9002/jsonwebdb
    #[arg(long, env = "JWDB_URL")]
    pub url: String,

    /// Connect on startup with this user (otherwise send a `connect` command).
    #[arg(long, env = "JWDB_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "JWDB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Rows per page when a select does not ask for a size.
    #[arg(long, default_value_t = 100)]
    pub page_size: usize,

    /// Upper bound for any requested page size.
    #[arg(long, default_value_t = 1000)]
    pub max_page_size: usize,

    /// HTTP timeout for a single request.
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let args = Args::try_parse_from(["jwdb", "--url", "http://localhost:9002/jsonwebdb"]).unwrap();
        assert_eq!(args.page_size, 100);
        assert_eq!(args.max_page_size, 1000);
        assert_eq!(args.timeout_ms, 30_000);
    }

    #[test]
    fn url_is_required() {
        if std::env::var("JWDB_URL").is_err() {
            assert!(Args::try_parse_from(["jwdb"]).is_err());
        }
    }
}
