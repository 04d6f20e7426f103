use serde::{Deserialize, Serialize};

/// Connection metadata that is safe to log or persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Mask the password (authority and query string) of a connection URL.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let Some((engine, rest)) = conn.split_once("://") else {
        return RedactedConnection {
            engine: None,
            user: None,
            host: None,
            port: None,
            database: None,
            redacted: redact_query(conn),
        };
    };

    let (location, query) = match rest.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (rest, None),
    };
    let (authority, path) = location.split_once('/').unwrap_or((location, ""));
    let (credentials, host_port) = match authority.rsplit_once('@') {
        Some((credentials, host_port)) => (Some(credentials), host_port),
        None => (None, authority),
    };

    let (user, masked_credentials) = match credentials {
        Some(credentials) => match credentials.split_once(':') {
            Some((user, _)) => (Some(user.to_string()), format!("{user}:***@")),
            None => (Some(credentials.to_string()), format!("{credentials}@")),
        },
        None => (None, String::new()),
    };

    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse::<u16>().ok()),
        None => (host_port.to_string(), None),
    };

    let mut redacted = format!("{engine}://{masked_credentials}{host_port}");
    if !path.is_empty() {
        redacted.push('/');
        redacted.push_str(path);
    }
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&redact_pairs(query));
    }

    RedactedConnection {
        engine: Some(engine.to_string()),
        user,
        host: (!host.is_empty()).then_some(host),
        port,
        database: (!path.is_empty()).then(|| path.to_string()),
        redacted,
    }
}

fn redact_query(conn: &str) -> String {
    match conn.split_once('?') {
        Some((base, query)) => format!("{base}?{}", redact_pairs(query)),
        None => conn.to_string(),
    }
}

fn redact_pairs(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "pass" | "token" | "api_key" | "apikey"
    )
}
