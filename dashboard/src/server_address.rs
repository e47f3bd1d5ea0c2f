//! The dashboard accepts `host:port` as well as full `http(s)://` URLs.

pub fn http_base(server: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    if server.starts_with("http://") || server.starts_with("https://") {
        server.to_string()
    } else {
        format!("http://{server}")
    }
}

pub fn ws_url(server: &str) -> String {
    let base = http_base(server);
    let ws_base = match base.strip_prefix("https://") {
        Some(rest) => format!("wss://{rest}"),
        None => format!("ws://{}", base.trim_start_matches("http://")),
    };
    format!("{ws_base}/api/ws")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_and_port() {
        assert_eq!(http_base("127.0.0.1:5000"), "http://127.0.0.1:5000");
        assert_eq!(ws_url("127.0.0.1:5000"), "ws://127.0.0.1:5000/api/ws");
    }

    #[test]
    fn test_full_urls() {
        assert_eq!(http_base("http://tracker.local:5000/"), "http://tracker.local:5000");
        assert_eq!(ws_url("http://tracker.local:5000/"), "ws://tracker.local:5000/api/ws");
        assert_eq!(ws_url("https://tracker.example.org"), "wss://tracker.example.org/api/ws");
    }
}
