use reqwest::Client;
use std::time::Duration;

// The overall timeout has to cover a slow 70B completion or a long TTS
// render, not just connection setup.
const VENDOR_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pooled HTTP client, one per vendor. Keeping the client alive for the
/// process lifetime keeps TLS sessions warm across chat turns.
pub fn build_vendor_client() -> Client {
    Client::builder()
        .timeout(VENDOR_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
