// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;
pub mod types;

// ── Provider implementations ────────────────────────────────────────────────
pub mod factory;
pub mod gemini;
pub mod openai;
pub mod openrouter;

// ── Re-exports ──────────────────────────────────────────────────────────────
pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use http_client::build_vendor_client;
pub use openrouter::OpenRouterProvider;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;
pub use types::{ChatTurn, TurnRole};
