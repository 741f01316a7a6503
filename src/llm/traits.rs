use super::types::ChatTurn;
use std::future::Future;
use std::pin::Pin;

/// Chat completion provider seam.
///
/// Object-safe by construction: implementations return boxed futures so the
/// gateway can hold an `Arc<dyn Provider>` chosen at startup.
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Provider identifier (e.g. "openrouter", "gemini").
    fn name(&self) -> &str;

    /// Send the system prompt plus the bounded conversation history and
    /// return the assistant's text reply.
    fn chat_with_history<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        history: &'a [ChatTurn],
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

    /// Warm up the HTTP connection pool.
    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}
