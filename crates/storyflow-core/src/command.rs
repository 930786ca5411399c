//! Command abstractions.

use uuid::Uuid;

/// Trait implemented by every input the flow engine accepts (story selection,
/// advancement, hotspot discovery, child-app messages).
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the ledger events it
    /// produces.
    fn correlation_id(&self) -> Uuid;
}
