//! Structured logging field name constants for the thesaurus API.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Upstream collaborator failure (store, search index) |
//! | WARN  | Rejected request: authorization denial, validation failure |
//! | INFO  | Lifecycle events (startup, shutdown), completed writes |
//! | DEBUG | Decision points: translated search options, rule outcomes |
//! | TRACE | Per-item iteration (rule-by-rule results, search hits) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across the request.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "search", "db", "validation", "metadata"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "resource_api", "solr", "pool", "translator"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "find", "create", "update", "delete", "get"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// URI of the resource being operated on.
pub const RESOURCE_URI: &str = "resource_uri";

/// Kind of resource: "concept", "conceptscheme", "set".
pub const RESOURCE_KIND: &str = "resource_kind";

/// Tenant code.
pub const TENANT: &str = "tenant";

/// Acting user URI.
pub const ACTOR: &str = "actor";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search.
pub const RESULT_COUNT: &str = "result_count";

/// Total hits reported by the search backend.
pub const TOTAL: &str = "total";

/// Number of rule violations collected.
pub const VIOLATION_COUNT: &str = "violation_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
