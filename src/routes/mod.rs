/// Router Module Index
///
/// Routes are split by audience. Which paths actually need credentials is decided by
/// the `AccessPolicy` middleware applied over the whole router, not by this split, so
/// the two modules below only mirror the default allow-list.

/// Operational routes covered by the default public allow-list (health, db console).
pub mod public;

/// Resource routes under `/api`, protected by HTTP Basic authentication.
pub mod authenticated;
