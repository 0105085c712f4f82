/*!
 * Security context extractors
 *
 * Responsibility:
 * - Hand the SecurityContext installed by the authentication filter to handlers
 * - This is where "unauthenticated" becomes a 401; the filter itself never rejects
 *
 * Public API:
 * - CurrentUser (401 when no context)
 * - MaybeUser   (never rejects)
 */

mod core;

pub use self::core::{CurrentUser, MaybeUser};
