/*
 * Responsibility
 * - Public interface of the middleware layers
 * - auth (bearer filter), cors, http (request id / trace / limits), security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
