/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: 認証 gate と role guard
 * - http: request id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
