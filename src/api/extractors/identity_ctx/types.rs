/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - gate middleware が検証して request extensions に格納し、handler / role guard はこの型だけを読む
 *
 * Notes
 * - token 検証や role 解決は middleware/services 側の責務
 * - request ごとに 1 つ生成され、以後は読み取り専用
 */
use crate::model::Role;

/// Identity attached to an authenticated request.
///
/// - `subject_id` は identity provider が返す安定 ID
/// - `role` は常に解決済み (profile に無ければ STAFF)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCtx {
    pub subject_id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl IdentityCtx {
    pub fn new(subject_id: impl Into<String>, email: Option<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            email,
            role,
        }
    }
}
