use std::collections::HashMap;
use std::sync::RwLock;

/// 失効済みトークンの集合
///
/// ログアウト時に登録され、プロセス全体で共有される。
/// 各エントリはトークンの有効期限（UNIX秒）を保持し、登録のたびに
/// 期限切れのエントリを削除する。期限切れのトークンは署名検証の段階で
/// 拒否されるため、集合に残しておく必要がない。
#[derive(Debug, Default)]
pub struct TokenRevocationList {
    entries: RwLock<HashMap<String, i64>>,
}

impl TokenRevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// トークンを失効させる
    pub fn revoke(&self, token: &str, expires_at: i64, now: i64) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, exp| *exp > now);
        entries.insert(token.to_string(), expires_at);
    }

    /// トークンが失効済みか
    pub fn is_revoked(&self, token: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(token)
    }

    /// 保持しているエントリ数
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
