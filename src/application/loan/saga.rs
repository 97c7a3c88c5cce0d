use std::fmt;
use std::future::Future;
use std::time::Duration;

use super::errors::{LoanApplicationError, Result};

/// 協調サービスごとのタイムアウト
///
/// 認証・貸出ストアのタイムアウトは処理全体を失敗させる。
/// 通知・返却時の在庫戻しのタイムアウトはログに記録するのみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollaboratorTimeouts {
    pub verifier: Duration,
    pub inventory: Duration,
    pub loan_store: Duration,
    pub notification: Duration,
    pub directory: Duration,
}

impl Default for CollaboratorTimeouts {
    fn default() -> Self {
        Self {
            verifier: Duration::from_secs(2),
            inventory: Duration::from_secs(5),
            loan_store: Duration::from_secs(5),
            notification: Duration::from_secs(5),
            directory: Duration::from_secs(5),
        }
    }
}

/// 1回の貸出・返却試行の進行段階
///
/// 貸出：Verifying → CheckingInventory → Persisting → AdjustingInventory → Notifying → Done
/// 返却：Verifying → Authorizing → Persisting → AdjustingInventory → Notifying → Done
/// 履歴：Verifying → Authorizing → Done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaStage {
    Verifying,
    CheckingInventory,
    Authorizing,
    Persisting,
    AdjustingInventory,
    Notifying,
    Done,
}

impl fmt::Display for SagaStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SagaStage::Verifying => "verifying",
            SagaStage::CheckingInventory => "checking_inventory",
            SagaStage::Authorizing => "authorizing",
            SagaStage::Persisting => "persisting",
            SagaStage::AdjustingInventory => "adjusting_inventory",
            SagaStage::Notifying => "notifying",
            SagaStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// 試行の進行状況を追跡し、失敗時に到達段階をログに残す
#[derive(Debug)]
pub(super) struct Saga {
    operation: &'static str,
    stage: SagaStage,
}

impl Saga {
    pub(super) fn begin(operation: &'static str) -> Self {
        tracing::debug!(operation, "Saga started");
        Self {
            operation,
            stage: SagaStage::Verifying,
        }
    }

    pub(super) fn advance(&mut self, stage: SagaStage) {
        tracing::debug!(operation = self.operation, from = %self.stage, to = %stage, "Saga advanced");
        self.stage = stage;
    }

    /// 結果を確定させる。失敗時は`Failed(reason)`として到達段階を記録する
    pub(super) fn finish<T>(mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.advance(SagaStage::Done),
            Err(e) => tracing::warn!(
                operation = self.operation,
                stage = %self.stage,
                error = %e,
                "Saga failed"
            ),
        }
        result
    }
}

/// 協調サービス呼び出しにタイムアウトを適用する
///
/// タイムアウト時は`Timeout`、それ以外の失敗は`map_err`で変換する。
pub(super) async fn bounded<T, E, F>(
    limit: Duration,
    collaborator: &'static str,
    call: F,
    map_err: impl FnOnce(E) -> LoanApplicationError,
) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(map_err),
        Err(_) => Err(LoanApplicationError::Timeout { collaborator }),
    }
}
