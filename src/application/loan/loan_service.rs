use crate::domain::{
    self, Loan,
    commands::{BorrowItem, LoanHistory, ReturnItem},
    value_objects::{ItemId, UserId},
};
use crate::ports::*;
use std::sync::Arc;
use tokio::time::timeout;

use super::errors::{LoanApplicationError, Result};
use super::notification_dispatch::NotificationDispatcher;
use super::saga::{CollaboratorTimeouts, Saga, SagaStage, bounded};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
/// 貸出コーディネータは呼び出し間で状態を持たない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub inventory: Arc<dyn InventoryClient>,
    pub loan_store: Arc<dyn LoanStore>,
    pub notifications: NotificationDispatcher,
    pub timeouts: CollaboratorTimeouts,
}

/// 資格情報を検証して呼び出し元の利用者IDを得る
async fn verify_caller(deps: &ServiceDependencies, credential: &str) -> Result<UserId> {
    bounded(
        deps.timeouts.verifier,
        "token verifier",
        deps.token_verifier.verify(credential),
        LoanApplicationError::from,
    )
    .await
}

/// 資格情報のメールアドレスクレームを取り出す（ベストエフォート）
///
/// 取り出せない場合は`None`を返し、通知ワーカーがディレクトリ参照にフォールバックする。
async fn email_claim(deps: &ServiceDependencies, credential: &str) -> Option<String> {
    match timeout(
        deps.timeouts.verifier,
        deps.token_verifier.email_claim(credential),
    )
    .await
    {
        Ok(Ok(email)) => email,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Failed to extract email from token");
            None
        }
        Err(_) => {
            tracing::warn!("Email claim extraction timed out");
            None
        }
    }
}

/// 返却された資料の在庫を1戻す
async fn restock(deps: &ServiceDependencies, item_id: ItemId) -> std::result::Result<(), InventoryError> {
    let snapshot = deps.inventory.get_item(item_id).await?;
    deps.inventory
        .update_stock(item_id, snapshot.stock + 1, &snapshot)
        .await
}

/// 資料を借りる（純粋な関数）
///
/// ビジネスルール：
/// - 資格情報が有効であること
/// - 申告された利用者IDがトークンと異なる場合はトークン側で上書きする（エラーにしない）
/// - 在庫が1以上であること
///
/// すべての依存が引数として明示的に渡される（関数型の原則）。
///
/// # 一貫性保証
///
/// 分散トランザクションは使用しない。貸出レコードの作成が永続化チェックポイントで、
/// 在庫の減算はその後に行う。途中で失敗した場合は「貸出は記録済み・在庫は未減算」の
/// 方向に偏る（在庫の過大計上は棚卸しで回復できるが、二重貸出は回復できない）。
///
/// - 在庫減算の失敗は`StockUpdateFailed`として返すが、貸出レコードは取り消さない
/// - 通知はキューへの投入のみで、失敗しても結果に影響しない
///
/// # 競合
///
/// 同じ資料の同時貸出は、両方が在庫確認を通過しうる。比較交換に対応した
/// 在庫サービスでは後続の在庫更新が`StockUpdateFailed`として検出される。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 貸出コマンド
///
/// # 戻り値
/// 作成された貸出
pub async fn borrow_item(deps: &ServiceDependencies, cmd: BorrowItem) -> Result<Loan> {
    let mut saga = Saga::begin("borrow");
    let result = run_borrow(deps, cmd, &mut saga).await;
    saga.finish(result)
}

async fn run_borrow(deps: &ServiceDependencies, cmd: BorrowItem, saga: &mut Saga) -> Result<Loan> {
    // 1. 資格情報の検証
    let user_id = verify_caller(deps, &cmd.credential).await?;

    // 2. 申告IDとトークンIDの不一致はトークン側で上書き
    if cmd.requested_user_id != user_id {
        tracing::warn!(
            requested_user_id = %cmd.requested_user_id,
            verified_user_id = %user_id,
            "userId from token differs from provided userId, using token userId"
        );
    }

    // 3. 在庫スナップショットの取得（タイムアウトも通信障害として扱う）
    saga.advance(SagaStage::CheckingInventory);
    let snapshot = timeout(deps.timeouts.inventory, deps.inventory.get_item(cmd.item_id))
        .await
        .unwrap_or_else(|elapsed| Err(InventoryError::Unavailable(Box::new(elapsed))))
        .map_err(|source| LoanApplicationError::ItemUnavailable {
            item_id: cmd.item_id,
            source,
        })?;

    // 4. 在庫確認
    if snapshot.stock <= 0 {
        return Err(LoanApplicationError::InsufficientStock(cmd.item_id));
    }

    // 5. 貸出レコードの作成（永続化チェックポイント）
    saga.advance(SagaStage::Persisting);
    let loan = bounded(
        deps.timeouts.loan_store,
        "loan store",
        deps.loan_store
            .create(domain::loan::borrow_item(user_id, cmd.item_id, cmd.borrowed_on)),
        LoanApplicationError::from,
    )
    .await?;

    tracing::info!(
        loan_id = %loan.loan_id,
        user_id = %loan.user_id,
        item_id = %loan.item_id,
        "Loan recorded"
    );

    // 6. 在庫の減算（失敗しても貸出は取り消さない）
    saga.advance(SagaStage::AdjustingInventory);
    let adjusted = timeout(
        deps.timeouts.inventory,
        deps.inventory
            .update_stock(cmd.item_id, snapshot.stock - 1, &snapshot),
    )
    .await
    .unwrap_or_else(|elapsed| Err(InventoryError::Unavailable(Box::new(elapsed))));

    if let Err(source) = adjusted {
        tracing::error!(
            loan_id = %loan.loan_id,
            item_id = %loan.item_id,
            error = %source,
            "Loan recorded but stock decrement failed, inventory needs reconciliation"
        );
        return Err(LoanApplicationError::StockUpdateFailed {
            loan: Box::new(loan),
            source,
        });
    }

    // 7. 通知（ベストエフォート）
    saga.advance(SagaStage::Notifying);
    let email = email_claim(deps, &cmd.credential).await;
    deps.notifications.dispatch(domain::borrowed_notice(
        loan.user_id,
        loan.item_id,
        cmd.borrowed_on,
        email,
    ));

    Ok(loan)
}

/// 資料を返却する（純粋な関数）
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 呼び出し元が貸出の利用者本人であること（貸出時と異なり上書きせず拒否する）
/// - 返却済みの貸出は再返却できない
/// - 貸出日から7日を超えて返却した場合は延滞金1000
///
/// すべての依存が引数として明示的に渡される（関数型の原則）。
///
/// # 一貫性保証
///
/// 返却の記録が永続化チェックポイント。在庫の戻しと通知はベストエフォートで、
/// 失敗はログに記録するのみ（資料は既に物理的に返却されているため）。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 返却コマンド
pub async fn return_item(deps: &ServiceDependencies, cmd: ReturnItem) -> Result<Loan> {
    let mut saga = Saga::begin("return");
    let result = run_return(deps, cmd, &mut saga).await;
    saga.finish(result)
}

async fn run_return(deps: &ServiceDependencies, cmd: ReturnItem, saga: &mut Saga) -> Result<Loan> {
    // 1. 資格情報の検証
    let user_id = verify_caller(deps, &cmd.credential).await?;

    // 2. 貸出の取得
    saga.advance(SagaStage::Authorizing);
    let loan = bounded(
        deps.timeouts.loan_store,
        "loan store",
        deps.loan_store.get(cmd.loan_id),
        LoanApplicationError::from,
    )
    .await?;

    // 3. 本人確認（保存されている利用者IDと比較）
    if loan.user_id != user_id {
        return Err(LoanApplicationError::Forbidden(
            "User is not authorized to return this loan".to_string(),
        ));
    }

    // 4-5. ドメイン層の純粋関数を呼び出し（返却日・状態・延滞金）
    let returned = domain::loan::return_loan(&loan, cmd.returned_on).map_err(|e| match e {
        domain::ReturnLoanError::AlreadyReturned => {
            LoanApplicationError::AlreadyReturned(loan.loan_id)
        }
    })?;

    // 6. 返却の記録（永続化チェックポイント）
    saga.advance(SagaStage::Persisting);
    bounded(
        deps.timeouts.loan_store,
        "loan store",
        deps.loan_store.update(&returned),
        LoanApplicationError::from,
    )
    .await?;

    tracing::info!(
        loan_id = %returned.loan_id,
        user_id = %returned.user_id,
        item_id = %returned.item_id,
        penalty = returned.penalty.value(),
        "Loan returned"
    );

    // 7. 在庫の戻し（ベストエフォート）
    saga.advance(SagaStage::AdjustingInventory);
    match timeout(deps.timeouts.inventory, restock(deps, returned.item_id)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(
            loan_id = %returned.loan_id,
            item_id = %returned.item_id,
            error = %e,
            "Failed to restock returned item"
        ),
        Err(_) => tracing::warn!(
            loan_id = %returned.loan_id,
            item_id = %returned.item_id,
            "Restocking returned item timed out"
        ),
    }

    // 8. 通知（ベストエフォート）
    saga.advance(SagaStage::Notifying);
    let email = email_claim(deps, &cmd.credential).await;
    deps.notifications
        .dispatch(domain::returned_notice(&returned, cmd.returned_on, email));

    Ok(returned)
}

/// 貸出履歴を取得する
///
/// 他人の履歴の参照は明示的に拒否する（貸出時のような上書きはしない）。
/// 副作用のない読み取りのため、部分的な失敗はない。
pub async fn loan_history(deps: &ServiceDependencies, query: LoanHistory) -> Result<Vec<Loan>> {
    let mut saga = Saga::begin("history");
    let result = run_history(deps, query, &mut saga).await;
    saga.finish(result)
}

async fn run_history(
    deps: &ServiceDependencies,
    query: LoanHistory,
    saga: &mut Saga,
) -> Result<Vec<Loan>> {
    let user_id = verify_caller(deps, &query.credential).await?;

    saga.advance(SagaStage::Authorizing);
    if user_id != query.requested_user_id {
        return Err(LoanApplicationError::Forbidden(
            "User ID from token does not match provided userId".to_string(),
        ));
    }

    bounded(
        deps.timeouts.loan_store,
        "loan store",
        deps.loan_store.list_by_user(user_id),
        LoanApplicationError::from,
    )
    .await
}
