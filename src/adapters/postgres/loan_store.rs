use crate::domain::{
    Loan, LoanStatus,
    value_objects::{ItemId, LoanId, Penalty, UserId},
};
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, LoanStoreError, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

impl From<sqlx::Error> for LoanStoreError {
    fn from(err: sqlx::Error) -> Self {
        LoanStoreError::Backend(Box::new(err))
    }
}

fn invalid_data(message: String) -> LoanStoreError {
    LoanStoreError::Backend(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

/// penaltyをINTEGER列の値に変換する
fn penalty_column(penalty: Penalty) -> Result<i32> {
    i32::try_from(penalty.value())
        .map_err(|_| invalid_data(format!("penalty out of range: {}", penalty.value())))
}

/// PostgreSQLの行データをLoanに変換する
///
/// statusの文字列からの変換とpenaltyの符号チェックでエラーハンドリングを行う。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let status_str: &str = row.try_get("status")?;
    let status = LoanStatus::from_str(status_str).map_err(invalid_data)?;

    let penalty_i32: i32 = row.try_get("penalty")?;
    let penalty = Penalty::try_from(penalty_i32).map_err(invalid_data)?;

    Ok(Loan {
        loan_id: LoanId::from_uuid(row.try_get("loan_id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        item_id: ItemId::new(row.try_get("item_id")?),
        loan_date: row.try_get("loan_date")?,
        return_date: row.try_get("return_date")?,
        status,
        penalty,
    })
}

/// LoanStoreのPostgreSQL実装
pub struct LoanStore {
    pool: PgPool,
}

impl LoanStore {
    /// PostgreSQLコネクションプールから新しいLoanStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn create(&self, loan: Loan) -> Result<Loan> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id,
                user_id,
                item_id,
                loan_date,
                return_date,
                status,
                penalty
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.user_id.value())
        .bind(loan.item_id.value())
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .bind(loan.status.as_str())
        .bind(penalty_column(loan.penalty)?)
        .execute(&self.pool)
        .await?;

        Ok(loan)
    }

    async fn get(&self, loan_id: LoanId) -> Result<Loan> {
        let row = sqlx::query(
            r#"
            SELECT
                loan_id,
                user_id,
                item_id,
                loan_date,
                return_date,
                status,
                penalty
            FROM loans
            WHERE loan_id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_row_to_loan(&row),
            None => Err(LoanStoreError::NotFound(loan_id)),
        }
    }

    /// 貸出を上書き保存（IDをキーとした全項目更新）
    ///
    /// user_id, item_id, loan_dateは作成後に変更されないため更新対象外。
    async fn update(&self, loan: &Loan) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = $2,
                status = $3,
                penalty = $4,
                updated_at = NOW()
            WHERE loan_id = $1
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.return_date)
        .bind(loan.status.as_str())
        .bind(penalty_column(loan.penalty)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LoanStoreError::NotFound(loan.loan_id));
        }

        Ok(())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT
                loan_id,
                user_id,
                item_id,
                loan_date,
                return_date,
                status,
                penalty
            FROM loans
            WHERE user_id = $1
            ORDER BY loan_date DESC, created_at DESC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_column_accepts_flat_penalty() {
        assert_eq!(penalty_column(Penalty::new(1000)).unwrap(), 1000);
        assert_eq!(penalty_column(Penalty::NONE).unwrap(), 0);
    }

    #[test]
    fn test_penalty_column_rejects_overflow() {
        let result = penalty_column(Penalty::new(i32::MAX as u32 + 1));
        assert!(matches!(result, Err(LoanStoreError::Backend(_))));
    }
}
