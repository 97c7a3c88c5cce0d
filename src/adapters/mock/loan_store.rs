use crate::domain::{
    Loan,
    value_objects::{LoanId, UserId},
};
use crate::ports::loan_store::{LoanStore as LoanStoreTrait, LoanStoreError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// LoanStoreのインメモリ実装
///
/// 保存順を保持し、障害と遅延を模擬できる。
#[derive(Debug, Default)]
pub struct LoanStore {
    loans: Mutex<Vec<Loan>>,
    unavailable: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
}

impl LoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 永続化層の障害を模擬する
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    /// すべての操作に遅延を入れる
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    /// 保存されている貸出の件数
    pub fn len(&self) -> usize {
        self.loans.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 保存されている全貸出
    pub fn all(&self) -> Vec<Loan> {
        self.loans.lock().unwrap().clone()
    }

    async fn before_call(&self) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.unavailable.lock().unwrap() {
            return Err(LoanStoreError::Backend("database is down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn create(&self, loan: Loan) -> Result<Loan> {
        self.before_call().await?;
        self.loans.lock().unwrap().push(loan.clone());
        Ok(loan)
    }

    async fn get(&self, loan_id: LoanId) -> Result<Loan> {
        self.before_call().await?;
        self.loans
            .lock()
            .unwrap()
            .iter()
            .find(|loan| loan.loan_id == loan_id)
            .cloned()
            .ok_or(LoanStoreError::NotFound(loan_id))
    }

    async fn update(&self, loan: &Loan) -> Result<()> {
        self.before_call().await?;
        let mut loans = self.loans.lock().unwrap();
        let stored = loans
            .iter_mut()
            .find(|stored| stored.loan_id == loan.loan_id)
            .ok_or(LoanStoreError::NotFound(loan.loan_id))?;
        *stored = loan.clone();
        Ok(())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Loan>> {
        self.before_call().await?;
        let mut loans: Vec<Loan> = self
            .loans
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.loan_date.cmp(&a.loan_date));
        Ok(loans)
    }
}
