//! PostgreSQLを使うテスト
//!
//! DATABASE_URLが指すデータベースが必要なため既定では無視される。
//! `cargo test -- --ignored` で実行する。

mod common;

use chrono::NaiveDate;
use rusty_library_loans::adapters::postgres::PostgresLoanStore;
use rusty_library_loans::domain::loan::{borrow_item, return_loan};
use rusty_library_loans::domain::value_objects::{ItemId, LoanId, Penalty, UserId};
use rusty_library_loans::domain::LoanStatus;
use rusty_library_loans::ports::{LoanStore, LoanStoreError};
use serial_test::serial;
use sqlx::PgPool;

/// テスト専用の利用者ID（他のデータと衝突しない範囲）
const TEST_USER: i64 = 900_000_001;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// テストデータをクリーンアップ
async fn cleanup_user(pool: &PgPool, user_id: i64) {
    sqlx::query("DELETE FROM loans WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to cleanup test loans");
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_loan_store_create_and_get() {
    let pool = common::create_test_pool().await;
    cleanup_user(&pool, TEST_USER).await;
    let store = PostgresLoanStore::new(pool.clone());

    let loan = borrow_item(UserId::new(TEST_USER), ItemId::new(42), date(2024, 1, 1));
    let created = store.create(loan.clone()).await.expect("Failed to create loan");
    assert_eq!(created, loan);

    let fetched = store.get(loan.loan_id).await.expect("Failed to get loan");
    assert_eq!(fetched, loan);
    assert_eq!(fetched.status, LoanStatus::Borrowed);
    assert_eq!(fetched.return_date, None);

    cleanup_user(&pool, TEST_USER).await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_loan_store_get_missing_loan() {
    let pool = common::create_test_pool().await;
    let store = PostgresLoanStore::new(pool);

    let loan_id = LoanId::new();
    let result = store.get(loan_id).await;

    assert!(matches!(result, Err(LoanStoreError::NotFound(id)) if id == loan_id));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_loan_store_update_records_return() {
    let pool = common::create_test_pool().await;
    cleanup_user(&pool, TEST_USER).await;
    let store = PostgresLoanStore::new(pool.clone());

    let loan = borrow_item(UserId::new(TEST_USER), ItemId::new(42), date(2024, 1, 1));
    store.create(loan.clone()).await.unwrap();

    let returned = return_loan(&loan, date(2024, 1, 9)).unwrap();
    store.update(&returned).await.expect("Failed to update loan");

    let fetched = store.get(loan.loan_id).await.unwrap();
    assert_eq!(fetched.status, LoanStatus::Returned);
    assert_eq!(fetched.return_date, Some(date(2024, 1, 9)));
    assert_eq!(fetched.penalty, Penalty::new(1000));

    cleanup_user(&pool, TEST_USER).await;
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_loan_store_update_missing_loan() {
    let pool = common::create_test_pool().await;
    let store = PostgresLoanStore::new(pool);

    let loan = borrow_item(UserId::new(TEST_USER), ItemId::new(1), date(2024, 1, 1));
    let returned = return_loan(&loan, date(2024, 1, 2)).unwrap();

    let result = store.update(&returned).await;
    assert!(matches!(result, Err(LoanStoreError::NotFound(_))));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_loan_store_list_by_user_newest_first() {
    let pool = common::create_test_pool().await;
    cleanup_user(&pool, TEST_USER).await;
    cleanup_user(&pool, TEST_USER + 1).await;
    let store = PostgresLoanStore::new(pool.clone());

    let older = borrow_item(UserId::new(TEST_USER), ItemId::new(1), date(2024, 1, 1));
    let newer = borrow_item(UserId::new(TEST_USER), ItemId::new(2), date(2024, 2, 1));
    let other = borrow_item(UserId::new(TEST_USER + 1), ItemId::new(1), date(2024, 3, 1));
    store.create(older.clone()).await.unwrap();
    store.create(newer.clone()).await.unwrap();
    store.create(other).await.unwrap();

    let loans = store.list_by_user(UserId::new(TEST_USER)).await.unwrap();
    assert_eq!(loans, vec![newer, older]);

    let empty = store.list_by_user(UserId::new(TEST_USER + 2)).await.unwrap();
    assert!(empty.is_empty());

    cleanup_user(&pool, TEST_USER).await;
    cleanup_user(&pool, TEST_USER + 1).await;
}
