pub mod loan_store;

// パブリックに型を再エクスポート
pub use loan_store::LoanStore as PostgresLoanStore;
