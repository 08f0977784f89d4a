//! Chart of accounts maintenance.

mod common;

use common::{actor, engine};
use mizan_core::ledger::{AccountType, PostVoucherInput, VoucherLine};
use mizan_db::entities::sea_orm_active_enums;
use mizan_db::repositories::{CreateAccountInput, UpdateAccountInput};
use rust_decimal_macros::dec;

fn account(code: &str, name: &str) -> CreateAccountInput {
    CreateAccountInput {
        code: code.into(),
        name: name.into(),
        account_type: AccountType::Expense,
    }
}

#[tokio::test]
async fn test_create_account() {
    let engine = engine().await;

    let created = engine
        .create_account(&actor(), account(" 760 ", " Pazarlama Giderleri "))
        .await
        .unwrap();
    assert_eq!(created.code, "760");
    assert_eq!(created.name, "Pazarlama Giderleri");
    assert!(created.is_active);

    let err = engine
        .create_account(&actor(), account("760", "Again"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_ACCOUNT_CODE");

    let err = engine
        .create_account(&actor(), account("761", "  "))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_until_referenced() {
    let engine = engine().await;
    engine
        .create_account(&actor(), account("760", "Pazarlama"))
        .await
        .unwrap();

    let updated = engine
        .update_account(
            &actor(),
            "760",
            UpdateAccountInput {
                name: Some("Pazarlama Giderleri".into()),
                account_type: Some(AccountType::Liability),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Pazarlama Giderleri");
    assert_eq!(updated.account_type, sea_orm_active_enums::AccountType::Liability);

    engine
        .post(
            &actor(),
            PostVoucherInput::new(
                "MAN-1",
                "manual",
                None,
                None,
                vec![
                    VoucherLine::debit("760", dec!(40)),
                    VoucherLine::credit("100", dec!(40)),
                ],
            ),
        )
        .await
        .unwrap();

    let err = engine
        .update_account(
            &actor(),
            "760",
            UpdateAccountInput {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_IN_USE");

    let err = engine
        .update_account(&actor(), "999", UpdateAccountInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_NOT_FOUND");
}

#[tokio::test]
async fn test_deactivate_hides_from_active_list() {
    let engine = engine().await;
    let all = engine.list_accounts(true).await.unwrap().len();

    let account = engine.deactivate_account(&actor(), "770").await.unwrap();
    assert!(!account.is_active);

    assert_eq!(engine.list_accounts(true).await.unwrap().len(), all);
    let active = engine.list_accounts(false).await.unwrap();
    assert_eq!(active.len(), all - 1);
    assert!(active.iter().all(|a| a.code != "770"));

    let trail = engine.audit_trail("account", "770").await.unwrap();
    assert_eq!(trail.last().map(|e| e.action.as_str()), Some("deactivate"));
}
