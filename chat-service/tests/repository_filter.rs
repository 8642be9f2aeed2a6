//! Filter, pagination and soft delete against a live database

mod support;

use chat_service::domain::{CreatePersonnelInput, Personnel};
use chat_service::query::{
    FieldPredicate, FilterInput, FilterOperator, FilterValue, QueryAssociation, QueryOptions,
    SortKey,
};
use chat_service::repository::{Repository, RepositoryErrorKind};
use chat_service::transaction::TxContext;
use serde_json::json;
use support::TestHarness;
use uuid::Uuid;

#[tokio::test]
async fn test_filter_by_role_sorted_newest_first() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    for (i, role) in ["ADMIN", "USER", "ADMIN", "USER", "ADMIN"].iter().enumerate() {
        harness
            .seed_user(&format!("+9198765432{:02}", i), role, None)
            .await;
    }

    let input = FilterInput::default()
        .with_predicate(FieldPredicate::eq("role", "ADMIN"))
        .with_sort(SortKey::desc("created_at"));
    let options = QueryOptions::default().with_page(10, 0);

    let page = harness
        .users()
        .filter(TxContext::NoTx, &input, &options)
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 3);
    assert!(page.items.iter().all(|user| user.role == "ADMIN"));
    assert!(page
        .items
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    harness.teardown().await;
}

#[tokio::test]
async fn test_empty_filter_counts_undeleted_rows() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    let first = harness.seed_user("+919000000001", "USER", None).await;
    harness.seed_user("+919000000002", "USER", None).await;
    harness.seed_user("+919000000003", "ADMIN", None).await;
    harness.users().delete(TxContext::NoTx, first).await.unwrap();

    let page = harness
        .users()
        .filter(TxContext::NoTx, &FilterInput::default(), &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|user| user.id != first));

    harness.teardown().await;
}

#[tokio::test]
async fn test_page_window_and_tenant_guard() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    let org = Uuid::new_v4();
    for i in 0..4 {
        harness
            .seed_user(&format!("+91911111110{}", i), "USER", Some(org))
            .await;
    }
    harness.seed_user("+919222222220", "USER", None).await;

    let input = FilterInput::default()
        .with_sort(SortKey::asc("user_name"))
        .with_tenant(Some(org));
    let options = QueryOptions::default().with_page(3, 3);

    let page = harness
        .users()
        .filter(TxContext::NoTx, &input, &options)
        .await
        .unwrap();

    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].user_name, "+919111111103");

    harness.teardown().await;
}

#[tokio::test]
async fn test_soft_delete_is_idempotent() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    let id = harness.seed_user("+919333333330", "USER", None).await;
    let users = harness.users();

    users.delete(TxContext::NoTx, id).await.unwrap();
    users.delete(TxContext::NoTx, id).await.unwrap();

    let err = users.find_by_id(TxContext::NoTx, id).await.unwrap_err();
    assert_eq!(err.kind, RepositoryErrorKind::NotFound);

    harness.teardown().await;
}

#[tokio::test]
async fn test_personnel_filter_loads_user_association() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    let user_id = harness.seed_user("+919444444440", "ADMIN", None).await;
    let personnel: Personnel = harness
        .state
        .personnel()
        .create(
            None,
            CreatePersonnelInput {
                first_name: "Asha".to_string(),
                last_name: "Rao".to_string(),
                mobile: "+919444444440".to_string(),
                role: "ADMIN".to_string(),
                user_id,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let input = FilterInput::default().with_predicate(FieldPredicate::like("first_name", "sh"));
    let options = QueryOptions::default()
        .with_fields("id,first_name,user_id")
        .with_association(QueryAssociation::new("user", "id,user_name"));

    let result = harness
        .state
        .personnel()
        .filter(None, input, &options)
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].id, personnel.id);
    let users = &result.associations["user"];
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["user_name"], "+919444444440");

    harness.teardown().await;
}

#[tokio::test]
async fn test_between_binds_timestamp_pair() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    let days = [
        "2024-01-01T12:00:00Z",
        "2024-01-15T12:00:00Z",
        "2024-02-01T12:00:00Z",
    ];
    for (i, day) in days.iter().enumerate() {
        let id = harness
            .seed_user(&format!("+91955500000{}", i), "USER", None)
            .await;
        sqlx::query("UPDATE users SET created_at = $1::timestamptz WHERE id = $2")
            .bind(*day)
            .bind(id)
            .execute(&harness.pool)
            .await
            .unwrap();
    }

    let input = FilterInput::default()
        .with_predicate(FieldPredicate::new(
            "created_at",
            FilterOperator::Between,
            FilterValue::from_json(json!(["2024-01-01T00:00:00Z", "2024-01-31T00:00:00Z"])),
        ))
        .with_sort(SortKey::asc("created_at"));

    let page = harness
        .users()
        .filter(TxContext::NoTx, &input, &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].user_name, "+919555000000");
    assert_eq!(page.items[1].user_name, "+919555000001");

    harness.teardown().await;
}

#[tokio::test]
async fn test_nin_expands_against_text_columns() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    harness.seed_user("+919666000000", "ADMIN", None).await;
    harness.seed_user("+919666000001", "USER", None).await;
    harness.seed_user("+919666000002", "USER", None).await;

    let by_role = FilterInput::default().with_predicate(FieldPredicate::new(
        "role",
        FilterOperator::NotIn,
        FilterValue::from_json(json!(["ADMIN"])),
    ));
    let page = harness
        .users()
        .filter(TxContext::NoTx, &by_role, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|user| user.role == "USER"));

    let by_name = FilterInput::default().with_predicate(FieldPredicate::new(
        "user_name",
        FilterOperator::NotIn,
        FilterValue::from_json(json!(["+919666000000", "+919666000002"])),
    ));
    let page = harness
        .users()
        .filter(TxContext::NoTx, &by_name, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].user_name, "+919666000001");

    harness.teardown().await;
}

#[tokio::test]
async fn test_uuid_shaped_text_predicate_binds_as_text() {
    let Some(harness) = TestHarness::start().await else {
        return;
    };

    let sender = harness.seed_user("+919777000000", "USER", None).await;
    let receiver = harness.seed_user("+919777000001", "USER", None).await;
    let token = Uuid::new_v4().to_string();
    harness
        .state
        .messages()
        .create(chat_service::domain::CreateMessageInput {
            sender_id: sender,
            receiver_id: receiver,
            content: token.clone(),
        })
        .await
        .unwrap();

    let input = FilterInput::default()
        .with_predicate(FieldPredicate::eq("content", FilterValue::from_json(json!(token))));
    let result = harness
        .state
        .messages()
        .filter(None, input, &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].content, token);

    harness.teardown().await;
}
