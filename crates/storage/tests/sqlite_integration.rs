use quiz_core::model::{
    AnswerPatch, FontSize, QuestionId, SessionKey, Theme, UserSettings, ViewMode,
};
use storage::Storage;
use storage::answers::USER_ANSWERS_KEY;
use storage::repository::KeyValueStore;
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_key_value_roundtrip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get_item("@quiz:missing").await.unwrap(), None);

    repo.set_item("@quiz:doc", r#"{"a":1}"#).await.unwrap();
    repo.set_item("@quiz:doc", r#"{"a":2}"#).await.unwrap();
    assert_eq!(
        repo.get_item("@quiz:doc").await.unwrap().as_deref(),
        Some(r#"{"a":2}"#)
    );

    repo.remove_item("@quiz:doc").await.unwrap();
    repo.remove_item("@quiz:doc").await.unwrap();
    assert_eq!(repo.get_item("@quiz:doc").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn storage_documents_persist_through_sqlite() {
    let url = "sqlite:file:memdb_storage?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("storage");

    let q1 = QuestionId::new("q1");
    storage
        .answers
        .set(&AnswerPatch::submission(q1.clone(), "A,C".into(), false, 0))
        .await;
    storage.answers.set(&AnswerPatch::favorite(q1.clone(), true)).await;
    storage
        .progress
        .set(&SessionKey::new(ViewMode::Mock, "Civil Law"), 4)
        .await;
    storage.completed.mark_completed("Civil Law").await;
    storage
        .settings
        .save(&UserSettings::new(Theme::Dark, FontSize::Large))
        .await;

    // A second handle over the same database sees every document.
    let reopened = Storage::sqlite(url).await.expect("reopen");
    let record = reopened.answers.get(&q1).await.expect("record");
    assert_eq!(record.selected_answer(), Some("A,C"));
    assert_eq!(record.wrong_count(), 1);
    assert!(record.is_favorite());
    assert!(record.is_in_wrong_book());
    assert_eq!(
        reopened
            .progress
            .get(&SessionKey::new(ViewMode::Mock, "Civil Law"))
            .await,
        Some(4)
    );
    assert!(reopened.completed.is_completed("Civil Law").await);
    assert_eq!(reopened.settings.load().await.theme, Theme::Dark);
}

#[tokio::test]
async fn answers_document_is_camel_case_json() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_json?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    let storage = Storage::from_backend(std::sync::Arc::new(repo.clone()));

    storage
        .answers
        .set(&AnswerPatch::uncertain(QuestionId::new("q9"), true))
        .await;

    let raw = repo
        .get_item(USER_ANSWERS_KEY)
        .await
        .unwrap()
        .expect("document");
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["q9"]["questionId"], "q9");
    assert_eq!(json["q9"]["isUncertain"], true);
    assert_eq!(json["q9"]["isInWrongBook"], false);
}
