use quiz_core::model::{
    AnswerOption, MediaKind, OptionId, PromptMedia, Question, QuestionId, Section,
    decode_question_list,
};
use sqlx::Row;
use storage::repository::{DurableStore, LocalCache, OVERRIDES_KEY, Storage};
use storage::sqlite::SqliteRepository;

fn build_question(id: u64, section: Section) -> Question {
    Question {
        id: QuestionId::new(id),
        section,
        prompt_text: Some(format!("Question {id}")),
        prompt_media: None,
        options: vec![
            AnswerOption::text("a", "はい"),
            AnswerOption::text("b", "いいえ"),
        ],
        correct_answer: OptionId::from("a"),
        explanation: Some("explained".into()),
    }
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn empty_database_reads_empty_list() {
    let repo = connect("memdb_empty").await;
    assert_eq!(repo.read_overrides().await.unwrap(), "[]");
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_questions_in_id_order() {
    let repo = connect("memdb_roundtrip").await;

    let mut listening = build_question(60, Section::Listening);
    listening.prompt_text = None;
    listening.prompt_media = Some(PromptMedia::new(MediaKind::Audio, "/audio/60.mp3", None));
    let questions = vec![listening, build_question(51, Section::Grammar)];

    repo.write_overrides(&questions).await.unwrap();

    let decoded = decode_question_list(&repo.read_overrides().await.unwrap()).unwrap();
    assert_eq!(decoded.skipped, 0);
    let ids: Vec<u64> = decoded.questions.iter().map(|q| q.id.value()).collect();
    assert_eq!(ids, vec![51, 60]);
    assert_eq!(decoded.questions[1], questions[0]);
}

#[tokio::test]
async fn write_replaces_previous_set() {
    let repo = connect("memdb_replace").await;

    repo.write_overrides(&[build_question(51, Section::Reading), build_question(52, Section::Reading)])
        .await
        .unwrap();
    repo.write_overrides(&[build_question(3, Section::Vocabulary)])
        .await
        .unwrap();

    let decoded = decode_question_list(&repo.read_overrides().await.unwrap()).unwrap();
    assert_eq!(decoded.questions, vec![build_question(3, Section::Vocabulary)]);

    let row = sqlx::query("SELECT section FROM custom_questions WHERE id = 3")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("section"), "vocabulary");
}

#[tokio::test]
async fn unreadable_rows_are_skipped() {
    let repo = connect("memdb_corrupt").await;
    repo.write_overrides(&[build_question(51, Section::Grammar)])
        .await
        .unwrap();

    sqlx::query(
        "INSERT INTO custom_questions (id, section, payload, updated_at) VALUES (52, 'grammar', '{not json', '2024-01-01T00:00:00Z')",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    let decoded = decode_question_list(&repo.read_overrides().await.unwrap()).unwrap();
    assert_eq!(decoded.questions.len(), 1);
    assert_eq!(decoded.questions[0].id, QuestionId::new(51));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");

    let row = sqlx::query("SELECT COUNT(*) AS n FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(row.get::<i64, _>("n"), 1);
}

#[tokio::test]
async fn sqlite_storage_pairs_file_cache_with_database() {
    let cache_dir = std::env::temp_dir().join(format!("quiz-storage-{}", uuid::Uuid::new_v4()));
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared", &cache_dir)
        .await
        .expect("storage");

    storage.cache.write(OVERRIDES_KEY, "[]").unwrap();
    assert_eq!(storage.cache.read(OVERRIDES_KEY).unwrap().as_deref(), Some("[]"));
    assert_eq!(storage.durable.read_overrides().await.unwrap(), "[]");

    std::fs::remove_dir_all(cache_dir).unwrap();
}
