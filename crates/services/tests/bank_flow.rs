use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::builtin;
use quiz_core::model::{
    AnswerOption, OptionId, Question, QuestionId, Section, encode_question_list,
};
use services::QuestionBankStore;
use storage::repository::{
    DurableStore, InMemoryCache, InMemoryDurableStore, LocalCache, OVERRIDES_KEY, Storage,
    StorageError,
};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

fn custom(id: u64, section: Section) -> Question {
    Question {
        id: QuestionId::new(id),
        section,
        prompt_text: Some(format!("custom {id}")),
        prompt_media: None,
        options: vec![AnswerOption::text("a", "はい"), AnswerOption::text("b", "いいえ")],
        correct_answer: OptionId::from("b"),
        explanation: None,
    }
}

/// Durable store whose reads block until released.
struct GatedStore {
    gate: Arc<Notify>,
    payload: String,
}

#[async_trait]
impl DurableStore for GatedStore {
    async fn read_overrides(&self) -> Result<String, StorageError> {
        self.gate.notified().await;
        Ok(self.payload.clone())
    }

    async fn write_overrides(&self, _questions: &[Question]) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test]
async fn builtin_bank_loads_with_empty_stores() {
    let storage = Storage::in_memory();
    let mut bank = QuestionBankStore::new(&storage);
    bank.load(&CancellationToken::new()).await;

    assert_eq!(bank.merged().len(), builtin::questions().len());
    assert_eq!(bank.next_id(), QuestionId::new(51));
    for section in Section::ALL {
        assert!(bank.section_count(section) > 0, "{section} has questions");
    }
}

#[tokio::test]
async fn cancelled_reconcile_mutates_nothing() {
    let cache = InMemoryCache::new();
    let cached = encode_question_list(&[custom(60, Section::Reading)]).unwrap();
    cache.seed(OVERRIDES_KEY, &cached).unwrap();

    let gate = Arc::new(Notify::new());
    let fresh = encode_question_list(&[custom(70, Section::Reading)]).unwrap();
    let storage = Storage {
        cache: Arc::new(cache.clone()),
        durable: Arc::new(GatedStore {
            gate: Arc::clone(&gate),
            payload: fresh,
        }),
    };

    let mut bank = QuestionBankStore::new(&storage);
    bank.hydrate();
    let token = CancellationToken::new();
    let reconciliation = bank.spawn_reconcile(token.clone());

    tokio::time::sleep(Duration::from_millis(10)).await;
    token.cancel();
    gate.notify_one();

    assert!(reconciliation.outcome().await.is_none());
    assert!(bank.get(QuestionId::new(60)).is_some());
    assert!(bank.get(QuestionId::new(70)).is_none());
    assert_eq!(cache.read(OVERRIDES_KEY).unwrap(), Some(cached));
}

#[tokio::test]
async fn local_edits_survive_until_reconcile_applies() {
    let durable = InMemoryDurableStore::new();
    durable.set_payload(encode_question_list(&[custom(80, Section::Grammar)]).unwrap());
    let storage = Storage {
        cache: Arc::new(InMemoryCache::new()),
        durable: Arc::new(durable.clone()),
    };

    let mut bank = QuestionBankStore::new(&storage);
    bank.hydrate();
    assert!(!bank.is_loading());
    assert!(bank.get(QuestionId::new(80)).is_none());

    let reconciliation = bank.spawn_reconcile(CancellationToken::new());
    let event = reconciliation.outcome().await.expect("fetch succeeds");
    bank.apply(event);

    assert!(bank.is_override(QuestionId::new(80)));
    assert_eq!(bank.next_id(), QuestionId::new(81));
}

#[tokio::test]
async fn override_shadowing_builtin_round_trips_through_durable_store() {
    let durable = InMemoryDurableStore::new();
    let storage = Storage {
        cache: Arc::new(InMemoryCache::new()),
        durable: Arc::new(durable.clone()),
    };

    let mut bank = QuestionBankStore::new(&storage);
    bank.load(&CancellationToken::new()).await;
    let original = bank.get(QuestionId::new(1)).cloned().unwrap();

    let mut shadow = custom(1, original.section);
    shadow.prompt_text = Some("shadowed".into());
    bank.upsert(shadow.clone()).wait().await.unwrap();

    let mut reloaded = QuestionBankStore::new(&Storage {
        cache: Arc::new(InMemoryCache::new()),
        durable: Arc::new(durable.clone()),
    });
    reloaded.load(&CancellationToken::new()).await;
    assert_eq!(reloaded.get(QuestionId::new(1)), Some(&shadow));

    reloaded.delete(QuestionId::new(1)).wait().await.unwrap();
    assert_eq!(reloaded.get(QuestionId::new(1)), Some(&original));
}
