use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{AnswerOption, OptionId, Question, QuestionId, Section};
use quiz_core::time::fixed_clock;
use services::{
    FinishReason, QuestionBankStore, SessionBuilder, SessionState, SessionTimer, TestFlow,
    TestSession,
};
use storage::repository::Storage;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

fn question(id: u64, correct: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        section: Section::Listening,
        prompt_text: Some(format!("Q{id}")),
        prompt_media: None,
        options: vec![
            AnswerOption::text("a", "1"),
            AnswerOption::text("b", "2"),
            AnswerOption::text("c", "3"),
        ],
        correct_answer: OptionId::from(correct),
        explanation: None,
    }
}

fn started(questions: Vec<Question>) -> Arc<Mutex<TestSession>> {
    let mut session = TestSession::new(Section::Listening, questions, fixed_clock()).unwrap();
    session.start().unwrap();
    Arc::new(Mutex::new(session))
}

#[tokio::test(start_paused = true)]
async fn unanswered_session_times_out_at_zero() {
    let shared = started(vec![question(1, "a")]);
    let timer = SessionTimer::spawn(Arc::clone(&shared)).await;
    let remaining = timer.remaining();

    tokio::time::sleep(Duration::from_secs(119)).await;
    tokio::task::yield_now().await;
    assert!(shared.lock().await.is_active());

    timer.join().await;
    assert_eq!(*remaining.borrow(), 0);
    {
        let session = shared.lock().await;
        assert_eq!(session.state(), SessionState::Finished(FinishReason::TimeUp));
        assert_eq!(session.remaining_seconds(), 0);
    }

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(shared.lock().await.remaining_seconds(), 0);
}

#[tokio::test(start_paused = true)]
async fn timer_stops_when_session_completes() {
    let shared = started(vec![question(1, "b")]);
    let timer = SessionTimer::spawn(Arc::clone(&shared)).await;

    tokio::time::sleep(Duration::from_secs(10)).await;
    {
        let mut session = shared.lock().await;
        session.record_answer(OptionId::from("b")).unwrap();
        session.advance().unwrap();
    }
    timer.join().await;

    let session = shared.lock().await;
    assert_eq!(session.state(), SessionState::Finished(FinishReason::Completed));
    assert!(session.remaining_seconds() >= 109);
    assert_eq!(session.report().unwrap().percentage(), 100);
}

#[tokio::test(start_paused = true)]
async fn dropped_timer_never_ticks_again() {
    let shared = started(vec![question(1, "a"), question(2, "a")]);
    let timer = SessionTimer::spawn(Arc::clone(&shared)).await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    drop(timer);
    tokio::task::yield_now().await;
    let frozen = shared.lock().await.remaining_seconds();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(shared.lock().await.remaining_seconds(), frozen);
    assert!(shared.lock().await.is_active());
}

#[tokio::test]
async fn full_attempt_over_builtin_section() {
    let storage = Storage::in_memory();
    let mut bank = QuestionBankStore::new(&storage);
    bank.load(&CancellationToken::new()).await;

    let flow = TestFlow::prepare(Section::Grammar, &bank, &SessionBuilder::new(), fixed_clock());
    let mut session = flow.into_session().expect("grammar has questions");
    session.start().unwrap();

    let total = session.len();
    for _ in 0..total {
        let correct = session.current_question().correct_answer.clone();
        session.record_answer(correct).unwrap();
        session.advance().unwrap();
    }

    let report = session.report().unwrap();
    assert_eq!(report.total(), bank.section_count(Section::Grammar));
    assert_eq!(report.correct_count(), total);
    assert!(report.passed());
}
