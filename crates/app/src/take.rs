use std::sync::Arc;

use quiz_core::model::{MediaKind, OptionId, Question, ScoreReport, Section};
use services::sessions::format_clock;
use services::{Clock, QuestionBankStore, SessionBuilder, SessionTimer, TestFlow, TestSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use crate::AppError;

/// Run an interactive timed test for `section` on the terminal.
pub async fn run(section: Section, bank: &QuestionBankStore) -> Result<(), AppError> {
    let flow = TestFlow::prepare(section, bank, &SessionBuilder::new(), Clock::default_clock());
    match flow {
        TestFlow::Loading { .. } => {
            println!("Questions are still loading, try again in a moment.");
            Ok(())
        }
        TestFlow::Empty { section } => {
            println!("There are no questions in {} yet.", section.title());
            Ok(())
        }
        TestFlow::Session(session) => play(session).await,
    }
}

async fn play(mut session: TestSession) -> Result<(), AppError> {
    session.start()?;
    println!(
        "{}: {} questions, {} to finish.",
        session.section().title(),
        session.len(),
        format_clock(session.remaining_seconds())
    );
    println!("Type an option letter to answer, n/p to move, q to quit.");

    let shared = Arc::new(Mutex::new(session));
    let timer = SessionTimer::spawn(Arc::clone(&shared)).await;
    let mut remaining = timer.remaining();
    let mut timer_alive = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render(&*shared.lock().await);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(input) = line? else { break };
                let mut session = shared.lock().await;
                if handle_input(&mut session, &input) == Step::Stop {
                    break;
                }
                render(&session);
            }
            changed = remaining.changed(), if timer_alive => {
                if changed.is_err() {
                    timer_alive = false;
                    continue;
                }
                let left = *remaining.borrow_and_update();
                if left == 0 {
                    println!("Time's up!");
                    break;
                }
                if left % 60 == 0 {
                    println!("[{} left]", format_clock(left));
                }
            }
        }
    }

    timer.stop();
    let session = shared.lock().await;
    match session.report() {
        Ok(report) => print_report(session.questions(), &report),
        Err(_) => println!("Attempt abandoned."),
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Apply one line of input. Once the session has finished, for example when
/// the timer ran out while the line was waiting, input is ignored so the
/// caller falls through to the report.
fn handle_input(session: &mut TestSession, input: &str) -> Step {
    if !session.is_active() {
        return Step::Stop;
    }
    let result = match input.trim() {
        "" => Ok(()),
        "q" | "quit" => return Step::Stop,
        "n" | "next" => session.advance(),
        "p" | "prev" => session.retreat(),
        choice => session.record_answer(OptionId::from(choice.to_lowercase())),
    };
    if let Err(err) = result {
        println!("{err}");
    }
    if session.is_finished() {
        Step::Stop
    } else {
        Step::Continue
    }
}

fn render(session: &TestSession) {
    let snapshot = session.snapshot();
    let question = session.current_question();
    println!();
    println!(
        "Question {}/{} ({}%)  [{}]",
        snapshot.position + 1,
        snapshot.total,
        snapshot.progress_percent,
        snapshot.time_display
    );
    print_prompt(question);
    for option in &question.options {
        let marker = if snapshot.selected.as_ref() == Some(&option.id) {
            "*"
        } else {
            " "
        };
        println!(" {marker} {}) {}", option.id, option.label());
    }
}

fn print_prompt(question: &Question) {
    if let Some(media) = &question.prompt_media {
        let kind = match media.kind {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
        };
        println!("  [{kind}: {}]", media.url);
    }
    if !question.prompt_text().is_empty() {
        println!("  {}", question.prompt_text());
    }
}

fn print_report(questions: &[Question], report: &ScoreReport) {
    println!();
    println!(
        "Score: {}/{} ({}%) {}",
        report.correct_count(),
        report.total(),
        report.percentage(),
        if report.passed() { "PASSED" } else { "not passed" }
    );
    for (result, question) in report.positions().iter().zip(questions) {
        let mark = if result.is_correct { "o" } else { "x" };
        let selected = result.selected.as_ref().map_or("-", OptionId::as_str);
        println!(
            "{mark} #{} {} (yours: {selected}, correct: {})",
            result.question_id,
            question.prompt_text(),
            result.correct_answer
        );
        if let Some(explanation) = &result.explanation {
            println!("    {explanation}");
        }
    }
}
