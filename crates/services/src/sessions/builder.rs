use quiz_core::model::{Question, Section, bank};
use rand::Rng;

/// Questions selected for one attempt, or the explicit empty outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPlan {
    Empty { section: Section },
    Ready { section: Section, questions: Vec<Question> },
}

impl SessionPlan {
    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            Self::Empty { section } | Self::Ready { section, .. } => *section,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Selects a section's questions and randomizes question and option order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionBuilder;

impl SessionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build a plan using the thread-local RNG.
    #[must_use]
    pub fn build(&self, section: Section, bank: &[Question]) -> SessionPlan {
        self.build_with_rng(section, bank, &mut rand::rng())
    }

    /// Build a plan drawing randomness from `rng`.
    ///
    /// Records that cannot be played are skipped. The correct answer is
    /// referenced by id, so shuffling options leaves it intact.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        section: Section,
        bank: &[Question],
        rng: &mut R,
    ) -> SessionPlan {
        let mut questions: Vec<Question> = bank::in_section(bank, section)
            .filter(|question| {
                let playable = question.is_playable();
                if !playable {
                    tracing::warn!(id = %question.id, %section, "skipping unplayable question");
                }
                playable
            })
            .cloned()
            .collect();

        if questions.is_empty() {
            tracing::info!(%section, "no questions available for section");
            return SessionPlan::Empty { section };
        }

        fisher_yates(&mut questions, rng);
        for question in &mut questions {
            fisher_yates(&mut question.options, rng);
        }

        tracing::debug!(%section, count = questions.len(), "built session plan");
        SessionPlan::Ready { section, questions }
    }
}

/// In-place Fisher–Yates: walk from the last index down to 1, swapping each
/// slot with a uniformly chosen index in `0..=i`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, OptionId, QuestionId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn q(id: u64, section: Section) -> Question {
        Question {
            id: QuestionId::new(id),
            section,
            prompt_text: Some(format!("Q{id}")),
            prompt_media: None,
            options: vec![
                AnswerOption::text("a", "1"),
                AnswerOption::text("b", "2"),
                AnswerOption::text("c", "3"),
                AnswerOption::text("d", "4"),
            ],
            correct_answer: OptionId::from("c"),
            explanation: None,
        }
    }

    fn sorted_ids(questions: &[Question]) -> Vec<u64> {
        let mut ids: Vec<u64> = questions.iter().map(|q| q.id.value()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn plan_is_a_permutation_of_the_section() {
        let bank: Vec<Question> = (1..=6)
            .map(|id| q(id, if id % 2 == 0 { Section::Grammar } else { Section::Reading }))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        let SessionPlan::Ready { questions, .. } =
            SessionBuilder::new().build_with_rng(Section::Grammar, &bank, &mut rng)
        else {
            panic!("expected a ready plan");
        };

        assert_eq!(sorted_ids(&questions), vec![2, 4, 6]);
        for question in &questions {
            let mut option_ids: Vec<&str> = question.options.iter().map(|o| o.id.as_str()).collect();
            option_ids.sort_unstable();
            assert_eq!(option_ids, vec!["a", "b", "c", "d"]);
            assert_eq!(question.correct_answer, OptionId::from("c"));
            assert_eq!(question.correct_option().unwrap().label(), "3");
        }
    }

    #[test]
    fn empty_section_yields_empty_plan() {
        let bank = vec![q(1, Section::Grammar)];
        let plan = SessionBuilder::new().build(Section::Listening, &bank);
        assert_eq!(plan, SessionPlan::Empty { section: Section::Listening });
        assert!(plan.is_empty());
    }

    #[test]
    fn unplayable_records_are_skipped() {
        let mut broken = q(2, Section::Grammar);
        broken.options.truncate(1);
        broken.correct_answer = OptionId::from("a");
        let bank = vec![q(1, Section::Grammar), broken];

        let SessionPlan::Ready { questions, .. } = SessionBuilder::new().build(Section::Grammar, &bank)
        else {
            panic!("expected a ready plan");
        };
        assert_eq!(sorted_ids(&questions), vec![1]);
    }

    #[test]
    fn fisher_yates_keeps_every_element() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut items: Vec<u32> = (0..50).collect();
        fisher_yates(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());

        let mut single = vec![1];
        fisher_yates(&mut single, &mut rng);
        assert_eq!(single, vec![1]);
        let mut none: Vec<u8> = Vec::new();
        fisher_yates(&mut none, &mut rng);
        assert!(none.is_empty());
    }
}
