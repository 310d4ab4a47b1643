//! Quiz navigation state machine.
//!
//! A [`QuizSession`] presents one question at a time from a discipline,
//! guaranteeing that every question is shown once before any repeats while
//! still allowing backward and forward replay over what was already seen.
//!
//! ```text
//! start ──► Empty                      (discipline has no questions)
//!   │
//!   └────► Active ──next/prev──► Active
//!             ▲                    │
//!             └── reshuffle ◄──────┘ (next with every question seen)
//! ```
//!
//! The session keeps no question text. `order` is a Fisher-Yates permutation
//! of indices into the discipline's questions and positions in `history`
//! index into `order`; callers pass the questions back in to render. The next
//! unseen question is drawn uniformly from the explicit set of unvisited
//! positions, so a draw always terminates.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::types::{Discipline, DisciplineId, Question};

/// Navigation direction requested by the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

/// What a call to [`QuizSession::navigate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    /// A new, previously unseen question was drawn.
    Advanced,
    /// Moved forward through already visited history.
    Replayed,
    /// Moved one step back in history.
    MovedBack,
    /// `prev` at the first position.
    Unchanged,
    /// Every question had been seen; the deck was shuffled again.
    Reshuffled,
    /// The discipline has no questions.
    Empty,
}

/// Outcome of [`QuizSession::toggle_comment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentToggle {
    Shown,
    Hidden,
    /// The current question has a blank comment; nothing changed.
    NoComment,
}

/// Distinct questions seen up to the current position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub seen: usize,
    pub total: usize,
    pub percent: f64,
}

/// The current question with only the revealed parts filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub number: String,
    pub question: String,
    pub answer: Option<String>,
    pub comment: Option<String>,
}

/// Per-student quiz state for one discipline.
///
/// Lives in the HTTP session; it is never written to the persistent store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSession {
    discipline_id: DisciplineId,
    order: Vec<usize>,
    history: Vec<usize>,
    current_index: usize,
    show_answer: bool,
    show_comment: bool,
}

impl QuizSession {
    /// Start a quiz over `discipline`'s questions.
    ///
    /// An empty discipline yields a session in the terminal empty state.
    pub fn start<R: Rng + ?Sized>(discipline: &Discipline, rng: &mut R) -> Self {
        let mut session = Self {
            discipline_id: discipline.id.clone(),
            order: (0..discipline.questions.len()).collect(),
            history: Vec::new(),
            current_index: 0,
            show_answer: false,
            show_comment: false,
        };
        session.reshuffle(rng);
        session
    }

    /// Start over on the same discipline with a fresh shuffle.
    pub fn restart<R: Rng + ?Sized>(&mut self, discipline: &Discipline, rng: &mut R) {
        *self = Self::start(discipline, rng);
    }

    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
        self.history = if self.order.is_empty() {
            Vec::new()
        } else {
            vec![0]
        };
        self.current_index = 0;
        self.hide_reveals();
    }

    fn hide_reveals(&mut self) {
        self.show_answer = false;
        self.show_comment = false;
    }

    #[must_use]
    pub const fn discipline_id(&self) -> &DisciplineId {
        &self.discipline_id
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.order.len()
    }

    /// Whether `discipline` still has the question count this session was
    /// shuffled over. An import that changes the count invalidates the order.
    #[must_use]
    pub fn fits(&self, discipline: &Discipline) -> bool {
        discipline.id == self.discipline_id && discipline.questions.len() == self.order.len()
    }

    /// Visited positions into the shuffled order, in visiting order.
    #[must_use]
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn answer_visible(&self) -> bool {
        self.show_answer
    }

    #[must_use]
    pub const fn comment_visible(&self) -> bool {
        self.show_comment
    }

    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        self.current_index > 0
    }

    /// The question under the cursor, `None` when empty.
    #[must_use]
    pub fn current<'q>(&self, questions: &'q [Question]) -> Option<&'q Question> {
        self.history
            .get(self.current_index)
            .and_then(|&position| self.order.get(position))
            .and_then(|&index| questions.get(index))
    }

    /// Move through the deck. Any call hides the answer and the comment.
    pub fn navigate<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> Navigation {
        if self.is_empty() {
            return Navigation::Empty;
        }
        self.hide_reveals();

        match direction {
            Direction::Prev => {
                if self.current_index > 0 {
                    self.current_index -= 1;
                    Navigation::MovedBack
                } else {
                    Navigation::Unchanged
                }
            }
            Direction::Next => {
                if self.current_index + 1 < self.history.len() {
                    self.current_index += 1;
                    return Navigation::Replayed;
                }

                let visited: HashSet<usize> = self.history.iter().copied().collect();
                let unvisited: Vec<usize> = (0..self.order.len())
                    .filter(|position| !visited.contains(position))
                    .collect();

                match unvisited.choose(rng) {
                    Some(&next) => {
                        self.history.push(next);
                        self.current_index += 1;
                        Navigation::Advanced
                    }
                    None => {
                        self.reshuffle(rng);
                        Navigation::Reshuffled
                    }
                }
            }
        }
    }

    /// Flip answer visibility and return the new state.
    pub fn toggle_answer(&mut self) -> bool {
        if !self.is_empty() {
            self.show_answer = !self.show_answer;
        }
        self.show_answer
    }

    /// Flip comment visibility, unless the current comment is blank.
    pub fn toggle_comment(&mut self, questions: &[Question]) -> CommentToggle {
        if !self.current(questions).is_some_and(Question::has_comment) {
            return CommentToggle::NoComment;
        }
        self.show_comment = !self.show_comment;
        if self.show_comment {
            CommentToggle::Shown
        } else {
            CommentToggle::Hidden
        }
    }

    /// Distinct positions in `history[..=current_index]` over the deck size.
    ///
    /// Going back lowers the count; it never counts positions only visited
    /// after the cursor.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let total = self.order.len();
        let end = (self.current_index + 1).min(self.history.len());
        let seen = self
            .history
            .get(..end)
            .map_or(0, |prefix| prefix.iter().collect::<HashSet<_>>().len());

        #[allow(clippy::cast_precision_loss)] // Question counts never approach 2^52
        let percent = if total == 0 {
            0.0
        } else {
            seen as f64 / total as f64 * 100.0
        };

        Progress {
            seen,
            total,
            percent,
        }
    }

    /// The current question with unrevealed parts hidden.
    #[must_use]
    pub fn card(&self, questions: &[Question]) -> Option<Card> {
        self.current(questions).map(|q| Card {
            number: q.number.clone(),
            question: q.question.clone(),
            answer: self.show_answer.then(|| q.answer.clone()),
            comment: (self.show_comment && q.has_comment()).then(|| q.comment.clone()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn discipline(size: usize) -> Discipline {
        let mut d = Discipline::new("POO", "poo");
        d.questions = (1..=size)
            .map(|n| {
                Question::new(
                    n.to_string(),
                    format!("Pergunta {n}"),
                    format!("Resposta {n}"),
                    if n % 2 == 0 { format!("Comentário {n}") } else { String::new() },
                )
            })
            .collect();
        d
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_start_empty_discipline() {
        let mut rng = rng();
        let mut session = QuizSession::start(&discipline(0), &mut rng);

        assert!(session.is_empty());
        assert!(session.current(&[]).is_none());
        assert_eq!(session.navigate(Direction::Next, &mut rng), Navigation::Empty);
        assert_eq!(session.navigate(Direction::Prev, &mut rng), Navigation::Empty);
        assert_eq!(session.toggle_comment(&[]), CommentToggle::NoComment);
        assert!(!session.toggle_answer());
        assert_eq!(session.progress().total, 0);
    }

    #[test]
    fn test_start_is_a_permutation() {
        let d = discipline(20);
        let session = QuizSession::start(&d, &mut rng());

        let mut order = session.order.clone();
        order.sort_unstable();
        assert_eq!(order, (0..20).collect::<Vec<_>>());
        assert_eq!(session.history(), &[0]);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn test_every_question_before_repeat_then_reshuffle() {
        for size in [1, 2, 5, 13] {
            let d = discipline(size);
            let mut rng = rng();
            let mut session = QuizSession::start(&d, &mut rng);
            let mut seen: HashSet<String> = HashSet::new();
            seen.insert(session.current(&d.questions).unwrap().number.clone());
            let mut reshuffles = 0;

            for _ in 0..size {
                match session.navigate(Direction::Next, &mut rng) {
                    Navigation::Reshuffled => reshuffles += 1,
                    Navigation::Advanced => {
                        let number = session.current(&d.questions).unwrap().number.clone();
                        assert!(seen.insert(number), "question repeated before exhaustion");
                    }
                    other => panic!("unexpected navigation {other:?}"),
                }
            }

            assert_eq!(seen.len(), size);
            assert_eq!(reshuffles, 1);
            assert_eq!(session.history(), &[0]);
        }
    }

    #[test]
    fn test_last_unvisited_is_drawn() {
        let d = discipline(2);
        let mut rng = rng();
        let mut session = QuizSession::start(&d, &mut rng);

        assert_eq!(session.navigate(Direction::Next, &mut rng), Navigation::Advanced);
        assert_eq!(session.history(), &[0, 1]);
    }

    #[test]
    fn test_prev_and_replay() {
        let d = discipline(5);
        let mut rng = rng();
        let mut session = QuizSession::start(&d, &mut rng);

        assert_eq!(session.navigate(Direction::Prev, &mut rng), Navigation::Unchanged);
        session.navigate(Direction::Next, &mut rng);
        session.navigate(Direction::Next, &mut rng);
        let third = session.current(&d.questions).cloned();

        assert_eq!(session.navigate(Direction::Prev, &mut rng), Navigation::MovedBack);
        assert_eq!(session.navigate(Direction::Prev, &mut rng), Navigation::MovedBack);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.navigate(Direction::Next, &mut rng), Navigation::Replayed);
        assert_eq!(session.navigate(Direction::Next, &mut rng), Navigation::Replayed);
        assert_eq!(session.current(&d.questions).cloned(), third);
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_toggle_answer_twice_restores() {
        let mut session = QuizSession::start(&discipline(3), &mut rng());
        let before = session.answer_visible();
        session.toggle_answer();
        session.toggle_answer();
        assert_eq!(session.answer_visible(), before);
    }

    #[test]
    fn test_navigation_hides_reveals() {
        let mut rng = rng();
        let d = discipline(4);
        let mut session = QuizSession::start(&d, &mut rng);
        session.toggle_answer();
        assert!(session.card(&d.questions).unwrap().answer.is_some());

        session.navigate(Direction::Prev, &mut rng);
        assert!(!session.answer_visible());
        assert!(session.card(&d.questions).unwrap().answer.is_none());
    }

    #[test]
    fn test_toggle_comment_requires_comment() {
        let mut d = discipline(1);
        d.questions[0].comment = "   ".to_string();
        let mut session = QuizSession::start(&d, &mut rng());
        assert_eq!(session.toggle_comment(&d.questions), CommentToggle::NoComment);
        assert!(!session.comment_visible());

        d.questions[0].comment = "Veja o capítulo 3".to_string();
        let mut session = QuizSession::start(&d, &mut rng());
        assert_eq!(session.toggle_comment(&d.questions), CommentToggle::Shown);
        assert_eq!(
            session.card(&d.questions).unwrap().comment.as_deref(),
            Some("Veja o capítulo 3")
        );
        assert_eq!(session.toggle_comment(&d.questions), CommentToggle::Hidden);
    }

    #[test]
    fn test_progress_counts_distinct_prefix() {
        let mut rng = rng();
        let mut session = QuizSession::start(&discipline(4), &mut rng);
        assert_eq!(session.progress().seen, 1);
        assert!((session.progress().percent - 25.0).abs() < f64::EPSILON);

        let mut last = session.progress().percent;
        for _ in 0..3 {
            session.navigate(Direction::Next, &mut rng);
            let now = session.progress().percent;
            assert!(now >= last);
            last = now;
        }
        assert_eq!(session.progress().seen, 4);

        session.navigate(Direction::Prev, &mut rng);
        assert_eq!(session.progress().seen, 3);
        session.navigate(Direction::Prev, &mut rng);
        assert_eq!(session.progress().seen, 2);
        session.navigate(Direction::Next, &mut rng);
        assert_eq!(session.progress().seen, 3);
    }

    #[test]
    fn test_restart_resets_state() {
        let d = discipline(6);
        let mut rng = rng();
        let mut session = QuizSession::start(&d, &mut rng);
        session.navigate(Direction::Next, &mut rng);
        session.navigate(Direction::Next, &mut rng);
        session.toggle_answer();

        session.restart(&d, &mut rng);
        assert_eq!(session.history(), &[0]);
        assert_eq!(session.current_index(), 0);
        assert!(!session.answer_visible());
    }

    #[test]
    fn test_session_holds_no_question_text() {
        let d = discipline(3);
        let session = QuizSession::start(&d, &mut rng());
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("Pergunta"));
        assert!(!json.contains("Resposta"));
    }

    #[test]
    fn test_fits_tracks_question_count() {
        let mut d = discipline(3);
        let session = QuizSession::start(&d, &mut rng());
        assert!(session.fits(&d));

        d.questions.pop();
        assert!(!session.fits(&d));
        assert!(!session.fits(&discipline(3)));
    }

    #[test]
    fn test_direction_deserializes_lowercase() {
        let d: Direction = serde_json::from_str("\"next\"").unwrap();
        assert_eq!(d, Direction::Next);
    }
}
