//! Quiz navigation handlers.
//!
//! Every handler answers with the same [`QuizView`], so the client re-renders
//! from one shape no matter which button was pressed. `event` says what the
//! action did, e.g. `reshuffled` when the deck ran out and started over.
//!
//! The session holds only the [`QuizSession`] order and cursor; each request
//! reads the discipline's questions from the store to render them.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use lechare_core::quiz::{Card, CommentToggle, Direction, Navigation, Progress, QuizSession};
use lechare_core::{Discipline, DisciplineId, Question};

use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::{RequireStudent, RequireUnlocked, clear_student_session};
use crate::models::{CurrentUser, keys};
use crate::state::AppState;

/// What the last action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizEvent {
    Advanced,
    Replayed,
    Reshuffled,
    MovedBack,
    Unchanged,
    NoComment,
}

impl QuizEvent {
    const fn from_navigation(navigation: Navigation) -> Option<Self> {
        match navigation {
            Navigation::Advanced => Some(Self::Advanced),
            Navigation::Replayed => Some(Self::Replayed),
            Navigation::Reshuffled => Some(Self::Reshuffled),
            Navigation::MovedBack => Some(Self::MovedBack),
            Navigation::Unchanged => Some(Self::Unchanged),
            Navigation::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    /// The discipline has no questions; only exit makes sense.
    Empty,
    Active,
}

/// Everything the client needs to draw the quiz screen.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub discipline: String,
    pub user: String,
    pub status: QuizStatus,
    pub question: Option<Card>,
    pub has_comment: bool,
    pub can_go_back: bool,
    pub progress: Progress,
    pub event: Option<QuizEvent>,
}

impl QuizView {
    fn new(
        quiz: &QuizSession,
        discipline: &Discipline,
        user: &CurrentUser,
        event: Option<QuizEvent>,
    ) -> Self {
        let questions = &discipline.questions;
        Self {
            discipline: discipline.name.clone(),
            user: user.name.clone(),
            status: if quiz.is_empty() {
                QuizStatus::Empty
            } else {
                QuizStatus::Active
            },
            question: quiz.card(questions),
            has_comment: quiz.current(questions).is_some_and(Question::has_comment),
            can_go_back: quiz.can_go_back(),
            progress: quiz.progress(),
            event,
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The quiz in progress and the discipline it runs over.
///
/// A quiz whose discipline was removed is dropped. One whose question count
/// changed since the shuffle starts over on the current questions.
async fn load_quiz(state: &AppState, session: &Session) -> Result<(QuizSession, Discipline)> {
    let quiz: QuizSession = session
        .get(keys::ACTIVE_QUIZ)
        .await?
        .ok_or_else(|| AppError::BadRequest("No quiz in progress".to_string()))?;

    let discipline = match find_discipline(state, quiz.discipline_id()) {
        Ok(discipline) => discipline,
        Err(e) => {
            session.remove_value(keys::ACTIVE_QUIZ).await?;
            return Err(e);
        }
    };
    if quiz.fits(&discipline) {
        return Ok((quiz, discipline));
    }

    tracing::info!(
        discipline = %discipline.name,
        questions = discipline.questions.len(),
        "Questions changed mid-quiz, starting over"
    );
    let quiz = QuizSession::start(&discipline, &mut rand::rng());
    save_quiz(session, &quiz).await?;
    Ok((quiz, discipline))
}

async fn save_quiz(session: &Session, quiz: &QuizSession) -> Result<()> {
    session.insert(keys::ACTIVE_QUIZ, quiz).await?;
    Ok(())
}

fn find_discipline(state: &AppState, id: &DisciplineId) -> Result<Discipline> {
    state
        .store()
        .disciplines()?
        .into_iter()
        .find(|d| &d.id == id)
        .ok_or_else(|| AppError::NotFound("Discipline not found".to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// Shuffle the unlocked discipline and show the first question.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    RequireStudent(user): RequireStudent,
    RequireUnlocked(discipline_id): RequireUnlocked,
) -> Result<Json<QuizView>> {
    let discipline = find_discipline(&state, &discipline_id)?;
    let quiz = QuizSession::start(&discipline, &mut rand::rng());
    save_quiz(&session, &quiz).await?;

    tracing::info!(
        discipline = %discipline.name,
        questions = quiz.total(),
        "Quiz started"
    );
    Ok(Json(QuizView::new(&quiz, &discipline, &user, None)))
}

/// Current state without changing anything.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireStudent(user): RequireStudent,
) -> Result<Json<QuizView>> {
    let (quiz, discipline) = load_quiz(&state, &session).await?;
    Ok(Json(QuizView::new(&quiz, &discipline, &user, None)))
}

async fn navigate(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    direction: Direction,
) -> Result<QuizView> {
    let (mut quiz, discipline) = load_quiz(state, session).await?;
    let navigation = quiz.navigate(direction, &mut rand::rng());
    save_quiz(session, &quiz).await?;

    if navigation == Navigation::Reshuffled {
        tracing::debug!(discipline = %discipline.name, "Deck exhausted, reshuffled");
    }
    Ok(QuizView::new(
        &quiz,
        &discipline,
        user,
        QuizEvent::from_navigation(navigation),
    ))
}

/// Next question: replay forward through history, else draw an unseen one.
pub async fn next(
    State(state): State<AppState>,
    session: Session,
    RequireStudent(user): RequireStudent,
) -> Result<Json<QuizView>> {
    navigate(&state, &session, &user, Direction::Next)
        .await
        .map(Json)
}

/// Previous question in history.
pub async fn prev(
    State(state): State<AppState>,
    session: Session,
    RequireStudent(user): RequireStudent,
) -> Result<Json<QuizView>> {
    navigate(&state, &session, &user, Direction::Prev)
        .await
        .map(Json)
}

/// Show or hide the answer.
pub async fn toggle_answer(
    State(state): State<AppState>,
    session: Session,
    RequireStudent(user): RequireStudent,
) -> Result<Json<QuizView>> {
    let (mut quiz, discipline) = load_quiz(&state, &session).await?;
    quiz.toggle_answer();
    save_quiz(&session, &quiz).await?;
    Ok(Json(QuizView::new(&quiz, &discipline, &user, None)))
}

/// Show or hide the comment.
pub async fn toggle_comment(
    State(state): State<AppState>,
    session: Session,
    RequireStudent(user): RequireStudent,
) -> Result<Json<QuizView>> {
    let (mut quiz, discipline) = load_quiz(&state, &session).await?;
    let event = match quiz.toggle_comment(&discipline.questions) {
        CommentToggle::NoComment => Some(QuizEvent::NoComment),
        CommentToggle::Shown | CommentToggle::Hidden => None,
    };
    save_quiz(&session, &quiz).await?;
    Ok(Json(QuizView::new(&quiz, &discipline, &user, event)))
}

/// Start over with a fresh shuffle of the discipline's current questions.
pub async fn restart(
    State(state): State<AppState>,
    session: Session,
    RequireStudent(user): RequireStudent,
) -> Result<Json<QuizView>> {
    let (mut quiz, discipline) = load_quiz(&state, &session).await?;
    quiz.restart(&discipline, &mut rand::rng());
    save_quiz(&session, &quiz).await?;

    Ok(Json(QuizView::new(&quiz, &discipline, &user, None)))
}

/// Leave the quiz. Same as logging out.
pub async fn exit(session: Session) -> Result<Json<Value>> {
    clear_student_session(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lechare_core::{Email, UserId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new("1"),
            name: "Ana".into(),
            email: Email::parse("ana@escola.br").unwrap(),
        }
    }

    fn view(questions: Vec<Question>, event: Option<QuizEvent>) -> QuizView {
        let mut discipline = Discipline::new("POO", "poo");
        discipline.questions = questions;
        let quiz = QuizSession::start(&discipline, &mut StdRng::seed_from_u64(7));
        QuizView::new(&quiz, &discipline, &user(), event)
    }

    #[test]
    fn test_empty_view() {
        let view = view(Vec::new(), None);
        assert_eq!(view.status, QuizStatus::Empty);
        assert!(view.question.is_none());
        assert!(!view.can_go_back);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "empty");
        assert_eq!(json["event"], Value::Null);
    }

    #[test]
    fn test_active_view_hides_answer() {
        let view = view(
            vec![Question::new("1", "O que é?", "Isso", "Nota")],
            Some(QuizEvent::Reshuffled),
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["discipline"], "POO");
        assert_eq!(json["user"], "Ana");
        assert_eq!(json["question"]["question"], "O que é?");
        assert_eq!(json["question"]["answer"], Value::Null);
        assert_eq!(json["has_comment"], true);
        assert_eq!(json["event"], "reshuffled");
        assert_eq!(json["progress"]["total"], 1);
    }

    #[test]
    fn test_navigation_events() {
        assert_eq!(
            QuizEvent::from_navigation(Navigation::MovedBack),
            Some(QuizEvent::MovedBack)
        );
        assert_eq!(QuizEvent::from_navigation(Navigation::Empty), None);
        assert_eq!(
            serde_json::to_value(QuizEvent::NoComment).unwrap(),
            "no_comment"
        );
    }
}
