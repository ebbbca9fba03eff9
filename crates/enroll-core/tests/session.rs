//! End-to-end tests driving the session through messages.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use common::{FakeBackend, InsertBehavior, entry, settle_background, shared, student};
use enroll_core::model::{CourseId, DraftField};
use enroll_core::{
    EnrollmentSession, Message, NotificationKind, SessionConfig, SubmissionState,
};

async fn loaded_session(backend: &Arc<FakeBackend>) -> EnrollmentSession {
    let (mut session, startup) =
        EnrollmentSession::new(shared(backend), SessionConfig::new(student()));
    assert!(session.is_loading());
    session.drive(startup).await;
    assert!(!session.is_loading());
    session
}

fn counting_session(session: EnrollmentSession, calls: &Arc<AtomicUsize>) -> EnrollmentSession {
    let calls = Arc::clone(calls);
    session.with_completion(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    })
}

fn filtered_ids(session: &EnrollmentSession) -> Vec<String> {
    session
        .filtered()
        .iter()
        .map(|e| e.id.to_string())
        .collect()
}

#[tokio::test]
async fn test_search_narrows_results() {
    let backend = FakeBackend::new(
        vec![entry("c1", "Algebra I", "Mathematics")],
        InsertBehavior::Succeed,
    );
    let mut session = loaded_session(&backend).await;

    let task = session.update(Message::SearchChanged("Algebra".to_string()));
    assert!(task.is_none());
    assert_eq!(filtered_ids(&session), vec!["c1"]);
    assert!(!session.no_matches());

    let _ = session.update(Message::SearchChanged("zz".to_string()));
    assert!(session.filtered().is_empty());
    assert!(session.no_matches());

    // Trailing whitespace is part of the search.
    let _ = session.update(Message::SearchChanged("algebra i ".to_string()));
    assert!(session.no_matches());

    let _ = session.update(Message::ClearFilters);
    assert_eq!(filtered_ids(&session), vec!["c1"]);
}

#[tokio::test]
async fn test_category_counts_ignore_filters() {
    let backend = FakeBackend::new(
        vec![
            entry("c1", "Algebra I", "Mathematics"),
            entry("c2", "Biology", "Science"),
            entry("c3", "Geometry", "Mathematics"),
        ],
        InsertBehavior::Succeed,
    );
    let mut session = loaded_session(&backend).await;

    let _ = session.update(Message::CategorySelected(Some("Science".to_string())));
    assert_eq!(filtered_ids(&session), vec!["c2"]);
    assert_eq!(
        session.categories_with_counts(),
        vec![("Mathematics", 2), ("Science", 1)]
    );

    let _ = session.update(Message::CategorySelected(None));
    assert_eq!(session.filtered().len(), 3);
}

#[tokio::test]
async fn test_catalog_failure_shows_error_and_empty_list() {
    let backend = FakeBackend::failing_catalog("connection refused");
    let session = loaded_session(&backend).await;

    assert!(session.catalog().is_empty());
    assert!(session.filtered().is_empty());
    let notification = session.notification().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert!(notification.message.contains("connection refused"));
}

#[tokio::test]
async fn test_selecting_course_prefills_draft() {
    let backend = FakeBackend::new(
        vec![entry("c1", "Algebra I", "Mathematics")],
        InsertBehavior::Succeed,
    );
    let mut session = loaded_session(&backend).await;

    let _ = session.update(Message::CourseSelected(CourseId::new("c1").unwrap()));
    settle_background().await;

    assert_eq!(session.draft().name, "Algebra I");
    assert_eq!(session.selected_course().map(|e| e.id.as_str()), Some("c1"));
    assert_eq!(
        backend.popularity_increments(),
        vec![CourseId::new("c1").unwrap()]
    );
}

#[tokio::test]
async fn test_selecting_unknown_course_changes_nothing() {
    let backend = FakeBackend::new(
        vec![entry("c1", "Algebra I", "Mathematics")],
        InsertBehavior::Succeed,
    );
    let mut session = loaded_session(&backend).await;

    let _ = session.update(Message::CourseSelected(CourseId::new("nope").unwrap()));
    settle_background().await;

    assert!(session.draft().is_blank());
    assert!(session.selected_course().is_none());
    assert!(backend.popularity_increments().is_empty());
}

#[tokio::test]
async fn test_successful_submit_notifies_and_calls_back_once() {
    let backend = FakeBackend::new(
        vec![entry("c1", "Algebra I", "Mathematics")],
        InsertBehavior::Succeed,
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let mut session = counting_session(loaded_session(&backend).await, &calls);

    let _ = session.update(Message::CourseSelected(CourseId::new("c1").unwrap()));
    let _ = session.update(Message::DraftChanged(DraftField::AcademicYear(
        "2024-2025".to_string(),
    )));
    let task = session.update(Message::Submit);
    assert!(session.is_submitting());
    session.drive(task).await;

    assert!(!session.is_submitting());
    assert_eq!(session.submission_state(), &SubmissionState::Succeeded);
    let notification = session.notification().unwrap();
    assert!(notification.visible);
    assert_eq!(notification.kind, NotificationKind::Success);
    assert_eq!(notification.message, "Course added successfully");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The draft is kept after a successful insert.
    assert_eq!(session.draft().name, "Algebra I");
    let records = backend.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, student());
    assert_eq!(records[0].academic_year, "2024-2025");
}

#[tokio::test(start_paused = true)]
async fn test_hanging_insert_times_out_after_deadline() {
    let backend = FakeBackend::new(
        vec![entry("c1", "Algebra I", "Mathematics")],
        InsertBehavior::Hang,
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let mut session = counting_session(loaded_session(&backend).await, &calls);

    let _ = session.update(Message::CourseSelected(CourseId::new("c1").unwrap()));
    let _ = session.update(Message::DraftChanged(DraftField::AcademicYear(
        "2024-2025".to_string(),
    )));

    let started = tokio::time::Instant::now();
    let task = session.update(Message::Submit);
    session.drive(task).await;

    assert!(started.elapsed() >= Duration::from_secs(10));
    assert_eq!(session.submission_state(), &SubmissionState::TimedOut);
    let notification = session.notification().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "Operation timed out");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.insert_calls(), 1);
}

#[tokio::test]
async fn test_invalid_draft_is_reported_without_task() {
    let backend = FakeBackend::new(Vec::new(), InsertBehavior::Succeed);
    let mut session = loaded_session(&backend).await;

    let task = session.update(Message::Submit);
    assert!(task.is_none());
    assert!(!session.is_submitting());
    assert_eq!(backend.insert_calls(), 0);
    let notification = session.notification().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert!(notification.message.contains("Course name is required"));
}

#[tokio::test]
async fn test_reset_draft_clears_selection() {
    let backend = FakeBackend::new(
        vec![entry("c1", "Algebra I", "Mathematics")],
        InsertBehavior::Succeed,
    );
    let mut session = loaded_session(&backend).await;

    let _ = session.update(Message::CourseSelected(CourseId::new("c1").unwrap()));
    let _ = session.update(Message::ResetDraft);

    assert!(session.draft().is_blank());
    assert!(session.selected_course().is_none());
}

#[tokio::test]
async fn test_dismiss_and_auto_dismiss() {
    let backend = FakeBackend::failing_catalog("down");
    let config = SessionConfig {
        auto_dismiss: Some(Duration::from_secs(5)),
        ..SessionConfig::new(student())
    };
    let (mut session, startup) = EnrollmentSession::new(shared(&backend), config);
    session.drive(startup).await;
    assert!(session.notifications().is_visible());

    let _ = session.update(Message::Tick(Instant::now()));
    assert!(session.notifications().is_visible());

    let _ = session.update(Message::Tick(Instant::now() + Duration::from_secs(6)));
    assert!(!session.notifications().is_visible());
    // Content survives dismissal.
    assert_eq!(
        session.notification().map(|n| n.kind),
        Some(NotificationKind::Error)
    );

    let (mut session, startup) =
        EnrollmentSession::new(shared(&backend), SessionConfig::new(student()));
    session.drive(startup).await;
    let _ = session.update(Message::DismissNotification);
    assert!(!session.notifications().is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_tick_applies_abandoned_submission() {
    let backend = FakeBackend::new(
        vec![entry("c1", "Algebra I", "Mathematics")],
        InsertBehavior::Hang,
    );
    let mut session = loaded_session(&backend).await;
    let _ = session.update(Message::CourseSelected(CourseId::new("c1").unwrap()));
    let _ = session.update(Message::DraftChanged(DraftField::AcademicYear(
        "2024-2025".to_string(),
    )));

    drop(session.update(Message::Submit));
    assert!(session.is_submitting());

    tokio::time::sleep(Duration::from_secs(11)).await;
    let _ = session.update(Message::Tick(Instant::now()));

    assert!(!session.is_submitting());
    assert_eq!(session.submission_state(), &SubmissionState::TimedOut);
    assert_eq!(
        session.notification().map(|n| n.message.as_str()),
        Some("Operation timed out")
    );
}
