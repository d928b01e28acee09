// Fan-out of review uploads and report assembly

mod common;

use anyhow::Result;
use common::{setup, FixedSummarizer, ScriptedReviewer};
use podium_interview::ai::ScoreRange;
use podium_interview::results::InMemoryResultStore;
use podium_interview::session::MediaPayload;
use podium_interview::submission::{
    fallback_tips, InterviewDetails, InterviewReport, ScoreCategory, SubmissionConfig, SubmissionCoordinator,
    SubmissionItem, SubmissionRequest, SubmissionResult, FALLBACK_SUMMARY, NO_RESPONSE_REASON, REVIEW_TIMEOUT_REASON,
};
use std::sync::Arc;
use std::time::Duration;

fn request(question_count: usize, answered: &[usize]) -> SubmissionRequest {
    let items = (0..question_count)
        .map(|question_index| SubmissionItem {
            question_index,
            question: format!("Question {}", question_index),
            video: answered
                .contains(&question_index)
                .then(|| MediaPayload::new(vec![question_index as u8 + 1; 32], "video/webm")),
        })
        .collect();

    SubmissionRequest {
        session_id: "interview-test".to_string(),
        setup: setup(),
        items,
        started_at: Some(chrono::Utc::now()),
    }
}

fn coordinator(reviewer: ScriptedReviewer) -> (SubmissionCoordinator, Arc<ScriptedReviewer>) {
    let reviewer = Arc::new(reviewer);
    (
        SubmissionCoordinator::new(reviewer.clone(), SubmissionConfig::default()),
        reviewer,
    )
}

#[tokio::test]
async fn test_one_failure_does_not_block_the_others() {
    let (coordinator, reviewer) = coordinator(
        ScriptedReviewer::new(7)
            .score(0, 8)
            .fail(1, "upload failed")
            .score(2, 6),
    );

    let report = coordinator.submit(request(3, &[0, 1, 2])).await;

    assert_eq!(reviewer.calls(), 3);
    assert_eq!(report.feedbacks.len(), 3);
    let indices: Vec<usize> = report.feedbacks.iter().map(|f| f.question_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    assert_eq!(report.feedbacks[0].score(), Some(8));
    assert!(report.feedbacks[1]
        .result
        .failure_reason()
        .unwrap()
        .contains("upload failed"));
    assert_eq!(report.feedbacks[2].score(), Some(6));

    assert_eq!(report.score, 7);
    assert_eq!(report.category, ScoreCategory::Good);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);
    assert!(!report.degraded);
}

#[tokio::test]
async fn test_all_failures_give_default_score_and_fallback_text() {
    let (coordinator, _) = coordinator(ScriptedReviewer::new(7).fail(0, "boom").fail(1, "boom"));

    let report = coordinator.submit(request(2, &[0, 1])).await;

    assert_eq!(report.score, 1);
    assert_eq!(report.category, ScoreCategory::Poor);
    assert_eq!(report.summary, FALLBACK_SUMMARY);
    assert_eq!(report.tips, fallback_tips());
    assert!(report.feedbacks.iter().all(|f| !f.result.is_success()));
}

#[tokio::test]
async fn test_score_is_rounded_mean_of_successes() {
    let (coordinator, _) = coordinator(ScriptedReviewer::new(7).score(0, 7).score(1, 8));

    let report = coordinator.submit(request(2, &[0, 1])).await;

    // (7 + 8) / 2 = 7.5 rounds up
    assert_eq!(report.score, 8);
    assert_eq!(report.interview_details.questions_count, 2);
    assert_eq!(report.interview_details.company, "Acme");
    assert!(report.interview_details.duration_secs.is_some());
}

#[tokio::test]
async fn test_unanswered_question_is_a_failure_without_upload() {
    let (coordinator, reviewer) = coordinator(ScriptedReviewer::new(9));

    let report = coordinator.submit(request(3, &[0, 2])).await;

    assert_eq!(reviewer.calls(), 2);
    assert_eq!(
        report.feedbacks[1].result,
        SubmissionResult::Failure {
            reason: NO_RESPONSE_REASON.to_string()
        }
    );
    assert_eq!(report.score, 9);
    assert_eq!(report.category, ScoreCategory::Excellent);
}

#[tokio::test]
async fn test_scores_are_clamped_into_range() {
    let reviewer = Arc::new(ScriptedReviewer::new(7).score(0, 15).score(1, 0));
    let coordinator = SubmissionCoordinator::new(
        reviewer,
        SubmissionConfig {
            score_range: ScoreRange { min: 1, max: 10 },
            ..SubmissionConfig::default()
        },
    );

    let report = coordinator.submit(request(2, &[0, 1])).await;

    assert_eq!(report.feedbacks[0].score(), Some(10));
    assert_eq!(report.feedbacks[1].score(), Some(1));
}

#[tokio::test]
async fn test_reviewer_summary_wins_over_summary_service() {
    let summarizer = Arc::new(FixedSummarizer::new());
    let reviewer = Arc::new(ScriptedReviewer::new(6).with_summary("Strong communicator", &["Slow down"]));
    let coordinator =
        SubmissionCoordinator::new(reviewer, SubmissionConfig::default()).with_summarizer(summarizer.clone());

    let report = coordinator.submit(request(2, &[0, 1])).await;

    assert_eq!(report.summary, "Strong communicator");
    assert_eq!(report.tips, vec!["Slow down".to_string()]);
    assert_eq!(summarizer.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_summary_service_fills_missing_summary() {
    let summarizer = Arc::new(FixedSummarizer::new());
    let reviewer = Arc::new(ScriptedReviewer::new(6).fail(1, "boom"));
    let coordinator =
        SubmissionCoordinator::new(reviewer, SubmissionConfig::default()).with_summarizer(summarizer.clone());

    let report = coordinator.submit(request(2, &[0, 1])).await;

    assert_eq!(report.summary, "Summary of 1 answers");
    assert_eq!(report.tips, vec!["Practice out loud".to_string()]);
    assert_eq!(summarizer.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_summary_service_skipped_without_successes() {
    let summarizer = Arc::new(FixedSummarizer::new());
    let reviewer = Arc::new(ScriptedReviewer::new(6).fail(0, "boom"));
    let coordinator =
        SubmissionCoordinator::new(reviewer, SubmissionConfig::default()).with_summarizer(summarizer.clone());

    let report = coordinator.submit(request(1, &[0])).await;

    assert_eq!(report.summary, FALLBACK_SUMMARY);
    assert_eq!(summarizer.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_results_are_persisted() -> Result<()> {
    let store = Arc::new(InMemoryResultStore::new());
    let reviewer = Arc::new(ScriptedReviewer::new(5).fail(1, "boom"));
    let coordinator =
        SubmissionCoordinator::new(reviewer, SubmissionConfig::default()).with_result_store(store.clone());

    let report = coordinator.submit(request(2, &[0, 1])).await;

    assert_eq!(store.review_count().await, 1);
    assert_eq!(store.review("user-test", 0).await.map(|r| r.score), Some(5));
    assert!(store.review("user-test", 1).await.is_none());

    let summary = store.summary("user-test").await.expect("summary saved");
    assert_eq!(summary.session_id, report.session_id);

    Ok(())
}

#[tokio::test]
async fn test_slow_review_fails_alone() {
    let reviewer = Arc::new(
        ScriptedReviewer::new(8)
            .score(0, 6)
            .score(1, 9)
            .with_delay(Duration::from_millis(10))
            .delay_for(2, Duration::from_millis(400)),
    );
    let coordinator = SubmissionCoordinator::new(
        reviewer.clone(),
        SubmissionConfig {
            review_timeout: Duration::from_millis(100),
            ..SubmissionConfig::default()
        },
    );

    let report = coordinator.submit(request(3, &[0, 1, 2])).await;

    assert!(!report.degraded);
    assert_eq!(report.feedbacks[0].score(), Some(6));
    assert_eq!(report.feedbacks[1].score(), Some(9));
    assert_eq!(
        report.feedbacks[2].result.failure_reason(),
        Some(REVIEW_TIMEOUT_REASON)
    );
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.score, 8);

    // the late upload is cancelled, not left running
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(reviewer.calls(), 3);
    assert_eq!(reviewer.finished(), 2);
}

#[tokio::test]
async fn test_every_review_late_keeps_report_shape() {
    let reviewer = Arc::new(ScriptedReviewer::new(8).with_delay(Duration::from_millis(500)));
    let coordinator = SubmissionCoordinator::new(
        reviewer,
        SubmissionConfig {
            review_timeout: Duration::from_millis(50),
            ..SubmissionConfig::default()
        },
    );

    let report = coordinator.submit(request(2, &[0, 1])).await;

    assert!(!report.degraded);
    assert_eq!(report.feedbacks.len(), 2);
    assert!(report.feedbacks.iter().all(|f| !f.result.is_success()));
    assert_eq!(report.score, 1);
    assert_eq!(report.summary, FALLBACK_SUMMARY);
    assert!(!report.tips.is_empty());
}

#[tokio::test]
async fn test_dropping_submission_cancels_uploads() {
    let reviewer = Arc::new(ScriptedReviewer::new(8).with_delay(Duration::from_millis(200)));
    let coordinator = SubmissionCoordinator::new(reviewer.clone(), SubmissionConfig::default());

    let submission = coordinator.submit(request(3, &[0, 1, 2]));
    let outcome = tokio::time::timeout(Duration::from_millis(50), submission).await;
    assert!(outcome.is_err());
    assert_eq!(reviewer.calls(), 3);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(reviewer.finished(), 0);
}

#[tokio::test]
async fn test_default_score_follows_score_range() {
    let reviewer = Arc::new(ScriptedReviewer::new(7).fail(0, "boom"));
    let coordinator = SubmissionCoordinator::new(
        reviewer,
        SubmissionConfig {
            score_range: ScoreRange { min: 2, max: 10 },
            ..SubmissionConfig::default()
        },
    );

    let report = coordinator.submit(request(1, &[0])).await;
    assert_eq!(report.score, 2);

    let degraded = InterviewReport::degraded(
        "interview-test",
        &["Question 0".to_string()],
        InterviewDetails::new(&setup(), 1, None),
        ScoreRange { min: 2, max: 10 }.min,
        "unavailable",
    );
    assert_eq!(degraded.score, report.score);
    assert!(degraded.degraded);
}

#[test]
fn test_score_categories() {
    assert_eq!(ScoreCategory::from_score(10), ScoreCategory::Excellent);
    assert_eq!(ScoreCategory::from_score(9), ScoreCategory::Excellent);
    assert_eq!(ScoreCategory::from_score(7), ScoreCategory::Good);
    assert_eq!(ScoreCategory::from_score(5), ScoreCategory::Average);
    assert_eq!(ScoreCategory::from_score(3), ScoreCategory::NeedsImprovement);
    assert_eq!(ScoreCategory::from_score(1), ScoreCategory::Poor);
}
