use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use rollcall::{
    blob::{MemoryBlobStore, UploadedFile},
    config::Settings,
    domain::{CreateUserRequest, LeaveStatus, Principal, ReviewDecision, Role},
    error::AppError,
    service::ServiceContext,
    validation::LeaveRequestInput,
};

async fn setup() -> anyhow::Result<(ServiceContext, Arc<MemoryBlobStore>)> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let blobs = Arc::new(MemoryBlobStore::new());
    let ctx = ServiceContext::new(pool, blobs.clone(), &Settings::default());
    Ok((ctx, blobs))
}

async fn register(ctx: &ServiceContext, username: &str, role: Role) -> anyhow::Result<Principal> {
    let user = ctx
        .auth_service
        .register(CreateUserRequest {
            email: format!("{}@dept.local", username),
            username: username.to_string(),
            password: "password123".to_string(),
            role,
        })
        .await?;
    Ok(user.principal())
}

/// From tomorrow, spanning `extra_days` more days, assigned to the given
/// class teacher.
fn input(class_teacher: &str, extra_days: i64) -> LeaveRequestInput {
    let from = Utc::now() + Duration::days(1);
    let to = from + Duration::days(extra_days);
    LeaveRequestInput {
        title: Some("Family function".to_string()),
        reason: Some("personal".to_string()),
        from_date: Some(from.format("%Y-%m-%d").to_string()),
        to_date: Some(to.format("%Y-%m-%d").to_string()),
        class_teacher: Some(class_teacher.to_string()),
    }
}

#[tokio::test]
async fn approval_scenario() -> anyhow::Result<()> {
    let (ctx, _) = setup().await?;
    let drsmith = register(&ctx, "Dr. Smith", Role::Faculty).await?;
    let student = register(&ctx, "asha", Role::User).await?;

    // From tomorrow to tomorrow+2: both endpoints count.
    let request = ctx
        .leave_requests
        .create(Some(&student), input("Dr. Smith", 2), None)
        .await?;
    assert_eq!(request.status, LeaveStatus::Pending);
    assert_eq!(request.number_of_days(), 3);

    let approved = ctx
        .leave_requests
        .review(
            Some(&drsmith),
            request.id,
            ReviewDecision::Approved,
            Some("Enjoy"),
        )
        .await?;
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(drsmith.id));
    assert_eq!(approved.review_comments.as_deref(), Some("Enjoy"));
    assert!(approved.review_date.is_some());

    // Once reviewed, the owner can no longer edit or delete.
    let err = ctx
        .leave_requests
        .update(Some(&student), request.id, input("Dr. Smith", 2), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = ctx
        .leave_requests
        .delete(Some(&student), request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    Ok(())
}

#[tokio::test]
async fn second_review_is_rejected_and_changes_nothing() -> anyhow::Result<()> {
    let (ctx, _) = setup().await?;
    let hod = register(&ctx, "head", Role::Hod).await?;
    let drsmith = register(&ctx, "drsmith", Role::Faculty).await?;
    let student = register(&ctx, "asha", Role::User).await?;

    let request = ctx
        .leave_requests
        .create(Some(&student), input("drsmith", 1), None)
        .await?;

    let first = ctx
        .leave_requests
        .review(Some(&drsmith), request.id, ReviewDecision::Approved, None)
        .await?;

    let err = ctx
        .leave_requests
        .review(
            Some(&hod),
            request.id,
            ReviewDecision::Rejected,
            Some("Overruled"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyReviewed));

    // Terminal state is exactly what the first review wrote.
    let after = ctx.leave_requests.fetch(Some(&hod), request.id).await?;
    assert_eq!(after.status, LeaveStatus::Approved);
    assert_eq!(after.reviewed_by, Some(drsmith.id));
    assert_eq!(after.review_date, first.review_date);
    assert_eq!(after.review_comments, None);

    Ok(())
}

#[tokio::test]
async fn only_the_assigned_teacher_or_hod_may_review() -> anyhow::Result<()> {
    let (ctx, _) = setup().await?;
    let drjones = register(&ctx, "drjones", Role::Faculty).await?;
    let student = register(&ctx, "asha", Role::User).await?;
    let other_student = register(&ctx, "ben", Role::User).await?;

    let request = ctx
        .leave_requests
        .create(Some(&student), input("drsmith", 1), None)
        .await?;

    let err = ctx
        .leave_requests
        .review(Some(&drjones), request.id, ReviewDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = ctx
        .leave_requests
        .review(Some(&other_student), request.id, ReviewDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    Ok(())
}

#[tokio::test]
async fn list_is_scoped_by_role() -> anyhow::Result<()> {
    let (ctx, _) = setup().await?;
    let hod = register(&ctx, "head", Role::Hod).await?;
    let drsmith = register(&ctx, "drsmith", Role::Faculty).await?;
    let asha = register(&ctx, "asha", Role::User).await?;
    let ben = register(&ctx, "ben", Role::User).await?;

    ctx.leave_requests
        .create(Some(&asha), input("drsmith", 1), None)
        .await?;
    ctx.leave_requests
        .create(Some(&ben), input("drjones", 1), None)
        .await?;

    // Students see only their own requests.
    let mine = ctx.leave_requests.list(Some(&asha), None).await?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].requested_by, asha.id);

    // Faculty see requests assigned to them.
    let assigned = ctx.leave_requests.list(Some(&drsmith), None).await?;
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].class_teacher, "drsmith");

    // Hod sees everything; status filter narrows it.
    let all = ctx.leave_requests.list(Some(&hod), None).await?;
    assert_eq!(all.len(), 2);
    let approved = ctx
        .leave_requests
        .list(Some(&hod), Some(LeaveStatus::Approved))
        .await?;
    assert!(approved.is_empty());

    // A student cannot even fetch someone else's request.
    let err = ctx
        .leave_requests
        .fetch(Some(&ben), mine[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn faculty_cannot_create_leave_requests() -> anyhow::Result<()> {
    let (ctx, _) = setup().await?;
    let drsmith = register(&ctx, "drsmith", Role::Faculty).await?;

    let err = ctx
        .leave_requests
        .create(Some(&drsmith), input("drsmith", 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    Ok(())
}

#[tokio::test]
async fn attachment_lifecycle_follows_the_record() -> anyhow::Result<()> {
    let (ctx, blobs) = setup().await?;
    let drsmith = register(&ctx, "drsmith", Role::Faculty).await?;
    let student = register(&ctx, "asha", Role::User).await?;
    let other_student = register(&ctx, "ben", Role::User).await?;

    let attachment = UploadedFile {
        file_name: "prescription.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        data: b"rx".to_vec(),
    };
    let request = ctx
        .leave_requests
        .create(Some(&student), input("drsmith", 1), Some(attachment))
        .await?;
    let first_ref = request.attachment_ref.clone().unwrap();
    assert_eq!(request.attachment_name.as_deref(), Some("prescription.pdf"));

    // Owner and the assigned teacher may download; another student may not.
    assert!(ctx
        .leave_requests
        .download_attachment(Some(&student), request.id)
        .await
        .is_ok());
    assert!(ctx
        .leave_requests
        .download_attachment(Some(&drsmith), request.id)
        .await
        .is_ok());
    let err = ctx
        .leave_requests
        .download_attachment(Some(&other_student), request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Replacing the attachment swaps blobs, old removed after the write.
    let replacement = UploadedFile {
        file_name: "certificate.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        data: b"cert".to_vec(),
    };
    let updated = ctx
        .leave_requests
        .update(Some(&student), request.id, input("drsmith", 1), Some(replacement))
        .await?;
    assert!(!blobs.contains(&first_ref));
    assert_eq!(blobs.len(), 1);

    // Deleting the request cleans up its attachment.
    ctx.leave_requests.delete(Some(&student), request.id).await?;
    assert!(blobs.is_empty());
    assert!(updated.attachment_ref.is_some());

    Ok(())
}

#[tokio::test]
async fn past_or_reversed_dates_are_rejected() -> anyhow::Result<()> {
    let (ctx, _) = setup().await?;
    let student = register(&ctx, "asha", Role::User).await?;

    let mut past = input("drsmith", 1);
    past.from_date = Some(
        (Utc::now() - Duration::days(2))
            .format("%Y-%m-%d")
            .to_string(),
    );
    let err = ctx
        .leave_requests
        .create(Some(&student), past, None)
        .await
        .unwrap_err();
    let AppError::Validation(messages) = err else {
        panic!("expected validation failure");
    };
    assert!(messages
        .iter()
        .any(|m| m == "From date cannot be in the past."));

    let mut reversed = input("drsmith", 1);
    reversed.to_date = Some(Utc::now().format("%Y-%m-%d").to_string());
    let err = ctx
        .leave_requests
        .create(Some(&student), reversed, None)
        .await
        .unwrap_err();
    let AppError::Validation(messages) = err else {
        panic!("expected validation failure");
    };
    assert!(messages.iter().any(|m| m.contains("To date")));

    Ok(())
}

#[tokio::test]
async fn unauthenticated_review_is_rejected() -> anyhow::Result<()> {
    let (ctx, _) = setup().await?;
    let student = register(&ctx, "asha", Role::User).await?;

    let request = ctx
        .leave_requests
        .create(Some(&student), input("drsmith", 1), None)
        .await?;

    let err = ctx
        .leave_requests
        .review(None, request.id, ReviewDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));

    Ok(())
}
