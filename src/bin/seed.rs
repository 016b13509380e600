use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Parser;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollcall::{
    blob::FsBlobStore,
    config::Settings,
    domain::{CreateUserRequest, Principal, Role},
    service::ServiceContext,
    validation::{AnnouncementInput, LeaveRequestInput},
};

/// Populate the database with demo users, announcements, and leave requests.
#[derive(Parser)]
struct Args {
    /// Number of student accounts to create
    #[arg(long, default_value_t = 5)]
    students: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,rollcall=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let blob_store = Arc::new(FsBlobStore::new(
        settings.uploads.dir.clone(),
        settings.uploads.max_file_size_mb,
    ));
    let ctx = ServiceContext::new(db_pool, blob_store, &settings);

    println!("👥 Creating users...");

    let hod = register(&ctx, "head", "head@dept.local", Role::Hod).await?;
    println!("  ✅ Created hod (head@dept.local / password123)");

    let drsmith = register(&ctx, "drsmith", "drsmith@dept.local", Role::Faculty).await?;
    let drjones = register(&ctx, "drjones", "drjones@dept.local", Role::Faculty).await?;
    println!("  ✅ Created faculty drsmith, drjones");

    let mut students = Vec::new();
    for _ in 0..args.students {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let username = format!("{}{}", first, last).to_lowercase();
        let email = format!("{}@student.dept.local", username);
        students.push(register(&ctx, &username, &email, Role::User).await?);
    }
    println!("  ✅ Created {} students", students.len());

    println!("📢 Creating announcements...");

    ctx.announcements
        .create(
            Some(&hod),
            AnnouncementInput {
                title: Some("Semester registration open".to_string()),
                body: Some(
                    "Registration for the new semester closes at the end of the month."
                        .to_string(),
                ),
                target_role: Some("all".to_string()),
                priority: Some("high".to_string()),
            },
        )
        .await?;

    ctx.announcements
        .create(
            Some(&drsmith),
            AnnouncementInput {
                title: Some("Grading deadline".to_string()),
                body: Some("Submit all mid-term grades before Friday afternoon.".to_string()),
                target_role: Some("faculty".to_string()),
                priority: None,
            },
        )
        .await?;

    println!("📝 Creating leave requests...");

    let tomorrow = Utc::now() + Duration::days(1);
    for (i, student) in students.iter().take(3).enumerate() {
        let from = tomorrow + Duration::days(i as i64);
        let to = from + Duration::days(2);
        ctx.leave_requests
            .create(
                Some(student),
                LeaveRequestInput {
                    title: Some("Family function".to_string()),
                    reason: Some("personal".to_string()),
                    from_date: Some(from.format("%Y-%m-%d").to_string()),
                    to_date: Some(to.format("%Y-%m-%d").to_string()),
                    class_teacher: Some(drsmith.username.clone()),
                },
                None,
            )
            .await?;
    }
    // One request for drjones so both faculty dashboards have content.
    if let Some(student) = students.first() {
        ctx.leave_requests
            .create(
                Some(student),
                LeaveRequestInput {
                    title: Some("Hackathon travel".to_string()),
                    reason: Some("academic".to_string()),
                    from_date: Some((tomorrow + Duration::days(7)).format("%Y-%m-%d").to_string()),
                    to_date: Some((tomorrow + Duration::days(8)).format("%Y-%m-%d").to_string()),
                    class_teacher: Some(drjones.username.clone()),
                },
                None,
            )
            .await?;
    }

    println!("✨ Seeding complete!");
    Ok(())
}

async fn register(
    ctx: &ServiceContext,
    username: &str,
    email: &str,
    role: Role,
) -> anyhow::Result<Principal> {
    let user = ctx
        .auth_service
        .register(CreateUserRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "password123".to_string(),
            role,
        })
        .await?;
    Ok(user.principal())
}
