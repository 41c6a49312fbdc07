use backhaul::entities;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Reference rows shared by most registration tests: one center, one
/// server with partitions, one repository.
pub struct Env {
    pub center: entities::center::Model,
    pub server: entities::server::Model,
    pub repository: entities::repository::Model,
}

/// Seed the standard environment: center "default", server "srv01"
/// with partitions C and D, repository #5 of type "nfs".
pub async fn seed_env(db: &DatabaseConnection) -> Env {
    let center = seed_center(db, "default").await;
    let server = seed_server(db, center.id, "srv01", &["C", "D"]).await;
    let repository = seed_repository(db, 5, center.id, "nfs", Some("/exports/backups")).await;
    Env {
        center,
        server,
        repository,
    }
}

pub async fn seed_center(db: &DatabaseConnection, name: &str) -> entities::center::Model {
    entities::center::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed center")
}

pub async fn seed_server(
    db: &DatabaseConnection,
    center_id: i64,
    name: &str,
    partitions: &[&str],
) -> entities::server::Model {
    let server = entities::server::ActiveModel {
        name: Set(name.to_string()),
        center_id: Set(center_id),
        os: Set(Some("windows".to_string())),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed server");

    for letter in partitions {
        entities::server_partition::ActiveModel {
            server_id: Set(server.id),
            letter: Set(letter.to_string()),
            capacity_mb: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to seed partition");
    }

    server
}

pub async fn seed_repository(
    db: &DatabaseConnection,
    id: i64,
    center_id: i64,
    repo_type: &str,
    path: Option<&str>,
) -> entities::repository::Model {
    entities::repository::ActiveModel {
        id: Set(id),
        center_id: Set(center_id),
        repo_type: Set(repo_type.to_string()),
        path: Set(path.map(|p| p.to_string())),
        name: Set(None),
        created_at: Set(Utc::now().timestamp()),
    }
    .insert(db)
    .await
    .expect("Failed to seed repository")
}

pub async fn seed_user(
    db: &DatabaseConnection,
    center_id: i64,
    email: &str,
) -> entities::user::Model {
    entities::user::ActiveModel {
        email: Set(email.to_string()),
        name: Set(None),
        center_id: Set(center_id),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

pub async fn seed_schedule(
    db: &DatabaseConnection,
    center_id: i64,
    schedule_type: i32,
) -> entities::schedule::Model {
    entities::schedule::ActiveModel {
        schedule_type: Set(schedule_type),
        center_id: Set(center_id),
        owner_user: Set(0),
        time: Set(Some("03:00".to_string())),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed schedule")
}
