//! Walks a sample post through create, publish, approve, delete, and undelete,
//! then prints the stored record, its status, and its activity log as JSON.

mod config;

use config::Config;
use record_lifecycle::{
    ActivityLog, LifecycleError, LogListOptions, Record, RecordBody, RecordLifecycle, RecordStore,
    UserId,
};
use record_log::{InMemoryActivityLog, JsonlActivityLog};
use record_store::{InMemoryRecordStore, SqliteRecordStore};
use record_support::StaticSite;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Post {
    title: String,
    body: String,
}

impl RecordBody for Post {
    const RECORD_TYPE: &'static str = "post";
}

const AUTHOR: UserId = UserId(1);
const EDITOR: UserId = UserId(2);
const MODERATOR: UserId = UserId(3);

async fn walk<S, L>(lc: RecordLifecycle<S, L>, site: &StaticSite) -> Result<(), LifecycleError>
where
    S: RecordStore<Body = Post>,
    L: ActivityLog,
{
    let mut post = Record::new(
        AUTHOR,
        Post {
            title: "Opening hours".to_string(),
            body: "We open at nine.".to_string(),
        },
    );
    lc.persist(&mut post, site).await?;
    lc.write_log(&post, AUTHOR, "created", None).await?;

    lc.publish(&mut post, Some(EDITOR)).await?;
    lc.approve(&mut post, Some(EDITOR)).await?;
    lc.write_log(&post, EDITOR, "published and approved", Some(AUTHOR))
        .await?;

    lc.soft_delete(&mut post, Some(MODERATOR)).await?;
    lc.undelete(&mut post, Some(EDITOR)).await?;
    lc.write_log(&post, EDITOR, "restored", Some(MODERATOR)).await?;

    let record_id = post.id.ok_or(LifecycleError::NotPersisted)?;
    let entries = lc
        .log()
        .list(&LogListOptions::for_record(Post::RECORD_TYPE, record_id))
        .await?;
    let out = serde_json::json!({
        "record": post,
        "status": post.status().to_string(),
        "created": lc.created_info(&post),
        "published": lc.published_info(&post),
        "log": entries,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let site = StaticSite::new(config.site_id);
    tracing::info!(
        site_id = %config.site_id,
        db = ?config.db_path,
        log = ?config.log_path,
        "starting record lifecycle walk"
    );

    match (&config.db_path, &config.log_path) {
        (Some(db), Some(log)) => {
            let store = SqliteRecordStore::<Post>::new(db)?;
            walk(RecordLifecycle::new(store, JsonlActivityLog::new(log)), &site).await?
        }
        (Some(db), None) => {
            let store = SqliteRecordStore::<Post>::new(db)?;
            walk(RecordLifecycle::new(store, InMemoryActivityLog::new()), &site).await?
        }
        (None, Some(log)) => {
            let store = InMemoryRecordStore::<Post>::new();
            walk(RecordLifecycle::new(store, JsonlActivityLog::new(log)), &site).await?
        }
        (None, None) => {
            let store = InMemoryRecordStore::<Post>::new();
            walk(RecordLifecycle::new(store, InMemoryActivityLog::new()), &site).await?
        }
    }
    Ok(())
}
