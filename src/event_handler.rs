use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::Serialize;

use crate::db::{diagnostics, with_connection, ConnectionFactory};

const CREATED_EVENT_PREFIX: &str = "ObjectCreated:";

/// An object reported as created by an S3 notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub bucket: String,
    pub key: String,
    pub size: i64,
}

/// HTTP-shaped result returned to the invoker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub status_code: u16,
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Processed {
    message: &'static str,
    files_processed: usize,
}

#[derive(Serialize)]
struct Failed {
    message: &'static str,
    error: String,
}

fn malformed(reason: &str) -> crate::Error {
    crate::Error::MalformedEvent(reason.to_string())
}

/// Keys arrive form-encoded: spaces as `+`, everything else percent-escaped.
fn decode_key(raw: &str) -> Result<String, crate::Error> {
    let key = raw.replace('+', " ");
    urlencoding::decode(&key)
        .map(|key| key.into_owned())
        .map_err(|_| malformed("object key is not valid UTF-8"))
}

/// Picks the created objects out of a notification batch. A record missing
/// a field it needs fails the whole batch.
pub fn parse_s3_event(event: &S3Event) -> Result<Vec<UploadedObject>, crate::Error> {
    let mut objects = Vec::new();
    for record in &event.records {
        let event_name = record
            .event_name
            .as_deref()
            .ok_or_else(|| malformed("record is missing eventName"))?;
        if !event_name.starts_with(CREATED_EVENT_PREFIX) {
            tracing::debug!("Skipping {} record", event_name);
            continue;
        }

        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .ok_or_else(|| malformed("record is missing s3.bucket.name"))?;
        let key = record
            .s3
            .object
            .key
            .as_deref()
            .ok_or_else(|| malformed("record is missing s3.object.key"))
            .and_then(decode_key)?;
        objects.push(UploadedObject {
            bucket,
            key,
            size: record.s3.object.size.unwrap_or_default(),
        });
    }
    Ok(objects)
}

async fn process_object(
    db: &dyn ConnectionFactory,
    object: &UploadedObject,
) -> Result<(), crate::Error> {
    tracing::info!("Processing file {} from bucket {}", object.key, object.bucket);
    let report = with_connection(db, |conn| Box::pin(diagnostics::run(conn))).await?;
    tracing::info!("Successfully connected to database. Version: {}", report.version);
    tracing::info!("Available tables: {:?}", report.tables);
    Ok(())
}

async fn process_s3_records(
    db: &dyn ConnectionFactory,
    event: &S3Event,
) -> Result<usize, crate::Error> {
    let objects = parse_s3_event(event)?;
    tracing::info!("Found {} files to process", objects.len());

    let mut total_bytes: i64 = 0;
    for object in &objects {
        process_object(db, object).await?;
        total_bytes += object.size;
    }
    tracing::info!(
        "Total size of processed objects: {:.2} MB",
        total_bytes as f64 / 1024.0 / 1024.0
    );
    Ok(objects.len())
}

fn respond<T: Serialize>(status_code: u16, body: &T) -> Result<NotificationResponse, Error> {
    Ok(NotificationResponse {
        status_code,
        body: serde_json::to_string(body)?,
    })
}

pub async fn function_handler(
    event: LambdaEvent<S3Event>,
    db: &dyn ConnectionFactory,
) -> Result<NotificationResponse, Error> {
    let payload = event.payload;
    tracing::info!("Processing S3 event with {} records", payload.records.len());
    if payload.records.is_empty() {
        tracing::warn!("No records found in S3 event");
    }

    match process_s3_records(db, &payload).await {
        Ok(files_processed) => respond(
            200,
            &Processed {
                message: "Successfully processed S3 event and connected to database",
                files_processed,
            },
        ),
        Err(e) => {
            tracing::error!("Error processing S3 event: {}", e);
            respond(
                500,
                &Failed {
                    message: "Error processing S3 event",
                    error: e.to_string(),
                },
            )
        }
    }
}
