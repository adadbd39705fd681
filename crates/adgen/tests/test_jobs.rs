use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use adgen::worker::CANCELLED;
use adgen::{Error, FnProcessor, JobConfig, JobService, Outcome, Payload, INVALID_FILE_TYPE};
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

// Keeps worker logs visible under `cargo test -- --nocapture`.
fn init_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::set_default(subscriber)
}

fn image(style: &str) -> Payload {
    Payload::new(vec![0x89u8, b'P', b'N', b'G'], "image/png", style)
}

#[tokio::test]
async fn test_result_is_delivered_once() -> adgen::Result<()> {
    let (release, mut gate) = tokio::sync::mpsc::unbounded_channel::<()>();
    let processor = FnProcessor::new(move |payload: Payload| {
        let _ = gate.blocking_recv();
        Ok(json!({ "ad_text": format!("{} ad", payload.style) }))
    });
    let jobs = JobService::start(processor, JobConfig::default())?;

    let id = jobs.submit(image("brief")).await?;
    assert_eq!(jobs.poll(&id), Outcome::Processing);

    release.send(()).expect("Worker is gone");
    jobs.drain().await;

    assert_eq!(
        jobs.poll(&id),
        Outcome::Completed {
            data: json!({"ad_text": "brief ad"})
        }
    );
    assert_eq!(jobs.poll(&id), Outcome::Processing);

    jobs.shutdown().await
}

#[tokio::test]
async fn test_rejected_submission_creates_nothing() -> adgen::Result<()> {
    let jobs = JobService::start(
        FnProcessor::new(|_payload: Payload| Ok(Value::Null)),
        JobConfig::default(),
    )?;

    for _ in 0..2 {
        let err = jobs
            .submit(Payload::new(b"plain text".to_vec(), "text/plain", "brief"))
            .await
            .unwrap_err();
        assert!(err.is_admission());
        assert_eq!(err.to_string(), INVALID_FILE_TYPE);
    }

    assert_eq!(jobs.pending(), 0);
    assert!(jobs.store().is_empty());
    assert_eq!(jobs.poll(&Uuid::new_v4()), Outcome::Processing);

    jobs.shutdown().await
}

#[tokio::test]
async fn test_failure_does_not_stop_the_worker() -> adgen::Result<()> {
    let _tracing = init_tracing();
    let processor = FnProcessor::new(|payload: Payload| {
        if payload.style == "broken" {
            return Err(anyhow::anyhow!("could not read image").context("pipeline failed"));
        }
        Ok(json!(payload.style))
    });
    let jobs = JobService::start(processor, JobConfig::default())?;

    let failing = jobs.submit(image("broken")).await?;
    let healthy = jobs.submit(image("social")).await?;
    jobs.drain().await;

    assert_eq!(
        jobs.poll(&failing),
        Outcome::Failed {
            error: "pipeline failed: could not read image".into()
        }
    );
    assert_eq!(jobs.poll(&failing), Outcome::Processing);
    assert_eq!(
        jobs.poll(&healthy),
        Outcome::Completed {
            data: json!("social")
        }
    );

    jobs.shutdown().await
}

#[tokio::test]
async fn test_tasks_run_in_submission_order() -> adgen::Result<()> {
    let _tracing = init_tracing();
    let log = Arc::new(Mutex::new(Vec::new()));
    let processor = {
        let log = log.clone();
        FnProcessor::new(move |payload: Payload| {
            log.lock().push(format!("start {}", payload.style));
            if payload.style == "a" {
                sleep(Duration::from_millis(50));
            }
            log.lock().push(format!("end {}", payload.style));
            Ok(Value::Null)
        })
    };
    let jobs = JobService::start(processor, JobConfig::default())?;

    let styles = ["a", "b", "c", "d"];
    for style in styles {
        jobs.submit(image(style)).await?;
    }
    jobs.drain().await;

    let expected = styles
        .iter()
        .flat_map(|s| [format!("start {}", s), format!("end {}", s)])
        .collect::<Vec<_>>();
    assert_eq!(*log.lock(), expected);

    jobs.shutdown().await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submitters_and_pollers() -> adgen::Result<()> {
    let config = JobConfig::new().with_queue_capacity(2);
    let jobs = Arc::new(JobService::start(
        FnProcessor::new(|payload: Payload| Ok(json!(payload.style))),
        config,
    )?);

    let submitters = (0..4)
        .map(|n| {
            let jobs = jobs.clone();
            tokio::spawn(async move {
                let mut ids = Vec::new();
                for i in 0..10 {
                    ids.push(jobs.submit(image(&format!("{}-{}", n, i))).await?);
                }
                Ok::<_, Error>(ids)
            })
        })
        .collect::<Vec<_>>();

    let mut ids = Vec::new();
    for submitter in submitters {
        ids.extend(submitter.await.expect("Submitter panicked")?);
    }
    jobs.drain().await;

    // Every id is delivered exactly once even with racing pollers.
    let pollers = (0..3)
        .map(|_| {
            let jobs = jobs.clone();
            let ids = ids.clone();
            tokio::spawn(async move {
                ids.iter()
                    .filter(|id| jobs.poll(id).is_resolved())
                    .count()
            })
        })
        .collect::<Vec<_>>();

    let mut delivered = 0;
    for poller in pollers {
        delivered += poller.await.expect("Poller panicked");
    }
    assert_eq!(delivered, ids.len());
    assert!(jobs.store().is_empty());

    jobs.shutdown().await
}

#[tokio::test]
async fn test_shutdown_lets_running_task_finish() -> adgen::Result<()> {
    let (started_tx, mut started) = tokio::sync::mpsc::unbounded_channel::<()>();
    let processor = FnProcessor::new(move |payload: Payload| {
        let _ = started_tx.send(());
        sleep(Duration::from_millis(100));
        Ok(json!(payload.style))
    });
    let jobs = JobService::start(processor, JobConfig::default())?;

    let running = jobs.submit(image("a")).await?;
    let queued = jobs.submit(image("b")).await?;

    started.recv().await.expect("Processor never started");
    jobs.shutdown().await?;

    assert_eq!(
        jobs.poll(&running),
        Outcome::Completed {
            data: json!("a")
        }
    );
    assert_eq!(
        jobs.poll(&queued),
        Outcome::Failed {
            error: CANCELLED.into()
        }
    );
    assert_eq!(jobs.pending(), 0);

    Ok(())
}
