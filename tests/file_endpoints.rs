// tests/file_endpoints.rs

mod common;
use crate::common::{init_tracing, quiet_context, sh, with_timeout};

use std::error::Error;
use std::io::ErrorKind;
use std::sync::Arc;

use cmdpipe::fs::mock::MockFileSystem;
use cmdpipe::{PipeError, cmd, file, text};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn file_contents_reach_the_first_stage() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input.txt");
    std::fs::write(&path, "alpha\nbeta\n\u{00e9}t\u{00e9}\n")?;

    let out = with_timeout(file(&path).pipe(["cat"])?.get()).await?;
    assert_eq!(out, "alpha\nbeta\n\u{00e9}t\u{00e9}\n");
    Ok(())
}

#[tokio::test]
async fn missing_file_fails_before_spawning() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("spawned");
    let script = format!("touch {}", marker.display());

    let chain = file(dir.path().join("missing.txt")).pipe(sh(&script))?;
    let err = with_timeout(quiet_context().run(&chain)).await.unwrap_err();

    assert!(matches!(err, PipeError::File { .. }), "got {err:?}");
    assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
    assert!(!marker.exists(), "downstream stage must not be spawned");
    Ok(())
}

#[tokio::test]
async fn to_file_matches_get() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("out.txt");

    let chain = text("one\ntwo\nthree\n").pipe(["sort", "-r"])?;
    with_timeout(chain.to_file(&dest)).await?;
    let got = with_timeout(chain.get()).await?;

    assert_eq!(std::fs::read_to_string(&dest)?, got);
    assert_eq!(got, "two\nthree\none\n");
    Ok(())
}

#[tokio::test]
async fn to_file_truncates_existing_destination() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("out.txt");
    std::fs::write(&dest, "old contents that are longer")?;

    with_timeout(text("new").pipe(["cat"])?.to_file(&dest)).await?;
    assert_eq!(std::fs::read_to_string(&dest)?, "new");
    Ok(())
}

#[tokio::test]
async fn to_file_reports_tail_exit_code() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("out.txt");

    let err = with_timeout(cmd(sh("printf partial; exit 5"))?.to_file(&dest))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(5));
    Ok(())
}

#[tokio::test]
async fn unwritable_destination_fails_without_spawning() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("spawned");
    let dest = dir.path().join("no/such/dir/out.txt");

    let chain = cmd(sh(&format!("touch {}", marker.display())))?;
    let err = with_timeout(chain.to_file(&dest)).await.unwrap_err();

    assert!(matches!(err, PipeError::File { ref path, .. } if *path == dest), "got {err:?}");
    assert!(!marker.exists());
    Ok(())
}

#[tokio::test]
async fn mock_filesystem_feeds_and_receives() -> TestResult {
    init_tracing();
    let mock = MockFileSystem::new();
    mock.add_file("in.txt", "from the mock\n");
    let ctx = quiet_context().with_fs(Arc::new(mock.clone()));

    let chain = file("in.txt").pipe(["tr", "a-z", "A-Z"])?;
    with_timeout(ctx.to_file(&chain, "out.txt")).await?;

    assert_eq!(mock.contents("out.txt"), Some(b"FROM THE MOCK\n".to_vec()));
    Ok(())
}

#[tokio::test]
async fn write_failure_rejects_once() -> TestResult {
    init_tracing();
    let mock = MockFileSystem::new();
    mock.fail_writes_to("out.txt");
    let ctx = quiet_context().with_fs(Arc::new(mock.clone()));

    let chain = text("payload").pipe(["cat"])?;
    let err = with_timeout(ctx.to_file(&chain, "out.txt")).await.unwrap_err();

    match err {
        PipeError::File { path, source } => {
            assert_eq!(path, std::path::PathBuf::from("out.txt"));
            assert!(source.to_string().contains("injected write failure"));
        }
        other => panic!("expected file error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn mock_missing_source_is_not_found() -> TestResult {
    init_tracing();
    let ctx = quiet_context().with_fs(Arc::new(MockFileSystem::new()));

    let chain = file("absent.txt").pipe(["cat"])?;
    let err = with_timeout(ctx.get(&chain)).await.unwrap_err();
    assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
    Ok(())
}
