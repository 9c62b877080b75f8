//! End-to-end downloads against a scripted NNTP server on localhost.

mod common;

use std::path::Path;

use common::{FakeServer, PostedFile, ServerScript, nzb_xml, sample_data};
use nzb_slurp::{Config, Downloader, Error, FileStatus, NntpError, Nzb};

fn config_for(server: &FakeServer, threads: usize) -> Config {
    let mut config = Config::default();
    config.server.host = server.host();
    config.server.port = server.port();
    config.download.threads = threads;
    config.download.progress = false;
    config
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn downloads_every_file_of_a_manifest() {
    let video = PostedFile::new("video file.mkv", sample_data(32 * 40), 32 * 8);
    let nfo = PostedFile::new("info.nfo", b"release notes\n.dot line\n".to_vec(), 1024);
    let server = FakeServer::start(ServerScript::serving(&[&video, &nfo])).await;

    let nzb = Nzb::parse(nzb_xml(&[&video, &nfo]).as_bytes()).unwrap();
    assert_eq!(nzb.meta("title"), Some("Fixture Release"));
    assert_eq!(nzb.files[0].display_name(), "video file.mkv");

    let work = tempfile::tempdir().unwrap();
    let downloader = Downloader::new(config_for(&server, 3)).unwrap();
    let summary = downloader.run(&nzb, work.path()).await.unwrap();

    assert_eq!(summary.downloaded().count(), 2);
    assert_eq!(summary.segments_missing(), 0);
    assert_eq!(
        std::fs::read(work.path().join("video file.mkv")).unwrap(),
        video.data
    );
    assert_eq!(std::fs::read(work.path().join("info.nfo")).unwrap(), nfo.data);
    assert_eq!(dir_entries(work.path()), vec!["info.nfo", "video file.mkv"]);

    // 5 video segments over 3 threads -> chunks of 2, 2, 1; 1 nfo segment -> 1 worker
    assert_eq!(server.connection_count(), 4);
    assert_eq!(server.quits.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[tokio::test]
async fn missing_article_leaves_gap() {
    let file = PostedFile::new("data.bin", sample_data(32 * 12), 32 * 4);
    let (_, _, lost) = file.segments[1].clone();
    let server = FakeServer::start(ServerScript::serving(&[&file]).without_article(&lost)).await;

    let nzb = Nzb::parse(nzb_xml(&[&file]).as_bytes()).unwrap();
    let work = tempfile::tempdir().unwrap();
    let summary = Downloader::new(config_for(&server, 2))
        .unwrap()
        .run(&nzb, work.path())
        .await
        .unwrap();

    let mut expected = file.data[..128].to_vec();
    expected.extend_from_slice(&file.data[256..]);
    assert_eq!(std::fs::read(work.path().join("data.bin")).unwrap(), expected);
    assert_eq!(summary.files[0].segments_missing, 1);
    assert_eq!(dir_entries(work.path()), vec!["data.bin"]);
}

#[tokio::test]
async fn rerun_skips_existing_output_without_connecting() {
    let file = PostedFile::new("once.bin", sample_data(32 * 6), 32 * 2);
    let server = FakeServer::start(ServerScript::serving(&[&file])).await;
    let nzb = Nzb::parse(nzb_xml(&[&file]).as_bytes()).unwrap();
    let work = tempfile::tempdir().unwrap();
    let downloader = Downloader::new(config_for(&server, 2)).unwrap();

    downloader.run(&nzb, work.path()).await.unwrap();
    let connections = server.connection_count();
    let bodies = server.body_requests.load(std::sync::atomic::Ordering::SeqCst);

    let summary = downloader.run(&nzb, work.path()).await.unwrap();

    assert_eq!(summary.files[0].status, FileStatus::AlreadyExists);
    assert_eq!(server.connection_count(), connections);
    assert_eq!(
        server.body_requests.load(std::sync::atomic::Ordering::SeqCst),
        bodies
    );
    assert_eq!(std::fs::read(work.path().join("once.bin")).unwrap(), file.data);
}

#[tokio::test]
async fn authenticates_and_falls_back_to_next_group() {
    let file = PostedFile::new("secret.bin", sample_data(32 * 3), 32)
        .with_groups(&["alt.binaries.gone", "alt.binaries.test"]);
    let server =
        FakeServer::start(ServerScript::serving(&[&file]).requiring_auth("alice", "hunter2")).await;

    let mut config = config_for(&server, 1);
    config.server.username = Some("alice".to_string());
    config.server.password = Some("hunter2".to_string());

    let nzb = Nzb::parse(nzb_xml(&[&file]).as_bytes()).unwrap();
    let work = tempfile::tempdir().unwrap();
    Downloader::new(config)
        .unwrap()
        .run(&nzb, work.path())
        .await
        .unwrap();

    assert_eq!(std::fs::read(work.path().join("secret.bin")).unwrap(), file.data);
}

#[tokio::test]
async fn rejected_credentials_abort_the_run() {
    let file = PostedFile::new("locked.bin", sample_data(64), 32);
    let server =
        FakeServer::start(ServerScript::serving(&[&file]).requiring_auth("alice", "hunter2")).await;

    let mut config = config_for(&server, 2);
    config.server.username = Some("alice".to_string());
    config.server.password = Some("wrong".to_string());

    let nzb = Nzb::parse(nzb_xml(&[&file]).as_bytes()).unwrap();
    let work = tempfile::tempdir().unwrap();
    let err = Downloader::new(config)
        .unwrap()
        .run(&nzb, work.path())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Nntp(NntpError::Auth { code: 481, .. })));
    assert!(dir_entries(work.path()).is_empty());
}

#[tokio::test]
async fn unreachable_server_is_fatal() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let file = PostedFile::new("nowhere.bin", sample_data(64), 32);
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = port;
    config.download.progress = false;

    let nzb = Nzb::parse(nzb_xml(&[&file]).as_bytes()).unwrap();
    let work = tempfile::tempdir().unwrap();
    let err = Downloader::new(config)
        .unwrap()
        .run(&nzb, work.path())
        .await
        .unwrap_err();

    match err {
        Error::Nntp(e) => assert!(matches!(e, NntpError::Connect { .. }) && e.is_fatal()),
        other => panic!("expected connect error, got {:?}", other),
    }
}
