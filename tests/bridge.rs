use std::{fs, sync::Mutex};

use log::LevelFilter;
use transcript::{Logger, SharedBuffer, bridge, streams};

static SERIAL: Mutex<()> = Mutex::new(());

#[test]
fn test_log_records_follow_the_streams() {
    let _serial = SERIAL.lock().unwrap();
    bridge::init(LevelFilter::Info).unwrap();
    assert!(bridge::init(LevelFilter::Info).is_err());

    let console = SharedBuffer::new();
    let previous = streams::set_stderr(console.target());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.log");

    log::info!("outside the session");
    let mut logger = Logger::new(&path, false);
    logger.init().unwrap();
    log::warn!("inside the session");
    log::debug!("filtered out");
    logger.close().unwrap();
    streams::set_stderr(previous);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1, "{content}");
    assert!(content.ends_with(" WARN] inside the session\n"), "{content}");

    let shown = console.contents_string();
    assert!(shown.contains(" INFO] outside the session\n"), "{shown}");
    assert!(shown.contains(" WARN] inside the session\n"), "{shown}");
    assert!(!shown.contains("filtered out"));
}
