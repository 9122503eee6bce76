use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "emotemod_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn keys_are_normalized() {
    assert_eq!(normalize_key("artifacts/ab").unwrap(), "artifacts/ab");
    assert_eq!(normalize_key("artifacts\\ab").unwrap(), "artifacts/ab");
    assert_eq!(normalize_key("./sources//x").unwrap(), "sources/x");
    assert!(normalize_key("/etc/passwd").is_err());
    assert!(normalize_key("sources/../../x").is_err());
    assert!(normalize_key("").is_err());
    assert!(normalize_key("./").is_err());
}

#[test]
fn memory_storage_put_get_exists() {
    let s = MemoryStorage::new();
    assert!(!s.exists("sources/a").unwrap());
    assert!(matches!(s.get("sources/a"), Err(EmoteError::NotFound(k)) if k == "sources/a"));

    s.put("sources/a", b"abc").unwrap();
    assert!(s.exists("sources/a").unwrap());
    assert!(s.exists("sources\\a").unwrap());
    assert_eq!(s.get("sources/a").unwrap(), b"abc");
    assert_eq!(s.keys(), vec!["sources/a".to_string()]);
}

#[test]
fn fs_storage_round_trips_and_overwrites() {
    let tmp = temp_dir("fs_storage");
    let s = FsStorage::new(&tmp);

    assert!(!s.exists("artifacts/f00").unwrap());
    assert!(matches!(s.get("artifacts/f00"), Err(EmoteError::NotFound(_))));

    s.put("artifacts/f00", b"one").unwrap();
    assert!(s.exists("artifacts/f00").unwrap());
    assert_eq!(s.get("artifacts/f00").unwrap(), b"one");

    s.put("artifacts/f00", b"two").unwrap();
    assert_eq!(s.get("artifacts/f00").unwrap(), b"two");

    // no temp files left behind
    let names: Vec<_> = std::fs::read_dir(tmp.join("artifacts"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("f00")]);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn fs_storage_rejects_escaping_keys() {
    let s = FsStorage::new(temp_dir("fs_escape"));
    assert!(matches!(
        s.put("../outside", b"x"),
        Err(EmoteError::InvalidArgument(_))
    ));
}
