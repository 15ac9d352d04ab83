use super::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::write::GzEncoder;
use flate2::Compression;
use rootstrap_core::{Arch, ChrootSuffix};

#[derive(Debug, Default)]
struct RecordingRootFs {
    created_dirs: Vec<PathBuf>,
    removed: Vec<PathBuf>,
    appended: Vec<String>,
    drop_writes: bool,
}

impl RecordingRootFs {
    fn write_count(&self) -> usize {
        self.created_dirs.len() + self.removed.len() + self.appended.len()
    }
}

impl RootFs for RecordingRootFs {
    fn create_dir_all(&mut self, path: &Path) -> anyhow::Result<()> {
        self.created_dirs.push(path.to_path_buf());
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> anyhow::Result<()> {
        self.removed.push(path.to_path_buf());
        fs::remove_file(path)?;
        Ok(())
    }

    fn append_line(&mut self, path: &Path, line: &str) -> anyhow::Result<()> {
        self.appended.push(line.to_string());
        if self.drop_writes {
            return Ok(());
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(format!("{line}\n").as_bytes())?;
        Ok(())
    }
}

fn desired_mirrors() -> Vec<String> {
    vec![
        "https://mirror/a".to_string(),
        "https://mirror/b".to_string(),
    ]
}

#[test]
fn repository_urls_put_local_mount_first() {
    let mirrors = desired_mirrors();
    assert_eq!(
        repository_urls(&mirrors, true),
        vec![LOCAL_PACKAGES_MOUNT, "https://mirror/a", "https://mirror/b"]
    );
    assert_eq!(repository_urls(&mirrors, false), mirrors);
}

#[test]
fn update_repository_list_creates_missing_file_and_caches_result() {
    let root = test_root();
    let path = root.join("chroot_native/etc/apk/repositories");
    let suffix = ChrootSuffix::native();
    let mut session = SessionCache::new();
    let mut root_fs = RecordingRootFs::default();

    update_repository_list(&mut session, &mut root_fs, &suffix, &path, &desired_mirrors())
        .expect("sync must succeed");

    assert_eq!(root_fs.created_dirs, vec![root.join("chroot_native/etc/apk")]);
    assert!(root_fs.removed.is_empty());
    assert_eq!(
        fs::read_to_string(&path).expect("must read repositories"),
        "https://mirror/a\nhttps://mirror/b\n"
    );
    assert!(session.repository_list_synced(&suffix));

    let writes_after_first_call = root_fs.write_count();
    update_repository_list(&mut session, &mut root_fs, &suffix, &path, &desired_mirrors())
        .expect("second sync must succeed");
    assert_eq!(root_fs.write_count(), writes_after_first_call);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn update_repository_list_accepts_matching_file_without_writes() {
    let root = test_root();
    let path = root.join("etc/apk/repositories");
    fs::create_dir_all(path.parent().expect("parent")).expect("must create dirs");
    fs::write(&path, "https://mirror/a\nhttps://mirror/b\n").expect("must seed file");

    let suffix = ChrootSuffix::parse("buildroot_armv7").expect("valid suffix");
    let mut session = SessionCache::new();
    let mut root_fs = RecordingRootFs::default();
    update_repository_list(&mut session, &mut root_fs, &suffix, &path, &desired_mirrors())
        .expect("sync must succeed");

    assert_eq!(root_fs.write_count(), 0);
    assert!(session.repository_list_synced(&suffix));
    assert!(!session.repository_list_synced(&ChrootSuffix::native()));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn update_repository_list_rewrites_reordered_file() {
    let root = test_root();
    let path = root.join("etc/apk/repositories");
    fs::create_dir_all(path.parent().expect("parent")).expect("must create dirs");
    fs::write(&path, "https://mirror/b\nhttps://mirror/a\n").expect("must seed file");

    let suffix = ChrootSuffix::native();
    let mut session = SessionCache::new();
    let mut root_fs = RecordingRootFs::default();
    update_repository_list(&mut session, &mut root_fs, &suffix, &path, &desired_mirrors())
        .expect("sync must succeed");

    assert_eq!(root_fs.removed, vec![path.clone()]);
    assert!(root_fs.created_dirs.is_empty());
    assert_eq!(root_fs.appended, desired_mirrors());
    assert_eq!(
        read_repository_list(&path).expect("must read"),
        Some(desired_mirrors())
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn update_repository_list_rewrites_crlf_file_without_trailing_newline() {
    let root = test_root();
    let path = root.join("etc/apk/repositories");
    fs::create_dir_all(path.parent().expect("parent")).expect("must create dirs");
    fs::write(&path, "https://mirror/a\r\nhttps://mirror/b").expect("must seed file");
    assert_eq!(
        read_repository_list(&path).expect("must read"),
        Some(desired_mirrors())
    );

    let suffix = ChrootSuffix::native();
    let mut session = SessionCache::new();
    let mut root_fs = RecordingRootFs::default();
    update_repository_list(&mut session, &mut root_fs, &suffix, &path, &desired_mirrors())
        .expect("sync must succeed");

    assert_eq!(root_fs.removed, vec![path.clone()]);
    assert_eq!(root_fs.appended, desired_mirrors());
    assert_eq!(
        fs::read_to_string(&path).expect("must read repositories"),
        "https://mirror/a\nhttps://mirror/b\n"
    );
    assert!(session.repository_list_synced(&suffix));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn update_repository_list_fails_after_single_verification_pass() {
    let root = test_root();
    let path = root.join("etc/apk/repositories");
    let suffix = ChrootSuffix::native();
    let mut session = SessionCache::new();
    let mut root_fs = RecordingRootFs {
        drop_writes: true,
        ..RecordingRootFs::default()
    };

    let err = update_repository_list(&mut session, &mut root_fs, &suffix, &path, &desired_mirrors())
        .expect_err("writes that never land must fail");

    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::StillOutdated { path: failed }) if failed == &path
    ));
    assert!(err.to_string().contains("repository-sync-failed"));
    assert_eq!(root_fs.appended.len(), 2, "no retry beyond one write pass");
    assert!(!session.repository_list_synced(&suffix));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn sudo_root_fs_refuses_multiline_values() {
    let mut root_fs = SudoRootFs::new(None);
    let err = root_fs
        .append_line(Path::new("/nonexistent/repositories"), "https://a\n@evil")
        .expect_err("newline must be rejected before spawning");
    assert!(err.to_string().contains("newline"));
}

#[test]
fn session_cache_tracks_facts_independently() {
    let suffix = ChrootSuffix::native();
    let mut session = SessionCache::new();
    session.mark_apk_version_checked(&suffix);
    assert!(session.apk_version_checked(&suffix));
    assert!(!session.repository_list_synced(&suffix));
}

#[test]
fn index_store_prefers_newest_exact_match_across_indexes() {
    let root = test_root();
    let arch = Arch::parse("x86_64").expect("known arch");
    let store = ApkIndexStore::new(&root);

    write_index_archive(
        &store.local_index_path(&arch),
        "P:foo\nV:1.0-r2\nt:200\n\nP:bar\nV:2.0-r0\np:so:libbar.so.2=2.0\n",
    );
    let mirror_dir = store.mirror_index_dir(&arch);
    fs::create_dir_all(&mirror_dir).expect("must create mirror dir");
    fs::write(
        mirror_dir.join("APKINDEX.0a1b2c3d.plain"),
        "P:foo\nV:1.0-r1\nt:100\n\nP:bar-compat\nV:9.0-r0\np:so:libbar.so.2=1.0\n",
    )
    .expect("must write mirror index");

    let foo = store
        .package("foo", &arch)
        .expect("lookup must succeed")
        .expect("foo must exist");
    assert_eq!(foo.version, "1.0-r2");
    assert_eq!(foo.timestamp, 200.0);

    let provider = store
        .package("so:libbar.so.2", &arch)
        .expect("lookup must succeed")
        .expect("provider must exist");
    assert_eq!(provider.name, "bar-compat");

    assert!(store
        .package("missing", &arch)
        .expect("lookup must succeed")
        .is_none());
    assert!(store
        .package("foo", &Arch::parse("aarch64").expect("known arch"))
        .expect("lookup must succeed")
        .is_none());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn index_store_breaks_version_ties_by_index_order() {
    let root = test_root();
    let arch = Arch::parse("aarch64").expect("known arch");
    let store = ApkIndexStore::new(&root);

    write_index_archive(&store.local_index_path(&arch), "P:foo\nV:1.0-r0\nt:100\n");
    let mirror_dir = store.mirror_index_dir(&arch);
    fs::create_dir_all(&mirror_dir).expect("must create mirror dir");
    fs::write(
        mirror_dir.join("APKINDEX.bbbb.plain"),
        "P:foo\nV:1.0-r0\nt:300\n\nP:bar\nV:2.0-r0\nt:300\n",
    )
    .expect("must write mirror index");
    fs::write(mirror_dir.join("APKINDEX.aaaa.plain"), "P:bar\nV:2.0-r0\nt:250\n")
        .expect("must write mirror index");

    assert_eq!(
        store.index_paths(&arch).expect("must list indexes"),
        vec![
            store.local_index_path(&arch),
            mirror_dir.join("APKINDEX.aaaa.plain"),
            mirror_dir.join("APKINDEX.bbbb.plain"),
        ]
    );

    let foo = store
        .package("foo", &arch)
        .expect("lookup must succeed")
        .expect("foo must exist");
    assert_eq!(foo.timestamp, 100.0, "local index wins a tie with a mirror");

    let bar = store
        .package("bar", &arch)
        .expect("lookup must succeed")
        .expect("bar must exist");
    assert_eq!(bar.timestamp, 250.0, "mirror caches tie-break by file name");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn index_store_reports_archive_without_index_member() {
    let root = test_root();
    let arch = Arch::parse("armv7").expect("known arch");
    let store = ApkIndexStore::new(&root);
    let path = store.local_index_path(&arch);
    write_archive(&path, ".SIGN.RSA.key.rsa.pub", "signature");

    let err = store
        .package("foo", &arch)
        .expect_err("archive without APKINDEX must fail");
    assert!(format!("{err:#}").contains("no APKINDEX member"));

    let _ = fs::remove_dir_all(&root);
}

fn write_index_archive(path: &Path, content: &str) {
    write_archive(path, "APKINDEX", content);
}

fn write_archive(path: &Path, member: &str, content: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("must create index dir");
    let file = fs::File::create(path).expect("must create archive");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, member, content.as_bytes())
        .expect("must append member");
    builder
        .into_inner()
        .expect("must finish tar")
        .finish()
        .expect("must finish gzip");
}

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_root() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let sequence = TEST_ROOT_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "rootstrap-registry-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        sequence
    ));
    path
}
