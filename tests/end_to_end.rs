//! Drives `driver::pipeline::compile` end to end: a clean build emits C,
//! a second run against unchanged source hits the cache, and the
//! checker/borrow-checker stop codegen before it ever reaches the
//! emitter.

use std::fs;

use daisyc::cache::BuildCache;
use daisyc::driver::{compile, FeatureFlags};
use daisyc::resolve::SearchPaths;

fn build_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn clean_build_emits_c_and_a_rebuild_hits_the_cache() {
    let src_dir = build_dir();
    let cache_dir = build_dir();
    let entry = src_dir.path().join("main.dsy");
    fs::write(&entry, "fn main() -> int:\n  print \"hi\"\n  return 0\n").unwrap();

    let search_paths = SearchPaths::new(vec![src_dir.path().to_path_buf()]);
    let cache = BuildCache::new(cache_dir.path().to_path_buf()).unwrap();

    let report = compile(&entry, &search_paths, FeatureFlags::default(), &cache).unwrap();
    assert!(!report.has_errors(), "{:?}", report.modules[0].diagnostics);
    assert_eq!(report.modules.len(), 1);
    assert!(!report.modules[0].cached);
    let emitted = report.modules[0].emitted.as_ref().expect("first build must emit C");
    assert!(emitted.source.contains("main(void)"));

    let second = compile(&entry, &search_paths, FeatureFlags::default(), &cache).unwrap();
    assert!(!second.has_errors());
    assert!(second.modules[0].cached, "unchanged source should hit the build cache");
}

#[test]
fn changed_source_invalidates_the_cache() {
    let src_dir = build_dir();
    let cache_dir = build_dir();
    let entry = src_dir.path().join("main.dsy");
    fs::write(&entry, "fn main() -> int:\n  return 0\n").unwrap();

    let search_paths = SearchPaths::new(vec![src_dir.path().to_path_buf()]);
    let cache = BuildCache::new(cache_dir.path().to_path_buf()).unwrap();

    compile(&entry, &search_paths, FeatureFlags::default(), &cache).unwrap();

    fs::write(&entry, "fn main() -> int:\n  return 1\n").unwrap();
    let report = compile(&entry, &search_paths, FeatureFlags::default(), &cache).unwrap();
    assert!(!report.modules[0].cached, "changed source must miss the build cache");
}

#[test]
fn use_after_move_is_reported_and_codegen_is_skipped() {
    let src_dir = build_dir();
    let cache_dir = build_dir();
    let entry = src_dir.path().join("main.dsy");
    fs::write(
        &entry,
        "fn main() -> int:\n  let a = buffer(8)\n  let b = move a\n  release b\n  return 0\n",
    )
    .unwrap();

    let search_paths = SearchPaths::new(vec![src_dir.path().to_path_buf()]);
    let cache = BuildCache::new(cache_dir.path().to_path_buf()).unwrap();

    let report = compile(&entry, &search_paths, FeatureFlags::default(), &cache).unwrap();
    assert!(report.has_errors());
    assert!(report.modules[0].emitted.is_none());
}

#[test]
fn release_with_live_borrow_waived_by_unsafe_still_emits_and_logs() {
    let src_dir = build_dir();
    let cache_dir = build_dir();
    let entry = src_dir.path().join("main.dsy");
    fs::write(
        &entry,
        "fn main() -> int:\n  let r = buffer(8)\n  let v = borrow r[0..8]\n  unsafe \"audited\":\n    release r\n  return 0\n",
    )
    .unwrap();

    let search_paths = SearchPaths::new(vec![src_dir.path().to_path_buf()]);
    let cache_root = cache_dir.path().to_path_buf();
    let cache = BuildCache::new(cache_root.clone()).unwrap();

    let report = compile(&entry, &search_paths, FeatureFlags::default(), &cache).unwrap();
    assert!(!report.has_errors(), "{:?}", report.modules[0].diagnostics);
    assert!(report.modules[0].emitted.is_some());

    let log_path = cache_root.join("main.unsafe.log");
    let contents = fs::read_to_string(log_path).unwrap();
    assert!(contents.contains("waived ReleaseWithLiveBorrow"));
}

#[test]
fn runtime_checks_flag_changes_cache_key_and_forces_a_miss() {
    let src_dir = build_dir();
    let cache_dir = build_dir();
    let entry = src_dir.path().join("main.dsy");
    fs::write(
        &entry,
        "fn main() -> int:\n  let b = buffer(8)\n  release b\n  return 0\n",
    )
    .unwrap();

    let search_paths = SearchPaths::new(vec![src_dir.path().to_path_buf()]);
    let cache = BuildCache::new(cache_dir.path().to_path_buf()).unwrap();

    compile(&entry, &search_paths, FeatureFlags::default(), &cache).unwrap();

    let checked = FeatureFlags {
        runtime_checks: true,
        ..FeatureFlags::default()
    };
    let report = compile(&entry, &search_paths, checked, &cache).unwrap();
    assert!(!report.modules[0].cached);
    assert!(report.modules[0].emitted.as_ref().unwrap().source.contains("daisy_rt_check"));
}
