use proptest::prelude::*;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tzar::cli::{
    build_container, extract_container, list_container, protect_container, transform_entries,
    unprotect_container, ExtractOptions, UnprotectOptions,
};
use tzar::container::read_container_file;
use tzar::pipeline::Key;
use tzar::{ContainerReader, ContainerWriter, Entry, FormatFlag, TzarError};

/// Relative path -> Some(content) for files, None for directories
fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1) {
        let entry = entry.unwrap();
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_str().unwrap().to_string())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            out.insert(rel, None);
        } else {
            out.insert(rel, Some(fs::read(entry.path()).unwrap()));
        }
    }
    out
}

fn sample_tree(root: &Path) {
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::create_dir_all(root.join("nested/deeper")).unwrap();
    fs::write(root.join("a.txt"), b"hi\n").unwrap();
    fs::write(root.join("nested/b.bin"), (0..=255u8).collect::<Vec<u8>>()).unwrap();
    fs::write(root.join("nested/deeper/c.md"), b"# title\n").unwrap();
}

#[test]
fn concrete_scenario_directory_with_file_and_empty_subdir() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("pkg");
    fs::create_dir_all(root.join("sub"))?;
    fs::write(root.join("a.txt"), b"hi\n")?;

    let built = build_container(&dir.path().join("pkg"), &[&root])?;
    let listing = list_container(&built.path)?;
    let listed: Vec<(&str, u64)> = listing
        .entries
        .iter()
        .map(|e| (e.path.as_str(), e.size))
        .collect();
    assert_eq!(listed, vec![("pkg", 0), ("pkg/a.txt", 3), ("pkg/sub", 0)]);

    let dest = dir.path().join("out");
    let options = ExtractOptions {
        dest: dest.clone(),
        ..Default::default()
    };
    let report = extract_container(&built.path, &options)?;
    assert_eq!(report.extracted, 3);
    assert!(dest.join("pkg/sub").is_dir());
    assert_eq!(fs::read_dir(dest.join("pkg/sub"))?.count(), 0);
    assert_eq!(fs::read(dest.join("pkg/a.txt"))?, b"hi\n");
    Ok(())
}

#[test]
fn build_then_extract_reproduces_tree() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("tree");
    sample_tree(&root);

    let built = build_container(&dir.path().join("tree"), &[&root])?;
    let dest = dir.path().join("restore");
    let options = ExtractOptions {
        dest: dest.clone(),
        ..Default::default()
    };
    extract_container(&built.path, &options)?;

    assert_eq!(snapshot(&dest.join("tree")), snapshot(&root));
    Ok(())
}

#[test]
fn multiple_roots_concatenate_in_argument_order() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second");
    fs::write(&first, b"1")?;
    fs::create_dir(&second)?;
    fs::write(second.join("inner.txt"), b"2")?;

    let built = build_container(&dir.path().join("both"), &[&second, &first])?;
    let (_, entries) = read_container_file(&built.path)?;
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["second", "second/inner.txt", "first.txt"]);
    Ok(())
}

#[test]
fn selective_extraction_leaves_no_trace_of_others() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("tree");
    sample_tree(&root);
    let built = build_container(&dir.path().join("tree"), &[&root])?;

    let dest = dir.path().join("picked");
    let options = ExtractOptions {
        targets: vec!["tree/nested/b.bin".into(), "tree/a.txt".into()],
        dest: dest.clone(),
        ..Default::default()
    };
    let report = extract_container(&built.path, &options)?;
    assert_eq!(report.extracted, 2);
    assert_eq!(report.skipped, built.entries() - 2);

    let restored = snapshot(&dest);
    let files: Vec<&String> = restored
        .iter()
        .filter(|(_, content)| content.is_some())
        .map(|(path, _)| path)
        .collect();
    assert_eq!(files, vec!["tree/a.txt", "tree/nested/b.bin"]);
    assert!(!dest.join("tree/empty").exists());
    assert!(!dest.join("tree/nested/deeper").exists());
    Ok(())
}

#[test]
fn protect_unprotect_reproduces_tree() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("tree");
    sample_tree(&root);
    let built = build_container(&dir.path().join("tree"), &[&root])?;
    let locked = protect_container(&built.path, &dir.path().join("locked"), "correct horse")?;

    let options = UnprotectOptions {
        password: "correct horse".into(),
        dest: dir.path().join("restore"),
    };
    let report = unprotect_container(&locked.path, &options)?;
    assert_eq!(report.output_dir, dir.path().join("restore/locked"));
    assert_eq!(snapshot(&report.output_dir.join("tree")), snapshot(&root));
    Ok(())
}

#[test]
fn unprotect_of_protect_restores_container_entries() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("tree");
    sample_tree(&root);
    let built = build_container(&dir.path().join("tree"), &[&root])?;
    let locked = protect_container(&built.path, &dir.path().join("locked"), "pw")?;

    let key = Key::derive("pw")?;
    let mut reader = ContainerReader::new(fs::File::open(&locked.path)?)?;
    let restored_path = dir.path().join("restored.tzar");
    let mut writer = ContainerWriter::new(fs::File::create(&restored_path)?, FormatFlag::Plain)?;
    transform_entries(&mut reader, &mut writer, &key)?;
    writer.finish()?;

    assert_eq!(read_container_file(&restored_path)?, read_container_file(&built.path)?);
    Ok(())
}

#[test]
fn wrong_password_completes_with_wrong_content() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("tree");
    sample_tree(&root);
    let built = build_container(&dir.path().join("tree"), &[&root])?;
    let locked = protect_container(&built.path, &dir.path().join("locked"), "right")?;

    let options = UnprotectOptions {
        password: "wrong".into(),
        dest: dir.path().join("restore"),
    };
    // expected: no integrity tag, so this is not an error
    let report = unprotect_container(&locked.path, &options)?;
    assert_eq!(report.extract.failed, 0);

    let original = fs::read(root.join("nested/b.bin"))?;
    let garbled = fs::read(report.output_dir.join("tree/nested/b.bin"))?;
    assert_eq!(garbled.len(), original.len());
    assert_ne!(garbled, original);
    Ok(())
}

#[test]
fn empty_file_comes_back_as_directory() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let empty = dir.path().join("blank.txt");
    fs::write(&empty, b"")?;

    let built = build_container(&dir.path().join("blank"), &[&empty])?;
    let (_, entries) = read_container_file(&built.path)?;
    assert_eq!(entries, vec![Entry::directory("blank.txt")]);

    let dest = dir.path().join("out");
    let options = ExtractOptions {
        dest: dest.clone(),
        ..Default::default()
    };
    extract_container(&built.path, &options)?;
    assert!(dest.join("blank.txt").is_dir());
    Ok(())
}

#[test]
fn corrupt_length_aborts_whole_extraction() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("tree");
    sample_tree(&root);
    let built = build_container(&dir.path().join("tree"), &[&root])?;

    // blow up the first content length so it points past the end
    let mut bytes = fs::read(&built.path)?;
    let path_len = u32::from_le_bytes(bytes[1..5].try_into()?) as usize;
    let size_at = 1 + 4 + path_len;
    bytes[size_at..size_at + 8].copy_from_slice(&u64::MAX.to_le_bytes());
    fs::write(&built.path, &bytes)?;

    let options = ExtractOptions {
        dest: dir.path().join("out"),
        ..Default::default()
    };
    let err = extract_container(&built.path, &options).unwrap_err();
    assert!(matches!(err, TzarError::Truncated { .. }), "got {}", err);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_extract_of_build_matches_files(
        files in proptest::collection::btree_map(
            "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
            proptest::collection::vec(any::<u8>(), 1..128),
            1..6,
        )
    ) {
        let dir = tempdir().unwrap();
        let root = dir.path().join("src");
        fs::create_dir(&root).unwrap();

        let mut written = BTreeMap::new();
        for (rel, content) in &files {
            let target = root.join(rel);
            // a name may already be taken by a directory from a longer path
            if fs::create_dir_all(target.parent().unwrap()).is_err() || target.exists() {
                continue;
            }
            if fs::write(&target, content).is_ok() {
                written.insert(rel.clone(), content.clone());
            }
        }

        let built = build_container(&dir.path().join("src"), &[&root]).unwrap();
        let dest = dir.path().join("out");
        let options = ExtractOptions { dest: dest.clone(), ..Default::default() };
        extract_container(&built.path, &options).unwrap();

        prop_assert_eq!(snapshot(&dest.join("src")), snapshot(&root));
        for (rel, content) in &written {
            prop_assert_eq!(&fs::read(dest.join("src").join(rel)).unwrap(), content);
        }
    }
}
