// Changes the process working directory, so it lives in its own test binary
// and holds a single test.

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tzar::cli::{build_container, extract_container, list_container, ExtractOptions};

fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut out = BTreeMap::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1) {
        let entry = entry.unwrap();
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap()
            .to_str()
            .unwrap()
            .replace('\\', "/");
        if entry.file_type().is_dir() {
            out.insert(rel, None);
        } else {
            out.insert(rel, Some(fs::read(entry.path()).unwrap()));
        }
    }
    out
}

#[test]
fn current_directory_root_round_trips() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let proj = dir.path().join("proj");
    fs::create_dir_all(proj.join("sub"))?;
    fs::write(proj.join("a.txt"), b"hi\n")?;
    fs::write(proj.join("sub/b.txt"), b"b")?;
    let expected = snapshot(&proj);

    env::set_current_dir(&proj)?;

    // written into the directory being archived, twice
    build_container(Path::new("bundle"), &["."])?;
    let built = build_container(Path::new("bundle"), &["."])?;
    assert_eq!(built.files, 2);

    let listing = list_container(&proj.join("bundle.tzar"))?;
    let paths: Vec<&str> = listing.entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["a.txt", "sub", "sub/b.txt"]);

    let dest = dir.path().join("out");
    let options = ExtractOptions {
        dest: dest.clone(),
        ..Default::default()
    };
    let report = extract_container(&proj.join("bundle.tzar"), &options)?;
    assert_eq!(report.extracted, 3);
    assert_eq!(snapshot(&dest), expected);
    Ok(())
}
