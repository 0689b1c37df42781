use std::{fs, path::PathBuf};

use tempfile::tempdir;

use dotweave_cli::{Args, run};

/// Collects the demo graphs that ship with a captured layout
fn collect_demos(dir: PathBuf) -> Vec<(PathBuf, PathBuf)> {
    let mut demos: Vec<_> = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml"))
            .filter_map(|path| {
                let layout = path.with_extension("dot");
                layout.is_file().then_some((path, layout))
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    demos.sort();
    demos
}

fn args(input: PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        engine: None,
        dot_path: None,
        config: None,
        log_level: "off".to_string(),
        save_layout: None,
        replay_layout: None,
    }
}

#[test]
fn e2e_smoke_test_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    // Demos are at workspace root, relative to workspace not the crate
    let demos_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos");
    let demos = collect_demos(demos_path);

    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for (graph_path, layout_path) in &demos {
        let output_path = temp_dir.path().join(format!(
            "{}.svg",
            graph_path.file_stem().unwrap().to_string_lossy()
        ));

        let mut cfg = args(graph_path.clone(), output_path.clone());
        cfg.replay_layout = Some(layout_path.clone());

        match run(&cfg) {
            Ok(()) => {
                let svg = fs::read_to_string(&output_path).unwrap();
                if !svg.contains("<svg") || !svg.contains("<path") {
                    failed.push((graph_path.clone(), "incomplete SVG".to_string()));
                }
            }
            Err(e) => failed.push((graph_path.clone(), e.to_string())),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}
