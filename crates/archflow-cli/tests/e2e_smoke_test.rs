use std::{fs, path::PathBuf};

use tempfile::tempdir;

use archflow_cli::{Args, OutputFormat, run};

/// Collects all .arch files from a directory
fn collect_arch_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("arch")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos live at the workspace root, two levels above this crate
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_arch_files(demos_dir());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let stem = demo_path.file_stem().unwrap().to_string_lossy().to_string();

        for (format, extension) in [(OutputFormat::Json, "json"), (OutputFormat::Flows, "txt")] {
            let output_path = temp_dir.path().join(format!("{stem}.{extension}"));

            let args = Args {
                input: demo_path.to_string_lossy().to_string(),
                output: output_path.to_string_lossy().to_string(),
                format,
                config: None,
                log_level: "off".to_string(),
            };

            match run(&args) {
                Ok(()) if output_path.exists() => {}
                Ok(()) => failed_demos.push((demo_path.clone(), "no output written".to_string())),
                Err(e) => failed_demos.push((demo_path.clone(), e.to_string())),
            }
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo run(s) failed unexpectedly", failed_demos.len());
    }

    println!("All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_arch_files(demos_dir().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        let args = Args {
            input: demo_path.to_string_lossy().to_string(),
            output: output_path.to_string_lossy().to_string(),
            format: OutputFormat::Json,
            config: None,
            log_level: "off".to_string(),
        };

        if run(&args).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!("All {} error demos failed as expected", error_demos.len());
}

#[test]
fn e2e_explicit_config_changes_the_model() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let input_path = temp_dir.path().join("policy.arch");
    fs::write(
        &input_path,
        "service Billing {\n  language: golang\n}\nservice Billing {\n  language: rust\n}\n",
    )
    .unwrap();

    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[policies]\nmerge = \"last_wins\"\n").unwrap();

    let output_path = temp_dir.path().join("model.json");
    let args = Args {
        input: input_path.to_string_lossy().to_string(),
        output: output_path.to_string_lossy().to_string(),
        format: OutputFormat::Json,
        config: Some(config_path.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    };

    run(&args).expect("run should succeed");

    let json = fs::read_to_string(&output_path).unwrap();
    assert!(json.contains("\"rust\""));
    assert!(!json.contains("\"golang\""));
}
